use std::path::Path;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tictactoe_common::games::tictactoe::EngineError;
use tictactoe_common::{ClientId, log};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::api::{ErrorResponse, MoveRequest, MoveResponse, StartRequest};
use crate::game_service::GameService;

/// Header a browser tab uses to keep its own game.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

#[derive(Clone)]
pub struct WebServerState {
    pub game_service: GameService,
}

pub fn build_router(game_service: GameService, static_files_path: Option<&Path>) -> Router {
    let state = WebServerState { game_service };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/start", post(start_handler))
        .route("/move", post(move_handler))
        .route("/restart", post(restart_handler))
        .route("/stats", get(stats_handler));

    if let Some(path) = static_files_path {
        app = app.fallback_service(ServeDir::new(path));
    }

    app.layer(cors).with_state(state)
}

pub async fn run_web_server(
    game_service: GameService,
    bind_address: &str,
    static_files_path: Option<&Path>,
) -> Result<(), std::io::Error> {
    let app = build_router(game_service, static_files_path);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    log!("Web server listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    log!("Shutdown signal received");
}

fn client_id_from(headers: &HeaderMap) -> ClientId {
    headers
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ClientId::from)
        .unwrap_or_default()
}

fn error_response(client_id: &ClientId, error: EngineError) -> Response {
    if error.is_internal() {
        log!("[client:{}] Internal error: {}", client_id, error);
        let body = Json(ErrorResponse::new(error.to_string()));
        return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
    }

    match error {
        EngineError::OutOfRange { .. }
        | EngineError::CellOccupied { .. }
        | EngineError::InvalidState(_) => {
            log!("[client:{}] Move rejected: {}", client_id, error);
            Json(MoveResponse::invalid(error.to_string())).into_response()
        }
        _ => {
            log!("[client:{}] Request rejected: {}", client_id, error);
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error.to_string()))).into_response()
        }
    }
}

async fn start_handler(
    State(state): State<WebServerState>,
    headers: HeaderMap,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> Response {
    let client_id = client_id_from(&headers);
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let message = rejection.body_text();
            log!("[client:{}] Malformed start request: {}", client_id, message);
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response();
        }
    };

    match state.game_service.start(&client_id, request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(&client_id, e),
    }
}

async fn move_handler(
    State(state): State<WebServerState>,
    headers: HeaderMap,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Response {
    let client_id = client_id_from(&headers);
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let message = rejection.body_text();
            log!("[client:{}] Malformed move request: {}", client_id, message);
            return Json(MoveResponse::invalid(message)).into_response();
        }
    };

    match state.game_service.make_move(&client_id, request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(&client_id, e),
    }
}

async fn restart_handler(State(state): State<WebServerState>, headers: HeaderMap) -> Response {
    let client_id = client_id_from(&headers);

    match state.game_service.restart(&client_id).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(&client_id, e),
    }
}

async fn stats_handler(State(state): State<WebServerState>) -> impl IntoResponse {
    Json(state.game_service.stats())
}
