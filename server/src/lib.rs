pub mod api;
pub mod cleanup_task;
pub mod game_service;
pub mod server_config;
pub mod session_store;
pub mod web_server;
