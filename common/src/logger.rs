use std::sync::OnceLock;
use chrono::Local;

static LOGGER: OnceLock<Logger> = OnceLock::new();

pub struct Logger {
    prefix: Option<String>,
}

impl Logger {
    fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    pub fn format(&self, file: &str, line: u32, message: &str) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let file_name = file.rsplit(['/', '\\']).next().unwrap_or(file);
        match self.prefix {
            Some(ref prefix) => {
                format!("[{}][{}][{}:{}] {}", timestamp, prefix, file_name, line, message)
            }
            None => format!("[{}][{}:{}] {}", timestamp, file_name, line, message),
        }
    }

    pub fn log(&self, file: &str, line: u32, message: &str) {
        println!("{}", self.format(file, line, message));
    }
}

/// Sets the process-wide prefix. Only the first call has an effect.
pub fn init_logger(prefix: Option<String>) {
    LOGGER.get_or_init(|| Logger::new(prefix));
}

// Library code and tests may log before `init_logger`; they get an unprefixed logger.
pub fn log(file: &str, line: u32, message: &str) {
    LOGGER.get_or_init(|| Logger::new(None)).log(file, line, message);
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        $crate::logger::log(file!(), line!(), &format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_strips_directories_and_adds_prefix() {
        let logger = Logger::new(Some("Server".to_string()));

        let line = logger.format("server/src/game_service.rs", 12, "started");

        assert!(line.contains("[Server][game_service.rs:12] started"));
    }

    #[test]
    fn test_format_without_prefix() {
        let logger = Logger::new(None);

        let line = logger.format("C:\\repo\\main.rs", 3, "hello");

        assert!(line.ends_with("[main.rs:3] hello"));
    }
}
