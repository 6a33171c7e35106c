//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("retrieval error: {0}")]
    Retrieval(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(!e.to_string().is_empty());
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn server_error_display() {
        let e = AppError::Server("bind failed".into());
        assert!(e.to_string().starts_with("server error"));
        assert!(e.to_string().contains("bind failed"));
    }

    #[test]
    fn logger_error_display() {
        let e = AppError::Logger("already initialized".into());
        assert!(e.to_string().contains("already initialized"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        // satisfies std::error::Error trait
        let _: &dyn Error = &e;
    }
}
