use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// 定时规则无法解析 (每日 HH:MM 或间隔分钟数)
    #[error("Invalid schedule format: {0}")]
    InvalidScheduleFormat(String),

    #[error("API Error: {0}")]
    Api(u16),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest 的 Display 不含底层原因, 逐级拼接
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        AppError::Connection(message)
    }
}

// Result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;
