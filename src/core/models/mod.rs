//! 核心数据模型

mod config;

pub use config::{
    AppConfig, Language, ScheduleMode, DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_PROMPT,
};
