//! 核心模块
//! 定时调度、提醒生成与配置存储, 不依赖界面

pub mod models;
pub mod scheduler;
pub mod services;
pub mod storage;
pub mod traits;

// 重导出常用类型
pub use traits::{DefaultStorageConfig, Notifier, StorageConfig};
