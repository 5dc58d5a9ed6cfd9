//! 核心 trait 定义
//! 用于解耦提醒逻辑与桌面通知/文件系统

use crate::error::{AppError, AppResult};
use std::path::PathBuf;

/// 通知发送 trait
/// 桌面模式下弹出系统通知, 测试中记录到内存
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, title: &str, message: &str) {
        (**self).notify(title, message)
    }
}

/// 存储配置 trait
/// 抽象数据目录和文件系统操作
pub trait StorageConfig: Send + Sync {
    /// 获取数据目录路径
    fn data_dir(&self) -> PathBuf;

    /// 获取配置文件路径
    fn config_path(&self) -> PathBuf {
        self.data_dir().join("config.json")
    }

    /// 获取日志目录路径
    fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }
}

/// 默认存储配置 (使用 ~/.ai_reminder/)
#[derive(Debug, Clone)]
pub struct DefaultStorageConfig {
    data_dir: PathBuf,
}

impl DefaultStorageConfig {
    pub fn new() -> AppResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| AppError::Config("cannot resolve the user home directory".into()))?;
        Self::with_path(home.join(".ai_reminder"))
    }

    /// 从指定路径创建
    pub fn with_path(data_dir: PathBuf) -> AppResult<Self> {
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }
}

impl StorageConfig for DefaultStorageConfig {
    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }
}
