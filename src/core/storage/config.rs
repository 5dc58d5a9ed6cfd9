//! 配置存储服务

use crate::core::models::AppConfig;
use crate::core::traits::StorageConfig;
use crate::error::{AppError, AppResult};
use std::fs;

/// 配置存储服务
pub struct ConfigStorage;

impl ConfigStorage {
    /// 加载应用配置
    /// 文件不存在时写入并返回默认配置; 文件损坏视为致命错误
    pub fn load<S: StorageConfig>(storage: &S) -> AppResult<AppConfig> {
        let config_path = storage.config_path();

        if !config_path.exists() {
            let default_config = AppConfig::default();
            Self::save(storage, &default_config)?;
            tracing::info!("Created default config at {}", config_path.display());
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path)?;

        serde_json::from_str(&content)
            .map_err(|e| AppError::ConfigParse(format!("{}: {}", config_path.display(), e)))
    }

    /// 保存应用配置 (整体覆盖)
    pub fn save<S: StorageConfig>(storage: &S, config: &AppConfig) -> AppResult<()> {
        let config_path = storage.config_path();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| AppError::Config(format!("failed to serialize config: {}", e)))?;

        // 原子写入：先写入临时文件，再重命名
        let temp_path = config_path.with_extension("json.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &config_path)?;

        Ok(())
    }
}
