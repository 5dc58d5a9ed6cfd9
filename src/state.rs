use crate::core::models::AppConfig;
use crate::core::scheduler::{ReminderTask, ScheduleRule, Scheduler};
use crate::core::services::{DesktopNotifier, ReminderGenerator};
use crate::core::storage::ConfigStorage;
use crate::core::traits::{DefaultStorageConfig, Notifier, StorageConfig};
use crate::error::AppResult;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 进程内共享的配置快照
pub type SharedConfig = Arc<RwLock<AppConfig>>;

/// 调度器触发的提醒任务: 读取当前配置快照后生成一次提醒
pub struct ScheduledReminder<N: Notifier> {
    config: SharedConfig,
    generator: Arc<ReminderGenerator<N>>,
}

impl<N: Notifier> ReminderTask for ScheduledReminder<N> {
    fn fire(&self) -> BoxFuture<'_, ()> {
        async move {
            let snapshot = self.config.read().await.clone();
            self.generator.generate(&snapshot).await;
        }
        .boxed()
    }
}

/// 应用状态
pub struct AppState<N: Notifier + 'static = DesktopNotifier> {
    pub storage: DefaultStorageConfig,
    pub config: SharedConfig,
    pub generator: Arc<ReminderGenerator<N>>,
    pub scheduler: Arc<Scheduler<ScheduledReminder<N>>>,
}

impl<N: Notifier + 'static> AppState<N> {
    /// 加载配置并安装初始定时规则
    /// 配置文件损坏时返回 ConfigParse; 规则无效时仅记录日志, 不安装规则
    pub fn with_notifier(storage: DefaultStorageConfig, notifier: N) -> AppResult<Self> {
        let config = ConfigStorage::load(&storage)?;
        tracing::info!(
            "Loaded config from {} (mode: {}, value: {})",
            storage.config_path().display(),
            config.mode,
            config.time_value
        );

        let generator = Arc::new(ReminderGenerator::new(notifier));
        Ok(Self::assemble(storage, config, generator))
    }

    fn assemble(
        storage: DefaultStorageConfig,
        config: AppConfig,
        generator: Arc<ReminderGenerator<N>>,
    ) -> Self {
        let (mode, time_value) = (config.mode, config.time_value.clone());
        let config = Arc::new(RwLock::new(config));
        let task = Arc::new(ScheduledReminder {
            config: config.clone(),
            generator: generator.clone(),
        });
        let scheduler = Arc::new(Scheduler::new(task));

        if let Err(e) = scheduler.set_rule(mode, &time_value) {
            tracing::error!("No schedule installed: {}", e);
        }

        Self {
            storage,
            config,
            generator,
            scheduler,
        }
    }

    pub async fn config_snapshot(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// 保存配置并重新加载定时规则
    /// 规则无效时配置仍会保存, 旧规则继续生效
    pub async fn apply(&self, new_config: AppConfig) -> AppResult<ScheduleRule> {
        ConfigStorage::save(&self.storage, &new_config)?;
        let (mode, time_value) = (new_config.mode, new_config.time_value.clone());
        *self.config.write().await = new_config;

        self.scheduler.set_rule(mode, &time_value).map_err(|e| {
            tracing::warn!("Settings saved but schedule was not changed: {}", e);
            e
        })
    }

    /// 立即生成一次提醒 (与定时触发互不影响)
    pub async fn test_notification(&self) {
        let snapshot = self.config_snapshot().await;
        self.generator.generate(&snapshot).await;
    }

    pub async fn list_models(&self) -> Vec<String> {
        let snapshot = self.config_snapshot().await;
        self.generator.list_available_models(&snapshot).await
    }
}

#[cfg(test)]
impl<N: Notifier + 'static> AppState<N> {
    pub(crate) fn for_tests(
        storage: DefaultStorageConfig,
        generator: ReminderGenerator<N>,
    ) -> AppResult<Self> {
        let config = ConfigStorage::load(&storage)?;
        Ok(Self::assemble(storage, config, Arc::new(generator)))
    }
}
