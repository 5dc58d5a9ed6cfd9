//! 定时调度器
//! 同一时刻只保留一条定时规则, 到期后触发一次提醒生成

use crate::core::models::ScheduleMode;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime, TimeZone};
use futures::future::BoxFuture;
use futures::FutureExt;
use once_cell::sync::Lazy;
use regex::Regex;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// 间隔模式下非正数的替代值 (分钟)
pub const DEFAULT_INTERVAL_MINUTES: u32 = 60;

/// 轮询粒度
const TICK: Duration = Duration::from_secs(1);

static DAILY_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").unwrap());

/// 定时规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleRule {
    /// 每天固定时间触发一次
    Daily { at: NaiveTime },
    /// 每 N 分钟触发一次
    Interval { minutes: u32 },
}

impl ScheduleRule {
    /// 从配置中的 mode + time_value 解析规则
    pub fn parse(mode: ScheduleMode, value: &str) -> AppResult<Self> {
        let value = value.trim();
        match mode {
            ScheduleMode::Daily => {
                let caps = DAILY_TIME_RE.captures(value).ok_or_else(|| {
                    AppError::InvalidScheduleFormat(format!("expected HH:MM, got {:?}", value))
                })?;
                let hour: u32 = caps[1].parse().unwrap_or_default();
                let minute: u32 = caps[2].parse().unwrap_or_default();
                let at = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
                    AppError::InvalidScheduleFormat(format!("{:?} is not a time of day", value))
                })?;
                Ok(ScheduleRule::Daily { at })
            }
            ScheduleMode::Interval => {
                let minutes: i64 = value.parse().map_err(|_| {
                    AppError::InvalidScheduleFormat(format!(
                        "interval must be integer minutes, got {:?}",
                        value
                    ))
                })?;
                if minutes <= 0 {
                    warn!(
                        "Interval {} is not positive, falling back to {} minutes",
                        minutes, DEFAULT_INTERVAL_MINUTES
                    );
                    return Ok(ScheduleRule::Interval {
                        minutes: DEFAULT_INTERVAL_MINUTES,
                    });
                }
                let minutes = u32::try_from(minutes).map_err(|_| {
                    AppError::InvalidScheduleFormat(format!("interval {} is too large", minutes))
                })?;
                Ok(ScheduleRule::Interval { minutes })
            }
        }
    }

    /// 计算 `now` 之后的下一次触发时间
    pub fn next_fire_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        match *self {
            ScheduleRule::Daily { at } => {
                let mut date = now.date_naive();
                if at <= now.time() {
                    date = date.succ_opt().unwrap_or(date);
                }
                resolve_local(&now.timezone(), date.and_time(at))
                    .unwrap_or_else(|| now.clone() + ChronoDuration::days(1))
            }
            ScheduleRule::Interval { minutes } => {
                now.clone() + ChronoDuration::minutes(i64::from(minutes))
            }
        }
    }
}

// 夏令时跳变导致本地时间不存在时, 顺延一小时
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(naive + ChronoDuration::hours(1)))
                .earliest()
        })
}

/// 已安装的规则及其下次触发时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRule {
    pub rule: ScheduleRule,
    pub next_fire: DateTime<Local>,
}

/// 调度器触发的工作单元
pub trait ReminderTask: Send + Sync {
    fn fire(&self) -> BoxFuture<'_, ()>;
}

pub struct Scheduler<T: ReminderTask> {
    task: Arc<T>,
    active: Mutex<Option<ActiveRule>>,
    running: AtomicBool,
    tick: Duration,
}

impl<T: ReminderTask + 'static> Scheduler<T> {
    pub fn new(task: Arc<T>) -> Self {
        Self::with_tick(task, TICK)
    }

    pub fn with_tick(task: Arc<T>, tick: Duration) -> Self {
        Self {
            task,
            active: Mutex::new(None),
            running: AtomicBool::new(true),
            tick,
        }
    }

    /// 替换当前规则; 解析失败时保留旧规则
    pub fn set_rule(&self, mode: ScheduleMode, value: &str) -> AppResult<ScheduleRule> {
        let rule = ScheduleRule::parse(mode, value)?;
        self.install(rule, Local::now());
        Ok(rule)
    }

    /// 按给定的安装时刻安装规则
    pub fn install(&self, rule: ScheduleRule, installed_at: DateTime<Local>) {
        let next_fire = rule.next_fire_after(&installed_at);
        *self.lock_active() = Some(ActiveRule { rule, next_fire });
        info!("[Scheduler] Rule {:?} installed, next fire at {}", rule, next_fire);
    }

    #[cfg(test)]
    pub(crate) fn clear(&self) {
        *self.lock_active() = None;
    }

    pub fn active_rule(&self) -> Option<ActiveRule> {
        *self.lock_active()
    }

    pub fn next_fire(&self) -> Option<DateTime<Local>> {
        self.active_rule().map(|active| active.next_fire)
    }

    /// 检查规则是否到期; 到期则重新计算下次触发时间并返回 true
    pub fn take_due(&self, now: DateTime<Local>) -> bool {
        let mut active = self.lock_active();
        match active.as_mut() {
            Some(current) if current.next_fire <= now => {
                current.next_fire = current.rule.next_fire_after(&now);
                debug!("[Scheduler] Rule due, next fire at {}", current.next_fire);
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// 轮询循环, 直到 stop() 被调用
    pub async fn run(&self) {
        info!("[Scheduler] Started, polling every {:?}", self.tick);
        let mut interval = time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.is_running() {
            interval.tick().await;
            if !self.is_running() {
                break;
            }
            if !self.take_due(Local::now()) {
                continue;
            }

            // 单次生成失败不能终止调度循环
            if let Err(panic) = AssertUnwindSafe(self.task.fire()).catch_unwind().await {
                error!("[Scheduler] Reminder task panicked: {}", panic_message(&*panic));
            }
        }

        info!("[Scheduler] Stopped");
    }

    /// 在后台 tokio 任务中运行调度循环
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.run().await })
    }

    /// 请求循环在本轮结束后退出
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveRule>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
