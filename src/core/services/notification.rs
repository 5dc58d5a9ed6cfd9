//! 系统通知

use crate::core::traits::Notifier;
use notify_rust::{Notification, Timeout};

pub const APP_NAME: &str = "AI Reminder";

/// 通过操作系统通知中心展示提醒, 不可用时输出到控制台
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        let (title, message) = (title.to_string(), message.to_string());
        dispatch(move || show(&title, &message));
    }
}

fn show(title: &str, message: &str) {
    let shown = Notification::new()
        .appname(APP_NAME)
        .summary(title)
        .body(message)
        .timeout(Timeout::Milliseconds(10_000))
        .show();

    if let Err(e) = shown {
        tracing::warn!("Desktop notification unavailable: {}", e);
        println!("NOTIFY: {} - {}", title, message);
    }
}

/// 有运行时时交给阻塞线程池执行, 否则直接执行
fn dispatch<F>(job: F)
where
    F: FnOnce() + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(job);
        }
        Err(_) => job(),
    }
}
