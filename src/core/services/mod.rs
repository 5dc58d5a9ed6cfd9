//! 核心服务层

pub mod notification;
pub mod reminder;

pub use notification::DesktopNotifier;
pub use reminder::{ReminderGenerator, ReminderText};
