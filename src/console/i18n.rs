//! 控制台文本 (中 / 英)

use crate::core::models::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    Title,
    Help,
    Prompt,
    StatusRunning,
    StatusStopped,
    NextFire,
    NoRule,
    Saved,
    ScheduleRejected,
    UnknownCommand,
    Usage,
    Models,
    TestSent,
    LangSwitched,
    Pending,
    Bye,
}

pub fn tr(lang: Language, text: Text) -> &'static str {
    match lang {
        Language::En => en(text),
        Language::Zh => zh(text),
    }
}

fn en(text: Text) -> &'static str {
    match text {
        Text::Title => "AI Reminder",
        Text::Help => concat!(
            "Commands:\n",
            "  show                 show current settings\n",
            "  set <key> <value>    edit a setting (api_url, api_key, model, prompt, mode,\n",
            "                       time_value, auto_start, theme)\n",
            "  apply                save & apply\n",
            "  test                 test notification\n",
            "  models               refresh models\n",
            "  status               scheduler status\n",
            "  lang                 switch to Chinese\n",
            "  quit                 quit"
        ),
        Text::Prompt => "> ",
        Text::StatusRunning => "Status: Running",
        Text::StatusStopped => "Status: Stopped",
        Text::NextFire => "Next reminder",
        Text::NoRule => "No active schedule",
        Text::Saved => "Settings saved",
        Text::ScheduleRejected => "Settings saved, but the schedule was not changed",
        Text::UnknownCommand => "Unknown command, type `help`",
        Text::Usage => "Usage: set <key> <value>",
        Text::Models => "Available models",
        Text::TestSent => "Test notification sent",
        Text::LangSwitched => "Language switched to English",
        Text::Pending => "(unsaved changes, type `apply`)",
        Text::Bye => "Bye",
    }
}

fn zh(text: Text) -> &'static str {
    match text {
        Text::Title => "AI 提醒助手",
        Text::Help => concat!(
            "命令:\n",
            "  show                 查看当前设置\n",
            "  set <键> <值>        修改设置 (api_url, api_key, model, prompt, mode,\n",
            "                       time_value, auto_start, theme)\n",
            "  apply                保存并应用\n",
            "  test                 测试消息\n",
            "  models               刷新模型列表\n",
            "  status               调度状态\n",
            "  lang                 Switch to English\n",
            "  quit                 退出程序"
        ),
        Text::Prompt => "> ",
        Text::StatusRunning => "状态: 运行中",
        Text::StatusStopped => "状态: 已停止",
        Text::NextFire => "下次提醒",
        Text::NoRule => "没有生效的定时规则",
        Text::Saved => "设置已保存",
        Text::ScheduleRejected => "设置已保存, 但定时规则未更新",
        Text::UnknownCommand => "未知命令, 输入 `help` 查看帮助",
        Text::Usage => "用法: set <键> <值>",
        Text::Models => "可用模型",
        Text::TestSent => "测试消息已发送",
        Text::LangSwitched => "已切换为中文",
        Text::Pending => "(有未保存的修改, 输入 `apply`)",
        Text::Bye => "再见",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_message_is_in_target_language() {
        assert_eq!(tr(Language::En, Text::LangSwitched), "Language switched to English");
        assert_eq!(tr(Language::Zh, Text::LangSwitched), "已切换为中文");
    }
}
