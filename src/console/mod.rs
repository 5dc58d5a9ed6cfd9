//! 前台控制台
//! 编辑配置、保存并应用、测试消息、刷新模型列表

pub mod i18n;

use crate::core::models::{AppConfig, Language, ScheduleMode};
use crate::core::traits::Notifier;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use i18n::{tr, Text};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// 控制台命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Set { key: String, value: String },
    Apply,
    Test,
    Models,
    Status,
    Lang,
    Help,
    Quit,
    Empty,
    BadUsage,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map(|(h, r)| (h, r.trim()))
            .unwrap_or((line, ""));

        match head.to_ascii_lowercase().as_str() {
            "" => Command::Empty,
            "show" => Command::Show,
            "set" => match rest.split_once(char::is_whitespace) {
                Some((key, value)) => Command::Set {
                    key: key.to_string(),
                    value: value.trim().to_string(),
                },
                // `set api_key` 不带值表示清空
                None if !rest.is_empty() => Command::Set {
                    key: rest.to_string(),
                    value: String::new(),
                },
                None => Command::BadUsage,
            },
            "apply" | "save" => Command::Apply,
            "test" => Command::Test,
            "models" | "refresh" => Command::Models,
            "status" => Command::Status,
            "lang" => Command::Lang,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// 修改一项设置
pub fn apply_setting(config: &mut AppConfig, key: &str, value: &str) -> AppResult<()> {
    match key {
        "api_url" => config.api_url = value.to_string(),
        "api_key" => config.api_key = value.to_string(),
        "model" => config.model = value.to_string(),
        "prompt" => config.prompt = value.to_string(),
        "time_value" => config.time_value = value.to_string(),
        "theme" => config.theme = value.to_string(),
        "mode" => {
            config.mode = match value.to_ascii_lowercase().as_str() {
                "daily" => ScheduleMode::Daily,
                "interval" => ScheduleMode::Interval,
                _ => {
                    return Err(AppError::Config(format!(
                        "mode must be daily or interval, got {:?}",
                        value
                    )))
                }
            }
        }
        "language" => {
            config.language = match value.to_ascii_lowercase().as_str() {
                "en" => Language::En,
                "zh" => Language::Zh,
                _ => {
                    return Err(AppError::Config(format!(
                        "language must be en or zh, got {:?}",
                        value
                    )))
                }
            }
        }
        "auto_start" => {
            config.auto_start = match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => true,
                "false" | "0" | "off" | "no" => false,
                _ => {
                    return Err(AppError::Config(format!(
                        "auto_start must be true or false, got {:?}",
                        value
                    )))
                }
            }
        }
        other => return Err(AppError::Config(format!("unknown setting {:?}", other))),
    }
    Ok(())
}

fn render_config(config: &AppConfig) -> String {
    let key = if config.api_key.is_empty() { "" } else { "********" };
    format!(
        concat!(
            "api_url    = {}\n",
            "api_key    = {}\n",
            "model      = {}\n",
            "prompt     = {}\n",
            "mode       = {}\n",
            "time_value = {}\n",
            "auto_start = {}\n",
            "language   = {}\n",
            "theme      = {}"
        ),
        config.api_url,
        key,
        config.model,
        config.prompt,
        config.mode,
        config.time_value,
        config.auto_start,
        config.language,
        config.theme
    )
}

/// 执行结果
#[derive(Debug, Default)]
pub struct Outcome {
    pub output: String,
    pub quit: bool,
}

impl Outcome {
    fn say(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            quit: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Quit,
    Eof,
}

pub struct Console<N: Notifier + 'static> {
    state: Arc<AppState<N>>,
    // `set` 修改的草稿, `apply` 后写入
    pending: Option<AppConfig>,
}

impl<N: Notifier + 'static> Console<N> {
    pub fn new(state: Arc<AppState<N>>) -> Self {
        Self {
            state,
            pending: None,
        }
    }

    async fn language(&self) -> Language {
        match &self.pending {
            Some(config) => config.language,
            None => self.state.config.read().await.language,
        }
    }

    async fn draft(&self) -> AppConfig {
        match &self.pending {
            Some(config) => config.clone(),
            None => self.state.config_snapshot().await,
        }
    }

    async fn save_draft(&mut self, draft: AppConfig) -> String {
        let lang = draft.language;
        match self.state.apply(draft).await {
            Ok(_) => {
                self.pending = None;
                tr(lang, Text::Saved).to_string()
            }
            Err(e @ AppError::InvalidScheduleFormat(_)) => {
                self.pending = None;
                format!("{}: {}", tr(lang, Text::ScheduleRejected), e)
            }
            Err(e) => e.to_string(),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Outcome {
        let lang = self.language().await;

        match command {
            Command::Empty => Outcome::default(),
            Command::Help => Outcome::say(tr(lang, Text::Help)),
            Command::Show => {
                let mut out = render_config(&self.draft().await);
                if self.pending.is_some() {
                    out.push('\n');
                    out.push_str(tr(lang, Text::Pending));
                }
                Outcome::say(out)
            }
            Command::Set { key, value } => {
                let mut draft = self.draft().await;
                match apply_setting(&mut draft, &key, &value) {
                    Ok(()) => {
                        self.pending = Some(draft);
                        Outcome::say(tr(lang, Text::Pending))
                    }
                    Err(e) => Outcome::say(e.to_string()),
                }
            }
            Command::BadUsage => Outcome::say(tr(lang, Text::Usage)),
            Command::Apply => {
                let draft = self.draft().await;
                Outcome::say(self.save_draft(draft).await)
            }
            Command::Lang => {
                let mut draft = self.draft().await;
                draft.language = draft.language.toggled();
                let new_lang = draft.language;
                let saved = self.save_draft(draft).await;
                Outcome::say(format!("{}\n{}", saved, tr(new_lang, Text::LangSwitched)))
            }
            Command::Test => {
                let state = self.state.clone();
                tokio::spawn(async move { state.test_notification().await });
                Outcome::say(tr(lang, Text::TestSent))
            }
            Command::Models => {
                let models = self.state.list_models().await;
                Outcome::say(format!("{}: {}", tr(lang, Text::Models), models.join(", ")))
            }
            Command::Status => {
                let running = if self.state.scheduler.is_running() {
                    tr(lang, Text::StatusRunning)
                } else {
                    tr(lang, Text::StatusStopped)
                };
                let next = match self.state.scheduler.next_fire() {
                    Some(at) => format!(
                        "{}: {}",
                        tr(lang, Text::NextFire),
                        at.format("%Y-%m-%d %H:%M")
                    ),
                    None => tr(lang, Text::NoRule).to_string(),
                };
                Outcome::say(format!("{}\n{}", running, next))
            }
            Command::Quit => Outcome {
                output: tr(lang, Text::Bye).to_string(),
                quit: true,
            },
            Command::Unknown(cmd) => {
                Outcome::say(format!("{}: {}", tr(lang, Text::UnknownCommand), cmd))
            }
        }
    }

    /// 读取标准输入直到 quit 或输入结束
    pub async fn run(mut self) -> AppResult<ConsoleExit> {
        let lang = self.language().await;
        println!("{}\n{}", tr(lang, Text::Title), tr(lang, Text::Help));

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{}", tr(self.language().await, Text::Prompt));
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                return Ok(ConsoleExit::Eof);
            };

            let outcome = self.execute(Command::parse(&line)).await;
            if !outcome.output.is_empty() {
                println!("{}", outcome.output);
            }
            if outcome.quit {
                return Ok(ConsoleExit::Quit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::ScheduleRule;
    use crate::core::storage::ConfigStorage;
    use crate::core::traits::testing::RecordingNotifier;
    use crate::core::traits::DefaultStorageConfig;

    fn console_in(dir: &tempfile::TempDir) -> Console<Arc<RecordingNotifier>> {
        let storage = DefaultStorageConfig::with_path(dir.path().to_path_buf()).unwrap();
        let state =
            AppState::with_notifier(storage, Arc::new(RecordingNotifier::default())).unwrap();
        Console::new(Arc::new(state))
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  "), Command::Empty);
        assert_eq!(Command::parse("SHOW"), Command::Show);
        assert_eq!(
            Command::parse("set prompt Remind me to   stretch "),
            Command::Set {
                key: "prompt".into(),
                value: "Remind me to   stretch".into()
            }
        );
        assert_eq!(
            Command::parse("set api_key"),
            Command::Set {
                key: "api_key".into(),
                value: String::new()
            }
        );
        assert_eq!(Command::parse("set"), Command::BadUsage);
        assert_eq!(Command::parse("exit"), Command::Quit);
        assert_eq!(Command::parse("dance"), Command::Unknown("dance".into()));
    }

    #[test]
    fn test_apply_setting() {
        let mut config = AppConfig::default();
        apply_setting(&mut config, "mode", "Daily").unwrap();
        apply_setting(&mut config, "time_value", "07:30").unwrap();
        apply_setting(&mut config, "auto_start", "on").unwrap();
        assert_eq!(config.mode, ScheduleMode::Daily);
        assert_eq!(config.time_value, "07:30");
        assert!(config.auto_start);

        assert!(apply_setting(&mut config, "mode", "weekly").is_err());
        assert!(apply_setting(&mut config, "colour", "red").is_err());
    }

    #[tokio::test]
    async fn test_set_is_pending_until_apply() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = console_in(&dir);

        console.execute(Command::parse("set mode daily")).await;
        console.execute(Command::parse("set time_value 18:00")).await;
        assert_eq!(
            console.state.scheduler.active_rule().map(|a| a.rule),
            Some(ScheduleRule::Interval { minutes: 60 })
        );

        let out = console.execute(Command::Apply).await;
        assert_eq!(out.output, "设置已保存");
        assert!(matches!(
            console.state.scheduler.active_rule().map(|a| a.rule),
            Some(ScheduleRule::Daily { .. })
        ));
        let saved = ConfigStorage::load(&console.state.storage).unwrap();
        assert_eq!(saved.time_value, "18:00");
    }

    #[tokio::test]
    async fn test_apply_reports_rejected_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = console_in(&dir);

        console.execute(Command::parse("set mode daily")).await;
        console.execute(Command::parse("set time_value 25:99")).await;
        let out = console.execute(Command::Apply).await;
        assert!(out.output.starts_with("设置已保存, 但定时规则未更新"));
        assert_eq!(
            console.state.scheduler.active_rule().map(|a| a.rule),
            Some(ScheduleRule::Interval { minutes: 60 })
        );
    }

    #[tokio::test]
    async fn test_lang_toggles_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = console_in(&dir);

        let out = console.execute(Command::Lang).await;
        assert!(out.output.ends_with("Language switched to English"));
        assert_eq!(
            ConfigStorage::load(&console.state.storage).unwrap().language,
            Language::En
        );

        let out = console.execute(Command::Quit).await;
        assert!(out.quit);
        assert_eq!(out.output, "Bye");
    }

    #[tokio::test]
    async fn test_show_masks_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = console_in(&dir);
        console.execute(Command::parse("set api_key sk-secret")).await;

        let out = console.execute(Command::Show).await;
        assert!(!out.output.contains("sk-secret"));
        assert!(out.output.contains("api_key    = ********"));
    }

    const SETTING_KEYS: [&str; 9] = [
        "api_url",
        "api_key",
        "model",
        "prompt",
        "mode",
        "time_value",
        "auto_start",
        "language",
        "theme",
    ];

    #[test]
    fn test_render_config_one_line_per_setting() {
        let rendered = render_config(&AppConfig::default());
        let keys: Vec<&str> = rendered
            .lines()
            .map(|line| line.split(" = ").next().unwrap_or_default().trim_end())
            .collect();
        assert_eq!(keys, SETTING_KEYS);
    }

    #[test]
    fn test_help_lists_every_editable_setting() {
        for lang in [Language::En, Language::Zh] {
            let help = tr(lang, Text::Help);
            for key in SETTING_KEYS.iter().filter(|k| **k != "language") {
                assert!(help.contains(key), "{:?} help misses {}", lang, key);
            }
            assert!(help.lines().all(|line| line.chars().count() <= 100));
        }
    }

    #[test]
    fn test_rejected_setting_names_value() {
        let mut config = AppConfig::default();
        for (key, bad) in [("mode", "weekly"), ("language", "fr"), ("auto_start", "maybe")] {
            match apply_setting(&mut config, key, bad) {
                Err(AppError::Config(msg)) => {
                    assert!(msg.starts_with(key), "{}", msg);
                    assert!(msg.ends_with(&format!("got {:?}", bad)), "{}", msg);
                }
                other => panic!("{} accepted {:?}: {:?}", key, bad, other),
            }
        }
    }
}
