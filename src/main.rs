use ai_reminder::console::{Console, ConsoleExit};
use ai_reminder::core::services::DesktopNotifier;
use ai_reminder::core::{DefaultStorageConfig, StorageConfig};
use ai_reminder::logger;
use ai_reminder::state::AppState;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Start with the console hidden (used by the autostart entry)
    #[arg(long)]
    minimized: bool,

    #[arg(short, long, env = "AI_REMINDER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Cmd {
    /// Run the scheduler (default)
    Run,
    /// Generate one reminder now and exit
    Test,
    /// Print the models offered by a local endpoint
    Models,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(args));
    // 控制台的 stdin 读取可能仍在阻塞线程上, 不等待它
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run(args: Args) -> anyhow::Result<()> {
    let storage = match args.data_dir {
        Some(dir) => DefaultStorageConfig::with_path(dir)?,
        None => DefaultStorageConfig::new()?,
    };
    let _log_guard = logger::init_logger(&storage.log_dir());

    let state = Arc::new(
        AppState::with_notifier(storage, DesktopNotifier).context("Failed to init state")?,
    );

    match args.command.unwrap_or(Cmd::Run) {
        Cmd::Test => state.test_notification().await,
        Cmd::Models => {
            for model in state.list_models().await {
                println!("{}", model);
            }
        }
        Cmd::Run => serve(state, args.minimized).await?,
    }

    Ok(())
}

async fn serve(state: Arc<AppState>, minimized: bool) -> anyhow::Result<()> {
    let scheduler = state.scheduler.start();

    if minimized {
        tracing::info!("Started minimized, press Ctrl-C to quit");
        tokio::signal::ctrl_c().await?;
    } else {
        let console = Console::new(state.clone());
        tokio::select! {
            exit = console.run() => {
                if exit? == ConsoleExit::Eof {
                    tracing::info!("Console input closed, running in background until Ctrl-C");
                    tokio::signal::ctrl_c().await?;
                }
            }
            signal = tokio::signal::ctrl_c() => signal?,
        }
    }

    // 等待正在进行的生成请求自然结束
    state.scheduler.stop();
    if let Err(e) = scheduler.await {
        tracing::error!("Scheduler task ended abnormally: {}", e);
    }
    tracing::info!("Shutting down");
    Ok(())
}
