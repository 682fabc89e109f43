use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use admitbot_common::traits::AnswerSink;
use admitbot_core::config::{
    CredentialSource, RetryPolicy, SinkConfig, DEFAULT_BACKUP_PATH, DEFAULT_CREDENTIALS_PATH,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, DEFAULT_SHEET_NAME, DEFAULT_SPREADSHEET_ID,
};
use admitbot_core::eventbus::audit_logger::spawn_audit_logger;
use admitbot_core::eventbus::{BotEvent, EventBus};
use admitbot_core::platforms::telegram::TelegramPlatform;
use admitbot_core::platforms::PlatformIntegration;
use admitbot_core::sink::build_sink;
use admitbot_core::SurveyService;

#[derive(Parser, Clone)]
#[command(name = "admitbot")]
#[command(author, version, about = "Admissions interview survey bot for Telegram")]
struct Args {
    /// Telegram bot token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    /// Service-account key file for Google Sheets
    #[arg(long, env = "CREDENTIALS_PATH", default_value = DEFAULT_CREDENTIALS_PATH)]
    credentials_path: PathBuf,

    /// Service-account key as inline JSON; takes precedence over the file
    #[arg(long, env = "GOOGLE_CREDENTIALS", hide_env_values = true)]
    google_credentials: Option<String>,

    #[arg(long, env = "SPREADSHEET_ID", default_value = DEFAULT_SPREADSHEET_ID)]
    spreadsheet_id: String,

    /// Worksheet that receives answers; the first worksheet is used if it is missing
    #[arg(long, default_value = DEFAULT_SHEET_NAME)]
    sheet_name: String,

    /// Local JSON file for rows that could not be sent
    #[arg(long, default_value = DEFAULT_BACKUP_PATH)]
    backup_path: PathBuf,

    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY.as_secs())]
    retry_delay_secs: u64,
}

impl Args {
    fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            spreadsheet_id: self.spreadsheet_id.clone(),
            sheet_name: self.sheet_name.clone(),
            credentials_path: self.credentials_path.clone(),
            inline_credentials: self.google_credentials.clone(),
            backup_path: self.backup_path.clone(),
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                delay: Duration::from_secs(self.retry_delay_secs),
            },
        }
    }
}

fn init_tracing() {
    // teloxide logs through the `log` crate.
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("log bridge already installed: {e}");
    }
    let filter = EnvFilter::from_default_env()
        .add_directive("admitbot_server=info".parse().unwrap_or_default())
        .add_directive("admitbot_core=info".parse().unwrap_or_default())
        .add_directive("admitbot_sheets=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {e}");
    }
}

fn log_startup_diagnostics(config: &SinkConfig) {
    info!("=== admitbot startup diagnostics ===");
    match std::env::current_dir() {
        Ok(dir) => info!("Working directory: {}", dir.display()),
        Err(e) => warn!("Working directory unknown => {e}"),
    }
    info!("Spreadsheet id: {}", config.spreadsheet_id);
    info!("Worksheet: {}", config.sheet_name);
    match config.credential_source() {
        CredentialSource::Inline(_) => info!("Credentials: GOOGLE_CREDENTIALS (inline)"),
        CredentialSource::File(path) if path.exists() => {
            info!("Credentials: {} (found)", path.display())
        }
        CredentialSource::File(path) => {
            warn!("Credentials: {} (missing, answers will be kept locally)", path.display())
        }
    }
    info!("Local backup: {}", config.backup_path.display());
    info!(
        "Retry policy: {} attempts, {:?} apart",
        config.retry.max_attempts, config.retry.delay
    );
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        error!("Failed to listen for Ctrl-C: {:?}", e);
                    }
                    info!("Ctrl-C detected");
                }
                _ = term.recv() => info!("SIGTERM received"),
            }
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {:?}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {:?}", e);
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {:?}", e);
    }
    info!("Ctrl-C detected");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let Some(token) = args.bot_token.clone().filter(|t| !t.trim().is_empty()) else {
        error!("BOT_TOKEN is not set. Put it in the environment or in a .env file.");
        std::process::exit(1);
    };

    let config = args.sink_config();
    log_startup_diagnostics(&config);

    let sink = build_sink(&config).await;
    info!(
        "Answer sink ready: mode={} backup={}",
        sink.mode(),
        sink.backup_location()
    );

    let event_bus = Arc::new(EventBus::new());
    let audit_handle = spawn_audit_logger(&event_bus, 256).await;
    let service = Arc::new(SurveyService::new(Arc::new(sink), Some(Arc::clone(&event_bus))));

    let eb_for_signal = Arc::clone(&event_bus);
    let _signal_handle = tokio::spawn(async move {
        wait_for_signal().await;
        eb_for_signal
            .publish(BotEvent::SystemMessage("shutdown requested".into()))
            .await;
        info!("Shutting down event bus...");
        eb_for_signal.shutdown();
    });

    let mut telegram = TelegramPlatform::new(token, service, Arc::clone(&event_bus));
    if let Err(e) = telegram.connect().await {
        error!("Telegram connection failed: {e}");
        event_bus.shutdown();
        let _ = audit_handle.await;
        return Err(e.into());
    }
    match telegram.get_connection_status().await {
        Ok(status) => info!("Telegram status: {:?}", status),
        Err(e) => warn!("Telegram status unavailable => {e}"),
    }

    event_bus
        .publish(BotEvent::SystemMessage("bot started".into()))
        .await;
    telegram.run().await?;
    telegram.disconnect().await?;

    match audit_handle.await {
        Ok(summary) => info!(
            "Session totals: started={} stored={} saved_locally={} cancelled={}",
            summary.started, summary.stored, summary.saved_locally, summary.cancelled
        ),
        Err(e) => error!("Audit logger task failed: {e}"),
    }
    info!("Main finished. Goodbye!");
    Ok(())
}
