use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup};
use teloxide::update_listeners::Polling;
use teloxide::RequestError;
use tracing::{debug, error, info, warn};

use crate::Error;
use crate::eventbus::EventBus;
use crate::platforms::{ConnectionStatus, PlatformIntegration};
use crate::services::{InboundEvent, InboundKind, SurveyService};
use crate::survey::Keyboard;

/// Long-polling Telegram front end for the survey service.
pub struct TelegramPlatform {
    bot: Bot,
    service: Arc<SurveyService>,
    event_bus: Arc<EventBus>,
    connection_status: ConnectionStatus,
}

impl TelegramPlatform {
    pub fn new(token: impl Into<String>, service: Arc<SurveyService>, event_bus: Arc<EventBus>) -> Self {
        Self {
            bot: Bot::new(token),
            service,
            event_bus,
            connection_status: ConnectionStatus::Disconnected,
        }
    }

    /// Polls for updates until the event bus shutdown flag is set.
    /// Updates queued while the bot was offline are dropped.
    pub async fn run(&self) -> Result<(), Error> {
        if self.event_bus.is_shutdown() {
            return Ok(());
        }

        let handler = Update::filter_message().endpoint(on_message);
        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![Arc::clone(&self.service)])
            .default_handler(|upd| async move {
                debug!("(Telegram) ignoring update {:?}", upd.id);
            })
            .build();

        let token = dispatcher.shutdown_token();
        let bus = Arc::clone(&self.event_bus);
        tokio::spawn(async move {
            bus.wait_for_shutdown().await;
            info!("(Telegram) shutdown requested, stopping polling");
            // The dispatcher reports idle until it has started polling.
            for _ in 0..50 {
                match token.shutdown() {
                    Ok(done) => {
                        done.await;
                        return;
                    }
                    Err(_) => tokio::time::sleep(Duration::from_millis(100)).await,
                }
            }
            warn!("(Telegram) dispatcher never became active; giving up on graceful stop");
        });

        let listener = Polling::builder(self.bot.clone())
            .drop_pending_updates()
            .build();

        info!("(Telegram) polling for updates");
        dispatcher
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("(Telegram) update listener error"),
            )
            .await;
        info!("(Telegram) dispatcher stopped");
        Ok(())
    }
}

async fn on_message(bot: Bot, msg: Message, service: Arc<SurveyService>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        debug!("(Telegram) non-text message in chat {} ignored", msg.chat.id);
        return Ok(());
    };

    let event = inbound_from_text(msg.chat.id.0, text);
    if let Some(reply) = service.handle(event).await {
        bot.send_message(msg.chat.id, reply.text)
            .reply_markup(reply_markup(&reply.keyboard))
            .await?;
    }
    Ok(())
}

/// Maps raw message text to an inbound event. Commands may carry a
/// `@botname` suffix; commands other than `/start` and `/cancel` are never answers.
pub fn inbound_from_text(user_id: i64, text: &str) -> InboundEvent {
    let command = text
        .split_whitespace()
        .next()
        .and_then(|word| word.strip_prefix('/'))
        .map(|cmd| cmd.split('@').next().unwrap_or(cmd));

    let kind = match command {
        Some("start") => InboundKind::Start,
        Some("cancel") => InboundKind::Cancel,
        Some(other) if !other.is_empty() => InboundKind::Command(other.to_string()),
        _ => InboundKind::Text(text.to_string()),
    };
    InboundEvent::new(user_id, kind)
}

pub fn reply_markup(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Options(rows) => {
            let buttons: Vec<Vec<KeyboardButton>> = rows
                .iter()
                .map(|row| row.iter().map(KeyboardButton::new).collect())
                .collect();
            ReplyMarkup::Keyboard(KeyboardMarkup::new(buttons).resize_keyboard())
        }
        Keyboard::Remove => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
    }
}

fn platform_error(e: RequestError) -> Error {
    Error::Platform(format!("Telegram request failed: {e}"))
}

#[async_trait]
impl PlatformIntegration for TelegramPlatform {
    /// Verifies the bot token with `getMe`.
    async fn connect(&mut self) -> Result<(), Error> {
        match self.bot.get_me().await {
            Ok(me) => {
                info!("(Telegram) connected as @{}", me.username());
                self.connection_status = ConnectionStatus::Connected;
                Ok(())
            }
            Err(e) => {
                error!("(Telegram) token check failed => {e}");
                self.connection_status = ConnectionStatus::Error(e.to_string());
                Err(platform_error(e))
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), Error> {
        self.event_bus.shutdown();
        self.connection_status = ConnectionStatus::Disconnected;
        Ok(())
    }

    async fn send_message(&self, channel: &str, message: &str) -> Result<(), Error> {
        let chat_id: i64 = channel
            .parse()
            .map_err(|_| Error::Platform(format!("invalid Telegram chat id '{channel}'")))?;
        self.bot
            .send_message(ChatId(chat_id), message)
            .await
            .map_err(platform_error)?;
        Ok(())
    }

    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error> {
        Ok(self.connection_status.clone())
    }
}
