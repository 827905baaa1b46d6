//! Telegram adapter built on teloxide.
//!
//! Decodes each update into the closed [`InboundEvent`] set exactly once at
//! this boundary (commands, callback buttons, media messages), enforces the
//! allow-list, and implements [`Transport`] so the engine can reply and
//! replay through the Bot API. Replay uses `copyMessage` into the same chat,
//! which preserves the original content without touching file bytes.

use crate::copy;
use crate::engine::CaptureEngine;
use crate::error::{Result, TransportError, TransportResult};
use crate::events::{FileEvent, InboundEvent, MediaKind, MessageRef};
use crate::session::SessionKey;
use crate::transport::{MessageFormat, Transport};
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, MediaKind as TgMediaKind, MessageId, MessageKind,
    ParseMode,
};
use tracing::{debug, error, info};
use url::Url;

/// Telegram channel configuration.
#[derive(Debug, Clone)]
pub struct TelegramChannelConfig {
    /// Bot token from @BotFather.
    pub token: String,
    /// Allowed user IDs. Empty means allow all (dev-friendly).
    pub allowed_users: Vec<i64>,
    /// Handle offered in the access-denied reply.
    pub contact_handle: Option<String>,
}

impl TelegramChannelConfig {
    /// Create a new Telegram channel config with the given token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            allowed_users: Vec::new(),
            contact_handle: None,
        }
    }

    /// Add an allowed user ID.
    #[must_use]
    pub fn allow_user(mut self, user_id: i64) -> Self {
        self.allowed_users.push(user_id);
        self
    }

    /// Add multiple allowed user IDs.
    #[must_use]
    pub fn allow_users(mut self, user_ids: impl IntoIterator<Item = i64>) -> Self {
        self.allowed_users.extend(user_ids);
        self
    }

    /// Set the contact handle for the access-denied reply.
    #[must_use]
    pub fn contact_handle(mut self, handle: impl Into<String>) -> Self {
        self.contact_handle = Some(handle.into());
        self
    }

    /// Check if a user is allowed.
    #[must_use]
    pub fn is_user_allowed(&self, user_id: i64) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.contains(&user_id)
    }
}

/// [`Transport`] implementation backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport").finish_non_exhaustive()
    }
}

impl TelegramTransport {
    /// Create a transport over an existing bot handle.
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn reply_text(
        &self,
        chat_id: i64,
        text: &str,
        format: MessageFormat,
    ) -> TransportResult<()> {
        let request = self.bot.send_message(ChatId(chat_id), text);
        let result = match format {
            MessageFormat::Markdown => request.parse_mode(ParseMode::Markdown).await,
            MessageFormat::Plain => request.await,
        };
        result.map_err(|e| TransportError::send(e.to_string()))?;
        Ok(())
    }

    async fn replay_message(&self, chat_id: i64, reference: MessageRef) -> TransportResult<()> {
        let message_id = i32::try_from(reference.0)
            .map(MessageId)
            .map_err(|_| TransportError::InvalidReference(reference.to_string()))?;
        let chat = ChatId(chat_id);

        self.bot
            .copy_message(chat, chat, message_id)
            .await
            .map_err(|e| TransportError::replay(e.to_string()))?;
        Ok(())
    }
}

/// Bot commands understood at this boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Welcome message with CTA buttons.
    Start,
    /// Quick guide.
    Help,
    /// Open a capture session.
    First,
    /// Finish: sort and forward.
    Last,
    /// Abort the session.
    Cancel,
    /// Echo the sender's user ID.
    Whoami,
}

/// Parse a leading `/command`, tolerating `/command@BotName` suffixes.
fn parse_command(text: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let command = first.strip_prefix('/')?;
    let command = command.split('@').next().unwrap_or(command);
    match command {
        "start" => Some(Command::Start),
        "help" => Some(Command::Help),
        "first" => Some(Command::First),
        "last" => Some(Command::Last),
        "cancel" => Some(Command::Cancel),
        "whoami" => Some(Command::Whoami),
        _ => None,
    }
}

/// Map a media message onto a [`FileEvent`], deciding name/caption once.
fn decode_file(msg: &Message) -> Option<FileEvent> {
    let MessageKind::Common(common) = &msg.kind else {
        return None;
    };
    #[allow(clippy::cast_possible_wrap)] // User ID won't exceed i64 max
    let user_id = msg.from.as_ref()?.id.0 as i64;

    let (kind, file_name, caption) = match &common.media_kind {
        TgMediaKind::Document(m) => (
            MediaKind::Document,
            m.document.file_name.clone(),
            m.caption.clone(),
        ),
        TgMediaKind::Photo(m) => (MediaKind::Photo, None, m.caption.clone()),
        TgMediaKind::Video(m) => (
            MediaKind::Video,
            m.video.file_name.clone(),
            m.caption.clone(),
        ),
        TgMediaKind::Audio(m) => (
            MediaKind::Audio,
            m.audio.file_name.clone(),
            m.caption.clone(),
        ),
        TgMediaKind::Voice(m) => (MediaKind::Voice, None, m.caption.clone()),
        TgMediaKind::Animation(m) => (
            MediaKind::Animation,
            m.animation.file_name.clone(),
            m.caption.clone(),
        ),
        _ => return None,
    };

    let mut event = FileEvent::new(
        SessionKey::new(msg.chat.id.0, user_id),
        MessageRef(i64::from(msg.id.0)),
        kind,
    )
    .with_timestamp(msg.date);
    event.file_name = file_name;
    event.caption = caption;
    Some(event)
}

async fn run_engine(engine: &CaptureEngine<TelegramTransport>, event: InboundEvent) {
    let key = event.key();
    if let Err(e) = engine.handle(event).await {
        error!(%key, error = %e, "engine failed to handle event");
    }
}

async fn send_markdown(bot: &Bot, chat: ChatId, text: &str) {
    if let Err(e) = bot
        .send_message(chat, text)
        .parse_mode(ParseMode::Markdown)
        .await
    {
        error!(error = %e, "failed to send telegram message");
    }
}

async fn send_welcome(bot: &Bot, chat: ChatId) {
    let keyboard = InlineKeyboardMarkup::new([[
        InlineKeyboardButton::callback("Start Sorting", "cta_first"),
        InlineKeyboardButton::callback("How to Use", "cta_help"),
    ]]);
    if let Err(e) = bot
        .send_message(chat, copy::welcome())
        .parse_mode(ParseMode::Markdown)
        .reply_markup(keyboard)
        .await
    {
        error!(error = %e, "failed to send welcome message");
    }
}

async fn send_denied(bot: &Bot, chat: ChatId, contact_handle: Option<&str>) {
    let Some(handle) = contact_handle else {
        send_markdown(bot, chat, copy::DENIED).await;
        return;
    };

    let request = bot
        .send_message(chat, copy::denied(handle))
        .parse_mode(ParseMode::Markdown);
    let result = match Url::parse(&format!("https://t.me/{handle}")) {
        Ok(link) => {
            let keyboard = InlineKeyboardMarkup::new([[InlineKeyboardButton::url(
                format!("Contact @{handle}"),
                link,
            )]]);
            request.reply_markup(keyboard).await
        }
        Err(_) => request.await,
    };
    if let Err(e) = result {
        debug!(error = %e, "failed to send denied message");
    }
}

async fn dispatch_command(
    bot: &Bot,
    engine: &CaptureEngine<TelegramTransport>,
    command: Command,
    key: SessionKey,
) {
    let chat = ChatId(key.chat_id);
    match command {
        Command::Start => send_welcome(bot, chat).await,
        Command::Help => send_markdown(bot, chat, &copy::help_with_footer()).await,
        Command::Whoami => send_markdown(bot, chat, &copy::whoami(key.user_id)).await,
        Command::First => run_engine(engine, InboundEvent::StartSession(key)).await,
        Command::Last => run_engine(engine, InboundEvent::Finish(key)).await,
        Command::Cancel => run_engine(engine, InboundEvent::Abort(key)).await,
    }
}

/// Telegram channel: owns the dispatcher and feeds the engine.
pub struct TelegramChannel {
    bot: Bot,
    config: TelegramChannelConfig,
    engine: Arc<CaptureEngine<TelegramTransport>>,
}

impl std::fmt::Debug for TelegramChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TelegramChannel {
    /// Create a channel over an existing bot handle and engine.
    #[must_use]
    pub fn new(
        bot: Bot,
        config: TelegramChannelConfig,
        engine: Arc<CaptureEngine<TelegramTransport>>,
    ) -> Self {
        Self {
            bot,
            config,
            engine,
        }
    }

    /// Run the dispatcher until shutdown (ctrl-c).
    pub async fn run(self) -> Result<()> {
        let Self {
            bot,
            config,
            engine,
        } = self;
        let config = Arc::new(config);

        let msg_engine = Arc::clone(&engine);
        let msg_config = Arc::clone(&config);
        let message_handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
            let engine = Arc::clone(&msg_engine);
            let config = Arc::clone(&msg_config);

            async move {
                let Some(user) = msg.from.as_ref() else {
                    return Ok::<(), teloxide::RequestError>(());
                };
                #[allow(clippy::cast_possible_wrap)] // User ID won't exceed i64 max
                let user_id = user.id.0 as i64;

                if !config.is_user_allowed(user_id) {
                    debug!(user_id, chat_id = msg.chat.id.0, "unauthorized user");
                    send_denied(&bot, msg.chat.id, config.contact_handle.as_deref()).await;
                    return Ok(());
                }

                let key = SessionKey::new(msg.chat.id.0, user_id);
                if let Some(text) = msg.text() {
                    if let Some(command) = parse_command(text) {
                        dispatch_command(&bot, &engine, command, key).await;
                    }
                    return Ok(());
                }

                if let Some(event) = decode_file(&msg) {
                    if let Err(e) = engine.handle(InboundEvent::FileUploaded(event)).await {
                        error!(%key, error = %e, "failed to collect media");
                        let _ = bot.send_message(msg.chat.id, copy::ERROR_GENERIC).await;
                    }
                }

                Ok(())
            }
        });

        let cb_engine = Arc::clone(&engine);
        let cb_config = Arc::clone(&config);
        let callback_handler =
            Update::filter_callback_query().endpoint(move |bot: Bot, query: CallbackQuery| {
                let engine = Arc::clone(&cb_engine);
                let config = Arc::clone(&cb_config);

                async move {
                    let Some(data) = query.data.clone() else {
                        return Ok::<(), teloxide::RequestError>(());
                    };

                    // Answer first so the button loses its loading state.
                    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                        debug!(error = %e, "failed to answer callback query");
                    }

                    #[allow(clippy::cast_possible_wrap)] // User ID won't exceed i64 max
                    let user_id = query.from.id.0 as i64;
                    if !config.is_user_allowed(user_id) {
                        return Ok(());
                    }
                    let Some(message) = query.message.as_ref() else {
                        return Ok(());
                    };
                    let chat = message.chat().id;

                    match data.as_str() {
                        "cta_first" => {
                            let key = SessionKey::new(chat.0, user_id);
                            run_engine(&engine, InboundEvent::StartSession(key)).await;
                        }
                        "cta_help" => send_markdown(&bot, chat, &copy::help_with_footer()).await,
                        _ => {}
                    }

                    Ok(())
                }
            });

        let handler = dptree::entry()
            .branch(message_handler)
            .branch(callback_handler);

        let mut dispatcher = Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build();

        info!("telegram channel started");
        dispatcher.dispatch().await;
        info!("telegram channel stopped");

        Ok(())
    }
}
