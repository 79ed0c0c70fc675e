use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, KeyboardButton,
    KeyboardMarkup, MessageId, ParseMode, ReplyMarkup, ReplyParameters,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::{Attachment, CallbackEvent, IncomingEvent, Origin, ReplySink, TextMessage, UpdateSource};
use crate::reply::{ButtonAction, Keyboard, KeyboardKind, Markup, OutgoingReply, Photo, Reply};

/// Telegram rejects captions longer than this
const MAX_CAPTION_CHARS: usize = 1024;
/// Message length limit, counted in UTF-16 code units
const MAX_MESSAGE_UNITS: usize = 4096;
const EVENT_BUFFER: usize = 256;

/// Byte offset of the longest prefix of `text` within `max_units` UTF-16 units.
fn utf16_prefix_end(text: &str, max_units: usize) -> usize {
    let mut units = 0;
    for (offset, c) in text.char_indices() {
        units += c.len_utf16();
        if units > max_units {
            return offset;
        }
    }
    text.len()
}

/// Cut `text` into sendable chunks, preferring line then word breaks.
fn split_message(text: &str, max_units: usize) -> Vec<String> {
    // Any single char fits in two units
    let max_units = max_units.max(2);
    let mut chunks = Vec::new();
    let mut rest = text;

    loop {
        let end = utf16_prefix_end(rest, max_units);
        if end == rest.len() {
            chunks.push(rest.to_string());
            return chunks;
        }
        let window = &rest[..end];
        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .map(|pos| pos + 1)
            .unwrap_or(end);
        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
}

fn truncate_caption(caption: &str) -> String {
    caption.chars().take(MAX_CAPTION_CHARS).collect()
}

fn attachment_of(msg: &Message) -> Option<Attachment> {
    if msg.sticker().is_some() {
        Some(Attachment::Sticker)
    } else if msg.photo().is_some() {
        Some(Attachment::Photo)
    } else if msg.animation().is_some() {
        Some(Attachment::Animation)
    } else if msg.text().is_none() {
        Some(Attachment::Other)
    } else {
        None
    }
}

fn message_event(msg: &Message) -> IncomingEvent {
    IncomingEvent::Text(TextMessage {
        origin: Origin {
            chat_id: msg.chat.id.0,
            message_id: Some(msg.id.0),
        },
        sender_name: msg
            .from
            .as_ref()
            .map(|user| user.full_name())
            .unwrap_or_default(),
        text: msg.text().map(str::to_string),
        attachment: attachment_of(msg),
    })
}

/// Receives updates from a background teloxide dispatcher.
pub struct TelegramSource {
    events: mpsc::Receiver<IncomingEvent>,
}

#[async_trait]
impl UpdateSource for TelegramSource {
    async fn next_event(&mut self) -> Option<IncomingEvent> {
        self.events.recv().await
    }
}

/// Username the bot answers to in `/command@username`
pub async fn bot_username(bot: &Bot) -> Result<Option<String>> {
    let me = bot.get_me().await.context("Failed to query bot identity")?;
    Ok(me.user.username.clone())
}

/// Start long polling in the background and return the event stream.
pub fn start(bot: Bot) -> TelegramSource {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);

    info!("Starting Telegram platform...");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(forward_message))
        .branch(Update::filter_callback_query().endpoint(forward_callback));

    tokio::spawn(async move {
        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![tx])
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd.id);
            })
            .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
        info!("Telegram dispatcher stopped");
    });

    TelegramSource { events: rx }
}

async fn forward_message(msg: Message, tx: mpsc::Sender<IncomingEvent>) -> ResponseResult<()> {
    if tx.send(message_event(&msg)).await.is_err() {
        warn!("Dropping message from chat {}: event loop closed", msg.chat.id);
    }
    Ok(())
}

async fn forward_callback(
    bot: Bot,
    q: CallbackQuery,
    tx: mpsc::Sender<IncomingEvent>,
) -> ResponseResult<()> {
    // Stop the client's loading spinner regardless of what the payload does
    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(payload), Some(message)) = (q.data.clone(), q.message.as_ref()) else {
        return Ok(());
    };

    let event = IncomingEvent::Callback(CallbackEvent {
        origin: Origin {
            chat_id: message.chat().id.0,
            message_id: Some(message.id().0),
        },
        sender_name: q.from.full_name(),
        payload,
    });
    if tx.send(event).await.is_err() {
        warn!("Dropping callback: event loop closed");
    }
    Ok(())
}

/// Request buttons whose payload shape follows the Bot API revision teloxide targets
fn request_button(label: &str, request: serde_json::Value) -> Result<KeyboardButton> {
    let mut button = serde_json::json!({ "text": label });
    if let (Some(target), Some(extra)) = (button.as_object_mut(), request.as_object()) {
        target.extend(extra.clone());
    }
    serde_json::from_value(button)
        .with_context(|| format!("Unsupported request button: {}", label))
}

fn reply_button(label: &str, action: &ButtonAction) -> Result<KeyboardButton> {
    let button = KeyboardButton::new(label);
    Ok(match action {
        ButtonAction::Send => button,
        ButtonAction::RequestLocation => button.request(ButtonRequest::Location),
        ButtonAction::RequestContact => button.request(ButtonRequest::Contact),
        ButtonAction::RequestPoll => request_button(
            label,
            serde_json::json!({ "request_poll": { "type": "regular" } }),
        )?,
        ButtonAction::RequestUser {
            request_id,
            premium,
        } => {
            let mut users = serde_json::json!({ "request_id": request_id });
            if let Some(premium) = premium {
                users["user_is_premium"] = serde_json::json!(premium);
            }
            request_button(label, serde_json::json!({ "request_users": users }))?
        }
        ButtonAction::RequestChat {
            request_id,
            is_channel,
            is_forum,
        } => {
            let mut chat = serde_json::json!({
                "request_id": request_id,
                "chat_is_channel": is_channel,
            });
            if let Some(is_forum) = is_forum {
                chat["chat_is_forum"] = serde_json::json!(is_forum);
            }
            request_button(label, serde_json::json!({ "request_chat": chat }))?
        }
        ButtonAction::Callback(_) | ButtonAction::Url(_) => {
            anyhow::bail!("Button '{}' only works on inline keyboards", label)
        }
    })
}

fn inline_button(label: &str, action: &ButtonAction) -> Result<InlineKeyboardButton> {
    match action {
        ButtonAction::Callback(payload) => Ok(InlineKeyboardButton::callback(label, payload)),
        ButtonAction::Url(url) => {
            let url = reqwest::Url::parse(url)
                .with_context(|| format!("Invalid button url: {}", url))?;
            Ok(InlineKeyboardButton::url(label, url))
        }
        _ => anyhow::bail!("Button '{}' only works on reply keyboards", label),
    }
}

fn to_markup(keyboard: &Keyboard) -> Result<ReplyMarkup> {
    match &keyboard.kind {
        KeyboardKind::Inline => {
            let rows = keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| inline_button(&b.label, &b.action))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(InlineKeyboardMarkup::new(rows).into())
        }
        KeyboardKind::Reply {
            resize,
            placeholder,
        } => {
            let rows = keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| reply_button(&b.label, &b.action))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()?;
            let mut markup = KeyboardMarkup::new(rows);
            if *resize {
                markup = markup.resize_keyboard();
            }
            if let Some(placeholder) = placeholder {
                markup = markup.input_field_placeholder(placeholder.clone());
            }
            Ok(markup.into())
        }
    }
}

/// Sends replies through the Bot API
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        photo: &Photo,
        quote: Option<&ReplyParameters>,
    ) -> Result<()> {
        let url = reqwest::Url::parse(&photo.url)
            .with_context(|| format!("Invalid photo url: {}", photo.url))?;
        let mut request = self.bot.send_photo(chat, InputFile::url(url));
        if let Some(caption) = &photo.caption {
            request = request.caption(truncate_caption(caption));
        }
        if let Some(params) = quote {
            request = request.reply_parameters(params.clone());
        }
        request.await.context("Failed to send photo")?;
        Ok(())
    }
}

#[async_trait]
impl ReplySink for TelegramSink {
    async fn send(&self, to: Origin, reply: Reply) -> Result<()> {
        let chat = ChatId(to.chat_id);
        let quote = if reply.quote {
            to.message_id.map(|id| ReplyParameters::new(MessageId(id)))
        } else {
            None
        };

        match reply.body {
            OutgoingReply::Text(text) => {
                for chunk in split_message(&text, MAX_MESSAGE_UNITS) {
                    let mut request = self.bot.send_message(chat, chunk);
                    if let Some(params) = &quote {
                        request = request.reply_parameters(params.clone());
                    }
                    request.await.context("Failed to send message")?;
                }
            }
            OutgoingReply::Formatted { text, markup } => {
                let mode = match markup {
                    Markup::Html => ParseMode::Html,
                };
                let mut request = self.bot.send_message(chat, text).parse_mode(mode);
                if let Some(params) = &quote {
                    request = request.reply_parameters(params.clone());
                }
                request.await.context("Failed to send formatted message")?;
            }
            OutgoingReply::Photo(photo) => {
                self.send_photo(chat, &photo, quote.as_ref()).await?;
            }
            OutgoingReply::Photos(photos) => {
                for photo in &photos {
                    if let Err(e) = self.send_photo(chat, photo, quote.as_ref()).await {
                        error!("Skipping photo {}: {:#}", photo.url, e);
                    }
                }
            }
            OutgoingReply::Keyboard { text, keyboard } => {
                let mut request = self
                    .bot
                    .send_message(chat, text)
                    .reply_markup(to_markup(&keyboard)?);
                if let Some(params) = &quote {
                    request = request.reply_parameters(params.clone());
                }
                request.await.context("Failed to send keyboard")?;
            }
            OutgoingReply::CopyOriginal => {
                let message_id = to
                    .message_id
                    .context("Nothing to copy: event has no message")?;
                self.bot
                    .copy_message(chat, chat, MessageId(message_id))
                    .await
                    .context("Failed to copy message")?;
            }
        }

        Ok(())
    }
}
