use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use super::{CallbackEvent, IncomingEvent, Origin, ReplySink, TextMessage, UpdateSource};
use crate::reply::{ButtonAction, OutgoingReply, Photo, Reply};

/// Lines starting with this are treated as button presses
const CALLBACK_PREFIX: &str = "!cb ";
const CONSOLE_CHAT: i64 = 0;

/// Reads one event per line, for trying the bot without Telegram.
pub struct ConsoleSource<R> {
    lines: Lines<BufReader<R>>,
    sender_name: String,
    next_message_id: i32,
}

impl ConsoleSource<tokio::io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin(), "console")
    }
}

impl<R: AsyncRead + Unpin> ConsoleSource<R> {
    pub fn new(reader: R, sender_name: impl Into<String>) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            sender_name: sender_name.into(),
            next_message_id: 1,
        }
    }

    fn parse_line(&mut self, line: &str) -> IncomingEvent {
        let origin = Origin {
            chat_id: CONSOLE_CHAT,
            message_id: Some(self.next_message_id),
        };
        self.next_message_id += 1;

        match line.strip_prefix(CALLBACK_PREFIX) {
            Some(payload) => IncomingEvent::Callback(CallbackEvent {
                origin,
                sender_name: self.sender_name.clone(),
                payload: payload.trim().to_string(),
            }),
            None => IncomingEvent::Text(TextMessage {
                origin,
                sender_name: self.sender_name.clone(),
                text: Some(line.to_string()),
                attachment: None,
            }),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> UpdateSource for ConsoleSource<R> {
    async fn next_event(&mut self) -> Option<IncomingEvent> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    tracing::error!("Failed to read console input: {}", e);
                    return None;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(self.parse_line(line.trim_end()));
        }
    }
}

fn describe_action(action: &ButtonAction) -> String {
    match action {
        ButtonAction::Send => String::new(),
        ButtonAction::Callback(payload) => format!(" ({}{})", CALLBACK_PREFIX, payload),
        ButtonAction::Url(url) => format!(" -> {}", url),
        ButtonAction::RequestLocation => " [location]".to_string(),
        ButtonAction::RequestContact => " [contact]".to_string(),
        ButtonAction::RequestPoll => " [poll]".to_string(),
        ButtonAction::RequestUser { .. } => " [user]".to_string(),
        ButtonAction::RequestChat { .. } => " [chat]".to_string(),
    }
}

fn render_photo(photo: &Photo) -> String {
    match &photo.caption {
        Some(caption) => format!("[photo] {}\n{}", photo.url, caption),
        None => format!("[photo] {}", photo.url),
    }
}

/// Plain-text rendering of a reply
pub fn render(reply: &Reply) -> String {
    let mut out = String::new();
    if reply.quote {
        out.push_str("> ");
    }
    match &reply.body {
        OutgoingReply::Text(text) | OutgoingReply::Formatted { text, .. } => out.push_str(text),
        OutgoingReply::Photo(photo) => out.push_str(&render_photo(photo)),
        OutgoingReply::Photos(photos) => {
            let rendered: Vec<String> = photos.iter().map(render_photo).collect();
            out.push_str(&rendered.join("\n"));
        }
        OutgoingReply::Keyboard { text, keyboard } => {
            out.push_str(text);
            for row in &keyboard.rows {
                let cells: Vec<String> = row
                    .iter()
                    .map(|b| format!("[{}{}]", b.label, describe_action(&b.action)))
                    .collect();
                out.push('\n');
                out.push_str(&cells.join(" "));
            }
        }
        OutgoingReply::CopyOriginal => out.push_str("[copy of your message]"),
    }
    out
}

pub struct ConsoleSink;

#[async_trait]
impl ReplySink for ConsoleSink {
    async fn send(&self, _to: Origin, reply: Reply) -> Result<()> {
        println!("{}", render(&reply));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::{Button, Keyboard};

    #[tokio::test]
    async fn test_source_parses_lines() {
        let input: &[u8] = b"/start\n\n!cb 1,10\nhello\n";
        let mut source = ConsoleSource::new(input, "tester");

        match source.next_event().await {
            Some(IncomingEvent::Text(msg)) => {
                assert_eq!(msg.text.as_deref(), Some("/start"));
                assert_eq!(msg.sender_name, "tester");
                assert_eq!(msg.origin.message_id, Some(1));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match source.next_event().await {
            Some(IncomingEvent::Callback(cb)) => {
                assert_eq!(cb.payload, "1,10");
                assert_eq!(cb.origin.message_id, Some(2));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(
            source.next_event().await,
            Some(IncomingEvent::Text(_))
        ));
        assert!(source.next_event().await.is_none());
    }

    #[test]
    fn test_render_keyboard() {
        let reply = Reply::keyboard(
            "press",
            Keyboard::inline(vec![vec![
                Button::callback("generate", "1,10"),
                Button::url("repo", "https://x"),
            ]]),
        );
        assert_eq!(
            render(&reply),
            "press\n[generate (!cb 1,10)] [repo -> https://x]"
        );
    }

    #[test]
    fn test_render_quoted_photos() {
        let reply = Reply::photos(vec![
            Photo {
                url: "https://img/1".into(),
                caption: Some("one".into()),
            },
            Photo {
                url: "https://img/2".into(),
                caption: None,
            },
        ])
        .quoted();
        assert_eq!(
            render(&reply),
            "> [photo] https://img/1\none\n[photo] https://img/2"
        );
    }
}
