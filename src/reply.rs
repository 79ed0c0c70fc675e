/// Reply sent when a handler fails for any reason other than bad arguments.
pub const GENERIC_FAILURE: &str = "an error occurred.";

/// Markup language of a formatted text reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Html,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    /// Public URL of the image
    pub url: String,
    pub caption: Option<String>,
}

/// What a button does when pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    /// Sends the label back as a plain text message (reply keyboards)
    Send,
    /// Emits a callback event carrying the payload (inline keyboards)
    Callback(String),
    Url(String),
    RequestLocation,
    RequestContact,
    RequestPoll,
    RequestUser {
        request_id: i32,
        premium: Option<bool>,
    },
    RequestChat {
        request_id: i32,
        is_channel: bool,
        is_forum: Option<bool>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn send(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Send,
        }
    }

    pub fn callback(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(payload.into()),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    pub fn request(label: impl Into<String>, action: ButtonAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyboardKind {
    /// Replaces the user's keyboard until dismissed
    Reply {
        resize: bool,
        placeholder: Option<String>,
    },
    /// Attached to the message itself
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub kind: KeyboardKind,
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// Resized reply keyboard with the given rows
    pub fn reply(rows: Vec<Vec<Button>>) -> Self {
        Self {
            kind: KeyboardKind::Reply {
                resize: true,
                placeholder: None,
            },
            rows,
        }
    }

    pub fn inline(rows: Vec<Vec<Button>>) -> Self {
        Self {
            kind: KeyboardKind::Inline,
            rows,
        }
    }

    /// Arrange a flat list of buttons into rows of `width` (last row may be shorter).
    pub fn grid(buttons: Vec<Button>, width: usize) -> Vec<Vec<Button>> {
        let width = width.max(1);
        let mut rows = Vec::with_capacity(buttons.len().div_ceil(width));
        let mut row = Vec::with_capacity(width);
        for button in buttons {
            row.push(button);
            if row.len() == width {
                rows.push(std::mem::replace(&mut row, Vec::with_capacity(width)));
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
        rows
    }

    pub fn with_placeholder(mut self, text: impl Into<String>) -> Self {
        if let KeyboardKind::Reply { placeholder, .. } = &mut self.kind {
            *placeholder = Some(text.into());
        }
        self
    }
}

#[cfg(test)]
impl Keyboard {
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingReply {
    Text(String),
    Formatted { text: String, markup: Markup },
    Photo(Photo),
    /// Several photos delivered in order as one logical reply
    Photos(Vec<Photo>),
    Keyboard { text: String, keyboard: Keyboard },
    /// Re-send the originating message as-is
    CopyOriginal,
}

/// One handler's answer to one event
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub body: OutgoingReply,
    /// Deliver as a reply to the originating message
    pub quote: bool,
}

impl Reply {
    fn new(body: OutgoingReply) -> Self {
        Self { body, quote: false }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(OutgoingReply::Text(text.into()))
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self::new(OutgoingReply::Formatted {
            text: text.into(),
            markup: Markup::Html,
        })
    }

    pub fn photo(photo: Photo) -> Self {
        Self::new(OutgoingReply::Photo(photo))
    }

    pub fn photos(photos: Vec<Photo>) -> Self {
        Self::new(OutgoingReply::Photos(photos))
    }

    pub fn keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::new(OutgoingReply::Keyboard {
            text: text.into(),
            keyboard,
        })
    }

    pub fn copy_original() -> Self {
        Self::new(OutgoingReply::CopyOriginal)
    }

    pub fn failure() -> Self {
        Self::text(GENERIC_FAILURE).quoted()
    }

    pub fn quoted(mut self) -> Self {
        self.quote = true;
        self
    }
}

#[cfg(test)]
impl Reply {
    /// Text of a plain or formatted reply
    pub fn as_text(&self) -> Option<&str> {
        match &self.body {
            OutgoingReply::Text(text) | OutgoingReply::Formatted { text, .. } => Some(text),
            OutgoingReply::Keyboard { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(&self.body, OutgoingReply::Text(text) if text == GENERIC_FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<Button> {
        (1..=n).map(|i| Button::send(i.to_string())).collect()
    }

    #[test]
    fn test_grid_even_split() {
        let rows = Keyboard::grid(labels(16), 4);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.len() == 4));
    }

    #[test]
    fn test_grid_short_last_row() {
        let rows = Keyboard::grid(labels(5), 2);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].len(), 1);
        assert_eq!(rows[2][0].label, "5");
    }

    #[test]
    fn test_grid_zero_width_is_one_per_row() {
        let rows = Keyboard::grid(labels(3), 0);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_placeholder_ignored_for_inline() {
        let kb = Keyboard::inline(vec![]).with_placeholder("x");
        assert_eq!(kb.kind, KeyboardKind::Inline);
    }

    #[test]
    fn test_failure_is_quoted() {
        let reply = Reply::failure();
        assert!(reply.quote);
        assert!(reply.is_failure());
        assert_eq!(reply.as_text(), Some(GENERIC_FAILURE));
    }
}
