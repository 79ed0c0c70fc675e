use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use regex::Regex;

use crate::handler::Handler;
use crate::platform::{Attachment, IncomingEvent};

/// A set of accepted texts that can change at runtime (e.g. catalog categories).
#[derive(Debug, Default)]
pub struct TextSet {
    inner: RwLock<BTreeSet<String>>,
}

impl TextSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace<I>(&self, items: I)
    where
        I: IntoIterator<Item = String>,
    {
        if let Ok(mut guard) = self.inner.write() {
            *guard = items.into_iter().collect();
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.inner
            .read()
            .map(|guard| guard.contains(text))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How a route recognises its events
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Prefix character followed by this exact (case-sensitive) name
    Command(String),
    /// Whole text equal to the literal, ignoring case
    Text(String),
    /// Regex over the message text
    TextPattern(Regex),
    /// Regex over a callback payload
    CallbackPattern(Regex),
    /// Whole text is a member of the set
    TextIn(Arc<TextSet>),
}

/// A command token split out of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub name: &'a str,
    /// `@botname` suffix, if present
    pub mention: Option<&'a str>,
    /// Everything after the command token
    pub rest: &'a str,
}

/// Split `/name@bot rest of text` into its parts.
pub fn parse_command(text: &str, prefix: char) -> Option<ParsedCommand<'_>> {
    let body = text.strip_prefix(prefix)?;
    let (token, rest) = match body.find(char::is_whitespace) {
        Some(pos) => (&body[..pos], body[pos..].trim()),
        None => (body, ""),
    };
    let (name, mention) = match token.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (token, None),
    };
    if name.is_empty() {
        return None;
    }
    Some(ParsedCommand {
        name,
        mention,
        rest,
    })
}

/// Whitespace-separated arguments following a command token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    tokens: Vec<String>,
}

impl CommandArgs {
    pub fn parse(raw: &str) -> Self {
        Self {
            tokens: raw.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.tokens.len()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Tokens re-joined with single spaces
    pub fn joined(&self) -> String {
        self.tokens.join(" ")
    }
}

/// An event bound to the route that accepted it
#[derive(Debug, Clone)]
pub struct Call {
    pub route: &'static str,
    pub event: IncomingEvent,
    pub args: CommandArgs,
}

impl Call {
    pub fn text(&self) -> Option<&str> {
        match &self.event {
            IncomingEvent::Text(msg) => msg.text.as_deref(),
            IncomingEvent::Callback(_) => None,
        }
    }

    pub fn payload(&self) -> Option<&str> {
        match &self.event {
            IncomingEvent::Callback(cb) => Some(&cb.payload),
            IncomingEvent::Text(_) => None,
        }
    }

    pub fn sender_name(&self) -> &str {
        self.event.sender_name()
    }

    /// Media kind of a text-channel message without text
    pub fn attachment(&self) -> Option<Attachment> {
        match &self.event {
            IncomingEvent::Text(msg) => msg.attachment,
            IncomingEvent::Callback(_) => None,
        }
    }
}

pub struct Route {
    pub name: &'static str,
    pub matcher: Matcher,
    handler: Arc<dyn Handler>,
}

/// Ordered route table; the first matching route wins.
pub struct Router {
    prefix: char,
    bot_username: Option<String>,
    routes: Vec<Route>,
    fallback: Option<Arc<dyn Handler>>,
}

impl Router {
    pub fn new(prefix: char) -> Self {
        Self {
            prefix,
            bot_username: None,
            routes: Vec::new(),
            fallback: None,
        }
    }

    /// Commands addressed `@` to another bot are ignored once this is set.
    pub fn with_bot_username(mut self, username: Option<String>) -> Self {
        self.bot_username = username;
        self
    }

    pub fn route<H>(mut self, name: &'static str, matcher: Matcher, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.routes.push(Route {
            name,
            matcher,
            handler: Arc::new(handler),
        });
        self
    }

    /// Receives text messages no route matched
    pub fn fallback<H>(mut self, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.fallback = Some(Arc::new(handler));
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Pick the handler for an event, or None when the event should be dropped.
    pub fn resolve(&self, event: &IncomingEvent) -> Option<(Arc<dyn Handler>, Call)> {
        let text = match event {
            IncomingEvent::Text(msg) => msg.text.as_deref(),
            IncomingEvent::Callback(_) => None,
        };
        let command = text
            .and_then(|t| parse_command(t, self.prefix))
            .filter(|cmd| self.addressed_to_us(cmd));

        for route in &self.routes {
            let args = match (&route.matcher, event) {
                (Matcher::Command(name), IncomingEvent::Text(_)) => match &command {
                    Some(cmd) if cmd.name == name.as_str() => CommandArgs::parse(cmd.rest),
                    _ => continue,
                },
                (Matcher::Text(literal), IncomingEvent::Text(_)) => match text {
                    Some(t) if t.to_lowercase() == literal.to_lowercase() => CommandArgs::default(),
                    _ => continue,
                },
                (Matcher::TextPattern(re), IncomingEvent::Text(_)) => match text {
                    Some(t) if re.is_match(t) => CommandArgs::default(),
                    _ => continue,
                },
                (Matcher::TextIn(set), IncomingEvent::Text(_)) => match text {
                    Some(t) if set.contains(t) => CommandArgs::default(),
                    _ => continue,
                },
                (Matcher::CallbackPattern(re), IncomingEvent::Callback(cb)) => {
                    if re.is_match(&cb.payload) {
                        CommandArgs::default()
                    } else {
                        continue;
                    }
                }
                _ => continue,
            };
            return Some((
                route.handler.clone(),
                Call {
                    route: route.name,
                    event: event.clone(),
                    args,
                },
            ));
        }

        match (event, &self.fallback) {
            (IncomingEvent::Text(_), Some(handler)) => Some((
                handler.clone(),
                Call {
                    route: "fallback",
                    event: event.clone(),
                    args: CommandArgs::default(),
                },
            )),
            _ => None,
        }
    }

    fn addressed_to_us(&self, cmd: &ParsedCommand<'_>) -> bool {
        match (cmd.mention, &self.bot_username) {
            (Some(mention), Some(ours)) => mention.eq_ignore_ascii_case(ours),
            _ => true,
        }
    }
}

#[cfg(test)]
impl Router {
    /// Resolve and run the matching handler in place.
    pub async fn dispatch(
        &self,
        ctx: &crate::bot::AppContext,
        event: &IncomingEvent,
    ) -> Option<crate::reply::Reply> {
        let (handler, call) = self.resolve(event)?;
        Some(handler.handle(ctx, &call).await)
    }
}
