
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[inline]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[inline]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[inline]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[inline]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// How much of the transcript is sent with each completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HistoryPolicy {
    /// Every message of the session
    #[default]
    Full,
    /// System messages plus the most recent `max_messages` other messages
    Window { max_messages: usize },
}

/// Append-only transcript of one chat session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation with a leading system instruction
    #[inline]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    #[inline]
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages to send for the next completion: the transcript followed by
    /// `pending`, trimmed according to `policy`. The transcript is unchanged.
    #[inline]
    pub fn request_messages(&self, policy: HistoryPolicy, pending: &Message) -> Vec<Message> {
        let all = self.messages.iter().chain(std::iter::once(pending));

        match policy {
            HistoryPolicy::Full => all.cloned().collect(),
            HistoryPolicy::Window { max_messages } => {
                let turns = self
                    .messages
                    .iter()
                    .filter(|m| m.role != Role::System)
                    .count()
                    + 1;
                let skip = turns.saturating_sub(max_messages);

                let mut seen = 0;
                all.filter(|m| {
                    if m.role == Role::System {
                        return true;
                    }
                    seen += 1;
                    seen > skip
                })
                .cloned()
                .collect()
            }
        }
    }
}
