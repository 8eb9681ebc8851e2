//! Player-facing message log, owned by the game session.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

const DEFAULT_CAPACITY: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Info,
    Success,
    Failure,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    /// Game day the message was logged on.
    pub day: u32,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            MessageKind::Info => "",
            MessageKind::Success => "+ ",
            MessageKind::Failure => "- ",
            MessageKind::Warning => "! ",
        };
        write!(f, "{}{}", marker, self.text)
    }
}

/// Bounded log; the oldest messages drop off once it is full.
#[derive(Clone, Debug)]
pub struct MessageLog {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, kind: MessageKind, text: impl Into<String>, day: u32) {
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(Message {
            kind,
            text: text.into(),
            day,
        });
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }

    /// The `n` most recent messages, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Message> {
        self.messages.iter().skip(self.messages.len().saturating_sub(n))
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded() {
        let mut log = MessageLog::with_capacity(3);
        for i in 0..5 {
            log.push(MessageKind::Info, format!("message {i}"), 1);
        }
        assert_eq!(log.len(), 3);
        let texts: Vec<_> = log.recent(2).map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["message 3", "message 4"]);
    }

    #[test]
    fn test_display_marks_kind() {
        let mut log = MessageLog::new();
        log.push(MessageKind::Failure, "The lock holds.", 2);
        assert_eq!(log.last().unwrap().to_string(), "- The lock holds.");
    }
}
