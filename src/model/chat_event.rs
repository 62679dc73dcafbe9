use serde::{Deserialize, Serialize};

use crate::model::currency::Currency;

/// One parsed viewer reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Chat {
        username: String,
        message: String,
    },

    /// A chat line from someone on the contact roster.
    Contact {
        username: String,
        message: String,
    },

    Donation {
        username: String,
        amount: u64,
        #[serde(default)]
        message: String,
    },
}

/// Output of parsing one block of generated text.
/// Kept verbatim in the action history once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub events: Vec<ChatEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer_count: Option<u64>,
}

const DEFAULT_DONATION_MESSAGE: &str = "후원 감사합니다!";

impl ChatEvent {
    pub fn username(&self) -> &str {
        match self {
            ChatEvent::Chat { username, .. }
            | ChatEvent::Contact { username, .. }
            | ChatEvent::Donation { username, .. } => username,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ChatEvent::Chat { message, .. }
            | ChatEvent::Contact { message, .. }
            | ChatEvent::Donation { message, .. } => message,
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            ChatEvent::Chat { .. } => "Chat",
            ChatEvent::Contact { .. } => "Contact",
            ChatEvent::Donation { .. } => "Donation",
        }
    }

    /// Message shown for a donation, falling back to the stock thank-you.
    pub fn display_message(&self) -> &str {
        match self {
            ChatEvent::Donation { message, .. } if message.is_empty() => {
                DEFAULT_DONATION_MESSAGE
            }
            _ => self.message(),
        }
    }

    /// Line appended to the hidden host log for this event.
    pub fn log_line(&self, currency: Currency) -> String {
        match self {
            ChatEvent::Donation { username, amount, .. } => format!(
                "[📺 FLING DONATION] {}님이 {}을 후원하며 메시지를 보냈습니다: {}",
                username,
                currency.format_symbol(*amount),
                self.display_message()
            ),
            ChatEvent::Contact { username, message } => {
                format!("[📺 FLING CONTACT CHAT] {}: {}", username, message)
            }
            ChatEvent::Chat { username, message } => {
                format!("[📺 FLING VIEWER] {}: {}", username, message)
            }
        }
    }
}
