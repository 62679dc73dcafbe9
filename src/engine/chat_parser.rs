use std::sync::LazyLock;

use regex::Regex;

use crate::model::chat_event::{ChatEvent, ParseResult};
use crate::model::contact::ContactRoster;

// [VIEWERS: 1234], 시청자: 50명, [현재 시청자 80]
static VIEWER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\[?(?:VIEWERS?|시청자(?:수)?|현재\s*시청자)\s*[:\s]\s*([0-9]+)\s*(?:명)?\]?")
        .expect("viewer marker pattern")
});

// [name] donated ₩5,000: message
static DONATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\[?([^\]:\[]+?)\]?\s*(?:donated|후원|도네이션|도네|💎)\s*[₩$€¥£]?\s*([0-9,]+)\s*(?:원|달러|엔|유로|파운드|[₩$€¥£])?\s*[:\-]?\s*(.*)$",
    )
    .expect("donation pattern")
});

// [name]: msg, name: msg, **name**: msg, - name: msg
static ATTRIBUTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\s*\*?\*?\[?([^\]:\[\*]+?)\]?\*?\*?\s*:\s*(.+)$").expect("chat pattern")
});

const QUOTES: [char; 6] = ['"', '\'', '“', '”', '‘', '’'];

/// Turns one block of generated viewer chat into typed events.
///
/// Never fails: lines that match nothing are dropped. The first viewer
/// marker in the block sets the count; later markers are consumed silently.
pub fn parse_viewer_chat(raw: &str, roster: &ContactRoster) -> ParseResult {
    let mut result = ParseResult::default();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("---") || line.starts_with("===") {
            continue;
        }

        if let Some(caps) = VIEWER_MARKER.captures(line) {
            if result.viewer_count.is_none() {
                result.viewer_count = caps[1].parse().ok();
            }
            continue;
        }

        if let Some(caps) = DONATION.captures(line) {
            // a marker-shaped line with an unusable amount is not chat either
            if let Some(event) = donation(&caps[1], &caps[2], &caps[3]) {
                result.events.push(event);
            } else {
                tracing::trace!(line, "dropped donation with unusable amount");
            }
            continue;
        }

        if let Some(caps) = ATTRIBUTED.captures(line) {
            let username = caps[1].trim();
            let message = strip_quotes(&caps[2]);
            if username.is_empty() || message.is_empty() {
                tracing::trace!(line, "dropped empty chat line");
                continue;
            }

            let (username, message) = (username.to_string(), message.to_string());
            result.events.push(if roster.is_contact(&username) {
                ChatEvent::Contact { username, message }
            } else {
                ChatEvent::Chat { username, message }
            });
            continue;
        }

        tracing::trace!(line, "dropped unparseable line");
    }

    result
}

fn donation(username: &str, amount: &str, message: &str) -> Option<ChatEvent> {
    let username = username.trim();
    let amount: u64 = amount.replace(',', "").parse().ok()?;
    if username.is_empty() || amount == 0 {
        return None;
    }

    Some(ChatEvent::Donation {
        username: username.to_string(),
        amount,
        message: strip_quotes(message).to_string(),
    })
}

/// Removes one quote character from each end, then trims.
fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix(QUOTES).unwrap_or(text);
    let text = text.strip_suffix(QUOTES).unwrap_or(text);
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_contacts() -> ContactRoster {
        ContactRoster::default()
    }

    #[test]
    fn viewer_marker_sets_count_and_emits_nothing() {
        let parsed = parse_viewer_chat("[VIEWERS: 1234]\n아무말\n###", &no_contacts());
        assert_eq!(parsed.viewer_count, Some(1234));
        assert!(parsed.events.is_empty());
    }

    #[test]
    fn viewer_marker_variants() {
        for line in ["VIEWERS: 7", "[viewer 7]", "시청자: 7명", "[시청자수: 7]", "현재 시청자: 7"] {
            let parsed = parse_viewer_chat(line, &no_contacts());
            assert_eq!(parsed.viewer_count, Some(7), "{line}");
        }
    }

    #[test]
    fn first_viewer_marker_wins() {
        let parsed = parse_viewer_chat("[VIEWERS: 10]\n[a]: hi\n[VIEWERS: 99]", &no_contacts());
        assert_eq!(parsed.viewer_count, Some(10));
        assert_eq!(parsed.events.len(), 1);
    }

    #[test]
    fn parses_korean_donation() {
        let parsed = parse_viewer_chat("[Alice] donated 5,000원: 화이팅!", &no_contacts());
        assert_eq!(
            parsed.events,
            vec![ChatEvent::Donation {
                username: "Alice".into(),
                amount: 5000,
                message: "화이팅!".into(),
            }]
        );
    }

    #[test]
    fn donation_symbol_and_quotes() {
        let parsed = parse_viewer_chat("[Sam] donated $1,500: \"lol nice\"", &no_contacts());
        assert_eq!(
            parsed.events,
            vec![ChatEvent::Donation {
                username: "Sam".into(),
                amount: 1500,
                message: "lol nice".into(),
            }]
        );

        let parsed = parse_viewer_chat("감자탕조아 후원 10000원", &no_contacts());
        assert_eq!(
            parsed.events,
            vec![ChatEvent::Donation {
                username: "감자탕조아".into(),
                amount: 10000,
                message: String::new(),
            }]
        );
    }

    #[test]
    fn zero_donation_is_dropped() {
        let parsed = parse_viewer_chat("[cheap] donated ₩0: hi", &no_contacts());
        assert!(parsed.events.is_empty());
    }

    #[test]
    fn contact_roster_reclassifies_chat() {
        let roster = ContactRoster::from_names(["Bob"]);
        let parsed = parse_viewer_chat("Bob: 안녕하세요", &roster);
        assert_eq!(
            parsed.events,
            vec![ChatEvent::Contact {
                username: "Bob".into(),
                message: "안녕하세요".into(),
            }]
        );

        let parsed = parse_viewer_chat("Bob: 안녕하세요", &no_contacts());
        assert!(matches!(parsed.events[0], ChatEvent::Chat { .. }));
    }

    #[test]
    fn chat_decorations() {
        let text = "[a]: one\nb: two\n**c**: three\n- d: four";
        let parsed = parse_viewer_chat(text, &no_contacts());
        let names: Vec<&str> = parsed.events.iter().map(|e| e.username()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
        assert_eq!(parsed.events[2].message(), "three");
    }

    #[test]
    fn curly_quotes_are_stripped() {
        let parsed = parse_viewer_chat("[x]: “대박”", &no_contacts());
        assert_eq!(parsed.events[0].message(), "대박");
    }

    #[test]
    fn garbage_is_dropped_in_order() {
        let text = "\n###\n---\n=====\n[a]: first\njust narration\n\n[b] donated 100원\n[c]: last";
        let parsed = parse_viewer_chat(text, &no_contacts());
        let kinds: Vec<&str> = parsed.events.iter().map(|e| e.short_name()).collect();
        assert_eq!(kinds, ["Chat", "Donation", "Chat"]);
        assert_eq!(parsed.events[2].username(), "c");
        assert_eq!(parsed.viewer_count, None);
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse_viewer_chat("", &no_contacts()), ParseResult::default());
    }

    #[test]
    fn marker_takes_precedence_over_chat() {
        // "VIEWERS: 5" also has the `name: msg` shape
        let parsed = parse_viewer_chat("VIEWERS: 5", &no_contacts());
        assert!(parsed.events.is_empty());
        assert_eq!(parsed.viewer_count, Some(5));
    }
}
