//! Text formatting for terminal output.

use tutor_core::{Message, MessageRole};

/// Format seconds as `m:ss`. Negative and non-finite input shows `0:00`.
///
/// ```rust
/// use tutor_cli::presentation::format_clock;
///
/// assert_eq!(format_clock(75.4), "1:15");
/// ```
pub fn format_clock(secs: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Truncates a string to at most `max_chars` characters, adding "..." if
/// needed.
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print the conversation with 1-based numbers usable by `/read` and `/save`.
pub fn print_history(messages: &[Message]) {
    if messages.is_empty() {
        println!("(no messages yet)");
        return;
    }
    for (i, message) in messages.iter().enumerate() {
        println!("{}", history_line(i + 1, message));
    }
}

fn history_line(number: usize, message: &Message) -> String {
    let who = match message.role {
        MessageRole::User => "you",
        MessageRole::Assistant => "tutor",
    };
    let audio = message
        .audio()
        .map(|a| format!(" [{}]", format_clock(a.duration_secs())))
        .unwrap_or_default();
    let text = if message.is_typing {
        "...".to_string()
    } else {
        truncate_string(&message.content.replace('\n', " "), 60)
    };
    format!("{number:>3}. {who:>5}{audio}: {text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(9.99), "0:09");
        assert_eq!(format_clock(61.0), "1:01");
        assert_eq!(format_clock(3600.0), "60:00");
        assert_eq!(format_clock(-4.0), "0:00");
        assert_eq!(format_clock(f64::NAN), "0:00");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("ñññññ", 4), "ñ...");
    }

    #[test]
    fn test_history_line() {
        let user = Message::new(MessageRole::User, "What is\nentropy?");
        assert_eq!(history_line(1, &user), "  1.   you: What is entropy?");

        let typing = Message::placeholder();
        assert_eq!(history_line(12, &typing), " 12. tutor: ...");
    }
}
