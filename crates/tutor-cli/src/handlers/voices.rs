//! Voices command handler.

use tutor_core::VoicePersona;

/// Print every voice persona, marking the active one.
pub fn execute(current: VoicePersona) {
    println!("Available voices:");
    for line in voice_lines(current) {
        println!("{line}");
    }
}

fn voice_lines(current: VoicePersona) -> Vec<String> {
    VoicePersona::ALL
        .iter()
        .map(|voice| {
            let marker = if *voice == current { "*" } else { " " };
            format!(" {marker} {voice}")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_voice_is_marked() {
        let lines = voice_lines(VoicePersona::Kore);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "   Puck");
        assert_eq!(lines[2], " * Kore");
    }
}
