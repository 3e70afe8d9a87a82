//! Text preprocessing for speech synthesis.

/// Characters that carry markdown formatting and should never be voiced.
const FORMATTING_CHARS: [char; 4] = ['*', '#', '_', '`'];

/// Strip markdown emphasis, heading and code markers so the synthesizer does
/// not read them aloud. Whitespace runs left behind are collapsed.
#[must_use]
pub fn clean_for_speech(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !FORMATTING_CHARS.contains(c)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
