/// Rough characters-per-token ratio used to express budgets in characters.
pub const CHARS_PER_TOKEN: usize = 4;

pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Convert a token budget into the character budget `prepare` works with.
pub fn tokens_to_chars(tokens: usize) -> usize {
    tokens.saturating_mul(CHARS_PER_TOKEN)
}

/// Bound `raw_prompt` to `max_chars` characters.
///
/// Input within budget comes back untouched. Longer input is cut to its first
/// `max_chars` characters and then loses any trailing whitespace; leading
/// whitespace inside the window is kept.
pub fn prepare(raw_prompt: &str, max_chars: usize) -> String {
    match raw_prompt.char_indices().nth(max_chars) {
        None => raw_prompt.to_owned(),
        Some((cut, _)) => raw_prompt[..cut].trim_end().to_owned(),
    }
}

/// Bound `raw_prompt` and pair it with the system instructions it is sent under.
pub fn commit_message_prompt(
    raw_prompt: &str,
    max_chars: usize,
    system_instructions: &str,
) -> PromptPair {
    let user = prepare(raw_prompt, max_chars);

    if user.len() != raw_prompt.len() {
        log::debug!(
            "Prompt truncated from {} to {} chars (budget {})",
            raw_prompt.chars().count(),
            user.chars().count(),
            max_chars
        );
    }

    PromptPair {
        system: system_instructions.to_owned(),
        user,
    }
}
