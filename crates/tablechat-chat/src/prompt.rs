use tablechat_types::ChatHistory;

/// Instructions placed at the top of every prompt
pub const DEFAULT_INSTRUCTIONS: &str =
    "Consider the uploaded tabular data, respond intelligently to user input";

/// Build the single text prompt sent to the agent: instructions, the full
/// prior history, then the new input.
pub fn build_prompt(instructions: &str, history: &ChatHistory, user_input: &str) -> String {
    format!(
        "{}\nCHAT HISTORY: {}\nUSER INPUT: {}\nAI RESPONSE HERE:",
        instructions,
        history.prompt_transcript(),
        user_input
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prompt_without_history() {
        let prompt = build_prompt(DEFAULT_INSTRUCTIONS, &ChatHistory::new(), "Which month sold most?");
        assert_eq!(
            prompt,
            "Consider the uploaded tabular data, respond intelligently to user input\n\
             CHAT HISTORY: []\n\
             USER INPUT: Which month sold most?\n\
             AI RESPONSE HERE:"
        );
    }

    #[test]
    fn test_prompt_embeds_history_in_order() {
        let history = ChatHistory::new()
            .with_exchange("rows?", "3")
            .with_exchange("columns?", "2");
        let prompt = build_prompt("Be brief", &history, "sum of b?");

        assert!(prompt.starts_with("Be brief\n"));
        assert!(prompt.contains("CHAT HISTORY: [USER: rows?, AI: 3, USER: columns?, AI: 2]\n"));
        assert!(prompt.ends_with("USER INPUT: sum of b?\nAI RESPONSE HERE:"));
    }
}
