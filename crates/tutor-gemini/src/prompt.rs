//! System instruction for tutor replies.

use tutor_core::UserGoals;

/// Build the tutor's system instruction from the learner's goals.
pub fn system_instruction(goals: &UserGoals) -> String {
    let objectives = non_blank(&goals.objectives).unwrap_or("General learning");
    let knowledge = non_blank(&goals.knowledge_base).unwrap_or("None provided");

    format!(
        "You are an expert study companion.\n\
         Your goal is to help the user learn efficiently.\n\
         \n\
         User's Learning Objectives: {objectives}\n\
         User's Knowledge Base/Context: {knowledge}\n\
         \n\
         Provide clear, concise, and engaging responses.\n\
         Use Markdown for formatting (bold key terms, use lists for steps).\n\
         If the user asks to read text, simply confirm you will read it and then repeat the text formatted for reading.\n\
         Keep responses under 300 words unless asked for more detail."
    )
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goals_are_embedded() {
        let prompt = system_instruction(&UserGoals::new("Pass AP Biology", "Chapter 4 notes"));
        assert!(prompt.contains("User's Learning Objectives: Pass AP Biology"));
        assert!(prompt.contains("User's Knowledge Base/Context: Chapter 4 notes"));
        assert!(prompt.contains("under 300 words"));
    }

    #[test]
    fn test_blank_goals_fall_back() {
        let prompt = system_instruction(&UserGoals::new("  ", ""));
        assert!(prompt.contains("Objectives: General learning"));
        assert!(prompt.contains("Context: None provided"));
    }
}
