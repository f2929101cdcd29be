//! Prompts compiled into the binary.

use crate::types::PromptDefinition;

/// Identifier of the grounded bullet-point answer prompt.
pub const ANSWER_PROMPT_ID: &str = "healthcare.answer";

const ANSWER_TEMPLATE: &str = "\
You are a professional healthcare assistant.

Answer the question ONLY using the context below.
Format the answer as clear step-by-step bullet points.
Each point must be short and user friendly.
Do NOT include model info, metadata, or explanations.

Context:
{{context}}

Question:
{{question}}

Answer (bullet points only):
";

/// The grounded answer prompt used when the workspace does not override it.
pub fn answer_prompt() -> PromptDefinition {
    PromptDefinition {
        id: ANSWER_PROMPT_ID.to_string(),
        title: "Grounded healthcare answer".to_string(),
        api_version: "1.0".to_string(),
        input_variables: vec!["context".to_string(), "question".to_string()],
        system: None,
        template: ANSWER_TEMPLATE.to_string(),
    }
}

/// Look up a built-in prompt by id.
pub fn builtin(id: &str) -> Option<PromptDefinition> {
    match id {
        ANSWER_PROMPT_ID => Some(answer_prompt()),
        _ => None,
    }
}

/// Ids of all built-in prompts.
pub fn builtin_ids() -> Vec<&'static str> {
    vec![ANSWER_PROMPT_ID]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_prompt_contract() {
        let def = answer_prompt();
        assert!(def.template.contains("ONLY using the context"));
        assert!(def.template.contains("bullet points"));
        assert!(def.template.contains("Do NOT include model info"));
        assert!(def.template.contains("{{context}}"));
        assert!(def.template.contains("{{question}}"));
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(builtin(ANSWER_PROMPT_ID).is_some());
        assert!(builtin("nope").is_none());
    }
}
