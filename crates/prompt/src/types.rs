//! Prompt types for medrag.

use serde::{Deserialize, Serialize};

/// A prompt definition, either built in or loaded from YAML.
///
/// Keys not listed here are ignored when loading a workspace override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// Schema version, `x.y`
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Variables the template requires; rendering fails if one is missing
    #[serde(rename = "inputVariables", default)]
    pub input_variables: Vec<String>,

    /// Optional system message template (Handlebars)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// User message template (Handlebars)
    pub template: String,
}

/// A rendered prompt ready for the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltPrompt {
    /// Id of the definition it was rendered from
    pub prompt_id: String,

    pub system: Option<String>,

    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: clinic.answer
title: Clinic Answer
apiVersion: "1.0"
inputVariables: [context, question]
template: "{{context}} / {{question}}"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "clinic.answer");
        assert_eq!(def.input_variables, vec!["context", "question"]);
        assert!(def.system.is_none());
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let yaml = r#"
id: clinic.answer
title: Clinic Answer
apiVersion: "1.0"
behavior:
  tone: friendly
template: "{{question}}"
output:
  format: text
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.template, "{{question}}");
        assert!(def.input_variables.is_empty());
    }

    #[test]
    fn test_missing_template_rejected() {
        let yaml = "id: clinic.answer\ntitle: Clinic Answer\napiVersion: \"1.0\"\n";
        assert!(serde_yaml::from_str::<PromptDefinition>(yaml).is_err());
    }
}
