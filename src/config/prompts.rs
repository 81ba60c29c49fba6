//! Prompt templates for Yogi.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prompt templates used to build the system instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    /// Persona and rules block. `{{context}}` is replaced with the
    /// retrieved pose text (possibly empty).
    pub system: String,
    /// Appended to the system instruction when the query tripped the
    /// safety screen.
    pub safety_override: String,
    /// Short instruction prepended to the system block for audio requests.
    pub audio_instruction: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            system: r#"You are "YogiAI".
RULES:
1. **Language**: Detect language. Reply in same.
2. **Yoga Flows**: If asked for a routine, format as **Step 1:**, **Step 2:**...
3. **Brevity**: Under 150 words.
4. **Context**: Use this context if available: {{context}}"#
                .to_string(),

            safety_override:
                "🚨 CRITICAL SAFETY: User mentioned risky terms. Suggest ONLY gentle breathing."
                    .to_string(),

            audio_instruction: "Listen to this audio request. ".to_string(),
        }
    }
}

impl Prompts {
    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.system.contains("YogiAI"));
        assert!(prompts.system.contains("{{context}}"));
        assert!(!prompts.safety_override.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Use this context if available: {{context}}";
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "Downward Dog stretches...".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Use this context if available: Downward Dog stretches...");
    }
}
