//! Prompt composition.
//!
//! Pure functions from structured inputs (persona templates, retrieved
//! context, history, safety flag, audio payload) to the content parts sent
//! to the generation API. Text and audio payload shapes are mutually
//! exclusive, selected by the presence of an audio payload.

use crate::config::Prompts;
use crate::gemini::Part;
use serde::Deserialize;
use std::collections::HashMap;

/// Substituted for an empty current query so the model never receives
/// empty user content.
pub const DEFAULT_QUERY_PLACEHOLDER: &str = "Hello";

/// How many trailing history turns are folded into the prompt.
const MAX_HISTORY_TURNS: usize = 3;

/// One caller-supplied conversation turn. Transient; never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub text: String,
}

/// Build the system instruction: persona/rules with the retrieved context
/// substituted, plus the safety override when the query tripped the screen.
pub fn system_instruction(prompts: &Prompts, context: &str, is_unsafe: bool) -> String {
    let mut vars = HashMap::new();
    vars.insert("context".to_string(), context.to_string());

    let mut instruction = Prompts::render(&prompts.system, &vars);
    if is_unsafe {
        instruction.push_str("\n\n");
        instruction.push_str(&prompts.safety_override);
    }
    instruction
}

/// Compose the user-content parts for one request.
///
/// Audio mode: inline audio data followed by a short listen instruction
/// carrying the system block. Text mode: a single part holding the system
/// block, up to the last three history turns, and the current query.
pub fn compose_parts(
    prompts: &Prompts,
    instruction: &str,
    history: &[ChatTurn],
    query: &str,
    audio: Option<&str>,
) -> Vec<Part> {
    if let Some(audio_data) = audio {
        return vec![
            Part::audio(audio_data),
            Part::text(format!("{}{}", prompts.audio_instruction, instruction)),
        ];
    }

    let mut conversation = format!("{}\n\n", instruction);

    let skip = history.len().saturating_sub(MAX_HISTORY_TURNS);
    for turn in &history[skip..] {
        // Malformed turns are skipped, not errors.
        if turn.role.is_empty() || turn.text.is_empty() {
            continue;
        }
        let speaker = if turn.role == "user" { "User" } else { "YogiAI" };
        conversation.push_str(&format!("{}: {}\n", speaker, turn.text));
    }

    let safe_query = if query.is_empty() {
        DEFAULT_QUERY_PLACEHOLDER
    } else {
        query
    };
    conversation.push_str(&format!("User: {}\nYogiAI:", safe_query));

    vec![Part::text(conversation)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: &str, text: &str) -> ChatTurn {
        ChatTurn {
            role: role.to_string(),
            text: text.to_string(),
        }
    }

    fn text_of(parts: &[Part]) -> String {
        match &parts[parts.len() - 1] {
            Part::Text { text } => text.clone(),
            Part::InlineData { .. } => panic!("expected text part"),
        }
    }

    #[test]
    fn test_system_instruction_embeds_context() {
        let prompts = Prompts::default();
        let instruction = system_instruction(&prompts, "Child's Pose rests the spine.", false);
        assert!(instruction.contains("Child's Pose rests the spine."));
        assert!(!instruction.contains("CRITICAL SAFETY"));
    }

    #[test]
    fn test_unsafe_appends_safety_override() {
        let prompts = Prompts::default();
        let instruction = system_instruction(&prompts, "", true);
        assert!(instruction.ends_with(&prompts.safety_override));
    }

    #[test]
    fn test_text_mode_single_part_with_query() {
        let prompts = Prompts::default();
        let parts = compose_parts(&prompts, "SYSTEM", &[], "Suggest a morning flow", None);
        assert_eq!(parts.len(), 1);
        let text = text_of(&parts);
        assert!(text.starts_with("SYSTEM\n\n"));
        assert!(text.ends_with("User: Suggest a morning flow\nYogiAI:"));
    }

    #[test]
    fn test_empty_query_gets_placeholder() {
        let prompts = Prompts::default();
        let parts = compose_parts(&prompts, "SYSTEM", &[], "", None);
        assert!(text_of(&parts).contains("User: Hello\nYogiAI:"));
    }

    #[test]
    fn test_history_capped_at_last_three() {
        let prompts = Prompts::default();
        let history = vec![
            turn("user", "one"),
            turn("assistant", "two"),
            turn("user", "three"),
            turn("assistant", "four"),
        ];
        let parts = compose_parts(&prompts, "SYSTEM", &history, "five", None);
        let text = text_of(&parts);
        assert!(!text.contains("User: one"));
        assert!(text.contains("YogiAI: two"));
        assert!(text.contains("User: three"));
        assert!(text.contains("YogiAI: four"));
    }

    #[test]
    fn test_malformed_history_turns_skipped() {
        let prompts = Prompts::default();
        let history = vec![turn("", "orphan text"), turn("user", "")];
        let parts = compose_parts(&prompts, "SYSTEM", &history, "query", None);
        let text = text_of(&parts);
        assert!(!text.contains("orphan text"));
    }

    #[test]
    fn test_audio_mode_parts() {
        let prompts = Prompts::default();
        let parts = compose_parts(&prompts, "SYSTEM", &[], "", Some("QUJD"));
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], Part::audio("QUJD"));
        let text = text_of(&parts);
        assert!(text.starts_with("Listen to this audio request. "));
        assert!(text.contains("SYSTEM"));
    }

    #[test]
    fn test_audio_mode_ignores_history() {
        let prompts = Prompts::default();
        let history = vec![turn("user", "earlier question")];
        let parts = compose_parts(&prompts, "SYSTEM", &history, "", Some("QUJD"));
        assert!(!text_of(&parts).contains("earlier question"));
    }
}
