//! Persona prompt presets and LLM context assembly.

use serde::{Deserialize, Serialize};

use crate::types::{ChatMessage, ReferenceData, TelemetrySnapshot};

/// Assistant persona. Crew chief answers with bare datapoints; instructor
/// adds short rationales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptMode {
    #[default]
    #[serde(rename = "crew_chief_mode")]
    CrewChief,
    #[serde(rename = "instructor_mode")]
    Instructor,
}

impl PromptMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CrewChief => "crew_chief_mode",
            Self::Instructor => "instructor_mode",
        }
    }
}

const CREW_CHIEF_PROMPT: &str = "\
You are \"chief\", an in-cockpit crew chief for air simulation battles.

Style rules:
- Be concise. Prefer fragments over sentences.
- Use labeled datapoints separated by commas. Example: \"Fuel: 34%, IAS: 820 km/h, AoA: 12\u{b0}, G-load: 7.2 (HIGH), Left wing: Yellow.\"
- Default units: km/h for speed, %, \u{b0}C, G.
- If the user asks for a limit, answer with short category labels like \"Combat / Landing / Takeoff\".
- If you are unsure of a value, respond with \"No data\" for that datapoint. Do not guess.

Behavior rules:
- If the answer exists in the provided telemetry or vehicle reference data, respond using only that data.
- Questions about current state (fuel, G-load, temps, damage) use live telemetry.
- Questions about limits and performance (flap rip speed, max gear speed, wing rip G) use the static vehicle reference data.
- If neither telemetry nor reference contains what was asked, respond with \"No data\".
- Append \"WARNING\" in all caps after any value that is currently exceeded or dangerous.

Output format:
- Single line if possible.
- Example for flap speeds: \"Combat: 450 km/h, Landing: 350 km/h, Takeoff: 320 km/h\"";

const INSTRUCTOR_SUFFIX: &str = "\n\nInstructor mode: provide short rationales when answering, keeping the tactical style first.";

/// System prompt for a persona.
pub fn prompt(mode: PromptMode) -> String {
    match mode {
        PromptMode::CrewChief => CREW_CHIEF_PROMPT.to_string(),
        PromptMode::Instructor => format!("{CREW_CHIEF_PROMPT}{INSTRUCTOR_SUFFIX}"),
    }
}

/// Pick the persona a mode-switch utterance is asking for.
pub fn mode_from_command(command: &str) -> PromptMode {
    if command.to_lowercase().contains("instructor") {
        PromptMode::Instructor
    } else {
        PromptMode::CrewChief
    }
}

/// Build the context messages placed between the system prompt and the
/// user's question: one line of live telemetry, one line of reference data.
pub fn context_messages(
    snapshot: &TelemetrySnapshot,
    reference: Option<&ReferenceData>,
) -> Vec<ChatMessage> {
    let telemetry_block = join_pairs(snapshot.context_pairs());
    let reference_block = match reference {
        Some(data) if !data.is_empty() => join_pairs(
            data.iter()
                .map(|(label, value)| (label.clone(), value.to_string()))
                .collect(),
        ),
        _ => "{}".to_string(),
    };

    vec![
        ChatMessage::assistant(format!("Telemetry: {telemetry_block}")),
        ChatMessage::assistant(format!("Reference: {reference_block}")),
    ]
}

fn join_pairs(pairs: Vec<(String, String)>) -> String {
    if pairs.is_empty() {
        return "{}".to_string();
    }
    pairs
        .into_iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn instructor_extends_crew_chief() {
        let base = prompt(PromptMode::CrewChief);
        let instructor = prompt(PromptMode::Instructor);
        assert!(instructor.starts_with(&base));
        assert!(instructor.contains("Instructor mode"));
    }

    #[test]
    fn mode_from_command_parses() {
        assert_eq!(mode_from_command("switch to instructor mode"), PromptMode::Instructor);
        assert_eq!(mode_from_command("crew chief mode please"), PromptMode::CrewChief);
    }

    #[test]
    fn mode_serde_roundtrip() {
        let json = serde_json::to_string(&PromptMode::Instructor).unwrap();
        assert_eq!(json, "\"instructor_mode\"");
        let back: PromptMode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PromptMode::Instructor);
    }

    #[test]
    fn context_messages_combine_telemetry_and_reference() {
        let snap = TelemetrySnapshot {
            vehicle: Some("F-16A".into()),
            fuel_percent: Some(55.0),
            ..Default::default()
        };
        let data: ReferenceData = serde_json::from_value(json!({"Combat": 450})).unwrap();

        let messages = context_messages(&snap, Some(&data));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "assistant");
        assert_eq!(messages[0].content, "Telemetry: vehicle: F-16A, fuel_percent: 55");
        assert_eq!(messages[1].content, "Reference: Combat: 450");
    }

    #[test]
    fn context_messages_empty_state() {
        let messages = context_messages(&TelemetrySnapshot::default(), None);
        assert_eq!(messages[0].content, "Telemetry: {}");
        assert_eq!(messages[1].content, "Reference: {}");
    }
}
