//! Turn a decision context into a prompt, and the model's reply into a move
//!
//! The model picks one of the seven moves and may add a taunt. Anything that
//! does not name a move is a parse failure; the broker handles the rest.

use serde::Deserialize;

use crate::ai::broker::DecisionReply;
use crate::ai::context::DecisionContext;
use crate::core::error::{BrawlError, Result};
use crate::fighter::{ActionKind, CHOOSABLE_MOVES};
use crate::llm::client::LlmClient;

const MAX_NARRATIVE_CHARS: usize = 80;
const MAX_REASONING_CHARS: usize = 120;

/// Reply shape requested from the model
#[derive(Debug, Deserialize)]
struct RawDecision {
    action: String,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    trash_talk: Option<String>,
}

/// Ask the model for the next move
///
/// # Arguments
/// * `client` - The LLM client to use
/// * `context` - Snapshot of the fight from the deciding fighter's side
pub async fn request_decision(client: &LlmClient, context: &DecisionContext) -> Result<DecisionReply> {
    let response = client
        .complete(DECISION_SYSTEM_PROMPT, &build_prompt(context))
        .await?;
    parse_decision(&response)
}

/// Parse a raw model response into a decision
pub fn parse_decision(response: &str) -> Result<DecisionReply> {
    let json_str = extract_json(response)?;
    let raw: RawDecision = serde_json::from_str(json_str).map_err(|e| {
        BrawlError::DecisionParseFailure(format!("{} - Response: {}", e, response))
    })?;

    let action = ActionKind::from_move_name(&raw.action).ok_or_else(|| {
        BrawlError::DecisionParseFailure(format!("'{}' is not a move", raw.action))
    })?;

    Ok(DecisionReply {
        action,
        narrative: raw.trash_talk.and_then(|s| clip(&s, MAX_NARRATIVE_CHARS)),
        reasoning: raw.reasoning.and_then(|s| clip(&s, MAX_REASONING_CHARS)),
    })
}

fn clip(text: &str, max_chars: usize) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(max_chars).collect())
    }
}

/// Extract JSON object from LLM response (handles surrounding text)
pub fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| BrawlError::DecisionParseFailure("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| {
            BrawlError::DecisionParseFailure("No closing brace found in response".into())
        })?;
    Ok(&response[start..=end])
}

/// User prompt for one decision
pub fn build_prompt(context: &DecisionContext) -> String {
    let mut moves = String::new();
    for kind in CHOOSABLE_MOVES {
        if let Some(p) = kind.profile() {
            let marker = if context.is_legal(kind) { "" } else { " (not available now)" };
            moves.push_str(&format!(
                "- {}: {} dmg, {} stamina, reach {:.0}, {} frames{}\n",
                kind,
                p.base_damage,
                p.stamina_cost,
                p.max_range + p.advance.max(0.0),
                p.total_ticks(),
                marker
            ));
        }
    }

    let combo_tip = match context.combo_follow_up {
        Some(next) => format!("\nCOMBO: follow up with {} to finish a named combination.", next),
        None => String::new(),
    };

    format!(
        "You are {name}, a {style:?} boxer. {description}\n\n\
         STATE:\n{summary}\n\n\
         MOVES (attacks step you forward, DODGE steps back):\n{moves}\
         TIP: {advice}{combo_tip}\n\n\
         Reply ONLY with JSON:\n\
         {{\"action\":\"JAB\",\"reasoning\":\"why\",\"trash_talk\":\"taunt\"}}",
        name = context.name,
        style = context.style,
        description = context.description,
        summary = context.summary(),
        moves = moves,
        advice = context.range.advice(),
        combo_tip = combo_tip,
    )
}

/// System prompt for decisions
const DECISION_SYSTEM_PROMPT: &str = r#"You are the brain of a boxer in a real-time fight.
Pick exactly ONE move for the next moment of the fight.

AVAILABLE MOVES:
- JAB: fast, light, closes distance
- CROSS: straight power punch, good after a JAB
- HOOK: heavy, best up close
- UPPERCUT: heaviest, best at clinch range
- BLOCK: takes 70% off incoming damage
- DODGE: slip the punch and step back
- CLINCH: tie the opponent up and reset the distance

Stay in character. Manage your stamina; a move you cannot afford is wasted.

OUTPUT FORMAT (JSON only, no explanation):
{
  "action": "JAB|CROSS|HOOK|UPPERCUT|BLOCK|DODGE|CLINCH",
  "reasoning": "one short sentence",
  "trash_talk": "short taunt or empty"
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::personality::Personality;
    use crate::core::config::GameConfig;
    use crate::core::types::FighterId;
    use crate::fighter::Fighter;
    use std::sync::Arc;

    #[test]
    fn test_extract_json_simple() {
        let response = r#"{"action": "JAB"}"#;
        let json = extract_json(response).unwrap();
        assert_eq!(json, response);
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = r#"Sure! Here is my move:
{"action": "HOOK", "reasoning": "they are open", "trash_talk": "Lights out!"}
Good luck."#;
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(json.contains("HOOK"));
    }

    #[test]
    fn test_extract_json_no_json() {
        assert!(matches!(
            extract_json("I think I will jab"),
            Err(BrawlError::DecisionParseFailure(_))
        ));
        assert!(extract_json("} backwards {").is_err());
    }

    #[test]
    fn test_parse_decision_full() {
        let reply = parse_decision(
            r#"{"action":"uppercut","reasoning":"they dropped their guard","trash_talk":"Goodnight!"}"#,
        )
        .unwrap();
        assert_eq!(reply.action, ActionKind::Uppercut);
        assert_eq!(reply.narrative.as_deref(), Some("Goodnight!"));
        assert_eq!(reply.reasoning.as_deref(), Some("they dropped their guard"));
    }

    #[test]
    fn test_parse_decision_without_narrative() {
        let reply = parse_decision(r#"{"action":"BLOCK","trash_talk":"  "}"#).unwrap();
        assert_eq!(reply.action, ActionKind::Block);
        assert!(reply.narrative.is_none());
        assert!(reply.reasoning.is_none());
    }

    #[test]
    fn test_parse_decision_rejects_non_moves() {
        for response in [
            r#"{"action":"IDLE"}"#,
            r#"{"action":"KNOCKED_OUT"}"#,
            r#"{"action":"TELEPORT"}"#,
            r#"{"move":"JAB"}"#,
            "no json here",
        ] {
            assert!(
                matches!(parse_decision(response), Err(BrawlError::DecisionParseFailure(_))),
                "{response} should fail"
            );
        }
    }

    #[test]
    fn test_long_taunt_is_clipped() {
        let taunt = "a".repeat(300);
        let reply = parse_decision(&format!(r#"{{"action":"JAB","trash_talk":"{}"}}"#, taunt)).unwrap();
        assert_eq!(reply.narrative.unwrap().chars().count(), MAX_NARRATIVE_CHARS);
    }

    #[test]
    fn test_prompt_marks_unaffordable_moves() {
        let config = GameConfig::default();
        let profile = Arc::new(Personality::preset("tactician").unwrap());
        let mut red = Fighter::new(FighterId::RED, "Red", profile.clone(), &config);
        let blue = Fighter::new(FighterId::BLUE, "Blue", profile, &config);
        red.stamina = 20.0;
        let ctx = DecisionContext::capture(&red, &blue, 1, 120.0, 0, 5, &config.ring);

        let prompt = build_prompt(&ctx);
        assert!(prompt.contains("You are Red"));
        assert!(prompt.contains("- UPPERCUT: 40 dmg"));
        assert!(prompt.contains("not available now"));
        assert!(prompt.contains("Reply ONLY with JSON"));
    }
}
