//! Response validation and normalization.
//!
//! Every adapter result passes through [`ResponseNormalizer::normalize`]
//! before anything else looks at it. The output is a closed sum type:
//!
//! - [`NormalizedResponse::Valid`]: the agent followed the schema
//! - [`NormalizedResponse::Degraded`]: the agent did not; its raw text is
//!   wrapped into a schema-conformant response with neutral defaults
//!
//! A malformed answer is never an error. It costs the agent its approach
//! label (it votes as `unknown`) and its confidence becomes the configured
//! fallback value.

use super::parsing::RawOutput;
use super::schema::{
    AgentResponse, Confidence, MAX_CONFIDENCE, MIN_ANSWER_CONFIDENCE, ResponseBody,
    ResponseMetadata,
};
use crate::agent::AgentSpec;
use crate::debate::turn::{Critique, CritiqueSeverity, DebateTurn};
use serde_json::Value;
use tracing::debug;

/// Confidence assigned to output that does not follow the schema.
///
/// A fixed neutral value; it is not derived from the content.
pub const DEFAULT_FALLBACK_CONFIDENCE: u8 = 5;

/// Summary placed on degraded responses
pub const DEGRADED_SUMMARY: &str = "Non-standard output (see detailed answer)";

/// Approach label placed on degraded responses
pub const UNKNOWN_APPROACH: &str = "unknown";

/// Confidence reasoning placed on degraded responses
pub const NOT_PROVIDED: &str = "not provided";

/// Caveat appended to degraded responses
pub const NON_STANDARD_CAVEAT: &str =
    "Agent output did not match the response schema and was wrapped verbatim";

/// Result of normalizing one raw agent output
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResponse {
    Valid(AgentResponse),
    Degraded(AgentResponse),
}

impl NormalizedResponse {
    pub fn is_degraded(&self) -> bool {
        matches!(self, NormalizedResponse::Degraded(_))
    }

    pub fn response(&self) -> &AgentResponse {
        match self {
            NormalizedResponse::Valid(r) | NormalizedResponse::Degraded(r) => r,
        }
    }

    pub fn into_response(self) -> AgentResponse {
        match self {
            NormalizedResponse::Valid(r) | NormalizedResponse::Degraded(r) => r,
        }
    }
}

/// Validates raw output against the response schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseNormalizer {
    fallback_confidence: u8,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self {
            fallback_confidence: DEFAULT_FALLBACK_CONFIDENCE,
        }
    }
}

impl ResponseNormalizer {
    /// Create a normalizer with an explicit fallback confidence (clamped to 1–10)
    pub fn new(fallback_confidence: u8) -> Self {
        Self {
            fallback_confidence: fallback_confidence.clamp(MIN_ANSWER_CONFIDENCE, MAX_CONFIDENCE),
        }
    }

    pub fn fallback_confidence(&self) -> u8 {
        self.fallback_confidence
    }

    /// Normalize one raw output from `agent`.
    pub fn normalize(&self, agent: &AgentSpec, raw: &RawOutput) -> NormalizedResponse {
        match raw.json_object().and_then(|v| conforming(agent, &v)) {
            Some(response) => NormalizedResponse::Valid(response),
            None => NormalizedResponse::Degraded(self.degrade(agent, raw)),
        }
    }

    fn degrade(&self, agent: &AgentSpec, raw: &RawOutput) -> AgentResponse {
        AgentResponse {
            consultant: agent.name.clone(),
            model: agent.model_label().to_string(),
            persona: agent.persona.clone().unwrap_or_default(),
            response: ResponseBody {
                summary: DEGRADED_SUMMARY.to_string(),
                detailed: raw.as_text(),
                approach: UNKNOWN_APPROACH.to_string(),
                pros: Vec::new(),
                cons: Vec::new(),
                caveats: vec![NON_STANDARD_CAVEAT.to_string()],
            },
            confidence: Confidence {
                score: self.fallback_confidence,
                reasoning: NOT_PROVIDED.to_string(),
                uncertainty_factors: Vec::new(),
            },
            metadata: ResponseMetadata::default(),
            error: None,
            debate: None,
        }
    }
}

/// Build a response from `value` if it carries every required field.
fn conforming(agent: &AgentSpec, value: &Value) -> Option<AgentResponse> {
    let body = value.get("response")?;
    let summary = non_blank(body.get("summary")?)?;
    let detailed = body.get("detailed")?.as_str()?;
    let approach = non_blank(body.get("approach")?)?;

    let confidence = value.get("confidence")?;
    let score = score_in_range(confidence.get("score")?)?;
    let reasoning = confidence.get("reasoning")?.as_str()?;

    let identity = |key: &str, fallback: &str| -> String {
        value
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    let tokens_used = value
        .get("metadata")
        .and_then(|m| m.get("tokens_used"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let debate = value.get("debate").and_then(|d| debate_turn(&agent.name, d));

    Some(AgentResponse {
        consultant: identity("consultant", &agent.name),
        model: identity("model", agent.model_label()),
        persona: identity("persona", agent.persona.as_deref().unwrap_or_default()),
        response: ResponseBody {
            summary: summary.to_string(),
            detailed: detailed.to_string(),
            approach: approach.to_string(),
            pros: string_list(body.get("pros")),
            cons: string_list(body.get("cons")),
            caveats: string_list(body.get("caveats")),
        },
        confidence: Confidence {
            score,
            reasoning: reasoning.to_string(),
            uncertainty_factors: string_list(confidence.get("uncertainty_factors")),
        },
        metadata: ResponseMetadata {
            tokens_used,
            ..ResponseMetadata::default()
        },
        error: None,
        debate,
    })
}

/// Field-by-field read of the `debate` sub-object.
///
/// Unknown severities fall back to medium, fractional deltas are rounded
/// and clamped, and only critiques without a target or point are dropped.
fn debate_turn(agent: &str, value: &Value) -> Option<DebateTurn> {
    let Some(object) = value.as_object() else {
        debug!("Agent {}: ignoring non-object debate field", agent);
        return None;
    };

    let confidence_delta = object
        .get("confidence_delta")
        .and_then(Value::as_f64)
        .map(|d| d.round().clamp(-f64::from(MAX_CONFIDENCE), f64::from(MAX_CONFIDENCE)) as i8)
        .unwrap_or(0);

    let items = object.get("critiques").and_then(Value::as_array);
    let mut critiques = Vec::new();
    for item in items.into_iter().flatten() {
        match critique(agent, item) {
            Some(c) => critiques.push(c),
            None => debug!("Agent {}: dropping malformed critique {}", agent, item),
        }
    }

    Some(DebateTurn {
        position_changed: object
            .get("position_changed")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        stance: object
            .get("stance")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        confidence_delta,
        critiques,
    })
}

fn critique(agent: &str, value: &Value) -> Option<Critique> {
    let target = non_blank(value.get("target")?)?;
    let point = non_blank(value.get("point")?)?;
    let severity = match value.get("severity").and_then(Value::as_str) {
        Some(label) => CritiqueSeverity::from_label(label).unwrap_or_else(|| {
            debug!("Agent {}: unknown critique severity '{}', using medium", agent, label);
            CritiqueSeverity::Medium
        }),
        None => CritiqueSeverity::Medium,
    };
    Some(Critique {
        target: target.to_string(),
        severity,
        point: point.to_string(),
    })
}

fn non_blank(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

/// Integer score within 1–10; integral floats such as `8.0` are accepted.
fn score_in_range(value: &Value) -> Option<u8> {
    let score = match value.as_u64() {
        Some(n) => n,
        None => {
            let f = value.as_f64()?;
            if f.fract() != 0.0 || f < 0.0 {
                return None;
            }
            f as u64
        }
    };
    (u64::from(MIN_ANSWER_CONFIDENCE)..=u64::from(MAX_CONFIDENCE))
        .contains(&score)
        .then_some(score as u8)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn agent() -> AgentSpec {
        AgentSpec::new("claude").with_model("sonnet").with_persona("architect")
    }

    fn valid_json() -> Value {
        json!({
            "response": {
                "summary": "Use a queue",
                "detailed": "Put a durable queue between the services.",
                "approach": "Message Queue",
                "pros": ["decoupling"],
                "cons": ["operational cost"],
                "caveats": []
            },
            "confidence": {"score": 8, "reasoning": "common pattern", "uncertainty_factors": ["load unknown"]},
            "metadata": {"tokens_used": 321}
        })
    }

    #[test]
    fn test_valid_json_passes_through() {
        let normalized = ResponseNormalizer::default().normalize(&agent(), &RawOutput::Json(valid_json()));
        assert!(!normalized.is_degraded());

        let r = normalized.into_response();
        assert_eq!(r.consultant, "claude");
        assert_eq!(r.model, "sonnet");
        assert_eq!(r.persona, "architect");
        assert_eq!(r.response.approach, "Message Queue");
        assert_eq!(r.response.pros, vec!["decoupling"]);
        assert_eq!(r.confidence.score, 8);
        assert_eq!(r.confidence.uncertainty_factors, vec!["load unknown"]);
        assert_eq!(r.metadata.tokens_used, 321);
    }

    #[test]
    fn test_json_inside_text_is_accepted() {
        let text = format!("Sure!\n```json\n{}\n```", valid_json());
        let normalized = ResponseNormalizer::default().normalize(&agent(), &RawOutput::Text(text));
        assert!(!normalized.is_degraded());
    }

    #[test]
    fn test_agent_supplied_identity_is_kept() {
        let mut value = valid_json();
        value["model"] = json!("sonnet-4.5");
        let r = ResponseNormalizer::default()
            .normalize(&agent(), &RawOutput::Json(value))
            .into_response();
        assert_eq!(r.model, "sonnet-4.5");
    }

    #[test]
    fn test_plain_text_is_degraded() {
        let raw = RawOutput::Text("I think you should use a queue.".to_string());
        let normalized = ResponseNormalizer::default().normalize(&agent(), &raw);
        assert!(normalized.is_degraded());

        let r = normalized.into_response();
        assert_eq!(r.response.summary, DEGRADED_SUMMARY);
        assert_eq!(r.response.detailed, "I think you should use a queue.");
        assert_eq!(r.response.approach, UNKNOWN_APPROACH);
        assert_eq!(r.confidence.score, DEFAULT_FALLBACK_CONFIDENCE);
        assert_eq!(r.confidence.reasoning, NOT_PROVIDED);
        assert_eq!(r.response.caveats, vec![NON_STANDARD_CAVEAT]);
        assert!(!r.is_error());
    }

    #[test]
    fn test_out_of_range_score_is_degraded() {
        for bad in [json!(0), json!(11), json!(7.5), json!("8"), json!(-3)] {
            let mut value = valid_json();
            value["confidence"]["score"] = bad.clone();
            let normalized = ResponseNormalizer::default().normalize(&agent(), &RawOutput::Json(value));
            assert!(normalized.is_degraded(), "score {} should degrade", bad);
        }
    }

    #[test]
    fn test_integral_float_score_is_accepted() {
        let mut value = valid_json();
        value["confidence"]["score"] = json!(9.0);
        let r = ResponseNormalizer::default()
            .normalize(&agent(), &RawOutput::Json(value))
            .into_response();
        assert_eq!(r.confidence.score, 9);
    }

    #[test]
    fn test_missing_required_field_is_degraded() {
        for pointer in ["summary", "detailed", "approach"] {
            let mut value = valid_json();
            value["response"].as_object_mut().unwrap().remove(pointer);
            let normalized = ResponseNormalizer::default().normalize(&agent(), &RawOutput::Json(value));
            assert!(normalized.is_degraded(), "missing {} should degrade", pointer);
        }

        let mut value = valid_json();
        value["confidence"].as_object_mut().unwrap().remove("reasoning");
        assert!(
            ResponseNormalizer::default()
                .normalize(&agent(), &RawOutput::Json(value))
                .is_degraded()
        );
    }

    #[test]
    fn test_configured_fallback_confidence() {
        let normalizer = ResponseNormalizer::new(3);
        let r = normalizer
            .normalize(&agent(), &RawOutput::Text("free text".into()))
            .into_response();
        assert_eq!(r.confidence.score, 3);

        // Clamped into the answer range
        assert_eq!(ResponseNormalizer::new(0).fallback_confidence(), 1);
        assert_eq!(ResponseNormalizer::new(42).fallback_confidence(), 10);
    }

    #[test]
    fn test_debate_sub_object_is_parsed() {
        let mut value = valid_json();
        value["debate"] = json!({
            "position_changed": true,
            "stance": "moved to queues",
            "confidence_delta": 2,
            "critiques": [{"target": "codex", "severity": "high", "point": "no retries"}]
        });
        let r = ResponseNormalizer::default()
            .normalize(&agent(), &RawOutput::Json(value))
            .into_response();
        let turn = r.debate.unwrap();
        assert!(turn.position_changed);
        assert_eq!(turn.confidence_delta, 2);
        assert_eq!(turn.critiques[0].target, "codex");
    }

    #[test]
    fn test_debate_turn_tolerates_off_vocabulary_fields() {
        let mut value = valid_json();
        value["debate"] = json!({
            "position_changed": true,
            "stance": "kept queues",
            "confidence_delta": 1.6,
            "critiques": [
                {"target": "codex", "severity": "High", "point": "no retries"},
                {"target": "gemini", "severity": "blocker", "point": "ignores cost"},
                {"target": "claude", "point": "vague"},
                {"severity": "low", "point": "no target"},
                "just a string"
            ]
        });
        let normalized = ResponseNormalizer::default().normalize(&agent(), &RawOutput::Json(value));
        assert!(!normalized.is_degraded());

        let turn = normalized.into_response().debate.unwrap();
        assert!(turn.position_changed);
        assert_eq!(turn.stance, "kept queues");
        assert_eq!(turn.confidence_delta, 2);

        let severities: Vec<_> = turn.critiques.iter().map(|c| (c.target.as_str(), c.severity)).collect();
        assert_eq!(
            severities,
            vec![
                ("codex", CritiqueSeverity::High),
                ("gemini", CritiqueSeverity::Medium),
                ("claude", CritiqueSeverity::Medium),
            ]
        );
    }

    #[test]
    fn test_debate_delta_is_clamped() {
        let mut value = valid_json();
        value["debate"] = json!({"confidence_delta": -250});
        let turn = ResponseNormalizer::default()
            .normalize(&agent(), &RawOutput::Json(value))
            .into_response()
            .debate
            .unwrap();
        assert_eq!(turn.confidence_delta, -10);
        assert!(turn.critiques.is_empty());
    }

    #[test]
    fn test_json_degraded_output_keeps_raw_text() {
        let raw = RawOutput::Json(json!({"answer": "42"}));
        let r = ResponseNormalizer::default().normalize(&agent(), &raw).into_response();
        assert!(r.response.detailed.contains("\"answer\""));
    }
}
