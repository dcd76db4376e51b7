//! Prompt templates for consultation rounds

use crate::agent::AgentSpec;
use crate::core::task::Task;
use crate::response::AgentResponse;

/// JSON shape every agent is asked to answer in
const RESPONSE_SCHEMA: &str = r#"{
  "response": {
    "summary": "one or two sentence answer",
    "detailed": "full reasoning",
    "approach": "short label for the approach you recommend",
    "pros": ["..."],
    "cons": ["..."],
    "caveats": ["..."]
  },
  "confidence": {
    "score": 1-10,
    "reasoning": "why you are this confident",
    "uncertainty_factors": ["..."]
  }
}"#;

/// Extra fields requested in debate rounds
const DEBATE_SCHEMA: &str = r#""debate": {
    "position_changed": true | false,
    "stance": "your position after reading your peers",
    "confidence_delta": -9..9,
    "critiques": [
      { "target": "<peer label>", "severity": "low|medium|high|critical", "point": "..." }
    ]
  }"#;

/// A peer's prior-round answer as shown in a debate prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerView {
    /// Agent name, or an anonymous label such as `Peer A`
    pub label: String,
    pub summary: String,
}

/// Templates for generating prompts at each round
pub struct PromptTemplate;

impl PromptTemplate {
    /// System preamble, with the agent's persona if it has one
    pub fn system(agent: &AgentSpec) -> String {
        let mut system = String::from(
            "You are one of several independent experts consulted on the same task.\n\
             Answer on your own merits. Be concrete and state your assumptions.",
        );
        if let Some(persona) = agent.persona.as_deref().filter(|p| !p.trim().is_empty()) {
            system.push_str(&format!("\nAnswer from the perspective of: {}.", persona.trim()));
        }
        system
    }

    /// Round 1 prompt
    pub fn initial_query(task: &Task, agent: &AgentSpec) -> String {
        format!(
            r#"{}

Task (category: {}):
{}

Respond with a single JSON object and nothing else, in this shape:
{}"#,
            Self::system(agent),
            task.category(),
            task.prompt(),
            RESPONSE_SCHEMA
        )
    }

    /// Prompt for debate round `round`, built from the previous round
    pub fn debate_prompt(
        task: &Task,
        agent: &AgentSpec,
        round: u32,
        own: &AgentResponse,
        peers: &[PeerView],
    ) -> String {
        let mut prompt = format!(
            r#"{}

Task (category: {}):
{}

This is debate round {}. Your previous answer:
- summary: {}
- approach: {}
- confidence: {}/10

Other experts answered:
"#,
            Self::system(agent),
            task.category(),
            task.prompt(),
            round,
            own.summary(),
            own.approach(),
            own.score(),
        );

        if peers.is_empty() {
            prompt.push_str("(no other answers this round)\n");
        }
        for peer in peers {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", peer.label, peer.summary));
        }

        let schema = RESPONSE_SCHEMA.trim_end_matches('}').trim_end();
        prompt.push_str(&format!(
            r#"
Reconsider your answer in light of theirs. Critique peers by the labels above.
Respond with a single JSON object and nothing else, in this shape:
{},
  {}
}}"#,
            schema, DEBATE_SCHEMA
        ));

        prompt
    }
}

/// Anonymous label for the peer at `index` (`Peer A` .. `Peer Z`, then `Peer 27`..)
pub fn peer_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => format!("Peer {}", char::from(b'A' + i)),
        _ => format!("Peer {}", index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::test_support::answer;

    #[test]
    fn test_initial_query_format() {
        let task = Task::new("Queue or cron?").unwrap().with_category("architecture");
        let agent = AgentSpec::new("claude");
        let prompt = PromptTemplate::initial_query(&task, &agent);
        assert!(prompt.contains("Queue or cron?"));
        assert!(prompt.contains("category: architecture"));
        assert!(prompt.contains("\"approach\""));
        assert!(!prompt.contains("perspective of"));
    }

    #[test]
    fn test_persona_is_injected() {
        let task = Task::new("Queue or cron?").unwrap();
        let agent = AgentSpec::new("claude").with_persona("security reviewer");
        let prompt = PromptTemplate::initial_query(&task, &agent);
        assert!(prompt.contains("perspective of: security reviewer"));
    }

    #[test]
    fn test_debate_prompt_format() {
        let task = Task::new("Queue or cron?").unwrap();
        let agent = AgentSpec::new("claude");
        let own = answer("claude", "queue", 8);
        let peers = vec![
            PeerView {
                label: "codex".to_string(),
                summary: "cron is enough".to_string(),
            },
            PeerView {
                label: "gemini".to_string(),
                summary: "use a queue".to_string(),
            },
        ];
        let prompt = PromptTemplate::debate_prompt(&task, &agent, 2, &own, &peers);
        assert!(prompt.contains("debate round 2"));
        assert!(prompt.contains("approach: queue"));
        assert!(prompt.contains("confidence: 8/10"));
        assert!(prompt.contains("--- codex ---\ncron is enough"));
        assert!(prompt.contains("--- gemini ---"));
        assert!(prompt.contains("\"position_changed\""));
        // Own answer is not repeated as a peer
        assert!(!prompt.contains("--- claude ---"));
    }

    #[test]
    fn test_peer_labels() {
        assert_eq!(peer_label(0), "Peer A");
        assert_eq!(peer_label(25), "Peer Z");
        assert_eq!(peer_label(26), "Peer 27");
    }
}
