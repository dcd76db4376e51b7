//! Agreed and contested topics
//!
//! Topics are the `pros` and `cons` items agents list, compared after
//! case/whitespace normalization.
//!
//! - **agreed**: listed by more than half of the respondents (and by at
//!   least two of them)
//! - **disagreed**: listed as a pro by one agent and as a con by another

use crate::core::string::normalize_label;
use crate::response::AgentResponse;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Default)]
struct TopicVotes<'a> {
    mentioned_by: BTreeSet<&'a str>,
    as_pro: BTreeSet<&'a str>,
    as_con: BTreeSet<&'a str>,
}

/// `(agreed, disagreed)` topics over the given answered responses
pub fn classify_topics(responses: &[&AgentResponse]) -> (Vec<String>, Vec<String>) {
    let mut topics: BTreeMap<String, TopicVotes<'_>> = BTreeMap::new();

    for response in responses {
        let agent = response.consultant.as_str();
        for pro in &response.response.pros {
            let key = normalize_label(pro);
            if key.is_empty() {
                continue;
            }
            let votes = topics.entry(key).or_default();
            votes.mentioned_by.insert(agent);
            votes.as_pro.insert(agent);
        }
        for con in &response.response.cons {
            let key = normalize_label(con);
            if key.is_empty() {
                continue;
            }
            let votes = topics.entry(key).or_default();
            votes.mentioned_by.insert(agent);
            votes.as_con.insert(agent);
        }
    }

    let respondents = responses.len();
    let mut agreed = Vec::new();
    let mut disagreed = Vec::new();

    for (topic, votes) in &topics {
        let contested = votes
            .as_pro
            .iter()
            .any(|pro_agent| votes.as_con.iter().any(|con_agent| con_agent != pro_agent));

        if contested {
            disagreed.push(topic.clone());
        } else if votes.mentioned_by.len() >= 2 && votes.mentioned_by.len() * 2 > respondents {
            agreed.push(topic.clone());
        }
    }

    (agreed, disagreed)
}
