//! Console output formatter for consultation results

use crate::output::formatter::OutputFormatter;
use colored::{ColoredString, Colorize};
use consilium_application::ConsultationResult;
use consilium_domain::{AgentSlot, ConsensusLevel, ConsensusResult, OutputFormat, SlotSource, SlotStatus, Verdict};

/// Formats consultation results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render in the requested format
    pub fn render(result: &ConsultationResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(result),
            OutputFormat::Summary => Self::format_summary(result),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    /// Format every round, every answer, and the consensus
    pub fn format(result: &ConsultationResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Consilium Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Task:".cyan().bold(),
            result.fingerprint.short()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Agents:".cyan().bold(),
            result
                .agent_statuses
                .iter()
                .map(|(agent, _)| agent.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        for record in &result.rounds {
            output.push_str(&Self::section_header(&format!("Round {}", record.round)));
            for slot in record.slots() {
                output.push_str(&Self::slot(slot));
            }
        }

        if let Some(debate) = &result.debate {
            output.push_str(&Self::section_header("Debate"));
            output.push_str(&format!(
                "Rounds: {} of {}",
                debate.rounds_run, debate.max_rounds
            ));
            if let Some(reason) = debate.stop_reason {
                output.push_str(&format!(" (stopped: {})", reason));
            }
            output.push('\n');
            output.push_str(&format!(
                "Position changes: {}\n",
                debate.total_position_changes()
            ));
            for critique in &debate.critiques {
                output.push_str(&format!(
                    "  * [round {}] {} -> {} ({}): {}\n",
                    critique.round,
                    critique.from,
                    critique.target,
                    critique.severity.as_str(),
                    critique.point
                ));
            }
        }

        output.push_str(&Self::section_header("Consensus"));
        output.push_str(&Self::consensus(&result.consensus));

        if !result.consensus.agreed_topics.is_empty() {
            output.push_str(&format!("\n{}\n", "Areas of Consensus:".green().bold()));
            for topic in &result.consensus.agreed_topics {
                output.push_str(&format!("  * {}\n", topic));
            }
        }
        if !result.consensus.disagreed_topics.is_empty() {
            output.push_str(&format!("\n{}\n", "Disagreements:".yellow().bold()));
            for topic in &result.consensus.disagreed_topics {
                output.push_str(&format!("  * {}\n", topic));
            }
        }

        output.push_str(&Self::section_header("Verdict"));
        output.push_str(&Self::verdict(&result.verdict));
        output.push_str(&Self::notes(result));

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &ConsultationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format consensus, verdict and statuses only (concise output)
    pub fn format_summary(result: &ConsultationResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Consilium Verdict ===".cyan().bold()
        ));

        output.push_str(&Self::consensus(&result.consensus));
        output.push('\n');
        output.push_str(&Self::verdict(&result.verdict));
        output.push('\n');

        output.push_str(&format!("{}\n", "Agents:".dimmed()));
        for (agent, status) in &result.agent_statuses {
            output.push_str(&format!("  {} {}\n", Self::status_mark(*status), agent));
        }
        output.push_str(&Self::notes(result));

        output
    }

    fn slot(slot: &AgentSlot) -> String {
        let mut tags = Vec::new();
        match slot.source {
            SlotSource::Dispatched => {}
            SlotSource::Cached => tags.push("cached"),
            SlotSource::CarriedForward => tags.push("carried forward"),
            SlotSource::Escalated => tags.push("escalated"),
        }
        if slot.degraded {
            tags.push("unstructured");
        }
        let mut title = format!("── {} ({})", slot.agent, slot.response.model);
        if !tags.is_empty() {
            title.push_str(&format!(" [{}]", tags.join(", ")));
        }
        title.push_str(" ──");

        let response = &slot.response;
        if let Some(error) = &response.error {
            return format!("\n{}\nError: {}\n", title.red().bold(), error);
        }

        let mut out = format!(
            "\n{}\n{} {}/10  {} {}\n{}\n",
            title.yellow().bold(),
            "Confidence:".dimmed(),
            response.score(),
            "Approach:".dimmed(),
            response.approach(),
            response.summary()
        );
        if !response.response.detailed.is_empty() && response.response.detailed != response.summary() {
            out.push_str(&format!("\n{}\n", Self::indent(&response.response.detailed, "  ")));
        }
        if let Some(turn) = &response.debate
            && turn.position_changed
        {
            out.push_str(&format!("{} {}\n", "Changed position:".magenta(), turn.stance));
        }
        out
    }

    fn consensus(consensus: &ConsensusResult) -> String {
        let mut out = format!(
            "{} {}/100 ({}) {}\n",
            "Agreement:".cyan().bold(),
            consensus.score,
            Self::level(consensus.level),
            consensus.vote_summary()
        );

        let stats = &consensus.confidence;
        if stats.samples > 0 {
            out.push_str(&format!(
                "{} mean {:.1}, spread {}, 95% interval {:.1}..{:.1}",
                "Confidence:".cyan().bold(),
                stats.mean,
                stats.spread,
                stats.interval[0],
                stats.interval[1]
            ));
            if stats.high_variance {
                out.push_str(&format!(" {}", "(high variance)".yellow()));
            }
            out.push('\n');
        }

        for group in &consensus.tally {
            out.push_str(&format!(
                "  {} {} (weight {}): {}\n",
                "-".dimmed(),
                group.approach,
                group.weight,
                group.agents.join(", ")
            ));
        }
        out
    }

    fn verdict(verdict: &Verdict) -> String {
        let mut out = match &verdict.recommendation {
            Some(approach) => format!("{} {}\n", "Recommendation:".green().bold(), approach),
            None => format!("{} none\n", "Recommendation:".yellow().bold()),
        };
        out.push_str(&format!(
            "{} {} ({})\n",
            "Rationale:".dimmed(),
            verdict.rationale,
            verdict.strategy.as_str()
        ));
        if verdict.requires_review {
            out.push_str(&format!("{}\n", "Needs human review".yellow().bold()));
        }
        if verdict.recommendation.is_none() && verdict.approaches.len() > 1 {
            out.push_str(&format!("{} {}\n", "Approaches:".dimmed(), verdict.approaches.join(" | ")));
        }
        out
    }

    fn notes(result: &ConsultationResult) -> String {
        let mut out = String::new();
        if !result.cache_hits.is_empty() {
            out.push_str(&format!("{} {}\n", "From cache:".dimmed(), result.cache_hits.join(", ")));
        }
        if !result.escalated.is_empty() {
            out.push_str(&format!("{} {}\n", "Escalated:".dimmed(), result.escalated.join(", ")));
        }
        let failed = result.failed_agents();
        if !failed.is_empty() {
            out.push_str(&format!("{} {}\n", "Failed:".red(), failed.join(", ")));
        }
        if result.partial {
            out.push_str(&format!("{}\n", "Cancelled: result is partial".yellow().bold()));
        }
        out
    }

    fn level(level: ConsensusLevel) -> ColoredString {
        let label = level.as_str();
        match level {
            ConsensusLevel::Unanimous | ConsensusLevel::High => label.green().bold(),
            ConsensusLevel::Medium => label.yellow(),
            _ => label.red(),
        }
    }

    fn status_mark(status: SlotStatus) -> ColoredString {
        match status {
            SlotStatus::Ok => "v".green(),
            SlotStatus::Empty => "?".yellow(),
            SlotStatus::Failed => "x".red(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &ConsultationResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &ConsultationResult) -> String {
        Self::format_json(result)
    }

    fn format_summary(&self, result: &ConsultationResult) -> String {
        Self::format_summary(result)
    }
}
