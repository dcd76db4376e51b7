//! Progress reporting for consultations

use colored::Colorize;
use consilium_application::ports::progress::ProgressNotifier;
use consilium_domain::{ConsensusResult, SlotStatus};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress with one bar per round
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn round_name(round: u32) -> String {
        if round == 1 {
            "Round 1: Initial Query".to_string()
        } else {
            format!("Round {}: Debate", round)
        }
    }

    fn status_line(agent: &str, status: SlotStatus) -> String {
        match status {
            SlotStatus::Ok => format!("{} {}", "v".green(), agent),
            SlotStatus::Empty => format!("{} {} (empty)", "?".yellow(), agent),
            SlotStatus::Failed => format!("{} {} (failed)", "x".red(), agent),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.round_bar.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_round_start(&self, round: u32, total_agents: usize) {
        let pb = self.multi.add(ProgressBar::new(total_agents as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(Self::round_name(round));
        pb.set_message("Dispatching...");

        if let Ok(mut slot) = self.round_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_agent_complete(&self, _round: u32, agent: &str, status: SlotStatus) {
        self.with_bar(|pb| {
            pb.set_message(Self::status_line(agent, status));
            pb.inc(1);
        });
    }

    fn on_round_complete(&self, round: u32, consensus: &ConsensusResult) {
        let finished = self.round_bar.lock().ok().and_then(|mut slot| slot.take());
        if let Some(pb) = finished {
            pb.finish_with_message(format!(
                "{} agreement {}/100 ({})",
                format!("Round {} complete:", round).green(),
                consensus.score,
                consensus.level
            ));
        }
    }

    fn on_cache_hit(&self, agent: &str) {
        self.with_bar(|pb| pb.println(format!("  {} {} served from cache", "=".cyan(), agent)));
    }

    fn on_escalation(&self, agents: &[String]) {
        let _ = self.multi.println(format!(
            "{} Escalating low-confidence agents: {}",
            "^".yellow(),
            agents.join(", ")
        ));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_round_start(&self, round: u32, total_agents: usize) {
        eprintln!(
            "{} {} ({} agents)",
            "->".cyan(),
            ProgressReporter::round_name(round).bold(),
            total_agents
        );
    }

    fn on_agent_complete(&self, _round: u32, agent: &str, status: SlotStatus) {
        eprintln!("  {}", ProgressReporter::status_line(agent, status));
    }

    fn on_round_complete(&self, _round: u32, consensus: &ConsensusResult) {
        eprintln!("  agreement {}/100 ({})", consensus.score, consensus.level);
        eprintln!();
    }

    fn on_cache_hit(&self, agent: &str) {
        eprintln!("  {} {} (cached)", "=".cyan(), agent);
    }

    fn on_escalation(&self, agents: &[String]) {
        eprintln!("{} Escalating: {}", "^".yellow(), agents.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_names() {
        assert_eq!(ProgressReporter::round_name(1), "Round 1: Initial Query");
        assert_eq!(ProgressReporter::round_name(3), "Round 3: Debate");
    }

    #[test]
    fn test_status_lines_name_the_agent() {
        colored::control::set_override(false);
        assert_eq!(ProgressReporter::status_line("a", SlotStatus::Ok), "v a");
        assert_eq!(ProgressReporter::status_line("b", SlotStatus::Failed), "x b (failed)");
        assert_eq!(ProgressReporter::status_line("c", SlotStatus::Empty), "? c (empty)");
    }

    #[test]
    fn test_reporter_tracks_one_round_at_a_time() {
        let reporter = ProgressReporter::new();
        reporter.on_round_start(1, 2);
        reporter.on_agent_complete(1, "a", SlotStatus::Ok);
        assert!(reporter.round_bar.lock().unwrap().is_some());

        let consensus = consilium_domain::consensus(&consilium_domain::RoundRecord::new(1, Vec::new()).unwrap());
        reporter.on_round_complete(1, &consensus);
        assert!(reporter.round_bar.lock().unwrap().is_none());
    }
}
