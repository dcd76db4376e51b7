//! Output formatter trait

use consilium_application::ConsultationResult;

/// Trait for formatting consultation results
pub trait OutputFormatter {
    /// Format every round, every answer, and the consensus
    fn format(&self, result: &ConsultationResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &ConsultationResult) -> String;

    /// Format consensus, verdict and statuses only (concise output)
    fn format_summary(&self, result: &ConsultationResult) -> String;
}
