//! String utilities for the domain layer.

/// Case- and whitespace-normalized key used for grouping free-text labels
/// (approaches, topics).
pub fn normalize_label(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Event   Sourcing "), "event sourcing");
        assert_eq!(normalize_label("CQRS"), "cqrs");
        assert_eq!(normalize_label(""), "");
        assert_eq!(normalize_label("Kafka\tStreams"), "kafka streams");
    }
}
