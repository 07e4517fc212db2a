//! Derived statistics over the task mirror

use serde::Serialize;

/// Completion counts over the current owner's non-deleted tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStats {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

/// Per-category completion counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub name: String,
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub completion_rate: u32,
}

/// Task counts per priority level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityBreakdown {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

/// Rounded percentage, 0 when the denominator is 0
pub(crate) fn percentage(completed: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
    }
}
