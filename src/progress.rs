//! Progress estimation and notification for reference-list parsing
//!
//! A cheap pre-scan over the raw payload estimates how many records to
//! expect; the tracker then turns "records opened so far" into a stairstep
//! of whole percentages and only notifies when the bucket changes.

use crate::constants::{PATHWAY_HEADER_TERMINATORS, RECORD_TERMINATOR, markers};
use crate::models::SourceKind;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static SPECIES_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(markers::SPECIES_COUNT_PATTERN).expect("species count pattern is valid")
});

/// Estimate the number of top-level records in a payload
///
/// The estimate only paces progress notifications; the parse result never
/// depends on it.
pub fn estimate_expected(kind: SourceKind, text: &str) -> usize {
    let expected = match kind {
        SourceKind::Databases => text.matches(markers::DATABASES_COUNT).count(),
        SourceKind::Species => SPECIES_COUNT
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0),
        SourceKind::Families => text.matches(markers::FAMILY_COUNT).count(),
        SourceKind::Pathways => text
            .matches(RECORD_TERMINATOR)
            .count()
            .saturating_sub(PATHWAY_HEADER_TERMINATORS),
        SourceKind::Subcellular | SourceKind::Tissues => text
            .lines()
            .filter(|line| line.trim_end() == RECORD_TERMINATOR)
            .count(),
    };

    debug!("Pre-scan for {}: {} records expected", kind, expected);
    expected
}

/// Receiver of percentage notifications
///
/// Notifications are fire-and-forget; implementations must not block.
pub trait ProgressObserver {
    fn on_progress(&mut self, percent: u8);
}

impl<F> ProgressObserver for F
where
    F: FnMut(u8),
{
    fn on_progress(&mut self, percent: u8) {
        self(percent)
    }
}

impl ProgressObserver for Vec<u8> {
    fn on_progress(&mut self, percent: u8) {
        self.push(percent);
    }
}

impl ProgressObserver for ProgressBar {
    fn on_progress(&mut self, percent: u8) {
        self.set_position(u64::from(percent));
    }
}

/// Observer that discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _percent: u8) {}
}

/// Turns a running record count into de-duplicated percentage buckets
pub struct ProgressTracker<'a, O: ProgressObserver + ?Sized> {
    expected: usize,
    processed: usize,
    last_emitted: Option<u8>,
    observer: &'a mut O,
}

impl<'a, O: ProgressObserver + ?Sized> ProgressTracker<'a, O> {
    pub fn new(expected: usize, observer: &'a mut O) -> Self {
        Self {
            expected,
            processed: 0,
            last_emitted: None,
            observer,
        }
    }

    /// Emit the initial 0 notification
    pub fn start(&mut self) {
        self.emit(0);
    }

    /// Count one more opened record and notify if the bucket advanced
    pub fn advance(&mut self) {
        self.processed += 1;
        if let Some(bucket) = bucket(self.processed, self.expected) {
            self.emit(bucket);
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    fn emit(&mut self, percent: u8) {
        if self.last_emitted == Some(percent) {
            return;
        }
        self.last_emitted = Some(percent);
        self.observer.on_progress(percent);
    }
}

/// Percentage bucket rounded half-up and clamped to 100
///
/// Returns `None` when nothing is expected so callers never divide by zero.
pub fn bucket(processed: usize, expected: usize) -> Option<u8> {
    if expected == 0 {
        return None;
    }
    let rounded = (processed.saturating_mul(200) + expected) / (2 * expected);
    Some(rounded.min(100) as u8)
}

/// Progress bar for one reference-list download and parse
pub fn create_source_bar(label: &str) -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:<22} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    pb.set_prefix(label.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_rounds_half_up() {
        assert_eq!(bucket(1, 3), Some(33));
        assert_eq!(bucket(2, 3), Some(67));
        assert_eq!(bucket(1, 200), Some(1)); // 0.5% rounds up
        assert_eq!(bucket(3, 3), Some(100));
    }

    #[test]
    fn test_bucket_zero_expected_is_none() {
        assert_eq!(bucket(0, 0), None);
        assert_eq!(bucket(10, 0), None);
    }

    #[test]
    fn test_bucket_clamps_overshoot() {
        // The estimate can undercount; progress never exceeds 100
        assert_eq!(bucket(7, 5), Some(100));
    }

    #[test]
    fn test_tracker_deduplicates_buckets() {
        let mut seen: Vec<u8> = Vec::new();
        let mut tracker = ProgressTracker::new(1000, &mut seen);
        tracker.start();
        for _ in 0..1000 {
            tracker.advance();
        }

        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
        assert_eq!(seen.len(), 101);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_tracker_zero_expected_only_emits_start() {
        let mut seen: Vec<u8> = Vec::new();
        let mut tracker = ProgressTracker::new(0, &mut seen);
        tracker.start();
        tracker.advance();
        tracker.advance();

        assert_eq!(seen, vec![0]);
    }

    #[test]
    fn test_tracker_with_closure_observer() {
        let mut total = 0u32;
        {
            let mut observer = |p: u8| total += u32::from(p);
            let mut tracker = ProgressTracker::new(2, &mut observer);
            tracker.start();
            tracker.advance();
            tracker.advance();
        }
        assert_eq!(total, 50 + 100);
    }

    #[test]
    fn test_estimate_databases_counts_abbrev() {
        let text = "AC: DB-1\nAbbrev: A\nAC: DB-2\nAbbrev: B\n";
        assert_eq!(estimate_expected(SourceKind::Databases, text), 2);
    }

    #[test]
    fn test_estimate_species_reads_declared_total() {
        let text = "Total number of identification codes currently defined: 27431.\n";
        assert_eq!(estimate_expected(SourceKind::Species, text), 27431);
        assert_eq!(estimate_expected(SourceKind::Species, "no total here"), 0);
    }

    #[test]
    fn test_estimate_pathways_subtracts_header_markers() {
        let text = "// // // //\nID   A.\n//\nID   B.\n//\n";
        assert_eq!(estimate_expected(SourceKind::Pathways, text), 2);
        assert_eq!(estimate_expected(SourceKind::Pathways, "//\n"), 0);
    }

    #[test]
    fn test_estimate_tissues_counts_terminator_lines() {
        let text = "____\nID   Acinus.\nAC   TS-0001\n//\nID   Adipocyte.\nAC   TS-0002\n//\n";
        assert_eq!(estimate_expected(SourceKind::Tissues, text), 2);
    }
}
