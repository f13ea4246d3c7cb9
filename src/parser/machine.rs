//! Generic line-driven record accumulator
//!
//! One state machine serves every reference list. It tracks whether the
//! data region has been entered, the record currently being built and the
//! last tag seen, and delegates everything format-specific to the
//! [`FormatSpec`] it was given.

use super::format::{Cardinality, CloseRule, FormatSpec, LineClass};
use crate::constants::JOIN_SEPARATOR;
use crate::error::{Result, UniprotError};
use crate::models::{ParseOutput, ParseStats, Record, RecordSet};
use crate::progress::{ProgressObserver, ProgressTracker};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Accumulates classified lines into records for one parse invocation
pub struct RecordAccumulator<'a, O: ProgressObserver + ?Sized> {
    spec: &'a FormatSpec,
    in_region: bool,
    current: Option<Record>,
    last_tag: Option<&'static str>,
    pending: Vec<(&'static str, String)>,
    records: RecordSet,
    stats: ParseStats,
    progress: ProgressTracker<'a, O>,
}

impl<'a, O: ProgressObserver + ?Sized> RecordAccumulator<'a, O> {
    pub fn new(spec: &'a FormatSpec, expected: usize, observer: &'a mut O) -> Self {
        let mut progress = ProgressTracker::new(expected, observer);
        progress.start();

        Self {
            spec,
            in_region: spec.region.starts_open(),
            current: None,
            last_tag: None,
            pending: Vec::new(),
            records: RecordSet::new(),
            stats: ParseStats {
                expected_records: expected,
                ..ParseStats::default()
            },
            progress,
        }
    }

    /// Feed one physical line
    pub fn feed(&mut self, raw: &str) {
        self.stats.lines_read += 1;
        let line = raw.trim_end_matches(['\n', '\r']);

        if self
            .spec
            .skip_containing
            .is_some_and(|needle| line.contains(needle))
        {
            return;
        }

        if let Some(start) = self.spec.region.start() {
            if start.matches(line) {
                self.in_region = true;
                return;
            }
        }
        if !self.in_region {
            return;
        }
        if let Some(end) = self.spec.region.end() {
            if end.matches(line) {
                self.close_current();
                self.in_region = false;
                return;
            }
        }

        match self.spec.classify(line) {
            LineClass::Terminator if self.spec.close == CloseRule::Terminator => {
                self.close_current();
                self.pending.clear();
            }
            LineClass::Blank if self.spec.close == CloseRule::BlankLine => {
                self.close_current();
            }
            LineClass::Open { id, fields } => self.open(id, fields),
            LineClass::Fields(fields) => {
                for (tag, value) in fields {
                    self.field(tag, value);
                }
            }
            LineClass::Blank | LineClass::Terminator | LineClass::Unknown => {
                self.stats.lines_ignored += 1;
            }
        }
    }

    /// Finalise the pass and hand over the record set
    ///
    /// A record still open at end of input is kept when it has a primary
    /// identifier.
    pub fn finish(mut self) -> ParseOutput {
        if self.current.is_some() {
            self.stats.finalized_at_eof += 1;
            self.close_current();
        }

        for id in self.spec.drop_ids {
            if self.records.remove(id).is_some() {
                debug!("Dropped {} record {}", self.spec.kind, id);
            }
        }

        debug!(
            "Parsed {}: {} records from {} lines ({} ignored, {} duplicates replaced)",
            self.spec.kind,
            self.records.len(),
            self.stats.lines_read,
            self.stats.lines_ignored,
            self.stats.duplicates_replaced
        );

        ParseOutput {
            records: self.records,
            stats: self.stats,
        }
    }

    fn open(&mut self, id: String, fields: Vec<(&'static str, String)>) {
        self.close_current();

        let mut record = Record::new(id);
        self.last_tag = None;
        for (tag, value) in std::mem::take(&mut self.pending) {
            apply(self.spec, &mut record, &mut self.last_tag, tag, value);
        }
        for (tag, value) in fields {
            apply(self.spec, &mut record, &mut self.last_tag, tag, value);
        }
        self.last_tag = Some(self.spec.open_tag);
        self.current = Some(record);

        self.stats.records_opened += 1;
        self.progress.advance();
    }

    fn field(&mut self, tag: &'static str, value: String) {
        match self.current.as_mut() {
            Some(record) => apply(self.spec, record, &mut self.last_tag, tag, value),
            None if self.spec.buffer_before_open => self.pending.push((tag, value)),
            None => self.stats.lines_ignored += 1,
        }
    }

    fn close_current(&mut self) {
        self.last_tag = None;
        let Some(record) = self.current.take() else {
            return;
        };
        if record.id.is_empty() {
            self.stats.lines_ignored += 1;
            return;
        }

        let id = record.id.clone();
        if self.records.insert(record).is_some() {
            self.stats.duplicates_replaced += 1;
            warn!(
                "Duplicate {} identifier '{}': earlier record replaced",
                self.spec.kind, id
            );
        }
    }
}

fn apply(
    spec: &FormatSpec,
    record: &mut Record,
    last_tag: &mut Option<&'static str>,
    tag: &'static str,
    value: String,
) {
    match spec.cardinality(tag) {
        Cardinality::Single => record.set(tag, value),
        Cardinality::Joined if *last_tag == Some(tag) && record.get(tag).is_some() => {
            record.append(tag, &value, JOIN_SEPARATOR)
        }
        Cardinality::Joined => record.set(tag, value),
        Cardinality::List => record.push(tag, value),
    }
    *last_tag = Some(tag);
}

/// Run one full pass of the state machine over a payload
///
/// The cancellation token is checked before every line; a cancelled parse
/// returns an error and never a partial record set.
pub fn parse_text<O: ProgressObserver + ?Sized>(
    spec: &FormatSpec,
    text: &str,
    expected: usize,
    observer: &mut O,
    cancel: Option<&CancellationToken>,
) -> Result<ParseOutput> {
    let mut accumulator = RecordAccumulator::new(spec, expected, observer);

    for line in text.lines() {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(UniprotError::cancelled(format!(
                "{} parse abandoned after {} lines",
                spec.kind, accumulator.stats.lines_read
            )));
        }
        accumulator.feed(line);
    }

    Ok(accumulator.finish())
}
