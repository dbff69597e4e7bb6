//! Trace ingestion

// Imports
use {
	crate::{
		record::{AccessId, AccessRecord},
		trace::{TraceLine, TraceReader},
	},
	anyhow::Context,
	std::{
		fmt,
		io,
		time::{Duration, Instant},
	},
};

/// Ingester.
///
/// Applies the accesses of a trace, line by line, to an [`AccessSink`].
#[derive(Debug)]
pub struct Ingester {
	/// Current cycle
	current_cycle: u64,

	/// Max lines to ingest.
	///
	/// Once reached, ingestion stops. Already applied lines are kept.
	max_lines: Option<usize>,

	/// Debug output period
	///
	/// Interval in which to output progress
	debug_output_period: Duration,

	/// Summary so far
	summary: ParseSummary,
}

impl Ingester {
	/// Creates a new ingester
	pub fn new(max_lines: Option<usize>, debug_output_period: Duration) -> Self {
		Self {
			current_cycle: 0,
			max_lines,
			debug_output_period,
			summary: ParseSummary::default(),
		}
	}

	/// Returns the current cycle
	pub fn current_cycle(&self) -> u64 {
		self.current_cycle
	}

	/// Resumes from `current_cycle`, such as the latest cycle of a previous chunk of the trace
	pub fn with_cycle(mut self, current_cycle: u64) -> Self {
		self.current_cycle = current_cycle;
		self
	}

	/// Ingests all lines from `lines` into `sink`
	pub fn ingest<S, I>(&mut self, lines: I, sink: &mut S) -> ParseSummary
	where
		S: AccessSink,
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		let mut progress = Progress::new(self.debug_output_period);
		for line in lines {
			if self.reached_max_lines() {
				break;
			}

			self.handle_line(line.as_ref(), sink);
			progress.update(&self.summary);
		}

		self.summary.clone()
	}

	/// Ingests all lines from `reader` into `sink`.
	///
	/// # Errors
	/// Returns an error if unable to read from `reader`.
	/// Malformed lines are *not* errors, they're skipped.
	pub fn ingest_reader<S, R>(&mut self, reader: R, sink: &mut S) -> Result<ParseSummary, anyhow::Error>
	where
		S: AccessSink,
		R: io::BufRead,
	{
		let mut progress = Progress::new(self.debug_output_period);
		let mut trace_reader = TraceReader::new(reader);
		while let Some(line) = trace_reader.read_next().context("Unable to read trace")? {
			if self.reached_max_lines() {
				break;
			}

			self.handle_line(&line, sink);
			progress.update(&self.summary);
		}

		Ok(self.summary.clone())
	}

	/// Handles a single line
	pub fn handle_line<S: AccessSink>(&mut self, line: &str, sink: &mut S) {
		self.summary.lines_read += 1;
		let line_idx = self.summary.lines_read;

		let trace_line = match TraceLine::parse(line) {
			Ok(trace_line) => trace_line,
			Err(err) => {
				tracing::warn!(line_idx, ?line, "Skipping malformed line: {err}");
				self.summary.lines_skipped += 1;
				return;
			},
		};
		tracing::trace!(line_idx, cycle = self.current_cycle, ?trace_line, "Parsed line");

		match trace_line {
			TraceLine::Clock(cycle) => {
				// Note: We never go backwards, or closed accesses could end before they started
				if cycle < self.current_cycle {
					tracing::warn!(line_idx, cycle, current_cycle = self.current_cycle, "Ignoring backwards clock");
					return;
				}

				self.current_cycle = cycle;
				sink.observe_cycle(cycle);
			},

			TraceLine::NewAccess { id, kind, addr } => {
				let record = AccessRecord::open(id, kind, addr, self.current_cycle);
				match sink.insert_if_absent(record) {
					true => self.summary.records_added += 1,
					false => {
						tracing::debug!(line_idx, ?id, "Ignoring duplicate access");
						self.summary.duplicate_ids += 1;
					},
				}
			},

			TraceLine::EndAccess { id } => match sink.close(id, self.current_cycle) {
				CloseOutcome::Closed => self.summary.records_closed += 1,
				CloseOutcome::AlreadyClosed => {
					tracing::debug!(line_idx, ?id, "Ignoring end of already ended access");
					self.summary.already_closed += 1;
				},
				CloseOutcome::Unknown => {
					tracing::debug!(line_idx, ?id, "Ignoring end of unknown access");
					self.summary.unknown_closes += 1;
				},
			},

			TraceLine::Other => (),
		}
	}

	/// Returns if we've reached the max lines, marking the summary if so.
	///
	/// Must only be called when there's another line left.
	fn reached_max_lines(&mut self) -> bool {
		let reached = self.max_lines.is_some_and(|max_lines| self.summary.lines_read >= max_lines);
		if reached {
			self.summary.stopped_early = true;
			tracing::info!(lines_read = self.summary.lines_read, "Reached max lines, stopping");
		}

		reached
	}
}

/// Access sink.
///
/// Receives all access mutations from an [`Ingester`].
pub trait AccessSink {
	/// Inserts an access if no access with the same id exists.
	///
	/// Returns whether it was inserted.
	fn insert_if_absent(&mut self, record: AccessRecord) -> bool;

	/// Closes an access, if it exists and is still open
	fn close(&mut self, id: AccessId, cycle_end: u64) -> CloseOutcome;

	/// Observes a clock cycle
	fn observe_cycle(&mut self, cycle: u64);
}

/// Outcome of [`AccessSink::close`]
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CloseOutcome {
	/// Access was closed
	Closed,

	/// Access was already closed
	AlreadyClosed,

	/// Access doesn't exist
	Unknown,
}

/// Summary of an ingestion
#[derive(PartialEq, Eq, Clone, Default, Debug)]
pub struct ParseSummary {
	/// Lines read
	pub lines_read: usize,

	/// Accesses added
	pub records_added: usize,

	/// Accesses closed
	pub records_closed: usize,

	/// New accesses whose id already existed
	pub duplicate_ids: usize,

	/// Ended accesses whose id didn't exist
	pub unknown_closes: usize,

	/// Ended accesses that were already ended
	pub already_closed: usize,

	/// Malformed lines skipped
	pub lines_skipped: usize,

	/// Whether ingestion stopped before the end of the trace
	pub stopped_early: bool,
}

impl fmt::Display for ParseSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} lines ({} skipped): {} accesses added, {} closed",
			self.lines_read, self.lines_skipped, self.records_added, self.records_closed
		)?;

		if self.duplicate_ids != 0 || self.unknown_closes != 0 || self.already_closed != 0 {
			write!(
				f,
				" (ignored {} duplicate, {} unknown and {} already ended accesses)",
				self.duplicate_ids, self.unknown_closes, self.already_closed
			)?;
		}

		if self.stopped_early {
			write!(f, ", stopped early")?;
		}

		Ok(())
	}
}

/// Progress output
#[derive(Debug)]
struct Progress {
	/// Period
	period: Duration,

	/// Last time we output
	last_output_time: Instant,
}

impl Progress {
	fn new(period: Duration) -> Self {
		// Note: We start in the past so that we output right away at the start
		let now = Instant::now();
		Self {
			period,
			last_output_time: now.checked_sub(period).unwrap_or(now),
		}
	}

	/// Outputs progress, if it's been long enough
	fn update(&mut self, summary: &ParseSummary) {
		let cur_time = Instant::now();
		if cur_time.duration_since(self.last_output_time) >= self.period {
			tracing::info!("Progress: {summary}");
			self.last_output_time = cur_time;
		}
	}
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		crate::{
			record::{AccessKind, KindFilter},
			store::AccessStore,
		},
		pretty_assertions::assert_eq,
	};

	fn ingester() -> Ingester {
		Ingester::new(None, Duration::from_secs(3600))
	}

	#[test]
	fn open_then_close() {
		let mut store = AccessStore::new();
		let summary = ingester().ingest(
			[
				"clk 5",
				r#"new_access name="A-1" type=load addr=0x100"#,
				"clk 10",
				r#"end_access name="A-1""#,
			],
			&mut store,
		);

		assert_eq!(summary.records_added, 1);
		assert_eq!(summary.records_closed, 1);
		assert_eq!(
			store.get(AccessId(1)),
			Some(&AccessRecord {
				id:          AccessId(1),
				kind:        AccessKind::Load,
				address:     256,
				cycle_start: 5,
				cycle_end:   Some(10),
			})
		);
	}

	#[test]
	fn close_before_open_is_unknown() {
		let mut store = AccessStore::new();
		let summary = ingester().ingest(
			[
				r#"end_access name="A-3""#,
				"clk 4",
				r#"new_access name="A-3" type=store addr=16"#,
			],
			&mut store,
		);

		assert_eq!(summary.unknown_closes, 1);
		assert_eq!(summary.records_closed, 0);
		assert_eq!(store.get(AccessId(3)).map(AccessRecord::is_open), Some(true));
	}

	#[test]
	fn malformed_lines_are_skipped() {
		let mut store = AccessStore::new();
		let summary = ingester().ingest(
			[
				r#"mem.new_access name="A-1" type=load"#,
				r#"mem.new_access name="A-2" type=load addr=0x20"#,
				"mem.end_access",
				"some other line",
			],
			&mut store,
		);

		assert_eq!(summary.lines_read, 4);
		assert_eq!(summary.lines_skipped, 2);
		assert_eq!(summary.records_added, 1);
		assert_eq!(store.len(), 1);
	}

	#[test]
	fn backwards_clock_is_ignored() {
		let mut ingester = ingester();
		let mut store = AccessStore::new();
		ingester.ingest(
			[
				"clk 10",
				r#"new_access name="A-1" type=load addr=1"#,
				"clk 3",
				r#"end_access name="A-1""#,
			],
			&mut store,
		);

		assert_eq!(ingester.current_cycle(), 10);
		assert_eq!(store.get(AccessId(1)).and_then(|record| record.cycle_end), Some(10));
	}

	#[test]
	fn counts_ignored_events() {
		let mut store = AccessStore::new();
		let summary = ingester().ingest(
			[
				r#"new_access name="A-1" type=load addr=1"#,
				r#"new_access name="A-1" type=load addr=2"#,
				r#"end_access name="A-1""#,
				r#"end_access name="A-1""#,
				r#"end_access name="A-2""#,
			],
			&mut store,
		);

		assert_eq!(summary.duplicate_ids, 1);
		assert_eq!(summary.already_closed, 1);
		assert_eq!(summary.unknown_closes, 1);
		assert_eq!(
			summary.to_string(),
			"5 lines (0 skipped): 1 accesses added, 1 closed (ignored 1 duplicate, 1 unknown and 1 already ended \
			 accesses)"
		);
	}

	#[test]
	fn max_lines_stops_without_rollback() {
		let lines = [
			"clk 1",
			r#"new_access name="A-1" type=load addr=1"#,
			"clk 2",
			r#"new_access name="A-2" type=load addr=2"#,
		];

		let mut store = AccessStore::new();
		let summary = Ingester::new(Some(2), Duration::from_secs(3600)).ingest(lines, &mut store);
		assert!(summary.stopped_early);
		assert_eq!(summary.lines_read, 2);
		assert_eq!(store.len(), 1);

		// Reaching the limit exactly at the end isn't stopping early
		let mut store = AccessStore::new();
		let summary = Ingester::new(Some(4), Duration::from_secs(3600)).ingest(lines, &mut store);
		assert!(!summary.stopped_early);
		assert_eq!(store.len(), 2);
	}

	#[test]
	fn resumes_from_cycle() {
		let mut store = AccessStore::new();
		ingester().ingest(["clk 100"], &mut store);
		ingester()
			.with_cycle(100)
			.ingest([r#"new_access name="A-1" type=load addr=1"#, "clk 50", r#"end_access name="A-1""#], &mut store);

		let record = store.get(AccessId(1)).expect("Access should exist");
		assert_eq!((record.cycle_start, record.cycle_end), (100, Some(100)));
	}

	#[test]
	fn reader_matches_lines() {
		let trace = b"c clk=5\nmem.new_access name=\"A-1\" type=\"store\" addr=0x40\r\n\xffgarbage\nc clk=9\nmem.end_access name=\"A-1\"\nc clk=12\n";

		let mut store = AccessStore::new();
		let summary = ingester()
			.ingest_reader(&trace[..], &mut store)
			.expect("Unable to ingest");
		assert_eq!(summary.lines_read, 6);
		assert_eq!(summary.records_added, 1);
		assert_eq!(summary.records_closed, 1);
		assert_eq!(store.horizon(), Some(12));
		assert_eq!(
			store
				.query_window(9, 10_000, KindFilter::Store)
				.map(|window| window.addresses),
			Some(vec![0x40])
		);
		assert_eq!(store.query_window(10, 10_000, KindFilter::All), None);

		let mut store = AccessStore::new();
		let summary = Ingester::new(Some(1), Duration::ZERO)
			.ingest_reader(&trace[..], &mut store)
			.expect("Unable to ingest");
		assert!(summary.stopped_early);
		assert_eq!(store.horizon(), Some(5));
	}
}
