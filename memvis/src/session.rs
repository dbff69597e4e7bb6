//! Session

// Imports
use {
	crate::{
		config::Config,
		histogram::Histogram,
		ingest::{Ingester, ParseSummary},
		record::KindFilter,
		store::{AccessStore, Bounds, Window},
	},
	anyhow::Context,
	memvis_util::DisplayWrapper,
	std::{io, time::Duration},
};

/// Session.
///
/// Owns the accesses of a single trace and answers the viewer's queries with the configured window.
#[derive(Debug)]
pub struct Session {
	/// Store
	store: AccessStore,

	/// Config
	config: Config,

	/// Debug output period, from the config
	debug_output_period: Duration,
}

impl Session {
	/// Creates an empty session.
	///
	/// # Errors
	/// Returns an error if `config` is invalid.
	pub fn new(config: Config) -> Result<Self, anyhow::Error> {
		Self::from_store(AccessStore::new(), config)
	}

	/// Creates a session from an existing store
	///
	/// # Errors
	/// Returns an error if `config` is invalid.
	pub fn from_store(store: AccessStore, config: Config) -> Result<Self, anyhow::Error> {
		config.validate().context("Invalid config")?;
		let debug_output_period = config.debug_output_period()?;

		Ok(Self {
			store,
			config,
			debug_output_period,
		})
	}

	/// Returns the store
	pub fn store(&self) -> &AccessStore {
		&self.store
	}

	/// Ingests lines of a trace.
	///
	/// May be called multiple times with consecutive chunks of a trace, each
	/// chunk continues from the latest cycle of the previous ones.
	pub fn ingest<I>(&mut self, lines: I) -> ParseSummary
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		let summary = self.ingester().ingest(lines, &mut self.store);
		self.log_ingested(&summary);

		summary
	}

	/// Ingests lines of a trace from a reader.
	///
	/// See [`Session::ingest`] for ingesting in chunks.
	pub fn ingest_reader<R: io::BufRead>(&mut self, reader: R) -> Result<ParseSummary, anyhow::Error> {
		let summary = self
			.ingester()
			.ingest_reader(reader, &mut self.store)
			.context("Unable to ingest trace")?;
		self.log_ingested(&summary);

		Ok(summary)
	}

	/// Returns the bounds of all accesses
	pub fn bounds(&self) -> Option<Bounds> {
		self.store.bounds()
	}

	/// Queries the window ending at `upper_cycle`
	pub fn query_window(&self, upper_cycle: u64, filter: KindFilter) -> Option<Window> {
		self.store.query_window(upper_cycle, self.config.window_size, filter)
	}

	/// Queries the window ending at `upper_cycle` and builds a histogram of its addresses.
	///
	/// The histogram is `None` if the window has no accesses.
	pub fn histogram(&self, upper_cycle: u64, filter: KindFilter) -> Option<(Window, Option<Histogram>)> {
		let window = self.query_window(upper_cycle, filter)?;
		let histogram = Histogram::new(&window.addresses, self.config.histogram_bins);

		Some((window, histogram))
	}

	/// Returns the upper cycle one step forward of `upper_cycle`
	pub fn step(&self, upper_cycle: u64) -> u64 {
		upper_cycle.saturating_add(self.config.step_cycles)
	}

	/// Creates an ingester continuing from the latest cycle of the store
	fn ingester(&self) -> Ingester {
		Ingester::new(self.config.max_lines, self.debug_output_period)
			.with_cycle(self.store.horizon().unwrap_or(0))
	}

	/// Logs a summary after ingesting
	fn log_ingested(&self, summary: &ParseSummary) {
		tracing::info!("Ingested trace: {summary}");
		tracing::info!(
			"Accesses: {}",
			DisplayWrapper::new(|f| self.store.fmt_debug(f))
		);
	}
}
