//! Configuration

// Imports
use {anyhow::Context, std::time::Duration};

/// Configuration.
///
/// Any missing fields use their defaults.
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Window size, in cycles.
	///
	/// Windows start at `upper_cycle - window_size`, or at cycle 0 before that.
	pub window_size: u64,

	/// Cycles to move forward on each step
	pub step_cycles: u64,

	/// Number of histogram bins
	pub histogram_bins: usize,

	/// Progress output period while ingesting (in seconds)
	pub debug_output_period_secs: f64,

	/// Max number of trace lines to ingest
	pub max_lines: Option<usize>,
}

impl Config {
	/// Parses a configuration from a json reader
	pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, anyhow::Error> {
		let config = serde_json::from_reader::<_, Self>(reader).context("Unable to parse config")?;
		config.validate()?;

		Ok(config)
	}

	/// Validates this configuration
	pub fn validate(&self) -> Result<(), anyhow::Error> {
		anyhow::ensure!(self.histogram_bins > 0, "Histogram must have at least 1 bin");
		self.debug_output_period()?;

		Ok(())
	}

	/// Returns the debug output period
	pub fn debug_output_period(&self) -> Result<Duration, anyhow::Error> {
		Duration::try_from_secs_f64(self.debug_output_period_secs).with_context(|| {
			format!(
				"Invalid debug output period: {}s",
				self.debug_output_period_secs
			)
		})
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			window_size:              10_000,
			step_cycles:              1_000,
			histogram_bins:           20,
			debug_output_period_secs: 1.0,
			max_lines:                None,
		}
	}
}
