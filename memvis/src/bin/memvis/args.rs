//! Arguments

// Imports
use {
	memvis::{data, KindFilter},
	std::path::PathBuf,
};

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Config file
	#[clap(long = "config")]
	pub config_file: Option<PathBuf>,

	/// Sub-command
	#[command(subcommand)]
	pub sub_cmd: SubCmd,
}

/// Sub-command
#[derive(Debug, clap::Subcommand)]
pub enum SubCmd {
	#[clap(name = "parse")]
	Parse(Parse),

	#[clap(name = "hist")]
	Hist(Hist),

	#[clap(name = "bounds")]
	Bounds(Bounds),
}

/// Parses a trace and saves it as a database
#[derive(Debug, clap::Args)]
pub struct Parse {
	/// Trace file
	pub trace_file: PathBuf,

	/// Output database.
	///
	/// Defaults to the trace file with `.db` appended.
	#[clap(short = 'o', long = "output")]
	pub output_file: Option<PathBuf>,

	/// Output format.
	///
	/// Defaults to `json` if the output ends in `.json`, else `bincode`
	#[clap(long = "format", value_enum)]
	pub format: Option<data::Format>,

	/// Max trace lines to parse
	#[clap(long = "max-lines")]
	pub max_lines: Option<usize>,
}

/// Shows histograms of the addresses accessed within a window of cycles
#[derive(Debug, clap::Args)]
pub struct Hist {
	/// Input
	#[clap(flatten)]
	pub input: Input,

	/// Cycle the (first) window ends at
	#[clap(long = "cycle")]
	pub cycle: u64,

	/// Accesses to show
	#[clap(long = "kind", value_enum, default_value_t = KindFilter::All)]
	pub kind: KindFilter,

	/// Window size, in cycles
	#[clap(long = "window")]
	pub window_size: Option<u64>,

	/// Number of bins
	#[clap(long = "bins")]
	pub bins: Option<usize>,

	/// Number of additional windows to show, each one step forward
	#[clap(long = "steps", default_value_t = 0)]
	pub steps: usize,

	/// Cycles per step
	#[clap(long = "step-cycles")]
	pub step_cycles: Option<u64>,

	/// Width of the widest bar
	#[clap(long = "bar-width", default_value_t = 50)]
	pub bar_width: usize,
}

/// Shows the address and cycle bounds of all accesses
#[derive(Debug, clap::Args)]
pub struct Bounds {
	/// Input
	#[clap(flatten)]
	pub input: Input,
}

/// Input, either a trace or a database
#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
pub struct Input {
	/// Trace file to parse
	#[clap(long = "trace")]
	pub trace_file: Option<PathBuf>,

	/// Database file, created by `parse`
	#[clap(long = "database")]
	pub database_file: Option<PathBuf>,
}
