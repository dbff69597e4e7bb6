//! Memory access visualizer (`memvis`)

// Modules
mod args;
mod render;

// Imports
use {
	self::args::{Args, Input, SubCmd},
	anyhow::Context,
	clap::Parser,
	memvis::{data, Config, Session},
	memvis_util::logger,
	std::{
		fs,
		io::{self, BufReader, Write},
		path::{Path, PathBuf},
	},
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Read the config file, if any
	let config = match &args.config_file {
		Some(config_file) => {
			let config_file = fs::File::open(config_file).context("Unable to open config file")?;
			Config::from_reader(BufReader::new(config_file)).context("Unable to parse config file")?
		},
		None => Config::default(),
	};
	tracing::debug!(?config, "Loaded config");

	match args.sub_cmd {
		SubCmd::Parse(cmd_args) => self::parse(cmd_args, config),
		SubCmd::Hist(cmd_args) => self::hist(cmd_args, config),
		SubCmd::Bounds(cmd_args) => self::bounds(cmd_args, config),
	}
}

/// Parses a trace and saves it as a database
fn parse(cmd_args: args::Parse, mut config: Config) -> Result<(), anyhow::Error> {
	if let Some(max_lines) = cmd_args.max_lines {
		config.max_lines = Some(max_lines);
	}

	let session = self::ingest_trace(&cmd_args.trace_file, config)?;

	let output_file = cmd_args.output_file.unwrap_or_else(|| {
		let mut output_file = cmd_args.trace_file.clone().into_os_string();
		output_file.push(".db");
		PathBuf::from(output_file)
	});
	let format = cmd_args
		.format
		.unwrap_or_else(|| data::Format::from_path(&output_file));
	data::save(&output_file, session.store(), format).context("Unable to save database")?;
	tracing::info!(?output_file, ?format, "Saved database");

	self::print_bounds(&session);

	Ok(())
}

/// Shows histograms of the addresses accessed within a window of cycles
fn hist(cmd_args: args::Hist, mut config: Config) -> Result<(), anyhow::Error> {
	if let Some(window_size) = cmd_args.window_size {
		config.window_size = window_size;
	}
	if let Some(bins) = cmd_args.bins {
		config.histogram_bins = bins;
	}
	if let Some(step_cycles) = cmd_args.step_cycles {
		config.step_cycles = step_cycles;
	}
	let session = self::load_session(&cmd_args.input, config)?;
	let Some(bounds) = session.bounds() else {
		println!("No accesses found");
		return Ok(());
	};

	let mut stdout = io::stdout().lock();
	let mut upper_cycle = cmd_args.cycle;
	for step_idx in 0..=cmd_args.steps {
		if step_idx != 0 {
			upper_cycle = session.step(upper_cycle);
			writeln!(stdout).context("Unable to write histogram")?;
		}

		let Some((window, histogram)) = session.histogram(upper_cycle, cmd_args.kind) else {
			writeln!(
				stdout,
				"Cycle {upper_cycle} is past the last cycle {}, nothing to show",
				bounds.max_cycle
			)
			.context("Unable to write histogram")?;
			break;
		};
		render::histogram(&mut stdout, &window, histogram.as_ref(), &bounds, cmd_args.bar_width)
			.context("Unable to write histogram")?;
	}

	Ok(())
}

/// Shows the address and cycle bounds of all accesses
fn bounds(cmd_args: args::Bounds, config: Config) -> Result<(), anyhow::Error> {
	let session = self::load_session(&cmd_args.input, config)?;
	self::print_bounds(&session);

	Ok(())
}

/// Prints the bounds of a session
fn print_bounds(session: &Session) {
	match session.bounds() {
		Some(bounds) => {
			println!("Accesses: {}", session.store().len());
			println!("Addresses: {:#x} - {:#x}", bounds.min_addr, bounds.max_addr);
			println!("Last cycle: {}", bounds.max_cycle);
		},
		None => println!("No accesses found"),
	}
}

/// Loads a session from either a trace or a database
fn load_session(input: &Input, config: Config) -> Result<Session, anyhow::Error> {
	match (&input.trace_file, &input.database_file) {
		(Some(trace_file), _) => self::ingest_trace(trace_file, config),
		(None, Some(database_file)) => {
			let format = data::Format::from_path(database_file);
			let store = data::load(database_file, format).context("Unable to load database")?;
			tracing::info!(?database_file, accesses = store.len(), "Loaded database");
			Session::from_store(store, config)
		},
		(None, None) => anyhow::bail!("Either a trace or a database must be given"),
	}
}

/// Ingests a trace file into a new session
fn ingest_trace(trace_file: &Path, config: Config) -> Result<Session, anyhow::Error> {
	let file = fs::File::open(trace_file).with_context(|| format!("Unable to open trace file {trace_file:?}"))?;

	let mut session = Session::new(config)?;
	let summary = session
		.ingest_reader(BufReader::new(file))
		.with_context(|| format!("Unable to parse trace file {trace_file:?}"))?;
	println!("{summary}");

	Ok(session)
}
