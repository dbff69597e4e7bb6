//! Logger

// Imports
use {
	std::{fs, path::Path, sync::Mutex},
	tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter},
};

/// Initializes the logger.
///
/// Logs to stderr, filtered by `RUST_LOG` (defaults to `info`).
/// If `log_file` is specified, additionally logs to it, filtered by `RUST_LOG_FILE` (defaults to `debug`).
///
/// Any messages logged through [`pre_init`] are emitted right after.
pub fn init(log_file: Option<&Path>, log_file_append: bool) {
	let term_layer = tracing_subscriber::fmt::layer()
		.with_writer(std::io::stderr)
		.with_filter(self::env_filter("RUST_LOG", LevelFilter::INFO));

	// Note: We don't fail if we can't open the log file, we just
	//       warn once the logger is up.
	let mut log_file_err = None;
	let file_layer = log_file.and_then(|log_file| {
		let file = fs::OpenOptions::new()
			.create(true)
			.write(true)
			.append(log_file_append)
			.truncate(!log_file_append)
			.open(log_file);
		match file {
			Ok(file) => Some(
				tracing_subscriber::fmt::layer()
					.with_ansi(false)
					.with_writer(Mutex::new(file))
					.with_filter(self::env_filter("RUST_LOG_FILE", LevelFilter::DEBUG)),
			),
			Err(err) => {
				log_file_err = Some((log_file.to_path_buf(), err));
				None
			},
		}
	});

	tracing_subscriber::registry().with(term_layer).with(file_layer).init();

	if let Some((path, err)) = log_file_err {
		tracing::warn!(?path, ?err, "Unable to open log file");
	}

	pre_init::flush();
}

/// Creates the env filter from `var`, falling back to `default`
fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
	EnvFilter::builder()
		.with_default_directive(default.into())
		.with_env_var(var)
		.from_env_lossy()
}

/// Logging before the logger is initialized.
///
/// Messages are buffered and emitted once [`init`](super::init) is called.
pub mod pre_init {
	// Imports
	use std::sync::Mutex;

	/// Buffered debug messages
	static MESSAGES: Mutex<Vec<String>> = Mutex::new(Vec::new());

	/// Buffers a debug message
	pub fn debug(msg: impl Into<String>) {
		// Note: A poisoned lock only means another thread panicked while pushing, the data is still fine.
		let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
		messages.push(msg.into());
	}

	/// Emits all buffered messages
	pub(super) fn flush() {
		let messages = std::mem::take(&mut *MESSAGES.lock().unwrap_or_else(|err| err.into_inner()));
		for msg in messages {
			tracing::debug!("{msg}");
		}
	}
}
