//! Multi2Sim memory trace parsing.
//!
//! The trace is line oriented. We only care about 3 kinds of lines:
//!
//! - `c clk=<cycle>`: Sets the current cycle.
//! - `mem.new_access name="A-<id>" type="<kind>" ... addr=<addr>`: Starts an access.
//! - `mem.end_access name="A-<id>"`: Ends an access.
//!
//! Everything else is ignored.

// Imports
use {
	crate::record::{AccessId, AccessKind},
	anyhow::Context,
	memvis_util::ParseIntLiteral,
	std::{borrow::Cow, io, num::ParseIntError},
};

/// A classified trace line
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum TraceLine {
	/// Clock update
	Clock(u64),

	/// Access started
	NewAccess {
		id:   AccessId,
		kind: AccessKind,
		addr: u64,
	},

	/// Access ended
	EndAccess { id: AccessId },

	/// Any other line
	Other,
}

impl TraceLine {
	/// Marker for new accesses
	pub const NEW_ACCESS_MARKER: &'static str = "new_access";

	/// Marker for ended accesses
	pub const END_ACCESS_MARKER: &'static str = "end_access";

	/// Marker for clock updates
	pub const CLOCK_MARKER: &'static str = "clk";

	/// Classifies a line.
	///
	/// # Errors
	/// Returns an error if the line has a marker, but is missing any required fields for it.
	pub fn parse(line: &str) -> Result<Self, ParseLineError> {
		// Note: The clock marker wins over the access markers if a line has both.
		let mut tokens = line.split_whitespace();
		while let Some(token) = tokens.next() {
			// Either `clk=<cycle>` or `clk <cycle>`
			let cycle = match token.strip_prefix(Self::CLOCK_MARKER) {
				Some("") => tokens.next().unwrap_or(""),
				Some(rest) => match rest.strip_prefix('=') {
					Some(cycle) => cycle,
					None => continue,
				},
				None => continue,
			};

			return self::parse_cycle(cycle).map(Self::Clock);
		}

		let mut tokens = line.split_whitespace();
		if tokens.clone().any(|token| token.ends_with(Self::NEW_ACCESS_MARKER)) {
			let id = self::parse_id(self::field(line, "name")?)?;
			let kind = self::parse_kind(self::field(line, "type")?)?;
			let addr = self::parse_addr(self::field(line, "addr")?)?;
			return Ok(Self::NewAccess { id, kind, addr });
		}

		if tokens.any(|token| token.ends_with(Self::END_ACCESS_MARKER)) {
			let id = self::parse_id(self::field(line, "name")?)?;
			return Ok(Self::EndAccess { id });
		}

		Ok(Self::Other)
	}
}

/// Error for [`TraceLine::parse`]
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
pub enum ParseLineError {
	/// Missing a field
	#[error("Missing field `{field}=`")]
	MissingField { field: &'static str },

	/// Name wasn't `A-<id>`
	#[error("Invalid access name {name:?}, expected `A-<id>`")]
	InvalidName { name: String },

	/// Type wasn't a word
	#[error("Invalid access type {kind:?}")]
	InvalidKind { kind: String },

	/// Invalid address
	#[error("Invalid address {addr:?}")]
	InvalidAddress {
		addr: String,
		#[source]
		err:  ParseIntError,
	},

	/// Clock marker without a cycle
	#[error("Invalid cycle {cycle:?} after clock marker")]
	InvalidCycle { cycle: String },
}

/// Returns the value of field `name` in `line`.
///
/// Fields are `<name>=<value>`, with `value` optionally quoted.
fn field<'a>(line: &'a str, name: &'static str) -> Result<&'a str, ParseLineError> {
	line.split_whitespace()
		.find_map(|token| token.strip_prefix(name)?.strip_prefix('='))
		.map(|value| value.trim_matches('"'))
		.ok_or(ParseLineError::MissingField { field: name })
}

/// Parses an access id from `A-<id>`
fn parse_id(name: &str) -> Result<AccessId, ParseLineError> {
	let invalid = || ParseLineError::InvalidName { name: name.to_owned() };

	// Note: `u64::from_str` accepts a leading `+`, which we don't
	let id = name.strip_prefix("A-").ok_or_else(invalid)?;
	match id.bytes().all(|ch| ch.is_ascii_digit()) {
		true => id.parse::<u64>().map(AccessId).map_err(|_| invalid()),
		false => Err(invalid()),
	}
}

/// Parses an access kind, which must be a word
fn parse_kind(kind: &str) -> Result<AccessKind, ParseLineError> {
	let is_word = !kind.is_empty() && kind.chars().all(|ch| ch.is_alphanumeric() || ch == '_');
	match is_word {
		true => Ok(AccessKind::from_trace(kind)),
		false => Err(ParseLineError::InvalidKind { kind: kind.to_owned() }),
	}
}

/// Parses an address in any base
fn parse_addr(addr: &str) -> Result<u64, ParseLineError> {
	addr.parse_int_literal()
		.map_err(|err| ParseLineError::InvalidAddress {
			addr: addr.to_owned(),
			err,
		})
}

/// Parses the leading decimal digits of `cycle`
fn parse_cycle(cycle: &str) -> Result<u64, ParseLineError> {
	let digits_len = cycle.bytes().take_while(u8::is_ascii_digit).count();
	cycle[..digits_len]
		.parse::<u64>()
		.map_err(|_| ParseLineError::InvalidCycle { cycle: cycle.to_owned() })
}

/// Trace reader.
///
/// Reads a trace line by line, without any classification.
#[derive(Debug)]
pub struct TraceReader<R> {
	/// Reader
	reader: R,

	/// Current line
	line: Vec<u8>,

	/// Lines read so far
	lines_read: usize,
}

impl<R: io::BufRead> TraceReader<R> {
	/// Creates a new trace reader
	pub fn new(reader: R) -> Self {
		Self {
			reader,
			line: vec![],
			lines_read: 0,
		}
	}

	/// Reads the next line.
	///
	/// Invalid UTF-8 is replaced, so that a single corrupt line doesn't stop the whole trace.
	pub fn read_next(&mut self) -> Result<Option<Cow<'_, str>>, anyhow::Error> {
		self.line.clear();
		let bytes_read = self
			.reader
			.read_until(b'\n', &mut self.line)
			.with_context(|| format!("Unable to read line {}", self.lines_read + 1))?;
		if bytes_read == 0 {
			return Ok(None);
		}
		self.lines_read += 1;

		// Pop the newline
		if self.line.ends_with(b"\n") {
			self.line.pop();
		}
		if self.line.ends_with(b"\r") {
			self.line.pop();
		}

		Ok(Some(String::from_utf8_lossy(&self.line)))
	}
}
