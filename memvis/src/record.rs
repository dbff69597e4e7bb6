//! Access records

// Imports
use std::fmt;

/// Access id.
///
/// Assigned by the trace as `A-<n>`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct AccessId(pub u64);

impl fmt::Debug for AccessId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "A-{}", self.0)
	}
}

/// Access kind
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub enum AccessKind {
	/// Load
	Load,

	/// Store
	Store,

	/// Any other kind, kept verbatim
	Other(String),
}

impl AccessKind {
	/// Creates an access kind from the trace's `type` field
	pub fn from_trace(kind: &str) -> Self {
		match kind {
			"load" => Self::Load,
			"store" => Self::Store,
			kind => Self::Other(kind.to_owned()),
		}
	}

	/// Returns the name of this kind, as it appears in the trace
	pub fn as_str(&self) -> &str {
		match self {
			Self::Load => "load",
			Self::Store => "store",
			Self::Other(kind) => kind,
		}
	}
}

impl fmt::Display for AccessKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.pad(self.as_str())
	}
}

/// Access kind filter for window queries
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(clap::ValueEnum)]
pub enum KindFilter {
	/// All accesses
	#[default]
	All,

	/// Only loads
	Load,

	/// Only stores
	Store,
}

impl KindFilter {
	/// Returns if `kind` passes this filter
	pub fn matches(self, kind: &AccessKind) -> bool {
		match self {
			Self::All => true,
			Self::Load => *kind == AccessKind::Load,
			Self::Store => *kind == AccessKind::Store,
		}
	}
}

/// A memory access observed in the trace
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct AccessRecord {
	/// Id
	pub id: AccessId,

	/// Kind
	pub kind: AccessKind,

	/// Address
	pub address: u64,

	/// Cycle the access started at
	pub cycle_start: u64,

	/// Cycle the access ended at, if closed
	pub cycle_end: Option<u64>,
}

impl AccessRecord {
	/// Creates a new open access
	pub fn open(id: AccessId, kind: AccessKind, address: u64, cycle_start: u64) -> Self {
		Self {
			id,
			kind,
			address,
			cycle_start,
			cycle_end: None,
		}
	}

	/// Returns if this access is still open
	pub fn is_open(&self) -> bool {
		self.cycle_end.is_none()
	}

	/// Returns the duration of this access, if closed
	pub fn duration(&self) -> Option<u64> {
		self.cycle_end.map(|cycle_end| cycle_end.saturating_sub(self.cycle_start))
	}

	/// Returns if this access overlaps the window `lower..upper`.
	///
	/// Open accesses are considered to never end.
	pub fn overlaps(&self, lower: u64, upper: u64) -> bool {
		let ends_after_lower = self.cycle_end.map_or(true, |cycle_end| cycle_end > lower);
		ends_after_lower && self.cycle_start < upper
	}
}
