//! Stored data.
//!
//! Saves and loads an [`AccessStore`], either with `bincode` (the default database format),
//! or with `json`.

// Imports
use {
	crate::{record::AccessRecord, store::AccessStore},
	anyhow::Context,
	std::{
		fs,
		io::{self, BufReader, BufWriter, Write},
		path::Path,
	},
};

/// Stored data
#[derive(PartialEq, Eq, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct Data {
	/// Format version
	pub version: u32,

	/// Latest cycle observed in the trace
	pub horizon: Option<u64>,

	/// All accesses
	pub records: Vec<AccessRecord>,
}

impl Data {
	/// Current format version
	pub const VERSION: u32 = 1;

	/// Creates the data for a store
	pub fn from_store(store: &AccessStore) -> Self {
		Self {
			version: Self::VERSION,
			horizon: store.horizon(),
			records: store.records().cloned().collect(),
		}
	}

	/// Rebuilds a store from this data
	pub fn into_store(self) -> Result<AccessStore, anyhow::Error> {
		anyhow::ensure!(
			self.version == Self::VERSION,
			"Unsupported data version {}, expected {}",
			self.version,
			Self::VERSION
		);

		let mut store = AccessStore::new();
		for record in self.records {
			let id = record.id;
			if let Some(cycle_end) = record.cycle_end {
				anyhow::ensure!(
					record.cycle_start <= cycle_end,
					"Access {id:?} ends at {cycle_end} before it starts at {}",
					record.cycle_start
				);
			}
			anyhow::ensure!(store.insert_if_absent(record), "Duplicate access {id:?}");
		}
		if let Some(horizon) = self.horizon {
			store.observe_cycle(horizon);
		}

		Ok(store)
	}
}

/// Data format
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[derive(clap::ValueEnum)]
pub enum Format {
	/// `bincode`
	Bincode,

	/// `json`
	Json,
}

impl Format {
	/// Guesses the format from a path's extension.
	///
	/// Anything other than `.json` is `bincode`.
	pub fn from_path(path: &Path) -> Self {
		match path.extension().and_then(|ext| ext.to_str()) {
			Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
			_ => Self::Bincode,
		}
	}
}

/// Writes data to a writer
pub fn write<W: io::Write>(mut writer: W, data: &Data, format: Format) -> Result<(), anyhow::Error> {
	match format {
		Format::Bincode => {
			bincode::encode_into_std_write(data, &mut writer, bincode::config::standard())
				.context("Unable to encode data")?;
		},
		Format::Json => serde_json::to_writer(&mut writer, data).context("Unable to serialize data")?,
	}

	writer.flush().context("Unable to flush data")
}

/// Reads data from a reader
pub fn read<R: io::Read>(mut reader: R, format: Format) -> Result<Data, anyhow::Error> {
	match format {
		Format::Bincode =>
			bincode::decode_from_std_read(&mut reader, bincode::config::standard()).context("Unable to decode data"),
		Format::Json => serde_json::from_reader(reader).context("Unable to deserialize data"),
	}
}

/// Saves a store to `path`
pub fn save(path: &Path, store: &AccessStore, format: Format) -> Result<(), anyhow::Error> {
	let file = fs::File::create(path).with_context(|| format!("Unable to create {path:?}"))?;
	self::write(BufWriter::new(file), &Data::from_store(store), format)
		.with_context(|| format!("Unable to write {path:?}"))
}

/// Loads a store from `path`
pub fn load(path: &Path, format: Format) -> Result<AccessStore, anyhow::Error> {
	let file = fs::File::open(path).with_context(|| format!("Unable to open {path:?}"))?;
	let data = self::read(BufReader::new(file), format).with_context(|| format!("Unable to read {path:?}"))?;
	data.into_store().with_context(|| format!("Invalid data in {path:?}"))
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		crate::record::{AccessId, AccessKind},
		pretty_assertions::assert_eq,
	};

	fn store() -> AccessStore {
		let mut store = AccessStore::new();
		store.insert_if_absent(AccessRecord::open(AccessId(1), AccessKind::Load, 0x100, 5));
		store.insert_if_absent(AccessRecord::open(AccessId(2), AccessKind::Other("nc_store".to_owned()), 0x200, 6));
		store.close(AccessId(1), 10);
		store.observe_cycle(12);
		store
	}

	#[test]
	fn rebuilds_store() {
		for format in [Format::Bincode, Format::Json] {
			let mut bytes = Vec::<u8>::new();
			super::write(&mut bytes, &Data::from_store(&store()), format).expect("Unable to write data");
			let loaded = super::read(&bytes[..], format)
				.and_then(Data::into_store)
				.expect("Unable to read data");

			assert_eq!(loaded, store(), "Format {format:?}");
		}
	}

	#[test]
	fn rejects_invalid_data() {
		let record = AccessRecord::open(AccessId(1), AccessKind::Load, 0x100, 5);
		let duplicate = Data {
			version: Data::VERSION,
			horizon: None,
			records: vec![record.clone(), record.clone()],
		};
		assert!(duplicate.into_store().is_err());

		let backwards = Data {
			version: Data::VERSION,
			horizon: None,
			records: vec![AccessRecord {
				cycle_end: Some(1),
				..record.clone()
			}],
		};
		assert!(backwards.into_store().is_err());

		let future = Data {
			version: Data::VERSION + 1,
			horizon: None,
			records: vec![record],
		};
		assert!(future.into_store().is_err());
	}

	#[test]
	fn format_from_path() {
		assert_eq!(Format::from_path(Path::new("trace.db")), Format::Bincode);
		assert_eq!(Format::from_path(Path::new("trace.JSON")), Format::Json);
		assert_eq!(Format::from_path(Path::new("trace")), Format::Bincode);
	}
}
