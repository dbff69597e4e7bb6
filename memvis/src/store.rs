//! Access store

// Imports
use {
	crate::{
		ingest::{AccessSink, CloseOutcome},
		record::{AccessId, AccessRecord, KindFilter},
	},
	std::{
		collections::{btree_map, BTreeMap, BTreeSet},
		fmt,
		ops::Bound,
	},
};

/// Access store.
///
/// Holds all accesses of a trace and answers window queries on them.
/// Accesses are never removed.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct AccessStore {
	/// All accesses, by their id
	records: BTreeMap<AccessId, AccessRecord>,

	/// Accesses by their start cycle
	by_start: BTreeSet<(u64, AccessId)>,

	/// Closed accesses by their end cycle
	by_end: BTreeSet<(u64, AccessId)>,

	/// Open accesses
	open: BTreeSet<AccessId>,

	/// Address range of all accesses
	addr_range: Option<(u64, u64)>,

	/// Latest cycle observed in the trace.
	///
	/// Only used to resume ingesting, it's not part of the bounds.
	horizon: Option<u64>,
}

impl AccessStore {
	/// Creates an empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the number of accesses
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Returns if there are no accesses
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Returns an access
	pub fn get(&self, id: AccessId) -> Option<&AccessRecord> {
		self.records.get(&id)
	}

	/// Returns all accesses, ordered by id
	pub fn records(&self) -> impl ExactSizeIterator<Item = &AccessRecord> + '_ {
		self.records.values()
	}

	/// Returns the latest cycle observed in the trace
	pub fn horizon(&self) -> Option<u64> {
		self.horizon
	}

	/// Inserts an access, if no access with the same id exists.
	///
	/// Returns whether it was inserted.
	pub fn insert_if_absent(&mut self, record: AccessRecord) -> bool {
		let btree_map::Entry::Vacant(entry) = self.records.entry(record.id) else {
			return false;
		};

		self.by_start.insert((record.cycle_start, record.id));
		match record.cycle_end {
			Some(cycle_end) => self.by_end.insert((cycle_end, record.id)),
			None => self.open.insert(record.id),
		};
		self.addr_range = Some(match self.addr_range {
			Some((min, max)) => (min.min(record.address), max.max(record.address)),
			None => (record.address, record.address),
		});

		entry.insert(record);
		true
	}

	/// Closes an access, if it exists and is still open
	pub fn close(&mut self, id: AccessId, cycle_end: u64) -> CloseOutcome {
		let Some(record) = self.records.get_mut(&id) else {
			return CloseOutcome::Unknown;
		};
		if !record.is_open() {
			return CloseOutcome::AlreadyClosed;
		}

		record.cycle_end = Some(cycle_end);
		self.open.remove(&id);
		self.by_end.insert((cycle_end, id));

		CloseOutcome::Closed
	}

	/// Observes a cycle of the trace, extending the horizon if later.
	///
	/// Doesn't change the bounds, which only depend on the accesses themselves.
	pub fn observe_cycle(&mut self, cycle: u64) {
		self.horizon = Some(self.horizon.map_or(cycle, |horizon| horizon.max(cycle)));
	}

	/// Returns the bounds of all accesses, or `None` if empty.
	///
	/// The max cycle is the latest end of a closed access, or the latest start
	/// of an open access, whichever is later.
	pub fn bounds(&self) -> Option<Bounds> {
		let (min_addr, max_addr) = self.addr_range?;

		// Note: Closed accesses end after they start, so the latest start
		//       only matters when it's from an open access.
		let max_cycle = [
			self.by_end.last().map(|&(cycle_end, _)| cycle_end),
			self.by_start.last().map(|&(cycle_start, _)| cycle_start),
		]
		.into_iter()
		.flatten()
		.max()?;

		Some(Bounds {
			min_addr,
			max_addr,
			max_cycle,
		})
	}

	/// Queries all accesses in the window ending at `upper_cycle` and spanning (at most) `window_size` cycles.
	///
	/// An access is within the window if it ends after the window's lower bound and starts before
	/// `upper_cycle`. Open accesses never end.
	///
	/// Returns `None` if the store is empty or if `upper_cycle` is past the latest cycle.
	pub fn query_window(&self, upper_cycle: u64, window_size: u64, filter: KindFilter) -> Option<Window> {
		let bounds = self.bounds()?;
		if upper_cycle > bounds.max_cycle {
			tracing::debug!(upper_cycle, max_cycle = bounds.max_cycle, "Window is past the latest cycle");
			return None;
		}
		let lower_cycle = upper_cycle.saturating_sub(window_size);

		// Walk whichever index covers the smaller span of cycles.
		// Note: `by_start` covers `0..upper`, while `by_end` covers `lower..max` (plus all open accesses)
		let records: Box<dyn Iterator<Item = &AccessRecord> + '_> = match upper_cycle <= bounds.max_cycle - lower_cycle {
			true => Box::new(
				self.by_start
					.range(..(upper_cycle, AccessId(0)))
					.map(|(_, id)| self.record(*id)),
			),
			false => Box::new(
				self.by_end
					.range((Bound::Excluded((lower_cycle, AccessId(u64::MAX))), Bound::Unbounded))
					.map(|(_, id)| id)
					.chain(&self.open)
					.map(|id| self.record(*id)),
			),
		};

		let addresses = records
			.filter(|record| record.overlaps(lower_cycle, upper_cycle) && filter.matches(&record.kind))
			.map(|record| record.address)
			.collect();

		Some(Window {
			lower_cycle,
			upper_cycle,
			filter,
			addresses,
		})
	}

	/// Returns statistics about all accesses
	pub fn statistics(&self) -> Statistics {
		let durations = self
			.records
			.values()
			.filter_map(AccessRecord::duration)
			.map(|duration| duration as f64)
			.collect::<average::Variance>();

		Statistics {
			total:         self.records.len(),
			open:          self.open.len(),
			loads:         self.count_matching(KindFilter::Load),
			stores:        self.count_matching(KindFilter::Store),
			duration_mean: durations.mean(),
			duration_err:  durations.error(),
		}
	}

	/// Formats debug output to `f`.
	pub fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		let statistics = self.statistics();
		write!(
			f,
			"{} accesses ({} open, {} loads, {} stores), duration: {:.2} ± {:.2} cycles",
			statistics.total,
			statistics.open,
			statistics.loads,
			statistics.stores,
			statistics.duration_mean,
			statistics.duration_err
		)?;

		if let Some(bounds) = self.bounds() {
			write!(
				f,
				", addresses: {:#x}..={:#x}, max cycle: {}",
				bounds.min_addr, bounds.max_addr, bounds.max_cycle
			)?;
		}

		Ok(())
	}

	/// Returns a record from one of our indices
	fn record(&self, id: AccessId) -> &AccessRecord {
		// Note: Indices only ever hold ids present in `records`
		&self.records[&id]
	}

	/// Counts all accesses matching `filter`
	fn count_matching(&self, filter: KindFilter) -> usize {
		self.records
			.values()
			.filter(|record| filter.matches(&record.kind))
			.count()
	}
}

impl AccessSink for AccessStore {
	fn insert_if_absent(&mut self, record: AccessRecord) -> bool {
		Self::insert_if_absent(self, record)
	}

	fn close(&mut self, id: AccessId, cycle_end: u64) -> CloseOutcome {
		Self::close(self, id, cycle_end)
	}

	fn observe_cycle(&mut self, cycle: u64) {
		Self::observe_cycle(self, cycle);
	}
}

/// Bounds of all accesses in a store
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Bounds {
	/// Lowest address
	pub min_addr: u64,

	/// Highest address
	pub max_addr: u64,

	/// Latest cycle
	pub max_cycle: u64,
}

/// Result of [`AccessStore::query_window`]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Window {
	/// Lower cycle (exclusive for access ends)
	pub lower_cycle: u64,

	/// Upper cycle (exclusive for access starts)
	pub upper_cycle: u64,

	/// Filter used
	pub filter: KindFilter,

	/// Addresses of all accesses within the window, in no particular order
	pub addresses: Vec<u64>,
}

/// Statistics of an [`AccessStore`]
#[derive(Clone, Debug)]
pub struct Statistics {
	/// Total accesses
	pub total: usize,

	/// Open accesses
	pub open: usize,

	/// Loads
	pub loads: usize,

	/// Stores
	pub stores: usize,

	/// Mean duration of closed accesses, in cycles
	pub duration_mean: f64,

	/// Standard error of the duration of closed accesses
	pub duration_err: f64,
}
