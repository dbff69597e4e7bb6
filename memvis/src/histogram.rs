//! Address histograms

// Imports
use itertools::Itertools;

/// Histogram of addresses.
///
/// Bins are equal-width and span the lowest to the highest address.
#[derive(PartialEq, Clone, Debug)]
pub struct Histogram {
	/// Start of the first bin
	start: f64,

	/// Bin size
	bin_size: f64,

	/// Count of each bin
	counts: Vec<usize>,
}

impl Histogram {
	/// Creates a histogram from `addresses` with `bins` bins.
	///
	/// Returns `None` if there are no addresses or no bins.
	pub fn new(addresses: &[u64], bins: usize) -> Option<Self> {
		if bins == 0 {
			return None;
		}

		// Note: If all addresses are equal, we center a unit range on them.
		let (min, max) = addresses.iter().copied().minmax().into_option()?;
		let (start, end) = match min == max {
			true => (min as f64 - 0.5, max as f64 + 0.5),
			false => (min as f64, max as f64),
		};
		let bin_size = (end - start) / bins as f64;

		let mut counts = vec![0; bins];
		for &addr in addresses {
			// Note: The last bin includes its end
			let bin_idx = ((addr as f64 - start) / bin_size) as usize;
			counts[bin_idx.min(bins - 1)] += 1;
		}

		Some(Self {
			start,
			bin_size,
			counts,
		})
	}

	/// Returns the bin size
	pub fn bin_size(&self) -> f64 {
		self.bin_size
	}

	/// Returns the total number of addresses
	pub fn total(&self) -> usize {
		self.counts.iter().sum()
	}

	/// Returns the highest count of any bin
	pub fn max_count(&self) -> usize {
		self.counts.iter().copied().max().unwrap_or(0)
	}

	/// Returns all bins
	pub fn bins(&self) -> impl ExactSizeIterator<Item = Bin> + '_ {
		self.counts.iter().enumerate().map(|(bin_idx, &count)| Bin {
			start: self.start + bin_idx as f64 * self.bin_size,
			end: self.start + (bin_idx + 1) as f64 * self.bin_size,
			count,
		})
	}
}

/// Histogram bin
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Bin {
	/// Start address
	pub start: f64,

	/// End address
	pub end: f64,

	/// Number of addresses
	pub count: usize,
}
