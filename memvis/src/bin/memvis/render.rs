//! Text rendering

// Imports
use {
	memvis::{Bounds, Histogram, Window},
	std::io,
};

/// Renders a window's histogram
pub fn histogram<W: io::Write>(
	mut writer: W,
	window: &Window,
	histogram: Option<&Histogram>,
	bounds: &Bounds,
	bar_width: usize,
) -> Result<(), io::Error> {
	writeln!(
		writer,
		"Mem Access Frequency (Cycle {} - {}), {} {:?} accesses",
		window.lower_cycle,
		window.upper_cycle,
		window.addresses.len(),
		window.filter
	)?;
	writeln!(writer, "Addresses: {:#x} - {:#x}", bounds.min_addr, bounds.max_addr)?;

	let Some(histogram) = histogram else {
		writeln!(writer, "No accesses in window")?;
		return Ok(());
	};
	writeln!(writer, "Bin Size is {:.2} KB", histogram.bin_size() / 1024.0)?;

	let max_count = histogram.max_count().max(1);
	for bin in histogram.bins() {
		// Note: Bins may start at a fractional negative address when all addresses are equal
		let start = bin.start.max(0.0) as u64;
		let end = bin.end.max(0.0) as u64;
		let bar = "#".repeat(bin.count * bar_width / max_count);
		writeln!(writer, "{start:#018x} - {end:#018x} | {:>8} | {bar}", bin.count)?;
	}

	Ok(())
}
