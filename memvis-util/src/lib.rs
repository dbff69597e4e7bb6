//! Utilities

// Modules
pub mod logger;

// Imports
use std::{cell::RefCell, fmt, num::ParseIntError};

/// Extension trait for `str` to parse integer literals of any base
#[extend::ext(name = ParseIntLiteral)]
pub impl str {
	/// Parses an unsigned integer literal.
	///
	/// Accepts `0x` / `0X` (hexadecimal), `0o` / `0O` (octal), `0b` / `0B` (binary)
	/// prefixes, otherwise parses it as decimal. No fixed width is assumed.
	fn parse_int_literal(&self) -> Result<u64, ParseIntError> {
		let (digits, radix) = match self.get(..2) {
			Some("0x" | "0X") => (&self[2..], 16),
			Some("0o" | "0O") => (&self[2..], 8),
			Some("0b" | "0B") => (&self[2..], 2),
			_ => (self, 10),
		};

		u64::from_str_radix(digits, radix)
	}
}

/// [`fmt::Display`] helper to display using a `FnMut(&mut fmt::Formatter)`
pub struct DisplayWrapper<F: FnMut(&mut fmt::Formatter) -> fmt::Result>(RefCell<F>);

impl<F: FnMut(&mut fmt::Formatter) -> fmt::Result> DisplayWrapper<F> {
	/// Creates a new display wrapper
	#[must_use]
	pub const fn new(func: F) -> Self {
		Self(RefCell::new(func))
	}
}


impl<F: FnMut(&mut fmt::Formatter) -> fmt::Result> fmt::Display for DisplayWrapper<F> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		// Note: `f` cannot be re-entrant, so this cannot fail
		self.0.borrow_mut()(f)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_int_literal_bases() {
		assert_eq!("0x100".parse_int_literal(), Ok(256));
		assert_eq!("0XfF".parse_int_literal(), Ok(255));
		assert_eq!("256".parse_int_literal(), Ok(256));
		assert_eq!("0o17".parse_int_literal(), Ok(15));
		assert_eq!("0b101".parse_int_literal(), Ok(5));
		assert_eq!("0".parse_int_literal(), Ok(0));
		assert_eq!("0xffffffffffffffff".parse_int_literal(), Ok(u64::MAX));
	}

	#[test]
	fn parse_int_literal_rejects_garbage() {
		assert!("".parse_int_literal().is_err());
		assert!("0x".parse_int_literal().is_err());
		assert!("0xzz".parse_int_literal().is_err());
		assert!("12ab".parse_int_literal().is_err());
		assert!("-1".parse_int_literal().is_err());
	}

	#[test]
	fn display_wrapper_formats() {
		let value = 5;
		let wrapper = DisplayWrapper::new(|f| write!(f, "value={value}"));
		assert_eq!(wrapper.to_string(), "value=5");
	}
}
