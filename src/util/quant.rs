/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use anyhow::{bail, Error};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Neg};

/// Largest number of decimal places we accept. Accounting amounts never
/// come close; the limit keeps rescaling well inside i128.
pub const MAX_SCALE: u32 = 18;

/// A fixed-point decimal: an integer count of units and the number of
/// decimal places those units are scaled by, so that 1234.50 is stored as
/// 123450 with scale 2.
///
/// The scale is kept exactly as written in the source, which is what lets
/// an amount travel from point-decimal to comma-decimal and back without
/// gaining or losing digits. Comparisons and hashing use the value only,
/// so 1.5 and 1.50 are equal.
#[derive(Clone, Copy, Debug, Default)]
pub struct Quant {
	units: i128,
	scale: u32,
}

impl Quant {
	pub fn zero() -> Self {
		Self::new(0, 0)
	}

	/// Creates a Quant from raw units, as though a decimal point were
	/// inserted `scale` places from the right of the number.
	pub fn new(units: i128, scale: u32) -> Self {
		Self { units, scale }
	}

	/// Parses a point-decimal string like "-1234.50".
	pub fn from_str(input: &str) -> Result<Self, Error> {
		Self::parse_with_separator(input, '.')
	}

	/// Parses a comma-decimal string like "1234,50", as used by DATEV.
	/// No grouping separators are allowed.
	pub fn from_comma_str(input: &str) -> Result<Self, Error> {
		Self::parse_with_separator(input, ',')
	}

	fn parse_with_separator(
		input: &str,
		separator: char,
	) -> Result<Self, Error> {
		let trimmed = input.trim();
		let (is_negative, unsigned) = match trimmed.strip_prefix('-') {
			Some(rest) => (true, rest),
			None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
		};

		let (whole, fraction) = match unsigned.split_once(separator) {
			Some((w, f)) => (w, f),
			None => (unsigned, ""),
		};

		if whole.is_empty()
			|| !whole.chars().all(|c| c.is_ascii_digit())
			|| !fraction.chars().all(|c| c.is_ascii_digit())
			|| (fraction.is_empty() && unsigned.contains(separator))
		{
			bail!("Invalid decimal format: {}", input);
		}

		let scale = fraction.len() as u32;
		if scale > MAX_SCALE {
			bail!("Too many decimal places: {}", input);
		}

		let digits = format!("{}{}", whole, fraction);
		let magnitude = digits
			.parse::<i128>()
			.map_err(|_| anyhow::anyhow!("Invalid decimal format: {}", input))?;

		let units = if is_negative { -magnitude } else { magnitude };
		Ok(Self::new(units, scale))
	}

	pub fn is_zero(&self) -> bool {
		self.units == 0
	}

	pub fn is_positive(&self) -> bool {
		self.units > 0
	}

	pub fn is_negative(&self) -> bool {
		self.units < 0
	}

	/// Renders without grouping, using the given decimal separator. Digits
	/// and scale are exactly those the value was created with.
	fn render(&self, separator: char, group: bool) -> String {
		let digits = self.units.unsigned_abs().to_string();
		let scale = self.scale as usize;

		// left-pad so there is always at least one integer digit
		let padded = if digits.len() <= scale {
			format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
		} else {
			digits
		};
		let (int_part, frac_part) = padded.split_at(padded.len() - scale);

		let mut int_str = int_part.to_string();
		if group {
			let mut i = int_str.len() as isize - 3;
			while i > 0 {
				int_str.insert(i as usize, ',');
				i -= 3;
			}
		}

		let sign = if self.units < 0 { "-" } else { "" };
		if frac_part.is_empty() {
			format!("{}{}", sign, int_str)
		} else {
			format!("{}{}{}{}", sign, int_str, separator, frac_part)
		}
	}

	/// Point-decimal with thousands grouping, e.g. "1,234.50", the way
	/// ledger entries show amounts. The parser strips the commas again.
	pub fn to_grouped_string(&self) -> String {
		self.render('.', true)
	}

	/// Comma-decimal without thousands grouping, e.g. "1234,50"
	pub fn to_comma_string(&self) -> String {
		self.render(',', false)
	}

	/// Brings both values to the larger of the two scales.
	fn aligned(self, other: Self) -> (i128, i128, u32) {
		let scale = self.scale.max(other.scale);
		(
			self.units * 10i128.pow(scale - self.scale),
			other.units * 10i128.pow(scale - other.scale),
			scale,
		)
	}

	/// Strips trailing zero decimal places; used for value identity.
	fn normalized(&self) -> (i128, u32) {
		let (mut units, mut scale) = (self.units, self.scale);
		while scale > 0 && units % 10 == 0 {
			units /= 10;
			scale -= 1;
		}
		(units, scale)
	}
}

/// Point-decimal without grouping, e.g. "1234.50"
impl fmt::Display for Quant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.render('.', false))
	}
}

// -----------------
// -- BOILERPLATE --
// -----------------

impl Add for Quant {
	type Output = Self;

	fn add(self, rhs: Self) -> Self::Output {
		let (a, b, scale) = self.aligned(rhs);
		Self {
			units: a + b,
			scale,
		}
	}
}

impl AddAssign for Quant {
	fn add_assign(&mut self, rhs: Self) {
		*self = *self + rhs;
	}
}

impl Neg for Quant {
	type Output = Self;

	fn neg(self) -> Self::Output {
		Self {
			units: -self.units,
			scale: self.scale,
		}
	}
}

impl PartialEq for Quant {
	fn eq(&self, other: &Self) -> bool {
		let (a, b, _) = self.aligned(*other);
		a == b
	}
}

impl Eq for Quant {}

impl PartialOrd for Quant {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Quant {
	fn cmp(&self, other: &Self) -> Ordering {
		let (a, b, _) = self.aligned(*other);
		a.cmp(&b)
	}
}

impl Hash for Quant {
	fn hash<H: Hasher>(&self, state: &mut H) {
		// scale is part of rendering, not identity
		self.normalized().hash(state);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	mod parsing {
		use super::*;

		#[test]
		fn test_from_str_positive_decimal() {
			let quant = Quant::from_str("1234.50").unwrap();
			assert_eq!(quant.units, 123450);
			assert_eq!(quant.scale, 2);
		}

		#[test]
		fn test_from_str_negative_decimal() {
			let quant = Quant::from_str("-0.05").unwrap();
			assert_eq!(quant.units, -5);
			assert_eq!(quant.scale, 2);
			assert!(quant.is_negative());
		}

		#[test]
		fn test_from_str_integer() {
			let quant = Quant::from_str("42").unwrap();
			assert_eq!(quant, Quant::new(42, 0));
			assert_eq!(quant.scale, 0);
		}

		#[test]
		fn test_from_str_explicit_plus() {
			assert_eq!(Quant::from_str("+7.5").unwrap(), Quant::new(75, 1));
		}

		#[test]
		fn test_from_str_negative_zero() {
			let quant = Quant::from_str("-0.00").unwrap();
			assert!(quant.is_zero());
			assert!(!quant.is_negative());
		}

		#[test]
		fn test_from_str_invalid_format() {
			assert!(Quant::from_str("1.2.3").is_err());
			assert!(Quant::from_str("12a").is_err());
			assert!(Quant::from_str("").is_err());
			assert!(Quant::from_str("-").is_err());
			assert!(Quant::from_str(".5").is_err());
			assert!(Quant::from_str("5.").is_err());
		}

		#[test]
		fn test_from_str_rejects_comma() {
			assert!(Quant::from_str("1234,50").is_err());
		}

		#[test]
		fn test_from_comma_str() {
			let quant = Quant::from_comma_str("1234,50").unwrap();
			assert_eq!(quant, Quant::new(123450, 2));
			assert_eq!(quant.scale, 2);
		}

		#[test]
		fn test_from_comma_str_rejects_point() {
			assert!(Quant::from_comma_str("1234.50").is_err());
			assert!(Quant::from_comma_str("1.234,50").is_err());
		}

		#[test]
		fn test_too_many_places() {
			assert!(Quant::from_str("0.1234567890123456789").is_err());
		}
	}

	mod rendering {
		use super::*;

		#[test]
		fn test_comma_string_keeps_scale() {
			let quant = Quant::from_str("1234.50").unwrap();
			assert_eq!(quant.to_comma_string(), "1234,50");
		}

		#[test]
		fn test_decimal_fidelity_through_comma_format() {
			let original = Quant::from_str("1234.50").unwrap();
			let comma = original.to_comma_string();
			let back = Quant::from_comma_str(&comma).unwrap();
			assert_eq!(back.to_string(), "1234.50");
			assert_eq!(back.scale, 2);
		}

		#[test]
		fn test_small_fraction() {
			assert_eq!(Quant::new(5, 3).to_string(), "0.005");
			assert_eq!(Quant::new(-5, 3).to_comma_string(), "-0,005");
		}

		#[test]
		fn test_integer_rendering() {
			assert_eq!(Quant::new(100, 0).to_comma_string(), "100");
		}

		#[test]
		fn test_grouped_thousands() {
			let quant = Quant::from_str("-1234567.891").unwrap();
			assert_eq!(quant.to_grouped_string(), "-1,234,567.891");
			assert_eq!(quant.to_string(), "-1234567.891");
		}

		#[test]
		fn test_grouped_short_number() {
			let quant = Quant::from_str("999.99").unwrap();
			assert_eq!(quant.to_grouped_string(), "999.99");
		}
	}

	mod arithmetic {
		use super::*;

		#[test]
		fn test_add_mixed_scales() {
			let sum = Quant::from_str("1.5").unwrap()
				+ Quant::from_str("0.25").unwrap();
			assert_eq!(sum, Quant::new(175, 2));
			assert_eq!(sum.scale, 2);
		}

		#[test]
		fn test_additive_inverse() {
			let a = Quant::from_str("100.00").unwrap();
			let b = Quant::from_str("-100.00").unwrap();
			assert!((a + b).is_zero());
		}

		#[test]
		fn test_not_inverse() {
			let a = Quant::from_str("100.00").unwrap();
			let b = Quant::from_str("-99.99").unwrap();
			assert_eq!(a + b, Quant::new(1, 2));
		}

		#[test]
		fn test_add_assign() {
			let mut total = Quant::zero();
			total += Quant::from_str("1.10").unwrap();
			total += Quant::from_str("-0.10").unwrap();
			total += Quant::new(2, 0);
			assert_eq!(total, Quant::new(3, 0));
			assert_eq!(total.scale, 2);
		}

		#[test]
		fn test_neg_keeps_scale() {
			let q = Quant::from_str("-3.20").unwrap();
			assert_eq!((-q).to_string(), "3.20");
		}
	}

	mod comparison {
		use super::*;
		use std::collections::HashSet;

		#[test]
		fn test_equal_across_scales() {
			assert_eq!(Quant::from_str("1.5").unwrap(), Quant::new(150, 2));
		}

		#[test]
		fn test_ordering() {
			assert!(Quant::from_str("-1").unwrap() < Quant::zero());
			assert!(Quant::from_str("0.01").unwrap() > Quant::zero());
			let larger = Quant::from_str("2.5").unwrap();
			assert!(larger > Quant::from_str("2.49").unwrap());
		}

		#[test]
		fn test_hash_ignores_scale() {
			let mut set = HashSet::new();
			set.insert(Quant::from_str("1.50").unwrap());
			assert!(set.contains(&Quant::from_str("1.5").unwrap()));
		}
	}
}
