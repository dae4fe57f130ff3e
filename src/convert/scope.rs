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
use crate::convert::error::ConvertError;
use crate::util::date::Date;

/// The booking year an export is made for, optionally narrowed to a range
/// of days within that year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearScope {
	year: u32,
	begin: Date,
	end: Date,
}

impl YearScope {
	pub fn new(
		year: u32,
		begin: Option<Date>,
		end: Option<Date>,
	) -> Result<Self, ConvertError> {
		let begin = begin.unwrap_or_else(|| Date::first_of_year(year));
		let end = end.unwrap_or_else(|| Date::last_of_year(year));

		for date in [begin, end] {
			if date.year() != year {
				return Err(ConvertError::DateOutsideYear { date, year });
			}
		}

		if begin > end {
			return Err(ConvertError::EmptyRange { begin, end });
		}

		Ok(Self { year, begin, end })
	}

	pub fn contains(&self, date: &Date) -> bool {
		self.begin <= *date && *date <= self.end
	}

	pub fn year(&self) -> u32 {
		self.year
	}

	pub fn begin(&self) -> &Date {
		&self.begin
	}

	pub fn end(&self) -> &Date {
		&self.end
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn date(s: &str) -> Date {
		Date::from_str(s).unwrap()
	}

	#[test]
	fn test_whole_year() {
		let scope = YearScope::new(2024, None, None).unwrap();
		assert_eq!(scope.begin(), &date("2024-01-01"));
		assert_eq!(scope.end(), &date("2024-12-31"));
		assert!(scope.contains(&date("2024-01-01")));
		assert!(scope.contains(&date("2024-12-31")));
		assert!(!scope.contains(&date("2023-12-31")));
		assert!(!scope.contains(&date("2025-01-01")));
	}

	#[test]
	fn test_narrowed() {
		let begin = date("2024-04-01");
		let end = date("2024-06-30");
		let scope = YearScope::new(2024, Some(begin), Some(end)).unwrap();
		assert!(!scope.contains(&date("2024-03-31")));
		assert!(scope.contains(&date("2024-05-15")));
		assert!(!scope.contains(&date("2024-07-01")));
	}

	#[test]
	fn test_bounds_outside_year() {
		let err =
			YearScope::new(2024, Some(date("2023-12-01")), None).unwrap_err();
		assert_eq!(
			err,
			ConvertError::DateOutsideYear {
				date: date("2023-12-01"),
				year: 2024
			}
		);
		assert!(YearScope::new(2024, None, Some(date("2025-01-31"))).is_err());
	}

	#[test]
	fn test_empty_range() {
		let begin = date("2024-06-01");
		let end = date("2024-05-01");
		let err = YearScope::new(2024, Some(begin), Some(end)).unwrap_err();
		assert!(matches!(err, ConvertError::EmptyRange { .. }));
	}
}
