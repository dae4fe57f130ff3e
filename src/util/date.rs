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

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct Date {
	year: u32,
	month: u8,
	day: u8,
}

impl Date {
	/// Constructor to parse a string in the "YYYY-mm-dd" format
	pub fn from_str(date_str: &str) -> Result<Date, Error> {
		let parts: Vec<&str> = date_str.split('-').collect();
		if parts.len() != 3 {
			bail!("Date format must be YYYY-MM-DD");
		}

		let year = parts[0].parse::<u32>()?;
		let month = parts[1].parse::<u8>()?;
		let day = parts[2].parse::<u8>()?;

		Date::new(year, month, day)
	}

	pub fn new(year: u32, month: u8, day: u8) -> Result<Date, Error> {
		if !Date::is_valid_date(year, month, day) {
			bail!("Invalid date");
		}

		Ok(Date { year, month, day })
	}

	/// Parses the compact "YYYYMMDD" form used in DATEV headers
	pub fn from_compact(input: &str) -> Result<Date, Error> {
		if input.len() != 8 || !input.chars().all(|c| c.is_ascii_digit()) {
			bail!("Date format must be YYYYMMDD: {}", input);
		}

		Date::new(
			input[0..4].parse()?,
			input[4..6].parse()?,
			input[6..8].parse()?,
		)
	}

	/// Builds a date from a DATEV "DDMM" day-of-year field. Leading zeros
	/// of the day may be missing, so "105" is the first of May.
	pub fn from_ddmm(input: &str, year: u32) -> Result<Date, Error> {
		let trimmed = input.trim();
		if !(3..=4).contains(&trimmed.len())
			|| !trimmed.chars().all(|c| c.is_ascii_digit())
		{
			bail!("Date format must be DDMM: {}", input);
		}

		let padded = format!("{:0>4}", trimmed);
		Date::new(year, padded[2..4].parse()?, padded[0..2].parse()?)
	}

	pub fn first_of_year(year: u32) -> Date {
		Date {
			year,
			month: 1,
			day: 1,
		}
	}

	pub fn last_of_year(year: u32) -> Date {
		Date {
			year,
			month: 12,
			day: 31,
		}
	}

	pub fn year(&self) -> u32 {
		self.year
	}

	pub fn month(&self) -> u8 {
		self.month
	}

	pub fn day(&self) -> u8 {
		self.day
	}

	/// "YYYYMMDD"
	pub fn to_compact(&self) -> String {
		format!("{:04}{:02}{:02}", self.year, self.month, self.day)
	}

	/// "DDMM"; the year is carried by the file header
	pub fn to_ddmm(&self) -> String {
		format!("{:02}{:02}", self.day, self.month)
	}

	fn is_leap_year(year: u32) -> bool {
		(year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
	}

	fn days_in_month(year: u32, month: u8) -> u8 {
		match month {
			1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
			4 | 6 | 9 | 11 => 30,
			2 => {
				if Date::is_leap_year(year) {
					29
				} else {
					28
				}
			},
			_ => 0, // Invalid month
		}
	}

	fn is_valid_date(year: u32, month: u8, day: u8) -> bool {
		if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
			return false;
		}
		if day < 1 || day > Date::days_in_month(year, month) {
			return false;
		}
		true
	}
}

impl PartialOrd for Date {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Date {
	fn cmp(&self, other: &Self) -> Ordering {
		(self.year, self.month, self.day).cmp(&(
			other.year,
			other.month,
			other.day,
		))
	}
}

impl fmt::Display for Date {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_str() {
		let date = Date::from_str("2024-11-15").unwrap();
		assert_eq!((date.year(), date.month(), date.day()), (2024, 11, 15));
	}

	#[test]
	fn test_from_str_unpadded() {
		let date = Date::from_str("2024-1-5").unwrap();
		assert_eq!(date.to_string(), "2024-01-05");
	}

	#[test]
	fn test_invalid_dates() {
		assert!(Date::from_str("2023-02-29").is_err());
		assert!(Date::from_str("2024-13-01").is_err());
		assert!(Date::from_str("2024-04-31").is_err());
		assert!(Date::from_str("2024/04/01").is_err());
	}

	#[test]
	fn test_leap_year() {
		assert!(Date::from_str("2024-02-29").is_ok());
		assert!(Date::from_str("2000-02-29").is_ok());
		assert!(Date::from_str("1900-02-29").is_err());
	}

	#[test]
	fn test_compact_round_trip() {
		let date = Date::from_compact("20240301").unwrap();
		assert_eq!(date, Date::from_str("2024-03-01").unwrap());
		assert_eq!(date.to_compact(), "20240301");
	}

	#[test]
	fn test_compact_rejects_separators() {
		assert!(Date::from_compact("2024-3-1").is_err());
	}

	#[test]
	fn test_ddmm() {
		let date = Date::from_ddmm("0103", 2024).unwrap();
		assert_eq!(date, Date::from_str("2024-03-01").unwrap());
		assert_eq!(date.to_ddmm(), "0103");
	}

	#[test]
	fn test_ddmm_missing_leading_zero() {
		let date = Date::from_ddmm("105", 2024).unwrap();
		assert_eq!(date, Date::from_str("2024-05-01").unwrap());
	}

	#[test]
	fn test_ddmm_invalid() {
		assert!(Date::from_ddmm("3102", 2024).is_err());
		assert!(Date::from_ddmm("12345", 2024).is_err());
		assert!(Date::from_ddmm("2902", 2023).is_err());
	}

	#[test]
	fn test_ordering() {
		let a = Date::from_str("2023-12-31").unwrap();
		let b = Date::from_str("2024-01-01").unwrap();
		assert!(a < b);
		assert_eq!(Date::last_of_year(2023), a);
		assert_eq!(Date::first_of_year(2024), b);
	}
}
