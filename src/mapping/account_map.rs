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

pub const WILDCARD: char = '*';

/// A numeric account code in which some digits may be replaced by the
/// wildcard, so that "52**" stands for every code from 5200 to 5299.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodePattern(String);

impl CodePattern {
	pub fn parse(input: &str) -> Result<Self, ConvertError> {
		let trimmed = input.trim();
		if trimmed.is_empty()
			|| !trimmed.chars().all(|c| c.is_ascii_digit() || c == WILDCARD)
		{
			return Err(ConvertError::InvalidPattern(input.to_string()));
		}

		Ok(Self(trimmed.to_string()))
	}

	/// Same length, and every pattern position is either the wildcard or
	/// the very digit found in the code.
	pub fn matches(&self, code: &str) -> bool {
		self.0.len() == code.len()
			&& self
				.0
				.chars()
				.zip(code.chars())
				.all(|(p, c)| p == WILDCARD || p == c)
	}

	pub fn wildcards(&self) -> usize {
		self.0.chars().filter(|&c| c == WILDCARD).count()
	}

	pub fn is_exact(&self) -> bool {
		self.wildcards() == 0
	}

	pub fn width(&self) -> usize {
		self.0.len()
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapEntry {
	pattern: CodePattern,
	name: String,
}

impl MapEntry {
	pub fn pattern(&self) -> &CodePattern {
		&self.pattern
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

/// The table between DATEV account codes and ledger account names, in the
/// order it was written. Code lookups understand wildcards and prefer the
/// most specific pattern; name lookups only ever use exact codes, because
/// an export needs one concrete account per posting.
///
/// Immutable once built, so a single map can be shared by reference
/// between conversions running side by side.
#[derive(Clone, Debug, Default)]
pub struct AccountMap {
	entries: Vec<MapEntry>,
	/// Number of digits every code in this table has. None while empty.
	width: Option<usize>,
}

impl AccountMap {
	pub fn new<I, C, N>(entries: I) -> Result<Self, ConvertError>
	where
		I: IntoIterator<Item = (C, N)>,
		C: AsRef<str>,
		N: Into<String>,
	{
		let mut map = Self::default();

		for (code, name) in entries {
			let pattern = CodePattern::parse(code.as_ref())?;
			let name = name.into().trim().to_string();
			if name.is_empty() {
				return Err(ConvertError::invalid_field(
					"account name",
					code.as_ref(),
				));
			}

			match map.width {
				None => map.width = Some(pattern.width()),
				Some(expected) if expected != pattern.width() => {
					return Err(ConvertError::InconsistentCodeWidth {
						pattern: pattern.as_str().to_string(),
						found: pattern.width(),
						expected,
					})
				},
				_ => {},
			}

			map.entries.push(MapEntry { pattern, name });
		}

		Ok(map)
	}

	/// Finds the account name for a concrete code. With several matching
	/// patterns, the one with the fewest wildcards wins, and among equally
	/// specific ones the first in table order.
	pub fn resolve_code_to_name(
		&self,
		code: &str,
	) -> Result<&str, ConvertError> {
		let code = code.trim();
		if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
			return Err(ConvertError::UnmappedAccount(code.to_string()));
		}

		self.entries
			.iter()
			.filter(|e| e.pattern.matches(code))
			// min_by_key keeps the first of several equal minimums
			.min_by_key(|e| e.pattern.wildcards())
			.map(|e| e.name.as_str())
			.ok_or_else(|| ConvertError::UnmappedAccount(code.to_string()))
	}

	/// Finds the exact code for an account name. Wildcard entries are not
	/// considered; an export row cannot carry a pattern.
	pub fn resolve_name_to_code(
		&self,
		name: &str,
	) -> Result<&str, ConvertError> {
		let mut codes = self.exact_codes_for(name);

		match codes.len() {
			0 => Err(ConvertError::UnmappedAccount(name.to_string())),
			1 => Ok(codes.remove(0)),
			_ => Err(ConvertError::AmbiguousMapping {
				name: name.to_string(),
				codes: codes.into_iter().map(str::to_string).collect(),
			}),
		}
	}

	/// Checks every name up front, so that a conflicting table stops an
	/// export before any record is looked at.
	pub fn check_unambiguous(&self) -> Result<(), ConvertError> {
		for entry in self.entries.iter().filter(|e| e.pattern.is_exact()) {
			self.resolve_name_to_code(&entry.name)?;
		}
		Ok(())
	}

	/// Distinct exact codes for the name, in table order. The same line
	/// repeated twice is not a conflict.
	fn exact_codes_for(&self, name: &str) -> Vec<&str> {
		let mut codes: Vec<&str> = vec![];
		for entry in &self.entries {
			if entry.pattern.is_exact()
				&& entry.name == name
				&& !codes.contains(&entry.pattern.as_str())
			{
				codes.push(entry.pattern.as_str());
			}
		}
		codes
	}

	pub fn entries(&self) -> &[MapEntry] {
		&self.entries
	}

	pub fn width(&self) -> Option<usize> {
		self.width
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
