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
use crate::mapping::account_map::AccountMap;
use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

/// Index of the colon-separated segment that carries the account code in
/// names like `Aktiva:0-Anlagevermögen:0440-Maschinen`.
pub const DEFAULT_CODE_DEPTH: usize = 2;

/// Derives an account map from ledger account names that follow the
/// naming convention of carrying their DATEV code, e.g.
/// `<top>:<group-code>-<group-label>:<code>-<description>`.
pub struct AccountMapBuilder {
	depth: usize,
	code_regex: Regex,
}

impl AccountMapBuilder {
	pub fn new(depth: usize) -> Self {
		Self {
			depth,
			code_regex: Regex::new(r"^([0-9]+)(?:-|$)").unwrap(),
		}
	}

	/// The leading digits of the segment at the configured depth, if that
	/// segment starts with a code terminated by '-' or by its end.
	pub fn extract_code(&self, account: &str) -> Option<String> {
		let segment = account.split(':').nth(self.depth)?.trim();
		self.code_regex
			.captures(segment)
			.map(|cap| cap[1].to_string())
	}

	/// Builds exact entries, one per distinct name, in first-seen order.
	///
	/// A single name without an extractable code fails the whole build;
	/// every offending name is listed so they can be fixed in one go.
	pub fn build<'a, I>(&self, accounts: I) -> Result<AccountMap, ConvertError>
	where
		I: IntoIterator<Item = &'a str>,
	{
		let mut seen = HashSet::new();
		let mut entries: Vec<(String, &str)> = vec![];
		let mut malformed = vec![];

		for account in accounts {
			if !seen.insert(account) {
				continue;
			}

			match self.extract_code(account) {
				Some(code) => entries.push((code, account)),
				None => malformed.push(account.to_string()),
			}
		}

		if !malformed.is_empty() {
			return Err(ConvertError::MalformedAccountName { names: malformed });
		}

		let map = AccountMap::new(entries)?;
		warn_on_shared_codes(&map);
		Ok(map)
	}
}

impl Default for AccountMapBuilder {
	fn default() -> Self {
		Self::new(DEFAULT_CODE_DEPTH)
	}
}

/// Two names with one code convert fine towards DATEV, but on the way
/// back only the first of them is ever chosen.
fn warn_on_shared_codes(map: &AccountMap) {
	let mut codes = HashSet::new();
	for entry in map.entries() {
		if !codes.insert(entry.pattern().as_str()) {
			warn!(
				code = entry.pattern().as_str(),
				account = entry.name(),
				"account code is used by more than one account"
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_extracts_code() {
		let builder = AccountMapBuilder::default();
		assert_eq!(
			builder.extract_code("Aktiva:0-Anlagevermögen:0440-Maschinen"),
			Some("0440".to_string())
		);
	}

	#[test]
	fn test_extracts_code_without_description() {
		let builder = AccountMapBuilder::default();
		assert_eq!(
			builder.extract_code("Passiva:3-Verbindlichkeiten:3300"),
			Some("3300".to_string())
		);
	}

	#[test]
	fn test_deeper_segments_ignored() {
		let builder = AccountMapBuilder::default();
		assert_eq!(
			builder.extract_code("Aktiva:1-Umlauf:1200-Bank:Girokonto"),
			Some("1200".to_string())
		);
	}

	#[test]
	fn test_no_code() {
		let builder = AccountMapBuilder::default();
		assert_eq!(builder.extract_code("Aktiva:1-Umlauf"), None);
		assert_eq!(builder.extract_code("Aktiva:1-Umlauf:Bank"), None);
		assert_eq!(builder.extract_code("Aktiva:1-Umlauf:12a0-Bank"), None);
	}

	#[test]
	fn test_custom_depth() {
		let builder = AccountMapBuilder::new(1);
		assert_eq!(
			builder.extract_code("Expenses:4930-Office"),
			Some("4930".to_string())
		);
	}

	#[test]
	fn test_build() {
		let builder = AccountMapBuilder::default();
		let map = builder
			.build(vec![
				"Aktiva:0-Anlagevermögen:0440-Maschinen",
				"Aktiva:1-Umlaufvermögen:1200-Bank",
				"Aktiva:0-Anlagevermögen:0440-Maschinen",
			])
			.unwrap();

		assert_eq!(map.len(), 2);
		assert_eq!(
			map.resolve_name_to_code("Aktiva:1-Umlaufvermögen:1200-Bank")
				.unwrap(),
			"1200"
		);
		assert_eq!(
			map.resolve_code_to_name("0440").unwrap(),
			"Aktiva:0-Anlagevermögen:0440-Maschinen"
		);
	}

	#[test]
	fn test_build_reports_every_malformed_name() {
		let builder = AccountMapBuilder::default();
		let result = builder.build(vec![
			"Aktiva:1-Umlaufvermögen:1200-Bank",
			"Aktiva:Kasse",
			"Equity:Opening",
		]);

		assert_eq!(
			result.unwrap_err(),
			ConvertError::MalformedAccountName {
				names: vec!["Aktiva:Kasse".into(), "Equity:Opening".into()],
			}
		);
	}

	#[test]
	fn test_non_ascii_digits_are_no_code() {
		let builder = AccountMapBuilder::default();
		// Arabic-Indic digits for 0440
		let name =
			"Aktiva:0-Anlagevermögen:\u{660}\u{664}\u{664}\u{660}-Maschinen";
		assert_eq!(builder.extract_code(name), None);

		assert_eq!(
			builder.build(vec![name]).unwrap_err(),
			ConvertError::MalformedAccountName {
				names: vec![name.into()],
			}
		);
	}

	#[test]
	fn test_build_rejects_mixed_widths() {
		let builder = AccountMapBuilder::default();
		let result = builder.build(vec![
			"Aktiva:1-Umlaufvermögen:1200-Bank",
			"Aktiva:1-Umlaufvermögen:12000-Bank",
		]);
		assert!(matches!(
			result,
			Err(ConvertError::InconsistentCodeWidth { .. })
		));
	}
}
