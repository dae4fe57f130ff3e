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
use crate::convert::outcome::RunPolicy;
use crate::mapping::builder::DEFAULT_CODE_DEPTH;
use anyhow::{anyhow, Error};
use serde::Deserialize;

pub const DEFAULT_CONSULTANT: u32 = 1001;
pub const DEFAULT_CLIENT: u32 = 1;
pub const DEFAULT_ACCOUNT_LENGTH: u8 = 4;
pub const DEFAULT_ORIGIN: &str = "RE";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	pub datev: Option<Datev>,
	pub accounts: Option<Accounts>,
	pub run: Option<Run>,
}

/// Header metadata written into every EXTF file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Datev {
	/// Berater
	pub consultant: Option<u32>,
	/// Mandant
	pub client: Option<u32>,
	/// Sachkontenlänge
	pub account_length: Option<u8>,
	/// Herkunft, two letters
	pub origin: Option<String>,
	/// Bezeichnung of the batch
	pub label: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Accounts {
	/// Mapping file used when no --account_dictionary is given
	pub dictionary: Option<String>,
	/// Segment of the account name that carries the code
	pub code_depth: Option<usize>,
	/// Ledger account for DATEV codes missing from the mapping
	pub default_account: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Run {
	pub policy: Option<RunPolicy>,
}

impl Config {
	pub fn from_toml(content: &str) -> Result<Self, Error> {
		toml::from_str(content)
			.map_err(|e| anyhow!("failed to parse config: {}", e))
	}

	fn datev(&self) -> Option<&Datev> {
		self.datev.as_ref()
	}

	fn accounts(&self) -> Option<&Accounts> {
		self.accounts.as_ref()
	}

	pub fn consultant(&self) -> u32 {
		self.datev()
			.and_then(|d| d.consultant)
			.unwrap_or(DEFAULT_CONSULTANT)
	}

	pub fn client(&self) -> u32 {
		self.datev().and_then(|d| d.client).unwrap_or(DEFAULT_CLIENT)
	}

	pub fn account_length(&self) -> u8 {
		self.datev()
			.and_then(|d| d.account_length)
			.unwrap_or(DEFAULT_ACCOUNT_LENGTH)
	}

	pub fn origin(&self) -> String {
		self.datev()
			.and_then(|d| d.origin.clone())
			.unwrap_or_else(|| DEFAULT_ORIGIN.to_string())
	}

	pub fn label(&self) -> Option<String> {
		self.datev().and_then(|d| d.label.clone())
	}

	pub fn dictionary(&self) -> Option<String> {
		self.accounts().and_then(|a| a.dictionary.clone())
	}

	pub fn code_depth(&self) -> usize {
		self.accounts()
			.and_then(|a| a.code_depth)
			.unwrap_or(DEFAULT_CODE_DEPTH)
	}

	pub fn default_account(&self) -> Option<String> {
		self.accounts().and_then(|a| a.default_account.clone())
	}

	pub fn policy(&self) -> RunPolicy {
		self.run
			.as_ref()
			.and_then(|r| r.policy)
			.unwrap_or_default()
	}
}
