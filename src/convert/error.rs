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
use crate::util::date::Date;
use crate::util::quant::Quant;
use std::fmt;
use thiserror::Error;

/// Everything that can go wrong while mapping accounts or transcoding a
/// single transaction. File-level problems (I/O, syntax of the ledger
/// itself) are reported through anyhow instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
	/// No mapping entry resolves a code or a name
	#[error("no account mapping for {0}")]
	UnmappedAccount(String),

	/// Several exact entries give one name different codes
	#[error("account {name} is mapped to several codes: {}", codes.join(", "))]
	AmbiguousMapping { name: String, codes: Vec<String> },

	#[error("cannot extract an account code from: {}", names.join(", "))]
	MalformedAccountName { names: Vec<String> },

	#[error("account code pattern {0:?} may only contain digits and '*'")]
	InvalidPattern(String),

	#[error("account code {pattern} has {found} digits, expected {expected}")]
	InconsistentCodeWidth {
		pattern: String,
		found: usize,
		expected: usize,
	},

	#[error("expected exactly two postings, found {0}")]
	UnsupportedPostingCount(usize),

	#[error("postings use more than one currency ({0})")]
	MultiCurrencyUnsupported(String),

	#[error("postings do not balance: {first} and {second}")]
	UnbalancedTransaction { first: Quant, second: Quant },

	#[error("transaction moves no money")]
	ZeroAmount,

	#[error("{date} is outside of booking year {year}")]
	DateOutsideYear { date: Date, year: u32 },

	#[error("begin date {begin} is after end date {end}")]
	EmptyRange { begin: Date, end: Date },

	#[error("invalid {field}: {value:?}")]
	InvalidField { field: &'static str, value: String },
}

impl ConvertError {
	pub fn invalid_field(field: &'static str, value: &str) -> Self {
		Self::InvalidField {
			field,
			value: value.to_string(),
		}
	}
}

/// A per-record failure together with enough context for the user to find
/// the record in their ledger or export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
	pub context: String,
	pub error: ConvertError,
}

impl RecordError {
	pub fn new(context: &str, error: ConvertError) -> Self {
		Self {
			context: context.to_string(),
			error,
		}
	}
}

impl fmt::Display for RecordError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.context, self.error)
	}
}

impl std::error::Error for RecordError {}
