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
use crate::convert::error::{ConvertError, RecordError};
use crate::convert::outcome::Outcome;
use crate::gl::entry::Entry;
use crate::util::amount::Amount;
use crate::util::date::Date;
use crate::util::quant::Quant;
use anyhow::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Posting {
	account: String,
	amount: Amount,
}

impl Posting {
	pub fn new(account: &str, amount: Amount) -> Self {
		Self {
			account: account.to_string(),
			amount,
		}
	}

	pub fn account(&self) -> &str {
		&self.account
	}

	pub fn value(&self) -> Quant {
		self.amount.value
	}

	pub fn currency(&self) -> &str {
		&self.amount.currency
	}
}

/// A balanced transaction of exactly two postings in a single currency,
/// the only shape that fits a DATEV booking line. Postings are kept with
/// the debit (positive) one first.
#[derive(Clone, Debug)]
pub struct Transaction {
	date: Date,
	postings: [Posting; 2],
	narration: String,
	reference: Option<String>,

	/// Where the transaction came from, for error reports
	origin: String,
}

impl Transaction {
	/// Validates, in this order: posting count, currency, balance, and
	/// that money is moved at all.
	pub fn new(
		date: Date,
		postings: Vec<Posting>,
		narration: &str,
		reference: Option<String>,
		origin: &str,
	) -> Result<Self, ConvertError> {
		let [first, second]: [Posting; 2] =
			postings.try_into().map_err(|p: Vec<Posting>| {
				ConvertError::UnsupportedPostingCount(p.len())
			})?;

		if first.currency() != second.currency() {
			return Err(ConvertError::MultiCurrencyUnsupported(format!(
				"{}, {}",
				first.currency(),
				second.currency()
			)));
		}

		if !(first.value() + second.value()).is_zero() {
			return Err(ConvertError::UnbalancedTransaction {
				first: first.value(),
				second: second.value(),
			});
		}

		if first.value().is_zero() {
			return Err(ConvertError::ZeroAmount);
		}

		let postings = if first.value().is_positive() {
			[first, second]
		} else {
			[second, first]
		};

		Ok(Self {
			date,
			postings,
			narration: narration.to_string(),
			reference,
			origin: origin.to_string(),
		})
	}

	/// Takes a parsed ledger entry. Failures carry the entry's line, date
	/// and description so they can be found in the source file.
	pub fn from_entry(entry: &Entry) -> Outcome<Self> {
		let context = entry.context();
		let postings = entry
			.details()
			.iter()
			.map(|d| Posting::new(d.account(), d.amount().clone()))
			.collect();

		Transaction::new(
			*entry.get_date(),
			postings,
			entry.get_desc(),
			entry.get_reference().cloned(),
			&context,
		)
		.map_err(|e| RecordError::new(&context, e))
	}

	/// Renders this as a ledger entry. Multi-line references become one
	/// reference line each.
	pub fn to_entry(&self, index: usize) -> Result<Entry, Error> {
		let mut entry =
			Entry::new(self.date, self.narration.clone(), index, 0);

		if let Some(reference) = &self.reference {
			for line in reference.lines() {
				entry.add_reference(line.to_string());
			}
		}

		for posting in &self.postings {
			entry.add_detail(&posting.account, posting.amount.clone())?;
		}

		Ok(entry)
	}

	pub fn date(&self) -> &Date {
		&self.date
	}

	pub fn debit(&self) -> &Posting {
		&self.postings[0]
	}

	pub fn credit(&self) -> &Posting {
		&self.postings[1]
	}

	/// The unsigned amount moved
	pub fn amount(&self) -> Quant {
		self.debit().value()
	}

	pub fn currency(&self) -> &str {
		self.debit().currency()
	}

	pub fn narration(&self) -> &str {
		&self.narration
	}

	pub fn reference(&self) -> Option<&String> {
		self.reference.as_ref()
	}

	pub fn origin(&self) -> &str {
		&self.origin
	}
}

/// Two transactions are the same booking regardless of where they were
/// read from.
impl PartialEq for Transaction {
	fn eq(&self, other: &Self) -> bool {
		self.date == other.date
			&& self.postings == other.postings
			&& self.narration == other.narration
			&& self.reference == other.reference
	}
}
