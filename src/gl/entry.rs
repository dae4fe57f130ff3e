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
use crate::util::amount::Amount;
use crate::util::date::Date;
use crate::util::quant::Quant;
use anyhow::{bail, Error};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Debug, Eq)]
pub struct Entry {
	date: Date,

	/// The position in the ledger of this, relative to other Entry objects.
	/// Keeps entries of the same day in file order.
	index: usize,

	/// Line of the entry header in its source file; 0 if the entry was not
	/// read from a file.
	line: usize,

	desc: String,
	details: Vec<Detail>,

	virtual_detail: Option<String>,

	reference: Option<String>, // optional string, not inspected
}

impl Entry {
	pub fn new(date: Date, desc: String, index: usize, line: usize) -> Self {
		Self {
			date,
			index,
			line,
			desc,
			details: vec![],
			virtual_detail: None,
			reference: None,
		}
	}

	pub fn add_detail(
		&mut self,
		account: &str,
		amount: Amount,
	) -> Result<(), Error> {
		if account.is_empty() {
			bail!("Account is empty")
		}

		self.details.push(Detail::new(account, amount));

		Ok(())
	}

	pub fn set_virtual_detail(&mut self, account: String) -> Result<(), Error> {
		if self.virtual_detail.is_some() {
			bail!("Only one line per entry may omit amount and currency")
		}

		if account.is_empty() {
			bail!("Account is empty")
		}

		self.virtual_detail = Some(account);
		Ok(())
	}

	/// Adds a reference to the entry, such as an invoice or receipt number.
	/// It travels to the DATEV "Belegfeld 1" column and back.
	///
	/// If a reference is already present, it appends the two, separated by
	/// one newline character.
	pub fn add_reference(&mut self, reference: String) {
		match &mut self.reference {
			Some(existing_note) => {
				existing_note.push('\n');
				existing_note.push_str(reference.trim());
			},
			None => {
				self.reference = Some(reference.trim().to_string());
			},
		}
	}

	pub fn get_desc(&self) -> &String {
		&self.desc
	}

	pub fn get_date(&self) -> &Date {
		&self.date
	}

	pub fn get_reference(&self) -> Option<&String> {
		self.reference.as_ref()
	}

	pub fn details(&self) -> &Vec<Detail> {
		&self.details
	}

	/// Short human pointer to this entry for error reports
	pub fn context(&self) -> String {
		if self.line > 0 {
			format!("line {} ({} {})", self.line, self.date, self.desc)
		} else {
			format!("{} {}", self.date, self.desc)
		}
	}

	/// Completes an entry. If a detail was given without amount, it takes
	/// the counter amount of every currency left unbalanced.
	///
	/// Entries that still do not balance are kept as they are; whether they
	/// can be converted is decided per record by the converter, which
	/// reports them instead of failing the whole file.
	pub fn finalize(&mut self) {
		let Some(vd) = self.virtual_detail.clone() else {
			return;
		};

		for (currency, value) in self.get_imbalances() {
			self.details
				.push(Detail::new(&vd, Amount::new(-value, &currency)));
		}
	}

	/// Find all currencies that don't sum to zero, with amounts
	fn get_imbalances(&self) -> Vec<(String, Quant)> {
		let mut balances: BTreeMap<String, Quant> = BTreeMap::new();

		// Sum up the values for each currency
		for detail in &self.details {
			*balances
				.entry(detail.currency().to_string())
				.or_insert(Quant::zero()) += detail.value();
		}

		// Filter for currencies that don't sum to zero
		balances
			.into_iter()
			.filter(|(_, value)| !value.is_zero())
			.collect()
	}
}

impl fmt::Display for Entry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// Render the header line with date and description
		writeln!(f, "{} {}", self.date, self.desc)?;

		// One reference line per stored line; wrapping would change the
		// text on the next read
		if let Some(r) = &self.reference {
			for line in r.lines() {
				writeln!(f, "\t// {}", line)?;
			}
		}

		if self.details.is_empty() {
			return Ok(());
		}

		// Calculate the maximum width of the account strings
		let account_width = self
			.details
			.iter()
			.map(|d| d.account.chars().count())
			.max()
			.unwrap_or(0);

		// Align amounts and currencies properly
		let mut detail_lines = Vec::new();
		let mut max_value_width = 0;
		for detail in &self.details {
			let value_str = detail.value().to_grouped_string();
			max_value_width = max_value_width.max(value_str.len());
			detail_lines.push((
				detail.account.clone(),
				value_str,
				detail.currency().clone(),
			));
		}

		// Format the detail lines with proper alignment
		for (account, value, currency) in detail_lines {
			writeln!(
				f,
				"\t{:<account_width$}  {:>value_width$} {}",
				account,
				value,
				currency,
				account_width = account_width,
				value_width = max_value_width
			)?;
		}

		Ok(())
	}
}

impl PartialEq for Entry {
	fn eq(&self, other: &Self) -> bool {
		self.date == other.date && self.desc == other.desc
	}
}

// Entry Ord and PartialOrd Implementation
impl Ord for Entry {
	fn cmp(&self, other: &Self) -> Ordering {
		self.date
			.cmp(&other.date)
			.then_with(|| self.index.cmp(&other.index))
			.then_with(|| self.desc.cmp(&other.desc))
			.then_with(|| self.details.len().cmp(&other.details.len()))
	}
}

impl PartialOrd for Entry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

/// A specific line item in an Entry, indicating a credit or debit and the
/// associated account.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Detail {
	account: String,
	amount: Amount,
}

impl Detail {
	pub fn new(account: &str, amount: Amount) -> Self {
		Self {
			account: account.to_string(),
			amount,
		}
	}

	pub fn account(&self) -> &String {
		&self.account
	}

	pub fn amount(&self) -> &Amount {
		&self.amount
	}

	pub fn currency(&self) -> &String {
		&self.amount.currency
	}

	pub fn value(&self) -> Quant {
		self.amount.value
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn create_entry() -> Entry {
		Entry::new(
			Date::from_str("2024-1-1").unwrap(),
			"Sample Entry".to_string(),
			0,
			7,
		)
	}

	fn eur(value: &str) -> Amount {
		Amount::new(Quant::from_str(value).unwrap(), "EUR")
	}

	#[test]
	fn test_entry_creation() {
		let entry = create_entry();
		assert_eq!(entry.get_date(), &Date::from_str("2024-1-1").unwrap());
		assert!(entry.details.is_empty());
		assert_eq!(entry.context(), "line 7 (2024-01-01 Sample Entry)");
	}

	#[test]
	fn test_add_detail() {
		let mut entry = create_entry();
		let result = entry.add_detail("Assets:Cash", eur("100.0"));

		assert!(result.is_ok());
		assert_eq!(entry.details.len(), 1);

		let detail = &entry.details[0];
		assert_eq!(detail.account, "Assets:Cash");
		assert_eq!(detail.amount.value, Quant::new(1000, 1));
		assert_eq!(detail.amount.currency, "EUR");
	}

	#[test]
	fn test_add_detail_empty_account() {
		let mut entry = create_entry();
		assert!(entry.add_detail("", eur("100.0")).is_err());
	}

	#[test]
	fn test_set_virtual_detail_twice() {
		let mut entry = create_entry();
		entry
			.set_virtual_detail("Assets:Virtual".to_string())
			.unwrap();
		let result = entry.set_virtual_detail("Assets:Another".to_string());

		assert!(result.is_err());
	}

	#[test]
	fn test_finalize_fills_virtual_detail() {
		let mut entry = create_entry();
		entry.add_detail("Expenses:Food", eur("12.50")).unwrap();
		entry.set_virtual_detail("Assets:Cash".to_string()).unwrap();
		entry.finalize();

		assert_eq!(entry.details.len(), 2);
		let filled = &entry.details[1];
		assert_eq!(filled.account(), "Assets:Cash");
		assert_eq!(filled.value().to_string(), "-12.50");
	}

	#[test]
	fn test_finalize_keeps_unbalanced_entry() {
		let mut entry = create_entry();
		entry.add_detail("Assets:Cash", eur("100.00")).unwrap();
		entry.add_detail("Expenses:Food", eur("-99.99")).unwrap();
		entry.finalize();

		assert_eq!(entry.details.len(), 2);
	}

	#[test]
	fn test_finalize_virtual_detail_per_currency() {
		let mut entry = create_entry();
		entry.add_detail("Expenses:Food", eur("10")).unwrap();
		entry
			.add_detail(
				"Expenses:Travel",
				Amount::new(Quant::new(5, 0), "USD"),
			)
			.unwrap();
		entry.set_virtual_detail("Assets:Cash".to_string()).unwrap();
		entry.finalize();

		assert_eq!(entry.details.len(), 4);
	}

	#[test]
	fn test_display() {
		let mut entry = create_entry();
		entry.add_reference("RE-2024-001".to_string());
		entry.add_detail("Expenses:Food", eur("1234.50")).unwrap();
		entry.add_detail("Assets:Cash", eur("-1234.50")).unwrap();

		assert_eq!(
			entry.to_string(),
			"2024-01-01 Sample Entry\n\
			\t// RE-2024-001\n\
			\tExpenses:Food   1,234.50 EUR\n\
			\tAssets:Cash    -1,234.50 EUR\n"
		);
	}
}
