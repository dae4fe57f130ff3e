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

use crate::gl::declaration::Declaration;
use crate::gl::entry::Entry;
use crate::util::amount::Amount;
use crate::util::date::Date;
use anyhow::{bail, Error};
use std::collections::{BTreeMap, HashSet};

/// The only valid top-level account names. German charts of accounts are
/// the normal case for DATEV users, so their usual roots are accepted
/// alongside the English ones.
pub const VALID_PREFIXES: [&str; 10] = [
	"Assets",
	"Liabilities",
	"Equity",
	"Income",
	"Expenses",
	"Aktiva",
	"Passiva",
	"Eigenkapital",
	"Erträge",
	"Aufwendungen",
];

/// Takes input from the parser and assembles it into journal entries.
/// Declared accounts are remembered in declaration order, which is also
/// the order of a derived account dictionary.
#[derive(Debug)]
pub struct Ledger {
	entries: Vec<Entry>,
	/// Entry currently being assembled, if any
	pending_entry: Option<Entry>,

	/// Skip currency and account validation steps
	lenient_mode: bool,

	/// currency -> the earliest date currency is allowed to appear
	declared_currencies: BTreeMap<String, Date>,
	/// account -> open/close history
	declared_accounts: BTreeMap<String, Declaration>,
	/// declared accounts in order of first appearance
	account_order: Vec<String>,
}

impl Ledger {
	pub fn new(lenient: bool) -> Self {
		Self {
			entries: vec![],
			pending_entry: None,
			lenient_mode: lenient,
			declared_currencies: Default::default(),
			declared_accounts: Default::default(),
			account_order: vec![],
		}
	}

	// -----------
	// -- INPUT --
	// -----------

	pub fn declare_currency(
		&mut self,
		currency: &str,
		date: Date,
	) -> Result<(), Error> {
		if self.declared_currencies.contains_key(currency) {
			if self.lenient_mode {
				return Ok(());
			}
			bail!("Currency {} declared twice", currency)
		}

		self.declared_currencies.insert(currency.to_string(), date);

		Ok(())
	}

	pub fn declare_account(
		&mut self,
		account: String,
		date: Date,
	) -> Result<(), Error> {
		Ledger::check_prefix(&account)?;

		if self.declared_accounts.contains_key(&account) {
			if self.lenient_mode {
				return Ok(());
			}
			bail!("Account {} declared twice", account)
		}

		let mut declaration = Declaration::new();
		declaration.open(date)?;

		self.account_order.push(account.clone());
		self.declared_accounts.insert(account, declaration);

		Ok(())
	}

	/// Reopens a closed account, or declares it if it was never seen. The
	/// reverse does not hold; "account" cannot reopen a closed account.
	pub fn declare_account_open(
		&mut self,
		account: String,
		date: Date,
	) -> Result<(), Error> {
		match self.declared_accounts.get_mut(&account) {
			Some(declaration) => declaration.open(date),
			None => self.declare_account(account, date),
		}
	}

	pub fn declare_account_closure(
		&mut self,
		account: String,
		date: Date,
	) -> Result<(), Error> {
		Ledger::check_prefix(&account)?;

		if !self.declared_accounts.contains_key(&account) {
			self.account_order.push(account.clone());
		}

		self.declared_accounts
			.entry(account)
			.or_default()
			.close(date)
	}

	pub fn new_entry(
		&mut self,
		date: Date,
		desc: String,
		index: usize,
		line: usize,
	) -> Result<(), Error> {
		if self.pending_entry.is_some() {
			self.finish_entry()?;
		}

		self.pending_entry = Some(Entry::new(date, desc, index, line));
		Ok(())
	}

	pub fn add_detail(
		&mut self,
		account: String,
		amount: Amount,
	) -> Result<(), Error> {
		let Some(pending_entry) = self.pending_entry.as_ref() else {
			bail!("Orphaned entry detail")
		};

		if !self.lenient_mode {
			let date = *pending_entry.get_date();
			self.check_account(&account, &date)?;
			self.check_currency(&amount.currency, &date)?;
		}

		Ledger::check_prefix(&account)?;

		match self.pending_entry.as_mut() {
			Some(entry) => entry.add_detail(&account, amount),
			None => bail!("Orphaned entry detail"),
		}
	}

	/// Sets the account name of the entry with no accompanying balance or
	/// currency. This account is then assumed to be the counterparty to all
	/// other detail lines in the entry that remain with any imbalance at
	/// the end of processing.
	pub fn set_virtual_detail(&mut self, account: String) -> Result<(), Error> {
		let Some(pending_entry) = self.pending_entry.as_ref() else {
			bail!("Orphaned entry detail")
		};

		if !self.lenient_mode {
			let date = *pending_entry.get_date();
			self.check_account(&account, &date)?;
		}

		Ledger::check_prefix(&account)?;

		match self.pending_entry.as_mut() {
			Some(entry) => entry.set_virtual_detail(account),
			None => bail!("Orphaned entry detail"),
		}
	}

	/// Adds a reference line, i.e. the document number of the entry
	pub fn add_reference(&mut self, reference: String) -> Result<(), Error> {
		match &mut self.pending_entry {
			Some(e) => {
				e.add_reference(reference);
				Ok(())
			},
			None => bail!("Orphaned reference"),
		}
	}

	/// Takes the pending entry, finalizes it and adds it to the set of
	/// entries on this. No-ops if nothing is pending.
	pub fn finish_entry(&mut self) -> Result<(), Error> {
		match self.pending_entry.take() {
			None => Ok(()),
			Some(mut entry) => {
				if entry.details().is_empty() {
					bail!("Empty entry")
				}

				entry.finalize();
				self.entries.push(entry);
				Ok(())
			},
		}
	}

	fn check_prefix(account: &str) -> Result<(), Error> {
		if account.is_empty() {
			bail!("Account is empty")
		}

		let root = account.split(':').next().unwrap_or_default();
		if !VALID_PREFIXES.contains(&root) {
			bail!("Invalid account prefix: {}", account)
		}

		Ok(())
	}

	/// Checks whether a currency has been declared for use, and that the
	/// declaration date is not ahead of the entry where it appears.
	fn check_currency(&self, currency: &str, date: &Date) -> Result<(), Error> {
		let declaration_date = match self.declared_currencies.get(currency) {
			Some(d) => d,
			None => bail!("Currency {} used without declaration", currency),
		};

		if date < declaration_date {
			bail!(
				"Currency {} used prior to declaration on {}",
				currency,
				declaration_date
			)
		}

		Ok(())
	}

	/// Checks whether an account has been declared for use and is open on
	/// the date of the entry where it appears.
	fn check_account(
		&self,
		account: &String,
		date: &Date,
	) -> Result<(), Error> {
		let declaration = match self.declared_accounts.get(account) {
			Some(d) => d,
			None => bail!("Account {} used without declaration", account),
		};

		if !declaration.is_open_on(date) {
			bail!("Account {} is not open", account)
		}

		Ok(())
	}

	// ----------------
	// -- TABULATING --
	// ----------------

	/// Puts entries in date order, keeping file order within a day.
	pub fn finalize(&mut self) {
		self.entries.sort();
	}

	pub fn entries(&self) -> &[Entry] {
		&self.entries
	}

	/// Every account that was ever opened, in declaration order, followed
	/// by accounts that were only used in entries (possible in lenient
	/// mode), in order of first use.
	pub fn account_names(&self) -> Vec<&str> {
		let mut seen = HashSet::new();
		let mut names = vec![];

		let declared = self
			.account_order
			.iter()
			.filter(|a| {
				self.declared_accounts
					.get(*a)
					.is_some_and(|d| d.was_ever_opened())
			})
			.map(String::as_str);
		let used = self
			.entries
			.iter()
			.flat_map(|e| e.details().iter().map(|d| d.account().as_str()));

		for account in declared.chain(used) {
			if seen.insert(account) {
				names.push(account);
			}
		}

		names
	}
}
