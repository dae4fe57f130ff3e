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
use crate::convert::error::RecordError;
use crate::convert::outcome::Outcome;
use crate::convert::scope::YearScope;
use crate::convert::transaction::Transaction;
use crate::datev::row::{ExportRow, Side};
use crate::mapping::account_map::AccountMap;

/// Turns transactions into booking lines for one booking year.
/// Transactions outside the scope are left out without complaint; every
/// other transaction yields exactly one outcome, in input order.
pub fn encode(
	transactions: &[Transaction],
	scope: &YearScope,
	map: &AccountMap,
) -> Vec<Outcome<ExportRow>> {
	transactions
		.iter()
		.filter(|t| scope.contains(t.date()))
		.map(|t| encode_one(t, scope, map))
		.collect()
}

/// The debit posting goes into Konto and the row is marked S, so the
/// amount column never carries a sign.
fn encode_one(
	transaction: &Transaction,
	scope: &YearScope,
	map: &AccountMap,
) -> Outcome<ExportRow> {
	let to_record_error = |e| RecordError::new(transaction.origin(), e);

	let account = map
		.resolve_name_to_code(transaction.debit().account())
		.map_err(to_record_error)?;
	let contra_account = map
		.resolve_name_to_code(transaction.credit().account())
		.map_err(to_record_error)?;

	Ok(ExportRow {
		date: *transaction.date(),
		amount: transaction.amount(),
		side: Side::Debit,
		account: account.to_string(),
		contra_account: contra_account.to_string(),
		currency: transaction.currency().to_string(),
		narration: transaction.narration().to_string(),
		reference: transaction
			.reference()
			.map(|r| r.lines().collect::<Vec<_>>().join(" ")),
		booking_year: scope.year(),
		origin: transaction.origin().to_string(),
	})
}
