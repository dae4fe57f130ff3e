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
use crate::convert::transaction::{Posting, Transaction};
use crate::datev::row::ExportRow;
use crate::mapping::account_map::AccountMap;
use crate::util::amount::Amount;

/// Turns booking lines back into transactions, one outcome per row in
/// input order. Codes missing from the map go to the fallback account if
/// one is given.
pub fn decode(
	rows: &[ExportRow],
	map: &AccountMap,
	fallback: Option<&str>,
) -> Vec<Outcome<Transaction>> {
	rows.iter().map(|r| decode_row(r, map, fallback)).collect()
}

pub fn decode_row(
	row: &ExportRow,
	map: &AccountMap,
	fallback: Option<&str>,
) -> Outcome<Transaction> {
	let to_record_error = |e| RecordError::new(&row.origin, e);

	let debit =
		resolve(map, row.debit_code(), fallback).map_err(to_record_error)?;
	let credit =
		resolve(map, row.credit_code(), fallback).map_err(to_record_error)?;
	let amount = Amount::new(row.amount, &row.currency);

	Transaction::new(
		row.date,
		vec![
			Posting::new(debit, amount.clone()),
			Posting::new(credit, -amount),
		],
		&row.narration,
		row.reference.clone(),
		&row.origin,
	)
	.map_err(to_record_error)
}

fn resolve<'a>(
	map: &'a AccountMap,
	code: &str,
	fallback: Option<&'a str>,
) -> Result<&'a str, ConvertError> {
	match (map.resolve_code_to_name(code), fallback) {
		(Err(ConvertError::UnmappedAccount(_)), Some(name)) => Ok(name),
		(result, _) => result,
	}
}
