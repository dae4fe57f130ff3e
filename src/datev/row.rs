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
use crate::util::date::Date;
use crate::util::quant::Quant;
use std::fmt;

const SIDE_FIELD: &str = "Soll/Haben-Kennzeichen";

/// Soll/Haben-Kennzeichen: which side of the booking the Konto column is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
	/// Soll, Konto is debited
	Debit,
	/// Haben, Konto is credited
	Credit,
}

impl Side {
	pub fn parse(input: &str) -> Result<Self, ConvertError> {
		match input.trim() {
			"S" | "s" => Ok(Side::Debit),
			"H" | "h" => Ok(Side::Credit),
			_ => Err(ConvertError::invalid_field(SIDE_FIELD, input)),
		}
	}

	pub fn code(&self) -> &'static str {
		match self {
			Side::Debit => "S",
			Side::Credit => "H",
		}
	}
}

impl fmt::Display for Side {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.code())
	}
}

/// One booking line of a Buchungsstapel. The amount is always positive;
/// direction is carried by side, account and contra account.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportRow {
	pub date: Date,
	pub amount: Quant,
	pub side: Side,
	/// Konto
	pub account: String,
	/// Gegenkonto (ohne BU-Schlüssel)
	pub contra_account: String,
	pub currency: String,
	/// Buchungstext
	pub narration: String,
	/// Belegfeld 1
	pub reference: Option<String>,
	pub booking_year: u32,
	/// Where the row came from, for error reports
	pub origin: String,
}

impl ExportRow {
	/// Code of the account that is debited
	pub fn debit_code(&self) -> &str {
		match self.side {
			Side::Debit => &self.account,
			Side::Credit => &self.contra_account,
		}
	}

	/// Code of the account that is credited
	pub fn credit_code(&self) -> &str {
		match self.side {
			Side::Debit => &self.contra_account,
			Side::Credit => &self.account,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(side: Side) -> ExportRow {
		ExportRow {
			date: Date::from_str("2024-05-02").unwrap(),
			amount: Quant::from_str("19.99").unwrap(),
			side,
			account: "4930".into(),
			contra_account: "1200".into(),
			currency: "EUR".into(),
			narration: "Toner".into(),
			reference: None,
			booking_year: 2024,
			origin: "row 3".into(),
		}
	}

	#[test]
	fn test_side_parse() {
		assert_eq!(Side::parse("S").unwrap(), Side::Debit);
		assert_eq!(Side::parse(" h ").unwrap(), Side::Credit);
		assert!(Side::parse("X").is_err());
		assert!(Side::parse("").is_err());
	}

	#[test]
	fn test_debit_and_credit_codes() {
		let debit = row(Side::Debit);
		assert_eq!(debit.debit_code(), "4930");
		assert_eq!(debit.credit_code(), "1200");

		let credit = row(Side::Credit);
		assert_eq!(credit.debit_code(), "1200");
		assert_eq!(credit.credit_code(), "4930");
	}
}
