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
use crate::config::config_file::{
	DEFAULT_ACCOUNT_LENGTH, DEFAULT_CLIENT, DEFAULT_CONSULTANT, DEFAULT_ORIGIN,
};
use crate::convert::error::ConvertError;
use crate::convert::scope::YearScope;
use crate::datev::format::quote;
use crate::util::date::Date;
use anyhow::{anyhow, bail, Error};
use chrono::Local;
use csv::StringRecord;

pub const MARKER: &str = "EXTF";
pub const FORMAT_VERSION: u32 = 700;
pub const CATEGORY: u32 = 21;
pub const CATEGORY_NAME: &str = "Buchungsstapel";
pub const CATEGORY_VERSION: u32 = 13;
pub const FIELD_COUNT: usize = 31;

/// The first line of an EXTF file, describing the batch that follows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
	/// Erzeugt am, YYYYMMDDHHMMSSFFF
	pub created: String,
	/// Herkunft
	pub origin: String,
	/// Berater
	pub consultant: u32,
	/// Mandant
	pub client: u32,
	/// WJ-Beginn
	pub fiscal_year_start: Date,
	/// Sachkontenlänge
	pub account_length: u8,
	/// Datum vom
	pub date_from: Date,
	/// Datum bis
	pub date_to: Date,
	/// Bezeichnung
	pub label: String,
	/// WKZ, the currency of rows that do not name their own
	pub currency: String,
}

impl Header {
	/// A header for an export of the given scope, stamped with the current
	/// time. The fiscal year is taken to be the calendar year.
	pub fn new(scope: &YearScope, currency: &str) -> Self {
		Self {
			created: Local::now().format("%Y%m%d%H%M%S%3f").to_string(),
			origin: DEFAULT_ORIGIN.to_string(),
			consultant: DEFAULT_CONSULTANT,
			client: DEFAULT_CLIENT,
			fiscal_year_start: Date::first_of_year(scope.year()),
			account_length: DEFAULT_ACCOUNT_LENGTH,
			date_from: *scope.begin(),
			date_to: *scope.end(),
			label: String::new(),
			currency: currency.to_string(),
		}
	}

	/// Fields as they are written, with text already quoted.
	pub fn to_fields(&self) -> Vec<String> {
		let mut fields = vec![
			quote(MARKER),
			FORMAT_VERSION.to_string(),
			CATEGORY.to_string(),
			quote(CATEGORY_NAME),
			CATEGORY_VERSION.to_string(),
			self.created.clone(),
			String::new(), // Importiert
			quote(&self.origin),
			quote(""), // Exportiert von
			quote(""), // Importiert von
			self.consultant.to_string(),
			self.client.to_string(),
			self.fiscal_year_start.to_compact(),
			self.account_length.to_string(),
			self.date_from.to_compact(),
			self.date_to.to_compact(),
			quote(&self.label),
			quote(""), // Diktatkürzel
			"1".to_string(), // Buchungstyp: Finanzbuchführung
			"0".to_string(), // Rechnungslegungszweck
			"0".to_string(), // Festschreibung
			quote(&self.currency),
		];
		fields.resize(FIELD_COUNT, String::new());
		fields
	}

	pub fn from_record(record: &StringRecord) -> Result<Self, Error> {
		let field = |i: usize| record.get(i).unwrap_or_default().trim();

		if field(0) != MARKER {
			bail!("Not a DATEV EXTF file: first field is {:?}", field(0))
		}
		if field(2) != CATEGORY.to_string() {
			bail!(
				"Only {} (category {}) files are supported, \
				found category {:?}",
				CATEGORY_NAME,
				CATEGORY,
				field(2)
			)
		}

		let invalid = |i: usize, name: &'static str| {
			anyhow!(ConvertError::invalid_field(name, field(i)))
		};
		let number = |i: usize, name: &'static str| {
			field(i).parse::<u32>().map_err(|_| invalid(i, name))
		};
		let date = |i: usize, name: &'static str| {
			Date::from_compact(field(i)).map_err(|_| invalid(i, name))
		};

		let currency = match field(21) {
			"" => "EUR".to_string(),
			c => c.to_string(),
		};

		Ok(Self {
			created: field(5).to_string(),
			origin: field(7).to_string(),
			consultant: number(10, "Berater")?,
			client: number(11, "Mandant")?,
			fiscal_year_start: date(12, "WJ-Beginn")?,
			account_length: field(13)
				.parse()
				.map_err(|_| invalid(13, "Sachkontenlänge"))?,
			date_from: date(14, "Datum vom")?,
			date_to: date(15, "Datum bis")?,
			label: field(16).to_string(),
			currency,
		})
	}

	/// Completes a DDMM Belegdatum. The year follows from the fiscal year:
	/// days before the day WJ-Beginn falls on belong to the following
	/// calendar year, which only happens for fiscal years not starting in
	/// January. Dates outside the batch's range are rejected.
	pub fn date_for(&self, ddmm: &str) -> Result<Date, ConvertError> {
		let invalid = || ConvertError::invalid_field("Belegdatum", ddmm);

		// 2000 is a leap year, so any day of the calendar parses
		let parsed = Date::from_ddmm(ddmm, 2000).map_err(|_| invalid())?;

		let start = &self.fiscal_year_start;
		let before_start =
			(parsed.month(), parsed.day()) < (start.month(), start.day());
		let year = if before_start {
			start.year() + 1
		} else {
			start.year()
		};

		let date = Date::new(year, parsed.month(), parsed.day())
			.map_err(|_| invalid())?;
		if date < self.date_from || date > self.date_to {
			return Err(invalid());
		}

		Ok(date)
	}
}
