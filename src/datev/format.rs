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
use crate::datev::header::Header;
use crate::datev::row::{ExportRow, Side};
use crate::util::quant::Quant;
use anyhow::{bail, Error};
use csv::{QuoteStyle, StringRecord, Terminator};
use encoding_rs::WINDOWS_1252;
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Every EXTF file name starts with this
pub const FILE_PREFIX: &str = "EXTF_";

/// Longest Buchungstext DATEV accepts
pub const MAX_NARRATION: usize = 60;
/// Longest Belegfeld 1 DATEV accepts
pub const MAX_REFERENCE: usize = 36;

const AMOUNT: &str = "Umsatz (ohne Soll/Haben-Kz)";
const SIDE: &str = "Soll/Haben-Kennzeichen";
const CURRENCY: &str = "WKZ Umsatz";
const ACCOUNT: &str = "Konto";
const CONTRA_ACCOUNT: &str = "Gegenkonto (ohne BU-Schlüssel)";
const DATE: &str = "Belegdatum";
const REFERENCE: &str = "Belegfeld 1";
const NARRATION: &str = "Buchungstext";

/// Column names of the second line, in the order data rows are written
pub const COLUMNS: [&str; 14] = [
	AMOUNT,
	SIDE,
	CURRENCY,
	"Kurs",
	"Basis-Umsatz",
	"WKZ Basis-Umsatz",
	ACCOUNT,
	CONTRA_ACCOUNT,
	"BU-Schlüssel",
	DATE,
	REFERENCE,
	"Belegfeld 2",
	"Skonto",
	NARRATION,
];

/// Wraps text in quotes, doubling any quotes inside.
pub fn quote(text: &str) -> String {
	format!("\"{}\"", text.replace('"', "\"\""))
}

/// Files written by us must follow the naming rule. Reading is more
/// forgiving since people rename files; that only gets a warning.
pub fn check_file_name(path: &str, writing: bool) -> Result<(), Error> {
	let name = Path::new(path)
		.file_name()
		.and_then(|n| n.to_str())
		.unwrap_or_default();

	if name.starts_with(FILE_PREFIX) {
		return Ok(());
	}

	if writing {
		bail!("DATEV file names must start with {}: {}", FILE_PREFIX, path)
	}
	warn!(file = path, "DATEV file names usually start with {}", FILE_PREFIX);
	Ok(())
}

/// The currency most rows are in, which becomes the batch currency. Ties
/// go to the alphabetically first one.
pub fn most_common_currency(rows: &[ExportRow]) -> String {
	let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
	for row in rows {
		*counts.entry(&row.currency).or_default() += 1;
	}

	let mut best = ("EUR", 0);
	for (currency, count) in counts {
		if count > best.1 {
			best = (currency, count);
		}
	}

	best.0.to_string()
}

pub fn write<W: Write>(
	header: &Header,
	rows: &[ExportRow],
	writer: W,
) -> Result<(), Error> {
	let mut csv_writer = csv::WriterBuilder::new()
		.delimiter(b';')
		.has_headers(false)
		.flexible(true)
		.quote_style(QuoteStyle::Never)
		.terminator(Terminator::CRLF)
		.from_writer(writer);

	csv_writer.write_record(header.to_fields())?;
	csv_writer.write_record(COLUMNS)?;
	for row in rows {
		csv_writer.write_record(row_fields(header, row))?;
	}
	csv_writer.flush()?;

	Ok(())
}

fn row_fields(header: &Header, row: &ExportRow) -> Vec<String> {
	let currency = if row.currency == header.currency {
		String::new()
	} else {
		quote(&row.currency)
	};
	let reference = match &row.reference {
		Some(r) => quote(&truncate(r, MAX_REFERENCE, REFERENCE, &row.origin)),
		None => String::new(),
	};
	let narration =
		truncate(&row.narration, MAX_NARRATION, NARRATION, &row.origin);

	vec![
		row.amount.to_comma_string(),
		quote(row.side.code()),
		currency,
		String::new(),
		String::new(),
		String::new(),
		row.account.clone(),
		row.contra_account.clone(),
		String::new(),
		row.date.to_ddmm(),
		reference,
		String::new(),
		String::new(),
		quote(&narration),
	]
}

fn truncate(text: &str, max: usize, column: &str, origin: &str) -> String {
	if text.chars().count() <= max {
		return text.to_string();
	}

	warn!(
		record = origin,
		column,
		"text longer than {} characters is cut",
		max
	);
	text.chars().take(max).collect()
}

/// Reads a whole EXTF Buchungsstapel. Problems with the file as a whole
/// are errors; problems with single rows come back as failed outcomes so
/// they can be reported together.
///
/// DATEV files are often Windows-1252; input that is not UTF-8 is read
/// as such.
pub fn read<R: Read>(
	mut reader: R,
) -> Result<(Header, Vec<Outcome<ExportRow>>), Error> {
	let mut bytes = vec![];
	reader.read_to_end(&mut bytes)?;

	let text = match String::from_utf8(bytes) {
		Ok(text) => text,
		Err(e) => {
			debug!("input is not UTF-8, reading it as Windows-1252");
			let (text, _, _) = WINDOWS_1252.decode(e.as_bytes());
			text.into_owned()
		},
	};
	let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

	let mut csv_reader = csv::ReaderBuilder::new()
		.delimiter(b';')
		.has_headers(false)
		.flexible(true)
		.from_reader(text.as_bytes());
	let mut records = csv_reader.records();

	let header = match records.next() {
		Some(record) => Header::from_record(&record?)?,
		None => bail!("DATEV file is empty"),
	};
	let columns = match records.next() {
		Some(record) => Columns::new(&record?)?,
		None => bail!("DATEV file has no column names"),
	};

	let mut rows = vec![];
	for record in records {
		let record = record?;
		if record.iter().all(|f| f.trim().is_empty()) {
			continue;
		}

		let line = record.position().map(|p| p.line()).unwrap_or_default();
		let origin = format!("row {}", line);
		rows.push(
			columns
				.parse_row(&header, &record, &origin)
				.map_err(|e| RecordError::new(&origin, e)),
		);
	}

	debug!(rows = rows.len(), currency = %header.currency, "read DATEV file");
	Ok((header, rows))
}

/// Positions of the columns we use, found by name on the second line
struct Columns {
	index: HashMap<String, usize>,
}

impl Columns {
	const REQUIRED: [&'static str; 5] =
		[AMOUNT, SIDE, ACCOUNT, CONTRA_ACCOUNT, DATE];

	fn new(record: &StringRecord) -> Result<Self, Error> {
		let mut index = HashMap::new();
		for (i, name) in record.iter().enumerate() {
			// some exporters write "Kontonummer" instead
			let name = match name.trim() {
				"Kontonummer" => ACCOUNT,
				n => n,
			};
			index.entry(name.to_string()).or_insert(i);
		}

		for required in Columns::REQUIRED {
			if !index.contains_key(required) {
				bail!("DATEV file has no column {:?}", required)
			}
		}

		Ok(Self { index })
	}

	fn get<'r>(&self, record: &'r StringRecord, name: &str) -> &'r str {
		self.index
			.get(name)
			.and_then(|&i| record.get(i))
			.unwrap_or_default()
			.trim()
	}

	fn parse_row(
		&self,
		header: &Header,
		record: &StringRecord,
		origin: &str,
	) -> Result<ExportRow, ConvertError> {
		let raw_amount = self.get(record, AMOUNT);
		let amount = Quant::from_comma_str(raw_amount)
			.map_err(|_| ConvertError::invalid_field(AMOUNT, raw_amount))?;
		if amount.is_negative() {
			return Err(ConvertError::invalid_field(AMOUNT, raw_amount));
		}

		let code = |name: &'static str| {
			let value = self.get(record, name);
			if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
				return Err(ConvertError::invalid_field(name, value));
			}
			Ok(value.to_string())
		};

		let date = header.date_for(self.get(record, DATE))?;
		let currency = match self.get(record, CURRENCY) {
			"" => header.currency.clone(),
			c => c.to_string(),
		};
		let reference = match self.get(record, REFERENCE) {
			"" => None,
			r => Some(r.to_string()),
		};

		Ok(ExportRow {
			date,
			amount,
			side: Side::parse(self.get(record, SIDE))?,
			account: code(ACCOUNT)?,
			contra_account: code(CONTRA_ACCOUNT)?,
			currency,
			narration: self.get(record, NARRATION).to_string(),
			reference,
			booking_year: date.year(),
			origin: origin.to_string(),
		})
	}
}
