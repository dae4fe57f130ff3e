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
use crate::mapping::account_map::AccountMap;
use anyhow::{anyhow, bail, Error};
use std::io::{Read, Write};

pub const DICTIONARY_HEADER: &str =
	"#account number (datev), account name (ledger)";

/// Reads an account dictionary: one `code,name` pair per line, code first.
/// Lines starting with '#' are comments. Codes may contain wildcards.
/// A byte order mark, as spreadsheet programs write one, is skipped.
pub fn read<R: Read>(mut reader: R) -> Result<AccountMap, Error> {
	let mut text = String::new();
	reader.read_to_string(&mut text)?;
	let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

	let mut csv_reader = csv::ReaderBuilder::new()
		.has_headers(false)
		.comment(Some(b'#'))
		.trim(csv::Trim::All)
		.flexible(true)
		.from_reader(text.as_bytes());

	let mut pairs = vec![];
	for record in csv_reader.records() {
		let record = record?;
		let line = record.position().map(|p| p.line()).unwrap_or_default();

		if record.len() != 2 {
			bail!(
				"Account dictionary needs two columns, found {} (line {})",
				record.len(),
				line
			);
		}

		pairs.push((record[0].to_string(), record[1].to_string()));
	}

	AccountMap::new(pairs)
		.map_err(|e| anyhow!("Invalid account dictionary: {}", e))
}

/// Writes the map in the same format `read` accepts, with a comment header.
pub fn write<W: Write>(map: &AccountMap, mut writer: W) -> Result<(), Error> {
	writeln!(writer, "{}", DICTIONARY_HEADER)?;

	let mut csv_writer = csv::WriterBuilder::new()
		.has_headers(false)
		.from_writer(writer);
	for entry in map.entries() {
		csv_writer.write_record([entry.pattern().as_str(), entry.name()])?;
	}
	csv_writer.flush()?;

	Ok(())
}
