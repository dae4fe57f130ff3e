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
use crate::gl::ledger::Ledger;
use crate::parsing::filesystem::Filesystem;
use crate::util::amount::Amount;
use crate::util::date::Date;
use crate::util::quant::Quant;
use anyhow::{anyhow, bail, Error};
use regex::Regex;
use std::collections::VecDeque;
use std::fs::File;
use std::io;
use std::io::{BufRead, Seek};

pub struct Parser {
	fs: Filesystem,
	detail_regex: Regex,

	/// Kept to order entries of the same day the way they appear in the
	/// file.
	entry_count: usize,
}

impl Parser {
	pub fn new() -> Self {
		let re = Regex::new(r#""([^"]*)"|(\S+)"#).unwrap();
		Self {
			detail_regex: re,
			fs: Filesystem::new(),
			entry_count: 0,
		}
	}

	/// Opens and parses the file at file_path into the passed Ledger. We make
	/// two passes through the file: the first processes directives, and the
	/// second processes everything else. This means we are agnostic to the
	/// order of any contents of the file.
	pub fn parse(
		&mut self,
		file_path: &str,
		ledger: &mut Ledger,
	) -> Result<(), Error> {
		let mut file = self.fs.open(file_path)?;

		self.first_pass(file_path, &file, ledger)?;
		file.rewind()?;

		self.second_pass(&file, ledger)?;
		ledger.finalize();

		Ok(())
	}

	/// First pass to process only directive lines. Include statements in the
	/// file may cause this to be called recursively, so the filesystem keeps
	/// track of files it's traversed before, and blocks circular inclusion.
	fn first_pass(
		&mut self,
		path: &str,
		file: &File,
		ledger: &mut Ledger,
	) -> Result<(), Error> {
		self.fs.declare_file(path)?;

		let reader = io::BufReader::new(file);

		for (i, line) in reader.lines().enumerate() {
			let line_no = i + 1;
			let l = strip_comment(&line?);

			// Skip blank lines
			if l.is_empty() {
				continue;
			}

			// Handle includes, which recursively first_passes when seen
			if l.starts_with("include") {
				let include: Vec<&str> = l.split_whitespace().collect();
				if include.len() != 2 {
					bail!("Invalid include (line {})", line_no)
				}

				let file = self.fs.open(include[1])?;
				self.first_pass(include[1], &file, ledger)?;
				continue;
			}

			let mut directive: VecDeque<&str> = match l.strip_prefix("!") {
				None => continue,
				Some(d) => d.split_whitespace().collect(),
			};

			if directive.len() != 3 {
				bail!("Invalid directive (line {}): {}", line_no, l);
			}

			let date_str = directive.pop_front().unwrap_or_default();
			let date = Date::from_str(date_str.trim())
				.map_err(|e| anyhow!("{} (line {})", e, line_no))?;

			let subject = directive[1].to_string();
			let result = match directive[0] {
				"currency" => ledger.declare_currency(&subject, date),
				"account" | "open" | "close" if !subject.contains(':') => {
					bail!(
						"Top level accounts cannot be used on their own \
						(line {})",
						line_no
					)
				},
				"account" => ledger.declare_account(subject, date),
				"open" => ledger.declare_account_open(subject, date),
				"close" => ledger.declare_account_closure(subject, date),
				_ => bail!("Invalid directive (line {}): {}", line_no, l),
			};
			result.map_err(|e| anyhow!("{} (line {})", e, line_no))?;
		}

		Ok(())
	}

	/// Second pass to process everything else other than directives. Include
	/// statements may cause this method to call itself recursively, but it
	/// does not need to keep track of where it is to avoid circular include
	/// statements because first_pass has already done that.
	fn second_pass(
		&mut self,
		file: &File,
		ledger: &mut Ledger,
	) -> Result<(), Error> {
		let reader = io::BufReader::new(file);

		for (i, line) in reader.lines().enumerate() {
			let line_no = i + 1;
			let raw = line?;
			let trimmed = raw.trim();

			// Whole-line comments are skipped without ending the entry
			if trimmed.starts_with('#') {
				continue;
			}

			// If a line is blank, this entry is over (or we are not in one)
			if trimmed.is_empty() {
				ledger
					.finish_entry()
					.map_err(|e| anyhow!("{} (line {})", e, line_no))?;
				continue;
			}

			// Reference lines keep everything after the slashes verbatim,
			// since document numbers like "#123" are common. Empty
			// references are fine; they just do nothing.
			if let Some(content) = trimmed.strip_prefix("//") {
				let content = content.trim();
				if !content.is_empty() {
					ledger
						.add_reference(content.to_string())
						.map_err(|e| anyhow!("{} (line {})", e, line_no))?;
				}
				continue;
			}

			// Entry declaration lines with a date and description; the
			// description is kept verbatim for the same reason
			if let Some((date_str, desc)) = trimmed.split_once(' ') {
				if let Ok(date) = Date::from_str(date_str.trim()) {
					ledger
						.new_entry(
							date,
							desc.trim().to_string(),
							self.entry_count,
							line_no,
						)
						.map_err(|e| anyhow!("{} (line {})", e, line_no))?;

					self.entry_count += 1;
					continue;
				}
			}

			let l = strip_comment(trimmed);
			if l.is_empty() {
				continue;
			}

			// Handle includes, which recursively second_passes when seen.
			// No need to check the structure of the include because the
			// first pass would've failed by now if it were invalid.
			if l.starts_with("include") {
				let include: Vec<&str> = l.split_whitespace().collect();

				let file = self.fs.open(include[1])?;
				self.second_pass(&file, ledger)?;
				continue;
			}

			// ignore directives
			if l.starts_with('!') {
				continue;
			}

			// Make sure the line is not a date by itself
			if Date::from_str(&l).is_ok() {
				bail!("Orphaned date (line {}): {}", line_no, l);
			}

			// Handle entry detail lines. Quoted terms stay together.
			let parts = self.parse_entry_detail(&l);
			match parts.len() {
				1 => ledger
					.set_virtual_detail(parts[0].clone())
					.map_err(|e| anyhow!("{} (line {})", e, line_no))?,
				3 => {
					// thousands separators are allowed in ledger amounts
					let value = Quant::from_str(&parts[1].replace(',', ""))
						.map_err(|e| anyhow!("{} (line {})", e, line_no))?;
					let amount = Amount::new(value, &parts[2]);

					ledger
						.add_detail(parts[0].clone(), amount)
						.map_err(|e| anyhow!("{} (line {})", e, line_no))?
				},
				6..=8 if ["@", "@@", "{"].contains(&parts[3].as_str()) => {
					bail!(
						"Price and lot annotations are not supported (line {})",
						line_no
					)
				},
				_ => bail!("Invalid format (line {})", line_no),
			}
		}

		// The file may end without a blank line after the last entry
		ledger
			.finish_entry()
			.map_err(|e| anyhow!("{} (line eof)", e))?;

		Ok(())
	}

	fn parse_entry_detail(&self, input: &str) -> Vec<String> {
		self.detail_regex
			.captures_iter(input)
			.map(|cap| {
				// Capture either the quoted group or the unquoted group
				cap.get(1).map_or_else(
					move || cap[2].to_string(),
					|m| m.as_str().to_string(),
				)
			})
			.collect()
	}
}

/// Chops a trailing comment off directive and detail lines
fn strip_comment(line: &str) -> String {
	line.trim()
		.split('#')
		.next()
		.unwrap_or_default()
		.trim()
		.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn parse_text(text: &str, lenient: bool) -> Result<Ledger, Error> {
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("ledger.txt");
		let mut file = File::create(&path)?;
		file.write_all(text.as_bytes())?;

		let mut ledger = Ledger::new(lenient);
		let mut parser = Parser::new();
		parser.parse(path.to_str().unwrap_or_default(), &mut ledger)?;
		Ok(ledger)
	}

	const DECLARATIONS: &str = "!2024-01-01 currency EUR\n\
		!2024-01-01 account Aktiva:1-Umlaufvermögen:1200-Bank\n\
		!2024-01-01 open Aufwendungen:4-Betrieb:4930-Bürobedarf # paper\n\n";

	#[test]
	fn test_parse_entries() {
		let text = format!(
			"{}2024-03-01 Paper, toner & pens\n\
			\t// RE #4711\n\
			\tAufwendungen:4-Betrieb:4930-Bürobedarf  1,234.50 EUR\n\
			\tAktiva:1-Umlaufvermögen:1200-Bank\n",
			DECLARATIONS
		);
		let ledger = parse_text(&text, false).unwrap();

		assert_eq!(ledger.entries().len(), 1);
		let entry = &ledger.entries()[0];
		assert_eq!(entry.get_desc(), "Paper, toner & pens");
		assert_eq!(entry.get_reference().unwrap(), "RE #4711");
		assert_eq!(
			entry.context(),
			"line 5 (2024-03-01 Paper, toner & pens)"
		);
		assert_eq!(entry.details().len(), 2);
		assert_eq!(entry.details()[0].value().to_string(), "1234.50");
		assert_eq!(entry.details()[1].value().to_string(), "-1234.50");
	}

	#[test]
	fn test_declared_accounts() {
		let ledger = parse_text(DECLARATIONS, false).unwrap();
		assert_eq!(
			ledger.account_names(),
			vec![
				"Aktiva:1-Umlaufvermögen:1200-Bank",
				"Aufwendungen:4-Betrieb:4930-Bürobedarf",
			]
		);
	}

	#[test]
	fn test_comment_line_inside_entry() {
		let text = "2024-03-01 Lunch\n\
			\tExpenses:Food  10 EUR\n\
			# paid in cash\n\
			\tAssets:Cash  -10 EUR\n";
		let ledger = parse_text(text, true).unwrap();
		assert_eq!(ledger.entries()[0].details().len(), 2);
	}

	#[test]
	fn test_unbalanced_entry_is_kept() {
		let text = "2024-03-01 Lunch\n\
			\tExpenses:Food  100.00 EUR\n\
			\tAssets:Cash  -99.99 EUR\n";
		let ledger = parse_text(text, true).unwrap();
		assert_eq!(ledger.entries().len(), 1);
	}

	#[test]
	fn test_price_annotation_rejected() {
		let text = "2024-03-01 Exchange\n\
			\tAssets:Cash  10 USD @ 0.90 EUR\n\
			\tAssets:Bank\n";
		let err = parse_text(text, true).unwrap_err();
		assert!(err.to_string().contains("not supported (line 2)"));
	}

	#[test]
	fn test_undeclared_account_fails_in_strict_mode() {
		let text = format!(
			"{}2024-03-01 Lunch\n\tExpenses:Food  10 EUR\n",
			DECLARATIONS
		);
		let err = parse_text(&text, false).unwrap_err();
		assert!(err.to_string().contains("used without declaration"));
	}

	#[test]
	fn test_invalid_directive() {
		let err =
			parse_text("!2024-01-01 rate USD EUR 0.9\n", true).unwrap_err();
		assert!(err.to_string().contains("Invalid directive (line 1)"));
	}

	#[test]
	fn test_top_level_account_directive() {
		let err = parse_text("!2024-01-01 account Aktiva\n", true).unwrap_err();
		assert!(err.to_string().contains("Top level accounts"));
	}

	#[test]
	fn test_orphaned_date() {
		let err = parse_text("2024-01-01\n", true).unwrap_err();
		assert!(err.to_string().contains("Orphaned date"));
	}

	#[test]
	fn test_quoted_account() {
		let parser = Parser::new();
		let parts =
			parser.parse_entry_detail("\"Expenses:Food and Drink\" 5 EUR");
		assert_eq!(parts, vec!["Expenses:Food and Drink", "5", "EUR"]);
	}
}
