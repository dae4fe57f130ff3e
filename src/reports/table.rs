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
use std::fmt::Write;

/// Plain text table for reports made of many single-line records, such as
/// the list of records a conversion had to reject. Widths are counted in
/// chars so umlauts in account names do not shift the columns.
pub struct Table {
	column_count: usize,
	rows: Vec<Row>,
	right_align: Vec<bool>, // indicates columns by index
}

pub enum Row {
	Header(Vec<String>),
	Data(Vec<String>),
	Separator,
}

impl Table {
	pub fn new(column_count: usize) -> Self {
		Self {
			column_count,
			rows: Vec::new(),
			right_align: vec![false; column_count],
		}
	}

	pub fn add_header(&mut self, row: Vec<&str>) {
		self.rows.push(Row::Header(
			row.into_iter().map(|s| s.to_string()).collect(),
		));
	}

	pub fn add_row(&mut self, row: Vec<String>) {
		self.rows.push(Row::Data(row));
	}

	pub fn add_separator(&mut self) {
		self.rows.push(Row::Separator);
	}

	/// Specifies columns that should be right-aligned by index.
	pub fn right_align(&mut self, cols: Vec<usize>) {
		for col in cols {
			self.right_align[col] = true;
		}
	}

	pub fn render(&self) -> String {
		let mut max_widths = vec![0; self.column_count];

		for row in &self.rows {
			if let Row::Data(cells) | Row::Header(cells) = row {
				for (i, value) in cells.iter().enumerate() {
					max_widths[i] = max_widths[i].max(width(value));
				}
			}
		}

		let mut out = String::new();
		for row in &self.rows {
			match row {
				Row::Header(cells) => {
					self.render_row(&mut out, &max_widths, cells, true)
				},
				Row::Data(cells) => {
					self.render_row(&mut out, &max_widths, cells, false)
				},
				Row::Separator => {
					let total = max_widths.iter().sum::<usize>()
						+ 3 * (self.column_count.max(1) - 1);
					out.push_str(&"-".repeat(total));
				},
			}
			out.push('\n');
		}

		out
	}

	fn render_row(
		&self,
		out: &mut String,
		max_widths: &[usize],
		cells: &[String],
		centered: bool,
	) {
		let last = cells.len().saturating_sub(1);
		for (i, value) in cells.iter().enumerate() {
			let pad = max_widths[i].saturating_sub(width(value));
			let (left, right) = if centered {
				(pad / 2, pad - pad / 2)
			} else if self.right_align[i] {
				(pad, 0)
			} else {
				(0, pad)
			};

			// the last column is not padded on the right
			let right = if i == last { 0 } else { right };
			let _ = write!(
				out,
				"{}{}{}",
				" ".repeat(left),
				value,
				" ".repeat(right)
			);

			if i < last {
				out.push_str(if centered { " | " } else { "   " });
			}
		}
	}
}

fn width(value: &str) -> usize {
	value.chars().count()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_render() {
		let mut table = Table::new(2);
		table.add_header(vec!["Record", "Problem"]);
		table.add_separator();
		table.add_row(vec![
			"row 3".into(),
			"no account mapping for 9999".into(),
		]);
		table.add_row(vec!["row 12".into(), "invalid date".into()]);
		table.right_align(vec![0]);

		let expected = [
			format!("Record | {}Problem", " ".repeat(10)),
			"-".repeat(36),
			" row 3   no account mapping for 9999".to_string(),
			"row 12   invalid date".to_string(),
		]
		.join("\n") + "\n";
		assert_eq!(table.render(), expected);
	}

	#[test]
	fn test_umlauts_count_once() {
		let mut table = Table::new(2);
		table.add_row(vec!["Bürobedarf".into(), "x".into()]);
		table.add_row(vec!["Porto".into(), "y".into()]);

		let padded = format!("Bürobedarf   x\nPorto{}y\n", " ".repeat(8));
		assert_eq!(table.render(), padded);
	}
}
