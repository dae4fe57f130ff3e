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
use crate::reports::table::Table;
use anyhow::{bail, Error};
use serde::Deserialize;
use tracing::warn;

/// Result of converting one record
pub type Outcome<T> = Result<T, RecordError>;

/// What to do with a run in which some records could not be converted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPolicy {
	/// Report every failure and write nothing
	#[default]
	Abort,
	/// Report every failure and write the records that did convert
	Skip,
}

/// Splits outcomes into converted records and failures, keeping the order
/// of each.
pub fn partition<T>(outcomes: Vec<Outcome<T>>) -> (Vec<T>, Vec<RecordError>) {
	let mut accepted = Vec::with_capacity(outcomes.len());
	let mut rejected = vec![];

	for outcome in outcomes {
		match outcome {
			Ok(record) => accepted.push(record),
			Err(e) => rejected.push(e),
		}
	}

	(accepted, rejected)
}

/// Applies the run policy once every record has been tried. Failures are
/// always reported in full, on stderr, before anything is written.
pub fn settle<T>(
	outcomes: Vec<Outcome<T>>,
	policy: RunPolicy,
) -> Result<Vec<T>, Error> {
	let total = outcomes.len();
	let (accepted, rejected) = partition(outcomes);
	if rejected.is_empty() {
		return Ok(accepted);
	}

	for e in &rejected {
		warn!(record = %e.context, "{}", e.error);
	}
	eprint!("{}", report(&rejected));

	match policy {
		RunPolicy::Abort => bail!(
			"{} of {} records could not be converted, nothing was written",
			rejected.len(),
			total
		),
		RunPolicy::Skip => {
			warn!(
				skipped = rejected.len(),
				written = accepted.len(),
				"skipping records that could not be converted"
			);
			Ok(accepted)
		},
	}
}

fn report(rejected: &[RecordError]) -> String {
	let mut table = Table::new(2);
	table.add_header(vec!["Record", "Problem"]);
	table.add_separator();
	for e in rejected {
		table.add_row(vec![e.context.clone(), e.error.to_string()]);
	}
	table.render()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::convert::error::ConvertError;

	fn outcomes() -> Vec<Outcome<u32>> {
		vec![
			Ok(1),
			Err(RecordError::new("row 3", ConvertError::ZeroAmount)),
			Ok(2),
			Err(RecordError::new(
				"row 5",
				ConvertError::UnmappedAccount("9999".into()),
			)),
		]
	}

	#[test]
	fn test_partition_keeps_order() {
		let (accepted, rejected) = partition(outcomes());
		assert_eq!(accepted, vec![1, 2]);
		assert_eq!(rejected.len(), 2);
		assert_eq!(rejected[0].context, "row 3");
		assert_eq!(rejected[1].context, "row 5");
	}

	#[test]
	fn test_settle_abort() {
		let err = settle(outcomes(), RunPolicy::Abort).unwrap_err();
		assert_eq!(
			err.to_string(),
			"2 of 4 records could not be converted, nothing was written"
		);
	}

	#[test]
	fn test_settle_skip() {
		assert_eq!(settle(outcomes(), RunPolicy::Skip).unwrap(), vec![1, 2]);
	}

	#[test]
	fn test_settle_clean_run() {
		let clean: Vec<Outcome<u32>> = vec![Ok(7), Ok(8)];
		assert_eq!(settle(clean, RunPolicy::Abort).unwrap(), vec![7, 8]);
	}

	#[test]
	fn test_report() {
		let (_, rejected) = partition(outcomes());
		let report = report(&rejected);
		assert!(report.starts_with("Record | "));
		assert!(report.contains("\nrow 5    no account mapping for 9999\n"));
	}
}
