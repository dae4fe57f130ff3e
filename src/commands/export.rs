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
use crate::commands::{
	load_map, parse_date, parse_ledger, policy, refuse_existing_output,
};
use crate::config::config_file::Config;
use crate::convert::encoder::encode;
use crate::convert::outcome::{partition, settle, Outcome};
use crate::convert::scope::YearScope;
use crate::convert::transaction::Transaction;
use crate::datev::format;
use crate::datev::header::Header;
use crate::datev::row::ExportRow;
use crate::parsing::filesystem::Filesystem;
use crate::Cli;
use anyhow::{bail, Error};
use chrono::{Datelike, Local};
use std::io::{BufWriter, Write};
use tracing::{info, warn};

/// Ledger to DATEV. Nothing is written unless the run policy allows it.
pub fn run(args: &Cli, config: &Config) -> Result<(), Error> {
	let Some(out) = &args.out else {
		bail!("A DATEV file needs an output path (--out)")
	};
	format::check_file_name(out, true)?;
	refuse_existing_output(args)?;

	let year = match args.year {
		Some(year) => year,
		None => Local::now().year().try_into()?,
	};
	let scope =
		YearScope::new(year, parse_date(&args.begin)?, parse_date(&args.end)?)?;

	let map = load_map(args, config)?;
	map.check_unambiguous()?;

	let ledger = parse_ledger(args)?;

	// Entries outside the year are not exported, so whether they would
	// convert does not matter.
	let (transactions, rejected) = partition(
		ledger
			.entries()
			.iter()
			.filter(|e| scope.contains(e.get_date()))
			.map(Transaction::from_entry)
			.collect(),
	);
	let outcomes: Vec<Outcome<ExportRow>> = rejected
		.into_iter()
		.map(Err)
		.chain(encode(&transactions, &scope, &map))
		.collect();
	let rows = settle(outcomes, policy(args, config))?;

	let header = header(&scope, &rows, config);
	if map.width().is_some_and(|w| w != usize::from(header.account_length)) {
		warn!(
			account_length = header.account_length,
			"account codes in the dictionary have a different length"
		);
	}

	let file = Filesystem::new().create_new(out)?;
	let mut writer = BufWriter::new(file);
	format::write(&header, &rows, &mut writer)?;
	writer.flush()?;

	info!(file = %out, rows = rows.len(), year, "wrote DATEV file");
	Ok(())
}

fn header(scope: &YearScope, rows: &[ExportRow], config: &Config) -> Header {
	let mut header = Header::new(scope, &format::most_common_currency(rows));
	header.consultant = config.consultant();
	header.client = config.client();
	header.account_length = config.account_length();
	header.origin = config.origin();
	header.label = config.label().unwrap_or_default();
	header
}
