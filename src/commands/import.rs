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
use crate::commands::{load_map, output, policy, refuse_existing_output};
use crate::config::config_file::Config;
use crate::convert::decoder::decode;
use crate::convert::outcome::{partition, settle, Outcome};
use crate::convert::transaction::Transaction;
use crate::datev::format;
use crate::parsing::filesystem::Filesystem;
use crate::Cli;
use anyhow::Error;
use std::io::{BufReader, Write};
use tracing::info;

/// DATEV to ledger. Transactions are printed in date order.
pub fn run(args: &Cli, config: &Config) -> Result<(), Error> {
	format::check_file_name(&args.file, false)?;
	refuse_existing_output(args)?;

	let map = load_map(args, config)?;
	let fallback = args.default_account.clone().or(config.default_account());

	let file = Filesystem::new().open(&args.file)?;
	let (header, row_outcomes) = format::read(BufReader::new(file))?;
	info!(
		consultant = header.consultant,
		client = header.client,
		from = %header.date_from,
		to = %header.date_to,
		"reading DATEV batch"
	);

	let (rows, rejected) = partition(row_outcomes);
	let outcomes: Vec<Outcome<Transaction>> = rejected
		.into_iter()
		.map(Err)
		.chain(decode(&rows, &map, fallback.as_deref()))
		.collect();
	let mut transactions = settle(outcomes, policy(args, config))?;
	transactions.sort_by(|a, b| a.date().cmp(b.date()));

	let mut out = output(args)?;
	for (i, transaction) in transactions.iter().enumerate() {
		writeln!(out, "{}", transaction.to_entry(i)?)?;
	}
	out.flush()?;

	info!(transactions = transactions.len(), "converted DATEV file");
	Ok(())
}
