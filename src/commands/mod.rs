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
use crate::config::config_file::Config;
use crate::convert::outcome::RunPolicy;
use crate::gl::ledger::Ledger;
use crate::mapping::account_map::AccountMap;
use crate::mapping::dictionary;
use crate::parsing::filesystem::Filesystem;
use crate::parsing::parser::Parser;
use crate::util::date::Date;
use crate::Cli;
use anyhow::{anyhow, bail, Error};
use std::io;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

pub mod accounts;
pub mod export;
pub mod import;

/// Loads the mapping table named on the command line, or in the config.
fn load_map(args: &Cli, config: &Config) -> Result<AccountMap, Error> {
	let Some(path) = args.account_dictionary.clone().or(config.dictionary())
	else {
		bail!("An account dictionary is required (--account_dictionary)")
	};

	let file = Filesystem::new().open(&path)?;
	let map = dictionary::read(BufReader::new(file))
		.map_err(|e| anyhow!("{}: {}", path, e))?;

	if map.is_empty() {
		warn!(file = %path, "account dictionary has no entries");
	}
	info!(file = %path, entries = map.len(), "loaded account dictionary");

	Ok(map)
}

fn parse_ledger(args: &Cli) -> Result<Ledger, Error> {
	let mut ledger = Ledger::new(args.lenient);
	let mut parser = Parser::new();
	parser.parse(&args.file, &mut ledger)?;

	info!(file = %args.file, entries = ledger.entries().len(), "parsed ledger");
	Ok(ledger)
}

fn policy(args: &Cli, config: &Config) -> RunPolicy {
	if args.skip_invalid {
		RunPolicy::Skip
	} else {
		config.policy()
	}
}

fn parse_date(input: &Option<String>) -> Result<Option<Date>, Error> {
	input.as_deref().map(Date::from_str).transpose()
}

/// Fails early if --out already exists, before any work is done.
fn refuse_existing_output(args: &Cli) -> Result<(), Error> {
	if let Some(out) = &args.out {
		if Path::new(out).exists() {
			bail!("Output file exists: {}", out)
		}
	}
	Ok(())
}

/// The --out file if given, stdout otherwise.
fn output(args: &Cli) -> Result<Box<dyn Write>, Error> {
	match &args.out {
		Some(out) => {
			let file = Filesystem::new().create_new(out)?;
			Ok(Box::new(BufWriter::new(file)))
		},
		None => Ok(Box::new(io::stdout().lock())),
	}
}
