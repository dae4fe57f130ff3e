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
use crate::parsing::filesystem::Filesystem;
use anyhow::{bail, Error};
use clap::Parser;
use std::path::Path;

mod commands;
mod config;
mod convert;
mod datev;
mod gl;
mod mapping;
mod parsing;
mod reports;
mod util;

#[derive(Parser)]
#[command(
	name = "ledatev",
	version,
	about = "Converts between plain text ledgers and DATEV booking batches"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// Ledger file, or a DATEV .csv file to turn into ledger entries
	file: String,

	// -----------
	// -- FLAGS --
	// -----------
	/// Write here instead of stdout; must not exist yet
	#[arg(long)]
	out: Option<String>,

	/// Booking year to export (default: current year)
	#[arg(long)]
	year: Option<u32>,

	/// Export nothing before this date (YYYY-MM-DD)
	#[arg(short, long)]
	begin: Option<String>,

	/// Export nothing after this date (YYYY-MM-DD)
	#[arg(short, long)]
	end: Option<String>,

	/// CSV file mapping DATEV account codes to ledger account names
	#[arg(long = "account_dictionary")]
	account_dictionary: Option<String>,

	/// Derive an account dictionary from the ledger's account names
	#[arg(long = "create_account_dictionary")]
	create_account_dictionary: bool,

	/// Ledger account for DATEV codes missing from the dictionary
	#[arg(long = "default_account")]
	default_account: Option<String>,

	/// Convert what can be converted and leave out the rest
	#[arg(long = "skip_invalid")]
	skip_invalid: bool,

	/// Do not require accounts and currencies to be declared
	#[arg(long)]
	lenient: bool,

	/// Custom config file location (default: ~/.config/ledatev/config.toml)
	#[arg(long)]
	config: Option<String>,

	/// Log progress to stderr
	#[arg(short, long)]
	verbose: bool,
}

impl Cli {
	fn is_datev_input(&self) -> bool {
		Path::new(&self.file)
			.extension()
			.is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
	}

	/// Extra validations on top of what clap does
	fn validate(&self) -> Result<(), Error> {
		if self.is_datev_input() && self.create_account_dictionary {
			bail!("Account dictionaries are created from ledger files")
		}

		Ok(())
	}
}

fn main() -> Result<(), Error> {
	let args = Cli::parse();
	util::logging::init(args.verbose);
	args.validate()?;

	let config = Filesystem::new().get_config(args.config.as_ref())?;

	if args.is_datev_input() {
		commands::import::run(&args, &config)
	} else if args.create_account_dictionary {
		commands::accounts::run(&args, &config)
	} else {
		commands::export::run(&args, &config)
	}
}
