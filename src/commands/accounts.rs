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
use crate::commands::{output, parse_ledger, refuse_existing_output};
use crate::config::config_file::Config;
use crate::mapping::builder::AccountMapBuilder;
use crate::mapping::dictionary;
use crate::Cli;
use anyhow::Error;
use tracing::info;

/// Derives an account dictionary from the codes embedded in the ledger's
/// account names.
pub fn run(args: &Cli, config: &Config) -> Result<(), Error> {
	refuse_existing_output(args)?;

	let ledger = parse_ledger(args)?;
	let builder = AccountMapBuilder::new(config.code_depth());
	let map = builder.build(ledger.account_names())?;

	let mut out = output(args)?;
	dictionary::write(&map, &mut out)?;
	out.flush()?;

	info!(accounts = map.len(), "created account dictionary");
	Ok(())
}
