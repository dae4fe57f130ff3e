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
use anyhow::{anyhow, bail, Error};
use dirs::home_dir;
use std::collections::HashSet;
use std::fs;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct Filesystem {
	/// Set of file paths that have been inspected.
	/// Used to avoid circular includes.
	included_files: HashSet<String>,
}

impl Filesystem {
	pub fn new() -> Self {
		Self {
			included_files: HashSet::new(),
		}
	}

	pub fn open(&self, file_path: &str) -> Result<File, Error> {
		let path = Path::new(file_path);
		File::open(path).map_err(|e| anyhow!("{}: {}", file_path, e))
	}

	pub fn declare_file(&mut self, file_path: &str) -> Result<(), Error> {
		if !self.included_files.insert(file_path.to_string()) {
			bail!("Circular file includes: {}", file_path)
		}
		Ok(())
	}

	/// Creates an output file, refusing to touch one that already exists.
	pub fn create_new(&self, file_path: &str) -> Result<File, Error> {
		OpenOptions::new()
			.write(true)
			.create_new(true)
			.open(file_path)
			.map_err(|e| match e.kind() {
				ErrorKind::AlreadyExists => {
					anyhow!("Output file exists: {}", file_path)
				},
				_ => anyhow!("{}: {}", file_path, e),
			})
	}

	/// Fetches the config from the given path, or default path if none.
	/// A missing default config just means defaults; a missing custom one
	/// is an error, since it was asked for by name.
	pub fn get_config(
		&self,
		custom_config_path: Option<&String>,
	) -> Result<Config, Error> {
		let config_path = match custom_config_path {
			Some(p) => PathBuf::from(p),
			None => match home_dir() {
				Some(home) => home.join(".config/ledatev/config.toml"),
				None => return Ok(Config::default()),
			},
		};

		if !config_path.exists() {
			if custom_config_path.is_some() {
				bail!("Config file not found: {}", config_path.display())
			}
			return Ok(Config::default());
		}

		let content = fs::read_to_string(&config_path)?;
		Config::from_toml(&content)
	}
}
