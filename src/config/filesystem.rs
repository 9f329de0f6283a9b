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
use crate::config::config_file::{self, Config};
use crate::roster::index::RosterIndex;
use anyhow::{anyhow, bail, Error};
use dirs::home_dir;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

const DEFAULT_CONFIG_PATH: &str = ".config/paynote/config.toml";

/// Fetches the config from the given path, or default path if none. A
/// missing default config is the same as an empty one; a missing custom
/// config is an error.
///
/// `env` supplies values that override the file (API key and bot token).
/// The boolean argument indicates whether secrets given as commands need
/// to be run, i.e. whether anything will talk to a remote service.
pub fn get_config(
	custom_config_path: Option<&String>,
	env: &EnvOverrides,
	expand_auth: bool,
) -> Result<Config, Error> {
	let config_path = match &custom_config_path {
		None => home_dir()
			.ok_or_else(|| anyhow!("Unable to determine home directory"))?
			.join(DEFAULT_CONFIG_PATH),
		Some(p) => PathBuf::from(p),
	};

	let mut config: Config =
		if !config_path.exists() && custom_config_path.is_none() {
			Config::default()
		} else {
			let content = fs::read_to_string(&config_path).map_err(|e| {
				anyhow!("failed to read {}: {}", config_path.display(), e)
			})?;
			toml::from_str(&content)
				.map_err(|e| anyhow!("failed to parse config: {}", e))?
		};

	env.apply(&mut config);

	if !expand_auth {
		return Ok(config);
	}

	if let Some(llm) = &mut config.llm {
		expand_secret("llm.api_key", &mut llm.api_key, &llm.api_key_cmd)?;
	}
	if let Some(telegram) = &mut config.telegram {
		expand_secret("telegram.token", &mut telegram.token, &telegram.token_cmd)?;
	}

	Ok(config)
}

/// Settings taken from the environment, which win over the config file.
#[derive(Debug, Default)]
pub struct EnvOverrides {
	pub api_key: Option<String>,
	pub telegram_token: Option<String>,
	pub customers_json: Option<String>,
}

impl EnvOverrides {
	pub fn from_env() -> Self {
		let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
		Self {
			api_key: var("OPENAI_API_KEY"),
			telegram_token: var("TELEGRAM_TOKEN_BOT"),
			customers_json: var("CUSTOMERS_JSON"),
		}
	}

	fn apply(&self, config: &mut Config) {
		if let Some(key) = &self.api_key {
			let llm = config.llm.get_or_insert_with(Default::default);
			llm.api_key = Some(key.clone());
			llm.api_key_cmd = None;
		}
		if let Some(token) = &self.telegram_token {
			let telegram = config.telegram.get_or_insert_with(Default::default);
			telegram.token = Some(token.clone());
			telegram.token_cmd = None;
		}
	}
}

/// Runs `cmd` if set and puts its trimmed output in `value`.
fn expand_secret(
	name: &str,
	value: &mut Option<String>,
	cmd: &Option<String>,
) -> Result<(), Error> {
	let Some(cmd) = cmd else {
		return Ok(());
	};
	if value.is_some() {
		bail!("Only one of {} and {}_cmd may be specified", name, name)
	}

	let output = Command::new("sh")
		.arg("-c")
		.arg(cmd)
		.output()
		.map_err(|e| anyhow!("failed to execute {}_cmd: {}", name, e))?;

	if !output.status.success() {
		bail!(
			"{}_cmd failed with status {}: {}",
			name,
			output.status,
			String::from_utf8_lossy(&output.stderr)
		);
	}

	*value = Some(
		String::from_utf8(output.stdout)
			.map_err(|e| anyhow!("failed to parse command output: {}", e))?
			.trim()
			.to_string(),
	);
	Ok(())
}

/// Builds the roster from the first source present: the file given on the
/// command line, the CUSTOMERS_JSON environment variable, the config's
/// customers_file, then its inline customers. Nothing here is fatal; a
/// source that cannot be read or decoded yields an empty roster.
pub fn load_roster(
	cli_customers: Option<&String>,
	env: &EnvOverrides,
	config: Option<&config_file::Roster>,
) -> RosterIndex {
	if let Some(path) = cli_customers {
		return roster_from_file(path);
	}
	if let Some(payload) = &env.customers_json {
		return RosterIndex::from_json(payload);
	}

	if let Some(roster) = config {
		if let Some(path) = &roster.customers_file {
			return roster_from_file(path);
		}
		if let Some(customers) = &roster.customers {
			let index = RosterIndex::build(customers);
			info!("Loaded {} customers", index.roster().len());
			return index;
		}
	}

	warn!("No customer roster configured; every lookup will miss");
	RosterIndex::default()
}

fn roster_from_file(path: &str) -> RosterIndex {
	match fs::read_to_string(path) {
		Ok(payload) => RosterIndex::from_json(&payload),
		Err(e) => {
			warn!("Failed to load customers from {}: {}", path, e);
			RosterIndex::default()
		},
	}
}
