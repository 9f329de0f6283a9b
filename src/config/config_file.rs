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
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
	pub roster: Option<Roster>,
	pub llm: Option<Llm>,
	pub telegram: Option<Telegram>,
	pub ledger: Option<Ledger>,
	pub reply: Option<Reply>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Roster {
	/// Path to a JSON array of customer records.
	pub customers_file: Option<String>,
	/// Customer records given inline; used when no file is set.
	pub customers: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Llm {
	pub api_key: Option<String>,
	pub api_key_cmd: Option<String>,
	pub api_url: Option<String>,
	pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Telegram {
	pub token: Option<String>,
	pub token_cmd: Option<String>,
	pub api_url: Option<String>,

	/// Seconds each long poll may wait for new messages.
	pub poll_timeout: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Ledger {
	pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Reply {
	pub currency_symbol: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_full_config() {
		let config: Config = toml::from_str(
			r#"
			[roster]
			customers = ["(ann) Anna K", "Bob R"]

			[llm]
			api_key_cmd = "pass show openai"
			model = "gpt-4o-mini"

			[telegram]
			token = "123:abc"
			poll_timeout = 30

			[ledger]
			path = "payments.tsv"

			[reply]
			currency_symbol = "₾"
			"#,
		)
		.unwrap();

		assert_eq!(config.roster.unwrap().customers.unwrap().len(), 2);
		assert_eq!(
			config.llm.unwrap().api_key_cmd.as_deref(),
			Some("pass show openai")
		);
		assert_eq!(config.telegram.unwrap().poll_timeout, Some(30));
		assert_eq!(config.ledger.unwrap().path.as_deref(), Some("payments.tsv"));
		assert_eq!(config.reply.unwrap().currency_symbol.as_deref(), Some("₾"));
	}

	#[test]
	fn test_empty_config() {
		let config: Config = toml::from_str("").unwrap();
		assert!(config.roster.is_none());
		assert!(config.llm.is_none());
	}
}
