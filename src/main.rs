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
use crate::bot::handler::{InboundMessage, MessageHandler};
use crate::config::config_file::Config;
use crate::config::filesystem::{get_config, load_roster, EnvOverrides};
use crate::parsing::payment::PaymentParser;
use crate::record::recorder::{FileRecorder, Source};
use crate::remote::openai::OpenAiDisambiguator;
use crate::remote::telegram::TelegramApi;
use crate::resolve::disambiguator::Disambiguator;
use crate::resolve::resolver::{NameResolver, Resolution};
use anyhow::{bail, Error};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::fs;
use std::io::{self, BufRead};

mod bot;
mod config;
mod parsing;
mod record;
mod remote;
mod resolve;
mod roster;
mod util;

const DEFAULT_LEDGER_PATH: &str = "payments.tsv";

const DEFAULT_POLL_TIMEOUT: u64 = 10;

#[derive(Parser)]
#[command(
	name = "paynote",
	version = "0.1",
	about = "Records chat payment notifications against a customer roster"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// The command to execute
	command: Directive,

	/// The payment text for Parse, or the customer name for Resolve
	#[arg(required = false)]
	term: Option<String>,

	// -----------
	// -- FLAGS --
	// -----------
	/// Messages to process, one per line ("-" for stdin)
	#[arg(short)]
	file: Option<String>,

	/// Custom config file location (default: ~/.config/paynote/config.toml)
	#[arg(long)]
	config: Option<String>,

	/// JSON file holding the customer roster; overrides config
	#[arg(long)]
	customers: Option<String>,

	/// File payments are appended to; overrides config
	#[arg(short, long)]
	ledger: Option<String>,

	/// Sender recorded for processed lines that do not name one
	#[arg(long, default_value = "cli")]
	sender: String,

	/// Never consult the language model
	#[arg(long)]
	offline: bool,
}

impl Cli {
	/// Extra validations on top of what clap does
	fn validate(&self) -> Result<(), Error> {
		match self.command {
			Directive::Parse | Directive::Resolve if self.term.is_none() => {
				bail!("No input text specified")
			},
			Directive::Process if self.file.is_none() => {
				bail!("Process requires an input file (-f)")
			},
			_ => Ok(()),
		}
	}

	fn needs_remote(&self) -> bool {
		self.command == Directive::Serve || !self.offline
	}
}

#[derive(ValueEnum, Clone, PartialEq)]
enum Directive {
	Parse,   // show what a message parses to
	Resolve, // resolve one customer name
	Process, // handle messages from a file
	Serve,   // run the Telegram bot
}

fn main() -> Result<(), Error> {
	env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

	let args = Cli::parse();
	args.validate()?;

	match args.command {
		Directive::Parse => parse(args.term.as_deref().unwrap_or_default()),
		Directive::Resolve => {
			let (_, resolver) = setup(&args)?;
			match resolver.resolve(args.term.as_deref().unwrap_or_default()) {
				Resolution::Resolved(record) => println!("{}", record),
				Resolution::NotFound => println!("not found"),
			}
			Ok(())
		},
		Directive::Process => {
			let (config, resolver) = setup(&args)?;
			let handler = build_handler(&args, &config, resolver);
			process(&args, &config, &handler)
		},
		Directive::Serve => {
			let (config, resolver) = setup(&args)?;
			let telegram = config.telegram.as_ref();
			let Some(token) = telegram.and_then(|t| t.token.as_deref()) else {
				bail!("No telegram token configured (telegram.token or TELEGRAM_TOKEN_BOT)");
			};
			let poll_timeout = telegram
				.and_then(|t| t.poll_timeout)
				.unwrap_or(DEFAULT_POLL_TIMEOUT);
			let api = TelegramApi::new(
				telegram.and_then(|t| t.api_url.clone()),
				token,
				poll_timeout,
			)?;

			let handler = build_handler(&args, &config, resolver);
			bot::poller::run(&api, &handler, currency_symbol(&config), poll_timeout)
		},
	}
}

/// Loads config and roster and builds the resolver on top of them.
fn setup(args: &Cli) -> Result<(Config, NameResolver), Error> {
	let env = EnvOverrides::from_env();
	let config = get_config(args.config.as_ref(), &env, args.needs_remote())?;

	let index =
		load_roster(args.customers.as_ref(), &env, config.roster.as_ref());
	let resolver = NameResolver::new(index, build_disambiguator(args, &config)?);

	Ok((config, resolver))
}

fn parse(text: &str) -> Result<(), Error> {
	match PaymentParser::new().parse(text) {
		Some(payment) => {
			println!("name: {}", payment.raw_name);
			println!("amount: {}", payment.amount);
		},
		None => println!("not a payment"),
	}
	Ok(())
}

/// The language model client, unless disabled or not configured. Without
/// one, names that miss every direct lookup are simply not found.
fn build_disambiguator(
	args: &Cli,
	config: &Config,
) -> Result<Option<Box<dyn Disambiguator>>, Error> {
	if args.offline {
		info!("Offline mode; language model lookups disabled");
		return Ok(None);
	}

	let Some(llm) = &config.llm else {
		warn!("No language model configured; fuzzy lookups disabled");
		return Ok(None);
	};
	let Some(api_key) = &llm.api_key else {
		warn!("No language model API key configured; fuzzy lookups disabled");
		return Ok(None);
	};

	let client = OpenAiDisambiguator::new(
		llm.api_url.clone(),
		api_key.clone(),
		llm.model.clone(),
	)?;
	Ok(Some(Box::new(client)))
}

fn build_handler(args: &Cli, config: &Config, resolver: NameResolver) -> MessageHandler {
	let path = args
		.ledger
		.clone()
		.or_else(|| config.ledger.as_ref().and_then(|l| l.path.clone()))
		.unwrap_or(DEFAULT_LEDGER_PATH.to_owned());
	info!("Recording payments to {}", path);

	MessageHandler::new(resolver, Box::new(FileRecorder::new(path)))
}

fn currency_symbol(config: &Config) -> Option<&str> {
	config
		.reply
		.as_ref()
		.and_then(|r| r.currency_symbol.as_deref())
}

/// Handles each line of the input as one chat message and prints the
/// replies. A line is either "sender<TAB>text" or just the text.
fn process(args: &Cli, config: &Config, handler: &MessageHandler) -> Result<(), Error> {
	let input: Box<dyn BufRead> = match args.file.as_deref() {
		Some("-") | None => Box::new(io::stdin().lock()),
		Some(path) => Box::new(io::BufReader::new(fs::File::open(path)?)),
	};

	for line in input.lines() {
		let line = line?;
		if line.trim().is_empty() {
			continue;
		}

		let (sender, text) = match line.split_once('\t') {
			Some((sender, text)) => (sender.to_string(), text.to_string()),
			None => (args.sender.clone(), line.clone()),
		};

		let message = InboundMessage {
			text,
			sender,
			source: Source::Direct,
		};
		if let Some(reply) = handler.handle(&message).reply(currency_symbol(config)) {
			println!("{}", reply);
		}
	}

	Ok(())
}
