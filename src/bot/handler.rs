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
use crate::parsing::payment::PaymentParser;
use crate::record::recorder::{LedgerRecorder, LedgerRow, Source, TIMESTAMP_FORMAT};
use crate::resolve::resolver::{NameResolver, Resolution};
use crate::util::amount::Amount;
use crate::util::error::CollaboratorError;
use crate::util::retry::RetryPolicy;
use chrono::Local;
use log::{debug, error, info, warn};

/// A chat message as far as payment handling is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
	pub text: String,
	pub sender: String,
	pub source: Source,
}

/// What became of one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	/// Not a payment message; nothing to say.
	Ignored,
	Recorded { customer: String, amount: Amount },
	/// Resolved, but the ledger could not be written.
	NotRecorded { customer: String, amount: Amount },
	NotFound { name: String },
}

impl Outcome {
	/// The chat reply for this outcome, if any. The currency symbol is
	/// appended to amounts when configured.
	pub fn reply(&self, currency_symbol: Option<&str>) -> Option<String> {
		let amount = |a: &Amount| match currency_symbol {
			Some(symbol) => format!("{} {}", a, symbol),
			None => a.to_string(),
		};

		match self {
			Outcome::Ignored => None,
			Outcome::Recorded { customer, amount: a } => Some(format!(
				"Payment recorded:\n{}\nAmount: {}",
				customer,
				amount(a)
			)),
			Outcome::NotRecorded { .. } => Some(
				"Could not write the payment to the ledger. Please try again later."
					.to_string(),
			),
			Outcome::NotFound { name } => Some(format!(
				"Customer '{}' not found.\nPlease check the name and try again.",
				name
			)),
		}
	}
}

/// Takes a message from text to ledger row: parse, resolve, record.
///
/// Holds nothing mutable, so one handler serves any number of messages at
/// once; each call runs all of its steps for its own message.
pub struct MessageHandler {
	parser: PaymentParser,
	resolver: NameResolver,
	recorder: Box<dyn LedgerRecorder>,
	retry: RetryPolicy,
}

impl MessageHandler {
	pub fn new(resolver: NameResolver, recorder: Box<dyn LedgerRecorder>) -> Self {
		Self {
			parser: PaymentParser::new(),
			resolver,
			recorder,
			retry: RetryPolicy::default(),
		}
	}

	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	pub fn handle(&self, message: &InboundMessage) -> Outcome {
		info!(
			"Processing message from {}: '{}'",
			message.sender, message.text
		);

		let Some(payment) = self.parser.parse(&message.text) else {
			debug!("Could not parse payment from: '{}'", message.text);
			return Outcome::Ignored;
		};
		info!("Parsed payment: {} -> {}", payment.raw_name, payment.amount);

		let customer = match self.resolver.resolve(&payment.raw_name) {
			Resolution::Resolved(customer) => customer,
			Resolution::NotFound => {
				warn!("Customer not found: '{}'", payment.raw_name);
				return Outcome::NotFound {
					name: payment.raw_name,
				};
			},
		};

		let row = LedgerRow {
			timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
			customer: customer.clone(),
			amount: payment.amount.to_string(),
			source: message.source,
			sender: message.sender.clone(),
		};

		let recorded = self.retry.run(
			|_| self.recorder.append(&row),
			CollaboratorError::is_transient,
		);

		match recorded {
			Ok(()) => {
				info!(
					"Payment recorded: {} {} by {}",
					customer, payment.amount, message.sender
				);
				Outcome::Recorded {
					customer,
					amount: payment.amount,
				}
			},
			Err(e) => {
				error!("Error recording payment to ledger: {}", e);
				Outcome::NotRecorded {
					customer,
					amount: payment.amount,
				}
			},
		}
	}
}
