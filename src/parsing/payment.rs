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
use crate::util::amount::Amount;
use log::debug;
use regex::Regex;
use std::str::FromStr;

/// A name and a strictly positive amount read from one chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPayment {
	pub raw_name: String,
	pub amount: Amount,
}

pub struct PaymentParser {
	payment_regex: Regex,
}

impl PaymentParser {
	pub fn new() -> Self {
		// name, then the last numeric token, then an optional currency word
		let re = Regex::new(
			r"^(.*\S)\s+(-?\d+(?:\.\d+)?)\s*(\p{Alphabetic}+)?$",
		)
		.unwrap();
		Self { payment_regex: re }
	}

	/// Reads "<name> <amount> [currency]" from the text. Anything else,
	/// including a zero or negative amount, is not a payment and yields
	/// None. The currency word is accepted but not kept.
	pub fn parse(&self, text: &str) -> Option<ParsedPayment> {
		let text = text.trim();
		let caps = self.payment_regex.captures(text)?;

		let raw_name = caps.get(1)?.as_str().trim().to_string();
		let amount = match Amount::from_str(caps.get(2)?.as_str()) {
			Ok(a) => a,
			Err(e) => {
				debug!("Could not read amount in '{}': {}", text, e);
				return None;
			},
		};

		if !amount.is_positive() {
			debug!("Ignoring non-positive amount in '{}'", text);
			return None;
		}

		Some(ParsedPayment { raw_name, amount })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn amount(s: &str) -> Amount {
		Amount::from_str(s).unwrap()
	}

	#[test]
	fn test_name_and_amount() {
		let parser = PaymentParser::new();
		assert_eq!(
			parser.parse("Giorgi Beridze 150"),
			Some(ParsedPayment {
				raw_name: "Giorgi Beridze".to_string(),
				amount: amount("150"),
			})
		);
	}

	#[test]
	fn test_currency_is_discarded() {
		let parser = PaymentParser::new();
		let expected = parser.parse("Giorgi Beridze 150");
		assert_eq!(parser.parse("Giorgi Beridze 150 USD"), expected);
		assert_eq!(parser.parse("Giorgi Beridze 150USD"), expected);
		assert_eq!(parser.parse("Giorgi Beridze 150 ლარი"), expected);
		assert_eq!(parser.parse("Giorgi Beridze 150 xyz"), expected);
	}

	#[test]
	fn test_decimal_amount() {
		let parser = PaymentParser::new();
		let parsed = parser.parse("  Anna K 12.50 GEL ").unwrap();
		assert_eq!(parsed.raw_name, "Anna K");
		assert_eq!(parsed.amount, amount("12.5"));
	}

	#[test]
	fn test_non_positive_amounts() {
		let parser = PaymentParser::new();
		assert_eq!(parser.parse("Giorgi Beridze -5"), None);
		assert_eq!(parser.parse("Giorgi Beridze 0"), None);
		assert_eq!(parser.parse("Giorgi Beridze 0.00 EUR"), None);
	}

	#[test]
	fn test_plus_sign_is_not_a_payment() {
		let parser = PaymentParser::new();
		assert_eq!(parser.parse("Anna +5"), None);
		assert_eq!(parser.parse("Anna K +12.5 GEL"), None);
	}

	#[test]
	fn test_not_a_payment() {
		let parser = PaymentParser::new();
		assert_eq!(parser.parse("just text no number"), None);
		assert_eq!(parser.parse(""), None);
		assert_eq!(parser.parse("150"), None);
		assert_eq!(parser.parse("Anna 150 USD extra"), None);
		assert_eq!(parser.parse("Anna 1.5.0"), None);
	}

	#[test]
	fn test_name_is_kept_verbatim() {
		let parser = PaymentParser::new();
		let parsed = parser.parse("(ann) anna k. 3 45").unwrap();
		assert_eq!(parsed.raw_name, "(ann) anna k. 3");
		assert_eq!(parsed.amount, amount("45"));
	}

	#[test]
	fn test_huge_amount_is_not_a_payment() {
		let parser = PaymentParser::new();
		let text = format!("Anna {}", "9".repeat(60));
		assert_eq!(parser.parse(&text), None);
	}
}
