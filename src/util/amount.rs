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
use anyhow::{anyhow, bail, Error};
use std::fmt;
use std::str::FromStr;

/// A decimal quantity as written in a payment message. Held as an integer
/// count of 10^-scale units so the value written into the ledger is exactly
/// the value the sender typed, without a trip through floating point.
///
/// Always stored reduced: trailing fractional zeroes are dropped, so "150",
/// "150.0" and "150.00" compare equal and all render as "150".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Amount {
	units: u128,
	scale: u32,

	/// Is always false if units is zero.
	is_negative: bool,
}

impl Amount {
	pub fn is_positive(&self) -> bool {
		self.units > 0 && !self.is_negative
	}

	fn reduce(mut self) -> Self {
		while self.scale > 0 && self.units % 10 == 0 {
			self.units /= 10;
			self.scale -= 1;
		}
		if self.units == 0 {
			self.is_negative = false;
		}
		self
	}
}

impl FromStr for Amount {
	type Err = Error;

	fn from_str(input: &str) -> Result<Self, Error> {
		let (is_negative, digits) = match input.strip_prefix('-') {
			Some(rest) => (true, rest),
			None => (false, input.strip_prefix('+').unwrap_or(input)),
		};

		let (whole, fraction) = match digits.split_once('.') {
			Some((w, f)) if !f.is_empty() => (w, f),
			Some(_) => bail!("Invalid decimal format: {}", input),
			None => (digits, ""),
		};

		if whole.is_empty()
			|| !whole.bytes().all(|b| b.is_ascii_digit())
			|| !fraction.bytes().all(|b| b.is_ascii_digit())
		{
			bail!("Invalid decimal format: {}", input);
		}

		let scale = u32::try_from(fraction.len())?;
		let too_large = || anyhow!("Amount out of range: {}", input);
		let factor = 10u128.checked_pow(scale).ok_or_else(too_large)?;

		let mut units =
			whole.parse::<u128>()?.checked_mul(factor).ok_or_else(too_large)?;
		if !fraction.is_empty() {
			units = units
				.checked_add(fraction.parse::<u128>()?)
				.ok_or_else(too_large)?;
		}

		Ok(Self {
			units,
			scale,
			is_negative,
		}
		.reduce())
	}
}

impl fmt::Display for Amount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_negative {
			write!(f, "-")?;
		}
		if self.scale == 0 {
			return write!(f, "{}", self.units);
		}

		let factor = 10u128.pow(self.scale);
		write!(
			f,
			"{}.{:0width$}",
			self.units / factor,
			self.units % factor,
			width = self.scale as usize
		)
	}
}
