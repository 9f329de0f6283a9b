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
use log::warn;
use std::fmt::Display;
use std::thread;
use std::time::Duration;

/// Bounded retry with exponential backoff for calls to external services.
///
/// The n-th failed attempt waits `base_delay * 2^(n-1)`, capped at
/// `max_delay`, before attempt n+1. Only failures the caller's predicate
/// accepts are retried; anything else is returned immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_secs(2),
			max_delay: Duration::from_secs(10),
		}
	}
}

impl RetryPolicy {
	/// A policy that never waits between attempts.
	pub fn immediate(max_attempts: u32) -> Self {
		Self {
			max_attempts,
			base_delay: Duration::ZERO,
			max_delay: Duration::ZERO,
		}
	}

	/// Delay to wait after the given (1-based) failed attempt.
	pub fn delay_after(&self, attempt: u32) -> Duration {
		let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
		self.base_delay.saturating_mul(factor).min(self.max_delay)
	}

	pub fn run<T, E, F, P>(&self, op: F, is_retryable: P) -> Result<T, E>
	where
		E: Display,
		F: FnMut(u32) -> Result<T, E>,
		P: Fn(&E) -> bool,
	{
		self.run_with_sleep(op, is_retryable, thread::sleep)
	}

	/// Same as `run`, with the waiting delegated to `sleep`. The operation
	/// receives the 1-based number of the attempt being made.
	pub fn run_with_sleep<T, E, F, P, S>(
		&self,
		mut op: F,
		is_retryable: P,
		mut sleep: S,
	) -> Result<T, E>
	where
		E: Display,
		F: FnMut(u32) -> Result<T, E>,
		P: Fn(&E) -> bool,
		S: FnMut(Duration),
	{
		let max_attempts = self.max_attempts.max(1);
		let mut attempt = 1;

		loop {
			match op(attempt) {
				Ok(value) => return Ok(value),
				Err(e) if attempt < max_attempts && is_retryable(&e) => {
					let delay = self.delay_after(attempt);
					warn!(
						"Attempt {}/{} failed ({}); retrying in {:?}",
						attempt, max_attempts, e, delay
					);
					sleep(delay);
					attempt += 1;
				},
				Err(e) => return Err(e),
			}
		}
	}
}
