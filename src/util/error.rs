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
use thiserror::Error;

/// Failure of a call to something outside the process: the language model,
/// the chat API or the ledger file. Whether a failure is worth retrying is
/// decided by `is_transient`.
#[derive(Debug, Error)]
pub enum CollaboratorError {
	#[error("request failed: {0}")]
	Transport(reqwest::Error),

	#[error("service responded with status {status}: {body}")]
	Status { status: u16, body: String },

	#[error("malformed response: {0}")]
	Malformed(String),

	#[error("storage unavailable: {0}")]
	Io(#[from] std::io::Error),

	#[error("{0}")]
	Rejected(String),
}

/// Request URLs may carry credentials (the Telegram bot token is part of
/// the path), so they are dropped before the error can reach a log line.
impl From<reqwest::Error> for CollaboratorError {
	fn from(e: reqwest::Error) -> Self {
		CollaboratorError::Transport(e.without_url())
	}
}

impl CollaboratorError {
	/// Timeouts, dropped connections, throttling, server errors and garbled
	/// bodies may succeed on a second try. Client errors such as a bad API
	/// key will not.
	pub fn is_transient(&self) -> bool {
		match self {
			CollaboratorError::Transport(_)
			| CollaboratorError::Malformed(_)
			| CollaboratorError::Io(_) => true,
			CollaboratorError::Status { status, .. } => {
				*status == 408 || *status == 429 || *status >= 500
			},
			CollaboratorError::Rejected(_) => false,
		}
	}
}
