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
use crate::util::error::CollaboratorError;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether the payment arrived as a new message or an edit of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
	Direct,
	Edited,
}

impl fmt::Display for Source {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Source::Direct => write!(f, "Direct"),
			Source::Edited => write!(f, "Edited"),
		}
	}
}

/// One resolved payment, as appended to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
	pub timestamp: String,
	pub customer: String,
	pub amount: String,
	pub source: Source,
	pub sender: String,
}

/// Renders as a single tab-separated line; tabs and line breaks inside
/// fields become spaces so a row never spills over.
impl fmt::Display for LedgerRow {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let clean = |s: &str| s.replace(['\t', '\n', '\r'], " ");
		write!(
			f,
			"{}\t{}\t{}\t{}\t{}",
			clean(&self.timestamp),
			clean(&self.customer),
			clean(&self.amount),
			self.source,
			clean(&self.sender)
		)
	}
}

/// Append-only storage for resolved payments.
pub trait LedgerRecorder: Send + Sync {
	fn append(&self, row: &LedgerRow) -> Result<(), CollaboratorError>;
}

/// Appends rows to a plain text file, one line each. The file is opened
/// per append so it can be rotated or edited between payments.
pub struct FileRecorder {
	path: PathBuf,
	lock: Mutex<()>,
}

impl FileRecorder {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			lock: Mutex::new(()),
		}
	}
}

impl LedgerRecorder for FileRecorder {
	fn append(&self, row: &LedgerRow) -> Result<(), CollaboratorError> {
		let _guard = self
			.lock
			.lock()
			.map_err(|_| CollaboratorError::Rejected("ledger lock poisoned".into()))?;

		let mut file =
			OpenOptions::new().append(true).create(true).open(&self.path)?;
		writeln!(file, "{}", row)?;
		Ok(())
	}
}
