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
use crate::bot::handler::InboundMessage;
use crate::record::recorder::Source;
use crate::remote::http::Client;
use crate::util::error::CollaboratorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Envelope every Bot API method responds with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
	ok: bool,
	result: Option<T>,
	description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
	pub update_id: i64,
	pub message: Option<Message>,
	pub edited_message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
	pub message_id: i64,
	pub chat: Chat,
	pub from: Option<User>,
	pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
	pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct User {
	pub username: Option<String>,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
}

impl User {
	/// The username, or "first last" for users without one.
	pub fn display(&self) -> String {
		if let Some(username) = &self.username {
			return username.clone();
		}
		format!(
			"{} {}",
			self.first_name.as_deref().unwrap_or_default(),
			self.last_name.as_deref().unwrap_or_default()
		)
		.trim()
		.to_string()
	}
}

/// Where to send the reply for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTarget {
	pub chat_id: i64,
	pub message_id: i64,
}

impl Update {
	/// The text message carried by this update, new or edited. Updates
	/// without text, and bot commands, carry nothing to handle.
	pub fn into_inbound(self) -> Option<(InboundMessage, ReplyTarget)> {
		let (message, source) = match (self.message, self.edited_message) {
			(Some(m), _) => (m, Source::Direct),
			(None, Some(m)) => (m, Source::Edited),
			(None, None) => return None,
		};

		let text = message.text?;
		if text.starts_with('/') {
			return None;
		}

		let sender = message.from.map(|u| u.display()).unwrap_or_default();
		let target = ReplyTarget {
			chat_id: message.chat.id,
			message_id: message.message_id,
		};

		Some((
			InboundMessage {
				text,
				sender,
				source,
			},
			target,
		))
	}
}

#[derive(Debug, Serialize)]
struct GetUpdatesParams {
	offset: i64,
	timeout: u64,
}

#[derive(Debug, Serialize)]
struct SendMessageParams<'a> {
	chat_id: i64,
	text: &'a str,
	reply_to_message_id: i64,
}

/// The two Bot API methods the bot needs: long polling and replying.
pub struct TelegramApi {
	http: Client,
}

impl TelegramApi {
	pub fn new(
		api_url: Option<String>,
		token: &str,
		poll_timeout: u64,
	) -> Result<Self, CollaboratorError> {
		let api_url = api_url.unwrap_or(TELEGRAM_API_URL.to_owned());
		let base_url = format!("{}/bot{}", api_url.trim_end_matches('/'), token);

		// the HTTP timeout has to outlast the long poll
		let timeout = Duration::from_secs(poll_timeout + 20);

		Ok(TelegramApi {
			http: Client::new(&base_url, None, timeout)?,
		})
	}

	pub fn get_updates(
		&self,
		offset: i64,
		timeout: u64,
	) -> Result<Vec<Update>, CollaboratorError> {
		let response: ApiResponse<Vec<Update>> = self
			.http
			.get("getUpdates", Some(GetUpdatesParams { offset, timeout }))?;
		unwrap_response(response)
	}

	pub fn send_message(
		&self,
		target: ReplyTarget,
		text: &str,
	) -> Result<(), CollaboratorError> {
		let response: ApiResponse<serde_json::Value> = self.http.post(
			"sendMessage",
			&SendMessageParams {
				chat_id: target.chat_id,
				text,
				reply_to_message_id: target.message_id,
			},
		)?;
		unwrap_response(response).map(|_| ())
	}
}

fn unwrap_response<T>(response: ApiResponse<T>) -> Result<T, CollaboratorError> {
	if !response.ok {
		return Err(CollaboratorError::Rejected(
			response
				.description
				.unwrap_or("telegram reported failure".to_owned()),
		));
	}
	response.result.ok_or_else(|| {
		CollaboratorError::Malformed("telegram response had no result".into())
	})
}
