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
use crate::remote::http::Client;
use crate::resolve::disambiguator::{system_prompt, user_prompt, Disambiguator};
use crate::util::error::CollaboratorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
	model: &'a str,
	messages: Vec<ChatMessage>,
	max_tokens: u32,
	temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
	role: &'static str,
	content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
	choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
	message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
	content: Option<String>,
}

/// Chat completions client used to pick a customer out of a candidate pool.
pub struct OpenAiDisambiguator {
	http: Client,
	model: String,
}

impl OpenAiDisambiguator {
	pub fn new(
		api_url: Option<String>,
		api_key: String,
		model: Option<String>,
	) -> Result<Self, CollaboratorError> {
		let api_url = api_url.unwrap_or(OPENAI_API_URL.to_owned());

		Ok(OpenAiDisambiguator {
			http: Client::new(&api_url, Some(api_key), REQUEST_TIMEOUT)?,
			model: model.unwrap_or(DEFAULT_MODEL.to_owned()),
		})
	}
}

impl Disambiguator for OpenAiDisambiguator {
	fn pick(
		&self,
		name: &str,
		candidates: &[String],
	) -> Result<String, CollaboratorError> {
		let request = ChatRequest {
			model: &self.model,
			messages: vec![
				ChatMessage {
					role: "system",
					content: system_prompt(candidates)?,
				},
				ChatMessage {
					role: "user",
					content: user_prompt(name),
				},
			],
			max_tokens: 100,
			temperature: 0.1,
		};

		let response: ChatResponse = self.http.post("chat/completions", &request)?;
		first_answer(response)
	}
}

fn first_answer(response: ChatResponse) -> Result<String, CollaboratorError> {
	response
		.choices
		.into_iter()
		.next()
		.and_then(|c| c.message.content)
		.map(|content| content.trim().to_string())
		.ok_or_else(|| {
			CollaboratorError::Malformed("completion carried no message".into())
		})
}
