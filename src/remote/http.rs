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
use log::debug;
use reqwest::blocking::RequestBuilder;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct Client {
	client: reqwest::blocking::Client,
	base_url: String,
	api_key: Option<String>,
}

impl Client {
	pub fn new(
		base_url: &str,
		api_key: Option<String>,
		timeout: Duration,
	) -> Result<Self, CollaboratorError> {
		Ok(Client {
			client: reqwest::blocking::Client::builder()
				.timeout(timeout)
				.build()?,
			base_url: base_url.trim_end_matches('/').to_string(),
			api_key,
		})
	}

	/// Sends a GET and handles the response. Errors on non-2xx response codes.
	pub fn get<Q, R>(
		&self,
		endpoint: &str,
		query_params: Option<Q>,
	) -> Result<R, CollaboratorError>
	where
		Q: Serialize,
		R: for<'de> Deserialize<'de>,
	{
		let mut request = self.request(Method::GET, endpoint);
		if let Some(query_params) = query_params {
			request = request.query(&query_params);
		}
		self.send(endpoint, request)
	}

	/// Sends a POST with a JSON body and handles the response the same way.
	pub fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, CollaboratorError>
	where
		B: Serialize,
		R: for<'de> Deserialize<'de>,
	{
		let request = self.request(Method::POST, endpoint).json(body);
		self.send(endpoint, request)
	}

	fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
		let url = format!("{}/{}", self.base_url, endpoint);
		let request = self.client.request(method, url);

		match &self.api_key {
			Some(key) => request.header("Authorization", format!("Bearer {}", key)),
			None => request,
		}
	}

	fn send<R>(
		&self,
		endpoint: &str,
		request: RequestBuilder,
	) -> Result<R, CollaboratorError>
	where
		R: for<'de> Deserialize<'de>,
	{
		// base_url may carry a token, so only the endpoint is logged; errors
		// have their URL stripped on conversion
		debug!("Sending request to {}", endpoint);
		let response = request.send()?;

		// Handle non-2xx response codes
		let status = response.status();
		if !status.is_success() {
			let body = response.text().unwrap_or_default();
			return Err(CollaboratorError::Status {
				status: status.as_u16(),
				body,
			});
		}

		response
			.json::<R>()
			.map_err(|e| CollaboratorError::Malformed(e.without_url().to_string()))
	}
}
