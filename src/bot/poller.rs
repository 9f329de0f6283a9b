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
use crate::bot::handler::MessageHandler;
use crate::remote::telegram::{TelegramApi, Update};
use log::{error, info, warn};
use std::thread;
use std::time::Duration;

/// Pause after a failed poll before asking again.
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Long-polls Telegram forever, handling each message of a batch on its
/// own scoped thread. Threads share only the handler, which is read-only,
/// so messages of one batch may finish in any order.
pub fn run(
	api: &TelegramApi,
	handler: &MessageHandler,
	currency_symbol: Option<&str>,
	poll_timeout: u64,
) -> ! {
	info!("Starting payment bot polling...");
	let mut offset = 0;

	loop {
		let updates = match api.get_updates(offset, poll_timeout) {
			Ok(updates) => updates,
			Err(e) => {
				warn!("Polling failed: {}", e);
				thread::sleep(POLL_ERROR_PAUSE);
				continue;
			},
		};

		if let Some(last) = updates.iter().map(|u| u.update_id).max() {
			offset = last + 1;
		}

		thread::scope(|scope| {
			for update in updates {
				scope.spawn(move || {
					handle_update(api, handler, currency_symbol, update)
				});
			}
		});
	}
}

fn handle_update(
	api: &TelegramApi,
	handler: &MessageHandler,
	currency_symbol: Option<&str>,
	update: Update,
) {
	let Some((message, target)) = update.into_inbound() else {
		return;
	};

	let outcome = handler.handle(&message);
	if let Some(reply) = outcome.reply(currency_symbol) {
		if let Err(e) = api.send_message(target, &reply) {
			error!("Failed to reply to {}: {}", message.sender, e);
		}
	}
}
