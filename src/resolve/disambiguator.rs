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

/// Answer meaning "none of the candidates".
pub const NO_MATCH: &str = "null";

/// Something that, given an informal name and a pool of roster records,
/// answers with the one record it believes is meant, or `NO_MATCH`.
///
/// Answers are not trusted: the resolver checks them against the roster.
pub trait Disambiguator: Send + Sync {
	fn pick(
		&self,
		name: &str,
		candidates: &[String],
	) -> Result<String, CollaboratorError>;
}

/// Instructions sent ahead of the name, carrying the candidate pool as a
/// JSON array.
pub fn system_prompt(candidates: &[String]) -> Result<String, CollaboratorError> {
	let pool = serde_json::to_string(candidates)
		.map_err(|e| CollaboratorError::Malformed(e.to_string()))?;

	Ok(format!(
		"You match informal customer names to entries of a customer list.\n\
		Allow for typos, abbreviations, transliteration and word order.\n\
		Reply with exactly one entry copied verbatim from the list, or {} \
		if none of them is meant. Reply with nothing else.\n\n\
		CUSTOMERS:\n{}",
		NO_MATCH, pool
	))
}

pub fn user_prompt(name: &str) -> String {
	format!("Find customer: {}", name)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_system_prompt_embeds_pool_as_json() {
		let pool = vec!["(ann) Anna K".to_string(), "გიორგი".to_string()];
		let prompt = system_prompt(&pool).unwrap();
		assert!(prompt.ends_with(r#"["(ann) Anna K","გიორგი"]"#));
		assert!(prompt.contains("or null if"));
	}

	#[test]
	fn test_user_prompt() {
		assert_eq!(user_prompt("ana"), "Find customer: ana");
	}
}
