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
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_paynote");

/// Dynamically collects test cases from a given directory.
fn collect_test_cases(subfolder: &str) -> Vec<(String, String)> {
	let dir_path = format!("tests/test_data/{}", subfolder);

	let mut test_cases = vec![];

	if let Ok(entries) = fs::read_dir(&dir_path) {
		let mut inputs = vec![];
		let mut outputs = vec![];

		for entry in entries.flatten() {
			let file_name =
				entry.file_name().into_string().unwrap_or_default();
			if file_name.ends_with("_in.txt") {
				inputs.push(file_name);
			} else if file_name.ends_with("_out.txt") {
				outputs.push(file_name);
			}
		}

		inputs.sort();
		outputs.sort();

		// Pair inputs with corresponding outputs
		for input_file in inputs {
			let output_file = input_file.replace("_in.txt", "_out.txt");
			if outputs.contains(&output_file) {
				test_cases.push((input_file, output_file));
			}
		}
	}

	test_cases
}

fn scratch_ledger(name: &str) -> PathBuf {
	let path = std::env::temp_dir()
		.join(format!("paynote-it-{}-{}.tsv", name, std::process::id()));
	let _ = fs::remove_file(&path);
	path
}

/// Runs the binary offline against the test roster and config, so nothing
/// in the environment of the test run can change the result.
fn run(args: &[&str]) -> Output {
	Command::new(BIN)
		.args([
			"--offline",
			"--config",
			"tests/test_data/config.toml",
			"--customers",
			"tests/test_data/customers.json",
		])
		.args(args)
		.env_remove("CUSTOMERS_JSON")
		.env_remove("OPENAI_API_KEY")
		.env_remove("TELEGRAM_TOKEN_BOT")
		.output()
		.expect("Failed to execute process")
}

#[test]
fn test_integration_process() {
	let test_cases = collect_test_cases("process");
	assert!(!test_cases.is_empty());

	for (input_file, expected_output_file) in test_cases {
		println!("running for {}...", input_file);

		let loc = format!("tests/test_data/process/{}", input_file);
		let ledger = scratch_ledger(&input_file);
		let ledger_arg = ledger.to_string_lossy().to_string();

		let output = run(&["process", "-f", &loc, "-l", &ledger_arg]);
		assert!(
			output.status.success(),
			"{} failed processing: {}",
			input_file,
			String::from_utf8_lossy(&output.stderr)
		);

		let stdout = String::from_utf8_lossy(&output.stdout);
		let expected_output = fs::read_to_string(format!(
			"tests/test_data/process/{}",
			expected_output_file
		))
		.expect("Failed to read expected output file");

		assert_eq!(
			stdout.trim(),
			expected_output.trim(),
			"Output did not match for {}; expected:\n{}\ngot:\n{}",
			input_file,
			expected_output.trim(),
			stdout.trim()
		);

		// one ledger row per recorded payment
		let recorded = expected_output.matches("Payment recorded:").count();
		let rows = fs::read_to_string(&ledger).unwrap_or_default();
		assert_eq!(rows.lines().count(), recorded, "{}", input_file);
		let _ = fs::remove_file(&ledger);
	}
}

#[test]
fn test_integration_ledger_rows() {
	let ledger = scratch_ledger("rows");
	let ledger_arg = ledger.to_string_lossy().to_string();

	let output = run(&[
		"process",
		"-f",
		"tests/test_data/process/basic_in.txt",
		"-l",
		&ledger_arg,
	]);
	assert!(output.status.success());

	let content = fs::read_to_string(&ledger).expect("ledger was not written");
	let rows: Vec<Vec<&str>> =
		content.lines().map(|l| l.split('\t').collect()).collect();

	assert_eq!(rows.len(), 4);
	assert!(rows.iter().all(|r| r.len() == 5));
	assert_eq!(rows[0][1..], ["(ann) Anna K", "150", "Direct", "nino"]);
	assert_eq!(rows[1][1..], ["(gb) Giorgi Bakradze", "20.5", "Direct", "levan"]);
	assert_eq!(rows[3][1..], ["(ln) ლევან ნოზაძე", "70", "Direct", "cashier"]);
	let _ = fs::remove_file(&ledger);
}

#[test]
fn test_integration_parse() {
	let output = run(&["parse", "Giorgi Beridze 150 USD"]);
	assert!(output.status.success());
	assert_eq!(
		String::from_utf8_lossy(&output.stdout).trim(),
		"name: Giorgi Beridze\namount: 150"
	);

	let output = run(&["parse", "just text no number"]);
	assert_eq!(
		String::from_utf8_lossy(&output.stdout).trim(),
		"not a payment"
	);
}

#[test]
fn test_integration_resolve() {
	for (name, expected) in [
		("Anna K", "(ann) Anna K"),
		("anna k", "(ann) Anna K"),
		("(bob) Bob R", "(bob) Bob R"),
		("giorgi beridze", "Giorgi Beridze"),
		("Nobody", "not found"),
	] {
		let output = run(&["resolve", name]);
		assert!(output.status.success());
		assert_eq!(
			String::from_utf8_lossy(&output.stdout).trim(),
			expected,
			"resolving {}",
			name
		);
	}
}

#[test]
fn test_integration_malformed_roster_starts() {
	let output = Command::new(BIN)
		.args([
			"--offline",
			"--config",
			"tests/test_data/config.toml",
			"resolve",
			"Anna K",
		])
		.env("CUSTOMERS_JSON", "{ definitely not a list")
		.output()
		.expect("Failed to execute process");

	assert!(output.status.success());
	assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "not found");
}

#[test]
fn test_integration_requires_term() {
	let output = run(&["resolve"]);
	assert!(!output.status.success());
}
