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
use std::path::Path;
use std::process::{Command, Output};

const DATA: &str = "tests/test_data";
const ACCOUNTS: &str = "tests/test_data/accounts.csv";
const CONFIG: &str = "tests/test_data/config.toml";

/// Dynamically collects test cases from a given directory. Inputs end with
/// `_in` plus the given extension; each is paired with its `_out.txt`.
fn collect_test_cases(
	subfolder: &str,
	extension: &str,
) -> Vec<(String, String)> {
	let dir_path = format!("{}/{}", DATA, subfolder);
	let input_suffix = format!("_in.{}", extension);

	let mut test_cases = vec![];

	if let Ok(entries) = fs::read_dir(&dir_path) {
		let mut names: Vec<String> = entries
			.flatten()
			.map(|e| e.file_name().into_string().unwrap_or_default())
			.collect();
		names.sort();

		for input_file in names.iter().filter(|n| n.ends_with(&input_suffix)) {
			let output_file = input_file.replace(&input_suffix, "_out.txt");
			if names.contains(&output_file) {
				test_cases.push((
					format!("{}/{}", dir_path, input_file),
					format!("{}/{}", dir_path, output_file),
				));
			}
		}
	}

	assert!(!test_cases.is_empty(), "no test cases in {}", dir_path);
	test_cases
}

fn run(args: &[&str]) -> Output {
	let all_args =
		[vec!["run", "--", "--config", CONFIG], args.to_vec()].concat();

	Command::new("cargo")
		.args(all_args)
		.output()
		.expect("Failed to execute process")
}

fn assert_success(output: &Output, input_file: &str) {
	assert!(
		output.status.success(),
		"{} failed processing: {}",
		input_file,
		String::from_utf8_lossy(&output.stderr)
	);
}

fn assert_stdout(
	output: &Output,
	input_file: &str,
	expected_output_file: &str,
) {
	let stdout = String::from_utf8_lossy(&output.stdout);
	let expected_output = fs::read_to_string(expected_output_file)
		.expect("Failed to read expected output file");

	assert_eq!(
		stdout.trim(),
		expected_output.trim(),
		"Output did not match for {}; expected:\n{}\ngot:\n{}",
		input_file,
		expected_output.trim(),
		stdout.trim()
	);
}

#[test]
fn test_integration_decode() {
	for (input_file, expected_output_file) in
		collect_test_cases("decode", "csv")
	{
		println!("running for {}...", input_file);

		let output =
			run(&[input_file.as_str(), "--account_dictionary", ACCOUNTS]);

		assert_success(&output, &input_file);
		assert_stdout(&output, &input_file, &expected_output_file);
	}
}

#[test]
fn test_integration_create_account_dictionary() {
	for (input_file, expected_output_file) in
		collect_test_cases("dictionary", "txt")
	{
		println!("running for {}...", input_file);

		let output = run(&[
			input_file.as_str(),
			"--create_account_dictionary",
			"--lenient",
		]);

		assert_success(&output, &input_file);
		assert_stdout(&output, &input_file, &expected_output_file);
	}
}

/// Exports a ledger for 2024, reads the export back, and compares the
/// result with the ledger entries expected to survive.
#[test]
fn test_integration_round_trip() {
	for (input_file, expected_output_file) in
		collect_test_cases("roundtrip", "txt")
	{
		println!("running for {}...", input_file);

		let dir = tempfile::tempdir().unwrap();
		let export = dir.path().join("EXTF_Buchungsstapel.csv");
		let export = export.to_str().unwrap();

		let output = run(&[
			input_file.as_str(),
			"--year",
			"2024",
			"--account_dictionary",
			ACCOUNTS,
			"--out",
			export,
		]);
		assert_success(&output, &input_file);

		let written = fs::read_to_string(export).unwrap();
		assert!(written.starts_with("\"EXTF\";700;21;\"Buchungsstapel\";13;"));
		assert!(written.contains(
			";29098;55003;20240101;4;20240101;20241231;\"Integration\";"
		));

		let output = run(&[export, "--account_dictionary", ACCOUNTS]);
		assert_success(&output, export);
		assert_stdout(&output, &input_file, &expected_output_file);
	}
}

/// Every case must fail, name the problem on stderr, and leave no output
/// file behind.
#[test]
fn test_integration_should_fail() {
	for (input_file, expected_output_file) in
		collect_test_cases("failures", "txt")
	{
		println!("running for {}...", input_file);

		let dir = tempfile::tempdir().unwrap();
		let export = dir.path().join("EXTF_out.csv");
		let export = export.to_str().unwrap();

		let output = run(&[
			input_file.as_str(),
			"--year",
			"2024",
			"--account_dictionary",
			ACCOUNTS,
			"--out",
			export,
		]);

		assert!(
			!output.status.success(),
			"{} unexpectedly succeeded!",
			input_file
		);

		let stderr = String::from_utf8_lossy(&output.stderr);
		let expected = fs::read_to_string(&expected_output_file).unwrap();
		assert!(
			stderr.contains(expected.trim()),
			"{}: expected {:?} in:\n{}",
			input_file,
			expected.trim(),
			stderr
		);
		assert!(!Path::new(export).exists(), "{} wrote output", input_file);
	}
}

#[test]
fn test_integration_skip_invalid() {
	let input_file = format!("{}/failures/unbalanced_in.txt", DATA);
	let dir = tempfile::tempdir().unwrap();
	let export = dir.path().join("EXTF_out.csv");
	let export = export.to_str().unwrap();

	let output = run(&[
		input_file.as_str(),
		"--year",
		"2024",
		"--account_dictionary",
		ACCOUNTS,
		"--out",
		export,
		"--skip_invalid",
	]);
	assert_success(&output, &input_file);

	// header, column names and the one good booking
	let written = fs::read_to_string(export).unwrap();
	assert_eq!(written.lines().count(), 3);
	assert!(written.contains("3,49;\"S\";;;;;4930;1200;;0202;;;;\"Ordner\""));
}

#[test]
fn test_integration_output_rules() {
	let input_file = format!("{}/roundtrip/basic_in.txt", DATA);
	let dir = tempfile::tempdir().unwrap();

	// DATEV file names start with EXTF_
	let unprefixed = dir.path().join("buchungen.csv");
	let output = run(&[
		input_file.as_str(),
		"--account_dictionary",
		ACCOUNTS,
		"--out",
		unprefixed.to_str().unwrap(),
	]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("EXTF_"));

	// an existing file is never overwritten
	let existing = dir.path().join("EXTF_existing.csv");
	fs::write(&existing, "keep me").unwrap();
	let output = run(&[
		input_file.as_str(),
		"--year",
		"2024",
		"--account_dictionary",
		ACCOUNTS,
		"--out",
		existing.to_str().unwrap(),
	]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr)
		.contains("Output file exists"));
	assert_eq!(fs::read_to_string(&existing).unwrap(), "keep me");

	// exporting needs a mapping
	let unmapped = dir.path().join("EXTF_x.csv");
	let output =
		run(&[input_file.as_str(), "--out", unmapped.to_str().unwrap()]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr)
		.contains("--account_dictionary"));
}

#[test]
fn test_integration_begin_outside_year() {
	let input_file = format!("{}/roundtrip/basic_in.txt", DATA);
	let dir = tempfile::tempdir().unwrap();
	let export = dir.path().join("EXTF_out.csv");

	let output = run(&[
		input_file.as_str(),
		"--year",
		"2024",
		"--begin",
		"2023-12-01",
		"--account_dictionary",
		ACCOUNTS,
		"--out",
		export.to_str().unwrap(),
	]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr)
		.contains("2023-12-01 is outside of booking year 2024"));
}
