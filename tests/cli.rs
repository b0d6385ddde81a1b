use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TWO_THREADS: &str = "0 0 10 100 0 1 2 3 4 5 6 7 8 9 10\n\
                           1 0 20 200 0 1 2 3 4 5 6 7 8 9 10\n";

const HEADER: &str = "#Second Xput avg_generic p50_insert p99_insert p50_generic p99_generic \
                      avg_init p50_init p99_init avg_commit p50_commit p99_commit avg_update \
                      p50_update p99_update p50_generic_b p50_generic_c p50_generic_total \
                      p99_generic_b p99_generic_c p99_generic_total\n";

/// Command running inside `dir`, so no stray config file is picked up.
fn xput_process(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("xput-process").unwrap();
    cmd.current_dir(dir).env_remove("XPUT_PROCESS_FORMAT");
    cmd
}

fn run_ok(dir: &Path, input: &str, ticks: &str, extra: &[&str]) -> String {
    fs::write(dir.join("xput.data"), input).unwrap();
    xput_process(dir)
        .args(["xput.data", "output.data", ticks])
        .args(extra)
        .assert()
        .success();
    fs::read_to_string(dir.join("output.data")).unwrap()
}

#[test]
fn test_two_thread_scenario() {
    let dir = TempDir::new().unwrap();
    let output = run_ok(dir.path(), TWO_THREADS, "1000000", &["-q"]);

    let expected = format!(
        "{}0 30.0 10.0 1.0 2.0 3.0 4.0 5.0 6.0 7.0 8.0 9.0 10.0 0 0 0 0 0 0 0 0 0\n",
        HEADER
    );
    assert_eq!(output, expected);
}

#[test]
fn test_ticks_are_converted_to_microseconds() {
    let dir = TempDir::new().unwrap();
    // 2000 ticks per microsecond
    let output = run_ok(
        dir.path(),
        "0 1 4 8000 0 2000 4000 0 0 0 0 0 0 0 0\n",
        "2000000000",
        &["-q"],
    );

    let row = output.lines().nth(1).unwrap();
    assert!(row.starts_with("1 4.0 1.0 1.0 2.0 0.0 "), "row: {}", row);
}

#[test]
fn test_output_is_identical_across_runs() {
    let dir = TempDir::new().unwrap();
    let input = "0 0 7 31 0 1 2 3 4 5 6 7 8 9 10 1 2 3\n\
                 1 0 3 17 0 1 2 3 4 5 6 7 8 9 10 1 2 3 4 5 6 7 8 9\n\
                 2 1 0 0 0 1 2 3 4 5 6 7 8 9 10\n";

    let first = run_ok(dir.path(), input, "2200000000", &["-q"]);
    let second = run_ok(dir.path(), input, "2200000000", &["-q"]);
    assert_eq!(first, second);
}

#[test]
fn test_rows_ascend_regardless_of_input_order() {
    let dir = TempDir::new().unwrap();
    let input = "0 12 1 0 0 0 0 0 0 0 0 0 0 0 0\n\
                 0 3 1 0 0 0 0 0 0 0 0 0 0 0 0\n\
                 1 12 1 0 0 0 0 0 0 0 0 0 0 0 0\n\
                 0 100 1 0 0 0 0 0 0 0 0 0 0 0 0\n\
                 1 3 1 0 0 0 0 0 0 0 0 0 0 0 0\n";
    let output = run_ok(dir.path(), input, "1000000", &["-q"]);

    let seconds: Vec<&str> = output
        .lines()
        .skip(1)
        .map(|l| l.split(' ').next().unwrap())
        .collect();
    assert_eq!(seconds, vec!["3", "12", "100"]);
}

#[test]
fn test_zero_throughput_row() {
    let dir = TempDir::new().unwrap();
    let output = run_ok(
        dir.path(),
        "0 0 0 500 0 0 0 0 0 0 0 0 0 0 0\n",
        "1000000",
        &["-q"],
    );
    let row = output.lines().nth(1).unwrap();
    assert!(row.starts_with("0 0.0 0 "), "row: {}", row);
}

#[test]
fn test_wrong_argument_count() {
    let dir = TempDir::new().unwrap();
    xput_process(dir.path())
        .args(["xput.data", "output.data"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"));

    assert!(!dir.path().join("output.data").exists());
}

#[test]
fn test_non_numeric_ticks() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("xput.data"), TWO_THREADS).unwrap();

    xput_process(dir.path())
        .args(["xput.data", "output.data", "fast"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("An error occurred."))
        .stderr(predicate::str::contains("Invalid ticks per second"));

    assert!(!dir.path().join("output.data").exists());
}

#[test]
fn test_short_line_leaves_output_untouched() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("xput.data"),
        "0 0 10 100 0 1 2 3 4 5 6 7 8 9 10\n0 1 10 100\n",
    )
    .unwrap();
    fs::write(dir.path().join("output.data"), "previous run\n").unwrap();

    xput_process(dir.path())
        .args(["xput.data", "output.data", "1000000"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("An error occurred."))
        .stderr(predicate::str::contains("line 2"));

    assert_eq!(
        fs::read_to_string(dir.path().join("output.data")).unwrap(),
        "previous run\n"
    );
}

#[test]
fn test_incomplete_optional_group_leaves_output_untouched() {
    let base = "0 0 10 100 0 1 2 3 4 5 6 7 8 9 10";
    for (extra, group) in [(" 11 12", "update"), (" 11 12 13 14 15", "generic phase")] {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("xput.data"), format!("{}{}\n", base, extra)).unwrap();
        fs::write(dir.path().join("output.data"), "previous run\n").unwrap();

        xput_process(dir.path())
            .args(["xput.data", "output.data", "1000000"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("An error occurred."))
            .stderr(predicate::str::contains(format!("incomplete {} group", group)));

        assert_eq!(
            fs::read_to_string(dir.path().join("output.data")).unwrap(),
            "previous run\n"
        );
    }
}

#[test]
fn test_negative_thread_ids_only() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("xput.data"),
        "-1 0 10 100 0 1 2 3 4 5 6 7 8 9 10\n",
    )
    .unwrap();

    xput_process(dir.path())
        .args(["xput.data", "output.data", "1000000"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("0 threads"));

    assert!(!dir.path().join("output.data").exists());
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    xput_process(dir.path())
        .args(["missing.data", "output.data", "1000000"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to open input file"));
}

#[test]
fn test_json_format() {
    let dir = TempDir::new().unwrap();
    let output = run_ok(dir.path(), TWO_THREADS, "1000000", &["-q", "--format", "json"]);

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["metadata"]["thread_count"], 2);
    assert_eq!(value["metadata"]["records_read"], 2);
    assert_eq!(value["rows"][0]["xput"], 30.0);
    assert_eq!(value["rows"][0]["avg_latency"], 10.0);
    assert!(value["rows"][0]["generic_phases"].is_null());
}

#[test]
fn test_config_file_enables_debt_column() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".xput-process.toml"),
        "[report]\ninclude_debt = true\n",
    )
    .unwrap();

    let output = run_ok(
        dir.path(),
        "0 0 10 100 4 1 2 3 4 5 6 7 8 9 10\n",
        "1000000",
        &["-q"],
    );
    let mut lines = output.lines();
    assert!(lines.next().unwrap().ends_with(" debt"));
    assert!(lines.next().unwrap().ends_with(" 4.0"));
}

#[test]
fn test_summary_on_stdout() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("xput.data"), TWO_THREADS).unwrap();

    xput_process(dir.path())
        .args(["xput.data", "output.data", "1000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 records from 2 threads over 1 seconds"));
}

#[test]
fn test_init_config() {
    let dir = TempDir::new().unwrap();
    xput_process(dir.path())
        .arg("--init-config")
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join(".xput-process.toml")).unwrap();
    assert!(content.contains("[report]"));

    xput_process(dir.path())
        .arg("--init-config")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_init_config_with_positionals_is_usage_error() {
    let dir = TempDir::new().unwrap();
    xput_process(dir.path())
        .args(["xput.data", "output.data", "1000000", "--init-config"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot be used with"));

    assert!(!dir.path().join(".xput-process.toml").exists());
}

#[test]
fn test_help_exits_successfully() {
    let dir = TempDir::new().unwrap();
    xput_process(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TICKS_PER_SEC"));
}
