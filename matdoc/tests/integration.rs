use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_matdoc")));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn read(path: std::path::PathBuf) -> String {
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

// -- stdin mode --

#[test]
fn stdin_mode_renders_markdown() {
    let input = read(fixture_path("area.m").into());

    let assert = cmd().args(["--name", "area"]).write_stdin(input).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(output.starts_with("# area\n"));
    assert!(output.contains("```matlab\nfunction a = area(r)\n```\n"));
    assert!(output.contains("* **r** (`double`, `{mustBeNonnegative}`): Radius"));
    assert!(!output.contains("square"), "local function shown by default:\n{output}");
}

#[test]
fn stdin_mode_private_members_shows_local_functions() {
    let input = read(fixture_path("area.m").into());

    cmd()
        .args(["--name", "area", "--private-members"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("## square\n\n> `local`"));
}

#[test]
fn stdin_mode_structure_error_fails() {
    let input = read(fixture_path("broken.m").into());

    cmd()
        .args(["--name", "broken"])
        .write_stdin(input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unterminated `properties` block opened at line 2"));
}

#[test]
fn stdin_mode_json() {
    let input = read(fixture_path("area.m").into());

    let assert = cmd()
        .args(["--name", "area", "-f", "json"])
        .write_stdin(input)
        .assert()
        .success();
    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(value["name"], "area");
    assert_eq!(value["items"][0]["signature"]["inputs"][0]["type_name"], "double");
}

#[test]
fn stdin_mode_doc_before_header() {
    let input = "% INC Add one.\nfunction y = inc(x)\ny = x + 1;\nend\n";

    cmd()
        .args(["--name", "inc", "--doc-before-header"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("```\n\nINC Add one.\n"));
}

// -- file mode --

#[test]
fn file_mode_creates_output() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("Account.m"))
        .assert()
        .success();

    let output = read(dir.path().join("Account.md"));
    assert!(output.contains("## Account\n\n> `sealed`\n\n```matlab\nclassdef Account < handle\n```\n"));
    assert!(output.contains("* **Balance** (`(1,1) double`, default `0`): Current balance in cents"));
    assert!(output.contains("* **Owner** (`string`): Account holder as printed on statements"));
    assert!(output.contains("* **Overdrawn**: Raised when the balance drops below zero"));
    assert!(output.contains("### Account.Account\n\n> `constructor`"));
    assert!(output.contains("* **amount** (`(1,1) double`, `{mustBePositive, mustBeInteger}`): Amount in cents."));
    assert!(output.contains("* **opts.Memo** (`string`, default `\"\"`): Free-text memo."));
    assert!(output.contains("### Account.fromStruct\n\n> `static`"));
    assert!(!output.contains("audit"));
    assert!(!output.contains("Ledger"));
}

#[test]
fn file_mode_reports_warnings_on_stderr() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("Account.m"))
        .assert()
        .success()
        .stderr(predicate::str::contains("parameter `opts.Date` is not documented"));
}

#[test]
fn file_mode_member_flags() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .args(["--private-members", "--undoc-members"])
        .arg(fixture_path("Account.m"))
        .assert()
        .success();

    let output = read(dir.path().join("Account.md"));
    assert!(output.contains("### Account.audit\n\n> `private`"));
    assert!(output.contains("* **Ledger** (`cell`, default `{}`, private)"));
}

#[test]
fn file_mode_directory_with_packages() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path(""))
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping broken"));

    assert!(dir.path().join("Account.md").exists());
    assert!(dir.path().join("area.md").exists());
    assert!(!dir.path().join("broken.md").exists());

    let transfer = read(dir.path().join("bank.transfer.md"));
    assert!(transfer.starts_with("# bank.transfer\n"));
    assert!(transfer.contains("* **from** (`Account`): Account to debit."));
    assert!(transfer.contains("### Returns\n\n* **ok**: True when the withdrawal succeeded."));
}

#[test]
fn file_mode_json() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "-f", "json"])
        .arg(fixture_path("+bank/transfer.m"))
        .assert()
        .success();

    let value: serde_json::Value = serde_json::from_str(&read(dir.path().join("bank.transfer.json"))).unwrap();
    assert_eq!(value["items"][0]["kind"], "function");
    assert_eq!(value["items"][0]["signature"]["outputs"][0]["name"], "ok");
}

#[test]
fn file_mode_duplicate_module_names_are_skipped() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    for (dir, summary) in [("a", "From a."), ("b", "From b.")] {
        std::fs::create_dir(src.path().join(dir)).unwrap();
        std::fs::write(
            src.path().join(dir).join("util.m"),
            format!("function util()\n% UTIL {summary}\nend\n"),
        )
        .unwrap();
    }

    cmd()
        .args(["-o", out.path().to_str().unwrap()])
        .arg(src.path().join("a/util.m"))
        .arg(src.path().join("b/util.m"))
        .assert()
        .success()
        .stderr(predicate::str::contains("module `util` already comes from"));

    let output = read(out.path().join("util.md"));
    assert!(output.contains("UTIL From a."));
    assert!(!output.contains("UTIL From b."));
}

#[test]
fn file_mode_requires_output() {
    cmd()
        .arg(fixture_path("Account.m"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn unknown_format_is_rejected() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "-f", "html"])
        .arg(fixture_path("Account.m"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: html"));
}
