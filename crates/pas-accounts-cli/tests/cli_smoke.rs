use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PAS_VARS: [&str; 7] = [
    "PAS_CONFIG",
    "PAS_BASE_URI",
    "PAS_SERVER_VERSION",
    "PAS_SESSION_TOKEN",
    "PAS_HTTP_TIMEOUT_SECS",
    "PAS_CA_BUNDLE",
    "PAS_INSECURE_SKIP_TLS",
];

fn cli_cmd(tmp: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pas-accounts");
    cmd.current_dir(tmp.path());
    for var in PAS_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_works() {
    let tmp = TempDir::new().unwrap();
    cli_cmd(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault privileged-account lookups"));
}

#[test]
fn config_show_merges_file_and_flags() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("pas.toml");
    fs::write(
        &path,
        "base_uri = \"https://file.example.com\"\ntoken = \"s3cr3t\"\ntimeout_secs = 12\n",
    )
    .unwrap();

    cli_cmd(&tmp)
        .args(["--config", path.to_str().unwrap()])
        .args(["--server-version", "12.6", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("base_uri = \"https://file.example.com\""))
        .stdout(predicate::str::contains("server_version = \"12.6\""))
        .stdout(predicate::str::contains("timeout_secs = 12"))
        .stdout(predicate::str::contains("<redacted>"))
        .stdout(predicate::str::contains("s3cr3t").not());
}

#[test]
fn timeout_flag_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("pas.toml");
    fs::write(&path, "base_uri = \"https://file.example.com\"\ntimeout_secs = 12\n").unwrap();

    cli_cmd(&tmp)
        .args(["--config", path.to_str().unwrap()])
        .args(["--timeout", "5", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout_secs = 5"));
}

#[test]
fn environment_supplies_base_uri() {
    let tmp = TempDir::new().unwrap();
    cli_cmd(&tmp)
        .env("PAS_BASE_URI", "https://env.example.com")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://env.example.com"));
}

#[test]
fn missing_base_uri_is_reported() {
    let tmp = TempDir::new().unwrap();
    cli_cmd(&tmp)
        .args(["get", "--id", "19_6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PAS_BASE_URI"));
}

#[test]
fn modes_cannot_be_mixed() {
    let tmp = TempDir::new().unwrap();
    cli_cmd(&tmp)
        .args(["--base-uri", "https://pvwa.example.com"])
        .args(["get", "--id", "19_6", "--keywords", "root"])
        .assert()
        .code(2);

    cli_cmd(&tmp)
        .args(["--base-uri", "https://pvwa.example.com"])
        .args(["get", "--safe", "Linux", "--limit", "10"])
        .assert()
        .code(2);
}

#[test]
fn invalid_search_type_is_a_usage_error() {
    let tmp = TempDir::new().unwrap();
    cli_cmd(&tmp)
        .args(["--base-uri", "https://pvwa.example.com"])
        .args(["get", "--search-type", "exact"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("startswith"));
}

#[test]
fn search_type_on_old_server_fails_before_any_request() {
    let tmp = TempDir::new().unwrap();
    cli_cmd(&tmp)
        .args(["--base-uri", "http://127.0.0.1:1", "--server-version", "10.4"])
        .args(["get", "--search", "root", "--search-type", "contains"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("10.5"));
}

#[test]
fn unreachable_vault_is_a_transport_error() {
    let tmp = TempDir::new().unwrap();
    cli_cmd(&tmp)
        .args(["--base-uri", "http://127.0.0.1:1", "--server-version", "12.6"])
        .args(["get", "--id", "19_6", "--timeout", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("account lookup failed"));
}

#[test]
fn insecure_tls_is_warned_about() {
    let tmp = TempDir::new().unwrap();
    cli_cmd(&tmp)
        .args(["--base-uri", "http://127.0.0.1:1", "--server-version", "12.6"])
        .args(["--insecure-skip-tls", "get", "--id", "19_6", "--timeout", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TLS certificate validation disabled"));
}
