use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn cmd(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("customer-ledger").unwrap();
    cmd.arg("--log-file").arg(tmp.path().join("ledger.log"));
    cmd
}

#[test]
fn add_list_quit() {
    let tmp = TempDir::new().unwrap();
    cmd(&tmp)
        .write_stdin("1\nAnna Rossi\n3\n6\n")
        .assert()
        .success()
        .stdout(contains("1) Anna Rossi"))
        .stdout(contains("Bye!"));

    let log = fs::read_to_string(tmp.path().join("ledger.log")).unwrap();
    assert!(log.contains("customer_added"));
}

#[test]
fn end_of_input_exits_cleanly() {
    let tmp = TempDir::new().unwrap();
    cmd(&tmp)
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(contains("End of input detected."));
}

#[test]
fn load_flag_merges_before_menu() {
    let tmp = TempDir::new().unwrap();
    let snapshot = tmp.path().join("crm.json");
    fs::write(
        &snapshot,
        r#"{"customers": [{"name": "Luca", "surname": "Verdi",
            "contracts": [{"name": "Home", "money": 250.0, "date": "2021:06:01"}]}]}"#,
    )
    .unwrap();

    cmd(&tmp)
        .arg("--load")
        .arg(&snapshot)
        .write_stdin("3\n6\n")
        .assert()
        .success()
        .stdout(contains("1 added"))
        .stdout(contains("1) Luca Verdi"));
}

#[test]
fn bad_config_fails() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.json");
    fs::write(&config, r#"{"cancel_token": "two words"}"#).unwrap();

    cmd(&tmp)
        .arg("--config")
        .arg(&config)
        .write_stdin("6\n")
        .assert()
        .failure();
}
