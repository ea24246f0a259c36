//! End-to-end smoke tests over the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with all lookup paths pointed into a throwaway home.
fn paka(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("paka").expect("binary");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("XDG_DATA_HOME", home.path().join(".local/share"));
    cmd
}

#[test]
fn help_lists_the_core_commands() {
    let home = TempDir::new().unwrap();
    paka(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("reconcile"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn no_subcommand_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    paka(&home).assert().failure();
}

#[test]
fn unknown_manager_is_reported() {
    let home = TempDir::new().unwrap();
    paka(&home)
        .args(["install", "ripgrep", "--manager", "mystery", "-y"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mystery"));
}

#[test]
fn history_starts_empty() {
    let home = TempDir::new().unwrap();
    paka(&home)
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no installations recorded"));
}

#[test]
fn plugin_list_starts_empty() {
    let home = TempDir::new().unwrap();
    paka(&home)
        .args(["config", "plugins", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no plugins installed"));
}

#[test]
fn plugins_are_discovered_and_toggled() {
    let home = TempDir::new().unwrap();
    let plugin_dir = home.path().join(".config/paka/plugins/notify");
    std::fs::create_dir_all(&plugin_dir).unwrap();
    std::fs::write(
        plugin_dir.join("plugin.conf"),
        "description=Desktop notifications\n\n[post-install-success]\naction=notify:Installed $packages\n",
    )
    .unwrap();

    paka(&home)
        .args(["config", "plugins", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("notify"))
        .stdout(predicate::str::contains("enabled"))
        .stdout(predicate::str::contains("post-install-success"));

    paka(&home)
        .args(["config", "plugins", "disable", "notify"])
        .assert()
        .success();

    paka(&home)
        .args(["config", "plugins", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("disabled"));
}

#[test]
fn history_show_out_of_range_fails() {
    let home = TempDir::new().unwrap();
    paka(&home)
        .args(["history", "show", "7"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("index"));
}
