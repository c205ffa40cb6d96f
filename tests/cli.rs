use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// The binary with HOME pointed at a scratch directory, so the user's
/// settings.json stays out of the picture. Keep the directory alive while
/// the command runs.
fn fontsieve() -> (Command, TempDir) {
    let home = tempfile::tempdir().expect("tempdir");
    let mut cmd = Command::new(assert_cmd::cargo_bin!("fontsieve"));
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG");
    (cmd, home)
}

#[test]
fn cli_rejects_wrong_argument_count() {
    let (mut cmd, _home) = fontsieve();
    let output = cmd.arg("content").output().expect("run fontsieve");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");

    let (mut cmd, _home) = fontsieve();
    let output = cmd
        .args(["a", "b", "c"])
        .output()
        .expect("run fontsieve");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn cli_rejects_unknown_flag() {
    let (mut cmd, _home) = fontsieve();
    cmd.args(["--no-such-flag", "a", "b"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn cli_help_and_version_exit_zero() {
    let (mut cmd, _home) = fontsieve();
    cmd.arg("--help").assert().success();
    let (mut cmd, _home) = fontsieve();
    cmd.arg("--version").assert().success();
}

#[test]
fn cli_missing_content_dir_is_fatal() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let missing = tmp.path().join("no-such-content");
    let out = tmp.path().join("out");

    let (mut cmd, _home) = fontsieve();
    let output = cmd
        .arg(&missing)
        .arg(&out)
        .output()
        .expect("run fontsieve");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("content directory not found"), "stderr: {stderr}");
    assert!(!out.exists());
}

#[test]
fn cli_print_plan_emits_builtin_plan() {
    let (mut cmd, _home) = fontsieve();
    let output = cmd.arg("--print-plan").output().expect("run fontsieve");
    assert!(output.status.success());

    let plan: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("plan is JSON");
    assert!(plan["families"].as_array().is_some_and(|f| !f.is_empty()));
}

#[test]
fn cli_font_dir_overrides_plan() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let fonts = tmp.path().join("fonts");
    fs::create_dir_all(&fonts).expect("mkdir");

    let (mut cmd, _home) = fontsieve();
    let output = cmd
        .arg("--print-plan")
        .arg("--font-dir")
        .arg(&fonts)
        .output()
        .expect("run fontsieve");
    assert!(output.status.success());

    let plan: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("plan is JSON");
    assert_eq!(plan["font_dir"], fonts.to_string_lossy().as_ref());
}

#[cfg(target_os = "linux")]
#[test]
fn cli_new_config_writes_into_home() {
    let (mut cmd, home) = fontsieve();
    cmd.arg("--new-config").assert().success();

    let config_dir = home.path().join(".config").join("fontsieve");
    assert!(config_dir.join("settings.json").is_file());
    assert!(config_dir.join("plan.json").is_file());
    assert!(config_dir.join("logs").is_dir());
}
