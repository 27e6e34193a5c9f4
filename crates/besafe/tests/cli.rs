//! Exit status of the `besafe` binary.

use std::path::Path;
use std::process::{Command, Output};

fn besafe(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_besafe"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn write_config(dir: &Path, name: &str, recipients: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(
        &path,
        format!(
            "[contacts]\nrecipients = {recipients}\n\n[media]\ndirectory = {:?}\n",
            dir.join("media")
        ),
    )
    .unwrap();
    path
}

#[test]
fn config_validate_accepts_good_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_config(dir.path(), "good.toml", r#"["+15551234567"]"#);

    let output = besafe(&good, &["config", "validate", "--file", good.to_str().unwrap()]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration is valid."));
}

#[test]
fn config_validate_fails_on_bad_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_config(dir.path(), "good.toml", r#"["+15551234567"]"#);
    let bad = write_config(dir.path(), "bad.toml", "[]");

    let output = besafe(&good, &["config", "validate", "--file", bad.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("at least one"));
}

#[test]
fn config_file_sections_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "config.toml", r#"["+15551234567"]"#);

    let output = besafe(&config, &["status", "--json"]);

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["recipients"], 1);
    assert_eq!(
        summary["media_dir"],
        dir.path().join("media").to_str().unwrap()
    );
}
