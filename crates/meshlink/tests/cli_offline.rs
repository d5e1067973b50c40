#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn meshlink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_meshlink"))
        .args(args)
        .output()
        .expect("meshlink should run")
}

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/meshlink-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

#[test]
fn encode_output_decodes_back() {
    let encoded = meshlink(&[
        "--format", "pretty", "encode", "--id", "0x4242", "text", "hello", "--to", "!a1b2c3d4",
    ]);
    assert!(encoded.status.success());
    let hex = String::from_utf8(encoded.stdout).expect("stdout should be utf-8");

    let decoded = meshlink(&["--format", "json", "decode", hex.trim(), "--direction", "to-radio"]);
    assert!(decoded.status.success());
    let stdout = String::from_utf8(decoded.stdout).expect("stdout should be utf-8");
    let row: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("decode should print one json row");

    assert_eq!(row["kind"], "packet");
    let detail = row["detail"].as_str().expect("detail should be a string");
    assert!(detail.contains("to=!a1b2c3d4"), "unexpected detail: {detail}");
    assert!(detail.contains("id=0x00004242"), "unexpected detail: {detail}");
    assert!(detail.contains("text=\"hello\""), "unexpected detail: {detail}");
}

#[test]
fn decode_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_meshlink"))
        .args(["--format", "json", "decode"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("meshlink should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"94 c3 00 02\n40 01\n")
        .expect("stdin should accept input");
    let output = child.wait_with_output().expect("meshlink should exit");

    assert!(output.status.success());
    let row: serde_json::Value = serde_json::from_slice(&output.stdout)
        .expect("decode should print one json row");
    assert_eq!(row["kind"], "rebooted");
    assert_eq!(row["frame"], 0);
}

#[test]
fn decode_without_frames_is_data_error() {
    let output = meshlink(&["decode", "c3c3c3c3"]);
    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no frames found"), "unexpected stderr: {stderr}");
}

#[test]
fn missing_device_fails_fast() {
    let dir = unique_temp_dir("missing-device");
    let output = meshlink(&[
        "send",
        dir.join("ttyNOPE").to_str().expect("path should be utf-8"),
        "--message",
        "hi",
        "--ready-timeout",
        "1s",
    ]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn invalid_config_is_usage_error() {
    let dir = unique_temp_dir("bad-config");
    let config = dir.join("radio.json");
    std::fs::write(&config, r#"{ "ack_timeout_ms": "soon" }"#).expect("config should be writable");

    let output = meshlink(&[
        "listen",
        "/dev/null",
        "--config",
        config.to_str().expect("path should be utf-8"),
    ]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"), "unexpected stderr: {stderr}");
}
