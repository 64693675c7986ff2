#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::Command;

fn missing_device() -> PathBuf {
    PathBuf::from(format!(
        "/tmp/radiolink-missing-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ))
}

fn radiolink() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_radiolink"));
    cmd.env_remove("RADIOLINK_DEVICE").env_remove("RADIOLINK_BAUD");
    cmd
}

#[test]
fn version_prints_package_version() {
    let output = radiolink().arg("version").output().expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("radiolink {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn extended_version_reports_limits() {
    let output = radiolink()
        .arg("version")
        .arg("--extended")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("max_packet_size: 512"));
    assert!(stdout.contains("max_log_size: 1024"));
    assert!(!stdout.contains("unknown"));
}

#[test]
fn send_to_missing_device_is_transport_error() {
    let output = radiolink()
        .arg("--log-level")
        .arg("error")
        .arg("send")
        .arg(missing_device())
        .arg("--heartbeat")
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("open failed"));
}

#[test]
fn monitor_missing_device_is_transport_error() {
    let output = radiolink()
        .arg("monitor")
        .arg(missing_device())
        .arg("--count")
        .arg("1")
        .output()
        .expect("monitor should run");

    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn device_can_come_from_environment() {
    let output = radiolink()
        .env("RADIOLINK_DEVICE", missing_device())
        .arg("send")
        .arg("--disconnect")
        .output()
        .expect("send should run");

    // Parsed fine, then failed to open the device.
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn invalid_hex_is_usage_error() {
    let output = radiolink()
        .arg("send")
        .arg(missing_device())
        .arg("--hex")
        .arg("xyz")
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn missing_subcommand_fails() {
    let output = radiolink().output().expect("cli should run");
    assert!(!output.status.success());
}
