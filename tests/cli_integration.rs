use std::process::Command;
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_jimdecomp").to_string()
}

const PAYLOAD_OFFSET: usize = 0x208;

fn map_jim(payload: &[u8]) -> Vec<u8> {
    let mut file = vec![0u8; PAYLOAD_OFFSET];
    file.extend_from_slice(payload);
    file
}

#[test]
fn cli_decode_map_jim_layout() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("level.map.jim");
    let output = dir.path().join("level.raw");
    std::fs::write(&input, map_jim(&[0x31, 0x66, 0x00, 0x65, 0xFF])).unwrap();

    let st = Command::new(bin())
        .args(["decode", "--layout", "map-jim"])
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(
        std::fs::read(&output).unwrap(),
        vec![0x66, 0x66, 0x66, 0x66, 0x65]
    );
}

#[test]
fn cli_decode_hex_offset_and_analyze() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("level.map.jim");
    let output = dir.path().join("level.raw");
    std::fs::write(&input, map_jim(&[0x80, 0x10, 0x07, 0xFF])).unwrap();

    let out = Command::new(bin())
        .args(["decode", "--offset", "0x208", "--analyze"])
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Output length:          16"));
    assert!(stdout.contains("Distinct byte values:   1"));
    assert_eq!(std::fs::read(&output).unwrap(), vec![7; 16]);
}

#[test]
fn cli_truncated_payload_still_succeeds() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cut.bin");
    let output = dir.path().join("cut.raw");
    std::fs::write(&input, [0x31, 0x66]).unwrap();

    let st = Command::new(bin())
        .args(["decode", "--layout", "raw"])
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&output).unwrap(), vec![0x66; 4]);
}

#[test]
fn cli_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let output = dir.path().join("out.raw");
    std::fs::write(&input, [0x10, 0x01, 0xFF]).unwrap();
    std::fs::write(&output, b"keep").unwrap();

    let st = Command::new(bin())
        .args(["decode", "--layout", "raw"])
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(!st.success());
    assert_eq!(std::fs::read(&output).unwrap(), b"keep");

    let st = Command::new(bin())
        .arg("--force")
        .args(["decode", "--layout", "raw"])
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&output).unwrap(), vec![1, 1]);
}

#[test]
fn cli_no_valid_decoding_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("blank.bin");
    let output = dir.path().join("blank.raw");
    std::fs::write(&input, [0xFF; 64]).unwrap();

    let st = Command::new(bin())
        .arg("decode")
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(!st.success());
    assert!(!output.exists());
}

#[test]
fn cli_missing_input_fails() {
    let dir = tempdir().unwrap();
    let st = Command::new(bin())
        .arg("scan")
        .arg(dir.path().join("missing.map.jim"))
        .status()
        .unwrap();
    assert!(!st.success());
}

#[test]
fn cli_scan_marks_best_offset() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("unknown.jim");
    std::fs::write(&input, [0xFF, 0xFF, 0x31, 0x05, 0xFF]).unwrap();

    let out = Command::new(bin()).arg("scan").arg(&input).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.lines().any(|l| l.starts_with("* 0x0002")));
}

#[test]
fn cli_trace_lists_instructions() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("payload.bin");
    std::fs::write(&input, [0x10, 0x03, 0x00, 0x09, 0xFF]).unwrap();

    let out = Command::new(bin())
        .args(["trace", "--layout", "raw"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("REP2"));
    assert!(stdout.contains("fill 2 x 03"));
    assert!(stdout.contains("literal 1"));
    assert!(stdout.contains("end"));
}

#[test]
fn cli_json_stats() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let output = dir.path().join("out.raw");
    std::fs::write(&input, [0x10, 0x01, 0xFF]).unwrap();

    let out = Command::new(bin())
        .args(["--json", "decode", "--layout", "raw"])
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("\"status\": \"completed\""));
    assert!(stderr.contains("\"output_size\": 2"));
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
}

#[test]
fn cli_completed_empty_payload_succeeds() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("end.bin");
    let output = dir.path().join("end.raw");
    std::fs::write(&input, [0xFF]).unwrap();

    let st = Command::new(bin())
        .args(["decode", "--layout", "raw"])
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert!(std::fs::read(&output).unwrap().is_empty());

    let st = Command::new(bin())
        .args(["trace", "--layout", "raw"])
        .arg(&input)
        .status()
        .unwrap();
    assert!(st.success());
}

#[test]
fn cli_truncated_empty_payload_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("short.bin");
    let output = dir.path().join("short.raw");
    std::fs::write(&input, [0x31]).unwrap();

    let st = Command::new(bin())
        .args(["decode", "--layout", "raw"])
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(!st.success());
    assert!(!output.exists());

    let st = Command::new(bin())
        .args(["trace", "--layout", "raw"])
        .arg(&input)
        .status()
        .unwrap();
    assert!(!st.success());
}
