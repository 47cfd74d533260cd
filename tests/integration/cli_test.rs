use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_matsynth"))
}

/// Write `contents` to a file in the temp directory unique to this process
fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("matsynth_{}_{}", std::process::id(), name));
    fs::write(&path, contents).expect("Failed to write temp file");
    path
}

#[test]
fn test_synth_sum() {
    let examples = write_temp(
        "sum.json",
        r#"[
            {"inputs": [[[1, 2], [3, 4]], [[5, 6], [7, 8]]], "output": [[6, 8], [10, 12]]},
            {"inputs": [[[0, 1], [1, 0]], [[2, 0], [0, 2]]], "output": [[2, 1], [1, 2]]}
        ]"#,
    );

    let output = Command::new(get_binary_path())
        .arg("synth")
        .arg(&examples)
        .arg("--no-constants")
        .output()
        .expect("Failed to execute matsynth");
    let _ = fs::remove_file(&examples);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "Command failed with stderr: {}",
        stderr
    );
    assert_eq!(stdout.trim(), "var0.add(var1)");
}

#[test]
fn test_synth_failure_exit_code() {
    let examples = write_temp(
        "unreachable.json",
        r#"[{"inputs": [[[1, 2], [3, 4]]], "output": [[1, 2, 3]]}]"#,
    );

    let output = Command::new(get_binary_path())
        .arg("synth")
        .arg(&examples)
        .arg("--no-constants")
        .arg("--max-depth")
        .arg("1")
        .output()
        .expect("Failed to execute matsynth");
    let _ = fs::remove_file(&examples);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("cannot synthesize"),
        "Unexpected stderr: {}",
        stderr
    );
}

#[test]
fn test_synth_rejects_ragged_examples() {
    let examples = write_temp(
        "ragged.json",
        r#"[
            {"inputs": [[[1, 2], [3, 4]]], "output": [[1]]},
            {"inputs": [[[1, 2], [3, 4]], [[1]]], "output": [[1]]}
        ]"#,
    );

    let output = Command::new(get_binary_path())
        .arg("synth")
        .arg(&examples)
        .output()
        .expect("Failed to execute matsynth");
    let _ = fs::remove_file(&examples);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid examples"), "Unexpected stderr: {}", stderr);
}

#[test]
fn test_enumerate_count() {
    let output = Command::new(get_binary_path())
        .args(["enumerate", "--depth", "1", "--vars", "2"])
        .output()
        .expect("Failed to execute matsynth");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "14");
}

#[test]
fn test_enumerate_list() {
    let output = Command::new(get_binary_path())
        .args(["enumerate", "--depth", "1", "--vars", "1", "--list"])
        .output()
        .expect("Failed to execute matsynth");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.first(), Some(&"var0"));
    assert!(lines.contains(&"var0.transpose()"));
    assert!(lines.contains(&"var0.multiply(var0)"));
}

#[test]
fn test_eval_program() {
    let bindings = write_temp("bindings.json", "[[[1, 2], [3, 4]], [[5, 6], [7, 8]]]");

    let output = Command::new(get_binary_path())
        .arg("eval")
        .arg("var0.add(var1)")
        .arg(&bindings)
        .output()
        .expect("Failed to execute matsynth");
    let _ = fs::remove_file(&bindings);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "[[6.0,8.0],[10.0,12.0]]"
    );
}

#[test]
fn test_eval_parse_error() {
    let bindings = write_temp("bindings_err.json", "[[[1]]]");

    let output = Command::new(get_binary_path())
        .arg("eval")
        .arg("var0.frobnicate()")
        .arg(&bindings)
        .output()
        .expect("Failed to execute matsynth");
    let _ = fs::remove_file(&bindings);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown operation"), "Unexpected stderr: {}", stderr);
}
