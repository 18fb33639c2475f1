use std::process::Command;

#[test]
fn scripted_session_prints_a_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_lawn-defence"))
        .args([
            "--ticks",
            "400",
            "--seed",
            "17",
            "--click",
            "400,300@0",
            "--click",
            "10,130@1",
            "--click",
            "10,130@2",
        ])
        .output()
        .expect("failed to run the lawn-defence binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Welcome to Lawn Defence."));
    assert!(stdout.contains("ticks simulated: 400"));
    assert!(stdout.contains("phase: Playing"));
    assert!(stdout.contains("planted 0 (rejected 2)"));
}

#[test]
fn missing_rules_file_is_reported() {
    let output = Command::new(env!("CARGO_BIN_EXE_lawn-defence"))
        .args(["--ticks", "1", "--rules", "no/such/rules.ron"])
        .output()
        .expect("failed to run the lawn-defence binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no/such/rules.ron"));
}
