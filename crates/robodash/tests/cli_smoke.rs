use std::net::TcpListener;
use std::process::Command;

fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral loopback port");
    let addr = listener.local_addr().expect("read local addr");
    drop(listener);
    format!("http://{addr}")
}

#[test]
fn status_against_unreachable_robot_fails_cleanly() {
    let endpoint = unreachable_endpoint();
    let output = Command::new(env!("CARGO_BIN_EXE_robodash"))
        .args(["status", "--base-url", &endpoint])
        .env_remove("ROBODASH_URL")
        .output()
        .expect("run robodash status");

    assert_eq!(output.status.code(), Some(11), "network failures exit with 11");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error:"),
        "expected formatted error, stderr was: {stderr}"
    );
    assert!(stderr.contains(&endpoint), "stderr was: {stderr}");
}

#[test]
fn invalid_base_url_is_a_config_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_robodash"))
        .args(["stop", "--base-url", "ftp://robot"])
        .env_remove("ROBODASH_URL")
        .output()
        .expect("run robodash stop");

    assert_eq!(output.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "stderr was: {stderr}");
}
