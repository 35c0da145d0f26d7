use std::fs;
use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

use serial_test::serial;
use testkit::{LogLine, render_csv};

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_logdigest")
}

fn logdigest(root: &Path) -> Command {
    let mut cmd = Command::new(bin());
    cmd.env_clear()
        .env("LOGDIGEST_CONFIG", root.join("absent-config.toml"))
        .env("LOGDIGEST_STORAGE_CONNECTION", format!("file://{}", root.display()))
        .env("LOGDIGEST_CONTAINER", "applogs");
    cmd
}

fn seed(root: &Path, name: &str, body: &[u8]) {
    let path = root.join("applogs").join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().unwrap()
}

#[test]
#[serial]
fn run_writes_artifacts_to_local_container() {
    let temp = tempfile::tempdir().unwrap();
    seed(
        temp.path(),
        "2026-02-01_export.csv",
        &render_csv(&testkit::api_scenario()),
    );
    seed(
        temp.path(),
        "2026-02-02_export.csv",
        &render_csv(&[LogLine::error("api", 1, "not today")]),
    );

    let out = run(logdigest(temp.path()).args(["run", "--date", "2026-02-01"]));
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("-- 3 artifacts written --"));

    let output_dir = temp.path().join("applogs/output");
    let hourly = fs::read_to_string(output_dir.join("2026-02-01_api_summary.csv")).unwrap();
    assert!(hourly.contains("\n3,2,0\n"));
    assert!(hourly.contains("\n10,0,1\n"));
    let errors = fs::read_to_string(output_dir.join("2026-02-01_api_errors.csv")).unwrap();
    assert_eq!(errors, "Message,Count\n\"upstream refused connection\",1\n");
    assert!(!output_dir.join("2026-02-02_api_errors.csv").exists());
}

#[test]
#[serial]
fn run_json_reports_summary() {
    let temp = tempfile::tempdir().unwrap();
    seed(
        temp.path(),
        "logs/2026-02-01_a.csv",
        &render_csv(&[LogLine::warning("web", 8, "cache miss")]),
    );

    let out = run(logdigest(temp.path()).args([
        "run",
        "--date",
        "2026-02-01",
        "--input-prefix",
        "logs/",
        "--output-prefix",
        "digests/",
        "--json",
    ]));
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["status"], "completed");
    assert_eq!(report["files_read"][0], "logs/2026-02-01_a.csv");
    assert_eq!(report["artifacts"][1], "digests/2026-02-01_web_warnings.csv");
}

#[test]
#[serial]
fn run_without_input_exits_two() {
    let temp = tempfile::tempdir().unwrap();
    let out = run(logdigest(temp.path()).args(["run", "--date", "2026-02-01"]));
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stdout).contains("no logs found for 2026-02-01"));
    assert!(!temp.path().join("applogs/output").exists());
}

#[test]
#[serial]
fn run_with_malformed_file_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    seed(
        temp.path(),
        "2026-02-01_a.csv",
        &render_csv(&testkit::api_scenario()),
    );
    seed(temp.path(), "2026-02-01_b.csv", b"severityLevel,message\n2,x\n");

    let out = run(logdigest(temp.path()).args(["run", "--date", "2026-02-01"]));
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing column"));
    assert!(!temp.path().join("applogs/output").exists());

    let out = run(logdigest(temp.path()).args(["run", "--date", "2026-02-01", "--skip-malformed"]));
    assert!(out.status.success());
    assert!(
        temp.path()
            .join("applogs/output/2026-02-01_api_summary.csv")
            .exists()
    );
}

#[test]
#[serial]
fn missing_connection_fails_before_storage() {
    let temp = tempfile::tempdir().unwrap();
    let out = run(logdigest(temp.path())
        .env_remove("LOGDIGEST_STORAGE_CONNECTION")
        .args(["run", "--date", "2026-02-01"]));
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("LOGDIGEST_STORAGE_CONNECTION"));
    assert!(!temp.path().join("applogs").exists());
}

#[test]
#[serial]
fn config_file_supplies_settings() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "storage_connection = \"file://{}\"\ncontainer = \"fromfile\"\noutput_prefix = \"r/\"\n",
            temp.path().display()
        ),
    )
    .unwrap();
    fs::create_dir_all(temp.path().join("fromfile")).unwrap();
    fs::write(
        temp.path().join("fromfile/2026-02-01_a.csv"),
        render_csv(&[LogLine::error("api", 0, "boom")]),
    )
    .unwrap();

    let out = run(Command::new(bin())
        .env_clear()
        .env("LOGDIGEST_CONFIG", &config_path)
        .args(["run", "--date", "2026-02-01"]));
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(temp.path().join("fromfile/r/2026-02-01_api_errors.csv").exists());
}

fn spawn_serve(root: &Path, port: u16) -> Child {
    logdigest(root)
        .args(["serve", "--http-addr", &format!("127.0.0.1:{port}")])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

async fn wait_http_ready(port: u16, child: &mut Child) {
    let client = reqwest::Client::new();
    let mut ready = false;
    for _ in 0..100 {
        assert!(child.try_wait().unwrap().is_none(), "logdigest exited early");
        if client
            .get(format!("http://127.0.0.1:{port}/healthz"))
            .send()
            .await
            .is_ok()
        {
            ready = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(ready, "trigger endpoint not ready");
}

#[tokio::test]
#[serial]
async fn serve_trigger_maps_outcomes_to_status() {
    let temp = tempfile::tempdir().unwrap();
    seed(
        temp.path(),
        "2026-02-01_export.csv",
        &render_csv(&testkit::api_scenario()),
    );
    let port = free_port();
    let mut child = spawn_serve(temp.path(), port);
    wait_http_ready(port, &mut child).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{port}/api/summarize?date=2026-02-01"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert!(resp.text().await.unwrap().contains("3 artifacts written"));
    assert!(
        temp.path()
            .join("applogs/output/2026-02-01_api_warnings.csv")
            .exists()
    );

    let resp = client
        .get(format!("http://127.0.0.1:{port}/api/summarize?date=2026-03-01"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    assert_eq!(
        resp.text().await.unwrap(),
        "No logs found for the requested day"
    );

    let resp = client
        .get(format!("http://127.0.0.1:{port}/api/summarize?date=yesterday"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 500);
    assert_eq!(resp.text().await.unwrap(), "Log summary failed");

    let _ = child.kill();
    let _ = child.wait();
}
