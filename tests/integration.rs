use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn onepager_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("onepager");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let sources = root.join("sources");
    fs::create_dir_all(sources.join("regs")).unwrap();
    fs::write(
        sources.join("climb.txt"),
        "Climb gradient requirements for Category A aircraft depend on engine-out performance.",
    )
    .unwrap();
    fs::write(
        sources.join("regs").join("landing.md"),
        "# Landing\n\nRequired landing distance is the demonstrated distance divided by 0.6.",
    )
    .unwrap();
    fs::write(sources.join("photo.jpg"), "not text").unwrap();

    let config_content = format!(
        r#"[sources]
root = "{root}/sources"

[chunking]
chunk_size = 900
overlap = 150

[retrieval]
top_k = 5

[generation]
provider = "disabled"

[export]
out_dir = "{root}/outputs"

[telemetry]
events_path = "{root}/logs/events.jsonl"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("onepager.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_onepager(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    run_onepager_with_stdin(config_path, args, "")
}

fn run_onepager_with_stdin(config_path: &Path, args: &[&str], stdin: &str) -> (String, String, bool) {
    let binary = onepager_binary();
    let mut child = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to run onepager binary at {:?}: {}", binary, e));

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn read_events(root: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(root.join("logs").join("events.jsonl"))
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_ask_offline_drafts_and_exports() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_onepager(&config_path, &["ask", "climb gradient category A"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Loaded 2 chunks"));
    assert!(stdout.contains("Score 3 [climb chunk#0]"));
    assert!(stdout.contains("Key Findings:"));
    assert!(stdout.contains("(Source: climb)"));
    assert!(stdout.contains("Limitations:"));

    let exports: Vec<_> = fs::read_dir(tmp.path().join("outputs"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(exports.len(), 1);
    assert!(exports[0].ends_with("_climb_gradient_category_A.md"));

    let events = read_events(tmp.path());
    let names: Vec<&str> = events.iter().map(|e| e["event"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec![
            "sources_loaded",
            "query_received",
            "retrieval_done",
            "export_saved",
            "response_ready"
        ]
    );
    assert!(events.iter().all(|e| e["run_id"] == events[0]["run_id"]));
}

#[test]
fn test_ask_no_export_flag() {
    let (tmp, config_path) = setup_test_env();

    let (_, _, success) = run_onepager(&config_path, &["ask", "landing distance", "--no-export"]);
    assert!(success);
    assert!(!tmp.path().join("outputs").exists());
}

#[test]
fn test_ask_without_matches_reports_empty_retrieval() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_onepager(&config_path, &["ask", "helicopter autorotation"]);
    assert!(success);
    assert!(stdout.contains("No relevant passages found"));
    assert!(!stdout.contains("ONE-PAGER DRAFT"));

    let events = read_events(tmp.path());
    assert_eq!(events.last().unwrap()["event"], "retrieval_empty");
}

#[test]
fn test_interactive_ask_answers_until_blank_line() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_onepager_with_stdin(
        &config_path,
        &["ask", "--no-export"],
        "landing distance\nzzz\n\nclimb gradient\n",
    );
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("[landing chunk#0]"));
    assert!(stdout.contains("No relevant passages found"));
    // Input after the blank line is never read as a question.
    assert!(!stdout.contains("[climb chunk#0]"));
}

#[test]
fn test_search_prints_ranked_hits() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_onepager(&config_path, &["search", "landing distance"]);
    assert!(success, "search failed: stderr={}", stderr);
    assert!(stdout.contains("Score 2 [landing chunk#0]"));
    assert!(!stdout.contains("climb"));
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_onepager(&config_path, &["search", "a"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_empty_sources_dir_fails() {
    let (tmp, config_path) = setup_test_env();
    let empty = tmp.path().join("empty");
    fs::create_dir_all(&empty).unwrap();

    let (_, stderr, success) = run_onepager(
        &config_path,
        &["--sources", empty.to_str().unwrap(), "ask", "anything"],
    );
    assert!(!success);
    assert!(stderr.contains("no supported files"), "stderr={}", stderr);
}

#[test]
fn test_invalid_chunk_config_fails() {
    let (tmp, _) = setup_test_env();
    let config_path = tmp.path().join("config").join("bad.toml");
    fs::write(&config_path, "[chunking]\nchunk_size = 100\noverlap = 150\n").unwrap();

    let (_, stderr, success) = run_onepager(&config_path, &["search", "climb"]);
    assert!(!success);
    assert!(stderr.contains("overlap"), "stderr={}", stderr);
}

#[test]
fn test_zero_top_k_is_rejected() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_onepager(&config_path, &["ask", "climb gradient", "--top-k", "0"]);
    assert!(!success);
    assert!(stderr.contains("must be at least 1"), "stderr={}", stderr);
    assert!(!stdout.contains("No relevant passages found"));

    let (_, _, success) = run_onepager(&config_path, &["search", "climb", "--top-k", "0"]);
    assert!(!success);
}

#[test]
fn test_eval_offline_summary() {
    let (tmp, config_path) = setup_test_env();
    let cases = tmp.path().join("cases.jsonl");
    fs::write(
        &cases,
        "{\"query\": \"climb gradient\"}\n{\"query\": \"helicopter autorotation\"}\n",
    )
    .unwrap();

    let (stdout, stderr, success) =
        run_onepager(&config_path, &["eval", cases.to_str().unwrap(), "--offline"]);
    assert!(success, "eval failed: stderr={}", stderr);
    assert!(stdout.contains("\"has_citation\":true"));
    assert!(stdout.contains("=== SUMMARY ==="));
    assert!(stdout.contains("Mode: extractive"));
    assert!(stdout.contains("Citation rate: 50.0 %"));
}
