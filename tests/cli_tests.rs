mod common;

use common::{run_recap, TestEnv};

const SAMPLE_VTT: &str = "\
WEBVTT

meeting/100-0
00:00:00.000 --> 00:00:02.000
<v Alice>Hello team</v>

meeting/101-0
00:00:02.000 --> 00:00:03.000
<v Alice>let's begin</v>

meeting/102-0
00:00:05.000 --> 00:00:08.000
<v Bob>I finished the migration yesterday.</v>
";

#[test]
fn recap_help_shows_usage() {
    let output = run_recap(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "--help should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("Commands:"));
    assert!(stdout.contains("parse"));
    assert!(stdout.contains("summarize"));
}

#[test]
fn parse_emits_merged_json_artifact() {
    let env = TestEnv::new();
    let input = env.write_file("meeting.vtt", SAMPLE_VTT);

    let output = env.run(&["parse", input.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "parse should succeed\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let records: serde_json::Value = serde_json::from_str(&stdout).expect("artifact is JSON");
    let records = records.as_array().expect("artifact is an array");

    // Alice's two contiguous cues merge into one record.
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["speakerId"], "Alice");
    assert_eq!(records[0]["startTime"], 0);
    assert_eq!(records[0]["endTime"], 3000);
    assert_eq!(records[0]["text"], "Hello team let's begin");
    assert_eq!(records[1]["speakerId"], "Bob");
}

#[test]
fn parse_writes_output_file_and_refuses_overwrite() {
    let env = TestEnv::new();
    let input = env.write_file("meeting.vtt", SAMPLE_VTT);
    let out = env.data_dir().join("meeting.json");

    let output = env.run(&[
        "parse",
        input.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(out.exists());

    let output = env.run(&[
        "parse",
        input.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(!output.status.success(), "second write should be refused");
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));

    let output = env.run(&[
        "parse",
        input.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--force",
    ]);
    assert!(output.status.success(), "--force should allow overwrite");
}

#[test]
fn parse_fails_on_input_without_valid_cues() {
    let env = TestEnv::new();
    let input = env.write_file("broken.vtt", "WEBVTT\n\nnot a cue at all\n");

    let output = env.run(&["parse", input.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("no valid cues"),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn speakers_accepts_both_raw_and_artifact_input() {
    let env = TestEnv::new();
    let input = env.write_file("meeting.vtt", SAMPLE_VTT);
    let artifact = env.data_dir().join("meeting.json");

    let output = env.run(&[
        "parse",
        input.to_str().unwrap(),
        "-o",
        artifact.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    for path in [&input, &artifact] {
        let output = env.run(&["speakers", path.to_str().unwrap()]);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            output.status.success(),
            "speakers should succeed for {}\nstderr:\n{}",
            path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
        assert!(stdout.contains("Alice"));
        assert!(stdout.contains("Bob"));
    }
}

#[test]
fn summarize_without_api_key_reports_configuration_error() {
    let env = TestEnv::new();
    let input = env.write_file("meeting.vtt", SAMPLE_VTT);

    let output = env.run(&["summarize", input.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("Gemini API key is missing"),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn summarize_help_lists_force_flag() {
    let output = run_recap(&["summarize", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(
        stdout.contains("--force"),
        "summarize should refuse overwrites without --force\nstdout:\n{}",
        stdout
    );
}

#[test]
fn config_path_and_init_work_in_sandbox() {
    let env = TestEnv::new();

    let output = env.run(&["config", "path"]);
    assert!(output.status.success());
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert!(path.ends_with("config.toml"));

    let output = env.run(&["config", "init"]);
    assert!(
        output.status.success(),
        "config init should succeed\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output = env.run(&["config", "init"]);
    assert!(
        !output.status.success(),
        "second init without --force should fail"
    );

    let output = env.run(&["config", "show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("[pipeline]"));
    assert!(stdout.contains("window_chars"));
}

#[test]
fn completions_subcommand_prints_script() {
    let output = run_recap(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("recap"));
}
