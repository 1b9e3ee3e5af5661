use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use std::fs;
use tempfile::tempdir;

fn cli() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("codegenius-cli")?;
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn languages_lists_the_catalog_with_render_modes() -> Result<(), Box<dyn Error>> {
    let output = cli()?.arg("languages").output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 20);
    assert!(lines[0].starts_with("HTML"));
    assert!(lines[0].contains("web-document"));
    assert!(lines
        .iter()
        .any(|line| line.starts_with("Python") && line.contains("simulated")));
    Ok(())
}

#[test]
fn preview_prints_simulated_transcript_for_python() -> Result<(), Box<dyn Error>> {
    cli()?
        .args(["preview", "--language", "python"])
        .write_stdin("print('hello')\n")
        .assert()
        .success()
        .stdout(
            "Compiling Python...\n\
             > Run Python script\n\
             [System]: Execution simulated for demo purposes.\n\
             [System]: Syntax check passed.\n\
             Output:\n\
             (Program exited with code 0)\n",
        );
    Ok(())
}

#[test]
fn preview_infers_language_and_writes_document() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let input = temp.path().join("page.html");
    let output = temp.path().join("out").join("preview.html");
    fs::write(
        &input,
        "<html><head><title>t</title></head><body><h1>Hi</h1></body></html>",
    )?;

    cli()?
        .arg("preview")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let document = fs::read_to_string(&output)?;
    assert!(document.contains("<h1>Hi</h1>"));
    assert!(document.contains("window.parent.postMessage"));
    let head = document.find("<head>").expect("head tag");
    let title = document.find("<title>").expect("title tag");
    let script = document.find("<script>").expect("instrumentation script");
    assert!(head < script && script < title);
    Ok(())
}

#[test]
fn preview_rejects_unknown_extension() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let input = temp.path().join("notes.xyz");
    fs::write(&input, "hello")?;

    cli()?
        .arg("preview")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot infer language"));
    Ok(())
}

#[test]
fn generate_with_blank_prompt_fails_before_any_request() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    cli()?
        .arg("--config")
        .arg(temp.path().join("preferences.json"))
        .args(["generate", "--language", "sql", "--prompt", "   "])
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("prompt must not be empty"));
    Ok(())
}

#[test]
fn relay_appends_current_session_messages_in_order() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let input = temp.path().join("app.js");
    fs::write(&input, "console.log('one'); console.log('two');")?;

    let messages = [
        r#"{"type":"console","message":"one"}"#,
        r#"{"type":"console","message":"stale","session":9999}"#,
        r#"{"type":"resize","message":"ignored"}"#,
        "not json",
        r#"{"type":"error","message":"boom (Line 3)"}"#,
        r#"{"type":"console","message":"two"}"#,
    ]
    .join("\n");

    cli()?
        .arg("relay")
        .arg(&input)
        .write_stdin(messages)
        .assert()
        .success()
        .stdout("one\n[error] boom (Line 3)\ntwo\n");
    Ok(())
}

#[test]
fn preferences_init_then_show() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let path = temp.path().join("prefs").join("preferences.json");

    cli()?
        .arg("--config")
        .arg(&path)
        .args(["preferences", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default preferences"));
    assert!(path.exists());

    cli()?
        .arg("--config")
        .arg(&path)
        .args(["preferences", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    let output = cli()?
        .arg("--config")
        .arg(&path)
        .args(["preferences", "show"])
        .output()?;
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["generation"]["model"], "gemini-3-pro-preview");
    assert_eq!(value["preview"]["settle_delay_ms"], 600);
    assert_eq!(value["preview"]["default_language"], "HTML");
    Ok(())
}
