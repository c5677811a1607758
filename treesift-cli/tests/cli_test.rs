use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn treesift() -> Result<Command> {
    Ok(Command::cargo_bin("treesift")?)
}

fn create_test_files(dir: &TempDir, files: &[(&str, &str)]) -> Result<()> {
    for (name, content) in files {
        fs::write(dir.path().join(name), content)?;
    }
    Ok(())
}

#[test]
fn test_finds_matching_files() -> Result<()> {
    let dir = TempDir::new()?;
    create_test_files(
        &dir,
        &[
            ("hit.txt", "a needle here\n"),
            ("miss.txt", "nothing at all\n"),
        ],
    )?;

    treesift()?
        .arg("-a")
        .arg("needle")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("hit.txt"))
        .stdout(predicate::str::contains("miss.txt").not());
    Ok(())
}

#[test]
fn test_prints_matching_lines() -> Result<()> {
    let dir = TempDir::new()?;
    create_test_files(&dir, &[("f.txt", "first\na needle here\n")])?;

    treesift()?
        .arg("-a")
        .arg("needle")
        .arg("--lines")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("| a needle here"));
    Ok(())
}

#[test]
fn test_raw_output_is_text_only() -> Result<()> {
    let dir = TempDir::new()?;
    create_test_files(&dir, &[("f.txt", "noise\na needle here\n")])?;

    treesift()?
        .arg("-a")
        .arg("needle")
        .arg("--raw")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::eq("a needle here\n"));
    Ok(())
}

#[test]
fn test_quiet_suppresses_per_file_output() -> Result<()> {
    let dir = TempDir::new()?;
    create_test_files(&dir, &[("f.txt", "a needle here\n")])?;

    treesift()?
        .arg("-a")
        .arg("needle")
        .arg("--quiet")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    Ok(())
}

#[test]
fn test_summary_reports_counters() -> Result<()> {
    let dir = TempDir::new()?;
    create_test_files(
        &dir,
        &[("hit.txt", "a needle here\n"), ("miss.txt", "nothing\n")],
    )?;

    treesift()?
        .arg("-a")
        .arg("needle")
        .arg("--summary")
        .arg("--quiet")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("summary: files tested :        2"))
        .stdout(predicate::str::contains("summary: files matched:        1"))
        .stdout(predicate::str::contains("summary: lines matched:        1"));
    Ok(())
}

#[test]
fn test_missing_root_is_fatal() -> Result<()> {
    let dir = TempDir::new()?;

    treesift()?
        .arg("-a")
        .arg("needle")
        .arg(dir.path().join("absent"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent"));
    Ok(())
}

#[test]
fn test_invalid_pattern_is_fatal() -> Result<()> {
    let dir = TempDir::new()?;

    treesift()?
        .arg("-a")
        .arg("[unclosed")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidPattern"));
    Ok(())
}

#[test]
fn test_invalid_age_is_fatal() -> Result<()> {
    let dir = TempDir::new()?;

    treesift()?
        .arg("-a")
        .arg("needle")
        .arg("--newer-than")
        .arg("sometime recently")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidDuration"));
    Ok(())
}

#[test]
fn test_reads_options_from_config_file() -> Result<()> {
    let dir = TempDir::new()?;
    create_test_files(&dir, &[("hit.txt", "a needle here\n")])?;
    let conf = dir.path().join("scan.yaml");
    fs::write(&conf, "accept_or:\n  - \"needle\"\n")?;

    treesift()?
        .arg("--conf")
        .arg(&conf)
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("hit.txt"));
    Ok(())
}

#[test]
fn test_cli_flags_override_config_file() -> Result<()> {
    let dir = TempDir::new()?;
    create_test_files(&dir, &[("hit.txt", "a needle here\n")])?;
    let conf = dir.path().join("scan.yaml");
    fs::write(&conf, "accept_or:\n  - \"no-such-token\"\n")?;

    treesift()?
        .arg("--conf")
        .arg(&conf)
        .arg("-a")
        .arg("needle")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("hit.txt"));
    Ok(())
}

#[test]
fn test_missing_config_file_is_fatal() -> Result<()> {
    let dir = TempDir::new()?;

    treesift()?
        .arg("--conf")
        .arg(dir.path().join("absent.yaml"))
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
    Ok(())
}

#[test]
fn test_exclude_flag_narrows_results() -> Result<()> {
    let dir = TempDir::new()?;
    create_test_files(
        &dir,
        &[
            ("keep.rs", "a needle here\n"),
            ("skip.log", "a needle here\n"),
        ],
    )?;

    treesift()?
        .arg("-a")
        .arg("needle")
        .arg("-e")
        .arg(r"\.log$")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("keep.rs"))
        .stdout(predicate::str::contains("skip.log").not());
    Ok(())
}

#[test]
fn test_version_flag() -> Result<()> {
    treesift()?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.3.0"));
    Ok(())
}
