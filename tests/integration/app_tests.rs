use clap::Parser;
use dupsweep::cli::Cli;
use dupsweep::error::ExitCode;
use dupsweep::run_app;
use std::fs;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("dupsweep").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_app_dry_run_success() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.txt"), b"twin").unwrap();
    fs::write(data.join("b.txt"), b"twin").unwrap();
    let config = dir.path().join("cfg.toml");
    fs::write(&config, "").unwrap();

    let code = run_app(cli(&[
        "--dry-run",
        "--quiet",
        "--config",
        config.to_str().unwrap(),
        data.to_str().unwrap(),
    ]))
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(data.join("a.txt").exists());
    assert!(data.join("b.txt").exists());
}

#[test]
fn test_app_no_duplicates_exit_code() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.txt"), b"one").unwrap();
    fs::write(data.join("b.txt"), b"two!").unwrap();
    let config = dir.path().join("cfg.toml");
    fs::write(&config, "").unwrap();

    let code = run_app(cli(&[
        "--quiet",
        "--config",
        config.to_str().unwrap(),
        data.to_str().unwrap(),
    ]))
    .unwrap();

    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_app_permanent_removes() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.txt"), b"twin").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(20));
    fs::write(data.join("b.txt"), b"twin").unwrap();
    let config = dir.path().join("cfg.toml");
    fs::write(&config, "threads = 1\n").unwrap();

    let code = run_app(cli(&[
        "--permanent",
        "--quiet",
        "--config",
        config.to_str().unwrap(),
        data.to_str().unwrap(),
    ]))
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(fs::read_dir(&data).unwrap().count(), 1);
}

#[test]
fn test_app_missing_path_is_error() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("cfg.toml");
    fs::write(&config, "").unwrap();
    let missing = dir.path().join("missing");

    let err = run_app(cli(&[
        "--quiet",
        "--config",
        config.to_str().unwrap(),
        missing.to_str().unwrap(),
    ]))
    .unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("Path not found"));
}

#[test]
fn test_app_missing_config_is_error() {
    let dir = tempdir().unwrap();
    let result = run_app(cli(&[
        "--quiet",
        "--config",
        dir.path().join("absent.toml").to_str().unwrap(),
        dir.path().to_str().unwrap(),
    ]));
    assert!(result.is_err());
}
