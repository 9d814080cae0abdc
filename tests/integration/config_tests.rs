use dupsweep::cli::Cli;
use dupsweep::config::Config;
use dupsweep::scanner::HashAlgorithm;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
    assert!(config.verify_before_delete);
    assert_eq!(config.threads, None);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("CFGTEST_DS_THREADS", "6");
    std::env::set_var("CFGTEST_DS_FOLLOW_SYMLINKS", "true");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("CFGTEST_DS_"))
        .extract()
        .unwrap();

    assert_eq!(config.threads, Some(6));
    assert!(config.follow_symlinks);

    std::env::remove_var("CFGTEST_DS_THREADS");
    std::env::remove_var("CFGTEST_DS_FOLLOW_SYMLINKS");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
permanent = true
algorithm = "sha256"
threads = 2
verify_before_delete = false
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert!(config.permanent);
    assert_eq!(config.algorithm, HashAlgorithm::Sha256);
    assert_eq!(config.threads, Some(2));
    assert!(!config.verify_before_delete);
    assert!(!config.dry_run);
}

#[test]
fn test_config_load_explicit_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("dupsweep.toml");
    fs::write(&config_path, "dry_run = true\nparallel_threshold = 8\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert!(config.dry_run);
    assert_eq!(config.parallel_threshold, 8);
}

#[test]
fn test_config_invalid_toml_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "invalid = toml").unwrap();

    assert!(Config::load(Some(&config_path)).is_err());
}

#[test]
fn test_config_wrong_type_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "algorithm = \"md5\"\n").unwrap();

    assert!(Config::load(Some(&config_path)).is_err());
}

#[test]
fn test_config_save_round_trip() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        permanent: true,
        threads: Some(3),
        ..Config::default()
    };
    config.save(&config_path).unwrap();

    let saved = fs::read_to_string(&config_path).unwrap();
    assert!(saved.contains("permanent = true"));
    assert!(saved.contains("threads = 3"));
    assert!(saved.contains("algorithm = \"blake3\""));

    let loaded: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_cli_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "algorithm = \"sha256\"\nfollow_symlinks = false\n").unwrap();

    let mut config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();
    let cli = parse(&["--algorithm", "blake3", "--follow-symlinks", "/data"]);
    cli.apply_to(&mut config);

    assert_eq!(config.algorithm, HashAlgorithm::Blake3);
    assert!(config.follow_symlinks);
}

fn parse(args: &[&str]) -> Cli {
    use clap::Parser;
    Cli::try_parse_from(std::iter::once("dupsweep").chain(args.iter().copied())).unwrap()
}
