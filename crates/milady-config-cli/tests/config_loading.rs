// crates/milady-config-cli/tests/config_loading.rs
// ============================================================================
// Module: Config Loading Tests
// Description: File resolution and parsing for the settings CLI config.
// Purpose: Verify explicit paths, environment overrides, and defaults.
// ============================================================================
//! ## Overview
//! Loads configuration files from temporary directories.

mod support;

use std::fs;

use milady_config_cli::CliConfig;
use milady_config_cli::CliConfigError;
use milady_config_cli::LogSinkKind;
use milady_config_cli::config::DEFAULT_BASE_URL;
use support::TestResult;
use support::ensure;

#[test]
fn explicit_file_is_parsed_and_validated() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("settings.toml");
    let log_path = dir.path().join("engine.log");
    fs::write(
        &path,
        format!(
            "[backend]\nbase_url = \" https://agent.local:2138/ \"\ntimeout_ms = 2500\n\
             token_env = \"AGENT_TOKEN\"\n\n[render]\nshow_advanced = true\n\n\
             [limits]\nmax_document_bytes = 2048\n\n[log]\nsink = \"file\"\npath = \"{}\"\n",
            log_path.display()
        ),
    )?;
    let config = CliConfig::load_resolved(Some(&path), None)?;
    ensure(config.backend.base_url == "https://agent.local:2138/", "url trimmed")?;
    ensure(config.backend.timeout_ms == 2500, "timeout read")?;
    ensure(config.backend.token_env == "AGENT_TOKEN", "token env read")?;
    ensure(config.render.show_advanced, "render flag read")?;
    ensure(!config.render.suppress_error_summary, "unset flag defaults off")?;
    ensure(config.limits.max_document_bytes == 2048, "limit read")?;
    ensure(config.log.sink == LogSinkKind::File, "file sink")?;
    Ok(())
}

#[test]
fn environment_path_is_used_when_no_flag_is_given() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("env.toml");
    fs::write(&path, "[log]\nsink = \"none\"\n")?;
    let env_path = path.to_string_lossy().to_string();
    let config = CliConfig::load_resolved(None, Some(&env_path))?;
    ensure(config.log.sink == LogSinkKind::None, "env file loaded")?;
    Ok(())
}

#[test]
fn flag_wins_over_environment() -> TestResult {
    let dir = tempfile::tempdir()?;
    let flag = dir.path().join("flag.toml");
    fs::write(&flag, "[render]\nsuppress_error_summary = true\n")?;
    let config = CliConfig::load_resolved(Some(&flag), Some("/nonexistent/env.toml"))?;
    ensure(config.render.suppress_error_summary, "flag file loaded")?;
    Ok(())
}

#[test]
fn missing_explicit_file_is_an_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("absent.toml");
    let result = CliConfig::load_resolved(Some(&path), None);
    ensure(matches!(result, Err(CliConfigError::Io(_))), "explicit path must exist")?;
    let env_path = path.to_string_lossy().to_string();
    let result = CliConfig::load_resolved(None, Some(&env_path));
    ensure(matches!(result, Err(CliConfigError::Io(_))), "env path must exist")?;
    Ok(())
}

#[test]
fn missing_default_file_falls_back_to_defaults() -> TestResult {
    let config = CliConfig::load_resolved(None, None)?;
    ensure(config.backend.base_url == DEFAULT_BASE_URL, "default url")?;
    ensure(config.log.sink == LogSinkKind::Stderr, "default sink")?;
    Ok(())
}

#[test]
fn invalid_values_fail_closed() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[limits]\nmax_document_bytes = 0\n")?;
    let result = CliConfig::load_resolved(Some(&path), None);
    ensure(matches!(result, Err(CliConfigError::Invalid(_))), "zero limit rejected")?;
    fs::write(&path, "[backend]\ntoken_env = \"\"\n")?;
    let result = CliConfig::load_resolved(Some(&path), None);
    ensure(matches!(result, Err(CliConfigError::Invalid(_))), "empty token env rejected")?;
    Ok(())
}
