use std::path::{Path, PathBuf};

use tempfile::TempDir;
use trio::config::{Config, PROJECT_CONFIG_FILENAME, ProviderConfig};
use trio::providers::Provider;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write config file");
    path
}

#[test]
fn test_missing_files_fall_back_to_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config::load_from(
        &dir.path().join("config.toml"),
        &dir.path().join(PROJECT_CONFIG_FILENAME),
    )
    .expect("load should succeed");

    assert_eq!(config.provider().expect("valid provider"), Provider::OpenAI);
    assert_eq!(config.output_path, PathBuf::from("task_results.json"));
    assert!(!config.require_subtask_results);

    let pipeline = config.pipeline_config().expect("pipeline config");
    assert_eq!(pipeline.main_model, Provider::OpenAI.default_model());
    assert_eq!(pipeline.subtask_model, Provider::OpenAI.default_fast_model());
}

#[test]
fn test_personal_config_is_read() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let personal = write_file(
        dir.path(),
        "config.toml",
        r#"
default_provider = "anthropic"
output_path = "out/report.json"

[providers.anthropic]
model = "claude-opus-4-1"
"#,
    );
    let config = Config::load_from(&personal, &dir.path().join(PROJECT_CONFIG_FILENAME))
        .expect("load should succeed");

    assert_eq!(config.provider().expect("valid provider"), Provider::Anthropic);
    assert_eq!(config.output_path, PathBuf::from("out/report.json"));

    let pipeline = config.pipeline_config().expect("pipeline config");
    assert_eq!(pipeline.main_model, "claude-opus-4-1");
    // No fast model configured: workers use the main model
    assert_eq!(pipeline.subtask_model, "claude-opus-4-1");
}

#[test]
fn test_project_config_overrides_personal() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let personal = write_file(
        dir.path(),
        "config.toml",
        r#"
default_provider = "anthropic"

[providers.anthropic]
model = "personal-model"
fast_model = "personal-fast"
"#,
    );
    let project = write_file(
        dir.path(),
        PROJECT_CONFIG_FILENAME,
        r#"
require_subtask_results = true

[providers.anthropic]
fast_model = "project-fast"

[prompts]
subtask = "Focus on {specific_role} only."
"#,
    );

    let config = Config::load_from(&personal, &project).expect("load should succeed");
    assert_eq!(config.default_provider, "anthropic");
    assert!(config.require_subtask_results);
    assert_eq!(
        config.get_provider_config("anthropic"),
        Some(&ProviderConfig {
            model: "personal-model".to_string(),
            fast_model: Some("project-fast".to_string()),
        })
    );

    let pipeline = config.pipeline_config().expect("pipeline config");
    assert!(pipeline.require_subtask_results);
    assert_eq!(
        pipeline.prompts.subtask("market size", "t"),
        "Focus on market size only.\n\nTask: t"
    );
}

#[test]
fn test_project_config_can_restore_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let personal = write_file(
        dir.path(),
        "config.toml",
        r#"
default_provider = "anthropic"
output_path = "personal.json"
require_subtask_results = true
"#,
    );
    let project = write_file(
        dir.path(),
        PROJECT_CONFIG_FILENAME,
        r#"
default_provider = "openai"
output_path = "task_results.json"
require_subtask_results = false
"#,
    );

    let config = Config::load_from(&personal, &project).expect("load should succeed");
    assert_eq!(config.provider().expect("valid provider"), Provider::OpenAI);
    assert_eq!(config.output_path, PathBuf::from("task_results.json"));
    assert!(!config.require_subtask_results);
}

#[test]
fn test_empty_project_config_changes_nothing() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let personal = write_file(
        dir.path(),
        "config.toml",
        "default_provider = \"google\"\nrequire_subtask_results = true\n",
    );
    let project = write_file(dir.path(), PROJECT_CONFIG_FILENAME, "");

    let config = Config::load_from(&personal, &project).expect("load should succeed");
    assert_eq!(config.provider().expect("valid provider"), Provider::Google);
    assert!(config.require_subtask_results);
}

#[test]
fn test_invalid_project_config_is_reported() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let project = write_file(dir.path(), PROJECT_CONFIG_FILENAME, "this is = = not toml");

    let err = Config::load_from(&dir.path().join("config.toml"), &project)
        .expect_err("load should fail");
    assert!(err.to_string().contains(PROJECT_CONFIG_FILENAME));
}

#[test]
fn test_prompt_override_without_placeholder_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let personal = write_file(
        dir.path(),
        "config.toml",
        "[prompts]\nsynthesis = \"Summarize everything.\"\n",
    );
    let config = Config::load_from(&personal, &dir.path().join(PROJECT_CONFIG_FILENAME))
        .expect("load should succeed");

    let err = config
        .pipeline_config()
        .expect_err("template without {results} should be rejected");
    assert!(err.to_string().contains("{results}"));
}

#[test]
fn test_command_line_overrides() {
    let mut config = Config::default();
    config
        .update(
            Some("gemini".to_string()),
            Some("gemini-2.5-pro".to_string()),
            Some("gemini-2.5-flash-lite".to_string()),
            Some(PathBuf::from("custom.json")),
            true,
        )
        .expect("update should succeed");

    assert_eq!(config.provider().expect("valid provider"), Provider::Google);
    assert_eq!(config.output_path, PathBuf::from("custom.json"));

    let pipeline = config.pipeline_config().expect("pipeline config");
    assert_eq!(pipeline.main_model, "gemini-2.5-pro");
    assert_eq!(pipeline.subtask_model, "gemini-2.5-flash-lite");
    assert!(pipeline.require_subtask_results);
}

#[test]
fn test_unknown_provider_is_rejected() {
    let mut config = Config::default();
    assert!(
        config
            .update(Some("mystery".to_string()), None, None, None, false)
            .is_err()
    );

    config.default_provider = "mystery".to_string();
    assert!(config.pipeline_config().is_err());
}
