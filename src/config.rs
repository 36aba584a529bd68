use crate::log_debug;
use crate::pipeline::PipelineConfig;
use crate::prompts::{PromptOverrides, PromptTemplates};
use crate::providers::Provider;

use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration structure for trio
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    /// Default LLM provider
    #[serde(default = "default_provider_name")]
    pub default_provider: String,
    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Where the final report is written
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Fail the run when every subtask worker fails instead of synthesizing
    /// from nothing
    #[serde(default)]
    pub require_subtask_results: bool,
    /// Prompt template overrides
    #[serde(default)]
    pub prompts: PromptOverrides,
}

/// Provider-specific configuration structure
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Model for task division and synthesis
    #[serde(default)]
    pub model: String,
    /// Model for subtask workers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_model: Option<String>,
}

impl ProviderConfig {
    /// Create a default provider configuration for a given provider
    pub fn default_for(provider: Provider) -> Self {
        Self {
            model: provider.default_model().to_string(),
            fast_model: Some(provider.default_fast_model().to_string()),
        }
    }

    /// Get effective model (configured or default)
    pub fn effective_model(&self, provider: Provider) -> &str {
        if self.model.is_empty() {
            provider.default_model()
        } else {
            &self.model
        }
    }

    /// Subtask model, falling back to the main model
    pub fn effective_fast_model(&self, provider: Provider) -> &str {
        self.fast_model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.effective_model(provider))
    }
}

fn default_provider_name() -> String {
    Provider::default().name().to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("task_results.json")
}

/// Contents of a `.trioconfig` file. Unset values leave the personal
/// configuration alone.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ProjectConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_subtask_results: Option<bool>,
    #[serde(default)]
    pub prompts: PromptOverrides,
}

/// Project configuration filename
pub const PROJECT_CONFIG_FILENAME: &str = ".trioconfig";

impl Config {
    /// Load personal config, then merge the project config from the current
    /// directory if there is one
    pub fn load() -> Result<Self> {
        let personal = Self::get_config_path()?;
        let project = std::env::current_dir()?.join(PROJECT_CONFIG_FILENAME);
        Self::load_from(&personal, &project)
    }

    /// Load from explicit personal and project paths. Missing files fall back
    /// to defaults.
    pub fn load_from(personal: &Path, project: &Path) -> Result<Self> {
        let mut config = if personal.exists() {
            let content = fs::read_to_string(personal)
                .with_context(|| format!("Failed to read {}", personal.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Invalid configuration in {}", personal.display()))?
        } else {
            Self::default()
        };

        if project.exists() {
            let project_config = Self::load_project_config(project)?;
            config.merge_with_project_config(project_config);
        }

        log_debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Load project-specific configuration
    pub fn load_project_config(path: &Path) -> Result<ProjectConfig> {
        let config_str = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read project config file: {}", e))?;

        match toml::from_str(&config_str) {
            Ok(config) => Ok(config),
            Err(e) => Err(anyhow!(
                "Invalid project configuration file format: {}. Please check your {} file for syntax errors.",
                e,
                PROJECT_CONFIG_FILENAME
            )),
        }
    }

    /// Apply a project overlay. Every value the project file sets wins, even
    /// when it matches the built-in default.
    pub fn merge_with_project_config(&mut self, project_config: ProjectConfig) {
        log_debug!("Merging with project configuration");

        if let Some(provider) = project_config.default_provider {
            self.default_provider = provider;
        }

        for (provider, proj_provider_config) in project_config.providers {
            let entry = self.providers.entry(provider).or_default();
            if !proj_provider_config.model.is_empty() {
                entry.model = proj_provider_config.model;
            }
            if proj_provider_config.fast_model.is_some() {
                entry.fast_model = proj_provider_config.fast_model;
            }
        }

        if let Some(output_path) = project_config.output_path {
            self.output_path = output_path;
        }
        if let Some(require) = project_config.require_subtask_results {
            self.require_subtask_results = require;
        }

        let prompts = project_config.prompts;
        if prompts.division.is_some() {
            self.prompts.division = prompts.division;
        }
        if prompts.subtask.is_some() {
            self.prompts.subtask = prompts.subtask;
        }
        if prompts.synthesis.is_some() {
            self.prompts.synthesis = prompts.synthesis;
        }
    }

    /// Get the path to the configuration file
    fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push("trio");
        std::fs::create_dir_all(&path)?;
        path.push("config.toml");
        Ok(path)
    }

    /// Apply command-line overrides
    pub fn update(
        &mut self,
        provider: Option<String>,
        model: Option<String>,
        subtask_model: Option<String>,
        output_path: Option<PathBuf>,
        require_subtask_results: bool,
    ) -> Result<()> {
        if let Some(provider) = provider {
            let provider: Provider = provider.parse()?;
            self.default_provider = provider.name().to_string();
        }

        let provider = self.provider().context("Could not get default provider")?;
        let provider_config = self
            .providers
            .entry(provider.name().to_string())
            .or_insert_with(|| ProviderConfig::default_for(provider));

        if let Some(model) = model {
            provider_config.model = model;
        }
        if let Some(subtask_model) = subtask_model {
            provider_config.fast_model = Some(subtask_model);
        }
        if let Some(output_path) = output_path {
            self.output_path = output_path;
        }
        if require_subtask_results {
            self.require_subtask_results = true;
        }

        log_debug!("Configuration updated: {:?}", self);
        Ok(())
    }

    /// The configured default provider
    pub fn provider(&self) -> Result<Provider> {
        Ok(self.default_provider.parse::<Provider>()?)
    }

    /// Get the configuration for a specific provider
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers
            .get(provider)
            .or_else(|| self.providers.get(&provider.to_lowercase()))
    }

    /// Resolve the immutable settings the orchestrator runs with
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let provider = self.provider()?;
        let provider_config = self
            .get_provider_config(provider.name())
            .cloned()
            .unwrap_or_else(|| ProviderConfig::default_for(provider));

        Ok(PipelineConfig {
            main_model: provider_config.effective_model(provider).to_string(),
            subtask_model: provider_config.effective_fast_model(provider).to_string(),
            prompts: PromptTemplates::from_overrides(&self.prompts)?,
            require_subtask_results: self.require_subtask_results,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        let providers = Provider::ALL
            .iter()
            .map(|&p| (p.name().to_string(), ProviderConfig::default_for(p)))
            .collect();

        Self {
            default_provider: default_provider_name(),
            providers,
            output_path: default_output_path(),
            require_subtask_results: false,
            prompts: PromptOverrides::default(),
        }
    }
}
