use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::engine::config::{
    AnalysisConfig, AnalysisConfigBuilder, DEFAULT_API_KEY_ENV, FALLBACK_API_KEY_ENV,
};
use crate::engine::{config_file, model::AnalysisType, prompt::builtin_system_instruction};
use crate::ui::cli::Cli;

/// Loads the config file from `--config`, or the default `nucleo` location.
pub fn load_config_file(args: &Cli) -> Result<config_file::ConfigFile> {
    match &args.config {
        Some(path) => confy::load_path(path)
            .with_context(|| format!("Failed to load config file {}", path.display())),
        None => confy::load("nucleo", None).context("Failed to load config file"),
    }
}

/// Merges CLI flags over the config file over the defaults for `kind`.
pub fn build_config_builder(
    args: &Cli,
    cfg_file: &config_file::ConfigFile,
    kind: AnalysisType,
) -> AnalysisConfigBuilder {
    let section = cfg_file.section(kind);
    let api_key_env = cfg_file
        .api_key_env
        .clone()
        .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());

    let mut b = AnalysisConfigBuilder::default();
    b.kind(kind)
        .temperature(section.temperature.unwrap_or(kind.default_temperature()))
        .system_instruction(
            section
                .system_instruction
                .clone()
                .unwrap_or_else(|| builtin_system_instruction(kind).to_string()),
        )
        .api_key(resolve_api_key(&api_key_env))
        .api_key_env(api_key_env);

    if let Some(model) = args.model.clone().or_else(|| cfg_file.model.clone()) {
        b.model(model);
    }
    if let Some(endpoint) = &cfg_file.endpoint {
        b.endpoint(endpoint.clone());
    }
    if let Some(secs) = cfg_file.timeout_secs {
        b.timeout(Duration::from_secs(secs));
    }
    b
}

pub fn build_analysis_config(
    args: &Cli,
    cfg_file: &config_file::ConfigFile,
    kind: AnalysisType,
) -> Result<AnalysisConfig> {
    build_config_builder(args, cfg_file, kind)
        .build()
        .context("Failed to build configuration for analysis")
}

/// Reads the key from `var`, then from the fallback variable.
pub fn resolve_api_key(var: &str) -> Option<String> {
    [var, FALLBACK_API_KEY_ENV]
        .iter()
        .filter_map(|v| std::env::var(v).ok())
        .find(|k| !k.trim().is_empty())
}

/// `--template` wins over the per-analysis template in the config file.
pub fn template_override(
    args: &Cli,
    cfg_file: &config_file::ConfigFile,
    kind: AnalysisType,
) -> Option<PathBuf> {
    args.template
        .clone()
        .or_else(|| cfg_file.section(kind).template.clone())
}

pub fn needs_interactive_ui(args: &Cli) -> bool {
    !args.no_interactive && atty::is(atty::Stream::Stdout) && atty::is(atty::Stream::Stdin)
}
