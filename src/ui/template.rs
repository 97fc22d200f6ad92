//! This module contains the template plumbing: locating the prompt template,
//! setting up Handlebars and rendering.

use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
#[cfg(feature = "colors")]
use colored::Colorize;
use handlebars::{Handlebars, no_escape};
use sha2::{Digest, Sha256};

use crate::engine::{model::AnalysisType, prompt::builtin_template};

/// A trait for sources that can provide template content.
pub trait TemplateSource {
    /// Loads the template content and its hash.
    fn load(&self) -> Result<(Cow<'static, str>, String)>;
}

pub struct FileTemplateSource {
    pub candidates: Vec<PathBuf>,
}

impl TemplateSource for FileTemplateSource {
    fn load(&self) -> Result<(Cow<'static, str>, String)> {
        for path in &self.candidates {
            if path.exists() {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read template file: {}", path.display()))?;
                let hash = hash_content(&content);
                return Ok((content.into(), hash));
            }
        }
        Err(anyhow!("No template file found in candidate paths."))
    }
}

pub struct BuiltinTemplateSource(pub AnalysisType);

impl TemplateSource for BuiltinTemplateSource {
    fn load(&self) -> Result<(Cow<'static, str>, String)> {
        Ok((builtin_template(self.0).into(), "builtin".into()))
    }
}

/// Hashes a string using SHA256 and returns a hex string.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Per-user template location for an analysis type.
pub fn user_template_path(kind: AnalysisType) -> PathBuf {
    dirs::config_dir()
        .unwrap_or_default()
        .join("nucleo")
        .join(format!("{}.hbs", kind.slug()))
}

/// Finds the template to use: the explicit path (CLI flag or config file)
/// first, then the per-user file, then the built-in default.
/// Returns the template content and its SHA256 hash.
pub fn resolve_template(
    kind: AnalysisType,
    tpl_arg: Option<&Path>,
) -> Result<(Cow<'static, str>, String)> {
    if let Some(path) = tpl_arg {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template file: {}", path.display()))?;
        let hash = hash_content(&content);
        return Ok((content.into(), hash));
    }

    let file_source = FileTemplateSource {
        candidates: vec![user_template_path(kind)],
    };
    if let Ok(result) = file_source.load() {
        return Ok(result);
    }

    BuiltinTemplateSource(kind).load()
}

/// Set up the Handlebars template engine.
pub fn handlebars_setup<'a>(template_str: &str, template_name: &str) -> Result<Handlebars<'a>> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(no_escape);

    handlebars
        .register_template_string(template_name, template_str)
        .map_err(|e| anyhow!("Failed to register template: {}", e))?;

    Ok(handlebars)
}

/// Renders the template with the provided data.
pub fn render_template(
    handlebars: &Handlebars,
    template_name: &str,
    data: &serde_json::Value,
) -> Result<String> {
    let rendered = handlebars
        .render(template_name, data)
        .map_err(|e| anyhow!("Failed to render template: {}", e))?;
    Ok(rendered.trim().to_string())
}

/// Writes rendered output to a file.
pub fn write_to_file(output_path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    write!(writer, "{rendered}")?;
    writer.flush()?;

    #[cfg(feature = "colors")]
    eprintln!(
        "{}{}{} {}",
        "[".bold().white(),
        "✓".bold().green(),
        "]".bold().white(),
        format!("Written to file: {}", output_path.display()).green()
    );

    #[cfg(not(feature = "colors"))]
    eprintln!("[✓] Written to file: {}", output_path.display());

    Ok(())
}
