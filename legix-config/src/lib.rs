//! Shared configuration loader for the legix toolchain.
//!
//! `defaults/legix.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`LegixConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use legix_core::markup::WriterOptions;
use legix_core::TransformOptions;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/legix.default.toml");

/// Top-level configuration consumed by legix applications.
#[derive(Debug, Clone, Deserialize)]
pub struct LegixConfig {
    pub output: OutputConfig,
    pub diagnostics: DiagnosticsConfig,
    pub inspect: InspectConfig,
    pub format: FormatConfig,
}

/// Shape of the transformed document.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub pretty: bool,
    pub include_line_numbers: bool,
    pub context: String,
}

impl From<&OutputConfig> for TransformOptions {
    fn from(config: &OutputConfig) -> Self {
        TransformOptions {
            context: (!config.context.is_empty()).then(|| config.context.clone()),
            include_line_numbers: config.include_line_numbers,
        }
    }
}

/// How validation failures are reported.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    pub format: DiagnosticsFormat,
    pub include_document: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DiagnosticsFormat {
    #[serde(rename = "tree")]
    Tree,
    #[serde(rename = "list")]
    List,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InspectConfig {
    pub show_line_numbers: bool,
}

/// Layout of markup written by the `format` command.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatConfig {
    pub indent_string: String,
    pub xml_declaration: bool,
}

impl From<&FormatConfig> for WriterOptions {
    fn from(config: &FormatConfig) -> Self {
        WriterOptions {
            indent_string: config.indent_string.clone(),
            xml_declaration: config.xml_declaration,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<LegixConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<LegixConfig, ConfigError> {
    Loader::new().build()
}
