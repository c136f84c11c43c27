//! Merge settings management
//!
//! This module provides persistence and loading of the JSON settings file
//! that describes the document kinds a merge can produce.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main settings container
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MergeSettings {
    /// Directory the per-kind folders are created under
    pub output_root: PathBuf,
    /// Publish generated documents to the drive folder
    pub upload_to_drive: bool,
    /// Local (synced) drive folder used when publishing
    pub drive_root: Option<PathBuf>,
    /// Request a PDF copy of every published document
    pub convert_to_pdf: bool,
    /// Row column holding the client's full name
    pub full_name_field: String,
    /// Key the first token of the full name is published under
    pub first_name_key: String,
    /// Extra keys copied from alternative column spellings
    pub aliases: Vec<AliasSettings>,
    /// Document kinds by name
    pub kinds: BTreeMap<String, KindSettings>,
}

impl Default for MergeSettings {
    fn default() -> Self {
        let mut kinds = BTreeMap::new();
        kinds.insert("comunicado".to_string(), KindSettings::comunicado());
        kinds.insert("renovacion".to_string(), KindSettings::renovacion());
        Self {
            output_root: PathBuf::from("Documentos_Generados"),
            upload_to_drive: false,
            drive_root: None,
            convert_to_pdf: false,
            full_name_field: "Nombres y Apellidos".to_string(),
            first_name_key: "Nombre".to_string(),
            aliases: vec![AliasSettings {
                target: "RAZÓN SOCIAL".to_string(),
                sources: vec!["Razón Social".to_string(), "Razon Social".to_string()],
            }],
            kinds,
        }
    }
}

impl MergeSettings {
    pub fn kind(&self, name: &str) -> Option<&KindSettings> {
        self.kinds.get(name)
    }

    pub fn kind_names(&self) -> Vec<&str> {
        self.kinds.keys().map(String::as_str).collect()
    }
}

/// Copy the first present source column into `target`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AliasSettings {
    pub target: String,
    pub sources: Vec<String>,
}

/// Placeholder syntaxes a kind's templates are written with
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxSetting {
    /// `${key}`, `$<key>`, `<key>` and `« key»`
    #[default]
    Standard,
    /// `<key>` and `« key»` only
    Legacy,
}

/// Template choice driven by an indicator column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectorSettings {
    pub column: String,
    /// Indicator value to template path
    pub templates: BTreeMap<String, PathBuf>,
}

/// One document kind (Comunicado, Renovacion, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KindSettings {
    /// Label used in file names and report columns
    pub label: String,
    /// Folder under the output root
    pub folder: String,
    /// Output file name; `{kind}`, `{year}`, `{client_id}`, `{index}` and
    /// `{<column>}` are filled in per row
    pub file_name_pattern: String,
    /// Template used when no selector applies
    pub default_template: PathBuf,
    pub selector: Option<SelectorSettings>,
    pub scan_headers: bool,
    pub scan_footers: bool,
    pub syntax: SyntaxSetting,
}

impl Default for KindSettings {
    fn default() -> Self {
        Self {
            label: "Documento".to_string(),
            folder: "Documentos".to_string(),
            file_name_pattern: "{kind}_{year}_{client_id}.docx".to_string(),
            default_template: PathBuf::from("plantilla.docx"),
            selector: None,
            scan_headers: true,
            scan_footers: true,
            syntax: SyntaxSetting::Standard,
        }
    }
}

impl KindSettings {
    pub fn comunicado() -> Self {
        Self {
            label: "Comunicado".to_string(),
            folder: "Comunicados".to_string(),
            default_template: PathBuf::from("RENOVACION_202X_CLIENTE.docx"),
            ..Self::default()
        }
    }

    pub fn renovacion() -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(
            "1".to_string(),
            PathBuf::from("PROPUESTA FE Y NE RENOVACION 202X -CLIENTE1.docx"),
        );
        templates.insert(
            "2".to_string(),
            PathBuf::from("PROPUESTA FE RENOVACION 202X -CLIENTE2.docx"),
        );
        Self {
            label: "Renovacion".to_string(),
            folder: "Renovaciones".to_string(),
            default_template: PathBuf::from("PROPUESTA FE Y NE RENOVACION 202X -CLIENTE1.docx"),
            selector: Some(SelectorSettings {
                column: "Indicador Tarifa".to_string(),
                templates,
            }),
            ..Self::default()
        }
    }

    /// Resolve template paths relative to `base` (the settings file's directory)
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.default_template);
        if let Some(selector) = self.selector.as_mut() {
            selector.templates.values_mut().for_each(resolve);
        }
    }
}

/// Settings manager for loading and saving the settings file
pub struct SettingsManager {
    /// Path to the settings file
    settings_path: PathBuf,
    /// Current settings (cached)
    current: MergeSettings,
}

impl SettingsManager {
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            current: MergeSettings::default(),
        }
    }

    /// Get the path to the settings file
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_sync(&mut self) -> Result<&MergeSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            match serde_json::from_str::<MergeSettings>(&content) {
                Ok(settings) => {
                    self.current = settings;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %self.settings_path.display(),
                        "Failed to parse settings file, using defaults: {}",
                        e
                    );
                    self.current = MergeSettings::default();
                }
            }
        } else {
            self.current = MergeSettings::default();
        }
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &MergeSettings {
        &self.current
    }

    /// Replace settings and save to disk
    pub fn update_sync(&mut self, settings: MergeSettings) -> Result<()> {
        self.current = settings;
        self.save_sync()
    }
}
