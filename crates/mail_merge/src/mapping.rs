//! Placeholder mappings: the key/value pairs substituted into one document

use crate::data_source::{DataSource, Value};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use store::{AliasSettings, MergeSettings};

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Keys and replacement texts for one document.
///
/// Keys are case-sensitive and never empty. Iteration follows first
/// insertion; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderMapping {
    entries: Vec<(String, String)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl PlaceholderMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a key. Empty keys are ignored and return `false`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if key.is_empty() {
            return false;
        }
        let value = value.into();
        match self.position(&key) {
            Some(position) => self.entries[position].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|position| self.entries[position].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn position(&self, key: &str) -> Option<usize> {
        // The index is skipped by serde; fall back to a scan after deserializing
        match self.index.get(key) {
            Some(&position) => Some(position),
            None if self.index.len() != self.entries.len() => {
                self.entries.iter().position(|(k, _)| k == key)
            }
            None => None,
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PlaceholderMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = PlaceholderMapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PlaceholderMapping {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Date keys derived from the generation date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFields {
    date: NaiveDate,
}

impl DateFields {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Fields for the local calendar date
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Lower-case Spanish month name
    pub fn month_name(&self) -> &'static str {
        MONTHS[self.date.month0() as usize]
    }

    /// `día`, `Mes`, `mes`, `MES`, `año` and `AÑO`
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let day = self.date.day().to_string();
        let month = self.month_name();
        let year = self.date.year().to_string();
        vec![
            ("día", day),
            ("Mes", month.to_string()),
            ("mes", month.to_string()),
            ("MES", month.to_uppercase()),
            ("año", year.clone()),
            ("AÑO", year),
        ]
    }
}

/// Copy the first present source column into `target` when the row has no
/// `target` column of its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAlias {
    pub target: String,
    pub sources: Vec<String>,
}

impl FieldAlias {
    pub fn new(
        target: impl Into<String>,
        sources: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            target: target.into(),
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// `RAZÓN SOCIAL` from `Razón Social` or `Razon Social`
    pub fn razon_social() -> Self {
        Self::new("RAZÓN SOCIAL", ["Razón Social", "Razon Social"])
    }
}

impl From<&AliasSettings> for FieldAlias {
    fn from(settings: &AliasSettings) -> Self {
        Self::new(settings.target.clone(), settings.sources.iter().cloned())
    }
}

/// Builds the mapping for one row.
///
/// Later layers override earlier ones: date fields, then the derived first
/// name, then aliases, then the row's own columns.
#[derive(Debug, Clone)]
pub struct MappingBuilder {
    dates: DateFields,
    full_name_field: String,
    first_name_key: String,
    aliases: Vec<FieldAlias>,
}

impl MappingBuilder {
    pub fn new(dates: DateFields) -> Self {
        Self {
            dates,
            full_name_field: "Nombres y Apellidos".to_string(),
            first_name_key: "Nombre".to_string(),
            aliases: vec![FieldAlias::razon_social()],
        }
    }

    /// Builder configured from the settings file
    pub fn from_settings(settings: &MergeSettings, dates: DateFields) -> Self {
        Self {
            dates,
            full_name_field: settings.full_name_field.clone(),
            first_name_key: settings.first_name_key.clone(),
            aliases: settings.aliases.iter().map(FieldAlias::from).collect(),
        }
    }

    pub fn with_name_fields(
        mut self,
        full_name_field: impl Into<String>,
        first_name_key: impl Into<String>,
    ) -> Self {
        self.full_name_field = full_name_field.into();
        self.first_name_key = first_name_key.into();
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<FieldAlias>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn dates(&self) -> DateFields {
        self.dates
    }

    /// Mapping for a row given as `(column, value)` pairs in column order
    pub fn build<'a>(
        &self,
        row: impl IntoIterator<Item = (&'a str, &'a Value)>,
    ) -> PlaceholderMapping {
        let row: Vec<(&str, &Value)> = row.into_iter().collect();
        let lookup = |column: &str| row.iter().find(|(k, _)| *k == column).map(|(_, v)| *v);

        let mut mapping: PlaceholderMapping = self.dates.entries().into_iter().collect();

        if let Some(full_name) = lookup(self.full_name_field.as_str()) {
            if let Some(first) = full_name.to_string_value().split_whitespace().next() {
                mapping.insert(self.first_name_key.clone(), first);
            }
        }

        for alias in &self.aliases {
            if lookup(alias.target.as_str()).is_some() {
                continue;
            }
            if let Some(value) = alias.sources.iter().find_map(|source| lookup(source.as_str())) {
                mapping.insert(alias.target.clone(), value.to_string_value());
            }
        }

        for (column, value) in row {
            mapping.insert(column, value.to_string_value());
        }
        mapping
    }

    /// Mapping for record `index` of a data source
    pub fn build_for_record(&self, source: &DataSource, index: usize) -> PlaceholderMapping {
        self.build(source.row_fields(index))
    }
}
