use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::NormalizeError;
use super::field::{FieldMap, FieldValue};
use super::platform::Platform;
use crate::catalog::FactCatalog;
use crate::normalize::{list_entries, normalize, split_qualified, OverridePolicy};

/// References shared by every product. They may never be product-qualified.
pub const GLOBAL_REFERENCES: &[&str] = &["srg", "vmmsrg", "disa", "cis-csc"];

/// References that must resolve to exactly one value per product.
pub const SINGULAR_REFERENCES: &[&str] = &["stigid"];

/// A compliance rule record as authored in YAML.
///
/// Only the fields the build engine acts on are modelled; everything else
/// is carried untouched in `extra`. `identifiers`, `references` and
/// `template` may carry `key@product` overrides until [`Rule::normalize`]
/// is applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "FieldMap::is_empty")]
    pub identifiers: FieldMap,
    #[serde(default, skip_serializing_if = "FieldMap::is_empty")]
    pub references: FieldMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,
    #[serde(default, skip_serializing_if = "FieldMap::is_empty")]
    pub template: FieldMap,
    /// Fields such as `ocil`, `prodtype` or `warnings`.
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl Rule {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            ..Self::default()
        }
    }

    /// Return a copy of this rule specific to `product`.
    ///
    /// Identifiers must agree exactly with their qualified overrides,
    /// references must agree as comma-separated sets, and template values
    /// are simply overridden. Afterwards every identifier and every
    /// [`SINGULAR_REFERENCES`] entry must hold a single value.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] on conflicting overrides, product-qualified
    /// [`GLOBAL_REFERENCES`], malformed keys, or multi-valued singular fields.
    pub fn normalize(&self, product: &str) -> Result<Rule, NormalizeError> {
        check_global_references(&self.references)?;

        let identifiers = normalize(&self.identifiers, product, "identifiers", OverridePolicy::Strict)?;
        let references =
            normalize(&self.references, product, "references", OverridePolicy::StrictList)?;
        let template = normalize(&self.template, product, "template", OverridePolicy::ProductWins)?;

        check_singular("identifiers", &identifiers, |_| true)?;
        check_singular("references", &references, |field| {
            SINGULAR_REFERENCES.contains(&field)
        })?;

        Ok(Rule {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            rationale: self.rationale.clone(),
            severity: self.severity.clone(),
            identifiers,
            references,
            platform: self.platform.clone(),
            platforms: self.platforms.clone(),
            template,
            extra: self.extra.clone(),
        })
    }

    /// Compile `platform` and every entry of `platforms`, dropping entries
    /// equal to one already compiled.
    ///
    /// # Errors
    ///
    /// Returns [`CpealError`](crate::CpealError) for the first expression that
    /// fails to parse or resolve.
    pub fn compile_platforms<C>(&self, catalog: &C) -> Result<Vec<Platform>, crate::CpealError>
    where
        C: FactCatalog + ?Sized,
    {
        let mut compiled: Vec<Platform> = Vec::new();
        for text in self.platform.iter().chain(&self.platforms) {
            let platform = Platform::from_text(text, catalog)?;
            if !compiled.contains(&platform) {
                compiled.push(platform);
            }
        }
        Ok(compiled)
    }

    /// Parse a rule from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`CpealError::Yaml`](crate::CpealError::Yaml) on malformed input.
    pub fn from_yaml_str(input: &str) -> Result<Self, crate::CpealError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Read a rule YAML file. The rule id defaults to the parent directory
    /// name when the document does not set one.
    ///
    /// # Errors
    ///
    /// Returns [`CpealError`](crate::CpealError) on I/O or YAML failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::CpealError> {
        let path = path.as_ref();
        let mut rule = Self::from_yaml_str(&std::fs::read_to_string(path)?)?;
        if rule.id.is_empty() {
            if let Some(dir) = path.parent().and_then(Path::file_name) {
                rule.id = dir.to_string_lossy().into_owned();
            }
        }
        Ok(rule)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`CpealError::Yaml`](crate::CpealError::Yaml) if encoding fails.
    pub fn to_yaml_string(&self) -> Result<String, crate::CpealError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Dict representation, as dumped next to compiled artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`CpealError::Yaml`](crate::CpealError::Yaml) if encoding fails.
    pub fn to_value(&self) -> Result<serde_yaml::Value, crate::CpealError> {
        Ok(serde_yaml::to_value(self)?)
    }

    /// Rebuild a rule from its dict representation.
    ///
    /// # Errors
    ///
    /// Returns [`CpealError::Yaml`](crate::CpealError::Yaml) on unexpected shape.
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, crate::CpealError> {
        Ok(serde_yaml::from_value(value)?)
    }
}

fn check_global_references(references: &FieldMap) -> Result<(), NormalizeError> {
    for key in references.keys() {
        if let Some((field, _)) = split_qualified("references", key)? {
            if GLOBAL_REFERENCES.contains(&field) {
                return Err(NormalizeError::QualifiedGlobalReference {
                    field: field.to_owned(),
                    key: key.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_singular(
    section: &str,
    fields: &FieldMap,
    is_singular: impl Fn(&str) -> bool,
) -> Result<(), NormalizeError> {
    for (field, value) in fields {
        if !is_singular(field.as_str()) {
            continue;
        }
        let count = match value {
            FieldValue::String(text) => list_entries(text).len(),
            FieldValue::List(items) => items.len(),
            _ => 1,
        };
        if count > 1 {
            return Err(NormalizeError::Multiplicity {
                section: section.to_owned(),
                field: field.clone(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}
