//! Ontology configuration (YAML schema v1)

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::domain::ConceptId;

/// `116680003 | Is a (attribute)`
pub const IS_A_TYPE_ID: ConceptId = 116_680_003;

/// `900000000000003001 | Fully specified name`
pub const FSN_TYPE_ID: ConceptId = 900_000_000_000_003_001;

/// `900000000000013009 | Synonym`
pub const SYNONYM_TYPE_ID: ConceptId = 900_000_000_000_013_009;

const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Hierarchy settings, handed to the query engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HierarchyConfig {
    /// Relationship type that defines parent/child structure
    pub is_a_type_id: ConceptId,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            is_a_type_id: IS_A_TYPE_ID,
        }
    }
}

/// Description selection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptionConfig {
    pub fsn_type_id: ConceptId,
    pub synonym_type_id: ConceptId,
    /// Descriptions in other languages are ignored
    pub language: String,
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            fsn_type_id: FSN_TYPE_ID,
            synonym_type_id: SYNONYM_TYPE_ID,
            language: "en".to_string(),
        }
    }
}

/// What the builder does with a relationship whose endpoint has no concept row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanglingPolicy {
    /// Fail the build with `DanglingEdgeReference`
    #[default]
    Reject,
    /// Create a placeholder concept detail and keep the edge
    Placeholder,
}

/// Builder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    pub dangling_references: DanglingPolicy,
    /// Drop rows whose `active` flag is false
    pub skip_inactive: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            dangling_references: DanglingPolicy::Reject,
            skip_inactive: true,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OntologyConfig {
    pub hierarchy: HierarchyConfig,
    pub descriptions: DescriptionConfig,
    pub builder: BuilderConfig,
}

/// On-disk YAML shape. Sections are optional and fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFileV1 {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    hierarchy: Option<HierarchyConfig>,
    #[serde(default)]
    descriptions: Option<DescriptionConfig>,
    #[serde(default)]
    builder: Option<BuilderConfig>,
}

impl OntologyConfig {
    /// Load and validate a YAML configuration file
    pub fn from_yaml(path: impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(content)?;

        let version = file.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let config = Self {
            hierarchy: file.hierarchy.unwrap_or_default(),
            descriptions: file.descriptions.unwrap_or_default(),
            builder: file.builder.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize as YAML schema v1
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: Some(1),
            hierarchy: Some(self.hierarchy),
            descriptions: Some(self.descriptions.clone()),
            builder: Some(self.builder),
        };
        serde_yaml::to_string(&file).map_err(ConfigError::Yaml)
    }

    /// Range and consistency checks
    pub fn validate(&self) -> ConfigResult<()> {
        if self.hierarchy.is_a_type_id == 0 {
            return Err(ConfigError::invalid(
                "hierarchy.is_a_type_id",
                "must be a concept identifier, got 0",
            ));
        }
        if self.descriptions.fsn_type_id == self.descriptions.synonym_type_id {
            return Err(ConfigError::invalid(
                "descriptions.synonym_type_id",
                "must differ from descriptions.fsn_type_id",
            ));
        }
        if self.descriptions.language.trim().is_empty() {
            return Err(ConfigError::invalid("descriptions.language", "must not be empty"));
        }
        Ok(())
    }

    /// Same configuration with a different dangling-reference policy
    pub fn with_dangling_policy(mut self, policy: DanglingPolicy) -> Self {
        self.builder.dangling_references = policy;
        self
    }
}
