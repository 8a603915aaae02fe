//! Personality presets
//!
//! A personality bundles the system prompt, default temperature and display
//! metadata that shape a conversation. The catalog is read-only; sessions
//! share entries through `Arc` and keep their own temperature override.
//!
//! # Example
//!
//! ```rust
//! use ethos_core::personality::PersonalityCatalog;
//!
//! let catalog = PersonalityCatalog::builtin();
//! let coach = &catalog["motivational_coach"];
//! assert_eq!(coach.temperature, 0.85);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Index;
use std::path::Path;
use std::sync::Arc;

use crate::error::{EthosError, Result};

mod presets;

pub use presets::default_presets;

static BUILTIN: Lazy<PersonalityCatalog> = Lazy::new(|| PersonalityCatalog {
    entries: default_presets().into_iter().map(Arc::new).collect(),
});

/// Configuration of a single personality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityConfig {
    /// Stable identifier, e.g. "creative_writer"
    pub id: String,
    /// Display name
    pub name: String,
    /// Emoji shown next to the name
    #[serde(default)]
    pub emoji: String,
    /// Avatar shown next to assistant replies
    #[serde(default)]
    pub avatar: String,
    /// Accent colour (hex)
    #[serde(default)]
    pub color: String,
    /// One-line summary of the style
    #[serde(default)]
    pub description: String,
    /// Instruction text prepended to every request
    pub system_prompt: String,
    /// Default sampling temperature (0.0-1.0)
    pub temperature: f32,
    /// Quick-starter prompts
    #[serde(default)]
    pub example_prompts: Vec<String>,
}

impl PersonalityConfig {
    /// "<emoji> <name>" label used by selectors
    pub fn label(&self) -> String {
        if self.emoji.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.emoji, self.name)
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    personalities: Vec<PersonalityConfig>,
}

/// Ordered, read-only lookup from identifier to personality
#[derive(Debug, Clone)]
pub struct PersonalityCatalog {
    entries: Vec<Arc<PersonalityConfig>>,
}

impl PersonalityCatalog {
    /// The built-in presets
    pub fn builtin() -> &'static PersonalityCatalog {
        &BUILTIN
    }

    /// Build a catalog from explicit entries.
    ///
    /// # Errors
    ///
    /// Returns [`EthosError::InvalidCatalog`] for an empty list, empty or
    /// duplicate ids, or temperatures outside 0.0-1.0.
    pub fn new(personalities: Vec<PersonalityConfig>) -> Result<Self> {
        if personalities.is_empty() {
            return Err(EthosError::InvalidCatalog(
                "catalog has no personalities".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for p in &personalities {
            if p.id.trim().is_empty() {
                return Err(EthosError::InvalidCatalog(
                    "personality id must not be empty".to_string(),
                ));
            }
            if !seen.insert(p.id.as_str()) {
                return Err(EthosError::InvalidCatalog(format!(
                    "duplicate personality id `{}`",
                    p.id
                )));
            }
            if !(0.0..=1.0).contains(&p.temperature) {
                return Err(EthosError::InvalidCatalog(format!(
                    "temperature {} of `{}` is outside 0.0-1.0",
                    p.temperature, p.id
                )));
            }
        }

        Ok(Self {
            entries: personalities.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse a YAML document with a top-level `personalities` list
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::new(file.personalities)
    }

    /// Load a YAML catalog from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }

    /// Look up a personality
    pub fn get(&self, id: &str) -> Option<Arc<PersonalityConfig>> {
        self.entries.iter().find(|p| p.id == id).cloned()
    }

    /// Look up a personality named by untrusted input
    pub fn require(&self, id: &str) -> Result<Arc<PersonalityConfig>> {
        self.get(id)
            .ok_or_else(|| EthosError::UnknownPersonality(id.to_string()))
    }

    /// Identifier of the first entry
    pub fn default_id(&self) -> &str {
        // `new` rejects empty catalogs
        self.entries.first().map(|p| p.id.as_str()).unwrap_or_default()
    }

    /// Identifiers, in catalog order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|p| p.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PersonalityConfig>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Index<&str> for PersonalityCatalog {
    type Output = PersonalityConfig;

    /// # Panics
    ///
    /// Panics if `id` is not in the catalog.
    fn index(&self, id: &str) -> &PersonalityConfig {
        self.entries
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.as_ref())
            .unwrap_or_else(|| panic!("unknown personality `{}`", id))
    }
}
