use pagelinker_engine::rules::{Boundary, LinkAttrs, PatternRule, Preset, RuleError, RuleSet};
use pagelinker_engine::{Annotator, SkipPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Unknown preset `{preset}` (expected one of: ups, usps, fedex, tracking)")]
    UnknownPreset { preset: String },

    #[error("Invalid rule: {source}")]
    InvalidRule { id: String, source: RuleError },
}

/// Serialized form of [`Boundary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryConfig {
    None,
    #[default]
    Digit,
    Word,
}

impl From<BoundaryConfig> for Boundary {
    fn from(value: BoundaryConfig) -> Self {
        match value {
            BoundaryConfig::None => Boundary::None,
            BoundaryConfig::Digit => Boundary::Digit,
            BoundaryConfig::Word => Boundary::Word,
        }
    }
}

/// Attributes applied to every rule that does not set its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
}

impl LinkDefaults {
    fn is_empty(&self) -> bool {
        self.target.is_none() && self.style.is_none() && self.rel.is_none()
    }

    fn to_attrs(&self) -> LinkAttrs {
        LinkAttrs {
            target: self.target.clone(),
            style: self.style.clone(),
            rel: self.rel.clone(),
        }
    }
}

/// One `[[rules]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub id: String,
    pub pattern: String,
    #[serde(default)]
    pub capture_group: usize,
    #[serde(default)]
    pub boundary: BoundaryConfig,
    #[serde(default)]
    pub case_insensitive: bool,
    /// URL template; `{value}` is the captured value, `{match}` the full match.
    pub url: String,
    /// Title template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
}

impl RuleConfig {
    pub fn build(&self) -> Result<PatternRule, RuleError> {
        let mut builder = PatternRule::builder(&self.id, &self.pattern)
            .capture_group(self.capture_group)
            .boundary(self.boundary.into())
            .case_insensitive(self.case_insensitive)
            .url_template(&self.url);
        if let Some(label) = &self.label {
            builder = builder.label_template(label);
        }
        if let Some(target) = &self.target {
            builder = builder.target(target);
        }
        if let Some(style) = &self.style {
            builder = builder.style(style);
        }
        if let Some(rel) = &self.rel {
            builder = builder.rel(rel);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Built-in rule bundles, applied before `rules`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<String>,
    /// Replaces the default skip list when set. Links are skipped regardless.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "LinkDefaults::is_empty")]
    pub link: LinkDefaults,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleConfig>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        let config_path = Self::expand_path(config_path).unwrap_or_else(|| config_path.to_path_buf());
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.clone(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.clone(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/pagelinker");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Presets in listed order, then `[[rules]]` in file order, with `[link]`
    /// filling in attributes the rules leave unset.
    ///
    /// Presets may overlap (`tracking` includes `ups`); a preset rule already
    /// added by an earlier preset is skipped. A `[[rules]]` entry whose id is
    /// already taken is an error.
    pub fn rule_set(&self) -> Result<RuleSet, ConfigError> {
        let defaults = self.link.to_attrs();
        let mut set = RuleSet::default();

        for name in &self.presets {
            let preset: Preset = name.parse().map_err(|_| ConfigError::UnknownPreset {
                preset: name.clone(),
            })?;
            for rule in preset.rules() {
                if set.get(rule.id()).is_some() {
                    continue;
                }
                Self::add_rule(&mut set, rule.with_default_link_attrs(&defaults))?;
            }
        }

        for rule_config in &self.rules {
            let rule = rule_config
                .build()
                .map_err(|source| ConfigError::InvalidRule {
                    id: rule_config.id.clone(),
                    source,
                })?;
            Self::add_rule(&mut set, rule.with_default_link_attrs(&defaults))?;
        }

        Ok(set)
    }

    pub fn skip_policy(&self) -> SkipPolicy {
        self.skip_tags
            .as_ref()
            .map(SkipPolicy::new)
            .unwrap_or_default()
    }

    pub fn annotator(&self) -> Result<Annotator, ConfigError> {
        Ok(Annotator::new(self.rule_set()?).with_skip_policy(self.skip_policy()))
    }

    fn add_rule(set: &mut RuleSet, rule: PatternRule) -> Result<(), ConfigError> {
        let id = rule.id().to_string();
        set.push(rule)
            .map_err(|source| ConfigError::InvalidRule { id, source })
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
