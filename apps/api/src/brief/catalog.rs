//! Rule catalog: default parameters, pattern groups, and keyword rules.
//!
//! The catalog is plain configuration data. It is built in, or loaded from a
//! JSON file once at startup (`BRIEF_CATALOG_PATH`), and never mutated after
//! the resolver is constructed from it.
//!
//! Precedence is fixed by order: groups are scanned in `groups` order, and
//! within a group matches are applied in text order. A keyword's position in
//! `rules` has no effect on precedence.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::brief::params::{ParamValue, ParameterSet};

/// A named category of recognized keywords. Organizes extraction only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternGroup {
    pub name: String,
    /// Alternatives in match-preference order: at a given position the
    /// first listed keyword that matches wins.
    pub keywords: Vec<String>,
}

/// Parameter overrides applied wholesale when `keyword` is detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub overrides: ParameterSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCatalog {
    pub defaults: ParameterSet,
    pub groups: Vec<PatternGroup>,
    pub rules: Vec<KeywordRule>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("pattern group name cannot be empty")]
    EmptyGroupName,

    #[error("duplicate pattern group '{0}'")]
    DuplicateGroup(String),

    #[error("pattern group '{0}' has no keywords")]
    EmptyGroup(String),

    #[error("pattern group '{0}' contains a blank keyword")]
    BlankKeyword(String),

    #[error("rule keyword cannot be blank")]
    BlankRuleKeyword,

    #[error("duplicate rule for keyword '{0}'")]
    DuplicateRule(String),

    #[error("failed to compile matcher for group '{group}': {source}")]
    Matcher {
        group: String,
        #[source]
        source: regex::Error,
    },
}

impl RuleCatalog {
    /// Loads a catalog from a JSON file and validates it.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule catalog '{}'", path.display()))?;
        let catalog: RuleCatalog = serde_json::from_str(&raw)
            .with_context(|| format!("Rule catalog '{}' is not valid JSON", path.display()))?;
        catalog
            .validate()
            .with_context(|| format!("Rule catalog '{}' failed validation", path.display()))?;
        Ok(catalog)
    }

    /// Checks structural invariants. Keywords are compared case-insensitively
    /// because briefs are lower-cased before matching.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut group_names = HashSet::new();
        for group in &self.groups {
            if group.name.trim().is_empty() {
                return Err(CatalogError::EmptyGroupName);
            }
            if !group_names.insert(group.name.as_str()) {
                return Err(CatalogError::DuplicateGroup(group.name.clone()));
            }
            if group.keywords.is_empty() {
                return Err(CatalogError::EmptyGroup(group.name.clone()));
            }
            if group.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(CatalogError::BlankKeyword(group.name.clone()));
            }
        }

        let mut rule_keywords = HashSet::new();
        for rule in &self.rules {
            if rule.keyword.trim().is_empty() {
                return Err(CatalogError::BlankRuleKeyword);
            }
            if !rule_keywords.insert(rule.keyword.to_lowercase()) {
                return Err(CatalogError::DuplicateRule(rule.keyword.clone()));
            }
        }

        Ok(())
    }

    /// Rule keywords that no pattern group can ever produce.
    pub fn unreachable_rules(&self) -> Vec<&str> {
        let recognized: HashSet<String> = self
            .groups
            .iter()
            .flat_map(|g| g.keywords.iter().map(|k| k.to_lowercase()))
            .collect();
        self.rules
            .iter()
            .filter(|r| !recognized.contains(&r.keyword.to_lowercase()))
            .map(|r| r.keyword.as_str())
            .collect()
    }

    /// The catalog shipped with the service.
    pub fn builtin() -> Self {
        RuleCatalog {
            defaults: default_parameters(),
            groups: default_groups(),
            rules: default_rules(),
        }
    }
}

fn int(v: i64) -> ParamValue {
    ParamValue::Int(v)
}

fn float(v: f64) -> ParamValue {
    ParamValue::Float(v)
}

fn flag(v: bool) -> ParamValue {
    ParamValue::Bool(v)
}

fn text(v: &str) -> ParamValue {
    ParamValue::text(v)
}

fn default_parameters() -> ParameterSet {
    [
        ("grid_size", float(1.0)),
        ("floor_height", float(3.0)),
        ("panel_depth", float(0.2)),
        ("facade_offset", float(0.5)),
        ("story_count", int(5)),
        ("responsive_panels", flag(true)),
        ("panel_density", float(0.8)),
        ("view_priority", float(0.7)),
        ("sun_priority", float(0.8)),
        ("panel_rotation_limit", int(45)),
        ("panel_type", text("rectangular")),
        ("material", text("glass")),
        ("structural_system", text("frame")),
    ]
    .into_iter()
    .collect()
}

fn group(name: &str, keywords: &[&str]) -> PatternGroup {
    PatternGroup {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

fn default_groups() -> Vec<PatternGroup> {
    vec![
        group(
            "building_type",
            &["high-rise", "mid-rise", "low-rise", "tower", "building"],
        ),
        group(
            "facade_type",
            &[
                "dynamic",
                "kinetic",
                "adaptive",
                "responsive",
                "static",
                "louvres",
                "sunshade",
            ],
        ),
        group(
            "environment",
            &[
                "sun angle",
                "solar",
                "daylight",
                "shadowing",
                "climate",
                "weather",
                "temperature",
            ],
        ),
        group(
            "views",
            &["views", "framing views", "panorama", "outlook", "vista"],
        ),
        group(
            "materials",
            &[
                "glass",
                "metal",
                "wood",
                "aluminum",
                "concrete",
                "transparent",
                "opaque",
            ],
        ),
        group(
            "pattern",
            &["dense", "sparse", "porous", "pattern", "parametric"],
        ),
        group("structure", &["lightweight", "modular", "prefab"]),
    ]
}

fn rule(keyword: &str, overrides: Vec<(&str, ParamValue)>) -> KeywordRule {
    KeywordRule {
        keyword: keyword.to_string(),
        overrides: overrides.into_iter().collect(),
    }
}

fn default_rules() -> Vec<KeywordRule> {
    vec![
        // Scale and form
        rule("high-rise", vec![("story_count", int(30)), ("panel_density", float(0.9))]),
        rule("mid-rise", vec![("story_count", int(15)), ("panel_density", float(0.8))]),
        rule("low-rise", vec![("story_count", int(5)), ("panel_density", float(0.7))]),
        rule(
            "tower",
            vec![
                ("story_count", int(40)),
                ("panel_density", float(0.85)),
                ("form", text("tower")),
            ],
        ),
        // Panel systems
        rule(
            "dynamic",
            vec![("responsive_panels", flag(true)), ("panel_rotation_limit", int(60))],
        ),
        rule(
            "static",
            vec![("responsive_panels", flag(false)), ("panel_rotation_limit", int(0))],
        ),
        rule(
            "kinetic",
            vec![("responsive_panels", flag(true)), ("panel_rotation_limit", int(90))],
        ),
        rule(
            "adaptive",
            vec![("responsive_panels", flag(true)), ("panel_rotation_limit", int(75))],
        ),
        rule("responsive", vec![("responsive_panels", flag(true))]),
        rule(
            "louvres",
            vec![("panel_type", text("louvre")), ("panel_density", float(0.9))],
        ),
        rule(
            "sunshade",
            vec![
                ("panel_type", text("louvre")),
                ("sun_priority", float(0.9)),
                ("view_priority", float(0.5)),
            ],
        ),
        // Environment
        rule("sun angle", vec![("sun_priority", float(0.9))]),
        rule("solar", vec![("sun_priority", float(0.9))]),
        rule(
            "daylight",
            vec![("sun_priority", float(0.8)), ("panel_type", text("perforated"))],
        ),
        rule(
            "shadowing",
            vec![("sun_priority", float(0.9)), ("panel_density", float(0.9))],
        ),
        // Views and aesthetics
        rule("views", vec![("view_priority", float(0.9))]),
        rule(
            "framing views",
            vec![("view_priority", float(0.95)), ("panel_density", float(0.7))],
        ),
        rule(
            "transparent",
            vec![("material", text("glass")), ("panel_density", float(0.6))],
        ),
        rule(
            "opaque",
            vec![("material", text("solid")), ("panel_density", float(0.9))],
        ),
        // Materials
        rule("glass", vec![("material", text("glass"))]),
        rule("metal", vec![("material", text("metal"))]),
        rule("wood", vec![("material", text("wood"))]),
        rule("aluminum", vec![("material", text("aluminum"))]),
        rule("concrete", vec![("material", text("concrete"))]),
        // Density and patterning
        rule("dense", vec![("panel_density", float(0.9))]),
        rule("sparse", vec![("panel_density", float(0.5))]),
        rule(
            "porous",
            vec![("panel_density", float(0.6)), ("panel_type", text("perforated"))],
        ),
        rule("pattern", vec![("panel_type", text("patterned"))]),
        rule("parametric", vec![("panel_type", text("parametric"))]),
        // Structure
        rule("lightweight", vec![("structural_system", text("lightweight"))]),
        rule(
            "modular",
            vec![("grid_size", float(1.2)), ("structural_system", text("modular"))],
        ),
        rule("prefab", vec![("structural_system", text("modular"))]),
    ]
}
