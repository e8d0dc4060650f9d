#![allow(dead_code)]

//! Keyword Resolver: maps a free-text brief to a `ParameterSet`.
//!
//! Two steps:
//! 1. Extraction: the lower-cased brief is scanned once per pattern group with
//!    a matcher compiled at construction time. Matches are non-overlapping,
//!    leftmost-first, kept in text order with duplicates.
//! 2. Derivation: starting from the catalog defaults, groups are walked in
//!    catalog order and their matches in text order; every match that has a
//!    rule overwrites the rule's keys. Last write wins.
//!
//! The resolver is immutable after construction and safe to share across
//! threads without locking.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::brief::catalog::{CatalogError, KeywordRule, RuleCatalog};
use crate::brief::params::ParameterSet;

/// Matches found for one pattern group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMatches {
    pub group: String,
    pub keywords: Vec<String>,
}

/// Extraction output. Only groups with at least one match appear, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeywordMatches(Vec<GroupMatches>);

impl KeywordMatches {
    pub fn iter(&self) -> impl Iterator<Item = &GroupMatches> {
        self.0.iter()
    }

    pub fn get(&self, group: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|m| m.group == group)
            .map(|m| m.keywords.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of matched keywords across all groups.
    pub fn total(&self) -> usize {
        self.0.iter().map(|m| m.keywords.len()).sum()
    }
}

/// Full resolver output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub keywords: KeywordMatches,
    pub parameters: ParameterSet,
    /// Parameter name → keyword whose rule wrote the final value.
    /// Parameters still at their default are absent.
    pub provenance: BTreeMap<String, String>,
}

struct GroupMatcher {
    name: String,
    matcher: Regex,
}

pub struct KeywordResolver {
    catalog: RuleCatalog,
    matchers: Vec<GroupMatcher>,
    /// Lower-cased keyword → index into `catalog.rules`.
    rule_index: HashMap<String, usize>,
}

impl KeywordResolver {
    /// Validates the catalog and compiles one matcher per pattern group.
    pub fn new(catalog: RuleCatalog) -> Result<Self, CatalogError> {
        catalog.validate()?;

        for keyword in catalog.unreachable_rules() {
            warn!("Rule keyword '{keyword}' is not recognized by any pattern group");
        }

        let matchers = catalog
            .groups
            .iter()
            .map(|group| {
                let alternation = group
                    .keywords
                    .iter()
                    .map(|k| regex::escape(&k.to_lowercase()))
                    .collect::<Vec<_>>()
                    .join("|");
                Regex::new(&format!("(?:{alternation})"))
                    .map(|matcher| GroupMatcher {
                        name: group.name.clone(),
                        matcher,
                    })
                    .map_err(|source| CatalogError::Matcher {
                        group: group.name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rule_index = catalog
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.keyword.to_lowercase(), i))
            .collect();

        Ok(Self {
            catalog,
            matchers,
            rule_index,
        })
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn defaults(&self) -> &ParameterSet {
        &self.catalog.defaults
    }

    fn rule_for(&self, keyword: &str) -> Option<&KeywordRule> {
        self.rule_index
            .get(keyword)
            .map(|&i| &self.catalog.rules[i])
    }

    /// Step 1: finds every recognized keyword in the brief, per group.
    pub fn extract(&self, brief: &str) -> KeywordMatches {
        let lowered = brief.to_lowercase();

        let groups = self
            .matchers
            .iter()
            .filter_map(|gm| {
                let keywords: Vec<String> = gm
                    .matcher
                    .find_iter(&lowered)
                    .map(|m| m.as_str().to_string())
                    .collect();
                (!keywords.is_empty()).then(|| GroupMatches {
                    group: gm.name.clone(),
                    keywords,
                })
            })
            .collect();

        KeywordMatches(groups)
    }

    /// Step 2: folds the rules of matched keywords onto the defaults.
    pub fn derive(&self, keywords: &KeywordMatches) -> (ParameterSet, BTreeMap<String, String>) {
        let mut parameters = self.catalog.defaults.clone();
        let mut provenance = BTreeMap::new();

        for group in keywords.iter() {
            for keyword in &group.keywords {
                let Some(rule) = self.rule_for(keyword) else {
                    continue;
                };
                for (name, value) in rule.overrides.iter() {
                    parameters.set(name, value.clone());
                    provenance.insert(name.to_string(), keyword.clone());
                }
            }
        }

        (parameters, provenance)
    }

    /// Extraction followed by derivation.
    pub fn resolve(&self, brief: &str) -> Resolution {
        let keywords = self.extract(brief);
        debug!(
            "Extracted {} keyword(s) across {} group(s)",
            keywords.total(),
            keywords.iter().count()
        );

        let (parameters, provenance) = self.derive(&keywords);
        debug!("Resolved {} parameter override(s)", provenance.len());

        Resolution {
            keywords,
            parameters,
            provenance,
        }
    }

    /// Convenience for callers that only need the parameters.
    pub fn resolve_parameters(&self, brief: &str) -> ParameterSet {
        self.resolve(brief).parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::catalog::PatternGroup;
    use crate::brief::params::ParamValue;

    fn resolver() -> KeywordResolver {
        KeywordResolver::new(RuleCatalog::builtin()).unwrap()
    }

    #[test]
    fn test_brief_without_keywords_returns_defaults() {
        let r = resolver();
        for brief in [
            "a quiet courtyard house for a family of four",
            "Something nice please",
            "",
            "1234 -- !!! ??",
            "超高层 🏙️",
        ] {
            let resolution = r.resolve(brief);
            assert!(resolution.keywords.is_empty(), "brief: {brief:?}");
            assert_eq!(&resolution.parameters, r.defaults(), "brief: {brief:?}");
            assert!(resolution.provenance.is_empty());
        }
    }

    #[test]
    fn test_tower_sets_story_count_density_and_form() {
        let r = resolver();
        for brief in [
            "tower",
            "a slender tower on the harbour front",
            "TOWER for a competition entry",
            "Twin towers, north and south",
        ] {
            let params = r.resolve_parameters(brief);
            assert_eq!(params.get("story_count"), Some(&ParamValue::Int(40)), "{brief}");
            assert_eq!(params.get("panel_density"), Some(&ParamValue::Float(0.85)), "{brief}");
            assert_eq!(params.get("form"), Some(&ParamValue::text("tower")), "{brief}");
        }
    }

    /// Both keywords live in `facade_type`; "static" appears later in the text
    /// so its rule is applied last.
    #[test]
    fn test_dynamic_and_static_last_match_wins() {
        let r = resolver();
        let resolution = r.resolve("a dynamic and static facade");

        assert_eq!(
            resolution.keywords.get("facade_type"),
            Some(&["dynamic".to_string(), "static".to_string()][..])
        );
        assert_eq!(
            resolution.parameters.get("responsive_panels"),
            Some(&ParamValue::Bool(false))
        );
        assert_eq!(
            resolution.parameters.get("panel_rotation_limit"),
            Some(&ParamValue::Int(0))
        );
        assert_eq!(resolution.provenance["responsive_panels"], "static");
        assert_eq!(resolution.provenance["panel_rotation_limit"], "static");
    }

    #[test]
    fn test_static_then_dynamic_flips_result() {
        let params = resolver().resolve_parameters("a static and dynamic facade");
        assert_eq!(params.get("responsive_panels"), Some(&ParamValue::Bool(true)));
        assert_eq!(params.get("panel_rotation_limit"), Some(&ParamValue::Int(60)));
    }

    /// Group order beats text order: "dense" (pattern group) is applied after
    /// "tower" (building_type group) even when it appears first.
    #[test]
    fn test_group_order_determines_precedence() {
        let resolution = resolver().resolve("dense tower");
        assert_eq!(
            resolution.parameters.get("panel_density"),
            Some(&ParamValue::Float(0.9))
        );
        assert_eq!(resolution.provenance["panel_density"], "dense");
        assert_eq!(resolution.provenance["story_count"], "tower");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let r = resolver();
        let brief = "A kinetic, solar-responsive high-rise with framing views and timber louvres";
        assert_eq!(r.resolve(brief), r.resolve(brief));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let r = resolver();
        let upper = r.resolve_parameters("HIGH-RISE");
        let title = r.resolve_parameters("High-Rise");
        let lower = r.resolve_parameters("high-rise");

        assert_eq!(upper, lower);
        assert_eq!(title, lower);
        assert_eq!(lower.get("story_count"), Some(&ParamValue::Int(30)));
        assert_eq!(lower.get("panel_density"), Some(&ParamValue::Float(0.9)));
    }

    #[test]
    fn test_duplicates_preserved_in_text_order() {
        let resolution = resolver().resolve("glass, then wood, then glass again");
        assert_eq!(
            resolution.keywords.get("materials"),
            Some(&["glass".to_string(), "wood".to_string(), "glass".to_string()][..])
        );
        assert_eq!(
            resolution.parameters.get("material"),
            Some(&ParamValue::text("glass"))
        );
    }

    #[test]
    fn test_framing_views_matched_as_phrase() {
        let resolution = resolver().resolve("framing views of the bay");
        assert_eq!(
            resolution.keywords.get("views"),
            Some(&["framing views".to_string()][..])
        );
        assert_eq!(
            resolution.parameters.get("view_priority"),
            Some(&ParamValue::Float(0.95))
        );
        assert_eq!(
            resolution.parameters.get("panel_density"),
            Some(&ParamValue::Float(0.7))
        );
    }

    #[test]
    fn test_matching_is_substring_based() {
        let resolution = resolver().resolve("incorporate client reviews");
        assert_eq!(
            resolution.keywords.get("views"),
            Some(&["views".to_string()][..])
        );
    }

    #[test]
    fn test_keyword_without_rule_is_ignored() {
        let r = resolver();
        let resolution = r.resolve("an office building in a hot climate");
        assert_eq!(
            resolution.keywords.get("building_type"),
            Some(&["building".to_string()][..])
        );
        assert_eq!(
            resolution.keywords.get("environment"),
            Some(&["climate".to_string()][..])
        );
        assert_eq!(&resolution.parameters, r.defaults());
    }

    #[test]
    fn test_groups_reported_in_catalog_order() {
        let resolution = resolver().resolve("modular concrete tower");
        let groups: Vec<&str> = resolution.keywords.iter().map(|m| m.group.as_str()).collect();
        assert_eq!(groups, vec!["building_type", "materials", "structure"]);
        assert_eq!(resolution.keywords.total(), 3);
    }

    #[test]
    fn test_custom_catalog_keywords_are_lowercased() {
        let mut catalog = RuleCatalog::builtin();
        catalog.groups.push(PatternGroup {
            name: "acoustics".to_string(),
            keywords: vec!["Quiet".to_string(), "a+b".to_string()],
        });
        let r = KeywordResolver::new(catalog).unwrap();

        let resolution = r.resolve("a QUIET room, a+b layout");
        assert_eq!(
            resolution.keywords.get("acoustics"),
            Some(&["quiet".to_string(), "a+b".to_string()][..])
        );
    }

    #[test]
    fn test_invalid_catalog_rejected() {
        let mut catalog = RuleCatalog::builtin();
        catalog.groups[0].keywords.clear();
        assert!(matches!(
            KeywordResolver::new(catalog),
            Err(CatalogError::EmptyGroup(_))
        ));
    }

    #[test]
    fn test_resolver_shared_across_threads() {
        let r = std::sync::Arc::new(resolver());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let r = r.clone();
                std::thread::spawn(move || r.resolve_parameters("a kinetic tower"))
            })
            .collect();
        let results: Vec<ParameterSet> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }
}
