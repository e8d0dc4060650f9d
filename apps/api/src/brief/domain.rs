#![allow(dead_code)]

//! Design domains: the kind of design an operation plan targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::brief::params::{ParamValue, ParameterSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignDomain {
    #[default]
    Facade,
    FloorPlan,
    Urban,
    Landscape,
    Structure,
    ParametricForm,
}

impl DesignDomain {
    pub const ALL: [DesignDomain; 6] = [
        DesignDomain::Facade,
        DesignDomain::FloorPlan,
        DesignDomain::Urban,
        DesignDomain::Landscape,
        DesignDomain::Structure,
        DesignDomain::ParametricForm,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            DesignDomain::Facade => "facade",
            DesignDomain::FloorPlan => "floor_plan",
            DesignDomain::Urban => "urban",
            DesignDomain::Landscape => "landscape",
            DesignDomain::Structure => "structure",
            DesignDomain::ParametricForm => "parametric_form",
        }
    }

    /// Parameters the operation plan for this domain needs beyond the resolver
    /// defaults. Resolved parameters are layered on top, so a catalog that
    /// defines any of these keys takes precedence.
    pub fn supplementary_defaults(&self) -> ParameterSet {
        let mut params: Vec<(&str, ParamValue)> =
            vec![("color_scheme", ParamValue::text("monochrome"))];

        params.extend(match self {
            DesignDomain::Facade => vec![],
            DesignDomain::FloorPlan => vec![
                ("floor_area", ParamValue::Float(200.0)),
                ("program_type", ParamValue::text("residential")),
                ("room_count", ParamValue::Int(6)),
                ("open_plan", ParamValue::Bool(false)),
                ("corridor_width", ParamValue::Float(1.5)),
                ("room_division", ParamValue::text("grid")),
            ],
            DesignDomain::Urban => vec![
                ("block_size", ParamValue::Float(100.0)),
                ("street_width", ParamValue::Float(15.0)),
                ("building_coverage", ParamValue::Float(0.6)),
                ("density", ParamValue::Float(0.7)),
                ("building_height_avg", ParamValue::Float(20.0)),
                ("mixed_use", ParamValue::Bool(true)),
            ],
            DesignDomain::Landscape => vec![
                ("terrain_complexity", ParamValue::Float(0.5)),
                ("topography_variation", ParamValue::Float(2.0)),
                ("path_complexity", ParamValue::Float(0.5)),
                ("vegetation_density", ParamValue::Float(0.6)),
                ("water_features", ParamValue::Bool(true)),
            ],
            DesignDomain::Structure => vec![
                ("structural_grid", ParamValue::Float(8.0)),
                ("column_dimensions", ParamValue::Float(0.4)),
                ("structural_material", ParamValue::text("concrete")),
                ("beam_depth", ParamValue::Float(0.6)),
            ],
            DesignDomain::ParametricForm => vec![
                ("subdivision_level", ParamValue::Int(2)),
                ("attractor_points", ParamValue::Int(3)),
                ("iterations", ParamValue::Int(10)),
                ("complexity", ParamValue::Float(0.5)),
                ("symmetry", ParamValue::text("none")),
            ],
        });

        params.into_iter().collect()
    }
}

impl fmt::Display for DesignDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown design domain '{0}'")]
pub struct UnknownDomain(pub String);

impl FromStr for DesignDomain {
    type Err = UnknownDomain;

    /// Accepts canonical names plus the long-form aliases briefs tend to use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "facade" => Ok(DesignDomain::Facade),
            "floor_plan" | "floor plan" | "floor layout" => Ok(DesignDomain::FloorPlan),
            "urban" | "urban design" => Ok(DesignDomain::Urban),
            "landscape" | "landscape design" => Ok(DesignDomain::Landscape),
            "structure" | "structural" => Ok(DesignDomain::Structure),
            "parametric_form" | "parametric form" | "form" => Ok(DesignDomain::ParametricForm),
            _ => Err(UnknownDomain(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        for domain in DesignDomain::ALL {
            assert_eq!(domain.as_str().parse::<DesignDomain>(), Ok(domain));
        }
    }

    #[test]
    fn test_parse_aliases_case_insensitive() {
        assert_eq!("Floor Layout".parse::<DesignDomain>(), Ok(DesignDomain::FloorPlan));
        assert_eq!("urban design".parse::<DesignDomain>(), Ok(DesignDomain::Urban));
        assert_eq!(" STRUCTURAL ".parse::<DesignDomain>(), Ok(DesignDomain::Structure));
        assert_eq!("form".parse::<DesignDomain>(), Ok(DesignDomain::ParametricForm));
        assert_eq!("Landscape Design".parse::<DesignDomain>(), Ok(DesignDomain::Landscape));
    }

    #[test]
    fn test_parse_unknown_domain() {
        let err = "interior".parse::<DesignDomain>().unwrap_err();
        assert_eq!(err.to_string(), "unknown design domain 'interior'");
    }

    #[test]
    fn test_default_is_facade() {
        assert_eq!(DesignDomain::default(), DesignDomain::Facade);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&DesignDomain::ParametricForm).unwrap();
        assert_eq!(json, r#""parametric_form""#);
    }

    #[test]
    fn test_every_domain_supplies_color_scheme() {
        for domain in DesignDomain::ALL {
            assert!(domain.supplementary_defaults().contains("color_scheme"));
        }
    }
}
