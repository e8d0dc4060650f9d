//! Operation Planner: expands resolved parameters into the ordered list of
//! named design operations for one domain.
//!
//! Every plan is bracketed by `initialize_design` and `finalize_design`.
//! Optional steps (panel rotations, partitions, water features, symmetry) are
//! included only when the corresponding parameter enables them.

use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::brief::domain::DesignDomain;
use crate::brief::params::{ParamValue, ParameterSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    InitializeDesign,
    FinalizeDesign,
    // Facade
    CreateBuildingEnvelope,
    CreateFacadeSystem,
    AnalyzeSunAngles,
    AnalyzeViewCorridors,
    GeneratePanelRotations,
    GenerateFacadeGeometry,
    // Floor plan
    CreateFloorBoundary,
    GenerateProgramZones,
    CreateCirculation,
    CreatePartitions,
    PlaceFurniture,
    // Urban
    CreateSiteBoundary,
    GenerateStreetNetwork,
    CreateBuildingFootprints,
    GenerateBuildingMassing,
    AddPublicSpaces,
    // Landscape
    CreateTerrain,
    GeneratePathNetwork,
    AddVegetation,
    AddWaterFeatures,
    AddSiteFurniture,
    // Structure
    CreateStructuralGrid,
    GenerateColumns,
    GenerateBeams,
    GenerateFloorSlabs,
    CreateLateralSystem,
    // Parametric form
    CreateBaseGeometry,
    ApplySubdivision,
    CreateAttractors,
    ApplyDeformation,
    ApplySymmetry,
}

impl OperationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OperationKind::InitializeDesign => "initialize_design",
            OperationKind::FinalizeDesign => "finalize_design",
            OperationKind::CreateBuildingEnvelope => "create_building_envelope",
            OperationKind::CreateFacadeSystem => "create_facade_system",
            OperationKind::AnalyzeSunAngles => "analyze_sun_angles",
            OperationKind::AnalyzeViewCorridors => "analyze_view_corridors",
            OperationKind::GeneratePanelRotations => "generate_panel_rotations",
            OperationKind::GenerateFacadeGeometry => "generate_facade_geometry",
            OperationKind::CreateFloorBoundary => "create_floor_boundary",
            OperationKind::GenerateProgramZones => "generate_program_zones",
            OperationKind::CreateCirculation => "create_circulation",
            OperationKind::CreatePartitions => "create_partitions",
            OperationKind::PlaceFurniture => "place_furniture",
            OperationKind::CreateSiteBoundary => "create_site_boundary",
            OperationKind::GenerateStreetNetwork => "generate_street_network",
            OperationKind::CreateBuildingFootprints => "create_building_footprints",
            OperationKind::GenerateBuildingMassing => "generate_building_massing",
            OperationKind::AddPublicSpaces => "add_public_spaces",
            OperationKind::CreateTerrain => "create_terrain",
            OperationKind::GeneratePathNetwork => "generate_path_network",
            OperationKind::AddVegetation => "add_vegetation",
            OperationKind::AddWaterFeatures => "add_water_features",
            OperationKind::AddSiteFurniture => "add_site_furniture",
            OperationKind::CreateStructuralGrid => "create_structural_grid",
            OperationKind::GenerateColumns => "generate_columns",
            OperationKind::GenerateBeams => "generate_beams",
            OperationKind::GenerateFloorSlabs => "generate_floor_slabs",
            OperationKind::CreateLateralSystem => "create_lateral_system",
            OperationKind::CreateBaseGeometry => "create_base_geometry",
            OperationKind::ApplySubdivision => "apply_subdivision",
            OperationKind::CreateAttractors => "create_attractors",
            OperationKind::ApplyDeformation => "apply_deformation",
            OperationKind::ApplySymmetry => "apply_symmetry",
        }
    }
}

/// A single named step with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub operation: OperationKind,
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("missing parameter '{0}'")]
    MissingParameter(String),

    #[error("parameter '{name}' must be {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Typed read access over the effective parameter set.
struct Inputs<'a>(&'a ParameterSet);

impl Inputs<'_> {
    fn raw(&self, name: &str) -> Result<&ParamValue, PlanError> {
        self.0
            .get(name)
            .ok_or_else(|| PlanError::MissingParameter(name.to_string()))
    }

    fn value(&self, name: &str) -> Result<Value, PlanError> {
        self.raw(name).map(Value::from)
    }

    fn number(&self, name: &str) -> Result<f64, PlanError> {
        let raw = self.raw(name)?;
        raw.as_f64().ok_or_else(|| mismatch(name, "a number", raw))
    }

    fn flag(&self, name: &str) -> Result<bool, PlanError> {
        let raw = self.raw(name)?;
        raw.as_bool().ok_or_else(|| mismatch(name, "a boolean", raw))
    }

    fn text(&self, name: &str) -> Result<&str, PlanError> {
        let raw = self.raw(name)?;
        raw.as_str().ok_or_else(|| mismatch(name, "a string", raw))
    }
}

fn mismatch(name: &str, expected: &'static str, found: &ParamValue) -> PlanError {
    PlanError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

fn op<const N: usize>(operation: OperationKind, params: [(&str, Value); N]) -> Operation {
    Operation {
        operation,
        params: params
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    }
}

/// Builds the operation plan for `domain` from resolved parameters.
///
/// The domain's supplementary defaults sit underneath `parameters`; resolved
/// values always win.
pub fn plan_operations(
    parameters: &ParameterSet,
    domain: DesignDomain,
) -> Result<Vec<Operation>, PlanError> {
    let effective = parameters.layered_over(&domain.supplementary_defaults());
    let p = Inputs(&effective);

    let mut operations = vec![op(
        OperationKind::InitializeDesign,
        [
            ("design_domain", json!(domain.as_str())),
            ("grid_size", p.value("grid_size")?),
            ("material", p.value("material")?),
            ("color_scheme", p.value("color_scheme")?),
        ],
    )];

    operations.extend(match domain {
        DesignDomain::Facade => facade_operations(&p, &effective)?,
        DesignDomain::FloorPlan => floor_plan_operations(&p)?,
        DesignDomain::Urban => urban_operations(&p)?,
        DesignDomain::Landscape => landscape_operations(&p)?,
        DesignDomain::Structure => structure_operations(&p)?,
        DesignDomain::ParametricForm => parametric_form_operations(&p)?,
    });

    operations.push(op(
        OperationKind::FinalizeDesign,
        [
            ("design_domain", json!(domain.as_str())),
            ("export_format", json!("3dm")),
            ("add_metadata", json!(true)),
        ],
    ));

    Ok(operations)
}

fn facade_operations(p: &Inputs, effective: &ParameterSet) -> Result<Vec<Operation>, PlanError> {
    let mut ops = vec![
        op(
            OperationKind::CreateBuildingEnvelope,
            [
                ("story_count", p.value("story_count")?),
                ("floor_height", p.value("floor_height")?),
                ("grid_size", p.value("grid_size")?),
            ],
        ),
        op(
            OperationKind::CreateFacadeSystem,
            [
                ("offset", p.value("facade_offset")?),
                ("panel_type", p.value("panel_type")?),
                ("panel_density", p.value("panel_density")?),
                ("material", p.value("material")?),
                ("structural_system", p.value("structural_system")?),
            ],
        ),
    ];

    if p.flag("responsive_panels")? {
        ops.push(op(
            OperationKind::AnalyzeSunAngles,
            [("priority", p.value("sun_priority")?)],
        ));
        ops.push(op(
            OperationKind::AnalyzeViewCorridors,
            [("priority", p.value("view_priority")?)],
        ));
        ops.push(op(
            OperationKind::GeneratePanelRotations,
            [
                ("rotation_limit", p.value("panel_rotation_limit")?),
                ("sun_priority", p.value("sun_priority")?),
                ("view_priority", p.value("view_priority")?),
            ],
        ));
    }

    ops.push(Operation {
        operation: OperationKind::GenerateFacadeGeometry,
        params: effective.to_json(),
    });

    Ok(ops)
}

fn floor_plan_operations(p: &Inputs) -> Result<Vec<Operation>, PlanError> {
    let mut ops = vec![
        op(
            OperationKind::CreateFloorBoundary,
            [
                ("area", p.value("floor_area")?),
                ("proportions", json!("rectangular")),
            ],
        ),
        op(
            OperationKind::GenerateProgramZones,
            [
                ("program_type", p.value("program_type")?),
                ("room_count", p.value("room_count")?),
                ("open_plan", p.value("open_plan")?),
            ],
        ),
        op(
            OperationKind::CreateCirculation,
            [
                ("corridor_width", p.value("corridor_width")?),
                ("room_division", p.value("room_division")?),
            ],
        ),
    ];

    if !p.flag("open_plan")? {
        ops.push(op(
            OperationKind::CreatePartitions,
            [
                ("room_division", p.value("room_division")?),
                ("room_count", p.value("room_count")?),
            ],
        ));
    }

    ops.push(op(
        OperationKind::PlaceFurniture,
        [
            ("program_type", p.value("program_type")?),
            ("density", json!(0.7)),
        ],
    ));

    Ok(ops)
}

fn urban_operations(p: &Inputs) -> Result<Vec<Operation>, PlanError> {
    let block_size = p.number("block_size")?;

    Ok(vec![
        op(
            OperationKind::CreateSiteBoundary,
            [
                ("site_area", json!(block_size * block_size * 4.0)),
                ("site_proportions", json!("rectangular")),
            ],
        ),
        op(
            OperationKind::GenerateStreetNetwork,
            [
                ("block_size", p.value("block_size")?),
                ("street_width", p.value("street_width")?),
                ("network_type", json!("grid")),
            ],
        ),
        op(
            OperationKind::CreateBuildingFootprints,
            [
                ("coverage", p.value("building_coverage")?),
                ("density", p.value("density")?),
            ],
        ),
        op(
            OperationKind::GenerateBuildingMassing,
            [
                ("height_avg", p.value("building_height_avg")?),
                ("height_variation", json!(0.3)),
                ("mixed_use", p.value("mixed_use")?),
            ],
        ),
        op(
            OperationKind::AddPublicSpaces,
            [("ratio", json!(0.2)), ("distribution", json!("central"))],
        ),
    ])
}

fn landscape_operations(p: &Inputs) -> Result<Vec<Operation>, PlanError> {
    let mut ops = vec![
        op(
            OperationKind::CreateTerrain,
            [
                ("area", json!(10000)),
                ("complexity", p.value("terrain_complexity")?),
                ("height_variation", p.value("topography_variation")?),
            ],
        ),
        op(
            OperationKind::GeneratePathNetwork,
            [
                ("complexity", p.value("path_complexity")?),
                ("path_width", json!(2.0)),
            ],
        ),
        op(
            OperationKind::AddVegetation,
            [
                ("density", p.value("vegetation_density")?),
                ("types", json!(["trees", "shrubs", "ground_cover"])),
            ],
        ),
    ];

    if p.flag("water_features")? {
        ops.push(op(
            OperationKind::AddWaterFeatures,
            [("type", json!("pond")), ("area_ratio", json!(0.15))],
        ));
    }

    ops.push(op(OperationKind::AddSiteFurniture, [("density", json!(0.5))]));

    Ok(ops)
}

fn structure_operations(p: &Inputs) -> Result<Vec<Operation>, PlanError> {
    let material = p.value("structural_material")?;

    Ok(vec![
        op(
            OperationKind::CreateStructuralGrid,
            [
                ("grid_size", p.value("structural_grid")?),
                ("system_type", p.value("structural_system")?),
            ],
        ),
        op(
            OperationKind::GenerateColumns,
            [
                ("dimensions", p.value("column_dimensions")?),
                ("material", material.clone()),
            ],
        ),
        op(
            OperationKind::GenerateBeams,
            [
                ("depth", p.value("beam_depth")?),
                ("material", material.clone()),
            ],
        ),
        op(
            OperationKind::GenerateFloorSlabs,
            [("thickness", json!(0.2)), ("material", material.clone())],
        ),
        op(
            OperationKind::CreateLateralSystem,
            [("type", json!("bracing")), ("material", material)],
        ),
    ])
}

fn parametric_form_operations(p: &Inputs) -> Result<Vec<Operation>, PlanError> {
    let mut ops = vec![
        op(
            OperationKind::CreateBaseGeometry,
            [("type", json!("box")), ("dimensions", json!([10, 10, 10]))],
        ),
        op(
            OperationKind::ApplySubdivision,
            [
                ("level", p.value("subdivision_level")?),
                ("method", json!("catmull-clark")),
            ],
        ),
        op(
            OperationKind::CreateAttractors,
            [
                ("count", p.value("attractor_points")?),
                ("influence", json!(0.7)),
            ],
        ),
        op(
            OperationKind::ApplyDeformation,
            [
                ("iterations", p.value("iterations")?),
                ("strength", p.value("complexity")?),
            ],
        ),
    ];

    let symmetry = p.text("symmetry")?;
    if symmetry != "none" {
        ops.push(op(
            OperationKind::ApplySymmetry,
            [("type", json!(symmetry)), ("preserve_original", json!(true))],
        ));
    }

    Ok(ops)
}
