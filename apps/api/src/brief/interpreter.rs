//! Brief interpretation: orchestrates the full pipeline.
//!
//! Flow: resolve (keywords → parameters) → plan operations for the domain →
//!       render both script surfaces → assemble the interpretation record.
//!
//! Resolution cannot fail. Any failure after it is wrapped in a
//! `GenerationError` that carries the original brief; nothing is retried.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::brief::domain::DesignDomain;
use crate::brief::operations::{plan_operations, Operation, PlanError};
use crate::brief::params::ParameterSet;
use crate::brief::resolver::{KeywordMatches, KeywordResolver};
use crate::brief::script::{ScriptError, ScriptGenerator, ScriptSurface};

#[derive(Debug, Clone, Serialize)]
pub struct Interpretation {
    pub keywords: KeywordMatches,
    pub parameters: ParameterSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCode {
    pub rhino: String,
    pub grasshopper: String,
}

/// The structured record returned for a brief.
#[derive(Debug, Clone, Serialize)]
pub struct BriefInterpretation {
    pub brief: String,
    pub domain: DesignDomain,
    pub interpretation: Interpretation,
    pub operations: Vec<Operation>,
    pub code: GeneratedCode,
}

#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error("operation planning failed: {0}")]
    Plan(#[from] PlanError),

    #[error("script rendering failed: {0}")]
    Script(#[from] ScriptError),
}

/// A downstream failure, reported together with the brief that caused it.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct GenerationError {
    pub brief: String,
    #[source]
    pub source: GenerationFailure,
}

/// Runs the full interpretation pipeline for one brief.
pub fn interpret_brief(
    brief: &str,
    domain: DesignDomain,
    resolver: &KeywordResolver,
    generator: &dyn ScriptGenerator,
) -> Result<BriefInterpretation, GenerationError> {
    info!(
        "Interpreting design brief ({} chars) for domain {domain}",
        brief.chars().count()
    );

    let resolution = resolver.resolve(brief);
    debug!("Extracted keywords: {:?}", resolution.keywords);

    let generated = plan_and_render(&resolution.parameters, domain, generator);
    let (operations, code) = generated.map_err(|source| {
        error!("Error interpreting design brief: {source}");
        GenerationError {
            brief: brief.to_string(),
            source,
        }
    })?;

    debug!(
        "Generated {} operations with the {} script generator",
        operations.len(),
        generator.name()
    );

    Ok(BriefInterpretation {
        brief: brief.to_string(),
        domain,
        interpretation: Interpretation {
            keywords: resolution.keywords,
            parameters: resolution.parameters,
        },
        operations,
        code,
    })
}

fn plan_and_render(
    parameters: &ParameterSet,
    domain: DesignDomain,
    generator: &dyn ScriptGenerator,
) -> Result<(Vec<Operation>, GeneratedCode), GenerationFailure> {
    let operations = plan_operations(parameters, domain)?;
    let rhino = generator.render(ScriptSurface::Rhino, domain, &operations)?;
    let grasshopper = generator.render(ScriptSurface::Grasshopper, domain, &operations)?;
    Ok((operations, GeneratedCode { rhino, grasshopper }))
}
