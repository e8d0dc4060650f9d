//! Script generation: pluggable, trait-based rendering of an operation plan
//! into script text for a CAD scripting surface.
//!
//! Default: `OutlineScriptGenerator` (value substitution only, deterministic).
//! `AppState` holds an `Arc<dyn ScriptGenerator>`, so a host-specific
//! generator can be swapped in without touching the handlers.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::brief::domain::DesignDomain;
use crate::brief::operations::Operation;

/// The two script outputs carried by every interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptSurface {
    /// Imperative script: one call per operation.
    Rhino,
    /// Component script: declared inputs plus a single output.
    Grasshopper,
}

impl ScriptSurface {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScriptSurface::Rhino => "rhino",
            ScriptSurface::Grasshopper => "grasshopper",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("no operations to render for the {0} surface")]
    NoOperations(&'static str),
}

/// Implement this to target a different scripting host.
pub trait ScriptGenerator: Send + Sync {
    /// Backend identifier, logged with each interpretation.
    fn name(&self) -> &'static str;

    fn render(
        &self,
        surface: ScriptSurface,
        domain: DesignDomain,
        operations: &[Operation],
    ) -> Result<String, ScriptError>;
}

/// Renders operations as Python-flavoured outline scripts.
pub struct OutlineScriptGenerator;

impl ScriptGenerator for OutlineScriptGenerator {
    fn name(&self) -> &'static str {
        "outline"
    }

    fn render(
        &self,
        surface: ScriptSurface,
        domain: DesignDomain,
        operations: &[Operation],
    ) -> Result<String, ScriptError> {
        if operations.is_empty() {
            return Err(ScriptError::NoOperations(surface.as_str()));
        }

        Ok(match surface {
            ScriptSurface::Rhino => render_calls(domain, operations),
            ScriptSurface::Grasshopper => render_component(domain, operations),
        })
    }
}

fn render_calls(domain: DesignDomain, operations: &[Operation]) -> String {
    let mut script = String::new();
    script.push_str(&format!("# Atelier {domain} design script\n"));
    script.push_str(&format!("# Operations: {}\n\n", operations.len()));

    for op in operations {
        let args = op
            .params
            .iter()
            .map(|(k, v)| format!("{k}={}", python_literal(v)))
            .collect::<Vec<_>>()
            .join(", ");
        script.push_str(&format!("{}({args})\n", op.operation.as_str()));
    }

    script.push_str("\nprint(\"Design generated successfully\")\n");
    script
}

fn render_component(domain: DesignDomain, operations: &[Operation]) -> String {
    // Later operations overwrite earlier ones on shared keys.
    let mut inputs: BTreeMap<&str, &Value> = BTreeMap::new();
    for op in operations {
        for (k, v) in &op.params {
            inputs.insert(k.as_str(), v);
        }
    }

    let mut script = String::new();
    script.push_str(&format!("# Atelier parametric {domain} design generator\n"));
    script.push_str("# Input parameters\n\n");
    for (name, value) in inputs {
        script.push_str(&format!("{name} = {}\n", python_literal(value)));
    }
    script.push_str(&format!(
        "\noutput = \"{domain} design generation complete\"\n"
    ));
    script
}

/// Formats a JSON value as a Python literal.
fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}")),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(python_literal).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(k, v)| {
                    let key = python_literal(&Value::String(k.clone()));
                    format!("{key}: {}", python_literal(v))
                })
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::catalog::RuleCatalog;
    use crate::brief::operations::plan_operations;
    use crate::brief::resolver::KeywordResolver;
    use serde_json::json;

    fn facade_ops(brief: &str) -> Vec<Operation> {
        let params = KeywordResolver::new(RuleCatalog::builtin())
            .unwrap()
            .resolve_parameters(brief);
        plan_operations(&params, DesignDomain::Facade).unwrap()
    }

    #[test]
    fn test_rhino_script_has_one_call_per_operation() {
        let ops = facade_ops("a kinetic tower");
        let script = OutlineScriptGenerator
            .render(ScriptSurface::Rhino, DesignDomain::Facade, &ops)
            .unwrap();

        assert!(script.starts_with("# Atelier facade design script\n"));
        for op in &ops {
            assert!(
                script.contains(&format!("{}(", op.operation.as_str())),
                "missing call for {}",
                op.operation.as_str()
            );
        }
        assert!(script.contains(
            "generate_panel_rotations(rotation_limit=90, sun_priority=0.8, view_priority=0.7)"
        ));
        assert!(script.contains("add_metadata=True"));
    }

    #[test]
    fn test_grasshopper_script_declares_each_input_once() {
        let ops = facade_ops("timber louvres");
        let script = OutlineScriptGenerator
            .render(ScriptSurface::Grasshopper, DesignDomain::Facade, &ops)
            .unwrap();

        assert_eq!(script.matches("\nmaterial = ").count(), 1);
        assert!(script.contains("panel_type = \"louvre\"\n"));
        assert!(script.contains("responsive_panels = True\n"));
        assert!(script.ends_with("output = \"facade design generation complete\"\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let ops = facade_ops("adaptive sunshade with framing views");
        for surface in [ScriptSurface::Rhino, ScriptSurface::Grasshopper] {
            let a = OutlineScriptGenerator
                .render(surface, DesignDomain::Facade, &ops)
                .unwrap();
            let b = OutlineScriptGenerator
                .render(surface, DesignDomain::Facade, &ops)
                .unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_empty_operations_rejected() {
        let err = OutlineScriptGenerator
            .render(ScriptSurface::Grasshopper, DesignDomain::Urban, &[])
            .unwrap_err();
        assert_eq!(err, ScriptError::NoOperations("grasshopper"));
    }

    #[test]
    fn test_python_literal_formats() {
        assert_eq!(python_literal(&json!(null)), "None");
        assert_eq!(python_literal(&json!(false)), "False");
        assert_eq!(python_literal(&json!(1.0)), "1.0");
        assert_eq!(python_literal(&json!("say \"hi\"")), r#""say \"hi\"""#);
        assert_eq!(python_literal(&json!(["trees", 2])), r#"["trees", 2]"#);
        assert_eq!(python_literal(&json!({"a": true})), r#"{"a": True}"#);
    }
}
