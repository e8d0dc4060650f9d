use std::sync::Arc;

use crate::brief::resolver::KeywordResolver;
use crate::brief::script::ScriptGenerator;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Compiled once at startup from the rule catalog; read-only afterwards.
    pub resolver: Arc<KeywordResolver>,
    /// Pluggable script backend. Default: OutlineScriptGenerator.
    pub script_generator: Arc<dyn ScriptGenerator>,
}
