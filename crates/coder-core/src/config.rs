use crate::operator::Operator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model routing for a component: which model backs `default`/`quick`/
/// `heavy`/`parallel` requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub default: Option<String>,
    pub quick: Option<String>,
    pub heavy: Option<String>,
    pub parallel: Option<String>,
}

/// Typed configuration for one component (`coder`, `researcher`,
/// `secretary`). `operator_settings` is intentionally free-form: per-CLI
/// flags that do not warrant a dedicated field still round-trip through
/// config save/load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub operator: Operator,
    #[serde(default)]
    pub operator_settings: BTreeMap<String, String>,
    #[serde(default)]
    pub models: ModelsConfig,
}

/// The whole on-disk document: `config.json`.
///
/// Unknown top-level keys are rejected on save by `coder-config`; this
/// type only ever carries the components it knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub coder: Option<ComponentConfig>,
    pub researcher: Option<ComponentConfig>,
    pub secretary: Option<ComponentConfig>,
}
