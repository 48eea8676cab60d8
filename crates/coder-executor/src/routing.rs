use crate::error::ExecutorError;
use crate::PlanExecutor;
use coder_core::{ComponentConfig, ModelsConfig, Operator};
use coder_strategy::{CliStrategy, ExecutionMode};
use std::collections::BTreeMap;

/// `coder`'s configured component if set, otherwise a reasonable default
/// (Aider, the lightest-weight operator) so a fresh install with no
/// `config.json` can still run a quick task.
fn default_component() -> ComponentConfig {
    ComponentConfig {
        operator: Operator::Aider,
        operator_settings: BTreeMap::new(),
        models: ModelsConfig::default(),
    }
}

/// `NINJA_CODE_BIN`: a single override applied to whichever operator the
/// router ends up selecting, not tied to one specific CLI. Tests use this
/// to substitute a fake script for whatever operator gets chosen without
/// needing a real Aider/OpenCode/Gemini/Claude binary on `PATH`.
fn bin_override_from_env() -> Option<String> {
    std::env::var("NINJA_CODE_BIN").ok()
}

/// Resolve which operator runs this request, build its cached strategy,
/// and return the effective component config alongside it.
pub fn resolve(
    executor: &PlanExecutor,
    task: &str,
    context_paths: &[String],
) -> Result<(CliStrategy, ComponentConfig, Option<String>), ExecutorError> {
    let doc = executor.config_store().load()?;
    let component = doc.coder.unwrap_or_else(default_component);
    let bin_override = bin_override_from_env();

    let mut bin_overrides = BTreeMap::new();
    if let Some(bin) = &bin_override {
        for operator in Operator::ALL {
            bin_overrides.insert(operator, bin.clone());
        }
    }
    let available = coder_router::available_operators(&bin_overrides);

    let analysis = coder_router::analyze(task, context_paths);
    let preferred = executor.preferred_operator().or(Some(component.operator));
    let chosen = coder_router::select(&analysis, preferred, &available)?;

    let effective = ComponentConfig {
        operator: chosen,
        operator_settings: component.operator_settings,
        models: component.models,
    };
    let strategy = executor.cache().get_or_build(&effective, bin_override.as_deref());
    Ok((strategy, effective, bin_override))
}

/// Pick the model for `mode`: an explicit per-request override always
/// wins; otherwise fall back through the component's per-mode model
/// fields to its general default.
pub fn resolve_model(models: &ModelsConfig, mode: ExecutionMode, requested: Option<&str>) -> Option<String> {
    if let Some(requested) = requested {
        return Some(requested.to_string());
    }
    match mode {
        ExecutionMode::Quick => models.quick.clone().or_else(|| models.default.clone()),
        ExecutionMode::Sequential => models.default.clone().or_else(|| models.heavy.clone()),
        ExecutionMode::Parallel => models.parallel.clone().or_else(|| models.default.clone()),
    }
}
