use coder_core::{ComponentConfig, Operator};
use coder_strategy::CliStrategy;
use sha2::{Digest, Sha256};
use std::sync::Mutex;

/// Digest over every config field that changes which `CliStrategy` is
/// correct to hand out. Two `ComponentConfig`s (plus the active
/// `bin_override` and the live `NINJA_*` timeout overrides) that hash
/// equal are, for routing purposes, the same strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn compute(component: &ComponentConfig, bin_override: Option<&str>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(component.operator.as_str().as_bytes());
        for (key, value) in &component.operator_settings {
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\0");
        }
        for model in [
            &component.models.default,
            &component.models.quick,
            &component.models.heavy,
            &component.models.parallel,
        ] {
            hasher.update(model.as_deref().unwrap_or("").as_bytes());
            hasher.update(b"\0");
        }
        hasher.update(bin_override.unwrap_or("").as_bytes());
        hasher.update(b"\0");
        for operator in Operator::ALL {
            let var = coder_strategy::env_override_var(operator);
            let value = std::env::var(&var).unwrap_or_default();
            hasher.update(var.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\0");
        }
        Self(format!("{:x}", hasher.finalize()))
    }
}

/// Single-slot strategy cache: at most one live `Strategy` per CLI, and
/// a hash mismatch replaces the slot wholesale rather than patching the
/// cached strategy in place. Stale strategies are discarded, not
/// mutated.
#[derive(Default)]
pub struct StrategyCache {
    slot: Mutex<Option<(CacheKey, CliStrategy)>>,
}

impl StrategyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the hash from `component`/`bin_override` and the live
    /// environment; return the cached strategy if the hash is unchanged,
    /// otherwise build and cache a fresh one.
    pub fn get_or_build(&self, component: &ComponentConfig, bin_override: Option<&str>) -> CliStrategy {
        let key = CacheKey::compute(component, bin_override);
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some((cached_key, strategy)) = slot.as_ref() {
            if *cached_key == key {
                return *strategy;
            }
        }
        let strategy = CliStrategy::new(component.operator);
        *slot = Some((key, strategy));
        strategy
    }
}
