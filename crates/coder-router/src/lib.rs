//! Pure task classification plus stateless operator selection.
//!
//! Neither `TaskAnalyzer` nor `Router` touch the filesystem beyond
//! checking which operator binaries are on `PATH` (via `coder-config`);
//! nothing here spawns a process or holds state across calls.

mod analyzer;
mod error;
mod router;

pub use analyzer::analyze;
pub use error::RouterError;

use coder_core::Operator;

/// The operators actually usable right now: their binary resolves on
/// `PATH` (or at a configured override path).
pub fn available_operators(bin_overrides: &std::collections::BTreeMap<Operator, String>) -> Vec<Operator> {
    Operator::ALL
        .into_iter()
        .filter(|op| {
            let override_path = bin_overrides.get(op).map(String::as_str);
            coder_config::operator_binary_available(*op, override_path)
        })
        .collect()
}

pub use router::select;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_operators_is_a_subset_of_all() {
        let available = available_operators(&Default::default());
        for op in &available {
            assert!(Operator::ALL.contains(op));
        }
    }
}
