//! Tool implementations with no direct `coder-executor` counterpart.
//! Everything routed through a CLI strategy lives in `coder-executor`
//! instead; these two shell straight out to host tools (`sh`, `git`).

pub mod apply_patch;
pub mod run_tests;
