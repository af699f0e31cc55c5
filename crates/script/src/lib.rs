//! Output script classification.

pub mod standard;

pub use standard::{classify_script_pubkey, solve_script_pubkey, ScriptSolution, ScriptType};
