// contract-fuzz/src/mutators/mod.rs
//! Mutators used by the random fuzzing loop

pub mod builtin;
pub mod custom;

use std::path::Path;

use log::info;
use rand::RngCore;
use serde_json::Value;

pub use builtin::builtin_mutators;
pub use custom::{load_custom_mutators, CustomMutator, CustomMutatorConfig, CustomMutatorKind};

/// Trait for mutating one field of a JSON payload
pub trait Mutator: Send + Sync {
    /// Name shown in scenario descriptions
    fn name(&self) -> &str;

    /// Return a mutated copy of `payload`; the input is never modified
    fn mutate(&self, payload: &Value, field: &str, rng: &mut dyn RngCore) -> Value;
}

/// Mutators for a run: custom ones when a folder is configured, built-ins otherwise
pub fn resolve_mutators(folder: Option<&Path>) -> Vec<Box<dyn Mutator>> {
    match folder {
        Some(folder) => {
            let mutators: Vec<Box<dyn Mutator>> = load_custom_mutators(folder)
                .into_iter()
                .map(|mutator| Box::new(mutator) as Box<dyn Mutator>)
                .collect();
            info!("Loaded {} custom mutators from {}", mutators.len(), folder.display());
            mutators
        }
        None => builtin_mutators(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_without_folder_gives_builtins() {
        let mutators = resolve_mutators(None);
        assert_eq!(mutators.len(), builtin_mutators().len());
        assert!(!mutators.is_empty());
    }

    #[test]
    fn test_resolve_with_empty_folder_gives_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_mutators(Some(dir.path())).is_empty());
    }

    #[test]
    fn test_resolve_with_custom_folder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("sql.yml"),
            "name: sql\ntype: replace\nvalues: [\"' OR 1=1\", \"--\"]\n",
        )
        .unwrap();

        let mutators = resolve_mutators(Some(dir.path()));
        assert_eq!(mutators.len(), 1);
        assert_eq!(mutators[0].name(), "sql");
    }
}
