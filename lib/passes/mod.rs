//! Passes package the transforms for a host which schedules them by name.
//!
//! A pass turns a transform's changed flag into `PreservedAnalyses`, which
//! the host uses to decide which of its cached analyses to throw away.

mod pass_manager;
mod preserved_analyses;
mod registry;

pub use self::pass_manager::{eliminate_dead_code, PassManager};
pub use self::preserved_analyses::PreservedAnalyses;
pub use self::registry::{PassConstructor, PassRegistry, PASSES};

use crate::data::LibraryFunctions;
use crate::error::*;
use crate::ir;
use crate::transforms;

pub trait FunctionPass: Sync {
    /// The name this pass is registered under.
    fn name(&self) -> &'static str;

    /// Transform `function` in place.
    fn run(&self, function: &mut ir::Function) -> Result<PreservedAnalyses>;
}

/// Removes trivially dead instructions. Never changes control flow.
#[derive(Clone, Debug, Default)]
pub struct DeadCodeEliminationPass {
    library: Option<LibraryFunctions>,
}

impl DeadCodeEliminationPass {
    pub fn new() -> DeadCodeEliminationPass {
        DeadCodeEliminationPass { library: None }
    }

    /// Classify calls with `library` instead of the built-in table.
    pub fn with_library(library: LibraryFunctions) -> DeadCodeEliminationPass {
        DeadCodeEliminationPass {
            library: Some(library),
        }
    }
}

impl FunctionPass for DeadCodeEliminationPass {
    fn name(&self) -> &'static str {
        "dce-pass"
    }

    fn run(&self, function: &mut ir::Function) -> Result<PreservedAnalyses> {
        let changed = match &self.library {
            Some(library) => transforms::dead_code_elimination_with(function, library)?,
            None => transforms::dead_code_elimination(function)?,
        };
        Ok(if changed {
            PreservedAnalyses::ControlFlow
        } else {
            PreservedAnalyses::All
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MbaSubPass {}

impl MbaSubPass {
    pub fn new() -> MbaSubPass {
        MbaSubPass {}
    }
}

impl FunctionPass for MbaSubPass {
    fn name(&self) -> &'static str {
        "mba-sub"
    }

    fn run(&self, function: &mut ir::Function) -> Result<PreservedAnalyses> {
        Ok(PreservedAnalyses::from_changed(transforms::mba_sub(function)?))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MbaAddPass {}

impl MbaAddPass {
    pub fn new() -> MbaAddPass {
        MbaAddPass {}
    }
}

impl FunctionPass for MbaAddPass {
    fn name(&self) -> &'static str {
        "mba-add"
    }

    fn run(&self, function: &mut ir::Function) -> Result<PreservedAnalyses> {
        Ok(PreservedAnalyses::from_changed(transforms::mba_add(function)?))
    }
}
