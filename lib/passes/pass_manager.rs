use crate::error::*;
use crate::ir;
use crate::passes::{
    DeadCodeEliminationPass, FunctionPass, PassRegistry, PreservedAnalyses, PASSES,
};

/// Runs an ordered list of function passes.
pub struct PassManager {
    passes: Vec<Box<dyn FunctionPass>>,
}

impl PassManager {
    pub fn new() -> PassManager {
        PassManager { passes: Vec::new() }
    }

    /// Build a pass manager from a comma-separated list of pass names,
    /// such as `"mba-sub,dce-pass"`.
    pub fn parse(pipeline: &str) -> Result<PassManager> {
        PassManager::parse_with(pipeline, &PASSES)
    }

    pub fn parse_with(pipeline: &str, registry: &PassRegistry) -> Result<PassManager> {
        let mut pass_manager = PassManager::new();
        for name in pipeline
            .split(',')
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
        {
            pass_manager.add_pass(registry.create_pass(name)?);
        }
        Ok(pass_manager)
    }

    pub fn add_pass(&mut self, pass: Box<dyn FunctionPass>) {
        self.passes.push(pass);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass over `function`, in order.
    pub fn run_function(&self, function: &mut ir::Function) -> Result<PreservedAnalyses> {
        let mut preserved = PreservedAnalyses::All;
        for pass in &self.passes {
            let result = pass
                .run(function)
                .chain_err(|| format!("{} failed on @{}", pass.name(), function.name()))?;
            debug!(
                "{} on @{} preserved {} analyses",
                pass.name(),
                function.name(),
                result
            );
            preserved = preserved.intersect(result);
        }
        Ok(preserved)
    }

    /// Run every pass over every function of `program`.
    pub fn run_program(&self, program: &mut ir::Program) -> Result<PreservedAnalyses> {
        let mut preserved = PreservedAnalyses::All;
        for function in program.functions_mut() {
            preserved = preserved.intersect(self.run_function(function)?);
        }
        Ok(preserved)
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove dead code from every function in `program`.
pub fn eliminate_dead_code(program: &mut ir::Program) -> Result<PreservedAnalyses> {
    let mut pass_manager = PassManager::new();
    pass_manager.add_pass(Box::new(DeadCodeEliminationPass::new()));
    pass_manager.run_program(program)
}
