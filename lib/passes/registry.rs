use crate::error::*;
use crate::passes::{DeadCodeEliminationPass, FunctionPass, MbaAddPass, MbaSubPass};
use std::collections::BTreeMap;

lazy_static! {
    /// Every pass this crate provides, by pipeline name
    pub static ref PASSES: PassRegistry = PassRegistry::create();
}

pub type PassConstructor = fn() -> Box<dyn FunctionPass>;

fn dead_code_elimination() -> Box<dyn FunctionPass> {
    Box::new(DeadCodeEliminationPass::new())
}

fn mba_sub() -> Box<dyn FunctionPass> {
    Box::new(MbaSubPass::new())
}

fn mba_add() -> Box<dyn FunctionPass> {
    Box::new(MbaAddPass::new())
}

/// Maps pipeline names to pass constructors.
#[derive(Clone)]
pub struct PassRegistry {
    passes: BTreeMap<&'static str, PassConstructor>,
}

impl PassRegistry {
    pub fn new() -> PassRegistry {
        PassRegistry {
            passes: BTreeMap::new(),
        }
    }

    pub fn create() -> PassRegistry {
        let mut registry = PassRegistry::new();
        registry.register("dce-pass", dead_code_elimination);
        registry.register("mba-sub", mba_sub);
        registry.register("mba-add", mba_add);
        registry
    }

    pub fn register(&mut self, name: &'static str, constructor: PassConstructor) {
        self.passes.insert(name, constructor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.passes.contains_key(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.passes.keys().cloned().collect()
    }

    pub fn create_pass(&self, name: &str) -> Result<Box<dyn FunctionPass>> {
        match self.passes.get(name) {
            Some(constructor) => Ok(constructor()),
            None => bail!(ErrorKind::UnknownPass(name.to_string())),
        }
    }
}

impl Default for PassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
