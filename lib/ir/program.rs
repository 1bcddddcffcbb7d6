use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A module: an ordered collection of functions.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Program {
    functions: BTreeMap<usize, Function>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            functions: BTreeMap::new(),
        }
    }

    /// Add a function, returning the index it was stored under.
    pub fn add_function(&mut self, function: Function) -> usize {
        let index = self
            .functions
            .keys()
            .next_back()
            .map(|index| index + 1)
            .unwrap_or(0);
        self.functions.insert(index, function);
        index
    }

    pub fn function(&self, index: usize) -> Option<&Function> {
        self.functions.get(&index)
    }

    pub fn function_mut(&mut self, index: usize) -> Option<&mut Function> {
        self.functions.get_mut(&index)
    }

    pub fn functions(&self) -> Vec<&Function> {
        self.functions.values().collect::<Vec<&Function>>()
    }

    pub fn functions_mut(&mut self) -> Vec<&mut Function> {
        self.functions.values_mut().collect::<Vec<&mut Function>>()
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}
