use crate::ir::*;
use falcon::graph;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A basic block: an ordered sequence of instruction handles.
///
/// The instructions themselves live in the owning `Function`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Block {
    index: usize,
    instructions: Vec<InstructionId>,
}

impl Block {
    pub fn new(index: usize) -> Block {
        Block {
            index,
            instructions: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
    pub fn instructions(&self) -> &[InstructionId] {
        &self.instructions
    }
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
    pub fn position(&self, id: InstructionId) -> Option<usize> {
        self.instructions.iter().position(|i| *i == id)
    }

    pub(crate) fn insert(&mut self, position: usize, id: InstructionId) {
        self.instructions.insert(position, id);
    }
    pub(crate) fn remove(&mut self, id: InstructionId) -> bool {
        match self.position(id) {
            Some(position) => {
                self.instructions.remove(position);
                true
            }
            None => false,
        }
    }
}

impl graph::Vertex for Block {
    fn index(&self) -> usize {
        self.index
    }
    fn dot_label(&self) -> String {
        format!("{}", self)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[ Block 0x{:02x} ]", self.index())
    }
}
