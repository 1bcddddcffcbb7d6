use crate::error::*;
use crate::ir::*;
use falcon::graph::Graph;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ControlFlowGraph {
    graph: Graph<Block, Edge>,
    entry: Option<usize>,
    next_index: usize,
}

impl ControlFlowGraph {
    pub fn new() -> ControlFlowGraph {
        ControlFlowGraph {
            graph: Graph::new(),
            entry: None,
            next_index: 0,
        }
    }

    pub fn graph(&self) -> &Graph<Block, Edge> {
        &self.graph
    }
    pub fn entry(&self) -> Option<usize> {
        self.entry
    }

    /// Creates a new, empty block and returns its index. The first block
    /// created becomes the entry.
    pub fn new_block(&mut self) -> Result<usize> {
        let index = self.next_index;
        self.graph.insert_vertex(Block::new(index))?;
        self.next_index += 1;
        if self.entry.is_none() {
            self.entry = Some(index);
        }
        Ok(index)
    }

    pub fn block(&self, index: usize) -> Result<&Block> {
        self.graph
            .vertex(index)
            .map_err(|_| ErrorKind::InvalidBlock(index).into())
    }
    pub fn block_mut(&mut self, index: usize) -> Result<&mut Block> {
        self.graph
            .vertex_mut(index)
            .map_err(|_| ErrorKind::InvalidBlock(index).into())
    }
    pub fn blocks(&self) -> Vec<&Block> {
        self.graph.vertices()
    }

    pub fn insert_edge(&mut self, head: usize, tail: usize) -> Result<()> {
        Ok(self.graph.insert_edge(Edge::new(head, tail))?)
    }
    pub fn edges(&self) -> Vec<&Edge> {
        self.graph.edges()
    }
}

impl Default for ControlFlowGraph {
    fn default() -> Self {
        Self::new()
    }
}
