use falcon::graph;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A control-flow edge between two blocks.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Edge {
    head: usize,
    tail: usize,
}

impl Edge {
    pub fn new(head: usize, tail: usize) -> Edge {
        Edge { head, tail }
    }

    pub fn head(&self) -> usize {
        self.head
    }
    pub fn tail(&self) -> usize {
        self.tail
    }
}

impl graph::Edge for Edge {
    fn head(&self) -> usize {
        self.head
    }
    fn tail(&self) -> usize {
        self.tail
    }
    fn dot_label(&self) -> String {
        format!("{}", self)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(0x{:x} -> 0x{:x})", self.head(), self.tail())
    }
}
