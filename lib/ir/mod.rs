//! A def-use IR of functions, basic blocks and instructions.

mod block;
mod builder;
mod control_flow_graph;
mod debug_value;
mod edge;
pub mod eval;
mod function;
mod instruction;
mod opcode;
mod program;
mod types;
mod value;

pub use self::block::Block;
pub use self::builder::Builder;
pub use self::control_flow_graph::ControlFlowGraph;
pub use self::debug_value::{DebugOp, DebugValue};
pub use self::edge::Edge;
pub use self::function::Function;
pub use self::instruction::Instruction;
pub use self::opcode::{Opcode, Predicate, SideEffects};
pub use self::program::Program;
pub use self::types::Type;
pub use self::value::{InstructionId, Use, Value};

pub type Constant = ::falcon::il::Constant;

use crate::error::*;

pub fn const_(value: u64, bits: usize) -> Constant {
    Constant::new(value, bits)
}

/// The constant with every one of `bits` bits set, i.e. `-1`.
pub fn all_ones(bits: usize) -> Result<Constant> {
    Ok(Constant::new(0, bits).sub(&Constant::new(1, bits))?)
}
