use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable handle to an instruction inside its `Function`.
///
/// Handles are never reused, so a handle to an erased instruction stays
/// invalid for the rest of the function's lifetime.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct InstructionId(usize);

impl InstructionId {
    pub(crate) fn new(index: usize) -> InstructionId {
        InstructionId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Something an operand slot can read.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Value {
    Constant(Constant),
    Argument(usize),
    Instruction(InstructionId),
}

impl Value {
    pub fn constant(&self) -> Option<&Constant> {
        match self {
            Value::Constant(constant) => Some(constant),
            _ => None,
        }
    }

    pub fn instruction(&self) -> Option<InstructionId> {
        match self {
            Value::Instruction(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.constant().is_some()
    }
}

impl From<Constant> for Value {
    fn from(constant: Constant) -> Value {
        Value::Constant(constant)
    }
}

impl From<InstructionId> for Value {
    fn from(id: InstructionId) -> Value {
        Value::Instruction(id)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Constant(constant) => match constant.value_u64() {
                Some(value) => write!(f, "{}", value),
                None => write!(f, "{}", constant),
            },
            Value::Argument(index) => write!(f, "%arg{}", index),
            Value::Instruction(id) => write!(f, "{}", id),
        }
    }
}

/// One operand slot of `user` which reads some instruction's result.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Use {
    user: InstructionId,
    operand: usize,
}

impl Use {
    pub fn new(user: InstructionId, operand: usize) -> Use {
        Use { user, operand }
    }

    pub fn user(&self) -> InstructionId {
        self.user
    }

    pub fn operand(&self) -> usize {
        self.operand
    }
}

impl fmt::Display for Use {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}#{}", self.user, self.operand)
    }
}
