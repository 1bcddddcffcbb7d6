use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single operation, producing at most one typed result.
///
/// Operand slots and the use-list are only mutated through `Function`, which
/// keeps every use-list equal to the set of slots reading that result.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Instruction {
    id: InstructionId,
    block: usize,
    opcode: Opcode,
    ty: Type,
    operands: Vec<Option<Value>>,
    uses: Vec<Use>,
}

impl Instruction {
    pub(crate) fn new(
        id: InstructionId,
        block: usize,
        opcode: Opcode,
        ty: Type,
        operands: Vec<Value>,
    ) -> Instruction {
        Instruction {
            id,
            block,
            opcode,
            ty,
            operands: operands.into_iter().map(Some).collect(),
            uses: Vec::new(),
        }
    }

    pub fn id(&self) -> InstructionId {
        self.id
    }

    /// Index of the block containing this instruction.
    pub fn block(&self) -> usize {
        self.block
    }

    pub fn opcode(&self) -> &Opcode {
        &self.opcode
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn operands(&self) -> &[Option<Value>] {
        &self.operands
    }

    /// The value read by operand slot `index`, if the slot exists and has
    /// not been cleared.
    pub fn operand(&self, index: usize) -> Option<&Value> {
        self.operands.get(index).and_then(|operand| operand.as_ref())
    }

    pub fn num_operands(&self) -> usize {
        self.operands.len()
    }

    pub fn uses(&self) -> &[Use] {
        &self.uses
    }

    pub fn use_empty(&self) -> bool {
        self.uses.is_empty()
    }

    /// True if every use of this instruction is one of its own operand
    /// slots.
    pub fn only_used_by_self(&self) -> bool {
        self.uses.iter().all(|u| u.user() == self.id)
    }

    pub(crate) fn operand_slot_mut(&mut self, index: usize) -> Option<&mut Option<Value>> {
        self.operands.get_mut(index)
    }

    pub(crate) fn add_use(&mut self, u: Use) {
        self.uses.push(u);
    }

    pub(crate) fn remove_use(&mut self, u: &Use) -> bool {
        match self.uses.iter().position(|x| x == u) {
            Some(position) => {
                self.uses.remove(position);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_uses(&mut self) -> Vec<Use> {
        ::std::mem::replace(&mut self.uses, Vec::new())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.ty.is_void() {
            write!(f, "{} = ", self.id)?;
        }
        write!(f, "{}", self.opcode)?;
        if !self.ty.is_void() {
            write!(f, " {}", self.ty)?;
        }
        let operands = self
            .operands
            .iter()
            .map(|operand| match operand {
                Some(value) => format!("{}", value),
                None => String::from("<null>"),
            })
            .collect::<Vec<String>>();
        if !operands.is_empty() {
            write!(f, " {}", operands.join(", "))?;
        }
        Ok(())
    }
}
