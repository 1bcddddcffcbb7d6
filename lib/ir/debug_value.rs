use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the expression applied to a debug value's location to
/// recover the source variable.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum DebugOp {
    Add(Constant),
    Sub(Constant),
    Mul(Constant),
    And(Constant),
    Or(Constant),
    Xor(Constant),
    Convert { bits: usize, signed: bool },
}

impl fmt::Display for DebugOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DebugOp::Add(c) => write!(f, "plus {}", Value::Constant(c.clone())),
            DebugOp::Sub(c) => write!(f, "minus {}", Value::Constant(c.clone())),
            DebugOp::Mul(c) => write!(f, "mul {}", Value::Constant(c.clone())),
            DebugOp::And(c) => write!(f, "and {}", Value::Constant(c.clone())),
            DebugOp::Or(c) => write!(f, "or {}", Value::Constant(c.clone())),
            DebugOp::Xor(c) => write!(f, "xor {}", Value::Constant(c.clone())),
            DebugOp::Convert { bits, signed } => {
                write!(f, "convert {}{}", if *signed { "s" } else { "u" }, bits)
            }
        }
    }
}

/// Associates a source variable with an IR value.
///
/// Debug values are not uses: they never keep an instruction alive. When
/// the instruction they describe is erased they are salvaged onto one of its
/// operands where possible, and otherwise marked optimized out.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct DebugValue {
    variable: String,
    location: Option<Value>,
    expression: Vec<DebugOp>,
}

impl DebugValue {
    pub fn new<S: Into<String>>(variable: S, location: Value) -> DebugValue {
        DebugValue {
            variable: variable.into(),
            location: Some(location),
            expression: Vec::new(),
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }
    pub fn location(&self) -> Option<&Value> {
        self.location.as_ref()
    }
    pub fn expression(&self) -> &[DebugOp] {
        &self.expression
    }
    pub fn is_optimized_out(&self) -> bool {
        self.location.is_none()
    }

    pub(crate) fn describes(&self, id: InstructionId) -> bool {
        self.location.as_ref().and_then(|l| l.instruction()) == Some(id)
    }

    pub(crate) fn set_location(&mut self, location: Value) {
        self.location = Some(location);
    }

    /// Rebase this value onto `instruction`'s operand, or drop its location
    /// when the instruction can't be expressed as an operation on one.
    pub(crate) fn salvage(&mut self, instruction: &Instruction) {
        match salvage_step(instruction) {
            Some((location, op)) => {
                self.location = Some(location);
                // The step that recovers the variable from the operand runs
                // before anything already recorded.
                self.expression.insert(0, op);
            }
            None => {
                self.location = None;
                self.expression.clear();
            }
        }
    }
}

/// The operand a debug value of `instruction` can be rebased onto, and the
/// step recovering the instruction's result from it. An operand reading the
/// instruction itself is gone along with it, so it never qualifies.
fn salvage_step(instruction: &Instruction) -> Option<(Value, DebugOp)> {
    let (operand, op) = rebase(instruction)?;
    if operand.instruction() == Some(instruction.id()) {
        return None;
    }
    Some((operand, op))
}

fn rebase(instruction: &Instruction) -> Option<(Value, DebugOp)> {
    let opcode = instruction.opcode();

    if opcode.is_cast() {
        let bits = instruction.ty().integer_bits()?;
        let operand = instruction.operand(0)?.clone();
        return Some((
            operand,
            DebugOp::Convert {
                bits,
                signed: *opcode == Opcode::SExt,
            },
        ));
    }

    let lhs = instruction.operand(0)?;
    let rhs = instruction.operand(1)?;
    let (operand, constant) = match (lhs.constant(), rhs.constant()) {
        (None, Some(constant)) => (lhs.clone(), constant.clone()),
        (Some(constant), None) if opcode.is_commutative() => (rhs.clone(), constant.clone()),
        _ => return None,
    };

    let op = match opcode {
        Opcode::Add => DebugOp::Add(constant),
        Opcode::Sub => DebugOp::Sub(constant),
        Opcode::Mul => DebugOp::Mul(constant),
        Opcode::And => DebugOp::And(constant),
        Opcode::Or => DebugOp::Or(constant),
        Opcode::Xor => DebugOp::Xor(constant),
        _ => return None,
    };
    Some((operand, op))
}

impl fmt::Display for DebugValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.location() {
            Some(location) => write!(f, "dbg {} = {}", self.variable, location)?,
            None => write!(f, "dbg {} = <optimized out>", self.variable)?,
        }
        for op in &self.expression {
            write!(f, ", {}", op)?;
        }
        Ok(())
    }
}
