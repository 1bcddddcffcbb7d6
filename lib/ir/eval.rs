//! Evaluation of straight-line integer code over constants.
//!
//! Every instruction is evaluated at its own width with `falcon`'s
//! constants, so arithmetic wraps exactly as the IR specifies. Memory,
//! calls and control flow other than falling through and returning are not
//! supported.

use crate::error::*;
use crate::ir::*;
use std::collections::HashMap;

/// Evaluate every instruction of `function`, in block order, given values for
/// its arguments. Returns the value each instruction produced.
pub fn evaluate(
    function: &Function,
    arguments: &[Constant],
) -> Result<HashMap<InstructionId, Constant>> {
    Ok(run(function, arguments)?.0)
}

/// Evaluate `function` and return the operand of the first `ret` reached.
pub fn evaluate_return(function: &Function, arguments: &[Constant]) -> Result<Option<Constant>> {
    Ok(run(function, arguments)?.1)
}

fn run(
    function: &Function,
    arguments: &[Constant],
) -> Result<(HashMap<InstructionId, Constant>, Option<Constant>)> {
    let mut values: HashMap<InstructionId, Constant> = HashMap::new();

    for instruction in function.instructions() {
        match instruction.opcode() {
            Opcode::Ret => {
                let returned = match instruction.operand(0) {
                    Some(value) => Some(operand_value(value, arguments, &values)?),
                    None => None,
                };
                return Ok((values, returned));
            }
            Opcode::Br | Opcode::Unreachable => continue,
            _ => {}
        }
        let value = eval_instruction(instruction, arguments, &values)?;
        values.insert(instruction.id(), value);
    }

    Ok((values, None))
}

fn operand_value(
    value: &Value,
    arguments: &[Constant],
    values: &HashMap<InstructionId, Constant>,
) -> Result<Constant> {
    Ok(match value {
        Value::Constant(constant) => constant.clone(),
        Value::Argument(index) => match arguments.get(*index) {
            Some(constant) => constant.clone(),
            None => bail!(ErrorKind::Eval(format!("no value for %arg{}", index))),
        },
        Value::Instruction(id) => match values.get(id) {
            Some(constant) => constant.clone(),
            None => bail!(ErrorKind::Eval(format!("{} has not been evaluated", id))),
        },
    })
}

fn not(constant: Constant) -> Result<Constant> {
    Ok(constant.xor(&Constant::new(1, 1))?)
}

fn eval_instruction(
    instruction: &Instruction,
    arguments: &[Constant],
    values: &HashMap<InstructionId, Constant>,
) -> Result<Constant> {
    let operand = |index: usize| -> Result<Constant> {
        match instruction.operand(index) {
            Some(value) => operand_value(value, arguments, values),
            None => bail!(ErrorKind::InvalidOperand(instruction.id().index(), index)),
        }
    };

    let bits = || -> Result<usize> {
        match instruction.ty().integer_bits() {
            Some(bits) => Ok(bits),
            None => bail!(ErrorKind::Eval(format!(
                "{} does not produce a scalar integer",
                instruction
            ))),
        }
    };

    Ok(match instruction.opcode() {
        Opcode::Add => operand(0)?.add(&operand(1)?)?,
        Opcode::Sub => operand(0)?.sub(&operand(1)?)?,
        Opcode::Mul => operand(0)?.mul(&operand(1)?)?,
        Opcode::UDiv => operand(0)?.divu(&operand(1)?)?,
        Opcode::URem => operand(0)?.modu(&operand(1)?)?,
        Opcode::SDiv => operand(0)?.divs(&operand(1)?)?,
        Opcode::SRem => operand(0)?.mods(&operand(1)?)?,
        Opcode::Shl => operand(0)?.shl(&operand(1)?)?,
        Opcode::LShr => operand(0)?.shr(&operand(1)?)?,
        Opcode::AShr => {
            // Shift at double width so the sign bits shift in, then truncate
            let bits = bits()?;
            let wide = operand(0)?.sext(bits * 2)?;
            let amount = operand(1)?.zext(bits * 2)?;
            wide.shr(&amount)?.trun(bits)?
        }
        Opcode::And => operand(0)?.and(&operand(1)?)?,
        Opcode::Or => operand(0)?.or(&operand(1)?)?,
        Opcode::Xor => operand(0)?.xor(&operand(1)?)?,
        Opcode::ICmp(predicate) => {
            let lhs = operand(0)?;
            let rhs = operand(1)?;
            match predicate {
                Predicate::Eq => lhs.cmpeq(&rhs)?,
                Predicate::Ne => lhs.cmpneq(&rhs)?,
                Predicate::Ult => lhs.cmpltu(&rhs)?,
                Predicate::Ugt => rhs.cmpltu(&lhs)?,
                Predicate::Uge => not(lhs.cmpltu(&rhs)?)?,
                Predicate::Ule => not(rhs.cmpltu(&lhs)?)?,
                Predicate::Slt => lhs.cmplts(&rhs)?,
                Predicate::Sgt => rhs.cmplts(&lhs)?,
                Predicate::Sge => not(lhs.cmplts(&rhs)?)?,
                Predicate::Sle => not(rhs.cmplts(&lhs)?)?,
            }
        }
        Opcode::Trunc => operand(0)?.trun(bits()?)?,
        Opcode::ZExt => operand(0)?.zext(bits()?)?,
        Opcode::SExt => operand(0)?.sext(bits()?)?,
        Opcode::Select => {
            if operand(0)?.is_one() {
                operand(1)?
            } else {
                operand(2)?
            }
        }
        _ => bail!(ErrorKind::Eval(format!("cannot evaluate {}", instruction))),
    })
}
