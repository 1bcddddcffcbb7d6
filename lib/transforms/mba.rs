//! Mixed-Boolean-Arithmetic rewrites.
//!
//! Each rewrite replaces a simple arithmetic instruction with a larger
//! subgraph computing the same value:
//!
//! * integer `a - b` becomes `(a + ~b) + 1`, at any width
//! * 8-bit `a + b` becomes `(((a ^ b) + 2 * (a & b)) * 39 + 23) * 151 + 111`
//!
//! `(a ^ b) + 2 * (a & b)` is `a + b`. Modulo 2^8, `x * 39 + 23` and
//! `x * 151 + 111` are inverse affine maps, so their composition is the
//! identity. The constants are fixed; other tools match on them.
//!
//! The final instruction of each subgraph takes over the original's uses,
//! so consumers need no further relinking.

use crate::error::*;
use crate::ir;

/// Multiplier and addend of the first affine map applied to an 8-bit sum.
const ENCODE: (u64, u64) = (39, 23);
/// Multiplier and addend of its inverse.
const DECODE: (u64, u64) = (151, 111);

/// Both operands of a binary instruction, if neither slot is empty.
fn binary_operands(instruction: &ir::Instruction) -> Option<(ir::Value, ir::Value)> {
    if instruction.num_operands() != 2 {
        return None;
    }
    Some((
        instruction.operand(0)?.clone(),
        instruction.operand(1)?.clone(),
    ))
}

/// Run `rewrite` over every instruction of every block, in block order.
///
/// Each block's instruction list is snapshotted first, so instructions a
/// rewrite creates are not themselves visited.
fn rewrite_function<F>(function: &mut ir::Function, name: &str, mut rewrite: F) -> Result<bool>
where
    F: FnMut(&mut ir::Function, ir::InstructionId) -> Result<bool>,
{
    let mut rewritten = 0;

    let blocks = function
        .blocks()
        .into_iter()
        .map(|block| block.index())
        .collect::<Vec<usize>>();

    for block in blocks {
        let instructions = function.block(block)?.instructions().to_vec();
        for id in instructions {
            if rewrite(function, id)? {
                rewritten += 1;
            }
        }
    }

    debug!(
        "{} rewrote {} instructions in @{}",
        name,
        rewritten,
        function.name()
    );

    Ok(rewritten > 0)
}

/// Replace every integer subtraction `a - b` with `(a + ~b) + 1`.
pub fn mba_sub(function: &mut ir::Function) -> Result<bool> {
    rewrite_function(function, "mba-sub", rewrite_sub)
}

fn rewrite_sub(function: &mut ir::Function, id: ir::InstructionId) -> Result<bool> {
    let instruction = function.try_instruction(id)?;
    if *instruction.opcode() != ir::Opcode::Sub || !instruction.ty().is_integer() {
        return Ok(false);
    }
    let (a, b) = match binary_operands(instruction) {
        Some(operands) => operands,
        None => return Ok(false),
    };
    let ty = instruction.ty().clone();
    trace!("mba-sub: rewriting {}", instruction);

    let mut builder = ir::Builder::before(function, id);
    let not_b = builder.not(&ty, b)?;
    let sum = builder.add(&ty, a, not_b.into())?;
    let one = builder.constant(&ty, 1)?;
    let result = builder.add(&ty, sum.into(), one)?;

    function.replace_instruction(id, result)?;
    Ok(true)
}

/// Replace every 8-bit addition `a + b` with
/// `(((a ^ b) + 2 * (a & b)) * 39 + 23) * 151 + 111`.
pub fn mba_add(function: &mut ir::Function) -> Result<bool> {
    rewrite_function(function, "mba-add", rewrite_add)
}

fn rewrite_add(function: &mut ir::Function, id: ir::InstructionId) -> Result<bool> {
    let instruction = function.try_instruction(id)?;
    if *instruction.opcode() != ir::Opcode::Add || *instruction.ty() != ir::Type::Integer(8) {
        return Ok(false);
    }
    let (a, b) = match binary_operands(instruction) {
        Some(operands) => operands,
        None => return Ok(false),
    };
    let ty = instruction.ty().clone();
    trace!("mba-add: rewriting {}", instruction);

    let mut builder = ir::Builder::before(function, id);
    let two = builder.constant(&ty, 2)?;
    let encode_mul = builder.constant(&ty, ENCODE.0)?;
    let encode_add = builder.constant(&ty, ENCODE.1)?;
    let decode_mul = builder.constant(&ty, DECODE.0)?;
    let decode_add = builder.constant(&ty, DECODE.1)?;

    let xor = builder.xor(&ty, a.clone(), b.clone())?;
    let and = builder.and(&ty, a, b)?;
    let carry = builder.mul(&ty, two, and.into())?;
    let sum = builder.add(&ty, xor.into(), carry.into())?;
    let encoded = builder.mul(&ty, encode_mul, sum.into())?;
    let encoded = builder.add(&ty, encode_add, encoded.into())?;
    let decoded = builder.mul(&ty, decode_mul, encoded.into())?;
    let result = builder.add(&ty, decode_add, decoded.into())?;

    function.replace_instruction(id, result)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{const_, eval, Function, Opcode, Type, Value};

    fn affine(x: u8, (mul, add): (u64, u64)) -> u8 {
        x.wrapping_mul(mul as u8).wrapping_add(add as u8)
    }

    #[test]
    fn add_identity_holds_for_every_byte_pair() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let sum = (a ^ b).wrapping_add(2u8.wrapping_mul(a & b));
                let obfuscated = affine(affine(sum, ENCODE), DECODE);
                assert_eq!(obfuscated, a.wrapping_add(b), "a = {}, b = {}", a, b);
            }
        }
    }

    #[test]
    fn affine_maps_are_inverses() {
        for x in 0..=255u8 {
            assert_eq!(affine(affine(x, ENCODE), DECODE), x);
        }
    }

    #[test]
    fn sub_identity_holds_at_every_width() {
        for bits in &[1u32, 8, 16, 32, 64] {
            let mask = if *bits == 64 { u64::max_value() } else { (1u64 << bits) - 1 };
            let samples = [0u64, 1, 2, 0x55, 0x80, 0xfffe, u64::max_value()];
            for a in samples.iter().map(|x| x & mask) {
                for b in samples.iter().map(|x| x & mask) {
                    let rewritten = a.wrapping_add(!b & mask).wrapping_add(1) & mask;
                    assert_eq!(rewritten, a.wrapping_sub(b) & mask);
                }
            }
        }
    }

    fn single_binary(opcode: Opcode, ty: Type) -> Function {
        let mut function = Function::new("f", vec![ty.clone(), ty.clone()]);
        let block = function.new_block().unwrap();
        let op = function
            .append(
                block,
                opcode,
                ty,
                vec![Value::Argument(0), Value::Argument(1)],
            )
            .unwrap();
        function
            .append(block, Opcode::Ret, Type::Void, vec![op.into()])
            .unwrap();
        function
    }

    #[test]
    fn rewritten_add_evaluates_like_add_for_every_byte_pair() {
        let mut function = single_binary(Opcode::Add, Type::int(8));
        assert!(mba_add(&mut function).unwrap());
        function.verify().unwrap();

        for a in 0..=255u64 {
            for b in 0..=255u64 {
                let result = eval::evaluate_return(&function, &[const_(a, 8), const_(b, 8)])
                    .unwrap()
                    .unwrap();
                assert_eq!(result.value_u64(), Some((a + b) & 0xff));
            }
        }
    }

    #[test]
    fn add_subgraph_shape() {
        let mut function = single_binary(Opcode::Add, Type::int(8));
        mba_add(&mut function).unwrap();

        let opcodes = function
            .instructions()
            .map(|instruction| instruction.opcode().clone())
            .collect::<Vec<Opcode>>();
        assert_eq!(
            opcodes,
            vec![
                Opcode::Xor,
                Opcode::And,
                Opcode::Mul,
                Opcode::Add,
                Opcode::Mul,
                Opcode::Add,
                Opcode::Mul,
                Opcode::Add,
                Opcode::Ret,
            ]
        );

        let constants = function
            .instructions()
            .flat_map(|instruction| instruction.operands().to_vec())
            .filter_map(|operand| operand.and_then(|v| v.constant().and_then(|c| c.value_u64())))
            .collect::<Vec<u64>>();
        assert_eq!(constants, vec![2, 39, 23, 151, 111]);
    }

    #[test]
    fn rewritten_sub_evaluates_like_sub() {
        for bits in &[8usize, 16, 32, 64] {
            let mut function = single_binary(Opcode::Sub, Type::int(*bits));
            assert!(mba_sub(&mut function).unwrap());
            function.verify().unwrap();

            let mask = if *bits == 64 { u64::max_value() } else { (1u64 << bits) - 1 };
            let samples = [0u64, 1, 7, 0x80, 0xffff, 0xdead_beef, u64::max_value()];
            for a in samples.iter().map(|x| x & mask) {
                for b in samples.iter().map(|x| x & mask) {
                    let result =
                        eval::evaluate_return(&function, &[const_(a, *bits), const_(b, *bits)])
                            .unwrap()
                            .unwrap();
                    assert_eq!(result.value_u64(), Some(a.wrapping_sub(b) & mask));
                }
            }
        }
    }

    #[test]
    fn sub_on_other_types_is_left_alone() {
        for ty in vec![
            Type::Float(32),
            Type::Vector(4, Box::new(Type::int(32))),
            Type::Pointer,
        ] {
            let mut function = single_binary(Opcode::Sub, ty);
            let before = function.clone();
            assert!(!mba_sub(&mut function).unwrap());
            assert_eq!(function, before);
        }
    }

    #[test]
    fn add_on_other_widths_is_left_alone() {
        for bits in &[1usize, 16, 32, 64] {
            let mut function = single_binary(Opcode::Add, Type::int(*bits));
            let before = function.clone();
            assert!(!mba_add(&mut function).unwrap());
            assert_eq!(function, before);
        }
    }

    #[test]
    fn rewrites_ignore_each_others_opcodes() {
        let mut function = single_binary(Opcode::Sub, Type::int(8));
        assert!(!mba_add(&mut function).unwrap());

        let mut function = single_binary(Opcode::Add, Type::int(32));
        assert!(!mba_sub(&mut function).unwrap());
    }
}
