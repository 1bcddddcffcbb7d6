#![allow(dead_code)]

use mba::ir::{const_, Function, InstructionId, Opcode, Type, Value};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn int(value: u64, bits: usize) -> Value {
    const_(value, bits).into()
}

pub fn arg(index: usize) -> Value {
    Value::Argument(index)
}

/// Append a binary instruction whose type is `Integer(bits)`.
pub fn binary(
    function: &mut Function,
    block: usize,
    opcode: Opcode,
    bits: usize,
    lhs: Value,
    rhs: Value,
) -> InstructionId {
    function
        .append(block, opcode, Type::int(bits), vec![lhs, rhs])
        .unwrap()
}

pub fn ret(function: &mut Function, block: usize, value: Option<Value>) -> InstructionId {
    function
        .append(
            block,
            Opcode::Ret,
            Type::Void,
            value.into_iter().collect(),
        )
        .unwrap()
}

/// The opcodes of every instruction in `function`, in block order.
pub fn opcodes(function: &Function) -> Vec<Opcode> {
    function
        .instructions()
        .map(|instruction| instruction.opcode().clone())
        .collect()
}
