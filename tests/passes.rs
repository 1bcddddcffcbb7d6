mod common;

use common::*;
use mba::ir::{const_, eval, Function, Opcode, Program, Type};
use mba::passes::{eliminate_dead_code, PassManager, PreservedAnalyses, PASSES};

fn arithmetic(name: &str) -> Function {
    let mut function = Function::new(name, vec![Type::int(8), Type::int(8)]);
    let block = function.new_block().unwrap();
    let difference = binary(&mut function, block, Opcode::Sub, 8, arg(0), arg(1));
    let sum = binary(&mut function, block, Opcode::Add, 8, difference.into(), int(9, 8));
    binary(&mut function, block, Opcode::Mul, 8, sum.into(), sum.into());
    ret(&mut function, block, Some(sum.into()));
    function
}

#[test]
fn eliminate_dead_code_over_a_program() {
    init_logging();

    let mut program = Program::new();
    let dirty = program.add_function(arithmetic("dirty"));

    let mut clean = Function::new("clean", vec![]);
    let block = clean.new_block().unwrap();
    ret(&mut clean, block, None);
    let clean = program.add_function(clean);

    assert_eq!(
        eliminate_dead_code(&mut program).unwrap(),
        PreservedAnalyses::ControlFlow
    );
    assert_eq!(
        opcodes(program.function(dirty).unwrap()),
        vec![Opcode::Sub, Opcode::Add, Opcode::Ret]
    );
    assert_eq!(
        opcodes(program.function(clean).unwrap()),
        vec![Opcode::Ret]
    );

    assert_eq!(
        eliminate_dead_code(&mut program).unwrap(),
        PreservedAnalyses::All
    );
}

#[test]
fn full_pipeline_preserves_semantics() {
    let original = arithmetic("pipeline");
    let mut function = original.clone();

    let pass_manager = PassManager::parse("mba-sub,mba-add,dce-pass").unwrap();
    assert_eq!(
        pass_manager.run_function(&mut function).unwrap(),
        PreservedAnalyses::None
    );
    function.verify().unwrap();

    assert!(function
        .instructions()
        .all(|instruction| *instruction.opcode() != Opcode::Sub));
    // The unused multiply is gone; nothing else is dead.
    assert!(function
        .instructions()
        .filter(|instruction| *instruction.opcode() == Opcode::Mul)
        .all(|instruction| instruction.operand(0).map_or(false, |value| value.is_constant())));

    for a in (0..256u64).step_by(7) {
        for b in (0..256u64).step_by(5) {
            let arguments = [const_(a, 8), const_(b, 8)];
            assert_eq!(
                eval::evaluate_return(&function, &arguments).unwrap(),
                eval::evaluate_return(&original, &arguments).unwrap()
            );
        }
    }
}

#[test]
fn pipeline_runs_every_function() {
    let mut program = Program::new();
    let first = program.add_function(arithmetic("first"));
    let second = program.add_function(arithmetic("second"));

    let pass_manager = PassManager::parse("mba-sub").unwrap();
    assert_eq!(
        pass_manager.run_program(&mut program).unwrap(),
        PreservedAnalyses::None
    );
    for index in &[first, second] {
        assert!(program
            .function(*index)
            .unwrap()
            .instructions()
            .all(|instruction| *instruction.opcode() != Opcode::Sub));
    }
}

#[test]
fn unchanged_functions_preserve_everything() {
    let mut function = Function::new("empty", vec![]);
    let block = function.new_block().unwrap();
    ret(&mut function, block, None);

    let pass_manager = PassManager::parse("mba-sub,mba-add,dce-pass").unwrap();
    assert_eq!(
        pass_manager.run_function(&mut function).unwrap(),
        PreservedAnalyses::All
    );
}

#[test]
fn registry_exposes_host_names() {
    for name in &["dce-pass", "mba-sub", "mba-add"] {
        assert!(PASSES.contains(name));
        assert_eq!(PASSES.create_pass(name).unwrap().name(), *name);
    }
    assert!(!PASSES.contains("mba-mul"));
    assert!(PassManager::parse("mba-mul").is_err());
}
