//! Dead-Code Elimination

use crate::data::{Allocation, LibraryFunctions, FUNCTIONS};
use crate::error::*;
use crate::ir;
use std::collections::{HashSet, VecDeque};

/// Instructions pending re-examination, deduplicated and kept in the order
/// they were discovered.
#[derive(Debug, Default)]
struct CandidateSet {
    queue: VecDeque<ir::InstructionId>,
    members: HashSet<ir::InstructionId>,
}

impl CandidateSet {
    fn new() -> CandidateSet {
        CandidateSet::default()
    }

    fn insert(&mut self, id: ir::InstructionId) -> bool {
        if self.members.insert(id) {
            self.queue.push_back(id);
            true
        } else {
            false
        }
    }

    fn contains(&self, id: ir::InstructionId) -> bool {
        self.members.contains(&id)
    }

    fn pop(&mut self) -> Option<ir::InstructionId> {
        let id = self.queue.pop_front()?;
        self.members.remove(&id);
        Some(id)
    }
}

/// An instruction is trivially dead when nothing but its own operand slots
/// reads its result and it is known to have no side effects. Freeing a
/// constant null pointer is also dead.
pub fn is_trivially_dead(
    function: &ir::Function,
    id: ir::InstructionId,
    library: &LibraryFunctions,
) -> Result<bool> {
    let instruction = function.try_instruction(id)?;
    if !instruction.only_used_by_self() {
        return Ok(false);
    }
    Ok(instruction.opcode().side_effects(library) == ir::SideEffects::None
        || frees_null(instruction, library))
}

fn frees_null(instruction: &ir::Instruction, library: &LibraryFunctions) -> bool {
    let frees = instruction
        .opcode()
        .callee()
        .and_then(|callee| library.function(callee))
        .map_or(false, |declaration| {
            declaration.allocation() == Some(Allocation::Frees)
        });
    frees
        && instruction
            .operand(0)
            .and_then(|operand| operand.constant())
            .map_or(false, |constant| constant.is_zero())
}

/// Eliminate dead code in a function, using the default table of library
/// functions to classify calls.
pub fn dead_code_elimination(function: &mut ir::Function) -> Result<bool> {
    dead_code_elimination_with(function, &FUNCTIONS)
}

/// Remove every trivially dead instruction from `function`, then every
/// instruction that became trivially dead as a result, until none remain.
///
/// Returns true if anything was removed. Blocks, terminators and edges are
/// never touched.
pub fn dead_code_elimination_with(
    function: &mut ir::Function,
    library: &LibraryFunctions,
) -> Result<bool> {
    let mut candidates = CandidateSet::new();
    let mut removed = 0;

    for id in function.instruction_ids() {
        if candidates.contains(id) || !function.contains(id) {
            continue;
        }
        if eliminate_if_dead(function, id, &mut candidates, library)? {
            removed += 1;
        }
    }

    while let Some(id) = candidates.pop() {
        if !function.contains(id) {
            continue;
        }
        if eliminate_if_dead(function, id, &mut candidates, library)? {
            removed += 1;
        }
    }

    debug!(
        "dead-code elimination removed {} instructions from @{}",
        removed,
        function.name()
    );

    Ok(removed > 0)
}

fn eliminate_if_dead(
    function: &mut ir::Function,
    id: ir::InstructionId,
    candidates: &mut CandidateSet,
    library: &LibraryFunctions,
) -> Result<bool> {
    if !is_trivially_dead(function, id, library)? {
        return Ok(false);
    }

    trace!("removing {}", function.try_instruction(id)?);

    function.salvage_debug_info(id)?;

    // Every slot is cleared before the instruction is unlinked. A producer
    // is only a candidate once the last slot reading it is gone.
    let num_operands = function.try_instruction(id)?.num_operands();
    for operand in 0..num_operands {
        let producer = match function.set_operand(id, operand, None)? {
            Some(ir::Value::Instruction(producer)) => producer,
            _ => continue,
        };
        if producer == id {
            continue;
        }
        if is_trivially_dead(function, producer, library)? {
            candidates.insert(producer);
        }
    }

    function.unlink(id)?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{const_, Function, Opcode, Type, Value};

    #[test]
    fn candidate_set_is_fifo_and_deduplicated() {
        let mut function = Function::new("f", vec![]);
        let block = function.new_block().unwrap();
        let one: Value = const_(1, 8).into();
        let a = function
            .append(block, Opcode::Add, Type::int(8), vec![one.clone(), one.clone()])
            .unwrap();
        let b = function
            .append(block, Opcode::Add, Type::int(8), vec![one.clone(), one.clone()])
            .unwrap();

        let mut candidates = CandidateSet::new();
        assert!(candidates.insert(a));
        assert!(candidates.insert(b));
        assert!(!candidates.insert(a));
        assert!(candidates.contains(a));
        assert_eq!(candidates.pop(), Some(a));
        assert!(!candidates.contains(a));
        assert_eq!(candidates.pop(), Some(b));
        assert_eq!(candidates.pop(), None);
    }

    #[test]
    fn self_referencing_instruction_is_dead() {
        let mut function = Function::new("f", vec![Type::int(32)]);
        let block = function.new_block().unwrap();
        let looped = function
            .append(
                block,
                Opcode::Add,
                Type::int(32),
                vec![Value::Argument(0), const_(1, 32).into()],
            )
            .unwrap();
        function
            .set_operand(looped, 0, Some(looped.into()))
            .unwrap();
        function.append(block, Opcode::Ret, Type::Void, vec![]).unwrap();

        assert!(is_trivially_dead(&function, looped, &FUNCTIONS).unwrap());
        assert!(dead_code_elimination(&mut function).unwrap());
        assert!(!function.contains(looped));
        function.verify().unwrap();
    }

    #[test]
    fn unknown_opcodes_are_live() {
        let mut function = Function::new("f", vec![]);
        let block = function.new_block().unwrap();
        let fence = function
            .append(block, Opcode::Other("fence".to_string()), Type::Void, vec![])
            .unwrap();

        assert!(!dead_code_elimination(&mut function).unwrap());
        assert!(function.contains(fence));
    }

    #[test]
    fn calls_are_classified_by_the_given_table() {
        let mut function = Function::new("f", vec![Type::Pointer]);
        let block = function.new_block().unwrap();
        let call = function
            .append(
                block,
                Opcode::Call("strlen".to_string()),
                Type::int(64),
                vec![Value::Argument(0)],
            )
            .unwrap();

        // An empty table knows nothing about strlen
        let empty = LibraryFunctions::new();
        assert!(!dead_code_elimination_with(&mut function, &empty).unwrap());
        assert!(function.contains(call));

        assert!(dead_code_elimination(&mut function).unwrap());
        assert!(!function.contains(call));
    }
}
