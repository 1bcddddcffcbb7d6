use crate::error::*;
use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A function: a control-flow graph of blocks, and the instructions those
/// blocks refer to.
///
/// Instructions are stored in an arena indexed by `InstructionId`. Erased
/// instructions leave a hole behind, so a handle is never reissued. All
/// mutation goes through this type, which keeps each instruction's use-list
/// equal to the operand slots reading it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Function {
    name: String,
    arguments: Vec<Type>,
    control_flow_graph: ControlFlowGraph,
    instructions: Vec<Option<Instruction>>,
    debug_values: Vec<DebugValue>,
}

impl Function {
    pub fn new<S: Into<String>>(name: S, arguments: Vec<Type>) -> Function {
        Function {
            name: name.into(),
            arguments,
            control_flow_graph: ControlFlowGraph::new(),
            instructions: Vec::new(),
            debug_values: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn arguments(&self) -> &[Type] {
        &self.arguments
    }

    pub fn control_flow_graph(&self) -> &ControlFlowGraph {
        &self.control_flow_graph
    }

    pub fn new_block(&mut self) -> Result<usize> {
        self.control_flow_graph.new_block()
    }
    pub fn insert_edge(&mut self, head: usize, tail: usize) -> Result<()> {
        self.control_flow_graph.insert_edge(head, tail)
    }
    pub fn block(&self, index: usize) -> Result<&Block> {
        self.control_flow_graph.block(index)
    }
    pub fn blocks(&self) -> Vec<&Block> {
        self.control_flow_graph.blocks()
    }
    pub fn edges(&self) -> Vec<&Edge> {
        self.control_flow_graph.edges()
    }

    pub fn instruction(&self, id: InstructionId) -> Option<&Instruction> {
        self.instructions
            .get(id.index())
            .and_then(|instruction| instruction.as_ref())
    }

    /// Like `instruction`, but a stale handle is an error.
    pub fn try_instruction(&self, id: InstructionId) -> Result<&Instruction> {
        self.instruction(id)
            .ok_or_else(|| ErrorKind::InvalidInstruction(id.index()).into())
    }

    fn instruction_mut(&mut self, id: InstructionId) -> Result<&mut Instruction> {
        self.instructions
            .get_mut(id.index())
            .and_then(|instruction| instruction.as_mut())
            .ok_or_else(|| ErrorKind::InvalidInstruction(id.index()).into())
    }

    pub fn contains(&self, id: InstructionId) -> bool {
        self.instruction(id).is_some()
    }

    /// A snapshot of every instruction handle, in block order.
    ///
    /// The snapshot is unaffected by later mutation, so callers may erase
    /// instructions while walking it. Handles erased in the meantime simply
    /// stop resolving.
    pub fn instruction_ids(&self) -> Vec<InstructionId> {
        self.blocks()
            .into_iter()
            .flat_map(|block| block.instructions().iter().cloned())
            .collect()
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks()
            .into_iter()
            .flat_map(|block| block.instructions().iter())
            .filter_map(move |id| self.instruction(*id))
    }

    pub fn num_instructions(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_some()).count()
    }

    pub fn uses(&self, id: InstructionId) -> Result<&[Use]> {
        Ok(self.try_instruction(id)?.uses())
    }

    /// Append a new instruction to the end of `block`.
    pub fn append(
        &mut self,
        block: usize,
        opcode: Opcode,
        ty: Type,
        operands: Vec<Value>,
    ) -> Result<InstructionId> {
        let position = self.block(block)?.instructions().len();
        self.insert_at(block, position, opcode, ty, operands)
    }

    /// Insert a new instruction immediately before `anchor`, in the same
    /// block.
    pub fn insert_before(
        &mut self,
        anchor: InstructionId,
        opcode: Opcode,
        ty: Type,
        operands: Vec<Value>,
    ) -> Result<InstructionId> {
        let block = self.try_instruction(anchor)?.block();
        let position = self
            .block(block)?
            .position(anchor)
            .ok_or_else(|| Error::from(ErrorKind::InvalidInstruction(anchor.index())))?;
        self.insert_at(block, position, opcode, ty, operands)
    }

    fn insert_at(
        &mut self,
        block: usize,
        position: usize,
        opcode: Opcode,
        ty: Type,
        operands: Vec<Value>,
    ) -> Result<InstructionId> {
        self.check_values(&operands)?;

        let id = InstructionId::new(self.instructions.len());
        for (index, operand) in operands.iter().enumerate() {
            self.add_use(operand, Use::new(id, index))?;
        }
        self.instructions
            .push(Some(Instruction::new(id, block, opcode, ty, operands)));
        self.control_flow_graph
            .block_mut(block)?
            .insert(position, id);
        Ok(id)
    }

    fn check_values(&self, values: &[Value]) -> Result<()> {
        for value in values {
            if let Value::Instruction(id) = value {
                self.try_instruction(*id)?;
            }
        }
        Ok(())
    }

    fn add_use(&mut self, value: &Value, u: Use) -> Result<()> {
        if let Value::Instruction(producer) = value {
            self.instruction_mut(*producer)?.add_use(u);
        }
        Ok(())
    }

    fn remove_use(&mut self, value: &Value, u: &Use) -> Result<()> {
        if let Value::Instruction(producer) = value {
            if !self.instruction_mut(*producer)?.remove_use(u) {
                bail!(ErrorKind::Verify(format!(
                    "{} was missing from the use-list of {}",
                    u, producer
                )));
            }
        }
        Ok(())
    }

    /// Point operand slot `operand` of `id` at `value`, or clear it with
    /// `None`. Returns the value the slot previously held.
    pub fn set_operand(
        &mut self,
        id: InstructionId,
        operand: usize,
        value: Option<Value>,
    ) -> Result<Option<Value>> {
        if let Some(value) = &value {
            self.check_values(::std::slice::from_ref(value))?;
        }

        let previous = {
            let slot = self
                .instruction_mut(id)?
                .operand_slot_mut(operand)
                .ok_or_else(|| Error::from(ErrorKind::InvalidOperand(id.index(), operand)))?;
            ::std::mem::replace(slot, value.clone())
        };

        let u = Use::new(id, operand);
        if let Some(previous) = &previous {
            self.remove_use(previous, &u)?;
        }
        if let Some(value) = &value {
            self.add_use(value, u)?;
        }
        Ok(previous)
    }

    /// Make every reader of `old` read `new` instead, including debug values.
    pub fn replace_all_uses_with(&mut self, old: InstructionId, new: Value) -> Result<()> {
        if new.instruction() == Some(old) {
            bail!(ErrorKind::Verify(format!(
                "cannot replace {} with itself",
                old
            )));
        }
        self.check_values(::std::slice::from_ref(&new))?;

        let uses = self.instruction_mut(old)?.take_uses();
        for u in uses {
            let invalid = || Error::from(ErrorKind::InvalidOperand(u.user().index(), u.operand()));
            let slot = self
                .instruction_mut(u.user())?
                .operand_slot_mut(u.operand())
                .ok_or_else(invalid)?;
            *slot = Some(new.clone());
            self.add_use(&new, u)?;
        }

        for debug_value in self.debug_values.iter_mut() {
            if debug_value.describes(old) {
                debug_value.set_location(new.clone());
            }
        }

        Ok(())
    }

    /// Replace `old` with `new`, which must already be in the function:
    /// every reader of `old` now reads `new`, and `old` is erased.
    pub fn replace_instruction(&mut self, old: InstructionId, new: InstructionId) -> Result<()> {
        self.replace_all_uses_with(old, Value::Instruction(new))?;
        self.erase(old)
    }

    /// Salvage debug values describing `id`, clear every operand slot of
    /// `id`, unlink it from its block and free it. Fails, without mutating
    /// anything, if anything other than `id` itself still reads its result.
    pub fn erase(&mut self, id: InstructionId) -> Result<()> {
        let instruction = self.try_instruction(id)?;
        if !instruction.only_used_by_self() {
            bail!(ErrorKind::Verify(format!(
                "{} is erased while still used by {}",
                id,
                instruction
                    .uses()
                    .iter()
                    .map(|u| format!("{}", u))
                    .collect::<Vec<String>>()
                    .join(", ")
            )));
        }
        let num_operands = instruction.num_operands();
        self.salvage_debug_info(id)?;
        for operand in 0..num_operands {
            self.set_operand(id, operand, None)?;
        }
        self.unlink(id)
    }

    /// Remove an instruction whose uses and operands are already clear.
    pub(crate) fn unlink(&mut self, id: InstructionId) -> Result<()> {
        let block = self.try_instruction(id)?.block();
        self.control_flow_graph.block_mut(block)?.remove(id);
        self.instructions[id.index()] = None;
        Ok(())
    }

    pub fn add_debug_value(&mut self, debug_value: DebugValue) -> Result<()> {
        if let Some(location) = debug_value.location() {
            self.check_values(::std::slice::from_ref(location))?;
        }
        self.debug_values.push(debug_value);
        Ok(())
    }

    pub fn debug_values(&self) -> &[DebugValue] {
        &self.debug_values
    }

    /// Rewrite debug values describing `id` so they survive its removal.
    pub fn salvage_debug_info(&mut self, id: InstructionId) -> Result<()> {
        let instruction = self.try_instruction(id)?.clone();
        for debug_value in self.debug_values.iter_mut() {
            if debug_value.describes(id) {
                debug_value.salvage(&instruction);
            }
        }
        Ok(())
    }

    /// Check that every use-list matches the operand slots reading it, that
    /// blocks and instructions agree about where instructions live, and that
    /// debug values only refer to live instructions.
    pub fn verify(&self) -> Result<()> {
        let mut expected: HashMap<InstructionId, Vec<Use>> = HashMap::new();

        for block in self.blocks() {
            for id in block.instructions() {
                let instruction = match self.instruction(*id) {
                    Some(instruction) => instruction,
                    None => bail!(ErrorKind::Verify(format!(
                        "block 0x{:02x} refers to erased instruction {}",
                        block.index(),
                        id
                    ))),
                };
                if instruction.block() != block.index() {
                    bail!(ErrorKind::Verify(format!(
                        "{} is in block 0x{:02x} but believes it is in 0x{:02x}",
                        id,
                        block.index(),
                        instruction.block()
                    )));
                }
                expected.entry(*id).or_insert_with(Vec::new);
                for (index, operand) in instruction.operands().iter().enumerate() {
                    if let Some(Value::Instruction(producer)) = operand {
                        if !self.contains(*producer) {
                            bail!(ErrorKind::Verify(format!(
                                "{} reads erased instruction {}",
                                id, producer
                            )));
                        }
                        expected
                            .entry(*producer)
                            .or_insert_with(Vec::new)
                            .push(Use::new(*id, index));
                    }
                }
            }
        }

        if expected.len() != self.num_instructions() {
            bail!(ErrorKind::Verify(String::from(
                "a live instruction is not in any block"
            )));
        }

        for debug_value in &self.debug_values {
            if let Some(Value::Instruction(id)) = debug_value.location() {
                if !self.contains(*id) {
                    bail!(ErrorKind::Verify(format!(
                        "debug value of {} refers to erased instruction {}",
                        debug_value.variable(),
                        id
                    )));
                }
            }
        }

        for (id, mut uses) in expected {
            let mut actual = self.try_instruction(id)?.uses().to_vec();
            uses.sort();
            actual.sort();
            if uses != actual {
                bail!(ErrorKind::Verify(format!(
                    "use-list of {} is inconsistent with its readers",
                    id
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let arguments = self
            .arguments
            .iter()
            .enumerate()
            .map(|(index, ty)| format!("{} %arg{}", ty, index))
            .collect::<Vec<String>>();
        writeln!(f, "function @{}({}) {{", self.name, arguments.join(", "))?;
        for block in self.blocks() {
            writeln!(f, "{}", block)?;
            for instruction in block
                .instructions()
                .iter()
                .filter_map(|id| self.instruction(*id))
            {
                writeln!(f, "  {}", instruction)?;
            }
        }
        for edge in self.edges() {
            writeln!(f, "{}", edge)?;
        }
        for debug_value in self.debug_values() {
            writeln!(f, "{}", debug_value)?;
        }
        write!(f, "}}")
    }
}
