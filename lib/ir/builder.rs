use crate::error::*;
use crate::ir::*;

/// Creates instructions immediately before an anchor instruction, in the
/// order they are built.
pub struct Builder<'f> {
    function: &'f mut Function,
    anchor: InstructionId,
}

impl<'f> Builder<'f> {
    pub fn before(function: &'f mut Function, anchor: InstructionId) -> Builder<'f> {
        Builder { function, anchor }
    }

    /// A constant of integer type `ty`.
    pub fn constant(&self, ty: &Type, value: u64) -> Result<Value> {
        match ty.integer_bits() {
            Some(bits) => Ok(const_(value, bits).into()),
            None => bail!("Builder::constant requires an integer type, got {}", ty),
        }
    }

    pub fn binary(
        &mut self,
        opcode: Opcode,
        ty: &Type,
        lhs: Value,
        rhs: Value,
    ) -> Result<InstructionId> {
        let id = self
            .function
            .insert_before(self.anchor, opcode, ty.clone(), vec![lhs, rhs])?;
        trace!("built {}", self.function.try_instruction(id)?);
        Ok(id)
    }

    pub fn add(&mut self, ty: &Type, lhs: Value, rhs: Value) -> Result<InstructionId> {
        self.binary(Opcode::Add, ty, lhs, rhs)
    }

    pub fn mul(&mut self, ty: &Type, lhs: Value, rhs: Value) -> Result<InstructionId> {
        self.binary(Opcode::Mul, ty, lhs, rhs)
    }

    pub fn and(&mut self, ty: &Type, lhs: Value, rhs: Value) -> Result<InstructionId> {
        self.binary(Opcode::And, ty, lhs, rhs)
    }

    pub fn xor(&mut self, ty: &Type, lhs: Value, rhs: Value) -> Result<InstructionId> {
        self.binary(Opcode::Xor, ty, lhs, rhs)
    }

    /// Bitwise not, as `xor value, -1`.
    pub fn not(&mut self, ty: &Type, value: Value) -> Result<InstructionId> {
        let bits = match ty.integer_bits() {
            Some(bits) => bits,
            None => bail!("Builder::not requires an integer type, got {}", ty),
        };
        self.xor(ty, value, all_ones(bits)?.into())
    }
}
