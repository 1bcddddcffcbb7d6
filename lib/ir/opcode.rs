use crate::data::LibraryFunctions;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer comparison predicates for `icmp`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Predicate {
    Eq,
    Ne,
    Ult,
    Ule,
    Ugt,
    Uge,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Predicate::Eq => "eq",
            Predicate::Ne => "ne",
            Predicate::Ult => "ult",
            Predicate::Ule => "ule",
            Predicate::Ugt => "ugt",
            Predicate::Uge => "uge",
            Predicate::Slt => "slt",
            Predicate::Sle => "sle",
            Predicate::Sgt => "sgt",
            Predicate::Sge => "sge",
        };
        write!(f, "{}", s)
    }
}

/// Whether executing an instruction can be observed other than through its
/// result.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SideEffects {
    /// Removing the instruction is unobservable once its result is unused.
    None,
    /// Writes memory, transfers control, or calls something which might.
    MayHaveSideEffects,
    /// The host gave us nothing to classify this with.
    Unknown,
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    UDiv,
    SDiv,
    URem,
    SRem,
    Shl,
    LShr,
    AShr,
    And,
    Or,
    Xor,
    FAdd,
    FSub,
    FMul,
    FDiv,
    ICmp(Predicate),
    Trunc,
    ZExt,
    SExt,
    Select,
    /// Incoming block indices, parallel to the operands.
    Phi(Vec<usize>),
    Alloca,
    Load { volatile: bool },
    Store { volatile: bool },
    /// A direct call to the named function.
    Call(String),
    Br,
    CondBr,
    Ret,
    Unreachable,
    /// An opcode only the host understands.
    Other(String),
}

impl Opcode {
    pub fn is_binary(&self) -> bool {
        match self {
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::UDiv
            | Opcode::SDiv
            | Opcode::URem
            | Opcode::SRem
            | Opcode::Shl
            | Opcode::LShr
            | Opcode::AShr
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::FAdd
            | Opcode::FSub
            | Opcode::FMul
            | Opcode::FDiv => true,
            _ => false,
        }
    }

    pub fn is_commutative(&self) -> bool {
        match self {
            Opcode::Add | Opcode::Mul | Opcode::And | Opcode::Or | Opcode::Xor => true,
            _ => false,
        }
    }

    pub fn is_cast(&self) -> bool {
        match self {
            Opcode::Trunc | Opcode::ZExt | Opcode::SExt => true,
            _ => false,
        }
    }

    pub fn is_terminator(&self) -> bool {
        match self {
            Opcode::Br | Opcode::CondBr | Opcode::Ret | Opcode::Unreachable => true,
            _ => false,
        }
    }

    pub fn is_call(&self) -> bool {
        match self {
            Opcode::Call(_) => true,
            _ => false,
        }
    }

    pub fn callee(&self) -> Option<&str> {
        match self {
            Opcode::Call(callee) => Some(callee),
            _ => None,
        }
    }

    /// Classify the side effects of this opcode. Calls are classified by
    /// looking the callee up in `library`.
    ///
    /// Every opcode is listed here explicitly, so adding an opcode forces a
    /// decision about whether dead-code elimination may remove it.
    pub fn side_effects(&self, library: &LibraryFunctions) -> SideEffects {
        match self {
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::UDiv
            | Opcode::SDiv
            | Opcode::URem
            | Opcode::SRem
            | Opcode::Shl
            | Opcode::LShr
            | Opcode::AShr
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::FAdd
            | Opcode::FSub
            | Opcode::FMul
            | Opcode::FDiv
            | Opcode::ICmp(_)
            | Opcode::Trunc
            | Opcode::ZExt
            | Opcode::SExt
            | Opcode::Select
            | Opcode::Phi(_)
            | Opcode::Alloca
            | Opcode::Load { volatile: false } => SideEffects::None,
            Opcode::Load { volatile: true }
            | Opcode::Store { .. }
            | Opcode::Br
            | Opcode::CondBr
            | Opcode::Ret
            | Opcode::Unreachable => SideEffects::MayHaveSideEffects,
            Opcode::Call(callee) => match library.function(callee) {
                Some(declaration) => {
                    if declaration.has_side_effects() {
                        SideEffects::MayHaveSideEffects
                    } else {
                        SideEffects::None
                    }
                }
                None => SideEffects::MayHaveSideEffects,
            },
            Opcode::Other(_) => SideEffects::Unknown,
        }
    }

    pub fn mnemonic(&self) -> &str {
        match self {
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::UDiv => "udiv",
            Opcode::SDiv => "sdiv",
            Opcode::URem => "urem",
            Opcode::SRem => "srem",
            Opcode::Shl => "shl",
            Opcode::LShr => "lshr",
            Opcode::AShr => "ashr",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::FAdd => "fadd",
            Opcode::FSub => "fsub",
            Opcode::FMul => "fmul",
            Opcode::FDiv => "fdiv",
            Opcode::ICmp(_) => "icmp",
            Opcode::Trunc => "trunc",
            Opcode::ZExt => "zext",
            Opcode::SExt => "sext",
            Opcode::Select => "select",
            Opcode::Phi(_) => "phi",
            Opcode::Alloca => "alloca",
            Opcode::Load { .. } => "load",
            Opcode::Store { .. } => "store",
            Opcode::Call(_) => "call",
            Opcode::Br | Opcode::CondBr => "br",
            Opcode::Ret => "ret",
            Opcode::Unreachable => "unreachable",
            Opcode::Other(name) => name,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Opcode::ICmp(predicate) => write!(f, "icmp {}", predicate),
            Opcode::Load { volatile: true } => write!(f, "load volatile"),
            Opcode::Store { volatile: true } => write!(f, "store volatile"),
            Opcode::Call(callee) => write!(f, "call @{}", callee),
            _ => write!(f, "{}", self.mnemonic()),
        }
    }
}
