use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of the result of an instruction.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Type {
    Void,
    Integer(usize),
    Float(usize),
    Pointer,
    Vector(usize, Box<Type>),
}

impl Type {
    pub fn int(bits: usize) -> Type {
        Type::Integer(bits)
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Type::Integer(_) => true,
            _ => false,
        }
    }

    /// The width of this type, if it is a scalar integer.
    pub fn integer_bits(&self) -> Option<usize> {
        match self {
            Type::Integer(bits) => Some(*bits),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        match self {
            Type::Void => true,
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Integer(bits) => write!(f, "i{}", bits),
            Type::Float(32) => write!(f, "float"),
            Type::Float(64) => write!(f, "double"),
            Type::Float(bits) => write!(f, "f{}", bits),
            Type::Pointer => write!(f, "ptr"),
            Type::Vector(lanes, element) => write!(f, "<{} x {}>", lanes, element),
        }
    }
}
