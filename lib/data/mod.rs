//! Static data definitions

mod functions;

pub use self::functions::{
    Allocation, FunctionDeclaration, LibraryFunctions, MemoryEffects, FUNCTIONS,
};
