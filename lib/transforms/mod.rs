//! Transforms which mutate a function in place and report whether anything
//! changed.

mod dead_code_elimination;
mod mba;

pub use self::dead_code_elimination::{
    dead_code_elimination, dead_code_elimination_with, is_trivially_dead,
};
pub use self::mba::{mba_add, mba_sub};
