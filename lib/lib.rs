//! Dead-code elimination and Mixed-Boolean-Arithmetic rewrites over a small
//! def-use IR.
//!
//! Functions hold basic blocks in a `falcon` control-flow graph, and every
//! instruction keeps an exact list of the operand slots which read its
//! result. The transforms in [`transforms`] mutate that graph in place and
//! report whether anything changed. The [`passes`] module wraps them for a
//! host which runs named pipelines over a [`ir::Program`].

extern crate falcon;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate serde;

pub mod data;
pub mod ir;
pub mod passes;
pub mod transforms;

pub mod error {
    error_chain! {
        types {
            Error, ErrorKind, ResultExt, Result;
        }

        foreign_links {
            Falcon(::falcon::error::Error);
        }

        errors {
            InvalidInstruction(index: usize) {
                description("An instruction handle did not refer to a live instruction")
                display("Instruction %{} does not exist in this function", index)
            }
            InvalidOperand(instruction: usize, operand: usize) {
                description("An operand slot was out of range")
                display("Instruction %{} has no operand slot {}", instruction, operand)
            }
            InvalidBlock(index: usize) {
                description("A block index did not refer to a block")
                display("Block 0x{:02x} does not exist in this function", index)
            }
            Eval(m: String) {
                description("An instruction could not be evaluated")
                display("Evaluation error: {}", m)
            }
            UnknownPass(name: String) {
                description("A pipeline named a pass which is not registered")
                display("Unknown pass \"{}\"", name)
            }
            Verify(m: String) {
                description("The def-use graph of a function is inconsistent")
                display("Verification failed: {}", m)
            }
        }
    }
}
