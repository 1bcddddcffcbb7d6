use std::fmt;

/// Which of the host's cached analyses are still valid after a pass.
///
/// Variants are ordered from least to most preserved.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PreservedAnalyses {
    /// Everything must be recomputed.
    None,
    /// Blocks and edges are untouched, so control-flow analyses survive.
    ControlFlow,
    /// Nothing changed.
    All,
}

impl PreservedAnalyses {
    /// The result of a pass which makes no promises about what it changed.
    pub fn from_changed(changed: bool) -> PreservedAnalyses {
        if changed {
            PreservedAnalyses::None
        } else {
            PreservedAnalyses::All
        }
    }

    /// What is still preserved after running two passes in sequence.
    pub fn intersect(self, other: PreservedAnalyses) -> PreservedAnalyses {
        ::std::cmp::min(self, other)
    }

    pub fn preserves_control_flow(&self) -> bool {
        *self >= PreservedAnalyses::ControlFlow
    }

    pub fn is_all(&self) -> bool {
        *self == PreservedAnalyses::All
    }
}

impl fmt::Display for PreservedAnalyses {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PreservedAnalyses::None => write!(f, "none"),
            PreservedAnalyses::ControlFlow => write!(f, "cfg"),
            PreservedAnalyses::All => write!(f, "all"),
        }
    }
}
