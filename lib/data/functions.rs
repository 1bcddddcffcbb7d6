use std::collections::HashMap;

lazy_static! {
    /// Statically defined effects of common C library functions
    pub static ref FUNCTIONS: LibraryFunctions = LibraryFunctions::create();
}

/// How a function may touch memory visible to its caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MemoryEffects {
    None,
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl MemoryEffects {
    pub fn writes(&self) -> bool {
        match self {
            MemoryEffects::WriteOnly | MemoryEffects::ReadWrite => true,
            MemoryEffects::None | MemoryEffects::ReadOnly => false,
        }
    }
}

/// The role a function plays in heap management.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Allocation {
    /// Returns fresh memory nothing else can observe until the result is used.
    Allocates,
    /// Releases the memory its first argument points to. Releasing null does
    /// nothing.
    Frees,
}

#[derive(Clone, Debug)]
pub struct FunctionDeclaration {
    name: String,
    memory_effects: MemoryEffects,
    no_return: bool,
    allocation: Option<Allocation>,
}

impl FunctionDeclaration {
    pub fn new<S: Into<String>>(
        name: S,
        memory_effects: MemoryEffects,
        no_return: bool,
    ) -> FunctionDeclaration {
        FunctionDeclaration {
            name: name.into(),
            memory_effects,
            no_return,
            allocation: None,
        }
    }

    pub fn with_allocation(mut self, allocation: Allocation) -> FunctionDeclaration {
        self.allocation = Some(allocation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn memory_effects(&self) -> MemoryEffects {
        self.memory_effects
    }
    pub fn no_return(&self) -> bool {
        self.no_return
    }
    pub fn allocation(&self) -> Option<Allocation> {
        self.allocation
    }

    /// A call to this function is observable even when its result is unused.
    ///
    /// An allocation nobody reads is unobservable, whatever the allocator
    /// does to its own bookkeeping.
    pub fn has_side_effects(&self) -> bool {
        if self.allocation == Some(Allocation::Allocates) {
            return false;
        }
        self.no_return || self.memory_effects.writes()
    }
}

/// A table of known functions, consulted when classifying calls.
#[derive(Clone, Debug, Default)]
pub struct LibraryFunctions {
    functions: HashMap<String, FunctionDeclaration>,
}

impl LibraryFunctions {
    /// An empty table. Every call is treated as having side effects.
    pub fn new() -> LibraryFunctions {
        LibraryFunctions {
            functions: HashMap::new(),
        }
    }

    pub fn create() -> LibraryFunctions {
        let mut functions = LibraryFunctions::new();

        for name in &[
            "abs", "labs", "llabs", "fabs", "sqrt", "sin", "cos", "tan", "exp", "log", "pow",
            "floor", "ceil", "isdigit", "isalpha", "isspace", "toupper", "tolower",
        ] {
            functions.push_function_declaration(FunctionDeclaration::new(
                *name,
                MemoryEffects::None,
                false,
            ));
        }

        for name in &["strlen", "strcmp", "strncmp", "memcmp", "strchr", "getenv"] {
            functions.push_function_declaration(FunctionDeclaration::new(
                *name,
                MemoryEffects::ReadOnly,
                false,
            ));
        }

        for name in &["memcpy", "memmove", "memset"] {
            functions.push_function_declaration(FunctionDeclaration::new(
                *name,
                MemoryEffects::WriteOnly,
                false,
            ));
        }

        for name in &["printf", "fprintf", "puts", "putchar", "fflush", "fopen", "realloc"] {
            functions.push_function_declaration(FunctionDeclaration::new(
                *name,
                MemoryEffects::ReadWrite,
                false,
            ));
        }

        for name in &["malloc", "calloc", "strdup", "strndup"] {
            functions.push_function_declaration(
                FunctionDeclaration::new(*name, MemoryEffects::ReadWrite, false)
                    .with_allocation(Allocation::Allocates),
            );
        }

        functions.push_function_declaration(
            FunctionDeclaration::new("free", MemoryEffects::ReadWrite, false)
                .with_allocation(Allocation::Frees),
        );

        for name in &["exit", "abort", "__stack_chk_fail"] {
            functions.push_function_declaration(FunctionDeclaration::new(
                *name,
                MemoryEffects::ReadWrite,
                true,
            ));
        }

        functions
    }

    pub fn push_function_declaration(&mut self, function_declaration: FunctionDeclaration) {
        self.functions.insert(
            function_declaration.name().to_string(),
            function_declaration,
        );
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDeclaration> {
        self.functions.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_and_read_only_functions_have_no_side_effects() {
        assert!(!FUNCTIONS.function("abs").unwrap().has_side_effects());
        assert!(!FUNCTIONS.function("strlen").unwrap().has_side_effects());
    }

    #[test]
    fn writing_and_non_returning_functions_have_side_effects() {
        assert!(FUNCTIONS.function("memset").unwrap().has_side_effects());
        assert!(FUNCTIONS.function("exit").unwrap().has_side_effects());
    }

    #[test]
    fn unused_allocations_have_no_side_effects() {
        let malloc = FUNCTIONS.function("malloc").unwrap();
        assert_eq!(malloc.allocation(), Some(Allocation::Allocates));
        assert!(!malloc.has_side_effects());

        let free = FUNCTIONS.function("free").unwrap();
        assert_eq!(free.allocation(), Some(Allocation::Frees));
        assert!(free.has_side_effects());

        assert!(FUNCTIONS.function("realloc").unwrap().has_side_effects());
    }

    #[test]
    fn declarations_can_be_added() {
        let mut functions = LibraryFunctions::new();
        assert!(functions.function("hash").is_none());
        functions.push_function_declaration(FunctionDeclaration::new(
            "hash",
            MemoryEffects::ReadOnly,
            false,
        ));
        assert_eq!(
            functions.function("hash").unwrap().memory_effects(),
            MemoryEffects::ReadOnly
        );
    }
}
