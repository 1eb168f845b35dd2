use bitflags::bitflags;

bitflags! {
    /// Grammatical context that the current production is parsed in. Passed down by value, so a
    /// child production never changes the context of its parent.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Context: u16 {
        const STRICT = 1 << 0;
        const MODULE = 1 << 1;
        /// Inside a function body, where `return` is allowed
        const IN_FUNCTION = 1 << 2;
        const IN_GENERATOR = 1 << 3;
        const IN_ASYNC = 1 << 4;
        /// Inside a formal parameter list, where `yield` and `await` expressions are banned
        const IN_PARAMETERS = 1 << 5;
        /// The `in` operator may appear in relational expressions. Cleared in for statement heads.
        const ALLOW_IN = 1 << 6;
        /// Inside a loop body, where `continue` is allowed
        const ITERATION = 1 << 7;
        /// Inside a loop or switch body, where an unlabeled `break` is allowed
        const BREAKABLE = 1 << 8;
        /// Inside a class field initializer or static block, where `arguments` is banned
        const CLASS_FIELD_INIT = 1 << 9;
        const STATIC_BLOCK = 1 << 10;
        /// `super(...)` is allowed, only in derived class constructors
        const SUPER_CALL = 1 << 11;
        /// `super.x` and `super[x]` are allowed, in methods and class initializers
        const SUPER_PROPERTY = 1 << 12;
        /// `new.target` is allowed, in any non-arrow function or class initializer
        const NEW_TARGET = 1 << 13;
    }
}

impl Context {
    /// Context at the top level of a script.
    pub fn script(is_strict: bool, allow_return: bool) -> Context {
        let mut context = Context::ALLOW_IN;
        context.set(Context::STRICT, is_strict);
        context.set(Context::IN_FUNCTION, allow_return);
        context
    }

    /// Context at the top level of a module. Modules are strict and allow top level await.
    pub fn module() -> Context {
        Context::STRICT | Context::MODULE | Context::IN_ASYNC | Context::ALLOW_IN
    }

    /// Context for the parameters and body of a non-arrow function. Only strictness and module
    /// membership are inherited from the enclosing context.
    pub fn for_function(self, is_async: bool, is_generator: bool) -> Context {
        let mut context = (self & (Context::STRICT | Context::MODULE))
            | Context::IN_FUNCTION
            | Context::NEW_TARGET
            | Context::ALLOW_IN;
        context.set(Context::IN_ASYNC, is_async);
        context.set(Context::IN_GENERATOR, is_generator);
        context
    }

    /// Context for the body of an arrow function, which shares `this`, `super`, and `new.target`
    /// with its enclosing context. Expression bodies inherit whether `in` is allowed.
    pub fn for_arrow_body(self, is_async: bool) -> Context {
        let mut context = (self
            - Context::IN_GENERATOR
            - Context::ITERATION
            - Context::BREAKABLE
            - Context::IN_PARAMETERS)
            | Context::IN_FUNCTION;
        context.set(Context::IN_ASYNC, is_async);
        context
    }

    /// Context for class field initializers and static blocks.
    pub fn for_class_initializer(self, is_static_block: bool) -> Context {
        let mut context = (self & Context::MODULE)
            | Context::STRICT
            | Context::CLASS_FIELD_INIT
            | Context::SUPER_PROPERTY
            | Context::NEW_TARGET
            | Context::ALLOW_IN;
        context.set(Context::STATIC_BLOCK, is_static_block);
        context
    }

    #[inline]
    pub fn is_strict(self) -> bool {
        self.contains(Context::STRICT)
    }

    #[inline]
    pub fn is_module(self) -> bool {
        self.contains(Context::MODULE)
    }

    #[inline]
    pub fn allow_in(self) -> bool {
        self.contains(Context::ALLOW_IN)
    }

    /// `yield` is an identifier outside of generators in sloppy mode.
    pub fn is_yield_reserved(self) -> bool {
        self.intersects(Context::IN_GENERATOR | Context::STRICT)
    }

    /// `await` is an identifier outside of async functions, modules, and static blocks.
    pub fn is_await_reserved(self) -> bool {
        self.intersects(Context::IN_ASYNC | Context::MODULE | Context::STATIC_BLOCK)
    }

    /// Whether this name cannot be used as an identifier reference or binding in this context.
    pub fn is_reserved_word(self, name: &str) -> bool {
        match name {
            "break" | "case" | "catch" | "class" | "const" | "continue" | "debugger" | "default"
            | "delete" | "do" | "else" | "enum" | "export" | "extends" | "false" | "finally"
            | "for" | "function" | "if" | "import" | "in" | "instanceof" | "new" | "null"
            | "return" | "super" | "switch" | "this" | "throw" | "true" | "try" | "typeof"
            | "var" | "void" | "while" | "with" => true,
            "implements" | "interface" | "let" | "package" | "private" | "protected" | "public"
            | "static" => self.is_strict(),
            "yield" => self.is_yield_reserved(),
            "await" => self.is_await_reserved(),
            _ => false,
        }
    }
}

/// `eval` and `arguments` cannot be bound or assigned in strict mode.
pub fn is_restricted_binding_name(name: &str) -> bool {
    name == "eval" || name == "arguments"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_depend_on_context() {
        let sloppy = Context::script(false, false);
        let strict = Context::script(true, false);

        assert!(sloppy.is_reserved_word("class"));
        assert!(!sloppy.is_reserved_word("let"));
        assert!(strict.is_reserved_word("let"));
        assert!(!sloppy.is_reserved_word("yield"));
        assert!(strict.is_reserved_word("yield"));
        assert!(!sloppy.is_reserved_word("await"));
        assert!(Context::module().is_reserved_word("await"));
        assert!(!strict.is_reserved_word("of"));
    }

    #[test]
    fn function_boundaries_reset_context() {
        let outer = Context::module() | Context::ITERATION | Context::SUPER_PROPERTY;
        let function = outer.for_function(false, true);

        assert!(function.is_strict());
        assert!(function.contains(Context::IN_GENERATOR));
        assert!(!function.contains(Context::IN_ASYNC));
        assert!(!function.contains(Context::ITERATION));
        assert!(!function.contains(Context::SUPER_PROPERTY));

        let arrow = function.for_arrow_body(false);
        assert!(!arrow.contains(Context::IN_GENERATOR));
        assert!(arrow.contains(Context::NEW_TARGET));
    }
}
