use std::fmt;

use hashbrown::HashMap;

use super::parse_error::ParseError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    /// Parameters of an arrow function, shared with the arrow function's body
    ArrowParameters,
    StaticBlock,
    Block,
    Switch,
    /// Catch parameters, shared with the catch clause's body
    Catch,
    /// Lexical declarations in the head of a for statement
    ForHead,
}

impl ScopeKind {
    /// Whether `var` declarations are hoisted to this scope.
    fn is_var_scope(self) -> bool {
        matches!(
            self,
            ScopeKind::Global | ScopeKind::Function | ScopeKind::ArrowParameters | ScopeKind::StaticBlock
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameKind {
    Var,
    Const,
    Let,
    Function,
    FunctionParameter,
    Class,
    CatchParameter,
    Import,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let str = match self {
            NameKind::Var => "var",
            NameKind::Const => "const",
            NameKind::Let => "let",
            NameKind::Function => "function",
            NameKind::FunctionParameter => "function parameter",
            NameKind::Class => "class",
            NameKind::CatchParameter => "catch parameter",
            NameKind::Import => "import",
        };

        f.write_str(str)
    }
}

struct Scope {
    kind: ScopeKind,
    lexical_names: HashMap<String, NameKind>,
    /// Var declared names hoisted through or into this scope, including function parameters
    var_names: HashMap<String, NameKind>,
    /// Catch clause with a single identifier parameter, which `var` may redeclare in sloppy mode
    has_simple_catch_parameter: bool,
}

impl Scope {
    fn new(kind: ScopeKind) -> Scope {
        Scope {
            kind,
            lexical_names: HashMap::new(),
            var_names: HashMap::new(),
            has_simple_catch_parameter: false,
        }
    }
}

/// Stack of the scopes enclosing the current parse position, used to detect conflicting
/// declarations as they are parsed.
pub struct ScopeTracker {
    scopes: Vec<Scope>,
}

impl ScopeTracker {
    pub fn new() -> ScopeTracker {
        ScopeTracker { scopes: vec![Scope::new(ScopeKind::Global)] }
    }

    pub fn enter_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope::new(kind));
    }

    pub fn enter_catch_scope(&mut self, has_simple_parameter: bool) {
        let mut scope = Scope::new(ScopeKind::Catch);
        scope.has_simple_catch_parameter = has_simple_parameter;
        self.scopes.push(scope);
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.scopes
            .last()
            .map(|scope| scope.kind)
            .unwrap_or(ScopeKind::Global)
    }

    fn current_scope_mut(&mut self) -> Option<&mut Scope> {
        self.scopes.last_mut()
    }

    /// Add a lexically declared name in the current scope. Error if this name conflicts with any
    /// name declared in or hoisted through the current scope.
    pub fn declare_lexical(
        &mut self,
        name: &str,
        kind: NameKind,
        is_strict: bool,
    ) -> Result<(), ParseError> {
        let Some(scope) = self.current_scope_mut() else {
            return Ok(());
        };

        if let Some(existing_kind) = scope.lexical_names.get(name) {
            // Sloppy mode allows duplicate function declarations directly in blocks
            let is_block = matches!(scope.kind, ScopeKind::Block | ScopeKind::Switch);
            if !(is_block
                && !is_strict
                && kind == NameKind::Function
                && *existing_kind == NameKind::Function)
            {
                return Err(ParseError::NameRedeclaration(name.to_owned(), *existing_kind));
            }
        }

        if let Some(existing_kind) = scope.var_names.get(name) {
            return Err(ParseError::NameRedeclaration(name.to_owned(), *existing_kind));
        }

        scope.lexical_names.insert(name.to_owned(), kind);

        Ok(())
    }

    /// Add a var declared name, hoisted from the current scope to the closest var scope. Error if
    /// this name conflicts with a lexically declared name in any scope it is hoisted through.
    pub fn declare_var(
        &mut self,
        name: &str,
        kind: NameKind,
        is_strict: bool,
    ) -> Result<(), ParseError> {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(existing_kind) = scope.lexical_names.get(name) {
                let is_catch_redeclaration = *existing_kind == NameKind::CatchParameter
                    && scope.has_simple_catch_parameter
                    && !is_strict;

                if !is_catch_redeclaration {
                    return Err(ParseError::NameRedeclaration(name.to_owned(), *existing_kind));
                }
            }

            scope.var_names.entry(name.to_owned()).or_insert(kind);

            if scope.kind.is_var_scope() {
                break;
            }
        }

        Ok(())
    }

    /// Parameters live alongside var declarations in the function scope. Duplicate parameters are
    /// checked separately since whether they are allowed depends on the entire parameter list.
    pub fn declare_parameter(&mut self, name: &str) {
        if let Some(scope) = self.current_scope_mut() {
            scope
                .var_names
                .insert(name.to_owned(), NameKind::FunctionParameter);
        }
    }

    /// Function declarations directly in a script, function body, or static block are var scoped.
    /// Everywhere else, including the top level of a module, they are lexically scoped.
    pub fn declare_function(
        &mut self,
        name: &str,
        is_strict: bool,
        is_module: bool,
    ) -> Result<(), ParseError> {
        let kind = self.current_kind();
        let is_var_scoped = match kind {
            ScopeKind::Global => !is_module,
            ScopeKind::Function | ScopeKind::StaticBlock | ScopeKind::ArrowParameters => true,
            _ => false,
        };

        if is_var_scoped {
            self.declare_var(name, NameKind::Function, is_strict)
        } else {
            self.declare_lexical(name, NameKind::Function, is_strict)
        }
    }

    /// Whether a name is declared at the top level of the program.
    pub fn is_declared_at_top_level(&self, name: &str) -> bool {
        match self.scopes.first() {
            Some(scope) => scope.lexical_names.contains_key(name) || scope.var_names.contains_key(name),
            None => false,
        }
    }
}

impl Default for ScopeTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_redeclaration(result: Result<(), ParseError>) -> bool {
        matches!(result, Err(ParseError::NameRedeclaration(..)))
    }

    #[test]
    fn lexical_conflicts_with_var() {
        let mut scopes = ScopeTracker::new();
        scopes.declare_var("a", NameKind::Var, false).unwrap();
        assert!(is_redeclaration(scopes.declare_lexical("a", NameKind::Let, false)));

        scopes.declare_lexical("b", NameKind::Let, false).unwrap();
        assert!(is_redeclaration(scopes.declare_var("b", NameKind::Var, false)));
        assert!(is_redeclaration(scopes.declare_lexical("b", NameKind::Const, false)));
    }

    #[test]
    fn var_hoists_through_blocks() {
        let mut scopes = ScopeTracker::new();
        scopes.enter_scope(ScopeKind::Block);
        scopes.declare_var("x", NameKind::Var, false).unwrap();
        scopes.exit_scope();

        assert!(is_redeclaration(scopes.declare_lexical("x", NameKind::Let, false)));
        assert!(scopes.is_declared_at_top_level("x"));
    }

    #[test]
    fn var_stops_at_function_scope() {
        let mut scopes = ScopeTracker::new();
        scopes.declare_lexical("x", NameKind::Let, false).unwrap();

        scopes.enter_scope(ScopeKind::Function);
        scopes.declare_var("x", NameKind::Var, false).unwrap();
        scopes.exit_scope();

        assert!(!scopes.is_declared_at_top_level("y"));
    }

    #[test]
    fn parameters_conflict_with_body_lexical_names() {
        let mut scopes = ScopeTracker::new();
        scopes.enter_scope(ScopeKind::Function);
        scopes.declare_parameter("a");

        scopes.declare_var("a", NameKind::Var, false).unwrap();
        assert!(is_redeclaration(scopes.declare_lexical("a", NameKind::Let, false)));
    }

    #[test]
    fn sloppy_block_function_duplicates() {
        let mut scopes = ScopeTracker::new();
        scopes.enter_scope(ScopeKind::Block);
        scopes.declare_function("f", false, false).unwrap();
        scopes.declare_function("f", false, false).unwrap();
        assert!(is_redeclaration(scopes.declare_function("f", true, false)));
    }

    #[test]
    fn catch_parameter_redeclared_by_var() {
        let mut scopes = ScopeTracker::new();
        scopes.enter_catch_scope(true);
        scopes
            .declare_lexical("e", NameKind::CatchParameter, false)
            .unwrap();

        scopes.declare_var("e", NameKind::Var, false).unwrap();
        assert!(is_redeclaration(scopes.declare_var("e", NameKind::Var, true)));
        assert!(is_redeclaration(scopes.declare_lexical("e", NameKind::Let, false)));
    }

    #[test]
    fn module_functions_are_lexical() {
        let mut scopes = ScopeTracker::new();
        scopes.declare_function("f", true, true).unwrap();
        assert!(is_redeclaration(scopes.declare_var("f", NameKind::Var, true)));
    }
}
