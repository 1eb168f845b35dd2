use std::rc::Rc;

use hashbrown::HashSet;
use tracing::{debug, trace};

use super::ast::*;
use super::context::{is_restricted_binding_name, Context};
use super::cover::CoverState;
use super::lexer::{Comment, Lexer, SavedLexerState};
use super::loc::{Loc, Pos, EMPTY_LOC};
use super::options::{ParseOptions, TokenEvent};
use super::parse_error::{
    InvalidDuplicateParametersReason, LocalizedParseError, ParseError, ParseResult,
};
use super::pattern::{
    reinterpret_as_assignment_target, reinterpret_as_binding_element,
    reinterpret_as_binding_pattern, reinterpret_as_simple_assignment_target, ReinterpretError,
};
use super::scope::{NameKind, ScopeKind, ScopeTracker};
use super::source::Source;
use super::token::{Precedence, Token, TokenFlags};

/// Nesting depth of statements, expressions, and patterns at which parsing is aborted.
const MAX_RECURSION_DEPTH: usize = 1024;

/// Parsing is also aborted when less than this much stack remains, since a single level of
/// nesting spans many frames.
const MIN_REMAINING_STACK: usize = 256 * 1024;

/// Length of the raw directive `"use strict"` including quotes.
const USE_STRICT_RAW_LENGTH: usize = 12;

struct LabelEntry {
    name: String,
    is_loop: bool,
}

/// Private names declared and referenced within a single class body.
#[derive(Default)]
struct PrivateNameScope {
    /// Declared names, along with whether the declaration was a getter, setter, or other element,
    /// and whether it was static.
    declared: Vec<(String, PrivateNameKind, bool)>,
    /// References that must be resolved by this class or an enclosing class.
    used: Vec<Identifier>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PrivateNameKind {
    Getter,
    Setter,
    Other,
}

/// The kind of function whose parameters and body are being parsed, which determines how the
/// parameter list is validated.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    Normal,
    Arrow,
    Method,
    Getter,
    Setter,
}

/// Directive prologue at the start of a program or function body.
struct DirectivePrologue {
    /// Location of the first "use strict" directive, if any
    use_strict_loc: Option<Loc>,
}

struct SavedParserState {
    lexer_state: SavedLexerState,
    token: Token,
    loc: Loc,
    prev_loc: Loc,
    token_flags: TokenFlags,
    num_token_events: usize,
    depth: usize,
    last_yield_or_await_pos: Option<Pos>,
    last_await_ident_pos: Option<Pos>,
}

/// The output of a successful parse, along with the comments and tokens that were collected.
pub struct ParsedProgram {
    pub program: Program,
    pub comments: Vec<Comment>,
    pub tokens: Vec<TokenEvent>,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    token: Token,
    loc: Loc,
    prev_loc: Loc,
    token_flags: TokenFlags,
    is_jsx: bool,
    is_next: bool,
    collect_tokens: bool,
    scopes: ScopeTracker,
    cover: CoverState,
    labels: Vec<LabelEntry>,
    /// Index of the first label in the run of labels directly preceding the statement that is
    /// about to be parsed.
    label_run_start: Option<usize>,
    private_names: Vec<PrivateNameScope>,
    exported_names: HashSet<String>,
    /// Local names in `export { a as b }` without a source, checked once the module is parsed
    export_local_refs: Vec<Identifier>,
    /// Start of the most recent yield or await expression in the current function
    last_yield_or_await_pos: Option<Pos>,
    /// Start of the most recent use of `await` as an identifier in the current function
    last_await_ident_pos: Option<Pos>,
    /// Start of the assignment expression currently being parsed. Arrow functions must start an
    /// assignment expression.
    assignment_start_pos: Pos,
    depth: usize,
    token_events: Vec<TokenEvent>,
}

/// Swap a new value into a reference, returning the old value.
#[inline]
fn swap_and_save<T>(reference: &mut T, new_value: T) -> T {
    std::mem::replace(reference, new_value)
}

impl<'a> Parser<'a> {
    fn new(lexer: Lexer<'a>, options: &ParseOptions) -> Parser<'a> {
        Parser {
            lexer,
            token: Token::Eof,
            loc: EMPTY_LOC,
            prev_loc: EMPTY_LOC,
            token_flags: TokenFlags::empty(),
            is_jsx: options.jsx,
            is_next: options.next,
            collect_tokens: options.on_token.is_some(),
            scopes: ScopeTracker::new(),
            cover: CoverState::new(),
            labels: vec![],
            label_run_start: None,
            private_names: vec![],
            exported_names: HashSet::new(),
            export_local_refs: vec![],
            last_yield_or_await_pos: None,
            last_await_ident_pos: None,
            assignment_start_pos: 0,
            depth: 0,
            token_events: vec![],
        }
    }

    fn error<T>(&self, loc: Loc, error: ParseError) -> ParseResult<T> {
        let source = (*self.lexer.source).clone();
        Err(LocalizedParseError { error, source_loc: Some((loc, source)) })
    }

    fn error_unexpected_token<T>(&self, loc: Loc, token: &Token) -> ParseResult<T> {
        self.error(loc, ParseError::UnexpectedToken(token.clone()))
    }

    fn error_expected_token<T>(&self, loc: Loc, actual: &Token, expected: &Token) -> ParseResult<T> {
        self.error(loc, ParseError::ExpectedToken(actual.clone(), expected.clone()))
    }

    fn reinterpret_error<T>(&self, error: ReinterpretError) -> ParseResult<T> {
        self.error(error.loc, error.error)
    }

    fn record_token_event(&mut self) {
        if !self.collect_tokens || self.token == Token::Eof {
            return;
        }

        let value = self.lexer.source.contents[self.loc.to_range()].to_owned();
        self.token_events
            .push(TokenEvent { kind: self.token.category(), value, loc: self.loc });
    }

    /// Replace the most recently recorded token, after the current token was rescanned.
    fn replace_last_token_event(&mut self) {
        if self.collect_tokens {
            self.token_events.pop();
            self.record_token_event();
        }
    }

    fn set_token(&mut self, (token, loc): (Token, Loc)) {
        self.prev_loc = self.loc;
        self.token = token;
        self.loc = loc;
        self.token_flags = self.lexer.flags();
        self.record_token_event();
    }

    fn advance(&mut self) -> ParseResult<()> {
        let next = self.lexer.next()?;
        self.set_token(next);
        Ok(())
    }

    /// Rescan the current `/` or `/=` token as a regular expression literal.
    fn rescan_regexp_literal(&mut self) -> ParseResult<()> {
        let (token, loc) = self.lexer.next_regexp_literal(self.loc.start)?;
        self.token = token;
        self.loc = loc;
        self.replace_last_token_event();
        Ok(())
    }

    /// Rescan the current `}` token as the continuation of a template literal.
    fn rescan_template_part(&mut self) -> ParseResult<()> {
        let (token, loc) = self.lexer.next_template_part(self.loc.start)?;
        self.token = token;
        self.loc = loc;
        self.replace_last_token_event();
        Ok(())
    }

    fn save(&self) -> SavedParserState {
        SavedParserState {
            lexer_state: self.lexer.save(),
            token: self.token.clone(),
            loc: self.loc,
            prev_loc: self.prev_loc,
            token_flags: self.token_flags,
            num_token_events: self.token_events.len(),
            depth: self.depth,
            last_yield_or_await_pos: self.last_yield_or_await_pos,
            last_await_ident_pos: self.last_await_ident_pos,
        }
    }

    fn restore(&mut self, save_state: SavedParserState) {
        self.lexer.restore(&save_state.lexer_state);
        self.token = save_state.token;
        self.loc = save_state.loc;
        self.prev_loc = save_state.prev_loc;
        self.token_flags = save_state.token_flags;
        self.token_events.truncate(save_state.num_token_events);
        self.depth = save_state.depth;
        self.last_yield_or_await_pos = save_state.last_yield_or_await_pos;
        self.last_await_ident_pos = save_state.last_await_ident_pos;
    }

    /// Run a speculative parse. If it does not succeed the parser is restored to where it was
    /// before the attempt. The speculative parse must not declare any names.
    fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<Option<T>>) -> Option<T> {
        let save_state = self.save();
        match f(self) {
            Ok(Some(result)) => Some(result),
            Ok(None) | Err(_) => {
                trace!(pos = save_state.loc.start, "speculative parse rejected");
                self.restore(save_state);
                None
            }
        }
    }

    /// Return the token after the current token, without advancing.
    fn peek(&mut self) -> ParseResult<(Token, TokenFlags)> {
        let save_state = self.lexer.save();
        let result = self.lexer.next();
        let flags = self.lexer.flags();
        self.lexer.restore(&save_state);

        let (token, _) = result?;
        Ok((token, flags))
    }

    fn peek_token(&mut self) -> ParseResult<Token> {
        Ok(self.peek()?.0)
    }

    #[inline]
    fn current_start_pos(&self) -> Pos {
        self.loc.start
    }

    #[inline]
    fn mark_loc(&self, start_pos: Pos) -> Loc {
        Loc { start: start_pos, end: self.prev_loc.end }
    }

    #[inline]
    fn is_escaped(&self) -> bool {
        self.token_flags.contains(TokenFlags::ESCAPED)
    }

    #[inline]
    fn has_newline_before(&self) -> bool {
        self.token_flags.contains(TokenFlags::NEW_LINE_BEFORE)
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.token != token {
            return self.error_expected_token(self.loc, &self.token, &token);
        }

        self.advance()?;
        Ok(())
    }

    fn expect_semicolon(&mut self) -> ParseResult<()> {
        match &self.token {
            Token::Semicolon => {
                self.advance()?;
                Ok(())
            }
            // Semicolons are automatically inserted before a closing brace, the end of input, or
            // a newline.
            Token::RightBrace | Token::Eof => Ok(()),
            _ if self.has_newline_before() => Ok(()),
            _ => self.error_expected_token(self.loc, &self.token, &Token::Semicolon),
        }
    }

    fn maybe_expect_semicolon(&mut self) -> ParseResult<()> {
        if self.token == Token::Semicolon {
            self.advance()?;
        }

        Ok(())
    }

    /// Run a parse function one level deeper, erroring if the maximum nesting depth is exceeded.
    fn with_recursion<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let stack_exhausted =
            stacker::remaining_stack().is_some_and(|remaining| remaining < MIN_REMAINING_STACK);
        if self.depth >= MAX_RECURSION_DEPTH || stack_exhausted {
            return self.error(self.loc, ParseError::TooMuchRecursion);
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        result
    }

    /// Parse in a fresh cover state. The result is used as a value, so any error pending on the
    /// result being reinterpreted as a pattern is raised.
    fn seclude<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let saved_cover = swap_and_save(&mut self.cover, CoverState::new());
        let result = f(self);
        let mut inner_cover = swap_and_save(&mut self.cover, saved_cover);

        let result = result?;
        if let Some((loc, error)) = inner_cover.take_pending_error() {
            return self.error(loc, error);
        }

        Ok(result)
    }

    /// Parse an element of an array, object, or parenthesized expression in a fresh cover state,
    /// then fold its state into the state of the enclosing expression.
    fn acquire<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let saved_cover = swap_and_save(&mut self.cover, CoverState::new());
        let result = f(self);
        let inner_cover = swap_and_save(&mut self.cover, saved_cover);

        let result = result?;
        self.cover.merge(inner_cover);

        Ok(result)
    }

    /// The expression just parsed is used as a value, so it can no longer be reinterpreted as a
    /// pattern.
    fn resolve_cover_as_value(&mut self) -> ParseResult<()> {
        if let Some((loc, error)) = self.cover.take_pending_error() {
            return self.error(loc, error);
        }

        self.cover.set(false, false);
        Ok(())
    }

    /// Whether the expression is an arrow function that was not wrapped in parentheses, and
    /// started at the given position.
    fn is_unparenthesized_arrow(expr: &Expression, start_pos: Pos) -> bool {
        matches!(expr, Expression::ArrowFunction(_)) && expr.pos() == start_pos
    }

    /// Name of the current token if it can be used as an identifier, including contextual
    /// keywords. Reserved words are checked separately.
    fn token_identifier_name(&self) -> Option<String> {
        match &self.token {
            Token::Identifier(name) => Some(name.clone()),
            Token::Async
            | Token::Of
            | Token::Static
            | Token::From
            | Token::As
            | Token::Get
            | Token::Set
            | Token::Await
            | Token::Yield
            | Token::Let
            | Token::Target
            | Token::Meta => self.token.keyword_str().map(|str| str.to_owned()),
            _ => None,
        }
    }

    /// Name of the current token if it can be used as a property name, which includes all
    /// keywords.
    fn token_property_name(&self) -> Option<String> {
        match &self.token {
            Token::Identifier(name) => Some(name.clone()),
            token => token.keyword_str().map(|str| str.to_owned()),
        }
    }

    #[inline]
    fn is_identifier_token(&self) -> bool {
        self.token_identifier_name().is_some()
    }

    /// Check whether a name may be used as an identifier reference or binding in this context.
    fn check_identifier_name(
        &self,
        ctx: Context,
        name: &str,
        loc: Loc,
        is_binding: bool,
        is_escaped: bool,
    ) -> ParseResult<()> {
        match name {
            "yield" => {
                if ctx.contains(Context::IN_GENERATOR) && ctx.contains(Context::IN_PARAMETERS) {
                    return self.error(loc, ParseError::YieldInParameters);
                }
            }
            "await" => {
                if ctx.contains(Context::STATIC_BLOCK) && !ctx.contains(Context::IN_ASYNC) {
                    return self.error(loc, ParseError::AwaitInStaticBlock);
                }

                if ctx.contains(Context::IN_ASYNC) && ctx.contains(Context::IN_PARAMETERS) {
                    return self.error(loc, ParseError::AwaitInParameters);
                }
            }
            _ => {}
        }

        if ctx.is_reserved_word(name) {
            if is_escaped {
                return self.error(loc, ParseError::EscapedKeyword);
            }

            return self.error(loc, ParseError::IdentifierIsReservedWord(name.to_owned()));
        }

        if is_binding && ctx.is_strict() && is_restricted_binding_name(name) {
            return self.error(loc, ParseError::StrictModeRestrictedBinding(name.to_owned()));
        }

        Ok(())
    }

    fn parse_identifier_reference(&mut self, ctx: Context) -> ParseResult<Identifier> {
        let Some(name) = self.token_identifier_name() else {
            return self.error_unexpected_token(self.loc, &self.token);
        };

        let loc = self.loc;
        self.check_identifier_name(ctx, &name, loc, false, self.is_escaped())?;

        if name == "await" {
            self.last_await_ident_pos = Some(loc.start);
        } else if name == "arguments" && ctx.contains(Context::CLASS_FIELD_INIT) {
            return self.error(loc, ParseError::ArgumentsInClassInitializer);
        }

        self.advance()?;

        Ok(Identifier::new(loc, name))
    }

    fn parse_binding_identifier(&mut self, ctx: Context) -> ParseResult<Identifier> {
        let Some(name) = self.token_identifier_name() else {
            return self.error_unexpected_token(self.loc, &self.token);
        };

        let loc = self.loc;
        self.check_identifier_name(ctx, &name, loc, true, self.is_escaped())?;
        self.advance()?;

        Ok(Identifier::new(loc, name))
    }

    /// Parse an identifier name, which may be any keyword.
    fn parse_identifier_name(&mut self) -> ParseResult<Identifier> {
        let Some(name) = self.token_property_name() else {
            return self.error_unexpected_token(self.loc, &self.token);
        };

        let loc = self.loc;
        self.advance()?;

        Ok(Identifier::new(loc, name))
    }

    /// Record a reference to a private name, which must be declared by an enclosing class.
    fn use_private_name(&mut self, id: &Identifier) -> ParseResult<()> {
        match self.private_names.last_mut() {
            Some(scope) => {
                scope.used.push(id.clone());
                Ok(())
            }
            None => self.error(id.loc, ParseError::PrivateNameOutsideClass),
        }
    }

    fn parse_private_name(&mut self) -> ParseResult<Identifier> {
        let Token::PrivateName(name) = &self.token else {
            return self.error_unexpected_token(self.loc, &self.token);
        };

        let id = Identifier::new(self.loc, name.clone());
        self.advance()?;
        self.use_private_name(&id)?;

        Ok(id)
    }

    /// Numeric and string literals may carry legacy octal syntax that is only allowed in sloppy
    /// mode.
    fn check_literal_flags(&self, ctx: Context, loc: Loc) -> ParseResult<()> {
        if !ctx.is_strict() {
            return Ok(());
        }

        if self.token_flags.contains(TokenFlags::LEGACY_OCTAL) {
            return self.error(loc, ParseError::LegacyOctalLiteralInStrictMode);
        }

        self.check_string_escape_flags(self.token_flags, loc)
    }

    fn check_string_escape_flags(&self, flags: TokenFlags, loc: Loc) -> ParseResult<()> {
        if flags.contains(TokenFlags::OCTAL_ESCAPE) {
            return self.error(loc, ParseError::LegacyOctalEscapeSequenceInStrictMode);
        }

        if flags.contains(TokenFlags::NON_OCTAL_DECIMAL_ESCAPE) {
            return self.error(loc, ParseError::LegacyNonOctalEscapeSequenceInStrictMode);
        }

        Ok(())
    }

    fn parse_string_literal(&mut self, ctx: Context) -> ParseResult<StringLiteral> {
        let Token::StringLiteral(value) = &self.token else {
            return self.error_unexpected_token(self.loc, &self.token);
        };

        let value = value.clone();
        let loc = self.loc;
        self.check_literal_flags(ctx, loc)?;
        self.advance()?;

        Ok(StringLiteral { loc, value })
    }

    fn parse_program(&mut self, ctx: Context, kind: ProgramKind) -> ParseResult<Program> {
        self.advance()?;

        let (directives, prologue, ctx) = self.parse_directive_prologue(ctx)?;

        let mut toplevels: Vec<Toplevel> = directives.into_iter().map(Toplevel::Statement).collect();
        while self.token != Token::Eof {
            toplevels.push(self.parse_toplevel(ctx)?);
        }

        // Every local name exported without a source must be declared somewhere in the module
        for local in std::mem::take(&mut self.export_local_refs) {
            if !self.scopes.is_declared_at_top_level(&local.name) {
                return self.error(local.loc, ParseError::ExportedNameNotDeclared(local.name));
            }
        }

        let loc = Loc::new(0, self.lexer.source.contents.len());

        Ok(Program {
            loc,
            toplevels,
            kind,
            is_strict_mode: ctx.is_strict(),
            has_use_strict_directive: prologue.use_strict_loc.is_some(),
        })
    }

    fn parse_toplevel(&mut self, ctx: Context) -> ParseResult<Toplevel> {
        match self.token {
            Token::Import if ctx.is_module() => {
                // `import(...)` and `import.meta` start expression statements
                let next = self.peek_token()?;
                if matches!(next, Token::LeftParen | Token::Period) {
                    return Ok(Toplevel::Statement(self.parse_statement_list_item(ctx)?));
                }

                Ok(Toplevel::Import(self.parse_import_declaration(ctx)?))
            }
            Token::Export if ctx.is_module() => self.parse_export_declaration(ctx),
            _ => Ok(Toplevel::Statement(self.parse_statement_list_item(ctx)?)),
        }
    }

    /// Parse the directives at the start of a program or function body. Returns the directive
    /// statements, along with the first statement that is not a directive, and the context for the
    /// rest of the body.
    fn parse_directive_prologue(
        &mut self,
        mut ctx: Context,
    ) -> ParseResult<(Vec<Statement>, DirectivePrologue, Context)> {
        let mut statements = vec![];
        let mut prologue = DirectivePrologue { use_strict_loc: None };

        // Escape flags of directives seen so far, which must be checked again if a later
        // directive switches to strict mode.
        let mut seen_directives = vec![];

        while let Token::StringLiteral(_) = self.token {
            let token_loc = self.loc;
            let token_flags = self.token_flags;

            let mut stmt = self.parse_statement(ctx)?;

            let Statement::Expr(expr_stmt) = &mut stmt else {
                statements.push(stmt);
                break;
            };

            let is_directive =
                matches!(&*expr_stmt.expr, Expression::String(lit) if lit.loc == token_loc);
            if !is_directive {
                statements.push(stmt);
                break;
            }

            let raw = &self.lexer.source.contents[token_loc.start + 1..token_loc.end - 1];
            expr_stmt.directive = Some(raw.to_owned());

            let is_use_strict =
                raw == "use strict" && token_loc.end - token_loc.start == USE_STRICT_RAW_LENGTH;
            if is_use_strict {
                if prologue.use_strict_loc.is_none() {
                    prologue.use_strict_loc = Some(token_loc);
                }

                if !ctx.is_strict() {
                    trace!(pos = token_loc.start, "directive switched to strict mode");
                    ctx |= Context::STRICT;

                    for (loc, flags) in &seen_directives {
                        self.check_string_escape_flags(*flags, *loc)?;
                    }
                }
            }

            seen_directives.push((token_loc, token_flags));
            statements.push(stmt);
        }

        Ok((statements, prologue, ctx))
    }

    fn parse_statement_list_item(&mut self, ctx: Context) -> ParseResult<Statement> {
        match self.token {
            Token::Function | Token::Async | Token::Class | Token::Const | Token::Let => {
                self.with_recursion(|parser| parser.parse_declaration_or_statement(ctx))
            }
            _ => self.parse_statement(ctx),
        }
    }

    fn parse_declaration_or_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        match self.token {
            Token::Function => {
                Ok(Statement::FuncDecl(self.parse_function_declaration(ctx, false, false)?))
            }
            Token::Async => {
                if self.is_async_function_start()? {
                    return Ok(Statement::FuncDecl(self.parse_function_declaration(ctx, true, false)?));
                }

                self.parse_statement(ctx)
            }
            Token::Class => Ok(Statement::ClassDecl(self.parse_class(ctx, true, false)?)),
            Token::Const => self.parse_lexical_declaration_statement(ctx),
            Token::Let => {
                if self.is_let_declaration_start()? {
                    return self.parse_lexical_declaration_statement(ctx);
                }

                self.parse_statement(ctx)
            }
            _ => self.parse_statement(ctx),
        }
    }

    /// Whether the current `async` token starts an async function, which requires `function` on
    /// the same line.
    fn is_async_function_start(&mut self) -> ParseResult<bool> {
        let (next, flags) = self.peek()?;
        Ok(next == Token::Function && !flags.contains(TokenFlags::NEW_LINE_BEFORE))
    }

    /// Whether the current `let` token starts a lexical declaration instead of being an identifier.
    fn is_let_declaration_start(&mut self) -> ParseResult<bool> {
        let next = self.peek_token()?;
        Ok(matches!(
            next,
            Token::LeftBracket
                | Token::LeftBrace
                | Token::Identifier(_)
                | Token::Async
                | Token::Of
                | Token::Static
                | Token::From
                | Token::As
                | Token::Get
                | Token::Set
                | Token::Await
                | Token::Yield
                | Token::Let
                | Token::Target
                | Token::Meta
        ))
    }

    fn parse_lexical_declaration_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let decl = self.parse_variable_declaration(ctx, false)?;
        self.expect_semicolon()?;
        Ok(Statement::VarDecl(decl))
    }

    fn parse_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        self.with_recursion(|parser| parser.parse_statement_inner(ctx))
    }

    fn parse_statement_inner(&mut self, ctx: Context) -> ParseResult<Statement> {
        // Labels directly preceding a loop may be the target of a continue
        let label_run_start = self.label_run_start.take();
        if let Some(run_start) = label_run_start {
            if matches!(self.token, Token::For | Token::While | Token::Do) {
                for label in &mut self.labels[run_start..] {
                    label.is_loop = true;
                }
            }
        }

        match self.token {
            Token::LeftBrace => Ok(Statement::Block(self.parse_block(ctx)?)),
            Token::Var => {
                let decl = self.parse_variable_declaration(ctx, false)?;
                self.expect_semicolon()?;
                Ok(Statement::VarDecl(decl))
            }
            Token::Semicolon => {
                let loc = self.loc;
                self.advance()?;
                Ok(Statement::Empty(loc))
            }
            Token::If => self.parse_if_statement(ctx),
            Token::Switch => self.parse_switch_statement(ctx),
            Token::For => self.parse_for_statement(ctx),
            Token::While => self.parse_while_statement(ctx),
            Token::Do => self.parse_do_while_statement(ctx),
            Token::With => self.parse_with_statement(ctx),
            Token::Try => self.parse_try_statement(ctx),
            Token::Throw => self.parse_throw_statement(ctx),
            Token::Return => self.parse_return_statement(ctx),
            Token::Break => self.parse_break_statement(ctx),
            Token::Continue => self.parse_continue_statement(ctx),
            Token::Debugger => {
                let start_pos = self.current_start_pos();
                self.advance()?;
                self.expect_semicolon()?;
                Ok(Statement::Debugger(self.mark_loc(start_pos)))
            }
            Token::Function | Token::Class | Token::Const => {
                self.error(self.loc, ParseError::DeclarationInStatementPosition)
            }
            Token::Async => {
                if self.is_async_function_start()? {
                    return self.error(self.loc, ParseError::DeclarationInStatementPosition);
                }

                self.parse_expression_statement(ctx, label_run_start)
            }
            Token::Let => {
                let (next, flags) = self.peek()?;
                if next == Token::LeftBracket {
                    return self.error(self.loc, ParseError::AmbiguousLetBracket);
                }

                let is_declaration = !flags.contains(TokenFlags::NEW_LINE_BEFORE)
                    && self.is_let_declaration_start()?;
                if is_declaration {
                    return self.error(self.loc, ParseError::DeclarationInStatementPosition);
                }

                self.parse_expression_statement(ctx, label_run_start)
            }
            Token::Import => {
                let next = self.peek_token()?;
                if matches!(next, Token::LeftParen | Token::Period) {
                    return self.parse_expression_statement(ctx, label_run_start);
                }

                self.error_module_item(ctx)
            }
            Token::Export => self.error_module_item(ctx),
            _ => self.parse_expression_statement(ctx, label_run_start),
        }
    }

    fn error_module_item<T>(&self, ctx: Context) -> ParseResult<T> {
        if ctx.is_module() {
            self.error(self.loc, ParseError::ModuleItemNotTopLevel)
        } else {
            self.error(self.loc, ParseError::ModuleItemOutsideModule)
        }
    }

    fn parse_expression_statement(
        &mut self,
        ctx: Context,
        label_run_start: Option<usize>,
    ) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        let expr = self.parse_expression(ctx | Context::ALLOW_IN)?;

        let is_label = self.token == Token::Colon && expr.pos() == start_pos;
        let expr = match *expr {
            Expression::Id(id) if is_label => {
                return self.parse_labeled_statement(ctx, id, label_run_start)
            }
            expr => p(expr),
        };

        self.expect_semicolon()?;

        Ok(Statement::Expr(ExpressionStatement {
            loc: self.mark_loc(start_pos),
            expr,
            directive: None,
        }))
    }

    fn parse_labeled_statement(
        &mut self,
        ctx: Context,
        label: Identifier,
        label_run_start: Option<usize>,
    ) -> ParseResult<Statement> {
        let start_pos = label.loc.start;

        if self.labels.iter().any(|entry| entry.name == label.name) {
            return self.error(label.loc, ParseError::DuplicateLabel(label.name));
        }

        // Skip the colon
        self.advance()?;

        let run_start = label_run_start.unwrap_or(self.labels.len());
        self.labels
            .push(LabelEntry { name: label.name.clone(), is_loop: false });

        let body = if self.token == Token::Function {
            // Labeled function declarations are only allowed in sloppy mode
            if ctx.is_strict() {
                return self.error(self.loc, ParseError::InvalidLabeledFunction(true));
            }

            if self.peek_token()? == Token::Multiply {
                return self.error(self.loc, ParseError::InvalidLabeledFunction(false));
            }

            Statement::FuncDecl(self.parse_function_declaration(ctx, false, false)?)
        } else if self.token == Token::Async && self.is_async_function_start()? {
            return self.error(self.loc, ParseError::InvalidLabeledFunction(false));
        } else {
            self.label_run_start = Some(run_start);
            self.parse_statement(ctx)?
        };

        self.labels.pop();

        Ok(Statement::Labeled(LabeledStatement {
            loc: self.mark_loc(start_pos),
            label: p(Label { loc: label.loc, name: label.name }),
            body: p(body),
        }))
    }

    fn parse_block(&mut self, ctx: Context) -> ParseResult<Block> {
        self.scopes.enter_scope(ScopeKind::Block);
        let block = self.parse_block_in_current_scope(ctx)?;
        self.scopes.exit_scope();

        Ok(block)
    }

    fn parse_block_in_current_scope(&mut self, ctx: Context) -> ParseResult<Block> {
        let start_pos = self.current_start_pos();
        self.expect(Token::LeftBrace)?;

        let mut body = vec![];
        while self.token != Token::RightBrace {
            if self.token == Token::Eof {
                return self.error_expected_token(self.loc, &self.token, &Token::RightBrace);
            }

            body.push(self.parse_statement_list_item(ctx)?);
        }

        self.advance()?;

        Ok(Block { loc: self.mark_loc(start_pos), body })
    }

    fn parse_variable_declaration(
        &mut self,
        ctx: Context,
        is_for_init: bool,
    ) -> ParseResult<VariableDeclaration> {
        let start_pos = self.current_start_pos();
        let kind = match self.token {
            Token::Var => VarKind::Var,
            Token::Let => VarKind::Let,
            Token::Const => VarKind::Const,
            _ => return self.error_unexpected_token(self.loc, &self.token),
        };
        self.advance()?;

        let mut declarations = vec![];
        loop {
            let start_pos = self.current_start_pos();
            let id = self.parse_binding_pattern(ctx)?;
            self.declare_pattern_names(ctx, &id, kind)?;

            let init = if self.token == Token::Equals {
                self.advance()?;
                Some(self.seclude(|parser| parser.parse_assignment_expression(ctx))?)
            } else {
                None
            };

            declarations.push(VariableDeclarator { loc: self.mark_loc(start_pos), id: p(id), init });

            if self.token == Token::Comma {
                self.advance()?;
            } else {
                break;
            }
        }

        let decl = VariableDeclaration { loc: self.mark_loc(start_pos), kind, declarations };

        // Initializers are checked by the caller in for statement heads, since they are not
        // needed in for each statements.
        if !is_for_init {
            self.check_declaration_initializers(&decl)?;
        }

        Ok(decl)
    }

    fn check_declaration_initializers(&self, decl: &VariableDeclaration) -> ParseResult<()> {
        for declarator in &decl.declarations {
            if declarator.init.is_some() {
                continue;
            }

            if decl.kind == VarKind::Const {
                return self.error(declarator.loc, ParseError::ConstWithoutInitializer);
            }

            if !matches!(*declarator.id, Pattern::Id(_)) {
                return self.error(declarator.loc, ParseError::DestructuringWithoutInitializer);
            }
        }

        Ok(())
    }

    /// Declare every name bound by a pattern in the current scope.
    fn declare_pattern_names(
        &mut self,
        ctx: Context,
        pattern: &Pattern,
        kind: VarKind,
    ) -> ParseResult<()> {
        let mut names = vec![];
        pattern.iter_bound_names(&mut |id| names.push(id));

        for id in names {
            let result = match kind {
                VarKind::Var => self
                    .scopes
                    .declare_var(&id.name, NameKind::Var, ctx.is_strict()),
                VarKind::Let | VarKind::Const => {
                    if id.name == "let" {
                        return self.error(id.loc, ParseError::LetNameInLexicalDeclaration);
                    }

                    let name_kind = if kind == VarKind::Let {
                        NameKind::Let
                    } else {
                        NameKind::Const
                    };

                    self.scopes
                        .declare_lexical(&id.name, name_kind, ctx.is_strict())
                }
            };

            if let Err(error) = result {
                return self.error(id.loc, error);
            }
        }

        Ok(())
    }

    fn declare_lexical_name(
        &mut self,
        ctx: Context,
        id: &Identifier,
        kind: NameKind,
    ) -> ParseResult<()> {
        match self.scopes.declare_lexical(&id.name, kind, ctx.is_strict()) {
            Ok(()) => Ok(()),
            Err(error) => self.error(id.loc, error),
        }
    }

    fn parse_if_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        self.expect(Token::LeftParen)?;
        let test = self.parse_expression(ctx | Context::ALLOW_IN)?;
        self.expect(Token::RightParen)?;

        let conseq = self.parse_if_body(ctx)?;

        let altern = if self.token == Token::Else {
            self.advance()?;
            Some(self.parse_if_body(ctx)?)
        } else {
            None
        };

        Ok(Statement::If(IfStatement { loc: self.mark_loc(start_pos), test, conseq, altern }))
    }

    /// Sloppy mode allows a plain function declaration as the body of an if statement, which is
    /// treated as if it were wrapped in a block.
    fn parse_if_body(&mut self, ctx: Context) -> ParseResult<P<Statement>> {
        if self.token == Token::Function && !ctx.is_strict() {
            if self.peek_token()? == Token::Multiply {
                return self.error(self.loc, ParseError::DeclarationInStatementPosition);
            }

            self.scopes.enter_scope(ScopeKind::Block);
            let func = self.parse_function_declaration(ctx, false, false)?;
            self.scopes.exit_scope();

            return Ok(p(Statement::FuncDecl(func)));
        }

        Ok(p(self.parse_statement(ctx)?))
    }

    fn parse_switch_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        self.expect(Token::LeftParen)?;
        let discriminant = self.parse_expression(ctx | Context::ALLOW_IN)?;
        self.expect(Token::RightParen)?;
        self.expect(Token::LeftBrace)?;

        self.scopes.enter_scope(ScopeKind::Switch);
        let body_ctx = ctx | Context::BREAKABLE;

        let mut cases = vec![];
        let mut has_default = false;

        while self.token != Token::RightBrace {
            let case_start_pos = self.current_start_pos();
            let test = match self.token {
                Token::Case => {
                    self.advance()?;
                    Some(self.parse_expression(ctx | Context::ALLOW_IN)?)
                }
                Token::Default => {
                    if has_default {
                        return self.error(self.loc, ParseError::MultipleDefaultCases);
                    }

                    has_default = true;
                    self.advance()?;
                    None
                }
                _ => return self.error_unexpected_token(self.loc, &self.token),
            };

            self.expect(Token::Colon)?;

            let mut body = vec![];
            while !matches!(
                self.token,
                Token::Case | Token::Default | Token::RightBrace | Token::Eof
            ) {
                body.push(self.parse_statement_list_item(body_ctx)?);
            }

            cases.push(SwitchCase { loc: self.mark_loc(case_start_pos), test, body });
        }

        self.advance()?;
        self.scopes.exit_scope();

        Ok(Statement::Switch(SwitchStatement {
            loc: self.mark_loc(start_pos),
            discriminant,
            cases,
        }))
    }

    fn parse_for_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let is_await = if self.token == Token::Await {
            if !ctx.contains(Context::IN_ASYNC) {
                return self.error_unexpected_token(self.loc, &self.token);
            }

            self.advance()?;
            true
        } else {
            false
        };

        self.expect(Token::LeftParen)?;

        self.scopes.enter_scope(ScopeKind::ForHead);
        let stmt = self.parse_for_statement_head(ctx, start_pos, is_await)?;
        self.scopes.exit_scope();

        Ok(stmt)
    }

    fn parse_for_statement_head(
        &mut self,
        ctx: Context,
        start_pos: Pos,
        is_await: bool,
    ) -> ParseResult<Statement> {
        let init_ctx = ctx - Context::ALLOW_IN;

        let is_declaration = match self.token {
            Token::Var | Token::Const => true,
            Token::Let => self.is_let_declaration_start()?,
            _ => false,
        };

        if is_declaration {
            let decl = self.parse_variable_declaration(init_ctx, true)?;

            if let Some(kind) = self.for_each_kind() {
                // Sloppy mode allows an initializer on a single var in a for-in statement
                let is_annex_b_initializer = !ctx.is_strict()
                    && kind == ForEachKind::In
                    && decl.kind == VarKind::Var
                    && decl.declarations.len() == 1
                    && matches!(*decl.declarations[0].id, Pattern::Id(_));

                let is_valid = decl.declarations.len() == 1
                    && (decl.declarations[0].init.is_none() || is_annex_b_initializer);
                if !is_valid {
                    return self.error(decl.loc, ParseError::ForEachInitInvalidVarDecl);
                }

                return self.parse_for_each_statement_rest(
                    ctx,
                    start_pos,
                    ForEachInit::VarDecl(decl),
                    kind,
                    is_await,
                );
            }

            self.check_declaration_initializers(&decl)?;

            return self.parse_for_statement_rest(
                ctx,
                start_pos,
                Some(p(ForInit::VarDecl(decl))),
                is_await,
            );
        }

        if self.token == Token::Semicolon {
            return self.parse_for_statement_rest(ctx, start_pos, None, is_await);
        }

        let init_start_pos = self.current_start_pos();
        let starts_with_let = self.token == Token::Let;
        let starts_with_async =
            self.token == Token::Async;

        let saved_cover = swap_and_save(&mut self.cover, CoverState::new());
        let expr = self.parse_expression_cover(init_ctx);
        let mut init_cover = swap_and_save(&mut self.cover, saved_cover);
        let expr = expr?;

        let Some(kind) = self.for_each_kind() else {
            if let Some((loc, error)) = init_cover.take_pending_error() {
                return self.error(loc, error);
            }

            return self.parse_for_statement_rest(
                ctx,
                start_pos,
                Some(p(ForInit::Expression(*expr))),
                is_await,
            );
        };

        let is_bare_id = matches!(&*expr, Expression::Id(_)) && expr.pos() == init_start_pos;
        if kind == ForEachKind::Of && is_bare_id {
            if starts_with_let {
                return self.error(expr.loc(), ParseError::ForOfLet);
            }

            if starts_with_async && !is_await {
                return self.error(expr.loc(), ParseError::ForOfAsync);
            }
        }

        if !init_cover.assignable {
            return self.error(expr.loc(), ParseError::InvalidForLeftHandSide);
        }

        let pattern = match reinterpret_as_assignment_target(*expr, ctx.is_strict()) {
            Ok(pattern) => pattern,
            Err(ReinterpretError { loc, error: ParseError::InvalidAssignmentLeftHandSide }) => {
                return self.error(loc, ParseError::InvalidForLeftHandSide)
            }
            Err(error) => return self.reinterpret_error(error),
        };

        self.parse_for_each_statement_rest(
            ctx,
            start_pos,
            ForEachInit::Pattern(pattern),
            kind,
            is_await,
        )
    }

    fn for_each_kind(&self) -> Option<ForEachKind> {
        match self.token {
            Token::In => Some(ForEachKind::In),
            Token::Of => Some(ForEachKind::Of),
            _ => None,
        }
    }

    fn parse_for_statement_rest(
        &mut self,
        ctx: Context,
        start_pos: Pos,
        init: Option<P<ForInit>>,
        is_await: bool,
    ) -> ParseResult<Statement> {
        if is_await {
            return self.error(self.loc, ParseError::InvalidForAwait);
        }

        self.expect(Token::Semicolon)?;

        let test = if self.token == Token::Semicolon {
            None
        } else {
            Some(self.parse_expression(ctx | Context::ALLOW_IN)?)
        };

        self.expect(Token::Semicolon)?;

        let update = if self.token == Token::RightParen {
            None
        } else {
            Some(self.parse_expression(ctx | Context::ALLOW_IN)?)
        };

        self.expect(Token::RightParen)?;

        let body = self.parse_statement(ctx | Context::ITERATION | Context::BREAKABLE)?;

        Ok(Statement::For(ForStatement {
            loc: self.mark_loc(start_pos),
            init,
            test,
            update,
            body: p(body),
        }))
    }

    fn parse_for_each_statement_rest(
        &mut self,
        ctx: Context,
        start_pos: Pos,
        left: ForEachInit,
        kind: ForEachKind,
        is_await: bool,
    ) -> ParseResult<Statement> {
        if is_await && kind != ForEachKind::Of {
            return self.error(self.loc, ParseError::InvalidForAwait);
        }

        self.advance()?;

        let right = match kind {
            ForEachKind::In => self.parse_expression(ctx | Context::ALLOW_IN)?,
            ForEachKind::Of => self.parse_assignment_expression(ctx | Context::ALLOW_IN)?,
        };

        self.expect(Token::RightParen)?;

        let body = self.parse_statement(ctx | Context::ITERATION | Context::BREAKABLE)?;

        Ok(Statement::ForEach(ForEachStatement {
            loc: self.mark_loc(start_pos),
            kind,
            left: p(left),
            right,
            body: p(body),
            is_await,
        }))
    }

    fn parse_while_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        self.expect(Token::LeftParen)?;
        let test = self.parse_expression(ctx | Context::ALLOW_IN)?;
        self.expect(Token::RightParen)?;

        let body = self.parse_statement(ctx | Context::ITERATION | Context::BREAKABLE)?;

        Ok(Statement::While(WhileStatement { loc: self.mark_loc(start_pos), test, body: p(body) }))
    }

    fn parse_do_while_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let body = self.parse_statement(ctx | Context::ITERATION | Context::BREAKABLE)?;

        self.expect(Token::While)?;
        self.expect(Token::LeftParen)?;
        let test = self.parse_expression(ctx | Context::ALLOW_IN)?;
        self.expect(Token::RightParen)?;

        // A semicolon is always inserted after a do-while statement if one is missing
        self.maybe_expect_semicolon()?;

        Ok(Statement::DoWhile(DoWhileStatement {
            loc: self.mark_loc(start_pos),
            test,
            body: p(body),
        }))
    }

    fn parse_with_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        if ctx.is_strict() {
            return self.error(self.loc, ParseError::WithInStrictMode);
        }

        self.advance()?;

        self.expect(Token::LeftParen)?;
        let object = self.parse_expression(ctx | Context::ALLOW_IN)?;
        self.expect(Token::RightParen)?;

        let body = self.parse_statement(ctx)?;

        Ok(Statement::With(WithStatement { loc: self.mark_loc(start_pos), object, body: p(body) }))
    }

    fn parse_try_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let block = p(self.parse_block(ctx)?);

        let handler = if self.token == Token::Catch {
            let catch_start_pos = self.current_start_pos();
            self.advance()?;

            let param = if self.token == Token::LeftParen {
                self.advance()?;
                let param = self.parse_binding_pattern(ctx)?;
                self.expect(Token::RightParen)?;
                Some(param)
            } else {
                None
            };

            // The catch parameter and body share a scope
            let has_simple_param = matches!(param, Some(Pattern::Id(_)));
            self.scopes.enter_catch_scope(has_simple_param);

            if let Some(param) = &param {
                let mut names = vec![];
                param.iter_bound_names(&mut |id| names.push(id.clone()));
                for id in names {
                    self.declare_lexical_name(ctx, &id, NameKind::CatchParameter)?;
                }
            }

            let body = self.parse_block_in_current_scope(ctx)?;
            self.scopes.exit_scope();

            Some(p(CatchClause {
                loc: self.mark_loc(catch_start_pos),
                param: param.map(p),
                body: p(body),
            }))
        } else {
            None
        };

        let finalizer = if self.token == Token::Finally {
            self.advance()?;
            Some(p(self.parse_block(ctx)?))
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return self.error_expected_token(self.loc, &self.token, &Token::Catch);
        }

        Ok(Statement::Try(TryStatement { loc: self.mark_loc(start_pos), block, handler, finalizer }))
    }

    fn parse_throw_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        if self.has_newline_before() {
            return self.error(self.loc, ParseError::ThrowArgumentOnNewLine);
        }

        let argument = self.parse_expression(ctx | Context::ALLOW_IN)?;
        self.expect_semicolon()?;

        Ok(Statement::Throw(ThrowStatement { loc: self.mark_loc(start_pos), argument }))
    }

    fn parse_return_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        if !ctx.contains(Context::IN_FUNCTION) {
            return self.error(self.loc, ParseError::ReturnOutsideFunction);
        }

        self.advance()?;

        let argument = if matches!(self.token, Token::Semicolon | Token::RightBrace | Token::Eof)
            || self.has_newline_before()
        {
            None
        } else {
            Some(self.parse_expression(ctx | Context::ALLOW_IN)?)
        };

        self.expect_semicolon()?;

        Ok(Statement::Return(ReturnStatement { loc: self.mark_loc(start_pos), argument }))
    }

    /// Parse the label following a break or continue, which must be on the same line.
    fn parse_jump_label(&mut self) -> ParseResult<Option<Label>> {
        if self.has_newline_before() {
            return Ok(None);
        }

        match self.token_identifier_name() {
            Some(name) => {
                let loc = self.loc;
                self.advance()?;
                Ok(Some(Label { loc, name }))
            }
            None => Ok(None),
        }
    }

    fn parse_break_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        let break_loc = self.loc;
        self.advance()?;

        let label = self.parse_jump_label()?;
        match &label {
            Some(label) => {
                if !self.labels.iter().any(|entry| entry.name == label.name) {
                    return self.error(label.loc, ParseError::LabelNotFound(label.name.clone()));
                }
            }
            None => {
                if !ctx.contains(Context::BREAKABLE) {
                    return self.error(break_loc, ParseError::UnlabeledBreakOutsideBreakable);
                }
            }
        }

        self.expect_semicolon()?;

        Ok(Statement::Break(BreakStatement { loc: self.mark_loc(start_pos), label }))
    }

    fn parse_continue_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        let continue_loc = self.loc;
        self.advance()?;

        if !ctx.contains(Context::ITERATION) {
            return self.error(continue_loc, ParseError::ContinueOutsideIterable);
        }

        let label = self.parse_jump_label()?;
        if let Some(label) = &label {
            match self.labels.iter().find(|entry| entry.name == label.name) {
                None => {
                    return self.error(label.loc, ParseError::LabelNotFound(label.name.clone()))
                }
                Some(entry) if !entry.is_loop => {
                    return self
                        .error(label.loc, ParseError::ContinueTargetNotIteration(label.name.clone()))
                }
                Some(_) => {}
            }
        }

        self.expect_semicolon()?;

        Ok(Statement::Continue(ContinueStatement { loc: self.mark_loc(start_pos), label }))
    }

    /// Parse an expression, including sequence expressions, that is used as a value.
    fn parse_expression(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        self.seclude(|parser| parser.parse_expression_cover(ctx))
    }

    /// Parse an expression that may still be reinterpreted as a pattern, e.g. the left hand side
    /// of a for each statement.
    fn parse_expression_cover(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        let expr = self.parse_assignment_expression_cover(ctx)?;

        if self.token != Token::Comma {
            return Ok(expr);
        }

        self.resolve_cover_as_value()?;

        let mut expressions = vec![*expr];
        while self.token == Token::Comma {
            self.advance()?;
            expressions.push(*self.parse_assignment_expression(ctx)?);
        }

        Ok(p(Expression::Sequence(SequenceExpression {
            loc: self.mark_loc(start_pos),
            expressions,
        })))
    }

    fn parse_assignment_expression(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        self.seclude(|parser| parser.parse_assignment_expression_cover(ctx))
    }

    fn parse_assignment_expression_cover(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        self.with_recursion(|parser| {
            if parser.token == Token::Yield && ctx.contains(Context::IN_GENERATOR) {
                return parser.parse_yield_expression(ctx);
            }

            let start_pos = parser.current_start_pos();
            let saved_start_pos = swap_and_save(&mut parser.assignment_start_pos, start_pos);
            let result = parser.parse_assignment_expression_rest(ctx, start_pos);
            parser.assignment_start_pos = saved_start_pos;

            result
        })
    }

    fn parse_assignment_expression_rest(
        &mut self,
        ctx: Context,
        start_pos: Pos,
    ) -> ParseResult<P<Expression>> {
        let expr = self.parse_conditional_expression(ctx)?;

        let Some(operator) = self.token.assignment_operator() else {
            return Ok(expr);
        };

        let left_is_bindable = self.cover.bindable;

        let left = if operator == AssignmentOperator::Equals {
            if !self.cover.assignable {
                return self.error(expr.loc(), ParseError::InvalidAssignmentLeftHandSide);
            }

            // Errors that only apply to literals do not apply to patterns
            self.cover.take_pending_error();

            match reinterpret_as_assignment_target(*expr, ctx.is_strict()) {
                Ok(pattern) => pattern,
                Err(error) => return self.reinterpret_error(error),
            }
        } else {
            self.resolve_cover_as_value()?;

            match reinterpret_as_simple_assignment_target(*expr, ctx.is_strict()) {
                Ok(pattern) => pattern,
                Err(error) => return self.reinterpret_error(error),
            }
        };

        self.advance()?;
        let right = self.parse_assignment_expression(ctx)?;

        // A simple assignment may itself be an element of a larger pattern with a default value
        if operator == AssignmentOperator::Equals {
            self.cover.set(true, left_is_bindable);
        } else {
            self.cover.set(false, false);
        }

        Ok(p(Expression::Assign(AssignmentExpression {
            loc: self.mark_loc(start_pos),
            operator,
            left: p(left),
            right,
            is_parenthesized: false,
        })))
    }

    fn parse_yield_expression(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        if ctx.contains(Context::IN_PARAMETERS) {
            return self.error(self.loc, ParseError::YieldInParameters);
        }

        self.last_yield_or_await_pos = Some(start_pos);
        self.advance()?;

        let mut argument = None;
        let mut is_delegate = false;

        if !self.has_newline_before() {
            if self.token == Token::Multiply {
                self.advance()?;
                is_delegate = true;
                argument = Some(self.parse_assignment_expression(ctx)?);
            } else if !matches!(
                self.token,
                Token::RightParen
                    | Token::RightBracket
                    | Token::RightBrace
                    | Token::Comma
                    | Token::Semicolon
                    | Token::Colon
                    | Token::Question
                    | Token::Arrow
                    | Token::In
                    | Token::Of
                    | Token::InstanceOf
                    | Token::Eof
            ) {
                argument = Some(self.parse_assignment_expression(ctx)?);
            }
        }

        self.cover.set(false, false);

        Ok(p(Expression::Yield(YieldExpression {
            loc: self.mark_loc(start_pos),
            argument,
            is_delegate,
        })))
    }

    fn parse_conditional_expression(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        let expr = self.parse_expression_with_precedence(ctx, Precedence::Conditional)?;

        if self.token != Token::Question {
            return Ok(expr);
        }

        if Self::is_unparenthesized_arrow(&expr, start_pos) {
            if self.has_newline_before() {
                return Ok(expr);
            }

            return self.error_unexpected_token(self.loc, &self.token);
        }

        self.resolve_cover_as_value()?;
        self.advance()?;

        let conseq = self.parse_assignment_expression(ctx | Context::ALLOW_IN)?;
        self.expect(Token::Colon)?;
        let altern = self.parse_assignment_expression(ctx)?;

        self.cover.set(false, false);

        Ok(p(Expression::Conditional(ConditionalExpression {
            loc: self.mark_loc(start_pos),
            test: expr,
            conseq,
            altern,
        })))
    }

    fn parse_expression_with_precedence(
        &mut self,
        ctx: Context,
        precedence: Precedence,
    ) -> ParseResult<P<Expression>> {
        self.with_recursion(|parser| parser.parse_expression_with_precedence_inner(ctx, precedence))
    }

    fn parse_expression_with_precedence_inner(
        &mut self,
        ctx: Context,
        precedence: Precedence,
    ) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();

        let mut left = if let Token::PrivateName(_) = self.token {
            self.parse_private_name_in_left(ctx, precedence)?
        } else {
            self.parse_unary_expression(ctx)?
        };

        loop {
            let Some(op_precedence) = self.token.precedence() else {
                break;
            };

            // An arrow function body extends as far as possible, so it cannot be an operand
            if Self::is_unparenthesized_arrow(&left, start_pos) {
                if self.has_newline_before() {
                    break;
                }

                return self.error_unexpected_token(self.loc, &self.token);
            }

            if !precedence.is_weaker_than(op_precedence) {
                break;
            }

            if self.token == Token::In && !ctx.allow_in() {
                break;
            }

            self.resolve_cover_as_value()?;

            if self.token == Token::Exponent
                && matches!(*left, Expression::Unary(_))
                && left.pos() == start_pos
            {
                return self.error(left.loc(), ParseError::ExponentLHSUnary);
            }

            let binary_operator = self.token.binary_operator();
            let logical_operator = self.token.logical_operator();
            self.advance()?;

            // Exponentiation is right associative, so the right side may contain another `**`
            let right_precedence = if op_precedence == Precedence::Exponentiation {
                Precedence::Multiplication
            } else {
                op_precedence
            };

            let right_start_pos = self.current_start_pos();
            let right = self.parse_expression_with_precedence(ctx, right_precedence)?;
            self.resolve_cover_as_value()?;

            left = match (logical_operator, binary_operator) {
                (Some(operator), _) => {
                    self.check_nullish_mixing(operator, &left, start_pos)?;
                    self.check_nullish_mixing(operator, &right, right_start_pos)?;

                    p(Expression::Logical(LogicalExpression {
                        loc: self.mark_loc(start_pos),
                        operator,
                        left,
                        right,
                    }))
                }
                (None, Some(mut operator)) => {
                    if operator == BinaryOperator::In && matches!(*left, Expression::PrivateName(_))
                    {
                        operator = BinaryOperator::InPrivate;
                    }

                    p(Expression::Binary(BinaryExpression {
                        loc: self.mark_loc(start_pos),
                        operator,
                        left,
                        right,
                    }))
                }
                (None, None) => return self.error_unexpected_token(self.prev_loc, &Token::Eof),
            };

            self.cover.set(false, false);
        }

        Ok(left)
    }

    /// `??` cannot be directly combined with `&&` or `||` without parentheses.
    fn check_nullish_mixing(
        &self,
        operator: LogicalOperator,
        operand: &Expression,
        operand_start_pos: Pos,
    ) -> ParseResult<()> {
        let Expression::Logical(logical) = operand else {
            return Ok(());
        };

        if logical.loc.start != operand_start_pos {
            return Ok(());
        }

        let is_operator_nullish = operator == LogicalOperator::NullishCoalesce;
        let is_operand_nullish = logical.operator == LogicalOperator::NullishCoalesce;

        if is_operator_nullish != is_operand_nullish {
            return self.error(logical.loc, ParseError::NullishCoalesceMixedWithLogical);
        }

        Ok(())
    }

    /// A private name may only appear as the left hand side of an `in` expression, e.g.
    /// `#x in obj`.
    fn parse_private_name_in_left(
        &mut self,
        ctx: Context,
        precedence: Precedence,
    ) -> ParseResult<P<Expression>> {
        let private_token = self.token.clone();
        let private_loc = self.loc;
        let id = self.parse_private_name()?;

        let is_valid = self.token == Token::In
            && ctx.allow_in()
            && precedence.is_weaker_than(Precedence::Relational);
        if !is_valid {
            return self.error_unexpected_token(private_loc, &private_token);
        }

        self.cover.set(false, false);

        Ok(p(Expression::PrivateName(id)))
    }

    fn parse_unary_expression(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();

        let operator = match self.token {
            Token::Plus => Some(UnaryOperator::Plus),
            Token::Minus => Some(UnaryOperator::Minus),
            Token::LogicalNot => Some(UnaryOperator::LogicalNot),
            Token::BitwiseNot => Some(UnaryOperator::BitwiseNot),
            Token::Typeof => Some(UnaryOperator::TypeOf),
            Token::Void => Some(UnaryOperator::Void),
            Token::Delete => Some(UnaryOperator::Delete),
            _ => None,
        };

        if let Some(operator) = operator {
            return self.with_recursion(|parser| {
                parser.advance()?;
                let argument = parser.parse_unary_expression(ctx)?;
                parser.resolve_cover_as_value()?;

                if operator == UnaryOperator::Delete {
                    parser.check_delete_argument(ctx, &argument)?;
                }

                Ok(p(Expression::Unary(UnaryExpression {
                    loc: parser.mark_loc(start_pos),
                    operator,
                    argument,
                })))
            });
        }

        match self.token {
            Token::Increment | Token::Decrement => self.with_recursion(|parser| {
                let operator = if parser.token == Token::Increment {
                    UpdateOperator::Increment
                } else {
                    UpdateOperator::Decrement
                };

                parser.advance()?;
                let argument = parser.parse_unary_expression(ctx)?;
                parser.resolve_cover_as_value()?;
                parser.check_update_argument(ctx, &argument)?;

                Ok(p(Expression::Update(UpdateExpression {
                    loc: parser.mark_loc(start_pos),
                    operator,
                    argument,
                    is_prefix: true,
                })))
            }),
            Token::Await if ctx.contains(Context::IN_ASYNC) => self.parse_await_expression(ctx),
            _ => self.parse_postfix_expression(ctx),
        }
    }

    fn check_delete_argument(&self, ctx: Context, argument: &Expression) -> ParseResult<()> {
        match argument {
            Expression::Id(id) if ctx.is_strict() => {
                self.error(id.loc, ParseError::DeleteIdentifierInStrictMode)
            }
            Expression::Member(member) if member.is_private => {
                self.error(member.loc, ParseError::DeletePrivateName)
            }
            Expression::Chain(chain) => match chain.expression.as_ref() {
                Expression::Member(member) if member.is_private => {
                    self.error(member.loc, ParseError::DeletePrivateName)
                }
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// Increment and decrement operands must be simple assignment targets.
    fn check_update_argument(&self, ctx: Context, argument: &Expression) -> ParseResult<()> {
        match argument {
            Expression::Id(id) => {
                if ctx.is_strict() && id.name == "eval" {
                    return self.error(id.loc, ParseError::AssignEvalInStrictMode);
                }

                if ctx.is_strict() && id.name == "arguments" {
                    return self.error(id.loc, ParseError::AssignArgumentsInStrictMode);
                }

                Ok(())
            }
            Expression::Member(_) | Expression::SuperMember(_) => Ok(()),
            _ => self.error(argument.loc(), ParseError::InvalidUpdateExpressionArgument),
        }
    }

    fn parse_await_expression(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        if ctx.contains(Context::IN_PARAMETERS) {
            return self.error(self.loc, ParseError::AwaitInParameters);
        }

        self.last_yield_or_await_pos = Some(start_pos);
        self.advance()?;

        let argument = self.with_recursion(|parser| parser.parse_unary_expression(ctx))?;
        self.resolve_cover_as_value()?;

        Ok(p(Expression::Await(AwaitExpression { loc: self.mark_loc(start_pos), argument })))
    }

    fn parse_postfix_expression(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        let expr = self.parse_left_hand_side_expression(ctx)?;

        let operator = match self.token {
            Token::Increment => UpdateOperator::Increment,
            Token::Decrement => UpdateOperator::Decrement,
            _ => return Ok(expr),
        };

        // Postfix operators cannot be preceded by a newline
        if self.has_newline_before() {
            return Ok(expr);
        }

        if Self::is_unparenthesized_arrow(&expr, start_pos) {
            return self.error_unexpected_token(self.loc, &self.token);
        }

        self.resolve_cover_as_value()?;
        self.check_update_argument(ctx, &expr)?;
        self.advance()?;

        Ok(p(Expression::Update(UpdateExpression {
            loc: self.mark_loc(start_pos),
            operator,
            argument: expr,
            is_prefix: false,
        })))
    }

    fn parse_left_hand_side_expression(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();

        let expr = match self.token {
            Token::New => self.parse_new_expression(ctx)?,
            Token::Super => self.parse_super_expression(ctx)?,
            Token::Import => self.parse_import_expression(ctx)?,
            _ => self.parse_primary_expression(ctx)?,
        };

        // Nothing may follow an arrow function body
        if Self::is_unparenthesized_arrow(&expr, start_pos) {
            return Ok(expr);
        }

        self.parse_call_and_member_tail(ctx, expr, start_pos, true)
    }

    /// Parse the member accesses, calls, and tagged templates following an expression. Calls are
    /// not allowed in the callee of a new expression.
    fn parse_call_and_member_tail(
        &mut self,
        ctx: Context,
        mut expr: P<Expression>,
        start_pos: Pos,
        allow_calls: bool,
    ) -> ParseResult<P<Expression>> {
        let mut in_chain = false;

        loop {
            match self.token {
                Token::Period => {
                    self.resolve_cover_as_value()?;
                    self.advance()?;
                    expr = self.parse_member_property(expr, start_pos, false)?;
                }
                Token::LeftBracket => {
                    self.resolve_cover_as_value()?;
                    self.advance()?;
                    expr = self.parse_computed_member_property(ctx, expr, start_pos, false)?;
                }
                Token::LeftParen if allow_calls => {
                    self.resolve_cover_as_value()?;
                    let arguments = self.parse_call_arguments(ctx)?;
                    expr = p(Expression::Call(CallExpression {
                        loc: self.mark_loc(start_pos),
                        callee: expr,
                        arguments,
                        is_optional: false,
                    }));
                }
                Token::TemplatePart { .. } => {
                    if in_chain {
                        return self.error(self.loc, ParseError::TaggedTemplateInChain);
                    }

                    self.resolve_cover_as_value()?;
                    let quasi = self.parse_template_literal(ctx, true)?;
                    expr = p(Expression::TaggedTemplate(TaggedTemplateExpression {
                        loc: self.mark_loc(start_pos),
                        tag: expr,
                        quasi: p(quasi),
                    }));
                }
                Token::QuestionDot => {
                    if !allow_calls {
                        return self.error(self.loc, ParseError::OptionalChainFromNew);
                    }

                    self.resolve_cover_as_value()?;
                    in_chain = true;
                    self.advance()?;

                    expr = match self.token {
                        Token::LeftParen => {
                            let arguments = self.parse_call_arguments(ctx)?;
                            p(Expression::Call(CallExpression {
                                loc: self.mark_loc(start_pos),
                                callee: expr,
                                arguments,
                                is_optional: true,
                            }))
                        }
                        Token::LeftBracket => {
                            self.advance()?;
                            self.parse_computed_member_property(ctx, expr, start_pos, true)?
                        }
                        Token::TemplatePart { .. } => {
                            return self.error(self.loc, ParseError::TaggedTemplateInChain)
                        }
                        _ => self.parse_member_property(expr, start_pos, true)?,
                    };
                }
                _ => break,
            }
        }

        if in_chain {
            expr = p(Expression::Chain(ChainExpression {
                loc: self.mark_loc(start_pos),
                expression: expr,
            }));
            self.cover.set(false, false);
        }

        Ok(expr)
    }

    fn parse_member_property(
        &mut self,
        object: P<Expression>,
        start_pos: Pos,
        is_optional: bool,
    ) -> ParseResult<P<Expression>> {
        let (property, is_private) = if let Token::PrivateName(_) = self.token {
            (Expression::PrivateName(self.parse_private_name()?), true)
        } else {
            (Expression::Id(self.parse_identifier_name()?), false)
        };

        self.cover.set(true, false);

        Ok(p(Expression::Member(MemberExpression {
            loc: self.mark_loc(start_pos),
            object,
            property: p(property),
            is_computed: false,
            is_optional,
            is_private,
        })))
    }

    fn parse_computed_member_property(
        &mut self,
        ctx: Context,
        object: P<Expression>,
        start_pos: Pos,
        is_optional: bool,
    ) -> ParseResult<P<Expression>> {
        let property = self.parse_expression(ctx | Context::ALLOW_IN)?;
        self.expect(Token::RightBracket)?;

        self.cover.set(true, false);

        Ok(p(Expression::Member(MemberExpression {
            loc: self.mark_loc(start_pos),
            object,
            property,
            is_computed: true,
            is_optional,
            is_private: false,
        })))
    }

    fn parse_call_arguments(&mut self, ctx: Context) -> ParseResult<Vec<CallArgument>> {
        self.expect(Token::LeftParen)?;

        let mut arguments = vec![];
        while self.token != Token::RightParen {
            if self.token == Token::Spread {
                let start_pos = self.current_start_pos();
                self.advance()?;
                let argument = self.parse_assignment_expression(ctx | Context::ALLOW_IN)?;
                arguments.push(CallArgument::Spread(SpreadElement {
                    loc: self.mark_loc(start_pos),
                    argument,
                    has_trailing_comma: false,
                }));
            } else {
                let argument = self.parse_assignment_expression(ctx | Context::ALLOW_IN)?;
                arguments.push(CallArgument::Expression(*argument));
            }

            if self.token != Token::RightParen {
                self.expect(Token::Comma)?;
            }
        }

        self.advance()?;
        self.cover.set(false, false);

        Ok(arguments)
    }

    /// Parse a parenthesized list of elements that may be either call arguments or arrow function
    /// parameters, such as the arguments of `async(a, b)`.
    fn parse_cover_call_arguments(&mut self, ctx: Context) -> ParseResult<Vec<CallArgument>> {
        self.expect(Token::LeftParen)?;

        let mut arguments = vec![];
        while self.token != Token::RightParen {
            if self.token == Token::Spread {
                let start_pos = self.current_start_pos();
                self.advance()?;
                let argument = self.acquire(|parser| {
                    parser.parse_assignment_expression_cover(ctx | Context::ALLOW_IN)
                })?;
                arguments.push(CallArgument::Spread(SpreadElement {
                    loc: self.mark_loc(start_pos),
                    argument,
                    has_trailing_comma: self.token == Token::Comma,
                }));
            } else {
                let argument = self.acquire(|parser| {
                    parser.parse_assignment_expression_cover(ctx | Context::ALLOW_IN)
                })?;
                arguments.push(CallArgument::Expression(*argument));
            }

            if self.token != Token::RightParen {
                self.expect(Token::Comma)?;
            }
        }

        self.advance()?;

        Ok(arguments)
    }

    fn parse_new_expression(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        self.with_recursion(|parser| parser.parse_new_expression_inner(ctx))
    }

    fn parse_new_expression_inner(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        if self.token == Token::Period {
            self.advance()?;
            if self.token != Token::Target || self.is_escaped() {
                return self.error(self.loc, ParseError::ExpectedNewTarget);
            }

            self.advance()?;
            let loc = self.mark_loc(start_pos);
            if !ctx.contains(Context::NEW_TARGET) {
                return self.error(loc, ParseError::NewTargetOutsideFunction);
            }

            self.cover.set(false, false);

            return Ok(p(Expression::MetaProperty(MetaProperty {
                loc,
                kind: MetaPropertyKind::NewTarget,
            })));
        }

        let callee_start_pos = self.current_start_pos();
        let callee = match self.token {
            Token::New => self.parse_new_expression(ctx)?,
            Token::Super => {
                if self.peek_token()? == Token::LeftParen {
                    return self.error_unexpected_token(self.loc, &self.token);
                }

                self.parse_super_expression(ctx)?
            }
            Token::Import => return self.error_unexpected_token(self.loc, &self.token),
            _ => self.parse_primary_expression(ctx)?,
        };

        let callee = self.parse_call_and_member_tail(ctx, callee, callee_start_pos, false)?;
        self.resolve_cover_as_value()?;

        let arguments = if self.token == Token::LeftParen {
            self.parse_call_arguments(ctx)?
        } else {
            vec![]
        };

        self.cover.set(false, false);

        Ok(p(Expression::New(NewExpression { loc: self.mark_loc(start_pos), callee, arguments })))
    }

    fn parse_super_expression(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        let super_loc = self.loc;
        self.advance()?;

        match self.token {
            Token::LeftParen => {
                if !ctx.contains(Context::SUPER_CALL) {
                    return self.error(super_loc, ParseError::SuperCallOutsideDerivedConstructor);
                }

                let arguments = self.parse_call_arguments(ctx)?;
                self.cover.set(false, false);

                Ok(p(Expression::SuperCall(p(SuperCallExpression {
                    loc: self.mark_loc(start_pos),
                    super_: super_loc,
                    arguments,
                }))))
            }
            Token::Period | Token::LeftBracket => {
                if !ctx.contains(Context::SUPER_PROPERTY) {
                    return self.error(super_loc, ParseError::SuperPropertyOutsideMethod);
                }

                let is_computed = self.token == Token::LeftBracket;
                self.advance()?;

                let property = if is_computed {
                    let property = self.parse_expression(ctx | Context::ALLOW_IN)?;
                    self.expect(Token::RightBracket)?;
                    property
                } else {
                    p(Expression::Id(self.parse_identifier_name()?))
                };

                self.cover.set(true, false);

                Ok(p(Expression::SuperMember(SuperMemberExpression {
                    loc: self.mark_loc(start_pos),
                    super_: super_loc,
                    property,
                    is_computed,
                })))
            }
            _ => self.error_unexpected_token(self.loc, &self.token),
        }
    }

    fn parse_import_expression(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        let import_loc = self.loc;
        self.advance()?;

        match self.token {
            Token::Period => {
                self.advance()?;
                if self.token != Token::Meta || self.is_escaped() {
                    return self.error(self.loc, ParseError::ExpectedImportMeta);
                }

                if !ctx.is_module() {
                    return self.error(import_loc, ParseError::ImportMetaOutsideModule);
                }

                self.advance()?;
                self.cover.set(false, false);

                Ok(p(Expression::MetaProperty(MetaProperty {
                    loc: self.mark_loc(start_pos),
                    kind: MetaPropertyKind::ImportMeta,
                })))
            }
            Token::LeftParen => {
                self.advance()?;

                if matches!(self.token, Token::RightParen | Token::Spread) {
                    return self.error(self.loc, ParseError::ImportCallArguments);
                }

                let source = self.parse_assignment_expression(ctx | Context::ALLOW_IN)?;

                // A second options argument and a trailing comma are only allowed with import
                // attributes enabled
                let mut options = None;
                if self.token == Token::Comma {
                    if !self.is_next {
                        return self.error(self.loc, ParseError::ImportCallArguments);
                    }

                    self.advance()?;
                    if self.token != Token::RightParen {
                        options = Some(self.parse_assignment_expression(ctx | Context::ALLOW_IN)?);

                        if self.token == Token::Comma {
                            self.advance()?;
                        }
                    }
                }

                if self.token != Token::RightParen {
                    return self.error(self.loc, ParseError::ImportCallArguments);
                }

                self.advance()?;
                self.cover.set(false, false);

                Ok(p(Expression::Import(ImportExpression {
                    loc: self.mark_loc(start_pos),
                    source,
                    options,
                })))
            }
            _ => self.error_unexpected_token(self.loc, &self.token),
        }
    }

    fn parse_primary_expression(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        let loc = self.loc;

        let expr = match &self.token {
            Token::This => {
                self.advance()?;
                Expression::This(loc)
            }
            Token::Null => {
                self.advance()?;
                Expression::Null(loc)
            }
            Token::True | Token::False => {
                let value = self.token == Token::True;
                self.advance()?;
                Expression::Boolean(BooleanLiteral { loc, value })
            }
            Token::NumberLiteral(value) => {
                let value = *value;
                self.check_literal_flags(ctx, loc)?;
                self.advance()?;
                Expression::Number(NumberLiteral { loc, value })
            }
            Token::StringLiteral(_) => Expression::String(self.parse_string_literal(ctx)?),
            Token::BigIntLiteral(value) => {
                let value = value.clone();
                self.advance()?;
                Expression::BigInt(BigIntLiteral { loc, value })
            }
            Token::TemplatePart { .. } => {
                Expression::Template(self.parse_template_literal(ctx, false)?)
            }
            Token::Divide | Token::DivideEq => {
                self.rescan_regexp_literal()?;
                let Token::RegExpLiteral { pattern, flags, .. } = &self.token else {
                    return self.error_unexpected_token(self.loc, &self.token);
                };

                let pattern = pattern.clone();
                let flags = flags.clone();
                let loc = self.loc;
                self.advance()?;

                Expression::RegExp(RegExpLiteral { loc, pattern, flags })
            }
            Token::LeftParen => return self.parse_parenthesized_or_arrow(ctx, start_pos),
            Token::LeftBracket => return self.parse_array_literal(ctx),
            Token::LeftBrace => return self.parse_object_literal(ctx),
            Token::Function => {
                let func = self.parse_function_expression(ctx, false)?;
                Expression::Function(func)
            }
            Token::Class => Expression::Class(self.parse_class(ctx, false, false)?),
            Token::Async => return self.parse_async_primary(ctx, start_pos),
            Token::LessThan if self.is_jsx => return self.parse_jsx_element_or_fragment(ctx, false),
            _ => return self.parse_identifier_or_arrow(ctx, start_pos),
        };

        self.cover.set(false, false);

        Ok(p(expr))
    }

    fn parse_identifier_or_arrow(
        &mut self,
        ctx: Context,
        start_pos: Pos,
    ) -> ParseResult<P<Expression>> {
        if !self.is_identifier_token() {
            return self.error_unexpected_token(self.loc, &self.token);
        }

        let id = self.parse_identifier_reference(ctx)?;

        if self.token == Token::Arrow {
            return self.parse_single_parameter_arrow(ctx, id, start_pos, false);
        }

        self.cover.set(true, true);

        Ok(p(Expression::Id(id)))
    }

    /// Parse an arrow function with a single unparenthesized parameter, e.g. `x => x`. The
    /// current token is the `=>`.
    fn parse_single_parameter_arrow(
        &mut self,
        ctx: Context,
        id: Identifier,
        start_pos: Pos,
        is_async: bool,
    ) -> ParseResult<P<Expression>> {
        if start_pos != self.assignment_start_pos {
            return self.error_unexpected_token(self.loc, &self.token);
        }

        if ctx.is_strict() && is_restricted_binding_name(&id.name) {
            return self.error(id.loc, ParseError::StrictModeRestrictedBinding(id.name));
        }

        let params = vec![FunctionParam::Pattern(Pattern::Id(id))];
        self.parse_arrow_function(ctx, start_pos, params, is_async)
    }

    /// `async` may start an async function expression, an async arrow function, a call to a
    /// function named `async`, or just be an identifier.
    fn parse_async_primary(&mut self, ctx: Context, start_pos: Pos) -> ParseResult<P<Expression>> {
        let (next, next_flags) = self.peek()?;
        let is_next_on_same_line = !next_flags.contains(TokenFlags::NEW_LINE_BEFORE);

        if next == Token::Function && is_next_on_same_line {
            let func = self.parse_function_expression(ctx, true)?;
            self.cover.set(false, false);
            return Ok(p(Expression::Function(func)));
        }

        if next == Token::LeftParen && is_next_on_same_line {
            return self.parse_async_call_or_arrow(ctx, start_pos);
        }

        if is_next_on_same_line {
            let param = self.try_parse(|parser| {
                parser.advance()?;
                let Some(name) = parser.token_identifier_name() else {
                    return Ok(None);
                };

                let loc = parser.loc;
                let is_escaped = parser.is_escaped();
                parser.advance()?;

                if parser.token != Token::Arrow {
                    return Ok(None);
                }

                Ok(Some((Identifier::new(loc, name), is_escaped)))
            });

            if let Some((id, is_escaped)) = param {
                // The parameter is bound in the async function
                self.check_identifier_name(
                    ctx | Context::IN_ASYNC,
                    &id.name,
                    id.loc,
                    true,
                    is_escaped,
                )?;

                return self.parse_single_parameter_arrow(ctx, id, start_pos, true);
            }
        }

        self.parse_identifier_or_arrow(ctx, start_pos)
    }

    fn parse_async_call_or_arrow(
        &mut self,
        ctx: Context,
        start_pos: Pos,
    ) -> ParseResult<P<Expression>> {
        let async_id = Identifier::new(self.loc, "async".to_owned());
        self.advance()?;

        self.cover = CoverState::new();
        let arguments = self.parse_cover_call_arguments(ctx)?;

        if self.token == Token::Arrow {
            self.check_arrow_parameters_cover(start_pos)?;

            if matches!(self.last_await_ident_pos, Some(pos) if pos >= start_pos) {
                return self.error(self.mark_loc(start_pos), ParseError::AwaitInParameters);
            }

            let params = self.reinterpret_arrow_parameters(ctx, arguments)?;
            return self.parse_arrow_function(ctx, start_pos, params, true);
        }

        self.resolve_cover_as_value()?;

        Ok(p(Expression::Call(CallExpression {
            loc: self.mark_loc(start_pos),
            callee: p(Expression::Id(async_id)),
            arguments,
            is_optional: false,
        })))
    }

    /// Check that the expressions just parsed may be the parameters of the arrow function that
    /// follows. The current token is the `=>`.
    fn check_arrow_parameters_cover(&mut self, start_pos: Pos) -> ParseResult<()> {
        if self.has_newline_before() {
            return self.error(self.loc, ParseError::ArrowOnNewLine);
        }

        if start_pos != self.assignment_start_pos {
            return self.error_unexpected_token(self.loc, &self.token);
        }

        if !self.cover.bindable {
            return self.error(self.mark_loc(start_pos), ParseError::InvalidArrowParameters);
        }

        if matches!(self.last_yield_or_await_pos, Some(pos) if pos >= start_pos) {
            return self.error(self.mark_loc(start_pos), ParseError::YieldOrAwaitInArrowParameters);
        }

        // Errors that only apply to literals do not apply to patterns
        self.cover.take_pending_error();

        Ok(())
    }

    fn reinterpret_arrow_parameters(
        &self,
        ctx: Context,
        items: Vec<CallArgument>,
    ) -> ParseResult<Vec<FunctionParam>> {
        let num_items = items.len();
        let mut params = Vec::with_capacity(num_items);

        for (i, item) in items.into_iter().enumerate() {
            let param = match item {
                CallArgument::Expression(expr) => {
                    match reinterpret_as_binding_element(expr, ctx.is_strict()) {
                        Ok(pattern) => FunctionParam::Pattern(pattern),
                        Err(error) => return self.reinterpret_error(error),
                    }
                }
                CallArgument::Spread(spread) => {
                    if spread.has_trailing_comma {
                        return self.error(spread.loc, ParseError::RestTrailingComma);
                    }

                    if i != num_items - 1 {
                        return self.error(spread.loc, ParseError::RestElementNotLast);
                    }

                    if matches!(*spread.argument, Expression::Assign(_)) {
                        return self.error(spread.loc, ParseError::RestWithInitializer);
                    }

                    match reinterpret_as_binding_pattern(*spread.argument, ctx.is_strict()) {
                        Ok(argument) => FunctionParam::Rest(RestElement {
                            loc: spread.loc,
                            argument: p(argument),
                        }),
                        Err(error) => return self.reinterpret_error(error),
                    }
                }
            };

            params.push(param);
        }

        Ok(params)
    }

    /// Parse a parenthesized expression, or the parameters of an arrow function if followed by
    /// `=>`. Both are parsed under the cover grammar then checked once the `=>` is or is not seen.
    fn parse_parenthesized_or_arrow(
        &mut self,
        ctx: Context,
        start_pos: Pos,
    ) -> ParseResult<P<Expression>> {
        self.advance()?;
        self.cover = CoverState::new();

        let inner_ctx = ctx | Context::ALLOW_IN;
        let mut items = vec![];
        let mut has_trailing_comma = false;

        while self.token != Token::RightParen {
            if self.token == Token::Spread {
                let spread_start_pos = self.current_start_pos();
                self.advance()?;
                let argument =
                    self.acquire(|parser| parser.parse_assignment_expression_cover(inner_ctx))?;
                items.push(CallArgument::Spread(SpreadElement {
                    loc: self.mark_loc(spread_start_pos),
                    argument,
                    has_trailing_comma: self.token == Token::Comma,
                }));
            } else {
                let expr =
                    self.acquire(|parser| parser.parse_assignment_expression_cover(inner_ctx))?;
                items.push(CallArgument::Expression(*expr));
            }

            if self.token == Token::RightParen {
                break;
            }

            self.expect(Token::Comma)?;
            has_trailing_comma = self.token == Token::RightParen;
        }

        let close_paren_loc = self.loc;
        self.advance()?;

        if self.token == Token::Arrow {
            self.check_arrow_parameters_cover(start_pos)?;
            let params = self.reinterpret_arrow_parameters(ctx, items)?;
            return self.parse_arrow_function(ctx, start_pos, params, false);
        }

        // Otherwise this must be a parenthesized expression
        if items.is_empty() || has_trailing_comma {
            return self.error_unexpected_token(close_paren_loc, &Token::RightParen);
        }

        if let Some((loc, error)) = self.cover.take_pending_error() {
            return self.error(loc, error);
        }

        let mut expressions = Vec::with_capacity(items.len());
        for item in items {
            match item {
                CallArgument::Expression(expr) => expressions.push(expr),
                CallArgument::Spread(spread) => {
                    return self.error_unexpected_token(spread.loc, &Token::Spread)
                }
            }
        }

        if expressions.len() == 1 {
            let Some(mut expr) = expressions.pop() else {
                return self.error_unexpected_token(close_paren_loc, &Token::RightParen);
            };

            let is_assignable = matches!(
                expr,
                Expression::Id(_) | Expression::Member(_) | Expression::SuperMember(_)
            );

            match &mut expr {
                Expression::Array(array) => array.is_parenthesized = true,
                Expression::Object(object) => object.is_parenthesized = true,
                Expression::Assign(assign) => assign.is_parenthesized = true,
                _ => {}
            }

            self.cover.set(is_assignable, false);

            return Ok(p(expr));
        }

        let loc = Loc::new(
            expressions.first().map(|expr| expr.pos()).unwrap_or(start_pos),
            expressions.last().map(|expr| expr.loc().end).unwrap_or(start_pos),
        );

        self.cover.set(false, false);

        Ok(p(Expression::Sequence(SequenceExpression { loc, expressions })))
    }

    fn parse_array_literal(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        self.advance()?;
        self.cover = CoverState::new();

        let inner_ctx = ctx | Context::ALLOW_IN;
        let mut elements = vec![];

        while self.token != Token::RightBracket {
            if self.token == Token::Comma {
                elements.push(ArrayElement::Hole(self.current_start_pos()));
                self.advance()?;
                continue;
            }

            if self.token == Token::Spread {
                let spread_start_pos = self.current_start_pos();
                self.advance()?;
                let argument =
                    self.acquire(|parser| parser.parse_assignment_expression_cover(inner_ctx))?;
                elements.push(ArrayElement::Spread(SpreadElement {
                    loc: self.mark_loc(spread_start_pos),
                    argument,
                    has_trailing_comma: self.token == Token::Comma,
                }));
            } else {
                let expr =
                    self.acquire(|parser| parser.parse_assignment_expression_cover(inner_ctx))?;
                elements.push(ArrayElement::Expression(*expr));
            }

            if self.token != Token::RightBracket {
                self.expect(Token::Comma)?;
            }
        }

        self.advance()?;

        Ok(p(Expression::Array(ArrayExpression {
            loc: self.mark_loc(start_pos),
            elements,
            is_parenthesized: false,
        })))
    }

    fn parse_object_literal(&mut self, ctx: Context) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        self.advance()?;
        self.cover = CoverState::new();

        let mut properties = vec![];
        let mut has_proto = false;

        while self.token != Token::RightBrace {
            let property = self.parse_object_property(ctx, &mut has_proto)?;
            properties.push(property);

            if self.token != Token::RightBrace {
                self.expect(Token::Comma)?;
            }
        }

        self.advance()?;

        Ok(p(Expression::Object(ObjectExpression {
            loc: self.mark_loc(start_pos),
            properties,
            is_parenthesized: false,
        })))
    }

    fn parse_object_property(&mut self, ctx: Context, has_proto: &mut bool) -> ParseResult<Property> {
        let start_pos = self.current_start_pos();
        let inner_ctx = ctx | Context::ALLOW_IN;

        if self.token == Token::Spread {
            self.advance()?;
            let argument =
                self.acquire(|parser| parser.parse_assignment_expression_cover(inner_ctx))?;

            return Ok(Property {
                loc: self.mark_loc(start_pos),
                key: argument,
                value: None,
                is_computed: false,
                is_method: false,
                kind: PropertyKind::Spread(self.token == Token::Comma),
            });
        }

        let (next, next_flags) = if self.is_identifier_token() {
            self.peek()?
        } else {
            (Token::Eof, TokenFlags::empty())
        };
        let is_name_terminator = matches!(
            next,
            Token::Colon | Token::LeftParen | Token::Comma | Token::RightBrace | Token::Equals
        );

        // Shorthand properties are identifier references, e.g. `{a}` or the pattern `{a = 1}`
        if self.is_identifier_token() && matches!(next, Token::Comma | Token::RightBrace | Token::Equals)
        {
            let id = self.parse_identifier_reference(ctx)?;

            let kind = if self.token == Token::Equals {
                let equals_loc = self.loc;
                self.advance()?;
                let initializer = self.parse_assignment_expression(inner_ctx)?;
                self.cover
                    .set_pending_error(equals_loc, ParseError::InvalidPatternInitializer);
                PropertyKind::PatternInitializer(initializer)
            } else {
                PropertyKind::Init
            };

            return Ok(Property {
                loc: self.mark_loc(start_pos),
                key: p(Expression::Id(id)),
                value: None,
                is_computed: false,
                is_method: false,
                kind,
            });
        }

        let is_async = self.token == Token::Async
            && !is_name_terminator
            && !next_flags.contains(TokenFlags::NEW_LINE_BEFORE);
        if is_async {
            self.advance()?;
        }

        let is_generator = self.token == Token::Multiply;
        if is_generator {
            self.advance()?;
        }

        let accessor_kind = match self.token {
            Token::Get if !is_async && !is_generator && !is_name_terminator => {
                Some(PropertyKind::Get)
            }
            Token::Set if !is_async && !is_generator && !is_name_terminator => {
                Some(PropertyKind::Set)
            }
            _ => None,
        };
        if accessor_kind.is_some() {
            self.advance()?;
        }

        if let Token::PrivateName(_) = self.token {
            return self.error_unexpected_token(self.loc, &self.token);
        }

        let (key, is_computed) = self.parse_property_key(ctx)?;

        if is_async || is_generator || accessor_kind.is_some() || self.token == Token::LeftParen {
            let function_kind = match accessor_kind {
                Some(PropertyKind::Get) => FunctionKind::Getter,
                Some(PropertyKind::Set) => FunctionKind::Setter,
                _ => FunctionKind::Method,
            };

            let value_start_pos = self.current_start_pos();
            let value = self.parse_method(
                ctx,
                value_start_pos,
                is_async,
                is_generator,
                function_kind,
                false,
            )?;

            self.cover.set(false, false);

            return Ok(Property {
                loc: self.mark_loc(start_pos),
                key,
                value: Some(p(Expression::Function(value))),
                is_computed,
                is_method: accessor_kind.is_none(),
                kind: accessor_kind.unwrap_or(PropertyKind::Init),
            });
        }

        self.expect(Token::Colon)?;
        let value = self.acquire(|parser| parser.parse_assignment_expression_cover(inner_ctx))?;

        // Only a single `__proto__: value` property is allowed in an object literal
        let is_proto = !is_computed
            && match &*key {
                Expression::Id(id) => id.name == "__proto__",
                Expression::String(lit) => lit.value == "__proto__",
                _ => false,
            };
        if is_proto {
            if *has_proto {
                self.cover
                    .set_pending_error(key.loc(), ParseError::DuplicateProtoProperty);
            }

            *has_proto = true;
        }

        Ok(Property {
            loc: self.mark_loc(start_pos),
            key,
            value: Some(value),
            is_computed,
            is_method: false,
            kind: PropertyKind::Init,
        })
    }

    /// Parse the key of an object property, class element, or object pattern property. Returns
    /// the key along with whether it is computed. Private names are returned as is and must be
    /// checked by the caller.
    fn parse_property_key(&mut self, ctx: Context) -> ParseResult<(P<Expression>, bool)> {
        let loc = self.loc;

        let key = match &self.token {
            Token::LeftBracket => {
                self.advance()?;
                let key = self.parse_assignment_expression(ctx | Context::ALLOW_IN)?;
                self.expect(Token::RightBracket)?;
                return Ok((key, true));
            }
            Token::StringLiteral(_) => Expression::String(self.parse_string_literal(ctx)?),
            Token::NumberLiteral(value) => {
                let value = *value;
                self.check_literal_flags(ctx, loc)?;
                self.advance()?;
                Expression::Number(NumberLiteral { loc, value })
            }
            Token::BigIntLiteral(value) => {
                let value = value.clone();
                self.advance()?;
                Expression::BigInt(BigIntLiteral { loc, value })
            }
            Token::PrivateName(name) => {
                let id = Identifier::new(loc, name.clone());
                self.advance()?;
                Expression::PrivateName(id)
            }
            _ => Expression::Id(self.parse_identifier_name()?),
        };

        Ok((p(key), false))
    }

    fn parse_template_literal(
        &mut self,
        ctx: Context,
        is_tagged: bool,
    ) -> ParseResult<TemplateLiteral> {
        let start_pos = self.current_start_pos();
        let mut quasis = vec![];
        let mut expressions = vec![];

        loop {
            let Token::TemplatePart { raw, cooked, is_tail, .. } = &self.token else {
                return self.error_unexpected_token(self.loc, &self.token);
            };

            let raw = raw.clone();
            let is_tail = *is_tail;
            let cooked = match cooked {
                Ok(cooked) => Some(cooked.clone()),
                // Invalid escape sequences are only allowed in tagged templates
                Err(escape_loc) if !is_tagged => {
                    let escape_loc = *escape_loc;
                    return self.error(escape_loc, self.template_escape_error(escape_loc));
                }
                Err(_) => None,
            };

            // Element locations exclude the delimiters `, ${, and }
            let end_delimiter_len = if is_tail { 1 } else { 2 };
            let element_loc = Loc::new(self.loc.start + 1, self.loc.end - end_delimiter_len);
            quasis.push(TemplateElement { loc: element_loc, raw, cooked });

            self.advance()?;
            if is_tail {
                break;
            }

            expressions.push(*self.parse_expression(ctx | Context::ALLOW_IN)?);

            if self.token != Token::RightBrace {
                return self.error_expected_token(self.loc, &self.token, &Token::RightBrace);
            }

            self.rescan_template_part()?;
        }

        Ok(TemplateLiteral { loc: self.mark_loc(start_pos), quasis, expressions })
    }

    /// Recover the kind of malformed escape sequence at a location in a template literal.
    fn template_escape_error(&self, loc: Loc) -> ParseError {
        let escape = &self.lexer.source.contents[loc.to_range()];
        match escape.chars().nth(1) {
            Some('0'..='9') => ParseError::OctalEscapeInTemplate,
            Some('x') => ParseError::InvalidHexEscape,
            Some('u') => ParseError::InvalidUnicodeEscape,
            _ => ParseError::MalformedEscapeSequence,
        }
    }

    fn parse_function_declaration(
        &mut self,
        ctx: Context,
        is_async: bool,
        is_default_export: bool,
    ) -> ParseResult<P<Function>> {
        let start_pos = self.current_start_pos();
        if is_async {
            self.advance()?;
        }

        self.expect(Token::Function)?;

        let is_generator = self.token == Token::Multiply;
        if is_generator {
            self.advance()?;
        }

        // The name is bound in the enclosing scope, so it is checked in the enclosing context
        let id = if self.is_identifier_token() {
            let id = self.parse_binding_identifier(ctx)?;
            if let Err(error) =
                self.scopes
                    .declare_function(&id.name, ctx.is_strict(), ctx.is_module())
            {
                return self.error(id.loc, error);
            }

            Some(p(id))
        } else if is_default_export && self.token == Token::LeftParen {
            None
        } else {
            return self.error_unexpected_token(self.loc, &self.token);
        };

        let fn_ctx = ctx.for_function(is_async, is_generator);
        let flags = Self::function_flags(is_async, is_generator);

        self.parse_function_params_and_body(fn_ctx, start_pos, id, flags, FunctionKind::Normal)
    }

    fn parse_function_expression(
        &mut self,
        ctx: Context,
        is_async: bool,
    ) -> ParseResult<P<Function>> {
        let start_pos = self.current_start_pos();
        if is_async {
            self.advance()?;
        }

        self.expect(Token::Function)?;

        let is_generator = self.token == Token::Multiply;
        if is_generator {
            self.advance()?;
        }

        let fn_ctx = ctx.for_function(is_async, is_generator);

        // The name of a function expression is only bound inside the function itself
        let id = if self.is_identifier_token() {
            Some(p(self.parse_binding_identifier(fn_ctx)?))
        } else {
            None
        };

        let flags = Self::function_flags(is_async, is_generator);

        self.parse_function_params_and_body(fn_ctx, start_pos, id, flags, FunctionKind::Normal)
    }

    /// Parse the parameters and body of an object or class method. The current token is the `(`.
    fn parse_method(
        &mut self,
        ctx: Context,
        start_pos: Pos,
        is_async: bool,
        is_generator: bool,
        kind: FunctionKind,
        is_derived_constructor: bool,
    ) -> ParseResult<P<Function>> {
        let mut fn_ctx = ctx.for_function(is_async, is_generator) | Context::SUPER_PROPERTY;
        if is_derived_constructor {
            fn_ctx |= Context::SUPER_CALL;
        }

        let flags = Self::function_flags(is_async, is_generator);

        self.parse_function_params_and_body(fn_ctx, start_pos, None, flags, kind)
    }

    fn function_flags(is_async: bool, is_generator: bool) -> FunctionFlags {
        let mut flags = FunctionFlags::empty();
        flags.set(FunctionFlags::IS_ASYNC, is_async);
        flags.set(FunctionFlags::IS_GENERATOR, is_generator);
        flags
    }

    fn parse_function_params_and_body(
        &mut self,
        fn_ctx: Context,
        start_pos: Pos,
        id: Option<P<Identifier>>,
        flags: FunctionFlags,
        kind: FunctionKind,
    ) -> ParseResult<P<Function>> {
        self.scopes.enter_scope(ScopeKind::Function);

        // Labels and yield/await positions do not cross function boundaries
        let saved_labels = std::mem::take(&mut self.labels);
        let saved_label_run_start = self.label_run_start.take();
        let saved_yield_or_await_pos = self.last_yield_or_await_pos.take();
        let saved_await_ident_pos = self.last_await_ident_pos.take();

        let result = self.parse_function_params_and_body_inner(fn_ctx, start_pos, id, flags, kind);

        self.labels = saved_labels;
        self.label_run_start = saved_label_run_start;
        self.last_yield_or_await_pos = saved_yield_or_await_pos;
        self.last_await_ident_pos = saved_await_ident_pos;
        self.scopes.exit_scope();

        result
    }

    fn parse_function_params_and_body_inner(
        &mut self,
        fn_ctx: Context,
        start_pos: Pos,
        id: Option<P<Identifier>>,
        mut flags: FunctionFlags,
        kind: FunctionKind,
    ) -> ParseResult<P<Function>> {
        let params_start_pos = self.current_start_pos();
        let params = self.parse_function_params(fn_ctx | Context::IN_PARAMETERS)?;
        let params_loc = self.mark_loc(params_start_pos);

        let duplicate_loc = self.declare_parameters(&params);

        match kind {
            FunctionKind::Getter if !params.is_empty() => {
                return self.error(params_loc, ParseError::GetterWrongNumberOfParams);
            }
            FunctionKind::Setter => {
                if let [FunctionParam::Rest(rest)] = params.as_slice() {
                    return self.error(rest.loc, ParseError::SetterRestParameter);
                }

                if params.len() != 1 {
                    return self.error(params_loc, ParseError::SetterWrongNumberOfParams);
                }
            }
            _ => {}
        }

        let (body, prologue, body_ctx) = self.parse_function_block_body(fn_ctx)?;

        self.validate_function_params(
            &params,
            id.as_deref(),
            &prologue,
            fn_ctx,
            body_ctx,
            duplicate_loc,
            kind,
        )?;

        Self::set_function_body_flags(&mut flags, &params, &prologue, body_ctx);

        Ok(p(Function {
            loc: self.mark_loc(start_pos),
            id,
            params,
            body: p(FunctionBody::Block(body)),
            flags,
        }))
    }

    fn set_function_body_flags(
        flags: &mut FunctionFlags,
        params: &[FunctionParam],
        prologue: &DirectivePrologue,
        body_ctx: Context,
    ) {
        flags.set(
            FunctionFlags::HAS_SIMPLE_PARAMETER_LIST,
            params.iter().all(FunctionParam::is_simple),
        );
        flags.set(FunctionFlags::IS_STRICT_MODE, body_ctx.is_strict());
        flags.set(FunctionFlags::HAS_USE_STRICT_DIRECTIVE, prologue.use_strict_loc.is_some());
    }

    fn parse_function_params(&mut self, ctx: Context) -> ParseResult<Vec<FunctionParam>> {
        self.expect(Token::LeftParen)?;

        let mut params = vec![];
        while self.token != Token::RightParen {
            if self.token == Token::Spread {
                let rest = self.parse_binding_rest_element(ctx, &Token::RightParen)?;
                params.push(FunctionParam::Rest(rest));
                break;
            }

            params.push(FunctionParam::Pattern(self.parse_binding_element(ctx)?));

            if self.token != Token::RightParen {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RightParen)?;

        Ok(params)
    }

    /// Declare every parameter name in the current function scope. Returns the location of the
    /// first duplicate parameter name, if any.
    fn declare_parameters(&mut self, params: &[FunctionParam]) -> Option<Loc> {
        let mut names = HashSet::new();
        let mut duplicate_loc = None;

        for param in params {
            param.iter_bound_names(&mut |id| {
                if !names.insert(id.name.as_str()) && duplicate_loc.is_none() {
                    duplicate_loc = Some(id.loc);
                }
            });
        }

        for name in names {
            self.scopes.declare_parameter(name);
        }

        duplicate_loc
    }

    /// Parse the body of a function along with its directive prologue. Returns the body, the
    /// prologue, and the context of the body, which is strict if the prologue enabled it.
    fn parse_function_block_body(
        &mut self,
        ctx: Context,
    ) -> ParseResult<(FunctionBlockBody, DirectivePrologue, Context)> {
        let start_pos = self.current_start_pos();
        self.expect(Token::LeftBrace)?;

        let (mut body, prologue, body_ctx) = self.parse_directive_prologue(ctx)?;

        while self.token != Token::RightBrace {
            if self.token == Token::Eof {
                return self.error_expected_token(self.loc, &self.token, &Token::RightBrace);
            }

            body.push(self.parse_statement_list_item(body_ctx)?);
        }

        self.advance()?;

        Ok((FunctionBlockBody { loc: self.mark_loc(start_pos), body }, prologue, body_ctx))
    }

    /// Checks on a parameter list that can only be made once the function body is parsed, since
    /// a "use strict" directive in the body applies retroactively to the parameters and name.
    fn validate_function_params(
        &self,
        params: &[FunctionParam],
        id: Option<&Identifier>,
        prologue: &DirectivePrologue,
        ctx: Context,
        body_ctx: Context,
        duplicate_loc: Option<Loc>,
        kind: FunctionKind,
    ) -> ParseResult<()> {
        let is_simple = params.iter().all(FunctionParam::is_simple);

        if let Some(use_strict_loc) = prologue.use_strict_loc {
            if !is_simple {
                return self.error(use_strict_loc, ParseError::UseStrictFunctionNonSimpleParameterList);
            }
        }

        if let Some(duplicate_loc) = duplicate_loc {
            let reason = match kind {
                FunctionKind::Arrow => Some(InvalidDuplicateParametersReason::ArrowFunction),
                FunctionKind::Method | FunctionKind::Getter | FunctionKind::Setter => {
                    Some(InvalidDuplicateParametersReason::Method)
                }
                FunctionKind::Normal if body_ctx.is_strict() => {
                    Some(InvalidDuplicateParametersReason::StrictMode)
                }
                FunctionKind::Normal if !is_simple => {
                    Some(InvalidDuplicateParametersReason::NonSimpleParameters)
                }
                FunctionKind::Normal => None,
            };

            if let Some(reason) = reason {
                return self.error(duplicate_loc, ParseError::InvalidDuplicateParameters(reason));
            }
        }

        // Names were only checked against sloppy mode rules while parsing
        if body_ctx.is_strict() && !ctx.is_strict() {
            let mut names = vec![];
            if let Some(id) = id {
                names.push(id);
            }

            for param in params {
                param.iter_bound_names(&mut |id| names.push(id));
            }

            for id in names {
                if is_restricted_binding_name(&id.name) {
                    return self.error(id.loc, ParseError::StrictModeRestrictedBinding(id.name.clone()));
                }

                if body_ctx.is_reserved_word(&id.name) {
                    return self.error(id.loc, ParseError::IdentifierIsReservedWord(id.name.clone()));
                }
            }
        }

        Ok(())
    }

    /// Parse the body of an arrow function whose parameters have already been parsed. The current
    /// token is the `=>`.
    fn parse_arrow_function(
        &mut self,
        ctx: Context,
        start_pos: Pos,
        params: Vec<FunctionParam>,
        is_async: bool,
    ) -> ParseResult<P<Expression>> {
        if self.has_newline_before() {
            return self.error(self.loc, ParseError::ArrowOnNewLine);
        }

        self.advance()?;

        let body_ctx = ctx.for_arrow_body(is_async);

        self.scopes.enter_scope(ScopeKind::ArrowParameters);
        let saved_labels = std::mem::take(&mut self.labels);
        let saved_label_run_start = self.label_run_start.take();
        let saved_yield_or_await_pos = self.last_yield_or_await_pos.take();
        let saved_await_ident_pos = self.last_await_ident_pos.take();

        let result = self.parse_arrow_function_body(body_ctx, start_pos, params, is_async);

        self.labels = saved_labels;
        self.label_run_start = saved_label_run_start;
        self.last_yield_or_await_pos = saved_yield_or_await_pos;
        self.last_await_ident_pos = saved_await_ident_pos;
        self.scopes.exit_scope();

        let func = result?;
        self.cover.set(false, false);

        Ok(p(Expression::ArrowFunction(func)))
    }

    fn parse_arrow_function_body(
        &mut self,
        body_ctx: Context,
        start_pos: Pos,
        params: Vec<FunctionParam>,
        is_async: bool,
    ) -> ParseResult<P<Function>> {
        let duplicate_loc = self.declare_parameters(&params);

        let (body, prologue, final_ctx) = if self.token == Token::LeftBrace {
            let (body, prologue, final_ctx) =
                self.parse_function_block_body(body_ctx | Context::ALLOW_IN)?;
            (FunctionBody::Block(body), prologue, final_ctx)
        } else {
            let body = self.parse_assignment_expression(body_ctx)?;
            (FunctionBody::Expression(*body), DirectivePrologue { use_strict_loc: None }, body_ctx)
        };

        self.validate_function_params(
            &params,
            None,
            &prologue,
            body_ctx,
            final_ctx,
            duplicate_loc,
            FunctionKind::Arrow,
        )?;

        let mut flags = Self::function_flags(is_async, false) | FunctionFlags::IS_ARROW;
        Self::set_function_body_flags(&mut flags, &params, &prologue, final_ctx);

        Ok(p(Function { loc: self.mark_loc(start_pos), id: None, params, body: p(body), flags }))
    }

    fn parse_class(
        &mut self,
        ctx: Context,
        is_decl: bool,
        is_default_export: bool,
    ) -> ParseResult<P<Class>> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        // All parts of a class are strict mode code
        let class_ctx = ctx | Context::STRICT;

        let id = if self.is_identifier_token() {
            let id = self.parse_binding_identifier(class_ctx)?;
            if is_decl {
                self.declare_lexical_name(ctx, &id, NameKind::Class)?;
            }

            Some(p(id))
        } else if is_decl && !is_default_export {
            return self.error_unexpected_token(self.loc, &self.token);
        } else {
            None
        };

        let super_class = if self.token == Token::Extends {
            self.advance()?;
            Some(self.seclude(|parser| parser.parse_left_hand_side_expression(class_ctx))?)
        } else {
            None
        };

        let is_derived = super_class.is_some();

        let body_start_pos = self.current_start_pos();
        self.expect(Token::LeftBrace)?;
        self.private_names.push(PrivateNameScope::default());

        let mut body = vec![];
        let mut has_constructor = false;

        while self.token != Token::RightBrace {
            if self.token == Token::Semicolon {
                self.advance()?;
                continue;
            }

            body.push(self.parse_class_element(class_ctx, is_derived, &mut has_constructor)?);
        }

        self.advance()?;
        let body_loc = self.mark_loc(body_start_pos);

        self.resolve_class_private_names()?;

        Ok(p(Class { loc: self.mark_loc(start_pos), id, super_class, body_loc, body }))
    }

    /// Whether a token following a class element modifier such as `static` or `get` means that
    /// the modifier is actually the name of the element.
    fn is_class_element_name_end(token: &Token) -> bool {
        matches!(
            token,
            Token::LeftParen | Token::Equals | Token::Semicolon | Token::RightBrace | Token::Eof
        )
    }

    fn parse_class_element(
        &mut self,
        ctx: Context,
        is_derived: bool,
        has_constructor: &mut bool,
    ) -> ParseResult<ClassElement> {
        let start_pos = self.current_start_pos();

        let mut is_static = false;
        if self.token == Token::Static {
            let next = self.peek_token()?;
            if next == Token::LeftBrace {
                return self.parse_static_block(ctx, start_pos);
            }

            if !Self::is_class_element_name_end(&next) {
                self.advance()?;
                is_static = true;
            }
        }

        let mut is_async = false;
        if self.token == Token::Async {
            let (next, flags) = self.peek()?;
            if !Self::is_class_element_name_end(&next) && !flags.contains(TokenFlags::NEW_LINE_BEFORE)
            {
                self.advance()?;
                is_async = true;
            }
        }

        let is_generator = self.token == Token::Multiply;
        if is_generator {
            self.advance()?;
        }

        let mut accessor_kind = None;
        if matches!(self.token, Token::Get | Token::Set) && !is_async && !is_generator {
            let next = self.peek_token()?;
            if !Self::is_class_element_name_end(&next) {
                accessor_kind = Some(if self.token == Token::Get {
                    ClassMethodKind::Get
                } else {
                    ClassMethodKind::Set
                });
                self.advance()?;
            }
        }

        let key_loc = self.loc;
        let (key, is_computed) = self.parse_property_key(ctx)?;
        let is_private = matches!(*key, Expression::PrivateName(_));

        let static_name = if is_computed {
            None
        } else {
            match &*key {
                Expression::Id(id) if !is_private => Some(id.name.clone()),
                Expression::String(lit) => Some(lit.value.clone()),
                _ => None,
            }
        };

        if is_static && static_name.as_deref() == Some("prototype") {
            return self.error(key_loc, ParseError::ClassStaticPrototype);
        }

        let is_method = self.token == Token::LeftParen
            || is_async
            || is_generator
            || accessor_kind.is_some();

        if let Expression::PrivateName(id) = &*key {
            let private_kind = match accessor_kind {
                Some(ClassMethodKind::Get) => PrivateNameKind::Getter,
                Some(ClassMethodKind::Set) => PrivateNameKind::Setter,
                _ => PrivateNameKind::Other,
            };

            self.declare_private_name(id, private_kind, is_static)?;
        }

        if !is_method {
            if static_name.as_deref() == Some("constructor") {
                return self.error(key_loc, ParseError::ConstructorClassField);
            }

            return self.parse_class_property(ctx, start_pos, key, is_computed, is_static, is_private);
        }

        let is_constructor = !is_static && static_name.as_deref() == Some("constructor");
        if is_constructor {
            if *has_constructor {
                return self.error(key_loc, ParseError::MultipleConstructors);
            }

            if is_async || is_generator || accessor_kind.is_some() {
                return self.error(key_loc, ParseError::NonSimpleConstructor);
            }

            *has_constructor = true;
        }

        let (kind, function_kind) = match accessor_kind {
            Some(ClassMethodKind::Get) => (ClassMethodKind::Get, FunctionKind::Getter),
            Some(ClassMethodKind::Set) => (ClassMethodKind::Set, FunctionKind::Setter),
            _ if is_constructor => (ClassMethodKind::Constructor, FunctionKind::Method),
            _ => (ClassMethodKind::Method, FunctionKind::Method),
        };

        let value_start_pos = self.current_start_pos();
        let value = self.parse_method(
            ctx,
            value_start_pos,
            is_async,
            is_generator,
            function_kind,
            is_constructor && is_derived,
        )?;

        Ok(ClassElement::Method(ClassMethod {
            loc: self.mark_loc(start_pos),
            key,
            value,
            kind,
            is_computed,
            is_static,
            is_private,
        }))
    }

    fn parse_class_property(
        &mut self,
        ctx: Context,
        start_pos: Pos,
        key: P<Expression>,
        is_computed: bool,
        is_static: bool,
        is_private: bool,
    ) -> ParseResult<ClassElement> {
        let value = if self.token == Token::Equals {
            self.advance()?;

            // Initializers are evaluated as if they were methods of the class
            self.scopes.enter_scope(ScopeKind::Function);
            let saved_labels = std::mem::take(&mut self.labels);
            let saved_yield_or_await_pos = self.last_yield_or_await_pos.take();
            let saved_await_ident_pos = self.last_await_ident_pos.take();

            let result = self.parse_assignment_expression(ctx.for_class_initializer(false));

            self.labels = saved_labels;
            self.last_yield_or_await_pos = saved_yield_or_await_pos;
            self.last_await_ident_pos = saved_await_ident_pos;
            self.scopes.exit_scope();

            Some(result?)
        } else {
            None
        };

        self.expect_semicolon()?;

        Ok(ClassElement::Property(ClassProperty {
            loc: self.mark_loc(start_pos),
            key,
            value,
            is_computed,
            is_static,
            is_private,
        }))
    }

    fn parse_static_block(&mut self, ctx: Context, start_pos: Pos) -> ParseResult<ClassElement> {
        // Skip the `static` keyword
        self.advance()?;

        let block_ctx = ctx.for_class_initializer(true);

        self.scopes.enter_scope(ScopeKind::StaticBlock);
        let saved_labels = std::mem::take(&mut self.labels);
        let saved_label_run_start = self.label_run_start.take();

        let result = self.parse_block_in_current_scope(block_ctx);

        self.labels = saved_labels;
        self.label_run_start = saved_label_run_start;
        self.scopes.exit_scope();

        let block = result?;

        Ok(ClassElement::StaticBlock(StaticBlock { loc: self.mark_loc(start_pos), body: block.body }))
    }

    fn declare_private_name(
        &mut self,
        id: &Identifier,
        kind: PrivateNameKind,
        is_static: bool,
    ) -> ParseResult<()> {
        if id.name == "constructor" {
            return self.error(id.loc, ParseError::PrivateNameConstructor);
        }

        let Some(scope) = self.private_names.last_mut() else {
            return Ok(());
        };

        // A getter and setter with the same staticness may share a name
        let is_duplicate = scope.declared.iter().any(|(name, existing_kind, existing_is_static)| {
            if *name != id.name {
                return false;
            }

            let is_accessor_pair = matches!(
                (existing_kind, kind),
                (PrivateNameKind::Getter, PrivateNameKind::Setter)
                    | (PrivateNameKind::Setter, PrivateNameKind::Getter)
            );

            !is_accessor_pair || *existing_is_static != is_static
        });

        if is_duplicate {
            return self.error(id.loc, ParseError::DuplicatePrivateName(id.name.clone()));
        }

        scope.declared.push((id.name.clone(), kind, is_static));

        Ok(())
    }

    /// Check the private names referenced in the class that was just parsed. Names not declared by
    /// this class must be declared by an enclosing class.
    fn resolve_class_private_names(&mut self) -> ParseResult<()> {
        let Some(scope) = self.private_names.pop() else {
            return Ok(());
        };

        for id in scope.used {
            if scope.declared.iter().any(|(name, _, _)| *name == id.name) {
                continue;
            }

            match self.private_names.last_mut() {
                Some(outer_scope) => outer_scope.used.push(id),
                None => return self.error(id.loc, ParseError::PrivateNameNotDefined(id.name)),
            }
        }

        Ok(())
    }

    fn parse_binding_pattern(&mut self, ctx: Context) -> ParseResult<Pattern> {
        self.with_recursion(|parser| match parser.token {
            Token::LeftBracket => parser.parse_array_binding_pattern(ctx),
            Token::LeftBrace => parser.parse_object_binding_pattern(ctx),
            _ => Ok(Pattern::Id(parser.parse_binding_identifier(ctx)?)),
        })
    }

    /// Parse a binding pattern with an optional default value.
    fn parse_binding_element(&mut self, ctx: Context) -> ParseResult<Pattern> {
        let start_pos = self.current_start_pos();
        let pattern = self.parse_binding_pattern(ctx)?;

        if self.token != Token::Equals {
            return Ok(pattern);
        }

        self.advance()?;
        let right = self.parse_assignment_expression(ctx | Context::ALLOW_IN)?;

        Ok(Pattern::Assign(AssignmentPattern {
            loc: self.mark_loc(start_pos),
            left: p(pattern),
            right,
        }))
    }

    /// Parse a rest element, which must be the last element before the closing token.
    fn parse_binding_rest_element(
        &mut self,
        ctx: Context,
        close_token: &Token,
    ) -> ParseResult<RestElement> {
        let start_pos = self.current_start_pos();
        self.expect(Token::Spread)?;

        let argument = self.parse_binding_pattern(ctx)?;
        let loc = self.mark_loc(start_pos);

        if self.token == Token::Equals {
            return self.error(loc, ParseError::RestWithInitializer);
        }

        if self.token == Token::Comma {
            if self.peek_token()? == *close_token {
                return self.error(loc, ParseError::RestTrailingComma);
            }

            return self.error(loc, ParseError::RestElementNotLast);
        }

        Ok(RestElement { loc, argument: p(argument) })
    }

    fn parse_array_binding_pattern(&mut self, ctx: Context) -> ParseResult<Pattern> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let mut elements = vec![];
        while self.token != Token::RightBracket {
            if self.token == Token::Comma {
                elements.push(ArrayPatternElement::Hole(self.current_start_pos()));
                self.advance()?;
                continue;
            }

            if self.token == Token::Spread {
                let rest = self.parse_binding_rest_element(ctx, &Token::RightBracket)?;
                elements.push(ArrayPatternElement::Rest(rest));
                break;
            }

            elements.push(ArrayPatternElement::Pattern(self.parse_binding_element(ctx)?));

            if self.token != Token::RightBracket {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RightBracket)?;

        Ok(Pattern::Array(ArrayPattern { loc: self.mark_loc(start_pos), elements }))
    }

    fn parse_object_binding_pattern(&mut self, ctx: Context) -> ParseResult<Pattern> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let mut properties = vec![];
        while self.token != Token::RightBrace {
            let property_start_pos = self.current_start_pos();

            if self.token == Token::Spread {
                self.advance()?;

                // Object rest elements can only bind an identifier
                let id = self.parse_binding_identifier(ctx)?;
                let loc = self.mark_loc(property_start_pos);

                if self.token != Token::RightBrace {
                    if self.token == Token::Comma && self.peek_token()? == Token::RightBrace {
                        return self.error(loc, ParseError::RestTrailingComma);
                    }

                    return self.error(loc, ParseError::RestElementNotLast);
                }

                properties.push(ObjectPatternProperty {
                    loc,
                    key: None,
                    value: p(Pattern::Id(id)),
                    is_computed: false,
                    is_rest: true,
                    is_shorthand: false,
                });
                break;
            }

            let is_shorthand = self.is_identifier_token()
                && matches!(
                    self.peek_token()?,
                    Token::Comma | Token::RightBrace | Token::Equals
                );

            let property = if is_shorthand {
                let id = self.parse_binding_identifier(ctx)?;
                let mut value = Pattern::Id(id.clone());

                if self.token == Token::Equals {
                    self.advance()?;
                    let right = self.parse_assignment_expression(ctx | Context::ALLOW_IN)?;
                    value = Pattern::Assign(AssignmentPattern {
                        loc: self.mark_loc(property_start_pos),
                        left: p(value),
                        right,
                    });
                }

                ObjectPatternProperty {
                    loc: self.mark_loc(property_start_pos),
                    key: Some(p(Expression::Id(id))),
                    value: p(value),
                    is_computed: false,
                    is_rest: false,
                    is_shorthand: true,
                }
            } else {
                if let Token::PrivateName(_) = self.token {
                    return self.error_unexpected_token(self.loc, &self.token);
                }

                let (key, is_computed) = self.parse_property_key(ctx)?;
                self.expect(Token::Colon)?;
                let value = self.parse_binding_element(ctx)?;

                ObjectPatternProperty {
                    loc: self.mark_loc(property_start_pos),
                    key: Some(key),
                    value: p(value),
                    is_computed,
                    is_rest: false,
                    is_shorthand: false,
                }
            };

            properties.push(property);

            if self.token != Token::RightBrace {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RightBrace)?;

        Ok(Pattern::Object(ObjectPattern { loc: self.mark_loc(start_pos), properties }))
    }

    fn parse_import_declaration(&mut self, ctx: Context) -> ParseResult<ImportDeclaration> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let mut specifiers = vec![];

        // Imports without specifiers only load the module, e.g. `import "module"`
        if !matches!(self.token, Token::StringLiteral(_)) {
            if self.is_identifier_token() {
                let local = self.parse_binding_identifier(ctx)?;
                self.declare_lexical_name(ctx, &local, NameKind::Import)?;
                specifiers.push(ImportSpecifier::Default(ImportDefaultSpecifier {
                    loc: local.loc,
                    local: p(local),
                }));

                if self.token == Token::Comma {
                    self.advance()?;
                    self.parse_namespace_or_named_imports(ctx, &mut specifiers)?;
                }
            } else {
                self.parse_namespace_or_named_imports(ctx, &mut specifiers)?;
            }

            if self.token != Token::From || self.is_escaped() {
                return self.error_expected_token(self.loc, &self.token, &Token::From);
            }

            self.advance()?;
        }

        let source = p(self.parse_string_literal(ctx)?);
        let attributes = self.parse_import_attributes(ctx)?;
        self.expect_semicolon()?;

        Ok(ImportDeclaration { loc: self.mark_loc(start_pos), specifiers, source, attributes })
    }

    fn parse_namespace_or_named_imports(
        &mut self,
        ctx: Context,
        specifiers: &mut Vec<ImportSpecifier>,
    ) -> ParseResult<()> {
        let start_pos = self.current_start_pos();

        match self.token {
            Token::Multiply => {
                self.advance()?;
                self.expect(Token::As)?;

                let local = self.parse_binding_identifier(ctx)?;
                self.declare_lexical_name(ctx, &local, NameKind::Import)?;

                specifiers.push(ImportSpecifier::Namespace(ImportNamespaceSpecifier {
                    loc: self.mark_loc(start_pos),
                    local: p(local),
                }));
            }
            Token::LeftBrace => {
                self.advance()?;

                while self.token != Token::RightBrace {
                    specifiers.push(ImportSpecifier::Named(self.parse_import_named_specifier(ctx)?));

                    if self.token != Token::RightBrace {
                        self.expect(Token::Comma)?;
                    }
                }

                self.advance()?;
            }
            _ => return self.error_unexpected_token(self.loc, &self.token),
        }

        Ok(())
    }

    fn parse_import_named_specifier(&mut self, ctx: Context) -> ParseResult<ImportNamedSpecifier> {
        let start_pos = self.current_start_pos();
        let is_escaped = self.is_escaped();
        let imported = self.parse_module_export_name(ctx)?;

        let (imported, local) = if self.token == Token::As {
            self.advance()?;
            (Some(p(imported)), self.parse_binding_identifier(ctx)?)
        } else {
            // Without `as` the imported name is also the local binding
            match imported {
                ExportName::Id(id) => {
                    self.check_identifier_name(ctx, &id.name, id.loc, true, is_escaped)?;
                    (None, id)
                }
                ExportName::String(_) => {
                    return self.error_expected_token(self.loc, &self.token, &Token::As);
                }
            }
        };

        self.declare_lexical_name(ctx, &local, NameKind::Import)?;

        Ok(ImportNamedSpecifier { loc: self.mark_loc(start_pos), imported, local: p(local) })
    }

    /// Parse the name of an imported or exported binding, which may be any identifier name or a
    /// string literal.
    fn parse_module_export_name(&mut self, ctx: Context) -> ParseResult<ExportName> {
        if let Token::StringLiteral(_) = self.token {
            return Ok(ExportName::String(self.parse_string_literal(ctx)?));
        }

        Ok(ExportName::Id(self.parse_identifier_name()?))
    }

    /// Parse import attributes such as `with { type: "json" }`, which are only recognized with
    /// next syntax enabled.
    fn parse_import_attributes(&mut self, ctx: Context) -> ParseResult<Option<P<ImportAttributes>>> {
        if self.token != Token::With || !self.is_next || self.has_newline_before() {
            return Ok(None);
        }

        let start_pos = self.current_start_pos();
        self.advance()?;
        self.expect(Token::LeftBrace)?;

        let mut attributes: Vec<ImportAttribute> = vec![];
        while self.token != Token::RightBrace {
            let attribute_start_pos = self.current_start_pos();
            let key = self.parse_module_export_name(ctx)?;

            if attributes.iter().any(|attribute| attribute.key.name() == key.name()) {
                return self.error(key.loc(), ParseError::DuplicateImportAttribute(key.name().to_owned()));
            }

            self.expect(Token::Colon)?;
            let value = self.parse_string_literal(ctx)?;

            attributes.push(ImportAttribute { loc: self.mark_loc(attribute_start_pos), key, value });

            if self.token != Token::RightBrace {
                self.expect(Token::Comma)?;
            }
        }

        self.advance()?;

        Ok(Some(p(ImportAttributes { loc: self.mark_loc(start_pos), attributes })))
    }

    fn add_exported_name(&mut self, name: &str, loc: Loc) -> ParseResult<()> {
        if !self.exported_names.insert(name.to_owned()) {
            return self.error(loc, ParseError::DuplicateExport(name.to_owned()));
        }

        Ok(())
    }

    fn parse_export_declaration(&mut self, ctx: Context) -> ParseResult<Toplevel> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        match self.token {
            Token::Multiply => {
                self.advance()?;

                let exported = if self.token == Token::As {
                    self.advance()?;
                    let exported = self.parse_module_export_name(ctx)?;
                    self.add_exported_name(exported.name(), exported.loc())?;
                    Some(p(exported))
                } else {
                    None
                };

                self.expect(Token::From)?;
                let source = p(self.parse_string_literal(ctx)?);
                let attributes = self.parse_import_attributes(ctx)?;
                self.expect_semicolon()?;

                Ok(Toplevel::ExportAll(ExportAllDeclaration {
                    loc: self.mark_loc(start_pos),
                    exported,
                    source,
                    attributes,
                }))
            }
            Token::Default => {
                let default_loc = self.loc;
                self.advance()?;
                self.add_exported_name("default", default_loc)?;

                let is_async_function =
                    self.token == Token::Async && self.is_async_function_start()?;

                let declaration = match self.token {
                    Token::Function => {
                        ExportDefaultKind::Function(self.parse_function_declaration(ctx, false, true)?)
                    }
                    Token::Class => ExportDefaultKind::Class(self.parse_class(ctx, true, true)?),
                    Token::Async if is_async_function => {
                        ExportDefaultKind::Function(self.parse_function_declaration(ctx, true, true)?)
                    }
                    _ => {
                        let expr = self.parse_assignment_expression(ctx | Context::ALLOW_IN)?;
                        self.expect_semicolon()?;
                        ExportDefaultKind::Expression(expr)
                    }
                };

                Ok(Toplevel::ExportDefault(ExportDefaultDeclaration {
                    loc: self.mark_loc(start_pos),
                    declaration,
                }))
            }
            Token::LeftBrace => self.parse_export_specifiers(ctx, start_pos),
            Token::Var | Token::Let | Token::Const | Token::Function | Token::Class | Token::Async => {
                let declaration = match self.token {
                    Token::Function => Statement::FuncDecl(self.parse_function_declaration(ctx, false, false)?),
                    Token::Class => Statement::ClassDecl(self.parse_class(ctx, true, false)?),
                    Token::Async => {
                        if !self.is_async_function_start()? {
                            return self.error_unexpected_token(self.loc, &self.token);
                        }

                        Statement::FuncDecl(self.parse_function_declaration(ctx, true, false)?)
                    }
                    _ => {
                        let decl = self.parse_variable_declaration(ctx, false)?;
                        self.expect_semicolon()?;
                        Statement::VarDecl(decl)
                    }
                };

                self.add_declaration_exported_names(&declaration)?;

                Ok(Toplevel::ExportNamed(ExportNamedDeclaration {
                    loc: self.mark_loc(start_pos),
                    declaration: Some(p(declaration)),
                    specifiers: vec![],
                    source: None,
                    attributes: None,
                }))
            }
            _ => self.error_unexpected_token(self.loc, &self.token),
        }
    }

    fn add_declaration_exported_names(&mut self, declaration: &Statement) -> ParseResult<()> {
        let mut names = vec![];
        match declaration {
            Statement::FuncDecl(func) => names.extend(func.id.as_deref()),
            Statement::ClassDecl(class) => names.extend(class.id.as_deref()),
            Statement::VarDecl(decl) => {
                for declarator in &decl.declarations {
                    declarator.id.iter_bound_names(&mut |id| names.push(id));
                }
            }
            _ => {}
        }

        for id in names {
            self.add_exported_name(&id.name, id.loc)?;
        }

        Ok(())
    }

    fn parse_export_specifiers(&mut self, ctx: Context, start_pos: Pos) -> ParseResult<Toplevel> {
        self.advance()?;

        let mut specifiers = vec![];
        // Local names that are reserved words, only allowed when re-exporting from another module
        let mut first_invalid_local = None;

        while self.token != Token::RightBrace {
            let specifier_start_pos = self.current_start_pos();

            if first_invalid_local.is_none() {
                let is_invalid_local = match &self.token {
                    Token::StringLiteral(_) => true,
                    Token::Identifier(name) => ctx.is_reserved_word(name),
                    token => token
                        .keyword_str()
                        .map_or(true, |keyword| ctx.is_reserved_word(keyword)),
                };

                if is_invalid_local {
                    first_invalid_local = Some(self.loc);
                }
            }

            let local = self.parse_module_export_name(ctx)?;

            let exported = if self.token == Token::As {
                self.advance()?;
                Some(p(self.parse_module_export_name(ctx)?))
            } else {
                None
            };

            specifiers.push(ExportSpecifier {
                loc: self.mark_loc(specifier_start_pos),
                local: p(local),
                exported,
            });

            if self.token != Token::RightBrace {
                self.expect(Token::Comma)?;
            }
        }

        self.advance()?;

        let (source, attributes) = if self.token == Token::From {
            self.advance()?;
            let source = p(self.parse_string_literal(ctx)?);
            (Some(source), self.parse_import_attributes(ctx)?)
        } else {
            if let Some(loc) = first_invalid_local {
                return self.error(loc, ParseError::InvalidExportLocalName);
            }

            // Exported local names must be declared somewhere in the module
            for specifier in &specifiers {
                if let ExportName::Id(id) = &*specifier.local {
                    self.export_local_refs.push(id.clone());
                }
            }

            (None, None)
        };

        self.expect_semicolon()?;

        for specifier in &specifiers {
            let exported = specifier.exported.as_deref().unwrap_or(&specifier.local);
            self.add_exported_name(exported.name(), exported.loc())?;
        }

        Ok(Toplevel::ExportNamed(ExportNamedDeclaration {
            loc: self.mark_loc(start_pos),
            declaration: None,
            specifiers,
            source,
            attributes,
        }))
    }

    /// Parse a JSX element or fragment. The current token is the opening `<`. If the element is a
    /// child of another element then the token after it is scanned as JSX text.
    fn parse_jsx_element_or_fragment(
        &mut self,
        ctx: Context,
        is_child: bool,
    ) -> ParseResult<P<Expression>> {
        let expr = match self.parse_jsx_child_element(ctx, is_child)? {
            JSXChild::Fragment(fragment) => Expression::JSXFragment(fragment),
            JSXChild::Element(element) => Expression::JSXElement(element),
            _ => return self.error_unexpected_token(self.loc, &self.token),
        };

        self.cover.set(false, false);

        Ok(p(expr))
    }

    fn parse_jsx_child_element(&mut self, ctx: Context, is_child: bool) -> ParseResult<JSXChild> {
        self.with_recursion(|parser| {
            let start_pos = parser.current_start_pos();
            parser.advance()?;

            if parser.is_jsx_tag_end() {
                return Ok(JSXChild::Fragment(parser.parse_jsx_fragment(ctx, start_pos, is_child)?));
            }

            Ok(JSXChild::Element(parser.parse_jsx_element(ctx, start_pos, is_child)?))
        })
    }

    fn parse_jsx_fragment(
        &mut self,
        ctx: Context,
        start_pos: Pos,
        is_child: bool,
    ) -> ParseResult<P<JSXFragment>> {
        self.advance_past_jsx_tag_end(true)?;
        let opening_loc = self.mark_loc(start_pos);

        let (children, closing_start_pos) = self.parse_jsx_children(ctx)?;

        // Skip the `/` of the closing fragment
        self.advance()?;
        self.advance_past_jsx_tag_end(is_child)?;
        let closing_loc = self.mark_loc(closing_start_pos);

        Ok(p(JSXFragment { loc: self.mark_loc(start_pos), opening_loc, closing_loc, children }))
    }

    fn parse_jsx_element(
        &mut self,
        ctx: Context,
        start_pos: Pos,
        is_child: bool,
    ) -> ParseResult<P<JSXElement>> {
        let name = self.parse_jsx_element_name()?;

        let mut attributes = vec![];
        while self.token != Token::Divide && !self.is_jsx_tag_end() {
            attributes.push(self.parse_jsx_attribute(ctx)?);
        }

        if self.token == Token::Divide {
            self.advance()?;
            self.advance_past_jsx_tag_end(is_child)?;

            let loc = self.mark_loc(start_pos);
            let opening = JSXOpeningElement { loc, name, attributes, is_self_closing: true };

            return Ok(p(JSXElement { loc, opening, children: vec![], closing: None }));
        }

        self.advance_past_jsx_tag_end(true)?;
        let opening = JSXOpeningElement {
            loc: self.mark_loc(start_pos),
            name,
            attributes,
            is_self_closing: false,
        };

        let (children, closing_start_pos) = self.parse_jsx_children(ctx)?;

        // Skip the `/` of the closing element
        self.advance()?;
        let closing_name = self.parse_jsx_element_name()?;

        let opening_name = opening.name.to_source_name();
        if closing_name.to_source_name() != opening_name {
            return self.error(closing_name.loc(), ParseError::MismatchedJsxClosingTag(opening_name));
        }

        self.advance_past_jsx_tag_end(is_child)?;
        let closing = JSXClosingElement { loc: self.mark_loc(closing_start_pos), name: closing_name };

        Ok(p(JSXElement { loc: self.mark_loc(start_pos), opening, children, closing: Some(closing) }))
    }

    /// Whether the current token begins with the `>` that ends a JSX tag.
    fn is_jsx_tag_end(&self) -> bool {
        matches!(
            self.token,
            Token::GreaterThan
                | Token::GreaterThanOrEqual
                | Token::ShiftRightArithmetic
                | Token::ShiftRightLogical
                | Token::ShiftRightArithmeticEq
                | Token::ShiftRightLogicalEq
        )
    }

    /// Consume the `>` that ends a JSX tag. The following token is scanned as JSX text when it is
    /// within the children of an element.
    fn advance_past_jsx_tag_end(&mut self, into_children: bool) -> ParseResult<()> {
        if !self.is_jsx_tag_end() {
            return self.error_expected_token(self.loc, &self.token, &Token::GreaterThan);
        }

        let (token, loc) = self.lexer.rescan_greater_than(self.loc.start)?;
        self.token = token;
        self.loc = loc;
        self.replace_last_token_event();

        if into_children {
            self.advance_jsx_child()
        } else {
            self.advance()
        }
    }

    fn advance_jsx_child(&mut self) -> ParseResult<()> {
        let next = self.lexer.next_jsx_child()?;
        self.set_token(next);
        Ok(())
    }

    /// Parse children until the `</` of a closing tag. Returns the children along with the start
    /// of the closing tag. The current token is left as the `/`.
    fn parse_jsx_children(&mut self, ctx: Context) -> ParseResult<(Vec<JSXChild>, Pos)> {
        let mut children = vec![];

        loop {
            match &self.token {
                Token::JsxText(text) => {
                    children.push(JSXChild::Text(JSXText { loc: self.loc, value: text.clone() }));
                    self.advance_jsx_child()?;
                }
                Token::LeftBrace => children.push(self.parse_jsx_child_expression(ctx)?),
                Token::LessThan => {
                    if self.peek_token()? == Token::Divide {
                        let closing_start_pos = self.current_start_pos();
                        self.advance()?;
                        return Ok((children, closing_start_pos));
                    }

                    children.push(self.parse_jsx_child_element(ctx, true)?);
                }
                _ => return self.error_unexpected_token(self.loc, &self.token),
            }
        }
    }

    /// Parse an expression container or spread child such as `{value}` or `{...values}`.
    fn parse_jsx_child_expression(&mut self, ctx: Context) -> ParseResult<JSXChild> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let child = if self.token == Token::Spread {
            self.advance()?;
            let expression = self.parse_expression(ctx | Context::ALLOW_IN)?;
            self.expect_jsx_container_end()?;

            JSXChild::Spread(JSXSpreadChild { loc: Loc::new(start_pos, self.loc.end), expression })
        } else {
            let expression = if self.token == Token::RightBrace {
                None
            } else {
                Some(self.parse_expression(ctx | Context::ALLOW_IN)?)
            };
            self.expect_jsx_container_end()?;

            JSXChild::Expression(JSXExpressionContainer {
                loc: Loc::new(start_pos, self.loc.end),
                expression,
            })
        };

        // The closing brace is followed by more children
        self.advance_jsx_child()?;

        Ok(child)
    }

    fn expect_jsx_container_end(&self) -> ParseResult<()> {
        if self.token != Token::RightBrace {
            return self.error_expected_token(self.loc, &self.token, &Token::RightBrace);
        }

        Ok(())
    }

    /// Parse a JSX identifier, which may contain dashes and any keyword.
    fn parse_jsx_identifier(&mut self) -> ParseResult<JSXIdentifier> {
        let Some(mut name) = self.token_property_name() else {
            return self.error_unexpected_token(self.loc, &self.token);
        };

        let (rest, end_pos) = self.lexer.extend_jsx_identifier();
        if !rest.is_empty() {
            name.push_str(&rest);
            self.loc.end = end_pos;
            self.replace_last_token_event();
        }

        let loc = self.loc;
        self.advance()?;

        Ok(JSXIdentifier { loc, name })
    }

    fn parse_jsx_element_name(&mut self) -> ParseResult<JSXElementName> {
        let start_pos = self.current_start_pos();
        let id = self.parse_jsx_identifier()?;

        if self.token == Token::Colon {
            self.advance()?;
            let name = self.parse_jsx_identifier()?;
            return Ok(JSXElementName::Namespaced(JSXNamespacedName {
                loc: self.mark_loc(start_pos),
                namespace: id,
                name,
            }));
        }

        let mut name = JSXElementName::Identifier(id);
        while self.token == Token::Period {
            self.advance()?;
            let property = self.parse_jsx_identifier()?;
            name = JSXElementName::Member(JSXMemberExpression {
                loc: self.mark_loc(start_pos),
                object: p(name),
                property,
            });
        }

        Ok(name)
    }

    fn parse_jsx_attribute(&mut self, ctx: Context) -> ParseResult<JSXAttributeItem> {
        let start_pos = self.current_start_pos();

        if self.token == Token::LeftBrace {
            self.advance()?;
            self.expect(Token::Spread)?;
            let argument = self.parse_assignment_expression(ctx | Context::ALLOW_IN)?;
            self.expect(Token::RightBrace)?;

            return Ok(JSXAttributeItem::Spread(JSXSpreadAttribute {
                loc: self.mark_loc(start_pos),
                argument,
            }));
        }

        let id = self.parse_jsx_identifier()?;
        let name = if self.token == Token::Colon {
            self.advance()?;
            let name = self.parse_jsx_identifier()?;
            JSXAttributeName::Namespaced(JSXNamespacedName {
                loc: self.mark_loc(start_pos),
                namespace: id,
                name,
            })
        } else {
            JSXAttributeName::Identifier(id)
        };

        let value = if self.token == Token::Equals {
            let next = self.lexer.next_jsx_attribute_value()?;
            self.set_token(next);

            Some(self.parse_jsx_attribute_value(ctx)?)
        } else {
            None
        };

        Ok(JSXAttributeItem::Attribute(JSXAttribute { loc: self.mark_loc(start_pos), name, value }))
    }

    fn parse_jsx_attribute_value(&mut self, ctx: Context) -> ParseResult<JSXAttributeValue> {
        match &self.token {
            Token::StringLiteral(value) => {
                let literal = StringLiteral { loc: self.loc, value: value.clone() };
                self.advance()?;
                Ok(JSXAttributeValue::String(literal))
            }
            Token::LeftBrace => {
                let start_pos = self.current_start_pos();
                self.advance()?;

                // Attribute expression containers cannot be empty
                if self.token == Token::RightBrace {
                    return self.error_unexpected_token(self.loc, &self.token);
                }

                let expression = self.parse_assignment_expression(ctx | Context::ALLOW_IN)?;
                self.expect(Token::RightBrace)?;

                Ok(JSXAttributeValue::Expression(JSXExpressionContainer {
                    loc: self.mark_loc(start_pos),
                    expression: Some(expression),
                }))
            }
            Token::LessThan => match self.parse_jsx_child_element(ctx, false)? {
                JSXChild::Element(element) => Ok(JSXAttributeValue::Element(element)),
                JSXChild::Fragment(fragment) => Ok(JSXAttributeValue::Fragment(fragment)),
                _ => self.error_unexpected_token(self.loc, &self.token),
            },
            _ => self.error_unexpected_token(self.loc, &self.token),
        }
    }
}

fn parse_with_events(source: &Rc<Source>, options: &ParseOptions) -> ParseResult<ParsedProgram> {
    let collect_comments = options.on_comment.is_some();
    let lexer = Lexer::new(source, options.module, collect_comments);
    let mut parser = Parser::new(lexer, options);

    let (ctx, kind) = if options.module {
        (Context::module(), ProgramKind::Module)
    } else {
        (Context::script(options.implied_strict, options.global_return), ProgramKind::Script)
    };

    debug!(file = %source.file_path, ?kind, "parsing program");

    let program = parser.parse_program(ctx, kind)?;

    debug!(num_toplevels = program.toplevels.len(), "parsed program");

    Ok(ParsedProgram {
        program,
        comments: parser.lexer.take_comments(),
        tokens: std::mem::take(&mut parser.token_events),
    })
}

/// Parse a program with the given options. Comments and tokens are passed to the callbacks in the
/// options only once the entire program has parsed successfully.
pub fn parse(source: &Rc<Source>, mut options: ParseOptions) -> ParseResult<Program> {
    let parsed = parse_with_events(source, &options)?;

    if let Some(on_comment) = options.on_comment.as_mut() {
        for comment in parsed.comments {
            on_comment(comment);
        }
    }

    if let Some(on_token) = options.on_token.as_mut() {
        for token in parsed.tokens {
            on_token(token);
        }
    }

    Ok(parsed.program)
}

pub fn parse_script(source: &Rc<Source>) -> ParseResult<Program> {
    parse(source, ParseOptions::default())
}

pub fn parse_module(source: &Rc<Source>) -> ParseResult<Program> {
    parse(source, ParseOptions { module: true, ..ParseOptions::default() })
}
