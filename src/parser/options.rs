use super::lexer::Comment;
use super::loc::Loc;

/// A token scanned during a successful parse.
#[derive(Clone, Debug)]
pub struct TokenEvent {
    /// ESTree token type, e.g. "Keyword" or "Punctuator"
    pub kind: &'static str,
    /// Source text of the token
    pub value: String,
    pub loc: Loc,
}

/// Options that control which grammar is parsed and what is reported while parsing.
#[derive(Default)]
pub struct ParseOptions<'a> {
    /// Parse with the module grammar instead of the script grammar
    pub module: bool,
    /// Enable syntax that is not yet standardized, such as import attributes
    pub next: bool,
    pub jsx: bool,
    /// Include `start` and `end` offsets on every printed node
    pub ranges: bool,
    /// Include line and column locations on every printed node
    pub loc: bool,
    /// Include the raw source text of literals when printed
    pub raw: bool,
    /// Allow `return` at the top level of a script
    pub global_return: bool,
    /// Parse scripts in strict mode
    pub implied_strict: bool,
    /// Include the directive text of directive statements when printed
    pub directives: bool,
    pub on_comment: Option<Box<dyn FnMut(Comment) + 'a>>,
    pub on_token: Option<Box<dyn FnMut(TokenEvent) + 'a>>,
}

impl ParseOptions<'_> {
    pub fn print_options(&self) -> PrintOptions {
        PrintOptions {
            ranges: self.ranges,
            loc: self.loc,
            raw: self.raw,
            directives: self.directives,
        }
    }
}

/// Which optional properties are included when printing an AST.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrintOptions {
    pub ranges: bool,
    pub loc: bool,
    pub raw: bool,
    pub directives: bool,
}
