pub mod ast;
mod context;
mod cover;
pub mod lexer;
pub mod loc;
mod options;
mod parse_error;
mod parser;
mod pattern;
mod printer;
mod scope;
pub mod source;
mod token;
mod unicode;

pub use lexer::{Comment, CommentKind};
pub use options::{ParseOptions, PrintOptions, TokenEvent};
pub use parse_error::{LocalizedParseError, ParseError, ParseResult};
pub use parser::{parse, parse_module, parse_script};
pub use printer::{print_program, program_to_json};
