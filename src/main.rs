mod terminal;

use cinder::parser::{
    self, loc::Loc, source::Source, Comment, CommentKind, ParseOptions, TokenEvent,
};

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

#[derive(Parser)]
#[command(about)]
struct Args {
    /// Parse as module instead of script
    #[arg(long, default_value_t = false)]
    module: bool,

    /// Enable syntax that is not yet standardized, such as import attributes
    #[arg(long, default_value_t = false)]
    next: bool,

    /// Enable JSX syntax
    #[arg(long, default_value_t = false)]
    jsx: bool,

    /// Include start and end offsets on every node
    #[arg(long, default_value_t = false)]
    ranges: bool,

    /// Include line and column locations on every node
    #[arg(long, default_value_t = false)]
    loc: bool,

    /// Include the raw source text of literals
    #[arg(long, default_value_t = false)]
    raw: bool,

    /// Allow return statements at the top level of a script
    #[arg(long, default_value_t = false)]
    global_return: bool,

    /// Parse scripts in strict mode
    #[arg(long, default_value_t = false)]
    implied_strict: bool,

    /// Include the text of directives on directive statements
    #[arg(long, default_value_t = false)]
    directives: bool,

    /// Print the scanned tokens instead of the AST
    #[arg(long, default_value_t = false)]
    tokens: bool,

    /// Print the comments instead of the AST
    #[arg(long, default_value_t = false)]
    comments: bool,

    /// Never use colors when printing errors
    #[arg(long, default_value_t = false)]
    no_color: bool,

    file: String,
}

#[derive(Serialize)]
struct TokenDump {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
    start: usize,
    end: usize,
}

impl From<TokenEvent> for TokenDump {
    fn from(token: TokenEvent) -> TokenDump {
        TokenDump {
            kind: token.kind,
            value: token.value,
            start: token.loc.start,
            end: token.loc.end,
        }
    }
}

#[derive(Serialize)]
struct CommentDump {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
    start: usize,
    end: usize,
}

impl From<Comment> for CommentDump {
    fn from(comment: Comment) -> CommentDump {
        let kind = match comment.kind {
            CommentKind::Line => "Line",
            CommentKind::Block => "Block",
        };
        let Loc { start, end } = comment.loc;

        CommentDump { kind, value: comment.value, start, end }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn main_impl(args: &Args) -> Result<(), Box<dyn Error>> {
    let source = Rc::new(Source::new_from_file(&args.file)?);

    let tokens = RefCell::new(vec![]);
    let comments = RefCell::new(vec![]);

    let mut options = ParseOptions {
        module: args.module,
        next: args.next,
        jsx: args.jsx,
        ranges: args.ranges,
        loc: args.loc,
        raw: args.raw,
        global_return: args.global_return,
        implied_strict: args.implied_strict,
        directives: args.directives,
        ..ParseOptions::default()
    };

    if args.tokens {
        options.on_token = Some(Box::new(|token: TokenEvent| {
            tokens.borrow_mut().push(TokenDump::from(token))
        }));
    }

    if args.comments {
        options.on_comment = Some(Box::new(|comment: Comment| {
            comments.borrow_mut().push(CommentDump::from(comment))
        }));
    }

    let print_options = options.print_options();
    let program = parser::parse(&source, options)?;

    if args.tokens {
        println!("{}", serde_json::to_string_pretty(&*tokens.borrow())?);
    } else if args.comments {
        println!("{}", serde_json::to_string_pretty(&*comments.borrow())?);
    } else {
        println!("{}", parser::print_program(&program, &source, print_options));
    }

    Ok(())
}

/// Wrapper to pretty print errors
fn main() {
    init_tracing();

    let args = Args::parse();

    if let Err(err) = main_impl(&args) {
        if terminal::stderr_should_use_colors(args.no_color) {
            eprintln!("{}{}{}{}", terminal::BOLD, terminal::RED, err, terminal::RESET);
        } else {
            eprintln!("{}", err);
        }

        std::process::exit(1);
    }
}
