use std::fmt;

use bitflags::bitflags;
use num_bigint::BigInt;

use super::ast::{AssignmentOperator, BinaryOperator, LogicalOperator};
use super::loc::Loc;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Identifier(String),
    PrivateName(String),
    NumberLiteral(f64),
    StringLiteral(String),
    BigIntLiteral(BigInt),
    TemplatePart {
        raw: String,
        /// Cooked string, or the location of the first malformed escape sequence
        cooked: Result<String, Loc>,
        is_head: bool,
        is_tail: bool,
    },
    RegExpLiteral {
        raw: String,
        pattern: String,
        flags: String,
    },
    JsxText(String),
    Eof,
    // Operators
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    Exponent,
    Increment,
    Decrement,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseNot,
    ShiftLeft,
    ShiftRightArithmetic,
    ShiftRightLogical,
    LogicalNot,
    LogicalAnd,
    LogicalOr,
    NullishCoalesce,
    Equals,
    AddEq,
    SubtractEq,
    MultiplyEq,
    DivideEq,
    RemainderEq,
    ExponentEq,
    AndEq,
    OrEq,
    XorEq,
    ShiftLeftEq,
    ShiftRightArithmeticEq,
    ShiftRightLogicalEq,
    LogicalAndEq,
    LogicalOrEq,
    NullishCoalesceEq,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Period,
    Spread,
    Colon,
    Question,
    QuestionDot,
    Arrow,
    // Keywords
    Var,
    Let,
    Const,
    Function,
    Async,
    This,
    If,
    Else,
    Switch,
    Case,
    Default,
    For,
    Of,
    While,
    Do,
    With,
    Return,
    Break,
    Continue,
    Try,
    Catch,
    Finally,
    Throw,
    Null,
    True,
    False,
    In,
    InstanceOf,
    New,
    Typeof,
    Void,
    Delete,
    Debugger,
    Static,
    From,
    As,
    Class,
    Extends,
    Super,
    Get,
    Set,
    Import,
    Export,
    Await,
    Yield,
    Enum,
    Target,
    Meta,
}

bitflags! {
    /// Facts about the most recently scanned token that are not part of its value. Reset at the
    /// start of every scan.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TokenFlags: u8 {
        /// A line terminator appears between the previous token and this one
        const NEW_LINE_BEFORE = 1 << 0;
        /// Identifier contained a unicode escape sequence
        const ESCAPED = 1 << 1;
        /// Numeric literal with a leading zero followed by a digit
        const LEGACY_OCTAL = 1 << 2;
        /// String literal contained a legacy octal escape such as `\07`
        const OCTAL_ESCAPE = 1 << 3;
        /// String literal contained `\8` or `\9`
        const NON_OCTAL_DECIMAL_ESCAPE = 1 << 4;
    }
}

/// Binding strength of infix operators, from strongest to weakest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    PostfixUpdate,
    Unary,
    Exponentiation,
    Multiplication,
    Addition,
    Shift,
    Relational,
    Equality,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    LogicalAnd,
    LogicalOr,
    NullishCoalesce,
    Conditional,
}

impl Precedence {
    pub fn is_weaker_than(self, other: Precedence) -> bool {
        self > other
    }
}

impl Token {
    /// Precedence of the binary or logical operator this token denotes, if any.
    pub fn precedence(&self) -> Option<Precedence> {
        let precedence = match self {
            Token::Exponent => Precedence::Exponentiation,
            Token::Multiply | Token::Divide | Token::Remainder => Precedence::Multiplication,
            Token::Plus | Token::Minus => Precedence::Addition,
            Token::ShiftLeft | Token::ShiftRightArithmetic | Token::ShiftRightLogical => {
                Precedence::Shift
            }
            Token::LessThan
            | Token::LessThanOrEqual
            | Token::GreaterThan
            | Token::GreaterThanOrEqual
            | Token::In
            | Token::InstanceOf => Precedence::Relational,
            Token::EqEq | Token::NotEq | Token::EqEqEq | Token::NotEqEq => Precedence::Equality,
            Token::BitwiseAnd => Precedence::BitwiseAnd,
            Token::BitwiseXor => Precedence::BitwiseXor,
            Token::BitwiseOr => Precedence::BitwiseOr,
            Token::LogicalAnd => Precedence::LogicalAnd,
            Token::LogicalOr => Precedence::LogicalOr,
            Token::NullishCoalesce => Precedence::NullishCoalesce,
            _ => return None,
        };

        Some(precedence)
    }

    pub fn binary_operator(&self) -> Option<BinaryOperator> {
        let operator = match self {
            Token::Plus => BinaryOperator::Add,
            Token::Minus => BinaryOperator::Subtract,
            Token::Multiply => BinaryOperator::Multiply,
            Token::Divide => BinaryOperator::Divide,
            Token::Remainder => BinaryOperator::Remainder,
            Token::Exponent => BinaryOperator::Exponent,
            Token::EqEq => BinaryOperator::EqEq,
            Token::NotEq => BinaryOperator::NotEq,
            Token::EqEqEq => BinaryOperator::EqEqEq,
            Token::NotEqEq => BinaryOperator::NotEqEq,
            Token::LessThan => BinaryOperator::LessThan,
            Token::LessThanOrEqual => BinaryOperator::LessThanOrEqual,
            Token::GreaterThan => BinaryOperator::GreaterThan,
            Token::GreaterThanOrEqual => BinaryOperator::GreaterThanOrEqual,
            Token::BitwiseAnd => BinaryOperator::And,
            Token::BitwiseOr => BinaryOperator::Or,
            Token::BitwiseXor => BinaryOperator::Xor,
            Token::ShiftLeft => BinaryOperator::ShiftLeft,
            Token::ShiftRightArithmetic => BinaryOperator::ShiftRightArithmetic,
            Token::ShiftRightLogical => BinaryOperator::ShiftRightLogical,
            Token::In => BinaryOperator::In,
            Token::InstanceOf => BinaryOperator::InstanceOf,
            _ => return None,
        };

        Some(operator)
    }

    pub fn logical_operator(&self) -> Option<LogicalOperator> {
        match self {
            Token::LogicalAnd => Some(LogicalOperator::And),
            Token::LogicalOr => Some(LogicalOperator::Or),
            Token::NullishCoalesce => Some(LogicalOperator::NullishCoalesce),
            _ => None,
        }
    }

    pub fn assignment_operator(&self) -> Option<AssignmentOperator> {
        let operator = match self {
            Token::Equals => AssignmentOperator::Equals,
            Token::AddEq => AssignmentOperator::Add,
            Token::SubtractEq => AssignmentOperator::Subtract,
            Token::MultiplyEq => AssignmentOperator::Multiply,
            Token::DivideEq => AssignmentOperator::Divide,
            Token::RemainderEq => AssignmentOperator::Remainder,
            Token::ExponentEq => AssignmentOperator::Exponent,
            Token::AndEq => AssignmentOperator::And,
            Token::OrEq => AssignmentOperator::Or,
            Token::XorEq => AssignmentOperator::Xor,
            Token::ShiftLeftEq => AssignmentOperator::ShiftLeft,
            Token::ShiftRightArithmeticEq => AssignmentOperator::ShiftRightArithmetic,
            Token::ShiftRightLogicalEq => AssignmentOperator::ShiftRightLogical,
            Token::LogicalAndEq => AssignmentOperator::LogicalAnd,
            Token::LogicalOrEq => AssignmentOperator::LogicalOr,
            Token::NullishCoalesceEq => AssignmentOperator::NullishCoalesce,
            _ => return None,
        };

        Some(operator)
    }

    /// Source text of a keyword token, including contextual keywords.
    pub fn keyword_str(&self) -> Option<&'static str> {
        let str = match self {
            Token::Var => "var",
            Token::Let => "let",
            Token::Const => "const",
            Token::Function => "function",
            Token::Async => "async",
            Token::This => "this",
            Token::If => "if",
            Token::Else => "else",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::For => "for",
            Token::Of => "of",
            Token::While => "while",
            Token::Do => "do",
            Token::With => "with",
            Token::Return => "return",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Try => "try",
            Token::Catch => "catch",
            Token::Finally => "finally",
            Token::Throw => "throw",
            Token::Null => "null",
            Token::True => "true",
            Token::False => "false",
            Token::In => "in",
            Token::InstanceOf => "instanceof",
            Token::New => "new",
            Token::Typeof => "typeof",
            Token::Void => "void",
            Token::Delete => "delete",
            Token::Debugger => "debugger",
            Token::Static => "static",
            Token::From => "from",
            Token::As => "as",
            Token::Class => "class",
            Token::Extends => "extends",
            Token::Super => "super",
            Token::Get => "get",
            Token::Set => "set",
            Token::Import => "import",
            Token::Export => "export",
            Token::Await => "await",
            Token::Yield => "yield",
            Token::Enum => "enum",
            Token::Target => "target",
            Token::Meta => "meta",
            _ => return None,
        };

        Some(str)
    }

    /// Category name used when reporting scanned tokens.
    pub fn category(&self) -> &'static str {
        match self {
            Token::Identifier(_) => "Identifier",
            Token::PrivateName(_) => "PrivateIdentifier",
            Token::NumberLiteral(_) => "Numeric",
            Token::StringLiteral(_) => "String",
            Token::BigIntLiteral(_) => "BigInt",
            Token::TemplatePart { .. } => "Template",
            Token::RegExpLiteral { .. } => "RegularExpression",
            Token::JsxText(_) => "JSXText",
            Token::Eof => "EOF",
            Token::Null => "Null",
            Token::True | Token::False => "Boolean",
            // Contextual keywords are identifiers wherever they are not used as keywords
            Token::Async
            | Token::Of
            | Token::From
            | Token::As
            | Token::Get
            | Token::Set
            | Token::Static
            | Token::Let
            | Token::Await
            | Token::Yield
            | Token::Target
            | Token::Meta => "Identifier",
            _ if self.keyword_str().is_some() => "Keyword",
            _ => "Punctuator",
        }
    }
}

/// Map an identifier to the keyword token it spells. Keywords are between 2 and 11 bytes long.
pub fn id_to_keyword(id: &str) -> Option<Token> {
    if id.len() < 2 || id.len() > 11 {
        return None;
    }

    let keyword = match id {
        "var" => Token::Var,
        "let" => Token::Let,
        "const" => Token::Const,
        "function" => Token::Function,
        "async" => Token::Async,
        "this" => Token::This,
        "if" => Token::If,
        "else" => Token::Else,
        "switch" => Token::Switch,
        "case" => Token::Case,
        "default" => Token::Default,
        "for" => Token::For,
        "of" => Token::Of,
        "while" => Token::While,
        "do" => Token::Do,
        "with" => Token::With,
        "return" => Token::Return,
        "break" => Token::Break,
        "continue" => Token::Continue,
        "try" => Token::Try,
        "catch" => Token::Catch,
        "finally" => Token::Finally,
        "throw" => Token::Throw,
        "null" => Token::Null,
        "true" => Token::True,
        "false" => Token::False,
        "in" => Token::In,
        "instanceof" => Token::InstanceOf,
        "new" => Token::New,
        "typeof" => Token::Typeof,
        "void" => Token::Void,
        "delete" => Token::Delete,
        "debugger" => Token::Debugger,
        "static" => Token::Static,
        "from" => Token::From,
        "as" => Token::As,
        "class" => Token::Class,
        "extends" => Token::Extends,
        "super" => Token::Super,
        "get" => Token::Get,
        "set" => Token::Set,
        "import" => Token::Import,
        "export" => Token::Export,
        "await" => Token::Await,
        "yield" => Token::Yield,
        "enum" => Token::Enum,
        "target" => Token::Target,
        "meta" => Token::Meta,
        _ => return None,
    };

    Some(keyword)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(keyword) = self.keyword_str() {
            return f.write_str(keyword);
        }

        let str = match self {
            Token::Identifier(name) => return f.write_str(name),
            Token::PrivateName(name) => return write!(f, "#{}", name),
            Token::NumberLiteral(value) => return write!(f, "{}", value),
            Token::StringLiteral(value) => return write!(f, "\"{}\"", value),
            Token::BigIntLiteral(value) => return write!(f, "{}n", value),
            Token::TemplatePart { raw, .. } => return write!(f, "`{}`", raw),
            Token::RegExpLiteral { raw, .. } => return f.write_str(raw),
            Token::JsxText(text) => return f.write_str(text),
            Token::Eof => "<EOF>",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Multiply => "*",
            Token::Divide => "/",
            Token::Remainder => "%",
            Token::Exponent => "**",
            Token::Increment => "++",
            Token::Decrement => "--",
            Token::BitwiseAnd => "&",
            Token::BitwiseOr => "|",
            Token::BitwiseXor => "^",
            Token::BitwiseNot => "~",
            Token::ShiftLeft => "<<",
            Token::ShiftRightArithmetic => ">>",
            Token::ShiftRightLogical => ">>>",
            Token::LogicalNot => "!",
            Token::LogicalAnd => "&&",
            Token::LogicalOr => "||",
            Token::NullishCoalesce => "??",
            Token::Equals => "=",
            Token::AddEq => "+=",
            Token::SubtractEq => "-=",
            Token::MultiplyEq => "*=",
            Token::DivideEq => "/=",
            Token::RemainderEq => "%=",
            Token::ExponentEq => "**=",
            Token::AndEq => "&=",
            Token::OrEq => "|=",
            Token::XorEq => "^=",
            Token::ShiftLeftEq => "<<=",
            Token::ShiftRightArithmeticEq => ">>=",
            Token::ShiftRightLogicalEq => ">>>=",
            Token::LogicalAndEq => "&&=",
            Token::LogicalOrEq => "||=",
            Token::NullishCoalesceEq => "??=",
            Token::EqEq => "==",
            Token::EqEqEq => "===",
            Token::NotEq => "!=",
            Token::NotEqEq => "!==",
            Token::LessThan => "<",
            Token::LessThanOrEqual => "<=",
            Token::GreaterThan => ">",
            Token::GreaterThanOrEqual => ">=",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::Period => ".",
            Token::Spread => "...",
            Token::Colon => ":",
            Token::Question => "?",
            Token::QuestionDot => "?.",
            Token::Arrow => "=>",
            // Keywords were handled above
            _ => "<keyword>",
        };

        f.write_str(str)
    }
}
