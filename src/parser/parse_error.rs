use std::error::Error;
use std::rc::Rc;
use std::{fmt, io};

use super::{loc::Loc, scope::NameKind, source::Source, token::Token};

#[derive(Debug)]
pub enum ParseError {
    Io(io::Error),
    // Lexical errors
    UnknownToken(String),
    InvalidUnicode,
    UnterminatedStringLiteral,
    UnterminatedTemplateLiteral,
    UnterminatedBlockComment,
    UnterminatedRegExpLiteral,
    MalformedEscapeSequence,
    InvalidHexEscape,
    InvalidUnicodeEscape,
    InvalidIdentifierEscape,
    MalformedNumericLiteral,
    MissingDigits(u32),
    InvalidNumericLiteralNextChar,
    BigIntLeadingZero,
    BigIntNotInteger,
    TrailingNumericSeparator,
    AdjacentNumericSeparators,
    NumericSeparatorAfterLeadingZero,
    LegacyOctalLiteralInStrictMode,
    LegacyOctalEscapeSequenceInStrictMode,
    LegacyNonOctalEscapeSequenceInStrictMode,
    OctalEscapeInTemplate,
    HashNotFollowedByIdentifier,
    InvalidRegExpFlag(char),
    DuplicateRegExpFlag(char),
    // Syntactic errors
    UnexpectedToken(Token),
    ExpectedToken(Token, Token),
    RestTrailingComma,
    RestElementNotLast,
    RestWithInitializer,
    ThrowArgumentOnNewLine,
    ArrowOnNewLine,
    AmbiguousLetBracket,
    InvalidAssignmentLeftHandSide,
    InvalidForLeftHandSide,
    InvalidUpdateExpressionArgument,
    InvalidArrowParameters,
    IdentifierIsReservedWord(String),
    EscapedKeyword,
    ExpectedNewTarget,
    ExpectedImportMeta,
    ImportMetaOutsideModule,
    ImportCallArguments,
    ForEachInitInvalidVarDecl,
    InvalidForAwait,
    ForOfLet,
    ForOfAsync,
    DeclarationInStatementPosition,
    MultipleDefaultCases,
    NullishCoalesceMixedWithLogical,
    ExponentLHSUnary,
    TaggedTemplateInChain,
    OptionalChainFromNew,
    // Scoping and binding errors
    NameRedeclaration(String, NameKind),
    InvalidDuplicateParameters(InvalidDuplicateParametersReason),
    StrictModeRestrictedBinding(String),
    ConstWithoutInitializer,
    DestructuringWithoutInitializer,
    LetNameInLexicalDeclaration,
    DuplicateLabel(String),
    LabelNotFound(String),
    ContinueTargetNotIteration(String),
    ReturnOutsideFunction,
    ContinueOutsideIterable,
    UnlabeledBreakOutsideBreakable,
    // Strict mode errors
    WithInStrictMode,
    DeleteIdentifierInStrictMode,
    AssignEvalInStrictMode,
    AssignArgumentsInStrictMode,
    UseStrictFunctionNonSimpleParameterList,
    InvalidLabeledFunction(bool),
    // Function errors
    YieldInParameters,
    AwaitInParameters,
    YieldOrAwaitInArrowParameters,
    GetterWrongNumberOfParams,
    SetterWrongNumberOfParams,
    SetterRestParameter,
    // Class errors
    MultipleConstructors,
    NonSimpleConstructor,
    ClassStaticPrototype,
    ConstructorClassField,
    DuplicatePrivateName(String),
    PrivateNameOutsideClass,
    PrivateNameNotDefined(String),
    PrivateNameConstructor,
    DeletePrivateName,
    NewTargetOutsideFunction,
    SuperPropertyOutsideMethod,
    SuperCallOutsideDerivedConstructor,
    ArgumentsInClassInitializer,
    AwaitInStaticBlock,
    // Object literal errors
    InvalidPatternInitializer,
    DuplicateProtoProperty,
    // Module errors
    ModuleItemOutsideModule,
    ModuleItemNotTopLevel,
    DuplicateExport(String),
    ExportedNameNotDeclared(String),
    InvalidExportLocalName,
    DuplicateImportAttribute(String),
    // JSX errors
    UnterminatedJsxContents,
    MismatchedJsxClosingTag(String),
    // Resource limits
    TooMuchRecursion,
}

#[derive(Debug)]
pub enum InvalidDuplicateParametersReason {
    StrictMode,
    ArrowFunction,
    Method,
    NonSimpleParameters,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Io(io_error) => {
                f.write_str("Error: ")?;
                io_error.fmt(f)
            }
            ParseError::UnknownToken(token) => write!(f, "Unknown token {}", token),
            ParseError::InvalidUnicode => write!(f, "Invalid utf-8 sequence"),
            ParseError::UnterminatedStringLiteral => write!(f, "Unterminated string literal"),
            ParseError::UnterminatedTemplateLiteral => write!(f, "Unterminated template literal"),
            ParseError::UnterminatedBlockComment => write!(f, "Unterminated block comment"),
            ParseError::UnterminatedRegExpLiteral => {
                write!(f, "Unterminated regular expression literal")
            }
            ParseError::MalformedEscapeSequence => write!(f, "Malformed escape sequence"),
            ParseError::InvalidHexEscape => write!(f, "Invalid hexadecimal escape sequence"),
            ParseError::InvalidUnicodeEscape => write!(f, "Invalid Unicode escape sequence"),
            ParseError::InvalidIdentifierEscape => {
                write!(f, "Invalid Unicode escape sequence in identifier")
            }
            ParseError::MalformedNumericLiteral => write!(f, "Malformed numeric literal"),
            ParseError::MissingDigits(base) => {
                write!(f, "Expected at least one digit in base {} literal", base)
            }
            ParseError::InvalidNumericLiteralNextChar => {
                write!(f, "Identifier or digit starts immediately after numeric literal")
            }
            ParseError::BigIntLeadingZero => write!(f, "BigInt cannot have a leading zero"),
            ParseError::BigIntNotInteger => {
                write!(f, "BigInt literals cannot have a decimal point or exponent")
            }
            ParseError::TrailingNumericSeparator => write!(
                f,
                "Underscore can appear only between digits, not after the last digit in a number"
            ),
            ParseError::AdjacentNumericSeparators => {
                write!(f, "Number cannot contain multiple adjacent underscores")
            }
            ParseError::NumericSeparatorAfterLeadingZero => {
                write!(f, "Numeric separator can not be used after leading 0")
            }
            ParseError::LegacyOctalLiteralInStrictMode => {
                write!(f, "Octal literals are not allowed in strict mode")
            }
            ParseError::LegacyOctalEscapeSequenceInStrictMode => {
                write!(f, "Octal escape sequences are not allowed in strict mode")
            }
            ParseError::LegacyNonOctalEscapeSequenceInStrictMode => {
                write!(f, "\\8 and \\9 are not allowed in strict mode")
            }
            ParseError::OctalEscapeInTemplate => {
                write!(f, "Octal escape sequences are not allowed in template strings")
            }
            ParseError::HashNotFollowedByIdentifier => {
                write!(f, "Expected identifier directly after '#'")
            }
            ParseError::InvalidRegExpFlag(flag) => {
                write!(f, "Invalid regular expression flag '{}'", flag)
            }
            ParseError::DuplicateRegExpFlag(flag) => {
                write!(f, "Duplicate regular expression flag '{}'", flag)
            }
            ParseError::UnexpectedToken(token) => write!(f, "Unexpected token {}", token),
            ParseError::ExpectedToken(actual, expected) => {
                write!(f, "Unexpected token {}, expected {}", actual, expected)
            }
            ParseError::RestTrailingComma => {
                write!(f, "Rest element may not have a trailing comma")
            }
            ParseError::RestElementNotLast => write!(f, "Rest element must be last element"),
            ParseError::RestWithInitializer => {
                write!(f, "Rest elements cannot have a default initializer")
            }
            ParseError::ThrowArgumentOnNewLine => {
                write!(f, "No line break is allowed between 'throw' and its expression")
            }
            ParseError::ArrowOnNewLine => {
                write!(f, "No line break is allowed between arrow arguments and '=>'")
            }
            ParseError::AmbiguousLetBracket => {
                write!(f, "Expression cannot start with ambiguous `let [`")
            }
            ParseError::InvalidAssignmentLeftHandSide => {
                write!(f, "Invalid left hand side of assignment")
            }
            ParseError::InvalidForLeftHandSide => {
                write!(f, "Invalid left hand side of for statement")
            }
            ParseError::InvalidUpdateExpressionArgument => {
                write!(f, "Invalid increment/decrement operand")
            }
            ParseError::InvalidArrowParameters => write!(f, "Invalid arrow function parameters"),
            ParseError::IdentifierIsReservedWord(name) => {
                write!(f, "'{}' is a reserved word", name)
            }
            ParseError::EscapedKeyword => {
                write!(f, "Keywords cannot contain escape characters")
            }
            ParseError::ExpectedNewTarget => write!(f, "Expected new.target"),
            ParseError::ExpectedImportMeta => write!(f, "Expected import.meta"),
            ParseError::ImportMetaOutsideModule => {
                write!(f, "import.meta may only appear in a module")
            }
            ParseError::ImportCallArguments => {
                write!(f, "Dynamic import requires one argument, or two with import attributes")
            }
            ParseError::ForEachInitInvalidVarDecl => {
                write!(f, "Variable declarations in the left hand side of a for each loop must contain a single declaration with no initializer")
            }
            ParseError::InvalidForAwait => write!(f, "for await must be a for-of loop"),
            ParseError::ForOfLet => {
                write!(f, "The left hand side of a for-of loop may not be 'let'")
            }
            ParseError::ForOfAsync => {
                write!(f, "The left hand side of a for-of loop may not be 'async'")
            }
            ParseError::DeclarationInStatementPosition => {
                write!(f, "Declarations are not allowed in a single-statement context")
            }
            ParseError::MultipleDefaultCases => {
                write!(f, "Switch statement can only have a single default case")
            }
            ParseError::NullishCoalesceMixedWithLogical => {
                write!(f, "Nullish coalescing operator cannot be mixed with && or || without parentheses")
            }
            ParseError::ExponentLHSUnary => {
                write!(f, "Unparenthesized unary expression cannot appear on the left hand side of '**'")
            }
            ParseError::TaggedTemplateInChain => {
                write!(f, "Tagged template cannot be used in optional chain")
            }
            ParseError::OptionalChainFromNew => {
                write!(f, "Invalid optional chain from new expression")
            }
            ParseError::NameRedeclaration(name, kind) => {
                write!(f, "Redeclaration of {} {}", kind, name)
            }
            ParseError::InvalidDuplicateParameters(reason) => {
                let reason_string = match reason {
                    InvalidDuplicateParametersReason::StrictMode => "strict mode functions",
                    InvalidDuplicateParametersReason::ArrowFunction => "arrow functions",
                    InvalidDuplicateParametersReason::Method => "methods",
                    InvalidDuplicateParametersReason::NonSimpleParameters => {
                        "functions with non-simple parameter lists"
                    }
                };
                write!(f, "Duplicate parameters not allowed in {}", reason_string)
            }
            ParseError::StrictModeRestrictedBinding(name) => {
                write!(f, "Cannot bind '{}' in strict mode code", name)
            }
            ParseError::ConstWithoutInitializer => {
                write!(f, "Const declarations must have an initializer")
            }
            ParseError::DestructuringWithoutInitializer => {
                write!(f, "Missing initializer in destructuring declaration")
            }
            ParseError::LetNameInLexicalDeclaration => {
                write!(f, "Lexical declarations can't define a 'let' binding")
            }
            ParseError::DuplicateLabel(label) => write!(f, "Duplicate label '{}'", label),
            ParseError::LabelNotFound(label) => write!(f, "Label '{}' not found", label),
            ParseError::ContinueTargetNotIteration(label) => {
                write!(f, "Label '{}' does not denote an iteration statement", label)
            }
            ParseError::ReturnOutsideFunction => write!(f, "Return must be inside function"),
            ParseError::ContinueOutsideIterable => write!(f, "Continue must be inside loop"),
            ParseError::UnlabeledBreakOutsideBreakable => {
                write!(f, "Unlabeled break must be inside loop or switch")
            }
            ParseError::WithInStrictMode => {
                write!(f, "Strict mode code may not contain 'with' statements")
            }
            ParseError::DeleteIdentifierInStrictMode => {
                write!(f, "Cannot delete variables in strict mode code")
            }
            ParseError::AssignEvalInStrictMode => {
                write!(f, "Cannot assign to 'eval' in strict mode code")
            }
            ParseError::AssignArgumentsInStrictMode => {
                write!(f, "Cannot assign to 'arguments' in strict mode code")
            }
            ParseError::UseStrictFunctionNonSimpleParameterList => {
                write!(f, "'use strict' only allowed in functions with simple parameter lists")
            }
            ParseError::InvalidLabeledFunction(true) => {
                write!(f, "Functions cannot be labeled in strict mode code")
            }
            ParseError::InvalidLabeledFunction(false) => {
                write!(f, "Async and generator functions cannot be labeled")
            }
            ParseError::YieldInParameters => {
                write!(f, "Yield expressions are not allowed in formal parameters")
            }
            ParseError::AwaitInParameters => {
                write!(f, "Await expressions are not allowed in formal parameters")
            }
            ParseError::YieldOrAwaitInArrowParameters => {
                write!(f, "Arrow parameters cannot contain yield or await expressions")
            }
            ParseError::GetterWrongNumberOfParams => {
                write!(f, "Getter functions must have no parameters")
            }
            ParseError::SetterWrongNumberOfParams => {
                write!(f, "Setter functions must have exactly one parameter")
            }
            ParseError::SetterRestParameter => {
                write!(f, "Setter function parameter must not be a rest parameter")
            }
            ParseError::MultipleConstructors => {
                write!(f, "Class can only have a single constructor")
            }
            ParseError::NonSimpleConstructor => write!(f, "Constructors must be simple methods"),
            ParseError::ClassStaticPrototype => {
                write!(f, "Classes cannot have a static prototype field or method")
            }
            ParseError::ConstructorClassField => {
                write!(f, "Classes cannot have a field named 'constructor'")
            }
            ParseError::DuplicatePrivateName(name) => {
                write!(f, "Redeclaration of private name #{}", name)
            }
            ParseError::PrivateNameOutsideClass => write!(f, "Private name outside class"),
            ParseError::PrivateNameNotDefined(name) => {
                write!(f, "Reference to undeclared private name #{}", name)
            }
            ParseError::PrivateNameConstructor => {
                write!(f, "Private name not allowed to be #constructor")
            }
            ParseError::DeletePrivateName => write!(f, "Private fields can not be deleted"),
            ParseError::NewTargetOutsideFunction => {
                write!(f, "new.target only allowed in functions")
            }
            ParseError::SuperPropertyOutsideMethod => {
                write!(f, "Super property accesses only allowed in methods")
            }
            ParseError::SuperCallOutsideDerivedConstructor => {
                write!(f, "Super calls only allowed in derived constructors")
            }
            ParseError::ArgumentsInClassInitializer => {
                write!(f, "'arguments' is not allowed in class field initializers or static blocks")
            }
            ParseError::AwaitInStaticBlock => {
                write!(f, "'await' is not allowed in class static blocks")
            }
            ParseError::InvalidPatternInitializer => {
                write!(f, "Object property initializers do not use `=`")
            }
            ParseError::DuplicateProtoProperty => {
                write!(f, "Duplicate __proto__ properties are not allowed in object literals")
            }
            ParseError::ModuleItemOutsideModule => {
                write!(f, "'import' and 'export' may only appear in a module")
            }
            ParseError::ModuleItemNotTopLevel => {
                write!(f, "'import' and 'export' may only appear at the top level")
            }
            ParseError::DuplicateExport(name) => write!(f, "Duplicate export of '{}'", name),
            ParseError::ExportedNameNotDeclared(name) => {
                write!(f, "Export '{}' is not defined in module", name)
            }
            ParseError::InvalidExportLocalName => {
                write!(f, "Local name of an export must be an identifier")
            }
            ParseError::DuplicateImportAttribute(key) => {
                write!(f, "Duplicate import attribute '{}'", key)
            }
            ParseError::UnterminatedJsxContents => write!(f, "Unterminated JSX contents"),
            ParseError::MismatchedJsxClosingTag(name) => {
                write!(f, "Expected corresponding JSX closing tag for <{}>", name)
            }
            ParseError::TooMuchRecursion => write!(f, "Maximum nesting depth exceeded"),
        }
    }
}

pub struct LocalizedParseError {
    pub error: ParseError,
    pub source_loc: Option<(Loc, Rc<Source>)>,
}

impl LocalizedParseError {
    fn new_without_loc(error: ParseError) -> LocalizedParseError {
        LocalizedParseError { error, source_loc: None }
    }

    /// Byte offset of the start of the offending token.
    pub fn index(&self) -> Option<usize> {
        self.source_loc.as_ref().map(|(loc, _)| loc.start)
    }

    /// 1-indexed line of the offending token.
    pub fn line(&self) -> Option<usize> {
        self.line_col().map(|(line, _)| line)
    }

    /// 0-indexed column of the offending token.
    pub fn column(&self) -> Option<usize> {
        self.line_col().map(|(_, col)| col)
    }

    pub fn description(&self) -> String {
        self.error.to_string()
    }

    fn line_col(&self) -> Option<(usize, usize)> {
        self.source_loc
            .as_ref()
            .map(|(loc, source)| source.line_col_for_pos(loc.start))
    }
}

impl Error for LocalizedParseError {}

impl fmt::Display for LocalizedParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source_loc {
            None => write!(f, "SyntaxError: {}", self.error),
            Some((loc, source)) => {
                let (line, col) = source.line_col_for_pos(loc.start);
                write!(f, "SyntaxError: {}:{}:{} {}", source.file_path, line, col, self.error)
            }
        }
    }
}

impl fmt::Debug for LocalizedParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        <LocalizedParseError as fmt::Display>::fmt(self, f)
    }
}

impl From<io::Error> for LocalizedParseError {
    fn from(error: io::Error) -> LocalizedParseError {
        LocalizedParseError::new_without_loc(ParseError::Io(error))
    }
}

pub type ParseResult<T> = Result<T, LocalizedParseError>;
