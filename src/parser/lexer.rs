use std::rc::Rc;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use super::loc::{Loc, Pos};
use super::parse_error::{LocalizedParseError, ParseError, ParseResult};
use super::source::Source;
use super::token::{id_to_keyword, Token, TokenFlags};
use super::unicode::{
    get_binary_value, get_decimal_value, get_hex_value, get_octal_value, is_ascii_newline,
    is_ascii_whitespace, is_decimal_digit, is_id_part, is_id_part_ascii, is_id_start,
    is_id_start_ascii, is_newline, is_unicode_newline, is_unicode_whitespace,
};

pub struct Lexer<'a> {
    pub source: &'a Rc<Source>,
    buf: &'a str,
    current: char,
    pos: Pos,
    /// Flags for the token currently being scanned
    flags: TokenFlags,
    /// Whether any token has been scanned yet, so `-->` comments can appear at the start of input
    has_scanned_token: bool,
    /// HTML-like comments are only recognized outside of modules
    is_module: bool,
    collect_comments: bool,
    comments: Vec<Comment>,
}

/// A save point for the lexer, can be used to restore the lexer to a particular position.
pub struct SavedLexerState {
    current: char,
    pos: Pos,
    flags: TokenFlags,
    has_scanned_token: bool,
    num_comments: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

#[derive(Clone, Debug)]
pub struct Comment {
    pub kind: CommentKind,
    pub value: String,
    pub loc: Loc,
}

type LexResult = ParseResult<(Token, Loc)>;

/// An invalid escape sequence. Fatal in string literals, but only invalidates the cooked value of
/// a template literal.
struct EscapeError {
    loc: Loc,
    error: ParseError,
}

type EscapeResult<T> = Result<T, EscapeError>;

/// Character that marks an EOF. Not a valid unicode character.
const EOF_CHAR: char = '\u{ffff}';

impl<'a> Lexer<'a> {
    pub fn new(source: &'a Rc<Source>, is_module: bool, collect_comments: bool) -> Lexer<'a> {
        let mut lexer = Lexer {
            source,
            buf: &source.contents,
            current: EOF_CHAR,
            pos: 0,
            flags: TokenFlags::empty(),
            has_scanned_token: false,
            is_module,
            collect_comments,
            comments: vec![],
        };

        lexer.current = lexer.char_at(0);
        lexer
    }

    pub fn save(&self) -> SavedLexerState {
        SavedLexerState {
            current: self.current,
            pos: self.pos,
            flags: self.flags,
            has_scanned_token: self.has_scanned_token,
            num_comments: self.comments.len(),
        }
    }

    pub fn restore(&mut self, save_state: &SavedLexerState) {
        self.current = save_state.current;
        self.pos = save_state.pos;
        self.flags = save_state.flags;
        self.has_scanned_token = save_state.has_scanned_token;
        self.comments.truncate(save_state.num_comments);
    }

    /// Flags describing the most recently scanned token.
    pub fn flags(&self) -> TokenFlags {
        self.flags
    }

    pub fn take_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.comments)
    }

    #[inline]
    fn char_at(&self, pos: Pos) -> char {
        match self.buf.as_bytes().get(pos) {
            None => EOF_CHAR,
            Some(byte) if byte.is_ascii() => *byte as char,
            Some(_) => self.buf[pos..].chars().next().unwrap_or(EOF_CHAR),
        }
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Advance past the current character.
    #[inline]
    fn advance(&mut self) {
        if !self.is_eof() {
            self.pos += self.current.len_utf8();
        }
        self.current = self.char_at(self.pos);
    }

    /// Advance past n ASCII characters.
    #[inline]
    fn advance_n(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
        self.current = self.char_at(self.pos);
    }

    fn advance2(&mut self) {
        self.advance_n(2);
    }

    fn advance3(&mut self) {
        self.advance_n(3);
    }

    fn advance4(&mut self) {
        self.advance_n(4);
    }

    /// Peek at the nth byte after the current character. Only meaningful for ASCII lookahead.
    #[inline]
    fn peek_n(&self, n: usize) -> char {
        let next_pos = self.pos + self.current.len_utf8() + n - 1;
        match self.buf.as_bytes().get(next_pos) {
            Some(byte) if byte.is_ascii() => *byte as char,
            Some(_) => self.char_at(next_pos),
            None => EOF_CHAR,
        }
    }

    fn peek(&self) -> char {
        self.peek_n(1)
    }

    fn peek2(&self) -> char {
        self.peek_n(2)
    }

    fn peek3(&self) -> char {
        self.peek_n(3)
    }

    fn mark_loc(&self, start_pos: Pos) -> Loc {
        Loc { start: start_pos, end: self.pos }
    }

    fn emit(&mut self, token: Token, start_pos: Pos) -> LexResult {
        self.has_scanned_token = true;
        Ok((token, self.mark_loc(start_pos)))
    }

    fn error<T>(&self, loc: Loc, error: ParseError) -> ParseResult<T> {
        let source = (*self.source).clone();
        Err(LocalizedParseError { error, source_loc: Some((loc, source)) })
    }

    fn escape_error<T>(&self, start_pos: Pos, error: ParseError) -> EscapeResult<T> {
        Err(EscapeError { loc: self.mark_loc(start_pos), error })
    }

    fn push_comment(&mut self, kind: CommentKind, value_start: Pos, value_end: Pos, start: Pos) {
        if self.collect_comments {
            let value = self.buf[value_start..value_end].to_owned();
            let loc = self.mark_loc(start);
            self.comments.push(Comment { kind, value, loc });
        }
    }

    pub fn next(&mut self) -> LexResult {
        self.flags = TokenFlags::empty();

        loop {
            // Fast pass for skipping ASCII whitespace and newlines
            loop {
                if is_ascii_whitespace(self.current) {
                    self.advance();
                } else if is_ascii_newline(self.current) {
                    self.flags |= TokenFlags::NEW_LINE_BEFORE;
                    self.advance();
                } else {
                    break;
                }
            }

            let start_pos = self.pos;

            return match self.current {
                '+' => match self.peek() {
                    '+' => {
                        self.advance2();
                        self.emit(Token::Increment, start_pos)
                    }
                    '=' => {
                        self.advance2();
                        self.emit(Token::AddEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Plus, start_pos)
                    }
                },
                '-' => match self.peek() {
                    // HTML close comment is only allowed at the start of a line
                    '-' if self.peek2() == '>'
                        && !self.is_module
                        && (self.flags.contains(TokenFlags::NEW_LINE_BEFORE)
                            || !self.has_scanned_token) =>
                    {
                        self.advance3();
                        self.skip_line_comment(start_pos, start_pos + 3);
                        continue;
                    }
                    '-' => {
                        self.advance2();
                        self.emit(Token::Decrement, start_pos)
                    }
                    '=' => {
                        self.advance2();
                        self.emit(Token::SubtractEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Minus, start_pos)
                    }
                },
                '*' => match self.peek() {
                    '*' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::ExponentEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::Exponent, start_pos)
                        }
                    },
                    '=' => {
                        self.advance2();
                        self.emit(Token::MultiplyEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Multiply, start_pos)
                    }
                },
                '/' => match self.peek() {
                    '/' => {
                        self.advance2();
                        self.skip_line_comment(start_pos, start_pos + 2);
                        continue;
                    }
                    '*' => {
                        self.advance2();
                        self.skip_block_comment(start_pos)?;
                        continue;
                    }
                    '=' => {
                        self.advance2();
                        self.emit(Token::DivideEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Divide, start_pos)
                    }
                },
                '%' => match self.peek() {
                    '=' => {
                        self.advance2();
                        self.emit(Token::RemainderEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Remainder, start_pos)
                    }
                },
                '&' => match self.peek() {
                    '&' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::LogicalAndEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::LogicalAnd, start_pos)
                        }
                    },
                    '=' => {
                        self.advance2();
                        self.emit(Token::AndEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::BitwiseAnd, start_pos)
                    }
                },
                '|' => match self.peek() {
                    '|' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::LogicalOrEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::LogicalOr, start_pos)
                        }
                    },
                    '=' => {
                        self.advance2();
                        self.emit(Token::OrEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::BitwiseOr, start_pos)
                    }
                },
                '?' => match self.peek() {
                    '?' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::NullishCoalesceEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::NullishCoalesce, start_pos)
                        }
                    },
                    // ?.d is parsed as a question mark followed by a decimal literal
                    '.' if !is_decimal_digit(self.peek2()) => {
                        self.advance2();
                        self.emit(Token::QuestionDot, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Question, start_pos)
                    }
                },
                '^' => match self.peek() {
                    '=' => {
                        self.advance2();
                        self.emit(Token::XorEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::BitwiseXor, start_pos)
                    }
                },
                '<' => match self.peek() {
                    '<' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::ShiftLeftEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::ShiftLeft, start_pos)
                        }
                    },
                    '=' => {
                        self.advance2();
                        self.emit(Token::LessThanOrEqual, start_pos)
                    }
                    // HTML open comment
                    '!' if self.peek2() == '-' && self.peek3() == '-' && !self.is_module => {
                        self.advance4();
                        self.skip_line_comment(start_pos, start_pos + 4);
                        continue;
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::LessThan, start_pos)
                    }
                },
                '>' => match self.peek() {
                    '>' => match self.peek2() {
                        '>' => match self.peek3() {
                            '=' => {
                                self.advance4();
                                self.emit(Token::ShiftRightLogicalEq, start_pos)
                            }
                            _ => {
                                self.advance3();
                                self.emit(Token::ShiftRightLogical, start_pos)
                            }
                        },
                        '=' => {
                            self.advance3();
                            self.emit(Token::ShiftRightArithmeticEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::ShiftRightArithmetic, start_pos)
                        }
                    },
                    '=' => {
                        self.advance2();
                        self.emit(Token::GreaterThanOrEqual, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::GreaterThan, start_pos)
                    }
                },
                '=' => match self.peek() {
                    '=' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::EqEqEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::EqEq, start_pos)
                        }
                    },
                    '>' => {
                        self.advance2();
                        self.emit(Token::Arrow, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Equals, start_pos)
                    }
                },
                '!' => match self.peek() {
                    '=' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::NotEqEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::NotEq, start_pos)
                        }
                    },
                    _ => {
                        self.advance();
                        self.emit(Token::LogicalNot, start_pos)
                    }
                },
                '~' => {
                    self.advance();
                    self.emit(Token::BitwiseNot, start_pos)
                }
                '(' => {
                    self.advance();
                    self.emit(Token::LeftParen, start_pos)
                }
                ')' => {
                    self.advance();
                    self.emit(Token::RightParen, start_pos)
                }
                '{' => {
                    self.advance();
                    self.emit(Token::LeftBrace, start_pos)
                }
                '}' => {
                    self.advance();
                    self.emit(Token::RightBrace, start_pos)
                }
                '[' => {
                    self.advance();
                    self.emit(Token::LeftBracket, start_pos)
                }
                ']' => {
                    self.advance();
                    self.emit(Token::RightBracket, start_pos)
                }
                ';' => {
                    self.advance();
                    self.emit(Token::Semicolon, start_pos)
                }
                ',' => {
                    self.advance();
                    self.emit(Token::Comma, start_pos)
                }
                ':' => {
                    self.advance();
                    self.emit(Token::Colon, start_pos)
                }
                '.' => match self.peek() {
                    '.' if self.peek2() == '.' => {
                        self.advance3();
                        self.emit(Token::Spread, start_pos)
                    }
                    '0'..='9' => self.lex_decimal_literal(start_pos),
                    _ => {
                        self.advance();
                        self.emit(Token::Period, start_pos)
                    }
                },
                '0' => match self.peek() {
                    'x' | 'X' => self.lex_literal_with_base(start_pos, 16, get_hex_value),
                    'o' | 'O' => self.lex_literal_with_base(start_pos, 8, get_octal_value),
                    'b' | 'B' => self.lex_literal_with_base(start_pos, 2, get_binary_value),
                    '0'..='9' => self.lex_legacy_octal_literal(start_pos),
                    '_' => {
                        let loc = Loc { start: self.pos + 1, end: self.pos + 2 };
                        self.error(loc, ParseError::NumericSeparatorAfterLeadingZero)
                    }
                    _ => self.lex_decimal_literal(start_pos),
                },
                '1'..='9' => self.lex_decimal_literal(start_pos),
                '"' | '\'' => self.lex_string_literal(start_pos),
                '`' => {
                    self.advance();
                    self.lex_template_literal(start_pos, true)
                }
                // Hashbang comments are only allowed at the very start of the input
                '#' if self.pos == 0 && self.peek() == '!' => {
                    self.advance2();
                    self.skip_line_comment(start_pos, start_pos + 2);
                    continue;
                }
                '#' => {
                    self.advance();
                    if !is_id_start(self.current) && self.current != '\\' {
                        let loc = self.mark_loc(start_pos);
                        return self.error(loc, ParseError::HashNotFollowedByIdentifier);
                    }

                    let name = self.lex_identifier_name(self.pos)?;
                    self.emit(Token::PrivateName(name), start_pos)
                }
                '\\' => self.lex_identifier(start_pos),
                EOF_CHAR if self.is_eof() => Ok((Token::Eof, self.mark_loc(start_pos))),
                other if is_id_start_ascii(other) => self.lex_identifier(start_pos),
                other if other.is_ascii() => {
                    self.advance();
                    let loc = self.mark_loc(start_pos);
                    self.error(loc, ParseError::UnknownToken(other.to_string()))
                }
                other => {
                    if is_unicode_whitespace(other) {
                        self.advance();
                        continue;
                    } else if is_unicode_newline(other) {
                        self.flags |= TokenFlags::NEW_LINE_BEFORE;
                        self.advance();
                        continue;
                    } else if is_id_start(other) {
                        self.lex_identifier(start_pos)
                    } else {
                        self.advance();
                        let loc = self.mark_loc(start_pos);
                        self.error(loc, ParseError::UnknownToken(other.to_string()))
                    }
                }
            };
        }
    }

    /// Skip the rest of a line comment. The comment's text starts at `value_start`.
    fn skip_line_comment(&mut self, start_pos: Pos, value_start: Pos) {
        while !self.is_eof() && !is_newline(self.current) {
            self.advance();
        }

        self.push_comment(CommentKind::Line, value_start, self.pos, start_pos);
    }

    fn skip_block_comment(&mut self, start_pos: Pos) -> ParseResult<()> {
        loop {
            match self.current {
                '*' if self.peek() == '/' => {
                    self.advance2();
                    break;
                }
                EOF_CHAR if self.is_eof() => {
                    let loc = self.mark_loc(self.pos);
                    return self.error(loc, ParseError::UnterminatedBlockComment);
                }
                other => {
                    if is_newline(other) {
                        self.flags |= TokenFlags::NEW_LINE_BEFORE;
                    }
                    self.advance();
                }
            }
        }

        self.push_comment(CommentKind::Block, start_pos + 2, self.pos - 2, start_pos);

        Ok(())
    }

    /// Skip a series of decimal digits, possibly separated by numeric separators. Numeric separators
    /// must be adjacent to a numeric digit on both sides.
    ///
    /// Return whether any numeric separator was encountered.
    fn skip_decimal_digits(&mut self, allow_numeric_separator: bool) -> ParseResult<bool> {
        // First digit must be a decimal digit
        if !is_decimal_digit(self.current) {
            return Ok(false);
        }

        self.advance();

        // Middle digits may be decimal numbers or numeric separators
        let mut has_numeric_separator = false;
        let mut is_last_char_numeric_separator = false;

        loop {
            is_last_char_numeric_separator = if is_decimal_digit(self.current) {
                false
            } else if self.current == '_' && allow_numeric_separator {
                if is_last_char_numeric_separator {
                    let loc = self.mark_loc(self.pos);
                    return self.error(loc, ParseError::AdjacentNumericSeparators);
                }

                has_numeric_separator = true;

                true
            } else {
                break;
            };

            self.advance()
        }

        // Last digit cannot be a separator
        if is_last_char_numeric_separator {
            let loc = Loc { start: self.pos - 1, end: self.pos };
            return self.error(loc, ParseError::TrailingNumericSeparator);
        }

        Ok(has_numeric_separator)
    }

    fn lex_decimal_literal(&mut self, start_pos: Pos) -> LexResult {
        let has_leading_zero = self.current == '0';
        let allow_numeric_separator = !has_leading_zero;

        // Read optional digits before the decimal point
        let mut has_numeric_separator = self.skip_decimal_digits(allow_numeric_separator)?;

        // This is a bigint literal
        if self.current == 'n' {
            // BigInts do not allow a leading zeros
            if has_leading_zero && self.pos - start_pos > 1 {
                let loc = self.mark_loc(start_pos);
                return self.error(loc, ParseError::BigIntLeadingZero);
            }

            let digits = self.buf[start_pos..self.pos].replace('_', "");
            self.advance();

            let value = match BigInt::parse_bytes(digits.as_bytes(), 10) {
                Some(value) => value,
                None => {
                    let loc = self.mark_loc(start_pos);
                    return self.error(loc, ParseError::MalformedNumericLiteral);
                }
            };

            self.error_if_cannot_follow_numeric_literal()?;
            return self.emit(Token::BigIntLiteral(value), start_pos);
        }

        // Read optional decimal point with its optional following digits
        if self.current == '.' {
            self.advance();
            has_numeric_separator |= self.skip_decimal_digits(true)?;
        }

        // Read optional exponent
        if self.current == 'e' || self.current == 'E' {
            self.advance();

            // Exponent has optional sign
            if self.current == '-' || self.current == '+' {
                self.advance();
            }

            if !is_decimal_digit(self.current) {
                let loc = self.mark_loc(start_pos);
                return self.error(loc, ParseError::MalformedNumericLiteral);
            }

            has_numeric_separator |= self.skip_decimal_digits(true)?;
        }

        if self.current == 'n' {
            let loc = Loc { start: self.pos, end: self.pos + 1 };
            return self.error(loc, ParseError::BigIntNotInteger);
        }

        self.error_if_cannot_follow_numeric_literal()?;

        // Rust stdlib cannot handle numeric separators, so strip them before parsing
        let text = &self.buf[start_pos..self.pos];
        let parsed = if has_numeric_separator {
            f64::from_str(&text.replace('_', ""))
        } else {
            f64::from_str(text)
        };

        match parsed {
            Ok(value) => self.emit(Token::NumberLiteral(value), start_pos),
            Err(_) => {
                let loc = self.mark_loc(start_pos);
                self.error(loc, ParseError::MalformedNumericLiteral)
            }
        }
    }

    fn lex_literal_with_base(
        &mut self,
        start_pos: Pos,
        base: u32,
        char_to_digit: fn(char) -> Option<u32>,
    ) -> LexResult {
        self.advance2();

        // First digit must be a digit in the base
        if char_to_digit(self.current).is_none() {
            let loc = self.mark_loc(start_pos);
            return self.error(loc, ParseError::MissingDigits(base));
        }

        let mut digits = String::new();

        // Middle digits may be digits or numeric separators
        let mut is_last_char_numeric_separator = false;
        loop {
            is_last_char_numeric_separator = if char_to_digit(self.current).is_some() {
                digits.push(self.current);
                false
            } else if self.current == '_' {
                if is_last_char_numeric_separator {
                    let loc = self.mark_loc(self.pos);
                    return self.error(loc, ParseError::AdjacentNumericSeparators);
                }

                true
            } else {
                break;
            };

            self.advance()
        }

        // Last digit cannot be a separator
        if is_last_char_numeric_separator {
            let loc = Loc { start: self.pos - 1, end: self.pos };
            return self.error(loc, ParseError::TrailingNumericSeparator);
        }

        let value = match BigInt::parse_bytes(digits.as_bytes(), base) {
            Some(value) => value,
            None => {
                let loc = self.mark_loc(start_pos);
                return self.error(loc, ParseError::MalformedNumericLiteral);
            }
        };

        if self.current == 'n' {
            self.advance();
            self.error_if_cannot_follow_numeric_literal()?;
            return self.emit(Token::BigIntLiteral(value), start_pos);
        }

        self.error_if_cannot_follow_numeric_literal()?;

        let value = value.to_f64().unwrap_or(f64::INFINITY);
        self.emit(Token::NumberLiteral(value), start_pos)
    }

    /// A leading zero followed by digits is either a legacy octal literal, or a decimal literal
    /// with a leading zero if any digit is 8 or 9. Both are illegal in strict mode, which the
    /// parser checks using the token flags.
    fn lex_legacy_octal_literal(&mut self, start_pos: Pos) -> LexResult {
        self.flags |= TokenFlags::LEGACY_OCTAL;

        // Skip the leading zero
        self.advance();

        let mut value: f64 = 0.0;
        while let Some(digit) = get_octal_value(self.current) {
            value = value * 8.0 + digit as f64;
            self.advance();
        }

        // Reparse as decimal literal if we encounter a non-octal digit
        if self.current == '8' || self.current == '9' {
            self.pos = start_pos;
            self.current = '0';
            return self.lex_decimal_literal(start_pos);
        }

        if self.current == '_' {
            let loc = Loc { start: self.pos, end: self.pos + 1 };
            return self.error(loc, ParseError::NumericSeparatorAfterLeadingZero);
        }

        self.error_if_cannot_follow_numeric_literal()?;
        self.emit(Token::NumberLiteral(value), start_pos)
    }

    fn error_if_cannot_follow_numeric_literal(&mut self) -> ParseResult<()> {
        if self.is_eof() {
            return Ok(());
        }

        if is_decimal_digit(self.current) || is_id_start(self.current) || self.current == '\\' {
            let loc = Loc { start: self.pos, end: self.pos + self.current.len_utf8() };
            self.error(loc, ParseError::InvalidNumericLiteralNextChar)
        } else {
            Ok(())
        }
    }

    fn lex_string_literal(&mut self, start_pos: Pos) -> LexResult {
        let quote_char = self.current;
        self.advance();

        let mut value = String::new();

        loop {
            match self.current {
                '\\' => {
                    if let Err(EscapeError { loc, error }) = self.lex_escape_sequence(&mut value, false)
                    {
                        return self.error(loc, error);
                    }
                }
                // Raw ASCII newlines are not allowed, but LS and PS are
                '\n' | '\r' => {
                    let loc = self.mark_loc(self.pos);
                    return self.error(loc, ParseError::UnterminatedStringLiteral);
                }
                EOF_CHAR if self.is_eof() => {
                    let loc = self.mark_loc(self.pos);
                    return self.error(loc, ParseError::UnterminatedStringLiteral);
                }
                char if char == quote_char => {
                    self.advance();
                    break;
                }
                char => {
                    value.push(char);
                    self.advance();
                }
            }
        }

        self.emit(Token::StringLiteral(value), start_pos)
    }

    /// Lex an escape sequence beginning at the current backslash, appending the cooked value to
    /// `value`. Legacy octal escapes are errors in templates but only flag the token in strings.
    fn lex_escape_sequence(&mut self, value: &mut String, is_template: bool) -> EscapeResult<()> {
        let start_pos = self.pos;
        self.advance();

        match self.current {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'b' => value.push('\x08'),
            'v' => value.push('\x0B'),
            'f' => value.push('\x0C'),
            // Null character escape
            '0' if !is_decimal_digit(self.peek()) => value.push('\x00'),
            '0'..='7' if is_template => {
                self.advance();
                return self.escape_error(start_pos, ParseError::OctalEscapeInTemplate);
            }
            '8' | '9' if is_template => {
                self.advance();
                return self.escape_error(start_pos, ParseError::OctalEscapeInTemplate);
            }
            // Legacy octal escape, up to three digits if the first digit is at most 3
            first_digit @ '0'..='7' => {
                self.flags |= TokenFlags::OCTAL_ESCAPE;

                let mut octal_value = first_digit as u32 - '0' as u32;
                let max_digits = if first_digit <= '3' { 3 } else { 2 };
                self.advance();

                for _ in 1..max_digits {
                    match get_octal_value(self.current) {
                        Some(digit) => {
                            octal_value = octal_value * 8 + digit;
                            self.advance();
                        }
                        None => break,
                    }
                }

                value.push(char::from_u32(octal_value).unwrap_or('\u{FFFD}'));
                return Ok(());
            }
            digit @ ('8' | '9') => {
                self.flags |= TokenFlags::NON_OCTAL_DECIMAL_ESCAPE;
                value.push(digit);
            }
            'x' => {
                self.advance();
                let mut code_point = 0;
                for _ in 0..2 {
                    match get_hex_value(self.current) {
                        Some(digit) => {
                            code_point = code_point * 16 + digit;
                            self.advance();
                        }
                        None => return self.escape_error(start_pos, ParseError::InvalidHexEscape),
                    }
                }

                value.push(char::from_u32(code_point).unwrap_or('\u{FFFD}'));
                return Ok(());
            }
            'u' => {
                let code_point = self.lex_unicode_escape_sequence(start_pos)?;

                // A high surrogate may be followed by an escaped low surrogate
                if (0xD800..=0xDBFF).contains(&code_point)
                    && self.current == '\\'
                    && self.peek() == 'u'
                {
                    let save_state = self.save();
                    self.advance();

                    match self.lex_unicode_escape_sequence(self.pos - 1) {
                        Ok(low @ 0xDC00..=0xDFFF) => {
                            let combined = 0x10000 + ((code_point - 0xD800) << 10) + (low - 0xDC00);
                            value.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                            return Ok(());
                        }
                        _ => self.restore(&save_state),
                    }
                }

                // Lone surrogates cannot be represented and are replaced
                value.push(char::from_u32(code_point).unwrap_or('\u{FFFD}'));
                return Ok(());
            }
            // Line continuations contribute nothing to the value
            '\r' => {
                self.advance();
                if self.current == '\n' {
                    self.advance();
                }
                return Ok(());
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            EOF_CHAR if self.is_eof() => {
                return self.escape_error(start_pos, ParseError::MalformedEscapeSequence)
            }
            other => value.push(other),
        }

        self.advance();
        Ok(())
    }

    /// Lex `\u` escape sequences of the form `\uXXXX` or `\u{X...}`, where the current character
    /// is the `u`. Return the escaped code point.
    fn lex_unicode_escape_sequence(&mut self, start_pos: Pos) -> EscapeResult<u32> {
        self.advance();

        if self.current == '{' {
            self.advance();

            let mut code_point: u32 = 0;
            let mut num_digits = 0;
            while let Some(digit) = get_hex_value(self.current) {
                code_point = code_point * 16 + digit;
                num_digits += 1;
                self.advance();

                if code_point > 0x10FFFF {
                    return self.escape_error(start_pos, ParseError::InvalidUnicodeEscape);
                }
            }

            if num_digits == 0 || self.current != '}' {
                return self.escape_error(start_pos, ParseError::InvalidUnicodeEscape);
            }

            self.advance();

            Ok(code_point)
        } else {
            let mut code_point = 0;
            for _ in 0..4 {
                match get_hex_value(self.current) {
                    Some(digit) => {
                        code_point = code_point * 16 + digit;
                        self.advance();
                    }
                    None => return self.escape_error(start_pos, ParseError::InvalidUnicodeEscape),
                }
            }

            Ok(code_point)
        }
    }

    /// Lex a template part starting after the opening '`' or '}'. Raw text normalizes CR and CRLF
    /// to LF, and the cooked value is an error if any escape sequence is malformed.
    fn lex_template_literal(&mut self, start_pos: Pos, is_head: bool) -> LexResult {
        let raw_start = self.pos;
        let mut cooked = Ok(String::new());

        let (raw_end, is_tail) = loop {
            match self.current {
                '`' => {
                    let raw_end = self.pos;
                    self.advance();
                    break (raw_end, true);
                }
                '$' if self.peek() == '{' => {
                    let raw_end = self.pos;
                    self.advance2();
                    break (raw_end, false);
                }
                '\\' => {
                    let mut escaped = String::new();
                    let result = self.lex_escape_sequence(&mut escaped, true);

                    match (&mut cooked, result) {
                        (Ok(cooked), Ok(())) => cooked.push_str(&escaped),
                        (Ok(_), Err(EscapeError { loc, .. })) => cooked = Err(loc),
                        (Err(_), _) => {}
                    }
                }
                '\r' => {
                    self.advance();
                    if self.current == '\n' {
                        self.advance();
                    }

                    if let Ok(cooked) = &mut cooked {
                        cooked.push('\n');
                    }
                }
                EOF_CHAR if self.is_eof() => {
                    let loc = self.mark_loc(self.pos);
                    return self.error(loc, ParseError::UnterminatedTemplateLiteral);
                }
                char => {
                    if let Ok(cooked) = &mut cooked {
                        cooked.push(char);
                    }
                    self.advance();
                }
            }
        };

        let raw = self.buf[raw_start..raw_end]
            .replace("\r\n", "\n")
            .replace('\r', "\n");

        self.emit(Token::TemplatePart { raw, cooked, is_head, is_tail }, start_pos)
    }

    /// Continue a template literal after the `}` that closes a substitution. The `}` token starts
    /// at `start_pos`.
    pub fn next_template_part(&mut self, start_pos: Pos) -> LexResult {
        self.pos = start_pos + 1;
        self.current = self.char_at(self.pos);
        self.lex_template_literal(start_pos, false)
    }

    /// Rescan a regular expression literal whose opening `/` (possibly scanned as part of `/=`) is
    /// at `start_pos`.
    pub fn next_regexp_literal(&mut self, start_pos: Pos) -> LexResult {
        self.pos = start_pos + 1;
        self.current = self.char_at(self.pos);

        let mut in_class = false;

        loop {
            match self.current {
                '/' if !in_class => break,
                '[' => in_class = true,
                ']' => in_class = false,
                '\\' => {
                    self.advance();
                    if self.is_eof() || is_newline(self.current) {
                        let loc = self.mark_loc(self.pos);
                        return self.error(loc, ParseError::UnterminatedRegExpLiteral);
                    }
                }
                char if self.is_eof() || is_newline(char) => {
                    let loc = self.mark_loc(self.pos);
                    return self.error(loc, ParseError::UnterminatedRegExpLiteral);
                }
                _ => {}
            }

            self.advance();
        }

        let pattern = self.buf[(start_pos + 1)..self.pos].to_owned();
        self.advance();

        // Flags are a run of identifier parts, each known flag appearing at most once
        let flags_start = self.pos;
        while !self.is_eof() && (is_id_part(self.current) || self.current == '\\') {
            let flag = self.current;
            let flag_loc = Loc { start: self.pos, end: self.pos + flag.len_utf8() };

            if !matches!(flag, 'd' | 'g' | 'i' | 'm' | 's' | 'u' | 'v' | 'y') {
                return self.error(flag_loc, ParseError::InvalidRegExpFlag(flag));
            }

            if self.buf[flags_start..self.pos].contains(flag) {
                return self.error(flag_loc, ParseError::DuplicateRegExpFlag(flag));
            }

            self.advance();
        }

        let flags = self.buf[flags_start..self.pos].to_owned();
        let raw = self.buf[start_pos..self.pos].to_owned();

        self.emit(Token::RegExpLiteral { raw, pattern, flags }, start_pos)
    }

    fn lex_identifier(&mut self, start_pos: Pos) -> LexResult {
        let name = self.lex_identifier_name(start_pos)?;

        if self.flags.contains(TokenFlags::ESCAPED) {
            return self.emit(Token::Identifier(name), start_pos);
        }

        match id_to_keyword(&name) {
            Some(keyword) => self.emit(keyword, start_pos),
            None => self.emit(Token::Identifier(name), start_pos),
        }
    }

    /// Lex the characters of an identifier, decoding unicode escape sequences.
    fn lex_identifier_name(&mut self, start_pos: Pos) -> ParseResult<String> {
        // Fast path for identifiers made up entirely of ASCII characters
        let name_start = self.pos;
        while is_id_part_ascii(self.current) {
            self.advance();
        }

        if self.current != '\\' && (self.current.is_ascii() || self.is_eof()) {
            return Ok(self.buf[name_start..self.pos].to_owned());
        }

        let mut name = self.buf[name_start..self.pos].to_owned();

        loop {
            if self.current == '\\' {
                let escape_start = self.pos;
                self.flags |= TokenFlags::ESCAPED;
                self.advance();

                if self.current != 'u' {
                    let loc = self.mark_loc(escape_start);
                    return self.error(loc, ParseError::InvalidIdentifierEscape);
                }

                let code_point = match self.lex_unicode_escape_sequence(escape_start) {
                    Ok(code_point) => code_point,
                    Err(EscapeError { loc, error }) => return self.error(loc, error),
                };

                let is_first = name.is_empty();
                match char::from_u32(code_point) {
                    Some(char) if (is_first && is_id_start(char)) || (!is_first && is_id_part(char)) => {
                        name.push(char)
                    }
                    _ => {
                        let loc = self.mark_loc(escape_start);
                        return self.error(loc, ParseError::InvalidIdentifierEscape);
                    }
                }
            } else if !self.is_eof() && is_id_part(self.current) {
                name.push(self.current);
                self.advance();
            } else {
                break;
            }
        }

        if name.is_empty() {
            let loc = self.mark_loc(start_pos);
            return self.error(loc, ParseError::InvalidIdentifierEscape);
        }

        Ok(name)
    }

    /// Scan JSX text or the `<` or `{` that ends it, starting directly after the previous token.
    pub fn next_jsx_child(&mut self) -> LexResult {
        self.flags = TokenFlags::empty();
        let start_pos = self.pos;

        match self.current {
            '<' => {
                self.advance();
                self.emit(Token::LessThan, start_pos)
            }
            '{' => {
                self.advance();
                self.emit(Token::LeftBrace, start_pos)
            }
            EOF_CHAR if self.is_eof() => {
                let loc = self.mark_loc(start_pos);
                self.error(loc, ParseError::UnterminatedJsxContents)
            }
            _ => {
                while !self.is_eof() && self.current != '<' && self.current != '{' {
                    self.advance();
                }

                let text = decode_jsx_entities(&self.buf[start_pos..self.pos]);
                self.emit(Token::JsxText(text), start_pos)
            }
        }
    }

    /// Scan a JSX attribute value. Quoted attribute strings have no escape sequences and may span
    /// multiple lines.
    pub fn next_jsx_attribute_value(&mut self) -> LexResult {
        while is_ascii_whitespace(self.current) || is_newline(self.current) {
            self.advance();
        }

        let start_pos = self.pos;
        let quote_char = self.current;
        if quote_char != '"' && quote_char != '\'' {
            return self.next();
        }

        self.flags = TokenFlags::empty();
        self.advance();

        let value_start = self.pos;
        while self.current != quote_char {
            if self.is_eof() {
                let loc = self.mark_loc(self.pos);
                return self.error(loc, ParseError::UnterminatedStringLiteral);
            }
            self.advance();
        }

        let value = decode_jsx_entities(&self.buf[value_start..self.pos]);
        self.advance();

        self.emit(Token::StringLiteral(value), start_pos)
    }

    /// JSX names may contain dashes after the first character. Consume the rest of a JSX name
    /// directly following the identifier that was just scanned.
    pub fn extend_jsx_identifier(&mut self) -> (String, Pos) {
        let start_pos = self.pos;
        while self.current == '-' || (!self.is_eof() && is_id_part(self.current)) {
            self.advance();
        }

        (self.buf[start_pos..self.pos].to_owned(), self.pos)
    }

    /// Split a token beginning with `>` so that only the `>` is consumed, as JSX tags close with a
    /// single `>` that may be directly followed by text.
    pub fn rescan_greater_than(&mut self, start_pos: Pos) -> LexResult {
        self.pos = start_pos + 1;
        self.current = self.char_at(self.pos);
        self.emit(Token::GreaterThan, start_pos)
    }
}

/// Decode the HTML character references allowed in JSX text and attribute strings.
fn decode_jsx_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp_index) = rest.find('&') {
        result.push_str(&rest[..amp_index]);
        rest = &rest[amp_index..];

        let decoded = rest.find(';').and_then(|semi_index| {
            let entity = &rest[1..semi_index];
            let char = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{00A0}'),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.len() > 1 && entity.starts_with('#') => entity[1..]
                    .chars()
                    .try_fold(0u32, |acc, c| {
                        get_decimal_value(c).and_then(|d| acc.checked_mul(10)?.checked_add(d))
                    })
                    .and_then(char::from_u32),
                _ => None,
            };

            char.map(|char| (char, semi_index))
        });

        match decoded {
            Some((char, semi_index)) => {
                result.push(char);
                rest = &rest[(semi_index + 1)..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(contents: &str) -> ParseResult<Vec<Token>> {
        let source = Rc::new(Source::new_from_string("<test>", contents.to_owned()));
        let mut lexer = Lexer::new(&source, false, false);

        let mut tokens = vec![];
        loop {
            let (token, _) = lexer.next()?;
            if token == Token::Eof {
                return Ok(tokens);
            }
            tokens.push(token);
        }
    }

    fn lex_error(contents: &str) -> (usize, String) {
        let error = lex_all(contents).unwrap_err();
        (error.index().unwrap(), error.description())
    }

    #[test]
    fn punctuators() {
        assert_eq!(
            lex_all("a?.b ?? c >>>= d ?.5").unwrap(),
            vec![
                Token::Identifier("a".to_owned()),
                Token::QuestionDot,
                Token::Identifier("b".to_owned()),
                Token::NullishCoalesce,
                Token::Identifier("c".to_owned()),
                Token::ShiftRightLogicalEq,
                Token::Identifier("d".to_owned()),
                Token::Question,
                Token::NumberLiteral(0.5),
            ]
        );
    }

    #[test]
    fn numeric_literals() {
        assert_eq!(
            lex_all("0x1F 0b101 0o17 017 08 1_000 1.5e3 .5").unwrap(),
            vec![
                Token::NumberLiteral(31.0),
                Token::NumberLiteral(5.0),
                Token::NumberLiteral(15.0),
                Token::NumberLiteral(15.0),
                Token::NumberLiteral(8.0),
                Token::NumberLiteral(1000.0),
                Token::NumberLiteral(1500.0),
                Token::NumberLiteral(0.5),
            ]
        );

        assert_eq!(
            lex_all("1n 0x10n").unwrap(),
            vec![Token::BigIntLiteral(BigInt::from(1)), Token::BigIntLiteral(BigInt::from(16))]
        );
    }

    #[test]
    fn invalid_numeric_literals() {
        assert_eq!(lex_error("3in x").1, ParseError::InvalidNumericLiteralNextChar.to_string());
        assert_eq!(lex_error("1.5n").1, ParseError::BigIntNotInteger.to_string());
        assert_eq!(lex_error("08n").1, ParseError::BigIntLeadingZero.to_string());
        assert_eq!(lex_error("1__0").1, ParseError::AdjacentNumericSeparators.to_string());
        assert_eq!(lex_error("10_").1, ParseError::TrailingNumericSeparator.to_string());
        assert_eq!(lex_error("0x").1, ParseError::MissingDigits(16).to_string());
    }

    #[test]
    fn legacy_octal_is_flagged() {
        let source = Rc::new(Source::new_from_string("<test>", "010 10".to_owned()));
        let mut lexer = Lexer::new(&source, false, false);

        lexer.next().unwrap();
        assert!(lexer.flags().contains(TokenFlags::LEGACY_OCTAL));

        lexer.next().unwrap();
        assert!(!lexer.flags().contains(TokenFlags::LEGACY_OCTAL));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            lex_all(r#"'a\n\x41B\u{1F600}\
b'"#)
            .unwrap(),
            vec![Token::StringLiteral("a\nAB\u{1F600}b".to_owned())]
        );
        assert_eq!(lex_all(r"'\07'").unwrap(), vec![Token::StringLiteral("\x07".to_owned())]);
        assert_eq!(lex_error(r"'\x4'").1, ParseError::InvalidHexEscape.to_string());
    }

    #[test]
    fn unterminated_literals_point_at_end_of_input() {
        assert_eq!(lex_error("'abc"), (4, ParseError::UnterminatedStringLiteral.to_string()));
        assert_eq!(lex_error("`abc"), (4, ParseError::UnterminatedTemplateLiteral.to_string()));
        assert_eq!(lex_error("/* abc"), (6, ParseError::UnterminatedBlockComment.to_string()));
    }

    #[test]
    fn template_parts() {
        let tokens = lex_all("`a\\u{41}\r\n${").unwrap();
        assert_eq!(
            tokens,
            vec![Token::TemplatePart {
                raw: "a\\u{41}\n".to_owned(),
                cooked: Ok("aA\n".to_owned()),
                is_head: true,
                is_tail: false,
            }]
        );

        match &lex_all("`\\unicode`").unwrap()[0] {
            Token::TemplatePart { cooked, .. } => assert!(cooked.is_err()),
            other => panic!("unexpected token {}", other),
        }
    }

    #[test]
    fn comments_and_newlines() {
        let source =
            Rc::new(Source::new_from_string("<test>", "#!hashbang\na /* x\n */ b // c".to_owned()));
        let mut lexer = Lexer::new(&source, false, true);

        assert_eq!(lexer.next().unwrap().0, Token::Identifier("a".to_owned()));
        assert!(lexer.flags().contains(TokenFlags::NEW_LINE_BEFORE));
        assert_eq!(lexer.next().unwrap().0, Token::Identifier("b".to_owned()));
        assert!(lexer.flags().contains(TokenFlags::NEW_LINE_BEFORE));
        assert_eq!(lexer.next().unwrap().0, Token::Eof);

        let comments = lexer.take_comments();
        let values: Vec<&str> = comments.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["hashbang", " x\n ", " c"]);
    }

    #[test]
    fn html_comments_only_in_scripts() {
        assert_eq!(lex_all("a <!-- b\nc").unwrap().len(), 2);
        assert_eq!(lex_all("a\n--> b\nc").unwrap().len(), 2);

        let source = Rc::new(Source::new_from_string("<test>", "a <!-- b".to_owned()));
        let mut lexer = Lexer::new(&source, true, false);
        lexer.next().unwrap();
        assert_eq!(lexer.next().unwrap().0, Token::LessThan);
    }

    #[test]
    fn regexp_literals() {
        let source = Rc::new(Source::new_from_string("<test>", "/[/]\\//gi".to_owned()));
        let mut lexer = Lexer::new(&source, false, false);

        assert_eq!(lexer.next().unwrap().0, Token::Divide);
        let (token, loc) = lexer.next_regexp_literal(0).unwrap();
        assert_eq!(
            token,
            Token::RegExpLiteral {
                raw: "/[/]\\//gi".to_owned(),
                pattern: "[/]\\/".to_owned(),
                flags: "gi".to_owned(),
            }
        );
        assert_eq!(loc, Loc { start: 0, end: 9 });

        let source = Rc::new(Source::new_from_string("<test>", "/a/gg".to_owned()));
        let mut lexer = Lexer::new(&source, false, false);
        lexer.next().unwrap();
        assert!(lexer.next_regexp_literal(0).is_err());
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(
            lex_all("let \\u0061b instanceof café #priv").unwrap(),
            vec![
                Token::Let,
                Token::Identifier("ab".to_owned()),
                Token::InstanceOf,
                Token::Identifier("café".to_owned()),
                Token::PrivateName("priv".to_owned()),
            ]
        );

        // Escaped keywords are never keyword tokens
        assert_eq!(lex_all("\\u0076ar").unwrap(), vec![Token::Identifier("var".to_owned())]);
        assert!(lex_all("# x").is_err());
    }

    #[test]
    fn jsx_entities() {
        assert_eq!(decode_jsx_entities("a &amp; b &#65;&#x42; &bogus;"), "a & b AB &bogus;");
    }
}
