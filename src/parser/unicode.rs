use icu_properties::props::{IdContinue, IdStart};
use icu_properties::{CodePointSetData, CodePointSetDataBorrowed};

/// All code points with the ID_Start property.
#[inline]
fn id_start_set() -> CodePointSetDataBorrowed<'static> {
    CodePointSetData::new::<IdStart>()
}

/// All code points with the ID_Continue property.
#[inline]
fn id_continue_set() -> CodePointSetDataBorrowed<'static> {
    CodePointSetData::new::<IdContinue>()
}

#[inline]
pub fn is_decimal_digit(char: char) -> bool {
    char.is_ascii_digit()
}

#[inline]
pub fn is_ascii_whitespace(char: char) -> bool {
    match char {
        ' '
        | '\t'
        // Vertical tab
        | '\u{000B}'
        // Form feed
        | '\u{000C}' => true,
        _ => false,
    }
}

#[inline]
pub fn is_unicode_whitespace(char: char) -> bool {
    match char {
        // All non-ascii characters in the unicode Space_Separator category
        '\u{00A0}'
        | '\u{1680}'
        | '\u{2000}'..='\u{200A}'
        | '\u{202F}'
        | '\u{205F}'
        | '\u{3000}'
        // And the zero width non breaking space
        | '\u{FEFF}' => true,
        _ => false,
    }
}

#[inline]
pub fn is_unicode_newline(char: char) -> bool {
    char == '\u{2028}' || char == '\u{2029}'
}

#[inline]
pub fn is_ascii_newline(char: char) -> bool {
    char == '\n' || char == '\r'
}

#[inline]
pub fn is_newline(char: char) -> bool {
    is_ascii_newline(char) || is_unicode_newline(char)
}

pub fn get_binary_value(char: char) -> Option<u32> {
    match char {
        '0' => Some(0),
        '1' => Some(1),
        _ => None,
    }
}

pub fn get_octal_value(char: char) -> Option<u32> {
    match char {
        '0'..='7' => Some(char as u32 - '0' as u32),
        _ => None,
    }
}

pub fn get_decimal_value(char: char) -> Option<u32> {
    char.to_digit(10)
}

pub fn get_hex_value(char: char) -> Option<u32> {
    char.to_digit(16)
}

/// Can this ASCII character appear as the first character of an identifier.
#[inline]
pub fn is_id_start_ascii(char: char) -> bool {
    char.is_ascii_alphabetic() || char == '_' || char == '$'
}

/// Can this ASCII character appear in an identifier after the first character.
#[inline]
pub fn is_id_part_ascii(char: char) -> bool {
    char.is_ascii_alphanumeric() || char == '_' || char == '$'
}

#[inline]
pub fn is_id_start_unicode(char: char) -> bool {
    id_start_set().contains(char)
}

/// ID_Continue plus the zero width non-joiner and zero width joiner.
#[inline]
pub fn is_id_part_unicode(char: char) -> bool {
    id_continue_set().contains(char) || char == '\u{200C}' || char == '\u{200D}'
}

pub fn is_id_start(char: char) -> bool {
    if char.is_ascii() {
        is_id_start_ascii(char)
    } else {
        is_id_start_unicode(char)
    }
}

pub fn is_id_part(char: char) -> bool {
    if char.is_ascii() {
        is_id_part_ascii(char)
    } else {
        is_id_part_unicode(char)
    }
}
