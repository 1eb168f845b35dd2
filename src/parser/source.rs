use std::cell::OnceCell;
use std::fs::File;
use std::io::{BufReader, Read};

use super::loc::{calculate_line_offsets, find_line_col_for_pos, Pos};
use super::parse_error::ParseResult;

pub struct Source {
    pub file_path: String,
    pub contents: String,
    line_offsets: OnceCell<Vec<usize>>,
}

impl Source {
    pub fn new_from_file(file_path: &str) -> ParseResult<Source> {
        // Read file to string
        let file = File::open(file_path)?;
        let mut reader = BufReader::new(file);

        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;

        Ok(Source::new_from_string(file_path, contents))
    }

    pub fn new_from_string(file_path: &str, contents: String) -> Source {
        Source { file_path: file_path.to_owned(), contents, line_offsets: OnceCell::new() }
    }

    /// Byte offsets of the start of every line, computed on first use.
    pub fn line_offsets(&self) -> &[usize] {
        self.line_offsets
            .get_or_init(|| calculate_line_offsets(&self.contents))
    }

    /// 1-indexed line and 0-indexed column of a position in this source.
    pub fn line_col_for_pos(&self, pos: Pos) -> (usize, usize) {
        find_line_col_for_pos(pos, self.line_offsets())
    }
}
