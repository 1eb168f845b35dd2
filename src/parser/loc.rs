use std::ops::Range;

/// Start and end positions are byte offsets in the source file.
pub type Pos = usize;

/// Half open interval describing a source location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Loc {
    pub start: Pos,
    pub end: Pos,
}

impl Loc {
    pub fn new(start: Pos, end: Pos) -> Loc {
        Loc { start, end }
    }

    pub fn to_range(&self) -> Range<Pos> {
        self.start..self.end
    }

    /// Smallest location containing both this location and another.
    pub fn join(&self, other: Loc) -> Loc {
        Loc { start: self.start.min(other.start), end: self.end.max(other.end) }
    }
}

pub const EMPTY_LOC: Loc = Loc { start: 0, end: 0 };

/// Calculate the byte offsets of the start of each line.
///
/// CR, LF, LS (U+2028), and PS (U+2029) all terminate a line, and a CRLF pair counts as a single
/// line terminator.
pub fn calculate_line_offsets(source: &str) -> Vec<usize> {
    let mut line_offsets = vec![0];

    let bytes = source.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\n' => {
                pos += 1;
                line_offsets.push(pos);
            }
            b'\r' => {
                pos += 1;
                if bytes.get(pos) == Some(&b'\n') {
                    pos += 1;
                }
                line_offsets.push(pos);
            }
            // LS and PS are encoded as E2 80 A8 and E2 80 A9
            0xE2 if bytes.get(pos + 1) == Some(&0x80)
                && matches!(bytes.get(pos + 2), Some(0xA8) | Some(0xA9)) =>
            {
                pos += 3;
                line_offsets.push(pos);
            }
            _ => pos += 1,
        }
    }

    line_offsets
}

/// Return the 1-indexed line and 0-indexed column number for a Pos, given the set of line start
/// offsets. Columns are byte offsets from the start of the line.
pub fn find_line_col_for_pos(pos: Pos, line_offsets: &[usize]) -> (usize, usize) {
    // Binary search to find the largest line start offset that is smaller than the pos. This is
    // the line number.
    let line = find_largest_offset_less_than_or_equal(pos, line_offsets);
    let col = pos - line_offsets[line];

    (line + 1, col)
}

fn find_largest_offset_less_than_or_equal(target: Pos, line_offsets: &[usize]) -> usize {
    let index = line_offsets.partition_point(|offset| *offset <= target);
    index.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_offsets_for_each_terminator() {
        assert_eq!(calculate_line_offsets("a\nb\rc\r\nd"), vec![0, 2, 4, 7]);
        assert_eq!(calculate_line_offsets("a\u{2028}b\u{2029}c"), vec![0, 4, 8]);
        assert_eq!(calculate_line_offsets(""), vec![0]);
        assert_eq!(calculate_line_offsets("abc\n"), vec![0, 4]);
    }

    #[test]
    fn line_col_lookup() {
        let offsets = calculate_line_offsets("let x;\nlet y;\r\nz");

        assert_eq!(find_line_col_for_pos(0, &offsets), (1, 0));
        assert_eq!(find_line_col_for_pos(4, &offsets), (1, 4));
        assert_eq!(find_line_col_for_pos(7, &offsets), (2, 0));
        assert_eq!(find_line_col_for_pos(15, &offsets), (3, 0));
        assert_eq!(find_line_col_for_pos(16, &offsets), (3, 1));
    }
}
