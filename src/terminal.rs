/// Detect if the terminal supports colors on stderr.
fn detect_stderr_supports_colors() -> bool {
    if let Some(support) = supports_color::on_cached(supports_color::Stream::Stderr) {
        support.has_basic
    } else {
        false
    }
}

/// Whether we should use colors when printing to stderr. Based on the CLI flags and detecting if
/// the terminal supports colors.
pub fn stderr_should_use_colors(no_color: bool) -> bool {
    !no_color && detect_stderr_supports_colors()
}

/// Reset all color and style attributes
pub const RESET: &str = "\x1b[0m";

pub const BOLD: &str = "\x1b[1m";
pub const RED: &str = "\x1b[31m";
