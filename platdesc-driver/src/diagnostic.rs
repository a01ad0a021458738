//! The single diagnostic primitive every phase of the driver reports
//! through. Produces the `Error E<NN>: ...` rendering with a quoted
//! source line and a caret underline, mirroring the way the teacher's
//! `drmem-api::types::Error` centralizes error text in one place
//! instead of scattering `format!` calls across call sites.

use crate::position::Position;
use platdesc_api::{ErrorKind, ParsingException};

/// Builds a [`ParsingException`] for a diagnostic anchored at `position`
/// inside `file`, quoting the corresponding line from `source`.
///
/// `underline_long` selects whether the caret underline spans the full
/// token width (`position.length`) or is a single caret at the start
/// column; single-width underlines read better for "missing X here"
/// diagnostics where no offending token exists to span.
pub fn report(
    kind: ErrorKind,
    file: &str,
    source: &str,
    position: Position,
    message: &str,
    underline_long: bool,
) -> ParsingException {
    let rendered = render(file, source, position, message, underline_long);
    ParsingException::new(kind, rendered)
}

fn render(file: &str, source: &str, position: Position, message: &str, underline_long: bool) -> String {
    let line_text = source
        .lines()
        .nth(position.line.saturating_sub(1) as usize)
        .unwrap_or("");
    let underline_width = if underline_long {
        position.length.max(1)
    } else {
        1
    };
    let mut out = String::new();
    out.push_str(&format!("Error: {message}\n"));
    out.push_str(&format!("  --> {file}:{}:{}\n", position.line, position.column));
    out.push_str(&format!("   |\n{:>3}| {line_text}\n   |", position.line));
    for _ in 1..position.column {
        out.push(' ');
    }
    for _ in 0..underline_width {
        out.push('^');
    }
    out
}

/// Renders the kind's stable numeric code alongside the message, for
/// contexts (CLI summaries, logs) that want `E07` style tags instead of
/// the full multi-line rendering.
pub fn tagged(kind: ErrorKind, message: &str) -> String {
    format!("E{:02}: {}", kind.code(), message)
}
