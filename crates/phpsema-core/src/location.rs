//! Source position utilities
//!
//! Spans carry byte offsets; analysis output wants text, lines and columns.

use mago_span::Span;

/// Slice the source text covered by a span
pub fn span_text<'s>(source: &'s str, span: &Span) -> &'s str {
    &source[span.start.offset as usize..span.end.offset as usize]
}

/// 1-based line number for a byte offset
pub fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .bytes()
        .filter(|b| *b == b'\n')
        .count()
        + 1
}

/// 1-based line and column for a byte offset
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of() {
        let source = "<?php\n$a = 1;\n$b = 2;\n";
        assert_eq!(line_of(source, 0), 1);
        assert_eq!(line_of(source, 6), 2);
        assert_eq!(line_of(source, source.len()), 4);
    }

    #[test]
    fn test_line_col() {
        let source = "<?php\n$a = 1;\n";
        assert_eq!(line_col(source, 0), (1, 1));
        assert_eq!(line_col(source, 6), (2, 1));
        assert_eq!(line_col(source, 11), (2, 6));
    }
}
