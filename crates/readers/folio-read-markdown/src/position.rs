//! Byte offset to line/column conversion.

use std::ops::Range;

use folio_core::{Point, Position};

/// Start offsets of every line in a source text.
pub(crate) struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    /// 1-based line and column (in characters) of a byte offset.
    pub(crate) fn point(&self, offset: usize) -> Point {
        let offset = offset.min(self.source.len());
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self
            .line_starts
            .get(line.saturating_sub(1))
            .copied()
            .unwrap_or(0);
        let column = match self.source.get(line_start..offset) {
            Some(prefix) => prefix.chars().count() + 1,
            None => offset - line_start + 1,
        };
        Point::new(line, column, offset)
    }

    pub(crate) fn position(&self, range: &Range<usize>) -> Position {
        Position::new(self.point(range.start), self.point(range.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        let index = LineIndex::new("abc\ndef");
        assert_eq!(index.point(0), Point::new(1, 1, 0));
        assert_eq!(index.point(3), Point::new(1, 4, 3));
    }

    #[test]
    fn test_second_line() {
        let index = LineIndex::new("abc\ndef");
        assert_eq!(index.point(4), Point::new(2, 1, 4));
        assert_eq!(index.point(7), Point::new(2, 4, 7));
    }

    #[test]
    fn test_columns_count_characters() {
        let index = LineIndex::new("héllo");
        // 'é' is two bytes
        assert_eq!(index.point(3).column, 3);
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        let index = LineIndex::new("ab");
        assert_eq!(index.point(10), Point::new(1, 3, 2));
    }
}
