//! Per-file spatial index: `(line, col) → SymbolId` lookup, smallest
//! containing span wins, ties broken by earliest start (spec.md §4.3,
//! invariant 5).

use crate::types::SymbolId;

#[derive(Debug, Clone, Copy)]
struct Span {
    start_line: u32,
    end_line: u32,
    start_col: u16,
    end_col: u16,
    symbol_id: SymbolId,
}

/// Sorted (by `end_line`) vector of symbol spans for one file, supporting
/// `O(log n + k)` point lookup and `O(1)` name lookup via a side map built
/// by the caller.
#[derive(Default)]
pub struct SpatialIndex {
    spans: Vec<Span>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, start_line: u32, end_line: u32, start_col: u16, end_col: u16, symbol_id: SymbolId) {
        let span = Span {
            start_line,
            end_line,
            start_col,
            end_col,
            symbol_id,
        };
        let idx = self.spans.partition_point(|s| s.end_line < end_line);
        self.spans.insert(idx, span);
    }

    /// Binary-searches to the first span whose `end_line >= line`, then
    /// linearly scans the overlap set, picking the smallest containing span
    /// (line_count, then start_col..end_col width), ties broken by earliest
    /// start line.
    pub fn find_at_location(&self, line: u32, column: u16) -> Option<SymbolId> {
        let start = self.spans.partition_point(|s| s.end_line < line);

        let mut best: Option<(&Span, (u32, u32))> = None;
        for span in &self.spans[start..] {
            if span.start_line > line {
                // Spans beyond this are sorted by end_line, not start_line,
                // so we cannot break early in general; continue scanning
                // the remainder of the (typically small) overlap set.
                continue;
            }
            if !covers(span, line, column) {
                continue;
            }
            let size = span_size(span);
            match best {
                None => best = Some((span, size)),
                Some((current, current_size)) => {
                    if size < current_size
                        || (size == current_size && span.start_line < current.start_line)
                    {
                        best = Some((span, size));
                    }
                }
            }
        }

        best.map(|(span, _)| span.symbol_id)
    }
}

fn covers(span: &Span, line: u32, column: u16) -> bool {
    if line < span.start_line || line > span.end_line {
        return false;
    }
    if line == span.start_line && column < span.start_col {
        return false;
    }
    if line == span.end_line && column > span.end_col {
        return false;
    }
    true
}

/// `(line_count, col_width)`, compared lexicographically so a single-line
/// span nested inside another single-line span (e.g. `g(x)` inside `f(..)`)
/// still loses the tie on column width rather than falling through to
/// earliest start line.
fn span_size(span: &Span) -> (u32, u32) {
    let line_count = span.end_line.saturating_sub(span.start_line);
    let col_width = (span.end_col as u32).saturating_sub(span.start_col as u32);
    (line_count, col_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    fn sym(n: u32) -> SymbolId {
        crate::types::SymbolId::new(n).unwrap()
    }
    #[allow(dead_code)]
    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn smallest_containing_span_wins() {
        let mut index = SpatialIndex::new();
        index.insert(1, 100, 0, 0, sym(1)); // outer function
        index.insert(10, 20, 0, 0, sym(2)); // inner closure

        assert_eq!(index.find_at_location(15, 0), Some(sym(2)));
        assert_eq!(index.find_at_location(50, 0), Some(sym(1)));
    }

    #[test]
    fn ties_broken_by_earliest_start() {
        let mut index = SpatialIndex::new();
        index.insert(5, 15, 0, 0, sym(1));
        index.insert(8, 18, 0, 0, sym(2));

        // line 10 is covered by both spans, both size 10; earliest start (5) wins.
        assert_eq!(index.find_at_location(10, 0), Some(sym(1)));
    }

    #[test]
    fn same_line_nested_span_wins_on_column_width() {
        let mut index = SpatialIndex::new();
        // f(g(x)) on one line: outer call spans the whole line, inner call
        // is the narrower `g(x)` substring. Both have line_count == 0.
        index.insert(1, 1, 0, 10, sym(1)); // f(g(x))
        index.insert(1, 1, 2, 6, sym(2)); // g(x)

        assert_eq!(index.find_at_location(1, 4), Some(sym(2)));
        assert_eq!(index.find_at_location(1, 8), Some(sym(1)));
    }

    #[test]
    fn end_line_with_col_past_end_col_does_not_match() {
        let mut index = SpatialIndex::new();
        index.insert(1, 10, 0, 5, sym(1));
        assert_eq!(index.find_at_location(10, 6), None);
        assert_eq!(index.find_at_location(10, 5), Some(sym(1)));
    }

    #[test]
    fn no_match_returns_none() {
        let index = SpatialIndex::new();
        assert_eq!(index.find_at_location(1, 0), None);
    }
}
