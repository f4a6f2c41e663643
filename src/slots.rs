//! Mapping question records onto fixed template slots.
//!
//! A template is a sequence of identical 5×4 tables, one per question. Each
//! record is written into fixed cells of its table:
//!
//! ```text
//!        col 0      col 1            col 2      col 3
//! row 0             stem
//! row 1             multiple_choice
//! row 2             option 1
//! row 3  option 2                    option 3
//! row 4             option 4                    answer (1-based)
//! ```
//!
//! Missing options and an unresolved answer are written as empty strings so
//! a reused template never keeps stale text. The concrete document format
//! lives behind [`SlotSink`]; [`TableSink`] is the in-memory implementation
//! the CLI serialises to JSON.

use crate::config::TemplateSize;
use crate::error::SlotError;
use crate::output::QuestionRecord;
use serde::{Deserialize, Serialize};

pub const SLOT_ROWS: usize = 5;
pub const SLOT_COLS: usize = 4;

/// Question-type tag written into every slot.
pub const QUESTION_TYPE_TAG: &str = "multiple_choice";

/// Cells receiving options 1–4, in option order.
pub const OPTION_CELLS: [(usize, usize); 4] = [(2, 1), (3, 0), (3, 2), (4, 1)];
pub const STEM_CELL: (usize, usize) = (0, 1);
pub const TYPE_CELL: (usize, usize) = (1, 1);
pub const ANSWER_CELL: (usize, usize) = (4, 3);

/// A single cell assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub row: usize,
    pub col: usize,
    pub text: String,
}

impl CellWrite {
    fn at((row, col): (usize, usize), text: impl Into<String>) -> Self {
        Self {
            row,
            col,
            text: text.into(),
        }
    }
}

/// The cell writes that place `record` into a slot.
///
/// Only the first four options fit; extra options are not written.
pub fn slot_cells(record: &QuestionRecord) -> Vec<CellWrite> {
    let mut cells = Vec::with_capacity(3 + OPTION_CELLS.len());
    cells.push(CellWrite::at(STEM_CELL, record.stem.as_str()));
    cells.push(CellWrite::at(TYPE_CELL, QUESTION_TYPE_TAG));
    for (i, &cell) in OPTION_CELLS.iter().enumerate() {
        cells.push(CellWrite::at(cell, record.option_text(i)));
    }
    cells.push(CellWrite::at(ANSWER_CELL, record.answer_number()));
    cells
}

/// Destination for slot contents, e.g. the tables of a document template.
pub trait SlotSink {
    /// Number of slots available.
    fn slot_count(&self) -> usize;

    /// Write `text` into cell (`row`, `col`) of slot `slot` (0-based).
    fn write_cell(&mut self, slot: usize, row: usize, col: usize, text: &str)
        -> Result<(), SlotError>;
}

/// Failure while filling slots: which write was rejected, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillError {
    pub slot: usize,
    pub row: usize,
    pub col: usize,
    pub source: SlotError,
}

/// Write records into consecutive slots starting at slot 0.
///
/// Stops quietly when the sink runs out of slots; the parser's record limit
/// normally prevents that. Returns the number of slots filled.
pub fn fill_slots<K: SlotSink + ?Sized>(
    records: &[QuestionRecord],
    sink: &mut K,
) -> Result<usize, FillError> {
    let count = records.len().min(sink.slot_count());
    for (slot, record) in records.iter().take(count).enumerate() {
        for cell in slot_cells(record) {
            sink.write_cell(slot, cell.row, cell.col, &cell.text)
                .map_err(|source| FillError {
                    slot,
                    row: cell.row,
                    col: cell.col,
                    source,
                })?;
        }
    }
    Ok(count)
}

/// One 5×4 slot table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTable {
    pub cells: [[String; SLOT_COLS]; SLOT_ROWS],
}

impl SlotTable {
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(String::as_str)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().flatten().all(|c| c.is_empty())
    }
}

/// In-memory template: a fixed number of empty slot tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSink {
    pub tables: Vec<SlotTable>,
}

impl TableSink {
    pub fn new(slots: usize) -> Self {
        Self {
            tables: vec![SlotTable::default(); slots],
        }
    }

    pub fn for_template(size: TemplateSize) -> Self {
        Self::new(size.slots())
    }

    /// Number of tables holding any text.
    pub fn used_slots(&self) -> usize {
        self.tables.iter().filter(|t| !t.is_blank()).count()
    }
}

impl SlotSink for TableSink {
    fn slot_count(&self) -> usize {
        self.tables.len()
    }

    fn write_cell(
        &mut self,
        slot: usize,
        row: usize,
        col: usize,
        text: &str,
    ) -> Result<(), SlotError> {
        let count = self.tables.len();
        let table = self
            .tables
            .get_mut(slot)
            .ok_or(SlotError::SlotOutOfRange { slot, count })?;
        let cell = table
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(SlotError::CellOutOfRange {
                row,
                col,
                rows: SLOT_ROWS,
                cols: SLOT_COLS,
            })?;
        *cell = text.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OptionEntry;

    fn record(stem: &str, opts: &[&str], correct: Option<usize>) -> QuestionRecord {
        QuestionRecord {
            stem: stem.into(),
            options: opts
                .iter()
                .enumerate()
                .map(|(i, t)| OptionEntry {
                    label: (i + 1).to_string(),
                    text: t.to_string(),
                    is_correct: Some(i) == correct,
                })
                .collect(),
            correct_option_index: correct,
        }
    }

    #[test]
    fn cells_follow_fixed_layout() {
        let mut sink = TableSink::new(1);
        let r = record("What is 2+2?", &["3", "4", "5", "6"], Some(1));
        assert_eq!(fill_slots(&[r], &mut sink).unwrap(), 1);

        let t = &sink.tables[0];
        assert_eq!(t.cell(0, 1), Some("What is 2+2?"));
        assert_eq!(t.cell(1, 1), Some("multiple_choice"));
        assert_eq!(t.cell(2, 1), Some("3"));
        assert_eq!(t.cell(3, 0), Some("4"));
        assert_eq!(t.cell(3, 2), Some("5"));
        assert_eq!(t.cell(4, 1), Some("6"));
        assert_eq!(t.cell(4, 3), Some("2"));
    }

    #[test]
    fn short_groups_and_unresolved_answers_write_blanks() {
        let cells = slot_cells(&record("Q", &["only"], None));
        assert_eq!(cells.len(), 7);
        let answer = cells.iter().find(|c| (c.row, c.col) == ANSWER_CELL).unwrap();
        assert_eq!(answer.text, "");
        let opt4 = cells.iter().find(|c| (c.row, c.col) == (4, 1)).unwrap();
        assert_eq!(opt4.text, "");
    }

    #[test]
    fn extra_options_are_not_written() {
        let cells = slot_cells(&record("Q", &["a", "b", "c", "d", "e"], Some(4)));
        assert!(cells.iter().all(|c| c.text != "e"));
        let answer = cells.iter().find(|c| (c.row, c.col) == ANSWER_CELL).unwrap();
        assert_eq!(answer.text, "5");
    }

    #[test]
    fn fill_stops_at_slot_count() {
        let mut sink = TableSink::new(2);
        let records: Vec<_> = (0..3).map(|i| record(&format!("Q{i}"), &["x"], None)).collect();
        assert_eq!(fill_slots(&records, &mut sink).unwrap(), 2);
        assert_eq!(sink.used_slots(), 2);
    }

    #[test]
    fn template_sink_has_template_slot_count() {
        assert_eq!(TableSink::for_template(TemplateSize::T25).slot_count(), 25);
    }

    #[test]
    fn out_of_range_cell_is_rejected() {
        let mut sink = TableSink::new(1);
        let err = sink.write_cell(0, 5, 0, "x").unwrap_err();
        assert!(matches!(err, SlotError::CellOutOfRange { row: 5, .. }));
        let err = sink.write_cell(1, 0, 0, "x").unwrap_err();
        assert_eq!(err, SlotError::SlotOutOfRange { slot: 1, count: 1 });
    }

    struct FailingSink;

    impl SlotSink for FailingSink {
        fn slot_count(&self) -> usize {
            1
        }

        fn write_cell(&mut self, _: usize, _: usize, _: usize, _: &str) -> Result<(), SlotError> {
            Err(SlotError::Other("read-only template".into()))
        }
    }

    #[test]
    fn sink_failure_reports_first_rejected_cell() {
        let err = fill_slots(&[record("Q", &[], None)], &mut FailingSink).unwrap_err();
        assert_eq!((err.slot, err.row, err.col), (0, 0, 1));
    }
}
