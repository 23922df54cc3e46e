//! Sheet layout as a list of operations, independent of any spreadsheet
//! library. [`crate::xlsx`] replays the operations into a workbook.

use chrono::NaiveDate;

use crate::types::{AggregationModel, Category, Deadline, PageResult};

pub const HEADERS: [&str; 5] = ["field", "category", "rank", "name", "deadline"];

pub const COL_FIELD: u16 = 0;
pub const COL_CATEGORY: u16 = 1;
pub const COL_RANK: u16 = 2;
pub const COL_NAME: u16 = 3;
pub const COL_DEADLINE: u16 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Date(NaiveDate),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<&Deadline> for CellValue {
    fn from(deadline: &Deadline) -> Self {
        match deadline {
            Deadline::Date(date) => CellValue::Date(*date),
            Deadline::Raw(text) => CellValue::Text(text.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub row: u32,
    pub col: u16,
    pub value: CellValue,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetOp {
    Merge { first_row: u32, last_row: u32, col: u16 },
    Write(CellWrite),
}

/// Cells covering `size` rows of `col` starting at `row`.
///
/// Nothing for an empty span, a single write for one row, otherwise a merge
/// followed by a write to every row it covers.
pub fn write_merge(
    row: u32,
    col: u16,
    size: u32,
    value: CellValue,
    link: Option<&str>,
) -> Vec<SheetOp> {
    if size == 0 {
        return Vec::new();
    }

    let mut ops = Vec::with_capacity(size as usize + 1);
    if size > 1 {
        ops.push(SheetOp::Merge {
            first_row: row,
            last_row: row + size - 1,
            col,
        });
    }
    ops.extend((row..row + size).map(|r| {
        SheetOp::Write(CellWrite {
            row: r,
            col,
            value: value.clone(),
            link: link.map(str::to_string),
        })
    }));
    ops
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetPlan {
    pub ops: Vec<SheetOp>,
    /// One past the last data row.
    pub next_row: u32,
}

impl SheetPlan {
    pub fn writes(&self) -> impl Iterator<Item = &CellWrite> {
        self.ops.iter().filter_map(|op| match op {
            SheetOp::Write(write) => Some(write),
            SheetOp::Merge { .. } => None,
        })
    }

    pub fn merges(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SheetOp::Merge { .. }))
            .count()
    }

    /// Rows below the header that hold a record.
    pub fn data_rows(&self) -> usize {
        self.writes()
            .filter(|w| w.col == COL_NAME && w.row > 0)
            .count()
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&CellWrite> {
        self.writes().filter(|w| w.row == row && w.col == col).last()
    }
}

fn plan_page(ops: &mut Vec<SheetOp>, page: &PageResult, start: u32) -> u32 {
    let conferences = page.conference_count() as u32;
    let journals = page.journal_count() as u32;

    ops.extend(write_merge(
        start,
        COL_FIELD,
        conferences + journals,
        page.field.as_str().into(),
        Some(&page.field_link),
    ));
    ops.extend(write_merge(
        start,
        COL_CATEGORY,
        conferences,
        Category::Conference.label().into(),
        None,
    ));
    ops.extend(write_merge(
        start + conferences,
        COL_CATEGORY,
        journals,
        Category::Journal.label().into(),
        None,
    ));

    let mut row = start;
    for category in [Category::Conference, Category::Journal] {
        for group in page.groups(category) {
            ops.extend(write_merge(
                row,
                COL_RANK,
                group.records.len() as u32,
                group.rank.as_str().into(),
                None,
            ));
            for record in &group.records {
                ops.push(SheetOp::Write(CellWrite {
                    row,
                    col: COL_NAME,
                    value: record.name.as_str().into(),
                    link: Some(record.link.clone()),
                }));
                ops.push(SheetOp::Write(CellWrite {
                    row,
                    col: COL_DEADLINE,
                    value: (&record.deadline).into(),
                    link: None,
                }));
                row += 1;
            }
        }
    }
    row
}

/// Lays out the header row and every page, conference groups before journal
/// groups, one row per record.
pub fn plan_sheet(model: &AggregationModel) -> SheetPlan {
    let mut ops: Vec<SheetOp> = HEADERS
        .iter()
        .zip(0u16..)
        .map(|(header, col)| {
            SheetOp::Write(CellWrite {
                row: 0,
                col,
                value: (*header).into(),
                link: None,
            })
        })
        .collect();

    let mut row = 1;
    for page in &model.pages {
        let next = plan_page(&mut ops, page, row);
        debug_assert_eq!((next - row) as usize, page.row_count());
        row = next;
    }

    SheetPlan { ops, next_row: row }
}
