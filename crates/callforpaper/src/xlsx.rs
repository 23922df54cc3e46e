use std::path::Path;

use chrono::Datelike;
use rust_xlsxwriter::{
    Color, ExcelDateTime, Format, FormatAlign, FormatUnderline, Url, Workbook, Worksheet,
    XlsxError,
};

use crate::layout::{
    COL_CATEGORY, COL_DEADLINE, COL_FIELD, COL_NAME, COL_RANK, CellValue, CellWrite, SheetOp,
    plan_sheet,
};
use crate::types::AggregationModel;

pub const DATE_FORMAT: &str = "yyyy-mm-dd";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub rows: usize,
    pub merges: usize,
    pub hyperlinks: usize,
}

struct Formats {
    header: Format,
    text: Format,
    link: Format,
    date: Format,
}

impl Formats {
    fn new() -> Self {
        let text = Format::new().set_align(FormatAlign::VerticalCenter);
        Self {
            header: Format::new().set_bold(),
            link: text
                .clone()
                .set_font_color(Color::Blue)
                .set_underline(FormatUnderline::Single),
            date: text
                .clone()
                .set_num_format(DATE_FORMAT)
                .set_align(FormatAlign::Right),
            text,
        }
    }
}

fn excel_date(date: chrono::NaiveDate) -> Result<ExcelDateTime, XlsxError> {
    ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)
}

fn write_cell(
    worksheet: &mut Worksheet,
    cell: &CellWrite,
    formats: &Formats,
) -> Result<(), XlsxError> {
    let (row, col) = (cell.row, cell.col);
    match (&cell.value, &cell.link) {
        (CellValue::Text(text), _) if row == 0 => {
            worksheet.write_string_with_format(row, col, text, &formats.header)?;
        }
        (CellValue::Text(text), Some(link)) => {
            let url = Url::new(link).set_text(text);
            worksheet.write_url_with_format(row, col, url, &formats.link)?;
        }
        (CellValue::Text(text), None) => {
            worksheet.write_string_with_format(row, col, text, &formats.text)?;
        }
        (CellValue::Date(date), _) => match excel_date(*date) {
            Ok(datetime) => {
                worksheet.write_datetime_with_format(row, col, &datetime, &formats.date)?;
            }
            Err(e) => {
                log::warn!("Writing deadline {} as text: {}", date, e);
                let text = date.format("%Y-%m-%d").to_string();
                worksheet.write_string_with_format(row, col, text, &formats.date)?;
            }
        },
    }
    Ok(())
}

fn setup_columns(worksheet: &mut Worksheet) -> Result<(), XlsxError> {
    worksheet.set_column_width(COL_FIELD, 36)?;
    worksheet.set_column_width(COL_CATEGORY, 32)?;
    worksheet.set_column_width(COL_RANK, 6)?;
    worksheet.set_column_width(COL_NAME, 20)?;
    worksheet.set_column_width(COL_DEADLINE, 12)?;
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Writes the model to a single-sheet workbook at `path`.
///
/// The file is only created by the final save; a failure before that leaves
/// nothing on disk.
pub fn render(model: &AggregationModel, path: &Path) -> Result<RenderStats, RenderError> {
    let plan = plan_sheet(model);
    let formats = Formats::new();
    let mut stats = RenderStats {
        rows: plan.data_rows(),
        ..RenderStats::default()
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    setup_columns(worksheet)?;

    for op in &plan.ops {
        match op {
            SheetOp::Merge {
                first_row,
                last_row,
                col,
            } => {
                worksheet.merge_range(*first_row, *col, *last_row, *col, "", &formats.text)?;
                stats.merges += 1;
            }
            SheetOp::Write(cell) => {
                write_cell(worksheet, cell, &formats)?;
                if cell.link.is_some() {
                    stats.hyperlinks += 1;
                }
            }
        }
    }

    workbook.save(path)?;
    log::info!(
        "Wrote {} row(s), {} merge(s) to {}",
        stats.rows,
        stats.merges,
        path.display()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Deadline, PageResult, Record};
    use chrono::NaiveDate;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(path: &Path, name: &str) -> String {
        let file = std::fs::File::open(path).expect("Failed to open workbook");
        let mut archive = ZipArchive::new(file).expect("Workbook is not a zip archive");
        let mut part = archive.by_name(name).expect("Missing workbook part");
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    fn model() -> AggregationModel {
        let mut page = PageResult::new(
            "http://host/ccf/ccf-1.jsp",
            "AI",
            "http://host/ccf/field/ai",
        );
        for (rank, name, date) in [
            ("A", "ICML", "2025-01-01"),
            ("A", "NeurIPS", "2025-05-15"),
            ("B", "AAMAS", "2025-10-10"),
        ] {
            page.push(
                Category::Conference,
                rank,
                Record {
                    name: name.to_string(),
                    link: format!("http://host/ccf/conf/{}", name.to_lowercase()),
                    deadline: Deadline::Date(
                        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                    ),
                },
            );
        }
        page.push(
            Category::Journal,
            "A",
            Record {
                name: "JMLR".to_string(),
                link: "https://jmlr.org/".to_string(),
                deadline: Deadline::Raw("rolling".to_string()),
            },
        );
        page.rank_group_mut(Category::Journal, "C");
        AggregationModel { pages: vec![page] }
    }

    #[test]
    fn test_render_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("callforpaper.xlsx");

        let stats = render(&model(), &path).expect("Failed to render workbook");

        assert_eq!(stats.rows, 4);
        // field (4 rows), conference category (3 rows), rank A (2 rows)
        assert_eq!(stats.merges, 3);
        // field link on every field row plus one per record name
        assert_eq!(stats.hyperlinks, 8);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"), "xlsx files are zip archives");
    }

    #[test]
    fn test_render_sheet_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("callforpaper.xlsx");
        render(&model(), &path).unwrap();

        let styles = read_part(&path, "xl/styles.xml");
        assert!(styles.contains(r#"formatCode="yyyy-mm-dd""#));

        let sheet = read_part(&path, "xl/worksheets/sheet1.xml");
        for merge in ["A2:A5", "B2:B4", "C2:C3"] {
            assert!(
                sheet.contains(&format!(r#"<mergeCell ref="{}"/>"#, merge)),
                "missing merge {}",
                merge
            );
        }
        assert_eq!(sheet.matches("<mergeCell ").count(), 3);

        // the field link is repeated on every row of its merged span
        for cell in ["A2", "A3", "A4", "A5", "D2", "D3", "D4", "D5"] {
            assert!(
                sheet.contains(&format!(r#"<hyperlink ref="{}""#, cell)),
                "missing hyperlink on {}",
                cell
            );
        }
        assert_eq!(sheet.matches("<hyperlink ").count(), 8);
    }

    #[test]
    fn test_render_keeps_dates_outside_excel_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.xlsx");
        let mut page = PageResult::new("http://host/ccf/ccf-1.jsp", "AI", "http://host/ai");
        page.push(
            Category::Conference,
            "A",
            Record {
                name: "OLD".to_string(),
                link: "http://host/ccf/conf/old".to_string(),
                deadline: Deadline::Date(NaiveDate::from_ymd_opt(1800, 1, 1).unwrap()),
            },
        );

        let stats = render(&AggregationModel { pages: vec![page] }, &path)
            .expect("An out-of-range date must not abort the sheet");

        assert_eq!(stats.rows, 1);
        assert!(path.exists());
        assert!(read_part(&path, "xl/sharedStrings.xml").contains("1800-01-01"));
    }

    #[test]
    fn test_render_empty_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");

        let stats = render(&AggregationModel::new(), &path).unwrap();

        assert_eq!(stats, RenderStats::default());
        assert!(path.exists());
    }

    #[test]
    fn test_excel_date_range() {
        assert!(excel_date(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()).is_ok());
        // Excel dates start in 1900.
        assert!(excel_date(NaiveDate::from_ymd_opt(1899, 12, 30).unwrap()).is_err());
    }
}
