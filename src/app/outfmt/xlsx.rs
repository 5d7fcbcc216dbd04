use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};

use crate::statement::csv_common::PvtCol;
use crate::statement::render::{Cell, CellTable};
use crate::util::os::{swap_into_place, temp_sibling};

use super::model::{Error, OutputType, SheetWriter};

const CATEGORY_SHEET_NAME: &str = "Categories";

/// Workbook sink. Each table lands in its own sheet; anything that parses
/// as a number is stored numeric, dates are stored as real date cells, and
/// category lookup cells become VLOOKUP formulas against the Categories
/// sheet, keyed on the Security column. The workbook is saved once, at
/// finish, through a temp file.
pub struct XlsxWriter {
    out_path: PathBuf,
    workbook: Workbook,
}

impl XlsxWriter {
    pub fn new(out_path: &Path) -> XlsxWriter {
        XlsxWriter {
            out_path: out_path.to_path_buf(),
            workbook: Workbook::new(),
        }
    }
}

/// 0-based column index to the A1-style letter(s): 0 -> A, 25 -> Z, 26 -> AA.
fn col_letter(col: u16) -> String {
    let mut letters = Vec::<u8>::new();
    let mut n = col as u32 + 1;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_else(|_| "A".to_string())
}

fn category_lookup_formula(security_col: u16, sheet_row: u32) -> String {
    format!(
        "=VLOOKUP({}{},{}!$A:$B,2,FALSE)",
        col_letter(security_col),
        sheet_row + 1,
        CATEGORY_SHEET_NAME
    )
}

impl SheetWriter for XlsxWriter {
    fn write_table(
        &mut self,
        _out_type: OutputType,
        name: &str,
        table: &CellTable,
    ) -> Result<(), Error> {
        let sheet = self.workbook.add_worksheet();
        sheet.set_name(name).map_err(|e| e.to_string())?;

        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        let security_col: Option<u16> = table
            .header
            .iter()
            .position(|h| h == PvtCol::SECURITY)
            .and_then(|i| u16::try_from(i).ok());

        let mut col_widths = HashMap::<u16, f64>::new();
        let track_width = |widths: &mut HashMap<u16, f64>,
                               col: u16,
                               len: usize| {
            let old = widths.get(&col).map(|v| *v).unwrap_or(0.0);
            widths.insert(col, old.max(len as f64));
        };

        for (c_i, header_cell) in table.header.iter().enumerate() {
            let col_i = u16::try_from(c_i).map_err(|e| e.to_string())?;
            track_width(&mut col_widths, col_i, header_cell.len());
            sheet
                .write(0, col_i, header_cell.as_str())
                .map_err(|e| e.to_string())?;
        }

        for (r_i, row) in table.rows.iter().enumerate() {
            let row_i = u32::try_from(r_i + 1).map_err(|e| e.to_string())?;
            for (c_i, cell) in row.iter().enumerate() {
                let col_i = u16::try_from(c_i).map_err(|e| e.to_string())?;
                match cell {
                    Cell::Date(date) => {
                        let date_data = rust_xlsxwriter::ExcelDateTime::from_ymd(
                            u16::try_from(date.year())
                                .map_err(|e| e.to_string())?,
                            date.month().into(),
                            date.day(),
                        )
                        .map_err(|e| e.to_string())?;
                        sheet
                            .write_with_format(
                                row_i, col_i, &date_data, &date_format,
                            )
                            .map_err(|e| e.to_string())?;
                        // yyyy-mm-dd
                        track_width(&mut col_widths, col_i, 10);
                    }
                    Cell::Text(text) => {
                        track_width(&mut col_widths, col_i, text.len());
                        if let Ok(num) = text.parse::<f64>() {
                            sheet
                                .write(row_i, col_i, num)
                                .map_err(|e| e.to_string())?;
                        } else {
                            sheet
                                .write(row_i, col_i, text.as_str())
                                .map_err(|e| e.to_string())?;
                        }
                    }
                    Cell::CategoryLookup => {
                        let sec_col = security_col.ok_or_else(|| {
                            format!(
                                "Sheet {name} has a category lookup cell \
                                 but no {} column",
                                PvtCol::SECURITY
                            )
                        })?;
                        let formula =
                            category_lookup_formula(sec_col, row_i);
                        sheet
                            .write_formula(row_i, col_i, formula.as_str())
                            .map_err(|e| e.to_string())?;
                    }
                }
            }
        }

        for (col, width) in col_widths {
            let _ = sheet.set_column_width(col, width);
        }

        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<(), Error> {
        let mut workbook = self.workbook;
        let tmp = temp_sibling(&self.out_path);
        workbook.save(&tmp).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            format!("Failed to write {}: {}", tmp.display(), e)
        })?;
        swap_into_place(&tmp, &self.out_path)
    }
}
