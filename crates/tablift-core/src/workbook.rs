//! Workbook output: one sheet per extracted table.
//!
//! The package is a minimal SpreadsheetML document with inline string cells.
//! Reading goes through calamine.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use calamine::{Reader, Xlsx};
use serde::Serialize;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::TabliftError;
use crate::model::ExtractedTable;

/// Excel's limit on sheet name length.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Excel's limit on characters in a single cell.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Name of the sheet holding the table at 0-based `index`.
pub fn sheet_name(index: usize) -> String {
    format!("Table_{}", index.saturating_add(1))
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect()
}

/// Write `tables` to an `.xlsx` workbook at `destination`, one sheet per
/// table in order.
///
/// The workbook is assembled in a temporary file in the destination's
/// directory and moved into place once complete.
pub fn write_workbook(
    tables: &[ExtractedTable],
    destination: &Path,
) -> Result<PathBuf, TabliftError> {
    let fail = |reason: String| TabliftError::Write {
        path: destination.to_path_buf(),
        reason,
    };

    if tables.is_empty() {
        return Err(fail("no tables to write".into()));
    }

    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| fail(e.to_string()))?;

    {
        let mut zip = ZipWriter::new(tmp.as_file_mut());
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut parts = vec![
            ("[Content_Types].xml".to_string(), content_types_xml(tables.len())),
            ("_rels/.rels".to_string(), ROOT_RELS.to_string()),
            ("xl/workbook.xml".to_string(), workbook_xml(tables.len())),
            (
                "xl/_rels/workbook.xml.rels".to_string(),
                workbook_rels_xml(tables.len()),
            ),
            ("xl/styles.xml".to_string(), STYLES.to_string()),
        ];
        for (i, table) in tables.iter().enumerate() {
            parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), sheet_xml(table)));
        }

        for (name, xml) in parts {
            zip.start_file(name, options).map_err(|e| fail(e.to_string()))?;
            zip.write_all(xml.as_bytes()).map_err(|e| fail(e.to_string()))?;
        }
        zip.finish().map_err(|e| fail(e.to_string()))?;
    }

    tmp.persist(destination).map_err(|e| fail(e.error.to_string()))?;

    Ok(destination.to_path_buf())
}

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#
);

// Font 1 is bold, used by header cells (style 1).
const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font>"#,
    r#"<font><b/><sz val="11"/><name val="Calibri"/></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill>"#,
    r#"<fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#
);

fn content_types_xml(sheets: usize) -> String {
    let mut xml = String::with_capacity(1024);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
    for n in 1..=sheets {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            n
        );
    }
    xml.push_str("</Types>");
    xml
}

fn workbook_xml(sheets: usize) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);
    xml.push_str("<sheets>");
    for i in 0..sheets {
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(&sheet_name(i)),
            i + 1,
            i + 1
        );
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels_xml(sheets: usize) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for n in 1..=sheets {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, n
        );
    }
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheets + 1
    );
    xml.push_str("</Relationships>");
    xml
}

fn sheet_xml(table: &ExtractedTable) -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    xml.push_str("<sheetData>");

    let header = table.header().map(|h| (h, true));
    let body = table.rows().iter().map(|r| (r.as_slice(), false));
    for (row_idx, (cells, bold)) in header.into_iter().chain(body).enumerate() {
        let row_num = row_idx + 1;
        let _ = write!(xml, r#"<row r="{}">"#, row_num);
        for (col_idx, value) in cells.iter().enumerate() {
            let text = clean_cell(value);
            if text.is_empty() {
                continue;
            }
            let style = if bold { r#" s="1""# } else { "" };
            let padded =
                text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace);
            let space = if padded { r#" xml:space="preserve""# } else { "" };
            let _ = write!(
                xml,
                r#"<c r="{}{}"{} t="inlineStr"><is><t{}>{}</t></is></c>"#,
                column_to_letters(col_idx as u32 + 1),
                row_num,
                style,
                space,
                escape_xml(&text)
            );
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

/// 1-based column number to letters (1 -> A, 27 -> AA).
fn column_to_letters(col: u32) -> String {
    let mut letters = String::new();
    let mut col = col;

    while col > 0 {
        col -= 1;
        let letter = ((col % 26) as u8 + b'A') as char;
        letters.insert(0, letter);
        col /= 26;
    }

    letters
}

/// Drop characters XML 1.0 cannot carry and cap the length.
fn clean_cell(value: &str) -> String {
    value
        .chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
        })
        .take(MAX_CELL_CHARS)
        .collect()
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// A sheet read back from a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetContents {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// Read every sheet of an `.xlsx` workbook as rows of strings. Rows start
/// at A1; empty cells read as empty strings.
pub fn read_workbook(path: &Path) -> Result<Vec<SheetContents>, TabliftError> {
    let fail = |reason: String| TabliftError::WorkbookRead {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook: Xlsx<_> = calamine::open_workbook(path).map_err(|e| fail(format!("{e}")))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| fail(format!("sheet '{name}': {e}")))?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        if let (Some((top, left)), Some((bottom, right))) = (range.start(), range.end()) {
            let height = bottom as usize + 1;
            let width = right as usize + 1;
            rows = vec![vec![String::new(); width]; height];
            for (r, c, cell) in range.cells() {
                rows[top as usize + r][left as usize + c] = cell_as_string(cell);
            }
        }

        sheets.push(SheetContents { name, rows });
    }

    Ok(sheets)
}

fn cell_as_string(cell: &calamine::Data) -> String {
    match cell {
        calamine::Data::String(s) => s.clone(),
        calamine::Data::Empty => String::new(),
        _ => format!("{cell}"),
    }
}
