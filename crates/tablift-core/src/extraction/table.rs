//! Reconstruct table grids from word positions on a page.
//!
//! Words are grouped into visual rows by their vertical centre, and words
//! within a row are merged into cells when the horizontal gap between them is
//! small. A run of adjacent rows that each have several cells is a table
//! region; its columns are the merged horizontal extents of its cells.

use serde::{Deserialize, Serialize};

use crate::model::RawGrid;

#[derive(Debug, Clone, PartialEq)]
pub struct BBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BBox {
    fn height(&self) -> f32 {
        (self.y_max - self.y_min).max(f32::EPSILON)
    }

    fn y_center(&self) -> f32 {
        (self.y_min + self.y_max) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
}

/// Tolerances for the table finder. Distances are fractions of the word
/// height so they scale with font size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableFinderSettings {
    /// Max vertical distance between word centres on the same row.
    pub row_tolerance: f32,
    /// Max horizontal gap between words of the same cell.
    pub cell_gap: f32,
    /// Max vertical gap between consecutive rows of one table.
    pub row_gap: f32,
    pub min_rows: usize,
    pub min_columns: usize,
}

impl Default for TableFinderSettings {
    fn default() -> Self {
        TableFinderSettings {
            row_tolerance: 0.5,
            cell_gap: 1.0,
            row_gap: 1.5,
            min_rows: 2,
            min_columns: 2,
        }
    }
}

#[derive(Debug, Clone)]
struct Span {
    text: String,
    x_min: f32,
    x_max: f32,
}

#[derive(Debug, Clone)]
struct Row {
    top: f32,
    bottom: f32,
    cells: Vec<Span>,
}

impl Row {
    fn height(&self) -> f32 {
        (self.bottom - self.top).max(f32::EPSILON)
    }
}

/// Find table grids among the words of one page, top to bottom.
pub fn find_tables(words: &[Word], settings: &TableFinderSettings) -> Vec<RawGrid> {
    let mut grids = Vec::new();
    let mut region: Vec<Row> = Vec::new();

    for row in group_rows(words, settings) {
        let tabular = row.cells.len() >= settings.min_columns;
        let adjacent = region
            .last()
            .map(|prev| row.top - prev.bottom <= settings.row_gap * prev.height())
            .unwrap_or(true);

        if tabular && adjacent {
            region.push(row);
            continue;
        }

        flush_region(&mut region, &mut grids, settings);
        if tabular {
            region.push(row);
        }
    }
    flush_region(&mut region, &mut grids, settings);

    grids
}

fn flush_region(region: &mut Vec<Row>, grids: &mut Vec<RawGrid>, settings: &TableFinderSettings) {
    let rows = std::mem::take(region);
    if rows.len() < settings.min_rows {
        return;
    }
    if let Some(grid) = build_grid(&rows, settings) {
        grids.push(grid);
    }
}

fn group_rows(words: &[Word], settings: &TableFinderSettings) -> Vec<Row> {
    let mut sorted: Vec<&Word> = words.iter().filter(|w| !w.text.trim().is_empty()).collect();
    sorted.sort_by(|a, b| {
        a.bbox
            .y_center()
            .total_cmp(&b.bbox.y_center())
            .then(a.bbox.x_min.total_cmp(&b.bbox.x_min))
    });

    let mut lines: Vec<(f32, Vec<&Word>)> = Vec::new();
    for word in sorted {
        match lines.last_mut() {
            Some((center, members))
                if (word.bbox.y_center() - *center).abs()
                    <= settings.row_tolerance * word.bbox.height() =>
            {
                members.push(word);
            }
            _ => lines.push((word.bbox.y_center(), vec![word])),
        }
    }

    lines
        .into_iter()
        .map(|(_, mut members)| {
            members.sort_by(|a, b| a.bbox.x_min.total_cmp(&b.bbox.x_min));
            let top = members.iter().map(|w| w.bbox.y_min).fold(f32::MAX, f32::min);
            let bottom = members.iter().map(|w| w.bbox.y_max).fold(f32::MIN, f32::max);

            let mut cells: Vec<Span> = Vec::new();
            for word in members {
                match cells.last_mut() {
                    Some(cell)
                        if word.bbox.x_min - cell.x_max
                            <= settings.cell_gap * word.bbox.height() =>
                    {
                        cell.text.push(' ');
                        cell.text.push_str(word.text.trim());
                        cell.x_max = cell.x_max.max(word.bbox.x_max);
                    }
                    _ => cells.push(Span {
                        text: word.text.trim().to_string(),
                        x_min: word.bbox.x_min,
                        x_max: word.bbox.x_max,
                    }),
                }
            }

            Row { top, bottom, cells }
        })
        .collect()
}

fn build_grid(rows: &[Row], settings: &TableFinderSettings) -> Option<RawGrid> {
    let mut extents: Vec<(f32, f32)> = rows
        .iter()
        .flat_map(|r| r.cells.iter().map(|c| (c.x_min, c.x_max)))
        .collect();
    extents.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut columns: Vec<(f32, f32)> = Vec::new();
    for (x_min, x_max) in extents {
        match columns.last_mut() {
            Some(col) if x_min <= col.1 => col.1 = col.1.max(x_max),
            _ => columns.push((x_min, x_max)),
        }
    }

    if columns.len() < settings.min_columns {
        return None;
    }

    let grid = rows
        .iter()
        .map(|row| {
            let mut out: Vec<Option<String>> = vec![None; columns.len()];
            for cell in &row.cells {
                let Some(idx) = columns
                    .iter()
                    .position(|(lo, hi)| cell.x_min >= *lo && cell.x_min <= *hi)
                else {
                    continue;
                };
                match &mut out[idx] {
                    Some(existing) => {
                        existing.push(' ');
                        existing.push_str(&cell.text);
                    }
                    slot => *slot = Some(cell.text.clone()),
                }
            }
            out
        })
        .collect();

    Some(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x_min: f32, y_min: f32) -> Word {
        // 10pt text, 6pt per character.
        Word {
            text: text.to_string(),
            bbox: BBox {
                x_min,
                y_min,
                x_max: x_min + 6.0 * text.len() as f32,
                y_max: y_min + 10.0,
            },
        }
    }

    #[test]
    fn two_by_three_table() {
        let words = vec![
            word("Name", 50.0, 100.0),
            word("Qty", 200.0, 100.0),
            word("Price", 300.0, 100.0),
            word("Bolt", 50.0, 114.0),
            word("12", 200.0, 114.0),
            word("0.40", 300.0, 114.0),
        ];
        let grids = find_tables(&words, &TableFinderSettings::default());
        assert_eq!(grids.len(), 1);
        assert_eq!(
            grids[0],
            vec![
                vec![Some("Name".into()), Some("Qty".into()), Some("Price".into())],
                vec![Some("Bolt".into()), Some("12".into()), Some("0.40".into())],
            ]
        );
    }

    #[test]
    fn close_words_share_a_cell() {
        let words = vec![
            word("Part", 50.0, 100.0),
            word("name", 80.0, 100.0),
            word("Qty", 200.0, 100.0),
            word("Hex", 50.0, 114.0),
            word("nut", 72.0, 114.0),
            word("8", 200.0, 114.0),
        ];
        let grids = find_tables(&words, &TableFinderSettings::default());
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0][0], vec![Some("Part name".into()), Some("Qty".into())]);
        assert_eq!(grids[0][1], vec![Some("Hex nut".into()), Some("8".into())]);
    }

    #[test]
    fn single_cell_row_ends_a_region() {
        let words = vec![
            word("A", 50.0, 100.0),
            word("B", 200.0, 100.0),
            word("Note", 50.0, 114.0),
            word("1", 50.0, 128.0),
            word("2", 200.0, 128.0),
        ];
        // Neither side of the note has two tabular rows.
        assert!(find_tables(&words, &TableFinderSettings::default()).is_empty());
    }

    #[test]
    fn missing_cell_is_none() {
        let words = vec![
            word("A", 50.0, 100.0),
            word("B", 200.0, 100.0),
            word("C", 300.0, 100.0),
            word("1", 50.0, 114.0),
            word("3", 300.0, 114.0),
        ];
        let grids = find_tables(&words, &TableFinderSettings::default());
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0][1], vec![Some("1".into()), None, Some("3".into())]);
    }

    #[test]
    fn paragraph_text_is_not_a_table() {
        let words = vec![
            word("This", 50.0, 100.0),
            word("report", 80.0, 100.0),
            word("covers", 122.0, 100.0),
            word("the", 50.0, 114.0),
            word("quarter", 72.0, 114.0),
        ];
        assert!(find_tables(&words, &TableFinderSettings::default()).is_empty());
    }

    #[test]
    fn distant_rows_split_tables() {
        let words = vec![
            word("A", 50.0, 100.0),
            word("B", 200.0, 100.0),
            word("1", 50.0, 114.0),
            word("2", 200.0, 114.0),
            word("C", 50.0, 400.0),
            word("D", 200.0, 400.0),
            word("3", 50.0, 414.0),
            word("4", 200.0, 414.0),
        ];
        let grids = find_tables(&words, &TableFinderSettings::default());
        assert_eq!(grids.len(), 2);
        assert_eq!(grids[1][0], vec![Some("C".into()), Some("D".into())]);
    }
}
