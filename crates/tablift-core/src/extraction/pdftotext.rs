use std::path::Path;
use std::process::Command;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::TabliftError;
use crate::extraction::table::{find_tables, BBox, TableFinderSettings, Word};
use crate::extraction::{DocumentSource, PdfDocument};
use crate::model::RawGrid;

/// Document backend using pdftotext (from poppler-utils).
///
/// Opening a document runs `pdftotext -bbox-layout`, which reports every
/// word with its bounding box, grouped into lines and pages.
pub struct PdftotextSource {
    command: String,
    settings: TableFinderSettings,
}

impl PdftotextSource {
    pub fn new(command: impl Into<String>, settings: TableFinderSettings) -> Self {
        PdftotextSource {
            command: command.into(),
            settings,
        }
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available(command: &str) -> bool {
        Command::new(command)
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextSource {
    fn default() -> Self {
        Self::new("pdftotext", TableFinderSettings::default())
    }
}

impl DocumentSource for PdftotextSource {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, TabliftError> {
        let output = Command::new(&self.command)
            .arg("-bbox-layout")
            .arg(path)
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TabliftError::PdftotextNotFound
                } else {
                    TabliftError::Extraction(format!("pdftotext -bbox-layout failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TabliftError::PdftotextFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        let document = PdftotextDocument::from_xml(&xml, self.settings.clone())?;
        debug!(
            path = %path.display(),
            pages = document.pages.len(),
            "opened document with pdftotext"
        );
        Ok(Box::new(document))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

#[derive(Debug, Clone, Default)]
struct PageLayout {
    words: Vec<Word>,
    lines: Vec<String>,
}

/// A PDF parsed from `pdftotext -bbox-layout` output.
#[derive(Debug, Clone)]
pub struct PdftotextDocument {
    pages: Vec<PageLayout>,
    settings: TableFinderSettings,
}

impl PdftotextDocument {
    pub fn from_xml(xml: &str, settings: TableFinderSettings) -> Result<Self, TabliftError> {
        Ok(PdftotextDocument {
            pages: parse_bbox_layout(xml)?,
            settings,
        })
    }

    fn page(&self, page_number: usize) -> Result<&PageLayout, TabliftError> {
        page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .ok_or_else(|| {
                TabliftError::Extraction(format!(
                    "page {} out of range (document has {} pages)",
                    page_number,
                    self.pages.len()
                ))
            })
    }
}

impl PdfDocument for PdftotextDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_tables(&self, page_number: usize) -> Result<Vec<RawGrid>, TabliftError> {
        let page = self.page(page_number)?;
        Ok(find_tables(&page.words, &self.settings))
    }

    fn page_text(&self, page_number: usize) -> Result<Option<String>, TabliftError> {
        let page = self.page(page_number)?;
        if page.lines.is_empty() {
            Ok(None)
        } else {
            Ok(Some(page.lines.join("\n")))
        }
    }
}

fn parse_bbox_layout(xml: &str) -> Result<Vec<PageLayout>, TabliftError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages: Vec<PageLayout> = Vec::new();
    let mut line_words: Vec<String> = Vec::new();
    let mut word_bbox: Option<BBox> = None;
    let mut word_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"page" => pages.push(PageLayout::default()),
                b"line" => line_words.clear(),
                b"word" => {
                    word_bbox = parse_bbox(e);
                    word_text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"page" => {
                pages.push(PageLayout::default());
            }
            Ok(Event::Text(ref t)) if word_bbox.is_some() => {
                let text = t
                    .unescape()
                    .map_err(|e| TabliftError::Extraction(format!("bad word text: {}", e)))?;
                word_text.push_str(&text);
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"word" => {
                    let text = word_text.trim();
                    if let (Some(bbox), Some(page)) = (word_bbox.take(), pages.last_mut()) {
                        if !text.is_empty() {
                            page.words.push(Word {
                                text: text.to_string(),
                                bbox,
                            });
                            line_words.push(text.to_string());
                        }
                    }
                }
                b"line" => {
                    if let Some(page) = pages.last_mut() {
                        if !line_words.is_empty() {
                            page.lines.push(line_words.join(" "));
                        }
                    }
                    line_words.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(TabliftError::Extraction(format!(
                    "malformed pdftotext output at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(pages)
}

fn parse_bbox(tag: &BytesStart<'_>) -> Option<BBox> {
    Some(BBox {
        x_min: parse_attr_f32(tag, b"xMin")?,
        y_min: parse_attr_f32(tag, b"yMin")?,
        x_max: parse_attr_f32(tag, b"xMax")?,
        y_max: parse_attr_f32(tag, b"yMax")?,
    })
}

fn parse_attr_f32(tag: &BytesStart<'_>, name: &[u8]) -> Option<f32> {
    tag.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| std::str::from_utf8(&a.value).ok()?.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PAGES: &str = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
<title>report</title>
<meta name="Producer" content="GPL Ghostscript"/>
</head>
<body>
<doc>
  <page width="612.000000" height="792.000000">
    <flow>
      <block xMin="50.0" yMin="100.0" xMax="330.0" yMax="124.0">
        <line xMin="50.0" yMin="100.0" xMax="330.0" yMax="110.0">
          <word xMin="50.0" yMin="100.0" xMax="74.0" yMax="110.0">Item</word>
          <word xMin="200.0" yMin="100.0" xMax="218.0" yMax="110.0">Qty</word>
        </line>
        <line xMin="50.0" yMin="114.0" xMax="330.0" yMax="124.0">
          <word xMin="50.0" yMin="114.0" xMax="86.0" yMax="124.0">M&amp;Ms</word>
          <word xMin="200.0" yMin="114.0" xMax="206.0" yMax="124.0">3</word>
        </line>
      </block>
    </flow>
  </page>
  <page width="612.000000" height="792.000000">
  </page>
</doc>
</body>
</html>
"#;

    fn document() -> PdftotextDocument {
        PdftotextDocument::from_xml(TWO_PAGES, TableFinderSettings::default()).unwrap()
    }

    #[test]
    fn parses_pages_lines_and_words() {
        let doc = document();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[0].words.len(), 4);
        assert_eq!(doc.pages[0].words[2].text, "M&Ms");
        assert_eq!(doc.pages[0].words[2].bbox.x_max, 86.0);
        assert_eq!(doc.pages[0].lines, vec!["Item Qty", "M&Ms 3"]);
        assert!(doc.pages[1].words.is_empty());
    }

    #[test]
    fn page_text_joins_lines() {
        let doc = document();
        assert_eq!(doc.page_text(1).unwrap().as_deref(), Some("Item Qty\nM&Ms 3"));
        assert_eq!(doc.page_text(2).unwrap(), None);
        assert!(doc.page_text(3).is_err());
        assert!(doc.page_text(0).is_err());
    }

    #[test]
    fn page_tables_uses_word_geometry() {
        let doc = document();
        let grids = doc.page_tables(1).unwrap();
        assert_eq!(grids.len(), 1);
        assert_eq!(
            grids[0],
            vec![
                vec![Some("Item".to_string()), Some("Qty".to_string())],
                vec![Some("M&Ms".to_string()), Some("3".to_string())],
            ]
        );
        assert!(doc.page_tables(2).unwrap().is_empty());
    }

    #[test]
    fn malformed_output_is_an_extraction_error() {
        let result = PdftotextDocument::from_xml(
            "<doc><page><word xMin=\"1\">x</line></page></doc>",
            TableFinderSettings::default(),
        );
        assert!(matches!(result, Err(TabliftError::Extraction(_))));
    }
}
