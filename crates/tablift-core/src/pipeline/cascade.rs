use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::TabliftError;
use crate::extraction::geometry::GeometryExtractor;
use crate::extraction::{DocumentSource, ExtractOptions, TableExtractor};
use crate::model::{ExtractedTable, ExtractionResult, Strategy};
use crate::pages::parse_pages;
use crate::pipeline::outcome::{Attempt, AttemptOutcome};
use crate::pipeline::{ConvertRequest, Toolkit};

/// Header of the single table produced by the text fallback.
pub const TEXT_FALLBACK_HEADER: &str = "Extracted text";

/// Run the extraction cascade without writing anything.
///
/// Order: grid (Camelot), layout (Tabula), cell geometry, text fallback.
/// The external strategies run only when the requested method allows them
/// and the toolkit reports them available. The first strategy producing at
/// least one table wins. Failures along the way are recorded in the
/// returned attempts and, when nothing succeeds, in `NoTablesFound`.
pub fn extract(
    request: &ConvertRequest,
    toolkit: &Toolkit,
) -> Result<(ExtractionResult, Vec<Attempt>), TabliftError> {
    let options = ExtractOptions {
        pages: request.pages.clone(),
        page_set: parse_pages(&request.pages)?,
        flavor: request.grid_flavor,
    };
    let source = request.source.as_path();
    let mut attempts = Vec::new();

    let external: [(&dyn TableExtractor, bool); 2] = [
        (toolkit.grid.as_ref(), toolkit.capabilities.camelot),
        (toolkit.layout.as_ref(), toolkit.capabilities.tabula),
    ];
    for (extractor, available) in external {
        let strategy = extractor.strategy();
        if !request.method.permits(strategy) {
            debug!(%strategy, method = %request.method, "not requested");
            continue;
        }
        if !available {
            debug!(%strategy, "not available in this environment");
            continue;
        }
        if let Some(result) = attempt(extractor, source, &options, &mut attempts) {
            return Ok((result, attempts));
        }
    }

    let geometry = GeometryExtractor::new(toolkit.documents.as_ref());
    if let Some(result) = attempt(&geometry, source, &options, &mut attempts) {
        return Ok((result, attempts));
    }

    let text = TextFallback {
        documents: toolkit.documents.as_ref(),
    };
    if let Some(result) = attempt(&text, source, &options, &mut attempts) {
        return Ok((result, attempts));
    }

    let errors: Vec<String> = attempts.iter().filter_map(Attempt::failure_line).collect();
    warn!(attempts = attempts.len(), "no strategy produced tables");
    Err(TabliftError::NoTablesFound { errors })
}

/// Run one strategy and record what happened.
fn attempt(
    extractor: &dyn TableExtractor,
    source: &Path,
    options: &ExtractOptions,
    attempts: &mut Vec<Attempt>,
) -> Option<ExtractionResult> {
    let strategy = extractor.strategy();
    debug!(%strategy, pages = %options.pages, "attempting strategy");

    let outcome = match extractor.extract(source, options) {
        Ok(tables) => match ExtractionResult::new(strategy, tables) {
            Some(result) => {
                info!(%strategy, tables = result.tables().len(), "strategy succeeded");
                attempts.push(Attempt::new(
                    strategy,
                    AttemptOutcome::Succeeded {
                        tables: result.tables().len(),
                    },
                ));
                return Some(result);
            }
            None => {
                debug!(%strategy, "strategy found nothing");
                AttemptOutcome::Empty
            }
        },
        Err(TabliftError::StrategyUnavailable { .. }) => {
            debug!(%strategy, "strategy unavailable at run time");
            AttemptOutcome::Unavailable
        }
        Err(e) => {
            warn!(%strategy, error = %e, "strategy failed");
            AttemptOutcome::Failed {
                message: failure_message(e),
            }
        }
    };

    attempts.push(Attempt::new(strategy, outcome));
    None
}

/// Strategy errors already carry their label; keep only the message.
fn failure_message(error: TabliftError) -> String {
    match error {
        TabliftError::Strategy { message, .. } => message,
        other => other.to_string(),
    }
}

/// Last resort: every non-empty line of text in the document, all pages,
/// as one single-column table.
struct TextFallback<'a> {
    documents: &'a dyn DocumentSource,
}

impl TableExtractor for TextFallback<'_> {
    fn extract(
        &self,
        path: &Path,
        _options: &ExtractOptions,
    ) -> Result<Vec<ExtractedTable>, TabliftError> {
        let document = self.documents.open(path)?;

        let mut rows = Vec::new();
        for page in 1..=document.page_count() {
            let Some(text) = document.page_text(page)? else {
                continue;
            };
            rows.extend(
                text.lines()
                    .filter(|line| !line.is_empty())
                    .map(|line| vec![line.to_string()]),
            );
        }

        if rows.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![ExtractedTable::new(
            Some(vec![TEXT_FALLBACK_HEADER.to_string()]),
            rows,
        )])
    }

    fn strategy(&self) -> Strategy {
        Strategy::TextFallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::PdfDocument;
    use crate::model::RawGrid;

    struct TextPages(Vec<Option<String>>);

    impl PdfDocument for TextPages {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_tables(&self, _page_number: usize) -> Result<Vec<RawGrid>, TabliftError> {
            Ok(vec![])
        }

        fn page_text(&self, page_number: usize) -> Result<Option<String>, TabliftError> {
            Ok(self.0[page_number - 1].clone())
        }
    }

    struct Source(Vec<Option<String>>);

    impl DocumentSource for Source {
        fn open(&self, _path: &Path) -> Result<Box<dyn PdfDocument>, TabliftError> {
            Ok(Box::new(TextPages(self.0.clone())))
        }

        fn backend_name(&self) -> &str {
            "mock"
        }
    }

    fn fallback(source: &Source) -> Vec<ExtractedTable> {
        TextFallback { documents: source }
            .extract(Path::new("a.pdf"), &ExtractOptions::default())
            .unwrap()
    }

    #[test]
    fn text_fallback_keeps_whitespace_only_lines() {
        let source = Source(vec![
            Some("Heading\n\n   \nBody".to_string()),
            None,
            Some("Tail".to_string()),
        ]);
        let tables = fallback(&source);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].header(), Some(&[TEXT_FALLBACK_HEADER.to_string()][..]));
        let lines: Vec<&str> = tables[0].rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(lines, vec!["Heading", "   ", "Body", "Tail"]);
    }

    #[test]
    fn text_fallback_without_text_finds_nothing() {
        let source = Source(vec![None, Some(String::new())]);
        assert!(fallback(&source).is_empty());
    }
}
