use serde::Serialize;

use tablift_core::{parse_pages, PageSet, TabliftError};

use crate::output;

#[derive(Debug, Serialize)]
pub struct PageSelection {
    pub selector: String,
    /// `None` when every page is selected.
    pub pages: Option<PageSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<Vec<usize>>,
}

pub fn run(
    selector: &str,
    page_count: Option<usize>,
    output_format: &str,
) -> Result<(), TabliftError> {
    let pages = parse_pages(selector)?;
    let resolved = page_count.map(|count| match &pages {
        Some(set) => set.resolve(count),
        None => (1..=count).collect(),
    });

    let selection = PageSelection {
        selector: selector.to_string(),
        pages,
        resolved,
    };

    match output_format {
        "json" => output::json::print(&selection)?,
        _ => output::table::print_pages(&selection),
    }
    Ok(())
}
