use serde::Serialize;

use crate::error::TabliftError;

/// Pages selected by a page selector string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSet {
    /// Inclusive range. A reversed range selects nothing.
    Range { start: u32, end: u32 },
    /// Explicit pages in selector order, duplicates kept.
    List(Vec<u32>),
}

impl PageSet {
    /// Pages of a document with `page_count` pages, in selector order.
    /// Page 0 and pages past the end are skipped.
    pub fn resolve(&self, page_count: usize) -> Vec<usize> {
        let exists = |p: &usize| *p >= 1 && *p <= page_count;
        match self {
            PageSet::Range { start, end } => {
                let start = (*start as usize).max(1);
                let end = (*end as usize).min(page_count);
                (start..=end).collect()
            }
            PageSet::List(pages) => pages.iter().map(|p| *p as usize).filter(exists).collect(),
        }
    }
}

/// Parse a page selector.
///
/// - `"all"` (any case) or empty -> `None` (every page)
/// - `"3-7"` -> inclusive range; malformed numbers are an error
/// - `"1,3,x"` -> numeric tokens in order, others dropped
/// - `"4"` -> single page
/// - anything else -> `None`
pub fn parse_pages(selector: &str) -> Result<Option<PageSet>, TabliftError> {
    let s = selector.trim();

    if s.is_empty() || s.eq_ignore_ascii_case("all") {
        return Ok(None);
    }

    if let Some((start, end)) = s.split_once('-') {
        let start = parse_bound(selector, start)?;
        let end = parse_bound(selector, end)?;
        return Ok(Some(PageSet::Range { start, end }));
    }

    if s.contains(',') {
        let pages = s
            .split(',')
            .map(str::trim)
            .filter(|token| is_digits(token))
            .filter_map(|token| token.parse::<u32>().ok())
            .collect();
        return Ok(Some(PageSet::List(pages)));
    }

    if is_digits(s) {
        if let Ok(page) = s.parse::<u32>() {
            return Ok(Some(PageSet::List(vec![page])));
        }
    }

    Ok(None)
}

fn parse_bound(selector: &str, bound: &str) -> Result<u32, TabliftError> {
    bound
        .trim()
        .parse::<u32>()
        .map_err(|e| TabliftError::PageRange {
            selector: selector.to_string(),
            reason: format!("'{}' is not a page number: {}", bound.trim(), e),
        })
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(selector: &str) -> Option<PageSet> {
        parse_pages(selector).unwrap()
    }

    #[test]
    fn all_and_empty_mean_every_page() {
        assert_eq!(pages("all"), None);
        assert_eq!(pages("ALL"), None);
        assert_eq!(pages("All"), None);
        assert_eq!(pages(""), None);
        assert_eq!(pages("   "), None);
    }

    #[test]
    fn range_is_inclusive() {
        assert_eq!(pages("2-5"), Some(PageSet::Range { start: 2, end: 5 }));
        assert_eq!(pages(" 1 - 3 ").unwrap().resolve(10), vec![1, 2, 3]);
        assert_eq!(pages("4-4").unwrap().resolve(10), vec![4]);
    }

    #[test]
    fn range_resolves_to_every_page_between_bounds() {
        for (a, b) in [(1u32, 1u32), (1, 6), (3, 9), (7, 8)] {
            let set = pages(&format!("{a}-{b}")).unwrap();
            let expected: Vec<usize> = (a as usize..=b as usize).collect();
            assert_eq!(set.resolve(100), expected);
        }
    }

    #[test]
    fn malformed_range_is_an_error() {
        assert!(matches!(
            parse_pages("1-end"),
            Err(TabliftError::PageRange { .. })
        ));
        assert!(parse_pages("a-3").is_err());
        assert!(parse_pages("-3").is_err());
        // Range detection wins over list detection.
        assert!(parse_pages("1-3,5").is_err());
    }

    #[test]
    fn list_drops_non_numeric_tokens_and_keeps_duplicates() {
        assert_eq!(pages("1,x,3,3"), Some(PageSet::List(vec![1, 3, 3])));
        assert_eq!(pages(" 2 , ,5"), Some(PageSet::List(vec![2, 5])));
        assert_eq!(pages("x,y"), Some(PageSet::List(vec![])));
    }

    #[test]
    fn single_page() {
        assert_eq!(pages("7"), Some(PageSet::List(vec![7])));
    }

    #[test]
    fn anything_else_means_every_page() {
        assert_eq!(pages("first"), None);
        assert_eq!(pages("+3"), None);
    }

    #[test]
    fn resolve_skips_missing_pages() {
        assert_eq!(PageSet::List(vec![0, 2, 9, 2]).resolve(3), vec![2, 2]);
        assert_eq!(PageSet::Range { start: 0, end: 9 }.resolve(3), vec![1, 2, 3]);
        assert!(PageSet::Range { start: 5, end: 2 }.resolve(10).is_empty());
    }
}
