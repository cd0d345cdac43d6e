use tablift_core::pages::PageSet;
use tablift_core::{AttemptOutcome, Conversion, SheetContents};

use crate::commands::capabilities::CapabilityReport;
use crate::commands::pages::PageSelection;

pub fn print_conversion(conversion: &Conversion) {
    println!(
        "Wrote {} table(s) to {} using {}",
        conversion.tables,
        conversion.destination.display(),
        conversion.strategy
    );

    let skipped: Vec<_> = conversion
        .attempts
        .iter()
        .filter(|a| !matches!(a.outcome, AttemptOutcome::Succeeded { .. }))
        .collect();
    if skipped.is_empty() {
        return;
    }

    println!();
    for attempt in skipped {
        let detail = match &attempt.outcome {
            AttemptOutcome::Empty => "no tables found".to_string(),
            AttemptOutcome::Failed { message } => format!("failed: {message}"),
            AttemptOutcome::Unavailable => "not available".to_string(),
            AttemptOutcome::Succeeded { tables } => format!("{tables} table(s)"),
        };
        println!("  {:<14} {}", attempt.strategy.as_str(), detail);
    }
}

pub fn print_capabilities(report: &CapabilityReport) {
    let rows = [
        ("camelot", report.camelot),
        ("tabula", report.tabula),
        ("pdfplumber", report.pdfplumber),
        ("text_fallback", report.text_fallback),
    ];
    for (name, available) in rows {
        let status = if available { "available" } else { "missing" };
        println!("  {:<14} {}", name, status);
    }
    if let Some(ref jar) = report.tabula_jar {
        println!("\n  tabula jar: {}", jar.display());
    }
}

pub fn print_pages(selection: &PageSelection) {
    let description = match &selection.pages {
        None => "all pages".to_string(),
        Some(PageSet::Range { start, end }) if start > end => {
            format!("pages {start} to {end} (empty range)")
        }
        Some(PageSet::Range { start, end }) => format!("pages {start} to {end}"),
        Some(PageSet::List(pages)) if pages.is_empty() => "no pages".to_string(),
        Some(PageSet::List(pages)) => format!("pages {}", join(pages)),
    };
    println!("  {:?} -> {}", selection.selector, description);

    if let Some(ref resolved) = selection.resolved {
        if resolved.is_empty() {
            println!("  resolves to no pages");
        } else {
            println!("  resolves to {}", join(resolved));
        }
    }
}

pub fn print_sheets(sheets: &[SheetContents]) {
    for (i, sheet) in sheets.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("=== {} ({} row(s)) ===\n", sheet.name, sheet.rows.len());
        for row in &sheet.rows {
            println!("  {}", row.join(" | "));
        }
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
