//! Plain text rendering for extraction results.

use crate::model::ExtractionResult;

/// Convert a result to plain text.
///
/// Entries are separated by a blank line; a form feed separates pages.
pub fn to_text(result: &ExtractionResult) -> String {
    let mut output = String::new();
    let mut current_page = None;

    for entry in &result.entries {
        if entry.is_blank() {
            continue;
        }
        match current_page {
            None => {}
            Some(page) if page == entry.page => output.push_str("\n\n"),
            Some(_) => output.push_str("\n\n\u{000C}\n"),
        }
        current_page = Some(entry.page);
        output.push_str(entry.content.trim());
    }

    output
}
