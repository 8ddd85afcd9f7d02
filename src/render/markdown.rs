//! Markdown rendering for extraction results.

use crate::model::{CanonicalLabel, ExtractionEntry, ExtractionResult, ExtractionType};

/// Convert a result to Markdown with default settings.
pub fn to_markdown(result: &ExtractionResult) -> String {
    MarkdownRenderer::new().render(result)
}

/// Markdown renderer.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    page_headings: bool,
    escape_special_chars: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self {
            page_headings: true,
            escape_special_chars: true,
        }
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a `## Page N` heading before each page's entries.
    pub fn with_page_headings(mut self, enabled: bool) -> Self {
        self.page_headings = enabled;
        self
    }

    /// Escape Markdown syntax characters in prose entries.
    pub fn with_escaping(mut self, enabled: bool) -> Self {
        self.escape_special_chars = enabled;
        self
    }

    /// Render a result to Markdown.
    pub fn render(&self, result: &ExtractionResult) -> String {
        let mut output = String::new();
        let mut current_page = None;

        for entry in &result.entries {
            if entry.is_blank() {
                continue;
            }
            if self.page_headings && current_page != Some(entry.page) {
                output.push_str(&format!("## Page {}\n\n", entry.page));
            }
            current_page = Some(entry.page);
            self.render_entry(&mut output, entry);
        }

        output.trim_end().to_string()
    }

    fn render_entry(&self, output: &mut String, entry: &ExtractionEntry) {
        let content = entry.content.trim();
        match entry.kind {
            ExtractionType::Table => {
                if content.starts_with('|') {
                    output.push_str(content);
                    output.push_str("\n\n");
                } else {
                    push_fenced(output, "text", content);
                }
            }
            ExtractionType::Equation => {
                output.push_str("$$\n");
                output.push_str(content);
                output.push_str("\n$$\n\n");
            }
            ExtractionType::Code => push_fenced(output, "", content),
            ExtractionType::Figure => {
                for line in content.lines() {
                    output.push_str("> ");
                    output.push_str(line);
                    output.push('\n');
                }
                output.push('\n');
            }
            _ => self.render_prose(output, entry.label, content),
        }
    }

    fn render_prose(&self, output: &mut String, label: CanonicalLabel, content: &str) {
        let text = if self.escape_special_chars {
            escape_markdown(content)
        } else {
            content.to_string()
        };
        match label {
            CanonicalLabel::Title => {
                output.push_str("### ");
                output.push_str(&text.replace('\n', " "));
            }
            CanonicalLabel::ListItem => {
                let item = text.trim_start_matches(['-', '•', '*', '\\']).trim_start();
                output.push_str("- ");
                output.push_str(item);
            }
            CanonicalLabel::Caption => {
                output.push('*');
                output.push_str(&text);
                output.push('*');
            }
            _ => output.push_str(&text),
        }
        output.push_str("\n\n");
    }
}

fn push_fenced(output: &mut String, info: &str, content: &str) {
    output.push_str("```");
    output.push_str(info);
    output.push('\n');
    output.push_str(content);
    output.push_str("\n```\n\n");
}

/// Escape characters that would otherwise be read as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
