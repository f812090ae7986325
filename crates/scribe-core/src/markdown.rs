//! Markdown rendering for blog artifacts.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{BlogPost, BlogSection};

static HEADING_NO_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(#+)([^\s#])").unwrap());

static DOUBLED_HASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+[ \t]+(#+)").unwrap());

impl BlogPost {
    /// Render the post as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = format!("# {}\n\n", self.title);

        for section in &self.sections {
            match section {
                BlogSection::Heading { level, text } => {
                    let level = (*level).clamp(1, 6) as usize;
                    md.push_str(&format!("{} {}\n\n", "#".repeat(level), text));
                }
                BlogSection::Paragraph { text } => {
                    md.push_str(text);
                    md.push_str("\n\n");
                }
                BlogSection::Blockquote { text } => {
                    for line in text.lines() {
                        md.push_str(&format!("> {}\n", line));
                    }
                    md.push('\n');
                }
                BlogSection::List { ordered, items } => {
                    for (i, item) in items.iter().enumerate() {
                        if *ordered {
                            md.push_str(&format!("{}. {}\n", i + 1, item));
                        } else {
                            md.push_str(&format!("- {}\n", item));
                        }
                    }
                    md.push('\n');
                }
                BlogSection::Code { language, code } => {
                    md.push_str(&format!("```{}\n{}\n```\n\n", language, code));
                }
                BlogSection::Table { headers, rows } => {
                    md.push_str(&format!("| {} |\n", headers.join(" | ")));
                    md.push_str(&format!("|{}\n", " --- |".repeat(headers.len())));
                    for row in rows {
                        md.push_str(&format!("| {} |\n", row.join(" | ")));
                    }
                    md.push('\n');
                }
                BlogSection::Image { src, alt, caption } => {
                    md.push_str(&format!("![{}]({})\n", alt, src));
                    if let Some(caption) = caption.as_deref().filter(|c| !c.is_empty()) {
                        md.push_str(&format!("*{}*\n", caption));
                    }
                    md.push('\n');
                }
                BlogSection::Unknown => {}
            }
        }

        clean_markdown(&md)
    }
}

/// Tidy model-written Markdown.
///
/// Turns literal `\n` sequences into newlines, inserts the missing space in
/// headings like `##Title`, collapses `## ##` runs, and strips trailing
/// whitespace per line.
pub fn clean_markdown(text: &str) -> String {
    let text = text.replace("\\n", "\n");
    let text = HEADING_NO_SPACE.replace_all(&text, "$1 $2");
    let text = DOUBLED_HASHES.replace_all(&text, "$1");

    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
