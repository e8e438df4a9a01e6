//! Output and color utilities for consistent terminal formatting
//!
//! Provides shared color functions respecting NO_COLOR environment variable.

use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

use crate::query::{evidence_label, Evidence, GeneratedLetter};

/// Check if colors should be used (respects NO_COLOR env var)
pub fn use_colors() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Colorize section heading (bold cyan)
pub fn colorize_heading(text: &str, use_color: bool) -> String {
    if use_color {
        text.cyan().bold().to_string()
    } else {
        text.to_string()
    }
}

/// Colorize evidence label (yellow)
pub fn colorize_label(text: &str, use_color: bool) -> String {
    if use_color {
        text.yellow().to_string()
    } else {
        text.to_string()
    }
}

/// Colorize chunk preview (dimmed)
pub fn colorize_context(text: &str, use_color: bool) -> String {
    if use_color {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

/// Print a value as JSON on stdout (pretty unless `compact`)
pub fn print_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> anyhow::Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", rendered);
    Ok(())
}

/// First `max_chars` characters of `text` followed by "...".
pub fn preview(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}

/// Writes the numbered evidence list.
pub fn write_evidence<W: Write>(
    out: &mut W,
    evidence: &[Evidence],
    preview_chars: usize,
    use_color: bool,
) -> io::Result<()> {
    for (i, item) in evidence.iter().enumerate() {
        let label = format!(
            "{} id={} (distance {:.4})",
            evidence_label(i + 1, item),
            item.metadata.id,
            item.distance
        );
        writeln!(out, "{}", colorize_label(&label, use_color))?;
        writeln!(
            out,
            "{}\n",
            colorize_context(&preview(&item.text, preview_chars), use_color)
        )?;
    }
    Ok(())
}

/// Writes a generated letter followed by the evidence used.
pub fn write_letter<W: Write>(
    out: &mut W,
    letter: &GeneratedLetter,
    preview_chars: usize,
    use_color: bool,
) -> io::Result<()> {
    writeln!(
        out,
        "\n{}\n",
        colorize_heading("========== GENERATED LOMN ==========", use_color)
    )?;
    writeln!(out, "{}", letter.text)?;
    writeln!(
        out,
        "\n{}\n",
        colorize_heading("========== EVIDENCE USED ===========", use_color)
    )?;
    write_evidence(out, &letter.evidence, preview_chars, use_color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::DocumentMetadata;

    fn evidence() -> Evidence {
        Evidence {
            rank: 1,
            distance: 0.25,
            text: "abcdefghij".to_string(),
            metadata: DocumentMetadata {
                id: "7".to_string(),
                category: "behavioral".to_string(),
                diagnosis: "MDD".to_string(),
                payer: "Aetna".to_string(),
            },
        }
    }

    #[test]
    fn preview_truncates_by_chars() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("éé", 5), "éé...");
    }

    #[test]
    fn letter_output_without_color() {
        let letter = GeneratedLetter {
            text: "Dear reviewer".to_string(),
            evidence: vec![evidence()],
            prompt: String::new(),
        };
        let mut out = Vec::new();
        write_letter(&mut out, &letter, 4, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        let letter_at = text.find("Dear reviewer").unwrap();
        let evidence_at = text.find("EVIDENCE USED").unwrap();
        assert!(letter_at < evidence_at);
        assert!(text.contains("[E1] category=behavioral, diagnosis=MDD, payer=Aetna id=7"));
        assert!(text.contains("abcd...\n"));
    }
}
