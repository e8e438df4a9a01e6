// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for letter generation

use super::retriever::Evidence;

const PREAMBLE: &str = "\
You are a clinical-writing assistant specializing in Letters of Medical Necessity (LOMNs).
Write clear, insurer-facing, evidence-grounded letters using the following rules:

- Use clinical specificity and appropriate justification.
- Incorporate patterns and reasoning from the retrieved evidence, but DO NOT copy text.
- Address payer requirements, diagnosis, treatment history, level of care, and consequences of denial.
- Maintain a professional and formal tone.";

const CLOSING: &str = "Now write the LOMN in full.";

/// Label line for the `i`-th evidence item (1-based).
pub fn evidence_label(i: usize, evidence: &Evidence) -> String {
    format!(
        "[E{}] category={}, diagnosis={}, payer={}",
        i, evidence.metadata.category, evidence.metadata.diagnosis, evidence.metadata.payer
    )
}

/// Renders the full generation prompt.
pub fn build_prompt(request: &str, evidence: &[Evidence]) -> String {
    let evidence_text = evidence
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}\n{}\n", evidence_label(i + 1, item), item.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut prompt = String::with_capacity(PREAMBLE.len() + request.len() + evidence_text.len() + 128);
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\nREQUEST:\n");
    prompt.push_str(request);
    prompt.push_str("\n\nEVIDENCE FOR CONTEXT (do not cite explicitly):\n");
    prompt.push_str(&evidence_text);
    prompt.push_str("\n\n");
    prompt.push_str(CLOSING);
    prompt.push('\n');
    prompt
}
