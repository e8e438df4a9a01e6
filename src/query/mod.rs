// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query flow: retrieval, prompt assembly, generation and the interactive loop

pub mod interactive;
pub mod letter;
pub mod prompt;
pub mod retriever;

pub use interactive::{is_exit_command, run_loop};
pub use letter::{GeneratedLetter, LetterGenerator};
pub use prompt::{build_prompt, evidence_label};
pub use retriever::{open_retriever, Evidence, Retriever};
