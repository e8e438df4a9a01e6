// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line-oriented request loop shared by `lomn query` and `lomn generate`

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

const EXIT_COMMANDS: [&str; 3] = ["q", "quit", "exit"];

/// True for the literal words that end the loop.
pub fn is_exit_command(line: &str) -> bool {
    EXIT_COMMANDS.contains(&line.trim())
}

/// Reads one request per line and hands it to `handle`.
///
/// Stops on an exit word or end of input and returns the number of requests
/// handled. Blank lines are skipped. An error from `handle` ends the loop and
/// is returned to the caller. An empty `prompt` writes nothing of its own, so
/// the output holds only what `handle` writes.
pub fn run_loop<R, W, F>(mut input: R, output: &mut W, prompt: &str, mut handle: F) -> Result<usize>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str, &mut W) -> Result<()>,
{
    let mut handled = 0;
    let mut line = String::new();
    loop {
        if !prompt.is_empty() {
            write!(output, "\n{}", prompt)?;
            output.flush()?;
        }

        line.clear();
        let read = input.read_line(&mut line).context("Failed to read request")?;
        if read == 0 {
            if !prompt.is_empty() {
                writeln!(output)?;
            }
            break;
        }

        let request = line.trim();
        if is_exit_command(request) {
            break;
        }
        if request.is_empty() {
            continue;
        }

        handle(request, output)?;
        handled += 1;
    }
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn exit_words() {
        assert!(is_exit_command("q"));
        assert!(is_exit_command("  quit\n"));
        assert!(is_exit_command("exit"));
        assert!(!is_exit_command("Quit"));
        assert!(!is_exit_command("quit now"));
    }

    #[test]
    fn loop_stops_at_exit_word() {
        let input = Cursor::new("first\n\nsecond\nq\nthird\n");
        let mut output = Vec::new();
        let mut seen = Vec::new();

        let handled = run_loop(input, &mut output, "> ", |request, out| {
            seen.push(request.to_string());
            writeln!(out, "handled {}", request)?;
            Ok(())
        })
        .unwrap();

        assert_eq!(handled, 2);
        assert_eq!(seen, vec!["first", "second"]);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("handled first"));
        assert!(!text.contains("third"));
    }

    #[test]
    fn empty_prompt_adds_no_output() {
        let input = Cursor::new("a\n\nb\nexit\n");
        let mut output = Vec::new();
        run_loop(input, &mut output, "", |request, out| {
            writeln!(out, "{{\"r\":\"{}\"}}", request)?;
            Ok(())
        })
        .unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "{\"r\":\"a\"}\n{\"r\":\"b\"}\n");
    }

    #[test]
    fn loop_stops_at_end_of_input() {
        let input = Cursor::new("only request");
        let mut output = Vec::new();
        let handled = run_loop(input, &mut output, "> ", |_, _| Ok(())).unwrap();
        assert_eq!(handled, 1);
    }

    #[test]
    fn handler_error_ends_loop() {
        let input = Cursor::new("boom\nnext\n");
        let mut output = Vec::new();
        let mut calls = 0;
        let result = run_loop(input, &mut output, "> ", |_, _| {
            calls += 1;
            anyhow::bail!("backend unreachable")
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
