//! Interactive yes/no selection.
//!
//! Answer parsing is pure; the prompt loop works over any `BufRead`/`Write`
//! pair so tests can drive it without a terminal.

use crate::sheet::BookRecord;
use std::io::{self, BufRead, Write};
use tracing::debug;

const YES_ANSWERS: &[&str] = &["", "y", "ye", "yes"];
const NO_ANSWERS: &[&str] = &["n", "no"];

/// Prompt shown for every candidate book
pub const ADD_PROMPT: &str = "Add to download list [yes]? ";

/// Interpret one line of user input.
///
/// Returns `None` when the answer is neither yes nor no and the user should
/// be asked again. An empty answer means yes. Only the line ending is
/// stripped, so padded answers such as `" y "` are asked again.
pub fn parse_confirmation(input: &str) -> Option<bool> {
    let answer = input.trim_end_matches(['\r', '\n']).to_lowercase();
    if YES_ANSWERS.contains(&answer.as_str()) {
        Some(true)
    } else if NO_ANSWERS.contains(&answer.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Ask until a yes/no answer is given.
///
/// End of input is taken as "no".
pub fn confirm_yes_no<R: BufRead, W: Write>(
    message: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    loop {
        write!(output, "{}", message)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            debug!("End of input while prompting, answering no");
            writeln!(output)?;
            return Ok(false);
        }

        match parse_confirmation(&line) {
            Some(answer) => return Ok(answer),
            None => writeln!(output, "Please respond with 'yes' or 'no'.")?,
        }
    }
}

/// Show each title and keep the books the user confirms.
pub fn select_interactively<R: BufRead, W: Write>(
    books: Vec<BookRecord>,
    input: &mut R,
    output: &mut W,
) -> io::Result<Vec<BookRecord>> {
    let mut selected = Vec::with_capacity(books.len());
    for book in books {
        writeln!(output, "{}", book.title)?;
        if confirm_yes_no(ADD_PROMPT, input, output)? {
            selected.push(book);
        }
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn book(title: &str) -> BookRecord {
        BookRecord {
            title: title.to_string(),
            author: String::new(),
            isbn: String::new(),
            topic: "Math".to_string(),
            url: String::new(),
        }
    }

    #[test]
    fn test_yes_answers() {
        for input in ["", "\n", "y", "ye", "yes", "YES", "Ye", "y\r\n"] {
            assert_eq!(parse_confirmation(input), Some(true), "input {:?}", input);
        }
    }

    #[test]
    fn test_no_answers() {
        for input in ["n", "no", "NO", "No\n"] {
            assert_eq!(parse_confirmation(input), Some(false), "input {:?}", input);
        }
    }

    #[test]
    fn test_invalid_answers() {
        for input in ["maybe", "yess", "nope", "0", " y ", " no\n", "\ty"] {
            assert_eq!(parse_confirmation(input), None, "input {:?}", input);
        }
    }

    #[test]
    fn test_reprompts_until_valid() -> io::Result<()> {
        let mut input = Cursor::new("what\nhuh\nn\n");
        let mut output = Vec::new();
        assert!(!confirm_yes_no("Add? ", &mut input, &mut output)?);

        let shown = String::from_utf8_lossy(&output);
        assert_eq!(shown.matches("Add? ").count(), 3);
        assert_eq!(shown.matches("Please respond with 'yes' or 'no'.").count(), 2);
        Ok(())
    }

    #[test]
    fn test_empty_line_is_yes() -> io::Result<()> {
        let mut input = Cursor::new("\n");
        assert!(confirm_yes_no("Add? ", &mut input, &mut Vec::new())?);
        Ok(())
    }

    #[test]
    fn test_eof_is_no() -> io::Result<()> {
        let mut input = Cursor::new("");
        assert!(!confirm_yes_no("Add? ", &mut input, &mut Vec::new())?);
        Ok(())
    }

    #[test]
    fn test_select_interactively() -> io::Result<()> {
        let books = vec![book("Algebra"), book("Topology"), book("Geometry")];
        let mut input = Cursor::new("yes\nno\n\n");
        let mut output = Vec::new();

        let selected = select_interactively(books, &mut input, &mut output)?;
        let titles: Vec<&str> = selected.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Algebra", "Geometry"]);
        assert!(String::from_utf8_lossy(&output).contains("Topology\n"));
        Ok(())
    }
}
