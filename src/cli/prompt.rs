//! Line editing for `mondoctl`: command-name completion and a password
//! prompt that does not echo.

use std::io::{self, BufRead};

use rustyline::{
    Context, Helper, completion::Completer, highlight::Highlighter, hint::Hinter,
    validate::Validator,
};

use crate::cli::commands::complete_command;

/// Tab-completes REPL command names.
#[derive(Debug, Default)]
pub struct CommandCompleter;

impl Completer for CommandCompleter {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(complete_command(line, pos))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl Helper for CommandCompleter {}

/// Asks for a password on the terminal with echo turned off.
pub fn prompt_password(message: &str) -> io::Result<String> {
    rpassword::prompt_password(message)
}

/// Reads one password line from `reader`, for input that is not a terminal.
/// The line ending is stripped, other whitespace is kept.
pub fn read_password_from(reader: &mut impl BufRead) -> io::Result<String> {
    rpassword::read_password_from_bufread(reader)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_password_line_without_newline() {
        let mut input = Cursor::new("hunter2\r\nnext line\n");
        assert_eq!(read_password_from(&mut input).unwrap(), "hunter2");
    }

    #[test]
    fn keeps_surrounding_spaces() {
        let mut input = Cursor::new(" pass word \n");
        assert_eq!(read_password_from(&mut input).unwrap(), " pass word ");
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut input = Cursor::new("");
        assert!(read_password_from(&mut input).is_err());
    }
}
