//! Interactive terminal input.
//!
//! Only integer parseability is checked here; dates and window ordering
//! are validated downstream like any other input.

use std::io::{self, BufRead, Write};

use crate::domain::error::SmaCrossError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    pub code: String,
    pub start_date: String,
    pub end_date: String,
    pub short_window: i64,
    pub long_window: i64,
}

fn read_line<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    prompt: &str,
) -> Result<String, SmaCrossError> {
    write!(writer, "{prompt}")?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(SmaCrossError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed before all values were entered",
        )));
    }
    Ok(line.trim().to_string())
}

fn read_int<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    prompt: &str,
) -> Result<i64, SmaCrossError> {
    loop {
        let line = read_line(reader, writer, prompt)?;
        match line.parse::<i64>() {
            Ok(value) => return Ok(value),
            Err(_) => writeln!(writer, "'{line}' is not an integer, try again")?,
        }
    }
}

pub fn read_user_input<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> Result<UserInput, SmaCrossError> {
    let code = read_line(reader, writer, "Enter stock ticker (e.g., AAPL, MSFT): ")?;
    let start_date = read_line(reader, writer, "Enter start date (YYYY-MM-DD): ")?;
    let end_date = read_line(reader, writer, "Enter end date (YYYY-MM-DD): ")?;
    let short_window = read_int(reader, writer, "Enter short window for SMA (e.g., 50): ")?;
    let long_window = read_int(reader, writer, "Enter long window for SMA (e.g., 200): ")?;

    Ok(UserInput {
        code: code.to_uppercase(),
        start_date,
        end_date,
        short_window,
        long_window,
    })
}
