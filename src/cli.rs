//! Helpers shared by the command line programs.

use crate::error::{TspError, TspResult};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;

/// Initialise `env_logger`. `RUST_LOG` wins; otherwise `info`, or `debug`
/// when `verbose`.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).try_init();
}

/// Return `value` if given, otherwise print `prompt` and parse one line of
/// `input`.
pub fn read_or_prompt<T, R, W>(value: Option<T>, prompt: &str, input: &mut R, output: &mut W) -> TspResult<T>
where
    T: FromStr,
    R: BufRead,
    W: Write,
{
    if let Some(v) = value {
        return Ok(v);
    }
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(TspError::InvalidInput(format!("no answer to \"{}\"", prompt.trim())));
    }
    let answer = line.trim();
    answer
        .parse()
        .map_err(|_| TspError::InvalidInput(format!("\"{}\" is not a valid answer to \"{}\"", answer, prompt.trim())))
}

/// Write `value` as pretty JSON.
pub fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> TspResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Process exit code for `err`: 2 for rejected input, 1 otherwise.
pub fn exit_code(err: &TspError) -> ExitCode {
    if err.is_input_error() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_given_value_skips_prompt() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let n: usize = read_or_prompt(Some(7), "Number of vertices: ", &mut input, &mut output).unwrap();
        assert_eq!(n, 7);
        assert!(output.is_empty());
    }

    #[test]
    fn test_prompt_reads_line() {
        let mut input = Cursor::new(" 12 \n");
        let mut output = Vec::new();
        let n: usize = read_or_prompt(None, "Number of vertices: ", &mut input, &mut output).unwrap();
        assert_eq!(n, 12);
        assert_eq!(String::from_utf8(output).unwrap(), "Number of vertices: ");
    }

    #[test]
    fn test_prompt_rejects_garbage_and_eof() {
        let mut output = Vec::new();
        let bad: TspResult<usize> = read_or_prompt(None, "n: ", &mut Cursor::new("abc\n"), &mut output);
        assert!(matches!(bad, Err(TspError::InvalidInput(_))));
        let eof: TspResult<usize> = read_or_prompt(None, "n: ", &mut Cursor::new(""), &mut output);
        assert!(matches!(eof, Err(TspError::InvalidInput(_))));
    }

    #[test]
    fn test_exit_codes() {
        let input = TspError::InvalidVertexCount { vertices: 0, min: 1, max: 32 };
        assert_eq!(exit_code(&input), ExitCode::from(2));
        assert_eq!(exit_code(&TspError::MissingCoordinates), ExitCode::FAILURE);
    }
}
