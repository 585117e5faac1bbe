use crate::shell::ast::CommandLine;
use thiserror::Error;

pub const MAX_LINE_BYTES: usize = 2048;
pub const MAX_ARGS: usize = 512;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing redirection target after '{operator}'")]
    MissingRedirectTarget { operator: char },
    #[error("too many arguments (limit is {limit})")]
    TooManyArguments { limit: usize },
    #[error("input line too long (limit is {limit} bytes)")]
    LineTooLong { limit: usize },
}

/// True for lines the shell skips without tokenizing: blank lines and `#` comments.
pub fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Splits a line on whitespace. `<` and `>` take the next token as a path,
/// any `&` token marks the line as background, everything else is an argument.
pub fn parse_command_line(cmd_str: &str) -> Result<CommandLine, ParseError> {
    let line = cmd_str.trim_end_matches(['\n', '\r']);
    if line.len() > MAX_LINE_BYTES {
        return Err(ParseError::LineTooLong { limit: MAX_LINE_BYTES });
    }

    let mut argv = Vec::new();
    let mut input = None;
    let mut output = None;
    let mut background = false;

    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        match token {
            "<" => {
                let target = tokens
                    .next()
                    .ok_or(ParseError::MissingRedirectTarget { operator: '<' })?;
                input = Some(target);
            }
            ">" => {
                let target = tokens
                    .next()
                    .ok_or(ParseError::MissingRedirectTarget { operator: '>' })?;
                output = Some(target);
            }
            "&" => background = true,
            arg => {
                if argv.len() == MAX_ARGS {
                    return Err(ParseError::TooManyArguments { limit: MAX_ARGS });
                }
                argv.push(arg);
            }
        }
    }

    let mut cmd = CommandLine::new(argv);
    if let Some(path) = input {
        cmd = cmd.with_input(path);
    }
    if let Some(path) = output {
        cmd = cmd.with_output(path);
    }
    if background {
        cmd = cmd.in_background();
    }
    Ok(cmd)
}
