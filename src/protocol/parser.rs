//! Line Command Parser
//!
//! Turns one line of client input into a [`Command`], or a [`ParseError`] that
//! the caller sends back as an error reply. Parsing never fails the connection:
//! only transport problems do.
//!
//! ## How Framing Works
//!
//! [`find_line`] scans the connection buffer for a `\n` and reports where the
//! line ends and how many bytes it occupies. A trailing `\r` is stripped so
//! clients that send `\r\n` work too. The handler decodes the line as UTF-8 and
//! passes it to [`parse_line`].

use crate::protocol::types::{Command, CommandKind, NEWLINE};
use thiserror::Error;

/// Errors produced while turning a line into a command.
///
/// The `Display` text of each variant is the exact reply sent to the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line had no tokens
    #[error("ERR empty command")]
    Empty,

    /// The first token is not a known command
    #[error("Err unknown command")]
    UnknownCommand(String),

    /// The command got the wrong number of arguments
    #[error("ERR wrong number of arguments for {0}")]
    WrongArity(CommandKind),

    /// A numeric argument did not parse as an integer
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger { kind: CommandKind, key: String },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

impl Command {
    /// Builds a command from whitespace-separated tokens.
    ///
    /// The first token is the command name, matched case-insensitively.
    ///
    /// # Example
    ///
    /// ```
    /// use neuronkv::protocol::{Command, ParseError};
    ///
    /// let cmd = Command::from_tokens(&["get", "name"]).unwrap();
    /// assert_eq!(cmd, Command::Get { key: "name".to_string() });
    ///
    /// assert_eq!(Command::from_tokens(&[]), Err(ParseError::Empty));
    /// ```
    pub fn from_tokens(tokens: &[&str]) -> ParseResult<Self> {
        let (name, args) = tokens.split_first().ok_or(ParseError::Empty)?;

        let kind = CommandKind::lookup(name)
            .ok_or_else(|| ParseError::UnknownCommand((*name).to_string()))?;

        if args.len() != kind.arity() {
            return Err(ParseError::WrongArity(kind));
        }

        let command = match kind {
            CommandKind::Set => Command::Set {
                key: args[0].to_string(),
                value: args[1].to_string(),
            },
            CommandKind::Get => Command::Get {
                key: args[0].to_string(),
            },
            CommandKind::Del => Command::Del {
                key: args[0].to_string(),
            },
            CommandKind::Expire => Command::Expire {
                key: args[0].to_string(),
                seconds: args[1].parse().map_err(|_| ParseError::NotAnInteger {
                    kind,
                    key: args[0].to_string(),
                })?,
            },
        };

        Ok(command)
    }
}

/// Parses one line of input into a command.
pub fn parse_line(line: &str) -> ParseResult<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    Command::from_tokens(&tokens)
}

/// Finds the first complete line in the buffer.
///
/// # Returns
///
/// - `Some((line_len, consumed))` where `buf[..line_len]` is the line without
///   its terminator and `consumed` includes the terminator
/// - `None` if no `\n` has arrived yet
#[inline]
pub fn find_line(buf: &[u8]) -> Option<(usize, usize)> {
    let newline = buf.iter().position(|b| *b == NEWLINE)?;
    let line_len = if newline > 0 && buf[newline - 1] == b'\r' {
        newline - 1
    } else {
        newline
    };
    Some((line_len, newline + 1))
}
