//! Wire Types
//!
//! This module defines the commands understood by NeuronKV and the replies it
//! sends back. The protocol is plain text, one command per line:
//!
//! ```text
//! SET <key> <value>        ->  OK
//! GET <key>                ->  <value> | nil
//! DEL <key>                ->  1 | 0
//! EXPIRE <key> <seconds>   ->  1 | 0
//! ```
//!
//! Every reply is a single line terminated by `\n`.

use std::fmt;

/// The line terminator used for replies
pub const NEWLINE: u8 = b'\n';

/// The four command names, independent of their arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Set,
    Get,
    Del,
    Expire,
}

impl CommandKind {
    /// Looks up a command by name, ignoring ASCII case.
    pub fn lookup(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("SET") {
            Some(CommandKind::Set)
        } else if name.eq_ignore_ascii_case("GET") {
            Some(CommandKind::Get)
        } else if name.eq_ignore_ascii_case("DEL") {
            Some(CommandKind::Del)
        } else if name.eq_ignore_ascii_case("EXPIRE") {
            Some(CommandKind::Expire)
        } else {
            None
        }
    }

    /// Number of arguments the command takes, not counting its name.
    pub fn arity(self) -> usize {
        match self {
            CommandKind::Set | CommandKind::Expire => 2,
            CommandKind::Get | CommandKind::Del => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Set => "SET",
            CommandKind::Get => "GET",
            CommandKind::Del => "DEL",
            CommandKind::Expire => "EXPIRE",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated command with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { key: String, value: String },
    Get { key: String },
    Del { key: String },
    Expire { key: String, seconds: i64 },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Set { .. } => CommandKind::Set,
            Command::Get { .. } => CommandKind::Get,
            Command::Del { .. } => CommandKind::Del,
            Command::Expire { .. } => CommandKind::Expire,
        }
    }

    /// The key the command operates on.
    pub fn key(&self) -> &str {
        match self {
            Command::Set { key, .. }
            | Command::Get { key }
            | Command::Del { key }
            | Command::Expire { key, .. } => key,
        }
    }
}

/// A reply line sent back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `OK`
    Ok,

    /// A stored value, sent verbatim
    Value(String),

    /// `nil`, for a missing or expired key
    Nil,

    /// A decimal integer, used for `1`/`0` results
    Integer(i64),

    /// An error line, sent verbatim
    Error(String),
}

impl Reply {
    /// Creates a new error reply.
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error(message.into())
    }

    /// Creates the `1`/`0` reply for a boolean result.
    pub fn flag(set: bool) -> Self {
        Reply::Integer(i64::from(set))
    }

    /// Serializes the reply to bytes for sending over the wire.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the reply into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            Reply::Ok => buf.extend_from_slice(b"OK"),
            Reply::Value(value) => buf.extend_from_slice(value.as_bytes()),
            Reply::Nil => buf.extend_from_slice(b"nil"),
            Reply::Integer(n) => buf.extend_from_slice(n.to_string().as_bytes()),
            Reply::Error(message) => buf.extend_from_slice(message.as_bytes()),
        }
        buf.push(NEWLINE);
    }

    /// Returns true if this reply is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => write!(f, "OK"),
            Reply::Value(value) => write!(f, "\"{}\"", value),
            Reply::Nil => write!(f, "(nil)"),
            Reply::Integer(n) => write!(f, "(integer) {}", n),
            Reply::Error(message) => write!(f, "(error) {}", message),
        }
    }
}
