//! Command Handler Module
//!
//! This module executes NeuronKV commands against the storage engine.
//! It takes one line of client input, parses it, dispatches it, and returns
//! the reply to send back.
//!
//! ## Supported Commands
//!
//! - `SET key value` - Set a key, clearing any TTL it had
//! - `GET key` - Get a key's value, or `nil`
//! - `DEL key` - Delete a key, replies `1` or `0`
//! - `EXPIRE key seconds` - Set a TTL on an existing key, replies `1` or `0`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │ parse_line()│───>│  dispatch() │───>│   Reply     │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                            │                                │
//! │                            ▼                                │
//! │                      StorageEngine                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure here becomes an error reply. Nothing in this module can close
//! a connection.

use crate::protocol::{parse_line, Command, ParseError, Reply};
use crate::storage::{StorageEngine, StoreError};
use std::sync::Arc;
use tracing::trace;

/// Handles commands by dispatching them to the storage engine.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    /// The storage engine
    storage: Arc<StorageEngine>,
}

impl CommandHandler {
    /// Creates a new command handler with the given storage engine.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// Parses and executes one line of input.
    ///
    /// # Returns
    ///
    /// The reply to send back to the client. Parse errors become error replies.
    pub fn execute_line(&self, line: &str) -> Reply {
        match parse_line(line) {
            Ok(command) => self.execute(command),
            Err(e) => {
                trace!(error = ?e, "Rejected command");
                // The key was named, so the access still counts
                if let ParseError::NotAnInteger { key, .. } = &e {
                    self.storage.record_access(key);
                }
                Reply::error(e.to_string())
            }
        }
    }

    /// Executes a parsed command and returns the reply.
    pub fn execute(&self, command: Command) -> Reply {
        trace!(command = %command.kind(), key = command.key(), "Executing command");

        match command {
            Command::Set { key, value } => self.cmd_set(key, value),
            Command::Get { key } => self.cmd_get(&key),
            Command::Del { key } => self.cmd_del(&key),
            Command::Expire { key, seconds } => self.cmd_expire(&key, seconds),
        }
    }

    /// SET key value
    fn cmd_set(&self, key: String, value: String) -> Reply {
        self.storage.set(key, value);
        Reply::Ok
    }

    /// GET key
    fn cmd_get(&self, key: &str) -> Reply {
        match self.storage.get(key) {
            Some(value) => Reply::Value(value),
            None => Reply::Nil,
        }
    }

    /// DEL key
    fn cmd_del(&self, key: &str) -> Reply {
        Reply::flag(self.storage.delete(key))
    }

    /// EXPIRE key seconds
    fn cmd_expire(&self, key: &str, seconds: i64) -> Reply {
        match self.storage.expire(key, seconds) {
            Ok(set) => Reply::flag(set),
            Err(StoreError::InvalidTtl(_)) => Reply::error("ERR invalid expire time in EXPIRE"),
            Err(e) => Reply::error(format!("ERR {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_handler() -> CommandHandler {
        let storage = Arc::new(StorageEngine::new());
        CommandHandler::new(storage)
    }

    #[test]
    fn test_set_get() {
        let handler = create_handler();

        assert_eq!(handler.execute_line("SET foo bar"), Reply::Ok);
        assert_eq!(
            handler.execute_line("GET foo"),
            Reply::Value("bar".to_string())
        );
    }

    #[test]
    fn test_get_nonexistent() {
        let handler = create_handler();
        assert_eq!(handler.execute_line("GET nonexistent"), Reply::Nil);
    }

    #[test]
    fn test_overwrite() {
        let handler = create_handler();

        handler.execute_line("SET k v1");
        handler.execute_line("EXPIRE k 100");
        handler.execute_line("SET k v2");

        assert_eq!(handler.execute_line("GET k"), Reply::Value("v2".to_string()));
        assert!(handler.storage.deadline("k").is_none());
    }

    #[test]
    fn test_del() {
        let handler = create_handler();

        handler.execute_line("SET foo bar");
        assert_eq!(handler.execute_line("DEL foo"), Reply::Integer(1));
        assert_eq!(handler.execute_line("GET foo"), Reply::Nil);
        assert_eq!(handler.execute_line("DEL foo"), Reply::Integer(0));
    }

    #[test]
    fn test_expire() {
        let handler = create_handler();

        assert_eq!(handler.execute_line("EXPIRE missing 10"), Reply::Integer(0));
        assert!(handler.storage.is_empty());

        handler.execute_line("SET foo bar");
        assert_eq!(handler.execute_line("EXPIRE foo 10"), Reply::Integer(1));
        assert!(handler.storage.deadline("foo").is_some());
    }

    #[test]
    fn test_expire_invalid_ttl() {
        let handler = create_handler();
        handler.execute_line("SET foo bar");

        assert_eq!(
            handler.execute_line("EXPIRE foo 0"),
            Reply::error("ERR invalid expire time in EXPIRE")
        );
        assert_eq!(
            handler.execute_line("EXPIRE foo -1"),
            Reply::error("ERR invalid expire time in EXPIRE")
        );
        assert_eq!(
            handler.execute_line("EXPIRE foo ten"),
            Reply::error("ERR value is not an integer or out of range")
        );
        assert!(handler.storage.deadline("foo").is_none());

        // SET plus three rejected EXPIREs
        let record = handler.storage.access_record("foo").unwrap();
        assert_eq!(record.access_count, 4);

        assert_eq!(
            handler.execute_line("EXPIRE missing soon"),
            Reply::error("ERR value is not an integer or out of range")
        );
        assert!(handler.storage.access_record("missing").is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let handler = create_handler();

        assert_eq!(handler.execute_line("set Key Value"), Reply::Ok);
        assert_eq!(
            handler.execute_line("gEt Key"),
            Reply::Value("Value".to_string())
        );
        // Keys stay case-sensitive
        assert_eq!(handler.execute_line("GET key"), Reply::Nil);
    }

    #[test]
    fn test_protocol_errors() {
        let handler = create_handler();

        assert_eq!(handler.execute_line(""), Reply::error("ERR empty command"));
        assert_eq!(
            handler.execute_line("FROB x y"),
            Reply::error("Err unknown command")
        );
        assert_eq!(
            handler.execute_line("SET onlykey"),
            Reply::error("ERR wrong number of arguments for SET")
        );
        assert_eq!(
            handler.execute_line("GET"),
            Reply::error("ERR wrong number of arguments for GET")
        );
        assert_eq!(
            handler.execute_line("DEL a b"),
            Reply::error("ERR wrong number of arguments for DEL")
        );
        assert_eq!(
            handler.execute_line("EXPIRE a"),
            Reply::error("ERR wrong number of arguments for EXPIRE")
        );
    }

    #[test]
    fn test_execute_parsed_command() {
        let handler = create_handler();

        let reply = handler.execute(Command::Set {
            key: "k".to_string(),
            value: "v".to_string(),
        });
        assert_eq!(reply, Reply::Ok);
        assert_eq!(
            handler.execute(Command::Get { key: "k".to_string() }),
            Reply::Value("v".to_string())
        );
    }
}
