//! Text Protocol Implementation
//!
//! NeuronKV speaks a newline-delimited text protocol: one command per line,
//! one reply line per command.
//!
//! ## Modules
//!
//! - `types`: `Command`, `CommandKind` and the `Reply` wire encoding
//! - `parser`: line framing and command parsing
//!
//! ## Example
//!
//! ```
//! use neuronkv::protocol::{parse_line, Command, Reply};
//!
//! let cmd = parse_line("SET name neuron").unwrap();
//! assert_eq!(cmd, Command::Set { key: "name".into(), value: "neuron".into() });
//!
//! assert_eq!(Reply::Ok.serialize(), b"OK\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{find_line, parse_line, ParseError, ParseResult};
pub use types::{Command, CommandKind, Reply};
