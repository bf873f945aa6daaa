//! Client Connections
//!
//! The server spawns one task per accepted socket. Each task owns a
//! [`ConnectionHandler`], which buffers incoming bytes, cuts them into lines,
//! runs each line through the [`CommandHandler`](crate::commands::CommandHandler)
//! and writes one reply line back.
//!
//! ```text
//!   socket ──read──> BytesMut ──find_line──> line ──execute_line──> Reply
//!     ▲                                                               │
//!     └─────────────────────────── write + flush ─────────────────────┘
//! ```
//!
//! A connection ends when the peer closes it, when it sends bytes that are not
//! UTF-8 or a line longer than 64 KiB, on an I/O error, or when the server
//! shuts down. Several lines arriving in one read are answered in order.

pub mod handler;

pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
