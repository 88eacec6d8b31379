//! Protocol Module
//!
//! The wire protocol: line tokenizing and quoting, status-code
//! classification, handshake digests and track records.
//!
//! ## Protocol Shape
//!
//! ```text
//! S: 231 2 sha256 a49a4f court...           (greeting + challenge)
//! C: user alice 63f1a...                    (login digest)
//! S: 230 OK
//! C: version
//! S: 251 5.2
//! C: playlists
//! S: 253 playlists follow
//! S: rock
//! S: ..config                               (dot-stuffed body line)
//! S: .                                      (body terminator)
//! ```

pub mod codec;
mod command;
mod digest;
mod response;
mod track;

pub use codec::{from_hex, quote, split, to_hex};
pub use command::{CommandKind, Request};
pub use digest::DigestAlgorithm;
pub use response::{read_response, Response, ABSENT};
pub use track::{Origin, State, TrackInfo};
