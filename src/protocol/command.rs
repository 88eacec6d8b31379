//! Command definitions
//!
//! A command is one request line (optionally followed by a body) together
//! with the rule for judging its reply.

use crate::error::{ClientError, Result};
use crate::protocol::response::{Response, ABSENT};

/// How a command judges its response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Only a 2xx response is acceptable
    Required,

    /// A 2xx response or the 555 "absent value" response is acceptable
    Optional,
}

impl CommandKind {
    /// Whether `response` counts as OK for this kind of command.
    pub fn accepts(self, response: &Response) -> bool {
        match self {
            CommandKind::Required => response.is_success(),
            CommandKind::Optional => response.is_success() || response.code == ABSENT,
        }
    }

    /// Validate a response, raising a protocol error carrying the server's
    /// literal reply if it is not acceptable.
    pub fn check(self, response: Response) -> Result<Response> {
        if self.accepts(&response) {
            Ok(response)
        } else {
            Err(ClientError::Protocol(response.line))
        }
    }
}

/// A request ready to be written to the wire
#[derive(Debug, Clone)]
pub enum Request {
    /// A single command line
    Line(String),

    /// A command line followed by a dot-stuffed body
    WithBody(String, Vec<String>),
}

impl Request {
    /// The command line itself, for logging.
    pub fn line(&self) -> &str {
        match self {
            Request::Line(line) => line,
            Request::WithBody(line, _) => line,
        }
    }
}
