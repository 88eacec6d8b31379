//! Response definitions
//!
//! Represents one server reply and classifies its shape from the status
//! code.
//!
//! ## Status Codes
//!
//! Replies start with a 3-digit status code.  The hundreds digit gives the
//! outcome (2 = success); the last digit selects the shape of the rest:
//!
//! - 1 or 2: the rest of the line holds quoted fields
//! - 3: the line is followed by a dot-terminated, dot-stuffed body
//! - anything else: the code stands alone

use std::io::BufRead;

use crate::error::{ClientError, Result};
use crate::protocol::codec::{read_body, read_line, split};

/// Status code of an "absent value" reply to an optional-response command
pub const ABSENT: u16 = 555;

/// A parsed server reply
#[derive(Debug, Clone)]
pub struct Response {
    /// Exact line as received from the server
    pub line: String,

    /// 3-digit status code
    pub code: u16,

    /// Parsed fields, present when the code's last digit is 1 or 2.
    /// The first field is the status code itself.
    pub fields: Option<Vec<String>>,

    /// Multi-line body, present when the code's last digit is 3
    pub body: Option<Vec<String>>,
}

/// Read and classify exactly one response.
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Response> {
    let line = read_line(reader)?;
    let digits = line.get(..3).unwrap_or(&line);
    if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::Parse(format!(
            "malformed status code: {}",
            line
        )));
    }
    let code: u16 = digits.parse().unwrap_or(0);
    let mut fields = None;
    let mut body = None;
    match code % 10 {
        1 | 2 => fields = Some(split(&line, false)?),
        3 => body = Some(read_body(reader)?),
        _ => {}
    }
    Ok(Response {
        line,
        code,
        fields,
        body,
    })
}

impl Response {
    /// Whether this is a success (2xx) response.
    pub fn is_success(&self) -> bool {
        self.code / 100 == 2
    }

    /// The parsed fields, or a parse error if this response shape has none.
    pub fn fields(&self) -> Result<&[String]> {
        self.fields
            .as_deref()
            .ok_or_else(|| ClientError::Parse(format!("malformed response: {}", self.line)))
    }

    /// The single value of a one-field response.
    pub fn value(&self) -> Result<&str> {
        match self.fields()? {
            [_, value] => Ok(value.as_str()),
            _ => Err(ClientError::Parse(format!(
                "malformed response: {}",
                self.line
            ))),
        }
    }

    /// The single yes/no value of a one-field response.
    pub fn boolean(&self) -> Result<bool> {
        match self.value()? {
            "yes" => Ok(true),
            "no" => Ok(false),
            _ => Err(ClientError::Parse(
                "expected 'yes' or 'no' in response".to_string(),
            )),
        }
    }

    /// Consume the response, returning its body.
    pub fn into_body(self) -> Result<Vec<String>> {
        self.body
            .ok_or_else(|| ClientError::Parse(format!("malformed response: {}", self.line)))
    }
}
