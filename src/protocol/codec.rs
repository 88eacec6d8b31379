//! Protocol codec
//!
//! Line tokenizing, quoting and multi-line body framing for the wire
//! protocol.
//!
//! ## Wire Format
//!
//! Every message is a newline-terminated UTF-8 line.  Fields within a line
//! are separated by whitespace and may be quoted:
//!
//! ```text
//! play "some track.ogg" normal
//! ```
//!
//! Multi-line bodies are terminated by a line consisting of a single `.`;
//! body lines that themselves begin with `.` are sent with one extra
//! leading `.` ("dot-stuffing").

use std::borrow::Cow;
use std::io::{BufRead, Write};

use crate::error::{ClientError, Result};

// =============================================================================
// Tokenizing
// =============================================================================

/// Test for a field-separating whitespace character
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Split a line into fields.
///
/// Whitespace separates fields and is otherwise skipped.  If
/// `allow_comments` is true, an unquoted `#` terminates the scan.  Fields
/// starting with `"` or `'` run until the matching quote and support the
/// escapes `\\`, `\"`, `\'` and `\n`; any other escape is an error, as is
/// an unterminated quote.  Unquoted fields run until the next whitespace
/// with no escape processing.
pub fn split(s: &str, allow_comments: bool) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut n = 0;
    while n < chars.len() {
        let c = chars[n];
        n += 1;
        if is_space(c) {
            continue;
        }
        if allow_comments && c == '#' {
            break;
        }
        if c == '"' || c == '\'' {
            let quote_char = c;
            let mut field = String::new();
            loop {
                match chars.get(n) {
                    None => {
                        return Err(ClientError::Parse(
                            "unterminated quoted string".to_string(),
                        ))
                    }
                    Some(&c) if c == quote_char => {
                        n += 1;
                        break;
                    }
                    Some(&'\\') => {
                        n += 1;
                        match chars.get(n) {
                            Some('\\') => field.push('\\'),
                            Some('"') => field.push('"'),
                            Some('\'') => field.push('\''),
                            Some('n') => field.push('\n'),
                            _ => {
                                return Err(ClientError::Parse(
                                    "invalid escape sequence".to_string(),
                                ))
                            }
                        }
                        n += 1;
                    }
                    Some(&c) => {
                        field.push(c);
                        n += 1;
                    }
                }
            }
            fields.push(field);
        } else {
            let start = n - 1;
            while n < chars.len() && !is_space(chars[n]) {
                n += 1;
            }
            fields.push(chars[start..n].iter().collect());
        }
    }
    Ok(fields)
}

// =============================================================================
// Quoting
// =============================================================================

/// Quote a field for use in a request line.
///
/// A nonempty field containing none of `"`, `'`, `#`, space or control
/// characters is returned unchanged.  Anything else is wrapped in double
/// quotes with `"` and `\` backslash-escaped and newlines emitted as `\n`.
pub fn quote(s: &str) -> Cow<'_, str> {
    let needs_quoting = s.is_empty()
        || s.chars()
            .any(|c| matches!(c, '"' | '\'' | '#' | ' ') || (c as u32) < 0x20);
    if !needs_quoting {
        return Cow::Borrowed(s);
    }
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => {
                quoted.push('\\');
                quoted.push('n');
            }
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

// =============================================================================
// Line & Body Framing
// =============================================================================

/// Read one newline-terminated line, without the newline.
///
/// End of stream is a transport error: the server never closes the
/// connection mid-conversation on purpose.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    let n = reader.read_line(&mut line)?;
    if n == 0 {
        return Err(ClientError::Disconnected);
    }
    if line.ends_with('\n') {
        line.pop();
    }
    tracing::trace!("RECV: {}", line);
    Ok(line)
}

/// Write one line, appending the newline.
///
/// Does not flush: a request may span several lines (e.g. a command with
/// a body) which are flushed together.
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    tracing::trace!("SEND: {}", line);
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Read a dot-terminated response body, removing the stuffed dots.
pub fn read_body<R: BufRead>(reader: &mut R) -> Result<Vec<String>> {
    let mut body = Vec::new();
    loop {
        let line = match read_line(reader) {
            Ok(line) => line,
            Err(ClientError::Disconnected) => {
                return Err(ClientError::Parse(
                    "unterminated response body".to_string(),
                ))
            }
            Err(e) => return Err(e),
        };
        if line == "." {
            return Ok(body);
        }
        match line.strip_prefix('.') {
            Some(rest) => body.push(rest.to_string()),
            None => body.push(line),
        }
    }
}

/// Write a dot-stuffed body followed by the `.` terminator.
///
/// Does not flush.
pub fn write_body<W: Write>(writer: &mut W, body: &[String]) -> Result<()> {
    for line in body {
        if line.starts_with('.') {
            writer.write_all(b".")?;
        }
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.write_all(b".\n")?;
    Ok(())
}

// =============================================================================
// Hex
// =============================================================================

/// Decode a hex string, case-insensitively.
///
/// Odd-length or non-hex-digit input is a parse error.
pub fn from_hex(s: &str) -> Result<Vec<u8>> {
    hex::decode(s).map_err(|e| ClientError::Parse(format!("invalid hex string: {}", e)))
}

/// Encode bytes as lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
