//! Track records
//!
//! Queue entries, the recently-played list and the playing track are all
//! encoded as key-value track records:
//!
//! ```text
//! track "blues.ogg" id Z0001 origin picked state unplayed when 1262304000
//! ```
//!
//! Servers may send keys unknown to this client; they are ignored so that
//! newer servers keep working with older clients.  Unknown origins and
//! states are parse errors.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{ClientError, Result};
use crate::protocol::codec::split;

/// How a track ended up in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Adopted,
    Picked,
    Random,
    Scheduled,
    Scratch,
}

impl Origin {
    fn from_name(name: &str) -> Result<Self> {
        match name {
            "adopted" => Ok(Origin::Adopted),
            "picked" => Ok(Origin::Picked),
            "random" => Ok(Origin::Random),
            "scheduled" => Ok(Origin::Scheduled),
            "scratch" => Ok(Origin::Scratch),
            _ => Err(ClientError::Parse(format!("unknown origin: {}", name))),
        }
    }
}

/// Playback state of a queued track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Failed,
    Ok,
    Scratched,
    Paused,
    Unplayed,
    Quitting,
}

impl State {
    fn from_name(name: &str) -> Result<Self> {
        match name {
            "failed" => Ok(State::Failed),
            "ok" => Ok(State::Ok),
            "scratched" => Ok(State::Scratched),
            "paused" => Ok(State::Paused),
            "unplayed" => Ok(State::Unplayed),
            "quitting" => Ok(State::Quitting),
            _ => Err(ClientError::Parse(format!("unknown state: {}", name))),
        }
    }
}

/// Information about a track in the queue or another list
#[derive(Debug, Clone, Default)]
pub struct TrackInfo {
    /// Name of the track
    pub track: Option<String>,

    /// Unique ID in the queue
    pub id: Option<String>,

    /// How the track was chosen
    pub origin: Option<Origin>,

    /// Current state of the track
    pub state: Option<State>,

    /// User that submitted the track, absent for random picks
    pub submitter: Option<String>,

    /// User that scratched the track
    pub scratched_by: Option<String>,

    /// When the track was added to the queue
    pub when: Option<SystemTime>,

    /// When the track was played
    pub played: Option<SystemTime>,

    /// When the track is expected to play; only meaningful in the queue
    pub expected: Option<SystemTime>,

    /// Seconds of the track played so far; only meaningful for the
    /// playing track
    pub sofar: Option<u64>,

    /// Packed wait-status code of the player
    pub wstat: Option<i32>,
}

fn parse_time(value: &str) -> Result<SystemTime> {
    let secs: u64 = value
        .parse()
        .map_err(|_| ClientError::Parse(format!("malformed timestamp: {}", value)))?;
    Ok(UNIX_EPOCH + Duration::from_secs(secs))
}

impl TrackInfo {
    /// Parse a track record from an encoded line.
    pub fn from_line(line: &str) -> Result<Self> {
        Self::from_fields(&split(line, false)?)
    }

    /// Parse a track record from already-split fields.
    pub fn from_fields(fields: &[String]) -> Result<Self> {
        if fields.len() % 2 == 1 {
            return Err(ClientError::Parse(
                "odd-length track information".to_string(),
            ));
        }
        let mut info = TrackInfo::default();
        for pair in fields.chunks(2) {
            let (key, value) = (&pair[0], &pair[1]);
            match key.as_str() {
                "track" => info.track = Some(value.clone()),
                "id" => info.id = Some(value.clone()),
                "origin" => info.origin = Some(Origin::from_name(value)?),
                "state" => info.state = Some(State::from_name(value)?),
                "submitter" => info.submitter = Some(value.clone()),
                "scratched" => info.scratched_by = Some(value.clone()),
                "when" => info.when = Some(parse_time(value)?),
                "played" => info.played = Some(parse_time(value)?),
                "expected" => info.expected = Some(parse_time(value)?),
                "sofar" => {
                    info.sofar = Some(value.parse().map_err(|_| {
                        ClientError::Parse(format!("malformed sofar: {}", value))
                    })?)
                }
                "wstat" => {
                    info.wstat = Some(value.parse().map_err(|_| {
                        ClientError::Parse(format!("malformed wstat: {}", value))
                    })?)
                }
                // Keys from the future; ignore them
                _ => {}
            }
        }
        Ok(info)
    }
}
