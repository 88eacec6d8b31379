//! Client and pipelined command executor
//!
//! A [`Client`] owns at most one socket to the server and may be shared
//! freely between threads.  Commands are correlated with replies by a lock
//! hand-off rather than sequence numbers:
//!
//! - the send lock must be held while writing a request
//! - the receive lock must be held while reading a reply
//! - the receive lock is only ever acquired while the send lock is held
//!
//! Handing off from the send lock to the receive lock before reading means
//! a later caller can start writing its request while an earlier reply is
//! still being read, yet replies are always consumed in exactly the order
//! the requests went out.
//!
//! The socket is established lazily and re-established transparently after
//! any transport failure.

use std::collections::HashMap;
use std::io::{BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::event::{dispatch, EventSink};
use crate::network::Connection;
use crate::protocol::codec::{read_line, write_body, write_line};
use crate::protocol::{
    quote, read_response, split, CommandKind, Request, Response, TrackInfo, ABSENT,
};

/// Send half of the connection, guarded by the send lock
#[derive(Default)]
struct SendHalf {
    writer: Option<BufWriter<TcpStream>>,
}

/// Receive half of the connection, guarded by the receive lock
#[derive(Default)]
struct RecvHalf {
    reader: Option<BufReader<TcpStream>>,
}

/// A thread-safe connection to a queue daemon
pub struct Client {
    config: Config,

    /// Whether the socket is believed usable.  Cleared on teardown from
    /// either half.
    connected: AtomicBool,

    send: Mutex<SendHalf>,
    recv: Mutex<RecvHalf>,
}

impl Client {
    /// Create an unconnected client.
    ///
    /// The underlying connection is established on demand by the first
    /// command.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            connected: AtomicBool::new(false),
            send: Mutex::new(SendHalf::default()),
            recv: Mutex::new(RecvHalf::default()),
        }
    }

    // =========================================================================
    // Executor
    // =========================================================================

    /// Execute a single-line command, requiring a 2xx reply.
    pub fn execute(&self, line: impl Into<String>) -> Result<Response> {
        self.execute_request(CommandKind::Required, Request::Line(line.into()))
    }

    /// Execute a single-line command, additionally accepting the 555
    /// "absent value" reply.
    pub fn execute_optional(&self, line: impl Into<String>) -> Result<Response> {
        self.execute_request(CommandKind::Optional, Request::Line(line.into()))
    }

    /// Execute one command.
    ///
    /// Connects and authenticates first if necessary.  On a transport
    /// failure the connection is torn down and the error surfaced; the
    /// next command reconnects from scratch.
    pub fn execute_request(&self, kind: CommandKind, request: Request) -> Result<Response> {
        let mut tx = self.send.lock();
        self.ensure_connected(&mut tx)?;
        if let Err(e) = Self::write_request(&mut tx, &request) {
            tx.writer = None;
            self.connected.store(false, Ordering::Release);
            return Err(e);
        }
        // Lock hand-off: grab the receive lock before releasing the send
        // lock, so no later sender can overtake us to the reader.
        let mut rx = self.recv.lock();
        drop(tx);
        let response = match rx.reader.as_mut() {
            Some(reader) => read_response(reader),
            None => Err(ClientError::Disconnected),
        };
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                if e.is_transport() {
                    rx.reader = None;
                    self.connected.store(false, Ordering::Release);
                }
                return Err(e);
            }
        };
        drop(rx);
        kind.check(response)
    }

    /// Connect and authenticate if not already connected.
    ///
    /// Must be called with the send lock held; briefly takes the receive
    /// lock to install the new reader.
    fn ensure_connected(&self, tx: &mut SendHalf) -> Result<()> {
        if self.connected.load(Ordering::Acquire) && tx.writer.is_some() {
            return Ok(());
        }
        let conn = Connection::open(&self.config)?;
        let (reader, writer) = conn.into_split();
        tx.writer = Some(writer);
        self.recv.lock().reader = Some(reader);
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    /// Write one request and flush it.
    fn write_request(tx: &mut SendHalf, request: &Request) -> Result<()> {
        let writer = tx.writer.as_mut().ok_or(ClientError::Disconnected)?;
        match request {
            Request::Line(line) => write_line(writer, line)?,
            Request::WithBody(line, body) => {
                write_line(writer, line)?;
                write_body(writer, body)?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    // =========================================================================
    // Event Stream
    // =========================================================================

    /// Subscribe to the server's event stream.
    ///
    /// Sends the subscribe request and then dispatches each event line to
    /// `sink` until something goes wrong.  Transport failures reconnect
    /// and resubscribe after [`Config::retry_interval`], so under normal
    /// operation this never returns; parse and protocol errors propagate
    /// out.
    ///
    /// The connection is dedicated to the stream for the duration: calling
    /// this concurrently with any other command on the same client is a
    /// usage error and panics.
    pub fn monitor(&self, sink: &mut dyn EventSink) -> Result<()> {
        let mut tx = self
            .send
            .try_lock()
            .expect("monitor called concurrently with another command");
        loop {
            match self.monitor_session(&mut tx, sink) {
                Err(e) if e.is_transport() => {
                    tracing::debug!("event stream interrupted: {}; reconnecting", e);
                    tx.writer = None;
                    self.recv.lock().reader = None;
                    self.connected.store(false, Ordering::Release);
                    std::thread::sleep(self.config.retry_interval);
                }
                Err(e) => return Err(e),
                Ok(()) => unreachable!("event stream ended without an error"),
            }
        }
    }

    /// One subscribe-and-read pass of the event stream.
    ///
    /// Only ever returns an error; end of stream counts as a transport
    /// error so the caller reconnects.
    fn monitor_session(&self, tx: &mut SendHalf, sink: &mut dyn EventSink) -> Result<()> {
        self.ensure_connected(tx)?;
        Self::write_request(tx, &Request::Line("log".to_string()))?;
        let mut rx = self.recv.lock();
        let reader = rx.reader.as_mut().ok_or(ClientError::Disconnected)?;
        let subscribed = read_response(reader)?;
        if !subscribed.is_success() {
            return Err(ClientError::Protocol(subscribed.line));
        }
        loop {
            let line = read_line(reader)?;
            let fields = split(&line, false)?;
            dispatch(&fields, sink)?;
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Adopt a randomly picked track, as if the calling user had picked it.
    pub fn adopt(&self, id: &str) -> Result<()> {
        self.execute(format!("adopt {}", quote(id)))?;
        Ok(())
    }

    /// List files and directories below `path`, optionally filtered by a
    /// regexp.
    pub fn allfiles(&self, path: &str, regexp: Option<&str>) -> Result<Vec<String>> {
        self.execute(with_optional_arg("allfiles", path, regexp))?
            .into_body()
    }

    /// List directories below `path`, optionally filtered by a regexp.
    pub fn dirs(&self, path: &str, regexp: Option<&str>) -> Result<Vec<String>> {
        self.execute(with_optional_arg("dirs", path, regexp))?
            .into_body()
    }

    /// List files below `path`, optionally filtered by a regexp.
    pub fn files(&self, path: &str, regexp: Option<&str>) -> Result<Vec<String>> {
        self.execute(with_optional_arg("files", path, regexp))?
            .into_body()
    }

    /// Disable further playing.
    pub fn disable(&self) -> Result<()> {
        self.execute("disable")?;
        Ok(())
    }

    /// Enable playing.
    pub fn enable(&self) -> Result<()> {
        self.execute("enable")?;
        Ok(())
    }

    /// Test whether playing is enabled.
    pub fn enabled(&self) -> Result<bool> {
        self.execute("enabled")?.boolean()
    }

    /// Test whether a track exists.
    pub fn exists(&self, track: &str) -> Result<bool> {
        self.execute(format!("exists {}", quote(track)))?.boolean()
    }

    /// Get a track preference value, or `None` if it is not set.
    pub fn get(&self, track: &str, pref: &str) -> Result<Option<String>> {
        let r = self.execute_optional(format!("get {} {}", quote(track), quote(pref)))?;
        optional_value(r)
    }

    /// Get a global preference value, or `None` if it is not set.
    pub fn get_global(&self, pref: &str) -> Result<Option<String>> {
        let r = self.execute_optional(format!("get-global {}", quote(pref)))?;
        optional_value(r)
    }

    /// Get a track's length in seconds.
    pub fn length(&self, track: &str) -> Result<u64> {
        parse_number(self.execute(format!("length {}", quote(track)))?.value()?)
    }

    /// Move a track within the queue.
    ///
    /// A positive `delta` moves the track towards the head of the queue, a
    /// negative one towards the tail.
    pub fn move_track(&self, track: &str, delta: i32) -> Result<()> {
        self.execute(format!("move {} {}", quote(track), delta))?;
        Ok(())
    }

    /// Move several tracks to just after `target`, keeping their relative
    /// order.
    pub fn moveafter(&self, target: &str, tracks: &[&str]) -> Result<()> {
        self.execute(format!(
            "moveafter {}{}",
            quote(target),
            quoted_list(tracks)
        ))?;
        Ok(())
    }

    /// List newly added tracks, at most `max` of them if `max` is
    /// positive.
    pub fn new_tracks(&self, max: usize) -> Result<Vec<String>> {
        let r = if max > 0 {
            self.execute(format!("new {}", max))?
        } else {
            self.execute("new")?
        };
        r.into_body()
    }

    /// Do nothing.
    ///
    /// Useful to detect a failed connection promptly.
    pub fn nop(&self) -> Result<()> {
        self.execute("nop")?;
        Ok(())
    }

    /// Get a track name part, e.g. the artist in the display context.
    pub fn part(&self, track: &str, context: &str, part: &str) -> Result<String> {
        Ok(self
            .execute(format!(
                "part {} {} {}",
                quote(track),
                quote(context),
                quote(part)
            ))?
            .value()?
            .to_string())
    }

    /// Pause play.
    pub fn pause(&self) -> Result<()> {
        self.execute("pause")?;
        Ok(())
    }

    /// Resume play.
    pub fn resume(&self) -> Result<()> {
        self.execute("resume")?;
        Ok(())
    }

    /// Add a track to the queue, returning its queue ID.
    pub fn play(&self, track: &str) -> Result<String> {
        Ok(self
            .execute(format!("play {}", quote(track)))?
            .value()?
            .to_string())
    }

    /// Queue several tracks just after `target`, keeping their relative
    /// order.
    pub fn playafter(&self, target: &str, tracks: &[&str]) -> Result<()> {
        self.execute(format!(
            "playafter {}{}",
            quote(target),
            quoted_list(tracks)
        ))?;
        Ok(())
    }

    /// Get the playing track, or `None` if nothing is playing.
    pub fn playing(&self) -> Result<Option<TrackInfo>> {
        let r = self.execute("playing")?;
        if r.code == 252 {
            Ok(Some(TrackInfo::from_fields(&r.fields()?[1..])?))
        } else {
            Ok(None)
        }
    }

    /// Delete a playlist.
    pub fn playlist_delete(&self, playlist: &str) -> Result<()> {
        self.execute(format!("playlist-delete {}", quote(playlist)))?;
        Ok(())
    }

    /// Get the contents of a playlist.
    pub fn playlist_get(&self, playlist: &str) -> Result<Vec<String>> {
        self.execute(format!("playlist-get {}", quote(playlist)))?
            .into_body()
    }

    /// Get the sharing status of a playlist: "public", "private" or
    /// "shared".
    pub fn playlist_get_share(&self, playlist: &str) -> Result<String> {
        Ok(self
            .execute(format!("playlist-get-share {}", quote(playlist)))?
            .value()?
            .to_string())
    }

    /// Lock a playlist for modification.
    pub fn playlist_lock(&self, playlist: &str) -> Result<()> {
        self.execute(format!("playlist-lock {}", quote(playlist)))?;
        Ok(())
    }

    /// Replace the contents of a (locked) playlist.
    ///
    /// The contents are sent as a dot-stuffed body after the command line.
    pub fn playlist_set(&self, playlist: &str, contents: &[String]) -> Result<()> {
        self.execute_request(
            CommandKind::Required,
            Request::WithBody(
                format!("playlist-set {}", quote(playlist)),
                contents.to_vec(),
            ),
        )?;
        Ok(())
    }

    /// Set the sharing status of a (locked) playlist.
    pub fn playlist_set_share(&self, playlist: &str, share: &str) -> Result<()> {
        self.execute(format!(
            "playlist-set-share {} {}",
            quote(playlist),
            quote(share)
        ))?;
        Ok(())
    }

    /// Unlock the locked playlist.
    pub fn playlist_unlock(&self) -> Result<()> {
        self.execute("playlist-unlock")?;
        Ok(())
    }

    /// List visible playlists.
    pub fn playlists(&self) -> Result<Vec<String>> {
        self.execute("playlists")?.into_body()
    }

    /// Get all preferences for a track.
    pub fn prefs(&self, track: &str) -> Result<HashMap<String, String>> {
        let body = self.execute(format!("prefs {}", quote(track)))?.into_body()?;
        let mut prefs = HashMap::with_capacity(body.len());
        for line in &body {
            match split(line, false)?.as_mut_slice() {
                [key, value] => {
                    prefs.insert(std::mem::take(key), std::mem::take(value));
                }
                _ => {
                    return Err(ClientError::Parse(format!(
                        "malformed preference: {}",
                        line
                    )))
                }
            }
        }
        Ok(prefs)
    }

    /// Get the queue, head first.
    pub fn queue(&self) -> Result<Vec<TrackInfo>> {
        self.execute("queue")?
            .into_body()?
            .iter()
            .map(|line| TrackInfo::from_line(line))
            .collect()
    }

    /// Get the recently played list; the last element is the most recent.
    pub fn recent(&self) -> Result<Vec<TrackInfo>> {
        self.execute("recent")?
            .into_body()?
            .iter()
            .map(|line| TrackInfo::from_line(line))
            .collect()
    }

    /// Disable random play.
    pub fn random_disable(&self) -> Result<()> {
        self.execute("random-disable")?;
        Ok(())
    }

    /// Enable random play.
    pub fn random_enable(&self) -> Result<()> {
        self.execute("random-enable")?;
        Ok(())
    }

    /// Test whether random play is enabled.
    pub fn random_enabled(&self) -> Result<bool> {
        self.execute("random-enabled")?.boolean()
    }

    /// Remove a track from the queue.
    pub fn remove(&self, id: &str) -> Result<()> {
        self.execute(format!("remove {}", quote(id)))?;
        Ok(())
    }

    /// Resolve a track name to its canonical form.
    pub fn resolve(&self, track: &str) -> Result<String> {
        Ok(self
            .execute(format!("resolve {}", quote(track)))?
            .value()?
            .to_string())
    }

    /// Get the RTP broadcast address as a host and port.
    pub fn rtp_address(&self) -> Result<(String, u16)> {
        let r = self.execute("rtp-address")?;
        match r.fields()? {
            [_, host, port] => Ok((host.clone(), parse_number(port)?)),
            _ => Err(ClientError::Parse(format!("malformed response: {}", r.line))),
        }
    }

    /// Scratch a track, or the playing track if `id` is `None`.
    pub fn scratch(&self, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) => self.execute(format!("scratch {}", quote(id)))?,
            None => self.execute("scratch")?,
        };
        Ok(())
    }

    /// Search for tracks matching all of the given terms.
    pub fn search(&self, terms: &str) -> Result<Vec<String>> {
        self.execute(format!("search {}", quote(terms)))?.into_body()
    }

    /// Set a track preference value.
    pub fn set(&self, track: &str, pref: &str, value: &str) -> Result<()> {
        self.execute(format!(
            "set {} {} {}",
            quote(track),
            quote(pref),
            quote(value)
        ))?;
        Ok(())
    }

    /// Set a global preference value.
    pub fn set_global(&self, pref: &str, value: &str) -> Result<()> {
        self.execute(format!("set-global {} {}", quote(pref), quote(value)))?;
        Ok(())
    }

    /// Unset a track preference value.
    pub fn unset(&self, track: &str, pref: &str) -> Result<()> {
        self.execute(format!("unset {} {}", quote(track), quote(pref)))?;
        Ok(())
    }

    /// Unset a global preference value.
    pub fn unset_global(&self, pref: &str) -> Result<()> {
        self.execute(format!("unset-global {}", quote(pref)))?;
        Ok(())
    }

    /// Get server statistics.
    pub fn stats(&self) -> Result<Vec<String>> {
        self.execute("stats")?.into_body()
    }

    /// List all tags.
    pub fn tags(&self) -> Result<Vec<String>> {
        self.execute("tags")?.into_body()
    }

    /// Set a user property.
    pub fn edituser(&self, username: &str, property: &str, value: &str) -> Result<()> {
        self.execute(format!(
            "edituser {} {} {}",
            quote(username),
            quote(property),
            quote(value)
        ))?;
        Ok(())
    }

    /// Get a user property, or `None` if it is not set.
    pub fn userinfo(&self, username: &str, property: &str) -> Result<Option<String>> {
        let r = self.execute_optional(format!(
            "userinfo {} {}",
            quote(username),
            quote(property)
        ))?;
        optional_value(r)
    }

    /// List users.
    pub fn users(&self) -> Result<Vec<String>> {
        self.execute("users")?.into_body()
    }

    /// Get the server version string.
    pub fn version(&self) -> Result<String> {
        Ok(self.execute("version")?.value()?.to_string())
    }

    /// Get the (left, right) volume.
    pub fn volume(&self) -> Result<(u32, u32)> {
        volume_pair(self.execute("volume")?)
    }

    /// Set the volume, returning the resulting (left, right) setting.
    pub fn set_volume(&self, left: u32, right: u32) -> Result<(u32, u32)> {
        volume_pair(self.execute(format!("volume {} {}", left, right))?)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Build `<command> <path> [<regexp>]`.
fn with_optional_arg(command: &str, path: &str, regexp: Option<&str>) -> String {
    match regexp {
        Some(regexp) => format!("{} {} {}", command, quote(path), quote(regexp)),
        None => format!("{} {}", command, quote(path)),
    }
}

/// Quote a track list, each element preceded by a space.
fn quoted_list(tracks: &[&str]) -> String {
    let mut list = String::new();
    for track in tracks {
        list.push(' ');
        list.push_str(&quote(track));
    }
    list
}

/// The value of an optional-response command, `None` for a 555 reply.
fn optional_value(response: Response) -> Result<Option<String>> {
    if response.code == ABSENT {
        Ok(None)
    } else {
        Ok(Some(response.value()?.to_string()))
    }
}

/// Extract the (left, right) pair of a volume response.
fn volume_pair(response: Response) -> Result<(u32, u32)> {
    match response.fields()? {
        [_, left, right] => Ok((parse_number(left)?, parse_number(right)?)),
        _ => Err(ClientError::Parse(format!(
            "malformed response: {}",
            response.line
        ))),
    }
}

/// Parse a numeric field, mapping failure to a parse error.
fn parse_number<T: std::str::FromStr>(s: &str) -> Result<T> {
    s.parse()
        .map_err(|_| ClientError::Parse(format!("malformed number: {}", s)))
}
