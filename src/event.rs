//! Event-stream vocabulary
//!
//! Once subscribed, the connection delivers one event per line.  The first
//! field names the event; the rest are event-specific.  Implement
//! [`EventSink`], overriding the callbacks you care about, and pass it to
//! [`Client::monitor`](crate::Client::monitor).
//!
//! Events the sink does not recognize may be sent by newer servers; the
//! dispatcher ignores them rather than failing.

use crate::error::{ClientError, Result};
use crate::protocol::TrackInfo;

/// Consumer of server events.
///
/// Every method has a default empty implementation.
#[allow(unused_variables)]
pub trait EventSink {
    /// A track was adopted.
    fn adopted(&mut self, id: &str, username: &str) {}

    /// A track finished playing.
    fn completed(&mut self, track: &str) {}

    /// A track failed to play.
    fn failed(&mut self, track: &str, error: &str) {}

    /// A user moved a track in the queue.
    fn moved(&mut self, username: &str) {}

    /// A track started playing.
    fn playing(&mut self, track: &str, username: Option<&str>) {}

    /// A playlist was created.
    fn playlist_created(&mut self, playlist: &str, sharing: &str) {}

    /// A playlist was deleted.
    fn playlist_deleted(&mut self, playlist: &str) {}

    /// A playlist was modified.
    fn playlist_modified(&mut self, playlist: &str, sharing: &str) {}

    /// A track was added to the queue.
    fn queue(&mut self, entry: TrackInfo) {}

    /// A track was added to the recently-played list.
    fn recent_added(&mut self, entry: TrackInfo) {}

    /// A track was removed from the recently-played list.
    fn recent_removed(&mut self, id: &str) {}

    /// A track was removed from the queue.
    fn removed(&mut self, id: &str, username: Option<&str>) {}

    /// The track database was rescanned.
    fn rescanned(&mut self) {}

    /// A track was scratched.
    fn scratched(&mut self, track: &str, username: &str) {}

    /// The playing track completed.
    fn state_completed(&mut self) {}

    /// Playing was enabled.
    fn state_enable_play(&mut self) {}

    /// Playing was disabled.
    fn state_disable_play(&mut self) {}

    /// Random play was enabled.
    fn state_enable_random(&mut self) {}

    /// Random play was disabled.
    fn state_disable_random(&mut self) {}

    /// The playing track failed.
    fn state_failed(&mut self) {}

    /// Play was paused.
    fn state_pause(&mut self) {}

    /// A track started playing.
    fn state_playing(&mut self) {}

    /// Play was resumed.
    fn state_resume(&mut self) {}

    /// The calling user's rights changed.
    fn state_rights_changed(&mut self, rights: &str) {}

    /// The playing track was scratched.
    fn state_scratched(&mut self) {}

    /// A user was created.
    fn user_add(&mut self, username: &str) {}

    /// A user was deleted.
    fn user_delete(&mut self, username: &str) {}

    /// A user property was changed.
    fn user_edit(&mut self, username: &str, property: &str) {}

    /// A user completed registration.
    fn user_confirm(&mut self, username: &str) {}

    /// The volume changed.
    fn volume(&mut self, left: u32, right: u32) {}
}

/// A required event argument, missing arguments being a parse error.
fn arg<'a>(fields: &'a [String], n: usize) -> Result<&'a str> {
    fields
        .get(n)
        .map(String::as_str)
        .ok_or_else(|| ClientError::Parse(format!("truncated event: {}", fields.join(" "))))
}

/// An optional trailing event argument.
fn opt_arg(fields: &[String], n: usize) -> Option<&str> {
    fields.get(n).map(String::as_str)
}

fn number(fields: &[String], n: usize) -> Result<u32> {
    arg(fields, n)?
        .parse()
        .map_err(|_| ClientError::Parse(format!("malformed event: {}", fields.join(" "))))
}

/// Dispatch one tokenized event line to the sink.
///
/// Unknown events and state sub-kinds are ignored for forward
/// compatibility; malformed known events are parse errors.
pub(crate) fn dispatch(fields: &[String], sink: &mut dyn EventSink) -> Result<()> {
    let event = match fields.first() {
        Some(event) => event.as_str(),
        None => return Ok(()),
    };
    match event {
        "adopted" => sink.adopted(arg(fields, 1)?, arg(fields, 2)?),
        "completed" => sink.completed(arg(fields, 1)?),
        "failed" => sink.failed(arg(fields, 1)?, arg(fields, 2)?),
        "moved" => sink.moved(arg(fields, 1)?),
        "playing" => sink.playing(arg(fields, 1)?, opt_arg(fields, 2)),
        "playlist_created" => sink.playlist_created(arg(fields, 1)?, arg(fields, 2)?),
        "playlist_deleted" => sink.playlist_deleted(arg(fields, 1)?),
        "playlist_modified" => sink.playlist_modified(arg(fields, 1)?, arg(fields, 2)?),
        "queue" => sink.queue(TrackInfo::from_fields(&fields[1..])?),
        "recent_added" => sink.recent_added(TrackInfo::from_fields(&fields[1..])?),
        "recent_removed" => sink.recent_removed(arg(fields, 1)?),
        "removed" => sink.removed(arg(fields, 1)?, opt_arg(fields, 2)),
        "rescanned" => sink.rescanned(),
        "scratched" => sink.scratched(arg(fields, 1)?, arg(fields, 2)?),
        "state" => match arg(fields, 1)? {
            "completed" => sink.state_completed(),
            "enable_play" => sink.state_enable_play(),
            "disable_play" => sink.state_disable_play(),
            "enable_random" => sink.state_enable_random(),
            "disable_random" => sink.state_disable_random(),
            "failed" => sink.state_failed(),
            "pause" => sink.state_pause(),
            "playing" => sink.state_playing(),
            "resume" => sink.state_resume(),
            "rights_changed" => sink.state_rights_changed(arg(fields, 2)?),
            "scratched" => sink.state_scratched(),
            _ => {}
        },
        "user_add" => sink.user_add(arg(fields, 1)?),
        "user_delete" => sink.user_delete(arg(fields, 1)?),
        "user_edit" => sink.user_edit(arg(fields, 1)?, arg(fields, 2)?),
        "user_confirm" => sink.user_confirm(arg(fields, 1)?),
        "volume" => sink.volume(number(fields, 1)?, number(fields, 2)?),
        _ => {}
    }
    Ok(())
}
