//! Song identifier extraction from chart URLs
//!
//! Chart rows identify a song only by its track URL, e.g.
//! `https://open.spotify.com/track/0u2P5u6lvoDfwTYjAADbn4`. The song id is
//! whatever follows the configured prefix.
//!
//! Precondition on the URL: it starts with the prefix and the remainder is a
//! non-empty run of ASCII letters and digits. A URL that breaks it is an
//! error, never a truncated key.
//!
//! The same rule exists twice: [`song_id_from_url`] for Rust callers, and
//! [`macro_sql`], a SQL macro of the same name installed before the
//! transforms run so the INSERT...SELECT statements can use it.

use crate::error::{WarehouseError, WarehouseResult};

/// Name of the SQL macro installed by [`macro_sql`]
pub const SONG_ID_MACRO: &str = "song_id_from_url";

/// Marker the SQL macro puts in its error so it can be mapped back to
/// [`WarehouseError::MalformedSongUrl`]
const SQL_ERROR_MARKER: &str = "[W004] malformed song URL <";

/// Extract the song id from a chart URL
pub fn song_id_from_url<'a>(url: &'a str, prefix: &str) -> WarehouseResult<&'a str> {
    let malformed = |reason: &str| WarehouseError::MalformedSongUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let id = url
        .strip_prefix(prefix)
        .ok_or_else(|| malformed(&format!("expected prefix '{prefix}'")))?;
    if id.is_empty() {
        return Err(malformed("no song id after prefix"));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(malformed("song id must be ASCII letters and digits"));
    }
    Ok(id)
}

/// `CREATE OR REPLACE MACRO` statement implementing [`song_id_from_url`] in SQL.
///
/// The prefix must not contain a single quote; config validation rejects it.
pub fn macro_sql(prefix: &str) -> String {
    let start = prefix.chars().count() + 1;
    format!(
        "CREATE OR REPLACE MACRO {SONG_ID_MACRO}(url) AS
    CASE
        WHEN starts_with(url, '{prefix}')
             AND regexp_full_match(substr(url, {start}), '[A-Za-z0-9]+')
            THEN substr(url, {start})
        ELSE error('{SQL_ERROR_MARKER}' || coalesce(url, 'NULL') || '>')
    END"
    )
}

/// Recover a typed error from an engine error raised by the SQL macro.
///
/// Returns `None` when `message` did not come from the macro.
pub fn malformed_url_from_message(message: &str, prefix: &str) -> Option<WarehouseError> {
    let start = message.find(SQL_ERROR_MARKER)? + SQL_ERROR_MARKER.len();
    let rest = &message[start..];
    let url = &rest[..rest.find('>')?];
    match song_id_from_url(url, prefix) {
        Err(err) => Some(err),
        Ok(_) => Some(WarehouseError::MalformedSongUrl {
            url: url.to_string(),
            reason: "rejected by the engine".to_string(),
        }),
    }
}
