//! AppState — one immutable snapshot of everything the client shows.
//!
//! Collections are persistent vectors, so producing the next snapshot shares
//! structure with the previous one and cloning is cheap.  Nothing mutates a
//! snapshot once the store has handed it out.

use std::sync::Arc;

use im::Vector;
use jukebox_proto::config::CatalogConfig;
use jukebox_proto::records::{Catalog, Instrument, Song, SongGroup, Visualizer};
use serde::Serialize;
use serde_json::Value;

use crate::socket::{same_socket, Socket};

/// Stands in for the live socket in logged snapshots.
pub const SOCKET_MARKER: &str = "[socket]";

#[derive(Debug, Clone, Default)]
pub struct AppState {
    // ── Connection ──────────────────────────────────────────────────────────
    pub socket: Option<Socket>,

    // ── Playback ────────────────────────────────────────────────────────────
    pub songs: Vector<Song>,
    /// Notes of the song being played.  `None` when nothing plays.
    pub notes: Option<Value>,

    // ── Navigation ──────────────────────────────────────────────────────────
    pub instrument: Option<Arc<Instrument>>,
    pub visualizer: Option<Arc<Visualizer>>,
    pub instruments: Catalog<Instrument>,
    pub visualizers: Catalog<Visualizer>,

    // ── Library panels ──────────────────────────────────────────────────────
    pub song_detail: Option<Value>,
    pub albums: Vector<SongGroup>,
    pub genres: Vector<SongGroup>,
    /// Result of whichever album, genre or search filter ran last.
    pub filtered_songs: Option<Vector<Song>>,
}

impl AppState {
    /// Initial snapshot: empty library, catalogs taken from config.
    pub fn with_catalogs(catalog: &CatalogConfig) -> Self {
        Self {
            instruments: catalog.instrument_catalog(),
            visualizers: catalog.visualizer_catalog(),
            ..Default::default()
        }
    }

    /// JSON view of the snapshot with the socket replaced by
    /// [`SOCKET_MARKER`], for the debug log and the stdout printer.
    pub fn redacted(&self) -> Value {
        let view = RedactedState {
            socket: self.socket.as_ref().map(|_| SOCKET_MARKER),
            songs: &self.songs,
            notes: self.notes.as_ref(),
            instrument: self.instrument.as_deref(),
            visualizer: self.visualizer.as_deref(),
            instruments: &self.instruments,
            visualizers: &self.visualizers,
            song_detail: self.song_detail.as_ref(),
            albums: &self.albums,
            genres: &self.genres,
            filtered_songs: self.filtered_songs.as_ref(),
        };
        serde_json::to_value(view).unwrap_or(Value::Null)
    }
}

impl PartialEq for AppState {
    fn eq(&self, other: &Self) -> bool {
        let sockets_match = match (&self.socket, &other.socket) {
            (None, None) => true,
            (Some(a), Some(b)) => same_socket(a, b),
            _ => false,
        };
        sockets_match
            && self.songs == other.songs
            && self.notes == other.notes
            && self.instrument == other.instrument
            && self.visualizer == other.visualizer
            && self.instruments == other.instruments
            && self.visualizers == other.visualizers
            && self.song_detail == other.song_detail
            && self.albums == other.albums
            && self.genres == other.genres
            && self.filtered_songs == other.filtered_songs
    }
}

/// Field names follow the client's state keys.
#[derive(Serialize)]
struct RedactedState<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    socket: Option<&'static str>,
    songs: &'a Vector<Song>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a Value>,
    instrument: Option<&'a Instrument>,
    visualizer: Option<&'a Visualizer>,
    instruments: &'a Catalog<Instrument>,
    visualizers: &'a Catalog<Visualizer>,
    #[serde(rename = "SongDetail", skip_serializing_if = "Option::is_none")]
    song_detail: Option<&'a Value>,
    #[serde(rename = "Albums")]
    albums: &'a Vector<SongGroup>,
    #[serde(rename = "Genres")]
    genres: &'a Vector<SongGroup>,
    #[serde(rename = "FilteredSongs", skip_serializing_if = "Option::is_none")]
    filtered_songs: Option<&'a Vector<Song>>,
}
