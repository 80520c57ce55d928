use std::fmt;

use im::Vector;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::records::{Song, SongGroup};

/// Wire envelope for an action: `{"type": "PLAY_SONG", "args": {"id": 1}}`.
///
/// `args` is free-form until [`ActionMessage::decode`] turns it into one of
/// the typed payloads below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub args: Value,
}

impl ActionMessage {
    /// Parse one JSON line as read from the input stream.
    pub fn from_line(line: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }

    /// Decode the envelope into a typed action.  Socket-carrying actions come
    /// out holding the [`SocketSpec`]; resolving it into a live connection is
    /// the dispatcher's job.
    pub fn decode(&self) -> Result<Action<SocketSpec>, DecodeError> {
        let kind = ActionKind::from_tag(&self.kind)
            .ok_or_else(|| DecodeError::UnknownKind(self.kind.clone()))?;

        let action = match kind {
            ActionKind::SetSocket => {
                let args: SetSocketArgs = self.args_as(kind)?;
                Action::SetSocket {
                    socket: args.socket,
                }
            }
            ActionKind::DeleteSocket => Action::DeleteSocket,
            ActionKind::SetSongs => Action::SetSongs(self.args_as(kind)?),
            ActionKind::PlaySong => Action::PlaySong(self.args_as(kind)?),
            ActionKind::StopSong => Action::StopSong,
            ActionKind::SetLocation => Action::SetLocation(self.args_as(kind)?),
            ActionKind::ShowSongDetails => Action::ShowSongDetails(self.args_as(kind)?),
            ActionKind::SetAlbums => Action::SetAlbums(self.args_as(kind)?),
            ActionKind::SetAlbumSongs => Action::SetAlbumSongs(self.args_as(kind)?),
            ActionKind::SetGenres => Action::SetGenres(self.args_as(kind)?),
            ActionKind::SetGenreSongs => Action::SetGenreSongs(self.args_as(kind)?),
            ActionKind::SearchSongs => Action::SearchSongs(self.args_as(kind)?),
        };
        Ok(action)
    }

    fn args_as<T: DeserializeOwned>(&self, kind: ActionKind) -> Result<T, DecodeError> {
        // Missing args behave like an empty object so defaulted fields still apply
        let args = match &self.args {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        serde_json::from_value(args).map_err(|source| DecodeError::InvalidArgs { kind, source })
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("type unknown: {0}")]
    UnknownKind(String),
    #[error("invalid args for {kind}: {source}")]
    InvalidArgs {
        kind: ActionKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("socket {0} was not resolved to a live connection")]
    UnresolvedSocket(String),
}

/// The closed set of action tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    SetSocket,
    DeleteSocket,
    SetSongs,
    PlaySong,
    StopSong,
    SetLocation,
    ShowSongDetails,
    SetAlbums,
    SetAlbumSongs,
    SetGenres,
    SetGenreSongs,
    SearchSongs,
}

impl ActionKind {
    pub const ALL: [ActionKind; 12] = [
        ActionKind::SetSocket,
        ActionKind::DeleteSocket,
        ActionKind::SetSongs,
        ActionKind::PlaySong,
        ActionKind::StopSong,
        ActionKind::SetLocation,
        ActionKind::ShowSongDetails,
        ActionKind::SetAlbums,
        ActionKind::SetAlbumSongs,
        ActionKind::SetGenres,
        ActionKind::SetGenreSongs,
        ActionKind::SearchSongs,
    ];

    pub fn as_tag(self) -> &'static str {
        match self {
            ActionKind::SetSocket => "SET_SOCKET",
            ActionKind::DeleteSocket => "DELETE_SOCKET",
            ActionKind::SetSongs => "SET_SONGS",
            ActionKind::PlaySong => "PLAY_SONG",
            ActionKind::StopSong => "STOP_SONG",
            ActionKind::SetLocation => "SET_LOCATION",
            ActionKind::ShowSongDetails => "SHOW_SONG_DETAILS",
            ActionKind::SetAlbums => "SET_ALBUMS",
            ActionKind::SetAlbumSongs => "SET_ALBUM_SONGS",
            ActionKind::SetGenres => "SET_GENRES",
            ActionKind::SetGenreSongs => "SET_GENRE_SONGS",
            ActionKind::SearchSongs => "SEARCH_SONGS",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_tag() == tag)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A typed action.  `S` is the socket representation: [`SocketSpec`] straight
/// off the wire, or a live handle once the dispatcher has connected it.
#[derive(Debug, Clone)]
pub enum Action<S> {
    SetSocket { socket: S },
    DeleteSocket,
    SetSongs(SetSongsArgs),
    PlaySong(PlaySongArgs),
    StopSong,
    SetLocation(SetLocationArgs),
    ShowSongDetails(ShowSongDetailsArgs),
    SetAlbums(SetAlbumsArgs),
    SetAlbumSongs(SetAlbumSongsArgs),
    SetGenres(SetGenresArgs),
    SetGenreSongs(SetGenreSongsArgs),
    SearchSongs(SearchSongsArgs),
}

impl<S> Action<S> {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::SetSocket { .. } => ActionKind::SetSocket,
            Action::DeleteSocket => ActionKind::DeleteSocket,
            Action::SetSongs(_) => ActionKind::SetSongs,
            Action::PlaySong(_) => ActionKind::PlaySong,
            Action::StopSong => ActionKind::StopSong,
            Action::SetLocation(_) => ActionKind::SetLocation,
            Action::ShowSongDetails(_) => ActionKind::ShowSongDetails,
            Action::SetAlbums(_) => ActionKind::SetAlbums,
            Action::SetAlbumSongs(_) => ActionKind::SetAlbumSongs,
            Action::SetGenres(_) => ActionKind::SetGenres,
            Action::SetGenreSongs(_) => ActionKind::SetGenreSongs,
            Action::SearchSongs(_) => ActionKind::SearchSongs,
        }
    }

    /// Swap the socket representation, leaving every other variant as is.
    pub fn try_map_socket<T, E>(
        self,
        resolve: impl FnOnce(S) -> Result<T, E>,
    ) -> Result<Action<T>, E> {
        Ok(match self {
            Action::SetSocket { socket } => Action::SetSocket {
                socket: resolve(socket)?,
            },
            Action::DeleteSocket => Action::DeleteSocket,
            Action::SetSongs(a) => Action::SetSongs(a),
            Action::PlaySong(a) => Action::PlaySong(a),
            Action::StopSong => Action::StopSong,
            Action::SetLocation(a) => Action::SetLocation(a),
            Action::ShowSongDetails(a) => Action::ShowSongDetails(a),
            Action::SetAlbums(a) => Action::SetAlbums(a),
            Action::SetAlbumSongs(a) => Action::SetAlbumSongs(a),
            Action::SetGenres(a) => Action::SetGenres(a),
            Action::SetGenreSongs(a) => Action::SetGenreSongs(a),
            Action::SearchSongs(a) => Action::SearchSongs(a),
        })
    }
}

/// Where to open the socket.  Only exists on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketSpec {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SetSocketArgs {
    socket: SocketSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSongsArgs {
    pub songs: Vector<Song>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySongArgs {
    pub id: i64,
}

/// Navigation location as reported by the router.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub pathname: String,
    #[serde(default)]
    pub search: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: search.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SetLocationArgs {
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowSongDetailsArgs {
    #[serde(rename = "SongDetail")]
    pub song_detail: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SetAlbumsArgs {
    #[serde(default)]
    pub albums: Vector<SongGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetAlbumSongsArgs {
    #[serde(rename = "Albums", default)]
    pub albums: Vector<SongGroup>,
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SetGenresArgs {
    #[serde(default)]
    pub genres: Vector<SongGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetGenreSongsArgs {
    #[serde(rename = "Genres", default)]
    pub genres: Vector<SongGroup>,
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchSongsArgs {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub songs: Vector<Song>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(line: Value) -> ActionMessage {
        serde_json::from_value(line).unwrap()
    }

    #[test]
    fn test_every_tag_round_trips() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_tag(kind.as_tag()), Some(kind));
        }
        assert_eq!(ActionKind::from_tag("play_song"), None);
    }

    #[test]
    fn test_decode_unknown_kind() {
        let msg = message(json!({"type": "BOGUS"}));
        match msg.decode() {
            Err(DecodeError::UnknownKind(kind)) => assert_eq!(kind, "BOGUS"),
            other => panic!("expected UnknownKind, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_applies_defaults_without_args() {
        match message(json!({"type": "SEARCH_SONGS"})).decode().unwrap() {
            Action::SearchSongs(args) => {
                assert_eq!(args.search, "");
                assert!(args.songs.is_empty());
            }
            other => panic!("wrong action: {:?}", other),
        }
        match message(json!({"type": "SET_LOCATION", "args": {"location": {"pathname": "/flute"}}}))
            .decode()
            .unwrap()
        {
            Action::SetLocation(args) => {
                assert_eq!(args.location.pathname, "/flute");
                assert_eq!(args.location.search, "");
            }
            other => panic!("wrong action: {:?}", other),
        }
    }

    #[test]
    fn test_decode_keeps_client_field_casing() {
        let msg = message(json!({
            "type": "SET_ALBUM_SONGS",
            "args": {
                "Albums": [{"title": "Blue", "songs": [{"id": 1, "songTitle": "So What"}]}],
                "index": 0
            }
        }));
        match msg.decode().unwrap() {
            Action::SetAlbumSongs(args) => {
                assert_eq!(args.index, 0);
                assert_eq!(args.albums.len(), 1);
                assert_eq!(args.albums[0].songs[0].title(), Some("So What"));
            }
            other => panic!("wrong action: {:?}", other),
        }

        let msg = message(json!({"type": "SHOW_SONG_DETAILS", "args": {"SongDetail": {"bpm": 90}}}));
        match msg.decode().unwrap() {
            Action::ShowSongDetails(args) => assert_eq!(args.song_detail, json!({"bpm": 90})),
            other => panic!("wrong action: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_missing_required_args() {
        let msg = message(json!({"type": "PLAY_SONG", "args": {}}));
        match msg.decode() {
            Err(DecodeError::InvalidArgs { kind, .. }) => assert_eq!(kind, ActionKind::PlaySong),
            other => panic!("expected InvalidArgs, got {:?}", other),
        }
    }

    #[test]
    fn test_socket_spec_is_mapped() {
        let msg = message(json!({"type": "SET_SOCKET", "args": {"socket": {"address": "127.0.0.1:9"}}}));
        let action = msg.decode().unwrap();
        let mapped: Action<usize> = action
            .try_map_socket(|spec| Ok::<_, DecodeError>(spec.address.len()))
            .unwrap();
        match mapped {
            Action::SetSocket { socket } => assert_eq!(socket, 11),
            other => panic!("wrong action: {:?}", other),
        }

        let unresolved: Result<Action<()>, DecodeError> = msg
            .decode()
            .unwrap()
            .try_map_socket(|spec| Err(DecodeError::UnresolvedSocket(spec.address)));
        assert!(matches!(unresolved, Err(DecodeError::UnresolvedSocket(_))));
    }

    #[test]
    fn test_from_line_trims_whitespace() {
        let msg = ActionMessage::from_line("  {\"type\":\"STOP_SONG\"}\n").unwrap();
        assert_eq!(msg.kind, "STOP_SONG");
        assert_eq!(msg.args, Value::Null);
        assert!(matches!(msg.decode().unwrap(), Action::StopSong));
    }
}
