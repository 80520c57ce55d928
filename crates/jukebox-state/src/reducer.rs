//! The state-transition function.
//!
//! `reduce` is pure: it never closes sockets and never logs.  When SET_SOCKET
//! displaces a live handle, that handle comes back in [`Reduced::released`]
//! and the caller (see [`crate::store::Store`]) closes it.

use im::Vector;
use jukebox_proto::protocol::{Action, SetLocationArgs};
use jukebox_proto::records::{Song, SongGroup};

use crate::error::ReduceError;
use crate::location::parse_location;
use crate::search::filter_songs;
use crate::socket::{same_socket, Socket};
use crate::state::AppState;

/// Outcome of one transition.
#[derive(Debug)]
pub struct Reduced {
    pub state: AppState,
    /// Handle displaced by this transition that must now be closed.
    pub released: Option<Socket>,
}

impl Reduced {
    fn new(state: AppState) -> Self {
        Self {
            state,
            released: None,
        }
    }
}

pub fn reduce(state: &AppState, action: Action<Socket>) -> Result<Reduced, ReduceError> {
    let mut next = state.clone();

    match action {
        Action::SetSocket { socket } => {
            let released = next
                .socket
                .replace(socket.clone())
                .filter(|old| !same_socket(old, &socket));
            return Ok(Reduced {
                state: next,
                released,
            });
        }
        Action::DeleteSocket => {
            next.socket = None;
        }
        Action::SetSongs(args) => {
            next.songs = args.songs;
        }
        Action::PlaySong(args) => {
            let song = next
                .songs
                .iter()
                .find(|s| s.id() == Some(args.id))
                .ok_or(ReduceError::SongNotFound { id: args.id })?;
            next.notes = Some(song.notes());
        }
        Action::StopSong => {
            next.notes = None;
        }
        Action::SetLocation(SetLocationArgs { location }) => {
            let selection = parse_location(&location);
            next.instrument = next.instruments.find(&selection.instrument);
            next.visualizer = next.visualizers.find(&selection.visualizer);
        }
        Action::ShowSongDetails(args) => {
            next.song_detail = Some(args.song_detail);
        }
        Action::SetAlbums(args) => {
            next.albums = args.albums;
        }
        Action::SetAlbumSongs(args) => {
            let songs = group_songs(&args.albums, args.index).ok_or(
                ReduceError::AlbumIndexOutOfRange {
                    index: args.index,
                    len: args.albums.len(),
                },
            )?;
            next.filtered_songs = Some(songs);
        }
        Action::SetGenres(args) => {
            next.genres = args.genres;
        }
        Action::SetGenreSongs(args) => {
            let songs = group_songs(&args.genres, args.index).ok_or(
                ReduceError::GenreIndexOutOfRange {
                    index: args.index,
                    len: args.genres.len(),
                },
            )?;
            next.filtered_songs = Some(songs);
        }
        Action::SearchSongs(args) => {
            next.filtered_songs = Some(filter_songs(&args.songs, &args.search));
        }
    }

    Ok(Reduced::new(next))
}

/// Songs of the group at `index`.  A negative index counts back from the
/// end, so `-1` is the last group.
fn group_songs(groups: &Vector<SongGroup>, index: i64) -> Option<Vector<Song>> {
    let len = i64::try_from(groups.len()).ok()?;
    let from_start = if index < 0 { len + index } else { index };
    let from_start = usize::try_from(from_start).ok()?;
    groups.get(from_start).map(|group| group.songs.clone())
}
