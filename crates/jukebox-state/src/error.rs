use thiserror::Error;

/// A lookup inside a transition came up empty.  The dispatch that caused it
/// fails as a whole; no partial snapshot is ever produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReduceError {
    #[error("no song with id {id}")]
    SongNotFound { id: i64 },

    #[error("album index {index} out of range ({len} albums)")]
    AlbumIndexOutOfRange { index: i64, len: usize },

    #[error("genre index {index} out of range ({len} genres)")]
    GenreIndexOutOfRange { index: i64, len: usize },
}
