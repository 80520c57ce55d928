use im::Vector;
use jukebox_proto::records::Song;

/// Songs whose title contains `query`, ignoring case and surrounding
/// whitespace on both sides.  Order is preserved.  A blank query keeps every
/// titled song; songs without a `songTitle` never match.
pub fn filter_songs(songs: &Vector<Song>, query: &str) -> Vector<Song> {
    let needle = query.trim().to_lowercase();
    songs
        .iter()
        .filter(|song| {
            song.title()
                .is_some_and(|title| title.trim().to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}
