//! Record types carried by actions and held in application state.

use std::sync::Arc;

use im::Vector;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// A song exactly as the server sent it.  Only the fields a transition
/// actually reads are looked at, and only when it reads them: PLAY_SONG
/// needs `id`, SEARCH_SONGS needs `songTitle`.  Anything else, including
/// non-object songs, passes through state untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Song(pub Value);

impl Song {
    /// Integer `id`, if the song has one.
    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("songTitle").and_then(Value::as_str)
    }

    /// Note payload handed to the player; `null` when the song has none.
    pub fn notes(&self) -> Value {
        self.0.get("notes").cloned().unwrap_or(Value::Null)
    }
}

impl From<Value> for Song {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// An album or genre: a named bucket of songs plus whatever metadata the
/// server attached to it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SongGroup {
    #[serde(default)]
    pub songs: Vector<Song>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Anything that can be looked up by name in a [`Catalog`].
pub trait Named {
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Instrument {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl Named for Instrument {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visualizer {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Visualizer {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl Named for Visualizer {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Fixed, ordered reference list.  Entries are shared, so a lookup hands out
/// the very entry stored in the catalog rather than a copy of it.
#[derive(Debug, PartialEq)]
pub struct Catalog<T> {
    entries: Arc<[Arc<T>]>,
}

impl<T: Named> Catalog<T> {
    pub fn new(entries: impl IntoIterator<Item = T>) -> Self {
        let entries: Vec<Arc<T>> = entries.into_iter().map(Arc::new).collect();
        Self {
            entries: entries.into(),
        }
    }

    /// First entry whose name matches exactly.
    pub fn find(&self, name: &str) -> Option<Arc<T>> {
        self.entries.iter().find(|e| e.name() == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Clone for Catalog<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        let empty: Vec<Arc<T>> = Vec::new();
        Self {
            entries: empty.into(),
        }
    }
}

impl<T: Serialize> Serialize for Catalog<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().map(|e| e.as_ref()))
    }
}
