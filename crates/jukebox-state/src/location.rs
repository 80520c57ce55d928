//! Derive instrument and visualizer names from the navigation location.
//!
//! `/piano?visualizer=bars` selects instrument `piano` and visualizer `bars`.

use jukebox_proto::protocol::Location;
use url::form_urlencoded;

/// Query parameter naming the visualizer.
pub const VISUALIZER_PARAM: &str = "visualizer";

/// Names picked out of a location, before catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub instrument: String,
    pub visualizer: String,
}

pub fn parse_location(location: &Location) -> Selection {
    Selection {
        instrument: instrument_name(&location.pathname).to_string(),
        visualizer: visualizer_name(&location.search),
    }
}

/// The path with its leading `/` removed.  A path that does not start with
/// `/` is taken whole rather than losing its first character.
pub fn instrument_name(pathname: &str) -> &str {
    pathname.strip_prefix('/').unwrap_or(pathname)
}

/// First `visualizer` value of a `?key=value&...` query string, decoded.
/// Empty when the parameter is missing or the string has no leading `?`.
pub fn visualizer_name(search: &str) -> String {
    let Some(query) = search.strip_prefix('?') else {
        return String::new();
    };
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == VISUALIZER_PARAM)
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}
