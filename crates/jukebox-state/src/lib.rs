//! Application state for the jukebox client and the reducer that moves it
//! from one snapshot to the next.

pub mod error;
pub mod location;
pub mod reducer;
pub mod search;
pub mod socket;
pub mod state;
pub mod store;

pub use error::ReduceError;
pub use reducer::{reduce, Reduced};
pub use socket::{Socket, SocketHandle};
pub use state::AppState;
pub use store::Store;

/// An action whose socket, if any, is already a live handle.
pub type Action = jukebox_proto::protocol::Action<Socket>;
