//! Store — owns the current snapshot and wraps the pure reducer with the
//! two things it must not do itself: closing displaced sockets and logging.

use std::sync::Arc;

use jukebox_proto::protocol::{ActionMessage, DecodeError};
use tracing::{debug, error};

use crate::error::ReduceError;
use crate::reducer::reduce;
use crate::socket::Socket;
use crate::state::AppState;
use crate::Action;

pub struct Store {
    state: Arc<AppState>,
}

impl Store {
    pub fn new(initial: AppState) -> Self {
        Self {
            state: Arc::new(initial),
        }
    }

    /// The current snapshot.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Apply one action.  On failure the current snapshot stays in place and
    /// the error is handed back for the caller to deal with.
    pub fn dispatch(&mut self, action: Action) -> Result<Arc<AppState>, ReduceError> {
        let kind = action.kind();
        debug!("{}", kind);

        let reduced = reduce(&self.state, action)?;
        if let Some(old) = reduced.released {
            debug!("closing replaced socket {}", old.describe());
            old.close();
        }
        self.state = Arc::new(reduced.state);

        debug!(state = %self.state.redacted(), "{} applied", kind);
        Ok(self.state())
    }

    /// Decode a wire envelope and apply it.  Unknown or malformed actions are
    /// logged and leave the state untouched.  SET_SOCKET envelopes only name
    /// an address; they have to be connected by the caller and passed to
    /// [`Store::dispatch`] instead.
    pub fn dispatch_message(
        &mut self,
        message: &ActionMessage,
    ) -> Result<Arc<AppState>, ReduceError> {
        let decoded = message
            .decode()
            .and_then(|action| action.try_map_socket(unresolved));
        self.dispatch_decoded(message, decoded)
    }

    /// Apply an envelope the caller already decoded.  A decode failure is
    /// logged with the envelope's raw args and leaves the state untouched.
    pub fn dispatch_decoded(
        &mut self,
        message: &ActionMessage,
        decoded: Result<Action, DecodeError>,
    ) -> Result<Arc<AppState>, ReduceError> {
        match decoded {
            Ok(action) => self.dispatch(action),
            Err(e) => {
                error!("{}\n{}", e, message.args);
                Ok(self.state())
            }
        }
    }

    /// Close the live socket, if any, and drop it from state.  Used on
    /// shutdown, where no further action will displace it.
    pub fn close_socket(&mut self) {
        let Some(socket) = self.state.socket.clone() else {
            return;
        };
        debug!("closing socket {} on shutdown", socket.describe());
        socket.close();
        if let Err(e) = self.dispatch(Action::DeleteSocket) {
            error!("failed to drop closed socket from state: {}", e);
        }
    }
}

fn unresolved(spec: jukebox_proto::protocol::SocketSpec) -> Result<Socket, DecodeError> {
    Err(DecodeError::UnresolvedSocket(spec.address))
}
