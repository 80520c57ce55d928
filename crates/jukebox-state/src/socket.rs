use std::fmt;
use std::sync::Arc;

/// A live bidirectional connection referenced from state.  What flows over
/// it is none of the reducer's business; all it ever does is close it.
pub trait SocketHandle: fmt::Debug + Send + Sync {
    /// Release the connection.  Must tolerate being called on an already
    /// closed handle.
    fn close(&self);

    /// Short human-readable label for logs.
    fn describe(&self) -> String;
}

pub type Socket = Arc<dyn SocketHandle>;

/// Handle identity, not value: two sockets are the same only if they are
/// the same allocation.
pub fn same_socket(a: &Socket, b: &Socket) -> bool {
    Arc::ptr_eq(a, b)
}
