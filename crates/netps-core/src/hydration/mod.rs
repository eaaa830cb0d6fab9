//! Concurrent detail hydration for one inspected process.
//!
//! Four categories (identity, resource, ownership, sockets) are fetched on
//! worker threads and merged into a single-threaded state machine as they
//! arrive. Each visit or retry opens a new cycle with its own cancellation
//! token and generation number; results from any other cycle are discarded.

pub mod cancel;
pub mod coordinator;
pub mod msg;
pub mod runtime;
pub mod screen;
pub mod slot;
pub mod view;

pub use cancel::CancelToken;
pub use coordinator::HydrationCoordinator;
pub use msg::{Cmd, FetchResult, FetchTask, Msg};
pub use runtime::{run_fetch, DetailRuntime, Settled};
pub use screen::ScreenState;
pub use slot::{
    FetchError, FetchErrorKind, Frequency, Hydration, HydrationState, Retryability, Severity,
    SlotKind,
};
pub use view::{DetailView, ErrorLine};
