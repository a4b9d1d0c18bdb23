//! Headless client core for the synchronized desktop.
//!
//! The crate holds everything a client needs besides I/O: the [`reduce_desktop`] reducer that
//! applies pushed snapshots and turns user actions into gateway commands, the
//! [`DragResizeController`] pointer state machine, content-provider dispatch, and the
//! [`render_desktop`] view model. Browser and native hosts drive it and execute its
//! [`RuntimeEffect`]s.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod backoff;
pub mod content;
pub mod controller;
pub mod host;
pub mod interaction;
pub mod model;
pub mod reducer;
pub mod view;

pub use backoff::Backoff;
pub use content::{ContentInput, ContentKind, ContentProvider, ContentView};
pub use controller::DesktopController;
pub use host::{
    deliver, CommandFuture, CommandTransport, MemoryCommandTransport, NoopCommandTransport,
};
pub use interaction::{DragResizeController, InteractionPhase, DEFAULT_MIN_SEND_INTERVAL_MS};
pub use model::*;
pub use reducer::{reduce_desktop, DesktopAction, ReducerError, RuntimeEffect};
pub use view::{render_desktop, ConnectionBanner, DesktopView, MinimizedWindow, WindowView};
