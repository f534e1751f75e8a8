//! # `progress_line`
//!
//! A thread-safe, single-line terminal progress indicator.
//!
//! A [`ProgressTracker`] renders lines of the shape
//!
//! ```text
//! \r<prefix> 42.0% [##########..............] [42/100 in 1.5s]
//! ```
//!
//! to an output sink on every value or total change, overwriting the previous
//! line in place on a terminal. It is designed to be:
//!
//! * **Concurrent**: Trackers are cheap to clone ([`Arc`](std::sync::Arc)-based) and safe to
//!   share across threads. One [`Mutex`](parking_lot::Mutex) guards all state, so lines never
//!   interleave and each reflects a consistent snapshot.
//! * **Forgiving**: No operation fails. Unset or invalid totals, widths, formats and sinks fall
//!   back to defaults at render time; sink write errors are logged through [`tracing`] and
//!   otherwise ignored.
//! * **Hookable**: An optional completion callback runs whenever a render finds the task
//!   complete, e.g. to cancel a worker pool.
//!
//! ## Modules
//!
//! * [`builder`]: Fluent interface for constructing [`ProgressTracker`] instances.
//! * [`config`]: Plain-data settings, deserializable with the `serde` feature.
//! * [`format`]: printf-style numeric templates for the `value/total` field.
//! * [`io`]: Wrappers for [`std::io::Read`] and [`std::io::Write`] that track progress automatically.
//! * [`iter`]: Extension traits for tracking progress on Iterators.
//! * [`progress`]: The core [`ProgressTracker`] and its snapshot type.
//! * [`render`]: Pure line layout and duration formatting.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builder;
pub mod config;
pub mod format;
pub mod io;
pub mod iter;
pub mod progress;
pub mod render;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::ProgressBuilder;
pub use config::ProgressConfig;
pub use format::{FormatError, NumberFormat};
pub use iter::{ProgressIter, ProgressIteratorExt};
pub use progress::{CompletionMode, ProgressSnapshot, ProgressTracker};
