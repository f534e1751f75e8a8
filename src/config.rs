//! Plain-data tracker configuration.
//!
//! [`ProgressConfig`] holds the settings that make sense outside of code
//! (no sink, no callback), so it can live in an application's own config
//! file. With the `serde` feature every field is optional on input and falls
//! back to the same defaults as [`ProgressTracker::new`](crate::ProgressTracker::new).

use compact_str::CompactString;

use crate::progress::CompletionMode;

/// Serializable settings for a [`ProgressTracker`](crate::ProgressTracker).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ProgressConfig {
    /// Target total; non-positive means `100`.
    pub total: f64,
    /// Bar width in glyphs; `0` means `24`.
    pub width: usize,
    /// Label printed before the percentage.
    pub prefix: CompactString,
    /// Numeric template; empty means `%1.0f`.
    pub format: CompactString,
    /// When the completion callback fires.
    pub completion: CompletionMode,
}
