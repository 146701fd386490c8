//! A headless toolbar visibility engine for browser UI shells.
//!
//! This crate owns the scroll-driven show/hide behavior of a browser's header (URL bar) and
//! footer (bottom toolbar): it hides them as content scrolls away, reveals them on reverse
//! drags, taps, keyboard dismissal, page unloads and short pages, and always settles them in
//! one of two stable states once interaction stops.
//!
//! It is UI-agnostic. A GUI layer is expected to provide:
//! - a [`ContentSurface`] (scroll geometry, loading/zoom state, inset and offset setters)
//! - a [`ToolbarView`] (offset, transient transform and content-opacity setters)
//! - the scroll, zoom and keyboard events, forwarded to [`ToolbarVisibilityController`]
//! - a clock, by calling [`ToolbarVisibilityController::tick`] each frame or timer wake-up
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod error;
mod options;
mod surface;
mod timer;
mod tween;
mod types;


pub use controller::{Completion, ToolbarVisibilityController};
pub use error::OptionsError;
pub use options::ToolbarOptions;
pub use surface::{ContentSurface, ToolbarView};
pub use timer::{TimerId, TimerQueue};
pub use tween::{Easing, Tween};
pub use types::{
    ControllerStats, GuardFlags, Insets, ScrollSnapshot, ToolbarPosition, ToolbarState,
};
