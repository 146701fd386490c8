/// The offsets the controller owns for the header and footer chrome.
///
/// `header_top_offset` is `0` when the header is fully shown and `-header_height` when it is
/// fully hidden. `footer_bottom_offset` mirrors it (`0` shown, `footer_height` hidden).
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToolbarState {
    pub header_top_offset: f32,
    pub footer_bottom_offset: f32,
    /// In-flight drag delta. Reset to `0` on every commit.
    pub translation: f32,
}

/// Coarse classification of [`ToolbarState::header_top_offset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToolbarPosition {
    Shown,
    Hidden,
    Transitioning,
}

/// A read-only view of the scrollable content surface, sampled once per event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollSnapshot {
    pub content_offset_y: f32,
    pub content_height: f32,
    pub viewport_height: f32,
    pub is_zooming: bool,
    pub is_loading: bool,
}

impl ScrollSnapshot {
    /// Whether the page is tall enough that the user can scroll the toolbars away and back.
    ///
    /// Short pages never satisfy this, so a hidden toolbar could never be revealed by gesture.
    pub fn is_tall_enough_to_scroll(&self, toolbar_height: f32) -> bool {
        self.viewport_height + 2.0 * toolbar_height < self.content_height
    }
}

/// Latches that suppress specific classes of toolbar/inset updates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GuardFlags {
    /// A deferred load re-check is pending. At most one may exist per controller.
    pub is_adjusting_insets: bool,
    /// A pinch-zoom is in progress; inset adjustment is suppressed.
    pub is_zooming: bool,
    pub keyboard_visible: bool,
}

/// Top/bottom padding requested from the content surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insets {
    pub top: f32,
    pub bottom: f32,
}

/// Diagnostic counters. None of these affect behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerStats {
    /// Commits that moved the toolbar between stable states.
    pub commits: u64,
    /// Re-entrant content-size notifications that were dropped.
    pub reentrant_drops: u64,
    /// Deferred callbacks that ran from `tick`.
    pub deferred_runs: u64,
    /// Times the zoom watchdog force-cleared a stuck zoom guard.
    pub watchdog_releases: u64,
}
