use crate::{Insets, ScrollSnapshot};

/// The scrollable page view the controller observes.
///
/// The surface delivers its events by calling the controller's `on_*` methods. It may do so
/// synchronously from inside `set_insets`/`set_content_offset_y` (layout callbacks); the
/// controller guards against that re-entry.
pub trait ContentSurface {
    fn snapshot(&self) -> ScrollSnapshot;

    fn set_insets(&self, insets: Insets);

    fn set_content_offset_y(&self, content_offset_y: f32);
}

/// The header/footer chrome. The controller is its only writer while toolbars are scroll-driven.
pub trait ToolbarView {
    /// Resting offsets: `header_top` in `[-header_height, 0]`, `footer_bottom` in
    /// `[0, footer_height]`.
    fn set_offsets(&self, header_top: f32, footer_bottom: f32);

    /// Transient drag transform layered on top of the resting offsets. `(0, 0)` is identity.
    fn set_transform(&self, header_dy: f32, footer_dy: f32);

    /// Opacity of the toolbar's subviews (URL text, buttons).
    fn set_content_alpha(&self, alpha: f32);
}
