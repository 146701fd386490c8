use crate::{Easing, OptionsError};

/// Configuration for [`crate::ToolbarVisibilityController`].
///
/// Heights are in the same unit as the content surface's scroll geometry (points/pixels).
/// Durations and delays are milliseconds on the adapter's clock (the `now_ms` it passes in).
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`, so shells can keep
/// it in their own config files. Missing fields fall back to [`ToolbarOptions::default`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ToolbarOptions {
    /// Height of the header (URL bar). Fully hidden means `header_top_offset == -header_height`.
    pub header_height: f32,
    /// Height of the bottom toolbar. Also used for the short-page test and the tap dead zone.
    pub footer_height: f32,

    /// Whether the layout currently has a bottom toolbar (compact portrait layouts).
    ///
    /// When `false`, bottom taps never reveal the toolbars and short pages get no bottom inset.
    pub footer_docked: bool,

    /// Fraction of `header_height` a reverse drag must exceed to reveal hidden toolbars.
    pub reveal_threshold_ratio: f32,

    /// Duration of a full hidden → shown animation. Partial travel is scaled down linearly.
    pub base_animation_ms: u64,
    pub easing: Easing,

    /// Delay before re-checking insets while the page is still loading.
    pub load_recheck_ms: u64,
    /// Delay before re-checking insets after a content-size change.
    pub content_size_recheck_ms: u64,
    /// Settle delay after the keyboard starts hiding before the toolbars are re-committed.
    pub keyboard_settle_ms: u64,
    /// Delay before revealing the toolbars after a page unload.
    pub page_unload_reveal_ms: u64,

    /// Force-clears a zoom guard whose zoom-end never arrived.
    ///
    /// `None` disables the watchdog: a lost zoom-end then disables inset adjustment for the
    /// lifetime of the surface.
    pub zoom_watchdog_ms: Option<u64>,
}

impl Default for ToolbarOptions {
    fn default() -> Self {
        Self {
            header_height: 44.0,
            footer_height: 44.0,
            footer_docked: true,
            reveal_threshold_ratio: 0.5,
            base_animation_ms: 200,
            easing: Easing::EaseInOutCubic,
            load_recheck_ms: 200,
            content_size_recheck_ms: 200,
            keyboard_settle_ms: 200,
            page_unload_reveal_ms: 100,
            zoom_watchdog_ms: Some(2_000),
        }
    }
}

impl ToolbarOptions {
    /// Creates options for the given header and footer heights, with default timings.
    pub fn new(header_height: f32, footer_height: f32) -> Self {
        Self {
            header_height,
            footer_height,
            ..Self::default()
        }
    }

    /// The drag translation a hidden toolbar must strictly exceed before it is revealed.
    pub fn hidden_threshold(&self) -> f32 {
        self.header_height * self.reveal_threshold_ratio
    }

    /// Footer offset that mirrors a given header offset.
    pub(crate) fn footer_for_header(&self, header_top_offset: f32) -> f32 {
        -header_top_offset * self.footer_height / self.header_height
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.header_height.is_finite() && self.header_height > 0.0) {
            return Err(OptionsError::NonPositiveHeaderHeight(self.header_height));
        }
        if !(self.footer_height.is_finite() && self.footer_height >= 0.0) {
            return Err(OptionsError::NegativeFooterHeight(self.footer_height));
        }
        if !(0.0..=1.0).contains(&self.reveal_threshold_ratio) {
            return Err(OptionsError::ThresholdRatioOutOfRange(
                self.reveal_threshold_ratio,
            ));
        }
        Ok(())
    }

    pub fn with_heights(mut self, header_height: f32, footer_height: f32) -> Self {
        self.header_height = header_height;
        self.footer_height = footer_height;
        self
    }

    pub fn with_footer_docked(mut self, footer_docked: bool) -> Self {
        self.footer_docked = footer_docked;
        self
    }

    pub fn with_reveal_threshold_ratio(mut self, ratio: f32) -> Self {
        self.reveal_threshold_ratio = ratio;
        self
    }

    pub fn with_base_animation_ms(mut self, base_animation_ms: u64) -> Self {
        self.base_animation_ms = base_animation_ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_load_recheck_ms(mut self, delay_ms: u64) -> Self {
        self.load_recheck_ms = delay_ms;
        self
    }

    pub fn with_content_size_recheck_ms(mut self, delay_ms: u64) -> Self {
        self.content_size_recheck_ms = delay_ms;
        self
    }

    pub fn with_keyboard_settle_ms(mut self, delay_ms: u64) -> Self {
        self.keyboard_settle_ms = delay_ms;
        self
    }

    pub fn with_page_unload_reveal_ms(mut self, delay_ms: u64) -> Self {
        self.page_unload_reveal_ms = delay_ms;
        self
    }

    pub fn with_zoom_watchdog_ms(mut self, watchdog_ms: Option<u64>) -> Self {
        self.zoom_watchdog_ms = watchdog_ms;
        self
    }
}
