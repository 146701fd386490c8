/// Rejected [`crate::ToolbarOptions`].
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum OptionsError {
    #[error("header height must be finite and greater than zero (got {0})")]
    NonPositiveHeaderHeight(f32),
    #[error("footer height must be finite and non-negative (got {0})")]
    NegativeFooterHeight(f32),
    #[error("reveal threshold ratio must lie in [0, 1] (got {0})")]
    ThresholdRatioOutOfRange(f32),
}
