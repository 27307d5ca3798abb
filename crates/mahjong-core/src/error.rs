/// Fatal configuration errors.
///
/// Recoverable conditions (a rejected move, undo at the history start, a
/// single failed fill attempt) are not errors; they surface as `false` or
/// `None` returns, or are retried internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The template's layers do not form a rectangular box.
    #[error("template layer {layer} is not rectangular: {detail}")]
    IrregularTemplate { layer: usize, detail: String },

    /// Deals place four tiles per value; any other count can never clear.
    #[error("tile count {0} is not divisible by 4")]
    UnpairableTileCount(usize),

    /// Every generation attempt dead-ended. Only seen for templates that
    /// cannot be dealt at all, e.g. a single vertical stack.
    #[error("no winnable deal found in {0} attempts")]
    DealAttemptsExhausted(usize),
}
