use thiserror::Error;

/// Failures surfaced by a [`Root`](crate::Root) while driving passes.
///
/// Component evaluation failures are not represented here: a panicking
/// component unwinds through the caller and the committed tree is kept.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Updates kept triggering updates from inside passes.
    #[error("too many re-renders: more than {limit} updates chained without settling")]
    RenderLoop { limit: usize },

    #[error("root is unmounted and has no description to render")]
    Unmounted,
}
