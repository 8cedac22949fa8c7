use thiserror::Error;

/// Errors surfaced at the edges of the PPU core.
///
/// Dot stepping and register access are total and never fail; only
/// framebuffer construction and snapshot restoration can be rejected.
#[derive(Error, Debug)]
pub enum Error {
    /// A caller-provided pixel buffer does not hold exactly one 256x240 frame.
    #[error("framebuffer expected {expected} pixels, got {actual}")]
    FrameBufferSize { expected: usize, actual: usize },

    /// A snapshot array has the wrong length for the memory it restores.
    #[error("snapshot field `{field}` expected {expected} bytes, got {actual}")]
    SnapshotLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Binary snapshot encoding or decoding failed.
    #[cfg(feature = "savestate-postcard")]
    #[error("snapshot codec error: {0}")]
    Snapshot(#[from] postcard::Error),
}
