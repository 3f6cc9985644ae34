use thiserror::Error;

/// Errors returned by the solver crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The cube state breaks a solvability invariant: duplicated cubies,
    /// corner orientation sum != 0 mod 3, edge orientation sum != 0 mod 2,
    /// or mismatched corner/edge permutation parity.
    #[error("malformed cube: solvability invariants violated")]
    MalformedCube,

    /// A pruning table file could not be read or failed verification.
    #[error("pruning table load failed: {0}")]
    TableLoad(String),

    /// A pruning table file could not be written.
    #[error("pruning table save failed: {0}")]
    TableSave(String),

    /// Bad solver configuration, e.g. thread count outside [1, 32] or
    /// solving before tables were initialized.
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    /// Reserved: the search exhausted its depth cap without a solution.
    /// Cannot occur for states that pass `verify`.
    #[error("no solution within the search depth cap")]
    Unsolvable,

    /// A scramble string contained a token that is not a face move.
    #[error("invalid scramble string")]
    InvalidScramble,

    /// A facelet string was not a well-formed 54-sticker cube definition.
    #[error("invalid facelet string")]
    InvalidFacelet,
}
