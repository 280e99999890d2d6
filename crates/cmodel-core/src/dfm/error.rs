/// Errors produced while building deterministic automata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Subset construction created more states than allowed.
    #[error("subset construction exceeded {limit} states")]
    StateLimitExceeded { limit: u32 },
}
