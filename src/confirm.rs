//! Destructive-action confirmation seam.
//!
//! The engine never prompts; whoever drives it supplies the gate. A
//! declined confirmation ends the operation with no side effects performed.

/// Answers "may I destroy/overwrite this?" questions for one invocation.
pub trait ConfirmationGate: Send + Sync {
    fn confirm(&self, description: &str) -> bool;
}

/// Gate that answers every question the same way. The CLI maps `--yes`
/// onto `AnswerAll(true)`; tests use both variants.
pub struct AnswerAll(pub bool);

impl ConfirmationGate for AnswerAll {
    fn confirm(&self, _description: &str) -> bool {
        self.0
    }
}
