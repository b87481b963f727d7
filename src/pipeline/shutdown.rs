//! Shutdown sequencing for the fetch pipeline.
//!
//! ```text
//! Filling ─► Draining ─► WorkersJoined ─► SinksClosing ─► SinksJoined
//! ```
//!
//! - `Filling`: identifiers are being submitted to the shared source.
//! - `Draining`: the source is closed; workers finish in-flight fetches.
//! - `WorkersJoined`: every worker task has returned.
//! - `SinksClosing`: result and error inputs are closed.
//! - `SinksJoined`: both sinks have drained and returned. Terminal.

use std::fmt;

use crate::error::{AppError, Result};

/// A stage of pipeline shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Filling,
    Draining,
    WorkersJoined,
    SinksClosing,
    SinksJoined,
}

impl Phase {
    /// The only phase that may follow this one.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Filling => Some(Phase::Draining),
            Phase::Draining => Some(Phase::WorkersJoined),
            Phase::WorkersJoined => Some(Phase::SinksClosing),
            Phase::SinksClosing => Some(Phase::SinksJoined),
            Phase::SinksJoined => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::SinksJoined
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Filling => "filling",
            Phase::Draining => "draining",
            Phase::WorkersJoined => "workers-joined",
            Phase::SinksClosing => "sinks-closing",
            Phase::SinksJoined => "sinks-joined",
        };
        f.write_str(name)
    }
}

/// Tracks the current phase and rejects out-of-order transitions.
#[derive(Debug, Clone)]
pub struct ShutdownState {
    history: Vec<Phase>,
}

impl ShutdownState {
    pub fn new() -> Self {
        Self {
            history: vec![Phase::Filling],
        }
    }

    pub fn phase(&self) -> Phase {
        // history always holds at least the initial phase
        self.history.last().copied().unwrap_or(Phase::Filling)
    }

    /// Move to `next`, which must be the direct successor of the current phase.
    pub fn advance(&mut self, next: Phase) -> Result<()> {
        let current = self.phase();
        if current.next() != Some(next) {
            return Err(AppError::shutdown(format!(
                "cannot move from {current} to {next}"
            )));
        }
        log::debug!("Pipeline phase: {} -> {}", current, next);
        self.history.push(next);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.phase().is_terminal()
    }

    /// Every phase visited so far, in order.
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    pub fn into_history(self) -> Vec<Phase> {
        self.history
    }
}

impl Default for ShutdownState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_sequence() {
        let mut state = ShutdownState::new();
        assert_eq!(state.phase(), Phase::Filling);

        state.advance(Phase::Draining).unwrap();
        state.advance(Phase::WorkersJoined).unwrap();
        state.advance(Phase::SinksClosing).unwrap();
        assert!(!state.is_complete());
        state.advance(Phase::SinksJoined).unwrap();

        assert!(state.is_complete());
        assert_eq!(
            state.history(),
            &[
                Phase::Filling,
                Phase::Draining,
                Phase::WorkersJoined,
                Phase::SinksClosing,
                Phase::SinksJoined,
            ]
        );
    }

    #[test]
    fn test_cannot_close_sinks_before_workers_joined() {
        let mut state = ShutdownState::new();
        state.advance(Phase::Draining).unwrap();

        let err = state.advance(Phase::SinksClosing).unwrap_err();
        assert!(matches!(err, AppError::Shutdown(_)));
        assert_eq!(state.phase(), Phase::Draining);
    }

    #[test]
    fn test_cannot_skip_draining() {
        let mut state = ShutdownState::new();
        assert!(state.advance(Phase::WorkersJoined).is_err());
        assert!(state.advance(Phase::SinksJoined).is_err());
        assert_eq!(state.history(), &[Phase::Filling]);
    }

    #[test]
    fn test_terminal_phase_has_no_successor() {
        let mut state = ShutdownState::new();
        for phase in [
            Phase::Draining,
            Phase::WorkersJoined,
            Phase::SinksClosing,
            Phase::SinksJoined,
        ] {
            state.advance(phase).unwrap();
        }
        assert!(state.advance(Phase::Filling).is_err());
        assert!(state.advance(Phase::SinksJoined).is_err());
    }

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::Filling < Phase::Draining);
        assert!(Phase::WorkersJoined < Phase::SinksClosing);
        assert_eq!(Phase::SinksJoined.next(), None);
    }
}
