//! Monotonic task generations used to drop stale renders.
//!
//! # Invariants
//! - Tickets are strictly increasing across all tasks sharing a gate.
//! - Only the holder of the latest ticket may render.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskTicket(u64);

impl TaskTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct GenerationGate {
    latest: AtomicU64,
}

impl GenerationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new task generation, superseding all earlier tickets.
    pub fn begin(&self) -> TaskTicket {
        TaskTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: TaskTicket) -> bool {
        self.latest() == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::GenerationGate;

    #[test]
    fn newer_ticket_supersedes_older() {
        let gate = GenerationGate::new();
        let first = gate.begin();
        assert!(gate.is_current(first));

        let second = gate.begin();
        assert!(second > first);
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
        assert_eq!(gate.latest(), 2);
    }
}
