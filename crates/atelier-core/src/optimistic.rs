//! Optimistic command: snapshot, apply, then commit or roll back.
//!
//! # Design
//! - One command per entity. At most one operation is in flight; `begin` refuses re-entry.
//! - Every `begin` bumps a generation counter. A settlement whose ticket carries an
//!   older generation is discarded, so late responses never clobber newer state.
//! - The displayed value is the pending guess when present, the confirmed value otherwise.

/// State guarded by an optimistic command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Optimistic<S> {
    confirmed: S,
    pending: Option<S>,
    in_flight: bool,
    generation: u64,
}

/// Proof of a started operation, required to settle it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use = "an optimistic operation stays in flight until its ticket is settled"]
pub struct Ticket<S> {
    generation: u64,
    snapshot: S,
}

impl<S> Ticket<S> {
    /// Value displayed before the operation started.
    pub const fn snapshot(&self) -> &S {
        &self.snapshot
    }

    /// Generation the ticket was issued for.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// How an operation settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
    /// Server value matched the local guess.
    Confirmed,
    /// Server value differed from the local guess and replaced it.
    Reconciled,
    /// The operation failed and the snapshot was restored.
    RolledBack,
    /// The ticket was no longer current; state was left untouched.
    Discarded,
}

impl<S: Clone + PartialEq> Optimistic<S> {
    /// Wrap a confirmed value with nothing in flight.
    pub const fn new(confirmed: S) -> Self {
        Self {
            confirmed,
            pending: None,
            in_flight: false,
            generation: 0,
        }
    }

    /// Value to display: the pending guess, or the confirmed value.
    pub fn current(&self) -> &S {
        self.pending.as_ref().unwrap_or(&self.confirmed)
    }

    /// Last value confirmed by the server.
    pub const fn confirmed(&self) -> &S {
        &self.confirmed
    }

    /// Pending guess, when an operation is unsettled.
    pub const fn pending(&self) -> Option<&S> {
        self.pending.as_ref()
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Current generation counter.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Start an operation: snapshot the displayed value and apply `predict` to it.
    ///
    /// Returns `None` without touching state when an operation is already in flight.
    pub fn begin(&mut self, predict: impl FnOnce(&S) -> S) -> Option<Ticket<S>> {
        if self.in_flight {
            return None;
        }
        let snapshot = self.current().clone();
        let tentative = predict(&snapshot);
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = true;
        self.pending = Some(tentative);
        Some(Ticket {
            generation: self.generation,
            snapshot,
        })
    }

    /// Settle with the authoritative server value.
    pub fn commit(&mut self, ticket: &Ticket<S>, server: S) -> Settlement {
        if !self.is_current(ticket) {
            return Settlement::Discarded;
        }
        let guess = self.pending.take();
        self.in_flight = false;
        let settlement = if guess.as_ref() == Some(&server) {
            Settlement::Confirmed
        } else {
            Settlement::Reconciled
        };
        self.confirmed = server;
        settlement
    }

    /// Settle a failed operation by restoring the ticket's snapshot.
    pub fn rollback(&mut self, ticket: &Ticket<S>) -> Settlement {
        if !self.is_current(ticket) {
            return Settlement::Discarded;
        }
        self.pending = None;
        self.in_flight = false;
        self.confirmed = ticket.snapshot.clone();
        Settlement::RolledBack
    }

    /// Replace the confirmed value from an out-of-band server read.
    ///
    /// Ignored while an operation is in flight; returns whether it was applied.
    pub fn refresh(&mut self, server: S) -> bool {
        if self.in_flight {
            return false;
        }
        self.confirmed = server;
        true
    }

    fn is_current(&self, ticket: &Ticket<S>) -> bool {
        self.in_flight && ticket.generation == self.generation
    }
}

impl<S: Default + Clone + PartialEq> Default for Optimistic<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_applies_guess_and_blocks_reentry() {
        let mut command = Optimistic::new(1_u32);
        let ticket = command.begin(|value| value + 1).expect("first begin");

        assert_eq!(*command.current(), 2);
        assert_eq!(*command.confirmed(), 1);
        assert_eq!(*ticket.snapshot(), 1);
        assert!(command.begin(|value| value + 10).is_none());
        assert_eq!(*command.current(), 2);
    }

    #[test]
    fn commit_prefers_server_value() {
        let mut command = Optimistic::new(1_u32);
        let ticket = command.begin(|value| value + 1).expect("begin");
        assert_eq!(command.commit(&ticket, 7), Settlement::Reconciled);
        assert_eq!(*command.current(), 7);
        assert!(!command.is_in_flight());

        let ticket = command.begin(|value| value + 1).expect("begin");
        assert_eq!(command.commit(&ticket, 8), Settlement::Confirmed);
    }

    #[test]
    fn rollback_restores_snapshot() {
        let mut command = Optimistic::new(5_u32);
        let ticket = command.begin(|_| 0).expect("begin");
        assert_eq!(command.rollback(&ticket), Settlement::RolledBack);
        assert_eq!(*command.current(), 5);
        assert_eq!(command.pending(), None);
        assert!(!command.is_in_flight());
    }

    #[test]
    fn stale_tickets_are_discarded() {
        let mut command = Optimistic::new(0_u32);
        let first = command.begin(|value| value + 1).expect("begin");
        assert_eq!(command.rollback(&first), Settlement::RolledBack);
        let second = command.begin(|value| value + 2).expect("begin");

        assert_eq!(command.commit(&first, 99), Settlement::Discarded);
        assert_eq!(*command.current(), 2);
        assert_eq!(command.commit(&second, 2), Settlement::Confirmed);
        assert_eq!(command.rollback(&second), Settlement::Discarded);
        assert_eq!(second.generation(), command.generation());
    }

    #[test]
    fn refresh_is_ignored_while_in_flight() {
        let mut command = Optimistic::new(0_u32);
        let ticket = command.begin(|value| value + 1).expect("begin");
        assert!(!command.refresh(10));
        assert_eq!(command.commit(&ticket, 1), Settlement::Confirmed);
        assert!(command.refresh(10));
        assert_eq!(*command.current(), 10);
    }
}
