//! Like toggle built on the optimistic command.
//!
//! # Design
//! - The UI store and the [`LikeController`] share `begin_toggle`/`settle_toggle`, so both
//!   follow the same snapshot, apply, commit-or-rollback sequence.
//! - An unresolved "is this liked" check counts as not liked; toggling is never blocked on it.
//! - Dropping an unfinished toggle rolls its guess back and frees the entity.

use std::cell::RefCell;

use atelier_api_models::LikeToggle;

use crate::api::LikesApi;
use crate::error::{ActionError, ActionResult};
use crate::optimistic::{Optimistic, Settlement, Ticket};

/// Displayed like state of a design.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct LikeSnapshot {
    /// Whether the viewer likes the design.
    pub liked: bool,
    /// Total likes on the design.
    pub count: u64,
}

impl LikeSnapshot {
    /// Local guess after a toggle: flip and adjust the count by one.
    #[must_use]
    pub const fn toggled(self) -> Self {
        if self.liked {
            Self {
                liked: false,
                count: self.count.saturating_sub(1),
            }
        } else {
            Self {
                liked: true,
                count: self.count.saturating_add(1),
            }
        }
    }
}

impl From<LikeToggle> for LikeSnapshot {
    fn from(value: LikeToggle) -> Self {
        Self {
            liked: value.liked,
            count: value.likes_count,
        }
    }
}

/// Per-design like state: confirmed server values plus the pending guess.
pub type LikeState = Optimistic<LikeSnapshot>;

/// Ticket for an in-flight like toggle.
pub type LikeTicket = Ticket<LikeSnapshot>;

/// Start a toggle on `state`; `None` when one is already in flight.
pub fn begin_toggle(state: &mut LikeState) -> Option<LikeTicket> {
    state.begin(|current| current.toggled())
}

/// Settle a toggle with the API outcome.
pub fn settle_toggle(
    state: &mut LikeState,
    ticket: &LikeTicket,
    result: &ActionResult<LikeToggle>,
) -> Settlement {
    let settlement = match result {
        Ok(toggle) => state.commit(ticket, LikeSnapshot::from(*toggle)),
        Err(_) => state.rollback(ticket),
    };
    match settlement {
        Settlement::Reconciled => {
            tracing::debug!(generation = ticket.generation(), "like count reconciled with server");
        }
        Settlement::Discarded => {
            tracing::debug!(generation = ticket.generation(), "discarded stale like response");
        }
        Settlement::Confirmed | Settlement::RolledBack => {}
    }
    settlement
}

/// Result of [`LikeController::toggle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A toggle was already in flight; nothing was sent.
    Busy,
    /// The toggle completed against the server.
    Settled {
        /// State after settlement.
        state: LikeSnapshot,
        /// How the guess compared to the server answer.
        settlement: Settlement,
    },
}

/// Like state bound to a single design.
#[derive(Debug)]
pub struct LikeController {
    design_id: String,
    state: RefCell<LikeState>,
}

impl LikeController {
    /// Controller for `design_id` seeded with `initial`.
    #[must_use]
    pub fn new(design_id: impl Into<String>, initial: LikeSnapshot) -> Self {
        Self {
            design_id: design_id.into(),
            state: RefCell::new(LikeState::new(initial)),
        }
    }

    /// Design the controller is bound to.
    #[must_use]
    pub fn design_id(&self) -> &str {
        &self.design_id
    }

    /// Displayed snapshot.
    #[must_use]
    pub fn snapshot(&self) -> LikeSnapshot {
        *self.state.borrow().current()
    }

    /// Whether a toggle is in flight.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.state.borrow().is_in_flight()
    }

    /// Seed confirmed state from a server read; ignored while a toggle is in flight.
    pub fn hydrate(&self, snapshot: LikeSnapshot) -> bool {
        self.state.borrow_mut().refresh(snapshot)
    }

    /// Fetch the viewer's like flag and combine it with the public `count`.
    ///
    /// # Errors
    ///
    /// Propagates the API failure; the state keeps its previous value.
    pub async fn load<A: LikesApi + ?Sized>(
        &self,
        api: &A,
        count: u64,
    ) -> ActionResult<LikeSnapshot> {
        let check = api.check_like(&self.design_id).await?;
        let snapshot = LikeSnapshot {
            liked: check.liked,
            count,
        };
        if !self.hydrate(snapshot) {
            tracing::debug!(design = %self.design_id, "like check ignored while toggling");
        }
        Ok(self.snapshot())
    }

    /// Toggle the like optimistically.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::AuthRequired`] without touching state when
    /// `signed_in` is false, and the API error after rolling back when the
    /// request fails.
    pub async fn toggle<A: LikesApi + ?Sized>(
        &self,
        api: &A,
        signed_in: bool,
    ) -> ActionResult<ToggleOutcome> {
        if !signed_in {
            return Err(ActionError::auth_required(format!(
                "/designs/{}",
                self.design_id
            )));
        }
        let Some(ticket) = begin_toggle(&mut self.state.borrow_mut()) else {
            tracing::debug!(design = %self.design_id, "like toggle already in flight");
            return Ok(ToggleOutcome::Busy);
        };
        let in_flight = InFlight {
            state: &self.state,
            ticket: Some(ticket),
        };

        let result = api.toggle_like(&self.design_id).await;
        let settlement = in_flight.settle(&result);

        match result {
            Ok(_) => Ok(ToggleOutcome::Settled {
                state: self.snapshot(),
                settlement,
            }),
            Err(err) => {
                tracing::warn!(design = %self.design_id, error = %err, "like toggle rolled back");
                Err(err)
            }
        }
    }
}

/// Rolls the toggle back if it is dropped before settling.
struct InFlight<'a> {
    state: &'a RefCell<LikeState>,
    ticket: Option<LikeTicket>,
}

impl InFlight<'_> {
    fn settle(mut self, result: &ActionResult<LikeToggle>) -> Settlement {
        self.ticket.take().map_or(Settlement::Discarded, |ticket| {
            settle_toggle(&mut self.state.borrow_mut(), &ticket, result)
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.state.borrow_mut().rollback(&ticket);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::time::Duration;

    use async_trait::async_trait;
    use atelier_api_models::LikeCheck;
    use tokio::sync::Notify;

    use super::*;

    #[derive(Default)]
    struct FakeLikes {
        responses: RefCell<VecDeque<ActionResult<LikeToggle>>>,
        toggles: Cell<usize>,
        liked: bool,
        hang: bool,
        gated: bool,
        gate: Notify,
    }

    impl FakeLikes {
        fn answering(responses: Vec<ActionResult<LikeToggle>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                ..Self::default()
            }
        }
    }

    #[async_trait(?Send)]
    impl LikesApi for FakeLikes {
        async fn toggle_like(&self, _design_id: &str) -> ActionResult<LikeToggle> {
            self.toggles.set(self.toggles.get() + 1);
            if self.hang {
                std::future::pending::<()>().await;
            }
            if self.gated {
                self.gate.notified().await;
            } else {
                tokio::task::yield_now().await;
            }
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ActionError::network("no scripted response")))
        }

        async fn check_like(&self, _design_id: &str) -> ActionResult<LikeCheck> {
            Ok(LikeCheck { liked: self.liked })
        }
    }

    fn start() -> LikeController {
        LikeController::new(
            "d1",
            LikeSnapshot {
                liked: false,
                count: 3,
            },
        )
    }

    #[tokio::test]
    async fn failed_toggle_restores_previous_state() {
        let api = FakeLikes::answering(vec![Err(ActionError::network("connection reset"))]);
        let controller = start();

        let err = controller.toggle(&api, true).await.expect_err("failure");

        assert!(matches!(err, ActionError::NetworkFailure { .. }));
        assert_eq!(
            controller.snapshot(),
            LikeSnapshot {
                liked: false,
                count: 3
            }
        );
        assert!(!controller.is_processing());
    }

    #[tokio::test]
    async fn successful_toggle_adopts_server_values() {
        let api = FakeLikes::answering(vec![Ok(LikeToggle {
            liked: true,
            likes_count: 4,
        })]);
        let controller = start();

        let outcome = controller.toggle(&api, true).await.expect("success");

        assert_eq!(
            outcome,
            ToggleOutcome::Settled {
                state: LikeSnapshot {
                    liked: true,
                    count: 4
                },
                settlement: Settlement::Confirmed,
            }
        );
    }

    #[tokio::test]
    async fn server_count_wins_over_local_guess() {
        let api = FakeLikes::answering(vec![Ok(LikeToggle {
            liked: true,
            likes_count: 9,
        })]);
        let controller = start();

        let outcome = controller.toggle(&api, true).await.expect("success");

        assert!(matches!(
            outcome,
            ToggleOutcome::Settled {
                settlement: Settlement::Reconciled,
                ..
            }
        ));
        assert_eq!(controller.snapshot().count, 9);
    }

    #[tokio::test]
    async fn back_to_back_toggles_send_one_request() {
        let api = FakeLikes::answering(vec![Ok(LikeToggle {
            liked: true,
            likes_count: 4,
        })]);
        let controller = start();

        let (first, second) = tokio::join!(
            controller.toggle(&api, true),
            controller.toggle(&api, true)
        );

        assert_eq!(api.toggles.get(), 1);
        assert!(matches!(first, Ok(ToggleOutcome::Settled { .. })));
        assert_eq!(second, Ok(ToggleOutcome::Busy));
    }

    #[tokio::test]
    async fn guess_is_visible_before_response() {
        let api = FakeLikes {
            gated: true,
            ..FakeLikes::answering(vec![Ok(LikeToggle {
                liked: true,
                likes_count: 4,
            })])
        };
        let controller = start();

        let observe = async {
            let seen = (controller.snapshot(), controller.is_processing());
            api.gate.notify_one();
            seen
        };
        let (result, (seen, processing)) = tokio::join!(controller.toggle(&api, true), observe);

        assert!(result.is_ok());
        assert!(processing);
        assert_eq!(
            seen,
            LikeSnapshot {
                liked: true,
                count: 4
            }
        );
    }

    #[tokio::test]
    async fn signed_out_toggle_requires_auth_and_keeps_state() {
        let api = FakeLikes::default();
        let controller = start();

        let err = controller.toggle(&api, false).await.expect_err("auth");

        assert_eq!(err, ActionError::auth_required("/designs/d1"));
        assert_eq!(api.toggles.get(), 0);
        assert_eq!(controller.snapshot().count, 3);
    }

    #[tokio::test]
    async fn dropped_toggle_rolls_back_and_releases() {
        let api = FakeLikes {
            hang: true,
            ..FakeLikes::default()
        };
        let controller = start();

        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), controller.toggle(&api, true)).await;

        assert!(timed_out.is_err());
        assert!(!controller.is_processing());
        assert_eq!(controller.snapshot().count, 3);
    }

    #[tokio::test]
    async fn load_combines_check_with_public_count() -> anyhow::Result<()> {
        let api = FakeLikes {
            liked: true,
            ..FakeLikes::default()
        };
        let controller = LikeController::new("d1", LikeSnapshot::default());

        let snapshot = controller.load(&api, 12).await?;

        assert_eq!(
            snapshot,
            LikeSnapshot {
                liked: true,
                count: 12
            }
        );
        Ok(())
    }

    #[test]
    fn unliking_at_zero_saturates() {
        let snapshot = LikeSnapshot {
            liked: true,
            count: 0,
        };
        assert_eq!(
            snapshot.toggled(),
            LikeSnapshot {
                liked: false,
                count: 0
            }
        );
    }
}
