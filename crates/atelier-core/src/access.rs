//! Download entitlement evaluation.
//!
//! # Design
//! - `evaluate` is a pure function over already-fetched records; it cannot fail.
//! - Rules are ordered, first match wins: sign-in, individual purchase, subscription.
//! - A direct purchase is checked before the subscription so a pending payment is
//!   reported as pending instead of being hidden by an unrelated plan.

use atelier_api_models::{Purchase, PurchaseStatus, PurchaseType, SubscriptionStatus};
use futures_util::future::join;

use crate::api::EntitlementsApi;

const LOGIN_MESSAGE: &str = "Please login to download designs";
const NO_ACCESS_MESSAGE: &str = "Purchase this design or subscribe to download";

/// Why a download is or is not permitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessReason {
    /// The viewer bought the design.
    Purchased,
    /// The viewer's subscription covers the download.
    Subscription,
    /// No entitlement applies.
    NoAccess,
}

impl AccessReason {
    /// Wire label for the reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Purchased => "purchased",
            Self::Subscription => "subscription",
            Self::NoAccess => "no_access",
        }
    }
}

/// Download permission for one design.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessDecision {
    /// Whether the download may start now.
    pub can_download: bool,
    /// Entitlement that produced the decision.
    pub reason: AccessReason,
    /// Status of the matching purchase, for [`AccessReason::Purchased`].
    pub status: Option<PurchaseStatus>,
    /// Explanation for the viewer.
    pub message: String,
}

impl AccessDecision {
    fn no_access(message: &str) -> Self {
        Self {
            can_download: false,
            reason: AccessReason::NoAccess,
            status: None,
            message: message.to_string(),
        }
    }

    /// Label for the download button.
    #[must_use]
    pub const fn action_label(&self, signed_in: bool) -> &'static str {
        match (self.reason, self.can_download) {
            (_, true) => "Download",
            (AccessReason::Purchased, false) => "Payment pending",
            _ if !signed_in => "Log in to download",
            _ => "Buy or subscribe",
        }
    }
}

/// Records the evaluator reads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entitlements {
    /// Whether the viewer is signed in.
    pub signed_in: bool,
    /// The viewer's purchases.
    pub purchases: Vec<Purchase>,
    /// The viewer's subscription, when known.
    pub subscription: Option<SubscriptionStatus>,
}

impl Entitlements {
    /// Evaluate access to `design_id`.
    #[must_use]
    pub fn evaluate(&self, design_id: &str) -> AccessDecision {
        evaluate(
            self.signed_in,
            design_id,
            &self.purchases,
            self.subscription.as_ref(),
        )
    }

    /// Fetch purchases and subscription for a signed-in viewer.
    ///
    /// Both requests run concurrently. Either fetch failing degrades to
    /// "no records" so the evaluator still answers; the failure is logged.
    pub async fn load<A: EntitlementsApi + ?Sized>(api: &A, signed_in: bool, limit: u32) -> Self {
        if !signed_in {
            return Self::default();
        }
        let (purchases, subscription) =
            join(api.my_purchases(limit), api.subscription_status()).await;
        let purchases = match purchases {
            Ok(purchases) => purchases,
            Err(err) => {
                tracing::warn!(error = %err, "purchase lookup failed; treating as none");
                Vec::new()
            }
        };
        let subscription = match subscription {
            Ok(status) => Some(status),
            Err(err) => {
                tracing::warn!(error = %err, "subscription lookup failed; treating as inactive");
                None
            }
        };
        Self {
            signed_in,
            purchases,
            subscription,
        }
    }
}

/// Decide whether the viewer may download `design_id`.
#[must_use]
pub fn evaluate(
    signed_in: bool,
    design_id: &str,
    purchases: &[Purchase],
    subscription: Option<&SubscriptionStatus>,
) -> AccessDecision {
    if !signed_in {
        return AccessDecision::no_access(LOGIN_MESSAGE);
    }

    if let Some(purchase) = purchases.iter().find(|purchase| owns(purchase, design_id)) {
        let completed = purchase.status == PurchaseStatus::Completed;
        return AccessDecision {
            can_download: completed,
            reason: AccessReason::Purchased,
            status: Some(purchase.status),
            message: if completed {
                "You own this design".to_string()
            } else {
                "Your payment is pending. Download unlocks once it completes".to_string()
            },
        };
    }

    if let Some(message) = subscription.and_then(subscription_message) {
        return AccessDecision {
            can_download: true,
            reason: AccessReason::Subscription,
            status: None,
            message,
        };
    }

    AccessDecision::no_access(NO_ACCESS_MESSAGE)
}

fn owns(purchase: &Purchase, design_id: &str) -> bool {
    purchase.purchase_type == PurchaseType::Individual
        && matches!(
            purchase.status,
            PurchaseStatus::Completed | PurchaseStatus::Pending
        )
        && purchase
            .design
            .as_ref()
            .is_some_and(|design| design.id == design_id)
}

fn subscription_message(status: &SubscriptionStatus) -> Option<String> {
    if !status.has_active_subscription {
        return None;
    }
    let remaining = status.download_stats?.remaining_downloads;
    match remaining {
        atelier_api_models::UNLIMITED_DOWNLOADS => {
            Some("Unlimited downloads with your subscription".to_string())
        }
        1 => Some("1 download remaining on your subscription".to_string()),
        n if n > 0 => Some(format!("{n} downloads remaining on your subscription")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use atelier_api_models::{DesignRef, DownloadStats};

    use super::*;
    use crate::error::{ActionError, ActionResult};

    fn purchase(design: &str, kind: PurchaseType, status: PurchaseStatus) -> Purchase {
        Purchase {
            id: format!("p-{design}"),
            purchase_type: kind,
            design: Some(DesignRef {
                id: design.to_string(),
                title: None,
            }),
            status,
            amount: None,
            currency: None,
            created_at: None,
        }
    }

    fn subscription(active: bool, remaining: Option<i64>) -> SubscriptionStatus {
        SubscriptionStatus {
            has_active_subscription: active,
            download_stats: remaining.map(|remaining_downloads| DownloadStats {
                remaining_downloads,
                used_downloads: 0,
            }),
            plan: None,
            expires_at: None,
        }
    }

    #[test]
    fn purchase_wins_over_subscription() {
        let purchases = [purchase(
            "x",
            PurchaseType::Individual,
            PurchaseStatus::Completed,
        )];
        let active = subscription(true, Some(-1));
        let decision = evaluate(true, "x", &purchases, Some(&active));
        assert_eq!(decision.reason, AccessReason::Purchased);
        assert!(decision.can_download);
        assert_eq!(decision.status, Some(PurchaseStatus::Completed));
    }

    #[test]
    fn pending_purchase_is_reported_even_with_subscription() {
        let purchases = [purchase("x", PurchaseType::Individual, PurchaseStatus::Pending)];
        let active = subscription(true, Some(5));
        let decision = evaluate(true, "x", &purchases, Some(&active));
        assert_eq!(decision.reason, AccessReason::Purchased);
        assert!(!decision.can_download);
        assert_eq!(decision.status, Some(PurchaseStatus::Pending));
        assert_eq!(decision.action_label(true), "Payment pending");
    }

    #[test]
    fn unlimited_subscription_grants_download() {
        let active = subscription(true, Some(-1));
        let decision = evaluate(true, "x", &[], Some(&active));
        assert_eq!(decision.reason, AccessReason::Subscription);
        assert!(decision.can_download);
        assert_eq!(decision.message, "Unlimited downloads with your subscription");
    }

    #[test]
    fn capped_subscription_reports_remaining() {
        let active = subscription(true, Some(3));
        let decision = evaluate(true, "x", &[], Some(&active));
        assert!(decision.can_download);
        assert_eq!(decision.message, "3 downloads remaining on your subscription");

        let exhausted = subscription(true, Some(0));
        let decision = evaluate(true, "x", &[], Some(&exhausted));
        assert_eq!(decision.reason, AccessReason::NoAccess);
    }

    #[test]
    fn inactive_subscription_has_no_access() {
        let inactive = subscription(false, None);
        let decision = evaluate(true, "x", &[], Some(&inactive));
        assert!(!decision.can_download);
        assert_eq!(decision.reason, AccessReason::NoAccess);
        assert_eq!(decision.message, NO_ACCESS_MESSAGE);
        assert_eq!(decision.action_label(true), "Buy or subscribe");
    }

    #[test]
    fn signed_out_viewer_is_asked_to_login() {
        let purchases = [purchase(
            "x",
            PurchaseType::Individual,
            PurchaseStatus::Completed,
        )];
        let decision = evaluate(false, "x", &purchases, None);
        assert_eq!(decision.reason, AccessReason::NoAccess);
        assert_eq!(decision.message, LOGIN_MESSAGE);
        assert_eq!(decision.action_label(false), "Log in to download");
    }

    #[test]
    fn refunded_and_foreign_purchases_are_ignored() {
        let purchases = [
            purchase("x", PurchaseType::Individual, PurchaseStatus::Refunded),
            purchase("y", PurchaseType::Individual, PurchaseStatus::Completed),
            purchase("x", PurchaseType::Subscription, PurchaseStatus::Completed),
        ];
        let decision = evaluate(true, "x", &purchases, None);
        assert_eq!(decision.reason, AccessReason::NoAccess);
    }

    struct FlakyEntitlements;

    #[async_trait(?Send)]
    impl EntitlementsApi for FlakyEntitlements {
        async fn my_purchases(&self, _limit: u32) -> ActionResult<Vec<Purchase>> {
            Err(ActionError::network("timeout"))
        }

        async fn subscription_status(&self) -> ActionResult<SubscriptionStatus> {
            Ok(subscription(true, Some(-1)))
        }
    }

    #[tokio::test]
    async fn failed_purchase_lookup_degrades_to_subscription_only() {
        let entitlements = Entitlements::load(&FlakyEntitlements, true, 100).await;
        assert!(entitlements.purchases.is_empty());
        assert_eq!(
            entitlements.evaluate("x").reason,
            AccessReason::Subscription
        );
    }

    #[derive(Default)]
    struct GatedEntitlements {
        subscription_seen: tokio::sync::Notify,
    }

    #[async_trait(?Send)]
    impl EntitlementsApi for GatedEntitlements {
        async fn my_purchases(&self, _limit: u32) -> ActionResult<Vec<Purchase>> {
            self.subscription_seen.notified().await;
            Ok(vec![purchase("x", PurchaseType::Individual, PurchaseStatus::Completed)])
        }

        async fn subscription_status(&self) -> ActionResult<SubscriptionStatus> {
            self.subscription_seen.notify_one();
            Ok(subscription(false, None))
        }
    }

    #[tokio::test]
    async fn purchases_and_subscription_load_together() {
        let api = GatedEntitlements::default();
        let loaded = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            Entitlements::load(&api, true, 100),
        )
        .await;
        let Ok(entitlements) = loaded else {
            panic!("purchase lookup waited for the subscription lookup to start");
        };
        assert_eq!(entitlements.purchases.len(), 1);
        assert_eq!(entitlements.evaluate("x").reason, AccessReason::Purchased);
    }

    #[tokio::test]
    async fn signed_out_load_skips_requests() {
        let entitlements = Entitlements::load(&FlakyEntitlements, false, 100).await;
        assert_eq!(entitlements, Entitlements::default());
    }
}
