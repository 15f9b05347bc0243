//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use atelier_api_models::{Pagination, Purchase, SubscriptionStatus, UserProfile};
use atelier_core::{AccessDecision, LikeSnapshot, SessionAction, Settlement};
use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_profile(profile: &UserProfile, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(profile)?,
        OutputFormat::Table => {
            println!("id: {}", profile.id);
            println!("name: {}", profile.name);
            println!("email: {}", profile.email);
            println!("role: {}", role_label(profile));
        }
    }
    Ok(())
}

fn role_label(profile: &UserProfile) -> &'static str {
    match profile.role {
        atelier_api_models::UserRole::User => "user",
        atelier_api_models::UserRole::Admin => "admin",
    }
}

pub(crate) fn render_like(
    design: &str,
    snapshot: LikeSnapshot,
    settlement: Option<Settlement>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "design": design,
            "liked": snapshot.liked,
            "likesCount": snapshot.count,
            "reconciled": settlement == Some(Settlement::Reconciled),
        }))?,
        OutputFormat::Table => {
            let verb = if snapshot.liked { "liked" } else { "not liked" };
            println!("{design}: {verb} ({} likes)", snapshot.count);
            if settlement == Some(Settlement::Reconciled) {
                println!("note: server count differed from the local estimate");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_like_check(design: &str, liked: bool, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({ "design": design, "liked": liked }))?,
        OutputFormat::Table => {
            println!("{design}: {}", if liked { "liked" } else { "not liked" });
        }
    }
    Ok(())
}

pub(crate) fn render_access(
    design: &str,
    decision: &AccessDecision,
    signed_in: bool,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "design": design,
            "canDownload": decision.can_download,
            "reason": decision.reason.as_str(),
            "purchaseStatus": decision.status.map(|status| status.as_str()),
            "message": decision.message,
            "action": decision.action_label(signed_in),
        }))?,
        OutputFormat::Table => {
            println!("design: {design}");
            println!("can download: {}", if decision.can_download { "yes" } else { "no" });
            println!("reason: {}", decision.reason.as_str());
            if let Some(status) = decision.status {
                println!("purchase status: {}", status.as_str());
            }
            println!("message: {}", decision.message);
            println!("action: {}", decision.action_label(signed_in));
        }
    }
    Ok(())
}

pub(crate) fn render_purchases(
    purchases: &[Purchase],
    pagination: Option<Pagination>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "purchases": purchases,
            "pagination": pagination,
        }))?,
        OutputFormat::Table => {
            println!("{:<26} {:<12} {:<10} {:>10} DESIGN", "ID", "TYPE", "STATUS", "AMOUNT");
            for purchase in purchases {
                let kind = match purchase.purchase_type {
                    atelier_api_models::PurchaseType::Individual => "individual",
                    atelier_api_models::PurchaseType::Subscription => "subscription",
                };
                let design = purchase.design.as_ref().map_or("-", |design| {
                    design.title.as_deref().unwrap_or(design.id.as_str())
                });
                println!(
                    "{:<26} {:<12} {:<10} {:>10} {}",
                    purchase.id,
                    kind,
                    purchase.status.as_str(),
                    format_amount(purchase.amount, purchase.currency.as_deref()),
                    design
                );
            }
            if let Some(footer) = pagination.and_then(|page| page_footer(&page, purchases.len())) {
                println!("{footer}");
            }
        }
    }
    Ok(())
}

fn page_footer(page: &Pagination, shown: usize) -> Option<String> {
    (page.total > 0).then(|| {
        format!(
            "showing {shown} of {} (page {}/{})",
            page.total,
            page.page.max(1),
            page.pages.max(1)
        )
    })
}

pub(crate) fn render_subscription(status: &SubscriptionStatus, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(status)?,
        OutputFormat::Table => {
            println!(
                "active: {}",
                if status.has_active_subscription { "yes" } else { "no" }
            );
            if let Some(plan) = &status.plan {
                println!("plan: {plan}");
            }
            if let Some(stats) = status.download_stats {
                let remaining = if stats.is_unlimited() {
                    "unlimited".to_string()
                } else {
                    stats.remaining_downloads.to_string()
                };
                println!("downloads remaining: {remaining}");
                println!("downloads used: {}", stats.used_downloads);
            }
            if let Some(expires) = &status.expires_at {
                println!("expires: {expires}");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_session_action(action: &SessionAction, format: OutputFormat) -> CliResult<()> {
    let (label, user) = match action {
        SessionAction::Write(credential) => ("stored", Some(credential.user.email.as_str())),
        SessionAction::Clear => ("cleared", None),
        SessionAction::Noop => ("unchanged", None),
    };
    match format {
        OutputFormat::Json => print_json(&json!({ "credential": label, "user": user }))?,
        OutputFormat::Table => match user {
            Some(email) => println!("credential {label} for {email}"),
            None => println!("credential {label}"),
        },
    }
    Ok(())
}

/// Format a price, e.g. `12.50 USD`.
pub(crate) fn format_amount(amount: Option<f64>, currency: Option<&str>) -> String {
    match (amount, currency) {
        (Some(amount), Some(currency)) => format!("{amount:.2} {}", currency.to_ascii_uppercase()),
        (Some(amount), None) => format!("{amount:.2}"),
        (None, _) => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_amount_handles_missing_parts() {
        assert_eq!(format_amount(Some(12.5), Some("usd")), "12.50 USD");
        assert_eq!(format_amount(Some(3.0), None), "3.00");
        assert_eq!(format_amount(None, Some("usd")), "-");
    }

    #[test]
    fn page_footer_reports_totals() {
        let page = Pagination {
            page: 2,
            limit: 5,
            total: 12,
            pages: 3,
        };
        assert_eq!(
            page_footer(&page, 5).as_deref(),
            Some("showing 5 of 12 (page 2/3)")
        );
        assert_eq!(page_footer(&Pagination::default(), 0), None);
    }
}
