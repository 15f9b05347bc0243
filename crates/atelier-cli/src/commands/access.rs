use atelier_core::{AccessDecision, EntitlementsApi, Entitlements};

use crate::cli::{AccessArgs, OutputFormat, PurchasesArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_access, render_purchases, render_subscription};

pub(crate) async fn handle_access(
    ctx: &AppContext,
    args: &AccessArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let (decision, signed_in) = resolve_access(ctx, &args.design).await;
    render_access(&args.design, &decision, signed_in, format)
}

/// Load entitlements for the stored credential and evaluate `design`.
///
/// Lookup failures degrade to "no records"; a signed-out caller gets the
/// login decision without any request.
async fn resolve_access(ctx: &AppContext, design: &str) -> (AccessDecision, bool) {
    let (api, credential) = ctx.api();
    let signed_in = credential.is_some_and(|credential| credential.has_token());
    let entitlements = Entitlements::load(&api, signed_in, ctx.config.purchases_limit).await;
    (entitlements.evaluate(design), signed_in)
}

pub(crate) async fn handle_purchases(
    ctx: &AppContext,
    args: &PurchasesArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let (api, credential) = ctx.api();
    if credential.is_none() {
        return Err(CliError::validation("not logged in (run `atelier login` first)"));
    }
    let limit = args.limit.unwrap_or(ctx.config.purchases_limit);
    if limit == 0 {
        return Err(CliError::validation("limit must be greater than zero"));
    }
    let (purchases, pagination) = api.purchases_page(limit).await?;
    render_purchases(&purchases, pagination, format)
}

pub(crate) async fn handle_subscription(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let (api, credential) = ctx.api();
    if credential.is_none() {
        return Err(CliError::validation("not logged in (run `atelier login` first)"));
    }
    let status = api.subscription_status().await?;
    render_subscription(&status, format)
}
