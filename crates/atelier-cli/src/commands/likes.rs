use anyhow::anyhow;
use atelier_core::{LikeController, LikeSnapshot, LikesApi, ToggleOutcome};

use crate::cli::{LikeCheckArgs, LikeToggleArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_like, render_like_check};

pub(crate) async fn handle_like_toggle(
    ctx: &AppContext,
    args: LikeToggleArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let (api, credential) = ctx.api();
    let signed_in = credential.is_some_and(|credential| credential.has_token());
    let controller = LikeController::new(
        args.design,
        LikeSnapshot {
            liked: false,
            count: args.count,
        },
    );

    if signed_in && let Err(err) = controller.load(&api, args.count).await {
        tracing::warn!(design = controller.design_id(), error = %err, "like check failed; assuming not liked");
    }

    match controller.toggle(&api, signed_in).await? {
        ToggleOutcome::Settled { state, settlement } => {
            render_like(controller.design_id(), state, Some(settlement), format)
        }
        ToggleOutcome::Busy => Err(CliError::failure(anyhow!(
            "a like toggle for {} is already in progress",
            controller.design_id()
        ))),
    }
}

pub(crate) async fn handle_like_check(
    ctx: &AppContext,
    args: &LikeCheckArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let (api, credential) = ctx.api();
    if credential.is_none() {
        return Err(CliError::validation("not logged in (run `atelier login` first)"));
    }
    let check = api.check_like(&args.design).await?;
    render_like_check(&args.design, check.liked, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use atelier_core::{Credential, CredentialStore};
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::client::tests::context_for;

    fn sign_in(ctx: &AppContext, token: &str) -> Result<()> {
        let credential: Credential = serde_json::from_value(json!({
            "user": { "id": "u1", "name": "Ada", "email": "ada@example.com", "role": "user" },
            "token": token
        }))?;
        ctx.credential_store().set(credential);
        Ok(())
    }

    #[tokio::test]
    async fn toggle_checks_then_posts_with_token() -> Result<()> {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, &dir);
        sign_in(&ctx, "tok")?;

        let check = server.mock(|when, then| {
            when.method(GET)
                .path("/likes/d1/check")
                .header("authorization", "Bearer tok");
            then.status(200)
                .json_body(json!({ "success": true, "data": { "liked": true } }));
        });
        let toggle = server.mock(|when, then| {
            when.method(POST)
                .path("/likes/d1/toggle")
                .header("authorization", "Bearer tok");
            then.status(200).json_body(json!({
                "success": true,
                "message": "Design unliked",
                "data": { "liked": false, "likesCount": 4 }
            }));
        });

        let args = LikeToggleArgs {
            design: "d1".to_string(),
            count: 5,
        };
        handle_like_toggle(&ctx, args, OutputFormat::Json)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        check.assert();
        toggle.assert();
        Ok(())
    }

    #[tokio::test]
    async fn failed_check_still_toggles() -> Result<()> {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, &dir);
        sign_in(&ctx, "tok")?;

        server.mock(|when, then| {
            when.method(GET).path("/likes/d1/check");
            then.status(503).body("unavailable");
        });
        let toggle = server.mock(|when, then| {
            when.method(POST).path("/likes/d1/toggle");
            then.status(200).json_body(json!({
                "success": true,
                "data": { "liked": true, "likesCount": 1 }
            }));
        });

        let args = LikeToggleArgs {
            design: "d1".to_string(),
            count: 0,
        };
        handle_like_toggle(&ctx, args, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        toggle.assert();
        Ok(())
    }

    #[tokio::test]
    async fn signed_out_toggle_sends_nothing() -> Result<()> {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, &dir);
        let toggle = server.mock(|when, then| {
            when.method(POST).path("/likes/d1/toggle");
            then.status(200);
        });

        let args = LikeToggleArgs {
            design: "d1".to_string(),
            count: 3,
        };
        let err = handle_like_toggle(&ctx, args, OutputFormat::Table).await.err();
        assert!(matches!(err, Some(CliError::Validation(_))));
        assert_eq!(toggle.hits(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn rejected_toggle_surfaces_server_message() -> Result<()> {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, &dir);
        sign_in(&ctx, "tok")?;

        server.mock(|when, then| {
            when.method(GET).path("/likes/d1/check");
            then.status(200)
                .json_body(json!({ "success": true, "data": { "liked": false } }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/likes/d1/toggle");
            then.status(404).json_body(json!({
                "success": false,
                "message": "Design not found"
            }));
        });

        let args = LikeToggleArgs {
            design: "d1".to_string(),
            count: 2,
        };
        let err = handle_like_toggle(&ctx, args, OutputFormat::Table).await.err();
        assert_eq!(
            err.map(|err| err.display_message()),
            Some("Design not found".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn check_requires_login() -> Result<()> {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, &dir);
        let args = LikeCheckArgs {
            design: "d1".to_string(),
        };
        let err = handle_like_check(&ctx, &args, OutputFormat::Table).await.err();
        assert!(matches!(err, Some(CliError::Validation(_))));
        Ok(())
    }
}
