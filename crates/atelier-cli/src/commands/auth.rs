use std::io::{self, IsTerminal, Read};
use std::path::Path;

use anyhow::{Context, anyhow};
use atelier_api_models::{LoginRequest, SessionPayload};
use atelier_core::{
    AuthApi, Credential, CredentialStore, Session, SessionAction, SessionReconciler, SyncMark,
};

use crate::cli::{LoginArgs, OutputFormat, SessionImportArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_profile, render_session_action};

pub(crate) async fn handle_login(
    ctx: &AppContext,
    args: LoginArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let email = args.email.trim().to_string();
    if email.is_empty() {
        return Err(CliError::validation("email cannot be empty"));
    }
    let password = resolve_password(args.password)?;

    let payload = ctx
        .anonymous_api()
        .login(&LoginRequest { email, password })
        .await?;
    let credential = Credential::from(payload);
    if !credential.has_token() {
        return Err(CliError::failure(anyhow!("login response did not include a token")));
    }

    let store = ctx.credential_store();
    store
        .write(&credential)
        .with_context(|| format!("failed to store credential at {}", store.path().display()))
        .map_err(CliError::failure)?;
    tracing::debug!(path = %store.path().display(), "credential stored");
    render_profile(&credential.user, format)
}

fn resolve_password(provided: Option<String>) -> CliResult<String> {
    if let Some(password) = provided.filter(|value| !value.is_empty()) {
        return Ok(password);
    }
    if io::stdin().is_terminal() {
        let password = rpassword::prompt_password("Password: ").map_err(|err| {
            CliError::failure(anyhow!("failed to read password from stdin: {err}"))
        })?;
        if password.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        return Ok(password);
    }
    Err(CliError::validation(
        "password is required (pass --password or set ATELIER_PASSWORD)",
    ))
}

pub(crate) fn handle_logout(ctx: &AppContext) -> CliResult<()> {
    let store = ctx.credential_store();
    let was_signed_in = store.get().is_some();
    store
        .remove()
        .and_then(|()| store.save_mark(&SyncMark::default()))
        .with_context(|| format!("failed to remove credential at {}", store.path().display()))
        .map_err(CliError::failure)?;
    if was_signed_in {
        println!("Logged out.");
    } else {
        println!("No credential stored at {}.", store.path().display());
    }
    Ok(())
}

pub(crate) async fn handle_whoami(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let (api, credential) = ctx.api();
    if credential.is_none() {
        return Err(CliError::validation("not logged in (run `atelier login` first)"));
    }
    let profile = api.current_user().await?;
    render_profile(&profile, format)
}

/// Apply a provider session document to the credential store.
///
/// The document has the shape the web client receives from its session
/// endpoint: `{"user": {...}, "backendToken": "...", "expires": "..."}`.
/// An empty document or one without a user signs the CLI out. The sync mark
/// is carried between runs so re-importing the same document never overwrites
/// a token refreshed in the meantime.
pub(crate) fn handle_session_import(
    ctx: &AppContext,
    args: &SessionImportArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let text = read_document(&args.file)?;
    let payload: SessionPayload = serde_json::from_str(&text)
        .map_err(|err| CliError::validation(format!("session document is not valid JSON: {err}")))?;

    let session = Session::from(payload);
    let mut store = ctx.credential_store();
    let mut reconciler = SessionReconciler::resume(store.load_mark());
    let action = reconciler.observe(&session, &mut store);
    let applied = match &action {
        SessionAction::Write(credential) => store.get().as_ref() == Some(credential),
        SessionAction::Clear => store.get().is_none(),
        SessionAction::Noop => true,
    };
    if !applied {
        return Err(CliError::failure(anyhow!(
            "failed to update credential at {}",
            store.path().display()
        )));
    }
    store
        .save_mark(reconciler.mark())
        .with_context(|| format!("failed to record sync mark at {}", store.mark_path().display()))
        .map_err(CliError::failure)?;
    render_session_action(&action, format)
}

fn read_document(path: &Path) -> CliResult<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read session document from stdin")
            .map_err(CliError::failure)?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(CliError::failure)
}
