//! One-shot session commands

use anyhow::Result;

use qt_core::config::ClientConfig;
use qt_protocol::Role;

use crate::api::ApiClient;
use crate::output::{print_info, print_success};
use crate::render::render_session;

/// Execute the create command: allocate a session and print its id.
pub async fn create_command(config: &ClientConfig) -> Result<()> {
    let api = ApiClient::new(config.api_base.clone());
    let snapshot = api.create().await?;

    print_success(&format!("Session created: {}", snapshot.id));
    print_info("Share the id; each participant picks a free role with 'qt run'.");
    Ok(())
}

/// Execute the fetch command: print the current snapshot.
pub async fn fetch_command(config: &ClientConfig, session_id: &str) -> Result<()> {
    let api = ApiClient::new(config.api_base.clone());
    let snapshot = api.fetch(session_id).await?;
    print!("{}", render_session(&snapshot, None));
    Ok(())
}

/// Execute the join command: claim a role and print the token.
pub async fn join_command(
    config: &ClientConfig,
    session_id: &str,
    role: Role,
    token: Option<&str>,
) -> Result<()> {
    let api = ApiClient::new(config.api_base.clone());
    let joined = api.join(session_id, role, token).await?;

    print_success(&format!("Joined {} as {}", session_id, joined.role));
    print_info(&format!("Token (keep it to reconnect): {}", joined.token));
    Ok(())
}

/// Execute the advance command: perform the current step.
pub async fn advance_command(config: &ClientConfig, session_id: &str, token: &str) -> Result<()> {
    let api = ApiClient::new(config.api_base.clone());
    let snapshot = api.advance(session_id, token).await?;

    print_success(&format!(
        "Advanced to step {} of {}",
        snapshot.step_index + 1,
        snapshot.steps.len()
    ));
    print!("{}", render_session(&snapshot, None));
    Ok(())
}

/// Execute the leave command: release the role and invalidate the token.
pub async fn leave_command(config: &ClientConfig, session_id: &str, token: &str) -> Result<()> {
    let api = ApiClient::new(config.api_base.clone());
    api.leave(session_id, token).await?;
    print_success("Role released; the token is no longer valid.");
    Ok(())
}
