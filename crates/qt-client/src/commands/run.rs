//! Interactive session mode
//!
//! Joins (or resumes) a role, opens the push channel, renders every
//! update, and advances on ENTER when the local gate mirror allows it.
//! A dropped channel reconnects automatically with the retained token;
//! the role is only released on an explicit quit.

use anyhow::{bail, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use qt_core::config::ClientConfig;
use qt_protocol::{Role, WsMessage};

use crate::backoff::ExponentialBackoff;
use crate::controller::{ClientStatus, SessionController};
use crate::output::{print_error, print_info, print_success, print_warning};
use crate::render::render_session;

/// Execute the interactive run command.
pub async fn run_command(
    config: &ClientConfig,
    session_id: &str,
    role: Role,
    token: Option<String>,
) -> Result<()> {
    let mut controller = SessionController::new(config);
    controller.lookup(session_id).await?;

    match token {
        Some(token) => {
            controller.resume(role, token);
            print_info(&format!("Resuming {} with the held token", role));
        }
        None => {
            controller.join(role).await?;
            print_success(&format!("Joined as {}", role));
            if let Some(token) = controller.token() {
                print_info(&format!("Token (keep it to reconnect): {}", token));
            }
        }
    }

    print_info("ENTER advances when it is your step; 'q' leaves the session.");

    let mut backoff = ExponentialBackoff::for_reconnect();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    'outer: loop {
        let mut push = match controller.open_push().await {
            Ok(push) => {
                backoff.reset();
                push
            }
            Err(err) => {
                let delay = backoff.next_delay();
                print_warning(&format!(
                    "Push channel unavailable ({}), retrying in {:.0?}",
                    err, delay
                ));
                tokio::time::sleep(delay).await;
                continue;
            }
        };

        loop {
            tokio::select! {
                message = push.next_message() => {
                    match message {
                        Some(WsMessage::Error { message }) => {
                            // The gateway only sends errors on a rejected
                            // handshake; the connection is about to close.
                            print_error(&message);
                            bail!("gateway rejected the connection: {}", message);
                        }
                        Some(message) => {
                            controller.apply_push(&message);
                            if let Some(snapshot) = controller.session() {
                                print!("{}", render_session(snapshot, controller.local()));
                                if controller.can_advance() {
                                    print_info("Your step - press ENTER to advance");
                                }
                            }
                        }
                        None => {
                            controller.mark_disconnected();
                            if controller.status() != ClientStatus::Disconnected {
                                break 'outer;
                            }
                            print_warning("Connection lost, reconnecting...");
                            continue 'outer;
                        }
                    }
                }
                line = stdin.next_line() => {
                    match line {
                        Ok(Some(input)) => match input.trim() {
                            "" => {
                                if controller.can_advance() {
                                    if let Err(err) = controller.advance().await {
                                        print_error(&format!("Advance rejected: {}", err));
                                    }
                                } else {
                                    print_info("The current step is not yours to perform.");
                                }
                            }
                            "q" | "quit" => {
                                push.close().await;
                                controller.leave().await?;
                                print_success("Left the session");
                                break 'outer;
                            }
                            _ => print_info("ENTER to advance, 'q' to leave."),
                        },
                        // stdin closed: keep the role, just stop watching.
                        Ok(None) | Err(_) => {
                            push.close().await;
                            print_info("Input closed; role stays claimed for reconnection.");
                            break 'outer;
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
