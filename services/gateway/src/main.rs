use std::sync::Arc;

use anyhow::anyhow;
use gateway::command::parse_input_line;
use gateway::config::CONFIG_FILES;
use gateway::{GatewayConfig, GatewayError, Lobby, NoticeKind, Reply, Route};
use matching_engine::MatchingEngine;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    tracing::info!("Starting lobby gateway");

    let config = GatewayConfig::load(&CONFIG_FILES[..]).map_err(GatewayError::from)?;
    tracing::info!(
        data_path = %config.data_path.display(),
        engine = ?config.engine,
        merge_timeout_ms = config.merge_timeout_ms,
        "Configuration loaded"
    );

    let engine = Arc::new(MatchingEngine::open(&config.store_config()).map_err(GatewayError::from)?);
    let lobby = Arc::new(Lobby::new(Arc::clone(&engine)));

    // One `<user_id> <text>` per line
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some((user, text)) = parse_input_line(&line) else {
            tracing::warn!(line = %line, "Expected `<user_id> <text>`");
            continue;
        };
        let text = text.to_string();

        let lobby = Arc::clone(&lobby);
        let input = text.clone();
        let reply = tokio::task::spawn_blocking(move || lobby.handle(user, &input)).await?;

        match reply {
            Ok(Reply::Notices(notices)) => {
                for notice in notices {
                    println!("-> {}: {}", notice.recipient, notice.kind);
                }
            }
            Ok(Reply::Route(Route::Deliver { room, recipients })) => {
                for recipient in recipients {
                    println!("-> {recipient}: [room {room}] {user}: {text}");
                }
            }
            Ok(Reply::Route(Route::NotInRoom)) => {
                println!("-> {user}: {}", NoticeKind::NotInRoom);
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(user = %user, error = %e, "Request failed");
            }
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "Request rejected");
            }
        }
    }

    drop(lobby);
    let engine = Arc::try_unwrap(engine).map_err(|_| anyhow!("engine still in use at shutdown"))?;
    engine.close().map_err(GatewayError::from)?;
    tracing::info!("Gateway stopped");

    Ok(())
}
