use anyhow::{anyhow, Context};
use social_client::store::{Change, Store};
use social_client::{logging, Config, Session, SocialClient};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load().context("failed to load configuration")?;
    cfg.validate().context("invalid configuration")?;
    logging::init_tracing(cfg.log_json);

    let session: Session = cfg
        .session
        .clone()
        .map(Session::from)
        .ok_or_else(|| anyhow!("SOCIAL_CLIENT__SESSION__USER_ID is not set"))?;

    let client = SocialClient::new(&cfg)?;
    client.on_presence_update("headless", |set| {
        info!(online = set.len(), "Presence updated");
    });

    let mut changes = client.store().subscribe();
    client.begin_session(session)?;

    if let Err(e) = client.chat().load_suggested_users().await {
        warn!(error = %e, "Could not load suggested users");
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
            event = changes.recv() => match event {
                Ok(event) => render(client.store(), &event.change),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Store events dropped"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    client.end_session();
    Ok(())
}

/// Headless view binding: log the slice that changed
fn render(store: &Store, change: &Change) {
    match change {
        Change::Conversation(counterpart) => store.select(|s| {
            if let Some(message) = s
                .chat
                .conversation(counterpart)
                .and_then(|c| c.last())
            {
                info!(
                    counterpart = %counterpart,
                    from = %message.sender_id,
                    text = %message.text,
                    "Conversation updated"
                );
            }
        }),
        Change::Notifications => store.select(|s| {
            info!(unread = s.notifications.unread_count(), "Notifications updated");
        }),
        Change::SuggestedUsers => store.select(|s| {
            for user in &s.auth.suggested_users {
                let online = s.chat.presence.is_online(&user.id);
                info!(user = %user.username, online, "Suggested user");
            }
        }),
        other => tracing::debug!(change = ?other, "State changed"),
    }
}
