use std::{env, time::Duration};

use rocket::{
    Build, Rocket,
    fairing::{Fairing, Info, Kind},
};
use tokio::time;
use tracing::{debug, info, warn};

use crate::logic::Sessions;

/// Spawns the session expiry task once the server ignites.
pub struct CleanupFairing;

#[rocket::async_trait]
impl Fairing for CleanupFairing {
    fn info(&self) -> Info {
        Info {
            name: "Session cleanup task",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        if let Some(sessions) = rocket.state::<Sessions>() {
            let sessions = sessions.clone();
            tokio::spawn(async move {
                start_cleanup_task(sessions).await;
            });
        } else {
            warn!("Failed to get session state for cleanup task");
        }
        Ok(rocket)
    }
}

pub async fn start_cleanup_task(sessions: Sessions) {
    let cleanup_interval_secs: u64 = env::var("CLEANUP_INTERVAL_SECONDS")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .unwrap_or(60);

    let inactive_timeout_secs: u64 = env::var("INACTIVE_GAME_TIMEOUT_SECONDS")
        .unwrap_or_else(|_| "600".to_string())
        .parse()
        .unwrap_or(600);

    let max_lifetime_secs: u64 = env::var("MAX_GAME_LIFETIME_SECONDS")
        .unwrap_or_else(|_| "86400".to_string())
        .parse()
        .unwrap_or(86400);

    let mut interval = time::interval(Duration::from_secs(cleanup_interval_secs));

    info!(
        "Started session cleanup task: checking every {}s, inactive timeout: {}s, max lifetime: {}s",
        cleanup_interval_secs, inactive_timeout_secs, max_lifetime_secs
    );

    loop {
        interval.tick().await;
        cleanup_sessions(&sessions, inactive_timeout_secs, max_lifetime_secs);
    }
}

fn cleanup_sessions(sessions: &Sessions, inactive_timeout_secs: u64, max_lifetime_secs: u64) {
    let mut expired = Vec::new();

    // First pass: collect expired ids. A session whose lock is held is in
    // use and gets skipped until the next sweep.
    for entry in sessions.iter() {
        if let Ok(game) = entry.value().try_lock()
            && game.should_cleanup(inactive_timeout_secs, max_lifetime_secs)
        {
            expired.push(entry.key().clone());
        }
    }

    let removed = expired.len();
    for id in expired {
        sessions.remove(&id);
        debug!("Cleaned up session: {}", id);
    }

    if removed > 0 {
        info!("Cleaned up {} expired sessions", removed);
    }
}
