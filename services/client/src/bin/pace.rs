//! services/client/src/bin/pace.rs

use client_lib::{
    app::{AppState, AuthRepository, UniversityRepository},
    config::Config,
    error::ClientError,
    telemetry,
};
use pace_core::network::NetworkResult;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    telemetry::init_tracing(&config);
    info!("Configuration loaded. Starting PACE client...");

    // --- 2. Open Local Storage & Wire Adapters ---
    let state = AppState::bootstrap(config).await?;

    // --- 3. Restore the Cached Session ---
    let auth = AuthRepository::from_state(&state);
    match auth.restore_session().await? {
        Some(record) => info!(
            user = %record.user_name,
            role = %record.role,
            university_id = ?record.university_id,
            "Session restored"
        ),
        None => info!("No cached session, sign-in required"),
    }
    match auth.active_user_type().await {
        Some(user_type) => info!(?user_type, "Active user"),
        None => info!("No active user"),
    }

    // --- 4. Report Any Captured Invite ---
    let universities = UniversityRepository::from_state(&state);
    if let Some(link) = state.session_store.get_dynamic_link().await {
        info!(
            university_id = link.university_id,
            verified = link.is_verified,
            "University invite on file"
        );
        if let Some(NetworkResult::Error { status, message }) = universities.invited_university().await {
            warn!(status, message = %message, "Could not resolve the invited university");
        }
    }

    Ok(())
}
