/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` holds every service a handler may need:
 * - the store handle (PostgreSQL pool or in-memory collections)
 * - the session manager (JWT signing keys and TTL)
 * - the password hasher
 * - the media store for uploads
 * - the presence registry for realtime connections
 * - the loaded configuration, read-only
 *
 * Every field is cheap to clone; the state is cloned per request by axum.
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers that only need one service
 * take `State<Store>`, `State<PresenceRegistry>` and so on.
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::password::PasswordHasher;
use crate::backend::auth::sessions::SessionManager;
use crate::backend::media::MediaStore;
use crate::backend::realtime::PresenceRegistry;
use crate::backend::server::config::ServerConfig;
use crate::backend::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub sessions: Arc<SessionManager>,
    pub passwords: PasswordHasher,
    pub media: MediaStore,
    pub presence: PresenceRegistry,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire every service from `config` on top of an opened store
    pub fn new(config: ServerConfig, store: Store) -> Self {
        let sessions = SessionManager::new(config.jwt_secret(), config.token_ttl());
        let passwords = PasswordHasher::new(config.bcrypt_cost);
        let media = MediaStore::new(
            config.upload_dir.clone(),
            config.public_base_url.clone(),
            config.max_upload_bytes,
        );
        Self {
            store,
            sessions: Arc::new(sessions),
            passwords,
            media,
            presence: PresenceRegistry::new(),
            config: Arc::new(config),
        }
    }

    /// Public base URL that media references are rewritten against
    pub fn base_url(&self) -> &str {
        self.media.public_base_url()
    }
}

impl FromRef<AppState> for Store {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for Arc<SessionManager> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for MediaStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.media.clone()
    }
}

impl FromRef<AppState> for PresenceRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.presence.clone()
    }
}
