use std::sync::Arc;

use scrumboard_db::DbPool;
use scrumboard_events::EventBus;

use crate::bootstrap::store::PgSprintStore;
use crate::bootstrap::SessionBootstrap;
use crate::config::ServerConfig;
use crate::rooms::RoomRegistry;
use crate::ws::WsManager;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    /// Every open WebSocket, for heartbeat and shutdown.
    pub ws_manager: Arc<WsManager>,
    /// Live retrospective sessions.
    pub rooms: Arc<RoomRegistry>,
    pub bootstrap: Arc<SessionBootstrap>,
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// Wire the production collaborators: sprints from Postgres, sessions
    /// from the in-process room registry.
    pub fn new(pool: DbPool, config: ServerConfig, event_bus: Arc<EventBus>) -> Self {
        let rooms = Arc::new(RoomRegistry::new(config.public_base_url.clone()));
        let bootstrap = Arc::new(SessionBootstrap::new(
            Arc::new(PgSprintStore::new(pool.clone())),
            rooms.clone(),
            config.public_base_url.clone(),
            config.provision_timeout(),
        ));

        Self {
            pool,
            config: Arc::new(config),
            ws_manager: Arc::new(WsManager::new()),
            rooms,
            bootstrap,
            event_bus,
        }
    }
}
