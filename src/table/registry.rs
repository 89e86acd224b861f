use super::config::Config;
use super::room::Admission;
use super::room::Input;
use super::room::Room;
use crate::dto::Role;
use crate::dto::ServerMessage;
use crate::dto::codes;
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

pub type TableId = u64;

/// Handle to a running table coordinator.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    pub id: TableId,
    pub tx: UnboundedSender<Input>,
}

/// Directory of tables and the admission point for handshaken peers.
///
/// The map lock is short-scope only; no I/O happens under it. All real
/// work runs inside the room tasks the registry spawns.
pub struct Registry {
    config: Config,
    tables: RwLock<HashMap<TableId, RoomHandle>>,
    count: AtomicU64,
}

impl Registry {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tables: RwLock::new(HashMap::new()),
            count: AtomicU64::new(1),
        }
    }

    /// spawn a table coordinator and return its id
    pub async fn open(&self) -> TableId {
        let id = self.count.fetch_add(1, Ordering::Relaxed);
        let (room, tx) = Room::new(id, self.config.clone());
        self.tables.write().await.insert(id, RoomHandle { id, tx });
        tokio::spawn(room.run());
        log::info!("opened table {}", id);
        id
    }

    /// route a handshake to its table and wait for the seating verdict
    pub async fn admit(
        &self,
        game: Option<String>,
        name: String,
        role: Role,
    ) -> Result<(RoomHandle, Admission), ServerMessage> {
        let handle = self.resolve(game).await?;
        let (reply, verdict) = oneshot::channel();
        handle
            .tx
            .send(Input::Admit { name, role, reply })
            .map_err(|_| ServerMessage::error(codes::TABLE_CLOSED, "table is gone"))?;
        let admission = verdict
            .await
            .map_err(|_| ServerMessage::error(codes::TABLE_CLOSED, "table is gone"))??;
        Ok((handle, admission))
    }

    /// a named table, or the lowest-numbered one by default
    async fn resolve(&self, game: Option<String>) -> Result<RoomHandle, ServerMessage> {
        let tables = self.tables.read().await;
        match game {
            Some(name) => name
                .parse::<TableId>()
                .ok()
                .and_then(|id| tables.get(&id))
                .cloned()
                .ok_or_else(|| {
                    ServerMessage::error(codes::UNKNOWN_TABLE, format!("no table named {}", name))
                }),
            None => tables
                .values()
                .min_by_key(|h| h.id)
                .cloned()
                .ok_or_else(|| ServerMessage::error(codes::TABLE_CLOSED, "no tables open")),
        }
    }

    /// ask every table to finish its hand in flight and close
    pub async fn shutdown(&self) {
        for handle in self.tables.read().await.values() {
            let _ = handle.tx.send(Input::Shutdown);
        }
    }

    pub async fn healthy(&self) -> bool {
        !self.tables.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_then_admit_player() {
        let registry = Registry::new(Config::default());
        registry.open().await;
        let (_, admission) = registry
            .admit(None, "hero".to_string(), Role::Player)
            .await
            .expect("admitted");
        assert!(!admission.peer.is_nil());
    }

    #[tokio::test]
    async fn admit_routes_by_table_name() {
        let registry = Registry::new(Config::default());
        let id = registry.open().await;
        assert!(
            registry
                .admit(Some(id.to_string()), "hero".to_string(), Role::Player)
                .await
                .is_ok()
        );
        assert!(
            registry
                .admit(Some("404".to_string()), "hero".to_string(), Role::Player)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn table_fills_up() {
        let config = Config {
            max_players: 2,
            ..Config::default()
        };
        let registry = Registry::new(config);
        registry.open().await;
        for i in 0..2 {
            assert!(
                registry
                    .admit(None, format!("bot-{}", i), Role::Player)
                    .await
                    .is_ok()
            );
        }
        let refused = registry
            .admit(None, "late".to_string(), Role::Player)
            .await;
        assert!(matches!(refused, Err(ServerMessage::Error { .. })));
        // observers are always welcome
        assert!(
            registry
                .admit(None, "railbird".to_string(), Role::Observer)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn unhealthy_until_first_table() {
        let registry = Registry::new(Config::default());
        assert!(!registry.healthy().await);
        registry.open().await;
        assert!(registry.healthy().await);
    }
}
