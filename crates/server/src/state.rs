use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use hashbrown::HashMap;
use linekv_store::Table;
use log::debug;

use crate::config::ServerConfig;

/// A session bound to one client connection.
pub struct Session {
    pub id: u64,
    pub database: String,
    pub table: Arc<Mutex<Table>>,
}

pub struct ServerState {
    pub config: ServerConfig,
    databases: HashMap<String, Arc<Mutex<Table>>>,
    next_session: AtomicU64,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        let databases = config
            .databases
            .iter()
            .map(|name| (name.clone(), Arc::new(Mutex::new(Table::new()))))
            .collect();

        Self {
            config,
            databases,
            next_session: AtomicU64::new(1),
        }
    }

    /// Check credentials and bind a new session to `database`.
    pub fn open_session(
        &self,
        user: &str,
        password: &str,
        database: &str,
    ) -> Result<Session, String> {
        if user != self.config.user || password != self.config.password {
            return Err("invalid user name or password".to_string());
        }

        let table = self
            .databases
            .get(database)
            .ok_or_else(|| format!("database {database:?} does not exist"))?;

        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        debug!("Session {id} opened on {database}");

        Ok(Session {
            id,
            database: database.to_string(),
            table: Arc::clone(table),
        })
    }
}
