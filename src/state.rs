//! Shared application state, built once at startup.

use std::sync::Arc;

use crate::config::Config;
use crate::session::{SessionStore, UserTable};

pub struct AppState {
    pub config: Config,
    pub users: UserTable,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let users = UserTable::from_config(&config);
        Arc::new(Self {
            config,
            users,
            sessions: SessionStore::default(),
        })
    }
}
