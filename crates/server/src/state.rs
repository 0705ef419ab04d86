use crate::{config::Config, repo::Repository, session::SessionRegistry};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub config: Config,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(repo: Repository, config: Config) -> Self {
        Self {
            repo,
            config,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }
}
