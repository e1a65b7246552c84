//! # Estado da Aplicação Web
//!
//! Estado compartilhado entre todos os handlers Axum.
//!
//! ```text
//! AppState
//!  ├── kb          Arc<RwLock<KnowledgeBase>>  read: inferência / write: CRUD
//!  ├── sessions    Arc<SessionStore>           sessões regressivas (lock por sessão)
//!  └── rules_path  Arc<PathBuf>                destino de save_rules após CRUD
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::KnowledgeBase;
use crate::session::SessionStore;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    /// Base de regras compartilhada, protegida por `RwLock`.
    pub kb: Arc<RwLock<KnowledgeBase>>,
    /// Sessões do encadeamento regressivo.
    pub sessions: Arc<SessionStore>,
    /// Arquivo onde a base é persistida após cada alteração.
    pub rules_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(kb: KnowledgeBase, sessions: SessionStore, rules_path: PathBuf) -> Self {
        Self {
            kb: Arc::new(RwLock::new(kb)),
            sessions: Arc::new(sessions),
            rules_path: Arc::new(rules_path),
        }
    }
}
