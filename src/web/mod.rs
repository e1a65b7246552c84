//! # Módulo Web — Interface HTTP do Sistema Especialista
//!
//! Camada web construída com **Axum** + **Maud**. A API é JSON; a página
//! inicial é HTML renderizado no servidor.
//!
//! ## Rotas
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ GET    /                       → visão geral da base (HTML) │
//! │ GET    /api/rules              → base completa (JSON)       │
//! │ POST   /api/rules              → cria regra                 │
//! │ PUT    /api/rules/{id}         → atualiza regra             │
//! │ DELETE /api/rules/{id}         → remove regra               │
//! │ GET    /api/features           → características + categorias│
//! │ GET    /api/animals            → animais + emojis           │
//! │ POST   /api/forward            → encadeamento progressivo   │
//! │ POST   /api/backward/start     → inicia sessão regressiva   │
//! │ POST   /api/backward/answer    → responde pergunta pendente │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Static Assets (tower_http::ServeDir → /assets/)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`handlers`] | Handlers Axum para cada rota |
//! | [`templates`] | Templates Maud (HTML server-side) |

pub mod handlers;
pub mod state;
pub mod templates;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
///
/// O estado `AppState` é compartilhado entre todos os handlers via
/// extrator `State<AppState>` do Axum. CORS é permissivo para que a API
/// possa ser consumida por front-ends servidos de outra origem.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // ── Página HTML ───────────────────────────────────────
        .route("/", get(handlers::index))
        // ── Base de regras ────────────────────────────────────
        .route("/api/rules", get(handlers::list_rules).post(handlers::create_rule))
        .route(
            "/api/rules/{id}",
            put(handlers::update_rule).delete(handlers::delete_rule),
        )
        .route("/api/features", get(handlers::features))
        .route("/api/animals", get(handlers::animals))
        // ── Raciocínio ────────────────────────────────────────
        .route("/api/forward", post(handlers::forward))
        .route("/api/backward/start", post(handlers::backward_start))
        .route("/api/backward/answer", post(handlers::backward_answer))
        // ── Arquivos estáticos ────────────────────────────────
        .nest_service("/assets", ServeDir::new("assets"))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
