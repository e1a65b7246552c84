#![allow(dead_code)]
//! # Sistema Especialista de Animais
//!
//! **Ponto de entrada** do servidor de identificação de animais por
//! regras de produção.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (RUST_LOG)
//!   ├── Lê Config do ambiente
//!   ├── Carrega a base de regras (ou a base padrão embutida)
//!   ├── Monta AppState (base + SessionStore) e Router
//!   ├── Spawn: varredura periódica de sessões expiradas
//!   └── Serve HTTP em EXPERT_BIND_ADDR (padrão 0.0.0.0:5000)
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Executar com logs padrão (info)
//! cargo run
//!
//! # Executar com logs detalhados (cada regra disparada)
//! RUST_LOG=debug cargo run
//!
//! curl -X POST localhost:5000/api/forward \
//!      -H 'content-type: application/json' \
//!      -d '{"features": ["has_hair", "has_hooves", "black_stripes"]}'
//! ```
//!
//! ## Modos de Raciocínio
//!
//! - **Progressivo**: o usuário informa as características, o sistema
//!   identifica o animal numa única chamada.
//! - **Regressivo**: o usuário escolhe um animal e o sistema pergunta,
//!   uma condição por vez, até confirmar ou descartar a hipótese.

/// Módulo `config` — configuração via variáveis de ambiente.
mod config;

/// Módulo `core` — tipos fundamentais: Fact, Rule, KnowledgeBase.
mod core;

/// Módulo `error` — erros de domínio (thiserror).
mod error;

/// Módulo `inference` — encadeamento progressivo e regressivo.
mod inference;

/// Módulo `persistence` — leitura/escrita da base de regras em JSON.
mod persistence;

/// Módulo `session` — sessões regressivas com expiração.
mod session;

/// Módulo `web` — servidor axum, handlers e templates.
mod web;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::session::SessionStore;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Aceita RUST_LOG para configurar o nível. Exemplo: RUST_LOG=debug cargo run
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🦁 Sistema Especialista de Animais — Starting...");

    let config = Config::from_env()?;

    // Arquivo corrompido é erro fatal: as invariantes da base são
    // responsabilidade de quem a escreveu.
    let kb = persistence::load_rules(&config.rules_path)?;
    tracing::info!(
        rules = kb.rule_count(),
        animals = kb.animals.len(),
        features = kb.features.len(),
        path = %config.rules_path.display(),
        "Base de regras carregada"
    );

    let state = AppState::new(
        kb,
        SessionStore::new(config.session_ttl),
        config.rules_path.clone(),
    );

    // Sem esta varredura, sessões abandonadas nunca sairiam da memória.
    let sessions = state.sessions.clone();
    let sweep_interval = config.sweep_interval;
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(sweep_interval);
        loop {
            tick.tick().await;
            let evicted = sessions.evict_expired(chrono::Utc::now());
            if evicted > 0 {
                tracing::info!(evicted, remaining = sessions.len(), "Sessões expiradas removidas");
            }
        }
    });

    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Falha ao abrir {}", config.bind_addr))?;
    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
