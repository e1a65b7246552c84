//! # Configuração
//!
//! Configuração do servidor lida de variáveis de ambiente, cada uma com um
//! valor padrão que funciona ao rodar `cargo run` na raiz do projeto.
//!
//! | Variável | Padrão | Uso |
//! |----------|--------|-----|
//! | `EXPERT_BIND_ADDR` | `0.0.0.0:5000` | Endereço do servidor HTTP |
//! | `EXPERT_RULES_PATH` | `data/rules.json` | Arquivo da base de regras |
//! | `EXPERT_SESSION_TTL_SECS` | `1800` | Inatividade máxima de uma sessão regressiva |
//! | `EXPERT_SWEEP_INTERVAL_SECS` | `60` | Período da varredura de sessões expiradas |
//!
//! O nível de log segue `RUST_LOG` (ver `main`).

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Configuração do processo.
#[derive(Clone, Debug)]
pub struct Config {
    /// Endereço `host:porta` do listener TCP.
    pub bind_addr: String,
    /// Caminho do arquivo JSON da base de regras.
    pub rules_path: PathBuf,
    /// TTL de sessões regressivas ociosas.
    pub session_ttl: chrono::Duration,
    /// Intervalo entre varreduras de sessões expiradas.
    pub sweep_interval: std::time::Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            rules_path: PathBuf::from("data/rules.json"),
            session_ttl: chrono::Duration::seconds(1800),
            sweep_interval: std::time::Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Lê a configuração do ambiente do processo.
    ///
    /// # Erros
    ///
    /// Retorna erro se uma variável numérica não for um inteiro válido.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lê a configuração a partir de uma função de busca arbitrária.
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("EXPERT_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(path) = lookup("EXPERT_RULES_PATH") {
            config.rules_path = PathBuf::from(path);
        }
        if let Some(secs) = parse_secs(&lookup, "EXPERT_SESSION_TTL_SECS")? {
            config.session_ttl = chrono::Duration::seconds(i64::from(secs));
        }
        if let Some(secs) = parse_secs(&lookup, "EXPERT_SWEEP_INTERVAL_SECS")? {
            config.sweep_interval = std::time::Duration::from_secs(u64::from(secs.max(1)));
        }

        Ok(config)
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u32>()
                .with_context(|| format!("{} inválido: {:?}", key, raw))
        })
        .transpose()
}
