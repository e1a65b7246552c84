//! # Persistência — Base de Regras em Disco
//!
//! Serializa/desserializa a [`KnowledgeBase`] como JSON (por padrão em
//! `data/rules.json`, ver [`Config`](crate::config::Config)).
//!
//! ## Formato de Armazenamento
//!
//! JSON "pretty-printed", no mesmo formato do arquivo distribuído com o
//! projeto: `rules`, `features`, `intermediates`, `animals`,
//! `featureCategories`, `animalEmojis`. O índice de fatos é
//! `#[serde(skip)]` e reconstruído após o carregamento via
//! [`KnowledgeBase::rebuild_index()`].
//!
//! ## Quando a Base é Salva?
//!
//! Após cada operação de CRUD de regras (criar, atualizar, remover).
//!
//! ## Escrita
//!
//! O JSON vai primeiro para `<arquivo>.tmp`, no mesmo diretório, e depois é
//! renomeado por cima do arquivo final. Quem lê o arquivo vê a base antiga
//! ou a nova, nunca uma escrita pela metade.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;

use crate::core::KnowledgeBase;

/// Base de regras padrão, embutida no binário.
const DEFAULT_RULES: &str = include_str!("../data/rules.json");

/// Salva a base de regras em `path` como JSON pretty-printed.
///
/// Cria o diretório pai se não existir. Adquire um read lock na base só
/// durante a serialização; a escrita em disco acontece sem lock.
///
/// # Erros
///
/// Retorna erro se não conseguir criar o diretório, serializar,
/// ou escrever no arquivo.
pub fn save_rules(kb: &Arc<RwLock<KnowledgeBase>>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Falha ao criar diretório {}", parent.display()))?;
    }
    let json = {
        let kb_read = kb.read();
        serde_json::to_string_pretty(&*kb_read).context("Falha ao serializar a base de regras")?
    };
    let tmp = tmp_path(path);
    std::fs::write(&tmp, json)
        .with_context(|| format!("Falha ao escrever {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Falha ao substituir {}", path.display()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Carrega a base de regras de `path`, ou a base padrão se o arquivo não existir.
///
/// # Erros
///
/// Retorna erro se o arquivo existir mas estiver corrompido
/// ou incompatível com a struct atual.
pub fn load_rules(path: &Path) -> Result<KnowledgeBase> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "Arquivo de regras não encontrado, usando base padrão");
        return default_rules();
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Falha ao ler {}", path.display()))?;
    parse_rules(&json).with_context(|| format!("Falha ao desserializar {}", path.display()))
}

/// Base de regras padrão (zoológico com 15 regras e 7 animais).
pub fn default_rules() -> Result<KnowledgeBase> {
    parse_rules(DEFAULT_RULES).context("Base de regras padrão inválida")
}

fn parse_rules(json: &str) -> Result<KnowledgeBase> {
    let mut kb: KnowledgeBase = serde_json::from_str(json)?;
    kb.rebuild_index();
    Ok(kb)
}
