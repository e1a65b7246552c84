//! # Erros de Domínio
//!
//! Erros do raciocínio e do CRUD de regras. Nenhum deles derruba o
//! servidor: os handlers os convertem em respostas estruturadas
//! (`status: "error"` para o encadeamento reverso, `success: false`
//! com 404 para o CRUD).
//!
//! Falhas de infraestrutura (arquivo de regras, socket, configuração)
//! usam `anyhow` e não passam por aqui.

use thiserror::Error;

use crate::core::{Fact, RuleId};

/// Erros do encadeamento reverso e do armazenamento de sessões.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReasoningError {
    /// Nenhuma regra conclui o fato pedido.
    #[error("não existe regra que identifique {0}")]
    NoRuleFor(Fact),

    /// O alvo pedido não é um animal da base.
    #[error("alvo inválido: {0}")]
    InvalidTarget(Fact),

    /// Resposta fora de `yes` / `no` / `unknown`.
    #[error("resposta inválida: {0:?}")]
    InvalidAnswer(String),

    /// `answer` chamado sem pergunta pendente.
    #[error("não há pergunta pendente")]
    NoPendingQuestion,

    /// Sessão inexistente, expirada ou já encerrada.
    #[error("sessão {0:?} não existe, reinicie o raciocínio")]
    SessionNotFound(String),
}

/// Erros do CRUD de regras.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("regra {0} não existe")]
    NotFound(RuleId),
}
