//! # Encadeamento Progressivo (Forward Chaining)
//!
//! Raciocínio **guiado por dados**: parte das características informadas
//! pelo usuário e dispara regras até chegar a um animal ou a um ponto fixo.
//!
//! ## Algoritmo
//!
//! ```text
//! facts := características iniciais
//! fired := ∅
//! repita até 100 passadas:
//!   para cada regra, em ordem de declaração:
//!     se conditions ⊆ facts  E  conclusion ∉ facts  E  id ∉ fired:
//!       facts += conclusion;  fired += id;  registra no log
//!       se conclusion é animal → SUCESSO
//!       reinicia a varredura (uma regra por passada)
//!   nenhuma regra disparou → ponto fixo, para
//! → FALHA: "características insuficientes"
//! ```
//!
//! ## Resolução de Conflitos
//!
//! Quando várias regras estão aplicáveis, **a primeira declarada vence** e
//! só ela dispara na passada; a varredura recomeça do início. A ordem das
//! regras no arquivo é, portanto, parte da semântica.
//!
//! ## Garantias
//!
//! - **Monotonicidade**: fatos nunca são retirados; o resultado contém a entrada.
//! - **Disparo único**: cada regra dispara no máximo uma vez por execução.
//! - **Terminação**: no máximo [`MAX_ITERATIONS`] passadas, mesmo com regras cíclicas.
//! - **Determinismo**: mesma base + mesmos fatos ⇒ mesmo log e mesmo conjunto final.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::core::{Fact, KnowledgeBase, RuleId};

/// Limite de passadas do laço principal.
pub const MAX_ITERATIONS: usize = 100;

/// Registro de um disparo de regra.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FiringRecord {
    /// ID da regra disparada.
    pub rule_id: RuleId,
    /// Premissas da regra, na ordem declarada.
    pub conditions: Vec<Fact>,
    /// Fato derivado.
    pub conclusion: Fact,
    /// Descrição da regra (vazia se ausente).
    pub description: String,
}

/// Resultado de uma execução do encadeamento progressivo.
///
/// Serializado exatamente como a resposta de `POST /api/forward`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForwardResult {
    /// `true` se algum animal foi derivado.
    pub success: bool,
    /// O animal identificado (`null` na falha).
    pub animal: Option<Fact>,
    /// Disparos, em ordem.
    pub log: Vec<FiringRecord>,
    /// Conjunto final de fatos (ordenado).
    pub facts: BTreeSet<Fact>,
    /// Mensagem explicativa, presente só na falha.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Motor de encadeamento progressivo — struct sem estado.
///
/// Todo o estado (fatos, regras disparadas) vive dentro de uma chamada a
/// [`run()`](ForwardEngine::run); chamadas concorrentes sobre a mesma base
/// são seguras.
///
/// ## Uso
///
/// ```rust
/// let result = ForwardEngine::run(&kb, ["has_feathers".to_string()]);
/// if result.success {
///     println!("Animal: {}", result.animal.unwrap());
/// }
/// ```
pub struct ForwardEngine;

impl ForwardEngine {
    /// Executa o encadeamento progressivo a partir de `initial_facts`.
    ///
    /// Uma entrada vazia não é rejeitada aqui (isso é papel do handler);
    /// ela simplesmente não dispara regras com premissas.
    pub fn run<I>(kb: &KnowledgeBase, initial_facts: I) -> ForwardResult
    where
        I: IntoIterator<Item = Fact>,
    {
        let mut facts: BTreeSet<Fact> = initial_facts.into_iter().collect();
        let mut fired: HashSet<&str> = HashSet::new();
        let mut log = Vec::new();

        for _ in 0..MAX_ITERATIONS {
            let applicable = kb.rules.iter().find(|rule| {
                !fired.contains(rule.id.as_str())
                    && !facts.contains(&rule.conclusion)
                    && rule.is_satisfied_by(|c| facts.contains(c))
            });

            // Ponto fixo: nenhuma regra aplicável nesta passada
            let Some(rule) = applicable else {
                break;
            };

            facts.insert(rule.conclusion.clone());
            fired.insert(rule.id.as_str());
            log.push(FiringRecord {
                rule_id: rule.id.clone(),
                conditions: rule.conditions.clone(),
                conclusion: rule.conclusion.clone(),
                description: rule.description.clone().unwrap_or_default(),
            });
            tracing::debug!(rule = %rule.id, conclusion = %rule.conclusion, "forward: regra disparada");

            if kb.is_animal(&rule.conclusion) {
                return ForwardResult {
                    success: true,
                    animal: Some(rule.conclusion.clone()),
                    log,
                    facts,
                    message: None,
                };
            }
        }

        ForwardResult {
            success: false,
            animal: None,
            log,
            facts,
            message: Some(
                "Não foi possível identificar o animal: características insuficientes".to_string(),
            ),
        }
    }
}
