//! # Rule — Regras de Produção
//!
//! Uma [`Rule`] é a unidade do conhecimento do especialista: "se todas as
//! condições valem, então a conclusão vale".
//!
//! ```text
//! R9: carnivore ∧ tawny_color ∧ dark_spots  ⇒  leopard
//!     └──────── conditions ────────────┘      └ conclusion
//! ```
//!
//! ## Campos
//!
//! | Campo | Tipo | Descrição |
//! |-------|------|-----------|
//! | `id` | [RuleId] | Identificador único (`"R1"`, `"R2"`, ...) |
//! | `conditions` | `Vec<Fact>` | Premissas — logicamente um conjunto; a ordem só afeta a iteração |
//! | `conclusion` | [Fact] | Fato derivado quando todas as premissas valem |
//! | `description` | `Option<String>` | Texto livre para exibição |
//! | `kind` | [RuleKind] | `classification` (deriva intermediário) ou `final` (deriva animal) |
//!
//! No JSON, `kind` é serializado como `"type"`, mantendo o formato do
//! arquivo `rules.json`.

use serde::{Deserialize, Serialize};

/// Um fato: rótulo opaco (característica, propriedade intermediária ou animal).
///
/// Igualdade por valor. Não há estrutura interna.
pub type Fact = String;

/// Alias de tipo para o identificador de uma [Rule].
pub type RuleId = String;

/// Tipo da regra — o que a conclusão representa.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Conclusão é uma propriedade intermediária (ex: `mammal`).
    #[default]
    Classification,
    /// Conclusão é uma classificação terminal (um animal).
    Final,
}

/// Regra de produção `conditions ⇒ conclusion`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Identificador único da regra.
    pub id: RuleId,
    /// Premissas da regra, em ordem de declaração.
    pub conditions: Vec<Fact>,
    /// Fato concluído.
    pub conclusion: Fact,
    /// Descrição legível (opcional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tipo da regra (`"type"` no JSON).
    #[serde(rename = "type", default)]
    pub kind: RuleKind,
}

impl Rule {
    /// Cria uma regra sem descrição.
    pub fn new(
        id: impl Into<RuleId>,
        conditions: Vec<Fact>,
        conclusion: impl Into<Fact>,
        kind: RuleKind,
    ) -> Self {
        Self {
            id: id.into(),
            conditions,
            conclusion: conclusion.into(),
            description: None,
            kind,
        }
    }

    /// Define a descrição (builder).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// `true` se `contains` aceita todas as condições.
    pub fn is_satisfied_by<F>(&self, mut contains: F) -> bool
    where
        F: FnMut(&Fact) -> bool,
    {
        self.conditions.iter().all(|c| contains(c))
    }
}

/// Corpo de uma regra recebido pela API de CRUD — sem `id`, `type` opcional.
///
/// O ID é sempre atribuído pela [`KnowledgeBase`](super::KnowledgeBase);
/// um `id` presente no corpo é ignorado. Sem `type`, o tipo é inferido
/// a partir da conclusão.
#[derive(Clone, Debug, Deserialize)]
pub struct RuleDraft {
    /// Premissas.
    pub conditions: Vec<Fact>,
    /// Conclusão.
    pub conclusion: Fact,
    /// Descrição opcional.
    #[serde(default)]
    pub description: Option<String>,
    /// Tipo explícito; `None` para inferir.
    #[serde(rename = "type", default)]
    pub kind: Option<RuleKind>,
}
