//! # Módulo Core — Tipos Fundamentais do Domínio
//!
//! Agrupa os tipos sobre os quais os dois motores de inferência trabalham:
//!
//! - [`Fact`] — rótulo atômico (característica, intermediário ou animal)
//! - [`Rule`] — regra de produção `condições ⇒ conclusão`
//! - [`RuleKind`] — `classification` ou `final`
//! - [`RuleDraft`] — corpo de regra recebido pelo CRUD (sem ID)
//! - [`KnowledgeBase`] — a base de regras e os conjuntos de fatos
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use crate::core::{KnowledgeBase, Rule, RuleKind};
//!
//! let kb = KnowledgeBase::new(
//!     vec![Rule::new("R1", vec!["has_feathers".into()], "bird", RuleKind::Final)],
//!     vec!["has_feathers".into()],
//!     vec![],
//!     vec!["bird".into()],
//! );
//! assert!(kb.find_rule_for_conclusion("bird").is_some());
//! ```

/// Sub-módulo com [`Rule`], [`RuleKind`] e [`RuleDraft`].
pub mod rule;

/// Sub-módulo com a implementação de [`KnowledgeBase`] — contêiner central.
pub mod knowledge_base;

pub use knowledge_base::KnowledgeBase;
pub use rule::{Fact, Rule, RuleDraft, RuleId, RuleKind};
