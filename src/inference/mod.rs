//! # Módulo Inference — Motores de Inferência
//!
//! Dois modos de raciocínio sobre a mesma [`KnowledgeBase`](crate::core::KnowledgeBase):
//!
//! | Modo | Direção | Estado | Entrada | Saída |
//! |------|---------|--------|---------|-------|
//! | [`ForwardEngine`] | dados → conclusão | nenhum (uma chamada) | características | animal ou "insuficiente" |
//! | [`BackwardSession`] | objetivo → dados | sessão retomável | animal-alvo + respostas | pergunta, sucesso ou falha |
//!
//! ## Exemplo
//!
//! ```text
//! R1: has_feathers ⇒ can_fly
//! R2: can_fly      ⇒ bird
//!
//! Forward  {has_feathers}     → R1, R2 → bird
//! Backward start(bird)        → "can_fly?"   (unknown → sub-objetivo R1)
//!                             → "has_feathers?" (yes) → bird ✓
//! ```

/// Encadeamento progressivo.
pub mod forward;

/// Encadeamento regressivo interativo.
pub mod backward;

pub use backward::{Answer, BackwardReply, BackwardSession};
pub use forward::{ForwardEngine, ForwardResult};
