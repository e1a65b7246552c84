//! # Encadeamento Regressivo Interativo (Backward Chaining)
//!
//! Raciocínio **guiado por objetivo**: o usuário escolhe um animal-alvo e o
//! motor tenta prová-lo, perguntando uma condição por vez. Entre uma
//! pergunta e a resposta o motor fica **suspenso**: a prova inteira está
//! guardada em [`BackwardSession`] (pilha de objetivos + conjuntos de fatos),
//! não na pilha de chamadas, e por isso sobrevive entre requisições HTTP
//! independentes e pode ser serializada.
//!
//! ## Máquina de Estados
//!
//! ```text
//!            start(alvo)
//!   Idle ───────────────► Asking ◄──┐ answer(yes) / answer(unknown → sub-objetivo)
//!     │                     │  └─────┘
//!     │ sem regra           ├── answer(no) ────────────────► Failed
//!     ▼                     ├── condição já negada ────────► Failed
//!   Error                   ├── alvo derivado ─────────────► Succeeded
//!                           └── answer sem pergunta ───────► Error
//! ```
//!
//! ## Pilha de Objetivos
//!
//! Cada [`GoalFrame`] é um cursor sobre as condições de uma regra. O passo
//! de retomada ([`BackwardSession::process_next`]) examina o topo:
//!
//! | Condição | Ação |
//! |----------|------|
//! | conhecida | avança o cursor |
//! | negada | **falha a sessão inteira** (a negação é global) |
//! | desconhecida | vira a pergunta pendente; cursor avança; suspende |
//!
//! Quando todas as condições do topo valem, a conclusão vira fato conhecido
//! e o quadro sai da pilha. Se essa conclusão é o alvo, a sessão termina com
//! sucesso na hora, mesmo que ainda haja quadros externos na pilha.
//!
//! ## Simplificações
//!
//! - `no` encerra a prova: **não há backtracking** para regras alternativas.
//! - `unknown` sobre um intermediário tenta apenas a primeira regra que o
//!   conclui ([`KnowledgeBase::find_rule_for_conclusion`]).

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{Fact, KnowledgeBase, Rule};
use crate::error::ReasoningError;

/// Resposta do usuário a uma pergunta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    /// A condição vale.
    Yes,
    /// A condição não vale.
    No,
    /// O usuário não sabe — tenta derivar a condição.
    Unknown,
}

impl FromStr for Answer {
    type Err = ReasoningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "yes" => Ok(Answer::Yes),
            "no" => Ok(Answer::No),
            "unknown" => Ok(Answer::Unknown),
            other => Err(ReasoningError::InvalidAnswer(other.to_string())),
        }
    }
}

/// Resposta de um passo do encadeamento regressivo.
///
/// Serializada com discriminador `status`:
///
/// ```json
/// { "status": "asking", "question": "can_fly", "is_intermediate": true, "hint": "...", "log": [] }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BackwardReply {
    /// Suspenso à espera de uma resposta.
    Asking {
        /// Condição perguntada.
        question: Fact,
        /// `true` se a condição é intermediária (pode ser derivada com `unknown`).
        is_intermediate: bool,
        /// Texto de contexto para o usuário.
        hint: String,
        /// Log acumulado.
        log: Vec<String>,
    },
    /// Alvo provado.
    Success {
        message: String,
        animal: Fact,
        log: Vec<String>,
    },
    /// Prova abandonada (condição negada ou não derivável).
    Failed { message: String, log: Vec<String> },
    /// Erro de uso (alvo sem regra, resposta inválida, sessão inexistente...).
    Error { message: String },
}

impl BackwardReply {
    /// `true` para `Success`, `Failed` e `Error` — a sessão deve ser descartada.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BackwardReply::Asking { .. })
    }

    /// Valor do campo `status` no JSON.
    pub fn status(&self) -> &'static str {
        match self {
            BackwardReply::Asking { .. } => "asking",
            BackwardReply::Success { .. } => "success",
            BackwardReply::Failed { .. } => "failed",
            BackwardReply::Error { .. } => "error",
        }
    }
}

impl From<ReasoningError> for BackwardReply {
    fn from(err: ReasoningError) -> Self {
        BackwardReply::Error {
            message: err.to_string(),
        }
    }
}

/// Cursor sobre as condições de uma regra em prova.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalFrame {
    /// Regra cujas condições estão sendo verificadas.
    pub rule: Rule,
    /// Índice da próxima condição a examinar.
    pub next_condition: usize,
}

impl GoalFrame {
    fn new(rule: Rule) -> Self {
        Self {
            rule,
            next_condition: 0,
        }
    }
}

/// Estado de uma prova interativa, retomável entre requisições.
///
/// Não guarda referência à base de regras: cada chamada recebe a
/// [`KnowledgeBase`] emprestada. O estado é `Serialize + Deserialize`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BackwardSession {
    target: Option<Fact>,
    goal_stack: Vec<GoalFrame>,
    known_facts: BTreeSet<Fact>,
    denied_facts: BTreeSet<Fact>,
    pending_question: Option<Fact>,
    log: Vec<String>,
}

impl BackwardSession {
    /// Sessão ociosa (sem alvo).
    pub fn new() -> Self {
        Self::default()
    }

    /// Inicia (ou reinicia) a prova de `target`.
    ///
    /// Todo o estado anterior é descartado. Sem regra que conclua o alvo,
    /// devolve `Error`.
    pub fn start(&mut self, kb: &KnowledgeBase, target: &str) -> BackwardReply {
        *self = Self {
            target: Some(target.to_string()),
            ..Self::default()
        };

        let Some(rule) = kb.find_rule_for_conclusion(target) else {
            tracing::debug!(goal = target, "backward: nenhuma regra para o alvo");
            return ReasoningError::NoRuleFor(target.to_string()).into();
        };

        tracing::debug!(goal = target, rule = %rule.id, "backward: prova iniciada");
        self.goal_stack.push(GoalFrame::new(rule.clone()));
        self.process_next(kb)
    }

    /// Aplica a resposta do usuário à pergunta pendente e retoma a prova.
    pub fn answer(&mut self, kb: &KnowledgeBase, answer: Answer) -> BackwardReply {
        let Some(condition) = self.pending_question.take() else {
            return ReasoningError::NoPendingQuestion.into();
        };

        match answer {
            Answer::Yes => {
                self.log.push(format!("✓ Confirmado: {}", condition));
                self.known_facts.insert(condition);
                self.process_next(kb)
            }
            Answer::No => {
                self.log.push(format!("✗ Negado: {}", condition));
                let message = format!(
                    "A condição \"{}\" não é satisfeita, não é possível confirmar {}",
                    condition,
                    self.target()
                );
                self.denied_facts.insert(condition);
                self.failed(message)
            }
            Answer::Unknown => {
                let sub_rule = kb
                    .is_intermediate(&condition)
                    .then(|| kb.find_rule_for_conclusion(&condition))
                    .flatten();

                if let Some(rule) = sub_rule {
                    self.log.push(format!(
                        "? Incerto sobre \"{}\", tentando derivar pela regra {}",
                        condition, rule.id
                    ));
                    tracing::debug!(condition = %condition, rule = %rule.id, "backward: sub-objetivo empilhado");
                    self.goal_stack.push(GoalFrame::new(rule.clone()));
                    return self.process_next(kb);
                }

                let message = format!("Não foi possível confirmar a condição \"{}\"", condition);
                self.denied_facts.insert(condition);
                self.failed(message)
            }
        }
    }

    /// Passo de retomada: avança a pilha até precisar perguntar algo ou
    /// chegar a um estado terminal.
    fn process_next(&mut self, kb: &KnowledgeBase) -> BackwardReply {
        let target = self.target().to_string();

        while let Some(frame) = self.goal_stack.last_mut() {
            while let Some(condition) = frame.rule.conditions.get(frame.next_condition).cloned() {
                if self.known_facts.contains(&condition) {
                    frame.next_condition += 1;
                    continue;
                }

                if self.denied_facts.contains(&condition) {
                    return BackwardReply::Failed {
                        message: format!(
                            "A condição \"{}\" já foi negada, não é possível confirmar {}",
                            condition, target
                        ),
                        log: self.log.clone(),
                    };
                }

                // Suspende: a próxima chamada retoma a partir da condição seguinte
                frame.next_condition += 1;
                self.pending_question = Some(condition.clone());
                return BackwardReply::Asking {
                    is_intermediate: kb.is_intermediate(&condition),
                    hint: format!("Para verificar \"{}\" é preciso confirmar: {}", target, condition),
                    question: condition,
                    log: self.log.clone(),
                };
            }

            let conclusion = frame.rule.conclusion.clone();
            self.goal_stack.pop();
            self.log.push(format!("✓ Derivado: {}", conclusion));
            let reached_target = conclusion == target;
            self.known_facts.insert(conclusion);

            if reached_target {
                return self.succeeded();
            }
        }

        if self.known_facts.contains(&target) {
            self.succeeded()
        } else {
            self.failed(format!(
                "A verificação terminou sem confirmar {}",
                target
            ))
        }
    }

    fn succeeded(&self) -> BackwardReply {
        let target = self.target().to_string();
        BackwardReply::Success {
            message: format!("✓ Confirmado! O animal é {}", target),
            animal: target,
            log: self.log.clone(),
        }
    }

    fn failed(&self, message: String) -> BackwardReply {
        BackwardReply::Failed {
            message,
            log: self.log.clone(),
        }
    }

    /// Alvo da prova (vazio se a sessão nunca foi iniciada).
    pub fn target(&self) -> &str {
        self.target.as_deref().unwrap_or_default()
    }
}
