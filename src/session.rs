//! # SessionStore — Sessões do Encadeamento Regressivo
//!
//! Mapeia um identificador de sessão (opaco, escolhido pelo cliente) para
//! uma [`BackwardSession`] viva. Uma conversa regressiva atravessa várias
//! requisições HTTP independentes; entre elas, o estado da prova fica aqui.
//!
//! ## Ciclo de Vida
//!
//! ```text
//! start(id, alvo)
//!   ├── resposta Asking   → sessão guardada (substitui a anterior com o mesmo id)
//!   └── resposta terminal → nada é guardado
//! answer(id, resposta)
//!   ├── id desconhecido   → Error (SessionNotFound)
//!   ├── resposta Asking   → sessão continua
//!   └── resposta terminal → sessão removida
//! evict_expired(agora)    → remove sessões ociosas há mais que o TTL
//! ```
//!
//! ## Concorrência
//!
//! O mapa fica sob um `RwLock`; cada sessão tem seu próprio `Mutex`, de modo
//! que `answer`s concorrentes no **mesmo** id são serializados e ids
//! diferentes avançam em paralelo. Uma entrada encerrada é marcada `closed`
//! antes de sair do mapa: quem já tinha o `Arc` em mãos recebe
//! `SessionNotFound` em vez de mexer numa prova terminada.
//!
//! Ordem de locks: `answer` segura só o mutex da sessão e solta antes de
//! tocar no mapa; `evict_expired` segura o mapa e usa `try_lock` nas
//! sessões, pulando as que estão em uso.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};

use crate::core::KnowledgeBase;
use crate::error::ReasoningError;
use crate::inference::{Answer, BackwardReply, BackwardSession};

/// Sessão guardada + metadados de ciclo de vida.
struct SessionEntry {
    session: BackwardSession,
    last_active: DateTime<Utc>,
    closed: bool,
}

/// Armazém de sessões regressivas com expiração por inatividade.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionEntry>>>>,
    ttl: Duration,
}

impl SessionStore {
    /// Cria um armazém vazio; sessões ociosas por mais de `ttl` expiram.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Inicia uma prova de `target` sob `session_id`.
    ///
    /// Qualquer sessão anterior com o mesmo id é descartada, mesmo quando a
    /// nova termina de imediato.
    pub fn start(&self, session_id: &str, kb: &KnowledgeBase, target: &str) -> BackwardReply {
        let mut session = BackwardSession::new();
        let reply = session.start(kb, target);

        let previous = if reply.is_terminal() {
            self.sessions.write().remove(session_id)
        } else {
            let entry = Arc::new(Mutex::new(SessionEntry {
                session,
                last_active: Utc::now(),
                closed: false,
            }));
            self.sessions.write().insert(session_id.to_string(), entry)
        };

        if let Some(previous) = previous {
            previous.lock().closed = true;
            tracing::debug!(session_id, "sessão anterior substituída");
        }

        tracing::info!(session_id, goal = target, status = reply.status(), "backward: sessão iniciada");
        reply
    }

    /// Aplica a resposta `raw` (`"yes"`, `"no"` ou `"unknown"`) à sessão.
    ///
    /// Resposta malformada é um `Error` e, como todo estado terminal,
    /// encerra a sessão.
    pub fn answer(&self, session_id: &str, kb: &KnowledgeBase, raw: &str) -> BackwardReply {
        let Some(entry) = self.sessions.read().get(session_id).cloned() else {
            return ReasoningError::SessionNotFound(session_id.to_string()).into();
        };
        self.answer_entry(session_id, &entry, kb, raw)
    }

    /// Responde usando uma entrada já obtida do mapa.
    ///
    /// Entre o `get` e o `lock` outra chamada pode ter encerrado a entrada;
    /// nesse caso a sessão já não existe para quem chega depois.
    fn answer_entry(
        &self,
        session_id: &str,
        entry: &Arc<Mutex<SessionEntry>>,
        kb: &KnowledgeBase,
        raw: &str,
    ) -> BackwardReply {
        let mut guard = entry.lock();
        if guard.closed {
            return ReasoningError::SessionNotFound(session_id.to_string()).into();
        }

        let reply = match raw.parse::<Answer>() {
            Ok(answer) => guard.session.answer(kb, answer),
            Err(err) => err.into(),
        };
        guard.last_active = Utc::now();
        tracing::debug!(
            session_id,
            goal = guard.session.target(),
            status = reply.status(),
            "backward: resposta processada"
        );

        if reply.is_terminal() {
            guard.closed = true;
            drop(guard);
            self.remove_entry(session_id, entry);
            tracing::info!(session_id, status = reply.status(), "backward: sessão encerrada");
        }
        reply
    }

    /// Remove sessões ociosas desde antes de `now - ttl`. Devolve quantas saíram.
    ///
    /// Sessões com uma chamada em andamento (mutex ocupado) são mantidas.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| match entry.try_lock() {
            Some(mut guard) => {
                let expired = now - guard.last_active > self.ttl;
                if expired {
                    guard.closed = true;
                }
                !expired
            }
            None => true,
        });
        before - sessions.len()
    }

    /// Número de sessões vivas.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// `true` se não há sessões vivas.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` se existe uma sessão viva com esse id.
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }

    /// Remove `session_id` apenas se ainda aponta para `entry`
    /// (um `start` concorrente pode ter posto outra sessão no lugar).
    fn remove_entry(&self, session_id: &str, entry: &Arc<Mutex<SessionEntry>>) {
        let mut sessions = self.sessions.write();
        if sessions
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, entry))
        {
            sessions.remove(session_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Fact, Rule, RuleKind};

    fn facts(items: &[&str]) -> Vec<Fact> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn feathers_kb() -> KnowledgeBase {
        KnowledgeBase::new(
            vec![
                Rule::new("R1", facts(&["has_feathers"]), "can_fly", RuleKind::Classification),
                Rule::new("R2", facts(&["can_fly"]), "bird", RuleKind::Final),
            ],
            facts(&["has_feathers"]),
            facts(&["can_fly"]),
            facts(&["bird"]),
        )
    }

    fn store() -> SessionStore {
        SessionStore::new(Duration::minutes(30))
    }

    #[test]
    fn asking_session_is_kept_until_terminal_answer() {
        let kb = feathers_kb();
        let store = store();

        assert_eq!(store.start("s1", &kb, "bird").status(), "asking");
        assert!(store.contains("s1"));

        assert_eq!(store.answer("s1", &kb, "unknown").status(), "asking");
        assert!(store.contains("s1"));

        assert_eq!(store.answer("s1", &kb, "yes").status(), "success");
        assert!(store.is_empty());
    }

    #[test]
    fn terminal_start_is_not_stored() {
        let kb = feathers_kb();
        let store = store();
        assert_eq!(store.start("s1", &kb, "zebra").status(), "error");
        assert!(!store.contains("s1"));
    }

    #[test]
    fn terminal_start_discards_previous_session() {
        let kb = feathers_kb();
        let store = store();
        store.start("s1", &kb, "bird");
        store.start("s1", &kb, "zebra");
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_session_is_error() {
        let reply = store().answer("missing", &feathers_kb(), "yes");
        assert_eq!(
            reply,
            BackwardReply::from(ReasoningError::SessionNotFound("missing".into()))
        );
    }

    #[test]
    fn failed_answer_evicts_session() {
        let kb = feathers_kb();
        let store = store();
        store.start("s1", &kb, "bird");
        assert_eq!(store.answer("s1", &kb, "no").status(), "failed");
        assert_eq!(store.answer("s1", &kb, "yes").status(), "error");
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_answer_is_error_and_evicts() {
        let kb = feathers_kb();
        let store = store();
        store.start("s1", &kb, "bird");
        let reply = store.answer("s1", &kb, "maybe");
        assert_eq!(
            reply,
            BackwardReply::from(ReasoningError::InvalidAnswer("maybe".into()))
        );
        assert!(!store.contains("s1"));
    }

    #[test]
    fn sessions_are_independent() {
        let kb = feathers_kb();
        let store = store();
        store.start("a", &kb, "bird");
        store.start("b", &kb, "bird");
        assert_eq!(store.answer("a", &kb, "no").status(), "failed");
        assert_eq!(store.answer("b", &kb, "yes").status(), "success");
    }

    #[test]
    fn idle_sessions_expire_after_ttl() {
        let kb = feathers_kb();
        let store = SessionStore::new(Duration::seconds(60));
        store.start("s1", &kb, "bird");

        assert_eq!(store.evict_expired(Utc::now()), 0);
        assert!(store.contains("s1"));

        assert_eq!(store.evict_expired(Utc::now() + Duration::seconds(61)), 1);
        assert_eq!(store.answer("s1", &kb, "yes").status(), "error");
    }

    #[test]
    fn closed_entry_held_elsewhere_reports_not_found() {
        let kb = feathers_kb();
        let store = store();
        store.start("s1", &kb, "bird");
        let stale = store.sessions.read().get("s1").cloned().unwrap();

        store.start("s1", &kb, "bird");
        assert!(stale.lock().closed);
        assert_eq!(store.answer("s1", &kb, "unknown").status(), "asking");
    }

    #[test]
    fn answer_on_entry_closed_by_terminal_answer_is_not_found() {
        let kb = feathers_kb();
        let store = store();
        store.start("s1", &kb, "bird");
        let held = store.sessions.read().get("s1").cloned().unwrap();

        assert_eq!(store.answer("s1", &kb, "no").status(), "failed");
        assert!(!store.contains("s1"));

        let reply = store.answer_entry("s1", &held, &kb, "yes");
        assert_eq!(
            reply,
            BackwardReply::from(ReasoningError::SessionNotFound("s1".into()))
        );
    }

    #[test]
    fn concurrent_answers_see_one_terminal_reply() {
        let kb = feathers_kb();
        let store = store();
        store.start("s1", &kb, "bird");

        let replies: Vec<BackwardReply> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| scope.spawn(|| store.answer("s1", &kb, "no")))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let failed = replies.iter().filter(|r| r.status() == "failed").count();
        let not_found = replies
            .iter()
            .filter(|r| **r == BackwardReply::from(ReasoningError::SessionNotFound("s1".into())))
            .count();
        assert_eq!((failed, not_found), (1, 1));
        assert!(store.is_empty());
    }
}
