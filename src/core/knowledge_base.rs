//! # KnowledgeBase — A Base de Regras
//!
//! A [`KnowledgeBase`] guarda as regras de produção e os três conjuntos de
//! fatos do domínio:
//!
//! | Conjunto | Papel | Exemplo |
//! |----------|-------|---------|
//! | `features` | Folhas — só o usuário pode informá-las | `has_feathers` |
//! | `intermediates` | Deriváveis, não terminais | `bird`, `mammal` |
//! | `animals` | Classificações terminais | `penguin`, `tiger` |
//!
//! Os conjuntos são disjuntos; toda conclusão está em `intermediates ∪ animals`
//! e toda condição em `features ∪ intermediates`. A base **não valida** essas
//! invariantes — quem carrega o arquivo é responsável por elas.
//!
//! ## Índice de Fatos
//!
//! Os conjuntos são mantidos como listas (a ordem serve à apresentação).
//! Para consultas O(1), o campo `fact_index` mapeia cada fato ao seu
//! [`FactKind`]. O índice é `#[serde(skip)]` e deve ser reconstruído via
//! [`rebuild_index()`](KnowledgeBase::rebuild_index) após desserialização.
//!
//! ## Resolução por Primeira Ocorrência
//!
//! [`find_rule_for_conclusion()`](KnowledgeBase::find_rule_for_conclusion)
//! devolve sempre a **primeira** regra declarada com a conclusão pedida.
//! Regras posteriores com a mesma conclusão nunca são alcançadas por essa
//! busca (no encadeamento reverso elas são código morto).
//!
//! ## CRUD
//!
//! `add_rule` / `update_rule` / `delete_rule` alteram a lista de regras em
//! memória; persistir a mudança é responsabilidade do chamador
//! ([`persistence::save_rules`](crate::persistence::save_rules)).

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::rule::{Fact, Rule, RuleDraft, RuleId, RuleKind};
use crate::error::RuleError;

/// Papel de um fato na base.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FactKind {
    /// Característica folha (informada pelo usuário).
    Feature,
    /// Propriedade derivável não terminal.
    Intermediate,
    /// Classificação final.
    Animal,
}

/// Base de regras + conjuntos de fatos, no formato do arquivo `rules.json`.
///
/// No servidor é compartilhada como `Arc<RwLock<KnowledgeBase>>`: os motores
/// de inferência tomam read locks, o CRUD toma write lock.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// Regras, em ordem de declaração (a ordem é semântica).
    pub rules: Vec<Rule>,

    /// Características folha.
    #[serde(default)]
    pub features: Vec<Fact>,

    /// Propriedades intermediárias.
    #[serde(default)]
    pub intermediates: Vec<Fact>,

    /// Animais (classificações finais).
    #[serde(default)]
    pub animals: Vec<Fact>,

    /// Agrupamento das características para exibição.
    #[serde(rename = "featureCategories", default)]
    pub feature_categories: BTreeMap<String, Vec<Fact>>,

    /// Emoji de cada animal, para exibição.
    #[serde(rename = "animalEmojis", default)]
    pub animal_emojis: BTreeMap<Fact, String>,

    /// Índice fato → papel. **Não serializado**.
    #[serde(skip, default)]
    fact_index: HashMap<Fact, FactKind>,
}

impl KnowledgeBase {
    /// Monta uma base a partir das regras e dos três conjuntos de fatos,
    /// já com o índice construído.
    pub fn new(
        rules: Vec<Rule>,
        features: Vec<Fact>,
        intermediates: Vec<Fact>,
        animals: Vec<Fact>,
    ) -> Self {
        let mut kb = Self {
            rules,
            features,
            intermediates,
            animals,
            ..Self::default()
        };
        kb.rebuild_index();
        kb
    }

    /// Reconstrói `fact_index` a partir das três listas.
    ///
    /// **Deve ser chamado após desserialização**, porque o índice é
    /// `#[serde(skip)]` e estará vazio depois de `load_rules()`.
    pub fn rebuild_index(&mut self) {
        self.fact_index.clear();
        let groups = [
            (&self.features, FactKind::Feature),
            (&self.intermediates, FactKind::Intermediate),
            (&self.animals, FactKind::Animal),
        ];
        for (facts, kind) in groups {
            for fact in facts {
                self.fact_index.insert(fact.clone(), kind);
            }
        }
    }

    /// Papel do fato, ou `None` se ele não pertence a nenhum conjunto.
    pub fn fact_kind(&self, fact: &str) -> Option<FactKind> {
        self.fact_index.get(fact).copied()
    }

    /// `true` se o fato é uma classificação final.
    pub fn is_animal(&self, fact: &str) -> bool {
        self.fact_kind(fact) == Some(FactKind::Animal)
    }

    /// `true` se o fato é uma propriedade intermediária.
    pub fn is_intermediate(&self, fact: &str) -> bool {
        self.fact_kind(fact) == Some(FactKind::Intermediate)
    }

    /// Primeira regra (em ordem de declaração) cuja conclusão é `conclusion`.
    ///
    /// Não tenta conciliar regras duplicadas: se houver mais de uma, só a
    /// primeira é devolvida.
    pub fn find_rule_for_conclusion(&self, conclusion: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.conclusion == conclusion)
    }

    /// Próximo ID livre no formato `R{n}`: maior sufixo numérico + 1.
    ///
    /// IDs fora do padrão `R<dígitos>`, ou cujo sucessor não cabe em `u64`,
    /// são ignorados. Base vazia → `"R1"`.
    pub fn next_rule_id(&self) -> RuleId {
        static RULE_ID: OnceLock<Regex> = OnceLock::new();
        let re = RULE_ID.get_or_init(|| Regex::new(r"^R(\d+)$").expect("invalid regex"));

        let max = self
            .rules
            .iter()
            .filter_map(|r| re.captures(&r.id))
            .filter_map(|caps| caps[1].parse::<u64>().ok())
            .filter_map(|n| n.checked_add(1))
            .max();
        match max {
            Some(n) => format!("R{}", n),
            None => "R1".to_string(),
        }
    }

    /// Tipo inferido para uma conclusão: `final` se for animal.
    pub fn infer_kind(&self, conclusion: &str) -> RuleKind {
        if self.is_animal(conclusion) {
            RuleKind::Final
        } else {
            RuleKind::Classification
        }
    }

    /// Adiciona uma regra ao final da lista e devolve a regra criada.
    ///
    /// O ID é atribuído por [`next_rule_id()`](Self::next_rule_id); sem
    /// `type` no rascunho, o tipo é inferido pela conclusão.
    pub fn add_rule(&mut self, draft: RuleDraft) -> Rule {
        let id = self.next_rule_id();
        let rule = self.rule_from_draft(id, draft);
        tracing::debug!(id = %rule.id, conclusion = %rule.conclusion, "KB: regra adicionada");
        self.rules.push(rule.clone());
        rule
    }

    /// Substitui a regra `id`, mantendo sua posição e seu ID.
    pub fn update_rule(&mut self, id: &str, draft: RuleDraft) -> Result<Rule, RuleError> {
        let pos = self.position(id)?;
        let rule = self.rule_from_draft(id.to_string(), draft);
        tracing::debug!(id = %rule.id, "KB: regra atualizada");
        self.rules[pos] = rule.clone();
        Ok(rule)
    }

    /// Remove a regra `id` e a devolve.
    pub fn delete_rule(&mut self, id: &str) -> Result<Rule, RuleError> {
        let pos = self.position(id)?;
        tracing::debug!(id = %id, "KB: regra removida");
        Ok(self.rules.remove(pos))
    }

    /// Número de regras.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn position(&self, id: &str) -> Result<usize, RuleError> {
        self.rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| RuleError::NotFound(id.to_string()))
    }

    fn rule_from_draft(&self, id: RuleId, draft: RuleDraft) -> Rule {
        let kind = draft
            .kind
            .unwrap_or_else(|| self.infer_kind(&draft.conclusion));
        Rule {
            id,
            conditions: draft.conditions,
            conclusion: draft.conclusion,
            description: draft.description,
            kind,
        }
    }
}
