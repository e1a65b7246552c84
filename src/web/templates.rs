//! # Templates Maud — HTML Server-Side Rendering
//!
//! Templates HTML compilados em código Rust pelo macro
//! [`maud`](https://maud.lambda.xyz/).
//!
//! ## Layout da Página Inicial
//!
//! ```text
//! ┌──────────────── header ─────────────────────┐
//! │ Sistema Especialista de Animais  │ n regras │
//! ├─────────────────────────────────────────────┤
//! │ Animais (emoji + nome)                      │
//! │ Características por categoria               │
//! │ Tabela de regras (id, condições ⇒ conclusão)│
//! │ Referência da API                           │
//! └─────────────────────────────────────────────┘
//! ```

use maud::{html, Markup, DOCTYPE};

use crate::core::{KnowledgeBase, Rule, RuleKind};

/// Página inicial — visão geral da base de regras carregada.
pub fn full_page(kb: &KnowledgeBase) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Sistema Especialista de Animais" }
                link rel="stylesheet" href="/assets/style.css";
            }
            body {
                header class="page-header" {
                    h1 { "🦁 Sistema Especialista de Animais" }
                    span class="rule-count" { (kb.rule_count()) " regras" }
                }
                main {
                    section class="animals" {
                        h2 { "Animais" }
                        ul class="animal-grid" {
                            @for animal in &kb.animals {
                                li class="animal-card" {
                                    span class="animal-emoji" {
                                        (kb.animal_emojis.get(animal).map(String::as_str).unwrap_or("❓"))
                                    }
                                    span class="animal-name" { (animal) }
                                }
                            }
                        }
                    }
                    section class="features" {
                        h2 { "Características" }
                        @if kb.feature_categories.is_empty() {
                            p { @for feature in &kb.features { code { (feature) } " " } }
                        } @else {
                            @for (category, features) in &kb.feature_categories {
                                div class="feature-category" {
                                    h3 { (category) }
                                    p { @for feature in features { code { (feature) } " " } }
                                }
                            }
                        }
                    }
                    section class="rules" {
                        h2 { "Regras" }
                        table class="rule-table" {
                            thead {
                                tr { th { "ID" } th { "Regra" } th { "Tipo" } th { "Descrição" } }
                            }
                            tbody {
                                @for rule in &kb.rules {
                                    (rule_row(rule))
                                }
                            }
                        }
                    }
                    section class="api" {
                        h2 { "API" }
                        ul {
                            li { code { "POST /api/forward" } " — " code { "{\"features\": [...]}" } }
                            li { code { "POST /api/backward/start" } " — " code { "{\"target\": \"...\", \"session_id\": \"...\"}" } }
                            li { code { "POST /api/backward/answer" } " — " code { "{\"response\": \"yes|no|unknown\", \"session_id\": \"...\"}" } }
                            li { code { "GET|POST /api/rules" } ", " code { "PUT|DELETE /api/rules/{id}" } }
                        }
                    }
                }
            }
        }
    }
}

/// Linha da tabela de regras: `cond₁ ∧ cond₂ ⇒ conclusão`.
fn rule_row(rule: &Rule) -> Markup {
    let kind_class = match rule.kind {
        RuleKind::Final => "final",
        RuleKind::Classification => "classification",
    };
    html! {
        tr class=(kind_class) {
            td { (rule.id) }
            td {
                (rule.conditions.join(" ∧ "))
                " ⇒ "
                strong { (rule.conclusion) }
            }
            td { (kind_class) }
            td { (rule.description.as_deref().unwrap_or("")) }
        }
    }
}
