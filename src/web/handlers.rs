//! # Handlers HTTP — Os Endpoints da Aplicação
//!
//! Cada função pública neste módulo é um handler Axum, mapeado a uma
//! rota em [`super::create_router()`].
//!
//! ## Padrão de Resposta
//!
//! | Handler | Método | Retorno | Uso |
//! |---------|--------|---------|-----|
//! | `index` | GET | HTML completo | Visão geral da base (Maud) |
//! | `list_rules` | GET | JSON | Base de regras completa |
//! | `create_rule` | POST | JSON | `{success, rule}` |
//! | `update_rule` | PUT | JSON / 404 | `{success, rule}` |
//! | `delete_rule` | DELETE | JSON / 404 | `{success, deleted}` |
//! | `features` | GET | JSON | `{features, categories}` |
//! | `animals` | GET | JSON | `{animals, emojis}` |
//! | `forward` | POST | JSON | Resultado do encadeamento progressivo |
//! | `backward_start` | POST | JSON | Primeira resposta da sessão regressiva |
//! | `backward_answer` | POST | JSON | Próxima resposta da sessão regressiva |
//!
//! ## Erros de Raciocínio
//!
//! Erros do raciocínio (alvo inválido, sessão inexistente, resposta
//! malformada) **não** viram status HTTP de erro: a resposta é `200` com
//! `status: "error"`, como o cliente espera. Só o CRUD usa `404`.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::state::AppState;
use super::templates;
use crate::core::{Fact, KnowledgeBase, Rule, RuleDraft};
use crate::error::{ReasoningError, RuleError};
use crate::inference::{BackwardReply, ForwardEngine, ForwardResult};

// ─── Corpos de requisição ────────────────────────────────────────

/// Corpo de `POST /api/forward`.
#[derive(Deserialize)]
pub struct ForwardRequest {
    /// Características observadas.
    #[serde(default)]
    pub features: Vec<Fact>,
}

/// Corpo de `POST /api/backward/start`.
#[derive(Deserialize)]
pub struct StartRequest {
    /// Animal a provar.
    #[serde(default)]
    pub target: Fact,
    /// Id da sessão; ausente → `"default"`.
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

/// Corpo de `POST /api/backward/answer`.
#[derive(Deserialize)]
pub struct AnswerRequest {
    /// `"yes"`, `"no"` ou `"unknown"`.
    #[serde(default)]
    pub response: String,
    /// Id da sessão; ausente → `"default"`.
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

/// Sessão usada por clientes que não informam `session_id`.
fn default_session_id() -> String {
    "default".to_string()
}

// ─── Corpos de resposta ──────────────────────────────────────────

/// Falha genérica: `{ "success": false, "message": "..." }`.
#[derive(Serialize)]
pub struct Failure {
    pub success: bool,
    pub message: String,
}

impl Failure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Resposta de `POST /api/forward`.
#[derive(Serialize)]
#[serde(untagged)]
pub enum ForwardReply {
    /// Resultado da inferência (sucesso ou "insuficiente").
    Result(ForwardResult),
    /// Entrada rejeitada antes de chegar ao motor.
    Rejected(Failure),
}

/// Regra criada ou atualizada.
#[derive(Serialize)]
pub struct RuleSaved {
    pub success: bool,
    pub rule: Rule,
}

/// Regra removida.
#[derive(Serialize)]
pub struct RuleDeleted {
    pub success: bool,
    pub deleted: Rule,
}

/// Resposta de `GET /api/features`.
#[derive(Serialize)]
pub struct FeaturesResponse {
    pub features: Vec<Fact>,
    pub categories: BTreeMap<String, Vec<Fact>>,
}

/// Resposta de `GET /api/animals`.
#[derive(Serialize)]
pub struct AnimalsResponse {
    pub animals: Vec<Fact>,
    pub emojis: BTreeMap<Fact, String>,
}

type RuleResult<T> = Result<Json<T>, (StatusCode, Json<Failure>)>;

fn rule_error(err: RuleError) -> (StatusCode, Json<Failure>) {
    tracing::warn!(error = %err, "CRUD de regra falhou");
    match err {
        RuleError::NotFound(_) => (StatusCode::NOT_FOUND, Json(Failure::new(err.to_string()))),
    }
}

/// Persiste a base após uma alteração. Falha de escrita é só logada:
/// a alteração em memória continua valendo.
fn persist(state: &AppState) {
    if let Err(e) = crate::persistence::save_rules(&state.kb, &state.rules_path) {
        tracing::error!(error = %e, "Falha ao salvar a base de regras");
    }
}

// ─── Página ──────────────────────────────────────────────────────

/// GET `/` — Visão geral da base de regras.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let kb = state.kb.read();
    Html(templates::full_page(&kb).into_string())
}

// ─── Base de regras ──────────────────────────────────────────────

/// GET `/api/rules` — Base de regras completa, no formato do arquivo.
pub async fn list_rules(State(state): State<AppState>) -> Json<KnowledgeBase> {
    Json(state.kb.read().clone())
}

/// POST `/api/rules` — Cria uma regra com o próximo ID livre.
pub async fn create_rule(
    State(state): State<AppState>,
    Json(draft): Json<RuleDraft>,
) -> Json<RuleSaved> {
    let rule = state.kb.write().add_rule(draft);
    persist(&state);
    tracing::info!(id = %rule.id, conclusion = %rule.conclusion, "Regra criada");
    Json(RuleSaved {
        success: true,
        rule,
    })
}

/// PUT `/api/rules/{id}` — Substitui uma regra existente.
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<RuleDraft>,
) -> RuleResult<RuleSaved> {
    let rule = state.kb.write().update_rule(&id, draft).map_err(rule_error)?;
    persist(&state);
    tracing::info!(id = %rule.id, "Regra atualizada");
    Ok(Json(RuleSaved {
        success: true,
        rule,
    }))
}

/// DELETE `/api/rules/{id}` — Remove uma regra.
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> RuleResult<RuleDeleted> {
    let deleted = state.kb.write().delete_rule(&id).map_err(rule_error)?;
    persist(&state);
    tracing::info!(id = %deleted.id, "Regra removida");
    Ok(Json(RuleDeleted {
        success: true,
        deleted,
    }))
}

/// GET `/api/features` — Características e suas categorias.
pub async fn features(State(state): State<AppState>) -> Json<FeaturesResponse> {
    let kb = state.kb.read();
    Json(FeaturesResponse {
        features: kb.features.clone(),
        categories: kb.feature_categories.clone(),
    })
}

/// GET `/api/animals` — Animais e seus emojis.
pub async fn animals(State(state): State<AppState>) -> Json<AnimalsResponse> {
    let kb = state.kb.read();
    Json(AnimalsResponse {
        animals: kb.animals.clone(),
        emojis: kb.animal_emojis.clone(),
    })
}

// ─── Raciocínio ──────────────────────────────────────────────────

/// POST `/api/forward` — Encadeamento progressivo.
///
/// Lista de características vazia é rejeitada sem chamar o motor.
pub async fn forward(
    State(state): State<AppState>,
    Json(req): Json<ForwardRequest>,
) -> Json<ForwardReply> {
    if req.features.is_empty() {
        return Json(ForwardReply::Rejected(Failure::new(
            "Selecione pelo menos uma característica",
        )));
    }

    let kb = state.kb.read();
    let result = ForwardEngine::run(&kb, req.features);
    tracing::info!(
        success = result.success,
        fired = result.log.len(),
        animal = result.animal.as_deref().unwrap_or("-"),
        "forward: raciocínio concluído"
    );
    Json(ForwardReply::Result(result))
}

/// POST `/api/backward/start` — Inicia uma sessão regressiva.
///
/// O alvo precisa ser um animal da base; caso contrário a resposta é
/// `error` e nenhuma sessão é criada.
pub async fn backward_start(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> Json<BackwardReply> {
    let kb = state.kb.read();
    if !kb.is_animal(&req.target) {
        return Json(ReasoningError::InvalidTarget(req.target).into());
    }
    Json(state.sessions.start(&req.session_id, &kb, &req.target))
}

/// POST `/api/backward/answer` — Responde à pergunta pendente.
pub async fn backward_answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Json<BackwardReply> {
    let kb = state.kb.read();
    Json(state.sessions.answer(&req.session_id, &kb, &req.response))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use chrono::Duration;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::persistence;
    use crate::session::SessionStore;
    use crate::web::create_router;

    fn app() -> (Router, AppState, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(
            persistence::default_rules().unwrap(),
            SessionStore::new(Duration::minutes(30)),
            dir.path().join("rules.json"),
        );
        (create_router(state.clone()), state, dir)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn forward_identifies_penguin() {
        let (app, _, _dir) = app();
        let (status, body) = call(
            &app,
            "POST",
            "/api/forward",
            Some(json!({ "features": ["has_feathers", "cannot_fly", "swims", "black_and_white"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["animal"], "penguin");
        assert_eq!(body["log"][0]["rule_id"], "R3");
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn forward_rejects_empty_features() {
        let (app, _, _dir) = app();
        let (_, body) = call(&app, "POST", "/api/forward", Some(json!({ "features": [] }))).await;
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
        assert!(body.get("log").is_none());
    }

    #[tokio::test]
    async fn forward_reports_insufficient_features() {
        let (app, _, _dir) = app();
        let (_, body) = call(&app, "POST", "/api/forward", Some(json!({ "features": ["has_hair"] }))).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["animal"], Value::Null);
        assert_eq!(body["facts"], json!(["has_hair", "mammal"]));
        assert!(body["message"].as_str().unwrap().contains("insuficientes"));
    }

    #[tokio::test]
    async fn backward_conversation_confirms_zebra() {
        let (app, state, _dir) = app();

        let (_, body) = call(
            &app,
            "POST",
            "/api/backward/start",
            Some(json!({ "target": "zebra", "session_id": "s1" })),
        )
        .await;
        assert_eq!(body["status"], "asking");
        assert_eq!(body["question"], "ungulate");
        assert_eq!(body["is_intermediate"], true);

        let steps = [
            ("unknown", "mammal"),
            ("unknown", "has_hair"),
            ("yes", "has_hooves"),
            ("yes", "black_stripes"),
        ];
        for (response, next_question) in steps {
            let (_, body) = call(
                &app,
                "POST",
                "/api/backward/answer",
                Some(json!({ "response": response, "session_id": "s1" })),
            )
            .await;
            assert_eq!(body["status"], "asking", "{}", body);
            assert_eq!(body["question"], next_question);
        }

        let (_, body) = call(
            &app,
            "POST",
            "/api/backward/answer",
            Some(json!({ "response": "yes", "session_id": "s1" })),
        )
        .await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["animal"], "zebra");
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn omitted_session_id_uses_default_session() {
        let (app, state, _dir) = app();
        let (_, body) = call(&app, "POST", "/api/backward/start", Some(json!({ "target": "tiger" }))).await;
        assert_eq!(body["status"], "asking");
        assert!(state.sessions.contains("default"));

        let (_, body) = call(&app, "POST", "/api/backward/answer", Some(json!({ "response": "yes" }))).await;
        assert_eq!(body["status"], "asking", "{}", body);
        assert_eq!(body["question"], "tawny_color");

        let (_, body) = call(
            &app,
            "POST",
            "/api/backward/answer",
            Some(json!({ "response": "no", "session_id": "default" })),
        )
        .await;
        assert_eq!(body["status"], "failed");
        assert!(body["message"].as_str().unwrap().contains("\"tawny_color\""));
    }

    #[tokio::test]
    async fn backward_rejects_non_animal_target() {
        let (app, state, _dir) = app();
        let (status, body) = call(
            &app,
            "POST",
            "/api/backward/start",
            Some(json!({ "target": "mammal", "session_id": "s1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert!(!state.sessions.contains("s1"));
    }

    #[tokio::test]
    async fn backward_answer_on_unknown_session_is_error() {
        let (app, _, _dir) = app();
        let (_, body) = call(
            &app,
            "POST",
            "/api/backward/answer",
            Some(json!({ "response": "yes", "session_id": "nope" })),
        )
        .await;
        assert_eq!(body["status"], "error");
        assert!(body.get("log").is_none());
    }

    #[tokio::test]
    async fn rule_crud_round_trip_persists() {
        let (app, state, _dir) = app();

        let (_, body) = call(
            &app,
            "POST",
            "/api/rules",
            Some(json!({ "conditions": ["swims", "has_feathers"], "conclusion": "penguin" })),
        )
        .await;
        assert_eq!(body["success"], true);
        assert_eq!(body["rule"]["id"], "R16");
        assert_eq!(body["rule"]["type"], "final");

        let saved = persistence::load_rules(&state.rules_path).unwrap();
        assert_eq!(saved.rule_count(), 16);

        let (status, body) = call(
            &app,
            "PUT",
            "/api/rules/R16",
            Some(json!({ "conditions": ["swims"], "conclusion": "penguin", "type": "final" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rule"]["conditions"], json!(["swims"]));

        let (status, body) = call(&app, "DELETE", "/api/rules/R16", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"]["id"], "R16");
        assert_eq!(state.kb.read().rule_count(), 15);
    }

    #[tokio::test]
    async fn rule_crud_on_missing_id_is_404() {
        let (app, _, _dir) = app();
        let (status, body) = call(&app, "DELETE", "/api/rules/R99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, _) = call(
            &app,
            "PUT",
            "/api/rules/R99",
            Some(json!({ "conditions": [], "conclusion": "bird" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn catalog_endpoints() {
        let (app, _, _dir) = app();
        let (_, body) = call(&app, "GET", "/api/animals", None).await;
        assert_eq!(body["animals"].as_array().unwrap().len(), 7);
        assert_eq!(body["emojis"]["zebra"], "🦓");

        let (_, body) = call(&app, "GET", "/api/features", None).await;
        assert_eq!(body["features"].as_array().unwrap().len(), 20);
        assert!(body["categories"]["Cobertura"].is_array());

        let (_, body) = call(&app, "GET", "/api/rules", None).await;
        assert_eq!(body["rules"].as_array().unwrap().len(), 15);
        assert!(body["featureCategories"].is_object());
    }

    #[tokio::test]
    async fn index_page_lists_animals() {
        let (app, _, _dir) = app();
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("penguin"));
        assert!(html.contains("R15"));
    }
}
