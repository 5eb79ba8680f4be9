// SPDX-License-Identifier: MIT

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::flow::engine::Engine;
use crate::flow::error::EngineError;
use crate::flow::state::{Decision, Modification};

pub async fn serve(
    engine: Arc<Engine>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/reviews", post(start_review))
        .route("/api/reviews/{thread_id}", get(get_review))
        .route("/api/reviews/{thread_id}/history", get(get_history))
        .route("/api/reviews/{thread_id}/decision", post(submit_decision))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(engine);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct StartRequest {
    department: String,
    /// Caller-assigned thread id; generated when absent.
    thread_id: Option<String>,
}

async fn start_review(
    State(engine): State<Arc<Engine>>,
    Json(payload): Json<StartRequest>,
) -> Json<Value> {
    let thread_id = payload
        .thread_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match engine.start(&thread_id, &payload.department) {
        Ok(state) => Json(json!({ "thread_id": thread_id, "state": state })),
        Err(e) => error_json(e),
    }
}

async fn get_review(
    State(engine): State<Arc<Engine>>,
    Path(thread_id): Path<String>,
) -> Json<Value> {
    match engine.state(&thread_id) {
        Ok(state) => Json(json!({ "thread_id": thread_id, "state": state })),
        Err(e) => error_json(e),
    }
}

async fn get_history(
    State(engine): State<Arc<Engine>>,
    Path(thread_id): Path<String>,
) -> Json<Value> {
    match engine.history(&thread_id) {
        Ok(history) => Json(json!({ "thread_id": thread_id, "history": history })),
        Err(e) => error_json(e),
    }
}

#[derive(Deserialize)]
struct DecisionRequest {
    decision: Decision,
    modified_salary: Option<u64>,
    modified_manager: Option<String>,
}

impl DecisionRequest {
    /// Modification carried by the payload, `None` when neither
    /// override field is present.
    fn modification(&self) -> Option<Modification> {
        if self.modified_salary.is_none() && self.modified_manager.is_none() {
            return None;
        }
        Some(Modification {
            modified_salary: self.modified_salary,
            modified_manager: self.modified_manager.clone(),
        })
    }
}

async fn submit_decision(
    State(engine): State<Arc<Engine>>,
    Path(thread_id): Path<String>,
    Json(payload): Json<DecisionRequest>,
) -> Json<Value> {
    let modification = payload.modification();

    match engine.submit_decision(&thread_id, payload.decision, modification) {
        Ok(state) => Json(json!({ "thread_id": thread_id, "state": state })),
        Err(e) => error_json(e),
    }
}

fn error_json(e: EngineError) -> Json<Value> {
    log::warn!("Request failed: {}", e);
    let kind = match &e {
        EngineError::Validation(_) => "validation",
        EngineError::NotFound(_) => "not_found",
        EngineError::AlreadyCompleted(_) => "already_completed",
        EngineError::Store(_) => "store_failure",
    };
    Json(json!({ "error": e.to_string(), "kind": kind }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Roster;
    use crate::flow::nodes::{ProposalChooser, ProposalKind};
    use crate::flow::state::Employee;
    use crate::flow::store::MemoryStore;
    use chrono::NaiveDate;

    struct HikeChooser;

    impl ProposalChooser for HikeChooser {
        fn pick_kind(&self) -> ProposalKind {
            ProposalKind::SalaryHike
        }

        fn pick_index(&self, _len: usize) -> usize {
            0
        }
    }

    fn test_engine() -> Arc<Engine> {
        let roster = Roster::from_employees(vec![Employee {
            id: 1,
            name: "Asha".to_string(),
            department: "Engineering".to_string(),
            position: "Engineer".to_string(),
            current_salary: 100,
            manager: "Dana Iyer".to_string(),
            join_date: NaiveDate::from_ymd_opt(2020, 5, 4).unwrap(),
        }]);
        Arc::new(Engine::new(
            Arc::new(MemoryStore::new()),
            Arc::new(roster),
            Arc::new(HikeChooser),
        ))
    }

    #[test]
    fn test_decision_payload_without_overrides_maps_to_none() {
        let payload: DecisionRequest =
            serde_json::from_value(json!({ "decision": "approve" })).unwrap();
        assert_eq!(payload.decision, Decision::Approve);
        assert!(payload.modification().is_none());
    }

    #[test]
    fn test_decision_payload_with_override_maps_to_modification() {
        let payload: DecisionRequest = serde_json::from_value(json!({
            "decision": "modify",
            "modified_salary": 120
        }))
        .unwrap();

        let modification = payload.modification().unwrap();
        assert_eq!(modification.modified_salary, Some(120));
        assert!(modification.modified_manager.is_none());
    }

    #[tokio::test]
    async fn test_start_and_decide_through_handlers() {
        let engine = test_engine();

        let Json(body) = start_review(
            State(Arc::clone(&engine)),
            Json(StartRequest {
                department: "Engineering".to_string(),
                thread_id: Some("t1".to_string()),
            }),
        )
        .await;
        assert_eq!(body["thread_id"], "t1");
        assert_eq!(body["state"]["proposal"]["type"], "salary_hike");
        assert!(body["state"]["outcome"].is_null());

        let Json(body) = submit_decision(
            State(Arc::clone(&engine)),
            Path("t1".to_string()),
            Json(DecisionRequest {
                decision: Decision::Approve,
                modified_salary: None,
                modified_manager: None,
            }),
        )
        .await;
        assert_eq!(body["state"]["outcome"]["status"], "approved");

        let Json(body) = get_history(State(engine), Path("t1".to_string())).await;
        assert_eq!(body["history"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_thread_reports_not_found_shape() {
        let engine = test_engine();

        let Json(body) = get_review(State(engine), Path("missing".to_string())).await;
        assert_eq!(body["kind"], "not_found");
        assert!(body["error"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn test_generated_thread_id_when_absent() {
        let engine = test_engine();

        let Json(body) = start_review(
            State(engine),
            Json(StartRequest {
                department: "Engineering".to_string(),
                thread_id: None,
            }),
        )
        .await;

        let thread_id = body["thread_id"].as_str().unwrap();
        assert!(Uuid::parse_str(thread_id).is_ok());
    }
}
