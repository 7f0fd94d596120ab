//! HTTP client for the game engine's JSON API

use std::time::Duration;

use async_trait::async_trait;
use phantomlog_domain::SessionId;
use phantomlog_shared::{
    ActionCommand, ActionRequest, EngineErrorBody, GameStateSnapshot, StartAck, StartGameRequest,
};
use reqwest::{Client, Response};
use url::Url;

use crate::infrastructure::config::{ClientConfig, ConfigError};
use crate::ports::outbound::{EngineError, EnginePort};

/// reqwest-backed [`EnginePort`]
#[derive(Clone)]
pub struct EngineHttpClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl EngineHttpClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::new(config.engine_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, EngineError> {
        self.base_url
            .join(path)
            .map_err(|e| EngineError::RequestFailed(e.to_string()))
    }

    fn transport_error(&self, error: reqwest::Error) -> EngineError {
        if error.is_timeout() {
            EngineError::Timeout(self.timeout)
        } else {
            EngineError::RequestFailed(error.to_string())
        }
    }

    /// Read the body of a response, turning non-2xx statuses into errors.
    async fn read_body(&self, response: Response) -> Result<String, EngineError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if status.is_success() {
            return Ok(body);
        }

        let detail = serde_json::from_str::<EngineErrorBody>(&body)
            .map(|b| b.detail_text())
            .unwrap_or(body);
        if status.is_client_error() {
            Err(EngineError::rejected(status.as_u16(), detail))
        } else {
            Err(EngineError::Server {
                status: status.as_u16(),
                detail,
            })
        }
    }
}

#[async_trait]
impl EnginePort for EngineHttpClient {
    async fn start(
        &self,
        session_id: SessionId,
        player_name: Option<String>,
    ) -> Result<StartAck, EngineError> {
        let request = StartGameRequest {
            thread_id: session_id.to_string(),
            player_name,
        };

        let response = self
            .client
            .post(self.endpoint("api/game/start")?)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let body = self.read_body(response).await?;
        // The engine may answer with an ack or a full snapshot; only success matters.
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn get_state(&self, session_id: SessionId) -> Result<GameStateSnapshot, EngineError> {
        let response = self
            .client
            .get(self.endpoint(&format!("api/game/state/{}", session_id))?)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let body = self.read_body(response).await?;
        serde_json::from_str(&body).map_err(|e| EngineError::InvalidResponse(e.to_string()))
    }

    async fn send_action(
        &self,
        session_id: SessionId,
        command: ActionCommand,
    ) -> Result<(), EngineError> {
        let request = ActionRequest {
            thread_id: session_id.to_string(),
            command,
        };

        let response = self
            .client
            .post(self.endpoint("api/game/action")?)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_body(response).await.map(|_| ())
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use phantomlog_shared::WireActionType;
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct Recorded {
        bodies: Mutex<Vec<Value>>,
        paths: Mutex<Vec<String>>,
    }

    async fn start_handler(
        State(rec): State<Arc<Recorded>>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let thread_id = body["thread_id"].clone();
        rec.bodies.lock().unwrap().push(body);
        Json(json!({ "message": "Game session started", "thread_id": thread_id }))
    }

    async fn state_handler(
        State(rec): State<Arc<Recorded>>,
        Path(thread_id): Path<String>,
    ) -> (StatusCode, String) {
        rec.paths.lock().unwrap().push(thread_id.clone());
        match thread_id.as_str() {
            "missing" => (
                StatusCode::NOT_FOUND,
                json!({ "detail": "Game session not found" }).to_string(),
            ),
            "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()),
            "garbled" => (StatusCode::OK, "{not json".to_string()),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                (StatusCode::OK, "{}".to_string())
            }
            _ => (
                StatusCode::OK,
                json!({ "phase": "discussion", "messages": [] }).to_string(),
            ),
        }
    }

    async fn action_handler(
        State(rec): State<Arc<Recorded>>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let refused = body["target"] == json!("Nobody");
        rec.bodies.lock().unwrap().push(body);
        if refused {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Action failed: no such character" })),
            )
        } else {
            (StatusCode::OK, Json(json!({ "phase": "voting" })))
        }
    }

    async fn spawn_engine() -> (SocketAddr, Arc<Recorded>, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let rec = Arc::new(Recorded::default());

        let router = Router::new()
            .route("/api/game/start", post(start_handler))
            .route("/api/game/state/{thread_id}", get(state_handler))
            .route("/api/game/action", post(action_handler))
            .nest(
                "/garbled",
                Router::new().route(
                    "/api/game/state/{thread_id}",
                    get(|| async { (StatusCode::OK, "{not json") }),
                ),
            )
            .with_state(rec.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (addr, rec, handle)
    }

    fn client_for(addr: SocketAddr, timeout: Duration) -> EngineHttpClient {
        let url = Url::parse(&format!("http://{}", addr)).unwrap();
        EngineHttpClient::new(url, timeout).unwrap()
    }

    #[tokio::test]
    async fn start_posts_thread_id_and_player_name() {
        let (addr, rec, _server) = spawn_engine().await;
        let client = client_for(addr, Duration::from_secs(5));
        let session_id = SessionId::new();

        let ack = client
            .start(session_id, Some("Investigator".into()))
            .await
            .unwrap();

        assert_eq!(ack.thread_id, Some(session_id.to_string()));
        let bodies = rec.bodies.lock().unwrap();
        assert_eq!(
            bodies[0],
            json!({ "thread_id": session_id.to_string(), "player_name": "Investigator" })
        );
    }

    #[tokio::test]
    async fn get_state_returns_raw_snapshot() {
        let (addr, rec, _server) = spawn_engine().await;
        let client = client_for(addr, Duration::from_secs(5));
        let session_id = SessionId::new();

        let snapshot = client.get_state(session_id).await.unwrap();

        assert_eq!(snapshot.field("phase"), Some(&json!("discussion")));
        assert_eq!(
            rec.paths.lock().unwrap().as_slice(),
            &[session_id.to_string()]
        );
    }

    #[tokio::test]
    async fn send_action_flattens_command_into_body() {
        let (addr, rec, _server) = spawn_engine().await;
        let client = client_for(addr, Duration::from_secs(5));
        let session_id = SessionId::new();

        client
            .send_action(
                session_id,
                ActionCommand::new(WireActionType::Vote).with_target("Chef"),
            )
            .await
            .unwrap();

        let bodies = rec.bodies.lock().unwrap();
        assert_eq!(
            bodies[0],
            json!({
                "thread_id": session_id.to_string(),
                "action_type": "vote",
                "content": null,
                "target": "Chef"
            })
        );
    }

    #[tokio::test]
    async fn engine_refusal_carries_detail() {
        let (addr, _rec, _server) = spawn_engine().await;
        let client = client_for(addr, Duration::from_secs(5));

        let err = client
            .send_action(
                SessionId::new(),
                ActionCommand::new(WireActionType::Suspect).with_target("Nobody"),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err,
            EngineError::rejected(400, "Action failed: no such character")
        );
        assert!(!err.is_connectivity());
    }

    #[tokio::test]
    async fn status_and_body_problems_are_classified() {
        let (addr, _rec, _server) = spawn_engine().await;
        let client = client_for(addr, Duration::from_secs(5));
        let base = client.base_url().clone();

        let get = |thread_id: &str| {
            let client = client.clone();
            let url = base.join(&format!("api/game/state/{}", thread_id)).unwrap();
            async move {
                let response = client.client.get(url).send().await.unwrap();
                client.read_body(response).await
            }
        };

        assert_eq!(
            get("missing").await,
            Err(EngineError::rejected(404, "Game session not found"))
        );
        assert_eq!(
            get("broken").await,
            Err(EngineError::Server {
                status: 500,
                detail: "boom".into()
            })
        );
        assert_eq!(get("garbled").await, Ok("{not json".to_string()));
    }

    #[tokio::test]
    async fn unparsable_state_is_an_invalid_response() {
        let (addr, _rec, _server) = spawn_engine().await;
        let url = Url::parse(&format!("http://{}/garbled", addr)).unwrap();
        let client = EngineHttpClient::new(url, Duration::from_secs(5)).unwrap();

        let err = client.get_state(SessionId::new()).await.unwrap_err();

        assert!(matches!(err, EngineError::InvalidResponse(_)), "{:?}", err);
        assert!(err.is_connectivity());
    }

    #[test]
    fn from_config_keeps_configured_base_and_timeout() {
        let config = ClientConfig::from_lookup(|key| match key {
            "PHANTOM_ENGINE_URL" => Some("http://engine.local:9000".into()),
            "PHANTOM_REQUEST_TIMEOUT_MS" => Some("250".into()),
            _ => None,
        })
        .unwrap();

        let client = EngineHttpClient::from_config(&config).unwrap();

        assert_eq!(client.base_url().as_str(), "http://engine.local:9000/");
        assert_eq!(client.timeout, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn slow_engine_times_out() {
        let (addr, _rec, _server) = spawn_engine().await;
        let client = client_for(addr, Duration::from_millis(100));
        let url = client.base_url().join("api/game/state/slow").unwrap();

        let err = client.client.get(url).send().await.unwrap_err();

        assert_eq!(
            client.transport_error(err),
            EngineError::Timeout(Duration::from_millis(100))
        );
    }

    #[tokio::test]
    async fn unreachable_engine_is_a_connectivity_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(addr, Duration::from_secs(2));

        let err = client.get_state(SessionId::new()).await.unwrap_err();

        assert!(matches!(err, EngineError::RequestFailed(_)));
        assert!(err.is_connectivity());
    }

    #[test]
    fn base_path_is_preserved() {
        let client = EngineHttpClient::new(
            Url::parse("http://engine.local/phantom").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("api/game/start").unwrap().as_str(),
            "http://engine.local/phantom/api/game/start"
        );
    }
}
