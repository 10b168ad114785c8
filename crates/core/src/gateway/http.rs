use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::{ApiResponse, TaskGateway};
use crate::capture::validate_title;
use crate::config::AppConfig;
use crate::error::TaskError;
use crate::model::{NewTask, Task, TaskPatch};

const FALLBACK_MESSAGE: &str = "An error occurred";

/// [`TaskGateway`] backed by the REST task API.
///
/// The HTTP client is blocking, so every call runs on the runtime's blocking pool.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    agent: ureq::Agent,
    base: Url,
}

impl HttpGateway {
    pub fn new(config: &AppConfig) -> Result<Self, TaskError> {
        let base = Url::parse(config.api_base_url())
            .map_err(|err| TaskError::Validation(format!("invalid base URL: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(TaskError::Validation(format!(
                "'{}' cannot be used as a base URL",
                config.api_base_url()
            )));
        }
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout())
            .build();
        Ok(Self { agent, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "tasks"]).extend(segments);
        }
        url
    }

    async fn send<T, F>(
        &self,
        method: &'static str,
        url: Url,
        body: Option<Value>,
        decode: F,
    ) -> Result<T, TaskError>
    where
        T: Send + 'static,
        F: FnOnce(ureq::Response) -> Result<T, TaskError> + Send + 'static,
    {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || {
            let response = execute(&agent, method, &url, body)?;
            decode(response)
        })
        .await
        .map_err(|err| TaskError::Network(format!("request task failed: {err}")))?
    }

    async fn send_for_task(
        &self,
        method: &'static str,
        url: Url,
        body: Option<Value>,
    ) -> Result<Task, TaskError> {
        self.send(method, url, body, decode_data::<Task>).await
    }
}

#[async_trait]
impl TaskGateway for HttpGateway {
    async fn list(&self, date: Option<NaiveDate>) -> Result<Vec<Task>, TaskError> {
        let mut url = self.endpoint(&[]);
        if let Some(date) = date {
            url.query_pairs_mut()
                .append_pair("date", &date.format("%Y-%m-%d").to_string());
        }
        self.send("GET", url, None, decode_data::<Vec<Task>>).await
    }

    async fn get(&self, id: &str) -> Result<Task, TaskError> {
        self.send_for_task("GET", self.endpoint(&[id]), None).await
    }

    async fn create(&self, draft: &NewTask) -> Result<Task, TaskError> {
        validate_title(&draft.title)?;
        let body = to_body(draft)?;
        self.send_for_task("POST", self.endpoint(&[]), Some(body))
            .await
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, TaskError> {
        let body = to_body(patch)?;
        self.send_for_task("PUT", self.endpoint(&[id]), Some(body))
            .await
    }

    async fn toggle_status(&self, id: &str) -> Result<Task, TaskError> {
        self.send_for_task("PATCH", self.endpoint(&[id, "toggle"]), None)
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), TaskError> {
        self.send("DELETE", self.endpoint(&[id]), None, |_| Ok(()))
            .await
    }
}

fn execute(
    agent: &ureq::Agent,
    method: &str,
    url: &Url,
    body: Option<Value>,
) -> Result<ureq::Response, TaskError> {
    let request = agent.request_url(method, url);
    let result = match body {
        Some(body) => request.send_json(body),
        None => request.call(),
    };

    match result {
        Ok(response) => {
            tracing::debug!(
                method,
                path = url.path(),
                status = response.status(),
                "task api request"
            );
            Ok(response)
        }
        Err(ureq::Error::Status(status, response)) => {
            let message = error_message(response);
            tracing::debug!(method, path = url.path(), status, message = %message, "task api rejected request");
            Err(TaskError::Gateway { status, message })
        }
        Err(ureq::Error::Transport(transport)) => {
            tracing::debug!(method, path = url.path(), error = %transport, "task api unreachable");
            Err(TaskError::Network(transport.to_string()))
        }
    }
}

fn decode_data<T: DeserializeOwned>(response: ureq::Response) -> Result<T, TaskError> {
    response
        .into_json::<ApiResponse<T>>()
        .map_err(|err| TaskError::InvalidResponse(err.to_string()))?
        .into_data()
}

fn error_message(response: ureq::Response) -> String {
    response
        .into_json::<Value>()
        .ok()
        .and_then(|body| {
            body.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}

fn to_body<T: serde::Serialize>(payload: &T) -> Result<Value, TaskError> {
    serde_json::to_value(payload)
        .map_err(|err| TaskError::Validation(format!("could not encode request: {err}")))
}
