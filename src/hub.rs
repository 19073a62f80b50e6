/*
 * @file hub.rs
 * @brief Home-automation hub REST client
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Home-automation hub REST client: entity registry reads and service calls.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::action::ActionCommand;
use crate::error::{Error, Result};

/// A single device or sensor record as reported by `GET /api/states`.
#[derive(Clone, Debug, Deserialize)]
pub struct Entity {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

impl Entity {
    /// Builds an entity with an optional friendly name, mostly for tests and fixtures.
    pub fn new(entity_id: &str, state: &str, friendly_name: Option<&str>) -> Self {
        let mut attributes = HashMap::new();
        if let Some(name) = friendly_name {
            attributes.insert("friendly_name".to_string(), Value::from(name));
        }
        Self {
            entity_id: entity_id.to_string(),
            state: state.to_string(),
            attributes,
        }
    }

    /// Category prefix of the identifier (`light` for `light.kitchen`).
    pub fn domain(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map(|(domain, _)| domain)
            .unwrap_or(&self.entity_id)
    }

    /// The hub's `friendly_name`, or the identifier when none is set.
    pub fn display_name(&self) -> &str {
        self.attributes
            .get("friendly_name")
            .and_then(Value::as_str)
            .unwrap_or(&self.entity_id)
    }
}

/// Result of one action dispatch.
///
/// # Details
/// Dispatch never raises; a failed call is a user-visible outcome that
/// leaves the conversation intact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub success: bool,
    pub message: String,
}

impl DispatchOutcome {
    fn done(command: &ActionCommand) -> Self {
        Self {
            success: true,
            message: format!("✅ Done! ({} -> {})", command.service_call, command.entity_id),
        }
    }

    fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("❌ Failed to call the hub action ({}).", reason),
        }
    }
}

/// Bearer-authenticated client for the hub's REST API.
#[derive(Clone)]
pub struct HubClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HubClient {
    /// Creates a client with a fixed per-request timeout.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| Error::Config(format!("failed to build HTTP client: {}", err)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retrieves the full entity list.
    ///
    /// # Errors
    /// * [`Error::Connection`] on network failure or timeout.
    /// * [`Error::HubStatus`] on any status other than 200.
    /// * [`Error::Payload`] when the body is not an entity array.
    pub async fn fetch_states(&self) -> Result<Vec<Entity>> {
        let url = format!("{}/api/states", self.base_url);
        tracing::debug!(%url, "fetching hub states");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("content-type", "application/json")
            .send()
            .await
            .map_err(Error::connection)?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HubStatus {
                status: status.as_u16(),
                body,
            });
        }
        let entities: Vec<Entity> = response
            .json()
            .await
            .map_err(|err| Error::Payload(format!("entity list: {}", err)))?;
        tracing::info!("retrieved {} entities from hub", entities.len());
        Ok(entities)
    }

    /// Posts a service call and returns the decoded JSON body.
    ///
    /// # Errors
    /// Same taxonomy as [`HubClient::fetch_states`].
    pub async fn post_service(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self.send_service(path, body).await?;
        let text = response.text().await.map_err(Error::connection)?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|err| Error::Payload(err.to_string()))
    }

    /// Posts a service call and checks only the status; the body is left unread.
    async fn send_service(&self, path: &str, body: &Value) -> Result<reqwest::Response> {
        let url = format!("{}/api/services/{}", self.base_url, path);
        tracing::debug!(%url, "posting hub service call");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(Error::connection)?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HubStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Executes an action on the hub.
    ///
    /// # Details
    /// Posts `{"entity_id": ...}` to `/api/services/{domain}/{service}`.
    /// Success is decided by the 200 status alone; the response body is
    /// ignored. Network errors and non-200 statuses are logged and reported
    /// through the returned [`DispatchOutcome`], never raised.
    pub async fn call_service(&self, command: &ActionCommand) -> DispatchOutcome {
        let path = format!("{}/{}", command.domain(), command.service());
        let body = json!({ "entity_id": command.entity_id });
        tracing::info!(
            service = %command.service_call,
            entity = %command.entity_id,
            "dispatching hub action"
        );
        match self.send_service(&path, &body).await {
            Ok(_) => DispatchOutcome::done(command),
            Err(Error::HubStatus { status, body }) => {
                tracing::warn!(status, %body, "hub rejected action");
                DispatchOutcome::failed(format!("status {}", status))
            }
            Err(err) => {
                tracing::warn!("action dispatch error: {}", err);
                DispatchOutcome::failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_identifier() {
        let named = Entity::new("light.kitchen", "on", Some("Kitchen"));
        let bare = Entity::new("light.hall", "off", None);
        assert_eq!(named.display_name(), "Kitchen");
        assert_eq!(bare.display_name(), "light.hall");
    }

    #[test]
    fn domain_is_prefix_before_first_dot() {
        assert_eq!(Entity::new("media_player.tv", "on", None).domain(), "media_player");
        assert_eq!(Entity::new("nodot", "on", None).domain(), "nodot");
    }

    #[test]
    fn entity_deserializes_without_attributes() {
        let entity: Entity =
            serde_json::from_str(r#"{"entity_id": "lock.front", "state": "locked"}"#).unwrap();
        assert_eq!(entity.display_name(), "lock.front");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let hub = HubClient::new("http://ha:8123/", "t", Duration::from_secs(1)).unwrap();
        assert_eq!(hub.base_url(), "http://ha:8123");
    }
}
