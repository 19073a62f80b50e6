/*
 * @file error.rs
 * @brief Error taxonomy for hub and chat failures
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

//! Error taxonomy shared by the hub, forecast and chat clients.

use thiserror::Error;

/// Convenience alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a conversational turn.
///
/// # Details
/// None of these are fatal to the process: the console loop prints the
/// message and waits for the next utterance. Best-effort operations
/// (forecasts, dispatch, speech) report through their own outcome types.
#[derive(Debug, Error)]
pub enum Error {
    /// The hub or the chat service could not be reached, or timed out.
    #[error("Connection Error: {0}")]
    Connection(String),

    /// The hub answered with a status other than 200.
    #[error("Error: hub returned status {status}: {body}")]
    HubStatus { status: u16, body: String },

    /// The chat service answered with a non-success status.
    #[error("Error: chat service returned status {status}: {body}")]
    ChatStatus { status: u16, body: String },

    /// A response body could not be decoded into the expected shape.
    #[error("Error: unexpected response payload: {0}")]
    Payload(String),

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Maps a transport-level reqwest failure onto [`Error::Connection`].
    pub(crate) fn connection(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Connection(format!("request timed out: {}", err))
        } else {
            Error::Connection(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_status_message_mentions_error() {
        let err = Error::HubStatus {
            status: 401,
            body: "unauthorized".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("Error"));
        assert!(text.contains("401"));
    }

    #[test]
    fn connection_message_is_user_readable() {
        let err = Error::Connection("refused".to_string());
        assert_eq!(err.to_string(), "Connection Error: refused");
    }
}
