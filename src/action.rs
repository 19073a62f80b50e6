/*
 * @file action.rs
 * @brief Action marker parsing for model replies
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

//! Extraction of the `### ACTION:` command embedded in model replies.
//!
//! The model is instructed to write `### ACTION: domain.service | entity_id`
//! anywhere in its reply. Surrounding prose is tolerated, so a marker the
//! model echoes inside an explanation is still treated as a command.

use thiserror::Error;

/// Literal token the model must emit to request an action.
pub const ACTION_MARKER: &str = "### ACTION:";

/// A `(service_call, entity_id)` pair parsed from one reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionCommand {
    /// `domain.service`, e.g. `light.turn_off`.
    pub service_call: String,
    pub entity_id: String,
}

impl ActionCommand {
    pub fn domain(&self) -> &str {
        self.split().0
    }

    pub fn service(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        // Parsed commands always contain a dot.
        self.service_call
            .split_once('.')
            .unwrap_or((&self.service_call, ""))
    }
}

/// Marker present but the payload could not be understood.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MalformedAction {
    #[error("action payload has no '|' separator: {0:?}")]
    MissingPipe(String),

    #[error("action service is not of the form domain.service: {0:?}")]
    InvalidService(String),

    #[error("action payload names no entity")]
    MissingEntity,
}

/// Scans a reply for an action command.
///
/// # Returns
/// * `Ok(None)` - no marker, nothing to do.
/// * `Ok(Some(command))` - a well-formed command after the first marker.
///
/// # Errors
/// Returns [`MalformedAction`] when the marker is present but the payload
/// is missing its pipe, its dotted service, or its entity.
pub fn parse_action(reply: &str) -> Result<Option<ActionCommand>, MalformedAction> {
    let Some(start) = reply.find(ACTION_MARKER) else {
        return Ok(None);
    };
    let payload = &reply[start + ACTION_MARKER.len()..];
    let (service_part, entity_part) = payload
        .split_once('|')
        .ok_or_else(|| MalformedAction::MissingPipe(first_line(payload).to_string()))?;

    let service_call = parse_service(service_part)?;
    let entity_id = entity_part
        .split_whitespace()
        .next()
        .ok_or(MalformedAction::MissingEntity)?;

    Ok(Some(ActionCommand {
        service_call,
        entity_id: entity_id.to_string(),
    }))
}

/// Text of the reply that precedes the first marker, or the whole reply.
pub fn reply_prose(reply: &str) -> &str {
    match reply.find(ACTION_MARKER) {
        Some(start) => reply[..start].trim_end(),
        None => reply,
    }
}

fn parse_service(raw: &str) -> Result<String, MalformedAction> {
    let service = raw.trim();
    let valid = match service.split_once('.') {
        Some((domain, name)) => {
            !domain.is_empty()
                && !name.is_empty()
                && !name.contains('.')
                && !service.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(service.to_string())
    } else {
        Err(MalformedAction::InvalidService(service.to_string()))
    }
}

fn first_line(text: &str) -> &str {
    text.trim().lines().next().unwrap_or("")
}
