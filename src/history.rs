/*
 * @file history.rs
 * @brief Conversation history and JSON persistence
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

//! Conversation history with optional JSON persistence.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Speaker of a conversation message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Upper-case label used when serializing history into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        }
    }
}

/// One utterance from either side of the conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Ordered, append-only conversation log.
///
/// # Details
/// When constructed with a store path every change rewrites the whole file
/// as a pretty-printed JSON array of `{role, content}` records. Without a
/// path the history lives only as long as the process.
#[derive(Debug, Default)]
pub struct History {
    messages: Vec<ConversationMessage>,
    store: Option<PathBuf>,
}

impl History {
    /// In-memory history that is lost on exit.
    pub fn ephemeral() -> Self {
        Self::default()
    }

    /// Loads history from `path`, starting fresh if it cannot be read.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let messages = match load_messages(&path) {
            Ok(messages) => messages,
            Err(err) => {
                tracing::warn!("History load error: {:#}", err);
                Vec::new()
            }
        };
        tracing::debug!("loaded {} history messages", messages.len());
        Self {
            messages,
            store: Some(path),
        }
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last `n` messages, oldest first.
    pub fn trailing(&self, n: usize) -> &[ConversationMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Appends a completed user/assistant exchange and persists it.
    pub fn push_exchange(&mut self, user_text: &str, reply: &str) {
        self.messages
            .push(ConversationMessage::new(Role::User, user_text));
        self.messages
            .push(ConversationMessage::new(Role::Assistant, reply));
        self.persist();
    }

    fn persist(&self) {
        if let Some(path) = &self.store {
            if let Err(err) = persist_messages(path, &self.messages) {
                tracing::warn!("History persist error: {:#}", err);
            }
        }
    }
}

/// Reads a history file. A missing or blank file is an empty history.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
fn load_messages(path: &Path) -> Result<Vec<ConversationMessage>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Overwrites the history file with the full message list.
fn persist_messages(path: &Path, messages: &[ConversationMessage]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(messages)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
