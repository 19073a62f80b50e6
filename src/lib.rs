/*
 * @file lib.rs
 * @brief Hearth library root
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

//! Hearth - a conversational smart-home assistant.
//!
//! Each turn polls the home-automation hub's entity registry, filters it
//! into a short state report, asks an LLM chat service for a reply, and
//! executes any `### ACTION: domain.service | entity_id` command embedded
//! in that reply against the hub's service API.
//!
//! # Example
//! ```no_run
//! use anyhow::Result;
//! use hearth::{assistant::Assistant, config::AppConfig, history::History};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     dotenv::dotenv().ok();
//!     let config = AppConfig::load(Path::new("config.json"));
//!     config.validate()?;
//!     let assistant = Assistant::from_config(&config, History::ephemeral())?;
//!     assistant.run_console(false).await
//! }
//! ```

pub mod action;
pub mod assistant;
pub mod chat;
pub mod config;
pub mod error;
pub mod forecast;
pub mod history;
pub mod hub;
pub mod prompt;
pub mod speech;
pub mod summary;

pub use error::{Error, Result};
