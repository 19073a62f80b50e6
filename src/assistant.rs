/*
 * @file assistant.rs
 * @brief Turn orchestration and console loop for Hearth
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

//! Turn orchestration: state report, prompt, chat, action dispatch.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::action::{self, ActionCommand, MalformedAction};
use crate::chat::{self, ChatClient};
use crate::config::AppConfig;
use crate::error;
use crate::forecast::ForecastFetcher;
use crate::history::History;
use crate::hub::{DispatchOutcome, HubClient};
use crate::prompt::PromptBuilder;
use crate::speech::speak;
use crate::summary::{self, AliasTable, FilterRules};

/// Utterance used for the optional startup greeting.
const GREETING_REQUEST: &str =
    "Briefly greet me and summarize the current state of the house. Do not perform any action.";

/// Words that end the console session when typed on their own.
const QUIT_WORDS: [&str; 3] = ["exit", "quit", "stop"];

/// What happened to the action marker in one reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionResult {
    /// The reply carried no marker.
    None,
    /// A marker was present but unparsable; nothing was dispatched.
    Malformed(MalformedAction),
    /// A command was parsed and sent to the hub.
    Dispatched {
        command: ActionCommand,
        outcome: DispatchOutcome,
    },
}

/// Text shown to the user for one completed turn.
#[derive(Clone, Debug)]
pub struct TurnReply {
    pub text: String,
    pub action: ActionResult,
}

/// One conversational session against a single hub.
///
/// # Details
/// Owns every collaborator a turn needs; the caller holds it for the life
/// of the session and passes it by `&mut` through each turn.
pub struct Assistant {
    hub: HubClient,
    forecasts: Option<ForecastFetcher>,
    rules: FilterRules,
    aliases: AliasTable,
    prompt: PromptBuilder,
    chat: Box<dyn ChatClient>,
    history: History,
    voice: Option<String>,
    speak_replies: bool,
}

impl Assistant {
    /// Creates a session with the default prompt window and the default
    /// filtering lists from [`AppConfig`]; override them with the builders.
    pub fn new(hub: HubClient, chat: Box<dyn ChatClient>, history: History) -> Self {
        Self {
            forecasts: Some(ForecastFetcher::new(hub.clone())),
            hub,
            rules: AppConfig::default().filter_rules(),
            aliases: AliasTable::default(),
            prompt: PromptBuilder::default(),
            chat,
            history,
            voice: None,
            speak_replies: false,
        }
    }

    /// Wires a session from configuration.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig, history: History) -> error::Result<Self> {
        let hub = HubClient::new(&config.hub_url, &config.hub_token, config.request_timeout())?;
        let chat = chat::from_config(config)?;
        Ok(Self::new(hub, chat, history)
            .with_rules(config.filter_rules())
            .with_aliases(config.alias_table())
            .with_forecasts(config.forecasts)
            .with_window(config.history_window)
            .with_speech(config.speak_replies, config.voice.clone()))
    }

    pub fn with_rules(mut self, rules: FilterRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_forecasts(mut self, enabled: bool) -> Self {
        self.forecasts = enabled.then(|| ForecastFetcher::new(self.hub.clone()));
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.prompt = PromptBuilder::new(window);
        self
    }

    pub fn with_speech(mut self, enabled: bool, voice: Option<String>) -> Self {
        self.speak_replies = enabled;
        self.voice = voice;
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Fetches the hub registry and renders the filtered report.
    ///
    /// # Errors
    /// Propagates hub connection, status and payload errors; forecast
    /// failures are folded into the report instead.
    pub async fn state_report(&self) -> error::Result<String> {
        let entities = self.hub.fetch_states().await?;
        let mut lines = summary::summarize(&entities, &self.rules, &self.aliases);
        if let Some(fetcher) = &self.forecasts {
            for line in lines.iter_mut().filter(|line| line.is_weather()) {
                line.forecast = Some(fetcher.fetch(&line.entity_id).await);
            }
        }
        tracing::info!("state report covers {} of {} entities", lines.len(), entities.len());
        Ok(summary::render_report(&lines))
    }

    /// Runs one full turn for a user utterance.
    ///
    /// # Details
    /// State is fetched fresh, the prompt is rebuilt from the trailing
    /// window, and any action in the reply is dispatched. The exchange is
    /// recorded even when dispatch fails.
    ///
    /// # Errors
    /// Hub-state and chat failures abort the turn before anything is
    /// recorded.
    pub async fn handle_turn(&mut self, utterance: &str) -> error::Result<TurnReply> {
        let report = self.state_report().await?;
        let window = self.history.trailing(self.prompt.window());
        let prompt = self.prompt.build(&report, window, utterance);
        let reply = self.chat.complete(&prompt).await?;
        let turn = self.act_on(&reply).await;
        self.history.push_exchange(utterance, &turn.text);
        Ok(turn)
    }

    /// Asks the model for a short opening summary without recording it.
    ///
    /// # Errors
    /// Same as [`Assistant::handle_turn`].
    pub async fn greet(&self) -> error::Result<String> {
        let report = self.state_report().await?;
        let prompt = self.prompt.build(&report, &[], GREETING_REQUEST);
        let reply = self.chat.complete(&prompt).await?;
        Ok(action::reply_prose(&reply).to_string())
    }

    async fn act_on(&self, reply: &str) -> TurnReply {
        match action::parse_action(reply) {
            Ok(None) => TurnReply {
                text: reply.to_string(),
                action: ActionResult::None,
            },
            Err(err) => {
                tracing::warn!("ignoring malformed action: {}", err);
                TurnReply {
                    text: reply.to_string(),
                    action: ActionResult::Malformed(err),
                }
            }
            Ok(Some(command)) => {
                let outcome = self.hub.call_service(&command).await;
                let prose = action::reply_prose(reply);
                let text = if prose.is_empty() {
                    outcome.message.clone()
                } else {
                    format!("{}\n{}", prose, outcome.message)
                };
                TurnReply {
                    text,
                    action: ActionResult::Dispatched { command, outcome },
                }
            }
        }
    }

    /// Speaks a reply when speech output is enabled, logging failures.
    fn speak_response(&self, text: &str) {
        if !self.speak_replies {
            return;
        }
        if let Err(err) = speak(text, self.voice.as_deref()) {
            tracing::warn!("TTS error: {}", err);
        }
    }

    /// Reads utterances from stdin until a quit word or end of input.
    ///
    /// # Errors
    /// Only stdin/stdout failures end the loop with an error; turn
    /// failures are printed and the loop continues.
    pub async fn run_console(mut self, greet: bool) -> Result<()> {
        println!("\n--- 🏠 HEARTH HOME AGENT 🏠 ---\n");
        if greet {
            match self.greet().await {
                Ok(text) => {
                    println!("Assistant: {}\n", text);
                    self.speak_response(&text);
                }
                Err(err) => println!("{}\n", err),
            }
        }
        println!("💬 Agent ready! (Type 'exit' to quit)\n");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("You: ");
            std::io::stdout().flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if should_quit(input) {
                break;
            }
            match self.handle_turn(input).await {
                Ok(reply) => {
                    println!("Assistant: {}\n", reply.text);
                    self.speak_response(&reply.text);
                }
                Err(err) => println!("❌ {}\n", err),
            }
        }
        Ok(())
    }
}

/// Whether the input is one of the exit words on its own.
pub fn should_quit(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    QUIT_WORDS.contains(&normalized.as_str())
}
