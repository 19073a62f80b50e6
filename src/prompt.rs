/*
 * @file prompt.rs
 * @brief Prompt assembly for the chat service
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

//! Assembly of the single prompt string sent to the chat service each turn.

use crate::action::ACTION_MARKER;
use crate::history::ConversationMessage;

/// Number of prior messages included when no window is configured.
pub const DEFAULT_WINDOW: usize = 5;

/// Builds the stateless prompt: rules, fresh state, trailing history, utterance.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    window: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl PromptBuilder {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Produces the full prompt.
    ///
    /// `history` holds prior messages only; the new utterance is appended
    /// after the trailing window and never counts toward it. The state
    /// report is included verbatim, however long it is.
    pub fn build(&self, report: &str, history: &[ConversationMessage], utterance: &str) -> String {
        let mut prompt = String::from("You are a Smart Home Manager.\n");
        prompt.push_str("Current House State:\n");
        prompt.push_str(report);
        prompt.push_str("\n\n");
        prompt.push_str(&rules());
        prompt.push_str("\n\nChat History:\n");
        let start = history.len().saturating_sub(self.window);
        for message in &history[start..] {
            prompt.push_str(&format!("{}: {}\n", message.role.label(), message.content));
        }
        prompt.push_str(&format!("USER: {}\nASSISTANT:", utterance));
        prompt
    }
}

/// Behavioural rules, including the exact action grammar the parser expects.
fn rules() -> String {
    format!(
        "YOUR RULES:\n\
         1. If the user asks a question, answer briefly based on the state above.\n\
         2. IF THE USER WANTS TO CHANGE SOMETHING (turn on/off, open/close, lock/unlock):\n\
         \x20  DO NOT ask \"Do you want me to?\". Just DO IT.\n\
         \x20  To do it, output a command in this EXACT format:\n\
         \x20  {marker} domain.service | entity_id\n\
         \n\
         \x20  Examples:\n\
         \x20  User: \"Turn off garage light\" -> Output: {marker} light.turn_off | light.garage_main\n\
         \x20  User: \"Open blinds\" -> Output: {marker} cover.open_cover | cover.bedroom_blinds\n\
         \n\
         3. Only use entity IDs listed in the state above. Output at most one command.\n\
         4. If you output an action, add a short confirmation text before it.",
        marker = ACTION_MARKER
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{ConversationMessage, Role};

    fn history(n: usize) -> Vec<ConversationMessage> {
        (0..n)
            .map(|i| {
                let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                ConversationMessage::new(role, format!("message-{}", i))
            })
            .collect()
    }

    #[test]
    fn only_last_five_messages_are_included() {
        let prompt = PromptBuilder::default().build("- Lamp (light.lamp): on", &history(8), "hello");
        for i in 0..3 {
            assert!(!prompt.contains(&format!("message-{}\n", i)), "message-{} leaked", i);
        }
        for i in 3..8 {
            assert!(prompt.contains(&format!("message-{}\n", i)), "message-{} missing", i);
        }
        assert!(prompt.contains("ASSISTANT: message-3\n"));
        assert!(prompt.contains("USER: message-4\n"));
    }

    #[test]
    fn contains_marker_grammar_verbatim() {
        let prompt = PromptBuilder::default().build("", &[], "hi");
        assert!(prompt.contains("### ACTION: domain.service | entity_id"));
        assert!(prompt.contains("### ACTION: light.turn_off | light.garage_main"));
    }

    #[test]
    fn sections_appear_in_order() {
        let prompt = PromptBuilder::default().build("STATE-REPORT", &history(2), "turn it off");
        let role = prompt.find("Smart Home Manager").unwrap();
        let state = prompt.find("STATE-REPORT").unwrap();
        let rules = prompt.find("YOUR RULES").unwrap();
        let chat = prompt.find("Chat History:").unwrap();
        let utterance = prompt.find("USER: turn it off").unwrap();
        assert!(role < state && state < rules && rules < chat && chat < utterance);
        assert!(prompt.ends_with("ASSISTANT:"));
    }

    #[test]
    fn window_can_be_widened() {
        let prompt = PromptBuilder::new(10).build("", &history(8), "hi");
        assert!(prompt.contains("message-0\n"));
    }
}
