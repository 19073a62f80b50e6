/*
 * @file speech.rs
 * @brief Spoken replies via the macOS say command
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

//! Spoken replies through the macOS `say` command.

use std::sync::Mutex;

use anyhow::Result;

/// Speaks the given text, optionally with a named system voice.
///
/// # Parameters
/// * `text` - The utterance to synthesize.
/// * `voice` - A `say -v` voice name, or `None` for the system default.
///
/// # Errors
/// Returns an error if the text is empty after cleanup or `say` fails.
/// Callers treat this as best-effort and only log it.
pub fn speak(text: &str, voice: Option<&str>) -> Result<()> {
    let spoken = speakable(text);
    if spoken.is_empty() {
        anyhow::bail!("Cannot speak empty text");
    }
    run_say(&spoken, voice)
}

/// Drops status emoji and collapses whitespace so the voice reads cleanly.
fn speakable(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '✅' | '❌'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn run_say(text: &str, voice: Option<&str>) -> Result<()> {
    if cfg!(test) {
        if *FORCE_ERROR.lock().unwrap() {
            anyhow::bail!("Forced failure for testing");
        }
        return Ok(());
    }

    let mut command = std::process::Command::new("say");
    if let Some(voice) = voice {
        command.arg("-v").arg(voice);
    }
    let status = command.arg(text).status()?;
    if !status.success() {
        anyhow::bail!("say exited with {}", status);
    }
    Ok(())
}

#[cfg_attr(not(test), allow(dead_code))]
static FORCE_ERROR: Mutex<bool> = Mutex::new(false);

#[cfg(test)]
mod tests {
    use super::*;

    static SAY_LOCK: Mutex<()> = Mutex::new(());

    fn serial() -> std::sync::MutexGuard<'static, ()> {
        SAY_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn speak_succeeds_with_text() {
        let _guard = serial();
        assert!(speak("Hello test", Some("Samantha")).is_ok());
    }

    #[test]
    fn speak_fails_when_forced() {
        let _guard = serial();
        *super::FORCE_ERROR.lock().unwrap() = true;
        let result = speak("failure case", None);
        *super::FORCE_ERROR.lock().unwrap() = false;
        assert!(result.is_err());
    }

    #[test]
    fn speak_rejects_empty_text() {
        let _guard = serial();
        assert!(speak("   ", None).is_err());
        assert!(speak("✅", None).is_err());
    }

    #[test]
    fn speakable_strips_markers() {
        assert_eq!(speakable("OK.\n✅ Done!  (light.turn_on)"), "OK. Done! (light.turn_on)");
    }
}
