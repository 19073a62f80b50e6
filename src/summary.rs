/*
 * @file summary.rs
 * @brief Entity filtering and state report rendering
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

//! Filtering of the hub's entity list into a prompt-sized state report.

use std::collections::BTreeMap;

use crate::forecast::Forecast;
use crate::hub::Entity;

/// Heading placed above the per-entity lines.
pub const REPORT_HEADING: &str = "CURRENT HOUSE STATE:";

/// States that carry no information for the model.
const SKIPPED_STATES: [&str; 2] = ["unavailable", "unknown"];

/// Operator-tunable lists deciding which entities reach the prompt.
#[derive(Clone, Debug, Default)]
pub struct FilterRules {
    /// Case-sensitive substrings of display names to suppress.
    pub blocked_keywords: Vec<String>,
    /// Domain prefixes allowed into the report.
    pub allowed_domains: Vec<String>,
    /// Substrings required of `sensor.*` identifiers; empty keeps every sensor.
    pub sensor_keywords: Vec<String>,
}

impl FilterRules {
    /// Applies the four filtering steps in order.
    ///
    /// `name` is always the hub's own display name, never an aliased one.
    pub fn admits(&self, entity: &Entity) -> bool {
        if SKIPPED_STATES.contains(&entity.state.as_str()) {
            return false;
        }
        let name = entity.display_name();
        if self
            .blocked_keywords
            .iter()
            .any(|word| name.contains(word.as_str()))
        {
            return false;
        }
        let domain = entity.domain();
        if !self.allowed_domains.iter().any(|allowed| allowed == domain) {
            return false;
        }
        if domain == "sensor" && !self.sensor_keywords.is_empty() {
            return self
                .sensor_keywords
                .iter()
                .any(|key| entity.entity_id.contains(key.as_str()));
        }
        true
    }
}

/// Static identifier-to-nickname table.
#[derive(Clone, Debug, Default)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    /// Returns `name` with `" (Alias: <nickname>)"` appended when the
    /// identifier has a nickname. Re-applying to an aliased name is a no-op.
    pub fn apply(&self, entity_id: &str, name: &str) -> String {
        match self.aliases.get(entity_id) {
            Some(nickname) => {
                let suffix = format!(" (Alias: {})", nickname);
                if name.ends_with(&suffix) {
                    name.to_string()
                } else {
                    format!("{}{}", name, suffix)
                }
            }
            None => name.to_string(),
        }
    }
}

/// One surviving entity, ready to render.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryLine {
    pub entity_id: String,
    pub name: String,
    pub state: String,
    pub forecast: Option<Forecast>,
}

impl SummaryLine {
    pub fn is_weather(&self) -> bool {
        self.entity_id.starts_with("weather.")
    }

    pub fn render(&self) -> String {
        let mut line = format!("- {} ({}): {}", self.name, self.entity_id, self.state);
        if let Some(forecast) = &self.forecast {
            line.push_str(" | Forecast: ");
            line.push_str(&forecast.to_string());
        }
        line
    }
}

/// Filters entities and attaches their aliased display names, preserving hub order.
pub fn summarize(entities: &[Entity], rules: &FilterRules, aliases: &AliasTable) -> Vec<SummaryLine> {
    entities
        .iter()
        .filter(|entity| rules.admits(entity))
        .map(|entity| SummaryLine {
            entity_id: entity.entity_id.clone(),
            name: aliases.apply(&entity.entity_id, entity.display_name()),
            state: entity.state.clone(),
            forecast: None,
        })
        .collect()
}

/// Renders the report text sent to the model.
pub fn render_report(lines: &[SummaryLine]) -> String {
    let mut report = String::from(REPORT_HEADING);
    report.push('\n');
    if lines.is_empty() {
        report.push_str("(no devices reported)");
        return report;
    }
    let body: Vec<String> = lines.iter().map(SummaryLine::render).collect();
    report.push_str(&body.join("\n"));
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> FilterRules {
        FilterRules {
            blocked_keywords: vec!["Voltage".to_string(), "SSID".to_string()],
            allowed_domains: ["light", "switch", "sensor", "weather"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sensor_keywords: vec!["temp".to_string(), "humid".to_string(), "battery".to_string()],
        }
    }

    fn ids(lines: &[SummaryLine]) -> Vec<&str> {
        lines.iter().map(|l| l.entity_id.as_str()).collect()
    }

    #[test]
    fn unavailable_and_unknown_are_dropped() {
        let entities = vec![
            Entity::new("light.a", "unavailable", Some("A")),
            Entity::new("light.b", "unknown", Some("B")),
            Entity::new("light.c", "on", Some("C")),
        ];
        let lines = summarize(&entities, &rules(), &AliasTable::default());
        assert_eq!(ids(&lines), vec!["light.c"]);
    }

    #[test]
    fn blocked_keyword_wins_over_allowed_domain() {
        let entities = vec![
            Entity::new("switch.plug", "on", Some("Plug Voltage")),
            Entity::new("switch.router", "on", Some("Router SSID")),
            Entity::new("switch.lamp", "on", Some("Lamp")),
        ];
        let lines = summarize(&entities, &rules(), &AliasTable::default());
        assert_eq!(ids(&lines), vec!["switch.lamp"]);
    }

    #[test]
    fn blocked_keyword_is_case_sensitive() {
        let entities = vec![Entity::new("light.v", "on", Some("voltage lamp"))];
        let lines = summarize(&entities, &rules(), &AliasTable::default());
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn domains_outside_allow_list_are_dropped() {
        let entities = vec![
            Entity::new("automation.night", "on", Some("Night")),
            Entity::new("lights.fake", "on", Some("Fake")),
            Entity::new("light.real", "off", Some("Real")),
        ];
        let lines = summarize(&entities, &rules(), &AliasTable::default());
        assert_eq!(ids(&lines), vec!["light.real"]);
    }

    #[test]
    fn sensors_need_an_interesting_identifier() {
        let entities = vec![
            Entity::new("sensor.living_temperature", "21.5", Some("Living")),
            Entity::new("sensor.bath_humidity", "60", Some("Bath")),
            Entity::new("sensor.phone_battery", "80", Some("Phone")),
            Entity::new("sensor.power_meter", "230", Some("Meter")),
        ];
        let lines = summarize(&entities, &rules(), &AliasTable::default());
        assert_eq!(
            ids(&lines),
            vec!["sensor.living_temperature", "sensor.bath_humidity", "sensor.phone_battery"]
        );
    }

    #[test]
    fn empty_sensor_keywords_keep_all_sensors() {
        let mut rules = rules();
        rules.sensor_keywords.clear();
        let entities = vec![Entity::new("sensor.power_meter", "230", Some("Meter"))];
        assert_eq!(summarize(&entities, &rules, &AliasTable::default()).len(), 1);
    }

    #[test]
    fn alias_changes_name_not_membership() {
        let mut table = BTreeMap::new();
        table.insert("light.c".to_string(), "Voltage Lamp".to_string());
        table.insert("switch.x".to_string(), "Heater".to_string());
        let aliases = AliasTable::new(table);
        let entities = vec![
            Entity::new("light.c", "on", Some("Desk")),
            Entity::new("switch.x", "on", Some("Plug Voltage")),
        ];
        let plain = summarize(&entities, &rules(), &AliasTable::default());
        let aliased = summarize(&entities, &rules(), &aliases);
        assert_eq!(ids(&plain), ids(&aliased));
        assert_eq!(aliased[0].name, "Desk (Alias: Voltage Lamp)");
    }

    #[test]
    fn alias_is_idempotent() {
        let mut table = BTreeMap::new();
        table.insert("light.c".to_string(), "Lampy".to_string());
        let aliases = AliasTable::new(table);
        let once = aliases.apply("light.c", "Desk");
        let twice = aliases.apply("light.c", &once);
        assert_eq!(once, twice);
        assert_eq!(aliases.apply("light.other", "Other"), "Other");
    }

    #[test]
    fn report_uses_line_format() {
        let entities = vec![
            Entity::new("light.kitchen", "on", Some("Kitchen")),
            Entity::new("switch.fan", "off", None),
        ];
        let report = render_report(&summarize(&entities, &rules(), &AliasTable::default()));
        assert_eq!(
            report,
            "CURRENT HOUSE STATE:\n- Kitchen (light.kitchen): on\n- switch.fan (switch.fan): off"
        );
    }

    #[test]
    fn weather_line_carries_forecast() {
        let line = SummaryLine {
            entity_id: "weather.home".to_string(),
            name: "Home".to_string(),
            state: "sunny".to_string(),
            forecast: Some(Forecast::Unavailable("timeout".to_string())),
        };
        assert!(line.is_weather());
        assert_eq!(
            line.render(),
            "- Home (weather.home): sunny | Forecast: forecast unavailable"
        );
    }

    #[test]
    fn empty_report_says_so() {
        assert_eq!(render_report(&[]), "CURRENT HOUSE STATE:\n(no devices reported)");
    }
}
