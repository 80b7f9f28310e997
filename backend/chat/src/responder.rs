//! Keyword intent classification and canned assistant replies.
//!
//! Pure and deterministic: the same input always yields the same template.

use serde::{Deserialize, Serialize};
use tracing::debug;
use weatherwise_core::{Message, Recommendation};

/// Closed set of request categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    WeatherQuery,
    OutdoorSafetyQuery,
    Generic,
}

/// Keyword sets in priority order; the first set with a hit wins.
const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::WeatherQuery, &["weather", "forecast"]),
    (Intent::OutdoorSafetyQuery, &["outdoor", "hiking", "hike"]),
];

/// Case-insensitive substring match against the keyword table.
pub fn classify(input: &str) -> Intent {
    let lowered = input.to_lowercase();
    INTENT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Generic)
}

/// A canned reply: body text, optional place recommendation, follow-ups.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseTemplate {
    pub intent: Intent,
    pub text: &'static str,
    pub recommendation: Option<Recommendation>,
    pub suggestions: &'static [&'static str],
}

impl ResponseTemplate {
    pub fn into_message(self) -> Message {
        let message = Message::assistant(self.text).with_suggestions(self.suggestions.iter().copied());
        match self.recommendation {
            Some(rec) => message.with_recommendation(rec),
            None => message,
        }
    }
}

pub fn respond(intent: Intent) -> ResponseTemplate {
    match intent {
        Intent::WeatherQuery => ResponseTemplate {
            intent,
            text: "I've analyzed current weather conditions for your activity. Here are the top recommendations:",
            recommendation: Some(
                Recommendation::new("Golden Gate Park, San Francisco", (-122.4194, 37.7749), 92)
                    .with_reasons([
                        "Perfect temperature range (68-75°F)",
                        "Low precipitation probability (<5%)",
                        "Excellent air quality index (35)",
                        "Moderate humidity levels (45-55%)",
                        "Clear skies expected",
                    ]),
            ),
            suggestions: &[
                "Check hourly forecast updates",
                "Monitor wind conditions",
                "Plan for temperature changes",
                "Consider UV protection",
            ],
        },
        Intent::OutdoorSafetyQuery => ResponseTemplate {
            intent,
            text: "Based on outdoor activity safety analysis, here's an ideal location:",
            recommendation: Some(
                Recommendation::new("Central Park Great Lawn, NYC", (-73.9665, 40.7812), 88)
                    .with_reasons([
                        "Optimal visibility conditions",
                        "Low wind speed for comfort",
                        "Good trail conditions",
                        "Safe UV index levels",
                        "Air quality suitable for exercise",
                    ]),
            ),
            suggestions: &[
                "Check trail conditions",
                "Bring appropriate gear",
                "Stay hydrated",
                "Monitor weather alerts",
            ],
        },
        Intent::Generic => ResponseTemplate {
            intent,
            text: "I can help you with weather intelligence for any outdoor activity! Try asking about specific weather conditions, forecasts, or activity recommendations.",
            recommendation: None,
            suggestions: &[
                "What's the weather like today?",
                "Best time for outdoor activities?",
                "Air quality in my area",
                "UV index forecast",
            ],
        },
    }
}

/// Classify `input` and build the matching assistant message.
pub fn reply_to(input: &str) -> Message {
    let intent = classify(input);
    debug!(?intent, "Selected canned reply");
    respond(intent).into_message()
}
