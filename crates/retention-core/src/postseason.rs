// Postseason finish parsing.
//
// Finishes are entered by hand, so the parser accepts a final placing
// ("4", "1st"), or free text with a recognizable keyword ("Semifinal Loss",
// "Champions!"). Anything it cannot read is a missed postseason.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostseasonFinish {
    Champion,
    RunnerUp,
    Semifinal,
    Quarterfinal,
    Missed,
}

impl PostseasonFinish {
    /// Finish implied by a final placing: 1 champion, 2 runner-up, 3-4
    /// semifinal, 5-8 quarterfinal, anything else missed.
    pub fn from_place(place: u32) -> Self {
        match place {
            1 => PostseasonFinish::Champion,
            2 => PostseasonFinish::RunnerUp,
            3..=4 => PostseasonFinish::Semifinal,
            5..=8 => PostseasonFinish::Quarterfinal,
            _ => PostseasonFinish::Missed,
        }
    }

    /// Parse a hand-entered finish. Never fails; unreadable input is
    /// `Missed`.
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim().to_ascii_lowercase();
        if text.is_empty() {
            return PostseasonFinish::Missed;
        }
        if let Some(place) = parse_place(&text) {
            return PostseasonFinish::from_place(place);
        }
        // "semi"/"quarter" before "final" so "Semifinal Loss" is not read as
        // a finals appearance.
        if text.contains("semi") {
            PostseasonFinish::Semifinal
        } else if text.contains("quarter") {
            PostseasonFinish::Quarterfinal
        } else if text.contains("runner") {
            PostseasonFinish::RunnerUp
        } else if text.contains("champ") || text.contains("winner") {
            PostseasonFinish::Champion
        } else if text.contains("final") {
            PostseasonFinish::RunnerUp
        } else {
            PostseasonFinish::Missed
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostseasonFinish::Champion => "champion",
            PostseasonFinish::RunnerUp => "runner-up",
            PostseasonFinish::Semifinal => "semifinal",
            PostseasonFinish::Quarterfinal => "quarterfinal",
            PostseasonFinish::Missed => "missed playoffs",
        }
    }
}

impl fmt::Display for PostseasonFinish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read "4", "4.0", "4th", "1st" as a placing.
fn parse_place(text: &str) -> Option<u32> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| text.strip_suffix(suffix))
        .unwrap_or(text)
        .trim();
    if let Ok(place) = digits.parse::<u32>() {
        return Some(place);
    }
    let value = digits.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
