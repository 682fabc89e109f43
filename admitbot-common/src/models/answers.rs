// File: admitbot-common/src/models/answers.rs

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// One stored answer slot of the interview survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "fio")]
    Fio,
    #[serde(rename = "interviewer")]
    Interviewer,
    #[serde(rename = "canonical_obstacles")]
    CanonicalObstacles,
    #[serde(rename = "spiritual_guide")]
    SpiritualGuide,
    #[serde(rename = "impressions_1")]
    Impressions1,
    #[serde(rename = "impressions_2")]
    Impressions2,
    #[serde(rename = "impressions_3")]
    Impressions3,
    #[serde(rename = "impressions_4")]
    Impressions4,
    #[serde(rename = "impressions_5")]
    Impressions5,
    #[serde(rename = "impressions_6")]
    Impressions6,
    #[serde(rename = "problems")]
    Problems,
    #[serde(rename = "comments")]
    Comments,
    #[serde(rename = "verdict")]
    Verdict,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Fio,
        Field::Interviewer,
        Field::CanonicalObstacles,
        Field::SpiritualGuide,
        Field::Impressions1,
        Field::Impressions2,
        Field::Impressions3,
        Field::Impressions4,
        Field::Impressions5,
        Field::Impressions6,
        Field::Problems,
        Field::Comments,
        Field::Verdict,
    ];

    /// The six impression slots, in question order.
    pub const IMPRESSIONS: [Field; 6] = [
        Field::Impressions1,
        Field::Impressions2,
        Field::Impressions3,
        Field::Impressions4,
        Field::Impressions5,
        Field::Impressions6,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Field::Fio => "fio",
            Field::Interviewer => "interviewer",
            Field::CanonicalObstacles => "canonical_obstacles",
            Field::SpiritualGuide => "spiritual_guide",
            Field::Impressions1 => "impressions_1",
            Field::Impressions2 => "impressions_2",
            Field::Impressions3 => "impressions_3",
            Field::Impressions4 => "impressions_4",
            Field::Impressions5 => "impressions_5",
            Field::Impressions6 => "impressions_6",
            Field::Problems => "problems",
            Field::Comments => "comments",
            Field::Verdict => "verdict",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.key() == s)
            .ok_or_else(|| format!("Unknown answer field: {}", s))
    }
}

/// Per-session answer bag. Keys are unique; insertion order is not kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers {
    values: HashMap<Field, String>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `field`, replacing any previous answer.
    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(|s| s.as_str())
    }

    /// Missing answers read as the empty string.
    pub fn get_or_empty(&self, field: Field) -> String {
        self.get(field).unwrap_or_default().to_string()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
