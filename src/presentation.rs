//! Maps raw classifier labels to what the user sees: label text, emoji,
//! color and an advisory message.
//!
//! Three policies exist:
//! - `sentiment`: positive / negative, anything else neutral
//! - `category-text`: ordered rule cascade over free-form category labels
//! - `category-index`: fixed table over class indices 0..=5
//!
//! Text policies run an ordered list of rules; the first matching rule wins,
//! so the order of the tables below is the tie-break.

use crate::inference::{LabelKind, PredictedLabel};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryTone {
    Success,
    Info,
    Warning,
    Error,
}

/// One output bucket of a policy.
#[derive(Debug, PartialEq, Eq)]
pub struct Bucket {
    pub id: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
    pub tone: AdvisoryTone,
    pub advisory: &'static str,
}

// ============================================================================
// Sentiment buckets
// ============================================================================

pub static POSITIVE: Bucket = Bucket {
    id: "positive",
    label: "Positive 😊",
    emoji: "😊",
    color: "#2ECC71",
    tone: AdvisoryTone::Success,
    advisory: "👍 Keep up the positive vibes!",
};

pub static NEGATIVE: Bucket = Bucket {
    id: "negative",
    label: "Negative 😔",
    emoji: "😔",
    color: "#E74C3C",
    tone: AdvisoryTone::Info,
    advisory: "💡 Take a deep breath, maybe talk to a friend or professional. You are not alone!",
};

pub static NEUTRAL: Bucket = Bucket {
    id: "neutral",
    label: "Neutral 😐",
    emoji: "😐",
    color: "#F1C40F",
    tone: AdvisoryTone::Warning,
    advisory: "⚖️ Neutral mood detected. Stay mindful of your feelings.",
};

// ============================================================================
// Mental health category buckets
// ============================================================================

pub static NORMAL: Bucket = Bucket {
    id: "normal",
    label: "😊 Normal",
    emoji: "😊",
    color: "#55efc4",
    tone: AdvisoryTone::Success,
    advisory: "🌿 You seem to be doing okay. Keep looking after yourself.",
};

pub static DEPRESSION_ANXIETY: Bucket = Bucket {
    id: "depression_anxiety",
    label: "😔 Depression / Anxiety",
    emoji: "😔",
    color: "#74b9ff",
    tone: AdvisoryTone::Info,
    advisory: "💙 Feeling low or anxious is hard. Reaching out to someone you trust or a professional can help.",
};

pub static SUICIDAL: Bucket = Bucket {
    id: "suicidal",
    label: "🚨 Suicidal Ideation",
    emoji: "🚨",
    color: "#fab1a0",
    tone: AdvisoryTone::Error,
    advisory: "🆘 If you are thinking about ending your life, please contact a crisis line or emergency services right now. You are not alone.",
};

pub static BIPOLAR: Bucket = Bucket {
    id: "bipolar",
    label: "🎭 Bipolar Disorder",
    emoji: "🎭",
    color: "#a29bfe",
    tone: AdvisoryTone::Info,
    advisory: "🎭 Mood swings can be exhausting. A mental health professional can help you find balance.",
};

pub static STRESS: Bucket = Bucket {
    id: "stress",
    label: "😣 Stress",
    emoji: "😣",
    color: "#ffeaa7",
    tone: AdvisoryTone::Warning,
    advisory: "🧘 Stress detected. Try a short break, a walk or some slow breathing.",
};

pub static PERSONALITY_DISORDER: Bucket = Bucket {
    id: "personality_disorder",
    label: "🧩 Personality Disorder",
    emoji: "🧩",
    color: "#dfe6e9",
    tone: AdvisoryTone::Info,
    advisory: "🧩 Patterns like these are worth discussing with a mental health professional.",
};

/// Class index -> bucket for `category-index`.
static CATEGORY_TABLE: [&Bucket; 6] = [
    &NORMAL,
    &DEPRESSION_ANXIETY,
    &SUICIDAL,
    &BIPOLAR,
    &STRESS,
    &PERSONALITY_DISORDER,
];

// ============================================================================
// Ordered rules
// ============================================================================

/// A predicate over the lowercased label and the bucket it selects.
pub struct Rule {
    pub description: &'static str,
    pub matches: fn(&str) -> bool,
    pub bucket: &'static Bucket,
}

static SENTIMENT_RULES: &[Rule] = &[
    Rule {
        description: "equals \"positive\"",
        matches: |l| l == "positive",
        bucket: &POSITIVE,
    },
    Rule {
        description: "equals \"negative\"",
        matches: |l| l == "negative",
        bucket: &NEGATIVE,
    },
];

static CATEGORY_RULES: &[Rule] = &[
    Rule {
        description: "equals \"normal\"",
        matches: |l| l == "normal",
        bucket: &NORMAL,
    },
    Rule {
        description: "one of \"depressed\", \"anxious\", \"depression\", \"anxiety\"",
        matches: |l| matches!(l, "depressed" | "anxious" | "depression" | "anxiety"),
        bucket: &DEPRESSION_ANXIETY,
    },
    Rule {
        description: "contains \"suicidal\"",
        matches: |l| l.contains("suicidal"),
        bucket: &SUICIDAL,
    },
    Rule {
        description: "contains \"bipolar\"",
        matches: |l| l.contains("bipolar"),
        bucket: &BIPOLAR,
    },
    Rule {
        description: "contains \"stress\"",
        matches: |l| l.contains("stress"),
        bucket: &STRESS,
    },
];

fn dispatch(rules: &[Rule], label: &str, fallback: &'static Bucket) -> &'static Bucket {
    let lowered = label.to_lowercase();
    rules
        .iter()
        .find(|rule| (rule.matches)(&lowered))
        .map(|rule| rule.bucket)
        .unwrap_or(fallback)
}

// ============================================================================
// Policy
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum LabelPolicy {
    #[serde(rename = "sentiment")]
    Sentiment,
    #[serde(rename = "category-text")]
    CategoryText,
    #[serde(rename = "category-index")]
    CategoryIndex,
}

impl LabelPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            LabelPolicy::Sentiment => "sentiment",
            LabelPolicy::CategoryText => "category-text",
            LabelPolicy::CategoryIndex => "category-index",
        }
    }

    /// Label kind the classifier has to emit for this policy.
    pub fn expected_label_kind(&self) -> LabelKind {
        match self {
            LabelPolicy::Sentiment | LabelPolicy::CategoryText => LabelKind::Text,
            LabelPolicy::CategoryIndex => LabelKind::Index,
        }
    }

    pub fn fallback(&self) -> &'static Bucket {
        match self {
            LabelPolicy::Sentiment => &NEUTRAL,
            LabelPolicy::CategoryText | LabelPolicy::CategoryIndex => &PERSONALITY_DISORDER,
        }
    }

    pub fn bucket_for(&self, label: &PredictedLabel) -> &'static Bucket {
        match (self, label) {
            (LabelPolicy::Sentiment, PredictedLabel::Text(s)) => {
                dispatch(SENTIMENT_RULES, s, self.fallback())
            }
            (LabelPolicy::CategoryText, PredictedLabel::Text(s)) => {
                dispatch(CATEGORY_RULES, s, self.fallback())
            }
            (LabelPolicy::CategoryIndex, PredictedLabel::Index(i)) => usize::try_from(*i)
                .ok()
                .and_then(|i| CATEGORY_TABLE.get(i).copied())
                .unwrap_or(self.fallback()),
            // wrong label kind for this policy
            _ => self.fallback(),
        }
    }

    pub fn display(&self, label: &PredictedLabel) -> DisplayResult {
        DisplayResult::from(self.bucket_for(label))
    }

    /// Ordered, human-readable description of how labels are matched.
    pub fn describe(&self) -> Vec<RuleDescription> {
        let mut out: Vec<RuleDescription> = match self {
            LabelPolicy::Sentiment => SENTIMENT_RULES.iter().map(RuleDescription::from).collect(),
            LabelPolicy::CategoryText => CATEGORY_RULES.iter().map(RuleDescription::from).collect(),
            LabelPolicy::CategoryIndex => CATEGORY_TABLE
                .iter()
                .enumerate()
                .map(|(i, bucket)| RuleDescription {
                    condition: format!("index {}", i),
                    result: DisplayResult::from(*bucket),
                })
                .collect(),
        };
        out.push(RuleDescription {
            condition: "anything else".to_string(),
            result: DisplayResult::from(self.fallback()),
        });
        out
    }
}

impl fmt::Display for LabelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LabelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sentiment" => Ok(LabelPolicy::Sentiment),
            "category-text" | "category_text" => Ok(LabelPolicy::CategoryText),
            "category-index" | "category_index" => Ok(LabelPolicy::CategoryIndex),
            other => Err(format!(
                "unknown label policy {:?} (expected sentiment, category-text or category-index)",
                other
            )),
        }
    }
}

// ============================================================================
// Output types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Advisory {
    pub tone: AdvisoryTone,
    pub message: String,
}

/// Rendered classification result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DisplayResult {
    /// Stable bucket identifier, e.g. `suicidal`
    pub bucket: String,
    pub label: String,
    pub emoji: String,
    /// CSS color code
    pub color: String,
    pub advisory: Advisory,
}

impl From<&Bucket> for DisplayResult {
    fn from(b: &Bucket) -> Self {
        DisplayResult {
            bucket: b.id.to_string(),
            label: b.label.to_string(),
            emoji: b.emoji.to_string(),
            color: b.color.to_string(),
            advisory: Advisory {
                tone: b.tone,
                message: b.advisory.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RuleDescription {
    pub condition: String,
    pub result: DisplayResult,
}

impl From<&Rule> for RuleDescription {
    fn from(rule: &Rule) -> Self {
        RuleDescription {
            condition: rule.description.to_string(),
            result: DisplayResult::from(rule.bucket),
        }
    }
}
