//! Turning LLM output into a bounded score, and a score into a stake plan.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::OperationType;

pub const MIN_SCORE: i32 = -100;
pub const MAX_SCORE: i32 = 100;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-+]?\d+").expect("valid regex"));

pub fn clamp_score(score: i64) -> i32 {
    score.clamp(MIN_SCORE as i64, MAX_SCORE as i64) as i32
}

/// Pull a score out of a scoring service response.
///
/// Tried in order: a structured `outputs.sentiment_score` field, a JSON
/// object embedded in the text output, then the first integer in the text.
/// Anything unreadable scores 0.
pub fn extract_score(response: &Value) -> i32 {
    if let Some(score) = response
        .pointer("/outputs/sentiment_score")
        .and_then(number_like)
    {
        return clamp_score(score);
    }

    let Some(text) = text_output(response) else {
        return 0;
    };

    if let Some(score) = embedded_json_score(text) {
        return clamp_score(score);
    }

    NUMBER
        .find(text)
        .map(|m| parse_saturating(m.as_str()))
        .map(clamp_score)
        .unwrap_or(0)
}

/// A digit run too long for i64 still has a sign, so it saturates
fn parse_saturating(digits: &str) -> i64 {
    digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn text_output(response: &Value) -> Option<&str> {
    ["/outputs/text", "/choices/0/message/content", "/text", "/output"]
        .iter()
        .find_map(|path| response.pointer(path).and_then(Value::as_str))
}

fn embedded_json_score(text: &str) -> Option<i64> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    let object: Value = serde_json::from_str(&text[start..=end]).ok()?;
    object
        .get("sentiment_score")
        .or_else(|| object.get("score"))
        .and_then(number_like)
}

fn number_like(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}

/// What to do on chain for a given score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StakePlan {
    pub operation: OperationType,
    pub amount: f64,
}

impl StakePlan {
    /// `None` for a neutral score. The amount is `per_point × |score|` TAO.
    pub fn from_score(score: i32, per_point: f64) -> Option<Self> {
        let score = clamp_score(score as i64);
        let operation = match score.signum() {
            1 => OperationType::Stake,
            -1 => OperationType::Unstake,
            _ => return None,
        };
        Some(Self {
            operation,
            amount: stake_amount(score, per_point),
        })
    }
}

pub fn stake_amount(score: i32, per_point: f64) -> f64 {
    per_point * f64::from(score.unsigned_abs())
}
