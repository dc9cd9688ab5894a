// Decoding of error bodies ("problem" payloads) into one readable message.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidationIssue {
    pub msg: String,
    #[serde(default)]
    pub loc: Vec<Value>,
}

// Recognized shapes of `detail`. Anything else decodes to `None` on the problem.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProblemDetail {
    Text(String),
    Issues(Vec<Value>),
    Fields(Map<String, Value>),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Problem {
    #[serde(default, deserialize_with = "lenient")]
    pub detail: Option<ProblemDetail>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub request_id: Option<String>,
}

// A field of the wrong shape is treated as absent rather than failing the whole body.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl Problem {
    pub fn from_body(body: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<Value>(body).ok()? {
            object @ Value::Object(_) => serde_json::from_value(object).ok(),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<String> {
        if let Some(message) = self.detail.as_ref().and_then(ProblemDetail::message) {
            return Some(message);
        }
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .map(str::to_string)
    }
}

impl ProblemDetail {
    fn message(&self) -> Option<String> {
        match self {
            ProblemDetail::Text(text) if !text.trim().is_empty() => Some(text.clone()),
            ProblemDetail::Text(_) => None,
            ProblemDetail::Issues(issues) => issues
                .first()
                .cloned()
                .and_then(|first| serde_json::from_value::<ValidationIssue>(first).ok())
                .map(|issue| issue.msg),
            ProblemDetail::Fields(fields) => serde_json::to_string(fields).ok(),
        }
    }
}

pub fn fallback_message(status: u16) -> String {
    format!("API error {status}")
}

pub fn normalize_message(status: u16, body: &[u8]) -> String {
    Problem::from_body(body)
        .and_then(|problem| problem.message())
        .unwrap_or_else(|| fallback_message(status))
}
