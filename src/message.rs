// src/message.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Turn author. Roles other than `user` and `model` are kept verbatim and left for
/// the provider to judge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Model,
    Other(String),
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        match role.as_str() {
            "user" => Role::User,
            "model" => Role::Model,
            _ => Role::Other(role),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::User => "user".to_string(),
            Role::Model => "model".to_string(),
            Role::Other(role) => role,
        }
    }
}

/// A content part. Non-text fields (`inline_data`, `functionCall`, ...) ride along
/// in `rest` untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Part {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            rest: Map::new(),
        }
    }
}

/// One prior exchange unit. Accepts `{role, parts}` where each part is a string or
/// an object, and `{role, text}` as a shorthand. Other keys are forwarded as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTurn")]
pub struct ChatTurn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub parts: Vec<Part>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatTurn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part::from_text(text)],
            extra: Map::new(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    pub fn text(&self) -> String {
        self.parts.iter().filter_map(|p| p.text.as_deref()).collect()
    }
}

#[derive(Deserialize)]
struct RawTurn {
    #[serde(default)]
    role: Option<Role>,
    #[serde(default, deserialize_with = "null_as_default")]
    parts: Vec<RawPart>,
    #[serde(default)]
    text: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPart {
    Bare(String),
    Object(Part),
}

impl From<RawTurn> for ChatTurn {
    fn from(raw: RawTurn) -> Self {
        let mut parts: Vec<Part> = raw
            .parts
            .into_iter()
            .map(|p| match p {
                RawPart::Bare(text) => Part::from_text(text),
                RawPart::Object(part) => part,
            })
            .collect();
        if let Some(text) = raw.text {
            parts.push(Part::from_text(text));
        }
        Self {
            role: raw.role,
            parts,
            extra: raw.extra,
        }
    }
}

// `null` counts as missing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub chat: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_or_null_fields_default_to_empty() {
        for body in ["{}", r#"{"chat": null, "history": null}"#] {
            let req: ChatRequest = serde_json::from_str(body).unwrap();
            assert_eq!(req.chat, "");
            assert!(req.history.is_empty());
        }

        let req: ChatRequest = serde_json::from_str(r#"{"chat": "hi"}"#).unwrap();
        assert_eq!(req.chat, "hi");
        assert!(req.history.is_empty());
    }

    #[test]
    fn history_accepts_every_part_shape() {
        let req: ChatRequest = serde_json::from_str(
            r#"{
                "chat": "next",
                "history": [
                    {"role": "user", "parts": ["plain"]},
                    {"role": "model", "parts": [{"text": "object"}]},
                    {"role": "user", "text": "shorthand"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            req.history,
            vec![
                ChatTurn::user("plain"),
                ChatTurn::model("object"),
                ChatTurn::user("shorthand"),
            ]
        );
    }

    #[test]
    fn turn_serializes_in_wire_shape() {
        let json = serde_json::to_value(ChatTurn::model("hello")).unwrap();
        assert_eq!(json, json!({"role": "model", "parts": [{"text": "hello"}]}));
    }

    #[test]
    fn unusual_turns_pass_through() {
        let input = json!([
            {"role": "assistant", "parts": [{"text": "hi"}]},
            {"parts": [{"inline_data": {"mime_type": "image/png", "data": "AAAA"}}]},
            {"role": "model", "parts": [{"functionCall": {"name": "sales", "args": {}}}]}
        ]);
        let turns: Vec<ChatTurn> = serde_json::from_value(input.clone()).unwrap();

        assert_eq!(turns[0].role, Some(Role::Other("assistant".into())));
        assert_eq!(turns[1].role, None);
        assert_eq!(turns[1].text(), "");
        assert_eq!(serde_json::to_value(&turns).unwrap(), input);
    }
}
