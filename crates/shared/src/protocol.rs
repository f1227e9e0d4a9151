use serde::{Deserialize, Serialize};

use crate::{
    domain::Identity,
    error::{Rejection, ServerMessage},
};

/// Ordered field set sent with a request.
///
/// Keys are unique; inserting an existing key replaces its value in place so the original
/// position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn merge(mut self, other: &FormData) -> Self {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = FormData::new();
        for (key, value) in iter {
            form.insert(key, value);
        }
        form
    }
}

impl From<&Identity> for FormData {
    fn from(identity: &Identity) -> Self {
        FormData::new()
            .with("id", identity.id)
            .with("name", &identity.name)
            .with("email", &identity.email)
    }
}

/// Envelope every endpoint answers with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply<T = serde_json::Value> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServerMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
}

impl<T> Reply<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            user: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ServerMessage::Text(message.into())),
            user: None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        (!self.success).then(|| Rejection::from(self.error.as_ref()))
    }
}
