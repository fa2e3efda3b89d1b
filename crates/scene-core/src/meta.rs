use serde::Serialize;

/// Descriptive annotations on an entity or system. Never affects runtime
/// behavior; carried so tooling can regenerate documents without losing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Meta {
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Who wrote or owns the declaration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Ordered notes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    /// Outstanding work.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo: Option<String>,
    /// Marked for removal.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Declaration schema version; 0 when unset.
    #[serde(skip_serializing_if = "is_zero")]
    pub version: i64,
    /// Unrecognized keys, in declaration order.
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "crate::value::serialize_pairs"
    )]
    pub custom: Vec<(String, String)>,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

impl Meta {
    /// Returns true if no field carries information.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.author.is_none()
            && self.notes.is_empty()
            && self.todo.is_none()
            && !self.deprecated
            && self.version == 0
            && self.custom.is_empty()
    }

    /// Sets a custom field. An existing key is updated in place so keys stay
    /// unique and keep their first position.
    pub fn set_custom(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.custom.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.custom.push((key, value)),
        }
    }

    /// Looks up a custom field.
    pub fn custom(&self, key: &str) -> Option<&str> {
        self.custom
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(Meta::default().is_empty());
        let meta = Meta {
            deprecated: true,
            ..Default::default()
        };
        assert!(!meta.is_empty());
    }

    #[test]
    fn custom_fields_update_in_place() {
        let mut meta = Meta::default();
        meta.set_custom("owner", "art");
        meta.set_custom("ticket", "SC-12");
        meta.set_custom("owner", "design");
        assert_eq!(
            meta.custom,
            vec![
                ("owner".to_string(), "design".to_string()),
                ("ticket".to_string(), "SC-12".to_string()),
            ]
        );
        assert_eq!(meta.custom("ticket"), Some("SC-12"));
        assert_eq!(meta.custom("missing"), None);
    }
}
