use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON field holding the avatar URL
const AVATAR_URL_FIELD: &str = "avatar_url";

/// Profile of a GoBarber user.
///
/// `id`, `name` and `email` are required strings; a stored user without
/// them does not parse and is treated as no user at all. Everything else
/// the API sends, `avatar_url` included, stays in `extra` exactly as
/// received (a `null` avatar stays `null`, a missing one stays missing),
/// so a profile round-trips through storage unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            extra: Map::new(),
        }
    }

    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.set_avatar_url(Some(url.into()));
        self
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.extra.get(AVATAR_URL_FIELD).and_then(Value::as_str)
    }

    /// Set the avatar, or store an explicit `null` for `None`
    pub fn set_avatar_url(&mut self, url: Option<String>) {
        let value = url.map_or(Value::Null, Value::String);
        self.extra.insert(AVATAR_URL_FIELD.to_string(), value);
    }

    pub fn display_avatar(&self) -> &str {
        self.avatar_url().unwrap_or("(no avatar)")
    }
}

/// Response body of `POST /sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(json: &str) -> (Value, Value) {
        let user: UserProfile = serde_json::from_str(json).expect("valid profile");
        let back: Value = serde_json::from_str(&serde_json::to_string(&user).unwrap()).unwrap();
        let original: Value = serde_json::from_str(json).expect("valid json");
        (back, original)
    }

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{"user":{"id":"id-123","name":"John Doe","email":"johndoe@test.com","created_at":"2020-06-01T12:00:00.000Z"},"token":"token-123"}"#;

        let resp: AuthResponse =
            serde_json::from_str(json).expect("Failed to parse auth response test JSON");
        assert_eq!(resp.token, "token-123");
        assert_eq!(resp.user.email, "johndoe@test.com");
        assert_eq!(resp.user.avatar_url(), None);
        assert_eq!(
            resp.user.extra.get("created_at").and_then(Value::as_str),
            Some("2020-06-01T12:00:00.000Z")
        );
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let (back, original) = round_trip(
            r#"{"id":"1","name":"Jane","email":"jane@test.com","avatar_url":"image.jpg","updated_at":"2020-06-02"}"#,
        );
        assert_eq!(back, original);
    }

    #[test]
    fn test_null_avatar_survives_round_trip() {
        let json = r#"{"id":"1","name":"a","email":"e@x.com","avatar_url":null}"#;
        let (back, original) = round_trip(json);
        assert_eq!(back, original);

        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&user).unwrap(), json);
        assert_eq!(user.avatar_url(), None);
    }

    #[test]
    fn test_missing_avatar_stays_missing() {
        let json = r#"{"id":"1","name":"a","email":"e@x.com"}"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&user).unwrap(), json);
    }

    #[test]
    fn test_missing_required_field_does_not_parse() {
        assert!(serde_json::from_str::<UserProfile>(r#"{"id":"1","name":"a"}"#).is_err());
        assert!(serde_json::from_str::<UserProfile>(r#"{"id":1,"name":"a","email":"e@x.com"}"#).is_err());
    }

    #[test]
    fn test_avatar_accessors() {
        let mut user = UserProfile::new("1", "Jane", "jane@test.com");
        assert_eq!(user.display_avatar(), "(no avatar)");

        let with = user.clone().with_avatar_url("image.jpg");
        assert_eq!(with.avatar_url(), Some("image.jpg"));
        assert_eq!(with.display_avatar(), "image.jpg");

        user.set_avatar_url(None);
        assert_eq!(user.extra.get("avatar_url"), Some(&Value::Null));
        assert_eq!(user.display_avatar(), "(no avatar)");
    }
}
