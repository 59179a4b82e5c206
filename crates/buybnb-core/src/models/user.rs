use serde::{Deserialize, Serialize};

/// The signed-in user's profile record.
///
/// The schema is owned by the external API, so only the fields the client
/// displays are typed; everything else is kept in `extra` and written back
/// unchanged when the record is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(rename = "firstName", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref().filter(|s| !s.is_empty())
    }

    fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref().filter(|s| !s.is_empty())
    }

    fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|s| !s.is_empty())
    }

    /// Avatar initials: both name initials, else the username's first letter, else "U".
    pub fn initials(&self) -> String {
        let initial = |s: &str| s.chars().next().map(|c| c.to_uppercase().collect::<String>());

        if let (Some(first), Some(last)) = (self.first_name(), self.last_name()) {
            if let (Some(f), Some(l)) = (initial(first), initial(last)) {
                return format!("{}{}", f, l);
            }
        }
        self.username()
            .and_then(|u| u.chars().next())
            .map(|c| c.to_string())
            .unwrap_or_else(|| "U".to_string())
    }

    /// Name shown next to the avatar: the first name, falling back to the username.
    pub fn display_name(&self) -> String {
        self.first_name()
            .or_else(|| self.username())
            .unwrap_or_default()
            .to_string()
    }

    pub fn full_name(&self) -> Option<String> {
        match (self.first_name(), self.last_name()) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.to_string()),
            (None, Some(last)) => Some(last.to_string()),
            (None, None) => None,
        }
    }
}

/// Sign-in credentials posted to `/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Successful `/login` response: the bearer token and the user it belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>, username: Option<&str>) -> UserRecord {
        UserRecord {
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            username: username.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_initials() {
        assert_eq!(user(Some("ana"), Some("silva"), Some("ana")).initials(), "AS");
        assert_eq!(user(Some("Ana"), None, Some("ana")).initials(), "a");
        assert_eq!(user(None, None, Some("bob")).initials(), "b");
        assert_eq!(user(None, None, None).initials(), "U");
        assert_eq!(user(Some(""), Some(""), Some("")).initials(), "U");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(user(Some("Ana"), Some("Silva"), Some("ana")).display_name(), "Ana");
        assert_eq!(user(None, None, Some("ana")).display_name(), "ana");
        assert_eq!(user(None, None, None).display_name(), "");
    }

    #[test]
    fn test_user_record_preserves_unknown_fields() {
        let json = r#"{"id":1,"username":"ana","firstName":"Ana","email":"ana@example.com"}"#;
        let record: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, Some(serde_json::json!(1)));
        assert_eq!(record.extra.get("email"), Some(&serde_json::json!("ana@example.com")));

        let back: serde_json::Value = serde_json::to_value(&record).unwrap();
        let original: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_login_response_parse() {
        let json = r#"{"token":"tok123","user":{"id":"u-1","username":"ana"}}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.token, "tok123");
        assert_eq!(response.user.username.as_deref(), Some("ana"));
    }

    #[test]
    fn test_credentials_serialize() {
        let creds = Credentials::new("x", "bad");
        let value = serde_json::to_value(&creds).unwrap();
        assert_eq!(value, serde_json::json!({"username": "x", "password": "bad"}));
    }
}
