use serde::{Deserialize, Serialize};

/// Per-user palette cached under `userTheme`. The core treats it as an
/// opaque blob; the shape mirrors what the mobile app stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTheme {
    pub name: String,
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub card_background: String,
    pub completed_background: String,
    pub is_dark: bool,
}

pub fn theme_for(user: &str) -> UserTheme {
    match user.to_lowercase().as_str() {
        "daniel" => UserTheme {
            name: "Daniel".into(),
            primary: "#0D47A1".into(),
            secondary: "#1976D2".into(),
            accent: "#00796B".into(),
            background: "#FFFFFF".into(),
            card_background: "#F5F9FF".into(),
            completed_background: "#F0F7FA".into(),
            is_dark: false,
        },
        "kivhia" => UserTheme {
            name: "Kivhia".into(),
            primary: "#6A1B9A".into(),
            secondary: "#8E24AA".into(),
            accent: "#AD1457".into(),
            background: "#FFFFFF".into(),
            card_background: "#F9F4FC".into(),
            completed_background: "#F3E5F5".into(),
            is_dark: false,
        },
        _ => UserTheme {
            name: user.to_string(),
            primary: "#2C3E50".into(),
            secondary: "#34495E".into(),
            accent: "#3498DB".into(),
            background: "#FFFFFF".into(),
            card_background: "#F5F7FA".into(),
            completed_background: "#ECEFF1".into(),
            is_dark: false,
        },
    }
}

pub fn to_value(theme: &UserTheme) -> serde_json::Value {
    serde_json::to_value(theme).unwrap_or(serde_json::Value::Null)
}
