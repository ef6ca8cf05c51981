// src/models.rs
use serde::{Deserialize, Serialize};

/// Login/registration payload. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// The authenticated identity plus its opaque bearer credential.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserOut,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundScheme {
    pub fund_house: String,
    pub scheme_name: String,
    pub nav: f64,
}

/// Body of `POST /portfolio/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHolding {
    pub fund_name: String,
    pub units: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub fund_name: String,
    pub units: f64,
    #[serde(default)]
    pub nav: Option<f64>,
    #[serde(default)]
    pub current_value: Option<f64>,
}

/// Backend view of the user's portfolio. Only `items` is guaranteed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    #[serde(default)]
    pub items: Vec<Holding>,
    #[serde(default, rename = "totalValue")]
    pub total_value: Option<f64>,
    #[serde(default, rename = "topPerformer")]
    pub top_performer: Option<String>,
}

/// Whatever the backend returns for a mutating call.
pub type Ack = serde_json::Value;
