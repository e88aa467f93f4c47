use serde::{Deserialize, Serialize};

/// Key proof sent with a credential request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "proof_type", rename_all = "snake_case")]
pub enum Proof {
    Jwt { jwt: String },
}

impl Proof {
    pub fn jwt(jwt: impl Into<String>) -> Self {
        Self::Jwt { jwt: jwt.into() }
    }
}
