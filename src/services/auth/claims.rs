use serde_json::{Map, Value};

pub const GROUPS_CLAIM: &str = "cognito:groups";

/// Claims of a token that passed signature, timing, audience and issuer checks.
///
/// Only [`TokenVerifier`](super::TokenVerifier) can build one.
#[derive(Debug, Clone)]
pub struct ClaimSet {
    claims: Map<String, Value>,
}

impl ClaimSet {
    pub(super) fn from_verified(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    // access tokens carry `username`, id tokens `cognito:username`
    pub fn username(&self) -> Option<&str> {
        self.get_str("username")
            .or_else(|| self.get_str("cognito:username"))
    }

    pub fn token_use(&self) -> Option<&str> {
        self.get_str("token_use")
    }

    /// Raw group membership; `None` unless the claim is an array.
    pub fn groups(&self) -> Option<&[Value]> {
        self.get(GROUPS_CLAIM)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
pub(crate) fn claims_for_test(value: Value) -> ClaimSet {
    match value {
        Value::Object(map) => ClaimSet::from_verified(map),
        other => panic!("claims must be an object, got {other}"),
    }
}
