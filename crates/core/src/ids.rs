use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CtxlogError, Result};

pub const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty()
            || input.len() > MAX_REQUEST_ID_LEN
            || !input.chars().all(|c| c.is_ascii_graphic())
        {
            return Err(CtxlogError::Parse(format!("invalid request id: {input:?}")));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
