use std::str::FromStr;

use uuid::Uuid;

/// Strongly typed ID for batch jobs
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct BatchId(pub Uuid);

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchId {
    pub fn new() -> Self {
        BatchId(Uuid::new_v4())
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for BatchId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BatchId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(BatchId)
    }
}
