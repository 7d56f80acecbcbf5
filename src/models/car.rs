//! Car listing model.

use serde::{Deserialize, Serialize};

/// Car record stored in the cars set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: String,
    pub model: String,
    pub price: f64,
    /// Current owner; reassigned on purchase.
    pub owner_id: String,
}
