// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Append-only audit log entries.
//!
//! Entries are written after every balance-mutating operation and never
//! updated or deleted.

use serde::{Deserialize, Serialize};

/// One audit log record, tagged by operation type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuditEntry {
    #[serde(rename = "admin-fund", rename_all = "camelCase")]
    AdminFund {
        /// Unix milliseconds
        ts: i64,
        admin_id: String,
        user_id: String,
        amount: f64,
    },
    #[serde(rename = "dev-faucet", rename_all = "camelCase")]
    DevFaucet { ts: i64, user_id: String, amount: f64 },
    #[serde(rename = "purchase", rename_all = "camelCase")]
    Purchase {
        ts: i64,
        car_id: String,
        buyer_id: String,
        seller_id: String,
        price: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_entry_tags() {
        let entry = AuditEntry::AdminFund {
            ts: 1700000000000,
            admin_id: "a1".to_string(),
            user_id: "u1".to_string(),
            amount: 500.0,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "admin-fund");
        assert_eq!(value["adminId"], "a1");

        let entry = AuditEntry::Purchase {
            ts: 1700000000000,
            car_id: "c1".to_string(),
            buyer_id: "b1".to_string(),
            seller_id: "s1".to_string(),
            price: 300.0,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "purchase");
        assert_eq!(value["sellerId"], "s1");
    }
}
