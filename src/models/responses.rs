use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::parse_timestamp;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub campaign_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub budget: Option<Decimal>,
    #[serde(default)]
    pub daily_budget: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Fields the API returns that are not modelled above.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Campaign {
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdGroup {
    pub id: u64,
    #[serde(default)]
    pub campaign_id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub bid: Option<Decimal>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: u64,
    #[serde(default)]
    pub ad_group_id: Option<u64>,
    #[serde(default)]
    pub product_id: Option<u64>,
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// One row of a stats response. Missing counters default to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistic {
    pub date: String,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub spent: Decimal,
    #[serde(default)]
    pub orders: u64,
    #[serde(default)]
    pub revenue: Decimal,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Statistic {
    /// Click-through rate in percent, `None` without impressions.
    pub fn ctr(&self) -> Option<Decimal> {
        if self.impressions == 0 {
            return None;
        }
        Some(Decimal::from(self.clicks) * Decimal::from(100) / Decimal::from(self.impressions))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_campaign_keeps_unknown_fields() {
        let campaign: Campaign = serde_json::from_value(json!({
            "id": 7,
            "name": "Весна",
            "type": "search",
            "status": "active",
            "budget": "15000.50",
            "daily_budget": 500,
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "",
            "placement": "catalog",
        }))
        .unwrap();

        assert_eq!(campaign.id, 7);
        assert_eq!(campaign.campaign_type, "search");
        assert_eq!(campaign.budget, Some(Decimal::from_str("15000.50").unwrap()));
        assert_eq!(campaign.daily_budget, Some(Decimal::from(500)));
        assert!(campaign.created_at().is_some());
        assert!(campaign.updated_at().is_none());
        assert_eq!(campaign.extra.get("placement"), Some(&json!("catalog")));
    }

    #[test]
    fn test_campaign_minimal_record() {
        let campaign: Campaign =
            serde_json::from_value(json!({"id": 1, "name": "Test Campaign"})).unwrap();
        assert_eq!(campaign.name, "Test Campaign");
        assert!(campaign.budget.is_none());
        assert!(campaign.extra.is_empty());
    }

    #[test]
    fn test_ad_group_and_ad() {
        let group: AdGroup = serde_json::from_value(json!({
            "id": 10, "campaign_id": 7, "name": "Shoes", "status": "active", "bid": 12.5
        }))
        .unwrap();
        assert_eq!(group.campaign_id, Some(7));
        assert_eq!(group.bid, Some(Decimal::from_str("12.5").unwrap()));

        let ad: Ad = serde_json::from_value(json!({
            "id": 100, "ad_group_id": 10, "product_id": 555, "status": "paused", "sku": "X-1"
        }))
        .unwrap();
        assert_eq!(ad.product_id, Some(555));
        assert_eq!(ad.extra.get("sku"), Some(&json!("X-1")));
    }

    #[test]
    fn test_statistic_defaults_and_ctr() {
        let stat: Statistic = serde_json::from_value(json!({
            "date": "2024-01-01", "clicks": 5, "impressions": 200
        }))
        .unwrap();
        assert_eq!(stat.orders, 0);
        assert_eq!(stat.spent, Decimal::ZERO);
        assert_eq!(stat.ctr(), Some(Decimal::from_str("2.5").unwrap()));

        let empty = Statistic::default();
        assert!(empty.ctr().is_none());
    }
}
