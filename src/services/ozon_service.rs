use log::info;
use serde_json::Value;

use crate::models::requests::StatsQuery;
use crate::services::error::ApiError;
use crate::services::executor::OzonClient;
use crate::services::transport::HttpMethod;

/// Resource operations. Each maps to one endpoint and leaves retries and
/// error classification to [`OzonClient::request`].
impl OzonClient {
    pub fn get_campaigns(&self) -> Result<Vec<Value>, ApiError> {
        let response = self.request(HttpMethod::Get, "/campaigns", None)?;
        let campaigns = project_list(response, "campaigns")?;
        info!("Fetched {} campaigns", campaigns.len());
        Ok(campaigns)
    }

    pub fn create_campaign(&self, campaign: &Value) -> Result<Value, ApiError> {
        self.request(HttpMethod::Post, "/campaigns", Some(campaign))
    }

    pub fn get_campaign_stats(
        &self,
        campaign_id: u64,
        query: &StatsQuery,
    ) -> Result<Value, ApiError> {
        let endpoint = format!("/campaigns/{campaign_id}/stats");
        self.request(HttpMethod::Post, &endpoint, Some(&query.to_body()?))
    }

    pub fn get_ad_groups(&self, campaign_id: u64) -> Result<Vec<Value>, ApiError> {
        let endpoint = format!("/campaigns/{campaign_id}/ad_groups");
        let ad_groups = project_list(self.request(HttpMethod::Get, &endpoint, None)?, "ad_groups")?;
        info!("Fetched {} ad groups for campaign {}", ad_groups.len(), campaign_id);
        Ok(ad_groups)
    }

    pub fn get_ad_group_stats(
        &self,
        campaign_id: u64,
        ad_group_id: u64,
        query: &StatsQuery,
    ) -> Result<Value, ApiError> {
        let endpoint = format!("/campaigns/{campaign_id}/ad_groups/{ad_group_id}/stats");
        self.request(HttpMethod::Post, &endpoint, Some(&query.to_body()?))
    }

    pub fn get_ads(&self, campaign_id: u64, ad_group_id: u64) -> Result<Vec<Value>, ApiError> {
        let endpoint = format!("/campaigns/{campaign_id}/ad_groups/{ad_group_id}/ads");
        let ads = project_list(self.request(HttpMethod::Get, &endpoint, None)?, "ads")?;
        info!("Fetched {} ads for ad group {}", ads.len(), ad_group_id);
        Ok(ads)
    }

    pub fn get_ad_stats(
        &self,
        campaign_id: u64,
        ad_group_id: u64,
        ad_id: u64,
        query: &StatsQuery,
    ) -> Result<Value, ApiError> {
        let endpoint =
            format!("/campaigns/{campaign_id}/ad_groups/{ad_group_id}/ads/{ad_id}/stats");
        self.request(HttpMethod::Post, &endpoint, Some(&query.to_body()?))
    }
}

/// Pulls a list field out of a response. A missing field is an empty list.
fn project_list(mut response: Value, field: &str) -> Result<Vec<Value>, ApiError> {
    match response.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(ApiError::Parse {
            message: format!("Expected '{field}' to be a list"),
            status: None,
            body: other.to_string(),
        }),
    }
}
