use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::ApiKeyAuth;
use crate::config::{ApiSettings, ConfigError};
use crate::error::{BookingError, BookingResult};
use crate::models::reservation::{ReservationRequest, ReservationResult};
use crate::models::resource::{
    AvailableResource, ResourceAvailability, ResourceInfo, SiteInfoResponse,
};
use crate::services::availability::to_availability;

/// Operations the orchestrator needs from the remote booking service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Resources (or resource groups) offered by a location
    async fn list_resources(&self, location_id: &str) -> BookingResult<Vec<ResourceInfo>>;

    /// Free ranges of every bookable unit under `resource_id` on `date`
    async fn list_availability(
        &self,
        location_id: &str,
        resource_id: &str,
        date: NaiveDate,
    ) -> BookingResult<Vec<ResourceAvailability>>;

    /// Submit a reservation; mutates remote state
    async fn create_reservation(
        &self,
        request: &ReservationRequest,
    ) -> BookingResult<ReservationResult>;
}

/// Client for the Affluences reservation API
pub struct AffluencesClient {
    client: Client,
    auth: ApiKeyAuth,
    endpoint: String,
}

impl AffluencesClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        let auth = ApiKeyAuth::new(&settings.api_key).map_err(|e| ConfigError::InvalidVar {
            name: "BOOKING_API_KEY",
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            auth,
            endpoint: settings.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }
}

/// Map a response status onto the error taxonomy, returning the body on success.
pub async fn check_response(res: Response) -> BookingResult<String> {
    let status = res.status();
    let body = res.text().await?;
    classify_status(status, body)
}

pub fn classify_status(status: StatusCode, body: String) -> BookingResult<String> {
    match status {
        s if s.is_success() => Ok(body),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(BookingError::Auth {
            status: status.as_u16(),
        }),
        StatusCode::CONFLICT => Err(BookingError::Conflict(error_message(&body))),
        _ => Err(BookingError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        }),
    }
}

// Pull a human-readable message out of an error body if there is one
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl BookingApi for AffluencesClient {
    async fn list_resources(&self, location_id: &str) -> BookingResult<Vec<ResourceInfo>> {
        let url = self.url(&format!("/sites/{}/infos", location_id));

        info!("Fetching resources for location {}", location_id);
        debug!("API URL: {}", url);

        let res = self.client.get(&url).headers(self.auth.headers()).send().await?;
        info!("Response received with status: {}", res.status());

        let body = check_response(res).await?;
        let info: SiteInfoResponse = serde_json::from_str(&body)?;
        Ok(info.types.into_iter().map(ResourceInfo::from).collect())
    }

    async fn list_availability(
        &self,
        location_id: &str,
        resource_id: &str,
        date: NaiveDate,
    ) -> BookingResult<Vec<ResourceAvailability>> {
        let url = self.url(&format!("/resources/{}/available", location_id));
        let date_param = date.format("%Y-%m-%d").to_string();

        info!(
            "Fetching availability of {} at {} for {}",
            resource_id, location_id, date_param
        );
        debug!("API URL: {}", url);

        let res = self
            .client
            .get(&url)
            .headers(self.auth.headers())
            .query(&[
                ("date", date_param.as_str()),
                ("type", resource_id),
                ("capacity", "1"),
            ])
            .send()
            .await?;
        debug!("Response received with status: {}", res.status());

        let body = check_response(res).await?;
        let resources: Vec<AvailableResource> = serde_json::from_str(&body)?;
        resources.into_iter().map(to_availability).collect()
    }

    async fn create_reservation(
        &self,
        request: &ReservationRequest,
    ) -> BookingResult<ReservationResult> {
        let url = self.url(&format!("/reserve/{}", request.resource_id));
        let payload = request.payload();

        info!(
            "Reserving {} ({}) on {} {}",
            request.resource_name, request.resource_id, request.date, request.range
        );
        debug!("API URL: {}", url);

        let res = self
            .client
            .post(&url)
            .headers(self.auth.headers())
            .json(&payload)
            .send()
            .await?;
        info!("Response received with status: {}", res.status());

        let body = check_response(res).await?;
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|json| json.get("message").and_then(Value::as_str).map(str::to_string));

        Ok(ReservationResult::reserved(&request.resource_id, message))
    }
}
