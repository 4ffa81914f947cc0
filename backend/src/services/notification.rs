//! Outbound email notifications
//!
//! Thin client for the transactional email gateway. Alerts are best-effort:
//! callers spawn the send and only log failures, the workflow that triggered
//! the alert has already committed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Email gateway client
#[derive(Clone)]
pub struct EmailClient {
    gateway_url: String,
    api_key: String,
    from_address: String,
    alerts_address: String,
    http_client: reqwest::Client,
}

/// Email send request
#[derive(Debug, Serialize)]
struct SendEmailRequest {
    from: String,
    to: String,
    subject: String,
    text: String,
}

/// Email gateway response
#[derive(Debug, Deserialize)]
struct GatewayResponse {
    #[serde(default)]
    message: Option<String>,
}

impl EmailClient {
    /// Create from environment variables. Returns None when no gateway is
    /// configured, which disables email entirely.
    pub fn from_env() -> Option<Self> {
        let gateway_url = std::env::var("ZENVIT__EMAIL__GATEWAY_URL").ok()?;
        if gateway_url.is_empty() {
            return None;
        }
        Some(Self {
            gateway_url,
            api_key: std::env::var("ZENVIT__EMAIL__API_KEY").unwrap_or_default(),
            from_address: std::env::var("ZENVIT__EMAIL__FROM_ADDRESS")
                .unwrap_or_else(|_| "no-reply@zenvit.no".to_string()),
            alerts_address: std::env::var("ZENVIT__EMAIL__ALERTS_ADDRESS")
                .unwrap_or_else(|_| "post@zenvit.no".to_string()),
            http_client: reqwest::Client::new(),
        })
    }

    /// Send a plain-text email to the alerts inbox
    pub async fn send_alert(&self, subject: &str, body: &str) -> Result<(), String> {
        let request = SendEmailRequest {
            from: self.from_address.clone(),
            to: self.alerts_address.clone(),
            subject: subject.to_string(),
            text: body.to_string(),
        };

        let response = self
            .http_client
            .post(&self.gateway_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Failed to reach email gateway: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let error: GatewayResponse = response.json().await.unwrap_or(GatewayResponse {
                message: Some("Unknown error".to_string()),
            });
            Err(error.message.unwrap_or_else(|| "Unknown error".to_string()))
        }
    }

    /// Low stock alert for a product
    pub async fn send_low_stock_alert(
        &self,
        product_name: &str,
        quantity: i32,
        min_stock: i32,
    ) -> Result<(), String> {
        let subject = format!("Low stock: {}", product_name);
        let body = format!(
            "{} is down to {} units (minimum {}).\nA restock task has been created.",
            product_name, quantity, min_stock
        );
        self.send_alert(&subject, &body).await
    }

    /// New order summary for the team
    pub async fn send_new_order_alert(
        &self,
        order_number: &str,
        customer_name: &str,
        order_total: Decimal,
    ) -> Result<(), String> {
        let subject = format!("New order {}", order_number);
        let body = format!(
            "Order {} from {} for {} kr.",
            order_number, customer_name, order_total
        );
        self.send_alert(&subject, &body).await
    }
}
