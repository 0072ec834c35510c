//! ApiClient: the grocery REST contract over reqwest.
//!
//! Mutation calls use the client-level timeout sized for constrained
//! mobile networks; the health probe overrides it with the short probe
//! timeout so a hung probe cannot block the next scheduled one.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pantry_core::config::PantryConfig;
use pantry_core::errors::{ApiError, PantryResult};
use pantry_core::models::{GroceryItem, NewItemInput};
use pantry_core::traits::{GroceryApi, HealthProbe};

/// HTTP client for the grocery backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    probe_timeout: Duration,
}

/// Response of the clear-checked endpoint.
#[derive(Debug, Deserialize)]
struct ClearCheckedResponse {
    removed: usize,
}

/// Request body for adding a recipe's ingredients in one call.
#[derive(Debug, Serialize)]
struct RecipeItemsRequest<'a> {
    recipe_title: &'a str,
    items: &'a [NewItemInput],
}

impl ApiClient {
    /// Build a client from config. The base URL is stored without a
    /// trailing slash.
    pub fn new(config: &PantryConfig) -> PantryResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Network {
                reason: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            probe_timeout: config.monitor.probe_timeout(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Map a response to our error taxonomy: 404 is a stale target, any
    /// other non-success status is an HTTP error with the body attached.
    async fn check(
        response: reqwest::Response,
        resource: &str,
    ) -> PantryResult<reqwest::Response> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                resource: resource.to_string(),
            }
            .into());
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            }
            .into());
        }
        Ok(response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> PantryResult<T> {
        response.json::<T>().await.map_err(|e| {
            ApiError::Decode {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

fn transport_err(e: reqwest::Error) -> ApiError {
    ApiError::Network {
        reason: e.to_string(),
    }
}

#[async_trait]
impl GroceryApi for ApiClient {
    async fn list_items(&self) -> PantryResult<Vec<GroceryItem>> {
        let response = self
            .http
            .get(self.url("/api/v1/grocery/items"))
            .send()
            .await
            .map_err(transport_err)?;
        Self::decode(Self::check(response, "grocery list").await?).await
    }

    async fn create_item(&self, input: &NewItemInput) -> PantryResult<GroceryItem> {
        let response = self
            .http
            .post(self.url("/api/v1/grocery/items"))
            .json(input)
            .send()
            .await
            .map_err(transport_err)?;
        Self::decode(Self::check(response, "grocery list").await?).await
    }

    async fn toggle_item(&self, id: &str) -> PantryResult<GroceryItem> {
        let response = self
            .http
            .post(self.url(&format!("/api/v1/grocery/items/{id}/toggle")))
            .send()
            .await
            .map_err(transport_err)?;
        Self::decode(Self::check(response, &format!("item {id}")).await?).await
    }

    async fn delete_item(&self, id: &str) -> PantryResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/api/v1/grocery/items/{id}")))
            .send()
            .await
            .map_err(transport_err)?;
        Self::check(response, &format!("item {id}")).await?;
        Ok(())
    }

    async fn clear_checked(&self) -> PantryResult<usize> {
        let response = self
            .http
            .post(self.url("/api/v1/grocery/items/clear-checked"))
            .send()
            .await
            .map_err(transport_err)?;
        let body: ClearCheckedResponse =
            Self::decode(Self::check(response, "grocery list").await?).await?;
        Ok(body.removed)
    }

    async fn clear_all(&self) -> PantryResult<()> {
        let response = self
            .http
            .delete(self.url("/api/v1/grocery/items"))
            .send()
            .await
            .map_err(transport_err)?;
        Self::check(response, "grocery list").await?;
        Ok(())
    }

    async fn add_from_recipe(
        &self,
        recipe_id: &str,
        recipe_title: &str,
        items: &[NewItemInput],
    ) -> PantryResult<Vec<GroceryItem>> {
        let body = RecipeItemsRequest {
            recipe_title,
            items,
        };
        let response = self
            .http
            .post(self.url(&format!("/api/v1/grocery/recipes/{recipe_id}/items")))
            .json(&body)
            .send()
            .await
            .map_err(transport_err)?;
        Self::decode(Self::check(response, &format!("recipe {recipe_id}")).await?).await
    }
}

#[async_trait]
impl HealthProbe for ApiClient {
    async fn health(&self) -> PantryResult<()> {
        let response = self
            .http
            .get(self.url("/api/v1/health"))
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(transport_err)?;
        Self::check(response, "health").await?;
        Ok(())
    }
}
