use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::forms::{NewInquiry, NewProfile};
use crate::models::{PropertyDetail, PropertyRecord};
use crate::search::page::ListResponse;
use crate::search::traits::{ListQuery, ListSource, QueryParams};
use crate::search::FilterState;
use crate::session::SessionContext;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

pub const PROPERTIES_PATH: &str = "properties/";
pub const INQUIRIES_PATH: &str = "inquiries/";
pub const FAVORITES_PATH: &str = "favorites/";
pub const PROFILES_PATH: &str = "user-profiles/";

/// Longest error body kept in [`ApiError::Status`]
const MAX_ERROR_BODY: usize = 200;

/// Whether a call needs a session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Send the token when logged in
    Optional,
    /// Fail with [`ApiError::Unauthorized`] when logged out
    Required,
}

/// Client for the listing REST API
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    session: SessionContext,
}

impl HttpApi {
    /// Create a client for `config.base_url` that authenticates with `session`
    pub fn new(config: &ClientConfig, session: SessionContext) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, auth: Auth) -> Result<RequestBuilder, ApiError> {
        let builder = self.client.request(method, self.endpoint(path));
        match (self.session.current_token(), auth) {
            (Some(token), _) => Ok(builder.bearer_auth(token)),
            (None, Auth::Optional) => Ok(builder),
            (None, Auth::Required) => Err(ApiError::Unauthorized),
        }
    }

    /// Send and return the body of a successful response
    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("API returned status: {}", status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        debug!("Received {} bytes ({})", body.len(), status);
        Ok(body)
    }

    async fn get_json<D: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
        auth: Auth,
    ) -> Result<D, ApiError> {
        debug!("GET {} {:?}", path, params);
        let builder = self.request(Method::GET, path, auth)?.query(params);
        let body = self.send(builder).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn post_json<B: Serialize>(&self, path: &str, payload: &B, auth: Auth) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, path, auth)?.json(payload);
        self.send(builder).await.map(|_| ())
    }

    /// Fetch one page of any list endpoint
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
        auth: Auth,
    ) -> Result<ListResponse<T>, ApiError> {
        let body: serde_json::Value = self.get_json(path, params, auth).await?;
        ListResponse::from_json(body)
    }

    /// Query the property search endpoint
    pub async fn search(&self, params: &QueryParams) -> Result<ListResponse<PropertyRecord>, ApiError> {
        self.list(PROPERTIES_PATH, params, Auth::Optional).await
    }

    pub async fn property(&self, id: u64) -> Result<PropertyDetail, ApiError> {
        self.get_json(&format!("{PROPERTIES_PATH}{id}/"), &QueryParams::new(), Auth::Optional)
            .await
    }

    /// Newest listings for the home page, at most `limit`
    pub async fn featured(&self, limit: u32) -> Result<Vec<PropertyRecord>, ApiError> {
        let params = FilterState::default().to_params(limit.max(1));
        let mut items = self.search(&params).await?.into_items();
        items.truncate(limit as usize);
        Ok(items)
    }

    /// Send an inquiry or contact message after checking it locally
    pub async fn submit_inquiry(&self, inquiry: &NewInquiry) -> Result<(), ApiError> {
        inquiry.check()?;
        self.post_json(INQUIRIES_PATH, inquiry, Auth::Optional).await?;
        info!("Inquiry submitted (property: {:?})", inquiry.property);
        Ok(())
    }

    /// Create the listing-side profile for a freshly signed-up user
    pub async fn create_profile(&self, profile: &NewProfile) -> Result<(), ApiError> {
        self.post_json(PROFILES_PATH, profile, Auth::Required).await?;
        info!("Profile created for {}", profile.full_name);
        Ok(())
    }

    pub async fn delete_property(&self, id: u64) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, &format!("{PROPERTIES_PATH}{id}/"), Auth::Required)?;
        self.send(builder).await?;
        info!("Deleted property {}", id);
        Ok(())
    }

    /// A [`ListSource`] over `path`, for use with a remote list
    pub fn list_source<T>(&self, name: &'static str, path: &'static str, auth: Auth) -> ApiList<T> {
        ApiList {
            api: self.clone(),
            name,
            path,
            auth,
            _records: PhantomData,
        }
    }
}

#[async_trait]
impl ListSource<PropertyRecord> for HttpApi {
    async fn fetch(&self, params: &QueryParams) -> Result<ListResponse<PropertyRecord>, ApiError> {
        self.search(params).await
    }

    fn source_name(&self) -> &'static str {
        "property search"
    }
}

/// One list endpoint of [`HttpApi`] viewed as a [`ListSource`]
pub struct ApiList<T> {
    api: HttpApi,
    name: &'static str,
    path: &'static str,
    auth: Auth,
    _records: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T> ListSource<T> for ApiList<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, params: &QueryParams) -> Result<ListResponse<T>, ApiError> {
        self.api.list(self.path, params, self.auth).await
    }

    fn source_name(&self) -> &'static str {
        self.name
    }
}
