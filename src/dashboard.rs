//! Authenticated user dashboard with properties, favorites and inquiries tabs.

use crate::api::{Auth, HttpApi, FAVORITES_PATH, INQUIRIES_PATH, PROPERTIES_PATH};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{Favorite, Inquiry, PropertyRecord};
use crate::search::remote_list::{PageQuery, RemoteList};
use crate::search::traits::ListSource;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardTab {
    #[default]
    Properties,
    Favorites,
    Inquiries,
}

/// Counts shown above the tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub properties: u64,
    pub favorites: u64,
    pub inquiries: u64,
}

pub struct Dashboard {
    api: HttpApi,
    active: DashboardTab,
    properties: RemoteList<PropertyRecord, PageQuery>,
    favorites: RemoteList<Favorite, PageQuery>,
    inquiries: RemoteList<Inquiry, PageQuery>,
}

impl Dashboard {
    /// Open the dashboard and start loading all three tabs.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when nobody is logged in.
    pub fn open(api: HttpApi, config: &ClientConfig) -> Result<Self, ApiError> {
        let session = api.session().current().ok_or(ApiError::Unauthorized)?;
        info!("Opening dashboard for {}", session.greeting_name());

        let owned: Arc<dyn ListSource<PropertyRecord>> = Arc::new(
            api.list_source::<PropertyRecord>("owned properties", PROPERTIES_PATH, Auth::Required),
        );
        let favorites: Arc<dyn ListSource<Favorite>> = Arc::new(
            api.list_source::<Favorite>("favorites", FAVORITES_PATH, Auth::Required),
        );
        let inquiries: Arc<dyn ListSource<Inquiry>> = Arc::new(
            api.list_source::<Inquiry>("inquiries", INQUIRIES_PATH, Auth::Required),
        );

        let dashboard = Self {
            properties: RemoteList::new(
                owned,
                PageQuery::new().with_param("owner_only", "true"),
                config.page_size,
                config.debounce,
            ),
            favorites: RemoteList::new(favorites, PageQuery::new(), config.page_size, config.debounce),
            inquiries: RemoteList::new(inquiries, PageQuery::new(), config.page_size, config.debounce),
            api,
            active: DashboardTab::default(),
        };
        dashboard.refresh();
        Ok(dashboard)
    }

    pub fn refresh(&self) {
        self.properties.refresh();
        self.favorites.refresh();
        self.inquiries.refresh();
    }

    pub fn active_tab(&self) -> DashboardTab {
        self.active
    }

    pub fn select_tab(&mut self, tab: DashboardTab) {
        self.active = tab;
    }

    pub fn properties(&self) -> &RemoteList<PropertyRecord, PageQuery> {
        &self.properties
    }

    pub fn favorites(&self) -> &RemoteList<Favorite, PageQuery> {
        &self.favorites
    }

    pub fn inquiries(&self) -> &RemoteList<Inquiry, PageQuery> {
        &self.inquiries
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            properties: self.properties.total_count().unwrap_or(0),
            favorites: self.favorites.total_count().unwrap_or(0),
            inquiries: self.inquiries.total_count().unwrap_or(0),
        }
    }

    /// Delete one of the user's listings and drop it from the properties tab
    pub async fn delete_property(&self, id: u64) -> Result<(), ApiError> {
        self.api.delete_property(id).await?;
        self.properties.retain(|p| p.id != id);
        Ok(())
    }

    /// End the session; the tabs keep their last data until dropped
    pub fn logout(self) {
        self.api.session().logout();
    }
}
