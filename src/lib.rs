//! Client-side core of a real-estate listing site: the property search
//! synchronizer, a generic paginated remote list, session state and the
//! REST client those views talk to.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod models;
pub mod search;
pub mod session;

pub use api::HttpApi;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError};
pub use search::{FilterState, FilterUpdate, ListView, Ordering, PropertySearch, ResultPage};
pub use session::{Session, SessionContext};
