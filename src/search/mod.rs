pub mod filter;
pub mod page;
pub mod remote_list;
pub mod synchronizer;
pub mod traits;

pub use filter::{FilterState, FilterUpdate, Ordering};
pub use page::{ListResponse, ResultPage};
pub use remote_list::{Dispatch, ListView, PageQuery, RemoteList};
pub use synchronizer::PropertySearch;
pub use traits::{ListQuery, ListSource, QueryParams};
