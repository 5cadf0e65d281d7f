use crate::models::{ListingType, PropertyType};
use crate::search::traits::{ListQuery, QueryParams};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Sort order offered by the listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ordering {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    MostViewed,
}

impl Ordering {
    pub const ALL: [Ordering; 5] = [
        Ordering::Newest,
        Ordering::Oldest,
        Ordering::PriceAsc,
        Ordering::PriceDesc,
        Ordering::MostViewed,
    ];

    /// Value of the endpoint's `ordering` parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            Ordering::Newest => "-created_at",
            Ordering::Oldest => "created_at",
            Ordering::PriceAsc => "price",
            Ordering::PriceDesc => "-price",
            Ordering::MostViewed => "-views_count",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Ordering::Newest => "newest",
            Ordering::Oldest => "oldest",
            Ordering::PriceAsc => "price_asc",
            Ordering::PriceDesc => "price_desc",
            Ordering::MostViewed => "most_viewed",
        }
    }
}

impl FromStr for Ordering {
    type Err = FilterParseError;

    /// Accepts both endpoint values (`-price`) and labels (`price_desc`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_param() == s || o.label() == s)
            .ok_or_else(|| FilterParseError::new("ordering", s))
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A query parameter whose value does not fit its field
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid value {value:?} for {param}")]
pub struct FilterParseError {
    pub param: String,
    pub value: String,
}

impl FilterParseError {
    fn new(param: &str, value: &str) -> Self {
        Self {
            param: param.to_string(),
            value: value.to_string(),
        }
    }
}

/// Search, sort and pagination state of the listing view.
///
/// `page` is private: every change to another dimension goes through
/// [`FilterState::apply`], which moves the view back to the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Free text matched server-side against title, location and description
    pub search: Option<String>,
    pub property_type: Option<PropertyType>,
    pub listing_type: Option<ListingType>,
    pub city: Option<String>,
    pub bedrooms_min: Option<u32>,
    pub bedrooms_max: Option<u32>,
    /// Half-bathroom steps (1.5, 2.5, ...)
    pub bathrooms_min: Option<f64>,
    pub bathrooms_max: Option<f64>,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub area_min: Option<u64>,
    pub area_max: Option<u64>,
    pub ordering: Ordering,
    page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: None,
            property_type: None,
            listing_type: None,
            city: None,
            bedrooms_min: None,
            bedrooms_max: None,
            bathrooms_min: None,
            bathrooms_max: None,
            price_min: None,
            price_max: None,
            area_min: None,
            area_max: None,
            ordering: Ordering::Newest,
            page: 1,
        }
    }
}

/// A single-field change to a [`FilterState`]
#[derive(Debug, Clone, PartialEq)]
pub enum FilterUpdate {
    Search(String),
    PropertyType(Option<PropertyType>),
    ListingType(Option<ListingType>),
    City(String),
    BedroomsMin(Option<u32>),
    BedroomsMax(Option<u32>),
    BathroomsMin(Option<f64>),
    BathroomsMax(Option<f64>),
    PriceMin(Option<u64>),
    PriceMax(Option<u64>),
    AreaMin(Option<u64>),
    AreaMax(Option<u64>),
    Ordering(Ordering),
    Page(u32),
}

impl FilterUpdate {
    pub fn is_search(&self) -> bool {
        matches!(self, FilterUpdate::Search(_))
    }

    pub fn is_page(&self) -> bool {
        matches!(self, FilterUpdate::Page(_))
    }

    /// Build an update from an endpoint parameter name and raw value.
    ///
    /// Returns `Ok(None)` for names this state does not track (`page_size`,
    /// tracking parameters, ...). An empty value clears the field.
    /// `type` and `location` are older aliases for `property_type` and `city`.
    pub fn parse(param: &str, value: &str) -> Result<Option<FilterUpdate>, FilterParseError> {
        let value = value.trim();
        let err = || FilterParseError::new(param, value);

        let update = match param {
            "search" => FilterUpdate::Search(value.to_string()),
            "city" | "location" => FilterUpdate::City(value.to_string()),
            "property_type" => FilterUpdate::PropertyType(parse_opt(value).map_err(|_| err())?),
            "listing_type" => FilterUpdate::ListingType(parse_opt(value).map_err(|_| err())?),
            "type" => {
                // The old listing page sent sale/rent under `type`
                if let Ok(listing) = value.parse::<ListingType>() {
                    FilterUpdate::ListingType(Some(listing))
                } else {
                    FilterUpdate::PropertyType(parse_opt(value).map_err(|_| err())?)
                }
            }
            "bedrooms__gte" => FilterUpdate::BedroomsMin(parse_opt(value).map_err(|_| err())?),
            "bedrooms__lte" => FilterUpdate::BedroomsMax(parse_opt(value).map_err(|_| err())?),
            "bathrooms__gte" => FilterUpdate::BathroomsMin(parse_bathrooms(value).ok_or_else(err)?),
            "bathrooms__lte" => FilterUpdate::BathroomsMax(parse_bathrooms(value).ok_or_else(err)?),
            "price__gte" => FilterUpdate::PriceMin(parse_opt(value).map_err(|_| err())?),
            "price__lte" => FilterUpdate::PriceMax(parse_opt(value).map_err(|_| err())?),
            "total_area__gte" => FilterUpdate::AreaMin(parse_opt(value).map_err(|_| err())?),
            "total_area__lte" => FilterUpdate::AreaMax(parse_opt(value).map_err(|_| err())?),
            "ordering" if value.is_empty() => FilterUpdate::Ordering(Ordering::default()),
            "ordering" => FilterUpdate::Ordering(value.parse()?),
            "page" if value.is_empty() => FilterUpdate::Page(1),
            "page" => FilterUpdate::Page(value.parse().map_err(|_| err())?),
            _ => return Ok(None),
        };
        Ok(Some(update))
    }
}

fn parse_opt<T: FromStr>(value: &str) -> Result<Option<T>, T::Err> {
    if value.is_empty() {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

fn parse_bathrooms(value: &str) -> Option<Option<f64>> {
    match parse_opt::<f64>(value) {
        Ok(Some(n)) if n.is_finite() && n >= 0.0 => Some(Some(n)),
        Ok(None) => Some(None),
        _ => None,
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

impl FilterState {
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Apply one change; anything other than a page change returns to page 1
    pub fn apply(&mut self, update: FilterUpdate) {
        if !update.is_page() {
            self.page = 1;
        }
        match update {
            FilterUpdate::Search(text) => self.search = non_empty(text),
            FilterUpdate::PropertyType(v) => self.property_type = v,
            FilterUpdate::ListingType(v) => self.listing_type = v,
            FilterUpdate::City(text) => self.city = non_empty(text),
            FilterUpdate::BedroomsMin(v) => self.bedrooms_min = v,
            FilterUpdate::BedroomsMax(v) => self.bedrooms_max = v,
            FilterUpdate::BathroomsMin(v) => self.bathrooms_min = v,
            FilterUpdate::BathroomsMax(v) => self.bathrooms_max = v,
            FilterUpdate::PriceMin(v) => self.price_min = v,
            FilterUpdate::PriceMax(v) => self.price_max = v,
            FilterUpdate::AreaMin(v) => self.area_min = v,
            FilterUpdate::AreaMax(v) => self.area_max = v,
            FilterUpdate::Ordering(o) => self.ordering = o,
            FilterUpdate::Page(n) => self.page = n.max(1),
        }
    }

    /// True when no filter dimension is set (ordering and page aside)
    pub fn is_unfiltered(&self) -> bool {
        self.filter_params().is_empty()
    }

    /// Filter dimensions that carry a value, in endpoint parameter names
    fn filter_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        let mut push = |name: &'static str, value: Option<String>| {
            if let Some(value) = value {
                params.push((name, value));
            }
        };

        push("search", self.search.clone());
        push("property_type", self.property_type.map(|t| t.as_str().to_string()));
        push("listing_type", self.listing_type.map(|t| t.as_str().to_string()));
        push("city", self.city.clone());
        push("bedrooms__gte", self.bedrooms_min.map(|n| n.to_string()));
        push("bedrooms__lte", self.bedrooms_max.map(|n| n.to_string()));
        push("bathrooms__gte", self.bathrooms_min.map(|n| n.to_string()));
        push("bathrooms__lte", self.bathrooms_max.map(|n| n.to_string()));
        push("price__gte", self.price_min.map(|n| n.to_string()));
        push("price__lte", self.price_max.map(|n| n.to_string()));
        push("total_area__gte", self.area_min.map(|n| n.to_string()));
        push("total_area__lte", self.area_max.map(|n| n.to_string()));
        params
    }

    /// Seed a state from a URL query string (with or without the leading `?`).
    ///
    /// Unknown parameters are ignored and malformed values are skipped with a
    /// warning. `page` is applied last so that it survives the other fields.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut state = Self::default();
        let mut page = None;

        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match FilterUpdate::parse(&name, &value) {
                Ok(Some(FilterUpdate::Page(n))) => page = Some(n),
                Ok(Some(update)) => state.apply(update),
                Ok(None) => {}
                Err(e) => warn!("Ignoring URL parameter: {}", e),
            }
        }
        if let Some(n) = page {
            state.apply(FilterUpdate::Page(n));
        }
        state
    }

    /// Render the state for the address bar, leaving out default values
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.filter_params() {
            serializer.append_pair(name, &value);
        }
        if self.ordering != Ordering::default() {
            serializer.append_pair("ordering", self.ordering.as_param());
        }
        if self.page > 1 {
            serializer.append_pair("page", &self.page.to_string());
        }
        serializer.finish()
    }
}

impl ListQuery for FilterState {
    fn page(&self) -> u32 {
        self.page
    }

    fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    fn to_params(&self, page_size: u32) -> QueryParams {
        let mut params = self.filter_params();
        params.push(("ordering", self.ordering.as_param().to_string()));
        params.push(("page", self.page.to_string()));
        params.push(("page_size", page_size.to_string()));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a QueryParams, name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn default_request_has_only_paging_and_ordering() {
        let params = FilterState::default().to_params(12);
        assert_eq!(
            params,
            vec![
                ("ordering", "-created_at".to_string()),
                ("page", "1".to_string()),
                ("page_size", "12".to_string()),
            ]
        );
    }

    #[test]
    fn changing_a_filter_resets_page() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::Page(3));
        assert_eq!(state.page(), 3);

        state.apply(FilterUpdate::City("Nairobi".into()));
        assert_eq!(state.page(), 1);
        assert_eq!(state.city.as_deref(), Some("Nairobi"));
    }

    #[test]
    fn page_update_keeps_filters_and_floors_at_one() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::BedroomsMin(Some(2)));
        state.apply(FilterUpdate::Page(0));
        assert_eq!(state.page(), 1);
        assert_eq!(state.bedrooms_min, Some(2));
    }

    #[test]
    fn maps_every_dimension_to_endpoint_names() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::Search("garden".into()));
        state.apply(FilterUpdate::PropertyType(Some(PropertyType::Townhouse)));
        state.apply(FilterUpdate::ListingType(Some(ListingType::Rent)));
        state.apply(FilterUpdate::BathroomsMin(Some(1.5)));
        state.apply(FilterUpdate::BathroomsMax(Some(3.0)));
        state.apply(FilterUpdate::PriceMax(Some(250_000)));
        state.apply(FilterUpdate::AreaMin(Some(90)));
        state.apply(FilterUpdate::Ordering(Ordering::MostViewed));

        let params = state.to_params(12);
        assert_eq!(param(&params, "search"), Some("garden"));
        assert_eq!(param(&params, "property_type"), Some("townhouse"));
        assert_eq!(param(&params, "listing_type"), Some("rent"));
        assert_eq!(param(&params, "bathrooms__gte"), Some("1.5"));
        assert_eq!(param(&params, "bathrooms__lte"), Some("3"));
        assert_eq!(param(&params, "price__lte"), Some("250000"));
        assert_eq!(param(&params, "total_area__gte"), Some("90"));
        assert_eq!(param(&params, "ordering"), Some("-views_count"));
        assert_eq!(param(&params, "price__gte"), None);
    }

    #[test]
    fn inverted_bounds_are_passed_through() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::BedroomsMin(Some(5)));
        state.apply(FilterUpdate::BedroomsMax(Some(2)));

        let params = state.to_params(12);
        assert_eq!(param(&params, "bedrooms__gte"), Some("5"));
        assert_eq!(param(&params, "bedrooms__lte"), Some("2"));
    }

    #[test]
    fn blank_text_counts_as_unset() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::Search("   ".into()));
        state.apply(FilterUpdate::City(String::new()));
        assert!(state.is_unfiltered());
    }

    #[test]
    fn seeds_from_url_keeping_page() {
        let state = FilterState::from_query_string(
            "?page=3&city=Mombasa&property_type=condo&price__gte=1000&ordering=-price&page_size=50",
        );
        assert_eq!(state.page(), 3);
        assert_eq!(state.city.as_deref(), Some("Mombasa"));
        assert_eq!(state.property_type, Some(PropertyType::Condo));
        assert_eq!(state.price_min, Some(1000));
        assert_eq!(state.ordering, Ordering::PriceDesc);
    }

    #[test]
    fn url_seeding_skips_bad_values_and_reads_aliases() {
        let state = FilterState::from_query_string(
            "type=rent&location=Kisumu&bedrooms__gte=many&bathrooms__lte=-1&ordering=random",
        );
        assert_eq!(state.listing_type, Some(ListingType::Rent));
        assert_eq!(state.city.as_deref(), Some("Kisumu"));
        assert_eq!(state.bedrooms_min, None);
        assert_eq!(state.bathrooms_max, None);
        assert_eq!(state.ordering, Ordering::Newest);
    }

    #[test]
    fn query_string_omits_defaults() {
        assert_eq!(FilterState::default().to_query_string(), "");

        let mut state = FilterState::default();
        state.apply(FilterUpdate::Search("sea view".into()));
        state.apply(FilterUpdate::Ordering(Ordering::PriceAsc));
        state.apply(FilterUpdate::Page(2));
        assert_eq!(
            state.to_query_string(),
            "search=sea+view&ordering=price&page=2"
        );

        let reparsed = FilterState::from_query_string(&state.to_query_string());
        assert_eq!(reparsed, state);
    }

    #[test]
    fn ordering_accepts_labels_and_params() {
        assert_eq!("price_asc".parse::<Ordering>(), Ok(Ordering::PriceAsc));
        assert_eq!("-created_at".parse::<Ordering>(), Ok(Ordering::Newest));
        assert!("cheapest".parse::<Ordering>().is_err());
    }
}
