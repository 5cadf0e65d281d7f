use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A list endpoint's body in either of the shapes the API produces
#[derive(Debug, Clone, PartialEq)]
pub enum ListResponse<T> {
    /// `{"results": [...], "count": n}`; `count` may be missing
    Paged { results: Vec<T>, count: Option<u64> },
    /// A bare JSON array
    Bare(Vec<T>),
}

impl<T: DeserializeOwned> ListResponse<T> {
    /// Classify and decode a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Malformed`] when the body is neither an array nor an
    /// object with a `results` array, when `count` is present but not a
    /// non-negative integer, or when a record does not decode.
    pub fn from_json(body: Value) -> Result<Self, ApiError> {
        match body {
            Value::Array(_) => serde_json::from_value(body)
                .map(ListResponse::Bare)
                .map_err(|e| ApiError::Malformed(format!("record did not decode: {e}"))),
            Value::Object(mut map) => {
                let results = match map.remove("results") {
                    Some(results @ Value::Array(_)) => results,
                    _ => {
                        return Err(ApiError::Malformed(
                            "object without a results array".to_string(),
                        ))
                    }
                };
                let results = serde_json::from_value(results)
                    .map_err(|e| ApiError::Malformed(format!("record did not decode: {e}")))?;
                let count = match map.get("count") {
                    None | Some(Value::Null) => None,
                    Some(value) => Some(value.as_u64().ok_or_else(|| {
                        ApiError::Malformed(format!(
                            "count is not a non-negative integer: {value}"
                        ))
                    })?),
                };
                Ok(ListResponse::Paged { results, count })
            }
            other => Err(ApiError::Malformed(format!(
                "expected array or object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl<T> ListResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Paged { results, .. } | ListResponse::Bare(results) => results,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `ceil(total_count / page_size)`, zero when there is nothing to show
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    u32::try_from(total_count.div_ceil(page_size)).unwrap_or(u32::MAX)
}

/// One page of results plus the pagination metadata derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u32,
    /// Page number the request asked for
    pub page: u32,
    pub page_size: u32,
}

impl<T> ResultPage<T> {
    /// Normalize a response. Without a `count` the items are taken to be the
    /// whole result set, shown on a single page.
    pub fn from_response(response: ListResponse<T>, page: u32, page_size: u32) -> Self {
        let (items, count) = match response {
            ListResponse::Paged { results, count } => (results, count),
            ListResponse::Bare(items) => (items, None),
        };
        let (total_count, total_pages) = match count {
            Some(count) => (count, total_pages(count, page_size)),
            None => {
                let count = items.len() as u64;
                (count, u32::from(count > 0))
            }
        };
        Self {
            items,
            total_count,
            total_pages,
            page,
            page_size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counted_response_rounds_pages_up() {
        let results: Vec<u32> = (0..12).collect();
        let response: ListResponse<u32> =
            ListResponse::from_json(json!({"results": results, "count": 47})).unwrap();
        let page = ResultPage::from_response(response, 1, 12);
        assert_eq!(page.total_count, 47);
        assert_eq!(page.total_pages, 4);
        assert!(page.has_next());
    }

    #[test]
    fn zero_count_has_zero_pages() {
        let response: ListResponse<u32> =
            ListResponse::from_json(json!({"results": [], "count": 0})).unwrap();
        let page = ResultPage::from_response(response, 1, 12);
        assert_eq!(page.total_pages, 0);
        assert!(page.is_empty());
    }

    #[test]
    fn bare_array_is_a_single_page() {
        let response: ListResponse<u32> = ListResponse::from_json(json!([4, 5, 6])).unwrap();
        let page = ResultPage::from_response(response, 1, 12);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next());
    }

    #[test]
    fn results_without_count_use_length() {
        let response: ListResponse<u32> =
            ListResponse::from_json(json!({"results": [1, 2]})).unwrap();
        let page = ResultPage::from_response(response, 1, 12);
        assert_eq!(page.total_count, 2);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn other_shapes_are_malformed() {
        for body in [json!({"detail": "oops"}), json!("text"), json!(null), json!({"results": 3})] {
            let err = ListResponse::<u32>::from_json(body).unwrap_err();
            assert!(matches!(err, ApiError::Malformed(_)));
        }
    }

    #[test]
    fn unusable_count_is_malformed() {
        for count in [json!("47"), json!(-1), json!(4.5)] {
            let err = ListResponse::<u32>::from_json(json!({"results": [1], "count": count}))
                .unwrap_err();
            assert!(matches!(err, ApiError::Malformed(ref msg) if msg.contains("count")));
        }

        let response: ListResponse<u32> =
            ListResponse::from_json(json!({"results": [1], "count": null})).unwrap();
        assert_eq!(response, ListResponse::Paged { results: vec![1], count: None });
    }

    #[test]
    fn exact_multiple_does_not_add_a_page() {
        assert_eq!(total_pages(24, 12), 2);
        assert_eq!(total_pages(25, 12), 3);
        assert_eq!(total_pages(1, 12), 1);
    }
}
