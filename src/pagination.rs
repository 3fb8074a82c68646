use serde::{Deserialize, Serialize};

/// Page size used when the caller does not send one.
const DEFAULT_PAGE_SIZE: i32 = 25;

/// Query-string parameters for paged list endpoints.
///
/// `start_index` is authoritative for the slice offset; `page_number` is a
/// label echoed back to the caller and is not cross-checked against it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryParameters {
    #[serde(alias = "StartIndex")]
    pub start_index: i32,
    #[serde(alias = "PageSize")]
    pub page_size: i32,
    #[serde(alias = "PageNumber")]
    pub page_number: i32,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            start_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            page_number: 1,
        }
    }
}

/// One page of a larger result set plus the total row count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page_number: i32,
    /// The page size that was requested, not the number of items returned.
    pub record_number: i32,
    pub total_count: i64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, params: &QueryParameters, total_count: i64) -> Self {
        Self {
            items,
            page_number: params.page_number,
            record_number: params.page_size,
            total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_zero_twenty_five_one() {
        let params = QueryParameters::default();
        assert_eq!(params.start_index, 0);
        assert_eq!(params.page_size, 25);
        assert_eq!(params.page_number, 1);
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let params: QueryParameters =
            serde_json::from_str(r#"{"startIndex": 10, "pageSize": 5}"#).unwrap();
        assert_eq!(params.start_index, 10);
        assert_eq!(params.page_size, 5);
        assert_eq!(params.page_number, 1);
    }

    #[test]
    fn deserializes_pascal_case_aliases() {
        let params: QueryParameters =
            serde_json::from_str(r#"{"StartIndex": 3, "PageSize": 7, "PageNumber": 2}"#).unwrap();
        assert_eq!(params.start_index, 3);
        assert_eq!(params.page_size, 7);
        assert_eq!(params.page_number, 2);
    }

    #[test]
    fn paged_result_echoes_requested_page_metadata() {
        let params = QueryParameters {
            start_index: 50,
            page_size: 25,
            page_number: 3,
        };
        let result = PagedResult::new(vec![1, 2], &params, 52);
        assert_eq!(result.page_number, 3);
        assert_eq!(result.record_number, 25);
        assert_eq!(result.total_count, 52);
        assert!(result.items.len() <= result.record_number as usize);
    }

    #[test]
    fn serializes_camel_case() {
        let params = QueryParameters::default();
        let result = PagedResult::new(vec![0u8; 0], &params, 0);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("pageNumber"));
        assert!(json.contains("recordNumber"));
        assert!(json.contains("totalCount"));
    }
}
