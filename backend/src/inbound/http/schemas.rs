//! OpenAPI schema definitions and shared query types.
//!
//! The pagination crate stays framework-agnostic by not deriving `ToSchema`.
//! This module provides concrete page envelopes for the documentation and
//! the query parameters that feed [`pagination::PageRequest`].

use pagination::{PageRequest, PageRequestError};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Identity, Listing};
use crate::inbound::http::validation::{FieldName, invalid_value};

/// Page coordinates accepted by paginated collections.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Items per page.
    pub limit: Option<u32>,
}

impl PageQuery {
    pub(crate) fn to_request(&self) -> Result<PageRequest, Error> {
        PageRequest::from_query(self.page, self.limit).map_err(|err| {
            let field = match err {
                PageRequestError::ZeroPage => "page",
                PageRequestError::ZeroLimit | PageRequestError::LimitTooLarge { .. } => "limit",
            };
            invalid_value(FieldName::new(field), &err)
        })
    }
}

/// OpenAPI schema for a page of identities.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct IdentityPage {
    pub items: Vec<Identity>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// OpenAPI schema for a page of listings.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ListingPage {
    pub items: Vec<Listing>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(0), None, "page")]
    #[case(None, Some(0), "limit")]
    #[case(None, Some(1000), "limit")]
    fn out_of_range_coordinates_name_the_field(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] field: &str,
    ) {
        let err = PageQuery { page, limit }
            .to_request()
            .expect_err("out of range");
        assert_eq!(
            err.details().and_then(|d| d.get("field")),
            Some(&serde_json::json!(field))
        );
    }

    #[rstest]
    fn defaults_apply() {
        let request = PageQuery::default().to_request().expect("defaults");
        assert_eq!(request, PageRequest::default());
    }
}
