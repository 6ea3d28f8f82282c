//! Generic record CRUD on one collection

use reqwest::multipart::Form;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::PocketBase;
use crate::error::StoreResult;
use crate::filter::Filter;

/// Page size used when fetching every record
const FULL_LIST_BATCH: u32 = 500;

/// Optional list query parameters
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// e.g. `-created`
    pub sort: Option<String>,
    pub filter: Option<Filter>,
    /// Relations to resolve, e.g. `clothing_items`
    pub expand: Option<String>,
}

impl ListOptions {
    fn query(&self, page: u32, per_page: u32) -> Vec<(&'static str, String)> {
        let mut query = vec![("page", page.to_string()), ("perPage", per_page.to_string())];
        if let Some(sort) = &self.sort {
            query.push(("sort", sort.clone()));
        }
        if let Some(filter) = &self.filter {
            query.push(("filter", filter.to_string()));
        }
        if let Some(expand) = &self.expand {
            query.push(("expand", expand.clone()));
        }
        query
    }
}

/// One page of a list query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T> {
    pub page: u32,
    pub per_page: u32,
    pub total_items: i64,
    pub total_pages: i64,
    pub items: Vec<T>,
}

/// Record operations bound to a collection
pub struct RecordService<'a> {
    client: &'a PocketBase,
    collection: String,
}

impl<'a> RecordService<'a> {
    pub(crate) fn new(client: &'a PocketBase, collection: &str) -> Self {
        Self {
            client,
            collection: collection.to_string(),
        }
    }

    fn records_path(&self) -> String {
        format!("/api/collections/{}/records", self.collection)
    }

    fn record_path(&self, id: &str) -> String {
        format!("{}/{}", self.records_path(), id)
    }

    /// Fetch one page (pages start at 1)
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        page: u32,
        per_page: u32,
        options: &ListOptions,
    ) -> StoreResult<ListResult<T>> {
        let request = self
            .client
            .request(Method::GET, &self.records_path())
            .query(&options.query(page.max(1), per_page));
        self.client.send(request).await
    }

    /// Fetch every matching record, page by page
    pub async fn get_full_list<T: DeserializeOwned>(&self, options: &ListOptions) -> StoreResult<Vec<T>> {
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let result: ListResult<T> = self.get_list(page, FULL_LIST_BATCH, options).await?;
            let fetched = result.items.len();
            all.extend(result.items);

            if fetched < FULL_LIST_BATCH as usize || i64::from(page) >= result.total_pages {
                break;
            }
            page += 1;
        }

        debug!(collection = %self.collection, count = all.len(), "Fetched full list");
        Ok(all)
    }

    pub async fn get_one<T: DeserializeOwned>(&self, id: &str, expand: Option<&str>) -> StoreResult<T> {
        let mut request = self.client.request(Method::GET, &self.record_path(id));
        if let Some(expand) = expand {
            request = request.query(&[("expand", expand)]);
        }
        self.client.send(request).await
    }

    /// Create from a JSON body
    pub async fn create<B: Serialize + ?Sized, T: DeserializeOwned>(&self, body: &B) -> StoreResult<T> {
        let request = self
            .client
            .request(Method::POST, &self.records_path())
            .json(body);
        self.client.send(request).await
    }

    /// Create from a multipart form (used when a file is attached)
    pub async fn create_multipart<T: DeserializeOwned>(&self, form: Form) -> StoreResult<T> {
        let request = self
            .client
            .request(Method::POST, &self.records_path())
            .multipart(form);
        self.client.send(request).await
    }

    /// Partial update
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(&self, id: &str, body: &B) -> StoreResult<T> {
        let request = self
            .client
            .request(Method::PATCH, &self.record_path(id))
            .json(body);
        self.client.send(request).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let request = self.client.request(Method::DELETE, &self.record_path(id));
        self.client.send_empty(request).await
    }
}
