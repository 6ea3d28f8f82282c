//! Clothing item operations scoped to the signed-in owner

use std::path::Path;

use cc_common::models::{ClothingItem, ItemUpdate, NewClothingItem, CLOTHING_ITEMS_COLLECTION};
use cc_common::validation::{item_form_fields, validate_image};
use cc_common::wardrobe::DashboardStats;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info};

use crate::client::PocketBase;
use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::records::{ListOptions, ListResult, RecordService};

const DEFAULT_SORT: &str = "-created";

/// Photo to attach to a new item
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read a photo from disk, guessing the MIME type from the extension
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = mime_for_extension(path).to_string();

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// Type and size check
    pub fn validate(&self) -> Result<(), cc_common::validation::ValidationError> {
        validate_image(&self.mime_type, self.bytes.len())
    }
}

pub(crate) fn mime_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Clothing item collection, always filtered to the current user
pub struct ClothingItems<'a> {
    client: &'a PocketBase,
}

impl PocketBase {
    pub fn clothing_items(&self) -> ClothingItems<'_> {
        ClothingItems { client: self }
    }
}

impl<'a> ClothingItems<'a> {
    pub(crate) fn client(&self) -> &'a PocketBase {
        self.client
    }

    fn records(&self) -> RecordService<'a> {
        self.client.collection(CLOTHING_ITEMS_COLLECTION)
    }

    fn owner_filter(&self) -> StoreResult<Filter> {
        Ok(Filter::eq("user", &self.client.require_user_id()?))
    }

    /// Create an item for the signed-in user.
    ///
    /// The form and photo are checked first; when either is rejected no
    /// request is made.
    pub async fn create(&self, form: &NewClothingItem, image: Option<&ImageUpload>) -> StoreResult<ClothingItem> {
        cc_common::validation::validate_new_item(form)?;
        if let Some(image) = image {
            image.validate()?;
        }
        let user = self.client.require_user_id()?;
        let fields = item_form_fields(form, &user)?;

        let mut multipart = Form::new();
        for (key, value) in fields {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            multipart = multipart.text(key, text);
        }

        if let Some(image) = image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime_type)
                .map_err(|e| StoreError::Network(e.to_string()))?;
            multipart = multipart.part("image", part);
        }

        let item: ClothingItem = self.records().create_multipart(multipart).await?;
        info!(item_id = %item.id, name = %item.name, "Created clothing item");
        Ok(item)
    }

    /// One page of the user's items.
    ///
    /// `extra` is and-ed onto the owner filter; `sort` defaults to newest first.
    pub async fn get_user_items(
        &self,
        page: u32,
        per_page: u32,
        extra: Option<&Filter>,
        sort: Option<&str>,
    ) -> StoreResult<ListResult<ClothingItem>> {
        let options = self.list_options(extra, sort)?;
        self.records().get_list(page, per_page, &options).await
    }

    /// Every item the user owns, newest first
    pub async fn get_all_user_items(&self) -> StoreResult<Vec<ClothingItem>> {
        let options = self.list_options(None, None)?;
        self.records().get_full_list(&options).await
    }

    fn list_options(&self, extra: Option<&Filter>, sort: Option<&str>) -> StoreResult<ListOptions> {
        let mut filter = self.owner_filter()?;
        if let Some(extra) = extra {
            filter = filter.and(extra.clone());
        }
        Ok(ListOptions {
            sort: Some(sort.unwrap_or(DEFAULT_SORT).to_string()),
            filter: Some(filter),
            expand: None,
        })
    }

    pub async fn get_one(&self, id: &str) -> StoreResult<ClothingItem> {
        self.records().get_one(id, None).await
    }

    pub async fn update(&self, id: &str, changes: &ItemUpdate) -> StoreResult<ClothingItem> {
        if changes.is_empty() {
            debug!(item_id = %id, "Empty update, fetching instead");
            return self.get_one(id).await;
        }
        self.records().update(id, changes).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.records().delete(id).await?;
        info!(item_id = %id, "Deleted clothing item");
        Ok(())
    }

    /// Record a wear: count + 1 and `last_worn` set to `now`
    pub async fn increment_wear_count(&self, id: &str, now: DateTime<Utc>) -> StoreResult<ClothingItem> {
        let item = self.get_one(id).await?;
        let changes = ItemUpdate {
            wear_count: Some(item.wear_count.saturating_add(1)),
            last_worn: Some(now),
            ..ItemUpdate::default()
        };
        self.records().update(id, &changes).await
    }

    /// Dashboard summary for the user's wardrobe
    pub async fn dashboard_stats(&self, now: DateTime<Utc>) -> StoreResult<DashboardStats> {
        let items = self.get_all_user_items().await?;
        Ok(DashboardStats::from_items(&items, now))
    }

    /// Photo URL for an item, empty when it has none
    pub fn image_url(&self, item: &ClothingItem, thumb: Option<&str>) -> String {
        let collection = if item.collection_name.is_empty() {
            CLOTHING_ITEMS_COLLECTION
        } else {
            item.collection_name.as_str()
        };
        match &item.image {
            Some(file) => self.client.file_url(collection, &item.id, file, thumb),
            None => String::new(),
        }
    }
}
