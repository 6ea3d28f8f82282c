//! Saved outfits

use cc_common::models::{NewOutfit, Outfit, OUTFITS_COLLECTION};
use tracing::info;

use crate::client::PocketBase;
use crate::error::StoreResult;
use crate::filter::Filter;
use crate::records::{ListOptions, ListResult};

pub struct Outfits<'a> {
    client: &'a PocketBase,
}

impl PocketBase {
    pub fn outfits(&self) -> Outfits<'_> {
        Outfits { client: self }
    }
}

impl<'a> Outfits<'a> {
    /// Save an outfit owned by the signed-in user
    pub async fn create(&self, outfit: &NewOutfit) -> StoreResult<Outfit> {
        let user = self.client.require_user_id()?;
        let body = NewOutfit {
            user,
            ..outfit.clone()
        };
        let created: Outfit = self.client.collection(OUTFITS_COLLECTION).create(&body).await?;
        info!(outfit_id = %created.id, items = created.clothing_items.len(), "Saved outfit");
        Ok(created)
    }

    /// One page of the user's outfits with their items resolved
    pub async fn get_user_outfits(
        &self,
        page: u32,
        per_page: u32,
        sort: Option<&str>,
    ) -> StoreResult<ListResult<Outfit>> {
        let options = ListOptions {
            sort: Some(sort.unwrap_or("-created").to_string()),
            filter: Some(Filter::eq("user", &self.client.require_user_id()?)),
            expand: Some("clothing_items".to_string()),
        };
        self.client
            .collection(OUTFITS_COLLECTION)
            .get_list(page, per_page, &options)
            .await
    }
}
