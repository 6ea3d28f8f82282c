//! URLs for stored files

use crate::client::PocketBase;

impl PocketBase {
    /// Public URL of a file attached to a record.
    ///
    /// `thumb` is a size like `"300x300"`. Returns an empty string when the
    /// record or file name is missing so callers can fall back to a
    /// placeholder.
    pub fn file_url(&self, collection: &str, record_id: &str, filename: &str, thumb: Option<&str>) -> String {
        if collection.is_empty() || record_id.is_empty() || filename.is_empty() {
            return String::new();
        }

        let mut url = self.build_url(&format!("/api/files/{}/{}/{}", collection, record_id, filename));
        if let Some(thumb) = thumb.filter(|t| !t.is_empty()) {
            url.push_str("?thumb=");
            url.push_str(thumb);
        }
        url
    }
}
