use std::sync::Arc;

use board_types::ImageUrlMap;

use crate::api::BoardApi;

/// Batch-resolves image identifiers into short-lived display URLs
#[derive(Clone)]
pub struct ImageResolver {
    api: Arc<dyn BoardApi>,
}

impl ImageResolver {
    pub fn new(api: Arc<dyn BoardApi>) -> Self {
        Self { api }
    }

    /// Resolve `image_ids` with one request; URLs are matched by position.
    ///
    /// Fails closed: any error, including a response of the wrong length,
    /// yields an empty map rather than a partial one.
    pub async fn resolve(&self, image_ids: &[String]) -> ImageUrlMap {
        if image_ids.is_empty() {
            return ImageUrlMap::new();
        }

        match self.api.resolve_access_urls(image_ids).await {
            Ok(urls) => match ImageUrlMap::from_positional(image_ids, urls) {
                Some(map) => {
                    log_image!("resolved {} image urls", map.len());
                    map
                }
                None => {
                    log::warn!("image url response length does not match {} requested ids", image_ids.len());
                    ImageUrlMap::new()
                }
            },
            Err(e) => {
                log::warn!("image url resolution failed: {}", e);
                ImageUrlMap::new()
            }
        }
    }
}
