//! Network-free mock provider for development and tests.

use super::{AgentError, ImageProvider};
use crate::api::types::{ImageData, ImageGenerationRequest, ImageGenerationResponse};
use crate::api::parse_size;
use crate::registry::ProviderKind;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Fixed pool of sample image URLs.
pub const MOCK_IMAGES: [&str; 10] = [
    "https://picsum.photos/1024/1024?random=1",
    "https://picsum.photos/1024/1024?random=2",
    "https://picsum.photos/1024/1024?random=3",
    "https://picsum.photos/1024/1024?random=4",
    "https://picsum.photos/1024/1024?random=5",
    "https://picsum.photos/768/768?random=6",
    "https://picsum.photos/512/512?random=7",
    "https://picsum.photos/1792/1024?random=8",
    "https://picsum.photos/1024/1792?random=9",
    "https://picsum.photos/768/512?random=10",
];

/// Mock provider.
///
/// Sleeps for a random latency inside `latency_ms` and returns one image
/// from [`MOCK_IMAGES`], or a picsum URL of the requested size. A seeded
/// instance produces the same sequence of picks and delays.
pub struct MockProvider {
    id: String,
    name: String,
    latency_ms: (u64, u64),
    rng: Mutex<StdRng>,
}

impl MockProvider {
    pub fn new(id: String, name: String, latency_ms: (u64, u64), seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (min, max) = latency_ms;
        Self {
            id,
            name,
            latency_ms: (min.min(max), min.max(max)),
            rng: Mutex::new(rng),
        }
    }

    /// Draw (delay, pool index, salt) in one lock scope.
    fn draw(&self) -> (Duration, usize, u32) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let (min, max) = self.latency_ms;
        let delay = rng.gen_range(min..=max);
        let index = rng.gen_range(0..MOCK_IMAGES.len());
        let salt = rng.gen::<u32>();
        (Duration::from_millis(delay), index, salt)
    }
}

#[async_trait]
impl ImageProvider for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Mock
    }

    async fn generate(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, AgentError> {
        let (delay, index, salt) = self.draw();
        tokio::time::sleep(delay).await;

        let url = match request.size.as_deref().and_then(parse_size) {
            Some((width, height)) => {
                format!("https://picsum.photos/{}/{}?random={}", width, height, salt)
            }
            None => MOCK_IMAGES[index].to_string(),
        };

        Ok(ImageGenerationResponse::now(
            format!("mock-{}", chrono::Utc::now().timestamp_millis()),
            vec![ImageData::from_url(url, Some(request.prompt.clone()))],
        ))
    }
}
