use crate::error::ApiError;
use crate::responses::{DogCeoErrorResponse, DogCeoResponse};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use configuration::DogCeoConfig;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

pub mod breeds;
pub mod error;
pub mod images;
pub mod responses;
// --- Public API ---
pub use breeds::{BreedPath, breed_slug, display_name};
pub use images::{DogCeoImage, canonical_image_url, parse_image_url};

/// Value stored in `dogs.image_source` for images imported from Dog CEO.
pub const DOG_CEO_SOURCE: &str = "dog_ceo";

/// The abstract interface to a catalog of dog pictures.
/// The import commands only talk to this trait, so tests can swap in a fake.
#[async_trait]
pub trait DogImageSource: Send + Sync {
    /// Every breed and sub-breed the catalog knows about.
    async fn list_breeds(&self) -> Result<Vec<BreedPath>, ApiError>;

    /// All image URLs for one breed.
    async fn breed_images(&self, breed: &BreedPath) -> Result<Vec<String>, ApiError>;
}

/// A concrete implementation of `DogImageSource` for the public Dog CEO API.
#[derive(Clone)]
pub struct DogCeoClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: usize,
    initial_backoff: Duration,
}

impl DogCeoClient {
    pub fn new(config: &DogCeoConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("ratethedogs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff(),
        })
    }

    /// GETs `path` and unwraps the `message` of the Dog CEO envelope,
    /// retrying transient failures with exponential backoff.
    async fn get_message<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        (|| async { self.get_once::<T>(&url).await })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(self.initial_backoff)
                    .with_max_delay(Duration::from_secs(30))
                    .with_max_times(self.max_retries)
                    .with_jitter(),
            )
            .when(ApiError::is_retryable)
            .notify(|e, dur| {
                tracing::warn!(
                    url = %url,
                    "Dog CEO request failed, retrying after {:.2}s: {}",
                    dur.as_secs_f64(),
                    e
                )
            })
            .await
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<DogCeoErrorResponse>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: DogCeoResponse<T> = serde_json::from_str(&text)
            .map_err(|e| ApiError::Deserialization(format!("{}. Original text: {}", e, text)))?;
        if body.status != "success" {
            return Err(ApiError::Api(format!("unexpected status '{}'", body.status)));
        }
        Ok(body.message)
    }
}

#[async_trait]
impl DogImageSource for DogCeoClient {
    async fn list_breeds(&self) -> Result<Vec<BreedPath>, ApiError> {
        let breeds = self
            .get_message::<BTreeMap<String, Vec<String>>>("breeds/list/all")
            .await?;

        // A breed with sub-breeds is represented only by its sub-breeds: the
        // parent's image list is the union of theirs.
        let paths = breeds
            .into_iter()
            .flat_map(|(breed, subs)| {
                if subs.is_empty() {
                    vec![BreedPath::new(breed, None)]
                } else {
                    subs.iter()
                        .map(|sub| BreedPath::new(breed.clone(), Some(sub)))
                        .collect()
                }
            })
            .collect();
        Ok(paths)
    }

    async fn breed_images(&self, breed: &BreedPath) -> Result<Vec<String>, ApiError> {
        self.get_message::<Vec<String>>(&format!(
            "breed/{}/images",
            breed.path()
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String, max_retries: usize) -> DogCeoClient {
        DogCeoClient::new(&DogCeoConfig {
            base_url,
            max_retries,
            initial_backoff_ms: 1,
            timeout_secs: 5,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_breeds_expands_sub_breeds() {
        let app = Router::new().route(
            "/breeds/list/all",
            get(|| async {
                Json(json!({
                    "message": { "akita": [], "hound": ["afghan", "basset"] },
                    "status": "success"
                }))
            }),
        );
        let client = client_for(spawn(app).await, 0);

        let breeds = client.list_breeds().await.unwrap();
        assert_eq!(
            breeds,
            vec![
                BreedPath::new("akita", None),
                BreedPath::new("hound", Some("afghan")),
                BreedPath::new("hound", Some("basset")),
            ]
        );
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/breed/hound/afghan/images",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    if hits.fetch_add(1, Ordering::SeqCst) < 2 {
                        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})))
                    } else {
                        (
                            StatusCode::OK,
                            Json(json!({
                                "message": ["https://images.dog.ceo/breeds/hound-afghan/1.jpg"],
                                "status": "success"
                            })),
                        )
                    }
                }),
            )
            .with_state(hits.clone());
        let client = client_for(spawn(app).await, 3);

        let images = client
            .breed_images(&BreedPath::new("hound", Some("afghan")))
            .await
            .unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/breed/unicorn/images",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (
                        StatusCode::NOT_FOUND,
                        Json::<Value>(json!({
                            "status": "error",
                            "message": "Breed not found (master breed does not exist)",
                            "code": 404
                        })),
                    )
                }),
            )
            .with_state(hits.clone());
        let client = client_for(spawn(app).await, 3);

        let err = client
            .breed_images(&BreedPath::new("unicorn", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, ref message } if message.starts_with("Breed not found")));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/breeds/list/all",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    StatusCode::INTERNAL_SERVER_ERROR
                }),
            )
            .with_state(hits.clone());
        let client = client_for(spawn(app).await, 2);

        let err = client.list_breeds().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
