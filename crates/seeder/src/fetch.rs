use crate::catalog::{Catalog, CatalogBreed};
use crate::error::SeedError;
use api_client::{BreedPath, DogImageSource, breed_slug, canonical_image_url, display_name};
use configuration::DogCeoConfig;
use futures::future::join_all;
use indicatif::ProgressBar;
use std::collections::HashSet;
use tracing::{info, warn};

/// Receives progress while a catalog is fetched.
pub trait FetchProgress: Sync {
    fn start(&self, _total_breeds: u64) {}
    fn breed_done(&self, _breed: &BreedPath) {}
    fn finish(&self) {}
}

/// No progress reporting.
impl FetchProgress for () {}

impl FetchProgress for ProgressBar {
    fn start(&self, total_breeds: u64) {
        self.set_length(total_breeds);
    }

    fn breed_done(&self, breed: &BreedPath) {
        self.set_message(format!("Fetched {}", breed));
        self.inc(1);
    }

    fn finish(&self) {
        self.finish_with_message("Fetch complete!");
    }
}

/// Lists every breed and fetches their images, `batch_size` breeds at a time.
///
/// A breed whose images cannot be fetched is logged and recorded in
/// `failed_breeds`; only a failure to list the breeds aborts the fetch.
pub async fn fetch_catalog<S, P>(
    source: &S,
    settings: &DogCeoConfig,
    progress: &P,
) -> Result<Catalog, SeedError>
where
    S: DogImageSource + ?Sized,
    P: FetchProgress + ?Sized,
{
    let breeds = source.list_breeds().await?;
    info!(breeds = breeds.len(), "Fetched breed list.");
    progress.start(breeds.len() as u64);

    let mut catalog = Catalog::new(api_client::DOG_CEO_SOURCE);
    for (index, batch) in breeds.chunks(settings.batch_size.max(1)).enumerate() {
        if index > 0 && !settings.batch_delay().is_zero() {
            tokio::time::sleep(settings.batch_delay()).await;
        }

        let results = join_all(
            batch
                .iter()
                .map(|breed| async move { (breed, source.breed_images(breed).await) }),
        )
        .await;

        for (breed, result) in results {
            match result {
                Ok(urls) => catalog.breeds.push(CatalogBreed {
                    path: breed.clone(),
                    name: display_name(breed),
                    slug: breed_slug(breed),
                    images: select_images(urls, settings.images_per_breed),
                }),
                Err(e) => {
                    warn!(breed = %breed, error = %e, "Failed to fetch breed images, skipping.");
                    catalog.failed_breeds.push(breed.path());
                }
            }
            progress.breed_done(breed);
        }
    }
    progress.finish();

    info!(
        breeds = catalog.breeds.len(),
        images = catalog.image_count(),
        failed = catalog.failed_breeds.len(),
        "Catalog fetch finished."
    );
    Ok(catalog)
}

/// Canonicalizes and de-duplicates the URLs of one breed, keeping at most
/// `limit` in source order. URLs that don't parse are kept verbatim so the
/// import can count them.
fn select_images(urls: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .map(|url| canonical_image_url(&url).unwrap_or(url))
        .filter(|url| seen.insert(url.clone()))
        .take(limit)
        .collect()
}
