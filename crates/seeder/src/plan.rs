use crate::catalog::Catalog;
use crate::error::SeedError;
use api_client::{BreedPath, DOG_CEO_SOURCE, breed_slug, canonical_image_url, display_name, parse_image_url};
use database::{DbRepository, NewDog};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// A breed and the new images that will be inserted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBreed {
    pub path: BreedPath,
    pub slug: String,
    pub name: String,
    pub images: Vec<String>,
}

/// What an import will write, keyed by breed slug.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedPlan {
    pub breeds: BTreeMap<String, PlannedBreed>,
    pub duplicates: u64,
    pub invalid_urls: u64,
}

impl SeedPlan {
    pub fn image_count(&self) -> usize {
        self.breeds.values().map(|b| b.images.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub breeds_upserted: u64,
    pub dogs_inserted: u64,
    pub duplicates_skipped: u64,
    pub invalid_urls: u64,
}

/// Turns a fetched catalog into the set of rows still missing from the database.
///
/// Each image is attributed to the breed named by its own URL, not the
/// catalog entry it was listed under.
pub fn reconcile(catalog: &Catalog, existing_urls: &HashSet<String>) -> SeedPlan {
    // Stored URLs may predate canonicalization.
    let mut seen: HashSet<String> = existing_urls
        .iter()
        .map(|url| canonical_image_url(url).unwrap_or_else(|_| url.clone()))
        .collect();
    let mut plan = SeedPlan::default();

    for url in catalog.breeds.iter().flat_map(|b| b.images.iter()) {
        let image = match parse_image_url(url) {
            Ok(image) => image,
            Err(e) => {
                debug!(error = %e, "Dropping unusable image URL.");
                plan.invalid_urls += 1;
                continue;
            }
        };
        if !seen.insert(image.url.clone()) {
            plan.duplicates += 1;
            continue;
        }

        let slug = breed_slug(&image.breed);
        plan.breeds
            .entry(slug.clone())
            .or_insert_with(|| PlannedBreed {
                name: display_name(&image.breed),
                path: image.breed.clone(),
                slug,
                images: Vec::new(),
            })
            .images
            .push(image.url);
    }

    info!(
        breeds = plan.breeds.len(),
        new_images = plan.image_count(),
        duplicates = plan.duplicates,
        invalid = plan.invalid_urls,
        "Reconciled catalog against the database."
    );
    plan
}

/// Writes a plan: one breed upsert and one batched dog insert per breed.
pub async fn apply(plan: &SeedPlan, repo: &DbRepository) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary {
        duplicates_skipped: plan.duplicates,
        invalid_urls: plan.invalid_urls,
        ..Default::default()
    };

    for breed in plan.breeds.values() {
        let breed_id = repo
            .upsert_breed(&breed.slug, &breed.name, Some(&breed.path.path()))
            .await?;
        summary.breeds_upserted += 1;

        let dogs: Vec<NewDog> = breed
            .images
            .iter()
            .map(|url| NewDog {
                breed_id,
                image_url: url.clone(),
            })
            .collect();
        let inserted = repo.insert_dogs(&dogs, DOG_CEO_SOURCE).await?;
        // Rows inserted concurrently by another import count as duplicates.
        summary.duplicates_skipped += dogs.len() as u64 - inserted;
        summary.dogs_inserted += inserted;

        debug!(breed = %breed.slug, inserted, "Seeded breed.");
    }

    info!(
        breeds = summary.breeds_upserted,
        dogs = summary.dogs_inserted,
        duplicates = summary.duplicates_skipped,
        invalid = summary.invalid_urls,
        "Seed complete."
    );
    Ok(summary)
}
