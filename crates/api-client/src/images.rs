use crate::breeds::BreedPath;
use crate::error::ApiError;
use url::Url;

pub const DOG_CEO_IMAGE_HOST: &str = "images.dog.ceo";

/// A Dog CEO image URL broken into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DogCeoImage {
    pub breed: BreedPath,
    pub file_name: String,
    /// The canonical form of the URL (see [`canonical_image_url`]).
    pub url: String,
}

/// Normalizes an image URL so the same picture always has the same key:
/// https scheme, lowercase host, default port, no query or fragment.
pub fn canonical_image_url(raw: &str) -> Result<String, ApiError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ApiError::InvalidData(format!("Invalid image URL '{}': {}", raw, e)))?;

    if url.scheme() != "https" {
        url.set_scheme("https")
            .map_err(|_| ApiError::InvalidData(format!("Unsupported image URL scheme: {}", raw)))?;
    }
    // Only fails for URLs that can't have a port, which https URLs always can.
    let _ = url.set_port(None);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url.to_string())
}

/// Parses `https://images.dog.ceo/breeds/<breed[-sub]>/<file>`.
pub fn parse_image_url(raw: &str) -> Result<DogCeoImage, ApiError> {
    let canonical = canonical_image_url(raw)?;
    let url = Url::parse(&canonical)
        .map_err(|e| ApiError::InvalidData(format!("Invalid image URL '{}': {}", raw, e)))?;

    if url.host_str() != Some(DOG_CEO_IMAGE_HOST) {
        return Err(ApiError::InvalidData(format!(
            "Not a Dog CEO image URL: {}",
            raw
        )));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();
    match segments.as_slice() {
        ["breeds", dir, file] if !file.is_empty() => {
            let breed = BreedPath::from_image_dir(dir).ok_or_else(|| {
                ApiError::InvalidData(format!("Unrecognized breed directory '{}' in {}", dir, raw))
            })?;
            Ok(DogCeoImage {
                breed,
                file_name: (*file).to_string(),
                url: canonical,
            })
        }
        _ => Err(ApiError::InvalidData(format!(
            "Unexpected image URL layout: {}",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sub_breed_image() {
        let image =
            parse_image_url("https://images.dog.ceo/breeds/hound-afghan/n02088094_1003.jpg").unwrap();
        assert_eq!(image.breed, BreedPath::new("hound", Some("afghan")));
        assert_eq!(image.file_name, "n02088094_1003.jpg");
    }

    #[test]
    fn test_parse_plain_breed_image() {
        let image = parse_image_url("https://images.dog.ceo/breeds/akita/512px-Ainu_Dog.jpg").unwrap();
        assert_eq!(image.breed, BreedPath::new("akita", None));
    }

    #[test]
    fn test_canonical_url_normalizes() {
        assert_eq!(
            canonical_image_url("http://IMAGES.dog.ceo/breeds/pug/pug.jpg?cache=1#top").unwrap(),
            "https://images.dog.ceo/breeds/pug/pug.jpg"
        );
        assert_eq!(
            canonical_image_url(" https://images.dog.ceo:443/breeds/pug/pug.jpg ").unwrap(),
            "https://images.dog.ceo/breeds/pug/pug.jpg"
        );
    }

    #[test]
    fn test_same_picture_same_key() {
        let a = parse_image_url("http://images.dog.ceo/breeds/pug/1.jpg").unwrap();
        let b = parse_image_url("https://images.dog.ceo/breeds/pug/1.jpg?x=y").unwrap();
        assert_eq!(a.url, b.url);
    }

    #[test]
    fn test_rejects_foreign_hosts_and_layouts() {
        assert!(parse_image_url("https://example.com/breeds/pug/1.jpg").is_err());
        assert!(parse_image_url("https://images.dog.ceo/pug/1.jpg").is_err());
        assert!(parse_image_url("https://images.dog.ceo/breeds/pug/").is_err());
        assert!(parse_image_url("not a url").is_err());
    }
}
