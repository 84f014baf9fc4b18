use core_types::slugify;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A breed as Dog CEO addresses it: `hound` or `hound/afghan`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BreedPath {
    pub breed: String,
    pub sub_breed: Option<String>,
}

impl BreedPath {
    pub fn new(breed: impl Into<String>, sub_breed: Option<&str>) -> Self {
        Self {
            breed: breed.into().to_lowercase(),
            sub_breed: sub_breed.map(str::to_lowercase),
        }
    }

    /// Parses the API form, `breed` or `breed/sub`.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::split(path, '/')
    }

    /// Parses the image-directory form, `breed` or `breed-sub`.
    pub fn from_image_dir(dir: &str) -> Option<Self> {
        Self::split(dir, '-')
    }

    fn split(raw: &str, separator: char) -> Option<Self> {
        let raw = raw.trim();
        let (breed, sub) = match raw.split_once(separator) {
            Some((breed, sub)) => (breed, Some(sub)),
            None => (raw, None),
        };
        if breed.is_empty() || sub.is_some_and(str::is_empty) {
            return None;
        }
        Some(Self::new(breed, sub))
    }

    /// The form used in API URLs.
    pub fn path(&self) -> String {
        match &self.sub_breed {
            Some(sub) => format!("{}/{}", self.breed, sub),
            None => self.breed.clone(),
        }
    }

    /// The directory name used in image URLs.
    pub fn image_dir(&self) -> String {
        match &self.sub_breed {
            Some(sub) => format!("{}-{}", self.breed, sub),
            None => self.breed.clone(),
        }
    }
}

impl fmt::Display for BreedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Names Dog CEO spells in a way that title-casing can't fix.
fn irregular_name(path: &str) -> Option<&'static str> {
    let name = match path {
        "african" => "African Wild Dog",
        "airedale" => "Airedale Terrier",
        "appenzeller" => "Appenzeller Sennenhund",
        "bakharwal/indian" => "Bakharwal Dog",
        "bouvier" => "Bouvier des Flandres",
        "brabancon" => "Petit Brabancon",
        "bullterrier/staffordshire" => "Staffordshire Bull Terrier",
        "cattledog/australian" => "Australian Cattle Dog",
        "chippiparai/indian" => "Chippiparai",
        "chow" => "Chow Chow",
        "clumber" => "Clumber Spaniel",
        "corgi/cardigan" => "Cardigan Welsh Corgi",
        "cotondetulear" => "Coton de Tulear",
        "danish/swedish" => "Danish-Swedish Farmdog",
        "entlebucher" => "Entlebucher Mountain Dog",
        "eskimo" => "American Eskimo Dog",
        "gaddi/indian" => "Gaddi Kutta",
        "germanshepherd" => "German Shepherd",
        "groenendael" => "Belgian Groenendael",
        "hound/blood" => "Bloodhound",
        "hound/english" => "English Foxhound",
        "hound/walker" => "Treeing Walker Coonhound",
        "husky" => "Siberian Husky",
        "kelpie" => "Australian Kelpie",
        "labrador" => "Labrador Retriever",
        "leonberg" => "Leonberger",
        "lhasa" => "Lhasa Apso",
        "malamute" => "Alaskan Malamute",
        "malinois" => "Belgian Malinois",
        "mastiff/bull" => "Bullmastiff",
        "mexicanhairless" => "Mexican Hairless",
        "mix" => "Mixed Breed",
        "mountain/bernese" => "Bernese Mountain Dog",
        "mountain/swiss" => "Greater Swiss Mountain Dog",
        "mudhol/indian" => "Mudhol Hound",
        "ovcharka/caucasian" => "Caucasian Shepherd Dog",
        "pariah/indian" => "Indian Pariah Dog",
        "pembroke" => "Pembroke Welsh Corgi",
        "pitbull" => "American Pit Bull Terrier",
        "pointer/german" => "German Shorthaired Pointer",
        "pointer/germanlonghair" => "German Longhaired Pointer",
        "pyrenees" => "Great Pyrenees",
        "rajapalayam/indian" => "Rajapalayam",
        "redbone" => "Redbone Coonhound",
        "retriever/chesapeake" => "Chesapeake Bay Retriever",
        "retriever/curly" => "Curly-Coated Retriever",
        "retriever/flatcoated" => "Flat-Coated Retriever",
        "segugio/italian" => "Segugio Italiano",
        "sharpei" => "Shar Pei",
        "sheepdog/english" => "Old English Sheepdog",
        "shiba" => "Shiba Inu",
        "shihtzu" => "Shih Tzu",
        "spaniel/blenheim" => "Cavalier King Charles Spaniel",
        "springer/english" => "English Springer Spaniel",
        "stbernard" => "St. Bernard",
        "terrier/american" => "American Staffordshire Terrier",
        "terrier/dandie" => "Dandie Dinmont Terrier",
        "terrier/kerryblue" => "Kerry Blue Terrier",
        "terrier/russell" => "Jack Russell Terrier",
        "terrier/westhighland" => "West Highland White Terrier",
        "terrier/wheaten" => "Soft-Coated Wheaten Terrier",
        "tervuren" => "Belgian Tervuren",
        "waterdog/spanish" => "Spanish Water Dog",
        _ => return None,
    };
    Some(name)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The human-readable breed name, e.g. `retriever/golden` → "Golden Retriever".
pub fn display_name(path: &BreedPath) -> String {
    if let Some(name) = irregular_name(&path.path()) {
        return name.to_string();
    }
    match &path.sub_breed {
        Some(sub) => format!("{} {}", title_case(sub), title_case(&path.breed)),
        None => title_case(&path.breed),
    }
}

/// The slug the breed is stored under.
pub fn breed_slug(path: &BreedPath) -> String {
    slugify(&display_name(path))
}
