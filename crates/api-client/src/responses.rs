use serde::Deserialize;

/// The envelope every successful Dog CEO response uses.
#[derive(Debug, Deserialize)]
pub struct DogCeoResponse<T> {
    pub message: T,
    pub status: String,
}

/// The body Dog CEO sends alongside 4xx/5xx statuses.
#[derive(Debug, Deserialize)]
pub struct DogCeoErrorResponse {
    pub status: String,
    pub message: String,
    pub code: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_breed_list_parses() {
        let body = r#"{"message":{"akita":[],"hound":["afghan","basset"]},"status":"success"}"#;
        let parsed: DogCeoResponse<BTreeMap<String, Vec<String>>> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, "success");
        assert_eq!(parsed.message["hound"], vec!["afghan", "basset"]);
        assert!(parsed.message["akita"].is_empty());
    }

    #[test]
    fn test_error_body_parses() {
        let body = r#"{"status":"error","message":"Breed not found (master breed does not exist)","code":404}"#;
        let parsed: DogCeoErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.code, Some(404));
        assert!(parsed.message.starts_with("Breed not found"));
    }
}
