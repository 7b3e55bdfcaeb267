//! Submit Payload Decoding
//!
//! Submit and lifecycle requests arrive either as a flat JSON object of
//! parameters, or as a multipart form with two parts:
//! - `manifest`: the workflow manifest, written to a temporary file
//! - `parameters`: a YAML mapping of scalar parameters
//!
//! Both produce a parameter bag. For uploads the bag references the
//! temporary file, which is removed when the payload is dropped.

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use indexmap::IndexMap;
use wfrelay_core::domain::parameters::{MANIFEST_KEY, ParameterBag};
use wfrelay_engine::ManifestUpload;

use crate::api::AppState;
use crate::api::error::ApiError;

/// Multipart part carrying the manifest document
pub const MANIFEST_PART: &str = "manifest";

/// Multipart part carrying YAML parameters
pub const PARAMETERS_PART: &str = "parameters";

/// Decoded submit request
#[derive(Debug)]
pub struct SubmitPayload {
    pub params: ParameterBag,
    /// Uploaded manifest, kept alive until the request is finished
    pub upload: Option<ManifestUpload>,
}

impl FromRequest<AppState> for SubmitPayload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return from_multipart(multipart, state).await;
        }

        let Json(params) = Json::<ParameterBag>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        Ok(SubmitPayload {
            params,
            upload: None,
        })
    }
}

async fn from_multipart(mut multipart: Multipart, state: &AppState) -> Result<SubmitPayload, ApiError> {
    let mut manifest = None;
    let mut parameters = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        match name.as_deref() {
            Some(MANIFEST_PART) => manifest = Some(data),
            Some(PARAMETERS_PART) => parameters = Some(data),
            other => tracing::debug!("Ignoring multipart field {:?}", other),
        }
    }

    let manifest = manifest.ok_or_else(|| {
        ApiError::BadRequest(format!("multipart body has no '{}' part", MANIFEST_PART))
    })?;

    // Every parameter is validated before the manifest is written
    let yaml_params = match parameters {
        Some(raw) => parameter_bag(parse_yaml_parameters(&raw)?)?,
        None => ParameterBag::new(),
    };

    let upload = ManifestUpload::store_async(state.upload_dir.clone(), manifest.to_vec()).await?;

    let mut params = ParameterBag::new();
    params
        .insert(MANIFEST_KEY, upload.path_string())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    for (key, value) in yaml_params.iter() {
        params
            .insert(key, value)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    }

    Ok(SubmitPayload {
        params,
        upload: Some(upload),
    })
}

/// Converts YAML parameters to a bag, leaving out any manifest key
fn parameter_bag(values: IndexMap<String, serde_json::Value>) -> Result<ParameterBag, ApiError> {
    let mut bag = ParameterBag::new();
    for (key, value) in values {
        if key == MANIFEST_KEY {
            tracing::warn!("Ignoring '{}' parameter; the uploaded manifest is used", key);
            continue;
        }
        bag.insert_scalar(key, &value)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    }
    Ok(bag)
}

/// Parses a YAML mapping of parameters into JSON values
fn parse_yaml_parameters(raw: &[u8]) -> Result<IndexMap<String, serde_json::Value>, ApiError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(IndexMap::new());
    }

    let mapping: IndexMap<String, serde_yaml::Value> = serde_yaml::from_slice(raw)
        .map_err(|e| ApiError::BadRequest(format!("invalid parameters document: {}", e)))?;

    mapping
        .into_iter()
        .map(|(key, value)| {
            serde_json::to_value(&value)
                .map(|json| (key.clone(), json))
                .map_err(|e| ApiError::BadRequest(format!("invalid parameter '{}': {}", key, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_parameters_keep_order_and_scalars() {
        let params = parse_yaml_parameters(b"message: hello\ncount: 3\nverbose: true\n").unwrap();

        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["message", "count", "verbose"]);
        assert_eq!(params["count"], serde_json::json!(3));
        assert_eq!(params["verbose"], serde_json::json!(true));
    }

    #[test]
    fn test_blank_yaml_is_empty() {
        assert!(parse_yaml_parameters(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parameter_bag_rejects_nested_values() {
        let values = parse_yaml_parameters(b"message: hi\nnested:\n  a: 1\n").unwrap();
        assert!(matches!(parameter_bag(values), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_parameter_bag_skips_manifest() {
        let values = parse_yaml_parameters(b"manifest: other.yaml\ncount: 3\n").unwrap();
        let bag = parameter_bag(values).unwrap();

        assert_eq!(bag.get(MANIFEST_KEY), None);
        assert_eq!(bag.get("count"), Some("3"));
    }

    #[test]
    fn test_yaml_that_is_not_a_mapping() {
        assert!(matches!(
            parse_yaml_parameters(b"- a\n- b\n"),
            Err(ApiError::BadRequest(_))
        ));
    }
}
