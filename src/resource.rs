//! JSON resource loading
//!
//! Fetches the resource holding the records to import and parses it
//! into opaque JSON values. Records are handed to the host exactly as
//! they appear in the file; no schema is enforced beyond "valid JSON
//! with a top-level array".

use serde_json::Value;

use crate::error::{ImportError, Result};

/// Fetch the resource at `location` and parse it into records.
///
/// `http://` and `https://` locations are fetched over the network;
/// anything else is treated as a local file path.
pub async fn fetch_records(location: &str) -> Result<Vec<Value>> {
    let body = if is_remote(location) {
        fetch_remote(location).await?
    } else {
        tokio::fs::read_to_string(location)
            .await
            .map_err(|source| ImportError::ResourceRead {
                path: location.to_string(),
                source,
            })?
    };

    parse_records(&body)
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

async fn fetch_remote(url: &str) -> Result<String> {
    tracing::debug!("GET {}", url);

    let client = reqwest::Client::builder()
        .user_agent(concat!("packload/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(ImportError::Fetch {
            path: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.text().await?)
}

/// Parse a JSON document into its records. The top level must be an
/// array; each element is kept verbatim.
pub fn parse_records(body: &str) -> Result<Vec<Value>> {
    let parsed: Value = serde_json::from_str(body)?;

    match parsed {
        Value::Array(records) => Ok(records),
        other => Err(ImportError::NotRecordArray(value_kind(&other))),
    }
}

/// Display name of a record for progress logging
pub fn record_name(record: &Value) -> &str {
    record
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("(unnamed)")
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn parses_record_array_in_file_order() {
        let body = r#"[{"name":"T1"},{"name":"T2"},{"name":"T3"}]"#;
        let records = parse_records(body).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["name"], "T1");
        assert_eq!(records[2]["name"], "T3");
    }

    #[test]
    fn truncated_json_is_a_parse_error() {
        let err = parse_records(r#"[{"name": "T1""#).unwrap_err();
        assert!(matches!(err, ImportError::Json(_)));
    }

    #[test]
    fn top_level_object_is_rejected() {
        let err = parse_records(r#"{"name":"T1"}"#).unwrap_err();
        assert!(matches!(err, ImportError::NotRecordArray("an object")));
    }

    #[test]
    fn empty_array_yields_no_records() {
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn record_name_falls_back_for_nameless_records() {
        assert_eq!(record_name(&json!({"name": "Goblin Hoard"})), "Goblin Hoard");
        assert_eq!(record_name(&json!({"label": "no name field"})), "(unnamed)");
        assert_eq!(record_name(&json!({"name": 42})), "(unnamed)");
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let err = fetch_records("/nonexistent/packload-test.json")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::ResourceRead { .. }));
    }

    #[tokio::test]
    async fn remote_resource_is_fetched_and_parsed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/worlds/import/data.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"[{"name":"T1"},{"name":"T2"},{"name":"T3"}]"#),
            )
            .mount(&server)
            .await;

        let url = format!("{}/worlds/import/data.json", server.uri());
        let records = fetch_records(&url).await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["name"], "T1");
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/worlds/import/data.json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such file"))
            .mount(&server)
            .await;

        let url = format!("{}/worlds/import/data.json", server.uri());
        let err = fetch_records(&url).await.unwrap_err();

        match err {
            ImportError::Fetch { path, status } => {
                assert_eq!(status, 404);
                assert_eq!(path, url);
            }
            other => panic!("expected Fetch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn truncated_remote_body_is_a_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/worlds/import/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"name": "T1""#))
            .mount(&server)
            .await;

        let url = format!("{}/worlds/import/data.json", server.uri());
        let err = fetch_records(&url).await.unwrap_err();
        assert!(matches!(err, ImportError::Json(_)));
    }
}
