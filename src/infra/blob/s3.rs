use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Builder, Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::ByteStream,
};
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::debug;

use crate::application::blob::{BlobStore, BlobStoreError, StoredObject};
use crate::config::StorageSettings;

const CREDENTIALS_PROVIDER: &str = "retouch-static";
const JSON_CONTENT_TYPE: &str = "application/json";

/// S3-compatible object storage.
#[derive(Clone, Debug)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Build a client from static credentials. No network traffic happens here.
    pub fn new(settings: &StorageSettings) -> Self {
        let credentials = Credentials::new(
            settings.access_key.clone(),
            settings.secret_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = settings.endpoint.as_ref() {
            builder = builder
                .endpoint_url(endpoint.clone())
                .force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: settings.bucket.clone(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, value: Bytes) -> Result<(), BlobStoreError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(value));
        if key.ends_with(".json") {
            request = request.content_type(JSON_CONTENT_TYPE);
        }

        request
            .send()
            .await
            .map_err(|err| BlobStoreError::unavailable(DisplayErrorContext(&err)))?;

        debug!(target = "retouch::infra::blob::s3", key, "object stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, BlobStoreError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(SdkError::ServiceError(service)) => {
                let status = service.raw().status().as_u16();
                let error = service.err();
                if hides_existence(error.is_no_such_key(), status, error.code()) {
                    return Err(BlobStoreError::not_found(key));
                }
                return Err(BlobStoreError::unavailable(DisplayErrorContext(
                    service.into_err(),
                )));
            }
            Err(err) => return Err(BlobStoreError::unavailable(DisplayErrorContext(&err))),
        };

        let last_modified = output
            .last_modified()
            .and_then(|stamp| OffsetDateTime::from_unix_timestamp(stamp.secs()).ok());

        let bytes = output
            .body
            .collect()
            .await
            .map_err(BlobStoreError::unavailable)?
            .into_bytes();

        Ok(StoredObject {
            bytes,
            last_modified,
        })
    }
}

/// Whether a failed read should be reported as "not found".
///
/// Authorization failures count as absence: on a private bucket S3 answers
/// 403 for missing keys, and telling the two apart would leak existence.
fn hides_existence(no_such_key: bool, status: u16, code: Option<&str>) -> bool {
    no_such_key
        || matches!(status, 403 | 404)
        || matches!(code, Some("NoSuchKey" | "NotFound" | "AccessDenied"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_absence() {
        assert!(hides_existence(true, 404, Some("NoSuchKey")));
        assert!(hides_existence(false, 404, None));
    }

    #[test]
    fn access_denied_is_absence() {
        assert!(hides_existence(false, 403, Some("AccessDenied")));
        assert!(hides_existence(false, 400, Some("AccessDenied")));
    }

    #[test]
    fn server_errors_are_not_absence() {
        assert!(!hides_existence(false, 500, Some("InternalError")));
        assert!(!hides_existence(false, 503, Some("SlowDown")));
    }

    #[test]
    fn client_builds_without_network() {
        let settings = StorageSettings {
            access_key: "AKIDEXAMPLE".to_string(),
            secret_key: "secret".to_string(),
            bucket: "previews".to_string(),
            region: "us-east-1".to_string(),
            endpoint: Some("http://127.0.0.1:9000".to_string()),
        };

        let store = S3BlobStore::new(&settings);
        assert_eq!(store.bucket, "previews");
    }
}
