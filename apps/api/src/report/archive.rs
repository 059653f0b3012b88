use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::config::ArchiveConfig;
use crate::errors::AppError;

/// Keeps a copy of every delivered report in S3 (or MinIO).
#[derive(Clone)]
pub struct ReportArchive {
    client: aws_sdk_s3::Client,
    bucket: String,
}

pub fn report_key(session_id: &str, record_id: &uuid::Uuid) -> String {
    format!("reports/{session_id}/{record_id}.html")
}

impl ReportArchive {
    /// Static credentials and a custom endpoint are used when provided;
    /// otherwise the default AWS provider chain applies.
    pub async fn connect(config: &ArchiveConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"));

        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key_id,
                secret,
                None,
                None,
                "readiness-static",
            ));
        }
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }

    /// Uploads the rendered report and returns its object key.
    pub async fn store(&self, key: &str, html: String) -> Result<String, AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(html.into_bytes()))
            .content_type("text/html; charset=utf-8")
            .send()
            .await
            .map_err(|e| AppError::S3(format!("report upload failed: {e}")))?;

        info!("Archived report to s3://{}/{}", self.bucket, key);
        Ok(key.to_string())
    }
}
