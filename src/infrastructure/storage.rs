//! 对象存储基础设施

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::json;
use url::Url;

use crate::config::{StorageConfig, SupabaseConfig};

/// 对象存储错误
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("存储服务请求失败: {0}")]
    Request(#[from] reqwest::Error),
    #[error("存储服务返回 {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("存储地址无效: {0}")]
    InvalidUrl(String),
    #[error("{0}")]
    Backend(String),
}

/// 对象存储的写入、公开地址与删除能力
#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// 上传成功后总能得到公开地址
    fn public_url(&self, key: &str) -> String;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Supabase Storage REST 客户端
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: Url,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(supabase: &SupabaseConfig, storage: &StorageConfig) -> Result<Self, StorageError> {
        let base_url = Url::parse(supabase.url.trim_end_matches('/'))
            .map_err(|e| StorageError::InvalidUrl(format!("{}: {}", supabase.url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::InvalidUrl(supabase.url.clone()));
        }

        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&supabase.anon_key)
            .map_err(|e| StorageError::Backend(format!("无效的 API key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", supabase.anon_key))
            .map_err(|e| StorageError::Backend(format!("无效的 API key: {}", e)))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            bucket: storage.bucket.clone(),
        })
    }

    /// `{base}/storage/v1/object/{prefix...}/{bucket}/{key...}`，各段单独编码
    fn object_url(&self, prefix: &[&str], key: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "object"])
                .extend(prefix)
                .push(&self.bucket)
                .extend(key.split('/').filter(|s| !s.is_empty()));
        }
        url
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<(), StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .post(self.object_url(&[], key))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        ensure_success(response).await
    }

    fn public_url(&self, key: &str) -> String {
        self.object_url(&["public"], key).to_string()
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "object"])
                .push(&self.bucket);
        }

        let response = self
            .client
            .delete(url)
            .json(&json!({ "prefixes": [key] }))
            .send()
            .await?;
        ensure_success(response).await
    }
}
