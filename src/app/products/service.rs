//! 商品业务服务

use std::sync::Arc;
use tracing::{debug, error, info};

use super::{
    model::{ImageUpload, NewProduct, Product, ProductForm},
    query::FilterCriteria,
};
use crate::core::error::CatalogError;
use crate::infrastructure::{storage::ObjectStorage, store::ProductStore};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
    storage: Arc<dyn ObjectStorage>,
    image_folder: String,
}

impl ProductService {
    pub fn new(
        store: Arc<dyn ProductStore>,
        storage: Arc<dyn ObjectStorage>,
        image_folder: impl Into<String>,
    ) -> Self {
        Self {
            store,
            storage,
            image_folder: image_folder.into(),
        }
    }

    /// 按筛选条件返回一页商品
    pub async fn list_products(&self, criteria: &FilterCriteria) -> Result<Vec<Product>, CatalogError> {
        debug!(
            categoria = ?criteria.category,
            loja = ?criteria.store,
            termo = ?criteria.term,
            fuzzy = criteria.fuzzy,
            page = criteria.page,
            limit = criteria.page_size,
            "解析后的筛选条件"
        );
        if let Some(order_by) = &criteria.order_by {
            debug!(order_by = %order_by, "orderBy 参数被忽略，始终按名称升序");
        }

        let query = criteria.to_query();
        debug!(offset = query.offset, end = query.range_end(), "分页窗口");

        let products = self.store.find(&query).await.map_err(|e| {
            error!("查询商品失败: {}", e);
            CatalogError::Retrieval(e)
        })?;

        info!("查询到 {} 个商品", products.len());
        Ok(products)
    }

    /// 上传图片并写入商品记录，写入失败时尽力删除已上传的图片
    pub async fn create_product(
        &self,
        form: ProductForm,
        image: Option<ImageUpload>,
    ) -> Result<(), CatalogError> {
        let image = image.ok_or(CatalogError::MissingImage)?;

        let key = storage_key(
            &self.image_folder,
            chrono::Utc::now().timestamp_millis(),
            &image.file_name,
        );
        let content_type = image
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        self.storage
            .put(&key, image.bytes, content_type)
            .await
            .map_err(|e| {
                error!(key = %key, "图片上传失败: {}", e);
                CatalogError::Upload(e)
            })?;

        let image_url = self.storage.public_url(&key);
        let product = NewProduct::from_form(form, image_url);

        if let Err(e) = self.store.insert(product).await {
            error!(key = %key, "商品写入失败: {}", e);
            if let Err(cleanup) = self.storage.delete(&key).await {
                error!(key = %key, "删除孤立图片失败: {}", cleanup);
            }
            return Err(CatalogError::Insert(e));
        }

        info!(key = %key, "商品登记成功");
        Ok(())
    }
}

/// `{folder}/{millis}-{原始文件名}`
pub fn storage_key(folder: &str, millis: i64, file_name: &str) -> String {
    format!("{}/{}-{}", folder.trim_end_matches('/'), millis, file_name)
}
