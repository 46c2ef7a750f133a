//! 商品记录存储接口

use async_trait::async_trait;

use crate::app::products::{
    model::{NewProduct, Product},
    query::ProductQuery,
};

/// 记录存储错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Backend(String),
}

/// "produtos" 集合的读写能力
#[async_trait]
pub trait ProductStore: Send + Sync + 'static {
    /// 按查询描述返回一页商品，无结果时返回空列表
    async fn find(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError>;

    async fn insert(&self, product: NewProduct) -> Result<(), StoreError>;
}
