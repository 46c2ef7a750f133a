//! 进程内存储后端，用于本地开发与测试

use async_trait::async_trait;
use axum::body::Bytes;
use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::Mutex,
};
use uuid::Uuid;

use super::{
    storage::{ObjectStorage, StorageError},
    store::{ProductStore, StoreError},
};
use crate::app::products::{
    model::{NewProduct, Product},
    query::ProductQuery,
};

/// 内存中的商品表
#[derive(Default)]
pub struct MemoryProductStore {
    rows: Mutex<Vec<Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            rows: Mutex::new(products),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 空值排在最后，与 Postgres 升序默认行为一致
fn compare_optional(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
        let rows = self
            .rows
            .lock()
            .map_err(|e| StoreError::Backend(format!("锁操作失败: {}", e)))?;

        let mut matched: Vec<Product> = rows.iter().filter(|p| query.matches(p)).cloned().collect();
        matched.sort_by(|a, b| {
            compare_optional(query.order_by.value_of(a), query.order_by.value_of(b))
        });

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }

    async fn insert(&self, product: NewProduct) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|e| StoreError::Backend(format!("锁操作失败: {}", e)))?;

        rows.push(Product {
            id: Uuid::new_v4(),
            name: product.name,
            category: product.category,
            description: product.description,
            price: product.price,
            store: product.store,
            image_url: product.image_url,
            link: product.link,
        });
        Ok(())
    }
}

/// 内存中保存的对象
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: String,
}

/// 内存中的对象存储
pub struct MemoryStorage {
    public_base: String,
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl MemoryStorage {
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            public_base: public_base.into().trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().ok()?.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|e| StorageError::Backend(format!("锁操作失败: {}", e)))?;

        if objects.contains_key(key) {
            return Err(StorageError::Backend(format!("对象已存在: {}", key)));
        }
        objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects
            .lock()
            .map_err(|e| StorageError::Backend(format!("锁操作失败: {}", e)))?
            .remove(key);
        Ok(())
    }
}
