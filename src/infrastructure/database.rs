//! 数据库基础设施

use async_trait::async_trait;
use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    Error, Postgres, QueryBuilder,
};
use std::time::Duration;
use tracing::debug;

use super::store::{ProductStore, StoreError};
use crate::app::products::{
    model::{NewProduct, Product},
    query::{Condition, ProductQuery},
};
use crate::config::DatabaseConfig;

const SELECT_PRODUCTS: &str = "SELECT id, nome, categoria, descricao, preco::text AS preco, \
     loja, imagem_url, link FROM produtos";

pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }
}

/// 基于 Postgres 的商品存储
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 把查询描述渲染成 SQL，用户输入一律走绑定参数
pub fn build_select(query: &ProductQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(SELECT_PRODUCTS);

    for (i, condition) in query.conditions.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        push_condition(&mut qb, condition);
    }

    qb.push(" ORDER BY ")
        .push(query.order_by.column())
        .push(" ASC");
    qb.push(" LIMIT ")
        .push_bind(to_i64(query.limit))
        .push(" OFFSET ")
        .push_bind(to_i64(query.offset));
    qb
}

fn push_condition(qb: &mut QueryBuilder<'static, Postgres>, condition: &Condition) {
    match condition {
        Condition::Eq(field, value) => {
            qb.push(field.column()).push(" = ").push_bind(value.clone());
        }
        Condition::ILike(field, needle) => {
            qb.push(field.column())
                .push(" ILIKE ")
                .push_bind(format!("%{}%", needle));
        }
        Condition::AnyOf(conditions) => {
            qb.push("(");
            for (i, c) in conditions.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                push_condition(qb, c);
            }
            qb.push(")");
        }
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn find(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
        let mut qb = build_select(query);
        debug!(sql = qb.sql(), "执行商品查询");

        let products = qb
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn insert(&self, product: NewProduct) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO produtos (nome, categoria, descricao, preco, loja, imagem_url, link) \
             VALUES ($1, $2, $3, $4::numeric, $5, $6, $7)",
        )
        .bind(product.name)
        .bind(product.category)
        .bind(product.description)
        .bind(product.price)
        .bind(product.store)
        .bind(product.image_url)
        .bind(product.link)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
