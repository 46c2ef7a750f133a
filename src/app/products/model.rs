//! 商品数据模型

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 已持久化的商品记录
///
/// 序列化字段名与前端页面使用的列名保持一致。
/// `image_url` 只在图片上传成功后写入，因此永远不为空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    #[serde(rename = "nome")]
    #[sqlx(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "categoria")]
    #[sqlx(rename = "categoria")]
    pub category: Option<String>,
    #[serde(rename = "descricao")]
    #[sqlx(rename = "descricao")]
    pub description: Option<String>,
    /// 十进制价格，以文本形式读出
    #[serde(rename = "preco")]
    #[sqlx(rename = "preco")]
    pub price: Option<String>,
    #[serde(rename = "loja")]
    #[sqlx(rename = "loja")]
    pub store: Option<String>,
    #[serde(rename = "imagem_url")]
    #[sqlx(rename = "imagem_url")]
    pub image_url: String,
    pub link: Option<String>,
}

/// 待插入的商品记录，表单字段原样透传
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewProduct {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "categoria")]
    pub category: Option<String>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "preco")]
    pub price: Option<String>,
    #[serde(rename = "loja")]
    pub store: Option<String>,
    #[serde(rename = "imagem_url")]
    pub image_url: String,
    pub link: Option<String>,
}

impl NewProduct {
    pub fn from_form(form: ProductForm, image_url: String) -> Self {
        Self {
            name: form.name,
            category: form.category,
            description: form.description,
            price: form.price,
            store: form.store,
            image_url,
            link: form.link,
        }
    }
}

/// 登记表单中的文本字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub store: Option<String>,
    pub link: Option<String>,
}

impl ProductForm {
    /// 按表单字段名写入，未知字段返回 false
    pub fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "nome" => &mut self.name,
            "categoria" => &mut self.category,
            "descricao" => &mut self.description,
            "preco" => &mut self.price,
            "loja" => &mut self.store,
            "link" => &mut self.link,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// 随表单上传的图片文件
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// 商品列表查询参数
///
/// `page` 和 `limit` 以原始字符串接收，解析失败时回退到默认值。
/// `orderBy` 会被接收但不参与排序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListProductsParams {
    pub categoria: Option<String>,
    pub loja: Option<String>,
    pub termo: Option<String>,
    pub fuzzy: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub order_by: Option<String>,
}

impl ListProductsParams {
    /// 从查询串键值对构建，同名参数按出现顺序用逗号拼接，未知参数忽略
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "categoria" => &mut params.categoria,
                "loja" => &mut params.loja,
                "termo" => &mut params.termo,
                "fuzzy" => &mut params.fuzzy,
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                "orderBy" => &mut params.order_by,
                _ => continue,
            };
            if let Some(existing) = slot.as_mut() {
                existing.push(',');
                existing.push_str(&value);
            } else {
                *slot = Some(value);
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_pairs() {
        let params = ListProductsParams::from_pairs(pairs(&[
            ("categoria", "bebidas"),
            ("orderBy", "nome_asc"),
            ("desconhecido", "x"),
        ]));
        assert_eq!(params.categoria.as_deref(), Some("bebidas"));
        assert_eq!(params.order_by.as_deref(), Some("nome_asc"));
        assert_eq!(params.loja, None);
    }

    #[test]
    fn test_repeated_keys_are_comma_joined() {
        let params = ListProductsParams::from_pairs(pairs(&[
            ("categoria", "a"),
            ("page", "2"),
            ("categoria", "b"),
            ("page", "3"),
        ]));
        assert_eq!(params.categoria.as_deref(), Some("a,b"));
        assert_eq!(params.page.as_deref(), Some("2,3"));
    }
}
