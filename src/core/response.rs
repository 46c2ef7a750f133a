//! 核心响应处理模块

use serde::{Deserialize, Serialize};

/// 商品登记成功时返回的确认消息
pub const PRODUCT_CREATED_MESSAGE: &str = "Produto cadastrado com sucesso!";

/// 仅包含一条消息的响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn product_created() -> Self {
        Self::new(PRODUCT_CREATED_MESSAGE)
    }
}

/// 健康检查响应
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
