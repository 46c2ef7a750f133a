//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::infrastructure::{storage::StorageError, store::StoreError};

/// 请求级错误类型
///
/// 所有错误对本次请求都是终止性的，不做重试。
/// 对外只暴露 `{ "error": "<消息>" }`，不暴露结构化错误码。
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// 未附带图片文件
    #[error("Nenhuma imagem foi enviada.")]
    MissingImage,
    /// 对象存储写入失败
    #[error("Erro ao fazer upload da imagem.")]
    Upload(#[source] StorageError),
    /// 商品记录写入失败（已尝试补偿删除图片）
    #[error("Erro ao cadastrar produto.")]
    Insert(#[source] StoreError),
    /// 商品查询失败，消息中携带存储层的错误详情
    #[error("Erro ao buscar produtos. Detalhes: {0}")]
    Retrieval(#[source] StoreError),
    /// 其他意外错误，原因只写日志
    #[error("Erro no servidor.")]
    Internal(String),
}

/// 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::MissingImage => StatusCode::BAD_REQUEST,
            CatalogError::Upload(_)
            | CatalogError::Insert(_)
            | CatalogError::Retrieval(_)
            | CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = ErrorResponse {
            error: self.to_string(),
        };

        (status, axum::Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(CatalogError::MissingImage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            CatalogError::Insert(StoreError::Backend("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            CatalogError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_retrieval_message_embeds_detail() {
        let err = CatalogError::Retrieval(StoreError::Backend("relation missing".into()));
        assert_eq!(
            err.to_string(),
            "Erro ao buscar produtos. Detalhes: relation missing"
        );
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let err = CatalogError::Internal("stream closed".into());
        assert_eq!(err.to_string(), "Erro no servidor.");
    }
}
