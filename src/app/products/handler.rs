//! 商品处理器

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::{debug, warn};

use super::{
    model::{ImageUpload, ListProductsParams, Product, ProductForm},
    query::FilterCriteria,
    service::ProductService,
};
use crate::core::{error::CatalogError, response::MessageResponse};

/// 图片文件所在的表单字段
pub const IMAGE_FIELD: &str = "imagem";

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

/// GET /api/produtos
///
/// 查询串按键值对读取，重复的键不会导致请求被拒绝。
pub async fn list_products(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Product>>, CatalogError> {
    let params = ListProductsParams::from_pairs(pairs);
    let criteria = FilterCriteria::from_params(&params);
    let products = state.product_service.list_products(&criteria).await?;
    Ok(Json(products))
}

/// POST /api/cadastrar-produto
///
/// 非 multipart 请求按未上传图片处理。
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), CatalogError> {
    let (form, image) = match multipart {
        Ok(multipart) => read_product_form(multipart).await?,
        Err(rejection) => {
            debug!("请求不是 multipart 表单: {}", rejection);
            (ProductForm::default(), None)
        }
    };

    state.product_service.create_product(form, image).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::product_created())))
}

/// 读取文本字段与第一个非空文件名的图片
async fn read_product_form(
    mut multipart: Multipart,
) -> Result<(ProductForm, Option<ImageUpload>), CatalogError> {
    let mut form = ProductForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;

            if file_name.is_empty() {
                debug!("忽略没有文件名的图片字段");
            } else if image.is_none() {
                image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            } else {
                debug!(file_name = %file_name, "忽略多余的图片");
            }
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        if !form.set_field(&name, value) {
            debug!(field = %name, "忽略未知的表单字段");
        }
    }

    Ok((form, image))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> CatalogError {
    warn!("读取 multipart 表单失败: {}", err);
    CatalogError::Internal(err.to_string())
}
