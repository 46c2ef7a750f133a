//! # 商品目录后端
//!
//! 提供两个无状态的请求处理流程：
//! - 商品列表：把查询参数组合成筛选、排序与分页查询
//! - 商品登记：上传图片、写入记录，写入失败时删除已上传的图片

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use app::{create_router, products::handler::AppState};
pub use config::Config;
