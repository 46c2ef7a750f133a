//! 商品目录：列表筛选与商品登记

pub mod handler;
pub mod model;
pub mod query;
pub mod service;
