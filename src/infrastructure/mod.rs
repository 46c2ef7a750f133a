//! 基础设施：数据库、对象存储与日志

pub mod database;
pub mod logger;
pub mod memory;
pub mod storage;
pub mod store;
