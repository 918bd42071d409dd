//! 工具模块 - 通用工具函数和类型
//!
//! - [`AppError`] / [`AppResponse`] - 应用错误类型和 API 响应结构
//! - [`logger`] - tracing 初始化
//! - [`validation`] - 输入校验

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{AppError, AppResponse};
pub use result::AppResult;
