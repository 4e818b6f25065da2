//! 共享库
//!
//! 包含 webhook 服务共用的配置、错误处理、签名校验、可观测性等基础设施代码。

pub mod config;
pub mod crypto;
pub mod error;
pub mod observability;
pub mod test_utils;
