//! 请求级业务操作。身份由调用方显式传入，写操作只作用于调用者自己的记录，
//! 工作流调用在主写入完成之后进行，失败只降级为警告。

pub mod auth;
pub mod blog;
pub mod comment;

use crate::workflow::Envelope;

/// 可选集成失败时转成给调用方的警告
pub(crate) fn side_effect_warning<T>(
    what: &str,
    envelope: Envelope<T>,
    warnings: &mut Vec<String>,
) -> Option<T> {
    match envelope.into_result() {
        Ok(data) => Some(data),
        Err(err) => {
            tracing::warn!("{} failed: {}", what, err);
            warnings.push(format!("{} failed: {}", what, err.message));
            None
        }
    }
}
