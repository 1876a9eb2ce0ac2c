//! 表单校验，全部为纯函数，不做任何 I/O

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = 200;
pub const CONTENT_MIN_LEN: usize = 10;
pub const COMMENT_MAX_LEN: usize = 500;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// 按字符数计算长度
pub fn validate_password(password: &str, min_len: usize) -> bool {
    password.chars().count() >= min_len
}

/// 字段名 -> 错误信息
pub type FieldErrors = BTreeMap<&'static str, String>;

pub fn validate_blog_form(title: &str, content: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let title_len = title.chars().count();
    if title.trim().is_empty() {
        errors.insert("title", "Title is required".into());
    } else if title_len < TITLE_MIN_LEN {
        errors.insert("title", "Title must be at least 3 characters".into());
    } else if title_len > TITLE_MAX_LEN {
        errors.insert("title", "Title must be less than 200 characters".into());
    }

    if content.trim().is_empty() {
        errors.insert("content", "Content is required".into());
    } else if content.chars().count() < CONTENT_MIN_LEN {
        errors.insert("content", "Content must be at least 10 characters".into());
    }

    errors
}

pub fn validate_comment(content: &str) -> Option<&'static str> {
    if content.trim().is_empty() {
        return Some("Comment cannot be empty");
    }
    if content.chars().count() > COMMENT_MAX_LEN {
        return Some("Comment must be less than 500 characters");
    }
    None
}
