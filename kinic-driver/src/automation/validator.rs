//! 提取校验模块
//!
//! 复制动作是否真的发生无法直接观察，只能比较复制前后的剪贴板。
//! 校验器根据两次快照和期望的内容类型给出接受或拒绝：
//!
//! | 拒绝原因 | 分类 | 含义 |
//! |----------|------|------|
//! | `empty` | 无操作 | 复制后剪贴板为空 |
//! | `unchanged` | 无操作 | 与复制前相同 |
//! | `too_short` | 低可信 | 短于期望内容的最小长度 |
//! | `unexpected_uri` | 低可信 | 期望回答文本，却得到链接 |
//! | `not_a_url` | 低可信 | 期望链接，却得到普通文本 |
//! | `clipboard_unavailable` | 致命 | 剪贴板无法读取或清空 |
//!
//! 非致命拒绝让编排层尝试下一个策略；致命拒绝立即结束提取。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::input::ClipboardSnapshot;
use crate::state::config::ValidationConfig;

/// 期望的捕获内容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedContent {
    /// 搜索结果链接
    Url,
    /// AI 回答正文
    AnswerText,
}

/// 拒绝分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectClass {
    NoOp,
    LowConfidence,
    Fatal,
}

/// 拒绝原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    Empty,
    Unchanged,
    TooShort { len: usize, min: usize },
    UnexpectedUri,
    NotAUrl,
    ClipboardUnavailable { detail: String },
}

impl Rejection {
    pub fn class(&self) -> RejectClass {
        match self {
            Self::Empty | Self::Unchanged => RejectClass::NoOp,
            Self::TooShort { .. } | Self::UnexpectedUri | Self::NotAUrl => {
                RejectClass::LowConfidence
            }
            Self::ClipboardUnavailable { .. } => RejectClass::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.class() == RejectClass::Fatal
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("clipboard empty after copy"),
            Self::Unchanged => f.write_str("clipboard unchanged by copy"),
            Self::TooShort { len, min } => write!(f, "captured {} chars, need {}", len, min),
            Self::UnexpectedUri => f.write_str("captured a URI where answer text was expected"),
            Self::NotAUrl => f.write_str("captured text is not a URL"),
            Self::ClipboardUnavailable { detail } => write!(f, "clipboard unavailable: {}", detail),
        }
    }
}

/// 校验结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// 接受，携带去除首尾空白后的文本
    Accept(String),
    Reject(Rejection),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept(_))
    }
}

/// 提取校验器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionValidator {
    min_answer_len: usize,
    min_url_len: usize,
}

impl ExtractionValidator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            min_answer_len: config.min_answer_len,
            min_url_len: config.min_url_len,
        }
    }

    /// 比较复制前后的快照
    pub fn judge(
        &self,
        before: &ClipboardSnapshot,
        after: &ClipboardSnapshot,
        expected: ExpectedContent,
    ) -> Verdict {
        let captured = after.text().map(str::trim).unwrap_or_default();
        if captured.is_empty() {
            return Verdict::Reject(Rejection::Empty);
        }

        if before.text().map(str::trim) == Some(captured) {
            return Verdict::Reject(Rejection::Unchanged);
        }

        let has_scheme = starts_with_uri_scheme(captured);
        match expected {
            ExpectedContent::AnswerText if has_scheme => {
                return Verdict::Reject(Rejection::UnexpectedUri);
            }
            ExpectedContent::Url if !has_scheme || captured.contains(char::is_whitespace) => {
                return Verdict::Reject(Rejection::NotAUrl);
            }
            _ => {}
        }

        let min = match expected {
            ExpectedContent::Url => self.min_url_len,
            ExpectedContent::AnswerText => self.min_answer_len,
        };
        let len = captured.chars().count();
        if len < min {
            return Verdict::Reject(Rejection::TooShort { len, min });
        }

        Verdict::Accept(captured.to_string())
    }
}

impl Default for ExtractionValidator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

/// 是否以 `scheme://` 开头
///
/// scheme 为字母开头，后接字母、数字、`+`、`-`、`.`
pub fn starts_with_uri_scheme(text: &str) -> bool {
    let Some((scheme, _)) = text.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
