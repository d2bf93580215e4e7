use std::fmt;
use std::time::Duration;

/// 普通提示的自动消失时间
pub const TOAST_TTL: Duration = Duration::from_millis(3000);

/// 数据加载失败横幅的自动消失时间
pub const ERROR_BANNER_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

/// 自动消失的用户通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub ttl: Duration,
}

impl Toast {
    fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            ttl: TOAST_TTL,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, message)
    }

    pub fn load_failed() -> Self {
        Self {
            kind: ToastKind::Error,
            message: "资源数据加载失败，请刷新页面重试。".to_string(),
            ttl: ERROR_BANNER_TTL,
        }
    }
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = match self.kind {
            ToastKind::Info => "ℹ️ ",
            ToastKind::Success => "✅",
            ToastKind::Warning => "⚠️ ",
            ToastKind::Error => "❌",
        };
        write!(f, "{} {}", icon, self.message)
    }
}
