//! 日志宏：开启 `logging` 特性时转发到 tracing，关闭时仅做参数格式校验

macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        ::tracing::trace!($($arg)*);
        #[cfg(not(feature = "logging"))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        ::tracing::debug!($($arg)*);
        #[cfg(not(feature = "logging"))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        ::tracing::warn!($($arg)*);
        #[cfg(not(feature = "logging"))]
        let _ = format_args!($($arg)*);
    }};
}
