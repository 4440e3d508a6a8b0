//! 日志宏入口：启用 logging 特性时转发到 tracing，否则展开为空操作

#[cfg(feature = "logging")]
pub(crate) use tracing::{debug, info, warn};

// 未启用日志时仍检查格式参数
#[cfg(not(feature = "logging"))]
mod noop {
    macro_rules! debug {
        ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
    }
    macro_rules! info {
        ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
    }
    macro_rules! warn {
        ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
    }
    pub(crate) use {debug, info, warn};
}

#[cfg(not(feature = "logging"))]
pub(crate) use noop::{debug, info, warn};
