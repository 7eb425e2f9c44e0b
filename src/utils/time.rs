//! 时间工具函数
//!
//! 所有时间戳统一使用 i64 Unix millis，
//! repository 层只接收 `i64`，不做时区转换。

/// Current wall clock as Unix millis
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
