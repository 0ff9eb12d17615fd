// Copyright 2025 pathvector Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::OnceLock;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

static LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// Set the process-wide log level. Later calls are ignored.
pub fn set_level(level: LogLevel) {
    let _ = LEVEL.set(level);
}

#[inline]
pub fn enabled(level: LogLevel) -> bool {
    level <= *LEVEL.get_or_init(|| LogLevel::Info)
}

pub fn get_timestamp() -> String {
    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => {
            let secs = duration.as_secs();
            let (year, month, day) = civil_from_days((secs / 86400) as i64);
            format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
                year,
                month,
                day,
                (secs % 86400) / 3600,
                (secs % 3600) / 60,
                secs % 60,
                duration.subsec_millis()
            )
        }
        Err(_) => "unknown".to_string(),
    }
}

// Gregorian date from days since 1970-01-01, era-based.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = z.div_euclid(146097);
    let doe = z.rem_euclid(146097);
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month as u32, day as u32)
}

#[macro_export]
macro_rules! info {
    ($msg:expr) => {
        if $crate::log::enabled($crate::log::LogLevel::Info) {
            println!("{}", serde_json::json!({
                "timestamp": $crate::log::get_timestamp(),
                "level": "INFO",
                "message": $msg
            }));
        }
    };
    ($msg:expr, $($key:tt => $val:expr),+ $(,)?) => {
        if $crate::log::enabled($crate::log::LogLevel::Info) {
            println!("{}", serde_json::json!({
                "timestamp": $crate::log::get_timestamp(),
                "level": "INFO",
                "message": $msg,
                $(
                    $key: $val
                ),+
            }));
        }
    };
}

#[macro_export]
macro_rules! warn {
    ($msg:expr) => {
        if $crate::log::enabled($crate::log::LogLevel::Warn) {
            println!("{}", serde_json::json!({
                "timestamp": $crate::log::get_timestamp(),
                "level": "WARN",
                "message": $msg
            }));
        }
    };
    ($msg:expr, $($key:tt => $val:expr),+ $(,)?) => {
        if $crate::log::enabled($crate::log::LogLevel::Warn) {
            println!("{}", serde_json::json!({
                "timestamp": $crate::log::get_timestamp(),
                "level": "WARN",
                "message": $msg,
                $(
                    $key: $val
                ),+
            }));
        }
    };
}

#[macro_export]
macro_rules! error {
    ($msg:expr) => {
        if $crate::log::enabled($crate::log::LogLevel::Error) {
            eprintln!("{}", serde_json::json!({
                "timestamp": $crate::log::get_timestamp(),
                "level": "ERROR",
                "message": $msg
            }));
        }
    };
    ($msg:expr, $($key:tt => $val:expr),+ $(,)?) => {
        if $crate::log::enabled($crate::log::LogLevel::Error) {
            eprintln!("{}", serde_json::json!({
                "timestamp": $crate::log::get_timestamp(),
                "level": "ERROR",
                "message": $msg,
                $(
                    $key: $val
                ),+
            }));
        }
    };
}

#[macro_export]
macro_rules! debug {
    ($msg:expr) => {
        if $crate::log::enabled($crate::log::LogLevel::Debug) {
            println!("{}", serde_json::json!({
                "timestamp": $crate::log::get_timestamp(),
                "level": "DEBUG",
                "message": $msg
            }));
        }
    };
    ($msg:expr, $($key:tt => $val:expr),+ $(,)?) => {
        if $crate::log::enabled($crate::log::LogLevel::Debug) {
            println!("{}", serde_json::json!({
                "timestamp": $crate::log::get_timestamp(),
                "level": "DEBUG",
                "message": $msg,
                $(
                    $key: $val
                ),+
            }));
        }
    };
}
