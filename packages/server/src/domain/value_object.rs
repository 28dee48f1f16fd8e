//! Value Objects
//!
//! 識別子やタイムスタンプなど、不変で等価性によって比較される値を定義します。
//! 文字列ベースの識別子は生成時に検証され、不正な値はドメインに入りません。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

const MAX_ROOM_ID_LENGTH: usize = 64;
const MAX_USER_ID_LENGTH: usize = 64;
const MAX_DISPLAY_NAME_LENGTH: usize = 64;
const MAX_OPERATION_ID_LENGTH: usize = 128;

fn validate(
    kind: &'static str,
    value: &str,
    max_length: usize,
) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty(kind));
    }
    if value.chars().count() > max_length {
        return Err(ValueObjectError::TooLong {
            kind,
            max: max_length,
        });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate($kind, &value, $max)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Room 識別子
    RoomId,
    "room id",
    MAX_ROOM_ID_LENGTH
);

string_id!(
    /// クライアントが選ぶユーザー識別子（再接続をまたいで安定）
    UserId,
    "user id",
    MAX_USER_ID_LENGTH
);

string_id!(
    /// 表示名
    DisplayName,
    "display name",
    MAX_DISPLAY_NAME_LENGTH
);

string_id!(
    /// 描画操作の識別子（権威側が採番）
    OperationId,
    "operation id",
    MAX_OPERATION_ID_LENGTH
);

impl OperationId {
    /// Wraps an id produced by a generator.
    ///
    /// 生成器の出力は常に非空かつ上限以内なので検証を省略します。
    pub(crate) fn generated(value: String) -> Self {
        debug_assert!(validate("operation id", &value, MAX_OPERATION_ID_LENGTH).is_ok());
        Self(value)
    }
}

/// Transport-assigned connection identifier.
///
/// 接続ごとにサーバーが UUID v4 を割り当てます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 2D point on the canvas. Coordinates are never interpreted by the log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Opaque rendering color (e.g. `#ff0000` or `rgb(30,40,50)`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
