//! 部分更新负载的辅助反序列化

use serde::{Deserialize, Deserializer};

/// 区分“字段缺失”与“显式 null”
///
/// 配合 `#[serde(default, deserialize_with = "double_option")]` 使用：
/// 缺失为 `None`，`null` 为 `Some(None)`，有值为 `Some(Some(v))`
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
