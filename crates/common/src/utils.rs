//! 通用工具函数

use uuid::Uuid;

/// 生成新的 UUID v7（时间有序）
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}

/// 去重并保持首次出现的顺序
pub fn dedup_preserving_order<T: PartialEq + Clone>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserving_order() {
        let deduped = dedup_preserving_order(&[3, 1, 3, 2, 1]);
        assert_eq!(deduped, vec![3, 1, 2]);
    }

    #[test]
    fn test_new_id_is_time_ordered() {
        let a = new_id();
        let b = new_id();
        assert!(a < b);
    }
}
