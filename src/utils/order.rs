//! 标识符排序：纯数字按数值比较，排在非数字之前
use std::cmp::Ordering;

pub fn compare_numeric_first(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// 去重并按 [`compare_numeric_first`] 排序
pub fn sorted_unique<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut values: Vec<String> = values.into_iter().collect();
    values.sort_by(|a, b| compare_numeric_first(a, b));
    values.dedup();
    values
}
