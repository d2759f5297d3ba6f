//! 차단 목록 재구성

/// `list`에서 `target`을 모두 뺀 새 목록과, 하나라도 있었는지 여부를 돌려줍니다.
///
/// 남은 원소의 순서는 유지되고 입력은 변경되지 않습니다.
pub fn generate_new_block_list<T: PartialEq + Clone>(target: &T, list: &[T]) -> (Vec<T>, bool) {
    let mut found = false;
    let mut filtered = Vec::with_capacity(list.len());

    for item in list {
        if item == target {
            found = true;
        } else {
            filtered.push(item.clone());
        }
    }

    (filtered, found)
}
