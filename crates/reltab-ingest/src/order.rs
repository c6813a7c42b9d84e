//! Source-order bookkeeping for line-delimited JSON input.

/// Merge the keys of one record into the running source order.
///
/// The order of the existing list is preserved; a key not seen before is
/// spliced in immediately before the next key that is already known, or
/// appended when no such anchor exists. When records disagree about the
/// order the result is merely *a* valid total order over all seen names,
/// not a canonical one.
pub fn merge_source_order(source_order: &mut Vec<String>, new_keys: &[String]) {
    let mut source_place = 0;
    for (i, key) in new_keys.iter().enumerate() {
        if let Some(idx) = source_order.iter().position(|known| known == key) {
            source_place = idx;
            continue;
        }
        // find the anchor: the next new key that is already known past the
        // current position
        let anchor = new_keys[i..].iter().find_map(|future_key| {
            source_order[source_place..]
                .iter()
                .position(|known| known == future_key)
                .map(|offset| source_place + offset)
        });
        match anchor {
            Some(anchor_idx) => {
                source_order.insert(anchor_idx, key.clone());
                source_place = anchor_idx;
            }
            None => source_order.push(key.clone()),
        }
    }
}
