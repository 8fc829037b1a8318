//! Row records and key extraction.

use serde_json::Value;

/// A row is an arbitrary keyed value bag. Cell values are looked up by
/// column id; the grouping engine reads its configured field the same way.
pub type RowRecord = serde_json::Map<String, Value>;

/// Resolve the stable key for a row.
///
/// Fallback chain: the caller-supplied extractor, then the record's `id`
/// field, then the row's positional index within the rendered window.
/// Positional keys are unstable across data mutations — a documented
/// limitation, not remediated here.
pub fn row_key(
    record: &RowRecord,
    index: usize,
    extractor: Option<&dyn Fn(&RowRecord) -> Option<String>>,
) -> String {
    if let Some(extract) = extractor {
        if let Some(key) = extract(record) {
            return key;
        }
    }
    if let Some(id) = record.get("id") {
        return json_key(id);
    }
    index.to_string()
}

/// Render a JSON value as a key string. Strings are used verbatim so keys
/// survive a serialize/deserialize round trip without gaining quotes.
pub fn json_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Tri-state of the header selection checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    /// No data row is selected.
    None,
    /// Some, but not all, data rows are selected.
    Partial,
    /// Every data row is selected.
    All,
}

/// Derive the header checkbox state from the selected-key set and the
/// current data source.
pub fn check_state(
    selected: &[String],
    rows: &[RowRecord],
    extractor: Option<&dyn Fn(&RowRecord) -> Option<String>>,
) -> CheckState {
    if rows.is_empty() || selected.is_empty() {
        return CheckState::None;
    }
    let hit = rows
        .iter()
        .enumerate()
        .filter(|(i, r)| selected.iter().any(|k| *k == row_key(r, *i, extractor)))
        .count();
    if hit == 0 {
        CheckState::None
    } else if hit == rows.len() {
        CheckState::All
    } else {
        CheckState::Partial
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> RowRecord {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn extractor_wins_over_id_field() {
        let rec = record(&[("id", json!("r1")), ("code", json!("c9"))]);
        let extract = |r: &RowRecord| r.get("code").map(json_key);
        assert_eq!(row_key(&rec, 0, Some(&extract)), "c9");
    }

    #[test]
    fn id_field_wins_over_position() {
        let rec = record(&[("id", json!(7))]);
        assert_eq!(row_key(&rec, 3, None), "7");
    }

    #[test]
    fn position_is_the_last_resort() {
        let rec = record(&[("name", json!("x"))]);
        assert_eq!(row_key(&rec, 3, None), "3");
    }

    #[test]
    fn string_ids_are_unquoted() {
        let rec = record(&[("id", json!("abc"))]);
        assert_eq!(row_key(&rec, 0, None), "abc");
    }

    #[test]
    fn check_state_transitions() {
        let rows = vec![
            record(&[("id", json!("a"))]),
            record(&[("id", json!("b"))]),
        ];
        assert_eq!(check_state(&[], &rows, None), CheckState::None);
        let some = vec!["a".to_string()];
        assert_eq!(check_state(&some, &rows, None), CheckState::Partial);
        let all = vec!["a".to_string(), "b".to_string()];
        assert_eq!(check_state(&all, &rows, None), CheckState::All);
    }

    #[test]
    fn check_state_empty_rows() {
        let selected = vec!["a".to_string()];
        assert_eq!(check_state(&selected, &[], None), CheckState::None);
    }
}
