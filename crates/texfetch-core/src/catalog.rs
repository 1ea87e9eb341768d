//! Item catalog loading.
//!
//! The catalog is a JSON array of objects. Entries carrying an `itemID` field
//! (number or string) contribute one identifier; everything else is dropped.
//! String ids that could escape the output directory are dropped with a
//! warning.

use std::path::Path;

use serde_json::Value;

use crate::error::CatalogError;
use crate::types::ItemId;

/// Field naming the item identifier in catalog entries.
pub const ITEM_ID_FIELD: &str = "itemID";

/// Load and sort item identifiers from a catalog file.
pub fn load_catalog(path: &Path) -> Result<Vec<ItemId>, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<Value> =
        serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let ids = item_ids(&entries);
    tracing::debug!(
        "Catalog {:?}: {} entries, {} with {}",
        path,
        entries.len(),
        ids.len(),
        ITEM_ID_FIELD
    );
    Ok(ids)
}

/// Extract identifiers from parsed catalog entries, sorted ascending.
pub fn item_ids(entries: &[Value]) -> Vec<ItemId> {
    let mut ids: Vec<ItemId> = entries
        .iter()
        .filter_map(|entry| match entry.get(ITEM_ID_FIELD)? {
            Value::Number(n) => Some(ItemId::new(n.to_string())),
            Value::String(s) if !s.trim().is_empty() => Some(ItemId::new(s.trim())),
            _ => None,
        })
        .filter(|id| {
            let safe = id.is_file_safe();
            if !safe {
                tracing::warn!("Dropping catalog entry with unusable {ITEM_ID_FIELD} {:?}", id.as_str());
            }
            safe
        })
        .collect();
    ids.sort();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entries_without_item_id_are_dropped() {
        let entries = vec![
            json!({"itemID": 202}),
            json!({"itemID": 101}),
            json!({"notItemID": 303}),
        ];
        let ids = item_ids(&entries);
        assert_eq!(ids, vec![ItemId::from("101"), ItemId::from("202")]);
    }

    #[test]
    fn test_string_ids_are_accepted() {
        let entries = vec![json!({"itemID": "710"}), json!({"itemID": 42})];
        let ids = item_ids(&entries);
        assert_eq!(ids, vec![ItemId::from("42"), ItemId::from("710")]);
    }

    #[test]
    fn test_non_scalar_ids_are_dropped() {
        let entries = vec![json!({"itemID": null}), json!({"itemID": [1]}), json!({"itemID": ""})];
        assert!(item_ids(&entries).is_empty());
    }

    #[test]
    fn test_path_like_ids_are_dropped() {
        let entries = vec![
            json!({"itemID": "../../etc/evil"}),
            json!({"itemID": "/tmp/abs"}),
            json!({"itemID": "sub/dir"}),
            json!({"itemID": ".."}),
            json!({"itemID": 7}),
        ];
        let ids = item_ids(&entries);
        assert_eq!(ids, vec![ItemId::from("7")]);

        let output = Path::new("IMAGE");
        for id in &ids {
            assert!(output.join(id.png_file_name()).starts_with(output));
        }
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(&dir.path().join("OB52.json")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn test_load_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("OB52.json");
        std::fs::write(
            &path,
            r#"[{"itemID": 101, "name": "a"}, {"itemID": 202}, {"notItemID": 303}]"#,
        )
        .unwrap();

        let ids = load_catalog(&path).unwrap();
        assert_eq!(ids, vec![ItemId::from("101"), ItemId::from("202")]);
    }

    #[test]
    fn test_load_catalog_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("OB52.json");
        std::fs::write(&path, r#"{"itemID": 1}"#).unwrap();

        let err = load_catalog(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }
}
