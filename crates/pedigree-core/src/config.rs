use serde_json::{Map, Value};

/// Options tree shared by the layout, render and editor layers.
///
/// Keys are dotted paths (`layout.cellWidth`, `labels.privacy`, …). Readers fall back to their
/// own defaults for anything missing, so an empty config is always valid.
#[derive(Debug, Clone, PartialEq)]
pub struct PedigreeConfig(Value);

impl Default for PedigreeConfig {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl PedigreeConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn as_value_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.get(dotted_path)?.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get(dotted_path)?.as_f64()
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        self.get(dotted_path)?.as_u64()
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dotted_paths_create_nested_objects() {
        let mut cfg = PedigreeConfig::default();
        cfg.set_value("layout.cellWidth", json!(160));
        cfg.set_value("labels.privacy", json!("full"));
        assert_eq!(cfg.get_f64("layout.cellWidth"), Some(160.0));
        assert_eq!(cfg.get_str("labels.privacy"), Some("full"));
        assert_eq!(cfg.get_f64("layout.nodeRadius"), None);
    }

    #[test]
    fn set_value_replaces_scalar_parents() {
        let mut cfg = PedigreeConfig::from_value(json!({"layout": 3}));
        cfg.set_value("layout.nodeRadius", json!(30));
        assert_eq!(cfg.get_u64("layout.nodeRadius"), Some(30));
    }

    #[test]
    fn deep_merge_keeps_sibling_keys() {
        let mut cfg = PedigreeConfig::from_value(json!({
            "viewport": {"minZoom": 0.5, "maxZoom": 2.0}
        }));
        cfg.deep_merge(&json!({"viewport": {"maxZoom": 4.0}, "history": {"limit": 10}}));
        assert_eq!(cfg.get_f64("viewport.minZoom"), Some(0.5));
        assert_eq!(cfg.get_f64("viewport.maxZoom"), Some(4.0));
        assert_eq!(cfg.get_u64("history.limit"), Some(10));
    }
}
