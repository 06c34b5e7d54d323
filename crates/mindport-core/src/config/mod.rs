use crate::{Error, Result};
use serde_json::{Map, Value, json};

/// Import settings stored as a JSON object and addressed with dotted paths
/// (`"layout.horizontalSpacing"`).
///
/// [`ImportConfig::default`] carries every known key; user overrides are layered on top with
/// [`ImportConfig::deep_merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig(Value);

impl Default for ImportConfig {
    fn default() -> Self {
        Self(defaults())
    }
}

impl ImportConfig {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parses a JSON object of overrides and merges it onto the defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| Error::InvalidConfigJson {
                message: e.to_string(),
            })?;
        Self::from_overrides(value)
    }

    /// Parses a YAML mapping of overrides and merges it onto the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|e| Error::InvalidConfigYaml {
                message: e.to_string(),
            })?;
        Self::from_overrides(value)
    }

    fn from_overrides(value: Value) -> Result<Self> {
        let found = match &value {
            Value::Object(_) => None,
            Value::Null => Some("null"),
            Value::Bool(_) => Some("boolean"),
            Value::Number(_) => Some("number"),
            Value::String(_) => Some("string"),
            Value::Array(_) => Some("array"),
        };
        if let Some(found) = found {
            return Err(Error::ConfigNotAnObject { found });
        }
        let mut cfg = Self::default();
        cfg.deep_merge(&value);
        Ok(cfg)
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.lookup(dotted_path)?.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.lookup(dotted_path)?.as_f64()
    }

    pub fn get_usize(&self, dotted_path: &str) -> Option<usize> {
        let v = self.lookup(dotted_path)?;
        v.as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| usize::try_from(n).ok())
    }

    /// Reads a string, falling back to the built-in default when the key is missing or has
    /// the wrong type.
    pub fn str_or_default(&self, dotted_path: &str) -> String {
        self.get_str(dotted_path)
            .map(str::to_string)
            .unwrap_or_else(|| default_str(dotted_path))
    }

    pub fn f64_or_default(&self, dotted_path: &str) -> f64 {
        self.get_f64(dotted_path)
            .filter(|v| v.is_finite())
            .unwrap_or_else(|| default_f64(dotted_path))
    }

    pub fn usize_or_default(&self, dotted_path: &str) -> usize {
        self.get_usize(dotted_path)
            .unwrap_or_else(|| default_f64(dotted_path).max(0.0) as usize)
    }

    pub fn bool_or_default(&self, dotted_path: &str) -> bool {
        self.get_bool(dotted_path).unwrap_or_else(|| {
            default_lookup(dotted_path)
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
        })
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // Configs are objects; coerce anything else so this API never panics on user input.
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

/// The built-in configuration. Every key read by the importer has an entry here.
pub fn defaults() -> Value {
    json!({
        "parser": {
            "defaultTitle": "Imported Mind Map",
            "strictElementScope": false,
            "maxDepth": 1000
        },
        "layout": {
            "rootX": 500,
            "rootY": 400,
            "horizontalSpacing": 250,
            "verticalSpacing": 80,
            "minNodeWidth": 150,
            "maxNodeWidth": 300,
            "charWidth": 8,
            "widthPadding": 40,
            "minNodeHeight": 50,
            "charsPerLine": 30,
            "lineHeight": 25
        },
        "style": {
            "rootBackgroundColor": "#3b82f6",
            "rootTextColor": "#ffffff",
            "rootFontSize": 18,
            "rootFontWeight": "bold"
        },
        "connection": {
            "strokeColor": "#6b7280",
            "strokeWidth": 2
        },
        "preview": {
            "maxSampleNodes": 10,
            "maxWarnings": 10,
            "maxTextLength": 50
        }
    })
}

fn default_lookup(dotted_path: &str) -> Option<Value> {
    defaults()
        .pointer(&format!("/{}", dotted_path.replace('.', "/")))
        .cloned()
}

fn default_str(dotted_path: &str) -> String {
    default_lookup(dotted_path)
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn default_f64(dotted_path: &str) -> f64 {
    default_lookup(dotted_path)
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}
