use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HEM_ALLOWANCE: f64 = 20.0;

/// Body measurements and fit adjustments, exposed to expressions as `M` and `F`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(default)]
    pub body: IndexMap<String, f64>,
    #[serde(default)]
    pub fit: IndexMap<String, f64>,
}

impl Measurements {
    #[must_use]
    pub fn new(body: IndexMap<String, f64>, fit: IndexMap<String, f64>) -> Self {
        Self { body, fit }
    }
}

/// Drafting options, exposed to expressions as `O`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default = "default_hem_allowance")]
    pub hem_allowance: f64,
    #[serde(flatten)]
    pub extra: IndexMap<String, f64>,
}

fn default_hem_allowance() -> f64 {
    DEFAULT_HEM_ALLOWANCE
}

impl Default for Options {
    fn default() -> Self {
        Self {
            hem_allowance: DEFAULT_HEM_ALLOWANCE,
            extra: IndexMap::new(),
        }
    }
}

impl Options {
    /// Options taken from a recipe's `defaults` mapping.
    ///
    /// Every numeric entry becomes an option; `hem_allowance` falls back to 20 mm.
    #[must_use]
    pub fn from_recipe(recipe: &serde_yaml::Value) -> Self {
        let mut options = Self::default();
        let Some(defaults) = recipe.get("defaults").and_then(serde_yaml::Value::as_mapping) else {
            return options;
        };
        for (key, value) in defaults {
            let (Some(key), Some(value)) = (key.as_str(), value.as_f64()) else {
                continue;
            };
            if key == "hem_allowance" {
                options.hem_allowance = value;
            } else {
                options.extra.insert(key.to_string(), value);
            }
        }
        options
    }

    /// The `O` namespace: `hem_allowance` first, then the extra options in order.
    #[must_use]
    pub fn namespace(&self) -> IndexMap<String, f64> {
        let mut ns = IndexMap::with_capacity(self.extra.len() + 1);
        ns.insert("hem_allowance".to_string(), self.hem_allowance);
        for (k, v) in &self.extra {
            ns.insert(k.clone(), *v);
        }
        ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_defaults() {
        let recipe: serde_yaml::Value = serde_yaml::from_str(
            "name: blazer\ndefaults:\n  hem_allowance: 25\n  pocket_depth: 140.5\n  lining: true\n",
        )
        .unwrap();
        let options = Options::from_recipe(&recipe);
        assert_eq!(options.hem_allowance, 25.0);
        assert_eq!(options.extra.get("pocket_depth"), Some(&140.5));
        assert!(!options.extra.contains_key("lining"));

        let ns = options.namespace();
        assert_eq!(ns.keys().collect::<Vec<_>>(), ["hem_allowance", "pocket_depth"]);
    }

    #[test]
    fn recipe_without_defaults() {
        let recipe: serde_yaml::Value = serde_yaml::from_str("name: plain\n").unwrap();
        assert_eq!(Options::from_recipe(&recipe), Options::default());
        assert_eq!(Options::from_recipe(&serde_yaml::Value::Null).hem_allowance, 20.0);
    }

    #[test]
    fn measurements_file_shape() {
        let m: Measurements =
            serde_json::from_str(r#"{"body": {"chest": 96, "waist": 80}, "fit": {"ease_chest": 6}}"#)
                .unwrap();
        assert_eq!(m.body["chest"], 96.0);
        assert_eq!(m.fit["ease_chest"], 6.0);
        let empty: Measurements = serde_json::from_str("{}").unwrap();
        assert!(empty.body.is_empty());
    }
}
