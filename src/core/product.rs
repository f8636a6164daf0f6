//! Product records and generic field access.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

/// A single regional price listing.
///
/// The fixed fields are shared by every category; anything else a category
/// carries (chip, colour, screen size...) lands in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub model: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub storage: Option<String>,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub net_price: Option<f64>,
    #[serde(default)]
    pub tax_fees: Option<f64>,
    #[serde(default)]
    pub retail_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub launch_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// Accepts strings, numbers and booleans for free-text fields.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl Product {
    /// Value of the named field, core or extra. JSON nulls count as absent.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        let text = |s: &String| Some(FieldValue::Text(s.clone()));
        match name {
            "model" => text(&self.model),
            "storage" => self.storage.as_ref().and_then(text),
            "country_code" => text(&self.country_code),
            "currency" => text(&self.currency),
            "net_price" => self.net_price.map(FieldValue::Number),
            "tax_fees" => self.tax_fees.map(FieldValue::Number),
            "retail_price" | "total_price" => self.retail_price.map(FieldValue::Number),
            "launch_date" => self.launch_date.as_ref().and_then(text),
            "notes" => self.notes.as_ref().and_then(text),
            "category" => text(&self.category),
            other => self
                .extra
                .get(other)
                .map(FieldValue::from_json)
                .filter(|v| !v.is_null()),
        }
    }

    /// Names of the fields this record carries, core fields first.
    pub fn field_names(&self) -> Vec<String> {
        let optional = [
            ("storage", self.storage.is_some()),
            ("net_price", self.net_price.is_some()),
            ("tax_fees", self.tax_fees.is_some()),
            ("retail_price", self.retail_price.is_some()),
            ("launch_date", self.launch_date.is_some()),
            ("notes", self.notes.is_some()),
        ];
        let mut names = vec!["model".to_string()];
        names.extend(
            optional
                .iter()
                .filter(|(_, present)| *present)
                .map(|(name, _)| name.to_string()),
        );
        names.extend(
            ["country_code", "currency", "category"]
                .iter()
                .map(|s| s.to_string()),
        );
        names.extend(self.extra.keys().cloned());
        names
    }

    /// Price after a tourist tax refund: an explicit `tax_refund_price` when
    /// the record has a non-zero one, otherwise retail minus taxes.
    pub fn tax_refund_price(&self) -> Option<f64> {
        self.extra
            .get("tax_refund_price")
            .and_then(Value::as_f64)
            .filter(|p| *p != 0.0)
            .or_else(|| {
                self.retail_price
                    .map(|p| p - self.tax_fees.unwrap_or(0.0))
            })
    }

    /// Effective tax as a percentage of the net price.
    pub fn tax_rate_pct(&self) -> Option<f64> {
        match (self.net_price, self.tax_fees) {
            (Some(net), Some(tax)) if net > 0.0 => Some(tax / net * 100.0),
            _ => None,
        }
    }
}

/// A product field value, independent of which field it came from.
///
/// Ordering and equality are total so values can be used in sets; numbers
/// are compared with `f64::total_cmp`.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Number),
            Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }

    /// Interprets user input: numbers and booleans are recognised, anything
    /// else is text.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if let Some(n) = input.parse::<f64>().ok().filter(|n| n.is_finite()) {
            return FieldValue::Number(n);
        }
        match input {
            "true" => FieldValue::Bool(true),
            "false" => FieldValue::Bool(false),
            _ => FieldValue::Text(input.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Number(_) => 2,
            FieldValue::Text(_) => 3,
        }
    }
}

// -0.0 and 0.0 are the same value
fn normalized(n: f64) -> f64 {
    n + 0.0
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                normalized(*a).total_cmp(&normalized(*b))
            }
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            FieldValue::Null => {}
            FieldValue::Bool(b) => b.hash(state),
            FieldValue::Number(n) => normalized(*n).to_bits().hash(state),
            FieldValue::Text(s) => s.hash(state),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_product_deserialization_with_extras() {
        let json = r#"{
            "model": "iPhone 16 Pro",
            "storage": "256GB",
            "country_code": "JP",
            "currency": "JPY",
            "net_price": 159800,
            "tax_fees": 15980,
            "retail_price": 175780,
            "launch_date": "2024-09-20",
            "notes": null,
            "color": "Desert Titanium",
            "screen_inches": 6.3,
            "contributor": null
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.model, "iPhone 16 Pro");
        assert_eq!(product.storage.as_deref(), Some("256GB"));
        assert_eq!(product.retail_price, Some(175780.0));
        assert!(product.notes.is_none());
        assert_eq!(product.category, "");
        assert_eq!(
            product.field("color"),
            Some(FieldValue::Text("Desert Titanium".to_string()))
        );
        assert_eq!(product.field("screen_inches"), Some(FieldValue::Number(6.3)));
        assert_eq!(product.field("contributor"), None);
        assert_eq!(product.field("total_price"), Some(FieldValue::Number(175780.0)));
        assert_eq!(product.field("missing"), None);
    }

    #[test]
    fn test_numeric_storage_is_accepted_as_text() {
        let product: Product =
            serde_json::from_str(r#"{"model": "iPad", "storage": 128, "retail_price": 599}"#)
                .unwrap();
        assert_eq!(product.storage.as_deref(), Some("128"));
    }

    #[test]
    fn test_field_names_order() {
        let product: Product = serde_json::from_str(
            r#"{"model": "Mac mini", "country_code": "US", "currency": "USD",
                "retail_price": 599, "chip": "M4"}"#,
        )
        .unwrap();
        assert_eq!(
            product.field_names(),
            vec![
                "model",
                "retail_price",
                "country_code",
                "currency",
                "category",
                "chip"
            ]
        );
    }

    #[test]
    fn test_tax_refund_price() {
        let mut product = Product {
            retail_price: Some(1100.0),
            tax_fees: Some(100.0),
            ..Default::default()
        };
        assert_eq!(product.tax_refund_price(), Some(1000.0));

        product.tax_fees = None;
        assert_eq!(product.tax_refund_price(), Some(1100.0));

        product
            .extra
            .insert("tax_refund_price".to_string(), serde_json::json!(1020.0));
        assert_eq!(product.tax_refund_price(), Some(1020.0));

        product
            .extra
            .insert("tax_refund_price".to_string(), serde_json::json!(0));
        assert_eq!(product.tax_refund_price(), Some(1100.0));
    }

    #[test]
    fn test_tax_rate_pct() {
        let product = Product {
            net_price: Some(1000.0),
            tax_fees: Some(100.0),
            ..Default::default()
        };
        assert_eq!(product.tax_rate_pct(), Some(10.0));
        assert_eq!(Product::default().tax_rate_pct(), None);
    }

    #[test]
    fn test_field_value_parse() {
        assert_eq!(FieldValue::parse("256"), FieldValue::Number(256.0));
        assert_eq!(FieldValue::parse("true"), FieldValue::Bool(true));
        assert_eq!(FieldValue::parse(" 256GB "), FieldValue::Text("256GB".into()));
        assert_eq!(FieldValue::parse("NaN"), FieldValue::Text("NaN".into()));
    }

    #[test]
    fn test_field_value_set_semantics() {
        let set: BTreeSet<FieldValue> = [
            FieldValue::Number(0.0),
            FieldValue::Number(-0.0),
            FieldValue::Text("256".into()),
            FieldValue::Number(256.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 3);
        assert!(set.contains(&FieldValue::Number(256.0)));
        assert!(set.contains(&FieldValue::Text("256".into())));
        assert_eq!(FieldValue::Number(256.0).to_string(), "256");
    }
}
