//! Country names and tax-refund policy lookups.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "zh" => Ok(Language::Zh),
            _ => Err(anyhow::anyhow!("Invalid language: {}", s)),
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Zh => write!(f, "zh"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxInfo {
    pub can_refund: bool,
    /// Free text such as `"12%"`, `"5-8%"`, `"variable"` or `"N/A"`.
    pub refund_rate: String,
    #[serde(default)]
    pub notes: String,
}

impl TaxInfo {
    /// The first percentage in `refund_rate` as a fraction.
    pub fn refund_fraction(&self) -> Option<f64> {
        let rate = self.refund_rate.trim();
        if rate.is_empty() || rate == "N/A" || rate == "variable" {
            return None;
        }
        rate.match_indices('%').find_map(|(pos, _)| {
            let head = &rate[..pos];
            let start = head
                .char_indices()
                .rev()
                .take_while(|(_, c)| c.is_ascii_digit() || *c == '.')
                .last()
                .map_or(head.len(), |(i, _)| i);
            head[start..].parse::<f64>().ok().map(|pct| pct / 100.0)
        })
    }

    /// Refund expected on `price` (same currency as the price).
    pub fn estimated_refund(&self, price: f64) -> Option<f64> {
        self.refund_fraction().map(|fraction| price * fraction)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name_en: String,
    #[serde(default)]
    pub name_zh: Option<String>,
    #[serde(default)]
    pub name_local: Option<String>,
    #[serde(default)]
    pub tax_info: Option<TaxInfo>,
}

impl Country {
    pub fn translated_name(&self, language: Language) -> &str {
        match language {
            Language::Zh => self.name_zh.as_deref().unwrap_or(&self.name_en),
            Language::En => &self.name_en,
        }
    }

    /// `local (translated)`, or a single name when they coincide or no local
    /// name is known.
    pub fn display_name(&self, language: Language) -> String {
        let translated = self.translated_name(language);
        match self.name_local.as_deref() {
            Some(local) if local == translated => local.to_string(),
            Some(local) => format!("{local} ({translated})"),
            None => translated.to_string(),
        }
    }
}

/// Countries keyed by code.
#[derive(Debug, Clone, Default)]
pub struct CountryDirectory {
    countries: Vec<Country>,
    by_code: HashMap<String, usize>,
}

impl CountryDirectory {
    pub fn new(countries: Vec<Country>) -> Self {
        let by_code = countries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.code.clone(), i))
            .collect();
        Self { countries, by_code }
    }

    pub fn get(&self, code: &str) -> Option<&Country> {
        self.by_code.get(code).map(|&i| &self.countries[i])
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn tax_info(&self, code: &str) -> Option<&TaxInfo> {
        self.get(code).and_then(|c| c.tax_info.as_ref())
    }

    /// Display name for `code`; unknown codes are shown as-is.
    pub fn display_name(&self, code: &str, language: Language) -> String {
        self.get(code)
            .map_or_else(|| code.to_string(), |c| c.display_name(language))
    }
}
