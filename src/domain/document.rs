//! 分組格式的區域文件 (countries / states / postalCodes / postalRanges)
//! 轉換成有序的 [`AreaSpec`]。

use crate::domain::model::{AreaSpec, Selector};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeName {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub include: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<CodeName>,
    #[serde(default)]
    pub include: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalCodeEntry {
    pub code: String,
    #[serde(default)]
    pub country: Option<CodeName>,
    #[serde(default)]
    pub include: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalRangeEntry {
    pub start_range: String,
    pub end_range: String,
    #[serde(default)]
    pub country: Option<CodeName>,
    #[serde(default)]
    pub include: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaDocument {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub countries: Vec<CountryEntry>,
    #[serde(default)]
    pub states: Vec<StateEntry>,
    #[serde(default)]
    pub postal_codes: Vec<PostalCodeEntry>,
    #[serde(default)]
    pub postal_ranges: Vec<PostalRangeEntry>,
}

fn country_code(country: &Option<CodeName>) -> Option<String> {
    country.as_ref().and_then(|c| c.code.clone())
}

impl From<AreaDocument> for AreaSpec {
    fn from(doc: AreaDocument) -> Self {
        let mut selectors = Vec::with_capacity(
            doc.countries.len() + doc.states.len() + doc.postal_codes.len() + doc.postal_ranges.len(),
        );

        // include 欄位缺省時視為納入
        selectors.extend(doc.countries.into_iter().map(|c| Selector::Country {
            code: c.code,
            include: c.include.unwrap_or(true),
        }));
        selectors.extend(doc.states.into_iter().map(|s| Selector::State {
            country: country_code(&s.country),
            code: s.code,
            include: s.include.unwrap_or(true),
        }));
        selectors.extend(doc.postal_codes.into_iter().map(|p| Selector::PostalCode {
            country: country_code(&p.country),
            code: p.code,
            include: p.include.unwrap_or(true),
        }));
        selectors.extend(doc.postal_ranges.into_iter().map(|r| Selector::PostalRange {
            country: country_code(&r.country),
            start_range: r.start_range,
            end_range: r.end_range,
            include: r.include.unwrap_or(true),
        }));

        AreaSpec {
            id: doc.id,
            name: doc.name,
            selectors,
        }
    }
}

/// 解析區域 JSON：含 `selectors` 的有序格式，或分組格式
pub fn parse_area(json: &str) -> Result<AreaSpec> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("selectors").is_some() {
        Ok(serde_json::from_value(value)?)
    } else {
        let doc: AreaDocument = serde_json::from_value(value)?;
        Ok(doc.into())
    }
}
