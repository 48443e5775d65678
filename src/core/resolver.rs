use crate::domain::model::{AreaSpec, RegionCode, RegionFamily, Selector};
use crate::domain::regions;
use crate::utils::error::{AreaError, Result};
use std::collections::BTreeSet;

/// 單一郵遞區號範圍最多展開的代碼數
pub const MAX_RANGE_CODES: u64 = 1_000_000;

/// 某一族代碼的納入 / 排除集合 (兩者互斥)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeSets {
    pub include: BTreeSet<RegionCode>,
    pub exclude: BTreeSet<RegionCode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Include,
    Exclude,
}

impl CodeSets {
    /// 要向上游請求的代碼：include ∪ exclude
    pub fn fetch_set(&self) -> BTreeSet<RegionCode> {
        self.include.union(&self.exclude).cloned().collect()
    }

    pub fn classify(&self, code: &str) -> Option<Membership> {
        if self.exclude.contains(code) {
            Some(Membership::Exclude)
        } else if self.include.contains(code) {
            Some(Membership::Include)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    fn add(&mut self, code: RegionCode, include: bool) {
        if include {
            self.include.insert(code);
        } else {
            self.exclude.insert(code);
        }
    }

    // 同時出現在兩邊的代碼以排除為準
    fn settle(&mut self) {
        let exclude = &self.exclude;
        self.include.retain(|code| !exclude.contains(code));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArea {
    pub states: CodeSets,
    pub postal: CodeSets,
}

impl ResolvedArea {
    pub fn codes(&self, family: RegionFamily) -> &CodeSets {
        match family {
            RegionFamily::State => &self.states,
            RegionFamily::Postal => &self.postal,
        }
    }

    pub fn has_include_codes(&self) -> bool {
        !self.states.include.is_empty() || !self.postal.include.is_empty()
    }
}

/// 州代碼去空白並轉大寫，郵遞區號只去空白
pub fn normalize_code(family: RegionFamily, code: &str) -> RegionCode {
    match family {
        RegionFamily::State => code.trim().to_ascii_uppercase(),
        RegionFamily::Postal => code.trim().to_string(),
    }
}

/// 把區域的選擇條件展開成原子代碼集合
pub fn resolve(spec: &AreaSpec) -> Result<ResolvedArea> {
    let mut resolved = ResolvedArea::default();

    for selector in &spec.selectors {
        let include = selector.include();
        match selector {
            Selector::Country { code, .. } => {
                let states = regions::states_of(code);
                if states.is_empty() {
                    tracing::debug!("Unrecognized country {}, nothing to expand", code);
                }
                for state in states {
                    resolved.states.add((*state).to_string(), include);
                }
            }
            Selector::State { code, .. } => {
                resolved
                    .states
                    .add(normalize_code(RegionFamily::State, code), include);
            }
            Selector::PostalCode { code, .. } => {
                resolved
                    .postal
                    .add(normalize_code(RegionFamily::Postal, code), include);
            }
            Selector::PostalRange {
                start_range,
                end_range,
                ..
            } => {
                for code in expand_postal_range(start_range, end_range)? {
                    resolved.postal.add(code, include);
                }
            }
        }
    }

    resolved.states.settle();
    resolved.postal.settle();

    tracing::debug!(
        "Resolved area {}: states +{}/-{}, postal +{}/-{}",
        spec.id,
        resolved.states.include.len(),
        resolved.states.exclude.len(),
        resolved.postal.include.len(),
        resolved.postal.exclude.len()
    );

    Ok(resolved)
}

/// 閉區間展開，補零到原始代碼寬度
pub fn expand_postal_range(start: &str, end: &str) -> Result<Vec<RegionCode>> {
    let start = start.trim();
    let end = end.trim();
    let invalid = |reason: &str| AreaError::InvalidRangeError {
        start: start.to_string(),
        end: end.to_string(),
        reason: reason.to_string(),
    };

    let is_numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_numeric(start) || !is_numeric(end) {
        return Err(invalid("bounds must be non-empty and numeric"));
    }

    let low: u64 = start
        .parse()
        .map_err(|_| invalid("start bound out of range"))?;
    let high: u64 = end.parse().map_err(|_| invalid("end bound out of range"))?;
    if low > high {
        return Err(invalid("start is greater than end"));
    }
    if high - low >= MAX_RANGE_CODES {
        return Err(invalid(&format!(
            "range spans more than {} codes",
            MAX_RANGE_CODES
        )));
    }

    let width = start.len().max(end.len());
    Ok((low..=high)
        .map(|value| format!("{:0width$}", value, width = width))
        .collect())
}
