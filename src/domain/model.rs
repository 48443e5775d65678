use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type RegionCode = String;

fn default_include() -> bool {
    true
}

/// 單一地理選擇條件 (國家 / 州 / 郵遞區號 / 郵遞區號範圍)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Selector {
    Country {
        code: String,
        #[serde(default = "default_include")]
        include: bool,
    },
    State {
        code: String,
        #[serde(default)]
        country: Option<String>,
        #[serde(default = "default_include")]
        include: bool,
    },
    PostalCode {
        code: String,
        #[serde(default)]
        country: Option<String>,
        #[serde(default = "default_include")]
        include: bool,
    },
    #[serde(rename_all = "camelCase")]
    PostalRange {
        start_range: String,
        end_range: String,
        #[serde(default)]
        country: Option<String>,
        #[serde(default = "default_include")]
        include: bool,
    },
}

impl Selector {
    pub fn include(&self) -> bool {
        match self {
            Selector::Country { include, .. }
            | Selector::State { include, .. }
            | Selector::PostalCode { include, .. }
            | Selector::PostalRange { include, .. } => *include,
        }
    }

    pub fn family(&self) -> RegionFamily {
        match self {
            Selector::Country { .. } | Selector::State { .. } => RegionFamily::State,
            Selector::PostalCode { .. } | Selector::PostalRange { .. } => RegionFamily::Postal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSpec {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub selectors: Vec<Selector>,
}

impl AreaSpec {
    pub fn new(id: Uuid, selectors: Vec<Selector>) -> Self {
        Self {
            id,
            name: None,
            selectors,
        }
    }

    pub fn has_include_selectors(&self) -> bool {
        self.selectors.iter().any(Selector::include)
    }
}

/// 上游多邊形服務的端點分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionFamily {
    /// 州與國家 (國家會展開成州)
    State,
    /// 郵遞區號與郵遞區號範圍
    Postal,
}

impl std::fmt::Display for RegionFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionFamily::State => write!(f, "state"),
            RegionFamily::Postal => write!(f, "postal"),
        }
    }
}

/// 上游回傳的原始邊界 (WKT 文字)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPolygon {
    pub code: RegionCode,
    pub boundary: String,
}

impl RawPolygon {
    pub fn new(code: impl Into<String>, boundary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            boundary: boundary.into(),
        }
    }
}

/// GeoJSON 形式的合併邊界 (type + 巢狀座標)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedBoundary {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryRecord {
    pub id: Uuid,
    pub area_id: Uuid,
    #[serde(rename = "geometry")]
    pub boundary: Option<MergedBoundary>,
    #[serde(rename = "centerPoint")]
    pub centroid: Option<Centroid>,
    #[serde(rename = "createdAtDateTime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "processTime")]
    pub process_time_millis: u64,
    pub error_message: Option<String>,
}

impl BoundaryRecord {
    pub fn success(
        area_id: Uuid,
        boundary: MergedBoundary,
        centroid: Option<Centroid>,
        process_time_millis: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            area_id,
            boundary: Some(boundary),
            centroid,
            created_at: Utc::now(),
            process_time_millis,
            error_message: None,
        }
    }

    pub fn failure(area_id: Uuid, message: impl Into<String>, process_time_millis: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            area_id,
            boundary: None,
            centroid: None,
            created_at: Utc::now(),
            process_time_millis,
            error_message: Some(message.into()),
        }
    }

    /// 就地降級成錯誤紀錄 (邊界與中心點清空)
    pub fn downgrade(&mut self, message: impl Into<String>) {
        self.boundary = None;
        self.centroid = None;
        self.error_message = Some(message.into());
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}
