//! 幾何核心：WKT 解析、有效性檢查、修復與布林運算。
//!
//! 精確的多邊形裁剪交給 `geo` (BooleanOps)，這裡只定義合併流程需要的契約。

use crate::utils::error::{AreaError, Result};
use geo::{BooleanOps, Coord, MapCoords, MultiPolygon, RemoveRepeatedPoints, Validation};
use wkt::TryFromWkt;

/// 合併流程中使用的多邊形值 (單一區域也以 MultiPolygon 表示)
pub type Geometry = MultiPolygon<f64>;

pub trait GeometryKernel: Send + Sync + 'static {
    /// 解析上游的邊界文字；格式錯誤或非多邊形時回傳 `ParseError`
    fn parse(&self, code: &str, text: &str) -> Result<Geometry>;

    fn is_valid(&self, geometry: &Geometry) -> bool;

    /// 盡力修復自相交 / 退化的幾何，結果仍可能無效
    fn repair(&self, geometry: Geometry) -> Geometry;

    fn union(&self, a: &Geometry, b: &Geometry) -> Geometry;

    fn difference(&self, a: &Geometry, b: &Geometry) -> Geometry;

    /// 將所有座標對齊到 10^-scale 的格點
    fn reduce_precision(&self, geometry: &Geometry, scale: u32) -> Geometry;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeoKernel;

impl GeometryKernel for GeoKernel {
    fn parse(&self, code: &str, text: &str) -> Result<Geometry> {
        let parsed = geo::Geometry::<f64>::try_from_wkt_str(text).map_err(|e| {
            AreaError::ParseError {
                code: code.to_string(),
                message: e.to_string(),
            }
        })?;

        into_polygonal(parsed).ok_or_else(|| AreaError::ParseError {
            code: code.to_string(),
            message: "boundary is not polygonal".to_string(),
        })
    }

    fn is_valid(&self, geometry: &Geometry) -> bool {
        geometry.is_valid()
    }

    fn repair(&self, geometry: Geometry) -> Geometry {
        // 與空集合做 overlay 會重新建立環，等同 0 距離 buffer
        geometry.union(&MultiPolygon::new(Vec::new()))
    }

    fn union(&self, a: &Geometry, b: &Geometry) -> Geometry {
        a.union(b)
    }

    fn difference(&self, a: &Geometry, b: &Geometry) -> Geometry {
        a.difference(b)
    }

    fn reduce_precision(&self, geometry: &Geometry, scale: u32) -> Geometry {
        let factor = 10f64.powi(scale as i32);
        // + 0.0 把 -0.0 正規化成 0.0
        let snap = |v: f64| (v * factor).round() / factor + 0.0;
        geometry
            .map_coords(|c| Coord {
                x: snap(c.x),
                y: snap(c.y),
            })
            .remove_repeated_points()
    }
}

fn into_polygonal(geometry: geo::Geometry<f64>) -> Option<Geometry> {
    match geometry {
        geo::Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon])),
        geo::Geometry::MultiPolygon(multi) => Some(multi),
        geo::Geometry::Rect(rect) => Some(MultiPolygon::new(vec![rect.to_polygon()])),
        geo::Geometry::GeometryCollection(collection) => {
            let mut polygons = Vec::new();
            for member in collection.0 {
                polygons.extend(into_polygonal(member)?.0);
            }
            Some(MultiPolygon::new(polygons))
        }
        _ => None,
    }
}
