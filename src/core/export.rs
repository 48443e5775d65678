use crate::core::kernel::Geometry;
use crate::domain::model::{Centroid, MergedBoundary};
use crate::utils::error::{AreaError, Result};
use geo::{Centroid as _, CoordsIter, MultiPolygon};

/// 合併結果轉成 GeoJSON 邊界並計算中心點
pub struct BoundaryExporter;

impl BoundaryExporter {
    pub fn to_boundary(geometry: &Geometry) -> Result<MergedBoundary> {
        if geometry.coords_iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(AreaError::ExportError {
                message: "geometry contains non-finite coordinates".to_string(),
            });
        }

        let shape = match geometry.0.as_slice() {
            [single] => geo::Geometry::Polygon(single.clone()),
            _ => geo::Geometry::MultiPolygon(geometry.clone()),
        };
        let json = serde_json::to_value(geojson::Geometry::new(geojson::Value::from(&shape)))?;
        Ok(serde_json::from_value(json)?)
    }

    pub fn from_boundary(boundary: &MergedBoundary) -> Result<Geometry> {
        let json = serde_json::json!({
            "type": boundary.kind,
            "coordinates": boundary.coordinates,
        });
        let parsed: geojson::Geometry = serde_json::from_value(json)?;
        let shape = geo::Geometry::<f64>::try_from(parsed).map_err(|e| AreaError::ExportError {
            message: e.to_string(),
        })?;

        match shape {
            geo::Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
            geo::Geometry::MultiPolygon(multi) => Ok(multi),
            other => Err(AreaError::ExportError {
                message: format!("unexpected boundary type {:?}", other),
            }),
        }
    }

    /// 面積加權中心；空幾何時為 None
    pub fn centroid(geometry: &Geometry) -> Option<Centroid> {
        geometry.centroid().map(|point| Centroid {
            latitude: point.y(),
            longitude: point.x(),
        })
    }
}
