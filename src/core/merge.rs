use crate::core::kernel::{Geometry, GeometryKernel};
use crate::domain::model::RawPolygon;
use crate::utils::error::Result;
use geo::MultiPolygon;
use rayon::prelude::*;
use std::sync::Arc;

pub const DEFAULT_PRECISION_SCALE: u32 = 3;

/// 平行的 union / difference 合併引擎
pub struct MergeEngine<K: GeometryKernel> {
    kernel: Arc<K>,
    precision_scale: u32,
}

impl<K: GeometryKernel> Clone for MergeEngine<K> {
    fn clone(&self) -> Self {
        Self {
            kernel: Arc::clone(&self.kernel),
            precision_scale: self.precision_scale,
        }
    }
}

impl<K: GeometryKernel> MergeEngine<K> {
    pub fn new(kernel: Arc<K>, precision_scale: u32) -> Self {
        Self {
            kernel,
            precision_scale,
        }
    }

    /// 解析並修復所有原始多邊形；任何一筆解析失敗都會讓整個合併失敗
    pub fn prepare(&self, polygons: &[RawPolygon]) -> Result<Vec<Geometry>> {
        polygons
            .par_iter()
            .map(|raw| {
                let geometry = self.kernel.parse(&raw.code, &raw.boundary)?;
                Ok(self.ensure_valid(&raw.code, geometry))
            })
            .collect()
    }

    /// 無效時修復一次；修復後仍無效就照用並記錄警告
    pub fn ensure_valid(&self, label: &str, geometry: Geometry) -> Geometry {
        if self.kernel.is_valid(&geometry) {
            return geometry;
        }

        let repaired = self.kernel.repair(geometry);
        if self.kernel.is_valid(&repaired) {
            tracing::debug!("🔧 Repaired invalid geometry for {}", label);
        } else {
            tracing::warn!(
                "⚠️ Geometry for {} is still invalid after repair, using it anyway",
                label
            );
        }
        repaired
    }

    /// 平衡二分的 union 歸約；多塊結果再做一次 0 距離 overlay
    pub fn union_all(&self, geometries: Vec<Geometry>) -> Geometry {
        let merged = reduce(self.kernel.as_ref(), geometries);
        if merged.0.len() > 1 {
            self.kernel.repair(merged)
        } else {
            merged
        }
    }

    pub fn merge(&self, include: &[RawPolygon], exclude: &[RawPolygon]) -> Result<Geometry> {
        let include_geometry = self.union_all(self.prepare(include)?);
        tracing::debug!(
            "Union of {} included polygons produced {} parts",
            include.len(),
            include_geometry.0.len()
        );

        let result = if exclude.is_empty() {
            include_geometry
        } else {
            let exclude_geometry = self.union_all(self.prepare(exclude)?);
            let difference = self.kernel.difference(&include_geometry, &exclude_geometry);
            self.ensure_valid("difference", difference)
        };

        let reduced = self.kernel.reduce_precision(&result, self.precision_scale);
        Ok(self.ensure_valid("precision-reduced result", reduced))
    }
}

// 左半邊交給 rayon 偷取，呼叫端同步計算右半邊，兩邊都完成後才合併
fn reduce<K: GeometryKernel>(kernel: &K, mut geometries: Vec<Geometry>) -> Geometry {
    match geometries.len() {
        0 => MultiPolygon::new(Vec::new()),
        1 => geometries.remove(0),
        2 => kernel.union(&geometries[0], &geometries[1]),
        n => {
            let right = geometries.split_off(n / 2);
            let (right, left) = rayon::join(|| reduce(kernel, right), || reduce(kernel, geometries));
            kernel.union(&left, &right)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::GeoKernel;
    use crate::utils::error::AreaError;
    use geo::{Area, BooleanOps};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn square(code: &str, x: f64, y: f64, size: f64) -> RawPolygon {
        RawPolygon::new(
            code,
            format!(
                "POLYGON(({x0} {y0},{x1} {y0},{x1} {y1},{x0} {y1},{x0} {y0}))",
                x0 = x,
                y0 = y,
                x1 = x + size,
                y1 = y + size
            ),
        )
    }

    fn engine() -> MergeEngine<GeoKernel> {
        MergeEngine::new(Arc::new(GeoKernel), DEFAULT_PRECISION_SCALE)
    }

    /// 計算 union 次數的核心
    #[derive(Default)]
    struct CountingKernel {
        unions: AtomicUsize,
    }

    impl GeometryKernel for CountingKernel {
        fn parse(&self, code: &str, text: &str) -> Result<Geometry> {
            GeoKernel.parse(code, text)
        }
        fn is_valid(&self, geometry: &Geometry) -> bool {
            GeoKernel.is_valid(geometry)
        }
        fn repair(&self, geometry: Geometry) -> Geometry {
            GeoKernel.repair(geometry)
        }
        fn union(&self, a: &Geometry, b: &Geometry) -> Geometry {
            self.unions.fetch_add(1, Ordering::SeqCst);
            GeoKernel.union(a, b)
        }
        fn difference(&self, a: &Geometry, b: &Geometry) -> Geometry {
            GeoKernel.difference(a, b)
        }
        fn reduce_precision(&self, geometry: &Geometry, scale: u32) -> Geometry {
            GeoKernel.reduce_precision(geometry, scale)
        }
    }

    #[test]
    fn test_union_all_single_geometry_is_unchanged() {
        let engine = engine();
        let geometries = engine.prepare(&[square("A", 0.0, 0.0, 1.0)]).unwrap();
        let expected = geometries[0].clone();

        assert_eq!(engine.union_all(geometries), expected);
    }

    #[test]
    fn test_union_all_grid_of_squares() {
        let engine = engine();
        let raw: Vec<RawPolygon> = (0..9)
            .map(|i| square(&format!("{:05}", i), (i % 3) as f64, (i / 3) as f64, 1.0))
            .collect();

        let merged = engine.union_all(engine.prepare(&raw).unwrap());
        assert!((merged.unsigned_area() - 9.0).abs() < 1e-9);
        assert_eq!(merged.0.len(), 1);
    }

    #[test]
    fn test_union_all_performs_linear_number_of_unions() {
        let kernel = Arc::new(CountingKernel::default());
        let engine = MergeEngine::new(Arc::clone(&kernel), DEFAULT_PRECISION_SCALE);
        let raw: Vec<RawPolygon> = (0..7)
            .map(|i| square(&i.to_string(), i as f64 * 2.0, 0.0, 1.0))
            .collect();

        let merged = engine.union_all(engine.prepare(&raw).unwrap());

        assert_eq!(kernel.unions.load(Ordering::SeqCst), 6);
        assert!((merged.unsigned_area() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_is_order_independent() {
        let engine = engine();
        let raw: Vec<RawPolygon> = (0..6)
            .map(|i| square(&i.to_string(), i as f64 * 0.5, (i % 2) as f64 * 0.5, 1.0))
            .collect();
        let mut reversed = raw.clone();
        reversed.reverse();

        let forward = engine.merge(&raw, &[]).unwrap();
        let backward = engine.merge(&reversed, &[]).unwrap();

        let xor_area = forward.xor(&backward).unsigned_area();
        assert!(xor_area < 1e-9);
    }

    #[test]
    fn test_merge_subtracts_excluded_area() {
        let engine = engine();
        let include = vec![square("A", 0.0, 0.0, 1.0), square("B", 1.0, 0.0, 1.0)];
        let exclude = vec![square("B", 1.0, 0.0, 1.0)];

        let full = engine.merge(&include, &[]).unwrap();
        let reduced = engine.merge(&include, &exclude).unwrap();

        assert!((full.unsigned_area() - 2.0).abs() < 1e-9);
        assert!((reduced.unsigned_area() - 1.0).abs() < 1e-9);
        assert!(reduced.difference(&full).unsigned_area() < 1e-9);
    }

    #[test]
    fn test_merge_fails_on_unparseable_boundary() {
        let engine = engine();
        let include = vec![square("A", 0.0, 0.0, 1.0), RawPolygon::new("B", "POLYGON((")];

        assert!(matches!(
            engine.merge(&include, &[]),
            Err(AreaError::ParseError { code, .. }) if code == "B"
        ));
    }

    #[test]
    fn test_merge_repairs_invalid_input() {
        let engine = engine();
        let include = vec![RawPolygon::new("NV", "POLYGON((0 0,2 2,2 0,0 2,0 0))")];

        let merged = engine.merge(&include, &[]).unwrap();
        assert!((merged.unsigned_area() - 2.0).abs() < 1e-9);
    }

    /// 永遠判定無效、修復不做任何事的核心
    #[derive(Default)]
    struct NeverValidKernel {
        repairs: AtomicUsize,
    }

    impl GeometryKernel for NeverValidKernel {
        fn parse(&self, code: &str, text: &str) -> Result<Geometry> {
            GeoKernel.parse(code, text)
        }
        fn is_valid(&self, _geometry: &Geometry) -> bool {
            false
        }
        fn repair(&self, geometry: Geometry) -> Geometry {
            self.repairs.fetch_add(1, Ordering::SeqCst);
            geometry
        }
        fn union(&self, a: &Geometry, b: &Geometry) -> Geometry {
            GeoKernel.union(a, b)
        }
        fn difference(&self, a: &Geometry, b: &Geometry) -> Geometry {
            GeoKernel.difference(a, b)
        }
        fn reduce_precision(&self, geometry: &Geometry, scale: u32) -> Geometry {
            GeoKernel.reduce_precision(geometry, scale)
        }
    }

    /// 對齊格點後產生自相交 (bowtie) 的核心，其餘交給 GeoKernel
    #[derive(Default)]
    struct SnapBreakingKernel {
        repairs: AtomicUsize,
    }

    impl GeometryKernel for SnapBreakingKernel {
        fn parse(&self, code: &str, text: &str) -> Result<Geometry> {
            GeoKernel.parse(code, text)
        }
        fn is_valid(&self, geometry: &Geometry) -> bool {
            GeoKernel.is_valid(geometry)
        }
        fn repair(&self, geometry: Geometry) -> Geometry {
            self.repairs.fetch_add(1, Ordering::SeqCst);
            GeoKernel.repair(geometry)
        }
        fn union(&self, a: &Geometry, b: &Geometry) -> Geometry {
            GeoKernel.union(a, b)
        }
        fn difference(&self, a: &Geometry, b: &Geometry) -> Geometry {
            GeoKernel.difference(a, b)
        }
        fn reduce_precision(&self, _geometry: &Geometry, _scale: u32) -> Geometry {
            GeoKernel
                .parse("snapped", "POLYGON((0 0,2 2,2 0,0 2,0 0))")
                .unwrap()
        }
    }

    #[test]
    fn test_merge_uses_geometry_that_stays_invalid_after_repair() {
        let kernel = Arc::new(NeverValidKernel::default());
        let engine = MergeEngine::new(Arc::clone(&kernel), DEFAULT_PRECISION_SCALE);

        let merged = engine.merge(&[square("CA", 0.0, 0.0, 1.0)], &[]).unwrap();

        assert!((merged.unsigned_area() - 1.0).abs() < 1e-9);
        // parse 階段一次，精度對齊後一次
        assert_eq!(kernel.repairs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_merge_repairs_geometry_broken_by_precision_reduction() {
        let kernel = Arc::new(SnapBreakingKernel::default());
        let engine = MergeEngine::new(Arc::clone(&kernel), DEFAULT_PRECISION_SCALE);

        let merged = engine.merge(&[square("CA", 0.0, 0.0, 1.0)], &[]).unwrap();

        assert_eq!(kernel.repairs.load(Ordering::SeqCst), 1);
        assert!((merged.unsigned_area() - 2.0).abs() < 1e-9);
    }
}
