use crate::core::export::BoundaryExporter;
use crate::core::fetcher::{BatchFetcher, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY};
use crate::core::kernel::{GeoKernel, GeometryKernel};
use crate::core::merge::{MergeEngine, DEFAULT_PRECISION_SCALE};
use crate::core::resolver::{self, normalize_code, Membership};
use crate::domain::model::{
    AreaSpec, BoundaryRecord, Centroid, MergedBoundary, RawPolygon, RegionFamily,
};
use crate::domain::ports::{BoundaryStore, PolygonSource};
use crate::utils::error::{AreaError, Result};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSettings {
    pub batch_size: usize,
    pub concurrency: usize,
    pub precision_scale: u32,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            precision_scale: DEFAULT_PRECISION_SCALE,
        }
    }
}

struct MergedArea {
    boundary: MergedBoundary,
    centroid: Option<Centroid>,
}

/// 區域邊界合併服務：解析 → 取得 → 合併 → 匯出 → 儲存
pub struct AreaService<P: PolygonSource, S: BoundaryStore, K: GeometryKernel = GeoKernel> {
    source: P,
    store: S,
    fetcher: BatchFetcher,
    engine: MergeEngine<K>,
}

impl<P: PolygonSource, S: BoundaryStore> AreaService<P, S, GeoKernel> {
    pub fn new(source: P, store: S, settings: MergeSettings) -> Self {
        Self::with_kernel(source, store, GeoKernel, settings)
    }
}

impl<P: PolygonSource, S: BoundaryStore, K: GeometryKernel> AreaService<P, S, K> {
    pub fn with_kernel(source: P, store: S, kernel: K, settings: MergeSettings) -> Self {
        Self {
            source,
            store,
            fetcher: BatchFetcher::new(settings.batch_size, settings.concurrency),
            engine: MergeEngine::new(Arc::new(kernel), settings.precision_scale),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 合併區域邊界並寫入。永遠回傳終態紀錄 (成功或錯誤)；
    /// 沒有任何納入條件時刪除舊紀錄並回傳 None。
    pub async fn merge_area(&self, spec: &AreaSpec) -> Option<BoundaryRecord> {
        let started = Instant::now();
        tracing::info!(
            "🚀 Merging area {} ({} selectors)",
            spec.id,
            spec.selectors.len()
        );

        if !spec.has_include_selectors() {
            self.clear(spec.id, "no include selectors").await;
            return None;
        }

        let record = match self.run_pipeline(spec).await {
            Ok(Some(merged)) => {
                let record = BoundaryRecord::success(
                    spec.id,
                    merged.boundary,
                    merged.centroid,
                    elapsed_millis(started),
                );
                tracing::info!(
                    "✅ Area {} merged in {}ms",
                    spec.id,
                    record.process_time_millis
                );
                record
            }
            Ok(None) => {
                self.clear(spec.id, "include selectors resolved to no codes")
                    .await;
                return None;
            }
            Err(e) => {
                tracing::error!("❌ Merge failed for area {}: {}", spec.id, e);
                BoundaryRecord::failure(spec.id, e.to_string(), elapsed_millis(started))
            }
        };

        Some(self.persist(record).await)
    }

    async fn run_pipeline(&self, spec: &AreaSpec) -> Result<Option<MergedArea>> {
        let resolved = resolver::resolve(spec)?;
        if !resolved.has_include_codes() {
            return Ok(None);
        }

        let state_codes = resolved.states.fetch_set();
        let postal_codes = resolved.postal.fetch_set();
        let (states, postal) = tokio::join!(
            self.fetcher
                .fetch(&self.source, &state_codes, RegionFamily::State),
            self.fetcher
                .fetch(&self.source, &postal_codes, RegionFamily::Postal),
        );

        let mut include: Vec<RawPolygon> = Vec::new();
        let mut exclude: Vec<RawPolygon> = Vec::new();
        for (family, outcome) in [(RegionFamily::State, states), (RegionFamily::Postal, postal)] {
            let codes = resolved.codes(family);
            for polygon in outcome.polygons {
                match codes.classify(&normalize_code(family, &polygon.code)) {
                    Some(Membership::Include) => include.push(polygon),
                    Some(Membership::Exclude) => exclude.push(polygon),
                    None => tracing::debug!(
                        "Ignoring unrequested {} polygon {}",
                        family,
                        polygon.code
                    ),
                }
            }
        }

        tracing::info!(
            "📦 Area {}: {} include / {} exclude polygons",
            spec.id,
            include.len(),
            exclude.len()
        );
        if include.is_empty() {
            return Err(AreaError::NoGeometryError);
        }

        let engine = self.engine.clone();
        let merged = tokio::task::spawn_blocking(move || engine.merge(&include, &exclude))
            .await
            .map_err(|e| AreaError::TaskError {
                message: e.to_string(),
            })??;

        Ok(Some(MergedArea {
            boundary: BoundaryExporter::to_boundary(&merged)?,
            centroid: BoundaryExporter::centroid(&merged),
        }))
    }

    async fn persist(&self, mut record: BoundaryRecord) -> BoundaryRecord {
        let first = match self.store.replace(&record).await {
            Ok(()) => return record,
            Err(e) => e,
        };

        tracing::warn!(
            "⚠️ Failed to store boundary for area {}: {}, retrying as error record",
            record.area_id,
            first
        );
        record.downgrade(format!("Failed to persist boundary: {}", first));

        if let Err(e) = self.store.replace(&record).await {
            tracing::error!(
                "❌ Retry write for area {} failed, no record stored: {}",
                record.area_id,
                e
            );
        }
        record
    }

    async fn clear(&self, area_id: Uuid, reason: &str) {
        tracing::info!("🧹 Area {}: {}, removing stored boundary", area_id, reason);
        if let Err(e) = self.store.delete_by_area_id(area_id).await {
            tracing::warn!("⚠️ Failed to remove boundary for area {}: {}", area_id, e);
        }
    }

    pub async fn delete_area(&self, area_id: Uuid) -> Result<()> {
        self.store.delete_by_area_id(area_id).await
    }

    pub async fn get_record(&self, area_id: Uuid) -> Result<Option<BoundaryRecord>> {
        self.store.find_by_area_id(area_id).await
    }

    pub async fn get_boundary(&self, area_id: Uuid) -> Result<Option<MergedBoundary>> {
        Ok(self.get_record(area_id).await?.and_then(|r| r.boundary))
    }

    pub async fn get_centroid(&self, area_id: Uuid) -> Result<Option<Centroid>> {
        Ok(self.get_record(area_id).await?.and_then(|r| r.centroid))
    }
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
