use crate::domain::model::{RawPolygon, RegionCode, RegionFamily};
use crate::domain::ports::PolygonSource;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_CONCURRENCY: usize = 15;

#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub polygons: Vec<RawPolygon>,
    pub requested_batches: usize,
    pub failed_batches: usize,
}

/// 分批並發向上游取得多邊形。單一批次失敗只會讓該批結果為空。
#[derive(Debug, Clone, Copy)]
pub struct BatchFetcher {
    batch_size: usize,
    concurrency: usize,
}

impl Default for BatchFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY)
    }
}

impl BatchFetcher {
    pub fn new(batch_size: usize, concurrency: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            concurrency: concurrency.max(1),
        }
    }

    pub async fn fetch<P: PolygonSource + ?Sized>(
        &self,
        source: &P,
        codes: &BTreeSet<RegionCode>,
        family: RegionFamily,
    ) -> FetchOutcome {
        if codes.is_empty() {
            return FetchOutcome::default();
        }

        match family {
            // 州代碼數量有限，單次呼叫
            RegionFamily::State => {
                let codes: Vec<RegionCode> = codes.iter().cloned().collect();
                let (polygons, failed) = fetch_batch(source, 0, &codes, family).await;
                FetchOutcome {
                    polygons,
                    requested_batches: 1,
                    failed_batches: usize::from(failed),
                }
            }
            RegionFamily::Postal => self.fetch_batched(source, codes, family).await,
        }
    }

    async fn fetch_batched<P: PolygonSource + ?Sized>(
        &self,
        source: &P,
        codes: &BTreeSet<RegionCode>,
        family: RegionFamily,
    ) -> FetchOutcome {
        let codes: Vec<RegionCode> = codes.iter().cloned().collect();
        let batches: Vec<Vec<RegionCode>> =
            codes.chunks(self.batch_size).map(<[_]>::to_vec).collect();
        let requested_batches = batches.len();

        tracing::info!(
            "📡 Fetching {} {} codes in {} batches (concurrency {})",
            codes.len(),
            family,
            requested_batches,
            self.concurrency
        );

        let results: Vec<(Vec<RawPolygon>, bool)> = stream::iter(batches.into_iter().enumerate())
            .map(|(index, batch)| async move { fetch_batch(source, index, &batch, family).await })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut outcome = FetchOutcome {
            requested_batches,
            ..FetchOutcome::default()
        };
        for (polygons, failed) in results {
            outcome.polygons.extend(polygons);
            outcome.failed_batches += usize::from(failed);
        }

        if outcome.failed_batches > 0 {
            tracing::warn!(
                "⚠️ {}/{} {} batches failed, continuing with partial data",
                outcome.failed_batches,
                requested_batches,
                family
            );
        }

        outcome
    }
}

async fn fetch_batch<P: PolygonSource + ?Sized>(
    source: &P,
    index: usize,
    codes: &[RegionCode],
    family: RegionFamily,
) -> (Vec<RawPolygon>, bool) {
    match source.fetch_by_codes(codes, family).await {
        Ok(polygons) => {
            tracing::debug!(
                "Batch {} ({}): {} codes requested, {} polygons returned",
                index,
                family,
                codes.len(),
                polygons.len()
            );
            (polygons, false)
        }
        // 批次失敗一律以空結果收場；非網路類錯誤多半是上游格式問題，提高日誌等級
        Err(e) if e.is_recoverable() => {
            tracing::warn!("❌ Batch {} ({}) failed: {}", index, family, e);
            (Vec::new(), true)
        }
        Err(e) => {
            tracing::error!(
                "❌ Batch {} ({}) failed with unexpected error: {}",
                index,
                family,
                e
            );
            (Vec::new(), true)
        }
    }
}
