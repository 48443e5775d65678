use crate::domain::model::{BoundaryRecord, RawPolygon, RegionCode, RegionFamily};
use crate::utils::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// 上游多邊形提供者。回傳數量可能少於請求的代碼數，缺少的代碼直接不出現。
#[async_trait]
pub trait PolygonSource: Send + Sync {
    async fn fetch_by_codes(
        &self,
        codes: &[RegionCode],
        family: RegionFamily,
    ) -> Result<Vec<RawPolygon>>;
}

/// 每個 area id 只保留一筆目前的紀錄
pub trait BoundaryStore: Send + Sync {
    fn insert(
        &self,
        record: &BoundaryRecord,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn find_by_area_id(
        &self,
        area_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<BoundaryRecord>>> + Send;

    fn delete_by_area_id(&self, area_id: Uuid)
        -> impl std::future::Future<Output = Result<()>> + Send;

    /// 先刪後寫。兩步之間不具原子性：中途失敗時該 area 可能暫時沒有紀錄。
    fn replace(
        &self,
        record: &BoundaryRecord,
    ) -> impl std::future::Future<Output = Result<()>> + Send {
        async move {
            self.delete_by_area_id(record.area_id).await?;
            self.insert(record).await
        }
    }
}
