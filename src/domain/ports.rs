use crate::domain::model::{ProductFee, ProductMaxWeight, ProductThreshold};
use crate::domain::tables::ReferenceTables;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only view of the three fee schedules.
///
/// Implementations must return fees sorted by nominal weight, brackets sorted by
/// minimum weight and thresholds sorted by day boundary.
pub trait ReferenceData: Send + Sync {
    fn fees(&self) -> &[ProductFee];
    fn max_weights(&self) -> &[ProductMaxWeight];
    fn thresholds(&self) -> &[ProductThreshold];
}

impl<T: ReferenceData + ?Sized> ReferenceData for Arc<T> {
    fn fees(&self) -> &[ProductFee] {
        (**self).fees()
    }

    fn max_weights(&self) -> &[ProductMaxWeight] {
        (**self).max_weights()
    }

    fn thresholds(&self) -> &[ProductThreshold] {
        (**self).thresholds()
    }
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait TableLoader: Send + Sync {
    async fn load(&self) -> Result<ReferenceTables>;
}
