use crate::domain::model::{ProductFee, ProductMaxWeight, ProductThreshold};
use crate::domain::ports::{Storage, TableLoader};
use crate::domain::tables::ReferenceTables;
use crate::utils::error::{FeeError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// File names of the three schedules, relative to the storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFiles {
    pub fees: String,
    pub max_weights: String,
    pub thresholds: String,
}

impl Default for TableFiles {
    fn default() -> Self {
        Self {
            fees: "product_fees.csv".to_string(),
            max_weights: "max_weights.csv".to_string(),
            thresholds: "thresholds.csv".to_string(),
        }
    }
}

pub fn parse_table<T: DeserializeOwned>(table: &str, bytes: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let rows = reader
        .deserialize()
        .enumerate()
        .map(|(index, row)| {
            // header is line 1
            row.map_err(|e| FeeError::reference_data(table, format!("row {}: {}", index + 2, e)))
        })
        .collect::<Result<Vec<T>>>()?;
    Ok(rows)
}

pub fn parse_tables(fees: &[u8], max_weights: &[u8], thresholds: &[u8]) -> Result<ReferenceTables> {
    let fees: Vec<ProductFee> = parse_table("product_fees", fees)?;
    let max_weights: Vec<ProductMaxWeight> = parse_table("max_weights", max_weights)?;
    let thresholds: Vec<ProductThreshold> = parse_table("thresholds", thresholds)?;
    ReferenceTables::new(fees, max_weights, thresholds)
}

/// Serializes `rows` with a header line and stores them at `path`.
pub async fn write_rows<S, T>(storage: &S, path: &str, rows: &[T]) -> Result<usize>
where
    S: Storage,
    T: Serialize,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let data = writer.into_inner().map_err(|e| FeeError::IoError(e.into_error()))?;

    storage.write_file(path, &data).await?;
    tracing::debug!("Wrote {} rows ({} bytes) to {}", rows.len(), data.len(), path);
    Ok(rows.len())
}

pub struct CsvTableLoader<S: Storage> {
    storage: S,
    files: TableFiles,
}

impl<S: Storage> CsvTableLoader<S> {
    pub fn new(storage: S, files: TableFiles) -> Self {
        Self { storage, files }
    }
}

#[async_trait]
impl<S: Storage> TableLoader for CsvTableLoader<S> {
    async fn load(&self) -> Result<ReferenceTables> {
        tracing::info!(
            "Loading fee schedules: {}, {}, {}",
            self.files.fees,
            self.files.max_weights,
            self.files.thresholds
        );

        let fees = self.storage.read_file(&self.files.fees).await?;
        let max_weights = self.storage.read_file(&self.files.max_weights).await?;
        let thresholds = self.storage.read_file(&self.files.thresholds).await?;

        let tables = parse_tables(&fees, &max_weights, &thresholds)?;
        tracing::info!("Fee schedules loaded and validated");
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ReferenceData;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &str) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.as_bytes().to_vec());
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                FeeError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    const FEES: &str = "plc_name,plc_code,weight_limit,weight,girth_threshold,local_order_fee,local_return_fee,cross_border_order_fee,cross_border_return_fee,removal_fee,disposal_fee
Heavy,H,> 1 kg,5,300,4.00,3.00,5.00,4.00,1.00,1.00
Light,L,<= 1 kg,1,100,2.00,1.50,3.00,2.50,0.50,0.25
";
    const BRACKETS: &str = "plc_name,min_weight,max_weight,local_order_fee
Light,0,1,2.00
Heavy,1,,4.00
";
    const THRESHOLDS: &str = "period,day_threshold,fee_per_cbm_per_day,random_threshold
Standard,30,0.40,0.01
Long,,0.90,0.02
";

    #[tokio::test]
    async fn test_loader_reads_and_sorts_tables() {
        let storage = MockStorage::new();
        storage.put("product_fees.csv", FEES).await;
        storage.put("max_weights.csv", BRACKETS).await;
        storage.put("thresholds.csv", THRESHOLDS).await;

        let loader = CsvTableLoader::new(storage, TableFiles::default());
        let tables = loader.load().await.unwrap();

        assert_eq!(tables.fees()[0].plc_code, "L");
        assert_eq!(tables.fees()[1].local_order_fee, dec!(4.00));
        assert_eq!(tables.max_weights()[1].max_weight, None);
        assert_eq!(tables.thresholds()[0].day_threshold, Some(30));
        assert_eq!(tables.thresholds()[1].day_threshold, None);
    }

    #[tokio::test]
    async fn test_loader_reports_missing_file() {
        let storage = MockStorage::new();
        storage.put("product_fees.csv", FEES).await;

        let loader = CsvTableLoader::new(storage, TableFiles::default());
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, FeeError::IoError(_)));
    }

    #[derive(Serialize)]
    struct Quote {
        line: usize,
        total: String,
    }

    #[tokio::test]
    async fn test_write_rows_goes_through_storage() {
        let storage = MockStorage::new();
        let rows = vec![
            Quote { line: 2, total: "1.8100".to_string() },
            Quote { line: 3, total: "2.6000".to_string() },
        ];

        let written = write_rows(&storage, "out/quotes.csv", &rows).await.unwrap();
        assert_eq!(written, 2);

        let data = storage.read_file("out/quotes.csv").await.unwrap();
        assert_eq!(String::from_utf8(data).unwrap(), "line,total\n2,1.8100\n3,2.6000\n");
    }

    #[test]
    fn test_parse_error_names_table_and_row() {
        let bad = "plc_name,min_weight,max_weight,local_order_fee
Light,0,1,2.00
Heavy,one,,4.00
";
        let err = parse_table::<ProductMaxWeight>("max_weights", bad.as_bytes()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("max_weights"));
        assert!(message.contains("row 3"));
    }
}
