// ==========================================
// 采购建议引擎 - CSV 快照提供方
// ==========================================
// 职责: 表头 → Candidate 字段映射 + 类型转换
// 规则: 空单元格表示"缺失"，不是 0；
//       某一定价口径三列全部为空表示该口径不存在
// ==========================================

use crate::domain::candidate::{Candidate, UnitEconomics};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::provider::{read_snapshot, CandidateSnapshotProvider};
use async_trait::async_trait;
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, instrument};

pub struct CsvSnapshotProvider {
    path: PathBuf,
}

impl CsvSnapshotProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 解析 CSV 内容
    ///
    /// 含 supplier_id 列且请求了供应商时，只保留该供应商的行
    pub fn parse(content: &str, supplier_id: &str) -> ImportResult<Vec<Candidate>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut candidates = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            // 表头占第 1 行
            let row_number = idx + 2;

            let row: HashMap<&str, &str> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.as_str(), v))
                .collect();

            // 跳过完全空白的行
            if row.values().all(|v| v.is_empty()) {
                continue;
            }

            let mapper = RowMapper { row: &row, row_number };
            if !supplier_id.is_empty() {
                if let Some(found) = mapper.string("supplier_id") {
                    if found != supplier_id {
                        debug!(row = row_number, supplier_id = %found, "跳过其他供应商的行");
                        continue;
                    }
                }
            }
            candidates.push(mapper.to_candidate()?);
        }

        Ok(candidates)
    }
}

#[async_trait]
impl CandidateSnapshotProvider for CsvSnapshotProvider {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self, supplier_id: &str) -> ImportResult<Vec<Candidate>> {
        let content = read_snapshot(&self.path).await?;
        let candidates = Self::parse(&content, supplier_id)?;
        info!(count = candidates.len(), "CSV 快照加载完成");
        Ok(candidates)
    }
}

// ==========================================
// RowMapper - 单行字段映射
// ==========================================
struct RowMapper<'r> {
    row: &'r HashMap<&'r str, &'r str>,
    row_number: usize,
}

impl<'r> RowMapper<'r> {
    fn to_candidate(&self) -> ImportResult<Candidate> {
        let product_id = self
            .string("product_id")
            .ok_or(ImportError::PrimaryKeyMissing(self.row_number))?;

        Ok(Candidate {
            product_id,
            title: self.string("title").unwrap_or_default(),
            unit_cost: self.decimal("unit_cost")?,
            spot: self.economics("spot")?,
            trailing_average: self.economics("trailing")?,
            monthly_velocity: self.parse::<f64>("monthly_velocity")?,
            competitor_count: self.parse::<u32>("competitor_count")?,
            volatility_ratio: self.parse::<f64>("volatility_ratio")?,
            quality_signal: self.parse::<f64>("quality_signal")?,
            hazmat: self.flag("hazmat")?,
            brand_restricted: self.flag("brand_restricted")?,
            supplier_brand_restricted: self.flag("supplier_brand_restricted")?,
            pack_size: self.parse::<u32>("pack_size")?.unwrap_or(1),
            days_of_cover: self.parse::<f64>("days_of_cover")?,
        })
    }

    /// 非空字符串
    fn string(&self, key: &str) -> Option<String> {
        self.row
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    fn parse<T: FromStr>(&self, key: &str) -> ImportResult<Option<T>> {
        match self.string(key) {
            None => Ok(None),
            Some(value) => value.parse::<T>().map(Some).map_err(|_| ImportError::TypeConversionError {
                row: self.row_number,
                field: key.to_string(),
                message: format!("无法解析: {}", value),
            }),
        }
    }

    /// 金额（允许 $ 前缀与千分位逗号）
    fn decimal(&self, key: &str) -> ImportResult<Option<Decimal>> {
        match self.string(key) {
            None => Ok(None),
            Some(value) => {
                let cleaned: String = value.trim_start_matches('$').chars().filter(|c| *c != ',').collect();
                Decimal::from_str(&cleaned).map(Some).map_err(|_| ImportError::TypeConversionError {
                    row: self.row_number,
                    field: key.to_string(),
                    message: format!("无法解析为金额: {}", value),
                })
            }
        }
    }

    /// 布尔标记（空白为 false）
    fn flag(&self, key: &str) -> ImportResult<bool> {
        match self.string(key).map(|v| v.to_lowercase()) {
            None => Ok(false),
            Some(v) => match v.as_str() {
                "true" | "1" | "yes" | "y" => Ok(true),
                "false" | "0" | "no" | "n" => Ok(false),
                _ => Err(ImportError::TypeConversionError {
                    row: self.row_number,
                    field: key.to_string(),
                    message: format!("无法解析为布尔值: {}", v),
                }),
            },
        }
    }

    /// 某一定价口径的单位经济性: {prefix}_sell_price / {prefix}_net_profit / {prefix}_roi_pct
    fn economics(&self, prefix: &str) -> ImportResult<Option<UnitEconomics>> {
        let sell_price = self.decimal(&format!("{}_sell_price", prefix))?;
        let net_profit = self.decimal(&format!("{}_net_profit", prefix))?;
        let roi_pct = self.decimal(&format!("{}_roi_pct", prefix))?;

        match (sell_price, net_profit, roi_pct) {
            (None, None, None) => Ok(None),
            (Some(sell_price), Some(net_profit), Some(roi_pct)) => {
                Ok(Some(UnitEconomics { sell_price, net_profit, roi_pct }))
            }
            _ => Err(ImportError::FieldMappingError {
                row: self.row_number,
                message: format!("{} 定价口径的售价/净利/ROI 必须同时填写或同时留空", prefix),
            }),
        }
    }
}
