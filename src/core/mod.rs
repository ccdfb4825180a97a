pub mod comparer;
pub mod differ;
pub mod matcher;
pub mod report;

pub use crate::domain::model::{
    ComparisonReport, Discrepancy, Notice, ProjectQuotaSnapshot, ProjectRef, QuotaEntry,
    RegionQuotas,
};
pub use crate::domain::ports::{ProjectDirectory, QuotaSource};
pub use crate::utils::error::Result;
pub use differ::QuotaDiff;
