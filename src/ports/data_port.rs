//! Price source port trait.

use crate::domain::error::SmaCrossError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

/// Supplies deduplicated, gap-free closing prices for one instrument over
/// an inclusive date range.
pub trait PriceSource {
    fn fetch_prices(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SmaCrossError>;

    fn list_codes(&self) -> Result<Vec<String>, SmaCrossError>;
}
