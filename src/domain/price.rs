//! Daily closing-price series.

use chrono::NaiveDate;

use super::error::SmaCrossError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Ordered, gap-free closing prices for a single instrument.
///
/// Dates are strictly increasing and every close is a finite positive
/// number. The series is immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SmaCrossError> {
        for (i, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(SmaCrossError::InvalidPriceSeries {
                    reason: format!("close on {} must be finite and positive", point.date),
                });
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(SmaCrossError::InvalidPriceSeries {
                    reason: format!(
                        "dates must be strictly increasing ({} follows {})",
                        point.date,
                        points[i - 1].date
                    ),
                });
            }
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn date(&self, index: usize) -> NaiveDate {
        self.points[index].date
    }

    pub fn close(&self, index: usize) -> f64 {
        self.points[index].close
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}
