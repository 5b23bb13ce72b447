//! Daily price bars and validated price series.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("bar dates must be strictly increasing ({previous} then {next})")]
    UnorderedDates { previous: NaiveDate, next: NaiveDate },

    #[error("negative price on {date}")]
    NegativePrice { date: NaiveDate },

    #[error("non-finite price on {date}")]
    NonFinitePrice { date: NaiveDate },
}

impl PriceBar {
    fn prices(&self) -> [f64; 4] {
        [self.open, self.high, self.low, self.close]
    }
}

/// Chronologically ordered daily bars, strictly increasing by date.
///
/// Never mutated after construction; derived indicator values are returned
/// separately by the calculators instead of being stored here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for bar in &bars {
            let prices = bar.prices();
            if prices.iter().any(|p| !p.is_finite()) {
                return Err(SeriesError::NonFinitePrice { date: bar.date });
            }
            if prices.iter().any(|p| *p < 0.0) {
                return Err(SeriesError::NegativePrice { date: bar.date });
            }
        }
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::UnorderedDates {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// The bar before the latest one.
    pub fn previous(&self) -> Option<&PriceBar> {
        self.bars.len().checked_sub(2).map(|i| &self.bars[i])
    }

    /// The trailing `n` bars (all of them when fewer exist).
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// (latest - previous) / previous * 100; absent with fewer than two bars
    /// or a zero previous close.
    pub fn day_change_percent(&self) -> Option<f64> {
        let latest = self.latest()?;
        let previous = self.previous()?;
        if previous.close == 0.0 {
            return None;
        }
        Some((latest.close - previous.close) / previous.close * 100.0)
    }
}
