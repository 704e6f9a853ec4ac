//! Derived feature columns.
//!
//! All derivations are row-wise arithmetic over columns already present in
//! the combined table; nothing is removed or reordered here.

use crate::data::{Column, RawTable};
use crate::types::{RatioPolicy, Result};

pub struct FeatureEngineer {
    policy: RatioPolicy,
}

impl FeatureEngineer {
    pub fn new(policy: RatioPolicy) -> Self {
        Self { policy }
    }

    /// Appends the derived columns:
    /// - `HasBasement`: "YES" when `TotalBsmtSF` is strictly positive
    /// - `RemodAge`: `YearRemodAdd - YearBuilt`
    /// - `LivingRate`: `(GrLivArea / LotArea) * OverallCond`
    /// - `FrontageRatio`: `LotFrontage / GrLivArea`
    /// - `RoomDensity`: `TotRmsAbvGrd / GrLivArea`
    /// - `BathRatio`: `FullBath / TotRmsAbvGrd`
    /// - `BedroomRatio`: `BedroomAbvGr / TotRmsAbvGrd`
    pub fn add_derived_features(&self, table: &mut RawTable) -> Result<()> {
        let bsmt = table.numeric("TotalBsmtSF")?;
        let has_basement: Vec<Option<String>> = bsmt
            .iter()
            .map(|cell| {
                let flag = matches!(cell, Some(v) if *v > 0.0);
                Some(if flag { "YES" } else { "NO" }.to_string())
            })
            .collect();

        let remod_age = self.zip_map(table, "YearRemodAdd", "YearBuilt", |a, b| a - b)?;
        let living_rate = {
            let ratio = self.zip_ratio(table, "GrLivArea", "LotArea")?;
            let cond = table.numeric("OverallCond")?;
            ratio
                .iter()
                .zip(cond.iter())
                .map(|(r, c)| match (r, c) {
                    (Some(r), Some(c)) => self.check(r * c),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };
        let frontage_ratio = self.zip_ratio(table, "LotFrontage", "GrLivArea")?;
        let room_density = self.zip_ratio(table, "TotRmsAbvGrd", "GrLivArea")?;
        let bath_ratio = self.zip_ratio(table, "FullBath", "TotRmsAbvGrd")?;
        let bedroom_ratio = self.zip_ratio(table, "BedroomAbvGr", "TotRmsAbvGrd")?;

        table.push_column("HasBasement", Column::Categorical(has_basement))?;
        table.push_column("RemodAge", Column::Numeric(remod_age))?;
        table.push_column("LivingRate", Column::Numeric(living_rate))?;
        table.push_column("FrontageRatio", Column::Numeric(frontage_ratio))?;
        table.push_column("RoomDensity", Column::Numeric(room_density))?;
        table.push_column("BathRatio", Column::Numeric(bath_ratio))?;
        table.push_column("BedroomRatio", Column::Numeric(bedroom_ratio))?;
        Ok(())
    }

    fn zip_map(
        &self,
        table: &RawTable,
        a: &str,
        b: &str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Vec<Option<f64>>> {
        let a = table.numeric(a)?;
        let b = table.numeric(b)?;
        Ok(a.iter()
            .zip(b.iter())
            .map(|(x, y)| match (x, y) {
                (Some(x), Some(y)) => self.check(f(*x, *y)),
                _ => None,
            })
            .collect())
    }

    fn zip_ratio(&self, table: &RawTable, num: &str, den: &str) -> Result<Vec<Option<f64>>> {
        self.zip_map(table, num, den, |n, d| n / d)
    }

    /// Applies the configured policy to a computed value.
    fn check(&self, value: f64) -> Option<f64> {
        match self.policy {
            RatioPolicy::Propagate => Some(value),
            RatioPolicy::NullInvalid => value.is_finite().then_some(value),
        }
    }
}
