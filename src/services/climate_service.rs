//! Yearly and seasonal climate table of a station.
//!
//! # Seasons
//!
//! Meteorological seasons are three-month blocks. The December–February
//! block of year `Y` uses December of `Y - 1`. The mapping of blocks to
//! season names depends on the hemisphere:
//!
//! | Months  | Northern | Southern |
//! |---------|----------|----------|
//! | Dec–Feb | winter   | summer   |
//! | Mar–May | spring   | autumn   |
//! | Jun–Aug | summer   | winter   |
//! | Sep–Nov | autumn   | spring   |

use crate::{
    error::AppError,
    models::{
        climate::{ChartSeries, ClimateResponse, ClimateRow},
        observation::{MonthlyAverage, YearlyAverage},
        station::Station,
    },
    services::{
        cache_service::StationCache,
        processing_service::Mean,
        search_service::YearRange,
    },
};
use std::collections::{BTreeMap, BTreeSet};

/// Three-month block of a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    DecFeb,
    MarMay,
    JunAug,
    SepNov,
}

impl Block {
    fn months(self) -> &'static [u32] {
        match self {
            Block::DecFeb => &[1, 2],
            Block::MarMay => &[3, 4, 5],
            Block::JunAug => &[6, 7, 8],
            Block::SepNov => &[9, 10, 11],
        }
    }
}

/// `(min, max)` mean of a set of monthly rows.
#[derive(Debug, Default, Clone, Copy)]
struct SeasonMeans {
    min: Option<f64>,
    max: Option<f64>,
}

fn block_means(
    by_month: &BTreeMap<(i32, u32), &MonthlyAverage>,
    year: i32,
    block: Block,
) -> SeasonMeans {
    let mut rows: Vec<&MonthlyAverage> = Vec::new();
    if block == Block::DecFeb {
        if let Some(december) = by_month.get(&(year - 1, 12)) {
            rows.push(*december);
        }
    }
    rows.extend(block.months().iter().filter_map(|m| by_month.get(&(year, *m)).copied()));

    let (mut min, mut max) = (Mean::default(), Mean::default());
    for row in rows {
        min.push(row.tmin);
        max.push(row.tmax);
    }
    SeasonMeans {
        min: min.rounded(),
        max: max.rounded(),
    }
}

/// Build climate rows for every year present in `monthly` within `years`.
///
/// Only monthly rows inside the range are used, so the winter of the
/// first year lacks the preceding December. Yearly min/max are looked up
/// in `yearly`.
pub fn seasonal_rows(
    monthly: &[MonthlyAverage],
    yearly: &[YearlyAverage],
    years: YearRange,
    northern: bool,
) -> Vec<ClimateRow> {
    let by_month: BTreeMap<(i32, u32), &MonthlyAverage> = monthly
        .iter()
        .filter(|row| years.contains(row.year))
        .map(|row| ((row.year, row.month), row))
        .collect();
    let present: BTreeSet<i32> = by_month.keys().map(|(year, _)| *year).collect();
    let by_year: BTreeMap<i32, &YearlyAverage> = yearly.iter().map(|row| (row.year, row)).collect();

    present
        .into_iter()
        .map(|year| {
            let dec_feb = block_means(&by_month, year, Block::DecFeb);
            let mar_may = block_means(&by_month, year, Block::MarMay);
            let jun_aug = block_means(&by_month, year, Block::JunAug);
            let sep_nov = block_means(&by_month, year, Block::SepNov);

            let (winter, spring, summer, autumn) = if northern {
                (dec_feb, mar_may, jun_aug, sep_nov)
            } else {
                (jun_aug, sep_nov, dec_feb, mar_may)
            };
            let annual = by_year.get(&year);

            ClimateRow {
                year,
                yearly_min: annual.and_then(|y| y.tmin),
                yearly_max: annual.and_then(|y| y.tmax),
                winter_min: winter.min,
                winter_max: winter.max,
                spring_min: spring.min,
                spring_max: spring.max,
                summer_min: summer.min,
                summer_max: summer.max,
                autumn_min: autumn.min,
                autumn_max: autumn.max,
            }
        })
        .collect()
}

/// Chart lines for the climate table: name, colour and the column it plots.
const SERIES: [(&str, &str, fn(&ClimateRow) -> Option<f64>); 10] = [
    ("Jährlich Min.", "#0000ff", |r| r.yearly_min),
    ("Jährlich Max.", "#ff0000", |r| r.yearly_max),
    ("Winter Min.", "#969696", |r| r.winter_min),
    ("Winter Max.", "#626262", |r| r.winter_max),
    ("Frühling Min.", "#47D45A", |r| r.spring_min),
    ("Frühling Max.", "#3B7D23", |r| r.spring_max),
    ("Sommer Min.", "#E97132", |r| r.summer_min),
    ("Sommer Max.", "#CC5316", |r| r.summer_max),
    ("Herbst Min.", "#75300D", |r| r.autumn_min),
    ("Herbst Max.", "#4C1F08", |r| r.autumn_max),
];

/// One chart series per table column, in legend order.
pub fn chart_series(rows: &[ClimateRow]) -> Vec<ChartSeries> {
    SERIES
        .iter()
        .map(|(name, color, column)| ChartSeries {
            name: name.to_string(),
            color: color.to_string(),
            points: rows.iter().map(|row| (row.year, column(row))).collect(),
        })
        .collect()
}

/// Prepare a station if needed and build its climate response.
///
/// # Process
///
/// 1. Load monthly/yearly aggregates from the cache (download and process on a miss)
/// 2. Build seasonal rows for the hemisphere of the station
///
/// A station without latitude is treated as northern.
pub async fn station_climate(
    cache: &StationCache,
    station: &Station,
    years: YearRange,
) -> Result<ClimateResponse, AppError> {
    let aggregates = cache.load(&station.station_id).await?;

    let northern = station.latitude.is_none_or(|lat| lat >= 0.0);
    let rows = seasonal_rows(&aggregates.monthly, &aggregates.yearly, years, northern);
    let series = chart_series(&rows);

    Ok(ClimateResponse {
        station: station.clone().into(),
        year_from: years.from,
        year_to: years.to,
        rows,
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32, tmin: f64, tmax: f64) -> MonthlyAverage {
        MonthlyAverage {
            station_id: "X".into(),
            year,
            month,
            tmax: Some(tmax),
            tmin: Some(tmin),
        }
    }

    fn full_year(year: i32) -> Vec<MonthlyAverage> {
        (1..=12)
            .map(|m| month(year, m, f64::from(m), f64::from(m) + 10.0))
            .collect()
    }

    fn yearly(year: i32) -> YearlyAverage {
        YearlyAverage {
            station_id: "X".into(),
            year,
            tmax: Some(16.5),
            tmin: Some(6.5),
        }
    }

    const ALL: YearRange = YearRange { from: 0, to: 2024 };

    #[test]
    fn northern_winter_includes_previous_december() {
        let mut monthly = full_year(2019);
        monthly.extend(full_year(2020));
        let rows = seasonal_rows(&monthly, &[yearly(2019), yearly(2020)], ALL, true);

        assert_eq!(rows.len(), 2);
        // 2019 has no December before it: only Jan and Feb
        assert_eq!(rows[0].winter_min, Some(1.5));
        // 2020: Dec 2019 (12), Jan (1), Feb (2)
        assert_eq!(rows[1].winter_min, Some(5.0));
        assert_eq!(rows[1].winter_max, Some(15.0));
        assert_eq!(rows[1].spring_min, Some(4.0));
        assert_eq!(rows[1].summer_min, Some(7.0));
        assert_eq!(rows[1].autumn_max, Some(20.0));
        assert_eq!(rows[1].yearly_min, Some(6.5));
        assert_eq!(rows[1].yearly_max, Some(16.5));
    }

    #[test]
    fn southern_seasons_are_swapped() {
        let monthly = full_year(2020);
        let rows = seasonal_rows(&monthly, &[yearly(2020)], ALL, false);

        assert_eq!(rows[0].summer_min, Some(1.5));
        assert_eq!(rows[0].autumn_min, Some(4.0));
        assert_eq!(rows[0].winter_min, Some(7.0));
        assert_eq!(rows[0].spring_min, Some(10.0));
    }

    #[test]
    fn range_filter_drops_december_before_first_year() {
        let mut monthly = full_year(2019);
        monthly.extend(full_year(2020));
        let range = YearRange { from: 2020, to: 2020 };
        let rows = seasonal_rows(&monthly, &[yearly(2019), yearly(2020)], range, true);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2020);
        assert_eq!(rows[0].winter_min, Some(1.5));
    }

    #[test]
    fn seasons_without_months_are_empty() {
        let monthly = vec![month(2020, 7, 12.0, 25.0)];
        let rows = seasonal_rows(&monthly, &[], ALL, true);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].summer_max, Some(25.0));
        assert_eq!(rows[0].winter_min, None);
        assert_eq!(rows[0].yearly_min, None);
    }

    #[test]
    fn chart_has_one_series_per_column() {
        let rows = seasonal_rows(&full_year(2020), &[yearly(2020)], ALL, true);
        let series = chart_series(&rows);

        assert_eq!(series.len(), 10);
        assert_eq!(series[0].name, "Jährlich Min.");
        assert_eq!(series[0].points, vec![(2020, Some(6.5))]);
        assert_eq!(series[9].color, "#4C1F08");
    }
}
