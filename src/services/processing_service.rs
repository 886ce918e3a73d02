//! Station data processing pipeline.
//!
//! This service turns a GHCN-Daily `.dly` file into the three CSV files the
//! climate table is built from:
//!
//! 1. **Download**: fetch `{id}.dly`, parse the fixed-width records, write `{id}.csv`
//! 2. **Clean**: keep TMAX/TMIN, convert tenths of °C to °C, drop flag columns
//! 3. **Monthly**: mean per (year, month, element), pivoted to TMAX/TMIN columns
//! 4. **Yearly**: mean of the monthly values per year
//!
//! All averages are rounded to 2 decimals. Missing values are skipped by
//! every mean; a mean over no values is `None`.

use crate::{
    error::AppError,
    models::observation::{
        CleanObservation, DailyObservation, MonthlyAverage, TMAX, TMIN, YearlyAverage,
        is_temperature_element,
    },
    services::ghcn_client::GhcnClient,
    store::{self, StationStore},
};
use std::collections::BTreeMap;

/// Minimum length of a complete `.dly` record.
const DLY_RECORD_LEN: usize = 269;

/// Number of day slots in every monthly record.
const DAYS_PER_RECORD: usize = 31;

/// Width of one day slot: 5 value characters and 3 flags.
const DAY_SLOT_WIDTH: usize = 8;

/// Offset of the first day slot.
const FIRST_DAY_OFFSET: usize = 21;

/// Sentinel for a missing value.
const MISSING_VALUE: i32 = -9999;

const RAW_HEADER: [&str; 9] = [
    "Station_ID",
    "Year",
    "Month",
    "Day",
    "Element",
    "Value",
    "Quality_Flag",
    "Measurement_Flag",
    "Source_Flag",
];
const CLEAN_HEADER: [&str; 6] = ["Station_ID", "Year", "Month", "Day", "Element", "Value"];
const MONTHLY_HEADER: [&str; 5] = ["Station_ID", "Year", "Month", "TMAX", "TMIN"];
const YEARLY_HEADER: [&str; 4] = ["Station_ID", "Year", "TMAX", "TMIN"];

/// Round to 2 decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Running mean that ignores missing inputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    pub fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    /// The rounded mean, or `None` if nothing was pushed.
    pub fn rounded(&self) -> Option<f64> {
        (self.count > 0).then(|| round2(self.sum / f64::from(self.count)))
    }
}

/// Parse the fixed-width records of a `.dly` file.
///
/// # Record Layout
///
/// | Columns  | Field   |
/// |----------|---------|
/// | 0..11    | station |
/// | 11..15   | year    |
/// | 15..17   | month   |
/// | 17..21   | element |
/// | 21..269  | 31 × (value:5, qflag:1, mflag:1, sflag:1) |
///
/// Lines shorter than 269 characters and lines with an unreadable year or
/// month are skipped. Values equal to -9999 or not parseable as integers
/// are dropped, so only present observations are returned.
pub fn parse_dly(text: &str) -> Vec<DailyObservation> {
    let mut observations = Vec::new();

    for line in text.lines() {
        if line.len() < DLY_RECORD_LEN || !line.is_ascii() {
            continue;
        }

        let station = &line[0..11];
        let (Ok(year), Ok(month)) = (
            line[11..15].trim().parse::<i32>(),
            line[15..17].trim().parse::<u32>(),
        ) else {
            continue;
        };
        let element = &line[17..21];

        for day in 0..DAYS_PER_RECORD {
            let pos = FIRST_DAY_OFFSET + day * DAY_SLOT_WIDTH;
            let value = match line[pos..pos + 5].trim().parse::<i32>() {
                Ok(MISSING_VALUE) | Err(_) => continue,
                Ok(value) => value,
            };

            observations.push(DailyObservation {
                station_id: station.to_string(),
                year,
                month,
                day: day as u32 + 1,
                element: element.to_string(),
                value,
                quality_flag: line[pos + 5..pos + 6].to_string(),
                measurement_flag: line[pos + 6..pos + 7].to_string(),
                source_flag: line[pos + 7..pos + 8].to_string(),
            });
        }
    }

    observations
}

/// Keep temperature observations and convert tenths of °C to °C.
pub fn clean_observations(raw: Vec<DailyObservation>) -> Vec<CleanObservation> {
    raw.into_iter()
        .filter(|obs| is_temperature_element(&obs.element))
        .map(|obs| CleanObservation {
            station_id: obs.station_id,
            year: obs.year,
            month: obs.month,
            day: obs.day,
            element: obs.element,
            value: round2(f64::from(obs.value) / 10.0),
        })
        .collect()
}

/// Average cleaned observations per (year, month), one column per element.
///
/// Rows are sorted by year, then month. The `station_id` column is set to
/// `station_id` regardless of the ids found in the rows.
pub fn monthly_averages(station_id: &str, observations: &[CleanObservation]) -> Vec<MonthlyAverage> {
    let mut groups: BTreeMap<(i32, u32), (Mean, Mean)> = BTreeMap::new();
    for obs in observations {
        let (tmax, tmin) = groups.entry((obs.year, obs.month)).or_default();
        match obs.element.as_str() {
            TMAX => tmax.push(Some(obs.value)),
            TMIN => tmin.push(Some(obs.value)),
            _ => {}
        }
    }

    groups
        .into_iter()
        .map(|((year, month), (tmax, tmin))| MonthlyAverage {
            station_id: station_id.to_string(),
            year,
            month,
            tmax: tmax.rounded(),
            tmin: tmin.rounded(),
        })
        .collect()
}

/// Average monthly means per year, skipping months without a value.
pub fn yearly_averages(monthly: &[MonthlyAverage]) -> Vec<YearlyAverage> {
    let mut groups: BTreeMap<i32, (&str, Mean, Mean)> = BTreeMap::new();
    for row in monthly {
        let (_, tmax, tmin) = groups
            .entry(row.year)
            .or_insert_with(|| (row.station_id.as_str(), Mean::default(), Mean::default()));
        tmax.push(row.tmax);
        tmin.push(row.tmin);
    }

    groups
        .into_iter()
        .map(|(year, (station_id, tmax, tmin))| YearlyAverage {
            station_id: station_id.to_string(),
            year,
            tmax: tmax.rounded(),
            tmin: tmin.rounded(),
        })
        .collect()
}

/// Download a station's `.dly` file and store it as `{id}.csv`.
///
/// # Errors
///
/// - `Download`: the file does not exist upstream or the request failed
/// - `Io` / `Csv`: writing the raw file failed
pub async fn download_station_data(
    store: &StationStore,
    client: &GhcnClient,
    station_id: &str,
) -> Result<(), AppError> {
    let text = client.fetch_daily(station_id).await?;

    let store = store.clone();
    let station_id = station_id.to_string();
    tokio::task::spawn_blocking(move || -> Result<(), AppError> {
        let observations = parse_dly(&text);
        store::write_csv(&store.raw_path(&station_id), &observations, &RAW_HEADER)?;
        tracing::info!(
            observations = observations.len(),
            "Successfully downloaded and converted {} data to CSV",
            station_id
        );
        Ok(())
    })
    .await?
}

/// Reduce `{id}.csv` to temperature values in °C, rewriting it in place.
pub fn clean_station_data(store: &StationStore, station_id: &str) -> Result<(), AppError> {
    let path = store.raw_path(station_id);
    let raw: Vec<DailyObservation> = store::read_csv(&path)?;
    let cleaned = clean_observations(raw);
    store::write_csv(&path, &cleaned, &CLEAN_HEADER)?;
    tracing::info!("Successfully cleaned data for station {}", station_id);
    Ok(())
}

/// Write `{id}_monthly.csv` from the cleaned observations.
pub fn create_monthly_averages(store: &StationStore, station_id: &str) -> Result<(), AppError> {
    let cleaned: Vec<CleanObservation> = store::read_csv(&store.raw_path(station_id))?;
    let monthly = monthly_averages(station_id, &cleaned);
    store::write_csv(&store.monthly_path(station_id), &monthly, &MONTHLY_HEADER)?;
    tracing::info!("Successfully created monthly averages for station {}", station_id);
    Ok(())
}

/// Write `{id}_yearly.csv` from the monthly averages.
pub fn create_yearly_averages(store: &StationStore, station_id: &str) -> Result<(), AppError> {
    let monthly: Vec<MonthlyAverage> = store::read_csv(&store.monthly_path(station_id))?;
    let yearly = yearly_averages(&monthly);
    store::write_csv(&store.yearly_path(station_id), &yearly, &YEARLY_HEADER)?;
    tracing::info!("Successfully created yearly averages for station {}", station_id);
    Ok(())
}

/// Run the whole pipeline for one station.
///
/// Steps run strictly in order; the first failure is logged and returned.
pub async fn process_station(
    store: &StationStore,
    client: &GhcnClient,
    station_id: &str,
) -> Result<(), AppError> {
    if let Err(e) = download_station_data(store, client, station_id).await {
        tracing::error!("Error downloading data for station {}: {}", station_id, e);
        return Err(e);
    }

    let store = store.clone();
    let id = station_id.to_string();
    let result = tokio::task::spawn_blocking(move || -> Result<(), AppError> {
        clean_station_data(&store, &id)?;
        create_monthly_averages(&store, &id)?;
        create_yearly_averages(&store, &id)
    })
    .await?;

    if let Err(ref e) = result {
        tracing::error!("Error processing data for station {}: {}", station_id, e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a `.dly` record with the given day values (missing days = -9999).
    fn dly_line(station: &str, year: i32, month: u32, element: &str, values: &[(usize, i32)]) -> String {
        let mut line = format!("{station:<11}{year:04}{month:02}{element:<4}");
        for day in 1..=31 {
            let value = values
                .iter()
                .find(|(d, _)| *d == day)
                .map(|(_, v)| *v)
                .unwrap_or(-9999);
            line.push_str(&format!("{value:>5}  E"));
        }
        line
    }

    #[test]
    fn parse_dly_skips_missing_and_short_lines() {
        let text = [
            dly_line("GME00102380", 2020, 1, "TMAX", &[(1, 25), (2, -13)]),
            "GME00102380202001TMIN   short".to_string(),
            dly_line("GME00102380", 2020, 1, "PRCP", &[(5, 40)]),
        ]
        .join("\n");

        let observations = parse_dly(&text);
        assert_eq!(observations.len(), 3);

        let first = &observations[0];
        assert_eq!(first.station_id, "GME00102380");
        assert_eq!((first.year, first.month, first.day), (2020, 1, 1));
        assert_eq!(first.element, "TMAX");
        assert_eq!(first.value, 25);
        assert_eq!(first.quality_flag, " ");
        assert_eq!(first.source_flag, "E");

        assert_eq!(observations[1].value, -13);
        assert_eq!(observations[1].day, 2);
        assert_eq!(observations[2].element, "PRCP");
        assert_eq!(observations[2].day, 5);
    }

    #[test]
    fn parse_dly_drops_unparseable_values() {
        let mut line = dly_line("USC00047916", 1999, 12, "TMIN", &[(1, 10), (2, 20)]);
        line.replace_range(29..34, "  abc");
        let observations = parse_dly(&line);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].day, 1);
    }

    #[test]
    fn cleaning_keeps_temperatures_in_celsius() {
        let raw = parse_dly(
            &[
                dly_line("X", 2020, 1, "TMAX", &[(1, 125)]),
                dly_line("X", 2020, 1, "SNOW", &[(1, 3)]),
                dly_line("X", 2020, 1, "TMIN", &[(1, -3)]),
            ]
            .join("\n"),
        );
        let cleaned = clean_observations(raw);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].value, 12.5);
        assert_eq!(cleaned[1].value, -0.3);
    }

    fn clean(year: i32, month: u32, element: &str, value: f64) -> CleanObservation {
        CleanObservation {
            station_id: "X".into(),
            year,
            month,
            day: 1,
            element: element.into(),
            value,
        }
    }

    #[test]
    fn monthly_averages_pivot_elements_and_sort() {
        let rows = vec![
            clean(2021, 2, TMAX, 5.0),
            clean(2020, 12, TMAX, 1.0),
            clean(2020, 12, TMAX, 2.0),
            clean(2020, 12, TMIN, -4.0),
            clean(2020, 12, TMAX, 2.0),
        ];
        let monthly = monthly_averages("X", &rows);

        assert_eq!(monthly.len(), 2);
        assert_eq!((monthly[0].year, monthly[0].month), (2020, 12));
        assert_eq!(monthly[0].tmax, Some(1.67));
        assert_eq!(monthly[0].tmin, Some(-4.0));
        assert_eq!((monthly[1].year, monthly[1].month), (2021, 2));
        assert_eq!(monthly[1].tmin, None);
    }

    #[test]
    fn yearly_averages_skip_missing_months() {
        let month = |year, month, tmax: Option<f64>, tmin: Option<f64>| MonthlyAverage {
            station_id: "X".into(),
            year,
            month,
            tmax,
            tmin,
        };
        let monthly = vec![
            month(2020, 1, Some(1.0), Some(-1.0)),
            month(2020, 2, Some(2.0), None),
            month(2020, 3, Some(4.0), Some(-3.0)),
            month(2021, 1, None, None),
        ];
        let yearly = yearly_averages(&monthly);

        assert_eq!(yearly.len(), 2);
        assert_eq!(yearly[0].year, 2020);
        assert_eq!(yearly[0].tmax, Some(2.33));
        assert_eq!(yearly[0].tmin, Some(-2.0));
        assert_eq!(yearly[1].tmax, None);
        assert_eq!(yearly[1].station_id, "X");
    }

    #[test]
    fn round2_rounds_ties_to_even() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.0), 2.0);
    }

    #[test]
    fn monthly_mean_on_a_tie_rounds_to_even() {
        let rows = vec![
            clean(2020, 4, TMAX, 0.1),
            clean(2020, 4, TMAX, 0.0),
            clean(2020, 4, TMAX, 0.0),
            clean(2020, 4, TMAX, 0.0),
        ];
        let monthly = monthly_averages("X", &rows);
        assert_eq!(monthly[0].tmax, Some(0.02));
    }
}
