//! VLBI antenna gravitational deformation
use log::{debug, info};

use std::{collections::BTreeMap, fs, path::Path, str::FromStr};

use crate::{
    apriori::{
        version::{ReferenceParser, VersionedReference},
        RunContext,
    },
    error::Error,
    interp::CubicSpline,
    prelude::Epoch,
};

/// Apriori provider (and reference category) name
pub const GRAVITATIONAL_DEFORMATION: &str = "vlbi_gravitational_deformation";

/// Excess delay due to gravitational deformation of one antenna,
/// tabulated as a function of elevation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeformationRecord {
    /// Validity start
    pub start: Epoch,
    /// Validity end
    pub end: Epoch,
    /// Elevation angles [°], strictly increasing
    pub elevations_deg: Vec<f64>,
    /// Excess delay [ps]
    pub delays_ps: Vec<f64>,
}

impl DeformationRecord {
    /// True when validity window overlaps `]day_start; day_end[`.
    /// A window ending exactly at `day_start` (or starting exactly at `day_end`)
    /// is not applicable.
    pub fn overlaps(&self, day_start: Epoch, day_end: Epoch) -> bool {
        self.end > day_start && self.start < day_end
    }
}

/// Parsed reference file, per station
pub type VersionedRecordSet = BTreeMap<String, DeformationRecord>;

/// Per station delay interpolators
pub type InterpolatorMap = BTreeMap<String, CubicSpline>;

/// Gravitational deformation tables parser.
///
/// ```text
/// # comment
/// STATION GILCREEK 2000-01-01T00:00:00 2100-01-01T00:00:00
///   5.0  12.3
///  15.0   8.1
/// END
/// ```
#[derive(Debug, Default, Copy, Clone)]
pub struct DeformationParser {}

impl ReferenceParser for DeformationParser {
    type Output = VersionedRecordSet;

    fn parse(&self, path: &Path) -> Result<VersionedRecordSet, Error> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_error = |line: usize, reason: String| Error::ReferenceParse {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let mut records = VersionedRecordSet::new();
        let mut pending: Option<(String, DeformationRecord)> = None;

        for (nth, line) in content.lines().enumerate() {
            let nth = nth + 1;

            let line = match line.split_once('#') {
                Some((content, _)) => content,
                None => line,
            }
            .trim();

            if line.is_empty() {
                continue;
            }

            let items = line.split_whitespace().collect::<Vec<_>>();

            match items[0] {
                "STATION" => {
                    if let Some((station, _)) = &pending {
                        return Err(parse_error(nth, format!("{}: missing END", station)));
                    }

                    if items.len() != 4 {
                        return Err(parse_error(
                            nth,
                            "expecting STATION <id> <start> <end>".to_string(),
                        ));
                    }

                    let start = Epoch::from_str(items[2])
                        .map_err(|e| parse_error(nth, format!("invalid start: {}", e)))?;

                    let end = Epoch::from_str(items[3])
                        .map_err(|e| parse_error(nth, format!("invalid end: {}", e)))?;

                    pending = Some((
                        items[1].to_string(),
                        DeformationRecord {
                            start,
                            end,
                            elevations_deg: Vec::new(),
                            delays_ps: Vec::new(),
                        },
                    ));
                },
                "END" => {
                    let (station, record) = pending
                        .take()
                        .ok_or_else(|| parse_error(nth, "END without STATION".to_string()))?;

                    if records.insert(station.clone(), record).is_some() {
                        return Err(parse_error(nth, format!("{}: duplicate station", station)));
                    }
                },
                _ => {
                    let (_, record) = pending
                        .as_mut()
                        .ok_or_else(|| parse_error(nth, "value outside STATION".to_string()))?;

                    if items.len() != 2 {
                        return Err(parse_error(
                            nth,
                            "expecting <elevation> <delay>".to_string(),
                        ));
                    }

                    let elevation = items[0]
                        .parse::<f64>()
                        .map_err(|e| parse_error(nth, format!("invalid elevation: {}", e)))?;

                    let delay = items[1]
                        .parse::<f64>()
                        .map_err(|e| parse_error(nth, format!("invalid delay: {}", e)))?;

                    record.elevations_deg.push(elevation);
                    record.delays_ps.push(delay);
                },
            }
        }

        if let Some((station, _)) = pending {
            return Err(parse_error(
                content.lines().count(),
                format!("{}: missing END", station),
            ));
        }

        Ok(records)
    }
}

/// Builds one delay interpolator per station valid on the run date.
/// Stations whose validity does not overlap the run day are omitted.
pub fn build_interpolators(
    records: &VersionedRecordSet,
    run_date: Epoch,
) -> Result<InterpolatorMap, Error> {
    let (day_start, day_end) = RunContext::day_bounds(run_date);

    let mut interpolators = InterpolatorMap::new();

    for (station, record) in records.iter() {
        if !record.overlaps(day_start, day_end) {
            debug!(
                "{}: {} not valid [{}; {}]",
                day_start, station, record.start, record.end
            );
            continue;
        }

        let spline = CubicSpline::new(station, &record.elevations_deg, &record.delays_ps)?;
        interpolators.insert(station.clone(), spline);
    }

    Ok(interpolators)
}

/// Gravitational deformation apriori provider: loads the latest version
/// and builds the interpolators valid on the run date.
pub fn gravitational_deformation(ctx: &RunContext) -> Result<InterpolatorMap, Error> {
    let reference = VersionedReference::new(
        GRAVITATIONAL_DEFORMATION,
        &ctx.config().gravitational_deformation,
    );

    let records = reference.load(&DeformationParser::default())?;
    let interpolators = build_interpolators(&records, ctx.run_date())?;

    info!(
        "{}: {} interpolators ({} stations in reference)",
        ctx.run_date(),
        interpolators.len(),
        records.len()
    );

    Ok(interpolators)
}

#[cfg(test)]
mod test {
    use super::{build_interpolators, DeformationRecord, VersionedRecordSet};
    use crate::{
        error::Error,
        prelude::{Epoch, Unit},
    };

    fn record(start: Epoch, end: Epoch, points: usize) -> DeformationRecord {
        let elevations_deg = (0..points)
            .map(|i| 5.0 + 85.0 * i as f64 / (points - 1) as f64)
            .collect::<Vec<_>>();
        let delays_ps = elevations_deg
            .iter()
            .map(|e| 10.0 - e / 10.0)
            .collect::<Vec<_>>();
        DeformationRecord {
            start,
            end,
            elevations_deg,
            delays_ps,
        }
    }

    #[test]
    fn validity_window() {
        let run_date = Epoch::from_gregorian_utc(2020, 2, 10, 13, 30, 0, 0);
        let day_start = Epoch::from_gregorian_utc_at_midnight(2020, 2, 10);
        let day_end = Epoch::from_gregorian_utc_at_midnight(2020, 2, 11);
        let long_ago = Epoch::from_gregorian_utc_at_midnight(2000, 1, 1);
        let far_away = Epoch::from_gregorian_utc_at_midnight(2100, 1, 1);

        let mut records = VersionedRecordSet::new();
        records.insert("COVERING".to_string(), record(long_ago, far_away, 7));
        records.insert("EXACT".to_string(), record(day_start, day_end, 7));
        records.insert("ENDED".to_string(), record(long_ago, day_start, 7));
        records.insert("FUTURE".to_string(), record(day_end, far_away, 7));
        records.insert(
            "AFTERNOON".to_string(),
            record(day_start + 12.0 * Unit::Hour, far_away, 7),
        );

        let interpolators = build_interpolators(&records, run_date).unwrap();

        assert!(interpolators.contains_key("COVERING"));
        assert!(interpolators.contains_key("EXACT"));
        assert!(interpolators.contains_key("AFTERNOON"));
        assert!(!interpolators.contains_key("ENDED"));
        assert!(!interpolators.contains_key("FUTURE"));
    }

    #[test]
    fn insufficient_data_when_valid_only() {
        let run_date = Epoch::from_gregorian_utc_at_midnight(2020, 2, 10);
        let long_ago = Epoch::from_gregorian_utc_at_midnight(2000, 1, 1);
        let far_away = Epoch::from_gregorian_utc_at_midnight(2100, 1, 1);

        let mut records = VersionedRecordSet::new();
        records.insert("OUTDATED".to_string(), record(long_ago, long_ago, 3));
        records.insert("VALID".to_string(), record(long_ago, far_away, 4));

        let interpolators = build_interpolators(&records, run_date).unwrap();
        assert_eq!(interpolators.len(), 1);

        records.insert("SHORT".to_string(), record(long_ago, far_away, 3));

        match build_interpolators(&records, run_date) {
            Err(Error::InsufficientData { entity, points }) => {
                assert_eq!(entity, "SHORT");
                assert_eq!(points, 3);
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
