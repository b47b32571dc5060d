//! Observation dataset
use std::collections::BTreeMap;

use nalgebra::{Rotation3, Vector3};

use crate::{
    attitude::nominal_attitude,
    error::Error,
    prelude::{Epoch, SV},
};

/// [Dataset] gives read access to the observations of one analysis run.
/// Correction models never modify it.
pub trait Dataset {
    /// Number of observations
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observation [Epoch]
    fn epoch(&self, index: usize) -> Epoch;

    /// Observing station
    fn station(&self, index: usize) -> &str;

    /// Elevation of the target, seen from the observing station [°]
    fn elevation_deg(&self, index: usize) -> f64;

    /// Second station of a VLBI baseline
    fn remote_station(&self, index: usize) -> Option<&str>;

    /// Elevation of the target, seen from the second station [°]
    fn remote_elevation_deg(&self, index: usize) -> Option<f64>;

    /// Observed satellite
    fn sv(&self, index: usize) -> Option<SV>;

    /// Satellite position, Earth fixed frame [m]
    fn satellite_position_m(&self, index: usize) -> Option<Vector3<f64>>;

    /// Sun position, Earth fixed frame [m]
    fn sun_position_m(&self, index: usize) -> Option<Vector3<f64>>;

    /// Unit vector from station to target, Earth fixed frame
    fn line_of_sight(&self, index: usize) -> Result<Vector3<f64>, Error>;

    /// Rotation from satellite body frame to Earth fixed frame.
    /// Defaults to the nominal yaw steering attitude.
    fn satellite_attitude(&self, index: usize) -> Result<Rotation3<f64>, Error> {
        nominal_satellite_attitude(self, index)
    }
}

/// Nominal yaw steering attitude of the observed satellite
pub fn nominal_satellite_attitude<D: Dataset + ?Sized>(
    dataset: &D,
    index: usize,
) -> Result<Rotation3<f64>, Error> {
    let satellite_m = dataset
        .satellite_position_m(index)
        .ok_or(Error::MissingGeometry {
            index,
            what: "satellite position",
        })?;

    let sun_m = dataset.sun_position_m(index).ok_or(Error::MissingGeometry {
        index,
        what: "sun position",
    })?;

    nominal_attitude(&satellite_m, &sun_m).ok_or(Error::DegenerateAttitude(index))
}

/// Line of sight of every observation
pub fn line_of_sight<D: Dataset + ?Sized>(dataset: &D) -> Result<Vec<Vector3<f64>>, Error> {
    (0..dataset.len())
        .map(|index| dataset.line_of_sight(index))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub epoch: Epoch,
    pub station: String,
    /// Station position, Earth fixed frame [m]
    pub station_position_m: Vector3<f64>,
    /// Target elevation [°]
    pub elevation_deg: f64,
    pub remote_station: Option<String>,
    pub remote_elevation_deg: Option<f64>,
    pub sv: Option<SV>,
    pub satellite_position_m: Option<Vector3<f64>>,
    pub sun_position_m: Option<Vector3<f64>>,
    /// Line of sight, when not deduced from station and satellite positions
    pub line_of_sight: Option<Vector3<f64>>,
    /// Satellite attitude, when not deduced from the Sun position
    pub attitude: Option<Rotation3<f64>>,
}

impl Observation {
    /// GNSS [Observation] of `sv` from `station`.
    /// Elevation is the geocentric elevation of the satellite.
    pub fn gnss(
        epoch: Epoch,
        station: &str,
        station_position_m: Vector3<f64>,
        sv: SV,
        satellite_position_m: Vector3<f64>,
    ) -> Self {
        let elevation_deg = match (
            (satellite_position_m - station_position_m).try_normalize(0.0),
            station_position_m.try_normalize(0.0),
        ) {
            (Some(los), Some(up)) => los.dot(&up).clamp(-1.0, 1.0).asin().to_degrees(),
            _ => 90.0,
        };

        Self {
            epoch,
            station: station.to_string(),
            station_position_m,
            elevation_deg,
            remote_station: None,
            remote_elevation_deg: None,
            sv: Some(sv),
            satellite_position_m: Some(satellite_position_m),
            sun_position_m: None,
            line_of_sight: None,
            attitude: None,
        }
    }

    /// VLBI [Observation] on the `station` - `remote_station` baseline.
    pub fn vlbi(
        epoch: Epoch,
        station: &str,
        elevation_deg: f64,
        remote_station: &str,
        remote_elevation_deg: f64,
    ) -> Self {
        Self {
            epoch,
            station: station.to_string(),
            station_position_m: Vector3::zeros(),
            elevation_deg,
            remote_station: Some(remote_station.to_string()),
            remote_elevation_deg: Some(remote_elevation_deg),
            sv: None,
            satellite_position_m: None,
            sun_position_m: None,
            line_of_sight: None,
            attitude: None,
        }
    }

    /// Copies and returns [Observation] with Sun position [m]
    pub fn with_sun_position(&self, sun_m: Vector3<f64>) -> Self {
        let mut s = self.clone();
        s.sun_position_m = Some(sun_m);
        s
    }

    /// Copies and returns [Observation] with given line of sight,
    /// which is normalized. A null vector leaves the line of sight
    /// to be deduced from station and satellite positions.
    pub fn with_line_of_sight(&self, line_of_sight: Vector3<f64>) -> Self {
        let mut s = self.clone();
        s.line_of_sight = line_of_sight.try_normalize(0.0);
        s
    }

    /// Copies and returns [Observation] with given satellite attitude
    pub fn with_attitude(&self, attitude: Rotation3<f64>) -> Self {
        let mut s = self.clone();
        s.attitude = Some(attitude);
        s
    }
}

/// In memory [Dataset], which also stores the corrections
/// that were applied to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    observations: Vec<Observation>,
    corrections: BTreeMap<String, Vec<f64>>,
}

impl ObservationSet {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self {
            observations,
            corrections: Default::default(),
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Correction applied by this model, if any
    pub fn correction(&self, model: &str) -> Option<&[f64]> {
        self.corrections.get(model).map(|c| c.as_slice())
    }

    /// Names of the correction models applied so far
    pub fn applied_models(&self) -> impl Iterator<Item = &str> + '_ {
        self.corrections.keys().map(|k| k.as_str())
    }

    /// Sum of all corrections applied to each observation [m]
    pub fn total_correction(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.observations.len()];
        for values in self.corrections.values() {
            for (sum, value) in total.iter_mut().zip(values.iter()) {
                *sum += value;
            }
        }
        total
    }

    /// Stores (accumulates) one model's correction.
    /// Length must match the number of observations.
    pub(crate) fn add_correction(&mut self, model: &str, values: &[f64]) -> Result<(), Error> {
        if values.len() != self.observations.len() {
            return Err(Error::ShapeMismatch {
                expected: self.observations.len(),
                found: values.len(),
            });
        }

        let column = self
            .corrections
            .entry(model.to_string())
            .or_insert_with(|| vec![0.0; values.len()]);

        for (stored, value) in column.iter_mut().zip(values.iter()) {
            *stored += value;
        }

        Ok(())
    }
}

impl Dataset for ObservationSet {
    fn len(&self) -> usize {
        self.observations.len()
    }

    fn epoch(&self, index: usize) -> Epoch {
        self.observations[index].epoch
    }

    fn station(&self, index: usize) -> &str {
        &self.observations[index].station
    }

    fn elevation_deg(&self, index: usize) -> f64 {
        self.observations[index].elevation_deg
    }

    fn remote_station(&self, index: usize) -> Option<&str> {
        self.observations[index].remote_station.as_deref()
    }

    fn remote_elevation_deg(&self, index: usize) -> Option<f64> {
        self.observations[index].remote_elevation_deg
    }

    fn sv(&self, index: usize) -> Option<SV> {
        self.observations[index].sv
    }

    fn satellite_position_m(&self, index: usize) -> Option<Vector3<f64>> {
        self.observations[index].satellite_position_m
    }

    fn sun_position_m(&self, index: usize) -> Option<Vector3<f64>> {
        self.observations[index].sun_position_m
    }

    fn line_of_sight(&self, index: usize) -> Result<Vector3<f64>, Error> {
        let observation = &self.observations[index];

        if let Some(line_of_sight) = observation.line_of_sight {
            return Ok(line_of_sight);
        }

        let satellite_m = observation
            .satellite_position_m
            .ok_or(Error::MissingGeometry {
                index,
                what: "line of sight",
            })?;

        (satellite_m - observation.station_position_m)
            .try_normalize(0.0)
            .ok_or(Error::DegenerateLineOfSight(index))
    }

    fn satellite_attitude(&self, index: usize) -> Result<Rotation3<f64>, Error> {
        match self.observations[index].attitude {
            Some(attitude) => Ok(attitude),
            None => nominal_satellite_attitude(self, index),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{line_of_sight, Dataset, Observation, ObservationSet};
    use crate::{
        error::Error,
        prelude::{Constellation, Epoch, SV},
    };
    use nalgebra::Vector3;

    #[test]
    fn gnss_geometry() {
        let t = Epoch::from_gregorian_utc_at_midnight(2020, 6, 25);
        let g01 = SV::new(Constellation::GPS, 1);

        let station_m = Vector3::new(6_378_137.0, 0.0, 0.0);
        let zenith = Observation::gnss(t, "BRUX", station_m, g01, Vector3::new(26_560.0E3, 0.0, 0.0));

        assert!((zenith.elevation_deg - 90.0).abs() < 1.0E-9);

        let set = ObservationSet::new(vec![zenith.clone()]);
        let los = set.line_of_sight(0).unwrap();
        assert!((los - Vector3::x()).norm() < 1.0E-12);

        let explicit = zenith.with_line_of_sight(Vector3::new(0.0, 2.0, 0.0));
        let null = zenith.with_line_of_sight(Vector3::zeros());
        assert!(null.line_of_sight.is_none());

        let set = ObservationSet::new(vec![zenith, explicit, null]);
        let los = line_of_sight(&set).unwrap();
        assert_eq!(los[1], Vector3::y());
        assert!((los[2] - Vector3::x()).norm() < 1.0E-12);
        assert!(los.iter().all(|los| los.iter().all(|x| x.is_finite())));
        assert_eq!(set.epoch(2), t);
    }

    #[test]
    fn missing_geometry() {
        let t = Epoch::from_gregorian_utc_at_midnight(2020, 6, 25);
        let set = ObservationSet::new(vec![Observation::vlbi(t, "WETTZELL", 30.0, "ONSALA60", 45.0)]);

        assert!(matches!(
            set.line_of_sight(0),
            Err(Error::MissingGeometry { index: 0, .. })
        ));
        assert!(matches!(
            set.satellite_attitude(0),
            Err(Error::MissingGeometry { index: 0, .. })
        ));
    }

    #[test]
    fn accumulated_corrections() {
        let t = Epoch::from_gregorian_utc_at_midnight(2020, 6, 25);
        let mut set = ObservationSet::new(vec![
            Observation::vlbi(t, "WETTZELL", 30.0, "ONSALA60", 45.0),
            Observation::vlbi(t, "WETTZELL", 35.0, "ONSALA60", 50.0),
        ]);

        set.add_correction("a", &[1.0, 2.0]).unwrap();
        set.add_correction("b", &[0.5, 0.5]).unwrap();

        assert!(matches!(
            set.add_correction("c", &[1.0]),
            Err(Error::ShapeMismatch { expected: 2, found: 1 })
        ));

        assert_eq!(set.correction("a"), Some([1.0, 2.0].as_slice()));
        assert_eq!(set.correction("c"), None);
        assert_eq!(set.total_correction(), vec![1.5, 2.5]);
        assert_eq!(set.applied_models().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
