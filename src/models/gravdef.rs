//! VLBI gravitational deformation delay
use log::debug;

use std::collections::BTreeMap;

use crate::{
    apriori::{
        gravdef::{InterpolatorMap, GRAVITATIONAL_DEFORMATION},
        AprioriRegistry,
    },
    constants::{PICOSECOND_S, SPEED_OF_LIGHT_M_S},
    dataset::Dataset,
    error::Error,
    models::CorrectionModel,
    prelude::Epoch,
};

/// Excess delay due to gravitational deformation of the antennas.
/// On a baseline, the correction is the delay at the second station
/// minus the delay at the first one. Stations without a valid table
/// do not contribute.
#[derive(Debug, Default, Copy, Clone)]
pub struct GravitationalDeformation {}

fn station_delay_ps(
    interpolators: &InterpolatorMap,
    station: &str,
    elevation_deg: f64,
    epoch: Epoch,
    missing: &mut BTreeMap<String, Epoch>,
) -> Result<f64, Error> {
    match interpolators.get(station) {
        Some(spline) => spline.eval(elevation_deg),
        None => {
            missing.entry(station.to_string()).or_insert(epoch);
            Ok(0.0)
        },
    }
}

impl CorrectionModel for GravitationalDeformation {
    fn name(&self) -> &str {
        GRAVITATIONAL_DEFORMATION
    }

    fn compute(
        &self,
        registry: &AprioriRegistry,
        dataset: &dyn Dataset,
    ) -> Result<Vec<f64>, Error> {
        let interpolators = registry.get::<InterpolatorMap>(GRAVITATIONAL_DEFORMATION)?;

        let mut missing = BTreeMap::new();
        let mut corrections = Vec::with_capacity(dataset.len());

        for index in 0..dataset.len() {
            let epoch = dataset.epoch(index);

            let delay_ps = station_delay_ps(
                &interpolators,
                dataset.station(index),
                dataset.elevation_deg(index),
                epoch,
                &mut missing,
            )?;

            let delay_ps = match (
                dataset.remote_station(index),
                dataset.remote_elevation_deg(index),
            ) {
                (Some(remote), Some(elevation_deg)) => {
                    station_delay_ps(&interpolators, remote, elevation_deg, epoch, &mut missing)?
                        - delay_ps
                },
                _ => delay_ps,
            };

            corrections.push(delay_ps * PICOSECOND_S * SPEED_OF_LIGHT_M_S);
        }

        for (station, epoch) in missing.iter() {
            debug!("{}: no gravitational deformation for {}", epoch, station);
        }

        Ok(corrections)
    }
}
