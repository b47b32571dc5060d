//! Satellite phase center offset
use nalgebra::Vector3;

use crate::{
    apriori::{
        antenna::{PcoCatalog, ANTENNA_CORRECTION},
        AprioriRegistry,
    },
    dataset::{line_of_sight, Dataset},
    error::Error,
    models::CorrectionModel,
    prelude::Carrier,
};

/// Model name
pub const SATELLITE_PHASE_CENTER_OFFSET: &str = "gnss_satellite_phase_center_offset";

/// Projects each offset on its own line of sight (row-wise dot product).
pub fn project_on_line_of_sight(
    line_of_sight: &[Vector3<f64>],
    offsets: &[Vector3<f64>],
) -> Result<Vec<f64>, Error> {
    if line_of_sight.len() != offsets.len() {
        return Err(Error::ShapeMismatch {
            expected: line_of_sight.len(),
            found: offsets.len(),
        });
    }

    Ok(line_of_sight
        .iter()
        .zip(offsets.iter())
        .map(|(los, offset)| los.dot(offset))
        .collect())
}

/// Satellite phase center offset correction: the vector between satellite
/// center of mass and antenna phase center, projected on the line of sight.
/// Offsets of the default frequency are used unless a [Carrier] is selected.
#[derive(Debug, Default, Copy, Clone)]
pub struct SatellitePhaseCenterOffset {
    carrier: Option<Carrier>,
}

impl SatellitePhaseCenterOffset {
    /// Use offsets of this [Carrier] for every satellite
    pub fn with_carrier(carrier: Carrier) -> Self {
        Self {
            carrier: Some(carrier),
        }
    }
}

impl CorrectionModel for SatellitePhaseCenterOffset {
    fn name(&self) -> &str {
        SATELLITE_PHASE_CENTER_OFFSET
    }

    fn compute(
        &self,
        registry: &AprioriRegistry,
        dataset: &dyn Dataset,
    ) -> Result<Vec<f64>, Error> {
        let catalog = registry.get::<PcoCatalog>(ANTENNA_CORRECTION)?;
        let pco_itrs = catalog.satellite_phase_center_offset(dataset, self.carrier)?;
        let line_of_sight = line_of_sight(dataset)?;
        project_on_line_of_sight(&line_of_sight, &pco_itrs)
    }
}
