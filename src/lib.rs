#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

pub mod apriori;
pub mod attitude;
pub mod carrier;
pub mod cfg;
pub mod constants;
pub mod dataset;
pub mod interp;
pub mod models;
pub mod plugins;

mod error;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::apriori::{
        antenna::{PcoCatalog, SatelliteAntenna, ANTENNA_CORRECTION},
        gravdef::{InterpolatorMap, VersionedRecordSet, GRAVITATIONAL_DEFORMATION},
        version::{ReferenceParser, Version, VersionedReference},
        AprioriRegistry, RunContext,
    };
    pub use crate::carrier::Carrier;
    pub use crate::cfg::{Config, ReferenceOpts};
    pub use crate::dataset::{Dataset, Observation, ObservationSet};
    pub use crate::error::Error;
    pub use crate::interp::CubicSpline;
    pub use crate::models::{
        gravdef::GravitationalDeformation, pco::SatellitePhaseCenterOffset, CorrectionModel,
        Corrections, Pipeline,
    };
    pub use crate::plugins::Plugins;
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale, Unit};
    pub use nalgebra::{Rotation3, Vector3};
}

// pub export
pub use error::Error;
