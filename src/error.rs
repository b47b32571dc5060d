use thiserror::Error;

use std::path::PathBuf;

use crate::{cfg::Error as ConfigError, prelude::SV};

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid [crate::prelude::Config] setup
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// No file matching the naming pattern of this reference category
    /// could be found.
    #[error("no versions found for \"{0}\"")]
    NoVersionsFound(String),

    /// Version identifiers must encode a calendar date like `2020Jan15`.
    /// We never skip an unparseable identifier: the run is aborted.
    #[error("malformed version identifier \"{0}\"")]
    MalformedVersion(String),

    /// The reference file could be located but its content is invalid.
    #[error("{path}:{line}: {reason}")]
    ReferenceParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Cubic interpolation requires at least 4 tabulated points.
    #[error("{entity}: cubic interpolation requires at least 4 points, got {points}")]
    InsufficientData { entity: String, points: usize },

    /// Tabulated abscissa must be strictly increasing.
    #[error("{0}: tabulated values are not strictly increasing")]
    NonMonotonic(String),

    /// Interpolators never extrapolate: querying outside of the tabulated
    /// range winds up here.
    #[error("{x} is outside of the interpolation range [{min}; {max}]")]
    Extrapolation { x: f64, min: f64, max: f64 },

    #[error("unknown apriori provider \"{0}\"")]
    UnknownProvider(String),

    /// Apriori provider exists but did not build the requested type.
    #[error("apriori provider \"{0}\" does not provide requested type")]
    ProviderTypeMismatch(String),

    #[error("unknown correction model \"{0}\"")]
    UnknownModel(String),

    /// Two per-observation series that should have matched do not.
    #[error("shape mismatch: expecting {expected} values, got {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Satellite antenna is not described in the antenna catalog,
    /// or not valid for this run date.
    #[error("{0}: no satellite antenna in catalog")]
    MissingSatelliteAntenna(SV),

    /// Satellite antenna does not describe the requested frequency.
    #[error("{sv}: no phase center offset for {code}")]
    MissingFrequency { sv: SV, code: String },

    /// Observation is not associated to any satellite.
    #[error("observation #{0}: not associated to any satellite")]
    MissingSatellite(usize),

    /// Observation is missing one geometrical component.
    #[error("observation #{index}: missing {what}")]
    MissingGeometry { index: usize, what: &'static str },

    /// Station and target are co-located: no line of sight.
    #[error("observation #{0}: degenerate line of sight")]
    DegenerateLineOfSight(usize),

    /// Satellite, Earth and Sun are aligned: nominal attitude is not defined.
    #[error("observation #{0}: degenerate satellite attitude")]
    DegenerateAttitude(usize),
}
