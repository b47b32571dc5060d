use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::{collections::HashMap, path::PathBuf};

use crate::prelude::{Carrier, Constellation};

/// Configuration Error
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown carrier \"{0}\"")]
    UnknownCarrier(String),
    #[error("unknown antex frequency code \"{0}\"")]
    UnknownFrequencyCode(String),
    #[error("naming pattern \"{0}\" has no {{version}} placeholder")]
    MissingVersionPlaceholder(String),
}

fn default_reference_dir() -> PathBuf {
    PathBuf::from("apriori")
}

fn default_gravdef_pattern() -> String {
    "vlbi_gravitational_deformation_{version}.txt".to_string()
}

fn default_antenna_catalog() -> PathBuf {
    PathBuf::from("apriori").join("igs20.atx")
}

fn default_carriers() -> HashMap<Constellation, Vec<Carrier>> {
    HashMap::from([
        (Constellation::GPS, vec![Carrier::L1, Carrier::L2]),
        (Constellation::Galileo, vec![Carrier::E1, Carrier::E5A]),
        (Constellation::BeiDou, vec![Carrier::B1I, Carrier::B3]),
        (Constellation::Glonass, vec![Carrier::G1, Carrier::G2]),
        (Constellation::QZSS, vec![Carrier::L1, Carrier::L2]),
    ])
}

/// Versioned reference files location.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReferenceOpts {
    /// Directory we look for versions in
    #[cfg_attr(feature = "serde", serde(default = "default_reference_dir"))]
    pub directory: PathBuf,
    /// File name template, where `{version}` stands for
    /// the version identifier (like `2020Jan15`).
    pub pattern: String,
}

impl ReferenceOpts {
    pub fn new(directory: impl Into<PathBuf>, pattern: &str) -> Self {
        Self {
            directory: directory.into(),
            pattern: pattern.to_string(),
        }
    }
}

fn default_gravdef() -> ReferenceOpts {
    ReferenceOpts::new(default_reference_dir(), &default_gravdef_pattern())
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// VLBI gravitational deformation tables
    #[cfg_attr(feature = "serde", serde(default = "default_gravdef"))]
    pub gravitational_deformation: ReferenceOpts,
    /// ANTEX antenna catalog
    #[cfg_attr(feature = "serde", serde(default = "default_antenna_catalog"))]
    pub antenna_catalog: PathBuf,
    /// Carriers in use, per [Constellation].
    /// The first one is the default frequency for that [Constellation].
    #[cfg_attr(feature = "serde", serde(default = "default_carriers"))]
    pub carriers: HashMap<Constellation, Vec<Carrier>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gravitational_deformation: default_gravdef(),
            antenna_catalog: default_antenna_catalog(),
            carriers: default_carriers(),
        }
    }
}

impl Config {
    /// Returns [Config] where all apriori files are searched for
    /// in given directory, with default names.
    pub fn with_reference_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let mut s = Self::default();
        s.gravitational_deformation.directory = dir.clone();
        s.antenna_catalog = dir.join("igs20.atx");
        s
    }

    /// Copies and returns [Config] with updated antenna catalog
    pub fn with_antenna_catalog(&self, path: impl Into<PathBuf>) -> Self {
        let mut s = self.clone();
        s.antenna_catalog = path.into();
        s
    }

    /// Copies and returns [Config] with these carriers for this [Constellation]
    pub fn with_carriers(&self, constellation: Constellation, carriers: &[Carrier]) -> Self {
        let mut s = self.clone();
        s.carriers.insert(constellation, carriers.to_vec());
        s
    }
}
