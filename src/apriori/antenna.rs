//! GNSS satellite antenna phase center offsets (ANTEX)
use log::{debug, info, warn};
use nalgebra::Vector3;

use std::{collections::HashMap, fs, path::Path, str::FromStr};

use crate::{
    apriori::{version::ReferenceParser, RunContext},
    constants::MILLIMETER_M,
    dataset::Dataset,
    error::Error,
    prelude::{Carrier, Constellation, Epoch, SV},
};

/// Apriori provider name
pub const ANTENNA_CORRECTION: &str = "gnss_antenna_correction";

/// One satellite antenna description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SatelliteAntenna {
    /// Antenna type, like `BLOCK IIR-M`
    pub antenna_type: String,
    pub valid_from: Option<Epoch>,
    pub valid_until: Option<Epoch>,
    /// Phase center offsets [m], satellite body frame (X, Y, Z),
    /// in order of description.
    pub offsets: Vec<(Carrier, Vector3<f64>)>,
}

impl SatelliteAntenna {
    /// True when validity window overlaps `]day_start; day_end[`
    pub fn is_valid(&self, day_start: Epoch, day_end: Epoch) -> bool {
        self.valid_from.map_or(true, |t| t < day_end)
            && self.valid_until.map_or(true, |t| t > day_start)
    }

    /// Phase center offset for this [Carrier]
    pub fn offset(&self, carrier: Carrier) -> Option<Vector3<f64>> {
        self.offsets
            .iter()
            .find(|(c, _)| *c == carrier)
            .map(|(_, offset)| *offset)
    }
}

/// ANTEX antenna catalog parser. Only satellite antennas
/// are retained, receiver antennas are skipped.
#[derive(Debug, Default, Copy, Clone)]
pub struct AntexParser {}

fn antex_epoch(content: &str) -> Option<Epoch> {
    let items = content.split_whitespace().collect::<Vec<_>>();
    if items.len() != 6 {
        return None;
    }

    let y = items[0].parse::<i32>().ok()?;
    let m = items[1].parse::<u8>().ok()?;
    let d = items[2].parse::<u8>().ok()?;
    let hh = items[3].parse::<u8>().ok()?;
    let mm = items[4].parse::<u8>().ok()?;
    let secs = items[5].parse::<f64>().ok()?;

    if !(0.0..60.0).contains(&secs) {
        return None;
    }

    let ss = secs.trunc() as u8;
    let ns = ((secs - secs.trunc()) * 1.0E9).round().min(999_999_999.0) as u32;

    Epoch::maybe_from_gregorian_utc(y, m, d, hh, mm, ss, ns).ok()
}

/// Satellite of a `TYPE / SERIAL NO` record (columns 21-40),
/// None for receiver antennas.
fn antex_satellite(content: &str) -> Option<SV> {
    let serial = content.chars().skip(20).take(20).collect::<String>();
    let serial = serial.trim();

    // must start with a constellation letter
    if !serial.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    SV::from_str(serial).ok()
}

struct PendingAntenna {
    sv: Option<SV>,
    antenna: SatelliteAntenna,
    frequency: Option<Carrier>,
}

impl ReferenceParser for AntexParser {
    type Output = Vec<(SV, SatelliteAntenna)>;

    fn parse(&self, path: &Path) -> Result<Self::Output, Error> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_error = |line: usize, reason: &str| Error::ReferenceParse {
            path: path.to_path_buf(),
            line,
            reason: reason.to_string(),
        };

        let mut antennas = Vec::new();
        let mut pending: Option<PendingAntenna> = None;

        for (nth, line) in content.lines().enumerate() {
            let nth = nth + 1;

            let (content, label) = match (line.get(..60), line.get(60..)) {
                (Some(content), Some(label)) => (content, label.trim()),
                _ => (line, ""),
            };

            match label {
                "START OF ANTENNA" => {
                    if pending.is_some() {
                        return Err(parse_error(nth, "missing END OF ANTENNA"));
                    }
                    pending = Some(PendingAntenna {
                        sv: None,
                        antenna: SatelliteAntenna::default(),
                        frequency: None,
                    });
                },
                "END OF ANTENNA" => {
                    let ended = pending
                        .take()
                        .ok_or_else(|| parse_error(nth, "END OF ANTENNA without START"))?;

                    match ended.sv {
                        Some(sv) => antennas.push((sv, ended.antenna)),
                        None => debug!("skipping receiver antenna {}", ended.antenna.antenna_type),
                    }
                },
                "TYPE / SERIAL NO" => {
                    let pending = pending
                        .as_mut()
                        .ok_or_else(|| parse_error(nth, "TYPE / SERIAL NO outside antenna"))?;

                    pending.antenna.antenna_type =
                        content.chars().take(20).collect::<String>().trim().to_string();

                    pending.sv = antex_satellite(content);
                },
                "VALID FROM" | "VALID UNTIL" => {
                    let pending = pending
                        .as_mut()
                        .ok_or_else(|| parse_error(nth, "validity outside antenna"))?;

                    let t = antex_epoch(content)
                        .ok_or_else(|| parse_error(nth, "invalid validity epoch"))?;

                    if label == "VALID FROM" {
                        pending.antenna.valid_from = Some(t);
                    } else {
                        pending.antenna.valid_until = Some(t);
                    }
                },
                "START OF FREQUENCY" => {
                    let pending = pending
                        .as_mut()
                        .ok_or_else(|| parse_error(nth, "frequency outside antenna"))?;

                    let code = content.get(3..6).unwrap_or("").trim();

                    match Carrier::from_antex_code(code) {
                        Ok(carrier) => pending.frequency = Some(carrier),
                        Err(e) => {
                            if pending.sv.is_some() {
                                warn!("{}: {} - skipping frequency", nth, e);
                            }
                            pending.frequency = None;
                        },
                    }
                },
                "END OF FREQUENCY" => {
                    if let Some(pending) = pending.as_mut() {
                        pending.frequency = None;
                    }
                },
                "NORTH / EAST / UP" => {
                    let Some(pending) = pending.as_mut() else {
                        return Err(parse_error(nth, "offset outside antenna"));
                    };

                    let Some(carrier) = pending.frequency else {
                        continue;
                    };

                    let values = content
                        .split_whitespace()
                        .take(3)
                        .map(|item| item.parse::<f64>())
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|_| parse_error(nth, "invalid phase center offset"))?;

                    if values.len() != 3 {
                        return Err(parse_error(nth, "invalid phase center offset"));
                    }

                    let offset = Vector3::new(values[0], values[1], values[2]) * MILLIMETER_M;
                    pending.antenna.offsets.push((carrier, offset));
                },
                _ => {},
            }
        }

        if pending.is_some() {
            return Err(parse_error(
                content.lines().count(),
                "missing END OF ANTENNA",
            ));
        }

        Ok(antennas)
    }
}

/// Satellite phase center offsets catalog, restricted to
/// the antennas valid on the run date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PcoCatalog {
    antennas: HashMap<SV, SatelliteAntenna>,
    carriers: HashMap<Constellation, Vec<Carrier>>,
}

impl PcoCatalog {
    /// Builds [PcoCatalog] from antenna descriptions. When several
    /// descriptions of one satellite are valid on the run date,
    /// the most recent one applies. `carriers` are the preferred frequencies
    /// per [Constellation], first one being the default.
    pub fn new(
        antennas: Vec<(SV, SatelliteAntenna)>,
        run_date: Epoch,
        carriers: &HashMap<Constellation, Vec<Carrier>>,
    ) -> Self {
        let (day_start, day_end) = RunContext::day_bounds(run_date);

        let mut catalog = HashMap::<SV, SatelliteAntenna>::new();

        for (sv, antenna) in antennas {
            if !antenna.is_valid(day_start, day_end) {
                continue;
            }

            let newer = match catalog.get(&sv) {
                Some(existing) => antenna.valid_from > existing.valid_from,
                None => true,
            };

            if newer {
                catalog.insert(sv, antenna);
            }
        }

        Self {
            antennas: catalog,
            carriers: carriers.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.antennas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.antennas.is_empty()
    }

    pub fn antenna(&self, sv: SV) -> Option<&SatelliteAntenna> {
        self.antennas.get(&sv)
    }

    /// Default [Carrier] for this satellite: first preferred frequency
    /// of its constellation, or first frequency described.
    pub fn default_carrier(&self, sv: SV) -> Result<Carrier, Error> {
        if let Some(carrier) = self
            .carriers
            .get(&sv.constellation)
            .and_then(|carriers| carriers.first())
        {
            return Ok(*carrier);
        }

        let antenna = self
            .antennas
            .get(&sv)
            .ok_or(Error::MissingSatelliteAntenna(sv))?;

        antenna
            .offsets
            .first()
            .map(|(carrier, _)| *carrier)
            .ok_or_else(|| Error::MissingFrequency {
                sv,
                code: "any frequency".to_string(),
            })
    }

    /// Phase center offset [m] in satellite body frame.
    /// Uses [Self::default_carrier] when `carrier` is not specified.
    pub fn offset(&self, sv: SV, carrier: Option<Carrier>) -> Result<Vector3<f64>, Error> {
        let carrier = match carrier {
            Some(carrier) => carrier,
            None => self.default_carrier(sv)?,
        };

        self.antennas
            .get(&sv)
            .ok_or(Error::MissingSatelliteAntenna(sv))?
            .offset(carrier)
            .ok_or_else(|| Error::MissingFrequency {
                sv,
                code: carrier.to_string(),
            })
    }

    /// Phase center offset [m] of the observed satellite, for every observation,
    /// rotated to the Earth fixed frame.
    pub fn satellite_phase_center_offset<D: Dataset + ?Sized>(
        &self,
        dataset: &D,
        carrier: Option<Carrier>,
    ) -> Result<Vec<Vector3<f64>>, Error> {
        (0..dataset.len())
            .map(|index| {
                let sv = dataset.sv(index).ok_or(Error::MissingSatellite(index))?;
                let offset = self.offset(sv, carrier)?;
                let attitude = dataset.satellite_attitude(index)?;
                Ok(attitude * offset)
            })
            .collect()
    }
}

/// Antenna correction apriori provider
pub fn antenna_correction(ctx: &RunContext) -> Result<PcoCatalog, Error> {
    let path = &ctx.config().antenna_catalog;
    let antennas = AntexParser::default().parse(path)?;
    let total = antennas.len();

    let catalog = PcoCatalog::new(antennas, ctx.run_date(), &ctx.config().carriers);

    info!(
        "{}: {} satellite antennas ({} described)",
        ctx.run_date(),
        catalog.len(),
        total
    );

    Ok(catalog)
}
