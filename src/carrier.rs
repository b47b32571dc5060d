use crate::cfg::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Carrier {
    /// L1 (GPS/QZSS/SBAS) same frequency as E1 and B1aB1c
    #[default]
    L1,
    /// L2 (GPS/QZSS)
    L2,
    /// L5 (GPS/QZSS/SBAS) same frequency as E5A and B2A
    L5,
    /// L6 (QZSS) same frequency as E6
    L6,
    /// G1 (Glonass) FDMA center frequency
    G1,
    /// G2 (Glonass) FDMA center frequency
    G2,
    /// E1 (Galileo)
    E1,
    /// E5 (Galileo) same frequency as B2
    E5,
    /// E5A (Galileo) same frequency as L5
    E5A,
    /// E5B (Galileo) same frequency as B2iB2b
    E5B,
    /// E6 (Galileo) same frequency as L6
    E6,
    /// B1aB1c (BDS) same frequency as L1
    B1aB1c,
    /// B1I (BDS)
    B1I,
    /// B2I/B2B (BDS) same frequency as E5b
    B2iB2b,
    /// B2 (BDS) same frequency as E5
    B2,
    /// B2A (BDS) same frequency as L5 and E5A
    B2A,
    /// B3 (BDS)
    B3,
}

impl std::fmt::Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
            Self::L5 => write!(f, "L5"),
            Self::L6 => write!(f, "L6"),
            Self::G1 => write!(f, "G1"),
            Self::G2 => write!(f, "G2"),
            Self::E1 => write!(f, "E1"),
            Self::E5 => write!(f, "E5"),
            Self::E5A => write!(f, "E5A"),
            Self::E5B => write!(f, "E5B"),
            Self::E6 => write!(f, "E6"),
            Self::B1I => write!(f, "B1I"),
            Self::B1aB1c => write!(f, "B1A/B1C"),
            Self::B2iB2b => write!(f, "B2I/B2B"),
            Self::B2 => write!(f, "B2"),
            Self::B3 => write!(f, "B3"),
            Self::B2A => write!(f, "B2A"),
        }
    }
}

impl std::str::FromStr for Carrier {
    type Err = Error;
    fn from_str(s: &str) -> Result<Carrier, Error> {
        let c = s.trim().to_uppercase();
        match c.as_str() {
            "L1" => Ok(Self::L1),
            "L2" => Ok(Self::L2),
            "L5" => Ok(Self::L5),
            "L6" => Ok(Self::L6),
            "G1" => Ok(Self::G1),
            "G2" => Ok(Self::G2),
            "E1" => Ok(Self::E1),
            "E5" => Ok(Self::E5),
            "E5A" => Ok(Self::E5A),
            "E5B" => Ok(Self::E5B),
            "E6" => Ok(Self::E6),
            "B1I" => Ok(Self::B1I),
            "B1A/B1C" | "B1C" => Ok(Self::B1aB1c),
            "B2I/B2B" | "B2I" | "B2B" => Ok(Self::B2iB2b),
            "B2" => Ok(Self::B2),
            "B2A" => Ok(Self::B2A),
            "B3" => Ok(Self::B3),
            _ => Err(Error::UnknownCarrier(c)),
        }
    }
}

impl Carrier {
    /// Identifies [Carrier] from ANTEX frequency code (like `G01`),
    /// which combines the constellation letter and the RINEX band number.
    pub fn from_antex_code(code: &str) -> Result<Self, Error> {
        let code = code.trim().to_uppercase();
        match code.as_str() {
            "G01" | "J01" | "S01" => Ok(Self::L1),
            "G02" | "J02" => Ok(Self::L2),
            "G05" | "J05" | "S05" => Ok(Self::L5),
            "J06" => Ok(Self::L6),
            "R01" => Ok(Self::G1),
            "R02" => Ok(Self::G2),
            "E01" => Ok(Self::E1),
            "E05" => Ok(Self::E5A),
            "E07" => Ok(Self::E5B),
            "E08" => Ok(Self::E5),
            "E06" => Ok(Self::E6),
            "C01" => Ok(Self::B1aB1c),
            "C02" => Ok(Self::B1I),
            "C05" => Ok(Self::B2A),
            "C07" => Ok(Self::B2iB2b),
            "C08" => Ok(Self::B2),
            "C06" => Ok(Self::B3),
            _ => Err(Error::UnknownFrequencyCode(code)),
        }
    }
}
