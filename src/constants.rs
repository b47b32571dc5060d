/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Picoseconds to seconds
pub const PICOSECOND_S: f64 = 1.0E-12;

/// Millimeters to meters
pub const MILLIMETER_M: f64 = 1.0E-3;
