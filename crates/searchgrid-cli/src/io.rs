//! Reading and writing the comma-delimited mission point streams.
//!
//! Every input file is one long comma-delimited list of four-field
//! records: `ordinal, latitude_deg, longitude_deg, altitude_ft`. The
//! output stream has the same shape, with a running ordinal and seven
//! fixed decimals on coordinates.

use anyhow::{bail, Context, Result};
use searchgrid_core::GpsPoint;
use std::fmt::Write as _;

/// One parsed input record. The ordinal is informational only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionRecord {
    pub ordinal: u32,
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub altitude_ft: f64,
}

impl MissionRecord {
    pub fn gps(&self) -> GpsPoint {
        GpsPoint {
            lat_deg: self.lat_deg,
            lon_deg: self.lon_deg,
        }
    }
}

/// Parse a whole comma-delimited stream into records.
pub fn parse_records(text: &str, label: &str) -> Result<Vec<MissionRecord>> {
    let fields: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect();
    if fields.len() % 4 != 0 {
        bail!(
            "{label}: expected four comma-separated fields per record, got {} fields",
            fields.len()
        );
    }
    let mut records = Vec::with_capacity(fields.len() / 4);
    for chunk in fields.chunks_exact(4) {
        let ordinal: f64 = parse_field(chunk[0], label, "ordinal")?;
        let record = MissionRecord {
            ordinal: ordinal as u32,
            lat_deg: parse_field(chunk[1], label, "latitude")?,
            lon_deg: parse_field(chunk[2], label, "longitude")?,
            altitude_ft: parse_field(chunk[3], label, "altitude")?,
        };
        records.push(record);
    }
    Ok(records)
}

fn parse_field(field: &str, label: &str, name: &str) -> Result<f64> {
    field
        .parse()
        .with_context(|| format!("{label}: non-numeric {name} field {field:?}"))
}

/// Accumulates the output stream: a single comma-joined record list with
/// one running ordinal.
#[derive(Debug)]
pub struct WaypointWriter {
    buffer: String,
    next_ordinal: u32,
}

impl Default for WaypointWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WaypointWriter {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            next_ordinal: 1,
        }
    }

    fn separator(&mut self) {
        if self.next_ordinal > 1 {
            self.buffer.push(',');
        }
    }

    /// Echo a mission record with the running ordinal; altitudes on
    /// mission records are written as integers.
    pub fn push_mission(&mut self, record: &MissionRecord) {
        self.separator();
        let _ = write!(
            self.buffer,
            "{},{:.7},{:.7},{}",
            self.next_ordinal, record.lat_deg, record.lon_deg, record.altitude_ft as i64
        );
        self.next_ordinal += 1;
    }

    /// Append a generated waypoint at the configured altitude.
    pub fn push_waypoint(&mut self, point: &GpsPoint, altitude_ft: f64) {
        self.separator();
        let _ = write!(
            self.buffer,
            "{},{:.7},{:.7},{}",
            self.next_ordinal, point.lat_deg, point.lon_deg, altitude_ft as i64
        );
        self.next_ordinal += 1;
    }

    pub fn record_count(&self) -> u32 {
        self.next_ordinal - 1
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}
