// Copyright 2024 Viktor Reusch
//
// This file is part of gpx_track_convert.
//
// gpx_track_convert is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// gpx_track_convert is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with gpx_track_convert. If not, see <https://www.gnu.org/licenses/>.

//! Extraction of track points from GPX documents.
//!
//! Two readers exist because the pipelines need different data:
//! [`read_speed_points`] streams the XML itself to reach the per-point speed
//! stored in `<extensions>`, which the `gpx` crate skips, while
//! [`read_track_points`] relies on the `gpx` crate for plain positions.

use std::io::{BufRead, Read};

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::Error;

/// A single sample along a recorded track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    /// Timestamp with the offset it was recorded in.
    pub time: Option<DateTime<FixedOffset>>,
    pub latitude: f64,
    pub longitude: f64,
    /// Instantaneous speed in m/s.
    pub speed: Option<f64>,
}

impl TrackPoint {
    /// Timestamp and speed, if the point carries both.
    pub fn sample(&self) -> Option<(DateTime<FixedOffset>, f64)> {
        Some((self.time?, self.speed?))
    }
}

/// Child element of a `<trkpt>` whose text is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Time,
    Speed,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Field::Time => "time",
            Field::Speed => "speed",
        }
    }
}

/// A `<trkpt>` that has been opened but not yet closed.
struct PendingPoint {
    index: usize,
    latitude: f64,
    longitude: f64,
    time: Option<DateTime<FixedOffset>>,
    speed: Option<f64>,
}

impl PendingPoint {
    /// Start a point from the `lat` and `lon` attributes of `element`.
    fn open(element: &BytesStart, index: usize) -> Result<Self, Error> {
        let mut latitude = None;
        let mut longitude = None;
        for attribute in element.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let field = match attribute.key.local_name().as_ref() {
                b"lat" => "latitude",
                b"lon" => "longitude",
                _ => continue,
            };
            let raw = attribute.unescape_value()?;
            let value = parse_number(raw.trim(), index, field)?;
            if field == "latitude" {
                latitude = Some(value);
            } else {
                longitude = Some(value);
            }
        }

        Ok(PendingPoint {
            index,
            latitude: latitude.ok_or(Error::MissingField {
                index,
                field: "latitude",
            })?,
            longitude: longitude.ok_or(Error::MissingField {
                index,
                field: "longitude",
            })?,
            time: None,
            speed: None,
        })
    }

    fn set(&mut self, field: Field, text: &str) -> Result<(), Error> {
        match field {
            Field::Time => self.time = Some(parse_time(text, self.index)?),
            Field::Speed => {
                let speed = parse_number(text, self.index, field.name())?;
                if !speed.is_finite() {
                    return Err(Error::InvalidValue {
                        index: self.index,
                        field: field.name(),
                        value: text.to_string(),
                    });
                }
                self.speed = Some(speed);
            }
        }
        Ok(())
    }

    /// Close the point; both timestamp and speed are required.
    fn close(self) -> Result<TrackPoint, Error> {
        let time = self.time.ok_or(Error::MissingField {
            index: self.index,
            field: Field::Time.name(),
        })?;
        let speed = self.speed.ok_or(Error::MissingField {
            index: self.index,
            field: Field::Speed.name(),
        })?;
        Ok(TrackPoint {
            time: Some(time),
            latitude: self.latitude,
            longitude: self.longitude,
            speed: Some(speed),
        })
    }
}

/// Read every `<trkpt>` of a GPX document together with its speed.
///
/// Points are returned in document order across all tracks and segments.
/// The speed is taken from any element with the local name `speed` inside the
/// point, which covers both the `<extensions><speed>` layout written by
/// fitness devices and the GPX 1.0 `<speed>` child. Every point must carry a
/// `<time>` and a speed. An empty list means the document has no track data.
pub fn read_speed_points(source: impl BufRead) -> Result<Vec<TrackPoint>, Error> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut points = Vec::new();
    let mut current: Option<PendingPoint> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"trkpt" => current = Some(PendingPoint::open(&e, points.len())?),
                b"time" if current.is_some() => field = Some(Field::Time),
                b"speed" if current.is_some() => field = Some(Field::Speed),
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"trkpt" => {
                let point = PendingPoint::open(&e, points.len())?;
                points.push(point.close()?);
            }
            Event::Text(text) => {
                if let (Some(point), Some(field)) = (current.as_mut(), field) {
                    let text = text.unescape()?;
                    point.set(field, text.trim())?;
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"trkpt" => {
                    if let Some(point) = current.take() {
                        points.push(point.close()?);
                    }
                    field = None;
                }
                b"time" | b"speed" => field = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(points)
}

/// Read the positions of all track points with the `gpx` crate.
///
/// Points of all tracks and segments are concatenated in document order. An
/// empty list means the document has no track, segment, or point data. Only
/// positions and speeds are kept; timestamps are left unset.
pub fn read_track_points(source: impl Read) -> Result<Vec<TrackPoint>, Error> {
    let gpx = gpx::read(source)?;

    let points = gpx
        .tracks
        .into_iter()
        .flat_map(|track| track.segments)
        .flat_map(|segment| segment.points)
        .map(|waypoint| {
            let point = waypoint.point();
            TrackPoint {
                time: None,
                latitude: point.y(),
                longitude: point.x(),
                speed: waypoint.speed,
            }
        })
        .collect();

    Ok(points)
}

fn parse_number(text: &str, index: usize, field: &'static str) -> Result<f64, Error> {
    text.parse().map_err(|_| Error::InvalidValue {
        index,
        field,
        value: text.to_string(),
    })
}

/// Parse an RFC 3339 timestamp keeping its offset; a missing offset is UTC.
fn parse_time(text: &str, index: usize) -> Result<DateTime<FixedOffset>, Error> {
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Ok(time);
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|_| Error::InvalidValue {
            index,
            field: "time",
            value: text.to_string(),
        })
}
