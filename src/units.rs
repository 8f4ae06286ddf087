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

//! Speed unit conversions.

/// Kilometers per hour in one meter per second.
const KMH_PER_MPS: f64 = 3.6;
/// Meters in one kilometer.
const METERS_PER_KM: f64 = 1000.0;
/// Seconds in one minute.
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Convert a speed in m/s to km/h.
pub fn kmh(speed_mps: f64) -> f64 {
    speed_mps * KMH_PER_MPS
}

/// Convert a speed in m/s to a pace in minutes per kilometer.
///
/// Pace is undefined for a stationary (or backwards) sample, so `None` is
/// returned for non-positive and non-finite speeds instead of an infinity.
pub fn pace(speed_mps: f64) -> Option<f64> {
    if speed_mps.is_finite() && speed_mps > 0.0 {
        Some(METERS_PER_KM / (speed_mps * SECONDS_PER_MINUTE))
    } else {
        None
    }
}
