use anyhow::{Context, Result, bail};

/// Degrees, minutes, seconds. A negative source value puts its sign on the
/// first non-zero component only.
pub type Dms = (i32, i32, i32);

#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub latitude: Dms,
    pub longitude: Dms,
}

/// Converts a decimal geo coordinate to (degrees, minutes, seconds).
///
/// Fractions of a second are truncated. Values outside the usual
/// ±90/±180 ranges are accepted as-is.
pub fn decimal_to_dms(decimal: f64) -> Dms {
    let negative = decimal < 0.0;
    let (minutes, seconds) = div_mod(decimal.abs() * 3600.0, 60.0);
    let (degrees, minutes) = div_mod(minutes, 60.0);

    let mut degrees = degrees as i32;
    let mut minutes = minutes as i32;
    let mut seconds = seconds as i32;
    if negative {
        if degrees > 0 {
            degrees = -degrees;
        } else if minutes > 0 {
            minutes = -minutes;
        } else {
            seconds = -seconds;
        }
    }
    (degrees, minutes, seconds)
}

/// Converts a "LAT,LONG" decimal pair to a DMS coordinate.
///
/// See: https://en.wikipedia.org/wiki/Geographic_coordinate_conversion
pub fn lat_long_decimal_to_dms(coord: &str) -> Result<Coordinate> {
    let parts: Vec<&str> = coord.split(',').collect();
    if parts.len() != 2 {
        bail!("expected geo coordinates as \"LAT,LONG\", got {coord:?}");
    }
    let latitude = parse_decimal(parts[0])?;
    let longitude = parse_decimal(parts[1])?;
    Ok(Coordinate {
        latitude: decimal_to_dms(latitude),
        longitude: decimal_to_dms(longitude),
    })
}

fn parse_decimal(part: &str) -> Result<f64> {
    part.trim()
        .parse::<f64>()
        .with_context(|| format!("{part:?} is not a decimal coordinate"))
}

fn div_mod(value: f64, by: f64) -> (f64, f64) {
    ((value / by).floor(), value % by)
}
