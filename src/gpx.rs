use crate::dataset::TripDataset;
use crate::error::{LoadError, TripError};
use crate::sample::Sample;
use quick_xml::Reader;
use quick_xml::events::Event;
use time::OffsetDateTime;
use tracing::debug;

/// A `<trkpt>` with its position and timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub time: OffsetDateTime,
}

/// Collects every track point carrying latitude, longitude and time.
///
/// Points missing any of the three are skipped.
pub fn extract_track_points(input: &[u8]) -> Result<Vec<TrackPoint>, LoadError> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut track_points = Vec::new();

    let mut in_trkpt = false;
    let mut current_lat: Option<f64> = None;
    let mut current_lon: Option<f64> = None;
    let mut current_time: Option<OffsetDateTime> = None;
    let mut in_time_element = false;
    let mut time_text = String::new();

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Err(e) => {
                return Err(LoadError::Xml {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                });
            }
            Ok(Event::Eof) => break,
            Ok(event) => event.into_owned(),
        };

        match event {
            Event::Start(ref e) => {
                if e.name().as_ref() == b"trkpt" {
                    in_trkpt = true;
                    current_lat = None;
                    current_lon = None;
                    current_time = None;

                    for attr in e.attributes().flatten() {
                        let value = std::str::from_utf8(&attr.value).ok();
                        match attr.key.as_ref() {
                            b"lat" => current_lat = value.and_then(|v| v.trim().parse().ok()),
                            b"lon" => current_lon = value.and_then(|v| v.trim().parse().ok()),
                            _ => {}
                        }
                    }
                } else if in_trkpt && e.name().as_ref() == b"time" {
                    in_time_element = true;
                    time_text.clear();
                }
            }

            Event::End(ref e) => {
                if e.name().as_ref() == b"trkpt" {
                    if let (Some(lat), Some(lon), Some(time)) =
                        (current_lat, current_lon, current_time)
                    {
                        track_points.push(TrackPoint { lat, lon, time });
                    } else {
                        debug!("skipping track point without lat, lon or time");
                    }
                    in_trkpt = false;
                } else if e.name().as_ref() == b"time" && in_trkpt {
                    in_time_element = false;
                    current_time = OffsetDateTime::parse(
                        time_text.trim(),
                        &time::format_description::well_known::Iso8601::DEFAULT,
                    )
                    .ok();
                }
            }

            Event::Text(ref e) => {
                if in_trkpt
                    && in_time_element
                    && let Ok(text) = std::str::from_utf8(e)
                {
                    time_text.push_str(text);
                }
            }

            _ => {}
        }

        buf.clear();
    }

    Ok(track_points)
}

/// Reads a GPX document into a trip.
///
/// Sample times are whole minutes elapsed since the first track point.
pub fn read_gpx(input: &[u8]) -> Result<TripDataset, LoadError> {
    let track_points = extract_track_points(input)?;
    let Some(start) = track_points.first().map(|p| p.time) else {
        return Ok(TripDataset::default());
    };

    let samples = track_points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let minutes = u32::try_from((point.time - start).whole_minutes())
                .map_err(|_| TripError::UnorderedSamples { index })?;
            Ok(Sample::new(minutes, point.lat, point.lon))
        })
        .collect::<Result<Vec<_>, TripError>>()?;

    Ok(TripDataset::new(samples)?)
}
