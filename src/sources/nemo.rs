//! NEMO tracking service integration

use std::fs;
use std::io::Read;

use geo::geometry::Point;
use serde::Deserialize;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::info;

use super::PositionsSource;
use crate::PositionReport;

/// Login of the tracking service
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Credentials {
    pub id: String,
    pub pwd: String,
}

impl Credentials {
    /// Load the parameter file, eg.: `{"id": "...", "pwd": "..."}`
    pub fn load(path: &str) -> Result<Self, String> {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("Failed on read the parameter file: {}", e))?;

        serde_json::from_str(&raw)
            .map_err(|e| format!("Failed on parse the parameter file: {}", e))
    }
}

#[derive(Debug, Deserialize)]
struct Payload {
    data: Option<Vec<Record>>,
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(rename = "locDate")]
    loc_date: String,
    loc: Vec<f64>,
    speed: Option<f64>,
    heading: Option<f64>,
}

/// Parse the positions payload of the service
pub fn parse_payload(json: &str) -> Result<Vec<PositionReport>, String> {
    let payload: Payload =
        serde_json::from_str(json).map_err(|e| format!("Failed on parse the payload: {}", e))?;

    let records = payload.data.unwrap_or_default();
    info!("Number of points: {}", records.len());

    records
        .iter()
        .map(|rec| {
            parse_record(rec).map_err(|e| format!("Error with record {}: {}", rec.loc_date, e))
        })
        .collect()
}

fn parse_record(rec: &Record) -> Result<PositionReport, String> {
    if rec.loc.len() != 2 {
        return Err("Coordinates size invalid".to_string());
    }

    let time = PrimitiveDateTime::parse(
        &rec.loc_date,
        format_description!("[year]-[month]-[day]_[hour]:[minute]:[second]"),
    )
    .map_err(|e| format!("Failed on parse the time: {}", e))?
    .assume_utc();

    Ok(PositionReport {
        coordinates: Point::new(rec.loc[0], rec.loc[1]),
        time,
        speed: rec.speed,
        heading: rec.heading,
    })
}

/// Saved payload source
pub struct JsonSource<T>
where
    T: Read,
{
    rdr: T,
}

impl<T> JsonSource<T>
where
    T: Read,
{
    pub fn new(rdr: T) -> Self {
        Self { rdr }
    }
}

impl<T> PositionsSource for JsonSource<T>
where
    T: Read,
{
    fn fetch(
        &mut self,
        _start: OffsetDateTime,
        _end: OffsetDateTime,
    ) -> Result<Vec<PositionReport>, String> {
        let mut json = String::new();
        self.rdr
            .read_to_string(&mut json)
            .map_err(|e| format!("Failed on read the payload: {}", e))?;

        parse_payload(&json)
    }
}

#[cfg(feature = "http")]
pub use api::NemoApiSource;

#[cfg(feature = "http")]
mod api {
    use reqwest::blocking::Client;
    use time::macros::format_description;
    use time::OffsetDateTime;
    use tracing::info;

    use super::{parse_payload, Credentials};
    use crate::sources::PositionsSource;
    use crate::PositionReport;

    const POSITIONS_URL: &str = "https://fishweb-nemo.cls.fr/uda/resources/positions";

    const FIELDS: &str = "heading,speed,mobileId,loc,locDate,nature,source,mobileName,\
        mobileMmsi,qualityOverall,mobileCountryCode,mobileType,radarEchoId,mobileImo,mobileCallSign";

    /// Tracking service source, over HTTP
    pub struct NemoApiSource {
        client: Client,
        url: String,
        credentials: Credentials,
    }

    impl NemoApiSource {
        pub fn new(credentials: Credentials) -> Self {
            Self {
                client: Client::new(),
                url: POSITIONS_URL.to_string(),
                credentials,
            }
        }

        pub fn url(mut self, url: String) -> Self {
            self.url = url;

            self
        }
    }

    /// Date format of the service, eg.: `2022-10-13_11:02:37.380000000`
    pub fn api_date(date: OffsetDateTime) -> Result<String, String> {
        date.format(format_description!(
            "[year]-[month]-[day]_[hour]:[minute]:[second].[subsecond digits:9]"
        ))
        .map_err(|e| format!("Failed on format the date: {}", e))
    }

    impl PositionsSource for NemoApiSource {
        fn fetch(
            &mut self,
            start: OffsetDateTime,
            end: OffsetDateTime,
        ) -> Result<Vec<PositionReport>, String> {
            let from = api_date(start)?;
            let to = api_date(end)?;
            info!("Start date: {}", from);
            info!("End date: {}", to);

            let json = self
                .client
                .get(&self.url)
                .query(&[
                    ("application", "umv"),
                    ("login", self.credentials.id.as_str()),
                    ("password", self.credentials.pwd.as_str()),
                    ("orderBy", "locDate"),
                    ("fields", FIELDS),
                    ("from", from.as_str()),
                    ("to", to.as_str()),
                    ("dateType", "creation"),
                    ("mode", "default"),
                ])
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.text())
                .map_err(|e| format!("Failed on fetch the positions: {}", e))?;

            parse_payload(&json)
        }
    }

}
