//! Optional chrono timestamps stored as BSON dates, so MongoDB compares and
//! sorts them chronologically. Required fields use the driver's
//! `chrono_datetime_as_bson_datetime` helper directly.

use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    value.map(bson::DateTime::from_chrono).serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bson::DateTime>::deserialize(deserializer)?.map(bson::DateTime::to_chrono))
}
