pub use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

const IMAGE_URL_BASE: &str = "https://uniim-share.shutterfly.com/v2/procgtaserv";

/// A single downloadable photo, as assembled from a picture listing item.
#[derive(Debug, Clone)]
pub struct Photo {
    pub id: String,
    pub title: String,
    pub url: String,
    pub capture_date: Option<DateTime<Utc>>,
}

/// An album and its photos, in remote response order.
#[derive(Debug, Clone)]
pub struct Album {
    pub title: String,
    pub photos: Vec<Photo>,
}

/// Album listing response (`layout=ManagementAlbums`).
#[derive(Deserialize)]
pub struct AlbumListResponse {
    pub result: AlbumListResult,
}

#[derive(Deserialize)]
pub struct AlbumListResult {
    pub section: AlbumListSection,
}

#[derive(Deserialize)]
pub struct AlbumListSection {
    pub groups: Vec<AlbumGroup>,
}

#[derive(Deserialize)]
pub struct AlbumGroup {
    pub title: String,
    #[serde(rename = "nodeId")]
    pub node_id: RemoteId,
}

/// Picture listing response (`layout=ManagementAlbumPictures`).
#[derive(Deserialize)]
pub struct PictureListResponse {
    pub result: PictureListResult,
}

#[derive(Deserialize)]
pub struct PictureListResult {
    pub section: PictureListSection,
}

#[derive(Deserialize)]
pub struct PictureListSection {
    pub items: Vec<PictureItem>,
}

#[derive(Deserialize)]
pub struct PictureItem {
    #[serde(rename = "shutterflyId")]
    pub shutterfly_id: RemoteId,
    pub title: String,
    // absent, null and 0 all mean "no capture date"
    #[serde(rename = "captureDate", default)]
    pub capture_date: Option<f64>,
}

impl PictureItem {
    pub fn into_photo(self) -> Photo {
        let id = self.shutterfly_id.to_string();
        let capture_date = self
            .capture_date
            .filter(|timestamp| *timestamp != 0.0)
            .and_then(|timestamp| DateTime::from_timestamp(timestamp as i64, 0));
        Photo {
            url: image_url(&id),
            id,
            title: self.title,
            capture_date,
        }
    }
}

/// Identifiers arrive as numbers or strings depending on the layout. Object
/// literal numbers are doubles, so whole-valued floats render as integers.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RemoteId {
    Number(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteId::Number(n) => write!(f, "{n}"),
            RemoteId::Float(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            RemoteId::Float(n) => write!(f, "{n}"),
            RemoteId::Text(s) => write!(f, "{s}"),
        }
    }
}

pub fn image_url(id: &str) -> String {
    format!("{IMAGE_URL_BASE}/{id}")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::{AlbumListResponse, PictureItem, RemoteId};

    #[test]
    fn album_listing_object_literal_test() {
        // the command endpoint emits a JS object literal, not strict JSON
        let body = r#"
            {
                result: {
                    success: true,
                    section: {
                        title: 'Albums',
                        groups: [
                            { title: 'Summer 2019', nodeId: 123, },
                            { title: "Untitled", nodeId: "456" },
                        ],
                    },
                },
            }
            "#;
        let parsed = json5::from_str::<AlbumListResponse>(body).unwrap();

        let groups = parsed.result.section.groups;
        assert_eq!(2, groups.len());
        assert_eq!("Summer 2019", groups[0].title);
        assert_eq!("123", groups[0].node_id.to_string());
        assert_eq!("456", groups[1].node_id.to_string());
    }

    #[test]
    fn remote_id_renders_whole_numbers_test() {
        assert_eq!("123", RemoteId::Number(123).to_string());
        assert_eq!("123", RemoteId::Float(123.0).to_string());
        assert_eq!("abc", RemoteId::Text("abc".to_string()).to_string());
    }

    #[test]
    fn picture_item_test() {
        let item_json = r#"
            {
                "shutterflyId": "8b944f03b2f50673b55f",
                "title": "beach day",
                "captureDate": 1651363200,
                "description": ""
             }
            "#;
        let item = serde_json::from_str::<PictureItem>(item_json).unwrap();
        let photo = item.into_photo();

        assert_eq!("8b944f03b2f50673b55f", photo.id);
        assert_eq!("beach day", photo.title);
        assert_eq!(
            "https://uniim-share.shutterfly.com/v2/procgtaserv/8b944f03b2f50673b55f",
            photo.url
        );
        let date_time = chrono::Utc.with_ymd_and_hms(2022, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(Some(date_time), photo.capture_date);
    }

    #[test]
    fn null_capture_date_test() {
        let item_json = r#"{ "shutterflyId": 99, "title": "x", "captureDate": null }"#;
        let item = serde_json::from_str::<PictureItem>(item_json).unwrap();
        assert!(item.into_photo().capture_date.is_none());
    }

    #[test]
    fn zero_capture_date_test() {
        let item_json = r#"{ shutterflyId: 99, title: 'x', captureDate: 0 }"#;
        let item = json5::from_str::<PictureItem>(item_json).unwrap();
        let photo = item.into_photo();
        assert!(photo.capture_date.is_none());
        assert_eq!("99", photo.id);
    }

    #[test]
    fn missing_capture_date_test() {
        let item_json = r#"{ "shutterflyId": "a", "title": "x" }"#;
        let item = serde_json::from_str::<PictureItem>(item_json).unwrap();
        assert!(item.into_photo().capture_date.is_none());
    }
}
