use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use filetime::FileTime;
use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use reqwest::cookie::Jar;
use reqwest::{Client, Url, header};
use uuid::Uuid;

use crate::geo::{Coordinate, Dms};
use crate::model::{Album, AlbumListResponse, Photo, PictureListResponse};
use crate::sanitize::sanitize_file_name;

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:96.0) Gecko/20100101 Firefox/96.0";
const COMMAND_URL: &str = "https://cmd.shutterfly.com/commands/pictures/getitems";
const AUTH_COOKIE_NAME: &str = "ShrAuth";
const LAYOUT_ALBUMS: &str = "ManagementAlbums";
const LAYOUT_ALBUM_PICTURES: &str = "ManagementAlbumPictures";
// the site's content tree root, where the album groups hang
const ROOT_NODE_ID: &str = "5";

// name the service gives untitled photos
const UNTITLED_NAME: &str = "file.jpg";
const DOWNLOAD_BUFFER_SIZE: usize = 64 * 1024;

pub struct ShareSiteClient {
    site: String,
    client: Client,
}

impl ShareSiteClient {
    pub fn new(token: &str, site: &str) -> Result<ShareSiteClient> {
        // the cookie is scoped to the command host, so photo byte requests
        // to the image host go out without the token
        let command_url = COMMAND_URL.parse::<Url>()?;
        let jar = Arc::new(Jar::default());
        jar.add_cookie_str(&format!("{AUTH_COOKIE_NAME}={token}"), &command_url);

        Ok(ShareSiteClient {
            site: site.to_string(),
            client: Self::build_client(jar)?,
        })
    }

    fn build_client(jar: Arc<Jar>) -> Result<Client> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        let client = Client::builder()
            .default_headers(headers)
            .cookie_provider(jar)
            .build()?;
        Ok(client)
    }

    /// Fetches every album of the site, photos included.
    pub async fn fetch_albums(&self) -> Result<Vec<Album>> {
        let body = self.fetch_items(LAYOUT_ALBUMS, ROOT_NODE_ID).await?;
        debug!("Response: {body}");
        let listing = json5::from_str::<AlbumListResponse>(&body)
            .context("album listing did not have the expected shape")?;

        let groups = listing.result.section.groups;
        let mut albums = Vec::with_capacity(groups.len());
        for group in groups {
            info!("Fetching album: {}", group.title);
            let body = self
                .fetch_items(LAYOUT_ALBUM_PICTURES, &group.node_id.to_string())
                .await?;
            debug!("Response: {body}");
            let listing = json5::from_str::<PictureListResponse>(&body).with_context(|| {
                format!(
                    "picture listing for album {:?} did not have the expected shape",
                    group.title
                )
            })?;

            let photos = listing
                .result
                .section
                .items
                .into_iter()
                .map(|item| item.into_photo())
                .collect();
            albums.push(Album {
                title: group.title,
                photos,
            });
        }

        Ok(albums)
    }

    async fn fetch_items(&self, layout: &str, node_id: &str) -> Result<String> {
        let page = format!("{site}/pictures", site = self.site);
        let params = [
            ("startIndex", "0"),
            ("size", "-1"),
            ("pageSize", "-1"),
            ("page", page.as_str()),
            ("nodeId", node_id),
            ("format", "json"),
            ("layout", layout),
        ];

        let response = self
            .client
            .post(format!("{COMMAND_URL}?site={site}", site = self.site))
            .form(&params)
            .send()
            .await?;
        Ok(response.text().await?)
    }

    /// Downloads all the given albums to the given directory.
    ///
    /// Returns false when the directory is missing or not a directory; that
    /// is the only non-fatal failure. Already-present files are skipped.
    pub async fn download_albums(
        &self,
        albums: &[Album],
        download_dir: &Path,
        coordinate: Option<&Coordinate>,
    ) -> Result<bool> {
        if !download_dir.is_dir() {
            error!(
                "Does not exist or is not a directory: {}",
                download_dir.display()
            );
            return Ok(false);
        }

        for album in albums {
            info!("Downloading album: {}", album.title);
            let album_dir = download_dir.join(sanitize_file_name(&album.title.replace('/', " ")));
            create_dir_all(&album_dir)
                .with_context(|| format!("could not create {}", album_dir.display()))?;

            let progress = ProgressBar::new(album.photos.len() as u64);
            for photo in &album.photos {
                self.download_photo(photo, &album_dir, coordinate).await?;
                progress.inc(1);
            }
            progress.finish_and_clear();
        }

        Ok(true)
    }

    async fn download_photo(
        &self,
        photo: &Photo,
        album_dir: &Path,
        coordinate: Option<&Coordinate>,
    ) -> Result<()> {
        let stem = sanitize_file_name(&photo.title);
        if !is_reserved_name(&stem) {
            let existing = album_dir.join(&stem);
            if existing.exists() {
                debug!("> {} exists already, so skipping download", existing.display());
                return Ok(());
            }
        }

        let path = album_dir.join(photo_file_name(&stem));
        info!("> Downloading image: {}", path.display());
        self.save_photo(photo, &path).await?;

        if let Some(coordinate) = coordinate {
            if let Err(err) = write_gps_tags(&path, coordinate) {
                warn!("Unable to store EXIF data: {err}");
            }
        }

        if let Some(taken) = photo.capture_date {
            set_photo_times(&path, taken)?;
        }

        Ok(())
    }

    async fn save_photo(&self, photo: &Photo, path: &Path) -> Result<()> {
        let mut response = self.client.get(&photo.url).send().await?;

        let file = File::create(path)
            .with_context(|| format!("could not create {}", path.display()))?;
        let mut writer = BufWriter::with_capacity(DOWNLOAD_BUFFER_SIZE, file);
        while let Some(chunk) = response.chunk().await? {
            writer.write_all(&chunk)?;
        }
        writer.flush()?;

        Ok(())
    }
}

fn is_reserved_name(stem: &str) -> bool {
    stem.is_empty() || stem == UNTITLED_NAME
}

fn photo_file_name(stem: &str) -> String {
    if is_reserved_name(stem) {
        // untitled photos all collide on the service's fallback name
        return format!("{}.jpg", Uuid::new_v4());
    }
    if stem.contains('.') {
        stem.to_string()
    } else {
        format!("{stem}.jpg")
    }
}

// Reference tags are always N/W; a southern or eastern coordinate keeps its
// sign inside the rationals instead.
fn write_gps_tags(path: &Path, coordinate: &Coordinate) -> Result<(), rexiv2::Rexiv2Error> {
    let metadata = rexiv2::Metadata::new_from_path(path)?;
    metadata.set_tag_string("Exif.GPSInfo.GPSLatitude", &dms_rationals(coordinate.latitude))?;
    metadata.set_tag_string("Exif.GPSInfo.GPSLatitudeRef", "N")?;
    metadata.set_tag_string(
        "Exif.GPSInfo.GPSLongitude",
        &dms_rationals(coordinate.longitude),
    )?;
    metadata.set_tag_string("Exif.GPSInfo.GPSLongitudeRef", "W")?;
    metadata.save_to_file(path)
}

fn dms_rationals((degrees, minutes, seconds): Dms) -> String {
    format!("{degrees}/1 {minutes}/1 {seconds}/1")
}

fn set_photo_times(path: &Path, taken: DateTime<Utc>) -> Result<()> {
    // capture dates apply at minute precision, to both atime and mtime
    let timestamp = taken.timestamp();
    let file_time = FileTime::from_unix_time(timestamp - timestamp.rem_euclid(60), 0);
    filetime::set_file_times(path, file_time, file_time)?;
    Ok(())
}
