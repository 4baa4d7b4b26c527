//! Camera metadata shown in the print footer.
//!
//! Every new photo gets freshly rolled "analog" values. Whatever the file's
//! embedded EXIF actually records then replaces those values field by field.

use std::collections::HashMap;
use std::io::Cursor;

use chrono::{NaiveDate, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::{ImageError, Result};

/// Tag name to human-readable value
pub type ExifTags = HashMap<String, String>;

pub const TAG_ISO: &str = "ISOSpeedRatings";
pub const TAG_F_NUMBER: &str = "FNumber";
pub const TAG_EXPOSURE_TIME: &str = "ExposureTime";
pub const TAG_DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";

const ISO_CHOICES: [u32; 5] = [100, 200, 400, 800, 1600];
const APERTURE_CHOICES: [f64; 6] = [1.4, 1.8, 2.0, 2.8, 4.0, 5.6];
const SHUTTER_CHOICES: [u32; 5] = [60, 125, 250, 500, 1000];

/// Display strings for the footer; derived, never computed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoMetadata {
    pub iso: String,
    pub aperture: String,
    pub shutter_speed: String,
    pub date: String,
}

impl PhotoMetadata {
    /// The values a fresh or reset session shows
    pub fn defaults(today: NaiveDate) -> Self {
        Self {
            iso: "ISO 400".to_string(),
            aperture: "ƒ/2.8".to_string(),
            shutter_speed: "1/125".to_string(),
            date: display_date(today),
        }
    }

    /// Replace fields with the ones present in `tags`
    ///
    /// Missing tags and unparseable values leave the current field untouched.
    pub fn apply_tags(&mut self, tags: &ExifTags) {
        if let Some(iso) = tag(tags, TAG_ISO) {
            self.iso = format!("ISO {}", iso);
        }

        if let Some(f_number) = tag(tags, TAG_F_NUMBER) {
            let numeric = f_number.trim_start_matches(['f', 'F', 'ƒ', '/']);
            match numeric.parse::<f64>() {
                Ok(value) if value.is_finite() => self.aperture = format!("ƒ/{:.1}", value),
                _ => debug!("Ignoring unparseable FNumber {:?}", f_number),
            }
        }

        if let Some(exposure) = tag(tags, TAG_EXPOSURE_TIME) {
            self.shutter_speed = exposure.to_string();
        }

        if let Some(raw) = tag(tags, TAG_DATE_TIME_ORIGINAL) {
            match parse_exif_date(raw) {
                Some(date) => self.date = display_date(date),
                None => debug!("Ignoring unparseable DateTimeOriginal {:?}", raw),
            }
        }
    }
}

fn tag<'a>(tags: &'a ExifTags, name: &str) -> Option<&'a str> {
    tags.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Format a date as `"SEP 4, 2016"`
pub fn display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string().to_uppercase()
}

/// Parse an EXIF timestamp (`"2016:09:04 11:30:00"`) and a few looser forms
pub fn parse_exif_date(raw: &str) -> Option<NaiveDate> {
    const DATE_TIME_FORMATS: [&str; 3] = ["%Y:%m:%d %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    const DATE_FORMATS: [&str; 2] = ["%Y:%m:%d", "%Y-%m-%d"];

    let raw = raw.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok().map(|dt| dt.date()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

/// Source of embedded image metadata
pub trait ExifReader: Send + Sync {
    /// Read the tags of interest from raw image bytes
    fn read_tags(&self, bytes: &[u8]) -> Result<ExifTags>;
}

/// [`ExifReader`] backed by the `kamadak-exif` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct KamadakExif;

impl ExifReader for KamadakExif {
    fn read_tags(&self, bytes: &[u8]) -> Result<ExifTags> {
        use exif::{In, Tag};

        let exif = exif::Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .map_err(|e| ImageError::DecodeFailed { reason: format!("exif: {}", e) })?;

        let wanted = [
            (Tag::PhotographicSensitivity, TAG_ISO),
            (Tag::FNumber, TAG_F_NUMBER),
            (Tag::ExposureTime, TAG_EXPOSURE_TIME),
            (Tag::DateTimeOriginal, TAG_DATE_TIME_ORIGINAL),
        ];

        let mut tags = ExifTags::new();
        for (tag, name) in wanted {
            let described = exif
                .get_field(tag, In::PRIMARY)
                .and_then(|field| describe(tag, &field.value));
            if let Some(value) = described {
                tags.insert(name.to_string(), value);
            }
        }
        Ok(tags)
    }
}

fn describe(tag: exif::Tag, value: &exif::Value) -> Option<String> {
    use exif::{Tag, Value};

    match (tag, value) {
        (_, Value::Short(v)) => v.first().map(|n| n.to_string()),
        (_, Value::Long(v)) => v.first().map(|n| n.to_string()),
        (t, Value::Rational(v)) if t == Tag::ExposureTime => {
            let r = v.first().filter(|r| r.num != 0 && r.denom != 0)?;
            let seconds = r.to_f64();
            if seconds < 1.0 {
                Some(format!("1/{}", (1.0 / seconds).round()))
            } else {
                Some(format!("{}", seconds))
            }
        }
        (_, Value::Rational(v)) => v
            .first()
            .filter(|r| r.denom != 0)
            .map(|r| format!("{}", r.to_f64())),
        (_, Value::Ascii(v)) => v.first().map(|s| {
            String::from_utf8_lossy(s).trim_end_matches('\0').trim().to_string()
        }),
        _ => None,
    }
}

/// Rolls random analog metadata and merges embedded tags over it
pub struct MetadataDeriver<R> {
    rng: R,
}

impl<R: Rng> MetadataDeriver<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Fresh random values dated `today`
    pub fn random(&mut self, today: NaiveDate) -> PhotoMetadata {
        let iso = ISO_CHOICES.choose(&mut self.rng).copied().unwrap_or(400);
        let aperture = APERTURE_CHOICES.choose(&mut self.rng).copied().unwrap_or(2.8);
        let shutter = SHUTTER_CHOICES.choose(&mut self.rng).copied().unwrap_or(125);

        PhotoMetadata {
            iso: format!("ISO {}", iso),
            aperture: format!("ƒ/{}", aperture),
            shutter_speed: format!("1/{}", shutter),
            date: display_date(today),
        }
    }

    /// Random values overridden by whatever the image embeds
    ///
    /// Reading failures are not errors: the random values are kept.
    pub fn derive(&mut self, bytes: &[u8], reader: &dyn ExifReader, today: NaiveDate) -> PhotoMetadata {
        let mut metadata = self.random(today);
        match reader.read_tags(bytes) {
            Ok(tags) => {
                debug!("Embedded metadata tags found: {}", tags.len());
                metadata.apply_tags(&tags);
            }
            Err(e) => debug!("No EXIF data found, using random analog values ({})", e),
        }
        metadata
    }
}
