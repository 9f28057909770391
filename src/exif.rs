//! EXIF capture timestamps
//!
//! TIFF files carry their EXIF directory inline and are walked directly,
//! seeking only to the directories we need. Everything else goes through
//! the `image` decoders to get at the embedded EXIF block, which is itself
//! a TIFF structure.

use image::ImageDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use thiserror::Error;

use crate::timestamp::Timestamp;

pub const TAG_DATE_TIME_ORIGINAL: u16 = 36867;
pub const TAG_OFFSET_TIME: u16 = 36880;
pub const TAG_OFFSET_TIME_ORIGINAL: u16 = 36881;

const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
const CAPTURE_TAGS: [u16; 3] = [TAG_DATE_TIME_ORIGINAL, TAG_OFFSET_TIME, TAG_OFFSET_TIME_ORIGINAL];

const FIELD_TYPE_ASCII: u16 = 2;
const MAX_IFD_ENTRIES: u16 = 4096;
const MAX_ASCII_LEN: u32 = 1024;

#[derive(Debug, Error)]
pub enum ExifError {
    #[error("I/O error reading EXIF: {0}")]
    Io(#[from] io::Error),

    #[error("Unable to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("EXIF block is not a TIFF structure")]
    NotTiff,

    #[error("EXIF directory at offset {0} is implausibly large")]
    Corrupt(u32),
}

#[derive(Debug, Clone, Copy)]
struct IfdEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    value: [u8; 4],
}

struct TiffReader<R> {
    inner: R,
    little_endian: bool,
}

impl<R: Read + Seek> TiffReader<R> {
    fn new(mut inner: R) -> Result<Self, ExifError> {
        let mut header = [0u8; 4];
        inner.read_exact(&mut header)?;
        let little_endian = match &header[..2] {
            b"II" => true,
            b"MM" => false,
            _ => return Err(ExifError::NotTiff),
        };
        let reader = Self { inner, little_endian };
        if reader.u16_from([header[2], header[3]]) != 42 {
            return Err(ExifError::NotTiff);
        }
        Ok(reader)
    }

    fn u16_from(&self, bytes: [u8; 2]) -> u16 {
        if self.little_endian {
            u16::from_le_bytes(bytes)
        } else {
            u16::from_be_bytes(bytes)
        }
    }

    fn u32_from(&self, bytes: [u8; 4]) -> u32 {
        if self.little_endian {
            u32::from_le_bytes(bytes)
        } else {
            u32::from_be_bytes(bytes)
        }
    }

    fn read_u16(&mut self) -> io::Result<u16> {
        let mut bytes = [0u8; 2];
        self.inner.read_exact(&mut bytes)?;
        Ok(self.u16_from(bytes))
    }

    fn read_u32(&mut self) -> io::Result<u32> {
        let mut bytes = [0u8; 4];
        self.inner.read_exact(&mut bytes)?;
        Ok(self.u32_from(bytes))
    }

    fn first_ifd_offset(&mut self) -> io::Result<u32> {
        self.inner.seek(SeekFrom::Start(4))?;
        self.read_u32()
    }

    fn read_ifd(&mut self, offset: u32) -> Result<Vec<IfdEntry>, ExifError> {
        self.inner.seek(SeekFrom::Start(u64::from(offset)))?;
        let count = self.read_u16()?;
        if count > MAX_IFD_ENTRIES {
            return Err(ExifError::Corrupt(offset));
        }

        let mut entries = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let tag = self.read_u16()?;
            let field_type = self.read_u16()?;
            let count = self.read_u32()?;
            let mut value = [0u8; 4];
            self.inner.read_exact(&mut value)?;
            entries.push(IfdEntry { tag, field_type, count, value });
        }
        Ok(entries)
    }

    fn read_ascii(&mut self, entry: &IfdEntry) -> Result<Option<String>, ExifError> {
        if entry.field_type != FIELD_TYPE_ASCII || entry.count > MAX_ASCII_LEN {
            return Ok(None);
        }

        let len = entry.count as usize;
        let bytes = if len <= 4 {
            entry.value[..len].to_vec()
        } else {
            let mut buffer = vec![0u8; len];
            self.inner.seek(SeekFrom::Start(u64::from(self.u32_from(entry.value))))?;
            self.inner.read_exact(&mut buffer)?;
            buffer
        };

        let text = String::from_utf8_lossy(&bytes);
        Ok(Some(text.trim_end_matches('\0').to_string()))
    }

    /// Collect the capture related ASCII tags from the EXIF sub-directory
    fn capture_tags(&mut self) -> Result<HashMap<u16, String>, ExifError> {
        let mut tags = HashMap::new();

        let ifd0 = self.first_ifd_offset()?;
        let pointer = self
            .read_ifd(ifd0)?
            .into_iter()
            .find(|entry| entry.tag == TAG_EXIF_IFD_POINTER);
        let Some(pointer) = pointer else {
            return Ok(tags);
        };

        let exif_offset = self.u32_from(pointer.value);
        for entry in self.read_ifd(exif_offset)? {
            if CAPTURE_TAGS.contains(&entry.tag) {
                if let Some(text) = self.read_ascii(&entry)? {
                    tags.insert(entry.tag, text);
                }
            }
        }
        Ok(tags)
    }
}

fn is_tiff_header(header: &[u8]) -> bool {
    header == b"II*\0" || header == b"MM\0*"
}

/// Read the capture timestamp related EXIF tags from an image file
pub fn read_capture_tags(path: &Path) -> Result<HashMap<u16, String>, ExifError> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 4];
    let is_tiff = file.read_exact(&mut header).is_ok() && is_tiff_header(&header);

    if is_tiff {
        file.seek(SeekFrom::Start(0))?;
        return TiffReader::new(BufReader::new(file))?.capture_tags();
    }
    drop(file);

    let mut decoder = image::ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;
    let Some(block) = decoder.exif_metadata()? else {
        return Ok(HashMap::new());
    };

    let tiff = block.strip_prefix(b"Exif\0\0").unwrap_or(&block[..]);
    TiffReader::new(Cursor::new(tiff))?.capture_tags()
}

/// Blank EXIF values are padded with separators; treat those as missing
fn clean_tag(value: &str) -> Option<&str> {
    let value = value.trim();
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, ':' | '+' | '-'))
        .collect();
    if stripped.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Combine the original capture time with its UTC offset, when there is one
pub fn tags_to_timestamp(tags: &HashMap<u16, String>) -> Option<Timestamp> {
    let stamp = tags
        .get(&TAG_DATE_TIME_ORIGINAL)
        .and_then(|value| clean_tag(value))?;

    let offset = tags
        .get(&TAG_OFFSET_TIME_ORIGINAL)
        .and_then(|value| clean_tag(value))
        .or_else(|| tags.get(&TAG_OFFSET_TIME).and_then(|value| clean_tag(value)));

    let combined = match offset {
        Some(offset) => format!("{}{}", stamp, offset),
        None => stamp.to_string(),
    };

    let parsed = Timestamp::parse(&combined);
    if parsed.is_none() {
        tracing::debug!(value = %combined, "Unable to convert EXIF tags to a timestamp");
    }
    parsed
}

/// Capture timestamp of the file, if it has one
pub fn capture_timestamp(path: &Path) -> Result<Option<Timestamp>, ExifError> {
    let tags = read_capture_tags(path)?;
    Ok(tags_to_timestamp(&tags))
}

/// Returns the earlier of the file's capture timestamp and `current`
pub fn earliest_timestamp(path: &Path, current: Option<Timestamp>) -> Option<Timestamp> {
    match capture_timestamp(path) {
        Ok(Some(found)) => Some(current.map_or(found, |current| current.earliest(found))),
        Ok(None) => current,
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "Unable to get timestamp from file");
            current
        }
    }
}
