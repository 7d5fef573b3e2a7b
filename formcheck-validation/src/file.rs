// Uploaded files and file validators

use crate::{Arg, CheckError, Context, Failure, FailureKind, Input, Rule};
use formcheck_log::{debug, warn};
use parking_lot::Mutex;
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// Number of leading bytes inspected when sniffing a content type.
pub const SNIFF_LEN: usize = 512;

/// MIME types accepted by [`Image`].
pub const IMAGE_TYPES: [&str; 3] = ["image/gif", "image/jpeg", "image/png"];

/// Readable, seekable content behind a [`FileHandle`].
pub trait Source: Read + Seek + Send {}

impl<T: Read + Seek + Send> Source for T {}

/// An uploaded file.
///
/// Every access rewinds the content to its start before and after reading,
/// also when the read fails, so later readers see the whole file.
pub struct FileHandle {
    filename: String,
    source: Mutex<Box<dyn Source>>,
}

impl FileHandle {
    pub fn new(filename: impl Into<String>, source: impl Source + 'static) -> Self {
        Self {
            filename: filename.into(),
            source: Mutex::new(Box::new(source)),
        }
    }

    /// In-memory file.
    pub fn from_bytes(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::new(filename, Cursor::new(data.into()))
    }

    /// Open a file on disk. The file name is the path's last component.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(filename, File::open(path)?))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Size in bytes.
    pub fn size(&self) -> io::Result<u64> {
        self.rewound(|source| source.seek(SeekFrom::End(0)))
    }

    /// Content type sniffed from the first [`SNIFF_LEN`] bytes, without
    /// parameters (`text/plain`, not `text/plain; charset=utf-8`).
    pub fn content_type(&self) -> io::Result<String> {
        self.rewound(|source| {
            let mut head = Vec::with_capacity(SNIFF_LEN);
            source.take(SNIFF_LEN as u64).read_to_end(&mut head)?;
            Ok(essence(&detect_content_type(&head)))
        })
    }

    /// Read the whole content.
    pub fn read_all(&self) -> io::Result<Vec<u8>> {
        self.rewound(|source| {
            let mut data = Vec::new();
            source.read_to_end(&mut data)?;
            Ok(data)
        })
    }

    fn rewound<T>(&self, f: impl FnOnce(&mut dyn Source) -> io::Result<T>) -> io::Result<T> {
        let mut source = self.source.lock();
        source.seek(SeekFrom::Start(0))?;
        let result = f(&mut **source);
        let rewound = source.seek(SeekFrom::Start(0));
        let value = result?;
        rewound?;
        Ok(value)
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}

/// Strip parameters from a media type.
fn essence(content_type: &str) -> String {
    match content_type.parse::<mime::Mime>() {
        Ok(parsed) => parsed.essence_str().to_string(),
        Err(_) => content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_string(),
    }
}

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b\x08", "application/x-gzip"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"OggS\x00", "application/ogg"),
    (b"ID3", "audio/mpeg"),
];

/// Media type of `head`, the first bytes of a file.
pub fn detect_content_type(head: &[u8]) -> String {
    if let Ok(format) = image::guess_format(head) {
        return format.to_mime_type().to_string();
    }

    if let Some((_, mime)) = SIGNATURES.iter().find(|(sig, _)| head.starts_with(sig)) {
        return mime.to_string();
    }

    let trimmed = trim_leading_whitespace(head);
    if starts_with_ignore_case(trimmed, b"<!doctype html")
        || starts_with_ignore_case(trimmed, b"<html")
    {
        return mime::TEXT_HTML_UTF_8.to_string();
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8".to_string();
    }

    if head.iter().any(|&b| is_binary_byte(b)) {
        mime::APPLICATION_OCTET_STREAM.to_string()
    } else {
        mime::TEXT_PLAIN_UTF_8.to_string()
    }
}

fn trim_leading_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0c' | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

fn starts_with_ignore_case(data: &[u8], prefix: &[u8]) -> bool {
    data.len() >= prefix.len() && data[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}

/// Inspect an uploaded file, skipping files that cannot be read.
///
/// Files are only inspected while the field has no failure yet.
fn inspect_file<T>(
    rule: &'static str,
    input: Input<'_>,
    ctx: &Context<'_>,
    inspect: impl FnOnce(&FileHandle) -> io::Result<T>,
) -> Option<T> {
    let file = input.as_file()?;

    if ctx.field_has_failures() {
        debug!(
            target: "formcheck::file",
            "skipping {} on {:?} for field {}: field already failed",
            rule,
            file.filename(),
            ctx.field()
        );
        return None;
    }

    match inspect(file) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                target: "formcheck::file",
                "cannot read {:?} for field {}, skipping {}: {}",
                file.filename(),
                ctx.field(),
                rule,
                e
            );
            None
        }
    }
}

/// Sniffed content type must be one of the listed MIME types.
#[derive(Debug, Clone)]
pub struct FileType {
    types: Vec<String>,
}

impl FileType {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn validate(&self, content_type: &str) -> Result<(), Failure> {
        if self.types.iter().any(|t| t == content_type) {
            Ok(())
        } else {
            Err(Failure::new(FailureKind::BadFileType).with_arg(Arg::List(self.types.clone())))
        }
    }
}

impl Rule for FileType {
    fn name(&self) -> &'static str {
        "filetype"
    }

    fn check(&self, input: Input<'_>, ctx: &Context<'_>) -> Result<Vec<Failure>, CheckError> {
        Ok(inspect_file(self.name(), input, ctx, FileHandle::content_type)
            .and_then(|content_type| self.validate(&content_type).err())
            .into_iter()
            .collect())
    }
}

/// GIF, JPEG or PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct Image;

impl Image {
    pub fn validate(&self, content_type: &str) -> Result<(), Failure> {
        if IMAGE_TYPES.contains(&content_type) {
            Ok(())
        } else {
            Err(Failure::new(FailureKind::NotImage))
        }
    }
}

impl Rule for Image {
    fn name(&self) -> &'static str {
        "image"
    }

    fn check(&self, input: Input<'_>, ctx: &Context<'_>) -> Result<Vec<Failure>, CheckError> {
        Ok(inspect_file(self.name(), input, ctx, FileHandle::content_type)
            .and_then(|content_type| self.validate(&content_type).err())
            .into_iter()
            .collect())
    }
}

/// Validates minimum file size in bytes
#[derive(Debug, Clone, Copy)]
pub struct MinFileSize(pub u64);

impl MinFileSize {
    pub fn validate(&self, size: u64) -> Result<(), Failure> {
        if size < self.0 {
            Err(Failure::new(FailureKind::MinFileSize).with_arg(Arg::Count(self.0)))
        } else {
            Ok(())
        }
    }
}

/// Validates maximum file size in bytes
#[derive(Debug, Clone, Copy)]
pub struct MaxFileSize(pub u64);

impl MaxFileSize {
    pub fn validate(&self, size: u64) -> Result<(), Failure> {
        if size > self.0 {
            Err(Failure::new(FailureKind::MaxFileSize).with_arg(Arg::Count(self.0)))
        } else {
            Ok(())
        }
    }
}

/// Inclusive file size range. The lower bound is checked first.
#[derive(Debug, Clone, Copy)]
pub struct FileSizeRange {
    pub min: u64,
    pub max: u64,
}

impl FileSizeRange {
    pub fn validate(&self, size: u64) -> Result<(), Failure> {
        MinFileSize(self.min).validate(size)?;
        MaxFileSize(self.max).validate(size)
    }
}

macro_rules! size_rule {
    ($ty:ty, $name:literal) => {
        impl Rule for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn check(
                &self,
                input: Input<'_>,
                ctx: &Context<'_>,
            ) -> Result<Vec<Failure>, CheckError> {
                Ok(inspect_file(self.name(), input, ctx, FileHandle::size)
                    .and_then(|size| self.validate(size).err())
                    .into_iter()
                    .collect())
            }
        }
    };
}

size_rule!(MinFileSize, "minfilesize");
size_rule!(MaxFileSize, "maxfilesize");
size_rule!(FileSizeRange, "rangefilesize");
