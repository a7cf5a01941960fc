use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use sha2::{Digest, Sha256};

use crate::models::error::RecorderError;
use crate::models::frame::CompositeFrame;
use crate::processing::avi_format;

/// Streaming MJPEG/AVI writer for one session.
///
/// Frame dimensions are fixed at [`open`](Self::open); every appended frame
/// must match them. The container is only valid after [`close`](Self::close)
/// patches the header and writes the index. If the encoder is dropped while
/// still open (an early return, a panic unwinding through the session) it
/// finalizes itself, so no exit path leaves a truncated file behind.
///
/// ## File Format
/// ```text
/// [224-byte AVI header, counts patched on close]
/// [00dc chunk: 8-byte header | baseline JPEG | pad to even]
/// ...
/// [idx1: 16 bytes per frame]
/// ```
pub struct VideoEncoder {
    file_path: PathBuf,
    file: Option<BufWriter<File>>,
    header: [u8; avi_format::AVI_HEADER_SIZE],
    width: u32,
    height: u32,
    frame_rate: u32,
    quality: u8,
    /// (offset relative to `movi`, payload length) per frame.
    index: Vec<(u32, u32)>,
    movi_bytes: u64,
    largest_chunk: u32,
    /// A chunk write failed part-way; bytes past the last whole chunk are junk.
    torn: bool,
    scratch: Vec<u8>,
}

impl VideoEncoder {
    /// Create `path` (which must not exist yet) and write the initial header.
    pub fn open(
        path: impl Into<PathBuf>,
        frame_width: u32,
        frame_height: u32,
        frame_rate: u32,
        quality: u8,
    ) -> Result<Self, RecorderError> {
        let file_path = path.into();
        if frame_width == 0 || frame_height == 0 || frame_width > u16::MAX as u32 || frame_height > u16::MAX as u32 {
            return Err(RecorderError::Encoding(format!(
                "unsupported frame size {}x{}",
                frame_width, frame_height
            )));
        }
        if frame_rate == 0 {
            return Err(RecorderError::Encoding("frame rate must be positive".into()));
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => RecorderError::Encoding(format!(
                    "refusing to overwrite {}",
                    file_path.display()
                )),
                _ => RecorderError::Encoding(format!("failed to create {}: {}", file_path.display(), e)),
            })?;

        let header = avi_format::generate_avi_header(frame_width, frame_height, frame_rate);
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&header)
            .map_err(|e| RecorderError::Encoding(format!("failed to write header: {}", e)))?;

        log::debug!(
            "Opened {} ({}x{} @ {} fps)",
            file_path.display(),
            frame_width,
            frame_height,
            frame_rate
        );

        Ok(Self {
            file_path,
            file: Some(writer),
            header,
            width: frame_width,
            height: frame_height,
            frame_rate,
            quality: quality.clamp(1, 100),
            index: Vec::new(),
            movi_bytes: 0,
            largest_chunk: 0,
            torn: false,
            scratch: Vec::new(),
        })
    }

    /// JPEG-encode `frame` and append it as the next video frame.
    pub fn append(&mut self, frame: &CompositeFrame) -> Result<(), RecorderError> {
        if frame.width != self.width || frame.height != self.height {
            return Err(RecorderError::Encoding(format!(
                "frame is {}x{}, stream is {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| RecorderError::Encoding("encoder is closed".into()))?;

        self.scratch.clear();
        JpegEncoder::new_with_quality(&mut self.scratch, self.quality)
            .encode(&frame.data, frame.width, frame.height, ExtendedColorType::Rgb8)
            .map_err(|e| RecorderError::Encoding(format!("jpeg encoding failed: {}", e)))?;

        let len = u32::try_from(self.scratch.len())
            .map_err(|_| RecorderError::Encoding("encoded frame too large".into()))?;
        let span = avi_format::frame_chunk_span(len);
        let projected = avi_format::AVI_HEADER_SIZE as u64
            + self.movi_bytes
            + span
            + 8
            + 16 * (self.index.len() as u64 + 1);
        if projected > u32::MAX as u64 {
            return Err(RecorderError::Encoding("AVI 1.0 size limit reached".into()));
        }

        let offset = (4 + self.movi_bytes) as u32;
        if let Err(e) = write_frame_chunk(file, len, &self.scratch) {
            self.torn = true;
            return Err(e);
        }

        self.index.push((offset, len));
        self.movi_bytes += span;
        self.largest_chunk = self.largest_chunk.max(len);
        Ok(())
    }

    /// Write the index, patch the header, flush, and return the SHA-256 of
    /// the finished file. Calling it twice is an error.
    pub fn close(&mut self) -> Result<String, RecorderError> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| RecorderError::Encoding("encoder is already closed".into()))?;

        let io = |e: std::io::Error| RecorderError::Encoding(format!("failed to finalize: {}", e));

        if self.torn {
            let committed = self.bytes_written();
            log::warn!(
                "Discarding partial frame chunk in {}, truncating to {} bytes",
                self.file_path.display(),
                committed
            );
            file.seek(SeekFrom::Start(committed)).map_err(io)?;
            file.get_ref().set_len(committed).map_err(io)?;
            self.torn = false;
        }

        let index_len = (self.index.len() * 16) as u32;
        file.write_all(b"idx1").map_err(io)?;
        file.write_all(&index_len.to_le_bytes()).map_err(io)?;
        for &(offset, len) in &self.index {
            file.write_all(&avi_format::index_entry(offset, len)).map_err(io)?;
        }

        let total = avi_format::AVI_HEADER_SIZE as u64 + self.movi_bytes + 8 + index_len as u64;
        let frames = self.index.len() as u32;
        avi_format::patch_riff_size(&mut self.header, total);
        avi_format::patch_frame_count(&mut self.header, frames);
        avi_format::patch_movi_size(&mut self.header, self.movi_bytes);
        avi_format::patch_buffer_hints(&mut self.header, self.largest_chunk, self.frame_rate);

        file.seek(SeekFrom::Start(0)).map_err(io)?;
        file.write_all(&self.header).map_err(io)?;
        file.flush().map_err(io)?;
        let file = file.into_inner().map_err(|e| io(e.into_error()))?;
        file.sync_all().map_err(io)?;
        drop(file);

        log::debug!("Finalized {} with {} frames", self.file_path.display(), frames);
        sha256_file(&self.file_path)
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn frames_written(&self) -> u64 {
        self.index.len() as u64
    }

    /// Bytes written so far, header and frame chunks included.
    pub fn bytes_written(&self) -> u64 {
        avi_format::AVI_HEADER_SIZE as u64 + self.movi_bytes
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

impl Drop for VideoEncoder {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(e) = self.close() {
                log::error!("Failed to finalize {} on drop: {}", self.file_path.display(), e);
            }
        }
    }
}

/// `00dc` header, payload, and the pad byte for odd lengths.
fn write_frame_chunk(file: &mut BufWriter<File>, len: u32, payload: &[u8]) -> Result<(), RecorderError> {
    let write = |file: &mut BufWriter<File>, data: &[u8]| {
        file.write_all(data)
            .map_err(|e| RecorderError::Encoding(format!("write failed: {}", e)))
    };
    write(file, &avi_format::frame_chunk_header(len))?;
    write(file, payload)?;
    if len % 2 == 1 {
        write(file, &[0])?;
    }
    Ok(())
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, RecorderError> {
    let data = fs::read(path)
        .map_err(|e| RecorderError::Encoding(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
