use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::models::error::RecorderError;
use crate::processing::avi_format::{self, get_u32, FRAME_CHUNK_ID, MOVI_FOURCC_OFFSET};

/// What a finished session video contains, read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AviSummary {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    /// Frame count from the main header.
    pub total_frames: u32,
    pub codec: [u8; 4],
    pub riff_size: u32,
    /// `00dc` chunks actually present in the `movi` list.
    pub frame_chunks: usize,
    /// Entries in the `idx1` index.
    pub index_entries: usize,
}

impl AviSummary {
    /// Parse and cross-check a file written by
    /// [`VideoEncoder`](crate::storage::video_writer::VideoEncoder).
    ///
    /// Fails if the header is missing, the counts disagree with the chunks
    /// on disk, or an index entry points anywhere but a frame chunk.
    pub fn read(path: &Path) -> Result<Self, RecorderError> {
        let bytes = read_file(path)?;
        let (summary, _) = scan(&bytes)?;
        Ok(summary)
    }
}

/// JPEG payload of every frame, in stream order.
pub fn read_frames(path: &Path) -> Result<Vec<Vec<u8>>, RecorderError> {
    let bytes = read_file(path)?;
    let (_, ranges) = scan(&bytes)?;
    Ok(ranges.into_iter().map(|r| bytes[r].to_vec()).collect())
}

fn read_file(path: &Path) -> Result<Vec<u8>, RecorderError> {
    fs::read(path).map_err(|e| RecorderError::Storage(format!("failed to read {}: {}", path.display(), e)))
}

fn malformed(msg: impl Into<String>) -> RecorderError {
    RecorderError::Encoding(format!("malformed AVI: {}", msg.into()))
}

fn scan(bytes: &[u8]) -> Result<(AviSummary, Vec<Range<usize>>), RecorderError> {
    let info = avi_format::parse_header(bytes).ok_or_else(|| malformed("bad header"))?;
    if info.riff_size as usize + 8 != bytes.len() {
        return Err(malformed("RIFF size does not match file length"));
    }
    if info.total_frames != info.stream_length {
        return Err(malformed("main and stream frame counts differ"));
    }

    let movi_start = MOVI_FOURCC_OFFSET as usize;
    let movi_end = movi_start + info.movi_size as usize;
    if movi_end + 8 > bytes.len() {
        return Err(malformed("movi list overruns file"));
    }

    let mut frames = Vec::new();
    let mut pos = avi_format::AVI_HEADER_SIZE;
    while pos < movi_end {
        if pos + 8 > movi_end {
            return Err(malformed("truncated chunk header"));
        }
        let len = get_u32(bytes, pos + 4) as usize;
        let data = pos + 8..pos + 8 + len;
        if data.end > movi_end {
            return Err(malformed("chunk overruns movi list"));
        }
        if &bytes[pos..pos + 4] == FRAME_CHUNK_ID {
            frames.push(data);
        }
        pos += 8 + len + (len & 1);
    }

    if &bytes[movi_end..movi_end + 4] != b"idx1" {
        return Err(malformed("missing idx1 index"));
    }
    let index_len = get_u32(bytes, movi_end + 4) as usize;
    let index_start = movi_end + 8;
    if index_start + index_len > bytes.len() || index_len % 16 != 0 {
        return Err(malformed("bad idx1 size"));
    }
    let index_entries = index_len / 16;
    for (i, entry) in bytes[index_start..index_start + index_len].chunks_exact(16).enumerate() {
        let chunk_at = movi_start + get_u32(entry, 8) as usize;
        let points_at_frame = frames
            .get(i)
            .map(|r| r.start == chunk_at + 8 && r.len() == get_u32(entry, 12) as usize)
            .unwrap_or(false);
        if &entry[0..4] != FRAME_CHUNK_ID || !points_at_frame {
            return Err(malformed(format!("index entry {} does not match frame chunk", i)));
        }
    }

    if frames.len() != info.total_frames as usize || index_entries != frames.len() {
        return Err(malformed(format!(
            "header says {} frames, found {} chunks and {} index entries",
            info.total_frames,
            frames.len(),
            index_entries
        )));
    }

    let summary = AviSummary {
        width: info.width,
        height: info.height,
        frame_rate: info.frame_rate,
        total_frames: info.total_frames,
        codec: info.codec,
        riff_size: info.riff_size,
        frame_chunks: frames.len(),
        index_entries,
    };
    Ok((summary, frames))
}
