/// AVI (RIFF) container layout for a single MJPEG video stream.
///
/// The header is a fixed 224 bytes. Frame counts and sizes are written as
/// zero when the file is opened and patched in place on close.
///
/// Layout:
/// ```text
/// [0-11]     "RIFF" <riff size> "AVI "
/// [12-23]    "LIST" <192> "hdrl"
/// [24-87]      "avih" <56> MainAVIHeader
/// [88-99]      "LIST" <116> "strl"
/// [100-163]      "strh" <56> AVIStreamHeader ("vids", "MJPG")
/// [164-211]      "strf" <40> BITMAPINFOHEADER
/// [212-223]  "LIST" <movi size> "movi"
/// [224-]       "00dc" <len> <jpeg> [pad]   (one per frame)
///            "idx1" <16 * frames> entries  (written on close)
/// ```
/// Size of the fixed header, up to and including the `movi` fourcc.
pub const AVI_HEADER_SIZE: usize = 224;

/// Offset of the `movi` fourcc. Index entries are relative to it.
pub const MOVI_FOURCC_OFFSET: u64 = 220;

pub const FRAME_CHUNK_ID: &[u8; 4] = b"00dc";
pub const MJPEG_FOURCC: &[u8; 4] = b"MJPG";

const AVIF_HASINDEX: u32 = 0x10;
const AVIIF_KEYFRAME: u32 = 0x10;

const RIFF_SIZE: usize = 4;
const AVIH_MICROSEC_PER_FRAME: usize = 32;
const AVIH_MAX_BYTES_PER_SEC: usize = 36;
const AVIH_TOTAL_FRAMES: usize = 48;
const AVIH_SUGGESTED_BUFFER: usize = 60;
const AVIH_WIDTH: usize = 64;
const AVIH_HEIGHT: usize = 68;
const STRH_HANDLER: usize = 112;
const STRH_RATE: usize = 132;
const STRH_LENGTH: usize = 140;
const STRH_SUGGESTED_BUFFER: usize = 144;
const MOVI_SIZE: usize = 216;

/// Generate the 224-byte header for a `width`×`height` MJPEG stream at
/// `frame_rate` fps with zero frames.
pub fn generate_avi_header(width: u32, height: u32, frame_rate: u32) -> [u8; AVI_HEADER_SIZE] {
    let mut h = [0u8; AVI_HEADER_SIZE];

    // RIFF + hdrl list
    put_tag(&mut h, 0, b"RIFF");
    put_u32(&mut h, 4, (AVI_HEADER_SIZE - 8) as u32);
    put_tag(&mut h, 8, b"AVI ");
    put_tag(&mut h, 12, b"LIST");
    put_u32(&mut h, 16, 192);
    put_tag(&mut h, 20, b"hdrl");

    // avih
    put_tag(&mut h, 24, b"avih");
    put_u32(&mut h, 28, 56);
    put_u32(&mut h, AVIH_MICROSEC_PER_FRAME, 1_000_000 / frame_rate.max(1));
    put_u32(&mut h, AVIH_MAX_BYTES_PER_SEC, 0);
    put_u32(&mut h, 40, 0); // padding granularity
    put_u32(&mut h, 44, AVIF_HASINDEX);
    put_u32(&mut h, AVIH_TOTAL_FRAMES, 0);
    put_u32(&mut h, 52, 0); // initial frames
    put_u32(&mut h, 56, 1); // streams
    put_u32(&mut h, AVIH_SUGGESTED_BUFFER, 0);
    put_u32(&mut h, AVIH_WIDTH, width);
    put_u32(&mut h, AVIH_HEIGHT, height);
    // [72-87] reserved

    // strl list
    put_tag(&mut h, 88, b"LIST");
    put_u32(&mut h, 92, 116);
    put_tag(&mut h, 96, b"strl");

    // strh
    put_tag(&mut h, 100, b"strh");
    put_u32(&mut h, 104, 56);
    put_tag(&mut h, 108, b"vids");
    put_tag(&mut h, STRH_HANDLER, MJPEG_FOURCC);
    put_u32(&mut h, 116, 0); // flags
    // [120-123] priority + language
    put_u32(&mut h, 124, 0); // initial frames
    put_u32(&mut h, 128, 1); // scale
    put_u32(&mut h, STRH_RATE, frame_rate);
    put_u32(&mut h, 136, 0); // start
    put_u32(&mut h, STRH_LENGTH, 0);
    put_u32(&mut h, STRH_SUGGESTED_BUFFER, 0);
    put_u32(&mut h, 148, u32::MAX); // quality: default
    put_u32(&mut h, 152, 0); // sample size
    put_u16(&mut h, 156, 0); // rcFrame
    put_u16(&mut h, 158, 0);
    put_u16(&mut h, 160, width.min(u16::MAX as u32) as u16);
    put_u16(&mut h, 162, height.min(u16::MAX as u32) as u16);

    // strf (BITMAPINFOHEADER)
    put_tag(&mut h, 164, b"strf");
    put_u32(&mut h, 168, 40);
    put_u32(&mut h, 172, 40);
    put_u32(&mut h, 176, width);
    put_u32(&mut h, 180, height);
    put_u16(&mut h, 184, 1); // planes
    put_u16(&mut h, 186, 24); // bit count
    put_tag(&mut h, 188, MJPEG_FOURCC);
    put_u32(&mut h, 192, width.saturating_mul(height).saturating_mul(3));
    // [196-211] resolution + palette fields, all zero

    // movi list
    put_tag(&mut h, 212, b"LIST");
    put_u32(&mut h, MOVI_SIZE, 4);
    put_tag(&mut h, 220, b"movi");

    h
}

/// 8-byte chunk header for one encoded frame of `len` bytes.
pub fn frame_chunk_header(len: u32) -> [u8; 8] {
    let mut chunk = [0u8; 8];
    chunk[0..4].copy_from_slice(FRAME_CHUNK_ID);
    chunk[4..8].copy_from_slice(&len.to_le_bytes());
    chunk
}

/// Bytes a frame chunk occupies on disk, including header and pad byte.
pub fn frame_chunk_span(len: u32) -> u64 {
    8 + len as u64 + (len as u64 & 1)
}

/// 16-byte `idx1` entry. `offset` is relative to the `movi` fourcc.
pub fn index_entry(offset: u32, len: u32) -> [u8; 16] {
    let mut entry = [0u8; 16];
    entry[0..4].copy_from_slice(FRAME_CHUNK_ID);
    entry[4..8].copy_from_slice(&AVIIF_KEYFRAME.to_le_bytes());
    entry[8..12].copy_from_slice(&offset.to_le_bytes());
    entry[12..16].copy_from_slice(&len.to_le_bytes());
    entry
}

/// Patch the RIFF chunk size at offset 4 (`total_file_size - 8`).
pub fn patch_riff_size(header: &mut [u8], total_file_size: u64) {
    put_u32(header, RIFF_SIZE, (total_file_size - 8) as u32);
}

/// Patch the frame count in both the main and the stream header.
pub fn patch_frame_count(header: &mut [u8], frames: u32) {
    put_u32(header, AVIH_TOTAL_FRAMES, frames);
    put_u32(header, STRH_LENGTH, frames);
}

/// Patch the `movi` list size (fourcc + all frame chunks).
pub fn patch_movi_size(header: &mut [u8], chunk_bytes: u64) {
    put_u32(header, MOVI_SIZE, (4 + chunk_bytes) as u32);
}

/// Patch suggested buffer sizes (largest chunk) and max bytes per second.
pub fn patch_buffer_hints(header: &mut [u8], largest_chunk: u32, frame_rate: u32) {
    let buffer = largest_chunk + 8;
    put_u32(header, AVIH_SUGGESTED_BUFFER, buffer);
    put_u32(header, STRH_SUGGESTED_BUFFER, buffer);
    put_u32(header, AVIH_MAX_BYTES_PER_SEC, buffer.saturating_mul(frame_rate));
}

/// Fields read back from a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AviHeaderInfo {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub total_frames: u32,
    pub stream_length: u32,
    pub codec: [u8; 4],
    pub riff_size: u32,
    pub movi_size: u32,
}

/// Parse a header produced by [`generate_avi_header`]. Returns `None` if
/// the magic tags are not where they should be.
pub fn parse_header(bytes: &[u8]) -> Option<AviHeaderInfo> {
    if bytes.len() < AVI_HEADER_SIZE {
        return None;
    }
    let tags_ok = &bytes[0..4] == b"RIFF"
        && &bytes[8..12] == b"AVI "
        && &bytes[20..24] == b"hdrl"
        && &bytes[24..28] == b"avih"
        && &bytes[100..104] == b"strh"
        && &bytes[164..168] == b"strf"
        && &bytes[220..224] == b"movi";
    if !tags_ok {
        return None;
    }
    let mut codec = [0u8; 4];
    codec.copy_from_slice(&bytes[STRH_HANDLER..STRH_HANDLER + 4]);
    Some(AviHeaderInfo {
        width: get_u32(bytes, AVIH_WIDTH),
        height: get_u32(bytes, AVIH_HEIGHT),
        frame_rate: get_u32(bytes, STRH_RATE),
        total_frames: get_u32(bytes, AVIH_TOTAL_FRAMES),
        stream_length: get_u32(bytes, STRH_LENGTH),
        codec,
        riff_size: get_u32(bytes, RIFF_SIZE),
        movi_size: get_u32(bytes, MOVI_SIZE),
    })
}

fn put_tag(buf: &mut [u8], at: usize, tag: &[u8; 4]) {
    buf[at..at + 4].copy_from_slice(tag);
}

fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn put_u16(buf: &mut [u8], at: usize, v: u16) {
    buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn get_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}
