use std::io::{Read, Write};
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

/// Byte compressor wrapped around a persisted document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    None,
    #[default]
    Lz4,      // Fast, lz4 frame format
    Zstd,     // Better ratio, slower
    Snappy,   // Balanced
}

impl Codec {
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Codec::None => Ok(data.to_vec()),

            Codec::Lz4 => {
                let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::with_capacity(data.len() / 2));
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }

            Codec::Zstd => {
                zstd::encode_all(data, 3)  // Level 3 is balanced
                    .map_err(|e| Error::new(ErrorKind::Codec, e.to_string()))
            }

            Codec::Snappy => {
                let mut encoder = snap::raw::Encoder::new();
                encoder.compress_vec(data)
                    .map_err(|e| Error::new(ErrorKind::Codec, e.to_string()))
            }
        }
    }

    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Codec::None => Ok(data.to_vec()),

            Codec::Lz4 => {
                let mut decoder = lz4_flex::frame::FrameDecoder::new(data);
                let mut out = Vec::with_capacity(data.len() * 2);
                decoder
                    .read_to_end(&mut out)
                    .map_err(|e| Error::new(ErrorKind::Codec, e.to_string()))?;
                Ok(out)
            }

            Codec::Zstd => {
                zstd::decode_all(data)
                    .map_err(|e| Error::new(ErrorKind::Codec, e.to_string()))
            }

            Codec::Snappy => {
                let mut decoder = snap::raw::Decoder::new();
                decoder.decompress_vec(data)
                    .map_err(|e| Error::new(ErrorKind::Codec, e.to_string()))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Codec::None => "none",
            Codec::Lz4 => "lz4",
            Codec::Zstd => "zstd",
            Codec::Snappy => "snappy",
        }
    }
}
