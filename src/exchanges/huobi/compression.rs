use crate::core::errors::ExchangeError;
use crate::exchanges::huobi::types::HuobiChannel;
use flate2::read::GzDecoder;
use std::io::Read;

/// Turn a frame payload into text, inflating it on the legacy channels
pub fn decompress(payload: &[u8], channel: HuobiChannel) -> Result<String, ExchangeError> {
    let bytes = if channel.is_gzipped() {
        gunzip(payload)?
    } else {
        payload.to_vec()
    };

    String::from_utf8(bytes)
        .map_err(|e| ExchangeError::ProtocolDecode(format!("Invalid UTF-8 in frame: {}", e)))
}

/// Inflate one complete gzip stream
pub fn gunzip(payload: &[u8]) -> Result<Vec<u8>, ExchangeError> {
    let mut decoder = GzDecoder::new(payload);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| ExchangeError::Decompression(format!("Failed to gunzip frame: {}", e)))?;
    Ok(decompressed)
}
