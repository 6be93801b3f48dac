//! Plain-image measurement.
//!
//! Plain items carry no geometry on the server, so the image's pixel size
//! comes from the file itself. Only the header is parsed: the raster is
//! never allocated, so images past the decoder's allocation limit still
//! measure. A body that is corrupt beyond the header fails later, when the
//! surface loads the texture.

use std::io::Cursor;

use bytes::Bytes;
use image::ImageReader;

use crate::error::ViewerError;

/// Read the `(width, height)` in pixels from the header of `data`.
///
/// The format is sniffed from the bytes; the declared media type is not
/// trusted.
pub fn decode_dimensions(data: &[u8]) -> Result<(u32, u32), String> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;

    if reader.format().is_none() {
        return Err("unrecognized image format".to_string());
    }

    reader.into_dimensions().map_err(|e| e.to_string())
}

/// Measure the downloaded file `file_id` off the async runtime.
pub async fn measure(file_id: &str, data: Bytes) -> Result<(u32, u32), ViewerError> {
    let decode_failed = |message: String| ViewerError::ImageDecodeFailed {
        file_id: file_id.to_string(),
        message,
    };

    tokio::task::spawn_blocking(move || decode_dimensions(&data))
        .await
        .map_err(|e| decode_failed(e.to_string()))?
        .map_err(decode_failed)
}
