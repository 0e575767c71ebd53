//! Cover image dimensions straight from the file header.
//!
//! Placing the cover only needs its pixel size, which both PNG and JPEG store near the start
//! of the file. Reading it there avoids decoding the whole image just to lay out a page.

/// Width and height, in pixels for a sniffed image or points for the fallback page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub fn new(width: f32, height: f32) -> Dimensions {
        Dimensions { width, height }
    }
}

/// The container formats a cover may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn detect(bytes: &[u8]) -> Option<ImageFormat> {
        if bytes.starts_with(PNG_SIGNATURE) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8]) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Read an image's pixel size, or return `fallback` if the header can't be understood.
///
/// Falling back to the page size makes the cover fill the page with no centring offset.
pub fn sniff_dimensions(bytes: &[u8], fallback: Dimensions) -> Dimensions {
    let found = match ImageFormat::detect(bytes) {
        Some(ImageFormat::Png) => png_dimensions(bytes),
        Some(ImageFormat::Jpeg) => jpeg_dimensions(bytes),
        None => None,
    };

    match found {
        Some((width, height)) if width > 0 && height > 0 => {
            Dimensions::new(width as f32, height as f32)
        }
        _ => {
            log::warn!("could not read cover image dimensions, filling the page");
            fallback
        }
    }
}

/// IHDR is always the first chunk: 8 byte signature, 4 byte length, 4 byte type, then
/// big-endian width and height.
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < 24 || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    Some((width, height))
}

/// Walk the marker segments until a start-of-frame, whose payload is precision, height, width.
fn jpeg_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let mut i = 2usize;
    while i + 3 < bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        // fill bytes
        if marker == 0xFF {
            i += 1;
            continue;
        }
        // start of scan or end of image: no frame header is coming
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }

        let length = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        if length < 2 {
            return None;
        }

        if is_start_of_frame(marker) {
            if i + 8 >= bytes.len() {
                return None;
            }
            let height = u16::from_be_bytes([bytes[i + 5], bytes[i + 6]]) as u32;
            let width = u16::from_be_bytes([bytes[i + 7], bytes[i + 8]]) as u32;
            return Some((width, height));
        }

        i += 2 + length;
    }
    None
}

/// Baseline, extended sequential and progressive frames.
fn is_start_of_frame(marker: u8) -> bool {
    matches!(marker, 0xC0 | 0xC1 | 0xC2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: Dimensions = Dimensions {
        width: 432.0,
        height: 648.0,
    };

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        // bit depth, colour type, compression, filter, interlace, crc
        bytes.extend_from_slice(&[8, 2, 0, 0, 0, 0, 0, 0, 0]);
        bytes
    }

    fn jpeg_header(width: u16, height: u16, sof: u8) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];
        // APP0 segment with a 16 byte length
        bytes.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        bytes.extend_from_slice(b"JFIF\0");
        bytes.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);
        // frame header
        bytes.extend_from_slice(&[0xFF, sof, 0x00, 0x11, 0x08]);
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&[3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]);
        bytes
    }

    #[test]
    fn can_read_png_dimensions() {
        let dims = sniff_dimensions(&png_header(800, 600), PAGE);
        assert_eq!(dims, Dimensions::new(800.0, 600.0));
    }

    #[test]
    fn can_read_baseline_and_progressive_jpeg_dimensions() {
        let dims = sniff_dimensions(&jpeg_header(1024, 1536, 0xC0), PAGE);
        assert_eq!(dims, Dimensions::new(1024.0, 1536.0));
        let dims = sniff_dimensions(&jpeg_header(640, 480, 0xC2), PAGE);
        assert_eq!(dims, Dimensions::new(640.0, 480.0));
    }

    #[test]
    fn unknown_bytes_fall_back_to_page() {
        assert_eq!(sniff_dimensions(b"definitely not an image", PAGE), PAGE);
        assert_eq!(sniff_dimensions(&[], PAGE), PAGE);
    }

    #[test]
    fn truncated_jpeg_falls_back_to_page() {
        let mut bytes = jpeg_header(640, 480, 0xC0);
        bytes.truncate(20);
        assert_eq!(sniff_dimensions(&bytes, PAGE), PAGE);
    }

    #[test]
    fn can_detect_format() {
        assert_eq!(
            ImageFormat::detect(&png_header(1, 1)),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::detect(&jpeg_header(1, 1, 0xC0)),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect(b"GIF89a"), None);
    }
}
