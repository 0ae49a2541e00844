//! Media-type sniffing for files picked by the user.

use crate::error::InputError;
use base64::Engine as _;
use image::ImageFormat;
use std::path::Path;
use std::sync::Arc;

/// An image the user chose, held in memory until it is submitted.
///
/// Only [`SelectedFile::sniff`] builds one, so every instance carries an
/// `image/*` media type.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    name: String,
    media_type: &'static str,
    bytes: Arc<[u8]>,
}

impl SelectedFile {
    /// Accept `bytes` if they look like an image.
    ///
    /// Magic bytes win; the extension of `name` is only consulted when the
    /// content is not recognised, which mirrors how browsers type a file.
    pub fn sniff(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Result<Self, InputError> {
        let name = name.into();
        let bytes = bytes.into();
        let format = image::guess_format(&bytes)
            .ok()
            .or_else(|| ImageFormat::from_path(Path::new(&name)).ok());
        let media_type = format
            .map(|format| format.to_mime_type())
            .filter(|mime| mime.starts_with("image/"));
        match media_type {
            Some(media_type) => {
                tracing::debug!("accepted {name} as {media_type} ({} bytes)", bytes.len());
                Ok(Self {
                    name,
                    media_type,
                    bytes,
                })
            }
            None => {
                tracing::info!("rejected {name}: not an image");
                Err(InputError::NotAnImage { name })
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<mime>;base64,<payload>`, the form the base64 endpoint accepts.
    pub fn to_data_url(&self) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{payload}", self.media_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use rstest::rstest;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(2, 2, Rgb([40, 160, 60]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn png_content_is_accepted_regardless_of_name() {
        let file = SelectedFile::sniff("leaf.txt", png_bytes()).unwrap();
        assert_eq!(file.media_type(), "image/png");
        assert_eq!(file.name(), "leaf.txt");
        assert!(!file.is_empty());
    }

    #[rstest]
    #[case("leaf.jpg", "image/jpeg")]
    #[case("leaf.JPEG", "image/jpeg")]
    #[case("leaf.bmp", "image/bmp")]
    #[case("leaf.gif", "image/gif")]
    fn unknown_content_falls_back_to_extension(#[case] name: &str, #[case] mime: &str) {
        let file = SelectedFile::sniff(name, b"not really decodable".to_vec()).unwrap();
        assert_eq!(file.media_type(), mime);
    }

    #[rstest]
    #[case("notes.txt", b"hello world".to_vec())]
    #[case("report.pdf", b"%PDF-1.7 ...".to_vec())]
    #[case("no_extension", b"\x00\x01\x02".to_vec())]
    #[case("empty.csv", Vec::new())]
    fn non_images_are_rejected(#[case] name: &str, #[case] bytes: Vec<u8>) {
        let err = SelectedFile::sniff(name, bytes).unwrap_err();
        assert!(matches!(err, InputError::NotAnImage { name: n } if n == name));
    }

    #[test]
    fn data_url_carries_mime_and_payload() {
        let file = SelectedFile::sniff("leaf.png", png_bytes()).unwrap();
        let url = file.to_data_url();
        let (head, payload) = url.split_once(',').unwrap();
        assert_eq!(head, "data:image/png;base64");
        let decoded = base64::engine::general_purpose::STANDARD.decode(payload).unwrap();
        assert_eq!(decoded.as_slice(), &file.bytes()[..]);
    }
}
