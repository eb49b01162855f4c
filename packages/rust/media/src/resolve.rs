//! Turning an image locator into verified image bytes.

use std::path::Path;

use image::ImageFormat;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;

use crate::error::ImageFailure;

/// Image bytes that decoded successfully.
#[derive(Debug, Clone)]
pub struct VerifiedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl VerifiedImage {
    /// Content-addressed upload name, e.g. `3f2a9c0d1e4b5a67.png`.
    pub fn file_name(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        let hex: String = digest[..8].iter().map(|b| format!("{b:02x}")).collect();
        let ext = self.format.extensions_str().first().copied().unwrap_or("bin");
        format!("{hex}.{ext}")
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Where the bytes for a locator come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Remote(Url),
    Local(String),
}

impl ImageSource {
    /// Locators with a URL scheme are remote; anything else is a file path.
    pub fn classify(locator: &str) -> Self {
        match Url::parse(locator) {
            Ok(url) => Self::Remote(url),
            Err(_) => Self::Local(locator.to_string()),
        }
    }
}

/// Fetches image bytes from disk or over HTTP.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    client: Client,
}

impl ImageResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Read the bytes behind `locator`. Relative paths resolve against `base_dir`.
    pub async fn resolve(&self, locator: &str, base_dir: &Path) -> Result<Vec<u8>, ImageFailure> {
        match ImageSource::classify(locator) {
            ImageSource::Remote(url) => self.fetch_remote(locator, url).await,
            ImageSource::Local(path) => read_local(locator, &base_dir.join(path)).await,
        }
    }

    async fn fetch_remote(&self, locator: &str, url: Url) -> Result<Vec<u8>, ImageFailure> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ImageFailure::resolve(
                locator,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        debug!(%url, "fetching remote image");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageFailure::resolve(locator, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageFailure::resolve(locator, format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageFailure::resolve(locator, format!("body read failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

async fn read_local(locator: &str, path: &Path) -> Result<Vec<u8>, ImageFailure> {
    let path = std::path::absolute(path).map_err(|e| ImageFailure::resolve(locator, e))?;
    debug!(path = %path.display(), "reading local image");
    tokio::fs::read(&path)
        .await
        .map_err(|e| ImageFailure::resolve(locator, format!("{}: {e}", path.display())))
}

/// Check that `bytes` decode as a supported raster image.
pub fn verify_image(locator: &str, bytes: Vec<u8>) -> Result<VerifiedImage, ImageFailure> {
    let format = image::guess_format(&bytes).map_err(|e| ImageFailure::verify(locator, e))?;
    image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| ImageFailure::verify(locator, e))?;
    Ok(VerifiedImage { bytes, format })
}

/// [`verify_image`] on the blocking thread pool, off the async executor.
pub async fn verify_image_blocking(
    locator: &str,
    bytes: Vec<u8>,
) -> Result<VerifiedImage, ImageFailure> {
    let owned = locator.to_string();
    tokio::task::spawn_blocking(move || verify_image(&owned, bytes))
        .await
        .map_err(|e| ImageFailure::verify(locator, format!("decode task failed: {e}")))?
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, RgbImage};

    fn encode(format: ImageFormat, pixel: [u8; 3]) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, image::Rgb(pixel)));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).expect("encode test image");
        buf.into_inner()
    }

    /// A tiny encoded image of the given format.
    pub(crate) fn encoded(format: ImageFormat) -> Vec<u8> {
        encode(format, [200, 10, 10])
    }

    pub(crate) fn png() -> Vec<u8> {
        encoded(ImageFormat::Png)
    }

    /// A PNG whose bytes (and upload name) differ per seed.
    pub(crate) fn png_with_seed(seed: u8) -> Vec<u8> {
        encode(ImageFormat::Png, [seed, 64, 128])
    }

    /// Matches requests whose raw body contains the given bytes.
    ///
    /// Multipart bodies carrying images are not UTF-8, so the string matchers
    /// never see them.
    pub(crate) struct BodyContains(pub(crate) Vec<u8>);

    impl BodyContains {
        pub(crate) fn str(needle: &str) -> Self {
            Self(needle.as_bytes().to_vec())
        }
    }

    impl wiremock::Match for BodyContains {
        fn matches(&self, request: &wiremock::Request) -> bool {
            !self.0.is_empty() && request.body.windows(self.0.len()).any(|w| w == self.0.as_slice())
        }
    }
}
