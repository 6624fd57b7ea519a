use std::io::Cursor;

use anyhow::Context as _;
use image::{ImageFormat, Luma};
use qrcode::QrCode;

use crate::domain::repository::QrRenderer;
use crate::error::TicketingError;

/// Square black-on-white PNG renderer. Encoding runs on tokio's blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PngQrRenderer {
    /// Minimum edge length in pixels; the module grid rounds it up.
    pub size: u32,
}

impl QrRenderer for PngQrRenderer {
    async fn render_png(&self, content: &str) -> Result<Vec<u8>, TicketingError> {
        let content = content.to_owned();
        let size = self.size;
        let png = tokio::task::spawn_blocking(move || encode_png(&content, size))
            .await
            .context("join qr rendering task")??;
        Ok(png)
    }
}

fn encode_png(content: &str, size: u32) -> Result<Vec<u8>, TicketingError> {
    let code = QrCode::new(content.as_bytes()).context("encode qr code")?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(size, size)
        .build();
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .context("write qr png")?;
    Ok(out.into_inner())
}
