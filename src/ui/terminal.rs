//! Terminal output: QR code, link and expiry banner, human-readable sizes.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use qrcode::render::unicode;
use qrcode::QrCode;
use std::io::Write;

pub fn generate_qr(url: &str) -> Result<String> {
    let code = QrCode::new(url.as_bytes()).context("Failed to generate QR code")?;

    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .quiet_zone(true)
        .build())
}

/// `1536` -> `1.5 KB`. One decimal, binary multiples, caps at TB.
pub fn human_size(num_bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = num_bytes as f64;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = next;
    }
    format!("{size:.1} {unit}")
}

/// Everything printed once the server is listening.
pub struct SessionBanner<'a> {
    pub url: &'a str,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_receiving: bool,
    pub display_name: &'a str,
    pub show_qr: bool,
}

pub fn print_session_banner(banner: &SessionBanner<'_>) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_session_banner(banner, &mut out)
}

pub fn write_session_banner(banner: &SessionBanner<'_>, out: &mut dyn Write) -> Result<()> {
    let page = if banner.is_receiving {
        "upload"
    } else {
        "share"
    };

    writeln!(
        out,
        "\nStart with \"--exit-on-upload\" to exit the server after the first successful transfer."
    )?;
    if !banner.is_receiving {
        writeln!(out, "Sharing: {}", banner.display_name)?;
    }

    if banner.show_qr {
        writeln!(
            out,
            "\nScan this QR code to open the {page} page on your local network:\n"
        )?;
        writeln!(out, "{}", generate_qr(banner.url)?)?;
    }

    writeln!(out, "\nURL: {}", banner.url)?;
    if let Some(expires_at) = banner.expires_at {
        writeln!(
            out,
            "Expires at (UTC): {}\n",
            expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
    }
    writeln!(out, "Press Ctrl+C to stop the server.")?;
    out.flush()?;
    Ok(())
}
