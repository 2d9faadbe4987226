// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal-friendly QR rendering for session authentication.

use qrcode::QrCode;
use qrcode::render::unicode;
use quorum_core::types::QrArtifact;
use tracing::warn;

/// Render a transport-issued QR payload for terminal display.
///
/// Rendering failures are non-fatal: the artifact still carries the raw
/// payload, which callers can forward to out-of-band renderers.
pub fn render(payload: &str) -> QrArtifact {
    let rendered = match QrCode::new(payload.as_bytes()) {
        Ok(code) => code
            .render::<unicode::Dense1x2>()
            .quiet_zone(true)
            .build(),
        Err(e) => {
            warn!(error = %e, "failed to render QR payload");
            String::new()
        }
    };
    QrArtifact {
        payload: payload.to_string(),
        rendered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nonempty_unicode_block() {
        let artifact = render("2@AbCdEf012345==,example-session-ref");
        assert_eq!(artifact.payload, "2@AbCdEf012345==,example-session-ref");
        assert!(!artifact.rendered.is_empty());
        // Dense1x2 output uses half-block glyphs.
        assert!(artifact.rendered.contains('█') || artifact.rendered.contains('▀'));
    }

    #[test]
    fn oversized_payload_degrades_to_raw() {
        let payload = "x".repeat(10_000);
        let artifact = render(&payload);
        assert_eq!(artifact.payload, payload);
        assert!(artifact.rendered.is_empty());
    }
}
