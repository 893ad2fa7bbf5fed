use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use std::io::{self, Write};

fn osc52_sequence(text: &str) -> String {
    format!("\u{1b}]52;c;{}\u{7}", BASE64_STANDARD.encode(text.as_bytes()))
}

fn write_osc52(text: &str, out: &mut impl Write) -> io::Result<()> {
    out.write_all(osc52_sequence(text).as_bytes())?;
    out.flush()
}

/// Failures are logged and otherwise ignored.
pub fn copy(text: &str) {
    if let Err(err) = write_osc52(text, &mut io::stdout()) {
        log::warn!("clipboard copy failed: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_base64_payload() {
        assert_eq!(osc52_sequence("pwd"), "\u{1b}]52;c;cHdk\u{7}");
    }

    #[test]
    fn writes_whole_sequence() {
        let mut buf = Vec::new();
        write_osc52("/var/lib/validator", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("\u{1b}]52;c;"));
        assert!(text.ends_with('\u{7}'));
    }
}
