use anyhow::{Result, bail};

/// Makes `input` safe inside an XML attribute or text node.
pub fn escape_xml(input: &str) -> String {
    input.chars().fold(String::with_capacity(input.len()), |mut out, ch| {
        match ch {
            '&' => out += "&amp;",
            '<' => out += "&lt;",
            '>' => out += "&gt;",
            '"' => out += "&quot;",
            '\'' => out += "&apos;",
            _ => out.push(ch),
        }
        out
    })
}

/// Parses `#rgb`, `#rrggbb` or a handful of names into RGB bytes.
pub fn parse_color(input: &str) -> Result<[u8; 3]> {
    let trimmed = input.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "white" => return Ok([255, 255, 255]),
        "black" => return Ok([0, 0, 0]),
        "gray" | "grey" => return Ok([128, 128, 128]),
        _ => {}
    }

    let Some(hex) = trimmed.strip_prefix('#') else {
        bail!("unsupported color '{input}'; use a #rrggbb value");
    };
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        bail!("color '{input}' contains non-hex digits");
    }

    let channel = |s: &str| u8::from_str_radix(s, 16);
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, digit) in rgb.iter_mut().zip(hex.chars()) {
                let value = channel(&digit.to_string())?;
                *slot = value * 17;
            }
            Ok(rgb)
        }
        6 => Ok([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        _ => bail!("color '{input}' must have 3 or 6 hex digits"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
        assert_eq!(escape_xml("it's"), "it&apos;s");
    }

    #[test]
    fn parses_named_and_hex_colors() {
        assert_eq!(parse_color("white").unwrap(), [255, 255, 255]);
        assert_eq!(parse_color("#0a0B0c").unwrap(), [10, 11, 12]);
        assert_eq!(parse_color("#f80").unwrap(), [255, 136, 0]);
        assert!(parse_color("chartreuse").is_err());
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#zzzzzz").is_err());
    }
}
