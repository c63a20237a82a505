//! Minimal SVG inspection.
//!
//! Only two things are needed from an SVG file: the markup inside the root
//! `<svg>` element, and the ids of any `<symbol>` elements (which make the
//! file a sprite). The document is streamed once with `quick-xml`; nothing is
//! rebuilt or re-serialized, the inner markup is sliced from the input.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Why a file could not be read as SVG.
#[derive(Debug, Error)]
pub enum SvgParseError {
    #[error("XML error near byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("invalid attribute: {0}")]
    Attribute(String),

    #[error("document is not valid UTF-8")]
    Encoding,

    #[error("document has no root element")]
    MissingRoot,

    #[error("root element is <{0}>, expected <svg>")]
    UnexpectedRoot(String),

    #[error("content outside the root element")]
    ContentOutsideRoot,

    #[error("document ends inside <{0}>")]
    Unclosed(String),
}

/// The parts of an SVG document the extractors care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgDocument {
    inner: String,
    has_symbols: bool,
    symbol_ids: Vec<String>,
}

impl SvgDocument {
    /// Parse raw file bytes. A UTF-8 byte order mark is skipped.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, SvgParseError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let xml = std::str::from_utf8(bytes).map_err(|_| SvgParseError::Encoding)?;
        Self::parse(xml)
    }

    pub fn parse(xml: &str) -> Result<Self, SvgParseError> {
        let mut reader = Reader::from_str(xml);

        let mut depth = 0usize;
        let mut root_name: Option<String> = None;
        let mut inner_start: Option<usize> = None;
        let mut inner_end: Option<usize> = None;
        let mut has_symbols = false;
        let mut symbol_ids = Vec::new();

        loop {
            let before = reader.buffer_position() as usize;
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(source) => {
                    return Err(SvgParseError::Xml {
                        position: reader.buffer_position() as u64,
                        source,
                    })
                }
            };

            match event {
                Event::Start(start) => {
                    let name = local_name(&start);
                    if depth == 0 {
                        check_root(&name, inner_end.is_some())?;
                        root_name = Some(name);
                        inner_start = Some(reader.buffer_position() as usize);
                    } else if name == "symbol" {
                        has_symbols = true;
                        symbol_ids.extend(symbol_id(&start)?);
                    }
                    depth += 1;
                }
                Event::Empty(empty) => {
                    let name = local_name(&empty);
                    if depth == 0 {
                        check_root(&name, inner_end.is_some())?;
                        let after = reader.buffer_position() as usize;
                        root_name = Some(name);
                        inner_start = Some(after);
                        inner_end = Some(after);
                    } else if name == "symbol" {
                        has_symbols = true;
                        symbol_ids.extend(symbol_id(&empty)?);
                    }
                }
                Event::End(_) => {
                    if depth == 0 {
                        return Err(SvgParseError::ContentOutsideRoot);
                    }
                    depth -= 1;
                    if depth == 0 {
                        inner_end = Some(before);
                    }
                }
                Event::Text(text) if depth == 0 => {
                    if !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(SvgParseError::ContentOutsideRoot);
                    }
                }
                Event::CData(_) if depth == 0 => return Err(SvgParseError::ContentOutsideRoot),
                Event::Eof => break,
                _ => {}
            }
        }

        if depth > 0 {
            return Err(SvgParseError::Unclosed(root_name.unwrap_or_default()));
        }

        let (Some(start), Some(end)) = (inner_start, inner_end) else {
            return Err(SvgParseError::MissingRoot);
        };

        Ok(Self {
            inner: xml[start..end].trim().to_string(),
            has_symbols,
            symbol_ids,
        })
    }

    /// Markup inside the root element, without the `<svg ...>` wrapper.
    pub fn inner_markup(&self) -> &str {
        &self.inner
    }

    /// Whether any `<symbol>` appears below the root, with or without an id.
    pub fn is_sprite(&self) -> bool {
        self.has_symbols
    }

    /// Ids of `<symbol id="...">` elements in document order.
    pub fn symbol_ids(&self) -> &[String] {
        &self.symbol_ids
    }
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn check_root(name: &str, root_seen: bool) -> Result<(), SvgParseError> {
    if root_seen {
        return Err(SvgParseError::ContentOutsideRoot);
    }
    if name != "svg" {
        return Err(SvgParseError::UnexpectedRoot(name.to_string()));
    }
    Ok(())
}

fn symbol_id(start: &BytesStart<'_>) -> Result<Option<String>, SvgParseError> {
    let attr = start
        .try_get_attribute("id")
        .map_err(|e| SvgParseError::Attribute(e.to_string()))?;
    Ok(attr
        .map(|a| String::from_utf8_lossy(&a.value).trim().to_string())
        .filter(|id| !id.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPRITE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg">
  <defs>
    <symbol id="a" viewBox="0 0 24 24"><path d="M0 0h24v24H0z"/></symbol>
    <symbol id="b" viewBox="0 0 24 24"><circle cx="12" cy="12" r="10"/></symbol>
  </defs>
</svg>"#;

    #[test]
    fn test_inner_markup() {
        let doc = SvgDocument::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><title>Home</title><path d="M3 12l9-9 9 9"/></svg>"#,
        )
        .unwrap();
        assert_eq!(
            doc.inner_markup(),
            r#"<title>Home</title><path d="M3 12l9-9 9 9"/>"#
        );
        assert!(!doc.is_sprite());
    }

    #[test]
    fn test_sprite_symbols_in_defs() {
        let doc = SvgDocument::parse(SPRITE).unwrap();
        assert!(doc.is_sprite());
        assert_eq!(doc.symbol_ids(), ["a", "b"]);
    }

    #[test]
    fn test_symbol_without_id_still_marks_sprite() {
        let doc = SvgDocument::parse(r#"<svg><symbol><path/></symbol></svg>"#).unwrap();
        assert!(doc.is_sprite());
        assert!(doc.symbol_ids().is_empty());
    }

    #[test]
    fn test_self_closing_root() {
        let doc = SvgDocument::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();
        assert_eq!(doc.inner_markup(), "");
    }

    #[test]
    fn test_byte_order_mark() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(b"<svg><rect/></svg>");
        let doc = SvgDocument::parse_bytes(&bytes).unwrap();
        assert_eq!(doc.inner_markup(), "<rect/>");
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            SvgDocument::parse("Not valid svg"),
            Err(SvgParseError::ContentOutsideRoot)
        ));
        assert!(matches!(SvgDocument::parse(""), Err(SvgParseError::MissingRoot)));
        assert!(matches!(
            SvgDocument::parse("<html></html>"),
            Err(SvgParseError::UnexpectedRoot(_))
        ));
        assert!(SvgDocument::parse("<svg><g></svg>").is_err());
        assert!(SvgDocument::parse("<svg><g>").is_err());
        assert!(SvgDocument::parse_bytes(&[0xff, 0xfe, 0x00]).is_err());
    }
}
