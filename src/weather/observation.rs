//! NWS `current_obs` XML documents.

use crate::common::xml::unescape_xml;
use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_8};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::borrow::Cow;
use tracing::debug;

/// Latest observation of one station. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherSnapshot {
    pub location: Option<String>,
    pub temperature: Option<String>,
    pub condition: Option<String>,
    /// Relative humidity without the percent sign
    pub humidity_pct: Option<String>,
    pub wind: Option<String>,
    pub observation_time: Option<String>,
}

impl WeatherSnapshot {
    /// Parse a document as served, honouring a BOM or the `encoding` of
    /// its XML declaration. Unknown or missing labels fall back to UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let encoding = declared_encoding(bytes).unwrap_or(UTF_8);
        let (text, used, had_errors) = encoding.decode(bytes);
        if had_errors {
            debug!(encoding = used.name(), "weather feed has undecodable bytes");
        }
        Self::from_xml(&text)
    }

    /// Read the children of the document's root element.
    ///
    /// Missing elements and elements with empty text stay `None`; unknown
    /// elements are ignored.
    pub fn from_xml(xml: &str) -> Result<Self> {
        // Untrimmed: entity references split text into several events
        let mut reader = Reader::from_str(xml);

        let mut snapshot = Self::default();
        let mut depth = 0usize;
        let mut field: Option<String> = None;
        let mut text = String::new();
        let mut saw_root = false;

        loop {
            match reader.read_event().map_err(|e| Error::Feed(e.to_string()))? {
                Event::Start(e) => {
                    depth += 1;
                    saw_root = true;
                    if depth == 2 {
                        field = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                        text.clear();
                    }
                },
                Event::Text(e) if depth == 2 => {
                    let raw = std::str::from_utf8(e.as_ref()).map_err(|e| Error::Feed(e.to_string()))?;
                    text.push_str(&unescape_xml(raw));
                },
                Event::CData(e) if depth == 2 => {
                    text.push_str(&String::from_utf8_lossy(&e));
                },
                Event::GeneralRef(e) if depth == 2 => {
                    match e.resolve_char_ref().map_err(|e| Error::Feed(e.to_string()))? {
                        Some(ch) => text.push(ch),
                        None => {
                            let entity = String::from_utf8_lossy(&e);
                            text.push_str(&unescape_xml(&format!("&{};", entity)));
                        },
                    }
                },
                Event::End(_) => {
                    if depth == 2 {
                        if let Some(name) = field.take() {
                            snapshot.set(&name, text.trim());
                        }
                    }
                    depth = depth.saturating_sub(1);
                },
                Event::Empty(_) => saw_root = true,
                Event::Eof => break,
                _ => {},
            }
        }

        if !saw_root {
            return Err(Error::Feed("weather document has no root element".to_string()));
        }
        Ok(snapshot)
    }

    fn set(&mut self, name: &str, value: &str) {
        let slot = match name {
            "location" => &mut self.location,
            "temperature_string" => &mut self.temperature,
            "weather" => &mut self.condition,
            "relative_humidity" => &mut self.humidity_pct,
            "wind_string" => &mut self.wind,
            "observation_time" => &mut self.observation_time,
            _ => return,
        };
        *slot = (!value.is_empty()).then(|| value.to_string());
    }

    /// Humidity as shown on the slide, e.g. `45%`.
    pub fn humidity_text(&self) -> Option<String> {
        self.humidity_pct.as_ref().map(|h| format!("{}%", h))
    }
}

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    loop {
        match reader.read_event().ok()? {
            Event::Decl(decl) => {
                let label: Cow<'_, [u8]> = decl.encoding()?.ok()?;
                return Encoding::for_label(&label);
            },
            Event::Text(_) | Event::Comment(_) => {},
            _ => return None,
        }
    }
}
