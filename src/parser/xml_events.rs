//! Thin pull layer over `quick-xml` that reduces the raw event stream to
//! the handful of Templight markers the reader cares about.
//!
//! Events are returned owned so the caller can keep pulling while it still
//! holds data from the previous event.

use crate::utils::config::{
    BYTES_ATTR, CONTEXT_ATTR, CONTEXT_TAG, KIND_TAG, MEMORY_TAG, POSITION_TAG, TEMPLATE_BEGIN_TAG,
    TEMPLATE_END_TAG, TIMESTAMP_TAG, TIME_ATTR,
};
use crate::utils::error::TraceError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

/// Element names of the trace format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    TemplateBegin,
    TemplateEnd,
    Position,
    Context,
    Kind,
    TimeStamp,
    Memory,
    Other,
}

impl Marker {
    fn from_name(name: &[u8]) -> Self {
        [
            (TEMPLATE_BEGIN_TAG, Self::TemplateBegin),
            (TEMPLATE_END_TAG, Self::TemplateEnd),
            (POSITION_TAG, Self::Position),
            (CONTEXT_TAG, Self::Context),
            (KIND_TAG, Self::Kind),
            (TIMESTAMP_TAG, Self::TimeStamp),
            (MEMORY_TAG, Self::Memory),
        ]
        .into_iter()
        .find(|(tag, _)| tag.as_bytes() == name)
        .map(|(_, marker)| marker)
        .unwrap_or(Self::Other)
    }

    /// Attribute carrying this element's value, if it has one
    fn value_attribute(self) -> Option<&'static str> {
        match self {
            Self::Context => Some(CONTEXT_ATTR),
            Self::TimeStamp => Some(TIME_ATTR),
            Self::Memory => Some(BYTES_ATTR),
            _ => None,
        }
    }

    pub(crate) fn tag(self) -> &'static str {
        match self {
            Self::TemplateBegin => TEMPLATE_BEGIN_TAG,
            Self::TemplateEnd => TEMPLATE_END_TAG,
            Self::Position => POSITION_TAG,
            Self::Context => CONTEXT_TAG,
            Self::Kind => KIND_TAG,
            Self::TimeStamp => TIMESTAMP_TAG,
            Self::Memory => MEMORY_TAG,
            Self::Other => "(other)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum XmlEvent {
    Open {
        marker: Marker,
        /// Value of the marker's attribute (`context`, `time`, `bytes`)
        value: Option<String>,
        self_closing: bool,
    },
    Close(Marker),
    Text(String),
    Eof,
}

pub(crate) struct TagStream<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> TagStream<R> {
    pub(crate) fn new(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    /// Byte offset of the reader in the input
    pub(crate) fn offset(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Pull the next relevant event, skipping declarations, comments and
    /// processing instructions
    pub(crate) fn next_event(&mut self) -> Result<XmlEvent, TraceError> {
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    return Err(TraceError::malformed(
                        self.reader.error_position() as u64,
                        format!("invalid XML: {}", e),
                    ))
                }
            };

            let offset = self.reader.buffer_position() as u64;
            let converted = match event {
                Event::Start(e) => Some(open_event(&e, false, offset)?),
                Event::Empty(e) => Some(open_event(&e, true, offset)?),
                Event::End(e) => Some(XmlEvent::Close(Marker::from_name(e.name().as_ref()))),
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| {
                        TraceError::malformed(offset, format!("invalid text content: {}", e))
                    })?;
                    Some(XmlEvent::Text(text.into_owned()))
                }
                Event::CData(c) => Some(XmlEvent::Text(String::from_utf8_lossy(&c).into_owned())),
                Event::Eof => Some(XmlEvent::Eof),
                _ => None,
            };

            if let Some(event) = converted {
                return Ok(event);
            }
        }
    }

    /// Collect the text content of an element whose start tag was just read,
    /// consuming its end tag
    pub(crate) fn read_text(&mut self, marker: Marker) -> Result<String, TraceError> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                XmlEvent::Text(chunk) => text.push_str(&chunk),
                XmlEvent::Close(closed) if closed == marker => return Ok(text),
                XmlEvent::Eof => {
                    return Err(TraceError::malformed(
                        self.offset(),
                        format!("input ended inside <{}>", marker.tag()),
                    ))
                }
                _ => {}
            }
        }
    }
}

fn open_event(start: &BytesStart<'_>, self_closing: bool, offset: u64) -> Result<XmlEvent, TraceError> {
    let marker = Marker::from_name(start.name().as_ref());
    let value = match marker.value_attribute() {
        Some(name) => attribute_value(start, name, offset)?,
        None => None,
    };
    Ok(XmlEvent::Open {
        marker,
        value,
        self_closing,
    })
}

fn attribute_value(
    start: &BytesStart<'_>,
    name: &str,
    offset: u64,
) -> Result<Option<String>, TraceError> {
    let attribute = start
        .try_get_attribute(name)
        .map_err(|e| TraceError::malformed(offset, format!("invalid attribute: {}", e)))?;

    attribute
        .map(|attr| {
            attr.unescape_value()
                .map(|value| value.into_owned())
                .map_err(|e| TraceError::malformed(offset, format!("invalid attribute value: {}", e)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(xml: &str) -> Vec<XmlEvent> {
        let mut stream = TagStream::new(xml.as_bytes());
        let mut events = Vec::new();
        loop {
            let event = stream.next_event().unwrap();
            let done = event == XmlEvent::Eof;
            events.push(event);
            if done {
                return events;
            }
        }
    }

    #[test]
    fn test_markers_and_attributes() {
        let events = collect(
            r#"<?xml version="1.0"?><!-- c --><TemplateBegin><Context context="std::vector&lt;int&gt;"/><TimeStamp time="1.5"/></TemplateBegin>"#,
        );

        assert_eq!(
            events,
            vec![
                XmlEvent::Open {
                    marker: Marker::TemplateBegin,
                    value: None,
                    self_closing: false
                },
                XmlEvent::Open {
                    marker: Marker::Context,
                    value: Some("std::vector<int>".to_string()),
                    self_closing: true
                },
                XmlEvent::Open {
                    marker: Marker::TimeStamp,
                    value: Some("1.5".to_string()),
                    self_closing: true
                },
                XmlEvent::Close(Marker::TemplateBegin),
                XmlEvent::Eof,
            ]
        );
    }

    #[test]
    fn test_read_text() {
        let mut stream = TagStream::new("<Kind>Memoization</Kind><Other/>".as_bytes());
        assert!(matches!(
            stream.next_event().unwrap(),
            XmlEvent::Open {
                marker: Marker::Kind,
                ..
            }
        ));
        assert_eq!(stream.read_text(Marker::Kind).unwrap(), "Memoization");
        assert!(matches!(
            stream.next_event().unwrap(),
            XmlEvent::Open {
                marker: Marker::Other,
                self_closing: true,
                ..
            }
        ));
    }

    #[test]
    fn test_read_text_hits_eof() {
        let mut stream = TagStream::new("<Kind>Memo".as_bytes());
        stream.next_event().unwrap();
        let err = stream.read_text(Marker::Kind).unwrap_err();
        assert!(matches!(err, TraceError::MalformedTrace { .. }));
    }
}
