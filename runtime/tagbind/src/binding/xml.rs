use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};

use super::overlay::{Leaves, bind_overlay, insert_repeated};
use super::{BindBody, Binding, bind_request_from_body};
use crate::binder::BindContext;
use crate::errors::{BindError, XmlDecodeError};
use crate::field::Bind;

#[derive(Debug, Clone, Copy, Default)]
/// Bind an XML document.
///
/// The children of the root element are matched against the fields of the target,
/// using their serde names. Attributes are exposed as `@name` keys, and repeated
/// elements as sequences. Text is parsed into whatever the target expects: numbers,
/// booleans, options and sequences of one.
pub struct XmlBinding;

impl Binding for XmlBinding {
    fn name(&self) -> &'static str {
        "xml"
    }
}

impl<T> BindBody<T> for XmlBinding
where
    T: Bind + Serialize + DeserializeOwned,
{
    fn bind_body(&self, cx: &BindContext<'_>, body: &[u8], target: &mut T) -> Result<(), BindError> {
        bind_overlay(
            cx,
            self.name(),
            Leaves::Text,
            || parse_document(body).map_err(|source| XmlDecodeError { source }.into()),
            target,
        )
    }
}

bind_request_from_body!(XmlBinding where T: Bind + Serialize + DeserializeOwned);

/// An element whose end tag hasn't been reached yet.
struct Open {
    name: String,
    children: Map<String, Json>,
    text: String,
}

impl Open {
    fn new(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut children = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = format!("@{}", String::from_utf8_lossy(attribute.key.as_ref()));
            children.insert(key, Json::String(attribute.unescape_value()?.into_owned()));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Json) {
        let Self {
            name,
            mut children,
            text,
        } = self;
        if children.is_empty() {
            return (name, Json::String(text));
        }
        if !text.is_empty() {
            children.insert("#text".to_owned(), Json::String(text));
        }
        (name, Json::Object(children))
    }
}

/// Parse an XML document into the JSON tree of its root element's content.
fn parse_document(body: &[u8]) -> Result<Json, quick_xml::Error> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut document = Map::new();
    let mut stack: Vec<Open> = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => stack.push(Open::new(&start)?),
            Event::Empty(start) => {
                let (name, value) = Open::new(&start)?.close();
                attach(&mut stack, &mut document, name, value);
            }
            Event::End(_) => {
                if let Some(open) = stack.pop() {
                    let (name, value) = open.close();
                    attach(&mut stack, &mut document, name, value);
                }
            }
            Event::Text(text) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    while let Some(open) = stack.pop() {
        let (name, value) = open.close();
        attach(&mut stack, &mut document, name, value);
    }

    // The root element's own name doesn't matter.
    Ok(match document.into_iter().next() {
        Some((_, Json::Object(root))) => Json::Object(root),
        _ => Json::Object(Map::new()),
    })
}

fn attach(stack: &mut [Open], document: &mut Map<String, Json>, name: String, value: Json) {
    match stack.last_mut() {
        Some(parent) => insert_repeated(&mut parent.children, name, value),
        None => insert_repeated(document, name, value),
    }
}
