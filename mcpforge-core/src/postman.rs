//! Postman collection (v2.0 / v2.1) document parsing.
//!
//! The wire format is loose: most fields are optional and several accept
//! more than one shape. The `Raw*` types mirror the document, and the
//! `From` impls flatten them into the [`crate::collection`] types.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::collection::{
    Collection, CollectionNode, Folder, RequestBody, RequestNode, RequestSpec, ResponseExample,
    UrlSpec, Variable,
};
use crate::errors::{CollectionError, Result};

pub(crate) fn parse_collection(value: JsonValue) -> Result<Collection> {
    if !value.is_object() {
        return Err(CollectionError::invalid("document root must be a JSON object"));
    }
    let raw: RawCollection = serde_json::from_value(value)?;
    let (name, description) = match raw.info {
        Some(info) => (info.name, info.description.and_then(RawDescription::into_text)),
        None => (None, None),
    };
    Ok(Collection {
        name,
        description,
        items: raw
            .item
            .unwrap_or_default()
            .into_iter()
            .map(CollectionNode::from)
            .collect(),
    })
}

#[derive(Debug, Deserialize)]
struct RawCollection {
    info: Option<RawInfo>,
    item: Option<Vec<RawItem>>,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    name: Option<String>,
    description: Option<RawDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDescription {
    Text(String),
    Rich { content: Option<String> },
}

impl RawDescription {
    fn into_text(self) -> Option<String> {
        let text = match self {
            Self::Text(text) => Some(text),
            Self::Rich { content } => content,
        };
        text.filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct RawItem {
    name: Option<String>,
    description: Option<RawDescription>,
    item: Option<Vec<RawItem>>,
    request: Option<RawRequest>,
    response: Option<Vec<RawResponse>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRequest {
    Url(String),
    Full(Box<RawRequestObject>),
}

#[derive(Debug, Deserialize)]
struct RawRequestObject {
    method: Option<String>,
    url: Option<RawUrl>,
    body: Option<RawBody>,
    description: Option<RawDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawUrl {
    Text(String),
    Parts(RawUrlParts),
}

#[derive(Debug, Deserialize)]
struct RawUrlParts {
    raw: Option<String>,
    protocol: Option<String>,
    host: Option<RawSegments>,
    port: Option<JsonValue>,
    path: Option<RawSegments>,
    query: Option<Vec<RawVariable>>,
    variable: Option<Vec<RawVariable>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSegments {
    Joined(String),
    Parts(Vec<RawSegment>),
}

impl RawSegments {
    fn join(self, separator: &str) -> String {
        match self {
            Self::Joined(text) => text,
            Self::Parts(parts) => parts
                .into_iter()
                .filter_map(RawSegment::into_text)
                .collect::<Vec<_>>()
                .join(separator),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSegment {
    Text(String),
    Object { value: Option<String> },
}

impl RawSegment {
    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Object { value } => value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawVariable {
    key: Option<String>,
    value: Option<JsonValue>,
    description: Option<RawDescription>,
}

#[derive(Debug, Deserialize)]
struct RawBody {
    mode: Option<String>,
    raw: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    name: Option<String>,
    code: Option<u16>,
    body: Option<String>,
}

impl From<RawItem> for CollectionNode {
    fn from(item: RawItem) -> Self {
        if let Some(children) = item.item {
            return Self::Folder(Folder {
                name: item.name,
                children: children.into_iter().map(Self::from).collect(),
            });
        }

        let mut description = item.description.and_then(RawDescription::into_text);
        let request = item.request.map(|raw| match raw {
            RawRequest::Url(url) => RequestSpec {
                method: None,
                url: UrlSpec::new(url),
                body: None,
            },
            RawRequest::Full(raw) => {
                let raw = *raw;
                if description.is_none() {
                    description = raw.description.and_then(RawDescription::into_text);
                }
                RequestSpec {
                    method: raw.method,
                    url: raw.url.map(UrlSpec::from).unwrap_or_default(),
                    body: raw.body.map(|b| RequestBody {
                        mode: b.mode,
                        raw: b.raw,
                    }),
                }
            }
        });

        Self::Request(RequestNode {
            name: item.name,
            description,
            request,
            responses: item
                .response
                .unwrap_or_default()
                .into_iter()
                .map(|r| ResponseExample {
                    name: r.name,
                    code: r.code,
                    body: r.body,
                })
                .collect(),
        })
    }
}

impl From<RawUrl> for UrlSpec {
    fn from(url: RawUrl) -> Self {
        match url {
            RawUrl::Text(raw) => UrlSpec::new(raw),
            RawUrl::Parts(parts) => {
                let raw = match parts.raw {
                    Some(raw) => raw,
                    None => assemble_url(parts.protocol, parts.host, parts.port, parts.path),
                };
                UrlSpec {
                    raw,
                    path_variables: convert_variables(parts.variable),
                    query: convert_variables(parts.query),
                }
            }
        }
    }
}

fn assemble_url(
    protocol: Option<String>,
    host: Option<RawSegments>,
    port: Option<JsonValue>,
    path: Option<RawSegments>,
) -> String {
    let mut url = String::new();
    if let Some(protocol) = protocol.filter(|p| !p.is_empty()) {
        url.push_str(&protocol);
        url.push_str("://");
    }
    if let Some(host) = host {
        url.push_str(&host.join("."));
    }
    match port {
        Some(JsonValue::String(port)) if !port.is_empty() => {
            url.push(':');
            url.push_str(&port);
        }
        Some(JsonValue::Number(port)) => {
            url.push(':');
            url.push_str(&port.to_string());
        }
        _ => {}
    }
    if let Some(path) = path {
        let path = path.join("/");
        if !path.is_empty() {
            if !path.starts_with('/') {
                url.push('/');
            }
            url.push_str(&path);
        }
    }
    url
}

fn convert_variables(raw: Option<Vec<RawVariable>>) -> Vec<Variable> {
    raw.unwrap_or_default()
        .into_iter()
        .map(|v| Variable {
            key: v.key,
            value: v.value,
            description: v.description.and_then(RawDescription::into_text),
        })
        .collect()
}
