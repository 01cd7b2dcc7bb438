//! Body parsing stage.
//!
//! # Responsibilities
//! - Detect JSON and URL-encoded form bodies from `Content-Type`
//! - Enforce the body size cap (413 when exceeded)
//! - Attach the parsed value to the request as [`ParsedBody`]
//!
//! Other content types pass through untouched and unread.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};

use crate::http::error::AppError;
use crate::http::server::AppState;

/// A request body parsed by the body stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(pub Value);

/// Body encodings the stage understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
}

impl BodyKind {
    /// Classify a request by its `Content-Type` header.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let content_type = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "application/json" || essence.ends_with("+json") {
            Some(BodyKind::Json)
        } else if essence == "application/x-www-form-urlencoded" {
            Some(BodyKind::Form)
        } else {
            None
        }
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Parse raw bytes according to the body kind.
pub fn parse(kind: BodyKind, bytes: &[u8]) -> Result<Value, AppError> {
    match kind {
        BodyKind::Json => parse_json(bytes),
        BodyKind::Form => parse_form(bytes),
    }
}

fn parse_json(bytes: &[u8]) -> Result<Value, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| AppError::MalformedBody(e.to_string()))?;

    // Only objects and arrays are accepted at the top level.
    match value {
        Value::Object(_) | Value::Array(_) => Ok(value),
        other => Err(AppError::MalformedBody(format!(
            "expected a JSON object or array, found {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Nesting deeper than this keeps the remainder of the key as one segment.
const MAX_FORM_DEPTH: usize = 5;

/// Highest numeric index turned into an array position; larger ones stay keys.
const MAX_FORM_INDEX: usize = 20;

/// One bracketed part of a form key: `[name]` or `[]`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Push,
}

/// Split `user[address][city]` into `user` and its bracket segments.
fn split_key(key: &str) -> (&str, Vec<Segment>) {
    let Some(open) = key.find('[').filter(|&i| i > 0) else {
        return (key, Vec::new());
    };

    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while segments.len() < MAX_FORM_DEPTH {
        let Some((name, tail)) = rest
            .strip_prefix('[')
            .and_then(|inner| inner.split_once(']'))
        else {
            break;
        };
        segments.push(if name.is_empty() {
            Segment::Push
        } else {
            Segment::Key(name.to_string())
        });
        rest = tail;
    }

    if segments.is_empty() {
        return (key, Vec::new());
    }
    if !rest.is_empty() {
        segments.push(Segment::Key(rest.to_string()));
    }
    (&key[..open], segments)
}

fn build(path: &[Segment], value: Value) -> Value {
    match path.split_first() {
        None => value,
        Some((Segment::Push, rest)) => Value::Array(vec![build(rest, value)]),
        Some((Segment::Key(name), rest)) => {
            let mut map = Map::new();
            map.insert(name.clone(), build(rest, value));
            Value::Object(map)
        }
    }
}

fn insert(fields: &mut Map<String, Value>, key: &str, path: &[Segment], value: Value) {
    match fields.get_mut(key) {
        Some(existing) => merge(existing, path, value),
        None => {
            fields.insert(key.to_string(), build(path, value));
        }
    }
}

fn merge(existing: &mut Value, path: &[Segment], value: Value) {
    match (existing, path.split_first()) {
        (Value::Object(map), Some((Segment::Key(name), rest))) => insert(map, name, rest, value),
        (Value::Array(items), Some((Segment::Push, rest))) => items.push(build(rest, value)),
        (Value::Array(items), _) => items.push(build(path, value)),
        (slot, _) => {
            let first = slot.take();
            *slot = Value::Array(vec![first, build(path, value)]);
        }
    }
}

/// Objects keyed only by small indices become arrays in index order.
fn compact(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let indexed: Option<Vec<(usize, Value)>> = if map.is_empty() {
                None
            } else {
                map.iter()
                    .map(|(k, v)| {
                        k.parse::<usize>()
                            .ok()
                            .filter(|&i| i <= MAX_FORM_INDEX)
                            .map(|i| (i, v.clone()))
                    })
                    .collect()
            };

            match indexed {
                Some(mut items) => {
                    items.sort_by_key(|(i, _)| *i);
                    Value::Array(items.into_iter().map(|(_, v)| compact(v)).collect())
                }
                None => Value::Object(map.into_iter().map(|(k, v)| (k, compact(v))).collect()),
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(compact).collect()),
        other => other,
    }
}

/// Parse a URL-encoded form, expanding bracketed keys into nested values.
///
/// `user[name]=tim` nests, `tag[]=a` and repeated keys collect into arrays,
/// and `item[0]=x` places values by index.
fn parse_form(bytes: &[u8]) -> Result<Value, AppError> {
    if std::str::from_utf8(bytes).is_err() {
        return Err(AppError::UnsupportedBody(
            "form data is not valid UTF-8".to_string(),
        ));
    }

    let mut fields = Map::new();
    for (key, value) in url::form_urlencoded::parse(bytes) {
        let (root, path) = split_key(&key);
        insert(&mut fields, root, &path, Value::String(value.into_owned()));
    }

    Ok(Value::Object(
        fields.into_iter().map(|(k, v)| (k, compact(v))).collect(),
    ))
}

/// Body parsing middleware.
pub async fn parse_body(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(kind) = BodyKind::from_headers(request.headers()) else {
        return Ok(next.run(request).await);
    };

    let limit = state.config.limits.max_body_bytes;
    if declared_length(request.headers()).is_some_and(|len| len > limit) {
        return Err(AppError::PayloadTooLarge { limit });
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, limit).await.map_err(|err| {
        let inner = err.into_inner();
        if inner.is::<LengthLimitError>() {
            AppError::PayloadTooLarge { limit }
        } else {
            AppError::MalformedBody(inner.to_string())
        }
    })?;

    let value = parse(kind, &bytes)?;
    tracing::trace!(kind = ?kind, bytes = bytes.len(), "Request body parsed");

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(ParsedBody(value));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(content_type).unwrap(),
        );
        headers
    }

    #[test]
    fn test_kind_detection() {
        assert_eq!(
            BodyKind::from_headers(&headers("application/json")),
            Some(BodyKind::Json)
        );
        assert_eq!(
            BodyKind::from_headers(&headers("Application/JSON; charset=utf-8")),
            Some(BodyKind::Json)
        );
        assert_eq!(
            BodyKind::from_headers(&headers("application/vnd.api+json")),
            Some(BodyKind::Json)
        );
        assert_eq!(
            BodyKind::from_headers(&headers("application/x-www-form-urlencoded")),
            Some(BodyKind::Form)
        );
        assert_eq!(BodyKind::from_headers(&headers("text/plain")), None);
        assert_eq!(BodyKind::from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_parse_json() {
        assert_eq!(
            parse(BodyKind::Json, br#"{"name":"iPhone"}"#).unwrap(),
            json!({"name": "iPhone"})
        );
        assert_eq!(parse(BodyKind::Json, b"[1,2]").unwrap(), json!([1, 2]));
        assert_eq!(parse(BodyKind::Json, b"  ").unwrap(), json!({}));
    }

    #[test]
    fn test_parse_json_rejects_scalars_and_garbage() {
        assert!(matches!(
            parse(BodyKind::Json, b"42"),
            Err(AppError::MalformedBody(_))
        ));
        assert!(matches!(
            parse(BodyKind::Json, b"{\"open\":"),
            Err(AppError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_parse_form() {
        let value = parse(BodyKind::Form, b"name=iPhone+15&tag=a&tag=b&tag=c&empty=").unwrap();
        assert_eq!(
            value,
            json!({"name": "iPhone 15", "tag": ["a", "b", "c"], "empty": ""})
        );
    }

    #[test]
    fn test_parse_form_nested_keys() {
        let value = parse(
            BodyKind::Form,
            b"user[name]=tim&user[age]=3&user[address][city]=Cupertino",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({"user": {"name": "tim", "age": "3", "address": {"city": "Cupertino"}}})
        );
    }

    #[test]
    fn test_parse_form_bracket_arrays() {
        let value = parse(BodyKind::Form, b"color[]=red&color[]=blue&size[1]=L&size[0]=S").unwrap();
        assert_eq!(value, json!({"color": ["red", "blue"], "size": ["S", "L"]}));

        let value = parse(BodyKind::Form, b"items[][name]=case&items[][name]=cable").unwrap();
        assert_eq!(
            value,
            json!({"items": [{"name": "case"}, {"name": "cable"}]})
        );
    }

    #[test]
    fn test_split_key_edge_cases() {
        assert_eq!(split_key("plain"), ("plain", Vec::new()));
        assert_eq!(split_key("[lead]"), ("[lead]", Vec::new()));
        assert_eq!(split_key("open[bracket"), ("open[bracket", Vec::new()));
        assert_eq!(
            split_key("a[b][c][d][e][f][g]"),
            (
                "a",
                vec![
                    Segment::Key("b".into()),
                    Segment::Key("c".into()),
                    Segment::Key("d".into()),
                    Segment::Key("e".into()),
                    Segment::Key("f".into()),
                    Segment::Key("[g]".into()),
                ]
            )
        );
    }

    #[test]
    fn test_parse_form_rejects_invalid_utf8() {
        assert!(matches!(
            parse(BodyKind::Form, &[0x66, 0x3d, 0xff]),
            Err(AppError::UnsupportedBody(_))
        ));
    }
}
