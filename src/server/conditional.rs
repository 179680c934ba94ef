use crate::error::{OraError, OraResult};
use crate::page::LazyPage;
use axum::body::Body;
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use headers::{
    AcceptRanges, ContentLength, ContentRange, ContentType, HeaderMapExt, IfModifiedSince,
    IfRange, IfUnmodifiedSince, LastModified,
};
use std::io::{Read, Seek, SeekFrom};

/// Outcome of interpreting a `Range` header against a body length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// Send the whole body.
    Full,
    /// Send bytes `start..=end`.
    Partial { start: u64, end: u64 },
    /// No requested range overlaps the body.
    Unsatisfiable,
}

impl ByteRange {
    /// Parses a `bytes=` range header.
    ///
    /// Malformed headers and requests for more than one satisfiable range are
    /// answered with the full body.
    pub fn parse(value: &str, len: u64) -> Self {
        let Some(specs) = value.trim().strip_prefix("bytes=") else {
            return ByteRange::Full;
        };

        let mut satisfiable = Vec::new();
        for spec in specs.split(',') {
            let Some((first, last)) = spec.trim().split_once('-') else {
                return ByteRange::Full;
            };
            let (first, last) = (first.trim(), last.trim());

            let range = if first.is_empty() {
                // suffix range, the last N bytes
                let Ok(n) = last.parse::<u64>() else {
                    return ByteRange::Full;
                };
                if n == 0 || len == 0 {
                    None
                } else {
                    Some((len.saturating_sub(n), len - 1))
                }
            } else {
                let Ok(start) = first.parse::<u64>() else {
                    return ByteRange::Full;
                };
                let end = if last.is_empty() {
                    len.saturating_sub(1)
                } else {
                    match last.parse::<u64>() {
                        Ok(end) if end >= start => end.min(len.saturating_sub(1)),
                        _ => return ByteRange::Full,
                    }
                };
                (start < len).then_some((start, end))
            };

            if let Some(range) = range {
                satisfiable.push(range);
            }
        }

        match satisfiable.as_slice() {
            [] => ByteRange::Unsatisfiable,
            [(start, end)] => ByteRange::Partial {
                start: *start,
                end: *end,
            },
            _ => ByteRange::Full,
        }
    }
}

/// Serves a lazily compiled page following the HTTP conditional request rules.
///
/// Validators are checked against the modification time taken when the page
/// was opened. A request answered with 304 or 412 never reads or compiles the
/// document; otherwise the page is materialized on a blocking thread and the
/// (possibly partial) body is sent.
pub async fn serve_content(
    method: &Method,
    headers: &HeaderMap,
    mut page: LazyPage,
) -> OraResult<Response> {
    let modified = page.modified();
    let last_modified = LastModified::from(modified);

    if let Some(condition) = headers.typed_get::<IfUnmodifiedSince>() {
        if !condition.precondition_passes(modified) {
            return Ok(StatusCode::PRECONDITION_FAILED.into_response());
        }
    }

    if method == Method::GET || method == Method::HEAD {
        if let Some(condition) = headers.typed_get::<IfModifiedSince>() {
            if !condition.is_modified(modified) {
                let mut response = StatusCode::NOT_MODIFIED.into_response();
                response.headers_mut().typed_insert(last_modified);
                return Ok(response);
            }
        }
    }

    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .filter(|_| method == Method::GET)
        .filter(|_| {
            headers
                .typed_get::<IfRange>()
                .is_none_or(|if_range| !if_range.is_modified(None, Some(&last_modified)))
        })
        .map(str::to_owned);

    let read = tokio::task::spawn_blocking(move || -> std::io::Result<(u64, ByteRange, Vec<u8>)> {
        let len = page.seek(SeekFrom::End(0))?;
        let range = range
            .as_deref()
            .map_or(ByteRange::Full, |value| ByteRange::parse(value, len));

        let (start, count) = match range {
            ByteRange::Full => (0, len),
            ByteRange::Partial { start, end } => (start, end - start + 1),
            ByteRange::Unsatisfiable => (0, 0),
        };

        page.seek(SeekFrom::Start(start))?;
        let mut body = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
        (&mut page).take(count).read_to_end(&mut body)?;

        Ok((len, range, body))
    })
    .await
    .map_err(|e| OraError::Other(format!("page read task failed: {e}")))?;

    let (len, range, body) = read?;

    let mut response_headers = HeaderMap::new();
    response_headers.typed_insert(last_modified);
    response_headers.typed_insert(AcceptRanges::bytes());

    let status = match range {
        ByteRange::Unsatisfiable => {
            response_headers.typed_insert(ContentRange::unsatisfied_bytes(len));
            return Ok((StatusCode::RANGE_NOT_SATISFIABLE, response_headers).into_response());
        }
        ByteRange::Partial { start, end } => {
            let content_range = ContentRange::bytes(start..=end, len).map_err(|_| {
                OraError::Other(format!("invalid content range {start}-{end}/{len}"))
            })?;
            response_headers.typed_insert(content_range);
            StatusCode::PARTIAL_CONTENT
        }
        ByteRange::Full => StatusCode::OK,
    };

    response_headers.typed_insert(ContentType::html());
    response_headers.typed_insert(ContentLength(body.len() as u64));

    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(body)
    };

    Ok((status, response_headers, body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_ranges() {
        assert_eq!(
            ByteRange::parse("bytes=0-4", 10),
            ByteRange::Partial { start: 0, end: 4 }
        );
        assert_eq!(
            ByteRange::parse("bytes=6-", 10),
            ByteRange::Partial { start: 6, end: 9 }
        );
        assert_eq!(
            ByteRange::parse("bytes=-3", 10),
            ByteRange::Partial { start: 7, end: 9 }
        );
        assert_eq!(
            ByteRange::parse("bytes=-30", 10),
            ByteRange::Partial { start: 0, end: 9 }
        );
        assert_eq!(
            ByteRange::parse("bytes=5-100", 10),
            ByteRange::Partial { start: 5, end: 9 }
        );
    }

    #[test]
    fn ranges_past_the_end_are_unsatisfiable() {
        assert_eq!(ByteRange::parse("bytes=10-", 10), ByteRange::Unsatisfiable);
        assert_eq!(ByteRange::parse("bytes=-0", 10), ByteRange::Unsatisfiable);
    }

    #[test]
    fn malformed_or_multiple_ranges_send_everything() {
        assert_eq!(ByteRange::parse("lines=0-4", 10), ByteRange::Full);
        assert_eq!(ByteRange::parse("bytes=4-2", 10), ByteRange::Full);
        assert_eq!(ByteRange::parse("bytes=a-b", 10), ByteRange::Full);
        assert_eq!(ByteRange::parse("bytes=0-1,4-5", 10), ByteRange::Full);
    }
}
