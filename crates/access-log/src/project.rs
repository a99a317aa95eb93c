//! 이벤트 투영 — [`ParsedLine`]을 [`HttpRequest`] 이벤트로 변환
//!
//! 토큰별 원시 값을 잘 알려진 속성 이름으로 매핑하고,
//! 헤더/쿠키를 서브 맵으로 투영합니다. 요청 첫 줄은 메서드/경로/버전으로
//! 분해되며 쿼리 스트링은 키-값 쌍으로 나뉩니다 (퍼센트 인코딩 유지).

use std::time::Duration;

use clickpath_core::event::HttpEvent;
use clickpath_core::types::{FieldValue, HttpRequest};

use crate::parser::ParsedLine;
use crate::token::FormatToken;

/// 파싱된 라인을 HTTP 요청 레코드로 투영합니다.
pub fn to_request(parsed: &ParsedLine) -> HttpRequest {
    let mut request = HttpRequest {
        timestamp: parsed.timestamp(),
        ..Default::default()
    };

    for (token, value) in parsed.iter() {
        match token {
            FormatToken::RemoteHost => request.remote_host = text(value),
            FormatToken::RemoteLogname => request.remote_logname = text(value),
            FormatToken::RemoteUser => request.remote_user = text(value),
            FormatToken::RequestLine => {
                if let Some(line) = value.as_text() {
                    apply_request_line(&mut request, line);
                }
            }
            FormatToken::OriginalStatusCode => {
                request.original_status_code = status_code(value);
            }
            FormatToken::StatusCode => request.status_code = status_code(value),
            FormatToken::ResponseSize => {
                request.response_bytes = value.as_i64().and_then(|v| u64::try_from(v).ok());
            }
            FormatToken::ThreadName => request.thread_name = text(value),
            FormatToken::ProcessingTime => {
                // %D는 마이크로초
                request.duration = value
                    .as_i64()
                    .and_then(|v| u64::try_from(v).ok())
                    .map(Duration::from_micros);
            }
            FormatToken::RequestHeader(name) => {
                if let Some(raw) = value.as_text() {
                    request
                        .request_headers
                        .insert(name.clone(), raw.to_owned());
                    if name.eq_ignore_ascii_case("cookie") {
                        apply_cookie_pairs(&mut request, raw);
                    }
                }
            }
            FormatToken::ResponseHeader(name) => {
                if let Some(raw) = value.as_text() {
                    request
                        .response_headers
                        .insert(name.clone(), raw.to_owned());
                }
            }
            FormatToken::Cookie(name) => {
                if let Some(raw) = value.as_text() {
                    request.cookies.insert(name.clone(), raw.to_owned());
                }
            }
            // 타임스탬프는 전용 슬롯에서 이미 복사됨, 인클로저는 값이 없음
            FormatToken::Timestamp
            | FormatToken::DoubleQuote
            | FormatToken::SingleQuote
            | FormatToken::OpenBracket
            | FormatToken::CloseBracket => {}
        }
    }

    request
}

/// 파싱된 라인을 HTTP 요청 이벤트로 투영합니다.
pub fn to_event(parsed: &ParsedLine, line_number: Option<u64>) -> HttpEvent {
    HttpEvent::new(to_request(parsed), line_number)
}

fn text(value: &FieldValue) -> Option<String> {
    value.as_text().map(ToOwned::to_owned)
}

fn status_code(value: &FieldValue) -> Option<u16> {
    value.as_i64().and_then(|v| u16::try_from(v).ok())
}

/// 요청 첫 줄 "GET /path?k=v HTTP/1.1"을 분해합니다.
///
/// 세 조각 미만이면 있는 조각까지만 채웁니다 (잘린 라인 허용).
fn apply_request_line(request: &mut HttpRequest, line: &str) {
    let mut parts = line.split_whitespace();

    request.method = parts.next().map(ToOwned::to_owned);

    if let Some(uri) = parts.next() {
        match uri.split_once('?') {
            Some((path, query)) => {
                request.path = Some(path.to_owned());
                request.query = parse_query(query);
            }
            None => request.path = Some(uri.to_owned()),
        }
    }

    request.http_version = parts.next().map(ToOwned::to_owned);
}

/// 쿼리 스트링을 키-값 쌍으로 나눕니다. 값이 없는 키는 빈 값으로 남습니다.
fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_owned(), value.to_owned()),
            None => (pair.to_owned(), String::new()),
        })
        .collect()
}

/// Cookie 요청 헤더 값 "a=b; c=d"를 쿠키 맵에 반영합니다.
fn apply_cookie_pairs(request: &mut HttpRequest, raw: &str) {
    for fragment in raw.split(';') {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        if let Some((name, value)) = fragment.split_once('=') {
            request
                .cookies
                .insert(name.trim().to_owned(), value.trim().to_owned());
        }
    }
}
