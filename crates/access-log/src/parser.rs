//! 라인 파서 — 단일 패스 커서 스캔
//!
//! [`LineParser`]는 [`LogFormat`]의 토큰을 왼쪽에서 오른쪽으로 따라가며
//! 원시 로그 라인 한 줄을 [`ParsedLine`]으로 분해합니다. 라인 길이에
//! 선형인 단일 커서 스캔이며, 라인 간 공유 상태가 없습니다.
//!
//! 내용 수준의 불일치는 절대 패닉하지 않고 [`ParseFault`]가 됩니다.
//! 치명적인 것은 구성 에러(잘못된 `LogFormat`)뿐입니다.
//!
//! # 긴 라인 / 짧은 라인
//!
//! - 포맷보다 **긴** 라인은 허용됩니다 (전방 호환 로그 포맷).
//!   꼬리 처리 방식은 [`OverflowPolicy`]로 선택합니다.
//! - 포맷보다 **짧은** 라인은 캡처된 필드까지만 담은 부분 결과로
//!   조기 종료합니다. 잘린 것 자체는 폴트가 아닙니다 — 누락은
//!   이후 단계에서 필수 필드 부재로 드러납니다.

use std::collections::HashMap;
use std::time::SystemTime;

use clickpath_core::event::{FaultEvent, HttpEvent};
use clickpath_core::pipeline::RequestParser;
use clickpath_core::types::FieldValue;

use crate::error::ParseFault;
use crate::format::LogFormat;
use crate::micro::{cookie, user_agent};
use crate::project;
use crate::token::FormatToken;

/// 포맷보다 긴 라인의 꼬리 처리 정책
///
/// 어느 쪽이든 라인은 받아들여집니다 — 차이는 경고 로그 여부뿐입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// 꼬리를 조용히 무시 (기본값)
    #[default]
    Ignore,
    /// 꼬리를 경고 로그로 남김
    Warn,
}

impl OverflowPolicy {
    /// 문자열에서 정책을 파싱합니다. 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ignore" => Some(Self::Ignore),
            "warn" => Some(Self::Warn),
            _ => None,
        }
    }
}

/// 파싱된 라인 — 토큰 → 타입 강제된 값의 매핑
///
/// 키는 유일하며 같은 토큰에 대한 마지막 기록이 남습니다.
/// 타임스탬프는 전용 슬롯에도 복사됩니다. 라인마다 새로 생성되어
/// 이벤트로 한 번 변환된 뒤 버려집니다.
#[derive(Debug, Clone, Default)]
pub struct ParsedLine {
    values: HashMap<FormatToken, FieldValue>,
    timestamp: Option<SystemTime>,
}

impl ParsedLine {
    /// 빈 파싱 결과를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 토큰의 값을 기록합니다. 같은 토큰에 대한 마지막 기록이 남습니다.
    pub fn insert(&mut self, token: FormatToken, value: FieldValue) {
        if token == FormatToken::Timestamp
            && let FieldValue::Date(ts) = &value
        {
            self.timestamp = Some(*ts);
        }
        self.values.insert(token, value);
    }

    /// 토큰의 값을 조회합니다.
    pub fn value(&self, token: &FormatToken) -> Option<&FieldValue> {
        self.values.get(token)
    }

    /// 전용 타임스탬프 슬롯
    pub fn timestamp(&self) -> Option<SystemTime> {
        self.timestamp
    }

    /// 캡처된 필드 수
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 캡처된 필드가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// (토큰, 값) 쌍을 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&FormatToken, &FieldValue)> {
        self.values.iter()
    }
}

/// 마이크로 파서 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MicroKind {
    Cookie,
    UserAgent,
}

/// 값을 담는 토큰이 휴리스틱 끝 탐지를 요구하는지 판별합니다.
///
/// 쿠키 목록(Cookie / Set-Cookie 헤더)과 User-Agent 헤더는 따옴표 없이
/// 기록될 때 값 안에 필드 구분자인 공백을 합법적으로 포함할 수 있습니다.
fn micro_kind(token: &FormatToken) -> Option<MicroKind> {
    match token {
        FormatToken::RequestHeader(name) if name.eq_ignore_ascii_case("cookie") => {
            Some(MicroKind::Cookie)
        }
        FormatToken::ResponseHeader(name) if name.eq_ignore_ascii_case("set-cookie") => {
            Some(MicroKind::Cookie)
        }
        FormatToken::RequestHeader(name) if name.eq_ignore_ascii_case("user-agent") => {
            Some(MicroKind::UserAgent)
        }
        _ => None,
    }
}

/// 라인 파서
///
/// 포맷은 불변이며 파서는 라인 간 상태를 갖지 않으므로
/// 하나의 인스턴스로 스트림 전체를 처리합니다.
#[derive(Debug)]
pub struct LineParser {
    format: LogFormat,
    overflow_policy: OverflowPolicy,
    max_line_length: usize,
}

impl LineParser {
    /// 새 라인 파서를 생성합니다.
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            overflow_policy: OverflowPolicy::default(),
            max_line_length: 64 * 1024, // 64KB
        }
    }

    /// 긴 라인 꼬리 처리 정책을 설정합니다.
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length;
        self
    }

    /// 사용 중인 로그 포맷
    pub fn format(&self) -> &LogFormat {
        &self.format
    }

    /// 라인 한 줄을 파싱합니다.
    pub fn parse(&self, line: &str) -> Result<ParsedLine, ParseFault> {
        self.parse_inner(line, None)
    }

    /// 라인 번호를 폴트에 실어 라인 한 줄을 파싱합니다.
    pub fn parse_numbered(&self, line: &str, line_number: u64) -> Result<ParsedLine, ParseFault> {
        self.parse_inner(line, Some(line_number))
    }

    fn parse_inner(&self, line: &str, line_number: Option<u64>) -> Result<ParsedLine, ParseFault> {
        if line.len() > self.max_line_length {
            return Err(locate(
                ParseFault::new(format!(
                    "line too long: {} bytes (max: {})",
                    line.len(),
                    self.max_line_length
                )),
                0,
                line_number,
            ));
        }

        let line = line.trim();
        let len = line.len();
        let mut cursor = 0usize;
        let mut awaiting: Option<FormatToken> = None;
        let mut parsed = ParsedLine::new();

        for token in self.format.tokens() {
            if cursor >= len {
                // 포맷보다 짧은 라인: 캡처된 필드까지만 담고 종료
                break;
            }

            // 기다리던 닫는 인클로저
            if let Some(expected) = awaiting.clone()
                && *token == expected
            {
                cursor = skip_spaces(line, cursor);
                cursor = self.expect_enclosure(line, cursor, &expected, line_number)?;
                cursor = skip_spaces(line, cursor);
                awaiting = None;
                continue;
            }

            // 여는 인클로저 (따옴표는 여는/닫는 겸용, ']' 단독은 리터럴 소비)
            if awaiting.is_none() && token.is_enclosure() {
                cursor = skip_spaces(line, cursor);
                cursor = self.expect_enclosure(line, cursor, token, line_number)?;
                awaiting = token.closing_enclosure();
                continue;
            }

            // 값을 담는 토큰
            let micro = if awaiting.is_none() {
                micro_kind(token)
            } else {
                None
            };

            let (end, from_cookie_micro) = match micro {
                Some(MicroKind::Cookie) => match cookie::identify_end(line, cursor) {
                    Ok(Some(end)) => (end, true),
                    Ok(None) => (len, true),
                    Err(fault) => return Err(locate(fault, cursor, line_number)),
                },
                Some(MicroKind::UserAgent) => match user_agent::identify_end(line, cursor) {
                    Ok(Some(end)) => (end, false),
                    Ok(None) => (len, false),
                    Err(fault) => return Err(locate(fault, cursor, line_number)),
                },
                None => {
                    let terminator = awaiting
                        .as_ref()
                        .and_then(FormatToken::enclosure_char)
                        .unwrap_or(' ');
                    let end = line[cursor..]
                        .find(terminator)
                        .map_or(len, |rel| cursor + rel);
                    (end, false)
                }
            };

            let raw = &line[cursor..end];
            // 마지막 쿠키 뒤의 세미콜론/공백은 값에 포함하지 않음
            let raw = if from_cookie_micro {
                raw.trim_end_matches([';', ' '])
            } else {
                raw
            };

            match token.parse(raw) {
                Ok(Some(value)) => parsed.insert(token.clone(), value),
                Ok(None) => {}
                Err(fault) => return Err(locate(fault, cursor, line_number)),
            }

            cursor = end;
            if awaiting.is_none() {
                // 공백 구분자와 뒤따르는 공백을 건너뜀
                cursor = skip_spaces(line, cursor);
            }
            // 인클로저 내부에서는 닫는 토큰이 구분자 문자를 소비함
        }

        self.check_overflow(line, cursor, line_number);

        Ok(parsed)
    }

    /// `cursor` 위치의 문자가 기대한 인클로저 문자인지 확인하고 소비합니다.
    fn expect_enclosure(
        &self,
        line: &str,
        cursor: usize,
        token: &FormatToken,
        line_number: Option<u64>,
    ) -> Result<usize, ParseFault> {
        let Some(expected) = token.enclosure_char() else {
            // 인클로저 토큰만 여기로 들어옴
            return Ok(cursor);
        };
        if cursor >= line.len() {
            // 닫는 문자 전에 라인이 끝남: 부분 결과로 처리됨
            return Ok(cursor);
        }
        if !line[cursor..].starts_with(expected) {
            let actual = line[cursor..].chars().next().unwrap_or(' ');
            return Err(locate(
                ParseFault::new(format!(
                    "expected enclosure '{expected}' but found '{actual}' at position {cursor}"
                )),
                cursor,
                line_number,
            ));
        }
        Ok(cursor + expected.len_utf8())
    }

    /// 포맷 소진 후 남은 꼬리를 정책에 따라 처리합니다.
    fn check_overflow(&self, line: &str, cursor: usize, line_number: Option<u64>) {
        if cursor >= line.len() {
            return;
        }
        let tail = line[cursor..].trim();
        if tail.is_empty() {
            return;
        }
        if self.overflow_policy == OverflowPolicy::Warn {
            tracing::warn!(
                tail,
                line_number,
                format = self.format.name(),
                "line longer than declared format, ignoring trailing content"
            );
        }
    }
}

impl RequestParser for LineParser {
    fn format_name(&self) -> &str {
        self.format.name()
    }

    fn parse_line(&self, line: &str, line_number: u64) -> Result<HttpEvent, FaultEvent> {
        match self.parse_numbered(line, line_number) {
            Ok(parsed) => Ok(project::to_event(&parsed, Some(line_number))),
            Err(fault) => Err(fault.into_event()),
        }
    }
}

fn skip_spaces(line: &str, mut pos: usize) -> usize {
    let bytes = line.as_bytes();
    while pos < line.len() && bytes[pos] == b' ' {
        pos += 1;
    }
    pos
}

fn locate(mut fault: ParseFault, cursor: usize, line_number: Option<u64>) -> ParseFault {
    if fault.position.is_none() {
        fault.position = Some(cursor);
    }
    if fault.line_number.is_none() {
        fault.line_number = line_number;
    }
    fault
}
