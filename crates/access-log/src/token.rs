//! 포맷 토큰 카탈로그
//!
//! 로그 라인의 논리적 필드 하나를 기술하는 닫힌 합 타입입니다.
//! 고정된 리터럴 토큰 집합(`%h`, `%t`, `%>s` 등)과 세 개의
//! 파라미터화 토큰 계열(`%{i,Header}`, `%{o,Header}`, `%{c,Cookie}`)로
//! 구성됩니다. 각 변형은 자신의 리터럴, 값 타입, 인클로저 역할과
//! 타입 강제(`parse`) 로직을 스스로 알고 있습니다.

use std::fmt;
use std::time::SystemTime;

use clickpath_core::types::FieldValue;

use crate::error::ParseFault;

/// httpd `%t` 필드의 타임스탬프 패턴
/// 예: `18/Sep/2016:19:18:28 -0400`
pub const TIMESTAMP_PATTERN: &str = "%d/%b/%Y:%H:%M:%S %z";

/// 빈 필드를 나타내는 자리 표시자
pub const EMPTY_PLACEHOLDER: &str = "-";

/// 필드의 선언된 값 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// 문자열
    Text,
    /// 32비트 정수 (상태 코드)
    Integer,
    /// 64비트 정수 (응답 크기, 처리 시간)
    Long,
    /// 타임스탬프
    Date,
    /// 단일 문자
    Character,
}

/// 값에 붙는 측정 단위
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureUnit {
    /// 마이크로초 (`%D`)
    Microseconds,
    /// 바이트 (`%b`)
    Bytes,
}

/// 로그 라인 레이아웃의 논리적 필드 하나
///
/// 파라미터화 변형의 동등성은 파생된 enum 동등성으로 충분합니다 —
/// 종류와 파라미터가 모두 같을 때만 같은 토큰입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormatToken {
    /// `%h` — 원격 호스트
    RemoteHost,
    /// `%l` — 원격 로그명 (identd)
    RemoteLogname,
    /// `%u` — 인증된 원격 사용자
    RemoteUser,
    /// `%t` — 요청 타임스탬프
    Timestamp,
    /// `%r` — 요청 첫 줄 ("GET /path HTTP/1.1")
    RequestLine,
    /// `%s` — 최초 응답 상태 코드
    OriginalStatusCode,
    /// `%>s` — 최종 응답 상태 코드
    StatusCode,
    /// `%b` — 응답 본문 크기 (바이트)
    ResponseSize,
    /// `%I` — 요청을 처리한 스레드 이름
    ThreadName,
    /// `%D` — 처리 시간 (마이크로초)
    ProcessingTime,
    /// `"` — 큰따옴표 인클로저 (여는/닫는 역할 겸용)
    DoubleQuote,
    /// `'` — 작은따옴표 인클로저 (여는/닫는 역할 겸용)
    SingleQuote,
    /// `[` — 여는 대괄호 인클로저
    OpenBracket,
    /// `]` — 닫는 대괄호 인클로저
    CloseBracket,
    /// `%{i,Name}` — 요청(incoming) 헤더
    RequestHeader(String),
    /// `%{o,Name}` — 응답(outgoing) 헤더
    ResponseHeader(String),
    /// `%{c,Name}` — 요청 쿠키
    Cookie(String),
}

impl FormatToken {
    /// 토큰의 리터럴 표기를 반환합니다.
    pub fn literal(&self) -> String {
        match self {
            Self::RemoteHost => "%h".to_owned(),
            Self::RemoteLogname => "%l".to_owned(),
            Self::RemoteUser => "%u".to_owned(),
            Self::Timestamp => "%t".to_owned(),
            Self::RequestLine => "%r".to_owned(),
            Self::OriginalStatusCode => "%s".to_owned(),
            Self::StatusCode => "%>s".to_owned(),
            Self::ResponseSize => "%b".to_owned(),
            Self::ThreadName => "%I".to_owned(),
            Self::ProcessingTime => "%D".to_owned(),
            Self::DoubleQuote => "\"".to_owned(),
            Self::SingleQuote => "'".to_owned(),
            Self::OpenBracket => "[".to_owned(),
            Self::CloseBracket => "]".to_owned(),
            Self::RequestHeader(name) => format!("%{{i,{name}}}"),
            Self::ResponseHeader(name) => format!("%{{o,{name}}}"),
            Self::Cookie(name) => format!("%{{c,{name}}}"),
        }
    }

    /// 값을 담는 토큰의 선언된 값 타입. 인클로저 토큰은 `None`.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Self::RemoteHost
            | Self::RemoteLogname
            | Self::RemoteUser
            | Self::RequestLine
            | Self::ThreadName
            | Self::RequestHeader(_)
            | Self::ResponseHeader(_)
            | Self::Cookie(_) => Some(FieldType::Text),
            Self::OriginalStatusCode | Self::StatusCode => Some(FieldType::Integer),
            Self::ResponseSize | Self::ProcessingTime => Some(FieldType::Long),
            Self::Timestamp => Some(FieldType::Date),
            Self::DoubleQuote | Self::SingleQuote | Self::OpenBracket | Self::CloseBracket => None,
        }
    }

    /// 값에 붙는 측정 단위 (있을 경우)
    pub fn measure_unit(&self) -> Option<MeasureUnit> {
        match self {
            Self::ProcessingTime => Some(MeasureUnit::Microseconds),
            Self::ResponseSize => Some(MeasureUnit::Bytes),
            _ => None,
        }
    }

    /// 인클로저 토큰 여부
    pub fn is_enclosure(&self) -> bool {
        matches!(
            self,
            Self::DoubleQuote | Self::SingleQuote | Self::OpenBracket | Self::CloseBracket
        )
    }

    /// 인클로저 토큰의 리터럴 문자
    pub fn enclosure_char(&self) -> Option<char> {
        match self {
            Self::DoubleQuote => Some('"'),
            Self::SingleQuote => Some('\''),
            Self::OpenBracket => Some('['),
            Self::CloseBracket => Some(']'),
            _ => None,
        }
    }

    /// 여는 인클로저라면, 짝이 되는 닫는 인클로저 토큰을 반환합니다.
    ///
    /// 따옴표 토큰은 여는/닫는 역할을 겸하므로 자기 자신이 짝입니다.
    /// `]`는 닫는 역할만 하므로 `None`입니다.
    pub fn closing_enclosure(&self) -> Option<FormatToken> {
        match self {
            Self::DoubleQuote => Some(Self::DoubleQuote),
            Self::SingleQuote => Some(Self::SingleQuote),
            Self::OpenBracket => Some(Self::CloseBracket),
            _ => None,
        }
    }

    /// 원시 필드 값을 선언된 타입으로 강제합니다.
    ///
    /// 빈 값(`-` 또는 빈 문자열)은 `Ok(None)` — 폴트가 아닙니다.
    /// 타입 불일치(숫자가 아닌 상태 코드 등)는 [`ParseFault`]입니다.
    pub fn parse(&self, raw: &str) -> Result<Option<FieldValue>, ParseFault> {
        if raw.is_empty() || raw == EMPTY_PLACEHOLDER {
            return Ok(None);
        }

        // 인클로저는 값을 담지 않음
        let Some(field_type) = self.field_type() else {
            return Ok(None);
        };

        let value = match field_type {
            FieldType::Text => FieldValue::Text(raw.to_owned()),
            FieldType::Integer => FieldValue::Integer(parse_i64(self, raw)?),
            FieldType::Long => FieldValue::Long(parse_i64(self, raw)?),
            FieldType::Date => {
                let dt = chrono::DateTime::parse_from_str(raw, TIMESTAMP_PATTERN).map_err(|e| {
                    ParseFault::new(format!(
                        "invalid timestamp '{raw}' for {}: {e}",
                        self.literal()
                    ))
                })?;
                FieldValue::Date(SystemTime::from(dt))
            }
            FieldType::Character => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => FieldValue::Character(c),
                    _ => {
                        return Err(ParseFault::new(format!(
                            "expected a single character for {}, got '{raw}'",
                            self.literal()
                        )));
                    }
                }
            }
        };

        Ok(Some(value))
    }
}

fn parse_i64(token: &FormatToken, raw: &str) -> Result<i64, ParseFault> {
    raw.parse::<i64>().map_err(|_| {
        ParseFault::new(format!(
            "invalid numeric value '{raw}' for {}",
            token.literal()
        ))
    })
}

impl fmt::Display for FormatToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.literal())
    }
}
