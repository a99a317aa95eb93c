//! 로그 포맷 — 토큰 열과 포맷 명세 컴파일러
//!
//! [`LogFormat`]은 로그 라인 한 줄의 레이아웃을 기술하는 순서 있는
//! [`FormatToken`] 열입니다. 생성 시점에 따옴표 인클로저의 짝을
//! 한 번 검증합니다 — 위반은 라인별 폴트가 아니라 치명적 구성 에러입니다.
//!
//! # 포맷 명세 문자열
//!
//! 공백으로 구분된 청크들로 이루어지며, 한 청크가 인접한 여러 토큰을
//! 담을 수 있습니다 (예: `"%r"` = 따옴표 + `%r` + 따옴표).
//!
//! ```
//! use clickpath_access_log::format::LogFormat;
//!
//! let format = LogFormat::from_spec(r#"%h %l %u [%t] "%r" %>s %b"#).unwrap();
//! assert_eq!(format.tokens().len(), 11);
//! ```

use std::fmt;

use crate::error::AccessLogError;
use crate::token::FormatToken;

/// COMMON 프리셋의 포맷 명세
pub const COMMON_SPEC: &str = r#"%h %l %u [%t] "%r" %>s %b"#;

/// PERFORMANCE_ANALYSIS 프리셋의 포맷 명세
pub const PERFORMANCE_ANALYSIS_SPEC: &str = r#""%I" %h %u [%t] "%r" %s %b %D"#;

/// 로그 라인 한 줄의 레이아웃
///
/// 토큰 중복은 허용됩니다. 불변식: 큰따옴표/작은따옴표 토큰의 개수가
/// 각각 짝수여야 합니다 (등장할 때마다 불리언을 토글하여 추적).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFormat {
    name: String,
    tokens: Vec<FormatToken>,
}

impl LogFormat {
    /// 토큰 열에서 로그 포맷을 생성합니다.
    ///
    /// 따옴표 인클로저의 짝이 맞지 않으면 즉시 실패합니다.
    pub fn new(tokens: Vec<FormatToken>) -> Result<Self, AccessLogError> {
        Self::with_name("custom", tokens)
    }

    fn with_name(
        name: impl Into<String>,
        tokens: Vec<FormatToken>,
    ) -> Result<Self, AccessLogError> {
        if tokens.is_empty() {
            return Err(AccessLogError::EmptyFormat);
        }

        let mut double_open = false;
        let mut single_open = false;
        for token in &tokens {
            match token {
                FormatToken::DoubleQuote => double_open = !double_open,
                FormatToken::SingleQuote => single_open = !single_open,
                _ => {}
            }
        }
        if double_open {
            return Err(AccessLogError::UnbalancedEnclosure {
                kind: "double-quote",
            });
        }
        if single_open {
            return Err(AccessLogError::UnbalancedEnclosure {
                kind: "single-quote",
            });
        }

        Ok(Self {
            name: name.into(),
            tokens,
        })
    }

    /// 포맷 명세 문자열을 컴파일합니다.
    ///
    /// 공백으로 청크를 나눈 뒤, 각 청크에서 가장 긴 리터럴 접두사를
    /// 탐욕적으로 반복 매칭합니다. 인식하지 못한 잔여 문자열은
    /// 치명적 에러입니다.
    pub fn from_spec(spec: &str) -> Result<Self, AccessLogError> {
        let tokens = compile(spec)?;
        Self::with_name("custom", tokens)
    }

    /// COMMON 프리셋: `%h %l %u [%t] "%r" %>s %b`
    pub fn common() -> Self {
        // 프리셋은 카탈로그 내부에서 조립되므로 균형 검사가 필요 없음
        Self {
            name: "common".to_owned(),
            tokens: vec![
                FormatToken::RemoteHost,
                FormatToken::RemoteLogname,
                FormatToken::RemoteUser,
                FormatToken::OpenBracket,
                FormatToken::Timestamp,
                FormatToken::CloseBracket,
                FormatToken::DoubleQuote,
                FormatToken::RequestLine,
                FormatToken::DoubleQuote,
                FormatToken::StatusCode,
                FormatToken::ResponseSize,
            ],
        }
    }

    /// PERFORMANCE_ANALYSIS 프리셋: `"%I" %h %u [%t] "%r" %s %b %D`
    pub fn performance_analysis() -> Self {
        Self {
            name: "performance".to_owned(),
            tokens: vec![
                FormatToken::DoubleQuote,
                FormatToken::ThreadName,
                FormatToken::DoubleQuote,
                FormatToken::RemoteHost,
                FormatToken::RemoteUser,
                FormatToken::OpenBracket,
                FormatToken::Timestamp,
                FormatToken::CloseBracket,
                FormatToken::DoubleQuote,
                FormatToken::RequestLine,
                FormatToken::DoubleQuote,
                FormatToken::OriginalStatusCode,
                FormatToken::ResponseSize,
                FormatToken::ProcessingTime,
            ],
        }
    }

    /// 포맷 이름 ("common", "performance", "custom")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 토큰 열
    pub fn tokens(&self) -> &[FormatToken] {
        &self.tokens
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literals: Vec<String> = self.tokens.iter().map(FormatToken::literal).collect();
        write!(f, "{}", literals.join(" "))
    }
}

/// 길이 내림차순으로 정렬된 리터럴 토큰 테이블
///
/// 탐욕적 최장 접두사 매칭이 테이블 순서에 의존합니다.
const LITERALS: &[(&str, fn() -> FormatToken)] = &[
    ("%>s", || FormatToken::StatusCode),
    ("%h", || FormatToken::RemoteHost),
    ("%l", || FormatToken::RemoteLogname),
    ("%u", || FormatToken::RemoteUser),
    ("%t", || FormatToken::Timestamp),
    ("%r", || FormatToken::RequestLine),
    ("%s", || FormatToken::OriginalStatusCode),
    ("%b", || FormatToken::ResponseSize),
    ("%I", || FormatToken::ThreadName),
    ("%D", || FormatToken::ProcessingTime),
    ("\"", || FormatToken::DoubleQuote),
    ("'", || FormatToken::SingleQuote),
    ("[", || FormatToken::OpenBracket),
    ("]", || FormatToken::CloseBracket),
];

/// 파라미터화 토큰 접두사 테이블
const PARAMETERIZED: &[(&str, fn(String) -> FormatToken)] = &[
    ("%{i,", FormatToken::RequestHeader),
    ("%{o,", FormatToken::ResponseHeader),
    ("%{c,", FormatToken::Cookie),
];

fn compile(spec: &str) -> Result<Vec<FormatToken>, AccessLogError> {
    let mut tokens = Vec::new();

    for chunk in spec.split_whitespace() {
        let mut rest = chunk;
        while !rest.is_empty() {
            let (token, consumed) =
                match_element(rest).ok_or_else(|| AccessLogError::UnknownFormatElement {
                    element: rest.to_owned(),
                    spec: spec.to_owned(),
                })??;
            tokens.push(token);
            rest = &rest[consumed..];
        }
    }

    Ok(tokens)
}

/// `rest`의 시작에서 하나의 포맷 요소를 매칭합니다.
///
/// 반환값: `None` = 인식 실패, `Some(Err(_))` = 파라미터화 토큰의
/// 구성 에러, `Some(Ok((token, consumed_bytes)))` = 매칭 성공.
#[allow(clippy::type_complexity)]
fn match_element(rest: &str) -> Option<Result<(FormatToken, usize), AccessLogError>> {
    for (prefix, ctor) in PARAMETERIZED {
        if let Some(after) = rest.strip_prefix(prefix) {
            let Some(close) = after.find('}') else {
                return Some(Err(AccessLogError::UnknownFormatElement {
                    element: rest.to_owned(),
                    spec: rest.to_owned(),
                }));
            };
            let name = &after[..close];
            if name.is_empty() {
                return Some(Err(AccessLogError::EmptyParameter {
                    element: rest[..prefix.len() + close + 1].to_owned(),
                }));
            }
            let consumed = prefix.len() + close + 1;
            return Some(Ok((ctor(name.to_owned()), consumed)));
        }
    }

    for (literal, ctor) in LITERALS {
        if rest.starts_with(literal) {
            return Some(Ok((ctor(), literal.len())));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_preset_matches_its_spec() {
        let preset = LogFormat::common();
        let compiled = LogFormat::from_spec(COMMON_SPEC).unwrap();
        assert_eq!(preset.tokens(), compiled.tokens());
        assert_eq!(preset.name(), "common");
    }

    #[test]
    fn performance_preset_matches_its_spec() {
        let preset = LogFormat::performance_analysis();
        let compiled = LogFormat::from_spec(PERFORMANCE_ANALYSIS_SPEC).unwrap();
        assert_eq!(preset.tokens(), compiled.tokens());
        assert_eq!(preset.name(), "performance");
    }

    #[test]
    fn chunk_may_encode_adjacent_tokens() {
        let format = LogFormat::from_spec(r#""%D""#).unwrap();
        assert_eq!(
            format.tokens(),
            &[
                FormatToken::DoubleQuote,
                FormatToken::ProcessingTime,
                FormatToken::DoubleQuote,
            ]
        );
    }

    #[test]
    fn bracketed_timestamp_compiles_to_three_tokens() {
        let format = LogFormat::from_spec("[%t]").unwrap();
        assert_eq!(
            format.tokens(),
            &[
                FormatToken::OpenBracket,
                FormatToken::Timestamp,
                FormatToken::CloseBracket,
            ]
        );
    }

    #[test]
    fn final_status_wins_over_original_prefix() {
        let format = LogFormat::from_spec("%>s %s").unwrap();
        assert_eq!(
            format.tokens(),
            &[FormatToken::StatusCode, FormatToken::OriginalStatusCode]
        );
    }

    #[test]
    fn parameterized_tokens_compile() {
        let format =
            LogFormat::from_spec("%{i,User-Agent} %{o,Set-Cookie} %{c,JSESSIONID}").unwrap();
        assert_eq!(
            format.tokens(),
            &[
                FormatToken::RequestHeader("User-Agent".to_owned()),
                FormatToken::ResponseHeader("Set-Cookie".to_owned()),
                FormatToken::Cookie("JSESSIONID".to_owned()),
            ]
        );
    }

    #[test]
    fn quoted_parameterized_chunk() {
        let format = LogFormat::from_spec(r#""%{i,Referer}""#).unwrap();
        assert_eq!(format.tokens().len(), 3);
        assert_eq!(
            format.tokens()[1],
            FormatToken::RequestHeader("Referer".to_owned())
        );
    }

    #[test]
    fn unknown_element_is_fatal() {
        let err = LogFormat::from_spec("%h %z").unwrap_err();
        assert!(matches!(
            err,
            AccessLogError::UnknownFormatElement { .. }
        ));
    }

    #[test]
    fn unknown_residual_inside_chunk_is_fatal() {
        let err = LogFormat::from_spec("%hxyz").unwrap_err();
        assert!(matches!(err, AccessLogError::UnknownFormatElement { .. }));
    }

    #[test]
    fn unterminated_parameterized_token_is_fatal() {
        let err = LogFormat::from_spec("%{i,Host").unwrap_err();
        assert!(matches!(err, AccessLogError::UnknownFormatElement { .. }));
    }

    #[test]
    fn empty_parameter_is_fatal() {
        let err = LogFormat::from_spec("%{c,}").unwrap_err();
        assert!(matches!(err, AccessLogError::EmptyParameter { .. }));
    }

    #[test]
    fn empty_spec_is_fatal() {
        assert!(matches!(
            LogFormat::from_spec("   "),
            Err(AccessLogError::EmptyFormat)
        ));
    }

    #[test]
    fn odd_double_quotes_fail() {
        let err = LogFormat::new(vec![
            FormatToken::DoubleQuote,
            FormatToken::RequestLine,
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            AccessLogError::UnbalancedEnclosure {
                kind: "double-quote"
            }
        ));
    }

    #[test]
    fn odd_single_quotes_fail() {
        let err = LogFormat::new(vec![
            FormatToken::SingleQuote,
            FormatToken::RemoteHost,
            FormatToken::SingleQuote,
            FormatToken::SingleQuote,
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            AccessLogError::UnbalancedEnclosure {
                kind: "single-quote"
            }
        ));
    }

    #[test]
    fn even_quotes_succeed_regardless_of_position() {
        // 짝수 개수라면 위치와 무관하게 성공
        let format = LogFormat::new(vec![
            FormatToken::DoubleQuote,
            FormatToken::DoubleQuote,
            FormatToken::RemoteHost,
            FormatToken::DoubleQuote,
            FormatToken::RequestLine,
            FormatToken::DoubleQuote,
        ]);
        assert!(format.is_ok());
    }

    #[test]
    fn duplicate_tokens_are_allowed() {
        let format = LogFormat::new(vec![FormatToken::RemoteHost, FormatToken::RemoteHost]);
        assert!(format.is_ok());
    }

    #[test]
    fn display_joins_literals() {
        let format = LogFormat::from_spec("%h %>s").unwrap();
        assert_eq!(format.to_string(), "%h %>s");
    }
}
