//! 액세스 로그 파서 에러 타입
//!
//! 두 개의 분리된 실패 경로를 구분합니다.
//!
//! - [`AccessLogError`]: 치명적 설정/구성 에러. 잘못된 포맷 명세,
//!   균형이 맞지 않는 인클로저 등 — 처리를 계속하면 의미적으로 잘못된
//!   결과가 조용히 만들어지므로 즉시 중단합니다.
//! - [`ParseFault`]: 라인 단위의 복구 가능한 데이터 품질 문제.
//!   스트림을 중단하지 않으며 [`FaultEvent`]로 변환되어 흘러갑니다.

use clickpath_core::error::{ClickpathError, ConfigError};
use clickpath_core::event::{FaultEvent, MODULE_ACCESS_LOG};

/// 액세스 로그 도메인의 치명적 에러
///
/// 모두 구성 시점(포맷 컴파일, `LogFormat` 생성)에 발생하며,
/// 라인별 파싱 중에는 발생하지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum AccessLogError {
    /// 포맷 명세에 알 수 없는 요소가 있음
    #[error("unknown format element '{element}' in format specification '{spec}'")]
    UnknownFormatElement {
        /// 인식하지 못한 잔여 문자열
        element: String,
        /// 전체 포맷 명세
        spec: String,
    },

    /// 파라미터화 토큰의 파라미터가 비어 있음
    #[error("empty parameter in format element '{element}'")]
    EmptyParameter {
        /// 문제가 된 포맷 요소
        element: String,
    },

    /// 인클로저 토큰의 개수가 홀수 (따옴표 짝이 맞지 않음)
    #[error("unbalanced {kind} enclosures in log format")]
    UnbalancedEnclosure {
        /// 인클로저 종류 ("double-quote", "single-quote")
        kind: &'static str,
    },

    /// 토큰이 하나도 없는 포맷
    #[error("log format contains no tokens")]
    EmptyFormat,
}

impl From<AccessLogError> for ClickpathError {
    fn from(err: AccessLogError) -> Self {
        ClickpathError::Config(ConfigError::InvalidValue {
            field: "access_log.format".to_owned(),
            reason: err.to_string(),
        })
    }
}

/// 라인 단위의 복구 가능한 파싱 실패
///
/// 메시지와 함께 원인 라인 번호, 라인 내 위치를 선택적으로 담습니다.
/// 호출자는 이를 폴트 이벤트로 변환해 스트림에 흘려보내고
/// 다음 라인을 계속 처리합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseFault {
    /// 실패 설명
    pub message: String,
    /// 원인이 된 라인 번호 (있을 경우)
    pub line_number: Option<u64>,
    /// 라인 내 바이트 위치 (있을 경우)
    pub position: Option<usize>,
}

impl ParseFault {
    /// 새 파싱 폴트를 생성합니다.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line_number: None,
            position: None,
        }
    }

    /// 라인 번호를 설정합니다.
    pub fn with_line_number(mut self, line_number: u64) -> Self {
        self.line_number = Some(line_number);
        self
    }

    /// 라인 내 위치를 설정합니다.
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// 다운스트림으로 흘려보낼 폴트 이벤트로 변환합니다.
    pub fn into_event(self) -> FaultEvent {
        let mut event = FaultEvent::new(MODULE_ACCESS_LOG, self.message);
        event.line_number = self.line_number;
        event.position = self.position;
        event
    }
}
