//! 시나리오 집계 에러 타입
//!
//! - [`ScenarioError`]: 치명적 에러. 정지 마커 타입 충돌처럼 데이터가
//!   손상되었거나 적대적임을 시사하는 조건 — 계속 진행하면 의미적으로
//!   잘못된 집계가 만들어지므로 스트림 전체를 중단합니다.
//! - [`ScenarioFault`]: 이벤트 단위의 복구 가능한 데이터 품질 문제.
//!   폴트 이벤트로 변환되어 스트림과 함께 흘러갑니다.

use clickpath_core::error::{ClickpathError, PipelineError};
use clickpath_core::event::{FaultEvent, MODULE_SCENARIO};

/// 시나리오 집계의 치명적 에러
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// 정지 마커의 타입이 열린 시나리오의 타입과 충돌
    ///
    /// 일반적인 데이터 품질 문제가 아니라 마커 데이터 자체가 손상되었다는
    /// 신호이므로 치명적입니다.
    #[error(
        "stop marker type '{marker_type}' conflicts with open scenario type \
         '{scenario_type}' for session '{jsessionid}'"
    )]
    StopMarkerMismatch {
        /// 세션 식별자
        jsessionid: String,
        /// 열린 시나리오의 타입
        scenario_type: String,
        /// 정지 마커가 실어 온 타입
        marker_type: String,
    },
}

impl From<ScenarioError> for ClickpathError {
    fn from(err: ScenarioError) -> Self {
        ClickpathError::Pipeline(PipelineError::Aborted(err.to_string()))
    }
}

/// 이벤트 단위의 복구 가능한 집계 실패
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ScenarioFault {
    /// 실패 설명
    pub message: String,
    /// 원인이 된 로그 라인 번호 (있을 경우)
    pub line_number: Option<u64>,
}

impl ScenarioFault {
    /// 새 집계 폴트를 생성합니다.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line_number: None,
        }
    }

    /// 라인 번호를 설정합니다.
    pub fn with_line_number(mut self, line_number: Option<u64>) -> Self {
        self.line_number = line_number;
        self
    }

    /// 다운스트림으로 흘려보낼 폴트 이벤트로 변환합니다.
    pub fn into_event(self) -> FaultEvent {
        let mut event = FaultEvent::new(MODULE_SCENARIO, self.message);
        event.line_number = self.line_number;
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_marker_mismatch_display_names_all_three() {
        let err = ScenarioError::StopMarkerMismatch {
            jsessionid: "sess-1".to_owned(),
            scenario_type: "TYPE-A".to_owned(),
            marker_type: "TYPE-B".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sess-1"));
        assert!(msg.contains("TYPE-A"));
        assert!(msg.contains("TYPE-B"));
    }

    #[test]
    fn scenario_error_is_fatal() {
        let err: ClickpathError = ScenarioError::StopMarkerMismatch {
            jsessionid: "s".to_owned(),
            scenario_type: "a".to_owned(),
            marker_type: "b".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            ClickpathError::Pipeline(PipelineError::Aborted(_))
        ));
    }

    #[test]
    fn scenario_fault_into_event() {
        let event = ScenarioFault::new("no marker")
            .with_line_number(Some(5))
            .into_event();
        assert_eq!(event.message, "no marker");
        assert_eq!(event.line_number, Some(5));
        assert_eq!(event.metadata.source_module, "scenario");
    }
}
