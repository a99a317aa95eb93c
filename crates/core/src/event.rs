//! 이벤트 시스템 — 파이프라인 단계 간 통신의 기본 단위
//!
//! 파서와 집계기는 이벤트를 생산하고, 출력 포매터는 이벤트를 소비합니다.
//! [`EventMetadata`]는 모든 이벤트에 공통으로 포함되는 메타데이터이며,
//! [`Event`] trait은 모든 이벤트 타입이 구현해야 하는 인터페이스입니다.
//!
//! 복구 가능한 데이터 품질 문제는 [`FaultEvent`]로 표현되어 정상 출력과
//! 나란히 다운스트림으로 흐릅니다. 치명적 에러만이
//! [`ClickpathError`](crate::error::ClickpathError)로 스트림을 중단시킵니다.

use std::fmt;
use std::time::SystemTime;

use crate::types::{HttpRequest, ScenarioSummary};

// --- 모듈명 상수 ---

/// 액세스 로그 파서 모듈명
pub const MODULE_ACCESS_LOG: &str = "access-log";
/// 비즈니스 시나리오 집계 모듈명
pub const MODULE_SCENARIO: &str = "scenario";
/// CLI 파이프라인 모듈명
pub const MODULE_PIPELINE: &str = "pipeline";

// --- 이벤트 타입 상수 ---

/// HTTP 요청 이벤트 타입
pub const EVENT_TYPE_HTTP: &str = "http";
/// 폴트 이벤트 타입
pub const EVENT_TYPE_FAULT: &str = "fault";
/// 시나리오 이벤트 타입
pub const EVENT_TYPE_SCENARIO: &str = "scenario";

/// 이벤트 메타데이터 — 모든 이벤트에 공통으로 포함되는 추적 정보
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EventMetadata {
    /// 이벤트 생성 시각
    pub created_at: SystemTime,
    /// 이벤트를 생성한 모듈명 (예: "access-log", "scenario")
    pub source_module: String,
}

impl EventMetadata {
    /// 새 메타데이터를 생성합니다.
    pub fn new(source_module: impl Into<String>) -> Self {
        Self {
            created_at: SystemTime::now(),
            source_module: source_module.into(),
        }
    }
}

impl fmt::Display for EventMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source={}", self.source_module)
    }
}

/// 모든 이벤트가 구현해야 하는 기본 trait
///
/// `Send + Sync + 'static` 바운드로 `tokio::mpsc` 채널을 통한
/// 안전한 전송을 보장합니다.
pub trait Event: Send + Sync + 'static {
    /// 이벤트 고유 ID (UUID v4)
    fn event_id(&self) -> &str;

    /// 이벤트 메타데이터
    fn metadata(&self) -> &EventMetadata;

    /// 이벤트 타입명 (로깅 및 라우팅에 사용)
    fn event_type(&self) -> &str;
}

/// 성공적으로 파싱된 HTTP 요청 이벤트
///
/// 액세스 로그 한 줄이 파싱에 성공할 때마다 하나씩 생성됩니다.
#[derive(Debug, Clone)]
pub struct HttpEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 파싱된 요청 레코드
    pub request: HttpRequest,
    /// 원본 로그 라인 번호 (1부터 시작)
    pub line_number: Option<u64>,
}

impl HttpEvent {
    /// 새 HTTP 요청 이벤트를 생성합니다.
    pub fn new(request: HttpRequest, line_number: Option<u64>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_ACCESS_LOG),
            request,
            line_number,
        }
    }
}

impl Event for HttpEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_HTTP
    }
}

impl fmt::Display for HttpEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HttpEvent[{}] {}",
            &self.id[..8.min(self.id.len())],
            self.request,
        )
    }
}

/// 복구 가능한 처리 실패를 나타내는 폴트 이벤트
///
/// 잘못된 로그 라인, 누락된 필수 필드, 마커 불일치 같은 데이터 품질
/// 문제는 스트림을 중단하지 않고 이 이벤트로 변환되어 흘러갑니다.
#[derive(Debug, Clone)]
pub struct FaultEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 폴트 설명
    pub message: String,
    /// 원인이 된 로그 라인 번호 (있을 경우)
    pub line_number: Option<u64>,
    /// 라인 내 위치 (있을 경우)
    pub position: Option<usize>,
}

impl FaultEvent {
    /// 새 폴트 이벤트를 생성합니다.
    pub fn new(source_module: &str, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(source_module),
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
}

impl Event for FaultEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_FAULT
    }
}

impl fmt::Display for FaultEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaultEvent[{}]", &self.id[..8.min(self.id.len())])?;
        if let Some(line) = self.line_number {
            write!(f, " line {line}")?;
        }
        if let Some(pos) = self.position {
            write!(f, " pos {pos}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// 닫힌 비즈니스 시나리오 이벤트
///
/// 시나리오가 닫힐 때(정상 종료, 시작 마커에 의한 강제 종료,
/// 스트림 종료 시 강제 종료) 하나씩 생성됩니다.
#[derive(Debug, Clone)]
pub struct ScenarioEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 시나리오 요약
    pub summary: ScenarioSummary,
}

impl ScenarioEvent {
    /// 새 시나리오 이벤트를 생성합니다.
    pub fn new(summary: ScenarioSummary) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_SCENARIO),
            summary,
        }
    }
}

impl Event for ScenarioEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_SCENARIO
    }
}

impl fmt::Display for ScenarioEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScenarioEvent[{}] {}",
            &self.id[..8.min(self.id.len())],
            self.summary,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScenarioState, ScenarioSummary};
    use std::time::Duration;

    fn sample_request() -> HttpRequest {
        HttpRequest {
            method: Some("GET".to_owned()),
            path: Some("/index.html".to_owned()),
            status_code: Some(200),
            ..Default::default()
        }
    }

    fn sample_summary() -> ScenarioSummary {
        ScenarioSummary {
            jsessionid: "sess-1".to_owned(),
            scenario_type: Some("login".to_owned()),
            state: ScenarioState::Complete,
            begin: Some(SystemTime::UNIX_EPOCH),
            end: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1)),
            duration: Duration::from_millis(10),
            request_count: 2,
            successful_request_count: 2,
            iteration_id: None,
        }
    }

    #[test]
    fn http_event_implements_event_trait() {
        let event = HttpEvent::new(sample_request(), Some(7));
        assert_eq!(event.event_type(), "http");
        assert!(!event.event_id().is_empty());
        assert_eq!(event.metadata().source_module, "access-log");
        assert_eq!(event.line_number, Some(7));
    }

    #[test]
    fn http_event_display() {
        let event = HttpEvent::new(sample_request(), None);
        let display = event.to_string();
        assert!(display.contains("HttpEvent"));
        assert!(display.contains("/index.html"));
    }

    #[test]
    fn fault_event_builder_chain() {
        let event = FaultEvent::new(MODULE_ACCESS_LOG, "invalid status code")
            .with_line_number(12)
            .with_position(34);
        assert_eq!(event.event_type(), "fault");
        assert_eq!(event.line_number, Some(12));
        assert_eq!(event.position, Some(34));
    }

    #[test]
    fn fault_event_display_includes_location() {
        let event = FaultEvent::new(MODULE_SCENARIO, "no marker").with_line_number(3);
        let display = event.to_string();
        assert!(display.contains("line 3"));
        assert!(display.contains("no marker"));
    }

    #[test]
    fn scenario_event_implements_event_trait() {
        let event = ScenarioEvent::new(sample_summary());
        assert_eq!(event.event_type(), "scenario");
        assert_eq!(event.metadata().source_module, "scenario");
    }

    #[test]
    fn scenario_event_display() {
        let event = ScenarioEvent::new(sample_summary());
        let display = event.to_string();
        assert!(display.contains("COMPLETE"));
        assert!(display.contains("sess-1"));
    }

    #[test]
    fn event_ids_are_unique() {
        let a = HttpEvent::new(sample_request(), None);
        let b = HttpEvent::new(sample_request(), None);
        assert_ne!(a.event_id(), b.event_id());
    }

    #[test]
    fn events_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<HttpEvent>();
        assert_send_sync::<FaultEvent>();
        assert_send_sync::<ScenarioEvent>();
    }
}
