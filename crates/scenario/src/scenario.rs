//! 비즈니스 시나리오 — 세션당 하나의 가변 집계
//!
//! 시나리오는 시작 마커를 실은 첫 요청으로 생성되고, 이후 같은 세션의
//! 모든 요청으로 갱신되며, 정지 마커(또는 강제 종료)로 닫힙니다.
//!
//! 집계 불변식:
//! - `duration`은 구성 요청들의 개별 처리 시간 합 — 벽시계 구간이 아님
//! - `begin`은 첫 요청의 타임스탬프로 고정되어 변하지 않음
//! - `request_count`는 집계 단계까지 도달한 요청마다 정확히 1 증가

use std::time::{Duration, SystemTime};

use clickpath_core::types::{HttpRequest, ScenarioState, ScenarioSummary};

/// 세션 하나에 속한 비즈니스 시나리오
#[derive(Debug, Clone)]
pub struct BusinessScenario {
    /// 시나리오 고유 ID
    id: String,
    /// 세션 식별 쿠키 값
    jsessionid: String,
    /// 시나리오 타입 (첫 시작 마커의 값)
    scenario_type: Option<String>,
    /// 현재 상태
    state: ScenarioState,
    /// 첫 요청의 타임스탬프
    begin: Option<SystemTime>,
    /// 종료 타임스탬프 (열려 있는 동안 None)
    end: Option<SystemTime>,
    /// 구성 요청들의 처리 시간 합계
    duration: Duration,
    /// 구성 요청 수
    request_count: u64,
    /// 성공(상태 코드 < 400) 요청 수
    successful_request_count: u64,
    /// 반복 식별자 (시나리오 시작 시 캡처)
    iteration_id: Option<String>,
    /// 마지막 요청의 타임스탬프 + 처리 시간 (강제 종료 시 end가 됨)
    last_activity: Option<SystemTime>,
}

impl BusinessScenario {
    /// 시작 마커를 실은 요청으로 새 시나리오를 엽니다.
    pub fn open(
        jsessionid: impl Into<String>,
        scenario_type: impl Into<String>,
        iteration_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            jsessionid: jsessionid.into(),
            scenario_type: Some(scenario_type.into()),
            state: ScenarioState::Open,
            begin: None,
            end: None,
            duration: Duration::ZERO,
            request_count: 0,
            successful_request_count: 0,
            iteration_id,
            last_activity: None,
        }
    }

    /// 요청 하나를 집계에 반영합니다.
    ///
    /// 호출자는 `duration`이 존재함을 이미 확인했습니다 — 처리 시간이
    /// 없는 요청은 여기까지 도달하지 않고 폴트가 됩니다.
    pub fn absorb(&mut self, request: &HttpRequest, duration: Duration) {
        if self.begin.is_none() {
            self.begin = request.timestamp;
        }
        self.duration += duration;
        self.request_count += 1;
        if request.is_success() {
            self.successful_request_count += 1;
        }
        if let Some(ts) = request.timestamp {
            self.last_activity = Some(ts + duration);
        }
    }

    /// 시나리오를 닫습니다. 종료 타임스탬프는 마지막 요청의
    /// 타임스탬프 + 처리 시간입니다.
    pub fn close(&mut self, state: ScenarioState) {
        self.state = state;
        self.end = self.last_activity;
    }

    /// 시나리오 고유 ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 세션 식별자
    pub fn jsessionid(&self) -> &str {
        &self.jsessionid
    }

    /// 시나리오 타입
    pub fn scenario_type(&self) -> Option<&str> {
        self.scenario_type.as_deref()
    }

    /// 현재 상태
    pub fn state(&self) -> ScenarioState {
        self.state
    }

    /// 닫힘 여부
    pub fn is_closed(&self) -> bool {
        self.state != ScenarioState::Open
    }

    /// 구성 요청 수
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// 처리 시간 합계
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// 첫 요청의 타임스탬프
    pub fn begin(&self) -> Option<SystemTime> {
        self.begin
    }

    /// 다운스트림으로 내보낼 요약 레코드를 만듭니다.
    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            jsessionid: self.jsessionid.clone(),
            scenario_type: self.scenario_type.clone(),
            state: self.state,
            begin: self.begin,
            end: self.end,
            duration: self.duration,
            request_count: self.request_count,
            successful_request_count: self.successful_request_count,
            iteration_id: self.iteration_id.clone(),
        }
    }
}
