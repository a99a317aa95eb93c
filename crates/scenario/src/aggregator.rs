//! 시나리오 집계기 — 세션 맵을 소유하는 진입점
//!
//! [`ScenarioAggregator`]는 HTTP 요청 이벤트 스트림을 받아 세션 쿠키로
//! 라우팅하고, 각 세션의 시나리오 수명주기 결과(시나리오 이벤트,
//! 폴트 이벤트)를 돌려줍니다. 세션 맵은 집계기가 명시적으로 소유하며
//! 전역 상태가 없습니다.
//!
//! 집계 코어는 동기적입니다 — 이벤트 하나가 들어오면 0개 이상의 결과가
//! 나오며, 중단점도 내부 잠금도 없습니다.

use std::collections::HashMap;

use clickpath_core::event::{FaultEvent, HttpEvent, ScenarioEvent};

use crate::config::AggregatorConfig;
use crate::error::{ScenarioError, ScenarioFault};
use crate::session::HttpSession;

/// 집계기가 내보내는 이벤트
#[derive(Debug, Clone)]
pub enum AggregatorOutput {
    /// 닫힌 비즈니스 시나리오
    Scenario(ScenarioEvent),
    /// 복구 가능한 집계 실패
    Fault(FaultEvent),
}

impl From<AggregatorOutput> for clickpath_core::pipeline::StreamEvent {
    fn from(output: AggregatorOutput) -> Self {
        match output {
            AggregatorOutput::Scenario(event) => Self::Scenario(event),
            AggregatorOutput::Fault(fault) => Self::Fault(fault),
        }
    }
}

/// 세션 기반 비즈니스 시나리오 집계기
pub struct ScenarioAggregator {
    /// 집계기 설정
    config: AggregatorConfig,
    /// 세션 식별자 → 세션 상태
    sessions: HashMap<String, HttpSession>,
    /// 닫힌 시나리오 수
    closed_count: u64,
    /// 폴트 수
    fault_count: u64,
}

impl ScenarioAggregator {
    /// 새 집계기를 생성합니다.
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
            closed_count: 0,
            fault_count: 0,
        }
    }

    /// HTTP 요청 이벤트 하나를 집계에 반영합니다.
    ///
    /// 세션 쿠키가 없는 요청은 어떤 세션에도 도달하지 않고 폴트가 됩니다.
    /// 정지 마커 타입 충돌은 치명적 에러로 전파됩니다.
    pub fn update(
        &mut self,
        event: &HttpEvent,
    ) -> Result<Vec<AggregatorOutput>, ScenarioError> {
        let Some(session_id) = event.request.cookie(&self.config.session_cookie) else {
            self.fault_count += 1;
            return Ok(vec![AggregatorOutput::Fault(
                ScenarioFault::new(format!(
                    "HTTP request event does not carry a '{}' cookie",
                    self.config.session_cookie
                ))
                .with_line_number(event.line_number)
                .into_event(),
            )]);
        };

        let session = self
            .sessions
            .entry(session_id.to_owned())
            .or_insert_with(|| HttpSession::new(session_id));

        let outputs = session.update(event, &self.config)?;

        for output in &outputs {
            match output {
                AggregatorOutput::Scenario(event) => {
                    self.closed_count += 1;
                    tracing::debug!(
                        state = %event.summary.state,
                        session = %event.summary.jsessionid,
                        requests = event.summary.request_count,
                        "business scenario closed"
                    );
                }
                AggregatorOutput::Fault(fault) => {
                    self.fault_count += 1;
                    tracing::debug!(message = %fault.message, "aggregation fault");
                }
            }
        }

        Ok(outputs)
    }

    /// 스트림 종료: 모든 세션의 열린 시나리오를 INCOMPLETE로 강제 종료합니다.
    ///
    /// 호출 후 종료 신호를 다운스트림으로 전파하는 것은 호출자의 몫입니다.
    pub fn finish(&mut self) -> Vec<ScenarioEvent> {
        let mut events = Vec::new();
        for session in self.sessions.values_mut() {
            if let Some(event) = session.force_close() {
                self.closed_count += 1;
                events.push(event);
            }
        }
        tracing::info!(
            forced = events.len(),
            sessions = self.sessions.len(),
            "end of stream, forced open scenarios closed"
        );
        events
    }

    /// 지금까지 등장한 세션 수
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// 현재 열려 있는 시나리오 수
    pub fn open_scenario_count(&self) -> usize {
        self.sessions
            .values()
            .filter(|s| s.has_open_scenario())
            .count()
    }

    /// 닫힌 시나리오 수
    pub fn closed_count(&self) -> u64 {
        self.closed_count
    }

    /// 폴트 수
    pub fn fault_count(&self) -> u64 {
        self.fault_count
    }
}
