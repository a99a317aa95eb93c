//! HTTP 세션 — 세션 쿠키 값 하나당 하나의 상태
//!
//! 세션은 최대 하나의 열린 [`BusinessScenario`]를 가지며, 자기 세션으로
//! 라우팅된 요청 이벤트를 마커 헤더에 따라 시나리오 수명주기로
//! 해석합니다. 세션 간에는 어떤 상태도 공유하지 않습니다.

use clickpath_core::event::{HttpEvent, ScenarioEvent};
use clickpath_core::types::ScenarioState;

use crate::aggregator::AggregatorOutput;
use crate::config::AggregatorConfig;
use crate::error::{ScenarioError, ScenarioFault};
use crate::scenario::BusinessScenario;

/// 세션 쿠키 값 하나에 대응하는 세션 상태
#[derive(Debug)]
pub struct HttpSession {
    /// 세션 식별자 (쿠키 값)
    id: String,
    /// 현재 열린 시나리오 (없으면 None)
    scenario: Option<BusinessScenario>,
}

impl HttpSession {
    /// 새 세션을 생성합니다.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scenario: None,
        }
    }

    /// 세션 식별자
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 열린 시나리오가 있는지 확인합니다.
    pub fn has_open_scenario(&self) -> bool {
        self.scenario.is_some()
    }

    /// 요청 이벤트 하나를 이 세션의 시나리오 수명주기에 반영합니다.
    ///
    /// 복구 가능한 문제는 폴트 이벤트로 반환되고, 정지 마커 타입 충돌은
    /// 치명적 에러로 전파됩니다. 잘못된 세션으로 라우팅된 이벤트는
    /// 라우터의 프로그래밍 오류이므로 패닉합니다.
    pub fn update(
        &mut self,
        event: &HttpEvent,
        config: &AggregatorConfig,
    ) -> Result<Vec<AggregatorOutput>, ScenarioError> {
        let request = &event.request;

        let cookie = request.cookie(&config.session_cookie);
        assert_eq!(
            cookie.unwrap_or_default(),
            self.id,
            "event routed to wrong session"
        );

        let start = request.request_header(&config.start_marker_header);
        let stop = request.request_header(&config.stop_marker_header);

        let mut outputs = Vec::new();

        match self.scenario.take() {
            None => {
                if let Some(scenario_type) = start {
                    match request.duration {
                        Some(duration) => {
                            let mut scenario = self.open_scenario(scenario_type, event, config);
                            scenario.absorb(request, duration);
                            self.scenario = Some(scenario);
                        }
                        None => outputs.push(missing_duration_fault(event)),
                    }
                } else if stop.is_some() {
                    outputs.push(AggregatorOutput::Fault(
                        ScenarioFault::new(format!(
                            "stop marker arrived for session '{}' but no business scenario is open",
                            self.id
                        ))
                        .with_line_number(event.line_number)
                        .into_event(),
                    ));
                } else {
                    outputs.push(AggregatorOutput::Fault(
                        ScenarioFault::new(format!(
                            "request in session '{}' does not belong to any business scenario",
                            self.id
                        ))
                        .with_line_number(event.line_number)
                        .into_event(),
                    ));
                }
            }
            Some(mut scenario) => {
                let Some(duration) = request.duration else {
                    // 처리 시간이 없는 요청은 집계되지 않고 시나리오는 열린 채 유지
                    outputs.push(missing_duration_fault(event));
                    self.scenario = Some(scenario);
                    return Ok(outputs);
                };

                if let Some(marker_type) = stop {
                    // 마커 값은 비어 있거나 시나리오 타입과 일치해야 함
                    let marker_type = marker_type.trim();
                    if !marker_type.is_empty()
                        && Some(marker_type) != scenario.scenario_type()
                    {
                        return Err(ScenarioError::StopMarkerMismatch {
                            jsessionid: self.id.clone(),
                            scenario_type: scenario
                                .scenario_type()
                                .unwrap_or_default()
                                .to_owned(),
                            marker_type: marker_type.to_owned(),
                        });
                    }

                    scenario.absorb(request, duration);
                    scenario.close(ScenarioState::Complete);
                    outputs.push(AggregatorOutput::Scenario(ScenarioEvent::new(
                        scenario.summary(),
                    )));

                    // 같은 이벤트가 새 시작 마커도 실었다면 곧바로 다음 시나리오를 엶
                    if let Some(scenario_type) = start {
                        let mut next = self.open_scenario(scenario_type, event, config);
                        next.absorb(request, duration);
                        self.scenario = Some(next);
                    }
                } else if let Some(scenario_type) = start {
                    // 열려 있는 동안 새 시작 마커: 현재 시나리오를 암묵적으로 닫고
                    // 같은 이벤트로 다음 시나리오를 시드 — 이벤트가 두 번 적용됨
                    scenario.absorb(request, duration);
                    scenario.close(ScenarioState::ClosedByStartMarker);
                    outputs.push(AggregatorOutput::Scenario(ScenarioEvent::new(
                        scenario.summary(),
                    )));

                    let mut next = self.open_scenario(scenario_type, event, config);
                    next.absorb(request, duration);
                    self.scenario = Some(next);
                } else {
                    scenario.absorb(request, duration);
                    self.scenario = Some(scenario);
                }
            }
        }

        Ok(outputs)
    }

    /// 스트림 종료 시 열린 시나리오를 강제 종료합니다.
    pub fn force_close(&mut self) -> Option<ScenarioEvent> {
        let mut scenario = self.scenario.take()?;
        scenario.close(ScenarioState::Incomplete);
        Some(ScenarioEvent::new(scenario.summary()))
    }

    fn open_scenario(
        &self,
        scenario_type: &str,
        event: &HttpEvent,
        config: &AggregatorConfig,
    ) -> BusinessScenario {
        let iteration_id = event
            .request
            .request_header(&config.iteration_id_header)
            .map(ToOwned::to_owned);
        BusinessScenario::open(&self.id, scenario_type, iteration_id)
    }
}

fn missing_duration_fault(event: &HttpEvent) -> AggregatorOutput {
    AggregatorOutput::Fault(
        ScenarioFault::new(
            "request carries no processing duration and was not counted toward the scenario",
        )
        .with_line_number(event.line_number)
        .into_event(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clickpath_core::types::HttpRequest;
    use std::time::{Duration, SystemTime};

    fn config() -> AggregatorConfig {
        AggregatorConfig::default()
    }

    fn event(
        session: &str,
        start: Option<&str>,
        stop: Option<&str>,
        duration_secs: Option<u64>,
    ) -> HttpEvent {
        let mut request = HttpRequest {
            timestamp: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1000)),
            status_code: Some(200),
            duration: duration_secs.map(Duration::from_secs),
            ..Default::default()
        };
        request
            .cookies
            .insert("JSESSIONID".to_owned(), session.to_owned());
        if let Some(value) = start {
            request
                .request_headers
                .insert("Business-Scenario-Start-Marker".to_owned(), value.to_owned());
        }
        if let Some(value) = stop {
            request
                .request_headers
                .insert("Business-Scenario-Stop-Marker".to_owned(), value.to_owned());
        }
        HttpEvent::new(request, Some(1))
    }

    #[test]
    fn start_marker_opens_scenario() {
        let mut session = HttpSession::new("s1");
        let outputs = session
            .update(&event("s1", Some("checkout"), None, Some(1)), &config())
            .unwrap();
        assert!(outputs.is_empty());
        assert!(session.has_open_scenario());
    }

    #[test]
    fn orphan_request_is_a_fault() {
        let mut session = HttpSession::new("s1");
        let outputs = session
            .update(&event("s1", None, None, Some(1)), &config())
            .unwrap();
        assert_eq!(outputs.len(), 1);
        match &outputs[0] {
            AggregatorOutput::Fault(fault) => {
                assert!(fault.message.contains("does not belong to any business scenario"));
            }
            other => panic!("expected fault, got {other:?}"),
        }
        assert!(!session.has_open_scenario());
    }

    #[test]
    fn stop_without_open_scenario_is_a_fault() {
        let mut session = HttpSession::new("s1");
        let outputs = session
            .update(&event("s1", None, Some("checkout"), Some(1)), &config())
            .unwrap();
        assert_eq!(outputs.len(), 1);
        assert!(matches!(outputs[0], AggregatorOutput::Fault(_)));
        assert!(!session.has_open_scenario());
    }

    #[test]
    fn stop_marker_closes_scenario_complete() {
        let mut session = HttpSession::new("s1");
        session
            .update(&event("s1", Some("checkout"), None, Some(1)), &config())
            .unwrap();
        session
            .update(&event("s1", None, None, Some(1)), &config())
            .unwrap();
        let outputs = session
            .update(&event("s1", None, Some("checkout"), Some(1)), &config())
            .unwrap();

        assert_eq!(outputs.len(), 1);
        match &outputs[0] {
            AggregatorOutput::Scenario(event) => {
                assert_eq!(event.summary.state, ScenarioState::Complete);
                assert_eq!(event.summary.request_count, 3);
                assert_eq!(event.summary.duration, Duration::from_secs(3));
            }
            other => panic!("expected scenario event, got {other:?}"),
        }
        assert!(!session.has_open_scenario());
    }

    #[test]
    fn empty_stop_marker_value_matches_any_type() {
        let mut session = HttpSession::new("s1");
        session
            .update(&event("s1", Some("checkout"), None, Some(1)), &config())
            .unwrap();
        let outputs = session
            .update(&event("s1", None, Some(""), Some(1)), &config())
            .unwrap();
        assert!(matches!(outputs[0], AggregatorOutput::Scenario(_)));
    }

    #[test]
    fn mismatched_stop_marker_is_fatal() {
        let mut session = HttpSession::new("s1");
        session
            .update(&event("s1", Some("TYPE-A"), None, Some(1)), &config())
            .unwrap();
        let err = session
            .update(&event("s1", None, Some("TYPE-B"), Some(1)), &config())
            .unwrap_err();
        assert!(matches!(err, ScenarioError::StopMarkerMismatch { .. }));
    }

    #[test]
    fn new_start_marker_closes_and_reopens_with_same_event() {
        let mut session = HttpSession::new("s1");
        session
            .update(&event("s1", Some("TYPE-A"), None, Some(1)), &config())
            .unwrap();
        let outputs = session
            .update(&event("s1", Some("TYPE-B"), None, Some(2)), &config())
            .unwrap();

        // 같은 요청이 두 번 적용됨: 닫는 데 한 번, 시드하는 데 한 번
        assert_eq!(outputs.len(), 1);
        match &outputs[0] {
            AggregatorOutput::Scenario(event) => {
                assert_eq!(event.summary.state, ScenarioState::ClosedByStartMarker);
                assert_eq!(event.summary.scenario_type.as_deref(), Some("TYPE-A"));
                assert_eq!(event.summary.request_count, 2);
                assert_eq!(event.summary.duration, Duration::from_secs(3));
            }
            other => panic!("expected scenario event, got {other:?}"),
        }
        assert!(session.has_open_scenario());
    }

    #[test]
    fn missing_duration_on_open_scenario_is_a_fault_and_not_counted() {
        let mut session = HttpSession::new("s1");
        session
            .update(&event("s1", Some("checkout"), None, Some(1)), &config())
            .unwrap();
        let outputs = session
            .update(&event("s1", None, None, None), &config())
            .unwrap();
        assert!(matches!(outputs[0], AggregatorOutput::Fault(_)));
        assert!(session.has_open_scenario());

        // 폴트 이벤트의 duration은 합계에 포함되지 않음
        let outputs = session
            .update(&event("s1", None, Some("checkout"), Some(1)), &config())
            .unwrap();
        match &outputs[0] {
            AggregatorOutput::Scenario(event) => {
                assert_eq!(event.summary.request_count, 2);
                assert_eq!(event.summary.duration, Duration::from_secs(2));
            }
            other => panic!("expected scenario event, got {other:?}"),
        }
    }

    #[test]
    fn missing_duration_on_seed_event_does_not_create_scenario() {
        let mut session = HttpSession::new("s1");
        let outputs = session
            .update(&event("s1", Some("checkout"), None, None), &config())
            .unwrap();
        assert!(matches!(outputs[0], AggregatorOutput::Fault(_)));
        assert!(!session.has_open_scenario());
    }

    #[test]
    fn force_close_yields_incomplete_scenario() {
        let mut session = HttpSession::new("s1");
        session
            .update(&event("s1", Some("checkout"), None, Some(7)), &config())
            .unwrap();
        let event = session.force_close().expect("scenario should close");
        assert_eq!(event.summary.state, ScenarioState::Incomplete);
        assert_eq!(event.summary.request_count, 1);
        assert_eq!(event.summary.duration, Duration::from_secs(7));
        assert!(session.force_close().is_none());
    }

    #[test]
    #[should_panic(expected = "event routed to wrong session")]
    fn wrong_session_routing_panics() {
        let mut session = HttpSession::new("s1");
        let _ = session.update(&event("other-session", None, None, Some(1)), &config());
    }

    #[test]
    fn iteration_id_is_captured_at_open() {
        let mut session = HttpSession::new("s1");
        let mut seed = event("s1", Some("checkout"), None, Some(1));
        seed.request.request_headers.insert(
            "Business-Scenario-Iteration-ID".to_owned(),
            "iter-3".to_owned(),
        );
        session.update(&seed, &config()).unwrap();
        let closed = session.force_close().unwrap();
        assert_eq!(closed.summary.iteration_id.as_deref(), Some("iter-3"));
    }
}
