//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `clickpath_`
//! - 모듈명: `access_log_`, `scenario_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(clickpath_core::metrics::ACCESS_LOG_LINES_TOTAL).increment(1);
//! ```

// ─── Access Log 메트릭 ─────────────────────────────────────────────

/// Access Log: 읽어 들인 전체 라인 수 (counter)
pub const ACCESS_LOG_LINES_TOTAL: &str = "clickpath_access_log_lines_total";

/// Access Log: 파싱에 성공한 라인 수 (counter)
pub const ACCESS_LOG_EVENTS_TOTAL: &str = "clickpath_access_log_events_total";

/// Access Log: 파싱 폴트 수 (counter)
pub const ACCESS_LOG_FAULTS_TOTAL: &str = "clickpath_access_log_faults_total";

// ─── Scenario 메트릭 ───────────────────────────────────────────────

/// Scenario: 닫힌 시나리오 수 (counter)
pub const SCENARIO_CLOSED_TOTAL: &str = "clickpath_scenario_closed_total";

/// Scenario: 집계 폴트 수 (counter)
pub const SCENARIO_FAULTS_TOTAL: &str = "clickpath_scenario_faults_total";

/// Scenario: 현재 열려 있는 시나리오 수 (gauge)
pub const SCENARIO_OPEN: &str = "clickpath_scenario_open";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        ACCESS_LOG_LINES_TOTAL,
        "Total number of access log lines read"
    );
    describe_counter!(
        ACCESS_LOG_EVENTS_TOTAL,
        "Total number of lines parsed into HTTP request events"
    );
    describe_counter!(
        ACCESS_LOG_FAULTS_TOTAL,
        "Total number of parsing faults emitted"
    );
    describe_counter!(
        SCENARIO_CLOSED_TOTAL,
        "Total number of business scenarios closed"
    );
    describe_counter!(
        SCENARIO_FAULTS_TOTAL,
        "Total number of aggregation faults emitted"
    );
    describe_gauge!(SCENARIO_OPEN, "Number of currently open business scenarios");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_follow_convention() {
        for name in [
            ACCESS_LOG_LINES_TOTAL,
            ACCESS_LOG_EVENTS_TOTAL,
            ACCESS_LOG_FAULTS_TOTAL,
            SCENARIO_CLOSED_TOTAL,
            SCENARIO_FAULTS_TOTAL,
            SCENARIO_OPEN,
        ] {
            assert!(name.starts_with("clickpath_"));
        }
    }

    #[test]
    fn describe_all_does_not_panic_without_recorder() {
        describe_all();
    }
}
