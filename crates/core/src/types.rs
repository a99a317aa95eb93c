//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 파싱된 HTTP 요청 레코드와 비즈니스 시나리오 요약 등,
//! 모든 크레이트가 공유하는 데이터 구조를 정의합니다.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

/// 로그 필드 하나의 타입 강제(coercion) 결과
///
/// 포맷 토큰이 원시 문자열을 파싱하면 이 타입의 값이 됩니다.
/// 빈 필드(`-`)는 값 자체가 생성되지 않으므로 여기에 변형이 없습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// 문자열 필드
    Text(String),
    /// 32비트 정수 필드 (상태 코드 등)
    Integer(i64),
    /// 64비트 정수 필드 (응답 크기, 처리 시간 등)
    Long(i64),
    /// 타임스탬프 필드
    Date(SystemTime),
    /// 단일 문자 필드
    Character(char),
}

impl FieldValue {
    /// 문자열 값이면 참조를 반환합니다.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 정수 계열(Integer/Long) 값이면 i64로 반환합니다.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) | Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// 타임스탬프 값이면 반환합니다.
    pub fn as_date(&self) -> Option<SystemTime> {
        match self {
            Self::Date(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Integer(v) | Self::Long(v) => write!(f, "{v}"),
            Self::Date(t) => match t.duration_since(SystemTime::UNIX_EPOCH) {
                Ok(d) => write!(f, "{}", d.as_secs()),
                Err(_) => write!(f, "<pre-epoch>"),
            },
            Self::Character(c) => write!(f, "{c}"),
        }
    }
}

/// 파싱된 HTTP 요청 레코드
///
/// 액세스 로그 한 줄을 파싱한 최종 결과입니다. 모든 필드는 선택적입니다 —
/// 로그 포맷에 해당 토큰이 없거나 값이 `-`였다면 `None`으로 남습니다.
/// 헤더/쿠키는 이름 → 값 서브 맵으로 투영됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// 요청 타임스탬프
    pub timestamp: Option<SystemTime>,
    /// 원격 호스트 (IP 또는 호스트명)
    pub remote_host: Option<String>,
    /// 원격 로그명 (identd)
    pub remote_logname: Option<String>,
    /// 인증된 원격 사용자
    pub remote_user: Option<String>,
    /// HTTP 메서드 (GET, POST 등)
    pub method: Option<String>,
    /// 요청 경로 (쿼리 스트링 제외)
    pub path: Option<String>,
    /// HTTP 버전 (예: "HTTP/1.1")
    pub http_version: Option<String>,
    /// 쿼리 스트링 키-값 쌍 (퍼센트 인코딩 유지)
    pub query: Vec<(String, String)>,
    /// 최종 응답 상태 코드
    pub status_code: Option<u16>,
    /// 최초 응답 상태 코드 (내부 리다이렉트 이전)
    pub original_status_code: Option<u16>,
    /// 응답 본문 크기 (바이트)
    pub response_bytes: Option<u64>,
    /// 요청을 처리한 스레드 이름
    pub thread_name: Option<String>,
    /// 요청 처리 시간
    pub duration: Option<Duration>,
    /// 요청 헤더 (이름 → 값)
    pub request_headers: BTreeMap<String, String>,
    /// 응답 헤더 (이름 → 값)
    pub response_headers: BTreeMap<String, String>,
    /// 요청 쿠키 (이름 → 값)
    pub cookies: BTreeMap<String, String>,
}

impl HttpRequest {
    /// 쿠키 값을 이름으로 조회합니다.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// 요청 헤더를 이름으로 조회합니다 (ASCII 대소문자 무시).
    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// 응답 헤더를 이름으로 조회합니다 (ASCII 대소문자 무시).
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// 성공 요청 여부 (최종 상태 코드 < 400)
    pub fn is_success(&self) -> bool {
        matches!(self.status_code, Some(code) if code < 400)
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} -> {}",
            self.method.as_deref().unwrap_or("-"),
            self.path.as_deref().unwrap_or("-"),
            self.http_version.as_deref().unwrap_or("-"),
            self.status_code
                .map_or_else(|| "-".to_owned(), |c| c.to_string()),
        )?;
        if let Some(d) = self.duration {
            write!(f, " ({}us)", d.as_micros())?;
        }
        Ok(())
    }
}

/// 비즈니스 시나리오 상태
///
/// `NEW` 상태는 별도 표현이 없습니다 — 시나리오 객체가 아직
/// 생성되지 않은 상태가 곧 `NEW`입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioState {
    /// 시작 마커를 받아 열려 있음
    Open,
    /// 정지 마커로 정상 종료됨
    Complete,
    /// 열려 있는 동안 새 시작 마커가 도착해 강제 종료됨
    ClosedByStartMarker,
    /// 스트림 종료 시점에 정지 마커 없이 강제 종료됨
    Incomplete,
    /// 더 이상 신뢰할 수 없어 폐기됨
    Fault,
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Complete => write!(f, "COMPLETE"),
            Self::ClosedByStartMarker => write!(f, "CLOSED_BY_START_MARKER"),
            Self::Incomplete => write!(f, "INCOMPLETE"),
            Self::Fault => write!(f, "FAULT"),
        }
    }
}

/// 닫힌 비즈니스 시나리오의 요약 레코드
///
/// 시나리오가 닫힐 때 [`ScenarioEvent`](crate::event::ScenarioEvent)에 실려
/// 다운스트림(CSV 포매터)으로 전달되는 평탄화된 형태입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    /// 세션 식별 쿠키 값
    pub jsessionid: String,
    /// 시나리오 타입 (시작 마커 헤더의 값)
    pub scenario_type: Option<String>,
    /// 종료 시점의 상태
    pub state: ScenarioState,
    /// 첫 요청의 타임스탬프
    pub begin: Option<SystemTime>,
    /// 마지막 요청의 타임스탬프 + 처리 시간
    pub end: Option<SystemTime>,
    /// 구성 요청들의 처리 시간 합계
    pub duration: Duration,
    /// 구성 요청 수
    pub request_count: u64,
    /// 성공(상태 코드 < 400) 요청 수
    pub successful_request_count: u64,
    /// 반복 식별자 (반복 마커 헤더의 값, 있을 경우)
    pub iteration_id: Option<String>,
}

impl fmt::Display for ScenarioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] type={} session={} requests={} duration={}ms",
            self.state,
            self.scenario_type.as_deref().unwrap_or("-"),
            self.jsessionid,
            self.request_count,
            self.duration.as_millis(),
        )
    }
}
