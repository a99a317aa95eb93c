//! 에러 타입 — 도메인별 에러 정의
//!
//! 여기의 에러들은 모두 **치명적(fatal)** 조건입니다: 잘못된 설정,
//! 채널 단절, I/O 실패처럼 스트림 전체를 중단해야 하는 상황만 담습니다.
//! 개별 로그 라인/이벤트의 데이터 품질 문제는 에러가 아니라
//! [`FaultEvent`](crate::event::FaultEvent)로 표현되어 스트림과 함께 흘러갑니다.

/// Clickpath 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum ClickpathError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 채널 수신 실패
    #[error("channel receive failed: {0}")]
    ChannelRecv(String),

    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),

    /// 스트림 처리 중단 (복구 불가능한 데이터 불일치)
    #[error("stream aborted: {0}")]
    Aborted(String),
}
