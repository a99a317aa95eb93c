//! 집계기 설정
//!
//! [`AggregatorConfig`]는 core의
//! [`ScenarioConfig`](clickpath_core::config::ScenarioConfig) 섹션에서
//! 파생되는 집계기 전용 설정입니다.

use clickpath_core::error::{ClickpathError, ConfigError};

/// 비즈니스 시나리오 집계기 설정
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// 시나리오 시작을 알리는 요청 헤더 이름
    pub start_marker_header: String,
    /// 시나리오 종료를 알리는 요청 헤더 이름
    pub stop_marker_header: String,
    /// 반복 식별자를 실어 나르는 요청 헤더 이름
    pub iteration_id_header: String,
    /// 세션 식별 쿠키 이름
    pub session_cookie: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::from_core(&clickpath_core::config::ScenarioConfig::default())
    }
}

impl AggregatorConfig {
    /// core 설정 섹션에서 집계기 설정을 생성합니다.
    pub fn from_core(core: &clickpath_core::config::ScenarioConfig) -> Self {
        Self {
            start_marker_header: core.start_marker_header.clone(),
            stop_marker_header: core.stop_marker_header.clone(),
            iteration_id_header: core.iteration_id_header.clone(),
            session_cookie: core.session_cookie.clone(),
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ClickpathError> {
        for (field, value) in [
            ("scenario.start_marker_header", &self.start_marker_header),
            ("scenario.stop_marker_header", &self.stop_marker_header),
            ("scenario.session_cookie", &self.session_cookie),
        ] {
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "must not be empty".to_owned(),
                }
                .into());
            }
        }
        if self.start_marker_header.eq_ignore_ascii_case(&self.stop_marker_header) {
            return Err(ConfigError::InvalidValue {
                field: "scenario.stop_marker_header".to_owned(),
                reason: "start and stop marker headers must differ".to_owned(),
            }
            .into());
        }
        Ok(())
    }
}

/// 집계기 설정 빌더
#[derive(Default)]
pub struct AggregatorConfigBuilder {
    config: AggregatorConfig,
}

impl AggregatorConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 시작 마커 헤더 이름을 설정합니다.
    pub fn start_marker_header(mut self, name: impl Into<String>) -> Self {
        self.config.start_marker_header = name.into();
        self
    }

    /// 정지 마커 헤더 이름을 설정합니다.
    pub fn stop_marker_header(mut self, name: impl Into<String>) -> Self {
        self.config.stop_marker_header = name.into();
        self
    }

    /// 반복 식별자 헤더 이름을 설정합니다.
    pub fn iteration_id_header(mut self, name: impl Into<String>) -> Self {
        self.config.iteration_id_header = name.into();
        self
    }

    /// 세션 쿠키 이름을 설정합니다.
    pub fn session_cookie(mut self, name: impl Into<String>) -> Self {
        self.config.session_cookie = name.into();
        self
    }

    /// 설정을 검증하고 [`AggregatorConfig`]를 생성합니다.
    pub fn build(self) -> Result<AggregatorConfig, ClickpathError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
