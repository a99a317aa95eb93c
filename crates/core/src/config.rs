//! 설정 관리 — clickpath.toml 파싱 및 런타임 설정
//!
//! [`ClickpathConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`CLICKPATH_OUTPUT_FORMAT=json` 형식)
//! 3. 설정 파일 (`clickpath.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), clickpath_core::error::ClickpathError> {
//! use clickpath_core::config::ClickpathConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ClickpathConfig::load("clickpath.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ClickpathConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ClickpathError, ConfigError};

/// Clickpath 통합 설정
///
/// `clickpath.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 크레이트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClickpathConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 액세스 로그 파서 설정
    #[serde(default)]
    pub access_log: AccessLogConfig,
    /// 비즈니스 시나리오 집계 설정
    #[serde(default)]
    pub scenario: ScenarioConfig,
    /// 출력 설정
    #[serde(default)]
    pub output: OutputConfig,
}

impl ClickpathConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ClickpathError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ClickpathError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ClickpathError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                ClickpathError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ClickpathError> {
        toml::from_str(toml_str).map_err(|e| {
            ClickpathError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `CLICKPATH_{SECTION}_{FIELD}`
    /// 예: `CLICKPATH_OUTPUT_FORMAT=json`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "CLICKPATH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "CLICKPATH_GENERAL_LOG_FORMAT");

        // Access log
        override_string(&mut self.access_log.format, "CLICKPATH_ACCESS_LOG_FORMAT");
        override_string(
            &mut self.access_log.overflow_policy,
            "CLICKPATH_ACCESS_LOG_OVERFLOW_POLICY",
        );
        override_usize(
            &mut self.access_log.channel_capacity,
            "CLICKPATH_ACCESS_LOG_CHANNEL_CAPACITY",
        );
        override_usize(
            &mut self.access_log.max_line_length,
            "CLICKPATH_ACCESS_LOG_MAX_LINE_LENGTH",
        );

        // Scenario
        override_string(
            &mut self.scenario.start_marker_header,
            "CLICKPATH_SCENARIO_START_MARKER_HEADER",
        );
        override_string(
            &mut self.scenario.stop_marker_header,
            "CLICKPATH_SCENARIO_STOP_MARKER_HEADER",
        );
        override_string(
            &mut self.scenario.iteration_id_header,
            "CLICKPATH_SCENARIO_ITERATION_ID_HEADER",
        );
        override_string(
            &mut self.scenario.session_cookie,
            "CLICKPATH_SCENARIO_SESSION_COOKIE",
        );

        // Output
        override_string(&mut self.output.format, "CLICKPATH_OUTPUT_FORMAT");
        override_bool(
            &mut self.output.suppress_faults,
            "CLICKPATH_OUTPUT_SUPPRESS_FAULTS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ClickpathError> {
        const MAX_CHANNEL_CAPACITY: usize = 1_000_000;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.access_log.format.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "access_log.format".to_owned(),
                reason: "format must not be empty".to_owned(),
            }
            .into());
        }

        let valid_policies = ["ignore", "warn"];
        if !valid_policies.contains(&self.access_log.overflow_policy.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "access_log.overflow_policy".to_owned(),
                reason: format!("must be one of: {}", valid_policies.join(", ")),
            }
            .into());
        }

        if self.access_log.channel_capacity == 0
            || self.access_log.channel_capacity > MAX_CHANNEL_CAPACITY
        {
            return Err(ConfigError::InvalidValue {
                field: "access_log.channel_capacity".to_owned(),
                reason: format!("must be 1-{MAX_CHANNEL_CAPACITY}"),
            }
            .into());
        }

        if self.access_log.max_line_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "access_log.max_line_length".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        for (field, value) in [
            ("scenario.start_marker_header", &self.scenario.start_marker_header),
            ("scenario.stop_marker_header", &self.scenario.stop_marker_header),
            ("scenario.session_cookie", &self.scenario.session_cookie),
        ] {
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "must not be empty".to_owned(),
                }
                .into());
            }
        }

        if self.scenario.start_marker_header == self.scenario.stop_marker_header {
            return Err(ConfigError::InvalidValue {
                field: "scenario.stop_marker_header".to_owned(),
                reason: "start and stop marker headers must differ".to_owned(),
            }
            .into());
        }

        let valid_outputs = ["csv", "json"];
        if !valid_outputs.contains(&self.output.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "output.format".to_owned(),
                reason: format!("must be one of: {}", valid_outputs.join(", ")),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 액세스 로그 파서 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessLogConfig {
    /// 로그 포맷: 프리셋 이름("common", "performance") 또는 포맷 명세 문자열
    pub format: String,
    /// 포맷보다 긴 라인의 처리 정책 (ignore, warn)
    pub overflow_policy: String,
    /// 파이프라인 채널 용량
    pub channel_capacity: usize,
    /// 최대 라인 길이 (바이트)
    pub max_line_length: usize,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            format: "common".to_owned(),
            overflow_policy: "ignore".to_owned(),
            channel_capacity: 1024,
            max_line_length: 64 * 1024, // 64KB
        }
    }
}

/// 비즈니스 시나리오 집계 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// 시나리오 시작을 알리는 요청 헤더 이름
    pub start_marker_header: String,
    /// 시나리오 종료를 알리는 요청 헤더 이름
    pub stop_marker_header: String,
    /// 반복 식별자를 실어 나르는 요청 헤더 이름
    pub iteration_id_header: String,
    /// 세션 식별 쿠키 이름
    pub session_cookie: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            start_marker_header: "Business-Scenario-Start-Marker".to_owned(),
            stop_marker_header: "Business-Scenario-Stop-Marker".to_owned(),
            iteration_id_header: "Business-Scenario-Iteration-ID".to_owned(),
            session_cookie: "JSESSIONID".to_owned(),
        }
    }
}

/// 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 출력 형식 (csv, json)
    pub format: String,
    /// 폴트 이벤트를 출력 행에서 제외할지 여부
    pub suppress_faults: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "csv".to_owned(),
            suppress_faults: false,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = ClickpathConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.access_log.format, "common");
        assert_eq!(config.scenario.session_cookie, "JSESSIONID");
        assert_eq!(config.output.format, "csv");
        assert!(!config.output.suppress_faults);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = ClickpathConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = ClickpathConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.access_log.format, "common");
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[access_log]
format = "performance"
overflow_policy = "warn"
"#;
        let config = ClickpathConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.access_log.format, "performance");
        assert_eq!(config.access_log.overflow_policy, "warn");
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[general]
log_level = "warn"
log_format = "json"

[access_log]
format = "%h %l %u [%t] \"%r\" %>s %b"
overflow_policy = "warn"
channel_capacity = 2048
max_line_length = 32768

[scenario]
start_marker_header = "X-Scenario-Start"
stop_marker_header = "X-Scenario-Stop"
iteration_id_header = "X-Iteration"
session_cookie = "sessionid"

[output]
format = "json"
suppress_faults = true
"#;
        let config = ClickpathConfig::parse(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.access_log.channel_capacity, 2048);
        assert_eq!(config.scenario.start_marker_header, "X-Scenario-Start");
        assert_eq!(config.scenario.session_cookie, "sessionid");
        assert!(config.output.suppress_faults);
    }

    #[test]
    fn parse_invalid_toml_fails() {
        let result = ClickpathConfig::parse("this is not toml [");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let mut config = ClickpathConfig::default();
        config.general.log_level = "verbose".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_overflow_policy() {
        let mut config = ClickpathConfig::default();
        config.access_log.overflow_policy = "truncate".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_channel_capacity() {
        let mut config = ClickpathConfig::default();
        config.access_log.channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_session_cookie() {
        let mut config = ClickpathConfig::default();
        config.scenario.session_cookie = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_identical_markers() {
        let mut config = ClickpathConfig::default();
        config.scenario.stop_marker_header = config.scenario.start_marker_header.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_output_format() {
        let mut config = ClickpathConfig::default();
        config.output.format = "xml".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn env_override_applies() {
        unsafe {
            std::env::set_var("CLICKPATH_OUTPUT_FORMAT", "json");
            std::env::set_var("CLICKPATH_SCENARIO_SESSION_COOKIE", "PHPSESSID");
        }
        let mut config = ClickpathConfig::default();
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("CLICKPATH_OUTPUT_FORMAT");
            std::env::remove_var("CLICKPATH_SCENARIO_SESSION_COOKIE");
        }
        assert_eq!(config.output.format, "json");
        assert_eq!(config.scenario.session_cookie, "PHPSESSID");
    }

    #[test]
    #[serial]
    fn env_override_invalid_bool_is_ignored() {
        unsafe {
            std::env::set_var("CLICKPATH_OUTPUT_SUPPRESS_FAULTS", "yes-please");
        }
        let mut config = ClickpathConfig::default();
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("CLICKPATH_OUTPUT_SUPPRESS_FAULTS");
        }
        assert!(!config.output.suppress_faults);
    }

    #[tokio::test]
    async fn from_file_missing_path_reports_not_found() {
        let result = ClickpathConfig::from_file("/nonexistent/clickpath.toml").await;
        assert!(matches!(
            result,
            Err(ClickpathError::Config(ConfigError::FileNotFound { .. }))
        ));
    }
}
