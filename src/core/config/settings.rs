use super::parsing::{
    env_optional, env_or_default, parse_base_url, parse_bool, parse_environment,
    parse_positive_u64, parse_route,
};
use super::types::{
    ApiSettings, ConfigError, NavigationSettings, RuntimeSettings, Settings, TelemetrySettings,
};

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let environment = parse_environment(
            env_optional("EXAM_PORTAL_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("EXAM_PORTAL_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let base_url =
            parse_base_url(env_or_default("EXAM_PORTAL_API_URL", "http://localhost:5000/api"))?;
        let auth_token = env_or_default("EXAM_PORTAL_TOKEN", "");
        let request_timeout_seconds = parse_positive_u64(
            "EXAM_PORTAL_REQUEST_TIMEOUT_SECONDS",
            env_or_default("EXAM_PORTAL_REQUEST_TIMEOUT_SECONDS", "30"),
        )?;
        let connect_timeout_seconds = parse_positive_u64(
            "EXAM_PORTAL_CONNECT_TIMEOUT_SECONDS",
            env_or_default("EXAM_PORTAL_CONNECT_TIMEOUT_SECONDS", "10"),
        )?;

        let start_route = parse_route(
            "EXAM_PORTAL_START_ROUTE",
            env_or_default("EXAM_PORTAL_START_ROUTE", crate::navigation::routes::STUDENT_EXAMS),
        )?;

        let log_level = env_or_default("EXAM_PORTAL_LOG_LEVEL", "info");
        let json = env_optional("EXAM_PORTAL_LOG_JSON")
            .map(|value| parse_bool(&value))
            .unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings {
                base_url,
                auth_token,
                request_timeout_seconds,
                connect_timeout_seconds,
            },
            navigation: NavigationSettings { start_route },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub fn navigation(&self) -> &NavigationSettings {
        &self.navigation
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.connect_timeout_seconds > self.api.request_timeout_seconds {
            return Err(ConfigError::InvalidValue {
                field: "EXAM_PORTAL_CONNECT_TIMEOUT_SECONDS",
                value: self.api.connect_timeout_seconds.to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.api.auth_token.is_empty() {
            return Err(ConfigError::MissingSecret("EXAM_PORTAL_TOKEN"));
        }
        if !self.api.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(self.api.base_url.clone()));
        }

        Ok(())
    }
}
