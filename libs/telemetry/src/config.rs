use std::env;

/// OTLP transport used when span export is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OtlpProtocol {
    #[default]
    Grpc,
    HttpProtobuf,
}

impl OtlpProtocol {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "http" | "http/protobuf" => OtlpProtocol::HttpProtobuf,
            _ => OtlpProtocol::Grpc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    pub json_logs: bool,
    pub otlp_endpoint: Option<String>,
    pub otlp_protocol: OtlpProtocol,
    /// `ENABLE_OTEL` as set; export also needs an endpoint.
    pub otel_requested: bool,
}

impl TelemetryConfig {
    pub fn from_env(default_service_name: &str, default_service_version: &str) -> Self {
        let service_name =
            env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| default_service_name.to_string());
        let service_version = env::var("OTEL_SERVICE_VERSION")
            .unwrap_or_else(|_| default_service_version.to_string());
        let environment = env::var("OTEL_RESOURCE_ATTRIBUTES")
            .ok()
            .and_then(|attrs| deployment_environment(&attrs))
            .or_else(|| env::var("DEPLOYMENT_ENV").ok())
            .unwrap_or_else(|| "dev".into());
        let json_logs = env::var("LOG_FORMAT")
            .map(|v| !matches!(v.to_lowercase().as_str(), "text" | "pretty" | "plain"))
            .unwrap_or(true);
        let otlp_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let otlp_protocol = env::var("OTEL_EXPORTER_OTLP_PROTOCOL")
            .map(|v| OtlpProtocol::parse(&v))
            .unwrap_or_default();
        let otel_requested = env::var("ENABLE_OTEL")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Self {
            service_name,
            service_version,
            environment,
            json_logs,
            otlp_endpoint,
            otlp_protocol,
            otel_requested,
        }
    }

    /// Endpoint to export spans to, if export is switched on.
    pub fn span_export_endpoint(&self) -> Option<&str> {
        if self.otel_requested {
            self.otlp_endpoint.as_deref()
        } else {
            None
        }
    }
}

fn deployment_environment(attrs: &str) -> Option<String> {
    attrs.split(',').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == "deployment.environment").then(|| value.trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    const VARS: [&str; 9] = [
        "OTEL_SERVICE_NAME",
        "OTEL_SERVICE_VERSION",
        "OTEL_RESOURCE_ATTRIBUTES",
        "DEPLOYMENT_ENV",
        "LOG_FORMAT",
        "OTEL_EXPORTER_OTLP_ENDPOINT",
        "OTEL_EXPORTER_OTLP_PROTOCOL",
        "ENABLE_OTEL",
        "RUST_LOG",
    ];

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_env() {
        for var in VARS {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    #[test]
    fn defaults_to_json_logs_without_export() {
        let _guard = env_lock().lock().unwrap();
        clear_env();
        let cfg = TelemetryConfig::from_env("smshook-ingress", "0.1.0");
        assert_eq!(cfg.service_name, "smshook-ingress");
        assert_eq!(cfg.service_version, "0.1.0");
        assert_eq!(cfg.environment, "dev");
        assert!(cfg.json_logs);
        assert_eq!(cfg.otlp_protocol, OtlpProtocol::Grpc);
        assert_eq!(cfg.span_export_endpoint(), None);
    }

    #[test]
    fn text_log_format_disables_json() {
        let _guard = env_lock().lock().unwrap();
        clear_env();
        unsafe {
            env::set_var("LOG_FORMAT", "Pretty");
            env::set_var("OTEL_SERVICE_NAME", "custom");
        }
        let cfg = TelemetryConfig::from_env("smshook-ingress", "0.1.0");
        clear_env();
        assert!(!cfg.json_logs);
        assert_eq!(cfg.service_name, "custom");
    }

    #[test]
    fn export_needs_both_flag_and_endpoint() {
        let _guard = env_lock().lock().unwrap();
        clear_env();
        unsafe {
            env::set_var("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4318");
        }
        let cfg = TelemetryConfig::from_env("svc", "1");
        assert_eq!(cfg.span_export_endpoint(), None);

        unsafe {
            env::set_var("ENABLE_OTEL", "true");
            env::set_var("OTEL_EXPORTER_OTLP_PROTOCOL", "http/protobuf");
        }
        let cfg = TelemetryConfig::from_env("svc", "1");
        assert_eq!(cfg.span_export_endpoint(), Some("http://collector:4318"));
        assert_eq!(cfg.otlp_protocol, OtlpProtocol::HttpProtobuf);

        unsafe {
            env::set_var("OTEL_EXPORTER_OTLP_ENDPOINT", "  ");
        }
        let cfg = TelemetryConfig::from_env("svc", "1");
        clear_env();
        assert_eq!(cfg.span_export_endpoint(), None);
    }

    #[test]
    fn environment_comes_from_resource_attributes_first() {
        let _guard = env_lock().lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(
                "OTEL_RESOURCE_ATTRIBUTES",
                "team=sms, deployment.environment = staging",
            );
            env::set_var("DEPLOYMENT_ENV", "prod");
        }
        let cfg = TelemetryConfig::from_env("svc", "1");
        assert_eq!(cfg.environment, "staging");

        unsafe {
            env::remove_var("OTEL_RESOURCE_ATTRIBUTES");
        }
        let cfg = TelemetryConfig::from_env("svc", "1");
        clear_env();
        assert_eq!(cfg.environment, "prod");
    }
}
