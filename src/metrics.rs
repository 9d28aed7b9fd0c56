/// Metrics and telemetry for the account service
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - HTTP request counts and latencies
/// - Signup and login outcomes
/// - Lockout activity
/// - OTP issuance and verification

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    // ========== HTTP Metrics ==========

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request latencies in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // ========== Account Metrics ==========

    /// Completed signups
    pub static ref SIGNUPS_TOTAL: IntCounter = register_int_counter!(
        "signups_total",
        "Total number of accounts registered"
    )
    .unwrap();

    /// Successful logins
    pub static ref LOGIN_SUCCESSES_TOTAL: IntCounter = register_int_counter!(
        "login_successes_total",
        "Total number of successful logins"
    )
    .unwrap();

    /// Denied login attempts by reason
    pub static ref LOGIN_DENIALS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "login_denials_total",
        "Total number of denied login attempts",
        &["reason"]
    )
    .unwrap();

    /// Accounts placed under a temporary block
    pub static ref LOCKOUTS_TOTAL: IntCounter = register_int_counter!(
        "lockouts_total",
        "Total number of temporary account blocks"
    )
    .unwrap();

    /// Completed password resets
    pub static ref PASSWORD_RESETS_TOTAL: IntCounter = register_int_counter!(
        "password_resets_total",
        "Total number of completed password resets"
    )
    .unwrap();

    // ========== OTP Metrics ==========

    /// Codes issued by purpose
    pub static ref OTP_ISSUED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "otp_issued_total",
        "Total number of one-time codes issued",
        &["purpose"]
    )
    .unwrap();

    /// Codes consumed by purpose
    pub static ref OTP_VERIFIED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "otp_verified_total",
        "Total number of one-time codes verified",
        &["purpose"]
    )
    .unwrap();
}

/// Render all metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration);
}

/// Record a completed signup
pub fn record_signup() {
    SIGNUPS_TOTAL.inc();
}

/// Record a successful login
pub fn record_login_success() {
    LOGIN_SUCCESSES_TOTAL.inc();
}

/// Record a denied login attempt
pub fn record_login_denied(reason: &str) {
    LOGIN_DENIALS_TOTAL.with_label_values(&[reason]).inc();
}

/// Record an account entering a temporary block
pub fn record_lockout() {
    LOCKOUTS_TOTAL.inc();
}

/// Record a completed password reset
pub fn record_password_reset() {
    PASSWORD_RESETS_TOTAL.inc();
}

/// Record an issued one-time code
pub fn record_otp_issued(purpose: &str) {
    OTP_ISSUED_TOTAL.with_label_values(&[purpose]).inc();
}

/// Record a consumed one-time code
pub fn record_otp_verified(purpose: &str) {
    OTP_VERIFIED_TOTAL.with_label_values(&[purpose]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_http_request() {
        record_http_request("POST", "/auth/login", 200, 0.05);
        let metrics = render_metrics();
        assert!(metrics.contains("http_requests_total"));
        assert!(metrics.contains("http_request_duration_seconds"));
    }

    #[test]
    fn test_record_login_outcomes() {
        record_login_success();
        record_login_denied("wrong_password");
        record_lockout();
        let metrics = render_metrics();
        assert!(metrics.contains("login_successes_total"));
        assert!(metrics.contains("login_denials_total"));
        assert!(metrics.contains("lockouts_total"));
    }

    #[test]
    fn test_record_otp_counters() {
        record_otp_issued("verification");
        record_otp_verified("password-reset");
        let metrics = render_metrics();
        assert!(metrics.contains("otp_issued_total"));
        assert!(metrics.contains("otp_verified_total"));
    }

    #[test]
    fn test_record_account_counters() {
        record_signup();
        record_password_reset();
        let metrics = render_metrics();
        assert!(metrics.contains("signups_total"));
        assert!(metrics.contains("password_resets_total"));
    }
}
