use tracing::{debug, error, info, warn};

/// Logs property reads served to bus callers
pub fn log_property_read(property: &str, value: &str) {
    debug!("PROPERTY_READ: {} -> {}", property, value);
}

/// Logs property writes requested by bus callers
pub fn log_property_write(property: &str, value: &str) {
    info!("PROPERTY_WRITE: {} <- {}", property, value);
}

/// Logs settings store operations with consistent format
pub fn log_settings_operation(operation: &str, schema: &str, key: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("SETTINGS_OP: {} {}/{} - {}", operation, schema, key, d),
        None => debug!("SETTINGS_OP: {} {}/{}", operation, schema, key),
    }
}

/// Logs settings store errors with consistent format
pub fn log_settings_error(operation: &str, schema: &str, key: &str, error: &str) {
    error!("SETTINGS_ERROR: {} {}/{} failed: {}", operation, schema, key, error);
}

/// Logs a settings read that fell back to a default
pub fn log_settings_fallback(schema: &str, key: &str, error: &str) {
    warn!("SETTINGS_FALLBACK: {}/{} unreadable: {} - using default", schema, key, error);
}

/// Logs a collaborator that did not answer and the value used instead
pub fn log_degraded(collaborator: &str, error: &str, fallback: &str) {
    warn!(
        "DEGRADED: {} unavailable: {} - using '{}'",
        collaborator, error, fallback
    );
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
