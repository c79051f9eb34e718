//! Connectivity probe.

/// Message used when the caller supplies none.
pub const DEFAULT_PROBE_MESSAGE: &str = "check";

/// Acknowledge `msg`, or the default message when `None`.
pub fn check_connection(msg: Option<&str>) -> String {
    format!("connected, msg>> {}", msg.unwrap_or(DEFAULT_PROBE_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message() {
        assert_eq!(check_connection(None), "connected, msg>> check");
    }

    #[test]
    fn echoes_message() {
        assert_eq!(check_connection(Some("ping")), "connected, msg>> ping");
    }
}
