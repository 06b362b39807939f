use std::fmt;

/// A request-scoped logger.
///
/// `RequestLog` is borrowed from a [`MarketRequest`](crate::web::MarketRequest)
/// and stamps every event with the request id and path, so gate, guard and
/// mock diagnostics for one request can be correlated.
///
/// Secret material never reaches it: [`SecretKey`](crate::SecretKey) redacts
/// itself in both `Debug` and `Display`.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    request_id: &'a str,
    path: &'a str,
}

impl<'a> RequestLog<'a> {
    /// Creates a logger for one request.
    pub(crate) fn new(request_id: &'a str, path: &'a str) -> Self {
        Self { request_id, path }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Logs an info-level message.
    ///
    /// ```no_run
    /// # use marketplace_canvas::web::MarketRequest;
    /// let request = MarketRequest::get("req-1", "/market/1/canvas/demo/");
    /// request.log().info(format_args!("portal {}", 1));
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, path = %self.path, "{}", args);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, path = %self.path, "{}", args);
    }

    /// Logs an error-level message.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(request_id = %self.request_id, path = %self.path, "{}", args);
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, path = %self.path, "{}", args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_log_keeps_request_id() {
        let log = RequestLog::new("req-9", "/foo");
        assert_eq!(log.request_id(), "req-9");
        log.debug(format_args!("no subscriber installed, must not panic"));
    }
}
