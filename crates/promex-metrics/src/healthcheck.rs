use std::sync::RwLock;

/// Health status slot. Carried by the registry alongside metrics but has no
/// exposition form.
#[derive(Debug, Default)]
pub struct Healthcheck {
    error: RwLock<Option<String>>,
}

impl Healthcheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn healthy(&self) {
        if let Ok(mut error) = self.error.write() {
            *error = None;
        }
    }

    pub fn unhealthy(&self, reason: impl Into<String>) {
        if let Ok(mut error) = self.error.write() {
            *error = Some(reason.into());
        }
    }

    pub fn error(&self) -> Option<String> {
        self.error.read().ok().and_then(|error| error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::Healthcheck;

    #[test]
    fn unhealthy_reason_is_cleared_by_healthy() {
        let healthcheck = Healthcheck::new();
        assert_eq!(healthcheck.error(), None);

        healthcheck.unhealthy("peer count below threshold");
        assert_eq!(
            healthcheck.error().as_deref(),
            Some("peer count below threshold")
        );

        healthcheck.healthy();
        assert_eq!(healthcheck.error(), None);
    }
}
