//! Shared-PIN gate for the admin panel.

/// Compares a supplied PIN against the configured shared secret.
///
/// There is a single PIN for the household; no lockout or per-user
/// credentials.
#[derive(Debug, Clone)]
pub struct AdminGate {
    pin: String,
}

impl AdminGate {
    pub fn new(pin: impl Into<String>) -> Self {
        Self { pin: pin.into() }
    }

    pub fn check(&self, attempt: &str) -> bool {
        constant_time_eq(self.pin.as_bytes(), attempt.trim().as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_pin() {
        let gate = AdminGate::new("3136");
        assert!(gate.check("3136"));
        assert!(gate.check(" 3136\n"));
    }

    #[test]
    fn rejects_anything_else() {
        let gate = AdminGate::new("3136");
        assert!(!gate.check("3137"));
        assert!(!gate.check("313"));
        assert!(!gate.check(""));
    }
}
