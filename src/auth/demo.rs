//! Demo-mode resolution
//!
//! A single configured account is read-only. With no account configured,
//! demo mode is off for everyone.

use super::CurrentUser;

/// Failure message returned to demo callers
pub const DEMO_READ_ONLY_MESSAGE: &str = "Demo accounts are read-only.";

#[derive(Debug, Clone, Default)]
pub struct DemoGate {
    demo_email: Option<String>,
}

impl DemoGate {
    /// Blank configuration counts as absent
    pub fn new(demo_email: Option<String>) -> Self {
        Self {
            demo_email: demo_email.filter(|e| !e.trim().is_empty()),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.demo_email.is_some()
    }

    pub fn demo_email(&self) -> Option<&str> {
        self.demo_email.as_deref()
    }

    /// Exact, case-sensitive comparison with the session email
    pub fn is_demo(&self, user: &CurrentUser) -> bool {
        match (&self.demo_email, user.email()) {
            (Some(demo), Some(email)) => demo == email,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> CurrentUser {
        CurrentUser::authenticated("id", Some(email.to_string()))
    }

    #[test]
    fn test_disabled_without_config() {
        let gate = DemoGate::new(None);
        assert!(!gate.is_enabled());
        assert!(!gate.is_demo(&user("demo@commonground.org")));

        assert!(!DemoGate::new(Some("  ".into())).is_enabled());
    }

    #[test]
    fn test_case_sensitive_match() {
        let gate = DemoGate::new(Some("demo@commonground.org".into()));
        assert!(gate.is_demo(&user("demo@commonground.org")));
        assert!(!gate.is_demo(&user("Demo@CommonGround.org")));
        assert!(!gate.is_demo(&user("staff@commonground.org")));
        assert!(!gate.is_demo(&CurrentUser::anonymous()));
    }
}
