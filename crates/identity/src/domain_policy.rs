//! Allow-list of mailbox providers accepted for verification mail.

/// Domains accepted when no list is configured.
pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "proton.me",
    "protonmail.com",
    "pm.me",
    "protonmail.ch",
];

/// Static allow-list check on the domain part of an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPolicy {
    allowed: Vec<String>,
}

impl Default for DomainPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_DOMAINS.iter().copied())
    }
}

impl DomainPolicy {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: domains
                .into_iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// Domain part of `email`: everything after the last `@`, or empty.
    pub fn domain_of(email: &str) -> &str {
        email.rsplit_once('@').map(|(_, d)| d).unwrap_or("")
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        let domain = Self::domain_of(email).to_lowercase();
        self.allowed.iter().any(|d| *d == domain)
    }

    pub fn domains(&self) -> &[String] {
        &self.allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allow_list() {
        let policy = DomainPolicy::default();
        assert!(policy.is_allowed("user@gmail.com"));
        assert!(policy.is_allowed("user@pm.me"));
        assert!(policy.is_allowed("User@ProtonMail.ch"));
        assert!(!policy.is_allowed("user@example.com"));
    }

    #[test]
    fn test_domain_must_match_exactly() {
        let policy = DomainPolicy::default();
        assert!(!policy.is_allowed("user@mail.gmail.com"));
        assert!(!policy.is_allowed("gmail.com"));
        assert!(!policy.is_allowed("user@gmail.com.evil.io"));
        assert!(policy.is_allowed("odd@name@gmail.com"));
    }

    #[test]
    fn test_custom_list() {
        let policy = DomainPolicy::new([" Example.COM ", ""]);
        assert_eq!(policy.domains(), ["example.com".to_string()]);
        assert!(policy.is_allowed("user@example.com"));
        assert!(!policy.is_allowed("user@gmail.com"));
    }
}
