/// Authentication configuration. Passed explicitly into the verifier and the
/// negotiator at construction instead of being read from process-wide state.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct AuthConfig {
    /// Enables the password-strength policy checked at credential creation.
    pub validate_password: bool,
    pub min_password_length: usize,
    /// Enables the ticket-based kerberos scheme.
    pub enable_kerberos: bool,
    /// Service principal offered in the kerberos challenge.
    pub kerberos_service_principal: Option<String>,
    /// Legacy behavior: a rejected attempt still updates the session
    /// identity. The failure is reported to the client either way.
    pub legacy_identity_update: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            validate_password: false,
            min_password_length: 8,
            enable_kerberos: false,
            kerberos_service_principal: None,
            legacy_identity_update: false,
        }
    }
}

impl AuthConfig {
    pub fn validate_password(mut self, min_password_length: usize) -> Self {
        self.validate_password = true;
        self.min_password_length = min_password_length;
        self
    }

    pub fn enable_kerberos(mut self, service_principal: impl Into<String>) -> Self {
        self.enable_kerberos = true;
        self.kerberos_service_principal = Some(service_principal.into());
        self
    }

    pub fn legacy_identity_update(mut self) -> Self {
        self.legacy_identity_update = true;
        self
    }
}
