//! Messaging API credentials, looked up by client email.

use crate::{error::ConnectError, setups::CredentialStore};

/// The raw columns of the first credential row matching an email.
///
/// Columns that are missing, `null`, or not strings are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialRow {
    /// Messaging API token column
    pub token: Option<String>,
    /// Instance phone number column
    pub phone: Option<String>,
}

impl CredentialRow {
    /// Build a row from both column values.
    pub fn new(token: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            phone: Some(phone.into()),
        }
    }
}

/// A validated token/phone pair. Both fields are trimmed and non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    /// Token sent in the `token` header of the connect call
    pub token: String,
    /// Phone number sent in the connect call body
    pub phone: String,
}

impl Credential {
    /// Look up the credential for `email`.
    ///
    /// The email is trimmed and used as an exact-match key.
    pub async fn lookup<C: CredentialStore>(
        store: &C,
        email: &str,
    ) -> Result<Self, ConnectError> {
        let email = email.trim();

        tracing::debug!(email, "Looking up messaging credentials");

        let row = store
            .find_row(email)
            .await?
            .ok_or(ConnectError::EmailNotFound)?;

        Self::try_from(row)
    }
}

impl TryFrom<CredentialRow> for Credential {
    type Error = ConnectError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        let token = non_empty(row.token).ok_or(ConnectError::MissingToken)?;
        let phone = non_empty(row.phone).ok_or(ConnectError::MissingPhone)?;

        Ok(Self { token, phone })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setups::test::InMemoryCredentialStore;
    use assert_matches::assert_matches;
    use testresult::TestResult;

    #[test_log::test(tokio::test)]
    async fn test_lookup_trims_fields() -> TestResult {
        let store = InMemoryCredentialStore::default();
        store.insert("ana@example.com", CredentialRow::new("  tok-1 ", " 5511999 "));

        let credential = Credential::lookup(&store, "ana@example.com").await?;

        assert_eq!(
            credential,
            Credential {
                token: "tok-1".to_string(),
                phone: "5511999".to_string(),
            }
        );

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_lookup_trims_email_key() -> TestResult {
        let store = InMemoryCredentialStore::default();
        store.insert("ana@example.com", CredentialRow::new("tok", "5511"));

        let credential = Credential::lookup(&store, "  ana@example.com\n").await?;

        assert_eq!(credential.token, "tok");

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_lookup_unknown_email() {
        let store = InMemoryCredentialStore::default();

        let result = Credential::lookup(&store, "nobody@example.com").await;

        assert_matches!(result, Err(ConnectError::EmailNotFound));
    }

    #[test_log::test(tokio::test)]
    async fn test_lookup_is_exact_match() {
        let store = InMemoryCredentialStore::default();
        store.insert("ana@example.com", CredentialRow::new("tok", "5511"));

        let result = Credential::lookup(&store, "ANA@example.com").await;

        assert_matches!(result, Err(ConnectError::EmailNotFound));
    }

    #[test_log::test(tokio::test)]
    async fn test_lookup_empty_token() {
        let store = InMemoryCredentialStore::default();
        store.insert("ana@example.com", CredentialRow::new("   ", "5511"));

        let result = Credential::lookup(&store, "ana@example.com").await;

        assert_matches!(result, Err(ConnectError::MissingToken));
    }

    #[test]
    fn test_missing_phone() {
        let row = CredentialRow {
            token: Some("tok".to_string()),
            phone: None,
        };

        assert_matches!(Credential::try_from(row), Err(ConnectError::MissingPhone));
    }

    #[test]
    fn test_token_checked_before_phone() {
        assert_matches!(
            Credential::try_from(CredentialRow::default()),
            Err(ConnectError::MissingToken)
        );
    }
}
