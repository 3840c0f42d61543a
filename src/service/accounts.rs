//! Registration, login and token refresh.

use crate::auth::{hash_password, verify_password, TokenKind, TokenService};
use crate::error::{AppError, FieldErrors};
use crate::models::{AccessToken, LoginPayload, NewUser, RefreshPayload, RegisterPayload, RegisteredUser, TokenPair};
use crate::service::validation::{is_valid_email, is_valid_username, INVALID_EMAIL, NOT_BLANK, REQUIRED};
use crate::store::{Repositories, EMAIL_TAKEN, USERNAME_TAKEN};

pub const USERNAME_MAX: usize = 150;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MISMATCH: &str = "Password fields didn't match.";
pub const INVALID_USERNAME: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

/// Present and non-blank. Passwords are kept verbatim; other fields are trimmed.
fn required_text(errors: &mut FieldErrors, field: &str, value: Option<&String>, trim: bool) -> Option<String> {
    let Some(raw) = value else {
        errors.add(field, REQUIRED);
        return None;
    };
    let s = if trim { raw.trim() } else { raw.as_str() };
    if s.trim().is_empty() {
        errors.add(field, NOT_BLANK);
        return None;
    }
    Some(s.to_string())
}

/// Minimum length and not entirely numeric.
pub fn password_problems(password: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if password.chars().count() < PASSWORD_MIN {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            PASSWORD_MIN
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }
    problems
}

pub struct AccountService;

impl AccountService {
    pub async fn register(repos: &Repositories, payload: &RegisterPayload) -> Result<RegisteredUser, AppError> {
        let mut errors = FieldErrors::new();
        let username = required_text(&mut errors, "username", payload.username.as_ref(), true).and_then(|u| {
            if u.chars().count() > USERNAME_MAX {
                errors.add(
                    "username",
                    format!("Ensure this field has no more than {} characters.", USERNAME_MAX),
                );
                None
            } else if !is_valid_username(&u) {
                errors.add("username", INVALID_USERNAME);
                None
            } else {
                Some(u)
            }
        });
        let email = required_text(&mut errors, "email", payload.email.as_ref(), true).and_then(|e| {
            if is_valid_email(&e) {
                Some(e)
            } else {
                errors.add("email", INVALID_EMAIL);
                None
            }
        });
        let password = required_text(&mut errors, "password", payload.password.as_ref(), false);
        let password2 = required_text(&mut errors, "password2", payload.password2.as_ref(), false);

        if let Some(u) = &username {
            if repos.users.find_by_username(u).await?.is_some() {
                errors.add("username", USERNAME_TAKEN);
            }
        }
        if let Some(e) = &email {
            if repos.users.email_in_use(e).await? {
                errors.add("email", EMAIL_TAKEN);
            }
        }
        if let Some(p) = &password {
            for problem in password_problems(p) {
                errors.add("password", problem);
            }
        }
        errors.into_result()?;

        // object-level check runs once every field is valid
        let (Some(username), Some(email), Some(password), Some(password2)) = (username, email, password, password2)
        else {
            return Err(AppError::Internal("validated registration is incomplete".into()));
        };
        if password != password2 {
            return Err(AppError::Validation(FieldErrors::single("password", PASSWORD_MISMATCH)));
        }

        let user = repos
            .users
            .create(NewUser {
                username,
                email,
                password_hash: hash_password(&password)?,
                is_staff: false,
                is_superuser: false,
            })
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(RegisteredUser {
            username: user.username,
            email: user.email,
        })
    }

    pub async fn login(repos: &Repositories, tokens: &TokenService, payload: &LoginPayload) -> Result<TokenPair, AppError> {
        let mut errors = FieldErrors::new();
        let username = required_text(&mut errors, "username", payload.username.as_ref(), true);
        let password = required_text(&mut errors, "password", payload.password.as_ref(), false);
        errors.into_result()?;
        let (Some(username), Some(password)) = (username, password) else {
            return Err(AppError::InvalidCredentials);
        };

        let Some(user) = repos.users.find_by_username(&username).await? else {
            return Err(AppError::InvalidCredentials);
        };
        if !verify_password(&user.password_hash, &password)? {
            tracing::warn!(username = %username, "login failed");
            return Err(AppError::InvalidCredentials);
        }
        tokens.issue_pair(user.id)
    }

    /// Only refresh tokens are accepted, and only while their user still exists.
    pub async fn refresh(repos: &Repositories, tokens: &TokenService, payload: &RefreshPayload) -> Result<AccessToken, AppError> {
        let mut errors = FieldErrors::new();
        let refresh = required_text(&mut errors, "refresh", payload.refresh.as_ref(), true);
        errors.into_result()?;
        let Some(refresh) = refresh else {
            return Err(AppError::InvalidToken);
        };
        let claims = tokens.verify(&refresh, TokenKind::Refresh)?;
        if repos.users.get(claims.user_id).await?.is_none() {
            return Err(AppError::InvalidToken);
        }
        Ok(AccessToken {
            access: tokens.issue(claims.user_id, TokenKind::Access)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;

    fn register_payload(username: &str, password: &str, password2: &str) -> RegisterPayload {
        RegisterPayload {
            username: Some(username.into()),
            email: Some(format!("{}@example.com", username)),
            password: Some(password.into()),
            password2: Some(password2.into()),
        }
    }

    #[test]
    fn weak_passwords() {
        assert_eq!(password_problems("short").len(), 1);
        assert_eq!(password_problems("1234").len(), 2);
        assert_eq!(password_problems("12345678").len(), 1);
        assert!(password_problems("correct horse").is_empty());
    }

    #[tokio::test]
    async fn register_creates_user() {
        let repos = Repositories::in_memory();
        let user = AccountService::register(&repos, &register_payload("alice", "Secur3Pass!", "Secur3Pass!"))
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        let stored = repos.users.find_by_username("alice").await.unwrap().unwrap();
        assert!(!stored.is_staff);
        assert_ne!(stored.password_hash, "Secur3Pass!");
    }

    #[tokio::test]
    async fn mismatched_passwords_create_nothing() {
        let repos = Repositories::in_memory();
        let err = AccountService::register(&repos, &register_payload("bob", "Secur3Pass!", "Different1!"))
            .await
            .unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("password"), Some(&[PASSWORD_MISMATCH.to_string()][..]));
        assert!(repos.users.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_rejected() {
        let repos = Repositories::in_memory();
        AccountService::register(&repos, &register_payload("carol", "Secur3Pass!", "Secur3Pass!"))
            .await
            .unwrap();
        let err = AccountService::register(&repos, &register_payload("carol", "Secur3Pass!", "Secur3Pass!"))
            .await
            .unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains("username"));
        assert_eq!(errors.get("email"), Some(&[EMAIL_TAKEN.to_string()][..]));
    }

    #[tokio::test]
    async fn malformed_fields_are_reported_together() {
        let repos = Repositories::in_memory();
        let payload = RegisterPayload {
            username: Some("bad name".into()),
            email: Some("nope".into()),
            password: Some("123".into()),
            password2: None,
        };
        let AppError::Validation(errors) = AccountService::register(&repos, &payload).await.unwrap_err() else {
            panic!("expected validation error");
        };
        for field in ["username", "email", "password", "password2"] {
            assert!(errors.contains(field), "missing error for {}", field);
        }
    }

    #[tokio::test]
    async fn login_and_refresh() {
        let repos = Repositories::in_memory();
        let tokens = TokenService::new(&TokenConfig::default());
        AccountService::register(&repos, &register_payload("dave", "Secur3Pass!", "Secur3Pass!"))
            .await
            .unwrap();

        let bad = LoginPayload {
            username: Some("dave".into()),
            password: Some("wrong-password".into()),
        };
        assert!(matches!(
            AccountService::login(&repos, &tokens, &bad).await,
            Err(AppError::InvalidCredentials)
        ));

        let good = LoginPayload {
            username: Some("dave".into()),
            password: Some("Secur3Pass!".into()),
        };
        let pair = AccountService::login(&repos, &tokens, &good).await.unwrap();
        let fresh = AccountService::refresh(
            &repos,
            &tokens,
            &RefreshPayload {
                refresh: Some(pair.refresh),
            },
        )
        .await
        .unwrap();
        assert!(tokens.verify(&fresh.access, TokenKind::Access).is_ok());

        let wrong_kind = AccountService::refresh(
            &repos,
            &tokens,
            &RefreshPayload {
                refresh: Some(pair.access),
            },
        )
        .await;
        assert!(matches!(wrong_kind, Err(AppError::InvalidToken)));
    }
}
