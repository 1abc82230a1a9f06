//! Who is signed in. A [`Session`] is built once at startup and handed to
//! whatever needs the current user; the bearer token survives restarts in a
//! [`TokenStore`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

use spdlog::{info, warn};

use crate::api::client::ApiClient;
use crate::api::error::ValidationError;
use crate::api::types::{LoginRequest, RegisterRequest, Role, UpdateProfileRequest, User};
use crate::notify::Notifications;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Single value file holding the bearer token.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(data_dir: &Path) -> Self {
        TokenStore {
            path: data_dir.join("token"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(token) => {
                let token = token.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

pub struct Session {
    api: ApiClient,
    store: TokenStore,
    user: Option<User>,
    pub notifications: Notifications,
}

impl Session {
    pub fn new(api: ApiClient, store: TokenStore) -> Self {
        Session {
            api,
            store,
            user: None,
            notifications: Notifications::new(),
        }
    }

    /// The client, carrying the token of this session when there is one.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.api.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.api.token().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.user.as_ref().is_some_and(|u| u.role == Role::Admin)
    }

    fn forget(&mut self) {
        self.user = None;
        self.api.set_token(None);
        if let Err(e) = self.store.clear() {
            warn!("Could not remove token file {}: {}", self.store.path().display(), e);
        }
    }

    fn remember(&mut self, token: String, user: User) {
        if let Err(e) = self.store.save(&token) {
            warn!("Could not store token in {}: {}", self.store.path().display(), e);
        }
        self.api.set_token(Some(token));
        self.user = Some(user);
    }

    /// Picks up the stored token and checks it against the API. A token the
    /// API does not accept is discarded.
    pub async fn restore(&mut self) -> bool {
        let token = match self.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => return false,
            Err(e) => {
                warn!("Could not read token file {}: {}", self.store.path().display(), e);
                return false;
            }
        };

        self.api.set_token(Some(token));
        match self.api.me().await {
            Ok(user) => {
                info!("Restored session of {}", user.username);
                self.user = Some(user);
                true
            }
            Err(e) => {
                warn!("Stored token rejected, signing out: {}", e);
                self.forget();
                false
            }
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        match self.api.login(&request).await {
            Ok(res) if res.success => {
                info!("Signed in as {}", res.user.username);
                self.remember(res.token, res.user);
                self.notifications.success("Login successful!");
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("Login failed: {}", e);
                self.notifications.error(e.user_message());
                false
            }
        }
    }

    pub async fn register(&mut self, request: RegisterRequest, confirm_password: &str) -> bool {
        if request.password != confirm_password {
            self.notifications.error(ValidationError::PasswordMismatch.to_string());
            return false;
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            self.notifications.error(ValidationError::PasswordTooShort { min: MIN_PASSWORD_LEN }.to_string());
            return false;
        }

        match self.api.register(&request).await {
            Ok(res) if res.success => {
                info!("Registered {}", res.user.username);
                self.remember(res.token, res.user);
                self.notifications.success("Registration successful!");
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("Registration failed: {}", e);
                self.notifications.error(e.user_message());
                false
            }
        }
    }

    /// Always ends signed out, whatever the API says.
    pub async fn logout(&mut self) {
        if let Err(e) = self.api.logout().await {
            warn!("Logout request failed, clearing the session anyway: {}", e);
        }
        self.forget();
        self.notifications.success("Logged out successfully");
    }

    pub async fn update_profile(&mut self, request: &UpdateProfileRequest) -> bool {
        match self.api.update_profile(request).await {
            Ok(user) => {
                self.user = Some(user);
                self.notifications.success("Profile updated successfully!");
                true
            }
            Err(e) => {
                warn!("Profile update failed: {}", e);
                self.notifications.error(e.user_message());
                false
            }
        }
    }
}
