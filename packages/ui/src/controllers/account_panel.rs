use std::fmt;

use api::{AuthProvider, Backend};
use chrono::Utc;
use store::{BlobStore, Profile, SyncError, TableStore, UserId};

use super::{Notifier, Pending, Shared, MIN_PASSWORD_LEN};

/// Outcome of a successful account action, shown in the activity log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    PasswordUpdated,
    UsernameUpdated(String),
    AvatarUpdated,
    SignedOut,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PasswordUpdated => f.write_str("Password has been updated"),
            Notice::UsernameUpdated(name) => write!(f, "Username has been updated to {name}"),
            Notice::AvatarUpdated => f.write_str("Avatar has been updated"),
            Notice::SignedOut => f.write_str("Signed out"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountState {
    pub profile: Option<Profile>,
    pub email: Option<String>,
    pub editing_password: bool,
    pub editing_username: bool,
    pub picking_avatar: bool,
    pub password_draft: String,
    pub username_draft: String,
    pub error: Option<String>,
    pub in_flight: usize,
}

impl AccountState {
    pub fn busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .and_then(|p| p.avatar_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

impl Pending for AccountState {
    fn in_flight(&mut self) -> &mut usize {
        &mut self.in_flight
    }

    fn error(&mut self) -> &mut Option<String> {
        &mut self.error
    }
}

/// Lower-cased extension of an uploaded file name, `png` when it has none.
fn extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "png".to_string())
}

/// The cached profile, created empty when the user has no row yet.
fn profile_of<'a>(state: &'a mut AccountState, user: &UserId) -> &'a mut Profile {
    let email = state.email.clone();
    state.profile.get_or_insert_with(|| Profile {
        id: user.clone(),
        email,
        name: None,
        avatar_url: None,
    })
}

#[derive(Clone)]
pub struct AccountPanel<A, T, B> {
    backend: Backend<A, T, B>,
    shared: Shared<AccountState>,
}

impl<A, T, B> AccountPanel<A, T, B>
where
    A: AuthProvider,
    T: TableStore + Clone,
    B: BlobStore,
{
    pub fn new(backend: Backend<A, T, B>, notify: Notifier) -> Self {
        Self {
            backend,
            shared: Shared::new(AccountState::default(), notify),
        }
    }

    pub fn snapshot(&self) -> AccountState {
        self.shared.snapshot()
    }

    pub async fn mount(&self) -> Result<(), SyncError> {
        let session = self.backend.gateway.require_session().await?;
        let profile = self
            .shared
            .track(self.backend.profiles().fetch_profile(&session.user.id))
            .await?;
        if profile.is_none() {
            tracing::warn!(user = %session.user.id, "No profile found");
        }
        self.shared.update(|s| {
            s.profile = profile;
            s.email = session.user.email;
        });
        Ok(())
    }

    pub fn toggle_password_editor(&self) {
        self.shared.update(|s| {
            s.editing_password = !s.editing_password;
            s.error = None;
        });
    }

    pub fn toggle_username_editor(&self) {
        self.shared.update(|s| {
            s.editing_username = !s.editing_username;
            s.error = None;
        });
    }

    pub fn toggle_avatar_picker(&self) {
        self.shared.update(|s| {
            s.picking_avatar = !s.picking_avatar;
            s.error = None;
        });
    }

    pub fn set_password_draft(&self, text: &str) {
        self.shared.update(|s| s.password_draft = text.to_string());
    }

    pub fn set_username_draft(&self, text: &str) {
        self.shared.update(|s| s.username_draft = text.to_string());
    }

    pub async fn change_password(&self) -> Result<Notice, SyncError> {
        self.backend.gateway.require_session().await?;
        let password = self.shared.read(|s| s.password_draft.clone());

        let result = self
            .shared
            .track(async {
                if password.chars().count() < MIN_PASSWORD_LEN {
                    return Err(SyncError::Validation(format!(
                        "Password should be at least {MIN_PASSWORD_LEN} characters long"
                    )));
                }
                self.backend
                    .gateway
                    .update_password(&password)
                    .await
                    .map_err(SyncError::from)
            })
            .await;

        result.map(|()| {
            self.shared.update(|s| {
                s.password_draft.clear();
                s.editing_password = false;
            });
            Notice::PasswordUpdated
        })
    }

    pub async fn change_username(&self) -> Result<Notice, SyncError> {
        let session = self.backend.gateway.require_session().await?;
        let draft = self.shared.read(|s| s.username_draft.clone());

        let name = self
            .shared
            .track(self.backend.profiles().update_name(&session.user.id, &draft))
            .await?;

        let user = session.user.id;
        self.shared.update(|s| {
            profile_of(s, &user).name = Some(name.clone());
            s.username_draft.clear();
            s.editing_username = false;
        });
        Ok(Notice::UsernameUpdated(name))
    }

    /// Upload a new avatar and point the profile at it.
    ///
    /// The object is stored as `avatars/<user id>_<unix millis>.<ext>`. The
    /// previous avatar is removed only once the profile points at the new one;
    /// if the profile write fails the fresh upload is removed instead. Either
    /// removal failing is only logged.
    pub async fn change_avatar(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Notice, SyncError> {
        let session = self.backend.gateway.require_session().await?;
        let user = session.user.id;
        let bucket = self.backend.avatar_bucket.clone();
        let path = format!(
            "avatars/{user}_{}.{}",
            Utc::now().timestamp_millis(),
            extension(file_name)
        );
        let previous = self.shared.read(|s| {
            s.avatar_url()
                .and_then(|url| url.rsplit('/').next())
                .filter(|name| !name.is_empty())
                .map(|name| format!("avatars/{name}"))
        });

        let url = self
            .shared
            .track(async {
                self.backend
                    .blobs
                    .upload(&bucket, &path, bytes, content_type, true)
                    .await
                    .map_err(|e| {
                        tracing::error!(path = %path, "Error uploading avatar: {e}");
                        SyncError::from(e)
                    })?;
                let url = self.backend.blobs.public_url(&bucket, &path);
                if let Err(e) = self.backend.profiles().update_avatar_url(&user, &url).await {
                    self.discard_avatar(&bucket, &path).await;
                    return Err(e);
                }
                if let Some(old) = previous.filter(|old| old != &path) {
                    self.discard_avatar(&bucket, &old).await;
                }
                Ok(url)
            })
            .await?;

        self.shared.update(|s| {
            profile_of(s, &user).avatar_url = Some(url);
            s.picking_avatar = false;
        });
        Ok(Notice::AvatarUpdated)
    }

    async fn discard_avatar(&self, bucket: &str, path: &str) {
        if let Err(e) = self.backend.blobs.remove(bucket, vec![path.to_string()]).await {
            tracing::warn!(path = %path, "Error removing avatar: {e}");
        }
    }

    pub async fn logout(&self) -> Result<Notice, SyncError> {
        let result = self
            .shared
            .track(async { self.backend.gateway.sign_out().await.map_err(SyncError::from) })
            .await;
        self.shared.update(|s| *s = AccountState::default());
        result.map(|()| Notice::SignedOut)
    }
}
