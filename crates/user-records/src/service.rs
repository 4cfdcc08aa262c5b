//! User record operations.
//!
//! `UserService` owns no state of its own; it validates input and drives the
//! store, media, credential and transport collaborators it was built with.

use std::sync::Arc;

use envelope_crypto::{open_json, seal_json, Envelope, KeyPair};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::credentials::CredentialService;
use crate::error::UserError;
use crate::media::MediaStore;
use crate::normalize::normalize_input;
use crate::store::DocumentStore;
use crate::transport::EnvelopeTransport;
use crate::types::{Account, Session, Upload, User, UserInput, ACCOUNTS, USERS};
use crate::validation::{validate_login, validate_signup, validate_status, validate_user};

pub struct UserService {
    store: Arc<dyn DocumentStore>,
    media: Arc<dyn MediaStore>,
    credentials: Arc<dyn CredentialService>,
    transport: Arc<dyn EnvelopeTransport>,
    keys: Arc<KeyPair>,
    media_folder: String,
}

impl UserService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        media: Arc<dyn MediaStore>,
        credentials: Arc<dyn CredentialService>,
        transport: Arc<dyn EnvelopeTransport>,
        keys: Arc<KeyPair>,
    ) -> Self {
        Self {
            store,
            media,
            credentials,
            transport,
            keys,
            media_folder: Config::default().media_folder,
        }
    }

    /// Builds a service from configuration, loading the keypair from disk.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn DocumentStore>,
        media: Arc<dyn MediaStore>,
        credentials: Arc<dyn CredentialService>,
        transport: Arc<dyn EnvelopeTransport>,
    ) -> Result<Self, UserError> {
        let keys = config.load_keys()?;
        Ok(Self::new(store, media, credentials, transport, keys)
            .with_media_folder(config.media_folder.clone()))
    }

    pub fn with_media_folder(mut self, folder: impl Into<String>) -> Self {
        self.media_folder = folder.into();
        self
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    // ------------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------------

    pub async fn list_users(&self) -> Result<Vec<User>, UserError> {
        let docs = self.store.find_all(USERS).await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(UserError::from))
            .collect()
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, UserError> {
        let doc = self.store.find_by_id(USERS, id).await?;
        doc.map(serde_json::from_value)
            .transpose()
            .map_err(UserError::from)
    }

    /// Normalizes and validates `body`, rejects a taken email, uploads the
    /// image when one is attached and stores the record. The image comes
    /// only from the upload; an `image` URI in the body is ignored.
    pub async fn create_user(&self, body: Value, file: Option<&Upload>) -> Result<User, UserError> {
        let input = prepare_user(body)?;
        self.insert_user(input, file).await
    }

    /// Replaces the record's fields. A new upload replaces the image; without
    /// one the body's image (if any) is used, else the stored image is kept.
    pub async fn update_user(
        &self,
        id: &str,
        body: Value,
        file: Option<&Upload>,
    ) -> Result<Option<User>, UserError> {
        let mut input = prepare_user(body)?;

        if self.store.find_by_id(USERS, id).await?.is_none() {
            return Ok(None);
        }
        if let Some(file) = file {
            input.image = Some(self.media.upload(&self.media_folder, file).await?);
        }

        let mut patch = serde_json::to_value(&input)?;
        if input.image.is_none() {
            if let Some(fields) = patch.as_object_mut() {
                fields.remove("image");
            }
        }
        let updated = self.store.update_unique(USERS, id, "email", patch).await?;
        if updated.is_some() {
            info!(user_id = id, "updated user");
        }
        updated
            .map(serde_json::from_value)
            .transpose()
            .map_err(UserError::from)
    }

    pub async fn update_user_status(&self, id: &str, body: Value) -> Result<Option<User>, UserError> {
        let update = validate_status(&body)?;
        let updated = self
            .store
            .update(USERS, id, json!({ "status": update.status }))
            .await?;
        if updated.is_some() {
            info!(user_id = id, status = update.status, "updated user status");
        }
        updated
            .map(serde_json::from_value)
            .transpose()
            .map_err(UserError::from)
    }

    pub async fn delete_user(&self, id: &str) -> Result<Option<User>, UserError> {
        let removed = self.store.delete(USERS, id).await?;
        if removed.is_some() {
            info!(user_id = id, "deleted user");
        }
        removed
            .map(serde_json::from_value)
            .transpose()
            .map_err(UserError::from)
    }

    // ------------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------------

    pub async fn signup(&self, body: Value) -> Result<Account, UserError> {
        let request = validate_signup(&body)?;
        self.ensure_email_free(ACCOUNTS, &request.email).await?;

        let password = self.credentials.hash_password(&request.password).await?;
        let doc = self
            .store
            .insert_unique(
                ACCOUNTS,
                "email",
                json!({
                    "name": request.name,
                    "email": request.email,
                    "phone": request.phone,
                    "password": password,
                }),
            )
            .await?;
        let account: Account = serde_json::from_value(doc)?;
        info!(account_id = %account.id, "signed up account");
        Ok(account)
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, body: Value) -> Result<Session, UserError> {
        let request = validate_login(&body)?;

        let Some(doc) = self
            .store
            .find_one(ACCOUNTS, "email", &Value::String(request.email.clone()))
            .await?
        else {
            debug!("login for unknown email");
            return Err(UserError::InvalidCredentials);
        };
        let hash = doc
            .get("password")
            .and_then(Value::as_str)
            .ok_or_else(|| UserError::Store("account has no password hash".into()))?;
        if !self
            .credentials
            .verify_password(&request.password, hash)
            .await?
        {
            debug!("login with wrong password");
            return Err(UserError::InvalidCredentials);
        }

        let account: Account = serde_json::from_value(doc)?;
        let token = self.credentials.issue_token(&account).await?;
        info!(account_id = %account.id, "logged in");
        Ok(Session { account, token })
    }

    // ------------------------------------------------------------------------
    // Encrypted intake
    // ------------------------------------------------------------------------

    /// Validates the record, seals it, hands the envelope to the transport,
    /// opens and re-validates the reply, stores it and returns the stored
    /// record sealed for the configured public key.
    ///
    /// Every envelope failure surfaces as [`UserError::EnvelopeFailed`].
    pub async fn create_user_encrypted(
        &self,
        body: Value,
        file: Option<&Upload>,
    ) -> Result<Envelope, UserError> {
        let input = prepare_user(body)?;

        let request = seal_json(&input, self.keys.public())?;
        let reply = self.transport.exchange(request).await?;
        let received: Value = open_json(&reply, self.keys.private())?;
        let input = validate_user(&received)
            .inspect_err(|_| warn!("reply failed validation after decryption"))?;

        let user = self.insert_user(input, file).await?;
        Ok(seal_json(&user, self.keys.public())?)
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    async fn insert_user(&self, mut input: UserInput, file: Option<&Upload>) -> Result<User, UserError> {
        // Early exit before uploading; insert_unique is the authoritative check.
        self.ensure_email_free(USERS, &input.email).await?;
        input.image = match file {
            Some(file) => Some(self.media.upload(&self.media_folder, file).await?),
            None => None,
        };

        let doc = self
            .store
            .insert_unique(USERS, "email", serde_json::to_value(&input)?)
            .await?;
        let user: User = serde_json::from_value(doc)?;
        info!(user_id = %user.id, "created user");
        Ok(user)
    }

    async fn ensure_email_free(&self, collection: &str, email: &str) -> Result<(), UserError> {
        let taken = self
            .store
            .find_one(collection, "email", &Value::String(email.to_string()))
            .await?
            .is_some();
        if taken {
            return Err(UserError::Conflict("User already exists".into()));
        }
        Ok(())
    }
}

fn prepare_user(mut body: Value) -> Result<UserInput, UserError> {
    normalize_input(&mut body);
    validate_user(&body)
}
