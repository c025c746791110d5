//! Typed backend services on top of [`ApiClient`].
//!
//! Each service maps infrastructure failures into its domain error enum so
//! callers only ever see validation details or an opaque `Unknown`.

use crate::api::errors::{AuthError, MessageError, PersonError, UserNotificationError};
use crate::api::http::{ApiClient, HttpRequest, Method};
use crate::api::models::{
    AppreciationReceipt, AuthSession, Message, NewMessage, Person, ProfileUpdate,
    ResetPasswordRequest, SignInRequest, SignUpRequest, UserNotification,
};
use crate::api::page::{Page, PageRequest};
use crate::core::errors::NightlightError;
use crate::paging::view_model::PageSource;

fn message_path(id: &str, action: Option<&str>) -> String {
    match action {
        Some(action) => format!("/messages/{id}/{action}"),
        None => format!("/messages/{id}"),
    }
}

fn paged(path: &str, request: &PageRequest) -> HttpRequest {
    HttpRequest::new(Method::Get, path).query(request.query())
}

// ──────────────────── auth ────────────────────

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn sign_in(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = SignInRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.exchange("/auth/signin", &body)
    }

    pub fn sign_up(&self, request: &SignUpRequest) -> Result<AuthSession, AuthError> {
        self.exchange("/auth/signup", request)
    }

    /// Set a new password using an emailed reset token.
    ///
    /// Rejections that carry no field validation mean the token itself was
    /// refused.
    pub fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), AuthError> {
        let http = HttpRequest::new(Method::Post, "/auth/reset").json(request)?;
        match self.client.send_public(http) {
            Ok(_) => Ok(()),
            Err(err) => {
                let status = err.http_status();
                match AuthError::from(err) {
                    AuthError::Unknown if matches!(status, Some(400 | 401 | 404 | 410)) => {
                        Err(AuthError::InvalidResetToken)
                    }
                    other => Err(other),
                }
            }
        }
    }

    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.client.credentials().clear().map_err(AuthError::from)
    }

    fn exchange<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<AuthSession, AuthError> {
        let request = HttpRequest::new(Method::Post, path).json(body)?;
        let session: AuthSession = self.client.send_public(request)?.json()?;
        self.client.credentials().store_session(&session)?;
        Ok(session)
    }
}

// ──────────────────── messages ────────────────────

#[derive(Clone)]
pub struct MessageService {
    client: ApiClient,
}

impl MessageService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn feed(&self, request: &PageRequest) -> Result<Page<Message>, MessageError> {
        Ok(self.client.get_json(paged("/messages", request))?)
    }

    pub fn saved(&self, request: &PageRequest) -> Result<Page<Message>, MessageError> {
        Ok(self.client.get_json(paged("/messages/saved", request))?)
    }

    pub fn get(&self, id: &str) -> Result<Message, MessageError> {
        Ok(self
            .client
            .get_json(HttpRequest::new(Method::Get, message_path(id, None)))?)
    }

    pub fn post(&self, body: &str) -> Result<Message, MessageError> {
        let request = HttpRequest::new(Method::Post, "/messages").json(&NewMessage {
            body: body.to_string(),
        })?;
        Ok(self.client.get_json(request)?)
    }

    pub fn delete(&self, id: &str) -> Result<(), MessageError> {
        self.client
            .send_authorized(HttpRequest::new(Method::Delete, message_path(id, None)))?;
        Ok(())
    }

    /// Love or un-love a message. Callers apply the flag to their own copy.
    pub fn set_loved(&self, id: &str, loved: bool) -> Result<(), MessageError> {
        Ok(self.toggle(id, "love", loved)?)
    }

    /// Save or un-save a message.
    pub fn set_saved(&self, id: &str, saved: bool) -> Result<(), MessageError> {
        Ok(self.toggle(id, "save", saved)?)
    }

    /// Spend tokens on a message. The remaining balance is persisted.
    pub fn appreciate(&self, id: &str) -> Result<AppreciationReceipt, MessageError> {
        let receipt: AppreciationReceipt = self
            .client
            .get_json(HttpRequest::new(Method::Post, message_path(id, Some("appreciate"))))?;
        self.client
            .credentials()
            .set_token_balance(receipt.token_balance)?;
        Ok(receipt)
    }

    fn toggle(&self, id: &str, action: &str, on: bool) -> Result<(), NightlightError> {
        let method = if on { Method::Post } else { Method::Delete };
        self.client
            .send_authorized(HttpRequest::new(method, message_path(id, Some(action))))?;
        Ok(())
    }
}

// ──────────────────── people ────────────────────

#[derive(Clone)]
pub struct PersonService {
    client: ApiClient,
}

impl PersonService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn helpful(&self, request: &PageRequest) -> Result<Page<Person>, PersonError> {
        Ok(self.client.get_json(paged("/people/helpful", request))?)
    }

    pub fn me(&self) -> Result<Person, PersonError> {
        Ok(self
            .client
            .get_json(HttpRequest::new(Method::Get, "/people/me"))?)
    }

    pub fn update_me(&self, update: &ProfileUpdate) -> Result<Person, PersonError> {
        let request = HttpRequest::new(Method::Put, "/people/me").json(update)?;
        let person: Person = self.client.get_json(request)?;
        self.client.credentials().set_username(&person.username)?;
        Ok(person)
    }
}

// ──────────────────── notifications ────────────────────

#[derive(Clone)]
pub struct NotificationService {
    client: ApiClient,
}

impl NotificationService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self, request: &PageRequest) -> Result<Page<UserNotification>, UserNotificationError> {
        Ok(self.client.get_json(paged("/notifications", request))?)
    }
}

// ──────────────────── page sources ────────────────────

/// Which message list a [`MessagePageSource`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageScope {
    Feed,
    Saved,
}

#[derive(Clone)]
pub struct MessagePageSource {
    service: MessageService,
    scope: MessageScope,
}

impl MessagePageSource {
    pub fn new(service: MessageService, scope: MessageScope) -> Self {
        Self { service, scope }
    }
}

impl PageSource for MessagePageSource {
    type Item = Message;
    type Error = MessageError;

    fn fetch_page(&self, request: &PageRequest) -> Result<Page<Message>, MessageError> {
        match self.scope {
            MessageScope::Feed => self.service.feed(request),
            MessageScope::Saved => self.service.saved(request),
        }
    }
}

#[derive(Clone)]
pub struct HelpfulPeopleSource(pub PersonService);

impl PageSource for HelpfulPeopleSource {
    type Item = Person;
    type Error = PersonError;

    fn fetch_page(&self, request: &PageRequest) -> Result<Page<Person>, PersonError> {
        self.0.helpful(request)
    }
}

#[derive(Clone)]
pub struct NotificationSource(pub NotificationService);

impl PageSource for NotificationSource {
    type Item = UserNotification;
    type Error = UserNotificationError;

    fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> Result<Page<UserNotification>, UserNotificationError> {
        self.0.list(request)
    }
}

/// All services sharing one client.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub messages: MessageService,
    pub people: PersonService,
    pub notifications: NotificationService,
}

impl Services {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthService::new(client.clone()),
            messages: MessageService::new(client.clone()),
            people: PersonService::new(client.clone()),
            notifications: NotificationService::new(client),
        }
    }

    pub fn feed_source(&self) -> MessagePageSource {
        MessagePageSource::new(self.messages.clone(), MessageScope::Feed)
    }

    pub fn saved_source(&self) -> MessagePageSource {
        MessagePageSource::new(self.messages.clone(), MessageScope::Saved)
    }

    pub fn helpful_source(&self) -> HelpfulPeopleSource {
        HelpfulPeopleSource(self.people.clone())
    }

    pub fn notification_source(&self) -> NotificationSource {
        NotificationSource(self.notifications.clone())
    }
}
