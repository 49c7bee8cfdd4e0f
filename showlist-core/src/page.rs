//! Page behavior: navigation menu, contact form and the shows section.
//!
//! UI events arrive from a `UiEventSource` and are routed to handlers by
//! `Page::dispatch`. Only the shows renderer and the contact form touch
//! displayed content.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::constants::FORM_MESSAGE_TTL_SECS;
use crate::error::{ShowListError, ShowListResult};
use crate::pipeline::ShowsPipeline;
use crate::render::HtmlContainer;
use crate::retrieve::FeedRetriever;

pub const SENDING_LABEL: &str = "SENDING...";
pub const SUCCESS_MESSAGE: &str =
    "Thank you! Your message has been sent successfully. We'll get back to you soon.";
pub const ERROR_MESSAGE: &str = "Sorry, there was an error sending your message. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    PageLoad,
    HamburgerClick,
    NavLinkClick,
    FormSubmit,
}

/// Something that produces UI events, e.g. a browser bridge or a script.
#[allow(async_fn_in_trait)]
pub trait UiEventSource {
    async fn next_event(&mut self) -> Option<UiEvent>;
}

/// A fixed sequence of events.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: VecDeque<UiEvent>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = UiEvent>) -> Self {
        ScriptedEvents {
            events: events.into_iter().collect(),
        }
    }
}

impl UiEventSource for ScriptedEvents {
    async fn next_event(&mut self) -> Option<UiEvent> {
        self.events.pop_front()
    }
}

/// Hamburger button and navigation menu, which share one `active` state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavMenu {
    pub hamburger_active: bool,
    pub menu_active: bool,
}

impl NavMenu {
    pub fn toggle(&mut self) {
        self.hamburger_active = !self.hamburger_active;
        self.menu_active = !self.menu_active;
    }

    pub fn close(&mut self) {
        self.hamburger_active = false;
        self.menu_active = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMessageKind {
    Success,
    Error,
}

/// Transient message shown after the form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormMessage {
    pub kind: FormMessageKind,
    pub text: &'static str,
    pub expires_at: Instant,
}

impl FormMessage {
    fn new(kind: FormMessageKind, shown_at: Instant) -> Self {
        let text = match kind {
            FormMessageKind::Success => SUCCESS_MESSAGE,
            FormMessageKind::Error => ERROR_MESSAGE,
        };
        FormMessage {
            kind,
            text,
            expires_at: shown_at + Duration::from_secs(FORM_MESSAGE_TTL_SECS),
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self.kind {
            FormMessageKind::Success => "form-message success",
            FormMessageKind::Error => "form-message error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: String,
    pub disabled: bool,
}

/// The contact form, posted to `action` as url-encoded fields.
#[derive(Debug, Clone)]
pub struct ContactForm {
    pub action: String,
    pub fields: Vec<(String, String)>,
    pub button: SubmitButton,
    message: Option<FormMessage>,
    original_label: String,
}

impl ContactForm {
    pub fn new(action: &str, button_label: &str) -> Self {
        ContactForm {
            action: action.to_string(),
            fields: Vec::new(),
            button: SubmitButton {
                label: button_label.to_string(),
                disabled: false,
            },
            message: None,
            original_label: button_label.to_string(),
        }
    }

    pub fn set_field(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }

    /// The message visible at `at`, if it has not expired.
    pub fn message_at(&self, at: Instant) -> Option<&FormMessage> {
        self.message.as_ref().filter(|m| at < m.expires_at)
    }

    /// Drop the message once it has expired.
    pub fn expire_message(&mut self, at: Instant) {
        if self.message.as_ref().is_some_and(|m| at >= m.expires_at) {
            self.message = None;
        }
    }

    /// Clear any previous message and put the button in its sending state.
    pub fn begin_submit(&mut self) {
        self.message = None;
        self.button.label = SENDING_LABEL.to_string();
        self.button.disabled = true;
    }

    /// Show the outcome and restore the button. A successful send resets
    /// the fields.
    pub fn finish_submit(&mut self, outcome: ShowListResult<()>, at: Instant) -> FormMessageKind {
        let kind = match outcome {
            Ok(()) => {
                self.fields.clear();
                FormMessageKind::Success
            }
            Err(e) => {
                log::error!("{}", e);
                FormMessageKind::Error
            }
        };
        self.message = Some(FormMessage::new(kind, at));
        self.button.label = self.original_label.clone();
        self.button.disabled = false;
        kind
    }

    pub async fn submit(&mut self, http: &reqwest::Client) -> FormMessageKind {
        self.begin_submit();
        let outcome = post_form(http, &self.action, &self.fields).await;
        self.finish_submit(outcome, Instant::now())
    }
}

async fn post_form(
    http: &reqwest::Client,
    action: &str,
    fields: &[(String, String)],
) -> ShowListResult<()> {
    let resp = http
        .post(action)
        .form(fields)
        .send()
        .await
        .map_err(|e| ShowListError::Submit(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(ShowListError::Submit(format!(
            "{} returned {}",
            action,
            resp.status()
        )));
    }
    Ok(())
}

/// The pieces of the site the script interacts with.
pub struct Page {
    pub nav: NavMenu,
    pub contact_form: Option<ContactForm>,
    /// Present when the page has a shows section
    pub shows: Option<HtmlContainer>,
    pipeline: ShowsPipeline,
    retriever: FeedRetriever,
    http: reqwest::Client,
}

impl Page {
    pub fn new(pipeline: ShowsPipeline, retriever: FeedRetriever) -> Self {
        Page {
            nav: NavMenu::default(),
            contact_form: None,
            shows: None,
            pipeline,
            retriever,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_shows_section(mut self) -> Self {
        self.shows = Some(HtmlContainer::new());
        self
    }

    pub fn with_contact_form(mut self, form: ContactForm) -> Self {
        self.contact_form = Some(form);
        self
    }

    pub async fn dispatch(&mut self, event: UiEvent) {
        log::debug!("Dispatching {:?}", event);
        match event {
            UiEvent::PageLoad => {
                let now = self.pipeline.now();
                if let Some(container) = self.shows.as_mut() {
                    self.pipeline.run(&self.retriever, container, now).await;
                }
            }
            UiEvent::HamburgerClick => self.nav.toggle(),
            UiEvent::NavLinkClick => self.nav.close(),
            UiEvent::FormSubmit => {
                if let Some(form) = self.contact_form.as_mut() {
                    form.submit(&self.http).await;
                }
            }
        }
    }

    /// Dispatch every event from `source` until it is exhausted.
    pub async fn serve<S: UiEventSource>(&mut self, source: &mut S) {
        while let Some(event) = source.next_event().await {
            self.dispatch(event).await;
        }
    }
}
