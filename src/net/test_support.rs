//! Scripted HTTP client and session fixtures for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::error::TransportFailure;
use super::http::{HttpClient, HttpRequest, HttpResponse};
use super::transport::SessionEvent;
use super::types::{Session, User};

/// Replays queued outcomes in order and records every request it was given.
#[derive(Clone, Default)]
pub(crate) struct ScriptedClient {
    outcomes: Rc<RefCell<VecDeque<Result<HttpResponse, TransportFailure>>>>,
    sent: Rc<RefCell<Vec<HttpRequest>>>,
    in_flight: Rc<RefCell<Option<Box<dyn FnOnce()>>>>,
}

impl ScriptedClient {
    pub(crate) fn respond(&self, status: u16, body: &str) -> &Self {
        self.outcomes
            .borrow_mut()
            .push_back(Ok(HttpResponse { status, body: body.to_owned() }));
        self
    }

    pub(crate) fn fail(&self, failure: TransportFailure) -> &Self {
        self.outcomes.borrow_mut().push_back(Err(failure));
        self
    }

    /// Runs `action` after the next request is sent and before its reply arrives.
    pub(crate) fn while_in_flight(&self, action: impl FnOnce() + 'static) -> &Self {
        *self.in_flight.borrow_mut() = Some(Box::new(action));
        self
    }

    pub(crate) fn sent(&self) -> Vec<HttpRequest> {
        self.sent.borrow().clone()
    }
}

#[async_trait(?Send)]
impl HttpClient for ScriptedClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        self.sent.borrow_mut().push(request);
        let action = self.in_flight.borrow_mut().take();
        if let Some(action) = action {
            action();
        }
        self.outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportFailure::NoResponse("script exhausted".to_owned())))
    }
}

/// Collects emitted session events.
#[derive(Clone, Default)]
pub(crate) struct EventLog(Arc<Mutex<Vec<SessionEvent>>>);

impl EventLog {
    pub(crate) fn listener(&self) -> impl Fn(&SessionEvent) + Send + Sync + 'static {
        let log = self.0.clone();
        move |event: &SessionEvent| log.lock().unwrap().push(event.clone())
    }

    pub(crate) fn events(&self) -> Vec<SessionEvent> {
        self.0.lock().unwrap().clone()
    }
}

pub(crate) fn session(token: &str, roles: &[&str]) -> Session {
    Session {
        token: token.to_owned(),
        user: User {
            id: "u1".to_owned(),
            username: "alice".to_owned(),
            email: "a@x.com".to_owned(),
            full_name: "Alice Uwase".to_owned(),
            telephone: "+250788123456".to_owned(),
            district: "Gasabo".to_owned(),
            sector: "Kimironko".to_owned(),
            roles: roles.iter().map(|r| (*r).to_owned()).collect(),
        },
    }
}
