use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use pas_accounts::{Error, Result, Session, Transport};
use serde_json::Value;
use url::Url;

/// Transport that replays queued responses and records every request.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Rc<RefCell<VecDeque<Result<Option<Value>>>>>,
    requests: Rc<RefCell<Vec<(Url, Option<Duration>)>>>,
}

impl ScriptedTransport {
    pub fn respond(&self, body: Value) -> &Self {
        self.responses.borrow_mut().push_back(Ok(Some(body)));
        self
    }

    pub fn respond_empty(&self) -> &Self {
        self.responses.borrow_mut().push_back(Ok(None));
        self
    }

    pub fn fail(&self, error: Error) -> &Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    pub fn urls(&self) -> Vec<Url> {
        self.requests.borrow().iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn timeouts(&self) -> Vec<Option<Duration>> {
        self.requests.borrow().iter().map(|(_, timeout)| *timeout).collect()
    }

    pub fn session(&self, version: Option<&str>) -> Session {
        let session = Session::new("https://pvwa.example.com", self.clone()).expect("session");
        match version {
            Some(version) => session.with_server_version(version.parse().expect("version")),
            None => session,
        }
    }
}

impl Transport for ScriptedTransport {
    fn get_json(&self, url: &Url, timeout: Option<Duration>) -> Result<Option<Value>> {
        self.requests.borrow_mut().push((url.clone(), timeout));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Decode(format!("unexpected request to {url}"))))
    }
}

pub fn query_pairs(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
