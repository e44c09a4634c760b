//! Inline driver: executes requests on the calling thread until idle.
//!
//! Used by the one-shot CLI commands and by tests. Requests run strictly
//! in FIFO order, so outcomes are deterministic for a scripted backend.

use std::collections::VecDeque;

use crate::api::client::Backend;

use super::actions::UnknownAction;
use super::effects::Request;
use super::Dashboard;

pub struct Session<B> {
    backend: B,
    dashboard: Dashboard,
}

impl<B: Backend> Session<B> {
    pub fn new(backend: B, dashboard: Dashboard) -> Self {
        Self { backend, dashboard }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Execute `requests` and every follow-up they produce. Returns how many
    /// requests were performed.
    pub fn run(&mut self, requests: Vec<Request>) -> usize {
        let mut queue: VecDeque<Request> = requests.into();
        let mut executed = 0;
        while let Some(request) = queue.pop_front() {
            tracing::trace!(kind = request.kind(), "executing");
            let completion = request.execute(&self.backend);
            executed += 1;
            queue.extend(self.dashboard.complete(completion));
        }
        executed
    }

    /// One full poll cycle.
    pub fn refresh(&mut self) -> usize {
        let requests = self.dashboard.poll_tick();
        self.run(requests)
    }

    /// Dispatch an action and drive it to completion.
    pub fn dispatch(&mut self, action_id: &str) -> Result<usize, UnknownAction> {
        let requests = self.dashboard.dispatch(action_id)?;
        Ok(self.run(requests))
    }
}
