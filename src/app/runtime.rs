//! Command executor: turns [`AppCmd`]s into worker threads and store writes,
//! and feeds every result back through the main queue.

#![allow(missing_docs)]

use std::thread::JoinHandle;
use std::time::Instant;

use crate::api::errors::{AuthError, MessageError, PersonError};
use crate::core::errors::{NightlightError, Result};
use crate::logger::activity::ActivityEvent;
use crate::paging::{ListKey, PageSource};
use crate::purchase::{PaymentQueue, PurchaseFlow, PurchaseOutcome, TransactionUpdate};
use crate::push;
use crate::runtime::{MainQueue, spawn_worker};

use super::context::ClientContext;
use super::model::{AppCmd, AppModel, AppMsg, PageResult, Reaction};
use super::update::update;

/// Payment queue for shells without a store front. Every purchase fails.
#[derive(Debug, Default)]
pub struct UnavailablePaymentQueue;

impl PaymentQueue for UnavailablePaymentQueue {
    fn add_payment(&mut self, _product_id: &str) -> Result<()> {
        Err(NightlightError::Runtime {
            details: "in-app purchases are not available here".to_string(),
        })
    }

    fn finish_transaction(&mut self, _transaction_id: &str) {}
}

pub struct AppRuntime {
    model: AppModel,
    queue: MainQueue<AppMsg>,
    context: ClientContext,
    purchases: PurchaseFlow,
    payments: Box<dyn PaymentQueue + Send>,
    workers: Vec<JoinHandle<()>>,
}

impl AppRuntime {
    pub fn new(context: ClientContext, payments: Box<dyn PaymentQueue + Send>) -> Self {
        let model = AppModel::new(context.config.paging.page_size, context.preferences.theme);
        Self {
            model,
            queue: MainQueue::new(),
            context,
            purchases: PurchaseFlow::new(),
            payments,
            workers: Vec::new(),
        }
    }

    pub fn model(&self) -> &AppModel {
        &self.model
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    /// Restore the session from the credential store and show the first
    /// screen.
    pub fn start(&mut self) -> Result<()> {
        let credentials = &self.context.credentials;
        let username = if credentials.is_signed_in()? {
            Some(credentials.username()?.unwrap_or_default())
        } else {
            None
        };
        let token_balance = credentials.token_balance()?;
        self.context.logger.send(ActivityEvent::SessionStarted {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config_hash: self.context.config.stable_hash()?,
            username: username.clone(),
        });
        self.dispatch(AppMsg::Started {
            username,
            token_balance,
            has_onboarded: self.context.preferences.has_onboarded,
        });
        Ok(())
    }

    /// Run one message through `update` and execute the resulting command.
    pub fn dispatch(&mut self, msg: AppMsg) {
        let cmd = update(&mut self.model, msg);
        self.execute(cmd);
    }

    /// Dispatch everything currently queued. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let pending = self.queue.drain();
        let handled = pending.len();
        for msg in pending {
            self.dispatch(msg);
        }
        handled
    }

    /// Block until no worker is running and the queue is empty.
    pub fn settle(&mut self) {
        loop {
            let workers = std::mem::take(&mut self.workers);
            let idle = workers.is_empty();
            for worker in workers {
                let _ = worker.join();
            }
            if self.pump() == 0 && idle {
                break;
            }
        }
    }

    /// Feed a payment queue update in. Completed purchases are credited to
    /// the stored balance before the model hears about them.
    pub fn handle_transaction(&mut self, transaction: &TransactionUpdate) {
        let Some(outcome) = self
            .purchases
            .handle_update(transaction, self.payments.as_mut())
        else {
            return;
        };
        let balance = match &outcome {
            PurchaseOutcome::Success { tokens, .. } => {
                match self.context.credentials.add_tokens(*tokens) {
                    Ok(balance) => Some(balance),
                    Err(err) => {
                        self.context.logger.send(ActivityEvent::from_error(&err));
                        None
                    }
                }
            }
            PurchaseOutcome::Cancelled | PurchaseOutcome::Failed(_) => None,
        };
        self.dispatch(AppMsg::PurchaseFinished {
            product_id: transaction.product_id.clone(),
            outcome,
            balance,
        });
    }

    /// Route a tapped push notification. Returns `false` for payloads that
    /// do not name a message.
    pub fn open_push(&mut self, payload: &str) -> bool {
        match push::parse_payload(payload) {
            Some(link) => {
                self.dispatch(AppMsg::PushOpened(link));
                true
            }
            None => false,
        }
    }

    /// Wait for outstanding work, then flush the activity log.
    pub fn shutdown(mut self, reason: &str) {
        self.settle();
        self.context.shutdown(reason);
    }

    // ──────────────────── command execution ────────────────────

    fn execute(&mut self, cmd: AppCmd) {
        match cmd {
            AppCmd::None | AppCmd::Quit => {}
            AppCmd::Batch(cmds) => {
                for cmd in cmds {
                    self.execute(cmd);
                }
            }
            AppCmd::FetchPage { list, ticket } => {
                let services = self.context.services.clone();
                let started = Instant::now();
                let lost_ticket = ticket.clone();
                let lost = move || AppMsg::PageLoaded {
                    list,
                    ticket: lost_ticket,
                    result: PageResult::lost(list),
                    duration_ms: elapsed_ms(started),
                };
                self.spawn(list.label(), lost, move || {
                    let request = &ticket.request;
                    let result = match list {
                        ListKey::Feed => {
                            PageResult::Messages(services.feed_source().fetch_page(request))
                        }
                        ListKey::Saved => {
                            PageResult::Messages(services.saved_source().fetch_page(request))
                        }
                        ListKey::HelpfulPeople => {
                            PageResult::People(services.helpful_source().fetch_page(request))
                        }
                        ListKey::Notifications => PageResult::Notifications(
                            services.notification_source().fetch_page(request),
                        ),
                    };
                    AppMsg::PageLoaded {
                        list,
                        ticket,
                        result,
                        duration_ms: elapsed_ms(started),
                    }
                });
            }
            AppCmd::SignIn { username, password } => {
                let auth = self.context.services.auth.clone();
                self.spawn(
                    "auth",
                    || AppMsg::AuthDone(Err(AuthError::Unknown)),
                    move || AppMsg::AuthDone(auth.sign_in(&username, &password)),
                );
            }
            AppCmd::SignUp(request) => {
                let auth = self.context.services.auth.clone();
                self.spawn(
                    "auth",
                    || AppMsg::AuthDone(Err(AuthError::Unknown)),
                    move || AppMsg::AuthDone(auth.sign_up(&request)),
                );
            }
            AppCmd::ClearCredentials => {
                if let Err(err) = self.context.services.auth.sign_out() {
                    self.context.logger.send(ActivityEvent::ActionFailed {
                        action: "sign_out".to_string(),
                        message: err.to_string(),
                    });
                }
            }
            AppCmd::FetchMessage { coordinator, id } => {
                let messages = self.context.services.messages.clone();
                let lost = move || AppMsg::MessageLoaded {
                    coordinator,
                    result: Err(MessageError::Unknown),
                };
                self.spawn("message", lost, move || AppMsg::MessageLoaded {
                    coordinator,
                    result: messages.get(id.as_str()),
                });
            }
            AppCmd::React {
                origin,
                reaction,
                id,
                on,
            } => {
                let messages = self.context.services.messages.clone();
                let lost_id = id.clone();
                let lost = move || AppMsg::ReactionDone {
                    origin,
                    id: lost_id,
                    reaction,
                    on,
                    result: Err(MessageError::Unknown),
                };
                self.spawn(reaction.label(), lost, move || {
                    let result = match reaction {
                        Reaction::Love => messages.set_loved(id.as_str(), on),
                        Reaction::Save => messages.set_saved(id.as_str(), on),
                    };
                    AppMsg::ReactionDone {
                        origin,
                        id,
                        reaction,
                        on,
                        result,
                    }
                });
            }
            AppCmd::Appreciate { coordinator, id } => {
                let messages = self.context.services.messages.clone();
                let lost = move || AppMsg::AppreciateDone {
                    coordinator,
                    result: Err(MessageError::Unknown),
                };
                self.spawn("appreciate", lost, move || AppMsg::AppreciateDone {
                    coordinator,
                    result: messages.appreciate(id.as_str()),
                });
            }
            AppCmd::DeleteMessage { coordinator, id } => {
                let messages = self.context.services.messages.clone();
                let lost_id = id.clone();
                let lost = move || AppMsg::DeleteDone {
                    coordinator,
                    id: lost_id,
                    result: Err(MessageError::Unknown),
                };
                self.spawn("delete", lost, move || {
                    let result = messages.delete(id.as_str());
                    AppMsg::DeleteDone {
                        coordinator,
                        id,
                        result,
                    }
                });
            }
            AppCmd::PostMessage { coordinator, body } => {
                let messages = self.context.services.messages.clone();
                let lost = move || AppMsg::PostDone {
                    coordinator,
                    result: Err(MessageError::Unknown),
                };
                self.spawn("post", lost, move || AppMsg::PostDone {
                    coordinator,
                    result: messages.post(&body),
                });
            }
            AppCmd::UpdateProfile {
                coordinator,
                update,
            } => {
                let people = self.context.services.people.clone();
                let lost = move || AppMsg::ProfileDone {
                    coordinator,
                    result: Err(PersonError::Unknown),
                };
                self.spawn("profile", lost, move || AppMsg::ProfileDone {
                    coordinator,
                    result: people.update_me(&update),
                });
            }
            AppCmd::BeginPurchase { product_id } => {
                if let Err(outcome) = self.purchases.begin(&product_id, self.payments.as_mut()) {
                    self.dispatch(AppMsg::PurchaseFinished {
                        product_id,
                        outcome,
                        balance: None,
                    });
                }
            }
            AppCmd::PersistTheme(theme) => {
                self.context.theme.set(theme);
                self.context.preferences.theme = theme;
                self.context.save_preferences();
            }
            AppCmd::MarkOnboarded => {
                self.context.preferences.has_onboarded = true;
                self.context.save_preferences();
            }
            AppCmd::Log(event) => self.context.logger.send(event),
        }
    }

    /// Run `job` on a worker. `lost` builds the failure result posted when
    /// the job panics or no thread could be started, so whatever the job
    /// was holding open (an in-flight fetch, a pending form) is released.
    fn spawn<L, F>(&mut self, name: &str, lost: L, job: F)
    where
        L: FnOnce() -> AppMsg + Clone + Send + 'static,
        F: FnOnce() -> AppMsg + Send + 'static,
    {
        self.workers.retain(|worker| !worker.is_finished());
        let logger = self.context.logger.clone();
        let action = name.to_string();
        let on_panic = {
            let lost = lost.clone();
            move |reason: String| {
                logger.send(ActivityEvent::ActionFailed {
                    action,
                    message: format!("worker panicked: {reason}"),
                });
                lost()
            }
        };
        match spawn_worker(name, self.queue.handle(), job, on_panic) {
            Ok(worker) => self.workers.push(worker),
            Err(err) => {
                self.context.logger.send(ActivityEvent::from_error(&err));
                self.dispatch(lost());
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
