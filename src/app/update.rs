//! Pure update function for the client state machine.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing any side-effects the runtime should execute.
//! This module performs zero I/O.

#![allow(clippy::too_many_lines)]

use std::fmt::Display;

use crate::api::errors::UserFacing;
use crate::api::models::Message;
use crate::coordinator::{
    CoordinatorId, Delivery, FlowFailure, NavigationEvent, Route, RowContext, StackEntry,
};
use crate::core::errors::NightlightError;
use crate::logger::activity::ActivityEvent;
use crate::paging::{FetchOutcome, FetchTicket, Identified, ItemId, ListKey};
use crate::purchase::PurchaseOutcome;
use crate::push::DeepLink;

use super::model::{
    AppCmd, AppModel, AppMsg, PageResult, Reaction, Session, Target, ToastLevel,
};
use super::validation;

const MESSAGE_LISTS: [ListKey; 2] = [ListKey::Feed, ListKey::Saved];

/// Apply a message to the model and return the next command for the runtime.
pub fn update(model: &mut AppModel, msg: AppMsg) -> AppCmd {
    match msg {
        // ── session ──
        AppMsg::Started {
            username,
            token_balance,
            has_onboarded,
        } => match username {
            Some(username) => {
                model.session = Session::SignedIn {
                    username,
                    token_balance,
                };
                enter_tab(model, ListKey::Feed)
            }
            None if !has_onboarded => install_root(model, Route::Onboarding),
            None => install_root(model, Route::SignIn),
        },

        AppMsg::CompleteOnboarding => {
            if root_route(model) != Some(&Route::Onboarding) {
                return AppCmd::None;
            }
            AppCmd::batch(vec![AppCmd::MarkOnboarded, install_root(model, Route::SignIn)])
        }

        AppMsg::ShowSignUp => {
            let Some(root) = model.root else {
                return AppCmd::None;
            };
            if root_route(model) != Some(&Route::SignIn)
                || model.arena.child_with_route(root, &Route::SignUp).is_some()
            {
                return AppCmd::None;
            }
            match open_child(model, root, Route::SignUp) {
                Ok((_, cmd)) => cmd,
                Err(err) => log_error(&err),
            }
        }

        AppMsg::SignIn { username, password } => {
            let username = username.trim().to_string();
            let mut missing = Vec::new();
            if username.is_empty() {
                missing.push(validation::required("username"));
            }
            if password.is_empty() {
                missing.push(validation::required("password"));
            }
            if !missing.is_empty() {
                model.form_errors = missing;
                return AppCmd::None;
            }
            model.form_errors.clear();
            AppCmd::SignIn { username, password }
        }

        AppMsg::SignUp(request) => {
            model.form_errors = validation::check_sign_up(&request);
            if !model.form_errors.is_empty() {
                return AppCmd::None;
            }
            AppCmd::SignUp(request)
        }

        AppMsg::AuthDone(Ok(session)) => {
            model.clear_lists();
            model.details.clear();
            model.session = Session::SignedIn {
                username: session.username,
                token_balance: session.token_balance,
            };
            enter_tab(model, ListKey::Feed)
        }

        AppMsg::AuthDone(Err(err)) => {
            model.form_errors = err.field_errors().to_vec();
            model.push_toast(ToastLevel::Error, err.user_message());
            action_failed("auth", &err)
        }

        AppMsg::SignOut => {
            model.clear_lists();
            model.details.clear();
            model.session = Session::SignedOut;
            model.active_tab = ListKey::Feed;
            let root = install_root(model, Route::SignIn);
            AppCmd::batch(vec![AppCmd::ClearCredentials, root])
        }

        // ── lists ──
        AppMsg::SelectTab(list) => {
            if !model.is_signed_in() || root_route(model) == Some(&Route::for_list(list)) {
                return AppCmd::None;
            }
            enter_tab(model, list)
        }

        AppMsg::Refresh(list) => refresh(model, list),

        AppMsg::Scrolled {
            list,
            visible_index,
        } => {
            let ticket = match list {
                ListKey::Feed => model.feed.prefetch(visible_index),
                ListKey::Saved => model.saved.prefetch(visible_index),
                ListKey::HelpfulPeople => model.people.prefetch(visible_index),
                ListKey::Notifications => model.notifications.prefetch(visible_index),
            };
            ticket.map_or(AppCmd::None, |ticket| fetch_cmd(list, ticket))
        }

        AppMsg::PageLoaded {
            list,
            ticket,
            result,
            duration_ms,
        } => {
            let report = match (list, result) {
                (ListKey::Feed, PageResult::Messages(result)) => {
                    summarize(model.feed.complete(&ticket, result))
                }
                (ListKey::Saved, PageResult::Messages(result)) => {
                    summarize(model.saved.complete(&ticket, result))
                }
                (ListKey::HelpfulPeople, PageResult::People(result)) => {
                    summarize(model.people.complete(&ticket, result))
                }
                (ListKey::Notifications, PageResult::Notifications(result)) => {
                    summarize(model.notifications.complete(&ticket, result))
                }
                _ => None,
            };
            match report {
                None => AppCmd::None,
                Some(Ok(items)) => AppCmd::Log(ActivityEvent::PageFetchCompleted {
                    list: list.label().to_string(),
                    items: u64::try_from(items).unwrap_or(u64::MAX),
                    total: model.total_count(list),
                    duration_ms,
                }),
                Some(Err(message)) => {
                    // Empty lists show the load-failed placeholder instead.
                    if model.item_count(list) > 0 {
                        model.push_toast(ToastLevel::Error, message.clone());
                    }
                    AppCmd::Log(ActivityEvent::PageFetchFailed {
                        list: list.label().to_string(),
                        message,
                    })
                }
            }
        }

        // ── message detail ──
        AppMsg::OpenMessage { list, index } => {
            let Some((_, message, context)) = resolve(model, Target::Row { list, index }) else {
                return AppCmd::None;
            };
            open_detail(model, None, context, message.item_id(), Some(message))
        }

        AppMsg::PushOpened(DeepLink::MessageDetail(id)) => {
            if !model.is_signed_in() {
                return AppCmd::None;
            }
            open_detail(model, None, None, id, None)
        }

        AppMsg::MessageLoaded {
            coordinator,
            result,
        } => {
            if !model.arena.contains(coordinator) {
                return AppCmd::None;
            }
            match result {
                Ok(message) => {
                    model.details.insert(coordinator, message.clone());
                    apply_message(model, &message, None);
                    AppCmd::None
                }
                Err(err) => fail_flow(model, coordinator, "load_message", &err),
            }
        }

        // ── reactions ──
        AppMsg::React { target, reaction } => {
            let Some((origin, message, _)) = resolve(model, target) else {
                return AppCmd::None;
            };
            let on = match reaction {
                Reaction::Love => !message.is_loved,
                Reaction::Save => !message.is_saved,
            };
            AppCmd::React {
                origin,
                reaction,
                id: message.item_id(),
                on,
            }
        }

        AppMsg::ReactionDone {
            origin,
            id,
            reaction,
            on,
            result,
        } => match result {
            Ok(()) => {
                let detail = origin.filter(|detail| model.arena.contains(*detail));
                let delivered = detail.and_then(|detail| {
                    let event = match reaction {
                        Reaction::Love => NavigationEvent::Loved { id: id.clone(), on },
                        Reaction::Save => NavigationEvent::Saved { id: id.clone(), on },
                    };
                    model.arena.emit(detail, event).ok()
                });
                match delivered {
                    Some(delivery) => deliver(model, delivery),
                    None => {
                        apply_reaction(model, &id, reaction, on);
                        AppCmd::None
                    }
                }
            }
            Err(err) => {
                model.push_toast(ToastLevel::Error, err.user_message());
                action_failed(reaction.label(), &err)
            }
        },

        // ── appreciate ──
        AppMsg::StartAppreciate(target) => {
            let Some((origin, message, context)) = resolve(model, target) else {
                return AppCmd::None;
            };
            if message.is_appreciated {
                model.push_toast(ToastLevel::Info, "You already appreciated this message.");
                return AppCmd::None;
            }
            start_flow(
                model,
                origin,
                context,
                Route::Appreciate {
                    id: message.item_id(),
                },
            )
            .1
        }

        AppMsg::ConfirmAppreciate => match model.nav.top() {
            Some(StackEntry {
                owner,
                route: Route::Appreciate { id },
                ..
            }) => AppCmd::Appreciate {
                coordinator: *owner,
                id: id.clone(),
            },
            _ => AppCmd::None,
        },

        AppMsg::AppreciateDone {
            coordinator,
            result,
        } => {
            if !model.arena.contains(coordinator) {
                return AppCmd::None;
            }
            match result {
                Ok(receipt) => {
                    set_balance(model, receipt.token_balance);
                    finish(
                        model,
                        coordinator,
                        NavigationEvent::Appreciated(receipt.message),
                    )
                }
                Err(err) => fail_flow(model, coordinator, "appreciate", &err),
            }
        }

        // ── delete ──
        AppMsg::RequestDelete(target) => {
            let Some((origin, message, context)) = resolve(model, target) else {
                return AppCmd::None;
            };
            let owned = matches!(
                &model.session,
                Session::SignedIn { username, .. } if *username == message.author.username
            );
            if !owned {
                model.push_toast(ToastLevel::Error, "You can only delete your own messages.");
                return AppCmd::None;
            }
            start_flow(
                model,
                origin,
                context,
                Route::ConfirmDelete {
                    id: message.item_id(),
                },
            )
            .1
        }

        AppMsg::ConfirmDelete => match model.nav.top() {
            Some(StackEntry {
                owner,
                route: Route::ConfirmDelete { id },
                ..
            }) => AppCmd::DeleteMessage {
                coordinator: *owner,
                id: id.clone(),
            },
            _ => AppCmd::None,
        },

        AppMsg::DeleteDone {
            coordinator,
            id,
            result,
        } => {
            if !model.arena.contains(coordinator) {
                return AppCmd::None;
            }
            match result {
                Ok(()) => finish(model, coordinator, NavigationEvent::MessageDeleted(id)),
                Err(err) => fail_flow(model, coordinator, "delete", &err),
            }
        }

        // ── compose ──
        AppMsg::OpenCompose => {
            if model.nav.contains(&Route::Compose) {
                return AppCmd::None;
            }
            start_flow(model, None, None, Route::Compose).1
        }

        AppMsg::SubmitPost(body) => {
            let Some(owner) = top_owner_if(model, |route| *route == Route::Compose) else {
                return AppCmd::None;
            };
            model.form_errors = validation::check_post(&body);
            if !model.form_errors.is_empty() {
                return AppCmd::None;
            }
            AppCmd::PostMessage {
                coordinator: owner,
                body: body.trim().to_string(),
            }
        }

        AppMsg::PostDone {
            coordinator,
            result,
        } => {
            if !model.arena.contains(coordinator) {
                return AppCmd::None;
            }
            match result {
                Ok(message) => finish(model, coordinator, NavigationEvent::MessagePosted(message)),
                Err(err) => fail_flow(model, coordinator, "post", &err),
            }
        }

        // ── profile ──
        AppMsg::OpenProfile => {
            if model.nav.contains(&Route::Profile) {
                return AppCmd::None;
            }
            start_flow(model, None, None, Route::Profile).1
        }

        AppMsg::SubmitProfile(update) => {
            match top_owner_if(model, |route| *route == Route::Profile) {
                Some(owner) => AppCmd::UpdateProfile {
                    coordinator: owner,
                    update,
                },
                None => AppCmd::None,
            }
        }

        AppMsg::ProfileDone {
            coordinator,
            result,
        } => {
            if !model.arena.contains(coordinator) {
                return AppCmd::None;
            }
            match result {
                Ok(person) => finish(model, coordinator, NavigationEvent::ProfileUpdated(person)),
                Err(err) => fail_flow(model, coordinator, "update_profile", &err),
            }
        }

        // ── tokens ──
        AppMsg::OpenTokens => {
            if model.nav.contains(&Route::Tokens) {
                return AppCmd::None;
            }
            start_flow(model, None, None, Route::Tokens).1
        }

        AppMsg::BuyTokens(product_id) => {
            match top_owner_if(model, |route| *route == Route::Tokens) {
                Some(_) => AppCmd::BeginPurchase { product_id },
                None => AppCmd::None,
            }
        }

        AppMsg::PurchaseFinished {
            product_id,
            outcome,
            balance,
        } => {
            let logged = AppCmd::Log(ActivityEvent::PurchaseCompleted {
                product_id,
                outcome: outcome.to_string(),
                ok: matches!(outcome, PurchaseOutcome::Success { .. }),
            });
            let screen = model
                .root
                .and_then(|root| model.arena.child_with_route(root, &Route::Tokens));
            let follow = match outcome {
                PurchaseOutcome::Success { tokens, .. } => {
                    let balance =
                        balance.unwrap_or_else(|| model.token_balance().saturating_add(tokens));
                    set_balance(model, balance);
                    let event = NavigationEvent::TokensPurchased {
                        amount: tokens,
                        balance,
                    };
                    match screen {
                        Some(screen) => finish(model, screen, event),
                        None => {
                            model.push_toast(ToastLevel::Info, format!("Added {tokens} tokens."));
                            AppCmd::None
                        }
                    }
                }
                PurchaseOutcome::Cancelled => {
                    model.push_toast(ToastLevel::Info, "Purchase cancelled.");
                    AppCmd::None
                }
                PurchaseOutcome::Failed(reason) => {
                    model.push_toast(ToastLevel::Error, format!("Purchase failed: {reason}"));
                    AppCmd::None
                }
            };
            AppCmd::batch(vec![logged, follow])
        }

        // ── global ──
        AppMsg::Back => {
            let Some(owner) = model.top_owner() else {
                return AppCmd::None;
            };
            if model.arena.parent(owner).is_none() {
                return AppCmd::None;
            }
            finish(model, owner, NavigationEvent::Cancelled)
        }

        AppMsg::SetTheme(theme) => {
            model.theme = theme;
            AppCmd::PersistTheme(theme)
        }

        AppMsg::DismissToast(id) => {
            model.toasts.retain(|toast| toast.id != id);
            AppCmd::None
        }

        AppMsg::Quit => {
            model.quit = true;
            AppCmd::Quit
        }
    }
}

// ──────────────────── navigation helpers ────────────────────

fn root_route(model: &AppModel) -> Option<&Route> {
    model.root.and_then(|root| model.arena.route(root))
}

fn top_owner_if(model: &AppModel, pred: impl Fn(&Route) -> bool) -> Option<CoordinatorId> {
    model
        .nav
        .top()
        .filter(|entry| pred(&entry.route))
        .map(|entry| entry.owner)
}

/// Replace the root flow, tearing down everything under the old one.
fn install_root(model: &mut AppModel, route: Route) -> AppCmd {
    if let Some(old) = model.root.take() {
        for id in model.arena.teardown(old, &mut model.nav) {
            model.details.remove(&id);
        }
    }
    model.form_errors.clear();
    let root = model.arena.create_root(route.clone());
    model.root = Some(root);
    match model.arena.start(root, &mut model.nav) {
        Ok(()) => started(root, &route),
        Err(err) => log_error(&err),
    }
}

fn enter_tab(model: &mut AppModel, list: ListKey) -> AppCmd {
    model.active_tab = list;
    let root = install_root(model, Route::for_list(list));
    if model.item_count(list) > 0 {
        return root;
    }
    let ticket = match list {
        ListKey::Feed => model.feed.fetch(false),
        ListKey::Saved => model.saved.fetch(false),
        ListKey::HelpfulPeople => model.people.fetch(false),
        ListKey::Notifications => model.notifications.fetch(false),
    };
    let fetch = ticket.map_or(AppCmd::None, |ticket| fetch_cmd(list, ticket));
    AppCmd::batch(vec![root, fetch])
}

fn open_child(
    model: &mut AppModel,
    parent: CoordinatorId,
    route: Route,
) -> crate::core::errors::Result<(CoordinatorId, AppCmd)> {
    let child = model.arena.add_child(parent, route.clone())?;
    model.arena.start(child, &mut model.nav)?;
    model.form_errors.clear();
    Ok((child, started(child, &route)))
}

/// Start a child flow under `origin` (or the root), remembering the row it
/// was started from.
fn start_flow(
    model: &mut AppModel,
    origin: Option<CoordinatorId>,
    context: Option<RowContext>,
    route: Route,
) -> (Option<CoordinatorId>, AppCmd) {
    let Some(parent) = origin.or(model.root) else {
        return (None, AppCmd::None);
    };
    if let Some(context) = context
        && let Err(err) = model.arena.set_active_context(parent, context)
    {
        return (None, log_error(&err));
    }
    match open_child(model, parent, route) {
        Ok((child, cmd)) => (Some(child), cmd),
        Err(err) => {
            // No child will finish, so nothing would consume the context.
            model.arena.clear_active_context(parent);
            (None, log_error(&err))
        }
    }
}

fn open_detail(
    model: &mut AppModel,
    origin: Option<CoordinatorId>,
    context: Option<RowContext>,
    id: ItemId,
    known: Option<Message>,
) -> AppCmd {
    let (child, cmd) = start_flow(model, origin, context, Route::MessageDetail { id: id.clone() });
    let Some(child) = child else {
        return cmd;
    };
    if let Some(message) = known {
        model.details.insert(child, message);
    }
    AppCmd::batch(vec![
        cmd,
        AppCmd::FetchMessage {
            coordinator: child,
            id,
        },
    ])
}

/// End a child flow and route its event to the parent.
fn finish(model: &mut AppModel, child: CoordinatorId, event: NavigationEvent) -> AppCmd {
    let route = model
        .arena
        .route(child)
        .map(ToString::to_string)
        .unwrap_or_default();
    let outcome = event.label();
    match model.arena.finish_child(child, event, &mut model.nav) {
        Ok(delivery) => {
            model.details.retain(|id, _| model.arena.contains(*id));
            model.form_errors.clear();
            let logged = AppCmd::Log(ActivityEvent::CoordinatorFinished {
                coordinator: child.to_string(),
                route,
                outcome: outcome.to_string(),
            });
            AppCmd::batch(vec![logged, deliver(model, delivery)])
        }
        Err(err) => log_error(&err),
    }
}

/// Report a failed child action. Validation failures keep the form open.
fn fail_flow<E: UserFacing + Display>(
    model: &mut AppModel,
    coordinator: CoordinatorId,
    action: &str,
    err: &E,
) -> AppCmd {
    let failure = FlowFailure::from_error(err);
    let logged = action_failed(action, err);
    let follow = if failure.field_errors.is_empty() {
        finish(model, coordinator, NavigationEvent::Failed(failure))
    } else {
        match model.arena.emit(coordinator, NavigationEvent::Failed(failure)) {
            Ok(delivery) => deliver(model, delivery),
            Err(err) => log_error(&err),
        }
    };
    AppCmd::batch(vec![logged, follow])
}

/// The parent side of every child → parent event.
fn deliver(model: &mut AppModel, delivery: Delivery) -> AppCmd {
    let Delivery {
        parent,
        context,
        event,
        ..
    } = delivery;
    match event {
        NavigationEvent::Appreciated(message) => {
            apply_message(model, &message, context.as_ref());
            AppCmd::None
        }
        NavigationEvent::Loved { id, on } => {
            apply_reaction(model, &id, Reaction::Love, on);
            AppCmd::None
        }
        NavigationEvent::Saved { id, on } => {
            apply_reaction(model, &id, Reaction::Save, on);
            AppCmd::None
        }
        NavigationEvent::MessageDeleted(id) => {
            // A detail screen showing the deleted message closes as well.
            let detail_of_deleted =
                model.arena.route(parent) == Some(&Route::MessageDetail { id: id.clone() });
            if detail_of_deleted && model.arena.parent(parent).is_some() {
                return finish(model, parent, NavigationEvent::MessageDeleted(id));
            }
            for list in MESSAGE_LISTS {
                if let Some(vm) = model.message_list_mut(list) {
                    vm.data_mut().remove_by_id(&id);
                }
            }
            model.push_toast(ToastLevel::Info, "Message deleted.");
            AppCmd::None
        }
        NavigationEvent::MessagePosted(_) => {
            model.push_toast(ToastLevel::Info, "Message posted.");
            refresh(model, ListKey::Feed)
        }
        NavigationEvent::ProfileUpdated(person) => {
            if let Session::SignedIn { username, .. } = &mut model.session {
                *username = person.username;
            }
            model.push_toast(ToastLevel::Info, "Profile updated.");
            AppCmd::None
        }
        NavigationEvent::TokensPurchased { amount, balance } => {
            set_balance(model, balance);
            model.push_toast(ToastLevel::Info, format!("Added {amount} tokens."));
            AppCmd::None
        }
        NavigationEvent::Failed(failure) => {
            model.form_errors = failure.field_errors;
            model.push_toast(ToastLevel::Error, failure.message);
            AppCmd::None
        }
        NavigationEvent::Cancelled => AppCmd::None,
    }
}

// ──────────────────── list helpers ────────────────────

/// Message a row action targets, plus where it came from.
fn resolve(
    model: &AppModel,
    target: Target,
) -> Option<(Option<CoordinatorId>, Message, Option<RowContext>)> {
    match target {
        Target::Row { list, index } => {
            let message = model.message_list(list)?.data().get(index)?.clone();
            let context = RowContext {
                list,
                item: message.item_id(),
                row_hint: index,
            };
            Some((None, message, Some(context)))
        }
        Target::Detail => model
            .top_detail()
            .map(|(owner, message)| (Some(owner), message.clone(), None)),
    }
}

/// Write an updated message into every list and detail showing it.
fn apply_message(model: &mut AppModel, message: &Message, context: Option<&RowContext>) {
    let id = message.item_id();
    let hinted = context.and_then(|ctx| {
        let vm = model.message_list_mut(ctx.list)?;
        let at_hint = vm
            .data()
            .get(ctx.row_hint)
            .is_some_and(|row| row.item_id() == id);
        (at_hint && vm.data_mut().update_at(ctx.row_hint, message.clone())).then_some(ctx.list)
    });
    for list in MESSAGE_LISTS {
        if hinted == Some(list) {
            continue;
        }
        if let Some(vm) = model.message_list_mut(list) {
            vm.data_mut().update_by_id(message.clone());
        }
    }
    if !message.is_saved {
        model.saved.data_mut().remove_by_id(&id);
    }
    for shown in model.details.values_mut() {
        if shown.id == message.id {
            *shown = message.clone();
        }
    }
}

/// Flip one reaction on every copy of a message. Each copy keeps the rest of
/// its current state, so reactions finishing out of order do not undo each
/// other.
fn apply_reaction(model: &mut AppModel, id: &ItemId, reaction: Reaction, on: bool) {
    let react = |message: &Message| match reaction {
        Reaction::Love => message.with_loved(on),
        Reaction::Save => message.with_saved(on),
    };
    for list in MESSAGE_LISTS {
        let Some(vm) = model.message_list_mut(list) else {
            continue;
        };
        let Some(index) = vm.data().position_of(id) else {
            continue;
        };
        if let Some(next) = vm.data().get(index).map(react) {
            vm.data_mut().update_at(index, next);
        }
    }
    if reaction == Reaction::Save && !on {
        model.saved.data_mut().remove_by_id(id);
    }
    for shown in model.details.values_mut() {
        if shown.item_id() == *id {
            *shown = react(shown);
        }
    }
}

fn refresh(model: &mut AppModel, list: ListKey) -> AppCmd {
    model.arena.clear_contexts_for(list);
    let ticket = match list {
        ListKey::Feed => model.feed.fetch(true),
        ListKey::Saved => model.saved.fetch(true),
        ListKey::HelpfulPeople => model.people.fetch(true),
        ListKey::Notifications => model.notifications.fetch(true),
    };
    ticket.map_or(AppCmd::None, |ticket| fetch_cmd(list, ticket))
}

fn fetch_cmd(list: ListKey, ticket: FetchTicket) -> AppCmd {
    AppCmd::Batch(vec![
        AppCmd::Log(ActivityEvent::PageFetchStarted {
            list: list.label().to_string(),
            from_start: ticket.from_start,
        }),
        AppCmd::FetchPage { list, ticket },
    ])
}

/// Items applied, the failure copy, or `None` for a discarded completion.
fn summarize<E: UserFacing>(outcome: FetchOutcome<E>) -> Option<Result<usize, String>> {
    match outcome {
        FetchOutcome::Replaced { count } => Some(Ok(count)),
        FetchOutcome::Appended(range) => Some(Ok(range.len())),
        FetchOutcome::Failed(err) => Some(Err(err.user_message())),
        FetchOutcome::Discarded => None,
    }
}

// ──────────────────── misc ────────────────────

fn set_balance(model: &mut AppModel, balance: u64) {
    if let Session::SignedIn { token_balance, .. } = &mut model.session {
        *token_balance = balance;
    }
}

fn started(id: CoordinatorId, route: &Route) -> AppCmd {
    AppCmd::Log(ActivityEvent::CoordinatorStarted {
        coordinator: id.to_string(),
        route: route.to_string(),
    })
}

fn action_failed(action: &str, err: &impl Display) -> AppCmd {
    AppCmd::Log(ActivityEvent::ActionFailed {
        action: action.to_string(),
        message: err.to_string(),
    })
}

fn log_error(err: &NightlightError) -> AppCmd {
    AppCmd::Log(ActivityEvent::from_error(err))
}
