//! Pure Yew view components for the user explorer.
//!
//! This module contains stateless components that render based on props.

use pengguna_explorer::explorer::Notice;
use pengguna_explorer::fetch::Origin;
use pengguna_explorer::timing::TimingBoard;
use pengguna_explorer::utils::{describe_age, join_pages, user_label};
use pengguna_explorer::{LoadError, Strategy, User};
use std::rc::Rc;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct UserListProps {
    pub users: Rc<Vec<User>>,
}

/// Renders the merged user collection.
#[function_component(UserList)]
pub fn user_list(props: &UserListProps) -> Html {
    if props.users.is_empty() {
        return html! {
            <p class="no-results-message">{ "Belum ada pengguna untuk ditampilkan" }</p>
        };
    }

    html! {
        <ul class="user-list">
            { props.users.iter().map(render_user).collect::<Html>() }
        </ul>
    }
}

fn render_user(user: &User) -> Html {
    let age = user
        .age()
        .map(|a| format!(" ({} tahun)", a))
        .unwrap_or_default();
    html! {
        <li>{ format!("{}{}", user_label(user), age) }</li>
    }
}

#[derive(Properties, PartialEq)]
pub struct StrategyBarProps {
    pub active: Strategy,
    pub disabled: bool,
    pub on_select: Callback<Strategy>,
    pub on_refresh: Callback<()>,
}

/// The four buttons: two strategy selectors, the one-shot worker run and
/// refresh.
#[function_component(StrategyBar)]
pub fn strategy_bar(props: &StrategyBarProps) -> Html {
    let button = |strategy: Strategy, label: &'static str| {
        let on_select = props.on_select.clone();
        let class = if props.active == strategy { "active" } else { "" };
        html! {
            <button {class} onclick={Callback::from(move |_| on_select.emit(strategy))}>
                { label }
            </button>
        }
    };
    let on_refresh = props.on_refresh.clone();

    html! {
        <div class="strategy-bar">
            { button(Strategy::All, "Gunakan Promise.all") }
            { button(Strategy::AllSettled, "Gunakan Promise.allSettled") }
            { button(Strategy::Worker, "Gunakan Web Worker") }
            <button disabled={props.disabled} onclick={Callback::from(move |_| on_refresh.emit(()))}>
                { "Segarkan Data" }
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TimingPanelProps {
    pub timings: TimingBoard,
}

#[function_component(TimingPanel)]
pub fn timing_panel(props: &TimingPanelProps) -> Html {
    let row = |strategy: Strategy, label: &str| {
        html! {
            <p>{ format!("Waktu {}: {} ms", label, props.timings.get(strategy).unwrap_or("-")) }</p>
        }
    };
    html! {
        <div class="timings">
            { row(Strategy::All, "Promise.all") }
            { row(Strategy::AllSettled, "Promise.allSettled") }
            { row(Strategy::Worker, "Web Worker") }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusLineProps {
    pub notice: Notice,
}

/// Where the list came from, which pages are missing, or why loading failed.
#[function_component(StatusLine)]
pub fn status_line(props: &StatusLineProps) -> Html {
    match &props.notice {
        Notice::None => html! {},
        Notice::Loaded(outcome) => {
            let text = match &outcome.origin {
                Origin::Cache {
                    age_ms,
                    populated_by: Some(by),
                } => format!(
                    "{} pengguna dari cache ({} lalu, via {})",
                    outcome.users.len(),
                    describe_age(*age_ms),
                    by
                ),
                Origin::Cache { age_ms, .. } => format!(
                    "{} pengguna dari cache ({} lalu)",
                    outcome.users.len(),
                    describe_age(*age_ms)
                ),
                Origin::Network { dropped_pages, .. } if !dropped_pages.is_empty() => format!(
                    "{} pengguna via {}; halaman {} gagal dimuat dan tidak disimpan di cache",
                    outcome.users.len(),
                    outcome.strategy,
                    join_pages(dropped_pages)
                ),
                Origin::Network { .. } => {
                    format!("{} pengguna via {}", outcome.users.len(), outcome.strategy)
                }
            };
            let class = match &outcome.origin {
                Origin::Network { dropped_pages, .. } if !dropped_pages.is_empty() => "status partial",
                _ => "status",
            };
            html! { <p {class}>{ text }</p> }
        }
        Notice::Failed(error) => html! {
            <p class="status error">{ format!("Gagal mengambil data: {}", describe_error(error)) }</p>
        },
    }
}

fn describe_error(error: &LoadError) -> String {
    match error {
        LoadError::Page { page, source } => format!("halaman {} ({})", page, source),
        LoadError::NoPages { attempted } => format!("semua {} halaman gagal", attempted),
        LoadError::Offload(source) => format!("web worker ({})", source),
    }
}
