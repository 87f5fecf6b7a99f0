//! Main module for the user explorer using Yew.
//! Wires the loader hook to the view components.

use pengguna_explorer::config::LOG_LEVEL;
use yew::prelude::*;

mod components;
mod hooks;

use components::{StatusLine, StrategyBar, TimingPanel, UserList};
use hooks::use_user_explorer;

/// Primary application component.
#[function_component]
pub fn App() -> Html {
    let explorer = use_user_explorer();

    html! {
        <div class="container" style="padding: 20px">
            <h1>{ "Eksplorasi Pengguna (Umur > 30)" }</h1>
            if explorer.loading {
                <p class="loading">{ "Sedang memuat..." }</p>
            } else {
                <UserList users={explorer.users.clone()} />
            }
            <StatusLine notice={explorer.notice.clone()} />
            <StrategyBar
                active={explorer.strategy}
                disabled={explorer.loading}
                on_select={explorer.select.clone()}
                on_refresh={explorer.refresh.clone()}
            />
            <TimingPanel timings={explorer.timings.clone()} />
        </div>
    }
}

/// Entry point: installs logging and renders the App component.
fn main() {
    pengguna_explorer::logging::init(LOG_LEVEL);
    yew::Renderer::<App>::new().render();
}
