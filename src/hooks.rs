use pengguna_explorer::explorer::{ExplorerState, LoadRequest, Notice};
use pengguna_explorer::{browser_loader, timing::TimingBoard, BrowserLoader, Strategy, User};
use std::cell::RefCell;
use std::rc::Rc;
use yew::prelude::*;

/// State and callbacks for the user explorer.
#[derive(Clone)]
pub struct UserExplorer {
    /// Last successfully loaded collection; kept when a later load fails.
    pub users: Rc<Vec<User>>,
    pub loading: bool,
    pub strategy: Strategy,
    pub timings: TimingBoard,
    pub notice: Notice,
    /// Pick `All`/`AllSettled`, or run the worker once.
    pub select: Callback<Strategy>,
    /// Drop the cache and load again with the selected strategy.
    pub refresh: Callback<()>,
}

/// Start `request` in the background and re-render when it lands.
fn dispatch(
    loader: Rc<BrowserLoader>,
    state: Rc<RefCell<ExplorerState>>,
    redraw: UseForceUpdateHandle,
    request: LoadRequest,
) {
    redraw.force_update();
    wasm_bindgen_futures::spawn_local(async move {
        let result = if request.refresh {
            loader.refresh(request.strategy).await
        } else {
            loader.load(request.strategy).await
        };
        if state.borrow_mut().finish(request.generation, result) {
            redraw.force_update();
        }
    });
}

/// Custom hook owning the loader and the explorer state it drives.
#[hook]
pub fn use_user_explorer() -> UserExplorer {
    let loader: Rc<BrowserLoader> = (*use_state(|| Rc::new(browser_loader()))).clone();
    let state = use_mut_ref(ExplorerState::new);
    let redraw = use_force_update();

    {
        let loader = loader.clone();
        let state = state.clone();
        let redraw = redraw.clone();
        use_effect_with((), move |_| {
            let request = state.borrow_mut().start();
            dispatch(loader, state, redraw, request);
            || ()
        });
    }

    let select = {
        let loader = loader.clone();
        let state = state.clone();
        let redraw = redraw.clone();
        Callback::from(move |next: Strategy| {
            let request = state.borrow_mut().select(next);
            if let Some(request) = request {
                dispatch(loader.clone(), state.clone(), redraw.clone(), request);
            }
        })
    };

    let refresh = {
        let loader = loader.clone();
        let state = state.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: ()| {
            let request = state.borrow_mut().refresh();
            dispatch(loader.clone(), state.clone(), redraw.clone(), request);
        })
    };

    let current = state.borrow();
    UserExplorer {
        users: current.users.clone(),
        loading: current.loading,
        strategy: current.selected,
        timings: loader.timings(),
        notice: current.notice.clone(),
        select,
        refresh,
    }
}
