use crate::models::{Toast, ToastKind};
use gloo::timers::callback::Timeout;
use yew::prelude::*;

const TOAST_TTL_MS: u32 = 4000;

#[derive(Properties, PartialEq)]
pub(crate) struct ToastHostProps {
    pub toasts: Vec<Toast>,
    pub on_dismiss: Callback<u64>,
    #[prop_or_default]
    pub class: Classes,
}

#[function_component(ToastHost)]
pub(crate) fn toast_host(props: &ToastHostProps) -> Html {
    {
        let toasts = props.toasts.clone();
        let on_dismiss = props.on_dismiss.clone();
        use_effect_with_deps(
            move |list: &Vec<Toast>| {
                let handles: Vec<Timeout> = list
                    .iter()
                    .map(|toast| {
                        let on_dismiss = on_dismiss.clone();
                        let id = toast.id;
                        Timeout::new(TOAST_TTL_MS, move || on_dismiss.emit(id))
                    })
                    .collect();
                move || drop(handles)
            },
            toasts,
        );
    }

    html! {
        <div class={classes!("toast-host", props.class.clone())} aria-live="polite" aria-atomic="true">
            {for props.toasts.iter().map(|toast| render_toast(toast, &props.on_dismiss))}
        </div>
    }
}

fn render_toast(toast: &Toast, on_dismiss: &Callback<u64>) -> Html {
    let class = match toast.kind {
        ToastKind::Info => "info",
        ToastKind::Success => "success",
        ToastKind::Error => "error",
    };
    let role = if toast.kind == ToastKind::Error {
        "alert"
    } else {
        "status"
    };
    let id = toast.id;
    let on_close = {
        let on_dismiss = on_dismiss.clone();
        Callback::from(move |_: MouseEvent| on_dismiss.emit(id))
    };

    html! {
        <div class={classes!("toast", class)} {role}>
            <span>{toast.message.clone()}</span>
            <button class="ghost" aria-label="Dismiss notification" onclick={on_close}>{"✕"}</button>
        </div>
    }
}
