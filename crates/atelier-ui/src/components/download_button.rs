use crate::app::{ApiCtx, redirect_to_login};
use crate::core::logic::design_path;
use crate::core::store::{AppStore, select_access};
use atelier_core::ActionError;
use yew::prelude::*;
use yewdux::prelude::use_selector;

#[derive(Properties, PartialEq)]
pub(crate) struct DownloadButtonProps {
    pub design_id: AttrValue,
    /// Fired when the viewer is entitled and clicks the button.
    pub on_download: Callback<AttrValue>,
}

/// Download control driven by the access evaluator.
#[function_component(DownloadButton)]
pub(crate) fn download_button(props: &DownloadButtonProps) -> Html {
    let api = use_context::<ApiCtx>();
    let decision = {
        let design = props.design_id.to_string();
        use_selector(move |store: &AppStore| select_access(store, &design))
    };
    let signed_in = *use_selector(|store: &AppStore| store.auth.signed_in());

    let Some(decision) = (*decision).clone() else {
        return html! {
            <button class="download-button" disabled={true}>{"Checking access…"}</button>
        };
    };

    let onclick = {
        let design = props.design_id.clone();
        let on_download = props.on_download.clone();
        let can_download = decision.can_download;
        Callback::from(move |_: MouseEvent| {
            if can_download {
                on_download.emit(design.clone());
            } else if !signed_in && let Some(api) = &api {
                let err = ActionError::auth_required(design_path(&design));
                redirect_to_login(&err, &api.client.config().login_path);
            }
        })
    };

    html! {
        <div class="download">
            <button
                class={classes!("download-button", decision.can_download.then_some("solid"))}
                disabled={signed_in && !decision.can_download}
                {onclick}
            >
                {decision.action_label(signed_in)}
            </button>
            <p class="muted">{decision.message.clone()}</p>
        </div>
    }
}
