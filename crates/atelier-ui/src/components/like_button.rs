//! Heart button with optimistic like toggling.
//!
//! # Design
//! - The count prop only seeds the store; after that the store owns the number.
//! - While a toggle is in flight the button is disabled and clicks are ignored by the reducer.
//! - Failures roll back in the store and surface as a toast; auth failures redirect to login.

use crate::app::{ApiCtx, Notifier, redirect_to_login};
use crate::core::logic::{like_action_label, like_count_label};
use crate::core::store::{AppStore, begin_like, hydrate_like, select_like, settle_like, track_like};
use atelier_core::LikesApi;
use gloo::console;
use yew::prelude::*;
use yewdux::prelude::{Dispatch, use_selector};

#[derive(Properties, PartialEq)]
pub(crate) struct LikeButtonProps {
    pub design_id: AttrValue,
    /// Public like count from the design listing.
    pub initial_count: u64,
}

#[function_component(LikeButton)]
pub(crate) fn like_button(props: &LikeButtonProps) -> Html {
    let dispatch = Dispatch::<AppStore>::new();
    let api = use_context::<ApiCtx>();
    let notifier = use_context::<Notifier>();
    let view = {
        let design = props.design_id.to_string();
        use_selector(move |store: &AppStore| select_like(store, &design))
    };
    let signed_in = use_selector(|store: &AppStore| store.auth.signed_in());

    {
        let dispatch = dispatch.clone();
        let api = api.clone();
        use_effect_with_deps(
            move |(design, count, signed_in): &(AttrValue, u64, bool)| {
                let design = design.to_string();
                let count = *count;
                dispatch.reduce_mut(|store| track_like(store, &design, count));
                match (*signed_in, api) {
                    (true, Some(api)) => {
                        let client = api.client.clone();
                        yew::platform::spawn_local(async move {
                            let liked = match client.check_like(&design).await {
                                Ok(check) => check.liked,
                                Err(err) => {
                                    console::warn!("like check failed", design.clone(), err.to_string());
                                    false
                                }
                            };
                            dispatch.reduce_mut(|store| {
                                hydrate_like(store, &design, liked);
                            });
                        });
                    }
                    _ => dispatch.reduce_mut(|store| {
                        hydrate_like(store, &design, false);
                    }),
                }
                || ()
            },
            (props.design_id.clone(), props.initial_count, *signed_in),
        );
    }

    let onclick = {
        let design = props.design_id.to_string();
        Callback::from(move |_: MouseEvent| {
            let Some(api) = api.clone() else {
                return;
            };
            let mut started = None;
            dispatch.reduce_mut(|store| started = Some(begin_like(store, &design)));
            match started {
                Some(Ok(Some(ticket))) => {
                    let client = api.client.clone();
                    let dispatch = dispatch.clone();
                    let notifier = notifier.clone();
                    let design = design.clone();
                    yew::platform::spawn_local(async move {
                        let result = client.toggle_like(&design).await;
                        dispatch.reduce_mut(|store| {
                            settle_like(store, &design, &ticket, &result);
                        });
                        if let (Err(err), Some(notifier)) = (result, notifier)
                            && !redirect_to_login(&err, &client.config().login_path)
                        {
                            notifier.error(err.notification());
                        }
                    });
                }
                Some(Err(err)) => {
                    redirect_to_login(&err, &api.client.config().login_path);
                }
                Some(Ok(None)) | None => {}
            }
        })
    };

    let snapshot = view.snapshot;
    html! {
        <button
            class={classes!("like-button", snapshot.liked.then_some("liked"))}
            aria-pressed={snapshot.liked.to_string()}
            aria-label={like_action_label(snapshot)}
            disabled={view.processing}
            {onclick}
        >
            <span class="icon" aria-hidden="true">{if snapshot.liked { "♥" } else { "♡" }}</span>
            <span class="count">{like_count_label(snapshot.count)}</span>
        </button>
    }
}
