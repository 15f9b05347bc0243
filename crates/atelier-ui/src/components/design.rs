use std::cell::Cell;
use std::rc::Rc;

use crate::app::{ApiCtx, Notifier};
use crate::components::download_button::DownloadButton;
use crate::components::like_button::LikeButton;
use atelier_api_models::DesignSummary;
use gloo::console;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct DesignPageProps {
    pub id: String,
}

#[derive(Clone, PartialEq)]
enum Load {
    Pending,
    Ready(DesignSummary),
    Failed(String),
}

/// Design detail page with like and download controls.
#[function_component(DesignPage)]
pub(crate) fn design_page(props: &DesignPageProps) -> Html {
    let api = use_context::<ApiCtx>();
    let notifier = use_context::<Notifier>();
    let load = use_state(|| Load::Pending);

    {
        let load = load.clone();
        use_effect_with_deps(
            move |id: &String| {
                let active = Rc::new(Cell::new(true));
                load.set(Load::Pending);
                if let Some(api) = api {
                    let client = api.client.clone();
                    let id = id.clone();
                    let active = active.clone();
                    yew::platform::spawn_local(async move {
                        let result = client.fetch_design(&id).await;
                        if !active.get() {
                            return;
                        }
                        match result {
                            Ok(summary) => load.set(Load::Ready(summary)),
                            Err(err) => {
                                console::warn!("design lookup failed", id, err.to_string());
                                load.set(Load::Failed(err.notification()));
                            }
                        }
                    });
                }
                move || active.set(false)
            },
            props.id.clone(),
        );
    }

    match &*load {
        Load::Pending => html! { <p class="muted">{"Loading design…"}</p> },
        Load::Failed(message) => html! {
            <div class="placeholder">
                <h2>{"Design unavailable"}</h2>
                <p class="muted">{message.clone()}</p>
            </div>
        },
        Load::Ready(summary) => {
            let on_download = {
                let title = summary.title.clone();
                Callback::from(move |_: AttrValue| {
                    if let Some(notifier) = &notifier {
                        notifier.success(format!("{title} is unlocked for download"));
                    }
                })
            };
            let design_id = AttrValue::from(props.id.clone());
            html! {
                <article class="design">
                    <h1>{summary.title.clone()}</h1>
                    {summary.description.as_ref().map_or_else(Html::default, |text| html! {
                        <p>{text.clone()}</p>
                    })}
                    {summary.price.map_or_else(Html::default, |price| html! {
                        <p class="price">{format!("${price:.2}")}</p>
                    })}
                    <div class="actions">
                        <LikeButton design_id={design_id.clone()} initial_count={summary.likes_count} />
                        <DownloadButton {design_id} {on_download} />
                    </div>
                </article>
            }
        }
    }
}
