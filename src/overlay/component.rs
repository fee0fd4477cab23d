/// Yew components for the warning overlay

use super::WarningView;
use yew::prelude::*;

const OVERLAY_STYLE: &str = "position: fixed; inset: 0; z-index: 2147483647; display: flex; align-items: center; justify-content: center; background-color: rgba(183, 28, 28, 0.96); font-family: system-ui, sans-serif; color: white;";
const PANEL_STYLE: &str = "max-width: 560px; padding: 32px; border-radius: 8px; background-color: #b71c1c; box-shadow: 0 8px 32px rgba(0, 0, 0, 0.4);";

#[derive(Properties, PartialEq)]
pub struct ButtonProps {
    pub onclick: Callback<MouseEvent>,
    pub children: Children,
    #[prop_or_default]
    pub variant: ButtonVariant,
}

#[derive(PartialEq, Clone, Default)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
}

#[function_component(Button)]
pub fn button(props: &ButtonProps) -> Html {
    let base_style = "padding: 10px 20px; border: none; border-radius: 4px; font-size: 14px; cursor: pointer; font-weight: 500; margin-right: 12px;";

    let variant_style = match props.variant {
        ButtonVariant::Primary => "background-color: white; color: #b71c1c;",
        ButtonVariant::Secondary => "background-color: transparent; color: white; border: 1px solid white;",
    };

    html! {
        <button onclick={props.onclick.clone()} style={format!("{} {}", base_style, variant_style)}>
            {props.children.clone()}
        </button>
    }
}

#[derive(Properties, PartialEq)]
pub struct WarningOverlayProps {
    pub view: WarningView,
    pub on_leave: Callback<()>,
    pub on_proceed: Callback<()>,
}

#[function_component(WarningOverlay)]
pub fn warning_overlay(props: &WarningOverlayProps) -> Html {
    let on_leave = props.on_leave.reform(|_: MouseEvent| ());
    let on_proceed = props.on_proceed.reform(|_: MouseEvent| ());

    html! {
        <div style={OVERLAY_STYLE} role="alertdialog">
            <div style={PANEL_STYLE}>
                <h1 style="margin: 0 0 12px; font-size: 26px;">{"Warning: suspected phishing site"}</h1>
                <p style="margin: 0 0 8px; word-break: break-all; opacity: 0.85;">{&props.view.url}</p>
                <p style="margin: 0 0 16px; font-size: 18px;">
                    {"Confidence: "}<strong>{&props.view.confidence_text}</strong>
                </p>
                <ul style="margin: 0 0 24px; padding-left: 20px;">
                    {for props.view.reasons.iter().map(|reason| html! {
                        <li>{reason}</li>
                    })}
                </ul>
                <Button onclick={on_leave} variant={ButtonVariant::Primary}>
                    {"Leave site"}
                </Button>
                <Button onclick={on_proceed} variant={ButtonVariant::Secondary}>
                    {"Proceed anyway"}
                </Button>
            </div>
        </div>
    }
}
