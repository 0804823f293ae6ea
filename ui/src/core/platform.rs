//! Browser glue: the location fragment, page reloads and the download form.
//!
//! Native builds get inert fallbacks so the rest of the crate stays testable.

use super::query::DownloadForm;

/// Fragment of the current location without the leading `#`.
pub fn location_hash() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|window| window.location().hash().ok())
            .map(|hash| hash.trim_start_matches('#').to_string())
            .unwrap_or_default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        String::new()
    }
}

/// Replaces the fragment without adding a history entry.
pub fn replace_hash(fragment: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(window) = web_sys::window() else {
            return;
        };
        let target = format!("#{fragment}");
        let replaced = window.history().and_then(|history| {
            history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&target))
        });
        if replaced.is_err() {
            tracing::warn!("history.replaceState failed; falling back to location.hash");
            let _ = window.location().set_hash(fragment);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::debug!(fragment, "fragment update ignored off the web");
    }
}

/// Full reload; the only recovery from an expired session.
pub fn reload() {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.location().reload();
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::warn!("reload requested outside the browser");
    }
}

/// Scheme, host and port of the page, e.g. `https://ice.example.com`.
pub fn origin() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|window| window.location().origin().ok())
            .unwrap_or_default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        "http://localhost:8080".to_string()
    }
}

/// Builds a hidden form with one text input per field and submits it. The
/// file arrives out of band; nothing comes back to the caller.
pub fn submit_download_form(form: &DownloadForm) -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use web_sys::{HtmlFormElement, HtmlInputElement};

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or("Document unavailable")?;
        let body = document.body().ok_or("Document body missing")?;

        let element: HtmlFormElement = document
            .create_element("form")
            .map_err(|_| "Unable to create form")?
            .dyn_into()
            .map_err(|_| "Form cast failed")?;
        element.set_method("post");
        element.set_action(&form.action);
        let _ = element.set_attribute("style", "display:none");

        for (name, value) in &form.fields {
            let input: HtmlInputElement = document
                .create_element("input")
                .map_err(|_| "Unable to create input")?
                .dyn_into()
                .map_err(|_| "Input cast failed")?;
            input.set_type("text");
            input.set_id(name);
            input.set_name(name);
            input.set_value(value);
            element
                .append_child(&input)
                .map_err(|_| "Unable to attach input")?;
        }

        body.append_child(&element)
            .map_err(|_| "Unable to attach form")?;
        let submitted = element.submit().map_err(|_| "Form submission failed".to_string());
        let _ = body.remove_child(&element);
        submitted
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::info!(
            action = %form.action,
            fields = form.fields.len(),
            "download form not submitted outside the browser"
        );
        Ok(())
    }
}
