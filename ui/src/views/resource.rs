use api::{ApiError, Backend};
use dioxus::prelude::*;

use crate::core::errors::ErrorAction;

/// What the resource page shows once the lookup settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceView {
    /// The resource document, pretty-printed.
    Document(String),
    Message(String),
    Reload,
}

impl ResourceView {
    pub fn from_result(id: &str, result: Result<serde_json::Value, ApiError>) -> Self {
        match result {
            Ok(document) => Self::Document(
                serde_json::to_string_pretty(&document).unwrap_or_else(|_| document.to_string()),
            ),
            Err(err) => match ErrorAction::for_resource(id, &err) {
                ErrorAction::Reload => Self::Reload,
                ErrorAction::Inline(message) => Self::Message(message),
            },
        }
    }
}

/// Single resource lookup by id.
#[component]
pub fn ResourceInfo(id: String) -> Element {
    let backend = use_hook(super::connect);
    let lookup_id = id.clone();
    let view = use_resource(move || {
        let backend = backend.clone();
        let id = lookup_id.clone();
        async move {
            let result = match backend {
                Ok(backend) => backend.instance(&id).await,
                Err(err) => Err(err),
            };
            ResourceView::from_result(&id, result)
        }
    });

    let content = match &*view.read() {
        None => rsx! { p { class: "resource__loading", "Loading {id}…" } },
        Some(ResourceView::Document(document)) => rsx! { pre { class: "resource__document", "{document}" } },
        Some(ResourceView::Message(message)) => rsx! { p { class: "resource__error", "{message}" } },
        Some(ResourceView::Reload) => {
            ErrorAction::Reload.perform(|_| {});
            rsx! {}
        }
    };

    rsx! {
        section { class: "page resource",
            h1 { "Resource {id}" }
            {content}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn documents_are_pretty_printed() {
        let view = ResourceView::from_result("i-1", Ok(json!({ "id": "i-1" })));
        assert_eq!(view, ResourceView::Document("{\n  \"id\": \"i-1\"\n}".into()));
    }

    #[test]
    fn missing_resource_message() {
        let view = ResourceView::from_result("i-1", Err(ApiError::NotFound));
        assert_eq!(view, ResourceView::Message("Resource i-1 does not exist.".into()));
    }

    #[test]
    fn expired_session_reloads() {
        let view = ResourceView::from_result("i-1", Err(ApiError::Unauthorized));
        assert_eq!(view, ResourceView::Reload);
    }
}
