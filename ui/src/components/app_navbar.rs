use dioxus::prelude::*;

use crate::pages::PageKind;

const DASHBOARD_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/styling/dashboard.css"
));

/// `path#time_link`, so the next page opens on the same range.
pub fn page_href(page: PageKind, time_link: &str) -> String {
    if time_link.is_empty() {
        page.path().to_string()
    } else {
        format!("{}#{time_link}", page.path())
    }
}

fn link_class(active: bool) -> &'static str {
    if active {
        "navbar__link navbar__link--active"
    } else {
        "navbar__link"
    }
}

/// Links to every page, carrying the current time range along.
///
/// Plain anchors: each page decodes its own fragment on load.
#[component]
pub fn AppNavbar(current: PageKind, time_link: String) -> Element {
    rsx! {
        document::Style { "{DASHBOARD_CSS}" }

        header { id: "navbar", class: "navbar",
            div { class: "navbar__inner",
                div { class: "navbar__brand",
                    span { class: "navbar__brand-mark", "Ice" }
                }
                nav { class: "navbar__links",
                    for page in PageKind::ALL {
                        a {
                            key: "{page.path()}",
                            class: link_class(page == current),
                            href: page_href(page, &time_link),
                            "{page.title()}"
                        }
                    }
                }
            }
        }
    }
}
