use dioxus::prelude::*;

use crate::core::events::DashboardEvent;
use crate::core::filter;
use crate::core::model::{
    Consolidation, Dimension, GroupBy, PlotType, ReservationSharing, Selection, UsageCost,
};
use crate::core::state::DashboardState;
use crate::pages::PageKind;

/// Everything above the chart: dimension pickers and query options.
#[component]
pub fn ControlsPanel(state: Signal<DashboardState>, loading: Signal<bool>) -> Element {
    let events = use_coroutine_handle::<DashboardEvent>();

    let snapshot = state.read();
    let page = snapshot.page;
    let config = page.config();
    let location = snapshot.location_dimension();
    let org_unit = snapshot.organizational_unit.clone();
    let org_units = snapshot.organizational_units.clone();
    let show_zones = snapshot.show_zones;
    let tags_shown = snapshot.tags.shown;
    let tag_axes = snapshot.tags.axes.len();
    let tag_coverage = snapshot.tag_coverage;
    drop(snapshot);

    let busy = loading();

    rsx! {
        div { class: "controls",
            div { class: "controls__row",
                label { class: "controls__field",
                    span { "Organization" }
                    select {
                        value: "{org_unit}",
                        onchange: move |evt: FormEvent| events.send(DashboardEvent::OrgUnit(evt.value())),
                        option { value: "", selected: org_unit.is_empty(), "All" }
                        for unit in org_units.iter() {
                            option { key: "{unit}", value: "{unit}", selected: *unit == org_unit, "{unit}" }
                        }
                    }
                }
                if config.zones {
                    label { class: "controls__field",
                        input {
                            r#type: "checkbox",
                            checked: show_zones,
                            onchange: move |_| events.send(DashboardEvent::ShowZones(!show_zones)),
                        }
                        span { "Show zones" }
                    }
                }
                if config.user_tags {
                    label { class: "controls__field",
                        input {
                            r#type: "checkbox",
                            checked: tags_shown,
                            onchange: move |_| events.send(DashboardEvent::ShowUserTags(!tags_shown)),
                        }
                        span { "Show user tags" }
                    }
                }
            }

            div { class: "controls__dimensions",
                for dimension in [Dimension::Account, location, Dimension::Product, Dimension::Operation, Dimension::UsageType] {
                    DimensionPicker { key: "{dimension.key()}", state, dimension }
                }
            }

            if tags_shown {
                div { class: "controls__tags",
                    for index in 0..tag_axes {
                        TagPicker { key: "{index}", state, index }
                    }
                }
            }

            if tag_coverage {
                TagKeyPicker { state }
            }

            QueryOptions { state }

            div { class: "controls__actions",
                button {
                    r#type: "button",
                    class: "controls__submit",
                    disabled: busy,
                    onclick: move |_| events.send(DashboardEvent::Submit),
                    "Submit"
                }
                button {
                    r#type: "button",
                    class: "controls__download",
                    onclick: move |_| events.send(DashboardEvent::Download),
                    "Download"
                }
            }
        }
    }
}

#[derive(Clone, PartialEq)]
struct PickerRow {
    name: String,
    label: String,
    selected: bool,
}

/// Universe items that pass the org unit and the text filter.
fn picker_rows(selection: &Selection, org_unit: Option<&str>) -> Vec<PickerRow> {
    selection
        .available()
        .iter()
        .filter(|item| filter::in_org_unit(&item.path(), org_unit))
        .filter(|item| filter::matches(&item.name, Some(selection.filter.as_str())))
        .map(|item| PickerRow {
            name: item.name.clone(),
            label: item.display_name(),
            selected: selection.is_selected(&item.name),
        })
        .collect()
}

#[component]
fn DimensionPicker(state: Signal<DashboardState>, dimension: Dimension) -> Element {
    let events = use_coroutine_handle::<DashboardEvent>();

    let snapshot = state.read();
    let enabled = snapshot.is_enabled(dimension);
    let org_unit = match dimension {
        Dimension::Account => snapshot.org_unit(),
        _ => None,
    };
    let selection = snapshot.selection(dimension);
    let rows = picker_rows(selection, org_unit);
    let chosen = selection.filter_selected(org_unit).len();
    let total = selection.available().len();
    let filter_text = selection.filter.clone();
    drop(snapshot);

    rsx! {
        fieldset { class: "picker",
            legend { class: "picker__title",
                input {
                    r#type: "checkbox",
                    checked: enabled,
                    onchange: move |_| events.send(DashboardEvent::EnableDimension(dimension, !enabled)),
                }
                span { "{dimension.label()}" }
                if enabled {
                    span { class: "picker__count", "{chosen}/{total}" }
                }
            }
            if enabled {
                div { class: "picker__tools",
                    input {
                        r#type: "text",
                        class: "picker__filter",
                        placeholder: "filter",
                        value: "{filter_text}",
                        oninput: move |evt: FormEvent| events.send(DashboardEvent::Filter(dimension, evt.value())),
                    }
                    button {
                        r#type: "button",
                        onclick: move |_| events.send(DashboardEvent::SelectAll(dimension)),
                        "All"
                    }
                    button {
                        r#type: "button",
                        onclick: move |_| events.send(DashboardEvent::ClearSelection(dimension)),
                        "None"
                    }
                }
                ul { class: "picker__items",
                    for row in rows.into_iter() {
                        {render_row(row, events, move |name| DashboardEvent::ToggleItem(dimension, name))}
                    }
                }
            }
        }
    }
}

fn render_row(
    row: PickerRow,
    events: Coroutine<DashboardEvent>,
    event: impl Fn(String) -> DashboardEvent + 'static,
) -> Element {
    let PickerRow {
        name,
        label,
        selected,
    } = row;
    let key = name.clone();
    let class = if selected {
        "picker__item picker__item--selected"
    } else {
        "picker__item"
    };

    rsx! {
        li {
            key: "{key}",
            class,
            onclick: move |_| events.send(event(name.clone())),
            "{label}"
        }
    }
}

#[component]
fn TagPicker(state: Signal<DashboardState>, index: usize) -> Element {
    let events = use_coroutine_handle::<DashboardEvent>();

    let snapshot = state.read();
    let Some(axis) = snapshot.tags.axes.get(index) else {
        return rsx! {};
    };
    let key_name = axis.key.name.clone();
    let enabled = axis.enabled;
    let rows = picker_rows(&axis.values, None);
    let filter_text = axis.values.filter.clone();
    let grouped = snapshot.group_by == GroupBy::Tag
        && snapshot.tags.group_by_tag.as_deref() == Some(key_name.as_str());
    let can_group = snapshot.group_by == GroupBy::Tag;
    drop(snapshot);

    let group_name = key_name.clone();

    rsx! {
        fieldset { class: "picker picker--tag",
            legend { class: "picker__title",
                input {
                    r#type: "checkbox",
                    checked: enabled,
                    onchange: move |_| events.send(DashboardEvent::EnableTag(index, !enabled)),
                }
                span { "{key_name}" }
                if can_group {
                    input {
                        r#type: "radio",
                        name: "groupByTag",
                        checked: grouped,
                        title: "Group by this tag",
                        onchange: move |_| events.send(DashboardEvent::GroupByTag(group_name.clone())),
                    }
                }
            }
            if enabled {
                div { class: "picker__tools",
                    input {
                        r#type: "text",
                        class: "picker__filter",
                        placeholder: "filter",
                        value: "{filter_text}",
                        oninput: move |evt: FormEvent| events.send(DashboardEvent::TagValueFilter(index, evt.value())),
                    }
                    button {
                        r#type: "button",
                        onclick: move |_| events.send(DashboardEvent::SelectAllTagValues(index)),
                        "All"
                    }
                    button {
                        r#type: "button",
                        onclick: move |_| events.send(DashboardEvent::ClearTagValues(index)),
                        "None"
                    }
                }
                ul { class: "picker__items",
                    for row in rows.into_iter() {
                        {render_row(row, events, move |name| DashboardEvent::ToggleTagValue(index, name))}
                    }
                }
            }
        }
    }
}

/// Tag key choice on the tag coverage page; several keys when grouping by key.
#[component]
fn TagKeyPicker(state: Signal<DashboardState>) -> Element {
    let events = use_coroutine_handle::<DashboardEvent>();

    let snapshot = state.read();
    let multiple = snapshot.group_by == GroupBy::TagKey;
    let rows = picker_rows(&snapshot.tag_keys, None);
    let current = snapshot
        .tag_key
        .clone()
        .or_else(|| rows.first().map(|row| row.name.clone()))
        .unwrap_or_default();
    drop(snapshot);

    rsx! {
        fieldset { class: "picker picker--tag-keys",
            legend { class: "picker__title", "Tag keys" }
            if multiple {
                ul { class: "picker__items",
                    for row in rows.into_iter() {
                        {render_row(row, events, DashboardEvent::ToggleTagKey)}
                    }
                }
            } else {
                select {
                    value: "{current}",
                    onchange: move |evt: FormEvent| events.send(DashboardEvent::TagKey(evt.value())),
                    for row in rows.iter() {
                        option { key: "{row.name}", value: "{row.name}", selected: row.name == current, "{row.label}" }
                    }
                }
            }
        }
    }
}

#[component]
fn QueryOptions(state: Signal<DashboardState>) -> Element {
    let events = use_coroutine_handle::<DashboardEvent>();

    let snapshot = state.read();
    let page = snapshot.page;
    let config = page.config();
    let group_bys = snapshot.group_bys.clone();
    let group_by = snapshot.group_by;
    let next_group_by = (page == PageKind::Summary)
        .then(|| snapshot.next_group_by(group_by))
        .flatten();
    let consolidate = snapshot.consolidate;
    let plot_type = snapshot.plot_type;
    let usage_cost = snapshot.usage_cost;
    let is_cost = snapshot.is_cost();
    let cost_types = snapshot.cost_types.toggles();
    let sharing = snapshot.reservation_sharing;
    let consolidate_groups = snapshot.consolidate_groups;
    let start = snapshot.start.clone();
    let end = snapshot.end.clone();
    drop(snapshot);

    let shares_reservations = matches!(page, PageKind::Reservation | PageKind::SavingsPlans);

    rsx! {
        div { class: "controls__options",
            label { class: "controls__field",
                span { "Start" }
                input {
                    r#type: "text",
                    value: "{start}",
                    onchange: move |evt: FormEvent| events.send(DashboardEvent::Start(evt.value())),
                }
            }
            label { class: "controls__field",
                span { "End" }
                input {
                    r#type: "text",
                    value: "{end}",
                    onchange: move |evt: FormEvent| events.send(DashboardEvent::End(evt.value())),
                }
            }

            label { class: "controls__field",
                span { "Group by" }
                select {
                    value: "{group_by}",
                    onchange: move |evt: FormEvent| events.send(DashboardEvent::GroupBy(evt.value())),
                    for choice in group_bys.iter() {
                        option { key: "{choice}", value: "{choice}", selected: *choice == group_by, "{choice}" }
                    }
                }
            }
            {next_group_by.map(|next| rsx! {
                button {
                    r#type: "button",
                    class: "controls__next",
                    onclick: move |_| {
                        events.send(DashboardEvent::GroupBy(next.to_string()));
                        events.send(DashboardEvent::Submit);
                    },
                    "Next: {next}"
                }
            })}
            label { class: "controls__field",
                input {
                    r#type: "checkbox",
                    checked: consolidate_groups,
                    onchange: move |_| events.send(DashboardEvent::ConsolidateGroups(!consolidate_groups)),
                }
                span { "Consolidate groups" }
            }

            if page != PageKind::Summary {
                label { class: "controls__field",
                    span { "Aggregate" }
                    select {
                        value: "{consolidate}",
                        onchange: move |evt: FormEvent| {
                            if let Ok(choice) = evt.value().parse::<Consolidation>() {
                                events.send(DashboardEvent::Consolidate(choice));
                            }
                        },
                        for choice in Consolidation::ALL.iter() {
                            option { key: "{choice}", value: "{choice}", selected: *choice == consolidate, "{choice}" }
                        }
                    }
                }
            }

            label { class: "controls__field",
                span { "Plot" }
                select {
                    value: "{plot_type}",
                    onchange: move |evt: FormEvent| {
                        if let Ok(choice) = evt.value().parse::<PlotType>() {
                            events.send(DashboardEvent::PlotType(choice));
                        }
                    },
                    for choice in PlotType::ALL.iter() {
                        option { key: "{choice}", value: "{choice}", selected: *choice == plot_type, "{choice}" }
                    }
                }
            }

            if config.usage_cost.is_some() {
                label { class: "controls__field",
                    span { "Show" }
                    select {
                        value: usage_cost.map(UsageCost::as_str).unwrap_or_default(),
                        onchange: move |evt: FormEvent| {
                            if let Ok(choice) = evt.value().parse::<UsageCost>() {
                                events.send(DashboardEvent::UsageCost(choice));
                            }
                        },
                        for choice in UsageCost::ALL.iter() {
                            option { key: "{choice}", value: "{choice}", selected: Some(*choice) == usage_cost, "{choice}" }
                        }
                    }
                }
            }

            if is_cost {
                div { class: "controls__cost-types",
                    for (name, enabled) in cost_types {
                        label { key: "{name}", class: "controls__field",
                            input {
                                r#type: "checkbox",
                                checked: enabled,
                                onchange: move |_| events.send(DashboardEvent::ToggleCostType(name.to_string())),
                            }
                            span { "{name}" }
                        }
                    }
                }
            }

            if shares_reservations {
                label { class: "controls__field",
                    span { "Reservations" }
                    select {
                        value: "{sharing}",
                        onchange: move |evt: FormEvent| {
                            if let Ok(choice) = evt.value().parse::<ReservationSharing>() {
                                events.send(DashboardEvent::ReservationSharing(choice));
                            }
                        },
                        for choice in ReservationSharing::ALL.iter() {
                            option { key: "{choice}", value: "{choice}", selected: *choice == sharing, "{choice}" }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::Item;

    #[test]
    fn rows_follow_org_unit_and_filter() {
        let mut selection = Selection::default();
        selection.resolve(vec![
            Item::with_parents("prod-a", ["us"]),
            Item::with_parents("dev-b", ["us"]),
            Item::with_parents("prod-c", ["eu"]),
        ]);
        selection.filter = "prod".into();
        selection.toggle("prod-a");

        let rows = picker_rows(&selection, Some("us"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "prod-a");
        assert!(!rows[0].selected);
    }
}
