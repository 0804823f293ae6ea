//! Outbound `getData` parameters and the download form built from them.

use api::QueryParams;

use super::model::{Dimension, GroupBy};
use super::state::DashboardState;

/// Every `getData` parameter for the current state.
///
/// `page` fields override the defaults; dimension and tag selections are
/// applied last.
pub fn data_params(state: &DashboardState, page: &QueryParams) -> QueryParams {
    let mut params = QueryParams::new()
        .with("isCost", state.is_cost())
        .with("usageUnit", state.usage_unit.as_str())
        .with("aggregate", "stats")
        .with("groupBy", state.group_by.as_str())
        .with("consolidate", state.consolidate.as_str())
        .with("start", state.start.as_str())
        .with("end", state.end.as_str())
        .with("breakdown", false)
        .with("consolidateGroups", state.consolidate_groups)
        .with("tagCoverage", state.tag_coverage)
        .with("showLent", state.reservation_sharing.show_lent());
    params.merge(page);

    if state.is_cost() {
        params.set("costType", state.cost_types.query_value());
    }

    for dimension in [
        Dimension::Account,
        state.location_dimension(),
        Dimension::Product,
        Dimension::Operation,
        Dimension::UsageType,
    ] {
        if !state.is_enabled(dimension) {
            continue;
        }
        let org_unit = match dimension {
            Dimension::Account => state.org_unit(),
            _ => None,
        };
        if let Some(names) = state.selection(dimension).query_names(org_unit) {
            params.set(dimension.key(), names.join(","));
        }
    }

    add_tag_coverage(state, &mut params);
    add_user_tags(state, &mut params);
    params
}

fn add_tag_coverage(state: &DashboardState, params: &mut QueryParams) {
    if !state.tag_coverage {
        return;
    }
    if state.group_by == GroupBy::TagKey {
        if let Some(names) = state.tag_keys.query_names(None) {
            params.set("tagKey", names.join(","));
        }
    } else {
        let single = state
            .tag_key
            .clone()
            .or_else(|| state.tag_keys.available().first().map(|key| key.name.clone()));
        if let Some(key) = single {
            params.set("tagKey", key);
        }
    }
}

fn add_user_tags(state: &DashboardState, params: &mut QueryParams) {
    if !state.tags.shown {
        return;
    }
    params.set("showUserTags", true);
    if state.group_by == GroupBy::Tag {
        if let Some(tag) = &state.tags.group_by_tag {
            params.set("groupByTag", tag.as_str());
        }
    }
    for axis in state.tags.axes.iter().filter(|axis| axis.enabled) {
        if let Some(names) = axis.values.query_names(None) {
            params.set(format!("tag-{}", axis.key.name), names.join(","));
        }
    }
}

/// The synthetic form a download submits: one text field per parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadForm {
    pub action: String,
    pub fields: Vec<(String, String)>,
}

impl DownloadForm {
    pub fn new(action: impl Into<String>, params: &QueryParams) -> Self {
        Self {
            action: action.into(),
            fields: params.to_pairs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{CostTypes, UsageCost};
    use crate::pages::PageKind;
    use api::Item;
    use time::macros::datetime;

    fn state(page: PageKind) -> DashboardState {
        DashboardState::for_page(page, datetime!(2024-03-15 15:00 UTC))
    }

    #[test]
    fn defaults_cover_every_query_field() {
        let state = state(PageKind::Detail);
        let params = data_params(&state, &QueryParams::new());
        for key in [
            "isCost",
            "usageUnit",
            "aggregate",
            "groupBy",
            "consolidate",
            "start",
            "end",
            "breakdown",
            "consolidateGroups",
            "tagCoverage",
            "showLent",
            "costType",
        ] {
            assert!(params.contains(key), "missing {key}");
        }
        assert_eq!(params.text("groupBy").as_deref(), Some("Region"));
        assert_eq!(params.text("aggregate").as_deref(), Some("stats"));
    }

    #[test]
    fn cost_type_scenario() {
        let mut state = state(PageKind::Detail);
        state.cost_types = CostTypes {
            recurring: true,
            tax: true,
            ..CostTypes::none()
        };
        let params = data_params(&state, &QueryParams::new());
        assert_eq!(params.text("costType").as_deref(), Some("Recurring,Tax"));

        state.usage_cost = Some(UsageCost::Usage);
        assert!(!data_params(&state, &QueryParams::new()).contains("costType"));
    }

    #[test]
    fn page_query_overrides_defaults() {
        let state = state(PageKind::Detail);
        let page = QueryParams::new()
            .with("consolidate", "monthly")
            .with("breakdown", true);
        let params = data_params(&state, &page);
        assert_eq!(params.text("consolidate").as_deref(), Some("monthly"));
        assert_eq!(params.text("breakdown").as_deref(), Some("true"));
    }

    #[test]
    fn org_unit_narrows_account_parameter() {
        let mut state = state(PageKind::Detail);
        state.dimensions.set(Dimension::Account, true);
        state.selection_mut(Dimension::Account).resolve(vec![
            Item::with_parents("one", ["us", "prod"]),
            Item::with_parents("two", ["us", "prod", "team1"]),
            Item::with_parents("three", ["us", "dev"]),
        ]);
        state.organizational_unit = "us/prod".into();
        let params = data_params(&state, &QueryParams::new());
        assert_eq!(params.text("account").as_deref(), Some("one,two"));
    }

    #[test]
    fn empty_filtered_selection_adds_no_parameter() {
        let mut state = state(PageKind::Detail);
        state.dimensions.set(Dimension::Product, true);
        state
            .selection_mut(Dimension::Product)
            .resolve(vec![Item::named("ec2"), Item::named("s3")]);
        state.selection_mut(Dimension::Product).filter = "lambda".into();
        assert!(!data_params(&state, &QueryParams::new()).contains("product"));
    }

    #[test]
    fn zone_mode_sends_zones_not_regions() {
        let mut state = state(PageKind::Reservation);
        state.show_zones = true;
        state.dimensions.set(Dimension::Region, true);
        state.dimensions.set(Dimension::Zone, true);
        state
            .selection_mut(Dimension::Region)
            .resolve(vec![Item::named("us-east-1")]);
        state
            .selection_mut(Dimension::Zone)
            .resolve(vec![Item::named("us-east-1a")]);
        let params = data_params(&state, &QueryParams::new());
        assert_eq!(params.text("zone").as_deref(), Some("us-east-1a"));
        assert!(!params.contains("region"));
    }

    #[test]
    fn tag_coverage_single_key_falls_back_to_first() {
        let mut state = state(PageKind::TagCoverage);
        state.group_by = GroupBy::Account;
        state
            .tag_keys
            .resolve(vec![Item::named("Env"), Item::named("Team")]);
        let params = data_params(&state, &QueryParams::new());
        assert_eq!(params.text("tagKey").as_deref(), Some("Env"));
        assert!(!params.contains("costType"));

        state.group_by = GroupBy::TagKey;
        let params = data_params(&state, &QueryParams::new());
        assert_eq!(params.text("tagKey").as_deref(), Some("Env,Team"));
    }

    #[test]
    fn user_tags_send_enabled_keys_only() {
        let mut state = state(PageKind::Detail);
        state.set_user_tags_shown(true);
        state.tags.pending_enabled = vec![false, true];
        state
            .tags
            .load_keys(&[Item::named("Env"), Item::named("Team")]);
        state.tags.axes[0].values.resolve(vec![Item::named("prod")]);
        state.tags.axes[1]
            .values
            .resolve(vec![Item::named("core"), Item::named("web")]);
        state.group_by = GroupBy::Tag;

        let params = data_params(&state, &QueryParams::new());
        assert_eq!(params.text("showUserTags").as_deref(), Some("true"));
        assert_eq!(params.text("groupByTag").as_deref(), Some("Env"));
        assert_eq!(params.text("tag-Team").as_deref(), Some("core,web"));
        assert!(!params.contains("tag-Env"));
    }

    #[test]
    fn download_form_carries_every_parameter() {
        let params = QueryParams::new().with("isCost", true).with("start", "2024-01-01 12AM");
        let form = DownloadForm::new("/dashboard/download", &params);
        assert_eq!(form.action, "/dashboard/download");
        assert_eq!(
            form.fields,
            vec![
                ("isCost".to_string(), "true".to_string()),
                ("start".to_string(), "2024-01-01 12AM".to_string()),
            ]
        );
    }
}
