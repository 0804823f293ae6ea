//! Dashboard state to and from the URL fragment.
//!
//! [`REGISTRY`] is the only description of what persists: every entry pairs
//! the decoder and encoder of one fragment key, so both directions read the
//! same table. Values are percent-encoded per list token.

use std::borrow::Cow;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use tracing::debug;

use super::model::{Dimension, DimensionMask, GroupBy, UsageCost};
use super::state::DashboardState;

type Decoder = fn(&mut DashboardState, &str);
type Encoder = fn(&DashboardState) -> Option<Encoded>;

/// A raw (not yet percent-encoded) fragment value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Text(String),
    List(Vec<String>),
}

/// One fragment key.
#[derive(Clone, Copy)]
pub enum ParamDef {
    /// A scalar or list field with its own codec pair.
    Field { decode: Decoder, encode: Encoder },
    /// Selected names of a dimension, comma-joined.
    Names(Dimension),
    /// Text filter of a dimension, emitted as `filter-<plural>`.
    Filter(Dimension),
    /// Text filter of the tag key list, emitted as `filter-tagKeys`.
    TagKeyFilter,
}

pub static REGISTRY: Lazy<IndexMap<&'static str, ParamDef>> = Lazy::new(|| {
    let mut table: IndexMap<&'static str, ParamDef> = IndexMap::new();
    let mut field = |key: &'static str, decode: Decoder, encode: Encoder| {
        table.insert(key, ParamDef::Field { decode, encode });
    };

    field(
        "spans",
        |s, raw| s.spans = text(raw).trim().parse().ok(),
        |s| s.spans.map(|spans| Encoded::Text(spans.to_string())),
    );
    field(
        "graphOnly",
        |s, raw| s.graph_only = flag(raw),
        |s| s.graph_only.then(|| Encoded::Text("true".into())),
    );
    field(
        "showUserTags",
        |s, raw| s.tags.shown = flag(raw),
        |s| s.tags.shown.then(|| Encoded::Text("true".into())),
    );
    field(
        "start",
        |s, raw| {
            append_time_param(s, "start", raw);
            s.start = text(raw);
        },
        |s| Some(Encoded::Text(s.start.clone())),
    );
    field(
        "end",
        |s, raw| {
            append_time_param(s, "end", raw);
            s.end = text(raw);
        },
        |s| Some(Encoded::Text(s.end.clone())),
    );
    field(
        "resources",
        |s, raw| s.resources = Some(text(raw)),
        |s| s.has_resources().then(|| Encoded::Text(s.resources.clone().unwrap_or_default())),
    );
    field(
        "showZones",
        |s, raw| s.show_zones = flag(raw),
        |s| s.show_zones.then(|| Encoded::Text("true".into())),
    );
    field(
        "plotType",
        |s, raw| {
            if let Ok(plot_type) = text(raw).parse() {
                s.plot_type = plot_type;
            }
        },
        |s| Some(Encoded::Text(s.plot_type.to_string())),
    );
    field(
        "reservationSharing",
        |s, raw| {
            if let Ok(sharing) = text(raw).parse() {
                s.reservation_sharing = sharing;
            }
        },
        |s| Some(Encoded::Text(s.reservation_sharing.to_string())),
    );
    field(
        "consolidate",
        |s, raw| {
            if let Ok(consolidate) = text(raw).parse() {
                s.consolidate = consolidate;
            }
        },
        |s| Some(Encoded::Text(s.consolidate.to_string())),
    );
    field(
        "usage_cost",
        |s, raw| {
            s.usage_cost = match text(raw).parse::<UsageCost>() {
                Ok(mode) => Some(mode),
                Err(err) => {
                    debug!(%err, raw, "ignoring unrecognised usage_cost");
                    None
                }
            }
        },
        |s| s.usage_cost.map(|mode| Encoded::Text(mode.to_string())),
    );
    field(
        "usageUnit",
        |s, raw| s.usage_unit = text(raw),
        |s| (!s.usage_unit.is_empty()).then(|| Encoded::Text(s.usage_unit.clone())),
    );
    field(
        "groupBy",
        |s, raw| s.pick_group_by(&text(raw)),
        |s| Some(Encoded::Text(s.group_by.to_string())),
    );
    field(
        "groupByTag",
        |s, raw| s.tags.initial_group_by_tag = Some(text(raw)),
        |s| {
            s.tags
                .group_by_tag
                .as_ref()
                .or(s.tags.initial_group_by_tag.as_ref())
                .filter(|name| !name.is_empty())
                .map(|name| Encoded::Text(name.clone()))
        },
    );
    field(
        "orgUnit",
        |s, raw| s.organizational_unit = text(raw),
        |s| s.org_unit().map(|unit| Encoded::Text(unit.to_string())),
    );

    for dimension in Dimension::ALL {
        table.insert(dimension.key(), ParamDef::Names(dimension));
    }

    let mut field = |key: &'static str, decode: Decoder, encode: Encoder| {
        table.insert(key, ParamDef::Field { decode, encode });
    };
    field(
        "consolidateGroups",
        |s, raw| s.consolidate_groups = flag(raw),
        |s| s.consolidate_groups.then(|| Encoded::Text("true".into())),
    );
    field(
        "tagCoverage",
        |s, raw| s.tag_coverage = flag(raw),
        |s| s.tag_coverage.then(|| Encoded::Text("true".into())),
    );
    field(
        "tagKey",
        |s, raw| {
            let keys = list(raw);
            s.tag_key_prior = keys.first().cloned();
            s.tag_keys.prior = Some(keys);
        },
        encode_tag_key,
    );
    field(
        "dimensions",
        |s, raw| s.dimensions = DimensionMask::decode(&text(raw)),
        |s| {
            s.dimensions.any().then(|| {
                Encoded::List(s.dimensions.encode().split(',').map(str::to_string).collect())
            })
        },
    );
    field(
        "enabledUserTags",
        |s, raw| {
            s.tags.pending_enabled = text(raw).split(',').map(|token| token == "true").collect();
        },
        |s| {
            (s.tags.shown && s.tags.any_enabled()).then(|| {
                Encoded::List(
                    s.tags
                        .enabled_flags()
                        .iter()
                        .map(|enabled| enabled.to_string())
                        .collect(),
                )
            })
        },
    );

    for dimension in Dimension::ALL {
        table.insert(filter_lookup_key(dimension), ParamDef::Filter(dimension));
    }
    table.insert("filter_tagKeys", ParamDef::TagKeyFilter);

    table
});

fn filter_lookup_key(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Account => "filter_accounts",
        Dimension::Region => "filter_regions",
        Dimension::Zone => "filter_zones",
        Dimension::Product => "filter_products",
        Dimension::Operation => "filter_operations",
        Dimension::UsageType => "filter_usageTypes",
    }
}

fn encode_tag_key(state: &DashboardState) -> Option<Encoded> {
    if !state.tag_coverage {
        return None;
    }
    if state.group_by == GroupBy::TagKey {
        state.tag_keys.query_names(None).map(Encoded::List)
    } else {
        state
            .tag_key
            .as_ref()
            .or(state.tag_key_prior.as_ref())
            .map(|key| Encoded::Text(key.clone()))
    }
}

impl ParamDef {
    fn decode(&self, state: &mut DashboardState, raw: &str) {
        match *self {
            Self::Field { decode, .. } => decode(state, raw),
            Self::Names(dimension) => state.selection_mut(dimension).prior = Some(list(raw)),
            Self::Filter(dimension) => state.selection_mut(dimension).filter = text(raw),
            Self::TagKeyFilter => state.tag_keys.filter = text(raw),
        }
    }

    /// Pairs this entry contributes; `key` is the registry key.
    fn encode(&self, key: &str, state: &DashboardState, out: &mut Vec<(String, Encoded)>) {
        match *self {
            Self::Field { encode, .. } => {
                if let Some(value) = encode(state) {
                    out.push((key.to_string(), value));
                }
            }
            Self::Names(dimension) => {
                if !encodes_dimension(state, dimension) {
                    return;
                }
                let org_unit = match dimension {
                    Dimension::Account => state.org_unit(),
                    _ => None,
                };
                if let Some(names) = state.selection(dimension).query_names(org_unit) {
                    out.push((key.to_string(), Encoded::List(names)));
                }
            }
            Self::Filter(dimension) => {
                let filter = &state.selection(dimension).filter;
                if encodes_dimension(state, dimension) && !filter.is_empty() {
                    out.push((
                        format!("filter-{}", dimension.plural()),
                        Encoded::Text(filter.clone()),
                    ));
                }
            }
            Self::TagKeyFilter => {
                if state.tag_coverage && !state.tag_keys.filter.is_empty() {
                    out.push((
                        "filter-tagKeys".to_string(),
                        Encoded::Text(state.tag_keys.filter.clone()),
                    ));
                }
            }
        }
    }
}

/// Only the displayed one of region and zone persists.
fn encodes_dimension(state: &DashboardState, dimension: Dimension) -> bool {
    let hidden = match state.location_dimension() {
        Dimension::Zone => Dimension::Region,
        _ => Dimension::Zone,
    };
    state.is_enabled(dimension) && dimension != hidden
}

/// Applies a fragment (with or without the leading `#`) to `state`.
pub fn decode(fragment: &str, state: &mut DashboardState) {
    state.time_params.clear();
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

    for piece in fragment.split('&').filter(|piece| !piece.is_empty()) {
        let Some((key, raw)) = piece.split_once('=') else {
            debug!(piece, "fragment piece without a value");
            continue;
        };

        if let Some(def) = lookup(key) {
            def.decode(state, raw);
        } else if let Some(name) = key.strip_prefix("tag-") {
            state.tags.pending_values.insert(text(name), list(raw));
        } else if let Some(name) = key.strip_prefix("filter-tag-") {
            state.tags.pending_filters.insert(text(name), text(raw));
        } else {
            debug!(key, "ignoring unknown fragment key");
        }
    }
}

/// Registry key, else the key with its first `-` read as `_`.
fn lookup(key: &str) -> Option<ParamDef> {
    if let Some(def) = REGISTRY.get(key) {
        return Some(*def);
    }
    if key.contains('-') {
        return REGISTRY.get(key.replacen('-', "_", 1).as_str()).copied();
    }
    None
}

/// Serializes `state` into a fragment (without the leading `#`).
pub fn encode(state: &DashboardState) -> String {
    let mut pairs = Vec::new();
    for (key, def) in REGISTRY.iter() {
        def.encode(key, state, &mut pairs);
    }
    encode_user_tags(state, &mut pairs);

    pairs
        .into_iter()
        .map(|(key, value)| format!("{}={}", escape(&key), escape_value(&value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode_user_tags(state: &DashboardState, out: &mut Vec<(String, Encoded)>) {
    if !state.tags.shown {
        return;
    }

    if !state.tags.is_loaded() {
        for (name, values) in &state.tags.pending_values {
            out.push((format!("tag-{name}"), Encoded::List(values.clone())));
        }
        for (name, filter) in &state.tags.pending_filters {
            out.push((format!("filter-tag-{name}"), Encoded::Text(filter.clone())));
        }
        return;
    }

    for axis in &state.tags.axes {
        if axis.enabled {
            if let Some(names) = axis.values.query_names(None) {
                out.push((format!("tag-{}", axis.key.name), Encoded::List(names)));
            }
        }
        if !axis.values.filter.is_empty() {
            out.push((
                format!("filter-tag-{}", axis.key.name),
                Encoded::Text(axis.values.filter.clone()),
            ));
        }
    }
}

fn append_time_param(state: &mut DashboardState, key: &str, raw: &str) {
    if !state.time_params.is_empty() {
        state.time_params.push('&');
    }
    state.time_params.push_str(key);
    state.time_params.push('=');
    state.time_params.push_str(raw);
}

fn flag(raw: &str) -> bool {
    raw == "true"
}

/// Percent-decodes leniently: undecodable input is kept as is.
fn text(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

fn list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|token| !token.is_empty())
        .map(text)
        .collect()
}

fn escape(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

fn escape_value(value: &Encoded) -> String {
    match value {
        Encoded::Text(text) => escape(text).into_owned(),
        Encoded::List(items) => items
            .iter()
            .map(|item| escape(item))
            .collect::<Vec<_>>()
            .join(","),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Consolidation, PlotType, ReservationSharing};
    use crate::pages::PageKind;
    use api::Item;
    use time::macros::datetime;

    fn fresh(page: PageKind) -> DashboardState {
        DashboardState::for_page(page, datetime!(2024-03-15 15:00 UTC))
    }

    fn prior(state: &DashboardState, dimension: Dimension) -> Option<Vec<String>> {
        state.selection(dimension).prior.clone()
    }

    #[test]
    fn unrecognised_usage_cost_is_dropped() {
        let mut state = fresh(PageKind::Detail);
        state.usage_cost = Some(UsageCost::Usage);
        decode("#usage_cost=bogus&plotType=line", &mut state);
        assert_eq!(state.usage_cost, None);
        assert_eq!(state.plot_type, PlotType::Line);
        assert!(!encode(&state).contains("usage_cost"));
    }

    #[test]
    fn decodes_registry_fields() {
        let mut state = fresh(PageKind::Detail);
        decode(
            "#consolidate=weekly&plotType=line&usage_cost=usage&showZones=true&groupBy=Product\
             &dimensions=true,false,true,false,false,false&account=a1,a2&spans=3",
            &mut state,
        );
        assert_eq!(state.consolidate, Consolidation::Weekly);
        assert_eq!(state.plot_type, PlotType::Line);
        assert_eq!(state.usage_cost, Some(UsageCost::Usage));
        assert!(state.show_zones);
        assert_eq!(state.group_by, GroupBy::Product);
        assert!(state.is_enabled(Dimension::Account));
        assert!(state.is_enabled(Dimension::Zone));
        assert!(!state.is_enabled(Dimension::Region));
        assert_eq!(
            prior(&state, Dimension::Account),
            Some(vec!["a1".to_string(), "a2".to_string()])
        );
        assert_eq!(state.spans, Some(3));
    }

    #[test]
    fn unknown_group_by_keeps_current() {
        let mut state = fresh(PageKind::Detail);
        decode("groupBy=Nonsense", &mut state);
        assert_eq!(state.group_by, GroupBy::Region);
    }

    #[test]
    fn hyphenated_keys_fall_back_to_underscore() {
        let mut state = fresh(PageKind::Detail);
        decode("filter-accounts=!test&filter-usageTypes=Box", &mut state);
        assert_eq!(state.selection(Dimension::Account).filter, "!test");
        assert_eq!(state.selection(Dimension::UsageType).filter, "Box");
    }

    #[test]
    fn zone_names_land_on_zones() {
        let mut state = fresh(PageKind::Reservation);
        decode("zone=us-east-1a", &mut state);
        assert_eq!(
            prior(&state, Dimension::Zone),
            Some(vec!["us-east-1a".to_string()])
        );
        assert_eq!(prior(&state, Dimension::Region), None);
    }

    #[test]
    fn tag_prefixes_fill_pending_maps() {
        let mut state = fresh(PageKind::Detail);
        decode("tag-Env=prod,dev&filter-tag-Team=core&tag-App%20Name=web", &mut state);
        assert_eq!(
            state.tags.pending_values.get("Env"),
            Some(&vec!["prod".to_string(), "dev".to_string()])
        );
        assert_eq!(
            state.tags.pending_values.get("App Name"),
            Some(&vec!["web".to_string()])
        );
        assert_eq!(
            state.tags.pending_filters.get("Team").map(String::as_str),
            Some("core")
        );
    }

    #[test]
    fn time_fields_accumulate_time_params() {
        let mut state = fresh(PageKind::Detail);
        decode("start=2024-01-01%2012AM&end=2024-02-01%2012AM", &mut state);
        assert_eq!(state.start, "2024-01-01 12AM");
        assert_eq!(state.end, "2024-02-01 12AM");
        assert_eq!(
            state.time_params,
            "start=2024-01-01%2012AM&end=2024-02-01%2012AM"
        );
    }

    #[test]
    fn malformed_percent_sequences_stay_raw() {
        let mut state = fresh(PageKind::Detail);
        decode("usageUnit=%E0%A4%A&orgUnit=us/prod", &mut state);
        assert_eq!(state.usage_unit, "%E0%A4%A");
        assert_eq!(state.organizational_unit, "us/prod");
    }

    #[test]
    fn ignores_unknown_keys_and_bare_pieces() {
        let mut state = fresh(PageKind::Detail);
        let before = state.clone();
        decode("mystery=1&lonely&userTags=a,b", &mut state);
        assert_eq!(state, before);
    }

    #[test]
    fn encodes_only_enabled_filtered_selections() {
        let mut state = fresh(PageKind::Detail);
        state.dimensions.set(Dimension::Account, true);
        state.dimensions.set(Dimension::Product, true);
        state
            .selection_mut(Dimension::Account)
            .resolve(vec![Item::named("a1"), Item::named("a2")]);
        state.selection_mut(Dimension::Account).filter = "2".into();
        state
            .selection_mut(Dimension::Region)
            .resolve(vec![Item::named("us-east-1")]);
        state.selection_mut(Dimension::Product).resolve(Vec::new());

        let fragment = encode(&state);
        assert!(fragment.contains("account=a2"));
        assert!(fragment.contains("filter-accounts=2"));
        assert!(!fragment.contains("region="));
        assert!(!fragment.contains("product="));
        assert!(fragment.contains("dimensions=true,false,false,true,false,false"));
    }

    #[test]
    fn round_trip_preserves_registry_fields() {
        let mut state = fresh(PageKind::Reservation);
        state.show_zones = true;
        state.adjust_group_bys();
        state.dimensions = DimensionMask::all();
        state.consolidate = Consolidation::Monthly;
        state.plot_type = PlotType::Spline;
        state.reservation_sharing = ReservationSharing::Lent;
        state.usage_cost = Some(UsageCost::Usage);
        state.usage_unit = "ECUs".into();
        state.consolidate_groups = true;
        state.graph_only = true;
        state.spans = Some(4);
        state.group_by = GroupBy::Zone;
        state.organizational_unit = "us/prod".into();
        state.tags.shown = true;
        state.tags.initial_group_by_tag = Some("Env".into());
        state.start = "2024-01-01 12AM".into();
        state.end = "2024-02-01 05PM".into();
        state.selection_mut(Dimension::Account).resolve(vec![
            Item::with_parents("one, inc", ["us", "prod"]),
            Item::with_parents("two&co", ["us", "prod"]),
            Item::with_parents("three", ["eu"]),
        ]);
        state.selection_mut(Dimension::Zone).resolve(vec![
            Item::named("us-east-1a"),
            Item::named("us-east-1b"),
        ]);
        state.selection_mut(Dimension::Zone).filter = "!1b".into();
        state.selection_mut(Dimension::Product).prior = Some(vec!["ec2".into()]);
        state.selection_mut(Dimension::Operation).filter = "Reserved".into();

        let mut decoded = fresh(PageKind::Reservation);
        decode(&encode(&state), &mut decoded);
        decoded.show_zones = true;
        decoded.adjust_group_bys();

        assert_eq!(decoded.dimensions, state.dimensions);
        assert_eq!(decoded.consolidate, state.consolidate);
        assert_eq!(decoded.plot_type, state.plot_type);
        assert_eq!(decoded.reservation_sharing, state.reservation_sharing);
        assert_eq!(decoded.usage_cost, state.usage_cost);
        assert_eq!(decoded.usage_unit, state.usage_unit);
        assert_eq!(decoded.consolidate_groups, state.consolidate_groups);
        assert_eq!(decoded.graph_only, state.graph_only);
        assert_eq!(decoded.spans, state.spans);
        assert_eq!(decoded.show_zones, state.show_zones);
        assert_eq!(decoded.group_by, state.group_by);
        assert_eq!(decoded.organizational_unit, state.organizational_unit);
        assert_eq!(decoded.tags.shown, state.tags.shown);
        assert_eq!(decoded.tags.initial_group_by_tag, state.tags.initial_group_by_tag);
        assert_eq!(decoded.start, state.start);
        assert_eq!(decoded.end, state.end);
        assert_eq!(
            prior(&decoded, Dimension::Account),
            Some(vec!["one, inc".to_string(), "two&co".to_string()])
        );
        assert_eq!(
            prior(&decoded, Dimension::Zone),
            Some(vec!["us-east-1a".to_string()])
        );
        assert_eq!(decoded.selection(Dimension::Zone).filter, "!1b");
        assert_eq!(prior(&decoded, Dimension::Product), Some(vec!["ec2".to_string()]));
        assert_eq!(decoded.selection(Dimension::Operation).filter, "Reserved");
        // Encoding the decoded state again is stable.
        assert_eq!(encode(&decoded), encode(&state));
    }

    #[test]
    fn tag_coverage_round_trips_tag_keys() {
        let mut state = fresh(PageKind::TagCoverage);
        state.tag_keys.resolve(vec![Item::named("Env"), Item::named("Team")]);
        state.tag_keys.filter = "e".into();
        let mut decoded = fresh(PageKind::TagCoverage);
        decode(&encode(&state), &mut decoded);
        assert_eq!(decoded.tag_keys.filter, "e");
        assert_eq!(
            decoded.tag_keys.prior,
            Some(vec!["Env".to_string(), "Team".to_string()])
        );

        state.group_by = GroupBy::Account;
        state.tag_key = Some("Team".into());
        let mut single = fresh(PageKind::TagCoverage);
        decode(&encode(&state), &mut single);
        assert_eq!(single.tag_key_prior.as_deref(), Some("Team"));
    }

    #[test]
    fn user_tags_round_trip() {
        let mut state = fresh(PageKind::Detail);
        state.set_user_tags_shown(true);
        state.tags.pending_enabled = vec![true, false];
        state
            .tags
            .load_keys(&[Item::named("Env"), Item::named("Team")]);
        state.tags.axes[0]
            .values
            .resolve(vec![Item::named("prod"), Item::named("dev")]);
        state.tags.axes[0].values.toggle("dev");
        state.tags.axes[1].values.filter = "core".into();

        let fragment = encode(&state);
        assert!(fragment.contains("enabledUserTags=true,false"));
        assert!(fragment.contains("tag-Env=prod"));
        assert!(fragment.contains("filter-tag-Team=core"));

        let mut decoded = fresh(PageKind::Detail);
        decode(&fragment, &mut decoded);
        decoded
            .tags
            .load_keys(&[Item::named("Env"), Item::named("Team")]);
        assert_eq!(decoded.tags.enabled_flags(), vec![true, false]);
        assert_eq!(
            decoded.tags.axes[0].values.prior,
            Some(vec!["prod".to_string()])
        );
        assert_eq!(decoded.tags.axes[1].values.filter, "core");
        assert_eq!(decoded.tags.group_by_tag.as_deref(), Some("Env"));
    }
}
