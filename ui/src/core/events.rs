//! User interactions on the dashboard controls and what each one sets off.

use super::model::{Consolidation, Dimension, PlotType, ReservationSharing, UsageCost};
use super::resolver::CascadeStart;
use super::state::DashboardState;

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    ToggleItem(Dimension, String),
    SelectAll(Dimension),
    ClearSelection(Dimension),
    Filter(Dimension, String),
    EnableDimension(Dimension, bool),
    OrgUnit(String),
    ShowZones(bool),
    ShowUserTags(bool),
    EnableTag(usize, bool),
    ToggleTagValue(usize, String),
    SelectAllTagValues(usize),
    ClearTagValues(usize),
    TagValueFilter(usize, String),
    GroupByTag(String),
    TagKey(String),
    ToggleTagKey(String),
    GroupBy(String),
    Consolidate(Consolidation),
    PlotType(PlotType),
    UsageCost(UsageCost),
    ToggleCostType(String),
    ConsolidateGroups(bool),
    ReservationSharing(ReservationSharing),
    Start(String),
    End(String),
    Submit,
    Download,
}

/// Follow-up work after an event has been applied to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Cascade(CascadeStart),
    /// Refetch the page's operation lists, then cascade from operations.
    ReloadOps,
    Query,
    Download,
}

/// Cascade that follows a change to the selection of `dimension`.
fn changed(dimension: Dimension) -> Effect {
    match dimension {
        Dimension::Account => Effect::Cascade(CascadeStart::AccountsChanged),
        Dimension::Region | Dimension::Zone => Effect::Cascade(CascadeStart::LocationChanged),
        Dimension::Product => Effect::Cascade(CascadeStart::ProductsChanged),
        Dimension::Operation => Effect::Cascade(CascadeStart::OperationsChanged),
        Dimension::UsageType => Effect::None,
    }
}

/// Cascade that refetches `dimension` itself and everything after it.
fn refetch(dimension: Dimension) -> CascadeStart {
    match dimension {
        Dimension::Account => CascadeStart::Accounts,
        Dimension::Region | Dimension::Zone => CascadeStart::Location,
        Dimension::Product => CascadeStart::Products,
        Dimension::Operation => CascadeStart::Operations,
        Dimension::UsageType => CascadeStart::UsageTypes,
    }
}

pub fn apply(state: &mut DashboardState, event: DashboardEvent) -> Effect {
    match event {
        DashboardEvent::ToggleItem(dimension, name) => {
            state.selection_mut(dimension).toggle(&name);
            changed(dimension)
        }
        DashboardEvent::SelectAll(dimension) => {
            state.selection_mut(dimension).select_all();
            changed(dimension)
        }
        DashboardEvent::ClearSelection(dimension) => {
            state.selection_mut(dimension).clear();
            changed(dimension)
        }
        DashboardEvent::Filter(dimension, filter) => {
            state.selection_mut(dimension).filter = filter;
            Effect::None
        }
        DashboardEvent::EnableDimension(dimension, enabled) => {
            state.dimensions.set(dimension, enabled);
            if enabled {
                Effect::Cascade(refetch(dimension))
            } else {
                changed(dimension)
            }
        }
        DashboardEvent::OrgUnit(unit) => {
            state.organizational_unit = unit;
            Effect::Cascade(CascadeStart::OrgUnitChanged)
        }
        DashboardEvent::ShowZones(shown) => {
            state.show_zones = shown;
            state.group_bys = state.page.config().group_bys;
            state.adjust_group_bys();
            Effect::Cascade(CascadeStart::Location)
        }
        DashboardEvent::ShowUserTags(shown) => {
            state.set_user_tags_shown(shown);
            if shown {
                Effect::Cascade(CascadeStart::UserTagsShown)
            } else {
                Effect::None
            }
        }
        DashboardEvent::EnableTag(index, enabled) => match state.tags.axis_mut(index) {
            Some(axis) => {
                axis.enabled = enabled;
                Effect::Cascade(CascadeStart::UserTagChanged(index))
            }
            None => Effect::None,
        },
        DashboardEvent::ToggleTagValue(index, name) => {
            if let Some(axis) = state.tags.axis_mut(index) {
                axis.values.toggle(&name);
            }
            Effect::None
        }
        DashboardEvent::SelectAllTagValues(index) => {
            if let Some(axis) = state.tags.axis_mut(index) {
                axis.values.select_all();
            }
            Effect::None
        }
        DashboardEvent::ClearTagValues(index) => {
            if let Some(axis) = state.tags.axis_mut(index) {
                axis.values.clear();
            }
            Effect::None
        }
        DashboardEvent::TagValueFilter(index, filter) => {
            if let Some(axis) = state.tags.axis_mut(index) {
                axis.values.filter = filter;
            }
            Effect::None
        }
        DashboardEvent::GroupByTag(name) => {
            state.tags.group_by_tag = Some(name);
            Effect::None
        }
        DashboardEvent::TagKey(name) => {
            state.tag_key = Some(name);
            Effect::None
        }
        DashboardEvent::ToggleTagKey(name) => {
            state.tag_keys.toggle(&name);
            Effect::None
        }
        DashboardEvent::GroupBy(name) => {
            state.pick_group_by(&name);
            Effect::None
        }
        DashboardEvent::Consolidate(consolidate) => {
            state.consolidate = consolidate;
            Effect::None
        }
        DashboardEvent::PlotType(plot_type) => {
            state.plot_type = plot_type;
            Effect::None
        }
        DashboardEvent::UsageCost(usage_cost) => {
            state.usage_cost = Some(usage_cost);
            // Operations lookups carry the cost types in cost mode only.
            Effect::Cascade(CascadeStart::Operations)
        }
        DashboardEvent::ToggleCostType(name) => {
            state.cost_types.toggle(&name);
            Effect::Cascade(CascadeStart::Operations)
        }
        DashboardEvent::ConsolidateGroups(enabled) => {
            state.consolidate_groups = enabled;
            Effect::None
        }
        DashboardEvent::ReservationSharing(sharing) => {
            state.reservation_sharing = sharing;
            Effect::ReloadOps
        }
        DashboardEvent::Start(start) => {
            state.start = start;
            state.spans = None;
            state.time_params.clear();
            Effect::None
        }
        DashboardEvent::End(end) => {
            state.end = end;
            state.spans = None;
            state.time_params.clear();
            Effect::None
        }
        DashboardEvent::Submit => Effect::Query,
        DashboardEvent::Download => Effect::Download,
    }
}
