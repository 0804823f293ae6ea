//! The single dashboard state object every component reads and mutates.

use api::QueryParams;
use time::OffsetDateTime;

use super::model::{
    Consolidation, CostTypes, Dimension, DimensionMask, GroupBy, PlotType, ReservationSharing,
    Selection, UsageCost, UserTags,
};
use super::timing;
use crate::pages::{PageKind, PageOps};

/// Identifies one cascade run. Only the latest ticket may write results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub page: PageKind,
    pub dimensions: DimensionMask,
    pub selections: [Selection; 6],
    pub organizational_unit: String,
    pub organizational_units: Vec<String>,
    pub show_zones: bool,
    pub usage_cost: Option<UsageCost>,
    pub usage_unit: String,
    pub plot_type: PlotType,
    pub reservation_sharing: ReservationSharing,
    pub consolidate: Consolidation,
    pub consolidate_groups: bool,
    pub group_bys: Vec<GroupBy>,
    pub default_group_by: GroupBy,
    pub group_by: GroupBy,
    pub cost_types: CostTypes,
    pub start: String,
    pub end: String,
    pub spans: Option<i64>,
    pub graph_only: bool,
    pub resources: Option<String>,
    pub tag_coverage: bool,
    /// Tag key universe for tag coverage; multi-select when grouping by tag key.
    pub tag_keys: Selection,
    pub tag_key: Option<String>,
    pub tag_key_prior: Option<String>,
    pub tags: UserTags,
    pub ops: PageOps,
    /// Extra fields sent with product, operation and usage type lookups.
    pub predefined_query: Option<QueryParams>,
    /// Replaces `predefined_query` for the product lookup only.
    pub products_query: Option<QueryParams>,
    /// `start=..&end=..` accumulated while decoding, for links to other pages.
    pub time_params: String,
    generation: u64,
}

impl DashboardState {
    pub fn for_page(page: PageKind, now: OffsetDateTime) -> Self {
        let config = page.config();
        let (start, end) = if config.summary_range {
            timing::summary_range(now)
        } else {
            timing::default_range(now)
        };

        Self {
            page,
            dimensions: DimensionMask::default(),
            selections: Default::default(),
            organizational_unit: String::new(),
            organizational_units: Vec::new(),
            show_zones: false,
            usage_cost: config.usage_cost,
            usage_unit: config.usage_unit.to_string(),
            plot_type: config.plot_type,
            reservation_sharing: ReservationSharing::Borrowed,
            consolidate: config.consolidate,
            consolidate_groups: false,
            group_bys: config.group_bys.clone(),
            default_group_by: config.default_group_by,
            group_by: config.default_group_by,
            cost_types: config.cost_types,
            start,
            end,
            spans: None,
            graph_only: false,
            resources: config.resources.then(|| "true".to_string()),
            tag_coverage: config.tag_coverage,
            tag_keys: Selection::default(),
            tag_key: None,
            tag_key_prior: None,
            tags: UserTags::default(),
            ops: PageOps::default(),
            predefined_query: None,
            products_query: None,
            time_params: String::new(),
            generation: 0,
        }
    }

    pub fn selection(&self, dimension: Dimension) -> &Selection {
        &self.selections[dimension.index()]
    }

    pub fn selection_mut(&mut self, dimension: Dimension) -> &mut Selection {
        &mut self.selections[dimension.index()]
    }

    pub fn is_enabled(&self, dimension: Dimension) -> bool {
        self.dimensions.is_enabled(dimension)
    }

    /// Zone in zone mode, otherwise region.
    pub fn location_dimension(&self) -> Dimension {
        if self.show_zones {
            Dimension::Zone
        } else {
            Dimension::Region
        }
    }

    pub fn org_unit(&self) -> Option<&str> {
        Some(self.organizational_unit.as_str()).filter(|unit| !unit.is_empty())
    }

    pub fn is_cost(&self) -> bool {
        self.usage_cost == Some(UsageCost::Cost)
    }

    pub fn has_resources(&self) -> bool {
        self.resources.as_deref().is_some_and(|value| !value.is_empty())
    }

    /// Sign prefixed to amounts; usage figures carry none.
    pub fn currency_sign<'a>(&self, configured: &'a str) -> &'a str {
        if self.is_cost() {
            configured
        } else {
            ""
        }
    }

    pub fn begin_cascade(&mut self) -> Ticket {
        self.generation += 1;
        Ticket(self.generation)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation == ticket.0
    }

    /// Re-selects every account inside the current org unit.
    pub fn apply_org_unit(&mut self) {
        let unit = self.org_unit().map(str::to_string);
        let accounts = self.selection_mut(Dimension::Account);
        let selected = accounts
            .available()
            .iter()
            .filter(|account| super::filter::in_org_unit(&account.path(), unit.as_deref()))
            .cloned()
            .collect();
        accounts.selected = Some(selected);
    }

    /// Drops group-bys the current view cannot use: `Tag` while user tags
    /// are hidden, and whichever of region or zone is not displayed.
    pub fn adjust_group_bys(&mut self) {
        if !self.tags.shown {
            self.group_bys.retain(|group_by| *group_by != GroupBy::Tag);
        }
        let hidden = if self.show_zones {
            GroupBy::Region
        } else {
            GroupBy::Zone
        };
        self.group_bys.retain(|group_by| *group_by != hidden);
        if !self.group_bys.contains(&self.group_by) {
            self.group_by = self.default_group_by;
        }
    }

    /// Shows or hides the user tag axis, keeping the group-by list in step.
    pub fn set_user_tags_shown(&mut self, shown: bool) {
        self.tags.shown = shown;
        let supports_tags = self.page.config().group_bys.contains(&GroupBy::Tag);
        if shown {
            if supports_tags && !self.group_bys.contains(&GroupBy::Tag) {
                self.group_bys.push(GroupBy::Tag);
            }
        } else {
            self.group_bys.retain(|group_by| *group_by != GroupBy::Tag);
            if self.group_by == GroupBy::Tag {
                self.group_by = self.default_group_by;
            }
        }
    }

    /// Picks a group-by by name among this page's choices.
    pub fn pick_group_by(&mut self, name: &str) {
        if let Some(found) = self.group_bys.iter().find(|g| g.as_str() == name) {
            self.group_by = *found;
        }
    }

    /// The group-by after `current`, wrapping around.
    pub fn next_group_by(&self, current: GroupBy) -> Option<GroupBy> {
        let position = self.group_bys.iter().position(|g| *g == current)?;
        self.group_bys
            .get((position + 1) % self.group_bys.len())
            .copied()
    }

    /// `start=..&end=..` for links to the other pages.
    pub fn time_link(&self) -> String {
        if self.time_params.is_empty() {
            format!(
                "start={}&end={}",
                urlencoding::encode(&self.start),
                urlencoding::encode(&self.end)
            )
        } else {
            self.time_params.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::Item;
    use time::macros::datetime;

    fn state(page: PageKind) -> DashboardState {
        DashboardState::for_page(page, datetime!(2024-03-15 15:00 UTC))
    }

    #[test]
    fn newer_ticket_supersedes_older() {
        let mut state = state(PageKind::Detail);
        let first = state.begin_cascade();
        assert!(state.is_current(first));
        let second = state.begin_cascade();
        assert!(!state.is_current(first));
        assert!(state.is_current(second));
    }

    #[test]
    fn org_unit_scenario() {
        let mut state = state(PageKind::Detail);
        state.selection_mut(Dimension::Account).resolve(vec![
            Item::with_parents("one", ["us", "prod"]),
            Item::with_parents("two", ["us", "prod", "team1"]),
            Item::with_parents("three", ["us", "dev"]),
        ]);
        state.organizational_unit = "us/prod".into();
        state.apply_org_unit();
        let names: Vec<&str> = state
            .selection(Dimension::Account)
            .selected()
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn group_bys_follow_zone_mode_and_tags() {
        let mut state = state(PageKind::Reservation);
        state.show_zones = true;
        state.group_by = GroupBy::Region;
        state.adjust_group_bys();
        assert!(!state.group_bys.contains(&GroupBy::Region));
        assert!(state.group_bys.contains(&GroupBy::Zone));
        assert!(!state.group_bys.contains(&GroupBy::Tag));
        assert_eq!(state.group_by, GroupBy::Operation);
    }

    #[test]
    fn hiding_user_tags_restores_default_group_by() {
        let mut state = state(PageKind::Detail);
        state.set_user_tags_shown(true);
        assert!(state.group_bys.contains(&GroupBy::Tag));
        state.group_by = GroupBy::Tag;
        state.set_user_tags_shown(false);
        assert!(!state.group_bys.contains(&GroupBy::Tag));
        assert_eq!(state.group_by, GroupBy::Region);
    }

    #[test]
    fn next_group_by_wraps() {
        let state = state(PageKind::Summary);
        assert_eq!(state.next_group_by(GroupBy::Product), Some(GroupBy::Operation));
        assert_eq!(state.next_group_by(GroupBy::UsageType), Some(GroupBy::CostType));
        assert_eq!(state.next_group_by(GroupBy::Tag), None);
    }

    #[test]
    fn time_link_defaults_to_current_range() {
        let state = state(PageKind::Detail);
        assert_eq!(
            state.time_link(),
            "start=2024-02-01%2012AM&end=2024-03-15%2003PM"
        );
    }
}
