//! Per-page presets and the bootstrap sequence every page runs before its
//! first data fetch.

use api::{ApiError, Backend, ItemEndpoint, OpsEndpoint, QueryParams};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::core::model::{Consolidation, CostTypes, GroupBy, PlotType, UsageCost};
use crate::core::resolver::{apply_tag_keys, CascadeOutcome, CascadeStart, Resolver, StateHandle};
use crate::core::state::DashboardState;
use crate::core::url_state;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Detail,
    Reservation,
    SavingsPlans,
    Utilization,
    TagCoverage,
    Summary,
}

impl PageKind {
    pub const ALL: [PageKind; 6] = [
        Self::Summary,
        Self::Detail,
        Self::Reservation,
        Self::SavingsPlans,
        Self::Utilization,
        Self::TagCoverage,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Detail => "Detail",
            Self::Reservation => "Reservations",
            Self::SavingsPlans => "Savings Plans",
            Self::Utilization => "Utilization",
            Self::TagCoverage => "Tag Coverage",
            Self::Summary => "Summary",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Detail => "/",
            Self::Reservation => "/reservation",
            Self::SavingsPlans => "/savingsplans",
            Self::Utilization => "/utilization",
            Self::TagCoverage => "/tagcoverage",
            Self::Summary => "/summary",
        }
    }

    pub fn config(self) -> PageConfig {
        use GroupBy::*;

        let base = PageConfig {
            group_bys: Vec::new(),
            default_group_by: Region,
            consolidate: Consolidation::Daily,
            plot_type: PlotType::Area,
            usage_unit: "Instances",
            usage_cost: Some(UsageCost::Cost),
            cost_types: CostTypes::default(),
            resources: false,
            tag_coverage: false,
            elasticity: false,
            legend_enabled: true,
            summary_range: false,
            user_tags: true,
            zones: false,
        };

        match self {
            Self::Detail => PageConfig {
                group_bys: vec![
                    None, CostType, OrgUnit, Account, Region, Product, Operation, UsageType, Tag,
                ],
                ..base
            },
            Self::Reservation | Self::SavingsPlans => PageConfig {
                group_bys: vec![
                    CostType, OrgUnit, Account, Region, Zone, Product, Operation, UsageType, Tag,
                ],
                default_group_by: Operation,
                consolidate: Consolidation::Hourly,
                cost_types: CostTypes {
                    tax: false,
                    ..CostTypes::default()
                },
                zones: true,
                ..base
            },
            Self::Utilization => PageConfig {
                group_bys: vec![OrgUnit, Account, Region, Product, Operation, UsageType],
                default_group_by: OrgUnit,
                plot_type: PlotType::Line,
                usage_unit: "ECUs",
                usage_cost: Some(UsageCost::Usage),
                elasticity: true,
                legend_enabled: false,
                user_tags: false,
                ..base
            },
            Self::TagCoverage => PageConfig {
                group_bys: vec![
                    None, TagKey, CostType, OrgUnit, Account, Region, Product, Operation,
                    UsageType, Tag,
                ],
                default_group_by: TagKey,
                plot_type: PlotType::Line,
                usage_unit: "",
                usage_cost: Option::None,
                resources: true,
                tag_coverage: true,
                legend_enabled: false,
                ..base
            },
            Self::Summary => PageConfig {
                group_bys: vec![CostType, OrgUnit, Account, Region, Product, Operation, UsageType],
                default_group_by: Product,
                usage_unit: "",
                summary_range: true,
                user_tags: false,
                ..base
            },
        }
    }
}

/// What differs between pages before any URL state is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub group_bys: Vec<GroupBy>,
    pub default_group_by: GroupBy,
    pub consolidate: Consolidation,
    pub plot_type: PlotType,
    pub usage_unit: &'static str,
    /// `None` on pages that plot neither cost nor usage.
    pub usage_cost: Option<UsageCost>,
    pub cost_types: CostTypes,
    /// Limits lookups to products with tagged resources.
    pub resources: bool,
    pub tag_coverage: bool,
    pub elasticity: bool,
    pub legend_enabled: bool,
    /// Six months back instead of one.
    pub summary_range: bool,
    pub user_tags: bool,
    pub zones: bool,
}

impl PageConfig {
    /// Series made entirely of zeros are still plotted.
    pub fn zero_data_valid(&self) -> bool {
        self.elasticity || self.tag_coverage
    }
}

/// Operation lists some pages constrain every query with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageOps {
    pub reservation: Vec<String>,
    pub savings_plan: Vec<String>,
    pub utilization: Vec<String>,
    pub savings_plan_products: Vec<String>,
}

impl PageOps {
    /// Savings plan operations followed by the reservation ones.
    fn savings_and_reservation(&self) -> String {
        self.savings_plan
            .iter()
            .chain(&self.reservation)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Fresh state for `page` with `fragment` applied on top.
pub fn initial_state(page: PageKind, fragment: &str, now: OffsetDateTime) -> DashboardState {
    let mut state = DashboardState::for_page(page, now);
    url_state::decode(fragment, &mut state);
    let config = page.config();
    if !config.zones {
        state.show_zones = false;
    }
    if !config.user_tags {
        state.tags.shown = false;
    }
    state.adjust_group_bys();
    state
}

/// Fields merged into the product, operation and usage type lookups.
pub fn predefined_query(state: &DashboardState) -> Option<QueryParams> {
    let ops = &state.ops;
    match state.page {
        PageKind::Reservation => Some(
            QueryParams::new()
                .with("operation", ops.reservation.join(","))
                .with("forReservation", true),
        ),
        PageKind::SavingsPlans => Some(
            QueryParams::new()
                .with("operation", ops.savings_and_reservation())
                .with("forSavingsPlans", true)
                .with("product", ops.savings_plan_products.join(",")),
        ),
        PageKind::Utilization => Some(
            QueryParams::new()
                .with("operation", ops.utilization.join(","))
                .with("forReservation", true),
        ),
        _ => None,
    }
}

/// Replacement for the predefined fields in the product lookup.
pub fn products_query(state: &DashboardState) -> Option<QueryParams> {
    match state.page {
        PageKind::SavingsPlans => Some(savings_plan_products_query(&state.ops)),
        _ => None,
    }
}

fn savings_plan_products_query(ops: &PageOps) -> QueryParams {
    QueryParams::new()
        .with("operation", ops.savings_plan.join(","))
        .with("forSavingsPlans", true)
}

/// Page fields merged over the `getData` defaults.
pub fn data_query(state: &DashboardState) -> QueryParams {
    let ops = &state.ops;
    let mut query = match state.page {
        PageKind::Reservation => QueryParams::new()
            .with("operation", ops.reservation.join(","))
            .with("forReservation", true),
        PageKind::SavingsPlans => QueryParams::new()
            .with("operation", ops.savings_and_reservation())
            .with("product", ops.savings_plan_products.join(","))
            .with("forSavingsPlans", true),
        PageKind::Utilization => QueryParams::new()
            .with("operation", ops.utilization.join(","))
            .with("forReservation", true)
            .with("elasticity", true),
        _ => QueryParams::new(),
    };
    if state.show_zones && state.page.config().zones {
        query.set("showZones", true);
    }
    query
}

/// The summary page's two queries: monthly totals for the table, then the
/// daily series for the chart.
pub fn summary_queries() -> (QueryParams, QueryParams) {
    let table = QueryParams::new()
        .with("consolidate", "monthly")
        .with("aggregate", "data")
        .with("breakdown", true);
    let chart = QueryParams::new()
        .with("consolidate", "daily")
        .with("aggregate", "none")
        .with("breakdown", false);
    (table, chart)
}

fn install_queries(state: &mut DashboardState) {
    state.predefined_query = predefined_query(state);
    state.products_query = products_query(state);
}

/// Fetches the operation lists the page constrains its queries with.
///
/// `with_products` also refreshes the savings plan product list, which only
/// the first load needs.
pub async fn load_ops<B: Backend, S: StateHandle>(
    backend: &B,
    state: &S,
    with_products: bool,
) -> Result<(), ApiError> {
    let (page, show_lent, mut ops) = state.read(|s| {
        (
            s.page,
            s.reservation_sharing.show_lent(),
            s.ops.clone(),
        )
    });
    let lent = QueryParams::new().with("showLent", show_lent);

    match page {
        PageKind::Reservation => {
            ops.reservation = backend.operations(OpsEndpoint::Reservation, &lent).await?;
        }
        PageKind::SavingsPlans => {
            ops.savings_plan = backend.operations(OpsEndpoint::SavingsPlan, &lent).await?;
            ops.reservation = backend.operations(OpsEndpoint::Reservation, &lent).await?;
            if with_products {
                let query = savings_plan_products_query(&ops);
                ops.savings_plan_products = backend
                    .items(ItemEndpoint::Products, &query)
                    .await?
                    .into_iter()
                    .map(|product| product.name)
                    .collect();
            }
        }
        PageKind::Utilization => {
            ops.utilization = backend
                .operations(OpsEndpoint::Utilization, &QueryParams::new())
                .await?;
        }
        _ => return Ok(()),
    }

    debug!(?page, reservation = ops.reservation.len(), savings_plan = ops.savings_plan.len(), "operations loaded");
    state.write(|s| {
        s.ops = ops;
        install_queries(s);
    });
    Ok(())
}

/// Everything a page does between decoding the URL and its first data query:
/// time span, operation lists, tag keys, then the full cascade.
pub async fn bootstrap<B: Backend, S: StateHandle>(
    backend: &B,
    state: &S,
) -> Result<CascadeOutcome, ApiError> {
    let span_query = state.read(|s| {
        s.spans.map(|spans| {
            QueryParams::new()
                .with("spans", spans)
                .with("end", s.end.clone())
                .with("consolidate", s.consolidate.as_str())
        })
    });
    if let Some(query) = span_query {
        let span = backend.time_span(&query).await?;
        state.write(|s| {
            s.start = span.start;
            s.end = span.end;
        });
    }

    load_ops(backend, state, true).await?;

    let needs_tags = state.read(|s| s.tags.shown || s.page == PageKind::TagCoverage);
    if needs_tags {
        let keys = backend.items(ItemEndpoint::Tags, &QueryParams::new()).await?;
        info!(keys = keys.len(), "tag keys loaded");
        state.write(|s| apply_tag_keys(s, keys));
    }

    Resolver::new(backend, state).run(CascadeStart::Accounts).await
}

/// Reservation sharing switched between borrowed and lent.
pub async fn reservation_sharing_changed<B: Backend, S: StateHandle>(
    backend: &B,
    state: &S,
) -> Result<CascadeOutcome, ApiError> {
    load_ops(backend, state, false).await?;
    Resolver::new(backend, state).run(CascadeStart::Operations).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn state(page: PageKind) -> DashboardState {
        DashboardState::for_page(page, datetime!(2024-03-15 15:00 UTC))
    }

    #[test]
    fn presets_pick_their_defaults() {
        assert_eq!(PageKind::Detail.config().default_group_by, GroupBy::Region);
        assert_eq!(PageKind::Reservation.config().consolidate, Consolidation::Hourly);
        assert!(!PageKind::Reservation.config().cost_types.tax);
        assert_eq!(PageKind::Utilization.config().usage_unit, "ECUs");
        assert!(PageKind::TagCoverage.config().zero_data_valid());
        assert!(!PageKind::Summary.config().zero_data_valid());
        assert_eq!(PageKind::Summary.config().default_group_by, GroupBy::Product);
    }

    #[test]
    fn savings_plans_query_lists_both_op_kinds() {
        let mut state = state(PageKind::SavingsPlans);
        state.ops = PageOps {
            reservation: vec!["RI".into()],
            savings_plan: vec!["SP1".into(), "SP2".into()],
            utilization: Vec::new(),
            savings_plan_products: vec!["ec2".into(), "lambda".into()],
        };
        install_queries(&mut state);

        let predefined = state.predefined_query.clone().unwrap_or_default();
        assert_eq!(predefined.text("operation").as_deref(), Some("SP1,SP2,RI"));
        assert_eq!(predefined.text("product").as_deref(), Some("ec2,lambda"));
        let products = state.products_query.clone().unwrap_or_default();
        assert_eq!(products.text("operation").as_deref(), Some("SP1,SP2"));
        assert!(!products.contains("product"));
    }

    #[test]
    fn data_query_adds_zone_mode_only_where_offered() {
        let mut reservation = state(PageKind::Reservation);
        reservation.show_zones = true;
        assert!(data_query(&reservation).contains("showZones"));

        let mut detail = state(PageKind::Detail);
        detail.show_zones = true;
        assert!(data_query(&detail).is_empty());
    }

    #[test]
    fn initial_state_drops_unsupported_modes() {
        let now = datetime!(2024-03-15 15:00 UTC);
        let detail = initial_state(PageKind::Detail, "showZones=true&groupBy=Tag", now);
        assert!(!detail.show_zones);
        assert!(!detail.group_bys.contains(&GroupBy::Tag));
        assert_eq!(detail.group_by, GroupBy::Region);

        let reservation = initial_state(PageKind::Reservation, "showZones=true&groupBy=Zone", now);
        assert_eq!(reservation.group_by, GroupBy::Zone);
        assert!(!reservation.group_bys.contains(&GroupBy::Region));
    }
}
