//! Sequential dimension resolution.
//!
//! A cascade is an ordered list of [`CascadeStep`]s planned from what changed.
//! Each step reads the upstream selections, awaits one request, then writes
//! its dimension back only if its [`Ticket`] is still current. A failed step
//! leaves its dimension untouched and ends the cascade.

use std::cell::RefCell;

use api::{ApiError, Backend, Item, ItemEndpoint, QueryParams};
use dioxus::prelude::{Readable, Signal, Writable};
use tracing::{debug, info, warn};

use super::model::{org_units, select_named, Dimension};
use super::state::{DashboardState, Ticket};

/// Shared access to the dashboard state across await points.
///
/// Closures run synchronously, so a borrow never spans a request.
pub trait StateHandle {
    fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R;
    fn write<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R;
}

impl StateHandle for RefCell<DashboardState> {
    fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.borrow())
    }

    fn write<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}

impl StateHandle for Signal<DashboardState> {
    fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        self.with(f)
    }

    fn write<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        let mut signal = *self;
        signal.with_mut(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScope {
    /// Every tag key, one request after another.
    All,
    One(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    Accounts,
    Regions,
    Zones,
    Products,
    TagKeys,
    UserTagValues(TagScope),
    Operations,
    UsageTypes,
}

/// What changed, and therefore where a cascade begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStart {
    /// Refetch accounts and everything downstream.
    Accounts,
    AccountsChanged,
    /// Re-selects the accounts of the new unit first.
    OrgUnitChanged,
    /// Refetch regions (or zones) and everything downstream.
    Location,
    LocationChanged,
    Products,
    ProductsChanged,
    Operations,
    OperationsChanged,
    UsageTypes,
    UserTagChanged(usize),
    UserTagsShown,
}

impl CascadeStart {
    pub fn plan(self, state: &DashboardState) -> Vec<CascadeStep> {
        let location = if state.show_zones {
            CascadeStep::Zones
        } else {
            CascadeStep::Regions
        };
        let mut after_products = Vec::new();
        if state.tags.shown {
            after_products.push(CascadeStep::UserTagValues(TagScope::All));
        }
        after_products.extend([CascadeStep::Operations, CascadeStep::UsageTypes]);

        let mut steps = Vec::new();
        match self {
            Self::Accounts => {
                steps.extend([CascadeStep::Accounts, location, CascadeStep::Products]);
                steps.extend(after_products);
            }
            Self::AccountsChanged | Self::OrgUnitChanged | Self::Location => {
                steps.extend([location, CascadeStep::Products]);
                steps.extend(after_products);
            }
            Self::LocationChanged | Self::Products => {
                steps.push(CascadeStep::Products);
                steps.extend(after_products);
            }
            Self::ProductsChanged => steps.extend(after_products),
            Self::Operations => steps.extend([CascadeStep::Operations, CascadeStep::UsageTypes]),
            Self::OperationsChanged | Self::UsageTypes => steps.push(CascadeStep::UsageTypes),
            Self::UserTagChanged(index) => {
                steps.push(CascadeStep::UserTagValues(TagScope::One(index)))
            }
            Self::UserTagsShown => {
                if !state.tags.is_loaded() {
                    steps.push(CascadeStep::TagKeys);
                }
                steps.push(CascadeStep::UserTagValues(TagScope::All));
            }
        }
        steps
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOutcome {
    Completed,
    /// A newer cascade started; late results were discarded.
    Superseded,
}

/// Where a step's request goes, or why it needs none.
enum Request {
    Items(ItemEndpoint, QueryParams),
    /// The dimension is disabled; the chain continues without it.
    Skip,
    /// The tag key is disabled; its universe becomes empty.
    EmptyTagValues(usize),
}

pub struct Resolver<'a, B, S> {
    backend: &'a B,
    state: &'a S,
}

impl<'a, B: Backend, S: StateHandle> Resolver<'a, B, S> {
    pub fn new(backend: &'a B, state: &'a S) -> Self {
        Self { backend, state }
    }

    pub async fn run(&self, start: CascadeStart) -> Result<CascadeOutcome, ApiError> {
        let (ticket, steps) = self.state.write(|state| {
            let ticket = state.begin_cascade();
            if start == CascadeStart::OrgUnitChanged {
                state.apply_org_unit();
            }
            (ticket, start.plan(state))
        });
        info!(?start, steps = steps.len(), "cascade started");

        for step in steps {
            let outcome = match step {
                CascadeStep::UserTagValues(TagScope::All) => self.all_tag_values(ticket).await,
                _ => self.step(step, ticket).await,
            };
            match outcome {
                Ok(CascadeOutcome::Completed) => {}
                Ok(CascadeOutcome::Superseded) => {
                    warn!(?start, ?step, "cascade superseded, discarding late result");
                    return Ok(CascadeOutcome::Superseded);
                }
                Err(err) => {
                    warn!(?start, ?step, %err, "cascade stopped");
                    return Err(err);
                }
            }
        }

        info!(?start, "cascade finished");
        Ok(CascadeOutcome::Completed)
    }

    async fn all_tag_values(&self, ticket: Ticket) -> Result<CascadeOutcome, ApiError> {
        let count = self.state.read(|state| state.tags.axes.len());
        for index in 0..count {
            let step = CascadeStep::UserTagValues(TagScope::One(index));
            if self.step(step, ticket).await? == CascadeOutcome::Superseded {
                return Ok(CascadeOutcome::Superseded);
            }
        }
        Ok(CascadeOutcome::Completed)
    }

    async fn step(&self, step: CascadeStep, ticket: Ticket) -> Result<CascadeOutcome, ApiError> {
        let request = self.state.read(|state| request_for(step, state));
        let (endpoint, params) = match request {
            Request::Items(endpoint, params) => (endpoint, params),
            Request::Skip => return Ok(CascadeOutcome::Completed),
            Request::EmptyTagValues(index) => {
                return Ok(self.state.write(|state| {
                    if !state.is_current(ticket) {
                        return CascadeOutcome::Superseded;
                    }
                    if let Some(axis) = state.tags.axis_mut(index) {
                        axis.values.available = Some(Vec::new());
                    }
                    CascadeOutcome::Completed
                }));
            }
        };

        debug!(?step, endpoint = endpoint.path(), params = params.len(), "resolving");
        let items = self.backend.items(endpoint, &params).await?;

        Ok(self.state.write(|state| {
            if !state.is_current(ticket) {
                return CascadeOutcome::Superseded;
            }
            apply(step, state, items);
            CascadeOutcome::Completed
        }))
    }
}

fn add_selected(params: &mut QueryParams, state: &DashboardState, dimension: Dimension) {
    if !state.is_enabled(dimension) {
        return;
    }
    if let Some(names) = state.selection(dimension).selected_names() {
        params.set(dimension.key(), names);
    }
}

fn predefined(state: &DashboardState) -> QueryParams {
    state.predefined_query.clone().unwrap_or_default()
}

/// Request for one step, built from the upstream selections.
fn request_for(step: CascadeStep, state: &DashboardState) -> Request {
    let dimension_step = |dimension: Dimension, endpoint: ItemEndpoint, params: QueryParams| {
        if state.is_enabled(dimension) {
            Request::Items(endpoint, params)
        } else {
            Request::Skip
        }
    };

    match step {
        CascadeStep::Accounts => {
            dimension_step(Dimension::Account, ItemEndpoint::Accounts, QueryParams::new())
        }
        CascadeStep::Regions | CascadeStep::Zones => {
            let mut params = QueryParams::new();
            add_selected(&mut params, state, Dimension::Account);
            let (dimension, endpoint) = match step {
                CascadeStep::Zones => (Dimension::Zone, ItemEndpoint::Zones),
                _ => (Dimension::Region, ItemEndpoint::Regions),
            };
            dimension_step(dimension, endpoint, params)
        }
        CascadeStep::Products => {
            let mut params = state
                .products_query
                .clone()
                .unwrap_or_else(|| predefined(state));
            add_selected(&mut params, state, Dimension::Account);
            add_selected(&mut params, state, Dimension::Region);
            if state.has_resources() {
                params.set("resources", true);
            }
            dimension_step(Dimension::Product, ItemEndpoint::Products, params)
        }
        CascadeStep::TagKeys => Request::Items(ItemEndpoint::Tags, QueryParams::new()),
        CascadeStep::UserTagValues(TagScope::One(index)) => {
            match state.tags.axes.get(index) {
                None => Request::Skip,
                Some(axis) if !axis.enabled => Request::EmptyTagValues(index),
                Some(_) => {
                    let mut params = QueryParams::new().with("index", index);
                    add_selected(&mut params, state, Dimension::Account);
                    add_selected(&mut params, state, Dimension::Region);
                    add_selected(&mut params, state, Dimension::Product);
                    Request::Items(ItemEndpoint::UserTagValues, params)
                }
            }
        }
        // Expanded by the resolver before requests are built.
        CascadeStep::UserTagValues(TagScope::All) => Request::Skip,
        CascadeStep::Operations => {
            let mut params = predefined(state);
            params.set(
                "usage_cost",
                state.usage_cost.map(|mode| mode.as_str()).unwrap_or_default(),
            );
            params.set("showLent", state.reservation_sharing.show_lent());
            if state.is_cost() {
                params.set("costType", state.cost_types.query_value());
            }
            add_selected(&mut params, state, Dimension::Account);
            add_selected(&mut params, state, Dimension::Region);
            add_selected(&mut params, state, Dimension::Product);
            dimension_step(Dimension::Operation, ItemEndpoint::Operations, params)
        }
        CascadeStep::UsageTypes => {
            let mut params = predefined(state);
            add_selected(&mut params, state, Dimension::Account);
            add_selected(&mut params, state, Dimension::Region);
            add_selected(&mut params, state, Dimension::Product);
            add_selected(&mut params, state, Dimension::Operation);
            if state.has_resources() {
                params.set("resources", true);
            }
            dimension_step(Dimension::UsageType, ItemEndpoint::UsageTypes, params)
        }
    }
}

fn apply(step: CascadeStep, state: &mut DashboardState, items: Vec<Item>) {
    match step {
        CascadeStep::Accounts => apply_accounts(state, items),
        CascadeStep::Regions => state.selection_mut(Dimension::Region).resolve(items),
        CascadeStep::Zones => state.selection_mut(Dimension::Zone).resolve(items),
        CascadeStep::Products => state.selection_mut(Dimension::Product).resolve(items),
        CascadeStep::Operations => state.selection_mut(Dimension::Operation).resolve(items),
        CascadeStep::UsageTypes => state.selection_mut(Dimension::UsageType).resolve(items),
        CascadeStep::TagKeys => apply_tag_keys(state, items),
        CascadeStep::UserTagValues(TagScope::One(index)) => {
            if let Some(axis) = state.tags.axis_mut(index) {
                axis.values.resolve(items);
            }
        }
        CascadeStep::UserTagValues(TagScope::All) => {}
    }
}

/// Accounts honour URL names once; otherwise every account in the org unit
/// is selected.
fn apply_accounts(state: &mut DashboardState, accounts: Vec<Item>) {
    state.organizational_units = org_units(&accounts);
    let selection = state.selection_mut(Dimension::Account);
    if selection.prior.is_some() && selection.selected.is_none() {
        selection.resolve(accounts);
    } else {
        selection.available = Some(accounts);
        state.apply_org_unit();
    }
}

/// Installs the tag key universe for both the user tag axis and the tag
/// coverage key pickers.
pub fn apply_tag_keys(state: &mut DashboardState, keys: Vec<Item>) {
    state.tags.load_keys(&keys);

    let selected = match (&state.tag_keys.prior, &state.tag_keys.selected) {
        (Some(prior), None) => select_named(&keys, prior.iter().map(String::as_str)),
        _ => keys.clone(),
    };
    state.tag_keys.selected = Some(selected);

    let single = match (&state.tag_key_prior, &state.tag_key) {
        (Some(prior), None) => keys.iter().find(|key| &key.name == prior),
        _ => keys.first(),
    };
    state.tag_key = single.map(|key| key.name.clone());
    state.tag_keys.available = Some(keys);
}
