//! Dimension, selection and option types the dashboard state is built from.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use api::Item;
use thiserror::Error;

use super::filter;

/// The six fixed filter axes, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Account,
    Region,
    Zone,
    Product,
    Operation,
    UsageType,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Self::Account,
        Self::Region,
        Self::Zone,
        Self::Product,
        Self::Operation,
        Self::UsageType,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Request and URL key for the selected names.
    pub fn key(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Region => "region",
            Self::Zone => "zone",
            Self::Product => "product",
            Self::Operation => "operation",
            Self::UsageType => "usageType",
        }
    }

    /// Used for the `filter-<plural>` URL companion.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Region => "regions",
            Self::Zone => "zones",
            Self::Product => "products",
            Self::Operation => "operations",
            Self::UsageType => "usageTypes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Account => "Accounts",
            Self::Region => "Regions",
            Self::Zone => "Zones",
            Self::Product => "Products",
            Self::Operation => "Operations",
            Self::UsageType => "Usage Types",
        }
    }
}

/// Which dimensions take part in resolution and querying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DimensionMask([bool; 6]);

impl DimensionMask {
    pub fn all() -> Self {
        Self([true; 6])
    }

    pub fn is_enabled(&self, dimension: Dimension) -> bool {
        self.0[dimension.index()]
    }

    pub fn set(&mut self, dimension: Dimension, enabled: bool) {
        self.0[dimension.index()] = enabled;
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|enabled| *enabled)
    }

    /// `true,false,...`, one token per dimension.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|enabled| enabled.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Token `i` enables dimension `i` only when it reads exactly `true`.
    pub fn decode(raw: &str) -> Self {
        let mut mask = [false; 6];
        for (slot, token) in mask.iter_mut().zip(raw.split(',')) {
            *slot = token == "true";
        }
        Self(mask)
    }
}

/// Universe, live selection and display filter of one dimension.
///
/// `selected` stays `None` until the first fetch resolves. `prior` carries
/// names decoded from the URL and is consulted only before that.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub available: Option<Vec<Item>>,
    pub selected: Option<Vec<Item>>,
    pub prior: Option<Vec<String>>,
    pub filter: String,
}

impl Selection {
    pub fn available(&self) -> &[Item] {
        self.available.as_deref().unwrap_or_default()
    }

    pub fn selected(&self) -> &[Item] {
        self.selected.as_deref().unwrap_or_default()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected().iter().any(|item| item.name == name)
    }

    /// Installs a freshly fetched universe and reconciles the selection.
    pub fn resolve(&mut self, available: Vec<Item>) {
        let selected = reconcile(
            self.selected.as_deref(),
            self.prior.as_deref(),
            &available,
        );
        self.selected = Some(selected);
        self.available = Some(available);
    }

    /// Toggles one name in or out of the live selection, keeping universe order.
    pub fn toggle(&mut self, name: &str) {
        let mut names: BTreeSet<&str> = self.selected().iter().map(|i| i.name.as_str()).collect();
        if !names.remove(name) {
            names.insert(name);
        }
        let selected = self
            .available()
            .iter()
            .filter(|item| names.contains(item.name.as_str()))
            .cloned()
            .collect();
        self.selected = Some(selected);
    }

    pub fn select_all(&mut self) {
        self.selected = Some(self.available().to_vec());
    }

    pub fn clear(&mut self) {
        self.selected = Some(Vec::new());
    }

    /// Selected items surviving the org unit and the text filter.
    pub fn filter_selected(&self, org_unit: Option<&str>) -> Vec<&Item> {
        let text = Some(self.filter.as_str());
        self.selected()
            .iter()
            .filter(|item| filter::in_org_unit(&item.path(), org_unit))
            .filter(|item| filter::matches(&item.name, text))
            .collect()
    }

    /// Unfiltered selected names, comma-joined, for the cascade requests.
    pub fn selected_names(&self) -> Option<String> {
        let names: Vec<&str> = self.selected().iter().map(|i| i.name.as_str()).collect();
        (!names.is_empty()).then(|| names.join(","))
    }

    /// Filtered names for data queries and the URL. Falls back to the prior
    /// names while nothing is resolved; `None` means no constraint.
    pub fn query_names(&self, org_unit: Option<&str>) -> Option<Vec<String>> {
        let names: Vec<String> = match (&self.selected, &self.prior) {
            (Some(_), _) => self
                .filter_selected(org_unit)
                .into_iter()
                .map(|item| item.name.clone())
                .collect(),
            (None, Some(prior)) => prior
                .iter()
                .filter(|name| filter::matches(name, Some(self.filter.as_str())))
                .cloned()
                .collect(),
            (None, None) => Vec::new(),
        };
        (!names.is_empty()).then_some(names)
    }
}

/// Derives a dimension's selection from its previous state and a new universe.
///
/// * prior names and no live selection: exactly those names present;
/// * no live selection: everything;
/// * a non-empty live selection: intersected by name;
/// * an empty live selection stays empty.
pub fn reconcile(
    previous: Option<&[Item]>,
    prior: Option<&[String]>,
    available: &[Item],
) -> Vec<Item> {
    match (previous, prior) {
        (None, Some(prior)) => select_named(available, prior.iter().map(String::as_str)),
        (None, None) => available.to_vec(),
        (Some(previous), _) if previous.is_empty() => Vec::new(),
        (Some(previous), _) => select_named(available, previous.iter().map(|i| i.name.as_str())),
    }
}

/// Items of `available` whose names appear in `names`, in universe order.
pub fn select_named<'a>(available: &[Item], names: impl IntoIterator<Item = &'a str>) -> Vec<Item> {
    let names: BTreeSet<&str> = names.into_iter().collect();
    available
        .iter()
        .filter(|item| names.contains(item.name.as_str()))
        .cloned()
        .collect()
}

/// Every non-empty parent prefix path across `accounts`, sorted and unique.
pub fn org_units(accounts: &[Item]) -> Vec<String> {
    let mut units = BTreeSet::new();
    for account in accounts {
        let mut path = Vec::new();
        for parent in account.parents.as_deref().unwrap_or_default() {
            path.push(parent.as_str());
            units.insert(path.join("/"));
        }
    }
    units.into_iter().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown {kind} `{value}`")]
    Unknown { kind: &'static str, value: String },
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseError::Unknown {
                        kind: $kind,
                        value: value.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum!(
    /// Time bucketing of a query.
    Consolidation, "consolidation" {
        Hourly => "hourly",
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
    }
);

impl Consolidation {
    /// Per-point unit shown in tooltips and axis titles.
    pub fn unit_name(self) -> &'static str {
        match self {
            Self::Hourly => "hour",
            Self::Daily => "day",
            Self::Weekly => "week",
            Self::Monthly => "month",
        }
    }
}

string_enum!(
    PlotType, "plot type" {
        Area => "area",
        Column => "column",
        Line => "line",
        Spline => "spline",
    }
);

string_enum!(
    ReservationSharing, "reservation sharing" {
        Borrowed => "borrowed",
        Lent => "lent",
    }
);

impl ReservationSharing {
    pub fn show_lent(self) -> bool {
        self == Self::Lent
    }
}

string_enum!(
    UsageCost, "usage/cost mode" {
        Cost => "cost",
        Usage => "usage",
    }
);

string_enum!(
    /// Grouping column of the data query.
    GroupBy, "group-by" {
        None => "None",
        TagKey => "TagKey",
        CostType => "CostType",
        OrgUnit => "OrgUnit",
        Account => "Account",
        Region => "Region",
        Zone => "Zone",
        Product => "Product",
        Operation => "Operation",
        UsageType => "UsageType",
        Tag => "Tag",
    }
);

/// Independent cost type toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostTypes {
    pub recurring: bool,
    pub allocated: bool,
    pub amortization: bool,
    pub credit: bool,
    pub tax: bool,
    pub savings: bool,
    pub subscription: bool,
    pub refund: bool,
}

impl Default for CostTypes {
    fn default() -> Self {
        Self {
            recurring: true,
            allocated: true,
            amortization: true,
            credit: true,
            tax: true,
            savings: false,
            subscription: false,
            refund: false,
        }
    }
}

impl CostTypes {
    pub fn none() -> Self {
        Self {
            recurring: false,
            allocated: false,
            amortization: false,
            credit: false,
            tax: false,
            savings: false,
            subscription: false,
            refund: false,
        }
    }

    /// Labelled toggles in query order, for rendering.
    pub fn toggles(&self) -> [(&'static str, bool); 8] {
        [
            ("Recurring", self.recurring),
            ("Allocated", self.allocated),
            ("Amortization", self.amortization),
            ("Credit", self.credit),
            ("Tax", self.tax),
            ("Savings", self.savings),
            ("Subscription", self.subscription),
            ("Refund", self.refund),
        ]
    }

    /// Flips the toggle labelled `name`; unknown labels are ignored.
    pub fn toggle(&mut self, name: &str) {
        let flag = match name {
            "Recurring" => &mut self.recurring,
            "Allocated" => &mut self.allocated,
            "Amortization" => &mut self.amortization,
            "Credit" => &mut self.credit,
            "Tax" => &mut self.tax,
            "Savings" => &mut self.savings,
            "Subscription" => &mut self.subscription,
            "Refund" => &mut self.refund,
            _ => return,
        };
        *flag = !*flag;
    }

    /// The `costType` request value. Subscription and refund carry their tax
    /// companions.
    pub fn query_value(&self) -> String {
        let mut types = Vec::new();
        for (name, enabled) in self.toggles() {
            if !enabled {
                continue;
            }
            types.push(name);
            match name {
                "Subscription" => types.push("SubscriptionTax"),
                "Refund" => types.push("RefundTax"),
                _ => {}
            }
        }
        types.join(",")
    }
}

/// One user tag key and its value selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagAxis {
    pub key: Item,
    pub enabled: bool,
    pub values: Selection,
}

/// The dynamic user tag axis.
///
/// URL state arrives before the key universe, so decoded tag values and
/// filters wait in the `pending_*` maps until [`UserTags::load_keys`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserTags {
    pub shown: bool,
    pub axes: Vec<TagAxis>,
    pub pending_enabled: Vec<bool>,
    pub pending_values: BTreeMap<String, Vec<String>>,
    pub pending_filters: BTreeMap<String, String>,
    pub group_by_tag: Option<String>,
    pub initial_group_by_tag: Option<String>,
}

impl UserTags {
    pub fn is_loaded(&self) -> bool {
        !self.axes.is_empty()
    }

    /// Installs the tag key universe.
    pub fn load_keys(&mut self, keys: &[Item]) {
        let enabled = if self.pending_enabled.len() == keys.len() {
            self.pending_enabled.clone()
        } else {
            vec![false; keys.len()]
        };

        self.axes = keys
            .iter()
            .zip(enabled)
            .map(|(key, enabled)| TagAxis {
                key: key.clone(),
                enabled,
                values: Selection {
                    prior: self.pending_values.get(&key.name).cloned(),
                    filter: self.pending_filters.get(&key.name).cloned().unwrap_or_default(),
                    ..Selection::default()
                },
            })
            .collect();

        self.group_by_tag = self
            .initial_group_by_tag
            .as_ref()
            .filter(|initial| keys.iter().any(|key| &key.name == *initial))
            .cloned()
            .or_else(|| keys.first().map(|key| key.name.clone()));
    }

    /// Enabled flags, falling back to the decoded ones before the keys load.
    pub fn enabled_flags(&self) -> Vec<bool> {
        if self.is_loaded() {
            self.axes.iter().map(|axis| axis.enabled).collect()
        } else {
            self.pending_enabled.clone()
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.enabled_flags().into_iter().any(|enabled| enabled)
    }

    pub fn axis_mut(&mut self, index: usize) -> Option<&mut TagAxis> {
        self.axes.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> Vec<Item> {
        names.iter().map(|name| Item::named(*name)).collect()
    }

    fn names(items: &[Item]) -> Vec<&str> {
        items.iter().map(|item| item.name.as_str()).collect()
    }

    #[test]
    fn reconcile_with_prior_selects_present_names() {
        let available = items(&["a", "b", "c"]);
        let prior = vec!["c".to_string(), "gone".to_string(), "a".to_string()];
        let selected = reconcile(None, Some(prior.as_slice()), &available);
        assert_eq!(names(&selected), vec!["a", "c"]);
    }

    #[test]
    fn reconcile_without_selection_selects_all() {
        let available = items(&["a", "b"]);
        assert_eq!(names(&reconcile(None, None, &available)), vec!["a", "b"]);
    }

    #[test]
    fn reconcile_intersects_live_selection() {
        let previous = items(&["a", "z"]);
        let available = items(&["a", "b"]);
        let prior = vec!["b".to_string()];
        let selected = reconcile(Some(previous.as_slice()), Some(prior.as_slice()), &available);
        assert_eq!(names(&selected), vec!["a"]);
    }

    #[test]
    fn reconcile_keeps_empty_selection_empty() {
        let available = items(&["a", "b"]);
        assert!(reconcile(Some(&[][..]), None, &available).is_empty());
    }

    #[test]
    fn reconcile_is_idempotent_on_supersets() {
        let previous = items(&["b", "d"]);
        let available = items(&["a", "b", "c", "d"]);
        let once = reconcile(Some(previous.as_slice()), None, &available);
        assert_eq!(names(&once), names(&previous));
        let twice = reconcile(Some(once.as_slice()), None, &available);
        assert_eq!(once, twice);
    }

    #[test]
    fn org_units_collects_every_prefix() {
        let accounts = vec![
            Item::with_parents("a", ["us", "prod"]),
            Item::with_parents("b", ["us", "dev"]),
            Item::with_parents("c", ["eu"]),
            Item::named("root"),
        ];
        assert_eq!(org_units(&accounts), vec!["eu", "us", "us/dev", "us/prod"]);
    }

    #[test]
    fn filter_selected_applies_org_unit_and_text() {
        let mut accounts = Selection::default();
        accounts.resolve(vec![
            Item::with_parents("alpha", ["us", "prod"]),
            Item::with_parents("beta", ["us", "prod", "team1"]),
            Item::with_parents("gamma", ["us", "dev"]),
        ]);
        let in_unit: Vec<&str> = accounts
            .filter_selected(Some("us/prod"))
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(in_unit, vec!["alpha", "beta"]);

        accounts.filter = "!alp".into();
        let filtered: Vec<&str> = accounts
            .filter_selected(Some("us/prod"))
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(filtered, vec!["beta"]);
        // Display predicates never touch the selection itself.
        assert_eq!(accounts.selected().len(), 3);
    }

    #[test]
    fn query_names_fall_back_to_prior() {
        let selection = Selection {
            prior: Some(vec!["us-east-1".into(), "eu-west-1".into()]),
            filter: "east".into(),
            ..Selection::default()
        };
        assert_eq!(selection.query_names(None), Some(vec!["us-east-1".to_string()]));
        assert_eq!(Selection::default().query_names(None), None);
    }

    #[test]
    fn toggle_keeps_universe_order() {
        let mut selection = Selection::default();
        selection.resolve(items(&["a", "b", "c"]));
        selection.toggle("a");
        assert_eq!(names(selection.selected()), vec!["b", "c"]);
        selection.toggle("a");
        assert_eq!(names(selection.selected()), vec!["a", "b", "c"]);
    }

    #[test]
    fn dimension_mask_round_trips() {
        let mut mask = DimensionMask::default();
        mask.set(Dimension::Account, true);
        mask.set(Dimension::Product, true);
        assert_eq!(mask.encode(), "true,false,false,true,false,false");
        assert_eq!(DimensionMask::decode(&mask.encode()), mask);
        assert_eq!(DimensionMask::decode("true,yes"), {
            let mut expected = DimensionMask::default();
            expected.set(Dimension::Account, true);
            expected
        });
    }

    #[test]
    fn cost_type_scenario() {
        let toggles = CostTypes {
            recurring: true,
            tax: true,
            ..CostTypes::none()
        };
        assert_eq!(toggles.query_value(), "Recurring,Tax");
    }

    #[test]
    fn cost_types_expand_tax_companions() {
        let toggles = CostTypes {
            subscription: true,
            refund: true,
            ..CostTypes::none()
        };
        assert_eq!(
            toggles.query_value(),
            "Subscription,SubscriptionTax,Refund,RefundTax"
        );
        assert_eq!(
            CostTypes::default().query_value(),
            "Recurring,Allocated,Amortization,Credit,Tax"
        );
    }

    #[test]
    fn enums_parse_their_wire_names() {
        assert_eq!("weekly".parse::<Consolidation>(), Ok(Consolidation::Weekly));
        assert_eq!(Consolidation::Daily.unit_name(), "day");
        assert_eq!("TagKey".parse::<GroupBy>(), Ok(GroupBy::TagKey));
        assert!(matches!(
            "pie".parse::<PlotType>(),
            Err(ParseError::Unknown { kind: "plot type", .. })
        ));
    }

    #[test]
    fn load_keys_applies_pending_state() {
        let mut tags = UserTags {
            shown: true,
            pending_enabled: vec![false, true],
            initial_group_by_tag: Some("Team".into()),
            ..UserTags::default()
        };
        tags.pending_values.insert("Team".into(), vec!["core".into()]);
        tags.pending_filters.insert("Env".into(), "prod".into());

        tags.load_keys(&items(&["Env", "Team"]));
        assert_eq!(tags.enabled_flags(), vec![false, true]);
        assert_eq!(tags.axes[1].values.prior, Some(vec!["core".to_string()]));
        assert_eq!(tags.axes[0].values.filter, "prod");
        assert_eq!(tags.group_by_tag.as_deref(), Some("Team"));
    }

    #[test]
    fn load_keys_resets_mismatched_flags() {
        let mut tags = UserTags {
            pending_enabled: vec![true],
            ..UserTags::default()
        };
        tags.load_keys(&items(&["Env", "Team", "App"]));
        assert_eq!(tags.enabled_flags(), vec![false, false, false]);
        assert_eq!(tags.group_by_tag.as_deref(), Some("Env"));
    }
}
