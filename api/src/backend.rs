use crate::{ApiError, DataResponse, Item, QueryParams, TimeSpan};

/// Endpoints answering with a list of [`Item`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemEndpoint {
    Accounts,
    Regions,
    Zones,
    Products,
    Operations,
    UsageTypes,
    /// The user tag key universe.
    Tags,
    /// Values of one user tag key; the key index travels as `index`.
    UserTagValues,
}

impl ItemEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Accounts => "getAccounts",
            Self::Regions => "getRegions",
            Self::Zones => "getZones",
            Self::Products => "getProducts",
            Self::Operations => "getOperations",
            Self::UsageTypes => "getUsageTypes",
            Self::Tags => "tags",
            Self::UserTagValues => "userTagValues",
        }
    }

    /// Accounts and tag keys are plain GETs; the filtered lookups POST a JSON body.
    pub fn is_get(self) -> bool {
        matches!(self, Self::Accounts | Self::Tags)
    }
}

/// Endpoints answering with a list of operation names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpsEndpoint {
    Reservation,
    SavingsPlan,
    Utilization,
}

impl OpsEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Reservation => "getReservationOps",
            Self::SavingsPlan => "getSavingsPlanOps",
            Self::Utilization => "getUtilizationOps",
        }
    }
}

/// Administrative endpoints whose payload the dashboard only displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminEndpoint {
    TagConfigs,
    ProcessorStatus,
    ProcessorState,
    SetReprocess,
    StartProcessor,
    Months,
    Subscriptions,
}

impl AdminEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::TagConfigs => "getTagConfigs",
            Self::ProcessorStatus => "getProcessorStatus",
            Self::ProcessorState => "getProcessorState",
            Self::SetReprocess => "setReprocess",
            Self::StartProcessor => "startProcessor",
            Self::Months => "getMonths",
            Self::Subscriptions => "getSubscriptions",
        }
    }
}

/// Every request contract the dashboard consumes.
///
/// Implementations resolve exactly once per call and never retry.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn items(&self, endpoint: ItemEndpoint, params: &QueryParams)
        -> Result<Vec<Item>, ApiError>;

    async fn operations(
        &self,
        endpoint: OpsEndpoint,
        params: &QueryParams,
    ) -> Result<Vec<String>, ApiError>;

    async fn data(&self, params: &QueryParams) -> Result<DataResponse, ApiError>;

    async fn time_span(&self, params: &QueryParams) -> Result<TimeSpan, ApiError>;

    /// Single resource lookup; the raw JSON document is shown to the user.
    async fn instance(&self, id: &str) -> Result<serde_json::Value, ApiError>;

    async fn admin(
        &self,
        endpoint: AdminEndpoint,
        params: &QueryParams,
    ) -> Result<serde_json::Value, ApiError>;
}
