use crate::domain::model::{
    ActionLogEntry, ActivityItem, NewActionLogEntry, NewVehicle, SmsHistoryItem, Vehicle,
    VehiclePatch,
};
use crate::domain::ports::{ActionLogStore, ConfigProvider, PrebookingStore, VehicleStore};
use crate::utils::error::{Result, YardError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const VEHICLES: &str = "vehicles";
pub const ACTIONS_LOG: &str = "actions_log";
pub const PREBOOKINGS: &str = "prebookings";

/// A PostgREST horizontal filter, rendered as `column=op.value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(String, String),
    Lt(String, String),
    Gte(String, String),
    IsNull(String),
    NotNull(String),
}

impl Filter {
    pub fn eq(column: &str, value: impl ToString) -> Self {
        Filter::Eq(column.to_string(), value.to_string())
    }

    pub fn lt(column: &str, value: impl ToString) -> Self {
        Filter::Lt(column.to_string(), value.to_string())
    }

    pub fn gte(column: &str, value: impl ToString) -> Self {
        Filter::Gte(column.to_string(), value.to_string())
    }

    pub fn is_null(column: &str) -> Self {
        Filter::IsNull(column.to_string())
    }

    pub fn not_null(column: &str) -> Self {
        Filter::NotNull(column.to_string())
    }

    pub fn to_query_pair(&self) -> (String, String) {
        match self {
            Filter::Eq(column, value) => (column.clone(), format!("eq.{}", value)),
            Filter::Lt(column, value) => (column.clone(), format!("lt.{}", value)),
            Filter::Gte(column, value) => (column.clone(), format!("gte.{}", value)),
            Filter::IsNull(column) => (column.clone(), "is.null".to_string()),
            Filter::NotNull(column) => (column.clone(), "not.is.null".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<(String, bool)>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn new(columns: &str) -> Self {
        Self {
            columns: columns.split_whitespace().collect::<Vec<_>>().join(""),
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone())];
        pairs.extend(self.filters.iter().map(Filter::to_query_pair));
        if let Some((column, ascending)) = &self.order {
            let direction = if *ascending { "asc" } else { "desc" };
            pairs.push(("order".to_string(), format!("{}.{}", column, direction)));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Thin client for the `/rest/v1` interface of the hosted database.
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl PostgrestClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: config.endpoint_url().trim_end_matches('/').to_string(),
            api_key: config.api_key().to_string(),
            client: builder.build()?,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    pub async fn insert<T, R>(&self, table: &str, record: &T) -> Result<Vec<R>>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        tracing::debug!("📡 POST {}", table);
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;
        Self::rows(response).await
    }

    pub async fn select<R: DeserializeOwned>(
        &self,
        table: &str,
        query: &SelectQuery,
    ) -> Result<Vec<R>> {
        tracing::debug!("📡 GET {} ({} filters)", table, query.filters.len());
        let response = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&query.to_query_pairs())
            .send()
            .await?;
        Self::rows(response).await
    }

    pub async fn update<T, R>(&self, table: &str, patch: &T, filters: &[Filter]) -> Result<Vec<R>>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let pairs: Vec<(String, String)> = filters.iter().map(Filter::to_query_pair).collect();
        tracing::debug!("📡 PATCH {} {:?}", table, pairs);
        let response = self
            .authorized(self.client.patch(self.table_url(table)))
            .header("Prefer", "return=representation")
            .query(&pairs)
            .json(patch)
            .send()
            .await?;
        Self::rows(response).await
    }

    pub async fn delete<R: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Vec<R>> {
        if filters.is_empty() {
            return Err(YardError::ValidationError {
                message: format!("refusing to delete from {} without filters", table),
            });
        }
        let pairs: Vec<(String, String)> = filters.iter().map(Filter::to_query_pair).collect();
        tracing::debug!("📡 DELETE {} {:?}", table, pairs);
        let response = self
            .authorized(self.client.delete(self.table_url(table)))
            .header("Prefer", "return=representation")
            .query(&pairs)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn rows<R: DeserializeOwned>(response: Response) -> Result<Vec<R>> {
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(YardError::BackendError {
                status: status.as_u16(),
                message: Self::error_message(&text),
                body: text,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// 優先使用 PostgREST 錯誤物件中的 message
    fn error_message(text: &str) -> String {
        match serde_json::from_str::<PostgrestErrorBody>(text) {
            Ok(PostgrestErrorBody {
                message: Some(message),
                details,
                hint,
            }) => {
                let mut parts = vec![message];
                parts.extend(details);
                parts.extend(hint);
                parts.join(" | ")
            }
            _ => text.to_string(),
        }
    }
}

/// Typed queries over the three tables.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: PostgrestClient,
}

impl SupabaseStore {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Ok(Self::new(PostgrestClient::new(config)?))
    }

    pub fn client(&self) -> &PostgrestClient {
        &self.client
    }
}

fn first_row<T>(rows: Vec<T>, table: &str) -> Result<T> {
    rows.into_iter().next().ok_or_else(|| YardError::BackendError {
        status: 200,
        message: format!("insert into {} returned no row", table),
        body: String::new(),
    })
}

#[async_trait]
impl VehicleStore for SupabaseStore {
    async fn insert_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle> {
        let rows = self.client.insert(VEHICLES, vehicle).await?;
        first_row(rows, VEHICLES)
    }

    async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>> {
        let query = SelectQuery::new("*").filter(Filter::eq("id", id)).limit(1);
        let rows: Vec<Vehicle> = self.client.select(VEHICLES, &query).await?;
        Ok(rows.into_iter().next())
    }

    async fn update_vehicle(&self, id: &str, patch: &VehiclePatch) -> Result<Option<Vehicle>> {
        let rows: Vec<Vehicle> = self
            .client
            .update(VEHICLES, patch, &[Filter::eq("id", id)])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_open_vehicles(&self) -> Result<Vec<Vehicle>> {
        let query = SelectQuery::new("*")
            .filter(Filter::is_null("release_time"))
            .order("check_in_time", true);
        self.client.select(VEHICLES, &query).await
    }
}

#[async_trait]
impl ActionLogStore for SupabaseStore {
    async fn append(&self, entry: &NewActionLogEntry) -> Result<ActionLogEntry> {
        let rows = self.client.insert(ACTIONS_LOG, entry).await?;
        first_row(rows, ACTIONS_LOG)
    }

    async fn sms_history(&self, vehicle_id: &str) -> Result<Vec<SmsHistoryItem>> {
        let query = SelectQuery::new(
            "message_type, recipient_phone, message_content, timestamp, message_sent, \
             operators(name)",
        )
        .filter(Filter::eq("vehicle_id", vehicle_id))
        .filter(Filter::not_null("message_type"))
        .order("timestamp", true);
        self.client.select(ACTIONS_LOG, &query).await
    }

    async fn sent_message_types_since(&self, since: DateTime<Utc>) -> Result<Vec<Option<String>>> {
        #[derive(Deserialize)]
        struct Row {
            message_type: Option<String>,
        }

        let query = SelectQuery::new("message_type")
            .filter(Filter::eq("message_sent", true))
            .filter(Filter::gte("timestamp", since.to_rfc3339()));
        let rows: Vec<Row> = self.client.select(ACTIONS_LOG, &query).await?;
        Ok(rows.into_iter().map(|row| row.message_type).collect())
    }

    async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityItem>> {
        let query = SelectQuery::new(
            "timestamp, action, message_type, recipient_phone, operators(name), \
             vehicles(registration, po_ref)",
        )
        .order("timestamp", false)
        .limit(limit);
        self.client.select(ACTIONS_LOG, &query).await
    }
}

#[derive(Serialize)]
struct ConsumedPatch {
    consumed: bool,
}

#[async_trait]
impl PrebookingStore for SupabaseStore {
    async fn consume_before_date(&self, today: NaiveDate) -> Result<usize> {
        let rows: Vec<serde_json::Value> = self
            .client
            .update(
                PREBOOKINGS,
                &ConsumedPatch { consumed: true },
                &[
                    Filter::lt("expected_date", today.format("%Y-%m-%d")),
                    Filter::eq("consumed", false),
                ],
            )
            .await?;
        Ok(rows.len())
    }

    async fn consume_today_before_time(
        &self,
        today: NaiveDate,
        cutoff: NaiveTime,
    ) -> Result<usize> {
        let rows: Vec<serde_json::Value> = self
            .client
            .update(
                PREBOOKINGS,
                &ConsumedPatch { consumed: true },
                &[
                    Filter::eq("expected_date", today.format("%Y-%m-%d")),
                    Filter::lt("expected_time", cutoff.format("%H:%M")),
                    Filter::eq("consumed", false),
                ],
            )
            .await?;
        Ok(rows.len())
    }
}
