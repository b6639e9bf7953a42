//! PostgREST table access for [`SupabaseClient`].

use reqwest::Method;
use serde_json::Value;
use store::table::value_to_query;
use store::{Filter, Order, StoreError, TableStore};

use crate::client::{json_body, send, SupabaseClient};

fn table_path(table: &str) -> String {
    format!("/rest/v1/{table}")
}

/// Query parameters for an equality filter: `column=eq.value`.
pub(crate) fn filter_params(filter: &Filter) -> Vec<(String, String)> {
    filter
        .conditions()
        .iter()
        .map(|(column, value)| (column.clone(), format!("eq.{}", value_to_query(value))))
        .collect()
}

pub(crate) fn order_param(order: &Order) -> (String, String) {
    let direction = if order.ascending { "asc" } else { "desc" };
    ("order".to_string(), format!("{}.{direction}", order.column))
}

fn require_filter(table: &str, filter: &Filter) -> Result<(), StoreError> {
    if filter.is_empty() {
        return Err(StoreError::Rejected {
            status: 400,
            message: format!("refusing to modify every row of {table}"),
        });
    }
    Ok(())
}

impl TableStore for SupabaseClient {
    async fn select(
        &self,
        table: &str,
        filter: &Filter,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(filter_params(filter));
        params.extend(order.map(order_param));

        let request = self.request(Method::GET, &table_path(table))?.query(&params);
        json_body(send(request).await?).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, StoreError> {
        let request = self
            .request(Method::POST, &table_path(table))?
            .header("Prefer", "return=representation")
            .json(&rows);
        json_body(send(request).await?).await
    }

    async fn update(&self, table: &str, patch: Value, filter: &Filter) -> Result<(), StoreError> {
        require_filter(table, filter)?;
        let request = self
            .request(Method::PATCH, &table_path(table))?
            .query(&filter_params(filter))
            .header("Prefer", "return=minimal")
            .json(&patch);
        send(request).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), StoreError> {
        require_filter(table, filter)?;
        let request = self
            .request(Method::DELETE, &table_path(table))?
            .query(&filter_params(filter));
        send(request).await?;
        Ok(())
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        conflict_key: &str,
    ) -> Result<(), StoreError> {
        let request = self
            .request(Method::POST, &table_path(table))?
            .query(&[("on_conflict", conflict_key)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows);
        send(request).await?;
        Ok(())
    }
}
