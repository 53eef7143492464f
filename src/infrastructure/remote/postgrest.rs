use crate::application::ports::remote_data_service::{DispatchError, RemoteDataService};
use crate::domain::entities::offline::WriteRecord;
use crate::domain::value_objects::offline::WriteOperation;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::time::Duration;

const REST_PREFIX: &str = "rest/v1";
const BODY_EXCERPT_LIMIT: usize = 512;

/// HTTP request a queued write translates to.
#[derive(Debug, Clone, PartialEq)]
pub struct PostgrestRequest {
    pub method: Method,
    pub url: Url,
    pub prefer: &'static str,
    pub body: Option<Value>,
}

/// Remote data service speaking the PostgREST dialect (`/rest/v1/{table}`).
pub struct PostgrestDataService {
    client: Client,
    base_url: Url,
    api_key: String,
    timeout: Duration,
}

impl PostgrestDataService {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|err| AppError::ConfigurationError(format!("invalid remote url: {err}")))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            timeout,
        })
    }

    pub fn build_request(&self, record: &WriteRecord) -> Result<PostgrestRequest, DispatchError> {
        build_request(&self.base_url, record)
    }
}

#[async_trait]
impl RemoteDataService for PostgrestDataService {
    async fn dispatch(&self, record: &WriteRecord) -> Result<(), DispatchError> {
        let request = self.build_request(record)?;

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", request.prefer);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            if err.is_timeout() {
                DispatchError::Timeout(self.timeout.as_millis() as u64)
            } else {
                DispatchError::Network(err.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(
                target: "remote::postgrest",
                write_id = %record.id,
                table = %record.table,
                operation = %record.operation,
                status = status.as_u16(),
                "write accepted"
            );
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > BODY_EXCERPT_LIMIT {
            let mut cut = BODY_EXCERPT_LIMIT;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(DispatchError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

pub fn build_request(
    base_url: &Url,
    record: &WriteRecord,
) -> Result<PostgrestRequest, DispatchError> {
    let mut url = base_url
        .join(&format!("{REST_PREFIX}/{}", record.table))
        .map_err(|err| DispatchError::InvalidRequest(format!("invalid table url: {err}")))?;

    let payload = record.payload.as_map().clone();

    let (method, prefer, body) = match record.operation {
        WriteOperation::Insert => (Method::POST, "return=minimal", Some(Value::Object(payload))),
        WriteOperation::Update => {
            append_filters(&mut url, record)?;
            (Method::PATCH, "return=minimal", Some(Value::Object(payload)))
        }
        WriteOperation::Upsert => {
            let mut body = payload;
            // Filter columns identify the row, so they must be part of the upserted values.
            if let Some(filters) = &record.filters {
                for (column, value) in filters.iter() {
                    body.entry(column.clone()).or_insert_with(|| value.clone());
                }
            }
            if let Some(columns) = &record.on_conflict {
                url.query_pairs_mut().append_pair("on_conflict", columns);
            }
            (
                Method::POST,
                "resolution=merge-duplicates,return=minimal",
                Some(Value::Object(body)),
            )
        }
        WriteOperation::Delete => {
            append_filters(&mut url, record)?;
            (Method::DELETE, "return=minimal", None)
        }
    };

    Ok(PostgrestRequest {
        method,
        url,
        prefer,
        body,
    })
}

fn append_filters(url: &mut Url, record: &WriteRecord) -> Result<(), DispatchError> {
    let filters = record.filters.as_ref().ok_or_else(|| {
        DispatchError::InvalidRequest(format!(
            "{} on {} without filters would touch every row",
            record.operation, record.table
        ))
    })?;

    let mut pairs = url.query_pairs_mut();
    for (column, value) in filters.iter() {
        pairs.append_pair(column, &filter_expression(column, value)?);
    }
    Ok(())
}

fn filter_expression(column: &str, value: &Value) -> Result<String, DispatchError> {
    match value {
        Value::Null => Ok("is.null".to_string()),
        Value::String(text) => Ok(format!("eq.{text}")),
        Value::Bool(flag) => Ok(format!("is.{flag}")),
        Value::Number(number) => Ok(format!("eq.{number}")),
        Value::Array(_) | Value::Object(_) => Err(DispatchError::InvalidRequest(format!(
            "filter on {column} must be a scalar"
        ))),
    }
}
