use anyhow::{Context, Result, bail};
use async_graphql::{Request, Variables};
use serde_json::Value;
use tracing::debug;

use crate::model::ModelFile;
use crate::output::print_json;

/// Executes `query` and returns the full GraphQL response as JSON.
pub async fn execute(model: ModelFile, query: &str, variables: Option<&str>) -> Result<Value> {
    let schema = model.into_synthesizer()?.finish()?;

    let mut request = Request::new(query);
    if let Some(raw) = variables {
        let variables: Value =
            serde_json::from_str(raw).context("Variables must be a JSON object")?;
        if !variables.is_object() {
            bail!("Variables must be a JSON object");
        }
        request = request.variables(Variables::from_json(variables));
    }

    let response = schema.execute(request).await;
    debug!(errors = response.errors.len(), "Query executed");
    Ok(serde_json::to_value(&response)?)
}

pub async fn query(model: ModelFile, query: &str, variables: Option<&str>) -> Result<()> {
    let response = execute(model, query, variables).await?;
    print_json(&response)
}
