use crate::shared::api_utils::api_url;
use contracts::dashboards::grid_chart::{
    DashboardResponse, FormData, QueryResponse, SaveSliceNameRequest,
};
use gloo_net::http::Request;
use gloo_timers::callback::Timeout;
use web_sys::AbortController;

pub fn timeout_message(timeout_secs: u32) -> String {
    format!(
        "Query timeout - visualization query are set to timeout at {} seconds.",
        timeout_secs
    )
}

/// Error text for a non-2xx response: the server's `error` field when the body
/// carries one, otherwise the bare status.
pub fn error_from_body(status: u16, body: &str) -> String {
    serde_json::from_str::<QueryResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .unwrap_or_else(|| format!("HTTP error: {}", status))
}

/// Error for a failed query step: the timeout message once the request was
/// aborted by the timer, otherwise `detail`.
pub fn query_error(aborted: bool, timeout_secs: u32, detail: String) -> String {
    if aborted {
        timeout_message(timeout_secs)
    } else {
        detail
    }
}

/// Dashboard definition: slices and their datasources.
pub async fn get_dashboard(api_prefix: &str, dashboard_id: i64) -> Result<DashboardResponse, String> {
    let url = api_url(&format!("{}/dashboard/{}", api_prefix, dashboard_id));

    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.ok() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    let data: DashboardResponse = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;

    Ok(data)
}

/// Run the chart query. The request is aborted after `timeout_secs`.
pub async fn run_query(
    api_prefix: &str,
    form_data: &FormData,
    force: bool,
    timeout_secs: u32,
) -> Result<QueryResponse, String> {
    let url = api_url(&format!("{}/explore_json/?force={}", api_prefix, force));

    let controller = AbortController::new()
        .map_err(|e| format!("Failed to create AbortController: {:?}", e))?;
    let signal = controller.signal();
    let abort_on_timeout = Timeout::new(timeout_secs.saturating_mul(1000), move || {
        controller.abort();
    });

    let request = Request::post(&url)
        .abort_signal(Some(&signal))
        .json(form_data)
        .map_err(|e| format!("Failed to build request: {}", e))?;

    let response = request
        .send()
        .await
        .map_err(|e| query_error(signal.aborted(), timeout_secs, format!("Request failed: {}", e)))?;

    if !response.ok() {
        let status = response.status();
        let body = response.text().await;
        if signal.aborted() {
            return Err(timeout_message(timeout_secs));
        }
        return Err(error_from_body(status, &body.unwrap_or_default()));
    }

    // The timer stays armed while the body is read.
    let data: QueryResponse = response.json().await.map_err(|e| {
        query_error(signal.aborted(), timeout_secs, format!("Failed to parse response: {}", e))
    })?;
    drop(abort_on_timeout);

    Ok(data)
}

pub async fn save_slice_name(api_prefix: &str, slice_id: i64, name: &str) -> Result<(), String> {
    let url = api_url(&format!("{}/slice/{}", api_prefix, slice_id));
    let body = SaveSliceNameRequest {
        slice_name: name.to_string(),
    };

    let response = Request::put(&url)
        .json(&body)
        .map_err(|e| format!("Failed to build request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.ok() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(error_from_body(status, &body));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_body() {
        assert_eq!(
            error_from_body(400, r#"{"error": "Column 'foo' not found"}"#),
            "Column 'foo' not found"
        );
        assert_eq!(error_from_body(502, "<html>Bad gateway</html>"), "HTTP error: 502");
        assert_eq!(error_from_body(500, "{}"), "HTTP error: 500");
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(
            timeout_message(60),
            "Query timeout - visualization query are set to timeout at 60 seconds."
        );
    }

    #[test]
    fn test_query_error_prefers_timeout_once_aborted() {
        let detail = "Failed to parse response: unexpected end of input".to_string();
        assert_eq!(query_error(true, 30, detail.clone()), timeout_message(30));
        assert_eq!(query_error(false, 30, detail.clone()), detail);
    }
}
