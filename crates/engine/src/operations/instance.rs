use scs_api::{AuthenticatedClient, StatusCode};
use scs_types::{BackingApp, ManagementParameters, OperationError, ScsError, ViewInstanceResponse};
use scs_util::decode_json;
use scs_util::display::{format_bytes, format_megabytes, format_millis_local, format_millis_rfc3339, render_table, wrap_with_hanging_indent};

/// Width of the label column in the backing-app header block.
const LABEL_WIDTH: usize = 18;
const BUILDPACK_WRAP_WIDTH: usize = 150;
const INSTANCE_HEADERS: [&str; 7] = ["", "state", "since", "cpu", "memory", "disk", "details"];

/// `GET <url>` and render the backing applications report.
pub(super) async fn view(client: &dyn AuthenticatedClient, params: &ManagementParameters, token: &str) -> Result<String, ScsError> {
    let response = client.get(&params.url, token).await?;
    if response.status != StatusCode::OK {
        return Err(OperationError::unexpected_status("failed to retrieve service instance details", response.status.as_u16()).into());
    }
    let body = response.require_body(&params.url)?;
    let parsed: ViewInstanceResponse = decode_json("service instance view", body)?;
    Ok(render_view(&parsed))
}

/// `GET <url>/parameters`, returned verbatim.
pub(super) async fn parameters(client: &dyn AuthenticatedClient, params: &ManagementParameters, token: &str) -> Result<String, ScsError> {
    let url = format!("{}/parameters", params.url);
    let response = client.get(&url, token).await?;
    if response.status != StatusCode::OK {
        return Err(OperationError::unexpected_status("failed to retrieve service instance parameters", response.status.as_u16()).into());
    }
    Ok(response.body)
}

/// One header block plus an instance table per backing app, separated by a
/// blank line.
pub fn render_view(response: &ViewInstanceResponse) -> String {
    response
        .backing_apps
        .iter()
        .map(render_backing_app)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_backing_app(app: &BackingApp) -> String {
    let mut out = String::new();
    push_field(&mut out, "backing app name:", &app.name);
    push_field(&mut out, "requested state:", &app.requested_state.to_lowercase());
    push_field(&mut out, "instances:", &format!("{}/{}", app.running_instances, app.num_instances));
    push_field(
        &mut out,
        "usage:",
        &format!("{} x {} instances", format_megabytes(app.memory), app.num_instances),
    );
    push_field(&mut out, "routes:", &app.routes.join(", "));
    push_field(&mut out, "last uploaded:", &format_millis_local(app.last_uploaded));
    push_field(&mut out, "stack:", &app.stack);
    push_field(
        &mut out,
        "buildpack:",
        &wrap_with_hanging_indent(&app.buildpack, BUILDPACK_WRAP_WIDTH, LABEL_WIDTH),
    );
    out.push('\n');

    let rows: Vec<Vec<String>> = app
        .instances
        .iter()
        .map(|instance| {
            vec![
                format!("#{}", instance.index),
                instance.state.to_lowercase(),
                format_millis_rfc3339(instance.since),
                format!("{:.1}%", 100.0 * instance.cpu),
                format!("{} of {}", format_bytes(instance.memory_usage), format_bytes(instance.memory_quota)),
                format!("{} of {}", format_bytes(instance.disk_usage), format_bytes(instance.disk_quota)),
                instance.details.clone(),
            ]
        })
        .collect();
    out.push_str(&render_table(&INSTANCE_HEADERS, &rows));
    out
}

fn push_field(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("{label:<width$}{value}\n", width = LABEL_WIDTH));
}
