//! Joins registry registrations with platform application names.

use std::collections::HashMap;

use scs_types::{
    ApplicationsResponse, CfAppSummaryResponse, EurekaAppRecord, LookupError, ScsError, ValidationError,
};
use scs_util::decode_json;
use tracing::{debug, warn};

use crate::platform::Platform;

/// Resolves platform application names by GUID, asking the platform at most
/// once per GUID.
pub(crate) struct AppNameCache<'a> {
    platform: &'a dyn Platform,
    names: HashMap<String, String>,
}

impl<'a> AppNameCache<'a> {
    /// Seed the cache from the apps of the current space. A failed listing is
    /// not fatal; unknown GUIDs fall back to per-app lookups.
    pub(crate) async fn seeded(platform: &'a dyn Platform) -> Self {
        let names = match platform.get_apps().await {
            Ok(apps) => apps.into_iter().map(|app| (app.guid, app.name)).collect(),
            Err(error) => {
                warn!(error = %error, "could not list space apps; resolving names one by one");
                HashMap::new()
            }
        };
        Self { platform, names }
    }

    pub(crate) async fn name_for(&mut self, guid: &str) -> Result<String, ScsError> {
        if let Some(name) = self.names.get(guid) {
            return Ok(name.clone());
        }

        let path = format!("/v2/apps/{guid}/summary");
        debug!(guid = %guid, "looking up cf app name");
        let body = self.platform.curl(&path).await?;
        let summary: CfAppSummaryResponse = decode_json("cf app summary", &body)?;
        if summary.code != 0 {
            return Err(LookupError::CfAppNameUnresolved {
                guid: guid.to_string(),
                description: summary.description,
                code: summary.code,
                error_code: summary.error_code,
            }
            .into());
        }

        self.names.insert(guid.to_string(), summary.name.clone());
        Ok(summary.name)
    }
}

/// One record per registered instance, in registry order.
pub(crate) async fn join_records(
    applications: &ApplicationsResponse,
    names: &mut AppNameCache<'_>,
) -> Result<Vec<EurekaAppRecord>, ScsError> {
    let mut records = Vec::new();
    for application in &applications.applications.application {
        for instance in &application.instance {
            let guid = &instance.metadata.cf_app_guid;
            let record = if guid.is_empty() {
                EurekaAppRecord::unbound(instance)
            } else {
                EurekaAppRecord::bound(instance, names.name_for(guid).await?)
            };
            records.push(record);
        }
    }
    Ok(records)
}

/// Keep the bound records of `cf_app_name`, optionally narrowed to one
/// instance index.
pub fn filter_records(
    records: Vec<EurekaAppRecord>,
    cf_app_name: &str,
    instance_index: Option<u32>,
) -> Result<Vec<EurekaAppRecord>, ScsError> {
    let matching: Vec<EurekaAppRecord> = records
        .into_iter()
        .filter(|record| record.is_bound() && record.cf_app_name == cf_app_name)
        .collect();
    if matching.is_empty() {
        return Err(LookupError::cf_app_not_found(cf_app_name).into());
    }

    let Some(index) = instance_index else {
        return Ok(matching);
    };

    let mut selected = Vec::new();
    for record in matching {
        let record_index: u32 = record
            .instance_index
            .parse()
            .map_err(|error: std::num::ParseIntError| ValidationError::InvalidInstanceIndex {
                value: record.instance_index.clone(),
                reason: error.to_string(),
            })?;
        if record_index == index {
            selected.push(record);
        }
    }
    if selected.is_empty() {
        return Err(LookupError::InstanceIndexNotFound { index }.into());
    }
    Ok(selected)
}
