//! Device lookup handlers.

use serde::Serialize;
use tabled::Tabled;

use fleetvars_core::{DeviceRecord, ResourceIdentity, Session};

use crate::cli::{DeviceArgs, DeviceCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct TagView {
    key: String,
    value: String,
}

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "KEY")]
    key: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

fn detail(device: &DeviceRecord) -> String {
    let macs = device.mac_addresses();
    output::detail_lines(&[
        ("identity", Some(ResourceIdentity::device(&device.uuid).to_string())),
        ("id", Some(device.id.to_string())),
        ("uuid", Some(device.uuid.clone())),
        ("name", device.device_name.clone()),
        ("fleet", device.fleet.map(|r| r.id.to_string())),
        ("device type", device.device_type.map(|r| r.id.to_string())),
        ("os", device.os_version.clone()),
        ("supervisor", device.supervisor_version.clone()),
        ("ip address", device.ip_address.clone()),
        ("public address", device.public_address.clone()),
        ("mac addresses", (!macs.is_empty()).then(|| macs.join(", "))),
        ("running release", device.running_release.map(|r| r.id.to_string())),
        ("pinned release", device.pinned_release.map(|r| r.id.to_string())),
        (
            "location",
            device
                .custom_latitude
                .as_ref()
                .or(device.latitude.as_ref())
                .zip(device.custom_longitude.as_ref().or(device.longitude.as_ref()))
                .map(|(lat, lon)| format!("{lat}, {lon}")),
        ),
        ("last vpn event", device.last_vpn_event.clone()),
        ("last seen", device.last_connectivity_event.clone()),
        ("note", device.note.clone()),
        ("created", device.created_at.clone()),
    ])
}

pub async fn handle(session: &Session, args: DeviceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DeviceCommand::Get { uuid } => {
            let device = session.device(&uuid).await?;
            let rendered =
                output::render_single(&global.output, &device, detail, |d| d.uuid.clone())?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        DeviceCommand::Tags { uuid } => {
            let tags: Vec<TagView> = session
                .device_tags(&uuid)
                .await?
                .into_iter()
                .map(|(key, value)| TagView { key, value })
                .collect();
            let rendered = output::render_list(
                &global.output,
                &tags,
                |t| TagRow {
                    key: t.key.clone(),
                    value: t.value.clone(),
                },
                |t| format!("{}={}", t.key, t.value),
            )?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn detail_prefers_custom_location_and_joins_macs() {
        let device: DeviceRecord = serde_json::from_value(serde_json::json!({
            "id": 9,
            "uuid": "abc123",
            "mac_address": "aa:bb:cc:dd:ee:ff 11:22:33:44:55:66",
            "latitude": "1.0",
            "longitude": "2.0",
            "custom_latitude": "51.5",
            "custom_longitude": "-0.1"
        }))
        .unwrap();
        let out = detail(&device);
        assert!(out.lines().next().unwrap().ends_with("  device:abc123"));
        assert!(out.contains("aa:bb:cc:dd:ee:ff, 11:22:33:44:55:66"));
        assert!(out.contains("51.5, -0.1"));
    }
}
