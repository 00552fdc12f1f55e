use crate::client::{ApiClient, odata_quote};
use crate::error::Error;
use crate::models::{DeviceRecord, DeviceTagRecord, ListResponse};

impl ApiClient {
    /// Fetch exactly one device by uuid.
    pub async fn get_device(&self, uuid: &str) -> Result<DeviceRecord, Error> {
        let envelope: ListResponse<DeviceRecord> = self
            .get(&format!("device(uuid={})", odata_quote(uuid)))
            .await?;

        let mut devices = envelope.data;
        match devices.len() {
            1 => Ok(devices.remove(0)),
            0 => Err(Error::NotFound {
                entity: "device",
                identifier: uuid.to_owned(),
            }),
            count => Err(Error::Ambiguous {
                entity: "device",
                identifier: uuid.to_owned(),
                count,
            }),
        }
    }

    pub async fn list_device_tags(&self, uuid: &str) -> Result<Vec<DeviceTagRecord>, Error> {
        self.list_filtered("device_tag", &format!("device/uuid eq {}", odata_quote(uuid)))
            .await
    }
}
